use std::collections::HashMap;
use std::sync::Arc;

use garde::Validate;
use tracing::{debug, info, instrument};

use crate::device::{Device, DeviceRepository};
use crate::error::{DomainError, DomainResult};
use crate::gateway::{
    CreateGatewayRepoInput, Gateway, GatewayFilter, GatewayQuery, GatewayRecord,
    GatewayRepository, UpdateGatewayRepoInput, MAX_PERIPHERAL_DEVICES,
};
use crate::query::{ListPage, PageMeta, PageRequest, Sort};
use crate::validate::{is_valid_ipv4, validate_struct};

/// Service request for creating a gateway
#[derive(Debug, Clone, Validate)]
pub struct CreateGatewayRequest {
    #[garde(length(min = 1))]
    pub serial_id: String,
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(length(min = 1))]
    pub ipv4_address: String,
    #[garde(skip)] // bounded by the fan-out check, not by garde
    pub peripheral_devices: Vec<String>,
}

/// Service request for listing gateways
#[derive(Debug, Clone, Default)]
pub struct ListGatewaysRequest {
    pub serial_id: Option<String>,
    pub name: Option<String>,
    pub ipv4_address: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort: Option<String>,
}

/// Service request for getting a gateway
#[derive(Debug, Clone, Validate)]
pub struct GetGatewayRequest {
    #[garde(length(min = 1))]
    pub gateway_id: String,
}

/// Service request for replacing a gateway in full. Omitted peripheral
/// devices clear the association list rather than preserving it.
#[derive(Debug, Clone, Validate)]
pub struct UpdateGatewayRequest {
    #[garde(length(min = 1))]
    pub gateway_id: String,
    #[garde(length(min = 1))]
    pub serial_id: String,
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(length(min = 1))]
    pub ipv4_address: String,
    #[garde(skip)]
    pub peripheral_devices: Vec<String>,
}

/// Service request for deleting a gateway
#[derive(Debug, Clone, Validate)]
pub struct DeleteGatewayRequest {
    #[garde(length(min = 1))]
    pub gateway_id: String,
}

/// Domain service for gateway management business logic. Every read path
/// resolves peripheral device references into full device records with one
/// batched lookup; the device store is never mutated from here.
pub struct GatewayService {
    gateway_repository: Arc<dyn GatewayRepository>,
    device_repository: Arc<dyn DeviceRepository>,
}

impl GatewayService {
    pub fn new(
        gateway_repository: Arc<dyn GatewayRepository>,
        device_repository: Arc<dyn DeviceRepository>,
    ) -> Self {
        Self {
            gateway_repository,
            device_repository,
        }
    }

    /// Create a new gateway with a generated ID. The IPv4 format and the
    /// device fan-out bound are checked before anything is written.
    #[instrument(skip(self, request), fields(serial_id = %request.serial_id))]
    pub async fn create_gateway(&self, request: CreateGatewayRequest) -> DomainResult<Gateway> {
        validate_struct(&request)?;
        self.check_invariants(&request.ipv4_address, &request.peripheral_devices)?;

        let gateway_id = xid::new().to_string();
        debug!(gateway_id = %gateway_id, "creating gateway");

        let record = self
            .gateway_repository
            .create_gateway(CreateGatewayRepoInput {
                gateway_id,
                serial_id: request.serial_id,
                name: request.name,
                ipv4_address: request.ipv4_address,
                peripheral_devices: request.peripheral_devices,
            })
            .await?;

        let gateway = self.resolve_record(record).await?;
        info!(gateway_id = %gateway.gateway_id, "gateway created");
        Ok(gateway)
    }

    /// List gateways with filtering, pagination and ordering. `meta.total`
    /// counts every record matching the filters, ignoring pagination.
    #[instrument(skip(self, request))]
    pub async fn list_gateways(
        &self,
        request: ListGatewaysRequest,
    ) -> DomainResult<ListPage<Gateway>> {
        let filter = GatewayFilter {
            serial_id: request.serial_id,
            name: request.name,
            ipv4_address: request.ipv4_address,
        };
        let query = GatewayQuery {
            filter: filter.clone(),
            page: PageRequest {
                page: request.page,
                limit: request.limit,
            },
            sort: request.sort.as_deref().map(Sort::parse).unwrap_or_default(),
        };

        let total = self.gateway_repository.count_gateways(filter).await?;
        let records = self.gateway_repository.list_gateways(query).await?;
        let data = self.resolve_records(records).await?;

        debug!(count = data.len(), total, "listed gateways");
        Ok(ListPage {
            data,
            meta: PageMeta { total },
        })
    }

    /// Get a gateway by ID with its peripheral devices resolved.
    #[instrument(skip(self, request), fields(gateway_id = %request.gateway_id))]
    pub async fn get_gateway(&self, request: GetGatewayRequest) -> DomainResult<Gateway> {
        validate_struct(&request)?;

        let record = self
            .gateway_repository
            .get_gateway(&request.gateway_id)
            .await?
            .ok_or_else(|| DomainError::GatewayNotFound(request.gateway_id.clone()))?;

        self.resolve_record(record).await
    }

    /// Replace a gateway in full. Existence is asserted before the payload
    /// invariants are checked, and nothing is written until both pass.
    #[instrument(skip(self, request), fields(gateway_id = %request.gateway_id))]
    pub async fn update_gateway(&self, request: UpdateGatewayRequest) -> DomainResult<Gateway> {
        validate_struct(&request)?;

        let gateway_id = request.gateway_id.clone();
        self.gateway_repository
            .get_gateway(&gateway_id)
            .await?
            .ok_or_else(|| DomainError::GatewayNotFound(gateway_id.clone()))?;

        self.check_invariants(&request.ipv4_address, &request.peripheral_devices)?;

        let record = self
            .gateway_repository
            .replace_gateway(UpdateGatewayRepoInput {
                gateway_id: request.gateway_id,
                serial_id: request.serial_id,
                name: request.name,
                ipv4_address: request.ipv4_address,
                peripheral_devices: request.peripheral_devices,
            })
            .await?
            .ok_or_else(|| DomainError::GatewayNotFound(gateway_id))?;

        let gateway = self.resolve_record(record).await?;
        info!(gateway_id = %gateway.gateway_id, "gateway updated");
        Ok(gateway)
    }

    /// Delete a gateway by ID. Returns the record captured by the delete,
    /// references unresolved; the referenced devices are left untouched.
    #[instrument(skip(self, request), fields(gateway_id = %request.gateway_id))]
    pub async fn delete_gateway(
        &self,
        request: DeleteGatewayRequest,
    ) -> DomainResult<GatewayRecord> {
        validate_struct(&request)?;

        self.gateway_repository
            .get_gateway(&request.gateway_id)
            .await?
            .ok_or_else(|| DomainError::GatewayNotFound(request.gateway_id.clone()))?;

        let record = self
            .gateway_repository
            .delete_gateway(&request.gateway_id)
            .await?
            .ok_or_else(|| DomainError::GatewayNotFound(request.gateway_id.clone()))?;

        info!(gateway_id = %record.gateway_id, "gateway deleted");
        Ok(record)
    }

    fn check_invariants(
        &self,
        ipv4_address: &str,
        peripheral_devices: &[String],
    ) -> DomainResult<()> {
        if !is_valid_ipv4(ipv4_address) {
            return Err(DomainError::InvalidIpv4Address(ipv4_address.to_string()));
        }

        if peripheral_devices.len() > MAX_PERIPHERAL_DEVICES {
            return Err(DomainError::TooManyPeripheralDevices(
                peripheral_devices.len(),
            ));
        }

        Ok(())
    }

    /// Resolve one record's device references with a single batched fetch.
    async fn resolve_record(&self, record: GatewayRecord) -> DomainResult<Gateway> {
        let devices = self.fetch_devices(&record.peripheral_devices).await?;
        Ok(splice_devices(record, &devices))
    }

    /// Resolve a whole page of records with a single batched fetch across
    /// every referenced id.
    async fn resolve_records(&self, records: Vec<GatewayRecord>) -> DomainResult<Vec<Gateway>> {
        let mut ids: Vec<String> = records
            .iter()
            .flat_map(|record| record.peripheral_devices.iter().cloned())
            .collect();
        ids.sort();
        ids.dedup();

        let devices = self.fetch_devices(&ids).await?;
        Ok(records
            .into_iter()
            .map(|record| splice_devices(record, &devices))
            .collect())
    }

    async fn fetch_devices(&self, ids: &[String]) -> DomainResult<HashMap<String, Device>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let devices = self.device_repository.list_devices_by_ids(ids).await?;
        Ok(devices
            .into_iter()
            .map(|device| (device.device_id.clone(), device))
            .collect())
    }
}

/// Substitute stored device ids with the fetched records, preserving the
/// stored order. Ids that no longer resolve are dropped: the association is
/// a weak reference and deleting a device does not repair its referrers.
fn splice_devices(record: GatewayRecord, devices: &HashMap<String, Device>) -> Gateway {
    let peripheral_devices = record
        .peripheral_devices
        .iter()
        .filter_map(|id| devices.get(id).cloned())
        .collect();

    Gateway {
        gateway_id: record.gateway_id,
        serial_id: record.serial_id,
        name: record.name,
        ipv4_address: record.ipv4_address,
        peripheral_devices,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}
