use std::sync::Arc;

use chrono::{DateTime, Utc};
use garde::Validate;
use tracing::{debug, info, instrument};

use crate::device::{
    CreateDeviceRepoInput, Device, DeviceFilter, DeviceQuery, DeviceRepository,
    UpdateDeviceRepoInput,
};
use crate::error::{DomainError, DomainResult};
use crate::query::{ListPage, PageMeta, PageRequest, Sort};
use crate::validate::validate_struct;

/// Service request for registering a device
#[derive(Debug, Clone, Validate)]
pub struct CreateDeviceRequest {
    #[garde(skip)] // uniqueness enforced by the store
    pub uid: i64,
    #[garde(length(min = 1))]
    pub vendor: String,
    #[garde(skip)] // supplied by the caller, not auto-managed
    pub created_at: DateTime<Utc>,
    #[garde(length(min = 1))]
    pub status: String,
}

/// Service request for listing devices
#[derive(Debug, Clone, Default)]
pub struct ListDevicesRequest {
    pub uid: Option<i64>,
    pub vendor: Option<String>,
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort: Option<String>,
}

/// Service request for getting a device
#[derive(Debug, Clone, Validate)]
pub struct GetDeviceRequest {
    #[garde(length(min = 1))]
    pub device_id: String,
}

/// Service request for replacing a device in full
#[derive(Debug, Clone, Validate)]
pub struct UpdateDeviceRequest {
    #[garde(length(min = 1))]
    pub device_id: String,
    #[garde(skip)]
    pub uid: i64,
    #[garde(length(min = 1))]
    pub vendor: String,
    #[garde(skip)]
    pub created_at: DateTime<Utc>,
    #[garde(length(min = 1))]
    pub status: String,
}

/// Service request for deleting a device
#[derive(Debug, Clone, Validate)]
pub struct DeleteDeviceRequest {
    #[garde(length(min = 1))]
    pub device_id: String,
}

/// Domain service for device management. Plain CRUD with pagination; no
/// cross-entity invariants. Deleting a device does not repair gateways
/// that still reference it.
pub struct DeviceService {
    repository: Arc<dyn DeviceRepository>,
}

impl DeviceService {
    pub fn new(repository: Arc<dyn DeviceRepository>) -> Self {
        Self { repository }
    }

    /// Register a new device with a generated ID.
    #[instrument(skip(self, request), fields(uid = request.uid))]
    pub async fn create_device(&self, request: CreateDeviceRequest) -> DomainResult<Device> {
        validate_struct(&request)?;

        let device_id = xid::new().to_string();
        debug!(device_id = %device_id, "creating device");

        let device = self
            .repository
            .create_device(CreateDeviceRepoInput {
                device_id,
                uid: request.uid,
                vendor: request.vendor,
                created_at: request.created_at,
                status: request.status,
            })
            .await?;

        info!(device_id = %device.device_id, "device created");
        Ok(device)
    }

    /// List devices with filtering, pagination and ordering. `meta.total`
    /// counts every record matching the filters, ignoring pagination.
    #[instrument(skip(self, request))]
    pub async fn list_devices(&self, request: ListDevicesRequest) -> DomainResult<ListPage<Device>> {
        let filter = DeviceFilter {
            uid: request.uid,
            vendor: request.vendor,
            status: request.status,
        };
        let query = DeviceQuery {
            filter: filter.clone(),
            page: PageRequest {
                page: request.page,
                limit: request.limit,
            },
            sort: request.sort.as_deref().map(Sort::parse).unwrap_or_default(),
        };

        let total = self.repository.count_devices(filter).await?;
        let data = self.repository.list_devices(query).await?;

        debug!(count = data.len(), total, "listed devices");
        Ok(ListPage {
            data,
            meta: PageMeta { total },
        })
    }

    /// Get a device by ID.
    #[instrument(skip(self, request), fields(device_id = %request.device_id))]
    pub async fn get_device(&self, request: GetDeviceRequest) -> DomainResult<Device> {
        validate_struct(&request)?;

        self.repository
            .get_device(&request.device_id)
            .await?
            .ok_or_else(|| DomainError::DeviceNotFound(request.device_id.clone()))
    }

    /// Replace a device in full. Existence is asserted before any write.
    #[instrument(skip(self, request), fields(device_id = %request.device_id))]
    pub async fn update_device(&self, request: UpdateDeviceRequest) -> DomainResult<Device> {
        validate_struct(&request)?;

        let device_id = request.device_id.clone();
        self.repository
            .get_device(&device_id)
            .await?
            .ok_or_else(|| DomainError::DeviceNotFound(device_id.clone()))?;

        let device = self
            .repository
            .replace_device(UpdateDeviceRepoInput {
                device_id: request.device_id,
                uid: request.uid,
                vendor: request.vendor,
                created_at: request.created_at,
                status: request.status,
            })
            .await?
            .ok_or_else(|| DomainError::DeviceNotFound(device_id))?;

        info!(device_id = %device.device_id, "device updated");
        Ok(device)
    }

    /// Delete a device by ID, returning the deleted record.
    #[instrument(skip(self, request), fields(device_id = %request.device_id))]
    pub async fn delete_device(&self, request: DeleteDeviceRequest) -> DomainResult<Device> {
        validate_struct(&request)?;

        self.repository
            .get_device(&request.device_id)
            .await?
            .ok_or_else(|| DomainError::DeviceNotFound(request.device_id.clone()))?;

        let device = self
            .repository
            .delete_device(&request.device_id)
            .await?
            .ok_or_else(|| DomainError::DeviceNotFound(request.device_id.clone()))?;

        info!(device_id = %device.device_id, "device deleted");
        Ok(device)
    }
}
