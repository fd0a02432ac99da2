//! In-memory repository implementations backing tests and store-less
//! embeddings. They honor the full trait contract: filtering, sorting,
//! pagination and uniqueness conflicts.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::device::{
    CreateDeviceRepoInput, Device, DeviceFilter, DeviceQuery, DeviceRepository,
    UpdateDeviceRepoInput,
};
use crate::error::{DomainError, DomainResult};
use crate::gateway::{
    CreateGatewayRepoInput, GatewayFilter, GatewayQuery, GatewayRecord, GatewayRepository,
    UpdateGatewayRepoInput,
};
use crate::query::{PageRequest, Sort};

#[derive(Default)]
pub struct InMemoryDeviceRepository {
    devices: RwLock<Vec<Device>>,
}

impl InMemoryDeviceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceRepository for InMemoryDeviceRepository {
    async fn create_device(&self, input: CreateDeviceRepoInput) -> DomainResult<Device> {
        let mut devices = self.devices.write();
        if devices.iter().any(|device| device.uid == input.uid) {
            return Err(DomainError::DeviceAlreadyExists(input.uid.to_string()));
        }

        let device = Device {
            device_id: input.device_id,
            uid: input.uid,
            vendor: input.vendor,
            created_at: input.created_at,
            status: input.status,
        };
        devices.push(device.clone());
        Ok(device)
    }

    async fn list_devices(&self, query: DeviceQuery) -> DomainResult<Vec<Device>> {
        let mut matching: Vec<Device> = self
            .devices
            .read()
            .iter()
            .filter(|device| matches_device(device, &query.filter))
            .cloned()
            .collect();

        sort_devices(&mut matching, &query.sort);
        Ok(paginate(matching, &query.page))
    }

    async fn count_devices(&self, filter: DeviceFilter) -> DomainResult<u64> {
        let count = self
            .devices
            .read()
            .iter()
            .filter(|device| matches_device(device, &filter))
            .count();
        Ok(count as u64)
    }

    async fn get_device(&self, device_id: &str) -> DomainResult<Option<Device>> {
        Ok(self
            .devices
            .read()
            .iter()
            .find(|device| device.device_id == device_id)
            .cloned())
    }

    async fn list_devices_by_ids(&self, device_ids: &[String]) -> DomainResult<Vec<Device>> {
        Ok(self
            .devices
            .read()
            .iter()
            .filter(|device| device_ids.contains(&device.device_id))
            .cloned()
            .collect())
    }

    async fn replace_device(&self, input: UpdateDeviceRepoInput) -> DomainResult<Option<Device>> {
        let mut devices = self.devices.write();

        let conflict = devices
            .iter()
            .any(|device| device.uid == input.uid && device.device_id != input.device_id);
        if conflict {
            return Err(DomainError::DeviceAlreadyExists(input.uid.to_string()));
        }

        let Some(existing) = devices
            .iter_mut()
            .find(|device| device.device_id == input.device_id)
        else {
            return Ok(None);
        };

        existing.uid = input.uid;
        existing.vendor = input.vendor;
        existing.created_at = input.created_at;
        existing.status = input.status;
        Ok(Some(existing.clone()))
    }

    async fn delete_device(&self, device_id: &str) -> DomainResult<Option<Device>> {
        let mut devices = self.devices.write();
        let position = devices
            .iter()
            .position(|device| device.device_id == device_id);
        Ok(position.map(|index| devices.remove(index)))
    }
}

#[derive(Default)]
pub struct InMemoryGatewayRepository {
    gateways: RwLock<Vec<GatewayRecord>>,
}

impl InMemoryGatewayRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GatewayRepository for InMemoryGatewayRepository {
    async fn create_gateway(&self, input: CreateGatewayRepoInput) -> DomainResult<GatewayRecord> {
        let mut gateways = self.gateways.write();
        if gateways
            .iter()
            .any(|gateway| gateway.serial_id == input.serial_id)
        {
            return Err(DomainError::GatewayAlreadyExists(input.serial_id));
        }

        let now = Utc::now();
        let record = GatewayRecord {
            gateway_id: input.gateway_id,
            serial_id: input.serial_id,
            name: input.name,
            ipv4_address: input.ipv4_address,
            peripheral_devices: input.peripheral_devices,
            created_at: Some(now),
            updated_at: Some(now),
        };
        gateways.push(record.clone());
        Ok(record)
    }

    async fn list_gateways(&self, query: GatewayQuery) -> DomainResult<Vec<GatewayRecord>> {
        let mut matching: Vec<GatewayRecord> = self
            .gateways
            .read()
            .iter()
            .filter(|gateway| matches_gateway(gateway, &query.filter))
            .cloned()
            .collect();

        sort_gateways(&mut matching, &query.sort);
        Ok(paginate(matching, &query.page))
    }

    async fn count_gateways(&self, filter: GatewayFilter) -> DomainResult<u64> {
        let count = self
            .gateways
            .read()
            .iter()
            .filter(|gateway| matches_gateway(gateway, &filter))
            .count();
        Ok(count as u64)
    }

    async fn get_gateway(&self, gateway_id: &str) -> DomainResult<Option<GatewayRecord>> {
        Ok(self
            .gateways
            .read()
            .iter()
            .find(|gateway| gateway.gateway_id == gateway_id)
            .cloned())
    }

    async fn replace_gateway(
        &self,
        input: UpdateGatewayRepoInput,
    ) -> DomainResult<Option<GatewayRecord>> {
        let mut gateways = self.gateways.write();

        let conflict = gateways.iter().any(|gateway| {
            gateway.serial_id == input.serial_id && gateway.gateway_id != input.gateway_id
        });
        if conflict {
            return Err(DomainError::GatewayAlreadyExists(input.serial_id));
        }

        let Some(existing) = gateways
            .iter_mut()
            .find(|gateway| gateway.gateway_id == input.gateway_id)
        else {
            return Ok(None);
        };

        existing.serial_id = input.serial_id;
        existing.name = input.name;
        existing.ipv4_address = input.ipv4_address;
        existing.peripheral_devices = input.peripheral_devices;
        existing.updated_at = Some(Utc::now());
        Ok(Some(existing.clone()))
    }

    async fn delete_gateway(&self, gateway_id: &str) -> DomainResult<Option<GatewayRecord>> {
        let mut gateways = self.gateways.write();
        let position = gateways
            .iter()
            .position(|gateway| gateway.gateway_id == gateway_id);
        Ok(position.map(|index| gateways.remove(index)))
    }
}

fn matches_device(device: &Device, filter: &DeviceFilter) -> bool {
    if let Some(uid) = filter.uid {
        if device.uid != uid {
            return false;
        }
    }
    if let Some(vendor) = &filter.vendor {
        if &device.vendor != vendor {
            return false;
        }
    }
    if let Some(status) = &filter.status {
        if &device.status != status {
            return false;
        }
    }
    true
}

fn matches_gateway(gateway: &GatewayRecord, filter: &GatewayFilter) -> bool {
    if let Some(serial_id) = &filter.serial_id {
        if &gateway.serial_id != serial_id {
            return false;
        }
    }
    if let Some(name) = &filter.name {
        if &gateway.name != name {
            return false;
        }
    }
    if let Some(fragment) = &filter.ipv4_address {
        if !gateway.ipv4_address.contains(fragment.as_str()) {
            return false;
        }
    }
    true
}

fn sort_devices(devices: &mut [Device], sort: &Sort) {
    match sort.field.as_str() {
        "uid" => devices.sort_by_key(|device| device.uid),
        "vendor" => devices.sort_by(|a, b| a.vendor.cmp(&b.vendor)),
        "status" => devices.sort_by(|a, b| a.status.cmp(&b.status)),
        // unknown sort fields fall back to creation time
        _ => devices.sort_by_key(|device| device.created_at),
    }
    if sort.descending {
        devices.reverse();
    }
}

fn sort_gateways(gateways: &mut [GatewayRecord], sort: &Sort) {
    match sort.field.as_str() {
        "serialId" => gateways.sort_by(|a, b| a.serial_id.cmp(&b.serial_id)),
        "name" => gateways.sort_by(|a, b| a.name.cmp(&b.name)),
        "ipv4Address" => gateways.sort_by(|a, b| a.ipv4_address.cmp(&b.ipv4_address)),
        "updatedAt" => gateways.sort_by_key(|gateway| gateway.updated_at),
        // unknown sort fields fall back to creation time
        _ => gateways.sort_by_key(|gateway| gateway.created_at),
    }
    if sort.descending {
        gateways.reverse();
    }
}

fn paginate<T>(items: Vec<T>, page: &PageRequest) -> Vec<T> {
    let iter = items.into_iter().skip(page.skip() as usize);
    match page.limit {
        Some(limit) => iter.take(limit as usize).collect(),
        None => iter.collect(),
    }
}
