use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::DomainResult;
use crate::query::{PageRequest, Sort};

/// Domain representation of a peripheral device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    pub device_id: String,
    pub uid: i64,
    pub vendor: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
}

/// Repository input for creating a device, with the service-generated ID.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateDeviceRepoInput {
    pub device_id: String,
    pub uid: i64,
    pub vendor: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
}

/// Full-replacement repository input for updating a device.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateDeviceRepoInput {
    pub device_id: String,
    pub uid: i64,
    pub vendor: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
}

/// Equality filters for device listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceFilter {
    pub uid: Option<i64>,
    pub vendor: Option<String>,
    pub status: Option<String>,
}

/// Filter, pagination and ordering for a device listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceQuery {
    pub filter: DeviceFilter,
    pub page: PageRequest,
    pub sort: Sort,
}

/// Repository trait for device persistence operations.
/// The storage layer implements this trait; `uid` uniqueness is enforced
/// by the store.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Insert a new device document.
    async fn create_device(&self, input: CreateDeviceRepoInput) -> DomainResult<Device>;

    /// List devices matching the query filters, paginated and sorted.
    async fn list_devices(&self, query: DeviceQuery) -> DomainResult<Vec<Device>>;

    /// Count devices matching the filters, ignoring pagination.
    async fn count_devices(&self, filter: DeviceFilter) -> DomainResult<u64>;

    /// Get a device by ID.
    async fn get_device(&self, device_id: &str) -> DomainResult<Option<Device>>;

    /// Batch lookup backing reference resolution. Missing ids are omitted
    /// from the result; order is unspecified.
    async fn list_devices_by_ids(&self, device_ids: &[String]) -> DomainResult<Vec<Device>>;

    /// Replace a device document in full. Returns `None` when no document
    /// has the given ID.
    async fn replace_device(&self, input: UpdateDeviceRepoInput) -> DomainResult<Option<Device>>;

    /// Delete a device by ID, returning the deleted document.
    async fn delete_device(&self, device_id: &str) -> DomainResult<Option<Device>>;
}
