use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::device::Device;
use crate::error::DomainResult;
use crate::query::{PageRequest, Sort};

/// Upper bound on the device fan-out of a single gateway.
pub const MAX_PERIPHERAL_DEVICES: usize = 10;

/// Stored form of a gateway: peripheral devices held as referenced ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayRecord {
    pub gateway_id: String,
    pub serial_id: String,
    pub name: String,
    pub ipv4_address: String,
    pub peripheral_devices: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Read-path form of a gateway: references resolved to full device records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gateway {
    pub gateway_id: String,
    pub serial_id: String,
    pub name: String,
    pub ipv4_address: String,
    pub peripheral_devices: Vec<Device>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Repository input for creating a gateway, with the service-generated ID.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateGatewayRepoInput {
    pub gateway_id: String,
    pub serial_id: String,
    pub name: String,
    pub ipv4_address: String,
    pub peripheral_devices: Vec<String>,
}

/// Full-replacement repository input for updating a gateway. `created_at`
/// is preserved by the store; `updated_at` is refreshed.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateGatewayRepoInput {
    pub gateway_id: String,
    pub serial_id: String,
    pub name: String,
    pub ipv4_address: String,
    pub peripheral_devices: Vec<String>,
}

/// Filters for gateway listings. `serial_id` and `name` match exactly;
/// `ipv4_address` matches as a substring so partial queries like "192.168"
/// bring back every gateway on that network.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayFilter {
    pub serial_id: Option<String>,
    pub name: Option<String>,
    pub ipv4_address: Option<String>,
}

/// Filter, pagination and ordering for a gateway listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayQuery {
    pub filter: GatewayFilter,
    pub page: PageRequest,
    pub sort: Sort,
}

/// Repository trait for gateway persistence operations.
/// The storage layer implements this trait; `serial_id` uniqueness is
/// enforced by the store.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait GatewayRepository: Send + Sync {
    /// Insert a new gateway document.
    async fn create_gateway(&self, input: CreateGatewayRepoInput) -> DomainResult<GatewayRecord>;

    /// List gateways matching the query filters, paginated and sorted.
    async fn list_gateways(&self, query: GatewayQuery) -> DomainResult<Vec<GatewayRecord>>;

    /// Count gateways matching the filters, ignoring pagination.
    async fn count_gateways(&self, filter: GatewayFilter) -> DomainResult<u64>;

    /// Get a gateway by ID.
    async fn get_gateway(&self, gateway_id: &str) -> DomainResult<Option<GatewayRecord>>;

    /// Replace a gateway document in full. Returns `None` when no document
    /// has the given ID, so a lookup-then-replace race degrades to a
    /// not-found outcome instead of an error.
    async fn replace_gateway(
        &self,
        input: UpdateGatewayRepoInput,
    ) -> DomainResult<Option<GatewayRecord>>;

    /// Delete a gateway by ID, returning the deleted document.
    async fn delete_gateway(&self, gateway_id: &str) -> DomainResult<Option<GatewayRecord>>;
}
