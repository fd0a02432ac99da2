pub mod device;
pub mod device_service;
pub mod error;
pub mod gateway;
pub mod gateway_service;
pub mod in_memory;
pub mod query;
pub mod validate;

pub use device::{
    CreateDeviceRepoInput, Device, DeviceFilter, DeviceQuery, DeviceRepository,
    UpdateDeviceRepoInput,
};
pub use device_service::{
    CreateDeviceRequest, DeleteDeviceRequest, DeviceService, GetDeviceRequest, ListDevicesRequest,
    UpdateDeviceRequest,
};
pub use error::{DomainError, DomainResult, ErrorKind};
pub use gateway::{
    CreateGatewayRepoInput, Gateway, GatewayFilter, GatewayQuery, GatewayRecord,
    GatewayRepository, UpdateGatewayRepoInput, MAX_PERIPHERAL_DEVICES,
};
pub use gateway_service::{
    CreateGatewayRequest, DeleteGatewayRequest, GatewayService, GetGatewayRequest,
    ListGatewaysRequest, UpdateGatewayRequest,
};
pub use in_memory::{InMemoryDeviceRepository, InMemoryGatewayRepository};
pub use query::{ListPage, PageMeta, PageRequest, Sort};
pub use validate::is_valid_ipv4;

#[cfg(any(test, feature = "testing"))]
pub use device::MockDeviceRepository;
#[cfg(any(test, feature = "testing"))]
pub use gateway::MockGatewayRepository;
