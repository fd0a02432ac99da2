mod client;
mod config;
mod device_repository;
mod gateway_repository;
mod models;

pub use client::MongoStore;
pub use config::MongoConfig;
pub use device_repository::MongoDeviceRepository;
pub use gateway_repository::MongoGatewayRepository;
