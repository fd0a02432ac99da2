#![cfg(feature = "integration-tests")]

//! Requires a reachable MongoDB instance; point GRIDLINK_MONGO_URI at it.
//! Each run works in its own throwaway database.

use chrono::Utc;
use gridlink_domain::{
    CreateDeviceRepoInput, CreateGatewayRepoInput, DeviceRepository, ErrorKind, GatewayFilter,
    GatewayQuery, GatewayRepository, Sort, UpdateGatewayRepoInput,
};
use gridlink_mongo::{MongoConfig, MongoDeviceRepository, MongoGatewayRepository, MongoStore};

async fn setup() -> (MongoGatewayRepository, MongoDeviceRepository) {
    let config = MongoConfig {
        database: format!("gridlink_test_{}", xid::new()),
        ..MongoConfig::from_env()
    };
    let store = MongoStore::connect(&config).await.expect("mongo unreachable");
    (
        MongoGatewayRepository::new(store.clone()),
        MongoDeviceRepository::new(store),
    )
}

fn gateway_input(gateway_id: &str, serial_id: &str, ip: &str) -> CreateGatewayRepoInput {
    CreateGatewayRepoInput {
        gateway_id: gateway_id.to_string(),
        serial_id: serial_id.to_string(),
        name: "Test gateway".to_string(),
        ipv4_address: ip.to_string(),
        peripheral_devices: Vec::new(),
    }
}

#[tokio::test]
async fn test_gateway_document_roundtrip() {
    let (gateways, _) = setup().await;

    let created = gateways
        .create_gateway(CreateGatewayRepoInput {
            peripheral_devices: vec!["d1".to_string()],
            ..gateway_input("gw-1", "s1", "192.168.1.1")
        })
        .await
        .unwrap();
    assert!(created.created_at.is_some());

    let fetched = gateways.get_gateway("gw-1").await.unwrap().unwrap();
    assert_eq!(fetched.serial_id, "s1");
    assert_eq!(fetched.peripheral_devices, vec!["d1".to_string()]);

    let replaced = gateways
        .replace_gateway(UpdateGatewayRepoInput {
            gateway_id: "gw-1".to_string(),
            serial_id: "s1".to_string(),
            name: "Renamed".to_string(),
            ipv4_address: "10.0.0.1".to_string(),
            peripheral_devices: Vec::new(),
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(replaced.name, "Renamed");
    assert_eq!(replaced.created_at, fetched.created_at);
    assert!(replaced.peripheral_devices.is_empty());

    let deleted = gateways.delete_gateway("gw-1").await.unwrap().unwrap();
    assert_eq!(deleted.name, "Renamed");
    assert!(gateways.get_gateway("gw-1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_serial_id_is_rejected_by_the_index() {
    let (gateways, _) = setup().await;

    gateways
        .create_gateway(gateway_input("gw-1", "dup", "10.0.0.1"))
        .await
        .unwrap();
    let error = gateways
        .create_gateway(gateway_input("gw-2", "dup", "10.0.0.2"))
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn test_ip_fragment_filter_and_count() {
    let (gateways, _) = setup().await;

    for (id, serial, ip) in [
        ("gw-1", "s1", "192.168.1.1"),
        ("gw-2", "s2", "192.168.2.2"),
        ("gw-3", "s3", "10.0.0.1"),
    ] {
        gateways
            .create_gateway(gateway_input(id, serial, ip))
            .await
            .unwrap();
    }

    let filter = GatewayFilter {
        ipv4_address: Some("192.168".to_string()),
        ..Default::default()
    };
    assert_eq!(gateways.count_gateways(filter.clone()).await.unwrap(), 2);

    let records = gateways
        .list_gateways(GatewayQuery {
            filter,
            sort: Sort::parse("serialId"),
            ..Default::default()
        })
        .await
        .unwrap();
    let serials: Vec<&str> = records.iter().map(|r| r.serial_id.as_str()).collect();
    assert_eq!(serials, ["s1", "s2"]);
}

#[tokio::test]
async fn test_batched_device_lookup_omits_missing_ids() {
    let (_, devices) = setup().await;

    devices
        .create_device(CreateDeviceRepoInput {
            device_id: "d1".to_string(),
            uid: 1,
            vendor: "acme".to_string(),
            created_at: Utc::now(),
            status: "online".to_string(),
        })
        .await
        .unwrap();

    let found = devices
        .list_devices_by_ids(&["d1".to_string(), "ghost".to_string()])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].device_id, "d1");
}
