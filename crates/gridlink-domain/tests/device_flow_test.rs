use std::sync::Arc;

use chrono::{TimeZone, Utc};
use gridlink_domain::{
    CreateDeviceRequest, DeleteDeviceRequest, DeviceService, ErrorKind, GetDeviceRequest,
    InMemoryDeviceRepository, ListDevicesRequest, UpdateDeviceRequest,
};

fn service() -> DeviceService {
    DeviceService::new(Arc::new(InMemoryDeviceRepository::new()))
}

fn create_request(uid: i64, status: &str) -> CreateDeviceRequest {
    CreateDeviceRequest {
        uid,
        vendor: "acme".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, uid as u32).unwrap(),
        status: status.to_string(),
    }
}

#[tokio::test]
async fn test_device_crud_roundtrip() {
    let devices = service();

    let created = devices.create_device(create_request(1, "online")).await.unwrap();
    assert_eq!(created.uid, 1);

    let fetched = devices
        .get_device(GetDeviceRequest {
            device_id: created.device_id.clone(),
        })
        .await
        .unwrap();
    assert_eq!(fetched, created);

    let updated = devices
        .update_device(UpdateDeviceRequest {
            device_id: created.device_id.clone(),
            uid: 1,
            vendor: "globex".to_string(),
            created_at: created.created_at,
            status: "offline".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(updated.vendor, "globex");
    assert_eq!(updated.status, "offline");

    let deleted = devices
        .delete_device(DeleteDeviceRequest {
            device_id: created.device_id.clone(),
        })
        .await
        .unwrap();
    assert_eq!(deleted.status, "offline");

    let error = devices
        .get_device(GetDeviceRequest {
            device_id: created.device_id.clone(),
        })
        .await
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        format!("Device with id: {} not found!", created.device_id)
    );
}

#[tokio::test]
async fn test_duplicate_uid_is_a_conflict() {
    let devices = service();
    devices.create_device(create_request(7, "online")).await.unwrap();

    let error = devices
        .create_device(create_request(7, "offline"))
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn test_list_without_limit_returns_everything() {
    let devices = service();
    for uid in 1..=3 {
        devices.create_device(create_request(uid, "online")).await.unwrap();
    }

    // No limit means no slicing, whatever the page says.
    let page = devices
        .list_devices(ListDevicesRequest {
            page: Some(5),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.data.len(), 3);
    assert_eq!(page.meta.total, 3);
}

#[tokio::test]
async fn test_list_filters_and_counts_by_status() {
    let devices = service();
    devices.create_device(create_request(1, "online")).await.unwrap();
    devices.create_device(create_request(2, "offline")).await.unwrap();
    devices.create_device(create_request(3, "online")).await.unwrap();

    let page = devices
        .list_devices(ListDevicesRequest {
            status: Some("online".to_string()),
            sort: Some("uid".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.meta.total, 2);
    let uids: Vec<i64> = page.data.iter().map(|device| device.uid).collect();
    assert_eq!(uids, [1, 3]);
}
