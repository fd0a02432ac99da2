use chrono::{DateTime, Utc};
use mongodb::bson::{Document, Regex};
use serde::{Deserialize, Serialize};

use gridlink_domain::{
    CreateDeviceRepoInput, CreateGatewayRepoInput, Device, DeviceFilter, GatewayFilter,
    GatewayRecord, Sort,
};

/// Device document as stored in the `devices` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDocument {
    #[serde(rename = "_id")]
    pub device_id: String,
    pub uid: i64,
    pub vendor: String,
    #[serde(
        rename = "createdAt",
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub created_at: DateTime<Utc>,
    pub status: String,
}

impl From<CreateDeviceRepoInput> for DeviceDocument {
    fn from(input: CreateDeviceRepoInput) -> Self {
        Self {
            device_id: input.device_id,
            uid: input.uid,
            vendor: input.vendor,
            created_at: input.created_at,
            status: input.status,
        }
    }
}

impl From<DeviceDocument> for Device {
    fn from(document: DeviceDocument) -> Self {
        Self {
            device_id: document.device_id,
            uid: document.uid,
            vendor: document.vendor,
            created_at: document.created_at,
            status: document.status,
        }
    }
}

/// Gateway document as stored in the `gateways` collection. Peripheral
/// devices are held as referenced device ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayDocument {
    #[serde(rename = "_id")]
    pub gateway_id: String,
    #[serde(rename = "serialId")]
    pub serial_id: String,
    pub name: String,
    #[serde(rename = "ipv4Address")]
    pub ipv4_address: String,
    #[serde(rename = "peripheralDevices", default)]
    pub peripheral_devices: Vec<String>,
    #[serde(
        rename = "createdAt",
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename = "updatedAt",
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub updated_at: DateTime<Utc>,
}

impl GatewayDocument {
    pub fn new(input: CreateGatewayRepoInput, now: DateTime<Utc>) -> Self {
        Self {
            gateway_id: input.gateway_id,
            serial_id: input.serial_id,
            name: input.name,
            ipv4_address: input.ipv4_address,
            peripheral_devices: input.peripheral_devices,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<GatewayDocument> for GatewayRecord {
    fn from(document: GatewayDocument) -> Self {
        Self {
            gateway_id: document.gateway_id,
            serial_id: document.serial_id,
            name: document.name,
            ipv4_address: document.ipv4_address,
            peripheral_devices: document.peripheral_devices,
            created_at: Some(document.created_at),
            updated_at: Some(document.updated_at),
        }
    }
}

pub(crate) fn device_filter_doc(filter: &DeviceFilter) -> Document {
    let mut document = Document::new();
    if let Some(uid) = filter.uid {
        document.insert("uid", uid);
    }
    if let Some(vendor) = &filter.vendor {
        document.insert("vendor", vendor.clone());
    }
    if let Some(status) = &filter.status {
        document.insert("status", status.clone());
    }
    document
}

pub(crate) fn gateway_filter_doc(filter: &GatewayFilter) -> Document {
    let mut document = Document::new();
    if let Some(serial_id) = &filter.serial_id {
        document.insert("serialId", serial_id.clone());
    }
    if let Some(name) = &filter.name {
        document.insert("name", name.clone());
    }
    if let Some(fragment) = &filter.ipv4_address {
        document.insert(
            "ipv4Address",
            Regex {
                pattern: escape_regex(fragment),
                options: String::new(),
            },
        );
    }
    document
}

pub(crate) fn sort_doc(sort: &Sort) -> Document {
    let mut document = Document::new();
    document.insert(sort.field.clone(), if sort.descending { -1 } else { 1 });
    document
}

/// Escape regex metacharacters so substring filters match literally.
fn escape_regex(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for ch in fragment.chars() {
        if "\\.+*?()|[]{}^$".contains(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
