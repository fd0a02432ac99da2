use anyhow::Result;
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};

use crate::config::MongoConfig;
use crate::models::{DeviceDocument, GatewayDocument};

pub(crate) const GATEWAYS_COLLECTION: &str = "gateways";
pub(crate) const DEVICES_COLLECTION: &str = "devices";

/// Shared handle to the gridlink database. Cheap to clone.
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connect to the configured database and ensure the unique indexes
    /// the schema relies on before handing out collections.
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        let options = ClientOptions::parse(&config.uri).await?;
        let client = Client::with_options(options)?;
        let database = client.database(&config.database);

        let store = Self { database };
        store.ensure_indexes().await?;
        Ok(store)
    }

    pub(crate) fn gateways(&self) -> Collection<GatewayDocument> {
        self.database.collection(GATEWAYS_COLLECTION)
    }

    pub(crate) fn devices(&self) -> Collection<DeviceDocument> {
        self.database.collection(DEVICES_COLLECTION)
    }

    async fn ensure_indexes(&self) -> Result<()> {
        let serial_index = IndexModel::builder()
            .keys(doc! { "serialId": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name(Some("uniq_serial_id".to_string()))
                    .build(),
            )
            .build();
        self.gateways()
            .create_index(serial_index, None::<mongodb::options::CreateIndexOptions>)
            .await?;

        let uid_index = IndexModel::builder()
            .keys(doc! { "uid": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name(Some("uniq_uid".to_string()))
                    .build(),
            )
            .build();
        self.devices()
            .create_index(uid_index, None::<mongodb::options::CreateIndexOptions>)
            .await?;

        Ok(())
    }
}

/// A duplicate-key write against one of the unique indexes.
pub(crate) fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    match error.kind.as_ref() {
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(write_error)) => {
            write_error.code == 11000
        }
        mongodb::error::ErrorKind::Command(command_error) => command_error.code == 11000,
        _ => false,
    }
}
