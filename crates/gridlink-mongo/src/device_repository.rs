use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use tracing::debug;

use gridlink_domain::{
    CreateDeviceRepoInput, Device, DeviceFilter, DeviceQuery, DeviceRepository, DomainError,
    DomainResult, UpdateDeviceRepoInput,
};

use crate::client::{is_duplicate_key, MongoStore};
use crate::models::{device_filter_doc, sort_doc, DeviceDocument};

#[derive(Clone)]
pub struct MongoDeviceRepository {
    store: MongoStore,
}

impl MongoDeviceRepository {
    pub fn new(store: MongoStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DeviceRepository for MongoDeviceRepository {
    async fn create_device(&self, input: CreateDeviceRepoInput) -> DomainResult<Device> {
        debug!(device_id = %input.device_id, "inserting device");

        let document = DeviceDocument::from(input);
        if let Err(error) = self.store.devices().insert_one(&document, None).await {
            if is_duplicate_key(&error) {
                return Err(DomainError::DeviceAlreadyExists(document.uid.to_string()));
            }
            return Err(DomainError::RepositoryError(error.into()));
        }

        Ok(document.into())
    }

    async fn list_devices(&self, query: DeviceQuery) -> DomainResult<Vec<Device>> {
        let options = FindOptions::builder()
            .skip(query.page.skip())
            .limit(query.page.limit.map(|limit| limit as i64))
            .sort(sort_doc(&query.sort))
            .build();

        let cursor = self
            .store
            .devices()
            .find(device_filter_doc(&query.filter), options)
            .await
            .map_err(|error| DomainError::RepositoryError(error.into()))?;
        let documents: Vec<DeviceDocument> = cursor
            .try_collect()
            .await
            .map_err(|error| DomainError::RepositoryError(error.into()))?;

        Ok(documents.into_iter().map(Device::from).collect())
    }

    async fn count_devices(&self, filter: DeviceFilter) -> DomainResult<u64> {
        self.store
            .devices()
            .count_documents(device_filter_doc(&filter), None)
            .await
            .map_err(|error| DomainError::RepositoryError(error.into()))
    }

    async fn get_device(&self, device_id: &str) -> DomainResult<Option<Device>> {
        let document = self
            .store
            .devices()
            .find_one(doc! { "_id": device_id }, None)
            .await
            .map_err(|error| DomainError::RepositoryError(error.into()))?;
        Ok(document.map(Device::from))
    }

    async fn list_devices_by_ids(&self, device_ids: &[String]) -> DomainResult<Vec<Device>> {
        if device_ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self
            .store
            .devices()
            .find(doc! { "_id": { "$in": device_ids.to_vec() } }, None)
            .await
            .map_err(|error| DomainError::RepositoryError(error.into()))?;
        let documents: Vec<DeviceDocument> = cursor
            .try_collect()
            .await
            .map_err(|error| DomainError::RepositoryError(error.into()))?;

        Ok(documents.into_iter().map(Device::from).collect())
    }

    async fn replace_device(&self, input: UpdateDeviceRepoInput) -> DomainResult<Option<Device>> {
        debug!(device_id = %input.device_id, "replacing device");

        let update = doc! {
            "$set": {
                "uid": input.uid,
                "vendor": input.vendor.clone(),
                "createdAt": mongodb::bson::DateTime::from_chrono(input.created_at),
                "status": input.status.clone(),
            }
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let document = self
            .store
            .devices()
            .find_one_and_update(doc! { "_id": input.device_id.clone() }, update, options)
            .await
            .map_err(|error| {
                if is_duplicate_key(&error) {
                    DomainError::DeviceAlreadyExists(input.uid.to_string())
                } else {
                    DomainError::RepositoryError(error.into())
                }
            })?;

        Ok(document.map(Device::from))
    }

    async fn delete_device(&self, device_id: &str) -> DomainResult<Option<Device>> {
        debug!(device_id = %device_id, "deleting device");

        let document = self
            .store
            .devices()
            .find_one_and_delete(doc! { "_id": device_id }, None)
            .await
            .map_err(|error| DomainError::RepositoryError(error.into()))?;
        Ok(document.map(Device::from))
    }
}
