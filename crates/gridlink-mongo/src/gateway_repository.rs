use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use tracing::debug;

use gridlink_domain::{
    CreateGatewayRepoInput, DomainError, DomainResult, GatewayFilter, GatewayQuery, GatewayRecord,
    GatewayRepository, UpdateGatewayRepoInput,
};

use crate::client::{is_duplicate_key, MongoStore};
use crate::models::{gateway_filter_doc, sort_doc, GatewayDocument};

#[derive(Clone)]
pub struct MongoGatewayRepository {
    store: MongoStore,
}

impl MongoGatewayRepository {
    pub fn new(store: MongoStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl GatewayRepository for MongoGatewayRepository {
    async fn create_gateway(&self, input: CreateGatewayRepoInput) -> DomainResult<GatewayRecord> {
        debug!(gateway_id = %input.gateway_id, "inserting gateway");

        let document = GatewayDocument::new(input, Utc::now());
        if let Err(error) = self.store.gateways().insert_one(&document, None).await {
            if is_duplicate_key(&error) {
                return Err(DomainError::GatewayAlreadyExists(document.serial_id));
            }
            return Err(DomainError::RepositoryError(error.into()));
        }

        Ok(document.into())
    }

    async fn list_gateways(&self, query: GatewayQuery) -> DomainResult<Vec<GatewayRecord>> {
        let options = FindOptions::builder()
            .skip(query.page.skip())
            .limit(query.page.limit.map(|limit| limit as i64))
            .sort(sort_doc(&query.sort))
            .build();

        let cursor = self
            .store
            .gateways()
            .find(gateway_filter_doc(&query.filter), options)
            .await
            .map_err(|error| DomainError::RepositoryError(error.into()))?;
        let documents: Vec<GatewayDocument> = cursor
            .try_collect()
            .await
            .map_err(|error| DomainError::RepositoryError(error.into()))?;

        Ok(documents.into_iter().map(GatewayRecord::from).collect())
    }

    async fn count_gateways(&self, filter: GatewayFilter) -> DomainResult<u64> {
        self.store
            .gateways()
            .count_documents(gateway_filter_doc(&filter), None)
            .await
            .map_err(|error| DomainError::RepositoryError(error.into()))
    }

    async fn get_gateway(&self, gateway_id: &str) -> DomainResult<Option<GatewayRecord>> {
        let document = self
            .store
            .gateways()
            .find_one(doc! { "_id": gateway_id }, None)
            .await
            .map_err(|error| DomainError::RepositoryError(error.into()))?;
        Ok(document.map(GatewayRecord::from))
    }

    async fn replace_gateway(
        &self,
        input: UpdateGatewayRepoInput,
    ) -> DomainResult<Option<GatewayRecord>> {
        debug!(gateway_id = %input.gateway_id, "replacing gateway");

        // createdAt is preserved; only the replaceable fields and the
        // update timestamp are written.
        let update = doc! {
            "$set": {
                "serialId": input.serial_id.clone(),
                "name": input.name.clone(),
                "ipv4Address": input.ipv4_address.clone(),
                "peripheralDevices": input.peripheral_devices.clone(),
                "updatedAt": mongodb::bson::DateTime::from_chrono(Utc::now()),
            }
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let document = self
            .store
            .gateways()
            .find_one_and_update(doc! { "_id": input.gateway_id.clone() }, update, options)
            .await
            .map_err(|error| {
                if is_duplicate_key(&error) {
                    DomainError::GatewayAlreadyExists(input.serial_id.clone())
                } else {
                    DomainError::RepositoryError(error.into())
                }
            })?;

        Ok(document.map(GatewayRecord::from))
    }

    async fn delete_gateway(&self, gateway_id: &str) -> DomainResult<Option<GatewayRecord>> {
        debug!(gateway_id = %gateway_id, "deleting gateway");

        let document = self
            .store
            .gateways()
            .find_one_and_delete(doc! { "_id": gateway_id }, None)
            .await
            .map_err(|error| DomainError::RepositoryError(error.into()))?;
        Ok(document.map(GatewayRecord::from))
    }
}
