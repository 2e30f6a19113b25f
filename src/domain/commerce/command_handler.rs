use std::sync::Arc;

use crate::domain::order::Order;
use crate::store::{EntityStore, OrderFilter, Page, StoreError};

use super::aggregate::{Commerce, CommerceId, NewCommerce};
use super::errors::CommerceError;

// ============================================================================
// Commerce Command Handler
// ============================================================================

pub struct CommerceCommandHandler {
    store: Arc<dyn EntityStore>,
}

impl CommerceCommandHandler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, new: NewCommerce) -> Result<Commerce, CommerceError> {
        new.validate()?;
        let commerce = self.store.create_commerce(&new).await?;

        tracing::info!(
            commerce_id = %commerce.id,
            max_active_orders = commerce.max_active_orders,
            "Commerce created"
        );
        Ok(commerce)
    }

    pub async fn get(&self, id: CommerceId) -> Result<Commerce, CommerceError> {
        self.store
            .find_commerce(id)
            .await?
            .ok_or(CommerceError::NotFound(id))
    }

    pub async fn list(&self) -> Result<Vec<Commerce>, CommerceError> {
        Ok(self.store.list_commerces().await?)
    }

    /// Replaces every operator field of the commerce.
    pub async fn update(&self, id: CommerceId, fields: NewCommerce) -> Result<Commerce, CommerceError> {
        fields.validate()?;
        self.get(id).await?;

        let commerce = self
            .store
            .save_commerce(&fields.into_commerce(id))
            .await
            .map_err(|e| match e {
                StoreError::NotFound => CommerceError::NotFound(id),
                other => CommerceError::Store(other),
            })?;

        tracing::info!(
            commerce_id = %id,
            active = commerce.active,
            max_active_orders = commerce.max_active_orders,
            "Commerce updated"
        );
        Ok(commerce)
    }

    /// Deletes the commerce together with all of its orders.
    pub async fn delete(&self, id: CommerceId) -> Result<(), CommerceError> {
        self.get(id).await?;

        let removed_orders = self
            .store
            .delete_orders(&OrderFilter::for_commerce(id))
            .await?;
        if !self.store.delete_commerce(id).await? {
            return Err(CommerceError::NotFound(id));
        }

        tracing::info!(commerce_id = %id, removed_orders, "Commerce deleted");
        Ok(())
    }

    pub async fn orders(&self, id: CommerceId) -> Result<Vec<Order>, CommerceError> {
        Ok(self
            .store
            .list_orders(&OrderFilter::for_commerce(id), Page::all())
            .await?)
    }
}
