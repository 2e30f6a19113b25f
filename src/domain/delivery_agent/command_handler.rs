use std::sync::Arc;

use crate::domain::order::Order;
use crate::store::{EntityStore, OrderFilter, Page, StoreError};

use super::aggregate::{DeliveryAgent, DeliveryAgentId, NewDeliveryAgent};
use super::errors::DeliveryAgentError;

// ============================================================================
// Delivery Agent Command Handler
// ============================================================================

pub struct DeliveryAgentCommandHandler {
    store: Arc<dyn EntityStore>,
}

impl DeliveryAgentCommandHandler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, new: NewDeliveryAgent) -> Result<DeliveryAgent, DeliveryAgentError> {
        new.validate()?;
        let agent = self.store.create_delivery_agent(&new).await?;
        tracing::info!(
            delivery_agent_id = %agent.id,
            transport = %agent.transport,
            "Delivery agent created"
        );
        Ok(agent)
    }

    pub async fn get(&self, id: DeliveryAgentId) -> Result<DeliveryAgent, DeliveryAgentError> {
        self.store
            .find_delivery_agent(id)
            .await?
            .ok_or(DeliveryAgentError::NotFound(id))
    }

    pub async fn list(&self) -> Result<Vec<DeliveryAgent>, DeliveryAgentError> {
        Ok(self.store.list_delivery_agents().await?)
    }

    pub async fn update(
        &self,
        id: DeliveryAgentId,
        fields: NewDeliveryAgent,
    ) -> Result<DeliveryAgent, DeliveryAgentError> {
        fields.validate()?;
        self.get(id).await?;

        let agent = self
            .store
            .save_delivery_agent(&fields.into_delivery_agent(id))
            .await
            .map_err(|e| match e {
                StoreError::NotFound => DeliveryAgentError::NotFound(id),
                other => DeliveryAgentError::Store(other),
            })?;

        tracing::info!(delivery_agent_id = %id, active = agent.active, "Delivery agent updated");
        Ok(agent)
    }

    /// Removes the agent only. Orders keep their reference.
    pub async fn delete(&self, id: DeliveryAgentId) -> Result<(), DeliveryAgentError> {
        if !self.store.delete_delivery_agent(id).await? {
            return Err(DeliveryAgentError::NotFound(id));
        }
        tracing::info!(delivery_agent_id = %id, "Delivery agent deleted");
        Ok(())
    }

    pub async fn orders(&self, id: DeliveryAgentId) -> Result<Vec<Order>, DeliveryAgentError> {
        Ok(self
            .store
            .list_orders(&OrderFilter::for_delivery_agent(id), Page::all())
            .await?)
    }
}
