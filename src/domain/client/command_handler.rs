use std::sync::Arc;

use crate::domain::order::Order;
use crate::store::{EntityStore, OrderFilter, Page, StoreError};

use super::aggregate::{Client, ClientId, NewClient};
use super::errors::ClientError;

// ============================================================================
// Client Command Handler
// ============================================================================

pub struct ClientCommandHandler {
    store: Arc<dyn EntityStore>,
}

impl ClientCommandHandler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, new: NewClient) -> Result<Client, ClientError> {
        new.validate()?;
        let client = self.store.create_client(&new).await?;
        tracing::info!(client_id = %client.id, "Client created");
        Ok(client)
    }

    pub async fn get(&self, id: ClientId) -> Result<Client, ClientError> {
        self.store.find_client(id).await?.ok_or(ClientError::NotFound(id))
    }

    pub async fn list(&self) -> Result<Vec<Client>, ClientError> {
        Ok(self.store.list_clients().await?)
    }

    pub async fn update(&self, id: ClientId, fields: NewClient) -> Result<Client, ClientError> {
        fields.validate()?;
        self.get(id).await?;

        let client = self
            .store
            .save_client(&fields.into_client(id))
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ClientError::NotFound(id),
                other => ClientError::Store(other),
            })?;

        tracing::info!(client_id = %id, "Client updated");
        Ok(client)
    }

    /// Deletes the client together with all of its orders.
    pub async fn delete(&self, id: ClientId) -> Result<(), ClientError> {
        self.get(id).await?;

        let removed_orders = self
            .store
            .delete_orders(&OrderFilter::for_client(id))
            .await?;
        if !self.store.delete_client(id).await? {
            return Err(ClientError::NotFound(id));
        }

        tracing::info!(client_id = %id, removed_orders, "Client deleted");
        Ok(())
    }

    pub async fn orders(&self, id: ClientId) -> Result<Vec<Order>, ClientError> {
        Ok(self
            .store
            .list_orders(&OrderFilter::for_client(id), Page::all())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn handler() -> ClientCommandHandler {
        ClientCommandHandler::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let handler = handler();
        handler.create(NewClient::new("Ana", "Calle 1")).await.unwrap();
        handler.create(NewClient::new("Luis", "Calle 2")).await.unwrap();

        let clients = handler.list().await.unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].name, "Ana");
    }

    #[tokio::test]
    async fn test_create_requires_address() {
        let result = handler().create(NewClient::new("Ana", "")).await;
        assert!(matches!(result, Err(ClientError::EmptyAddress)));
    }

    #[tokio::test]
    async fn test_update_and_get() {
        let handler = handler();
        let client = handler.create(NewClient::new("Ana", "Calle 1")).await.unwrap();
        handler
            .update(client.id, NewClient::new("Ana María", "Calle 9"))
            .await
            .unwrap();

        let fetched = handler.get(client.id).await.unwrap();
        assert_eq!(fetched.name, "Ana María");
        assert_eq!(fetched.address, "Calle 9");
    }

    async fn place_order(store: &MemoryStore, client_id: ClientId) {
        use crate::domain::commerce::CommerceId;
        use crate::domain::delivery_agent::DeliveryAgentId;
        use crate::domain::order::{schedule::stamp, NewOrder, NewOrderRecord};

        let new = NewOrder {
            client_id,
            commerce_id: CommerceId(1),
            delivery_agent_id: DeliveryAgentId(1),
            detail: "1 empanada".to_string(),
        };
        store
            .create_order(NewOrderRecord::admitted(new, stamp(chrono::Utc::now())))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_orders_lists_only_the_clients_orders() {
        let store = Arc::new(MemoryStore::new());
        let handler = ClientCommandHandler::new(store.clone());
        let ana = handler.create(NewClient::new("Ana", "Calle 1")).await.unwrap();
        let luis = handler.create(NewClient::new("Luis", "Calle 2")).await.unwrap();

        place_order(&store, ana.id).await;
        place_order(&store, ana.id).await;
        place_order(&store, luis.id).await;

        let orders = handler.orders(ana.id).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|o| o.client_id == ana.id));
    }

    #[tokio::test]
    async fn test_delete_cascades_orders() {
        let store = Arc::new(MemoryStore::new());
        let handler = ClientCommandHandler::new(store.clone());
        let ana = handler.create(NewClient::new("Ana", "Calle 1")).await.unwrap();
        let luis = handler.create(NewClient::new("Luis", "Calle 2")).await.unwrap();

        place_order(&store, ana.id).await;
        place_order(&store, ana.id).await;
        place_order(&store, luis.id).await;

        handler.delete(ana.id).await.unwrap();

        assert!(matches!(handler.get(ana.id).await, Err(ClientError::NotFound(_))));
        assert!(handler.orders(ana.id).await.unwrap().is_empty());
        assert_eq!(handler.orders(luis.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_client() {
        let result = handler().get(ClientId(3)).await;
        assert!(matches!(result, Err(ClientError::NotFound(ClientId(3)))));
    }
}
