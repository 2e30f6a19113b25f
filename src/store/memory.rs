use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::client::{Client, ClientId, NewClient};
use crate::domain::commerce::{Commerce, CommerceId, NewCommerce};
use crate::domain::delivery_agent::{DeliveryAgent, DeliveryAgentId, NewDeliveryAgent};
use crate::domain::order::{NewOrderRecord, Order, OrderId, OrderState};

use super::{EntityStore, OrderFilter, Page, StoreError};

// ============================================================================
// In-memory Entity Store
// ============================================================================
//
// One table per entity behind a single RwLock. Ids are assigned
// sequentially per table starting at 1 and are never reused.
//
// ============================================================================

#[derive(Default)]
struct Tables {
    last_order_id: i64,
    last_commerce_id: i64,
    last_client_id: i64,
    last_delivery_agent_id: i64,
    orders: BTreeMap<OrderId, Order>,
    commerces: BTreeMap<CommerceId, Commerce>,
    clients: BTreeMap<ClientId, Client>,
    delivery_agents: BTreeMap<DeliveryAgentId, DeliveryAgent>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page_of<T: Clone>(rows: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(page.limit).unwrap_or(usize::MAX);
    rows.skip(skip).take(take).collect()
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn create_order(&self, record: NewOrderRecord) -> Result<Order, StoreError> {
        let mut tables = self.tables.write().await;
        tables.last_order_id += 1;
        let order = record.into_order(OrderId(tables.last_order_id));
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn save_order(&self, order: &Order, expected: OrderState) -> Result<Order, StoreError> {
        let mut tables = self.tables.write().await;
        let slot = tables.orders.get_mut(&order.id).ok_or(StoreError::NotFound)?;
        if slot.state != expected {
            return Err(StoreError::StateMismatch(slot.state));
        }
        *slot = order.clone();
        Ok(order.clone())
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.orders.remove(&id).is_some())
    }

    async fn delete_orders(&self, filter: &OrderFilter) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.orders.len();
        tables.orders.retain(|_, order| !filter.matches(order));
        Ok((before - tables.orders.len()) as u64)
    }

    async fn count_orders(&self, filter: &OrderFilter) -> Result<u64, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.orders.values().filter(|o| filter.matches(o)).count() as u64)
    }

    async fn list_orders(&self, filter: &OrderFilter, page: Page) -> Result<Vec<Order>, StoreError> {
        let tables = self.tables.read().await;
        Ok(page_of(
            tables.orders.values().filter(|o| filter.matches(o)).cloned(),
            page,
        ))
    }

    async fn create_commerce(&self, new: &NewCommerce) -> Result<Commerce, StoreError> {
        let mut tables = self.tables.write().await;
        tables.last_commerce_id += 1;
        let commerce = new.clone().into_commerce(CommerceId(tables.last_commerce_id));
        tables.commerces.insert(commerce.id, commerce.clone());
        Ok(commerce)
    }

    async fn find_commerce(&self, id: CommerceId) -> Result<Option<Commerce>, StoreError> {
        Ok(self.tables.read().await.commerces.get(&id).cloned())
    }

    async fn list_commerces(&self) -> Result<Vec<Commerce>, StoreError> {
        Ok(self.tables.read().await.commerces.values().cloned().collect())
    }

    async fn save_commerce(&self, commerce: &Commerce) -> Result<Commerce, StoreError> {
        let mut tables = self.tables.write().await;
        let slot = tables.commerces.get_mut(&commerce.id).ok_or(StoreError::NotFound)?;
        *slot = commerce.clone();
        Ok(commerce.clone())
    }

    async fn delete_commerce(&self, id: CommerceId) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.commerces.remove(&id).is_some())
    }

    async fn create_client(&self, new: &NewClient) -> Result<Client, StoreError> {
        let mut tables = self.tables.write().await;
        tables.last_client_id += 1;
        let client = new.clone().into_client(ClientId(tables.last_client_id));
        tables.clients.insert(client.id, client.clone());
        Ok(client)
    }

    async fn find_client(&self, id: ClientId) -> Result<Option<Client>, StoreError> {
        Ok(self.tables.read().await.clients.get(&id).cloned())
    }

    async fn list_clients(&self) -> Result<Vec<Client>, StoreError> {
        Ok(self.tables.read().await.clients.values().cloned().collect())
    }

    async fn save_client(&self, client: &Client) -> Result<Client, StoreError> {
        let mut tables = self.tables.write().await;
        let slot = tables.clients.get_mut(&client.id).ok_or(StoreError::NotFound)?;
        *slot = client.clone();
        Ok(client.clone())
    }

    async fn delete_client(&self, id: ClientId) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.clients.remove(&id).is_some())
    }

    async fn create_delivery_agent(&self, new: &NewDeliveryAgent) -> Result<DeliveryAgent, StoreError> {
        let mut tables = self.tables.write().await;
        tables.last_delivery_agent_id += 1;
        let agent = new
            .clone()
            .into_delivery_agent(DeliveryAgentId(tables.last_delivery_agent_id));
        tables.delivery_agents.insert(agent.id, agent.clone());
        Ok(agent)
    }

    async fn find_delivery_agent(&self, id: DeliveryAgentId) -> Result<Option<DeliveryAgent>, StoreError> {
        Ok(self.tables.read().await.delivery_agents.get(&id).cloned())
    }

    async fn list_delivery_agents(&self) -> Result<Vec<DeliveryAgent>, StoreError> {
        Ok(self.tables.read().await.delivery_agents.values().cloned().collect())
    }

    async fn save_delivery_agent(&self, agent: &DeliveryAgent) -> Result<DeliveryAgent, StoreError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .delivery_agents
            .get_mut(&agent.id)
            .ok_or(StoreError::NotFound)?;
        *slot = agent.clone();
        Ok(agent.clone())
    }

    async fn delete_delivery_agent(&self, id: DeliveryAgentId) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.delivery_agents.remove(&id).is_some())
    }
}
