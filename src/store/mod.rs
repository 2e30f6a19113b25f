// ============================================================================
// Entity Store - Persistence seam for all records
// ============================================================================
//
// The order core only talks to this trait. Two backends:
// - memory   - process-local maps, used by tests and the default config
// - postgres - sqlx-backed tables
//
// ============================================================================

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::client::{Client, ClientId, NewClient};
use crate::domain::commerce::{Commerce, CommerceId, NewCommerce};
use crate::domain::delivery_agent::{DeliveryAgent, DeliveryAgentId, NewDeliveryAgent};
use crate::domain::order::{NewOrderRecord, Order, OrderId, OrderState};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Stored order state is not recognised: {0}")]
    InvalidState(String),

    /// Conditional save refused: the stored state is no longer the one the
    /// caller read.
    #[error("Order state changed concurrently (now {0})")]
    StateMismatch(OrderState),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Selection over orders. Unset fields match anything; an empty `states`
/// list matches every state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub commerce_id: Option<CommerceId>,
    pub client_id: Option<ClientId>,
    pub delivery_agent_id: Option<DeliveryAgentId>,
    pub states: Vec<OrderState>,
}

impl OrderFilter {
    pub fn for_commerce(commerce_id: CommerceId) -> Self {
        Self {
            commerce_id: Some(commerce_id),
            ..Self::default()
        }
    }

    pub fn for_client(client_id: ClientId) -> Self {
        Self {
            client_id: Some(client_id),
            ..Self::default()
        }
    }

    pub fn for_delivery_agent(delivery_agent_id: DeliveryAgentId) -> Self {
        Self {
            delivery_agent_id: Some(delivery_agent_id),
            ..Self::default()
        }
    }

    pub fn with_states(mut self, states: &[OrderState]) -> Self {
        self.states = states.to_vec();
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.commerce_id.map_or(true, |id| order.commerce_id == id)
            && self.client_id.map_or(true, |id| order.client_id == id)
            && self.delivery_agent_id.map_or(true, |id| order.delivery_agent_id == id)
            && (self.states.is_empty() || self.states.contains(&order.state))
    }
}

/// 1-based offset pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Effectively unbounded page, for "all rows" listings.
    pub fn all() -> Self {
        Self {
            page: 1,
            limit: u32::MAX,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    // Orders
    async fn create_order(&self, record: NewOrderRecord) -> Result<Order, StoreError>;
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
    /// Whole-record update, applied only while the stored state is still
    /// `expected`. `NotFound` when the row no longer exists, `StateMismatch`
    /// when another writer moved the state first.
    async fn save_order(&self, order: &Order, expected: OrderState) -> Result<Order, StoreError>;
    async fn delete_order(&self, id: OrderId) -> Result<bool, StoreError>;
    async fn delete_orders(&self, filter: &OrderFilter) -> Result<u64, StoreError>;
    async fn count_orders(&self, filter: &OrderFilter) -> Result<u64, StoreError>;
    async fn list_orders(&self, filter: &OrderFilter, page: Page) -> Result<Vec<Order>, StoreError>;

    // Commerces
    async fn create_commerce(&self, new: &NewCommerce) -> Result<Commerce, StoreError>;
    async fn find_commerce(&self, id: CommerceId) -> Result<Option<Commerce>, StoreError>;
    async fn list_commerces(&self) -> Result<Vec<Commerce>, StoreError>;
    async fn save_commerce(&self, commerce: &Commerce) -> Result<Commerce, StoreError>;
    async fn delete_commerce(&self, id: CommerceId) -> Result<bool, StoreError>;

    // Clients
    async fn create_client(&self, new: &NewClient) -> Result<Client, StoreError>;
    async fn find_client(&self, id: ClientId) -> Result<Option<Client>, StoreError>;
    async fn list_clients(&self) -> Result<Vec<Client>, StoreError>;
    async fn save_client(&self, client: &Client) -> Result<Client, StoreError>;
    async fn delete_client(&self, id: ClientId) -> Result<bool, StoreError>;

    // Delivery agents
    async fn create_delivery_agent(&self, new: &NewDeliveryAgent) -> Result<DeliveryAgent, StoreError>;
    async fn find_delivery_agent(&self, id: DeliveryAgentId) -> Result<Option<DeliveryAgent>, StoreError>;
    async fn list_delivery_agents(&self) -> Result<Vec<DeliveryAgent>, StoreError>;
    async fn save_delivery_agent(&self, agent: &DeliveryAgent) -> Result<DeliveryAgent, StoreError>;
    async fn delete_delivery_agent(&self, id: DeliveryAgentId) -> Result<bool, StoreError>;
}
