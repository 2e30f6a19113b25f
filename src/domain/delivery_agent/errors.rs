use crate::store::StoreError;

use super::aggregate::DeliveryAgentId;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryAgentError {
    #[error("Delivery agent not found: {0}")]
    NotFound(DeliveryAgentId),

    #[error("Delivery agent name cannot be empty")]
    EmptyName,

    #[error("Delivery agent transport cannot be empty")]
    EmptyTransport,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
