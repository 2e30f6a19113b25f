use crate::store::StoreError;

use super::aggregate::CommerceId;

#[derive(Debug, thiserror::Error)]
pub enum CommerceError {
    #[error("Commerce not found: {0}")]
    NotFound(CommerceId),

    #[error("Commerce name cannot be empty")]
    EmptyName,

    #[error("Maximum active orders must be greater than zero, got {0}")]
    InvalidMaxActiveOrders(i32),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
