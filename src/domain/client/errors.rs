use crate::store::StoreError;

use super::aggregate::ClientId;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Client not found: {0}")]
    NotFound(ClientId),

    #[error("Client name cannot be empty")]
    EmptyName,

    #[error("Client address cannot be empty")]
    EmptyAddress,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
