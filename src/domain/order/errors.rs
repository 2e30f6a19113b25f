use crate::domain::commerce::CommerceId;
use crate::store::StoreError;

use super::value_objects::{OrderId, OrderState};

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Commerce not found: {0}")]
    CommerceNotFound(CommerceId),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("The commerce {commerce_id} is not accepting any more orders ({active}/{max} active)")]
    CommerceAtCapacity {
        commerce_id: CommerceId,
        active: u64,
        max: i32,
    },

    #[error("Order {order_id} is completed (state: {state})")]
    OrderAlreadyTerminal { order_id: OrderId, state: OrderState },

    #[error("Invalid order state: {0}")]
    InvalidOrderState(String),

    #[error("Cannot update order {order_id} in current state: {state}")]
    OrderNotEditable { order_id: OrderId, state: OrderState },

    #[error("Order detail cannot be empty")]
    EmptyDetail,

    /// Another writer changed the order's state between read and save.
    /// Retrying re-reads the current state.
    #[error("Order {order_id} changed concurrently (expected {expected}, found {found})")]
    StateConflict {
        order_id: OrderId,
        expected: OrderState,
        found: OrderState,
    },

    #[error("Store error: {0}")]
    Store(StoreError),
}

/// Coarse classification of an [`OrderError`], stable across transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderErrorKind {
    NotFound,
    CapacityExceeded,
    InvalidTransition,
    NotEditable,
    Validation,
    Conflict,
    StoreFailure,
}

impl OrderError {
    pub fn kind(&self) -> OrderErrorKind {
        match self {
            OrderError::CommerceNotFound(_) | OrderError::OrderNotFound(_) => OrderErrorKind::NotFound,
            OrderError::CommerceAtCapacity { .. } => OrderErrorKind::CapacityExceeded,
            OrderError::OrderAlreadyTerminal { .. } => OrderErrorKind::InvalidTransition,
            OrderError::OrderNotEditable { .. } => OrderErrorKind::NotEditable,
            OrderError::EmptyDetail => OrderErrorKind::Validation,
            OrderError::StateConflict { .. } => OrderErrorKind::Conflict,
            OrderError::InvalidOrderState(_) | OrderError::Store(_) => OrderErrorKind::StoreFailure,
        }
    }

    /// Label used for rejection metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            OrderError::CommerceNotFound(_) => "commerce_not_found",
            OrderError::OrderNotFound(_) => "order_not_found",
            OrderError::CommerceAtCapacity { .. } => "commerce_at_capacity",
            OrderError::OrderAlreadyTerminal { .. } => "order_already_terminal",
            OrderError::InvalidOrderState(_) => "invalid_order_state",
            OrderError::OrderNotEditable { .. } => "order_not_editable",
            OrderError::EmptyDetail => "empty_detail",
            OrderError::StateConflict { .. } => "state_conflict",
            OrderError::Store(_) => "store_failure",
        }
    }
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidState(state) => OrderError::InvalidOrderState(state),
            other => OrderError::Store(other),
        }
    }
}
