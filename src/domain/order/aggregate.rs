use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::client::ClientId;
use crate::domain::commerce::CommerceId;
use crate::domain::delivery_agent::DeliveryAgentId;

use super::commands::{NewOrder, OrderPatch};
use super::errors::OrderError;
use super::schedule::OrderSchedule;
use super::value_objects::{OrderId, OrderState, TerminalCancelPolicy};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================

/// An admitted order. Instances only exist after admission succeeded, so the
/// schedule timestamps are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub id: OrderId,

    // Associations
    pub client_id: ClientId,
    pub commerce_id: CommerceId,
    pub delivery_agent_id: DeliveryAgentId,

    pub detail: String,
    pub state: OrderState,

    pub created_at: DateTime<Utc>,
    pub promised_delivery_at: DateTime<Utc>,
}

/// Row handed to the store on admission; the store assigns the id.
///
/// Carries no state: every stored order starts in [`NewOrderRecord::INITIAL_STATE`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderRecord {
    client_id: ClientId,
    commerce_id: CommerceId,
    delivery_agent_id: DeliveryAgentId,
    detail: String,
    schedule: OrderSchedule,
}

impl NewOrderRecord {
    pub const INITIAL_STATE: OrderState = OrderState::Created;

    pub fn admitted(new: NewOrder, schedule: OrderSchedule) -> Self {
        Self {
            client_id: new.client_id,
            commerce_id: new.commerce_id,
            delivery_agent_id: new.delivery_agent_id,
            detail: new.detail,
            schedule,
        }
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn commerce_id(&self) -> CommerceId {
        self.commerce_id
    }

    pub fn delivery_agent_id(&self) -> DeliveryAgentId {
        self.delivery_agent_id
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn schedule(&self) -> OrderSchedule {
        self.schedule
    }

    pub fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            client_id: self.client_id,
            commerce_id: self.commerce_id,
            delivery_agent_id: self.delivery_agent_id,
            detail: self.detail,
            state: Self::INITIAL_STATE,
            created_at: self.schedule.created_at,
            promised_delivery_at: self.schedule.promised_delivery_at,
        }
    }
}

pub(crate) fn validate_detail(detail: &str) -> Result<(), OrderError> {
    if detail.trim().is_empty() {
        return Err(OrderError::EmptyDetail);
    }
    Ok(())
}

impl Order {
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Lifecycle step. Returns the next snapshot; `self` is left untouched.
    pub fn advance(&self, proceed: bool, policy: TerminalCancelPolicy) -> Result<Order, OrderError> {
        let next = self
            .state
            .next(proceed, policy)
            .ok_or(OrderError::OrderAlreadyTerminal {
                order_id: self.id,
                state: self.state,
            })?;

        Ok(Order {
            state: next,
            ..self.clone()
        })
    }

    /// Mutation guard: field edits are only accepted while the order is
    /// still `Created`.
    pub fn apply_patch(&self, patch: &OrderPatch) -> Result<Order, OrderError> {
        if self.state != OrderState::Created {
            return Err(OrderError::OrderNotEditable {
                order_id: self.id,
                state: self.state,
            });
        }

        if let Some(ref detail) = patch.detail {
            validate_detail(detail)?;
        }

        let mut next = self.clone();
        if let Some(ref detail) = patch.detail {
            next.detail = detail.clone();
        }
        if let Some(client_id) = patch.client_id {
            next.client_id = client_id;
        }
        if let Some(commerce_id) = patch.commerce_id {
            next.commerce_id = commerce_id;
        }
        if let Some(delivery_agent_id) = patch.delivery_agent_id {
            next.delivery_agent_id = delivery_agent_id;
        }
        Ok(next)
    }

    /// Target commerce when `patch` moves this order elsewhere.
    pub fn commerce_change(&self, patch: &OrderPatch) -> Option<CommerceId> {
        patch.commerce_id.filter(|target| *target != self.commerce_id)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::schedule::stamp;
    use chrono::TimeZone;

    fn create_test_order(state: OrderState) -> Order {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let new = NewOrder {
            client_id: ClientId(1),
            commerce_id: CommerceId(2),
            delivery_agent_id: DeliveryAgentId(3),
            detail: "1 empanada".to_string(),
        };
        let mut order = NewOrderRecord::admitted(new, stamp(now)).into_order(OrderId(10));
        order.state = state;
        order
    }

    #[test]
    fn test_admitted_record_starts_created() {
        let order = create_test_order(OrderState::Created);
        assert_eq!(order.state, OrderState::Created);
        assert_eq!(order.id, OrderId(10));
        assert_eq!(order.promised_delivery_at - order.created_at, chrono::Duration::minutes(30));
    }

    #[test]
    fn test_advance_full_lifecycle() {
        let order = create_test_order(OrderState::Created);
        let in_progress = order.advance(true, TerminalCancelPolicy::Reject).unwrap();
        assert_eq!(in_progress.state, OrderState::InProgress);
        assert_eq!(order.state, OrderState::Created);

        let delivered = in_progress.advance(true, TerminalCancelPolicy::Reject).unwrap();
        assert_eq!(delivered.state, OrderState::Delivered);
        assert_eq!(delivered.created_at, order.created_at);
    }

    #[test]
    fn test_advance_from_terminal_fails() {
        for state in [OrderState::Delivered, OrderState::Cancelled] {
            let order = create_test_order(state);
            let result = order.advance(true, TerminalCancelPolicy::Reject);
            assert!(matches!(
                result,
                Err(OrderError::OrderAlreadyTerminal { state: s, .. }) if s == state
            ));
        }
    }

    #[test]
    fn test_cancel_terminal_with_overwrite_policy() {
        let order = create_test_order(OrderState::Delivered);
        let cancelled = order.advance(false, TerminalCancelPolicy::Overwrite).unwrap();
        assert_eq!(cancelled.state, OrderState::Cancelled);
    }

    #[test]
    fn test_patch_applies_while_created() {
        let order = create_test_order(OrderState::Created);
        let patch = OrderPatch::default()
            .with_detail("2 empanadas")
            .with_delivery_agent(DeliveryAgentId(9));

        let edited = order.apply_patch(&patch).unwrap();
        assert_eq!(edited.detail, "2 empanadas");
        assert_eq!(edited.delivery_agent_id, DeliveryAgentId(9));
        assert_eq!(edited.client_id, order.client_id);
        assert_eq!(edited.state, OrderState::Created);
    }

    #[test]
    fn test_patch_rejected_outside_created() {
        for state in [OrderState::InProgress, OrderState::Delivered, OrderState::Cancelled] {
            let order = create_test_order(state);
            let result = order.apply_patch(&OrderPatch::default().with_detail("x"));
            assert!(matches!(result, Err(OrderError::OrderNotEditable { .. })));
        }
    }

    #[test]
    fn test_patch_with_blank_detail_fails() {
        let order = create_test_order(OrderState::Created);
        let result = order.apply_patch(&OrderPatch::default().with_detail("   "));
        assert!(matches!(result, Err(OrderError::EmptyDetail)));
    }

    #[test]
    fn test_commerce_change_detection() {
        let order = create_test_order(OrderState::Created);
        assert_eq!(order.commerce_change(&OrderPatch::default()), None);
        assert_eq!(order.commerce_change(&OrderPatch::default().with_commerce(CommerceId(2))), None);
        assert_eq!(
            order.commerce_change(&OrderPatch::default().with_commerce(CommerceId(5))),
            Some(CommerceId(5))
        );
    }
}
