use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an order.
///
/// `Created` and `InProgress` are the active states that count against a
/// commerce's capacity. `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Created,
    InProgress,
    Delivered,
    Cancelled,
}

/// States that occupy a slot of the commerce's capacity.
pub const ACTIVE_STATES: [OrderState; 2] = [OrderState::Created, OrderState::InProgress];

impl OrderState {
    pub const ALL: [OrderState; 4] = [
        OrderState::Created,
        OrderState::InProgress,
        OrderState::Delivered,
        OrderState::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Created => "created",
            OrderState::InProgress => "in_progress",
            OrderState::Delivered => "delivered",
            OrderState::Cancelled => "cancelled",
        }
    }

    pub fn is_active(&self) -> bool {
        ACTIVE_STATES.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Delivered | OrderState::Cancelled)
    }

    /// Transition table for the lifecycle.
    ///
    /// `proceed == true` walks `Created -> InProgress -> Delivered`;
    /// `proceed == false` cancels. Returns `None` when the order is terminal
    /// and no transition is allowed under `policy`.
    pub fn next(self, proceed: bool, policy: TerminalCancelPolicy) -> Option<OrderState> {
        match (self, proceed) {
            (OrderState::Created, true) => Some(OrderState::InProgress),
            (OrderState::InProgress, true) => Some(OrderState::Delivered),
            (OrderState::Delivered | OrderState::Cancelled, true) => None,
            (OrderState::Created | OrderState::InProgress, false) => Some(OrderState::Cancelled),
            (OrderState::Delivered | OrderState::Cancelled, false) => match policy {
                TerminalCancelPolicy::Reject => None,
                TerminalCancelPolicy::Overwrite => Some(OrderState::Cancelled),
            },
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderState {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(OrderState::Created),
            "in_progress" => Ok(OrderState::InProgress),
            "delivered" => Ok(OrderState::Delivered),
            "cancelled" => Ok(OrderState::Cancelled),
            other => Err(OrderError::InvalidOrderState(other.to_string())),
        }
    }
}

// ============================================================================
// Policies
// ============================================================================

/// What happens when a cancel is requested for an order that already reached
/// a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalCancelPolicy {
    /// Fail with `OrderAlreadyTerminal`.
    #[default]
    Reject,
    /// Write `Cancelled` unconditionally, whatever the current state.
    Overwrite,
}

/// How admission protects the per-commerce active-order count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionMode {
    /// Count and create run without coordination. Two concurrent admissions
    /// for the same commerce may both pass the check and overshoot the cap.
    Unguarded,
    /// Count and create run under a per-commerce lock.
    #[default]
    Serialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderPolicy {
    #[serde(default)]
    pub admission_mode: AdmissionMode,
    #[serde(default)]
    pub terminal_cancel: TerminalCancelPolicy,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proceed_walks_forward() {
        let policy = TerminalCancelPolicy::Reject;
        assert_eq!(OrderState::Created.next(true, policy), Some(OrderState::InProgress));
        assert_eq!(OrderState::InProgress.next(true, policy), Some(OrderState::Delivered));
        assert_eq!(OrderState::Delivered.next(true, policy), None);
        assert_eq!(OrderState::Cancelled.next(true, policy), None);
    }

    #[test]
    fn test_cancel_from_active_states() {
        for policy in [TerminalCancelPolicy::Reject, TerminalCancelPolicy::Overwrite] {
            assert_eq!(OrderState::Created.next(false, policy), Some(OrderState::Cancelled));
            assert_eq!(OrderState::InProgress.next(false, policy), Some(OrderState::Cancelled));
        }
    }

    #[test]
    fn test_cancel_from_terminal_depends_on_policy() {
        assert_eq!(OrderState::Delivered.next(false, TerminalCancelPolicy::Reject), None);
        assert_eq!(OrderState::Cancelled.next(false, TerminalCancelPolicy::Reject), None);
        assert_eq!(
            OrderState::Delivered.next(false, TerminalCancelPolicy::Overwrite),
            Some(OrderState::Cancelled)
        );
        assert_eq!(
            OrderState::Cancelled.next(false, TerminalCancelPolicy::Overwrite),
            Some(OrderState::Cancelled)
        );
    }

    #[test]
    fn test_active_and_terminal_partition() {
        for state in OrderState::ALL {
            assert_ne!(state.is_active(), state.is_terminal(), "{state}");
        }
    }

    #[test]
    fn test_state_string_round_trip() {
        for state in OrderState::ALL {
            assert_eq!(state.as_str().parse::<OrderState>().unwrap(), state);
        }
    }

    #[test]
    fn test_unknown_state_is_invalid() {
        let err = "preparado".parse::<OrderState>().unwrap_err();
        assert!(matches!(err, OrderError::InvalidOrderState(ref s) if s == "preparado"));
    }

    #[test]
    fn test_order_state_serialization() {
        let json = serde_json::to_string(&OrderState::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_policy_defaults() {
        let policy = OrderPolicy::default();
        assert_eq!(policy.admission_mode, AdmissionMode::Serialized);
        assert_eq!(policy.terminal_cancel, TerminalCancelPolicy::Reject);
    }
}
