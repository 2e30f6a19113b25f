use serde::{Deserialize, Serialize};

use crate::domain::client::ClientId;
use crate::domain::commerce::CommerceId;
use crate::domain::delivery_agent::DeliveryAgentId;

use super::value_objects::OrderId;

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

/// Fields a caller supplies to admit a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub client_id: ClientId,
    pub commerce_id: CommerceId,
    pub delivery_agent_id: DeliveryAgentId,
    pub detail: String,
}

/// Field-level edit of an order.
///
/// There is deliberately no state field: the lifecycle only moves through
/// [`OrderCommand::Transition`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderPatch {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub client_id: Option<ClientId>,
    #[serde(default)]
    pub commerce_id: Option<CommerceId>,
    #[serde(default)]
    pub delivery_agent_id: Option<DeliveryAgentId>,
}

impl OrderPatch {
    pub fn is_empty(&self) -> bool {
        self.detail.is_none()
            && self.client_id.is_none()
            && self.commerce_id.is_none()
            && self.delivery_agent_id.is_none()
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn with_commerce(mut self, commerce_id: CommerceId) -> Self {
        self.commerce_id = Some(commerce_id);
        self
    }

    pub fn with_delivery_agent(mut self, delivery_agent_id: DeliveryAgentId) -> Self {
        self.delivery_agent_id = Some(delivery_agent_id);
        self
    }
}

#[derive(Debug, Clone)]
pub enum OrderCommand {
    Admit(NewOrder),
    Transition {
        order_id: OrderId,
        proceed: bool,
    },
    Edit {
        order_id: OrderId,
        patch: OrderPatch,
    },
    Delete {
        order_id: OrderId,
    },
}

impl OrderCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OrderCommand::Admit(_) => "admit",
            OrderCommand::Transition { .. } => "transition",
            OrderCommand::Edit { .. } => "edit",
            OrderCommand::Delete { .. } => "delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_patch() {
        assert!(OrderPatch::default().is_empty());
        assert!(!OrderPatch::default().with_detail("2 pizzas").is_empty());
    }

    #[test]
    fn test_patch_rejects_state_field() {
        let json = r#"{"detail":"x","state":"delivered"}"#;
        let result: Result<OrderPatch, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_partial_deserialization() {
        let patch: OrderPatch = serde_json::from_str(r#"{"commerce_id":4}"#).unwrap();
        assert_eq!(patch.commerce_id, Some(CommerceId(4)));
        assert!(patch.detail.is_none());
    }
}
