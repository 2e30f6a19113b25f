use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::DeliveryAgentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryAgentId(pub i64);

impl fmt::Display for DeliveryAgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAgent {
    pub id: DeliveryAgentId,
    pub name: String,
    pub active: bool,
    /// Free text, e.g. "bike" or "motorcycle".
    pub transport: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDeliveryAgent {
    pub name: String,
    pub active: bool,
    pub transport: String,
}

impl NewDeliveryAgent {
    pub fn new(name: impl Into<String>, transport: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            transport: transport.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DeliveryAgentError> {
        if self.name.trim().is_empty() {
            return Err(DeliveryAgentError::EmptyName);
        }
        if self.transport.trim().is_empty() {
            return Err(DeliveryAgentError::EmptyTransport);
        }
        Ok(())
    }

    pub fn into_delivery_agent(self, id: DeliveryAgentId) -> DeliveryAgent {
        DeliveryAgent {
            id,
            name: self.name,
            active: self.active,
            transport: self.transport,
        }
    }
}
