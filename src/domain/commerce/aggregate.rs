use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::CommerceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommerceId(pub i64);

impl fmt::Display for CommerceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commerce {
    pub id: CommerceId,
    pub name: String,
    /// Advisory only; admission does not consult it.
    pub active: bool,
    pub max_active_orders: i32,
}

/// Operator-supplied fields, used both to create and to replace a commerce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCommerce {
    pub name: String,
    pub active: bool,
    pub max_active_orders: i32,
}

impl NewCommerce {
    pub fn new(name: impl Into<String>, max_active_orders: i32) -> Self {
        Self {
            name: name.into(),
            active: true,
            max_active_orders,
        }
    }

    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.name.trim().is_empty() {
            return Err(CommerceError::EmptyName);
        }
        if self.max_active_orders <= 0 {
            return Err(CommerceError::InvalidMaxActiveOrders(self.max_active_orders));
        }
        Ok(())
    }

    pub fn into_commerce(self, id: CommerceId) -> Commerce {
        Commerce {
            id,
            name: self.name,
            active: self.active,
            max_active_orders: self.max_active_orders,
        }
    }
}
