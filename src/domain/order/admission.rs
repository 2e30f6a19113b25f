use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::commerce::CommerceId;
use crate::store::{EntityStore, OrderFilter};

use super::errors::OrderError;
use super::value_objects::{AdmissionMode, ACTIVE_STATES};

// ============================================================================
// Capacity Admission Check
// ============================================================================
//
// Reads the commerce and its active-order count; writes nothing. The caller
// creates the order afterwards. Holding an AdmissionPermit across both steps
// is what closes the check-then-create window in Serialized mode.
//
// ============================================================================

/// Outcome of a successful capacity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionTicket {
    pub commerce_id: CommerceId,
    pub active: u64,
    pub max_active_orders: i32,
}

/// `true` when one more active order fits under the cap. A zero or negative
/// cap never admits.
pub fn has_capacity(active: u64, max_active_orders: i32) -> bool {
    u64::try_from(max_active_orders).map_or(false, |max| active < max)
}

pub async fn try_admit(
    store: &dyn EntityStore,
    commerce_id: CommerceId,
) -> Result<AdmissionTicket, OrderError> {
    let commerce = store
        .find_commerce(commerce_id)
        .await?
        .ok_or(OrderError::CommerceNotFound(commerce_id))?;

    let active = store
        .count_orders(&OrderFilter::for_commerce(commerce_id).with_states(&ACTIVE_STATES))
        .await?;

    if !has_capacity(active, commerce.max_active_orders) {
        return Err(OrderError::CommerceAtCapacity {
            commerce_id,
            active,
            max: commerce.max_active_orders,
        });
    }

    Ok(AdmissionTicket {
        commerce_id,
        active,
        max_active_orders: commerce.max_active_orders,
    })
}

// ============================================================================
// Admission Gate - per-commerce serialization
// ============================================================================

/// Held for the duration of a check-and-create. Empty in Unguarded mode.
pub struct AdmissionPermit {
    _guard: Option<OwnedMutexGuard<()>>,
}

pub struct AdmissionGate {
    mode: AdmissionMode,
    locks: Mutex<HashMap<CommerceId, Arc<Mutex<()>>>>,
}

impl AdmissionGate {
    pub fn new(mode: AdmissionMode) -> Self {
        Self {
            mode,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn mode(&self) -> AdmissionMode {
        self.mode
    }

    #[cfg(test)]
    async fn tracked_commerces(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// Waits for exclusive admission rights on `commerce_id`.
    ///
    /// Only serializes admissions inside this process; two processes sharing
    /// one database still race. The lock table only keeps commerces with a
    /// live permit or waiter, so it stays bounded by concurrent admissions.
    pub async fn enter(&self, commerce_id: CommerceId) -> AdmissionPermit {
        match self.mode {
            AdmissionMode::Unguarded => AdmissionPermit { _guard: None },
            AdmissionMode::Serialized => {
                let lock = {
                    let mut locks = self.locks.lock().await;
                    // Held or awaited locks have a second Arc; the rest are idle.
                    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
                    locks.entry(commerce_id).or_default().clone()
                };
                AdmissionPermit {
                    _guard: Some(lock.lock_owned().await),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commerce::NewCommerce;
    use crate::store::MemoryStore;
    use std::time::Duration;

    #[test]
    fn test_has_capacity() {
        assert!(has_capacity(0, 1));
        assert!(has_capacity(2, 3));
        assert!(!has_capacity(3, 3));
        assert!(!has_capacity(4, 3));
        assert!(!has_capacity(0, 0));
        assert!(!has_capacity(0, -5));
    }

    #[tokio::test]
    async fn test_missing_commerce() {
        let store = MemoryStore::new();
        let result = try_admit(&store, CommerceId(9)).await;
        assert!(matches!(result, Err(OrderError::CommerceNotFound(CommerceId(9)))));
    }

    #[tokio::test]
    async fn test_ticket_reports_current_load() {
        let store = MemoryStore::new();
        let commerce = store
            .create_commerce(&NewCommerce::new("Sushi", 2))
            .await
            .unwrap();

        let ticket = try_admit(&store, commerce.id).await.unwrap();
        assert_eq!(ticket.active, 0);
        assert_eq!(ticket.max_active_orders, 2);
    }

    #[tokio::test]
    async fn test_zero_cap_commerce_always_rejects() {
        let store = MemoryStore::new();
        // Bypasses NewCommerce::validate on purpose: the store accepts anything.
        let commerce = store
            .create_commerce(&NewCommerce::new("Legacy", 0))
            .await
            .unwrap();

        let result = try_admit(&store, commerce.id).await;
        assert!(matches!(
            result,
            Err(OrderError::CommerceAtCapacity { active: 0, max: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_serialized_gate_blocks_same_commerce() {
        let gate = AdmissionGate::new(AdmissionMode::Serialized);
        let permit = gate.enter(CommerceId(1)).await;

        let blocked = tokio::time::timeout(Duration::from_millis(20), gate.enter(CommerceId(1))).await;
        assert!(blocked.is_err());

        let other = tokio::time::timeout(Duration::from_millis(20), gate.enter(CommerceId(2))).await;
        assert!(other.is_ok());

        drop(permit);
        let reentered = tokio::time::timeout(Duration::from_millis(20), gate.enter(CommerceId(1))).await;
        assert!(reentered.is_ok());
    }

    #[tokio::test]
    async fn test_idle_locks_are_pruned() {
        let gate = AdmissionGate::new(AdmissionMode::Serialized);
        for id in 1..=50 {
            drop(gate.enter(CommerceId(id)).await);
        }

        let held = gate.enter(CommerceId(99)).await;
        assert_eq!(gate.tracked_commerces().await, 1);

        let _other = gate.enter(CommerceId(100)).await;
        assert_eq!(gate.tracked_commerces().await, 2);
        drop(held);
    }

    #[tokio::test]
    async fn test_unguarded_gate_never_blocks() {
        let gate = AdmissionGate::new(AdmissionMode::Unguarded);
        let _first = gate.enter(CommerceId(1)).await;

        let second = tokio::time::timeout(Duration::from_millis(20), gate.enter(CommerceId(1))).await;
        assert!(second.is_ok());
    }
}
