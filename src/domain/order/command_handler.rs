use std::sync::Arc;
use std::time::Instant;

use crate::clock::Clock;
use crate::metrics::Metrics;
use crate::store::{EntityStore, OrderFilter, Page, StoreError};

use super::admission::{self, AdmissionGate};
use super::aggregate::{validate_detail, NewOrderRecord, Order};
use super::commands::{NewOrder, OrderCommand, OrderPatch};
use super::errors::OrderError;
use super::schedule;
use super::value_objects::{OrderId, OrderPolicy, OrderState};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Admission / Lifecycle / Mutation guard → Entity Store
//
// Every write goes through `handle`, which also records metrics and logs
// rejections. Nothing here retries; store failures surface as
// `OrderError::Store`.
//
// ============================================================================

/// One page of orders plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPage {
    pub items: Vec<Order>,
    pub total: u64,
}

pub struct OrderCommandHandler {
    store: Arc<dyn EntityStore>,
    clock: Arc<dyn Clock>,
    policy: OrderPolicy,
    gate: AdmissionGate,
    metrics: Arc<Metrics>,
}

impl OrderCommandHandler {
    pub fn new(
        store: Arc<dyn EntityStore>,
        clock: Arc<dyn Clock>,
        policy: OrderPolicy,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            clock,
            gate: AdmissionGate::new(policy.admission_mode),
            policy,
            metrics,
        }
    }

    pub fn policy(&self) -> OrderPolicy {
        self.policy
    }

    /// Handle a command and persist the result
    pub async fn handle(&self, command: OrderCommand) -> Result<Order, OrderError> {
        let operation = command.name();
        let is_edit = matches!(command, OrderCommand::Edit { .. });
        let started = Instant::now();

        let result = match command {
            OrderCommand::Admit(new) => self.execute_admit(new).await,
            OrderCommand::Transition { order_id, proceed } => {
                self.execute_transition(order_id, proceed).await
            }
            OrderCommand::Edit { order_id, patch } => self.execute_edit(order_id, patch).await,
            OrderCommand::Delete { order_id } => self.execute_delete(order_id).await,
        };

        self.metrics
            .observe_duration(operation, started.elapsed().as_secs_f64());
        if is_edit {
            self.metrics.record_edit(result.is_ok());
        }
        if let Err(ref e) = result {
            self.metrics.record_rejected(operation, e.reason());
            match e {
                OrderError::Store(_) | OrderError::InvalidOrderState(_) => {
                    tracing::error!(operation, error = %e, "Order command failed")
                }
                _ => tracing::warn!(operation, error = %e, "Order command rejected"),
            }
        }

        result
    }

    pub async fn admit(&self, new: NewOrder) -> Result<Order, OrderError> {
        self.handle(OrderCommand::Admit(new)).await
    }

    pub async fn transition(&self, order_id: OrderId, proceed: bool) -> Result<Order, OrderError> {
        self.handle(OrderCommand::Transition { order_id, proceed }).await
    }

    pub async fn edit(&self, order_id: OrderId, patch: OrderPatch) -> Result<Order, OrderError> {
        self.handle(OrderCommand::Edit { order_id, patch }).await
    }

    pub async fn delete(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.handle(OrderCommand::Delete { order_id }).await
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    pub async fn get(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.load(order_id).await
    }

    pub async fn list(&self, page: Page) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list_orders(&OrderFilter::default(), page).await?)
    }

    pub async fn list_by_state(&self, state: OrderState, page: Page) -> Result<OrderPage, OrderError> {
        let filter = OrderFilter::default().with_states(&[state]);
        let total = self.store.count_orders(&filter).await?;
        let items = self.store.list_orders(&filter, page).await?;
        tracing::debug!(state = %state, total, returned = items.len(), "Listed orders by state");
        Ok(OrderPage { items, total })
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    async fn execute_admit(&self, new: NewOrder) -> Result<Order, OrderError> {
        validate_detail(&new.detail)?;

        let _permit = self.gate.enter(new.commerce_id).await;
        let ticket = admission::try_admit(self.store.as_ref(), new.commerce_id).await?;

        let schedule = schedule::stamp(self.clock.now());
        let order = self
            .store
            .create_order(NewOrderRecord::admitted(new, schedule))
            .await?;

        self.metrics.record_admitted();
        tracing::info!(
            order_id = %order.id,
            commerce_id = %order.commerce_id,
            active = ticket.active + 1,
            max_active_orders = ticket.max_active_orders,
            promised_delivery_at = %order.promised_delivery_at,
            "Order admitted"
        );

        Ok(order)
    }

    async fn execute_transition(&self, order_id: OrderId, proceed: bool) -> Result<Order, OrderError> {
        let current = self.load(order_id).await?;
        let next = current.advance(proceed, self.policy.terminal_cancel)?;
        let saved = self
            .save(&next, current.state)
            .await
            .map_err(|e| match e {
                OrderError::StateConflict { found, .. } if found.is_terminal() => {
                    OrderError::OrderAlreadyTerminal { order_id, state: found }
                }
                other => other,
            })?;

        self.metrics
            .record_transition(current.state.as_str(), saved.state.as_str());
        tracing::info!(
            order_id = %order_id,
            from = %current.state,
            to = %saved.state,
            proceed,
            "Order transitioned"
        );

        Ok(saved)
    }

    async fn execute_edit(&self, order_id: OrderId, patch: OrderPatch) -> Result<Order, OrderError> {
        let current = self.load(order_id).await?;
        let edited = current.apply_patch(&patch)?;

        // Moving an active order to another commerce takes a slot there.
        let _permit = match current.commerce_change(&patch) {
            Some(target) => {
                let permit = self.gate.enter(target).await;
                admission::try_admit(self.store.as_ref(), target).await?;
                Some(permit)
            }
            None => None,
        };

        // Saved only if still Created, so a transition that landed since the
        // load is never reverted.
        let saved = self
            .save(&edited, current.state)
            .await
            .map_err(|e| match e {
                OrderError::StateConflict { found, .. } => {
                    OrderError::OrderNotEditable { order_id, state: found }
                }
                other => other,
            })?;
        tracing::info!(
            order_id = %order_id,
            commerce_id = %saved.commerce_id,
            "Order edited"
        );

        Ok(saved)
    }

    async fn execute_delete(&self, order_id: OrderId) -> Result<Order, OrderError> {
        let order = self.load(order_id).await?;
        if !self.store.delete_order(order_id).await? {
            return Err(OrderError::OrderNotFound(order_id));
        }

        self.metrics.record_deleted();
        tracing::info!(
            order_id = %order_id,
            state = %order.state,
            was_active = order.is_active(),
            "Order deleted"
        );

        Ok(order)
    }

    async fn load(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.store
            .find_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    /// Conditional save against the state the caller read.
    async fn save(&self, order: &Order, expected: OrderState) -> Result<Order, OrderError> {
        self.store
            .save_order(order, expected)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => OrderError::OrderNotFound(order.id),
                StoreError::StateMismatch(found) => OrderError::StateConflict {
                    order_id: order.id,
                    expected,
                    found,
                },
                other => other.into(),
            })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
