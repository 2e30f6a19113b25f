// ============================================================================
// delivery_orders - Order admission and lifecycle core
// ============================================================================
//
// - domain:  orders (admission, lifecycle, edit guard) and the commerce,
//            client and delivery agent records they refer to
// - store:   EntityStore seam with in-memory and PostgreSQL backends
// - metrics: Prometheus counters and the /metrics + /health server
// - config:  TOML service configuration
// - clock:   time source for admission stamps
//
// The binary in main.rs wires these together.
//
// ============================================================================

pub mod clock;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod store;
