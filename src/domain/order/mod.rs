// ============================================================================
// Order Domain - Admission, lifecycle and edits of delivery orders
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderId, OrderState, policies)
// - Commands (NewOrder, OrderPatch, OrderCommand)
// - Errors (OrderError enum)
// - Scheduling (promised delivery stamp)
// - Aggregate (Order with the lifecycle and mutation guard)
// - Admission (capacity check and per-commerce gate)
// - Command Handler (OrderCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod schedule;
pub mod aggregate;
pub mod admission;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
