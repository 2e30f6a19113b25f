// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each record type has its own subdirectory with:
// - Aggregate and value types
// - Errors
// - Command handler
//
// Orders carry the interesting rules (capacity admission, lifecycle, edit
// guard). Commerces, clients and delivery agents are plain records the order
// core refers to by id.
//
// Persistence lives behind `crate::store::EntityStore`.
//
// ============================================================================

pub mod order;
pub mod commerce;
pub mod client;
pub mod delivery_agent;
