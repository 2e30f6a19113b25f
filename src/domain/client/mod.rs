// ============================================================================
// Client Domain - People who place orders
// ============================================================================

pub mod aggregate;
pub mod errors;
pub mod command_handler;

pub use aggregate::*;
pub use errors::*;
pub use command_handler::*;
