// ============================================================================
// Commerce Domain - Stores that receive orders, each with a capacity cap
// ============================================================================

pub mod aggregate;
pub mod errors;
pub mod command_handler;

pub use aggregate::*;
pub use errors::*;
pub use command_handler::*;
