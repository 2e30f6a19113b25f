// ============================================================================
// Delivery Agent Domain - Couriers assigned to orders
// ============================================================================

pub mod aggregate;
pub mod errors;
pub mod command_handler;

pub use aggregate::*;
pub use errors::*;
pub use command_handler::*;
