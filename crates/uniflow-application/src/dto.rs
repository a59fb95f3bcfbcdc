//! Data Transfer Objects (DTOs) for layer boundary crossing
//!
//! Wire shapes use the camelCase field names clients already send and read.
//! Commands are parsed into domain types here so unknown enum values surface
//! as validation failures before any service logic runs.

pub mod filter;
pub mod task;

// Re-export commonly used DTOs
pub use filter::*;
pub use task::*;
