//! Request and response types of the registry services.

pub mod types;

// Re-export all types for convenience
pub use types::*;
