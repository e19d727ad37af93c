//! Infrastructure components for the registry.
//!
//! - **Naming**: identifiers, normalized addresses and hash triples
//! - **Providers**: capability table keyed by metadata provider identifier

pub mod naming;
pub mod providers;
