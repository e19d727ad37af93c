//! Chain clients implementing the registry's read-only contract boundary.
//!
//! A chain client is any [`tower::Service`] over
//! [`ChainRequest`](crate::registry::api::ChainRequest). Only token reads are
//! needed: the canonical hashes of a freshly minted Record are read back from
//! the contract rather than trusted from the event payload.

pub mod memory;
