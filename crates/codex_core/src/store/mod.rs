//! Document stores implementing the registry's persistence boundary.
//!
//! A store is any [`tower::Service`] over
//! [`StoreRequest`](crate::registry::api::StoreRequest) answering with
//! [`StoreResponse`](crate::registry::api::StoreResponse). Implementations must:
//!
//! - lowercase addresses before persisting or querying them (the
//!   [`Address`](crate::registry::infrastructure::naming::Address) type
//!   already guarantees it for values built by the registry),
//! - apply a [`Commit`](crate::registry::api::Commit) atomically, checking
//!   every document version before writing any of them,
//! - never rewrite or delete persisted provenance entries.

pub mod memory;
