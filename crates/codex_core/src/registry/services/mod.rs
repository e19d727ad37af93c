//! Core services of the registry.
//!
//! - **Ledger**: mints and persists provenance entries
//! - **Reconciler**: matches modify events against pending metadata updates
//! - **Sequencer**: serializes lifecycle operations per token

pub mod ledger;
pub mod reconciler;
pub mod sequencer;
