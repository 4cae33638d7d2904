//! Cirrus core state machinery
//!
//! Provider-agnostic building blocks for managing the persisted state
//! of cloud resources: the raw record shape the orchestration engine
//! stores between runs, and the versioned migration chain that upgrades
//! those records when a resource's schema changes.
//!
//! Providers (see `cirrus-azure`) register one [`MigrationStep`] per
//! schema version and expose the resulting [`MigrationChain`] to the
//! orchestration layer, which commits the upgraded record only after
//! the whole chain has succeeded.

pub mod error;
pub mod migration;

// Re-exports
pub use error::{MigrationError, Result};
pub use migration::{require_str, MigrationChain, MigrationStep, RawState};
