//! Azure provider for cirrus
//!
//! This crate covers the Azure-specific plumbing cirrus needs to manage
//! resources declaratively:
//!
//! - Storage file share state migration across schema versions
//!   (V0 legacy IDs through V2 canonical resource URLs)
//! - Read-only subscription listing with display-name filtering
//! - Cloud environment endpoints (public and sovereign clouds)
//!
//! # Requirements
//!
//! For the ARM client: `ARM_ACCESS_TOKEN`, `ARM_TENANT_ID` env vars,
//! and optionally `ARM_ENVIRONMENT` (defaults to the public cloud).
//!
//! # Example
//!
//! ```ignore
//! use cirrus_azure::{ArmClient, ArmConfig, SubscriptionFilter};
//!
//! let client = ArmClient::new(ArmConfig::from_env()?)?;
//!
//! // All subscriptions whose display name starts with "dev"
//! let subs = client
//!     .list_subscriptions(&SubscriptionFilter::prefix("dev"))
//!     .await?;
//! ```
//!
//! # State migration
//!
//! ```ignore
//! use cirrus_azure::{upgrade_share_state, AzureEnvironment};
//!
//! // `raw` is the stored record, `version` its stored schema version.
//! let upgraded = upgrade_share_state(&raw, version, &AzureEnvironment::Public)?;
//! ```

pub mod client;
pub mod environment;
pub mod error;
pub mod shares;
pub mod subscriptions;

pub use client::{ArmClient, ArmConfig, SubscriptionPager};
pub use environment::AzureEnvironment;
pub use error::{ListError, Result};
pub use shares::{
    share_migration_chain, upgrade_share_state, FileSharesClient, ShareStateV0, ShareStateV1,
    ShareStateV2, SHARE_SCHEMA_VERSION,
};
pub use subscriptions::{
    list_matching, ApiSubscription, SubscriptionFilter, SubscriptionRecord, SubscriptionSource,
};
