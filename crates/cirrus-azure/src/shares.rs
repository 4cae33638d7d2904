//! Storage file share state migration
//!
//! The persisted ID of a file share changed twice: V0 stored whatever
//! the original create call produced, V1 stored the composite
//! `{name}/{resource_group}/{account}` form, and V2 stores the
//! canonical resource URL built from the account's file endpoint. One
//! explicit record type exists per schema version, and the chain in
//! [`share_migration_chain`] upgrades stored records step by step.

use crate::environment::AzureEnvironment;
use cirrus_core::error::{MigrationError, Result};
use cirrus_core::migration::{MigrationChain, RawState};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Schema version written by the current release
pub const SHARE_SCHEMA_VERSION: u32 = 2;

/// Default share quota in GiB
pub const SHARE_QUOTA_DEFAULT: u32 = 5120;
const SHARE_QUOTA_MIN: u32 = 1;
const SHARE_QUOTA_MAX: u32 = 5120;

/// Builds identifiers for the file share service.
///
/// A share's canonical resource ID is the share's URL on the storage
/// account's file endpoint, which varies by cloud environment.
pub struct FileSharesClient {
    environment: AzureEnvironment,
}

impl FileSharesClient {
    pub fn new(environment: AzureEnvironment) -> Self {
        Self { environment }
    }

    /// File service endpoint for a storage account
    pub fn endpoint(&self, account_name: &str) -> String {
        format!(
            "https://{}.file.{}",
            account_name,
            self.environment.storage_endpoint_suffix()
        )
    }

    /// Canonical resource ID for a share within a storage account
    pub fn resource_id(&self, account_name: &str, share_name: &str) -> String {
        format!("{}/{}", self.endpoint(account_name), share_name)
    }
}

/// Share state as stored by schema version 0.
///
/// V0 and V1 share the same field set; only the `id` format differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareStateV0 {
    pub id: String,
    pub name: String,
    pub resource_group_name: String,
    pub storage_account_name: String,
    #[serde(default = "default_quota", deserialize_with = "quota_in_range")]
    pub quota: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Share state as stored by schema version 1 (composite ID)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareStateV1 {
    pub id: String,
    pub name: String,
    pub resource_group_name: String,
    pub storage_account_name: String,
    #[serde(default = "default_quota", deserialize_with = "quota_in_range")]
    pub quota: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Share state as stored by schema version 2 (canonical resource URL)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareStateV2 {
    pub id: String,
    pub name: String,
    pub resource_group_name: String,
    pub storage_account_name: String,
    #[serde(default = "default_quota", deserialize_with = "quota_in_range")]
    pub quota: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

fn default_quota() -> u32 {
    SHARE_QUOTA_DEFAULT
}

fn quota_in_range<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let quota = u32::deserialize(deserializer)?;
    if !(SHARE_QUOTA_MIN..=SHARE_QUOTA_MAX).contains(&quota) {
        return Err(serde::de::Error::custom(format!(
            "quota must be between {SHARE_QUOTA_MIN} and {SHARE_QUOTA_MAX}, got {quota}"
        )));
    }
    Ok(quota)
}

impl ShareStateV0 {
    /// Rebuild the ID as `{name}/{resource_group}/{account}`.
    pub fn into_v1(self) -> ShareStateV1 {
        let id = format!(
            "{}/{}/{}",
            self.name, self.resource_group_name, self.storage_account_name
        );
        tracing::debug!("Updating ID from {:?} to {:?}", self.id, id);

        ShareStateV1 {
            id,
            name: self.name,
            resource_group_name: self.resource_group_name,
            storage_account_name: self.storage_account_name,
            quota: self.quota,
            url: self.url,
            extra: self.extra,
        }
    }
}

impl ShareStateV1 {
    /// Replace the composite ID with the canonical resource URL.
    ///
    /// The composite form is `{name}/{resource_group}/{account}`; a
    /// different segment count means the stored record is ambiguous and
    /// migration must not proceed. The resource group segment does not
    /// appear in the canonical URL and is dropped.
    pub fn into_v2(self, environment: &AzureEnvironment) -> Result<ShareStateV2> {
        let got = self.id.split('/').count();
        if got != 3 {
            return Err(MigrationError::InvalidIdSegments {
                id: self.id,
                expected: 3,
                got,
            });
        }

        let segments: Vec<&str> = self.id.split('/').collect();
        let share_name = segments[0];
        let account_name = segments[2];
        let id = FileSharesClient::new(*environment).resource_id(account_name, share_name);
        tracing::debug!("Updating Resource ID from {:?} to {:?}", self.id, id);

        Ok(ShareStateV2 {
            id,
            name: self.name,
            resource_group_name: self.resource_group_name,
            storage_account_name: self.storage_account_name,
            quota: self.quota,
            url: self.url,
            extra: self.extra,
        })
    }
}

fn decode<T: DeserializeOwned>(raw: RawState) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(
        raw.into_iter().collect(),
    ))?)
}

fn encode<T: Serialize>(state: T) -> Result<RawState> {
    Ok(serde_json::from_value(serde_json::to_value(state)?)?)
}

fn upgrade_v0_to_v1(raw: RawState, _environment: &AzureEnvironment) -> Result<RawState> {
    let state: ShareStateV0 = decode(raw)?;
    encode(state.into_v1())
}

fn upgrade_v1_to_v2(raw: RawState, environment: &AzureEnvironment) -> Result<RawState> {
    let state: ShareStateV1 = decode(raw)?;
    encode(state.into_v2(environment)?)
}

/// The full migration chain for stored share records
pub fn share_migration_chain() -> MigrationChain<AzureEnvironment> {
    MigrationChain::new(0)
        .then(upgrade_v0_to_v1)
        .then(upgrade_v1_to_v2)
}

/// Upgrade a stored share record from `version` to [`SHARE_SCHEMA_VERSION`].
pub fn upgrade_share_state(
    raw: &RawState,
    version: u32,
    environment: &AzureEnvironment,
) -> Result<RawState> {
    share_migration_chain().upgrade(raw, version, environment)
}
