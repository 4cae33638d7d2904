//! Schema versioning for persisted resource state
//!
//! A resource's persisted record carries a schema version. When the
//! record's shape changes between releases, a migration step upgrades
//! stored records from version N to N+1. Steps are registered as a
//! total chain: every version from the oldest supported to the current
//! one has exactly one step, and `upgrade` applies them in strictly
//! increasing order.

use crate::error::{MigrationError, Result};
use serde_json::Value;
use std::collections::HashMap;

/// A persisted resource record as the orchestration engine stores it.
///
/// Fields a step does not rewrite must pass through unchanged, so the
/// record stays a plain map at the chain boundary. Individual steps are
/// expected to decode into an explicit per-version struct, convert, and
/// encode back rather than poking at the map directly.
pub type RawState = HashMap<String, Value>;

/// A single upgrade step from one schema version to the next.
///
/// Steps are pure: they receive the record and a context, and return
/// the upgraded record or fail without side effects on the stored copy.
pub type MigrationStep<C> = fn(RawState, &C) -> Result<RawState>;

/// An ordered, total chain of migration steps.
///
/// Step `i` upgrades version `oldest + i` to `oldest + i + 1`, so the
/// current schema version is `oldest + steps.len()`.
pub struct MigrationChain<C> {
    oldest_version: u32,
    steps: Vec<MigrationStep<C>>,
}

impl<C> MigrationChain<C> {
    /// Start an empty chain whose oldest supported version is `oldest_version`.
    pub fn new(oldest_version: u32) -> Self {
        Self {
            oldest_version,
            steps: Vec::new(),
        }
    }

    /// Append the step for the next version in the chain.
    pub fn then(mut self, step: MigrationStep<C>) -> Self {
        self.steps.push(step);
        self
    }

    /// The oldest schema version the chain can upgrade from.
    pub fn oldest_version(&self) -> u32 {
        self.oldest_version
    }

    /// The schema version reached after applying the whole chain.
    pub fn current_version(&self) -> u32 {
        self.oldest_version + self.steps.len() as u32
    }

    /// Upgrade a record stored at `version` to the current version.
    ///
    /// Applies every step from `version` up to the current version, in
    /// order, never skipping. A record already at the current version
    /// passes through untouched. The input is cloned up front, so on
    /// failure the caller's copy is exactly what was stored.
    pub fn upgrade(&self, raw: &RawState, version: u32, ctx: &C) -> Result<RawState> {
        let current = self.current_version();
        if version < self.oldest_version || version > current {
            return Err(MigrationError::UnsupportedVersion {
                version,
                oldest: self.oldest_version,
                current,
            });
        }

        let mut state = raw.clone();
        for step in &self.steps[(version - self.oldest_version) as usize..] {
            state = step(state, ctx)?;
        }

        tracing::debug!(
            "Upgraded state from version {} to {}",
            version,
            current
        );
        Ok(state)
    }
}

/// Get a required string field out of a raw record.
pub fn require_str<'a>(state: &'a RawState, field: &str) -> Result<&'a str> {
    match state.get(field) {
        None => Err(MigrationError::MissingField(field.to_string())),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(MigrationError::InvalidField {
            field: field.to_string(),
            expected: "a string",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bump(mut state: RawState, _ctx: &()) -> Result<RawState> {
        let n = state
            .get("counter")
            .and_then(Value::as_u64)
            .unwrap_or_default();
        state.insert("counter".to_string(), json!(n + 1));
        Ok(state)
    }

    fn fail(_state: RawState, _ctx: &()) -> Result<RawState> {
        Err(MigrationError::MissingField("boom".to_string()))
    }

    fn chain() -> MigrationChain<()> {
        MigrationChain::new(0).then(bump).then(bump)
    }

    #[test]
    fn applies_every_step_from_stored_version() {
        let raw = RawState::from([("counter".to_string(), json!(0))]);

        let upgraded = chain().upgrade(&raw, 0, &()).unwrap();
        assert_eq!(upgraded["counter"], json!(2));

        let upgraded = chain().upgrade(&raw, 1, &()).unwrap();
        assert_eq!(upgraded["counter"], json!(1));
    }

    #[test]
    fn current_version_is_a_noop() {
        let raw = RawState::from([("counter".to_string(), json!(7))]);
        let upgraded = chain().upgrade(&raw, 2, &()).unwrap();
        assert_eq!(upgraded, raw);
    }

    #[test]
    fn version_outside_chain_is_rejected() {
        let raw = RawState::new();
        let err = chain().upgrade(&raw, 3, &()).unwrap_err();
        assert!(matches!(
            err,
            MigrationError::UnsupportedVersion {
                version: 3,
                oldest: 0,
                current: 2,
            }
        ));

        let err = MigrationChain::<()>::new(1)
            .then(bump)
            .upgrade(&raw, 0, &())
            .unwrap_err();
        assert!(matches!(err, MigrationError::UnsupportedVersion { .. }));
    }

    #[test]
    fn failed_step_leaves_input_untouched() {
        let raw = RawState::from([("counter".to_string(), json!(0))]);
        let chain = MigrationChain::new(0).then(bump).then(fail);

        let err = chain.upgrade(&raw, 0, &()).unwrap_err();
        assert!(matches!(err, MigrationError::MissingField(_)));
        assert_eq!(raw["counter"], json!(0));
    }

    #[test]
    fn require_str_reports_missing_and_wrong_shape() {
        let raw = RawState::from([("name".to_string(), json!(42))]);

        assert!(matches!(
            require_str(&raw, "id").unwrap_err(),
            MigrationError::MissingField(_)
        ));
        assert!(matches!(
            require_str(&raw, "name").unwrap_err(),
            MigrationError::InvalidField { .. }
        ));
    }
}
