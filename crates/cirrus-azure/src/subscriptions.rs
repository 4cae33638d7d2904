//! Subscription listing and display-name filtering
//!
//! Subscriptions arrive from the ARM API as a paginated listing. The
//! lister consumes them through [`SubscriptionSource`], a pull-based
//! lazy sequence: `next` yields entities until the listing is
//! exhausted, and any failure to advance is a terminal error that
//! aborts the whole listing with no partial results.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A subscription entity as returned by the ARM listing API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSubscription {
    pub id: Option<String>,
    pub subscription_id: Option<String>,
    pub tenant_id: Option<String>,
    pub display_name: Option<String>,
    pub state: Option<String>,
    pub subscription_policies: Option<ApiSubscriptionPolicies>,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
}

/// Nested policy block of a subscription entity
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSubscriptionPolicies {
    pub location_placement_id: Option<String>,
    pub quota_id: Option<String>,
    pub spending_limit: Option<String>,
}

/// A flattened view of a subscription.
///
/// Nested policy fields are lifted to the top level. A field absent
/// from the API response stays `None`; it is never defaulted to an
/// empty string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionRecord {
    pub id: Option<String>,
    pub subscription_id: Option<String>,
    pub tenant_id: Option<String>,
    pub display_name: Option<String>,
    pub state: Option<String>,
    pub location_placement_id: Option<String>,
    pub quota_id: Option<String>,
    pub spending_limit: Option<String>,
    pub tags: HashMap<String, String>,
}

impl From<ApiSubscription> for SubscriptionRecord {
    fn from(api: ApiSubscription) -> Self {
        let (location_placement_id, quota_id, spending_limit) = match api.subscription_policies {
            Some(p) => (p.location_placement_id, p.quota_id, p.spending_limit),
            None => (None, None, None),
        };

        Self {
            id: api.id,
            subscription_id: api.subscription_id,
            tenant_id: api.tenant_id,
            display_name: api.display_name,
            state: api.state,
            location_placement_id,
            quota_id,
            spending_limit,
            tags: api.tags.unwrap_or_default(),
        }
    }
}

/// Display-name matching criteria for a subscription listing.
///
/// `exact_match`, when set, takes precedence and disables the other
/// two. Prefix and contains are case-insensitive and both must hold
/// when both are set.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionFilter {
    pub exact_match: Option<String>,
    pub display_name_prefix: Option<String>,
    pub display_name_contains: Option<String>,
}

impl SubscriptionFilter {
    pub fn exact(name: impl Into<String>) -> Self {
        Self {
            exact_match: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            display_name_prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    pub fn contains(fragment: impl Into<String>) -> Self {
        Self {
            display_name_contains: Some(fragment.into()),
            ..Self::default()
        }
    }

    /// Whether a subscription with this display name matches
    pub fn matches(&self, display_name: &str) -> bool {
        if let Some(exact) = &self.exact_match {
            return display_name == exact;
        }

        let lowered = display_name.to_lowercase();
        if let Some(prefix) = &self.display_name_prefix {
            if !lowered.starts_with(&prefix.to_lowercase()) {
                return false;
            }
        }
        if let Some(fragment) = &self.display_name_contains {
            if !lowered.contains(&fragment.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// A finite, non-restartable sequence of subscription entities.
///
/// `next` returns `Ok(None)` once the listing is exhausted. An `Err`
/// is terminal: the entity the source was positioned on is lost, and
/// the caller must not poll again.
#[async_trait]
pub trait SubscriptionSource {
    async fn next(&mut self) -> Result<Option<ApiSubscription>>;
}

/// Drain a source and collect the records whose display name matches.
///
/// Records are flattened and appended in enumeration order, without
/// deduplication or a size cap. A source error aborts the listing:
/// matches buffered before the failure are discarded.
pub async fn list_matching<S>(
    source: &mut S,
    filter: &SubscriptionFilter,
) -> Result<Vec<SubscriptionRecord>>
where
    S: SubscriptionSource + Send,
{
    let mut matched = Vec::new();
    while let Some(entity) = source.next().await? {
        let record = SubscriptionRecord::from(entity);
        if filter.matches(record.display_name.as_deref().unwrap_or_default()) {
            matched.push(record);
        }
    }

    tracing::debug!("Listed {} matching subscriptions", matched.len());
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListError;
    use serde_json::json;
    use std::collections::VecDeque;

    struct StaticSource {
        items: VecDeque<Result<ApiSubscription>>,
    }

    impl StaticSource {
        fn new(items: Vec<Result<ApiSubscription>>) -> Self {
            Self {
                items: items.into(),
            }
        }
    }

    #[async_trait]
    impl SubscriptionSource for StaticSource {
        async fn next(&mut self) -> Result<Option<ApiSubscription>> {
            self.items.pop_front().transpose()
        }
    }

    fn subscription(display_name: &str) -> ApiSubscription {
        serde_json::from_value(json!({
            "id": format!("/subscriptions/{}", display_name.to_lowercase()),
            "subscriptionId": display_name.to_lowercase(),
            "tenantId": "tenant-1",
            "displayName": display_name,
            "state": "Enabled",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn no_filter_returns_everything_in_order() {
        let mut source = StaticSource::new(vec![
            Ok(subscription("Prod")),
            Ok(subscription("Dev-1")),
            Ok(subscription("Staging")),
        ]);

        let records = list_matching(&mut source, &SubscriptionFilter::default())
            .await
            .unwrap();
        let names: Vec<_> = records
            .iter()
            .map(|r| r.display_name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["Prod", "Dev-1", "Staging"]);
    }

    #[tokio::test]
    async fn exact_match_is_case_sensitive_and_wins() {
        let filter = SubscriptionFilter {
            exact_match: Some("Prod".to_string()),
            display_name_prefix: Some("dev".to_string()),
            display_name_contains: Some("staging".to_string()),
        };

        let mut source = StaticSource::new(vec![
            Ok(subscription("Prod")),
            Ok(subscription("prod")),
            Ok(subscription("Dev-1")),
            Ok(subscription("Staging")),
        ]);

        let records = list_matching(&mut source, &filter).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_name.as_deref(), Some("Prod"));
    }

    #[tokio::test]
    async fn prefix_match_is_case_insensitive() {
        let mut source = StaticSource::new(vec![
            Ok(subscription("Dev-1")),
            Ok(subscription("Staging")),
        ]);

        let records = list_matching(&mut source, &SubscriptionFilter::prefix("dev"))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_name.as_deref(), Some("Dev-1"));
    }

    #[tokio::test]
    async fn prefix_and_contains_must_both_hold() {
        let filter = SubscriptionFilter {
            display_name_prefix: Some("dev".to_string()),
            display_name_contains: Some("team-a".to_string()),
            ..SubscriptionFilter::default()
        };

        let mut source = StaticSource::new(vec![
            Ok(subscription("Dev-Team-A")),
            Ok(subscription("Dev-Team-B")),
            Ok(subscription("Ops-Team-A")),
        ]);

        let records = list_matching(&mut source, &filter).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_name.as_deref(), Some("Dev-Team-A"));
    }

    #[tokio::test]
    async fn zero_matches_is_not_an_error() {
        let mut source = StaticSource::new(vec![Ok(subscription("Prod"))]);
        let records = list_matching(&mut source, &SubscriptionFilter::contains("qa"))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn source_failure_discards_buffered_matches() {
        let mut source = StaticSource::new(vec![
            Ok(subscription("Prod")),
            Err(ListError::Api {
                status: 502,
                message: "upstream went away".to_string(),
            }),
            Ok(subscription("Prod-2")),
        ]);

        let err = list_matching(&mut source, &SubscriptionFilter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ListError::Api { status: 502, .. }));
    }

    #[tokio::test]
    async fn absent_fields_stay_absent() {
        let entity: ApiSubscription = serde_json::from_value(json!({
            "subscriptionId": "sub-1",
            "displayName": "Prod",
        }))
        .unwrap();

        let record = SubscriptionRecord::from(entity);
        assert_eq!(record.subscription_id.as_deref(), Some("sub-1"));
        assert_eq!(record.tenant_id, None);
        assert_eq!(record.state, None);
        assert_eq!(record.location_placement_id, None);
        assert_eq!(record.spending_limit, None);
        assert!(record.tags.is_empty());
    }

    #[tokio::test]
    async fn nested_policies_are_flattened() {
        let entity: ApiSubscription = serde_json::from_value(json!({
            "subscriptionId": "sub-1",
            "displayName": "Prod",
            "subscriptionPolicies": {
                "locationPlacementId": "Internal_2014-09-01",
                "quotaId": "Internal_2016-01-01",
                "spendingLimit": "Off",
            },
            "tags": { "env": "prod" },
        }))
        .unwrap();

        let record = SubscriptionRecord::from(entity);
        assert_eq!(
            record.location_placement_id.as_deref(),
            Some("Internal_2014-09-01")
        );
        assert_eq!(record.quota_id.as_deref(), Some("Internal_2016-01-01"));
        assert_eq!(record.spending_limit.as_deref(), Some("Off"));
        assert_eq!(record.tags.get("env").map(String::as_str), Some("prod"));
    }
}
