//! The persisted record of past aliasing decisions.
//!
//! This is the shape stored under [`crate::metadata::AUTO_ALIASING_KEY`]:
//!
//! ```json
//! {
//!     "resources": {
//!         "google_compute_autoscaler": {
//!             "current": "gcp:compute/autoscaler:Autoscaler",
//!             "past": [
//!                 {"name": "gcp:auto/autoscaler:Autoscaler", "inCodegen": true, "majorVersion": 6}
//!             ],
//!             "majorVersion": 6,
//!             "fields": {
//!                 "autoscaling_policy": {
//!                     "maxItemsOne": true,
//!                     "elem": {"fields": {"cpu_utilization": {"maxItemsOne": false}}}
//!                 }
//!             }
//!         }
//!     },
//!     "datasources": {}
//! }
//! ```
//!
//! Empty collections, a zero major version and unset flags are omitted so
//! the document stays small and diffs stay quiet between releases.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tokens::{DataSourceToken, ResourceToken};

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// One retired token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasRecord<T> {
    /// The previous token.
    pub name: T,
    /// Whether the old token is generated as a full duplicate type (a hard
    /// alias) or only recorded as a type alias (a soft alias).
    #[serde(default)]
    pub in_codegen: bool,
    /// The provider major version in which the token was retired.
    #[serde(default)]
    pub major_version: u64,
}

/// The token history of a single resource or data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHistory<T> {
    /// The most recently computed token.
    pub current: T,
    /// Retired tokens, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub past: Vec<AliasRecord<T>>,
    /// The major version the `fields` decisions belong to.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub major_version: u64,
    /// Collapse decisions, keyed by top-level field name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldHistory>,
}

impl<T: PartialEq> TokenHistory<T> {
    /// A fresh history with nothing retired yet.
    pub fn new(current: T) -> Self {
        Self {
            current,
            past: Vec::new(),
            major_version: 0,
            fields: BTreeMap::new(),
        }
    }

    /// Whether `token` has already been retired.
    pub fn has_past(&self, token: &T) -> bool {
        self.past.iter().any(|alias| &alias.name == token)
    }
}

/// Recorded collapse decisions for one field and its descendants.
///
/// A node is only kept when it, or something below it, records a decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldHistory {
    /// Whether the field was projected as a single value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items_one: Option<bool>,
    /// Decisions for the fields of a nested resource element.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldHistory>,
    /// Decisions for a nested field element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elem: Option<Box<FieldHistory>>,
}

/// The whole auto-aliasing record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AliasHistory {
    /// Resource histories keyed by upstream resource name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<String, TokenHistory<ResourceToken>>,
    /// Data source histories keyed by upstream data source name.
    #[serde(rename = "datasources", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data_sources: BTreeMap<String, TokenHistory<DataSourceToken>>,
}

impl AliasHistory {
    /// The highest major version any retired token was recorded at, or 0.
    pub fn max_major_version(&self) -> u64 {
        let resources = self.resources.values().flat_map(|h| h.past.iter().map(|a| a.major_version));
        let data_sources = self
            .data_sources
            .values()
            .flat_map(|h| h.past.iter().map(|a| a.major_version));
        resources.chain(data_sources).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_minimal_history_serialization() {
        let mut hist = AliasHistory::default();
        hist.resources.insert(
            "pkg_r1".to_string(),
            TokenHistory::new(ResourceToken::new("pkg:index/r1:R1")),
        );

        assert_eq!(
            serde_json::to_value(&hist).unwrap(),
            json!({"resources": {"pkg_r1": {"current": "pkg:index/r1:R1"}}})
        );
    }

    #[test]
    fn test_full_history_serialization() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "policy".to_string(),
            FieldHistory {
                max_items_one: Some(true),
                elem: Some(Box::new(FieldHistory {
                    fields: BTreeMap::from([(
                        "cpu".to_string(),
                        FieldHistory {
                            max_items_one: Some(false),
                            ..Default::default()
                        },
                    )]),
                    ..Default::default()
                })),
                ..Default::default()
            },
        );
        let entry = TokenHistory {
            current: DataSourceToken::new("pkg:mod:getD2"),
            past: vec![AliasRecord {
                name: DataSourceToken::new("pkg:mod:getD1"),
                in_codegen: false,
                major_version: 2,
            }],
            major_version: 2,
            fields,
        };

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "current": "pkg:mod:getD2",
                "past": [{"name": "pkg:mod:getD1", "inCodegen": false, "majorVersion": 2}],
                "majorVersion": 2,
                "fields": {
                    "policy": {
                        "maxItemsOne": true,
                        "elem": {"fields": {"cpu": {"maxItemsOne": false}}}
                    }
                }
            })
        );
    }

    #[test]
    fn test_deserialize_datasources_key() {
        let hist: AliasHistory = serde_json::from_value(json!({
            "datasources": {
                "pkg_d1": {
                    "current": "pkg:index:getD2",
                    "past": [{"name": "pkg:index:getD1", "majorVersion": 1}]
                }
            }
        }))
        .unwrap();

        let d1 = &hist.data_sources["pkg_d1"];
        assert_eq!(d1.current, DataSourceToken::new("pkg:index:getD2"));
        assert!(!d1.past[0].in_codegen);
        assert!(d1.has_past(&DataSourceToken::new("pkg:index:getD1")));
        assert!(!d1.has_past(&d1.current));
    }

    #[test]
    fn test_max_major_version() {
        assert_eq!(AliasHistory::default().max_major_version(), 0);

        let hist: AliasHistory = serde_json::from_value(json!({
            "resources": {
                "a": {"current": "p:m:A", "past": [{"name": "p:m:A0", "inCodegen": true, "majorVersion": 1}]}
            },
            "datasources": {
                "b": {"current": "p:m:getB", "past": [{"name": "p:m:getB0", "inCodegen": false, "majorVersion": 2}]}
            }
        }))
        .unwrap();
        assert_eq!(hist.max_major_version(), 2);
    }
}
