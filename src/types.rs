//! Values passed between the gRPC layer and [`crate::ProviderService`].
//!
//! States are `serde_json::Value`s. On the wire they are JSON bytes, and an
//! empty byte string stands for null (a resource that does not exist).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version printed in the handshake line.
pub const PROTOCOL_VERSION: u32 = 1;

/// First field of the handshake line.
pub const HANDSHAKE_PREFIX: &str = "HEMMER_PROVIDER";

/// One top-level attribute or block that a plan changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Attribute or block name.
    pub path: String,
    /// Prior value, `None` when the attribute is being set for the first time.
    pub before: Option<Value>,
    /// Planned value, `None` when the attribute is being cleared.
    pub after: Option<Value>,
}

impl AttributeChange {
    /// `path` goes from unset to `value`.
    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            before: None,
            after: Some(value),
        }
    }

    /// `path` goes from `value` to unset.
    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            before: Some(value),
            after: None,
        }
    }

    /// `path` goes from `before` to `after`.
    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self {
            path: path.into(),
            before: Some(before),
            after: Some(after),
        }
    }
}

fn to_bytes(value: Option<Value>) -> Vec<u8> {
    value
        .and_then(|v| serde_json::to_vec(&v).ok())
        .unwrap_or_default()
}

impl From<AttributeChange> for crate::generated::AttributeChange {
    fn from(change: AttributeChange) -> Self {
        Self {
            path: change.path,
            before: to_bytes(change.before),
            after: to_bytes(change.after),
        }
    }
}

/// Output of [`crate::plan::diff`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// State the apply should produce. Null for a destroy.
    pub planned_state: Value,
    /// What differs from the prior state.
    pub changes: Vec<AttributeChange>,
    /// A ForceNew attribute or block changed.
    pub requires_replace: bool,
}

impl PlanResult {
    /// A plan from its parts.
    pub fn with_changes(
        planned_state: Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }

    /// Whether applying the plan would call Azure at all.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty() || self.requires_replace
    }

    /// Changed attribute names, in plan order.
    pub fn changed_paths(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.path.as_str()).collect()
    }
}

/// A resource found by `ImportResourceState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// Resource type name.
    pub resource_type: String,
    /// State as returned by a read.
    pub state: Value,
}

impl ImportedResource {
    /// Pair a type with its state.
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// `GetMetadata` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// Resource type names.
    pub resources: Vec<String>,
    /// Data source type names.
    pub data_sources: Vec<String>,
    /// Optional protocol features.
    pub capabilities: ServerCapabilities,
}

/// Optional protocol features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerCapabilities {
    /// `Plan` accepts a null proposed state and plans a destroy.
    pub plan_destroy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_change_to_proto() {
        let proto: crate::generated::AttributeChange =
            AttributeChange::modified("memory_size_mb", json!(1024), json!(2048)).into();
        assert_eq!(proto.path, "memory_size_mb");
        assert_eq!(proto.before, b"1024".to_vec());
        assert_eq!(proto.after, b"2048".to_vec());

        let proto: crate::generated::AttributeChange =
            AttributeChange::added("tags", json!({"env": "prod"})).into();
        assert!(proto.before.is_empty());

        let proto: crate::generated::AttributeChange =
            AttributeChange::removed("display_name", json!("Old")).into();
        assert!(proto.after.is_empty());
    }

    #[test]
    fn test_plan_result() {
        let unchanged = PlanResult::with_changes(json!({"id": "/subscriptions/x"}), vec![], false);
        assert!(!unchanged.has_changes());

        let in_place = PlanResult::with_changes(
            json!({"tags": {"env": "prod"}}),
            vec![AttributeChange::added("tags", json!({"env": "prod"}))],
            false,
        );
        assert!(in_place.has_changes());
        assert_eq!(in_place.changed_paths(), vec!["tags"]);

        let replace = PlanResult::with_changes(Value::Null, vec![], true);
        assert!(replace.has_changes());
    }
}
