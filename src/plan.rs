//! Plan computation.
//!
//! [`diff`] compares prior state with the proposed configuration using the
//! resource schema. Only top-level attributes and blocks are reported as
//! changes; `null` and the zero value of a type (`""`, `0`, `false`, `[]`,
//! `{}`) are treated as the same thing.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::schema::{Attribute, Block, Schema};
use crate::types::{AttributeChange, PlanResult};

fn is_computed_only(attr: &Attribute) -> bool {
    attr.flags.computed && !attr.flags.optional && !attr.flags.required
}

fn is_optional_computed(attr: &Attribute) -> bool {
    attr.flags.computed && attr.flags.optional
}

/// Whether `value` is null or the zero value of its type.
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.values().all(is_zero),
    }
}

/// Structural equality where zero values and absence are interchangeable.
pub fn equivalent(a: &Value, b: &Value) -> bool {
    if is_zero(a) && is_zero(b) {
        return true;
    }
    match (a, b) {
        (Value::Object(left), Value::Object(right)) => {
            let keys: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
            keys.into_iter().all(|k| {
                equivalent(
                    left.get(k).unwrap_or(&Value::Null),
                    right.get(k).unwrap_or(&Value::Null),
                )
            })
        }
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len() && left.iter().zip(right).all(|(l, r)| equivalent(l, r))
        }
        (Value::Number(left), Value::Number(right)) => left.as_f64() == right.as_f64(),
        _ => a == b,
    }
}

fn field<'a>(value: Option<&'a Value>, key: &str) -> &'a Value {
    value.and_then(|v| v.get(key)).unwrap_or(&Value::Null)
}

/// Whether a change inside a (non-ForceNew) block touches a ForceNew
/// attribute of one of its elements.
fn block_forces_replacement(block: &Block, before: &Value, after: &Value) -> bool {
    let empty = Vec::new();
    let before_items = before.as_array().unwrap_or(&empty);
    let after_items = after.as_array().unwrap_or(&empty);
    let len = before_items.len().max(after_items.len());

    (0..len).any(|i| {
        let b = before_items.get(i);
        let a = after_items.get(i);
        let attr_replaces = block.attributes.iter().any(|(name, attr)| {
            attr.force_new && !equivalent(field(b, name), field(a, name))
        });
        let nested_replaces = block.blocks.iter().any(|(name, nested)| {
            let (nb, na) = (field(b, name), field(a, name));
            !equivalent(nb, na)
                && (nested.force_new || block_forces_replacement(&nested.block, nb, na))
        });
        attr_replaces || nested_replaces
    })
}

fn change(path: &str, before: &Value, after: &Value) -> AttributeChange {
    match (before.is_null(), after.is_null()) {
        (true, _) => AttributeChange::added(path, after.clone()),
        (false, true) => AttributeChange::removed(path, before.clone()),
        (false, false) => AttributeChange::modified(path, before.clone(), after.clone()),
    }
}

/// Compute the plan for moving from `prior` to `proposed`.
///
/// - Planned state starts from `proposed`.
/// - Computed-only attributes are carried from `prior` (left null on create).
/// - Optional+computed attributes left unset are carried from `prior`.
/// - A null `proposed` plans a destroy.
pub fn diff(schema: &Schema, prior: Option<&Value>, proposed: &Value) -> PlanResult {
    let block = &schema.block;

    if proposed.is_null() {
        let changes = prior
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter(|(_, v)| !is_zero(v))
                    .map(|(k, v)| AttributeChange::removed(k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        return PlanResult::with_changes(Value::Null, changes, false);
    }

    let mut planned: Map<String, Value> = proposed.as_object().cloned().unwrap_or_default();
    for (name, attr) in &block.attributes {
        let prior_value = field(prior, name);
        if is_computed_only(attr) {
            planned.insert(name.clone(), prior_value.clone());
        } else if is_optional_computed(attr) && is_zero(field(Some(proposed), name)) {
            planned.insert(name.clone(), prior_value.clone());
        }
    }
    let planned = Value::Object(planned);

    let mut names: Vec<&String> = block.attributes.keys().chain(block.blocks.keys()).collect();
    names.sort();
    names.dedup();

    let mut changes = Vec::new();
    let mut requires_replace = false;
    for name in names {
        if block.attributes.get(name).is_some_and(is_computed_only) {
            continue;
        }
        let before = field(prior, name);
        let after = field(Some(&planned), name);
        if prior.is_some() && equivalent(before, after) {
            continue;
        }
        if prior.is_none() && is_zero(after) {
            continue;
        }
        changes.push(change(name, before, after));

        if prior.is_some() {
            requires_replace |= match (block.attributes.get(name), block.blocks.get(name)) {
                (Some(attr), _) => attr.force_new,
                (None, Some(nested)) => {
                    nested.force_new || block_forces_replacement(&nested.block, before, after)
                }
                (None, None) => false,
            };
        }
    }

    PlanResult::with_changes(planned, changes, requires_replace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Block, NestedBlock, Schema};
    use serde_json::json;

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string().with_force_new())
            .with_attribute("location", Attribute::required_string().with_force_new())
            .with_attribute("kind", Attribute::optional_computed_string())
            .with_attribute("tags", Attribute::tags())
            .with_attribute("num_cpus", Attribute::optional_int64())
            .with_block(
                "extended_location",
                NestedBlock::list_max_one(
                    Block::new()
                        .with_attribute("name", Attribute::required_string())
                        .with_attribute("type", Attribute::required_string()),
                )
                .with_force_new(),
            )
            .with_block(
                "disk",
                NestedBlock::list(
                    Block::new()
                        .with_attribute("name", Attribute::required_string().with_force_new())
                        .with_attribute("disk_size_gb", Attribute::optional_int64()),
                ),
            )
    }

    fn prior() -> Value {
        json!({
            "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.ConnectedVMwarevSphere/clusters/c1",
            "name": "c1",
            "location": "westus",
            "kind": "VMware",
            "tags": {"env": "dev"},
            "num_cpus": null,
            "extended_location": [{"name": "cl", "type": "CustomLocation"}],
            "disk": [{"name": "os", "disk_size_gb": 10}]
        })
    }

    #[test]
    fn test_zero_equivalence() {
        assert!(equivalent(&Value::Null, &json!("")));
        assert!(equivalent(&json!({}), &Value::Null));
        assert!(equivalent(&json!({"a": null}), &json!({})));
        assert!(equivalent(&json!(1), &json!(1.0)));
        assert!(!equivalent(&json!([]), &json!([{"name": "x"}])));
        assert!(!equivalent(&json!(true), &Value::Null));
    }

    #[test]
    fn test_create_plan_leaves_computed_unknown() {
        let proposed = json!({"name": "c1", "location": "westus", "tags": {}});
        let plan = diff(&schema(), None, &proposed);

        assert!(!plan.requires_replace);
        assert_eq!(plan.planned_state["id"], Value::Null);
        assert_eq!(plan.changed_paths(), vec!["location", "name"]);
    }

    #[test]
    fn test_no_change_carries_computed_values() {
        let mut proposed = prior();
        proposed["id"] = Value::Null;
        proposed["kind"] = Value::Null;
        proposed["num_cpus"] = json!(0);

        let prior = prior();
        let plan = diff(&schema(), Some(&prior), &proposed);
        assert!(plan.changes.is_empty(), "{:?}", plan.changes);
        assert_eq!(plan.planned_state["id"], prior["id"]);
        assert_eq!(plan.planned_state["kind"], "VMware");
    }

    #[test]
    fn test_tag_change_is_in_place() {
        let mut proposed = prior();
        proposed["tags"] = json!({"env": "prod"});

        let plan = diff(&schema(), Some(&prior()), &proposed);
        assert_eq!(plan.changed_paths(), vec!["tags"]);
        assert!(!plan.requires_replace);
    }

    #[test]
    fn test_force_new_attribute_replaces() {
        let mut proposed = prior();
        proposed["location"] = json!("eastus");

        let plan = diff(&schema(), Some(&prior()), &proposed);
        assert!(plan.requires_replace);
        assert_eq!(plan.changes[0].before, Some(json!("westus")));
    }

    #[test]
    fn test_force_new_block_replaces() {
        let mut proposed = prior();
        proposed["extended_location"] = json!([{"name": "other", "type": "CustomLocation"}]);

        let plan = diff(&schema(), Some(&prior()), &proposed);
        assert_eq!(plan.changed_paths(), vec!["extended_location"]);
        assert!(plan.requires_replace);
    }

    #[test]
    fn test_nested_force_new_attribute() {
        let mut resize = prior();
        resize["disk"] = json!([{"name": "os", "disk_size_gb": 20}]);
        let plan = diff(&schema(), Some(&prior()), &resize);
        assert_eq!(plan.changed_paths(), vec!["disk"]);
        assert!(!plan.requires_replace);

        let mut rename = prior();
        rename["disk"] = json!([{"name": "data", "disk_size_gb": 10}]);
        assert!(diff(&schema(), Some(&prior()), &rename).requires_replace);
    }

    #[test]
    fn test_destroy_plan() {
        let plan = diff(&schema(), Some(&prior()), &Value::Null);
        assert!(plan.planned_state.is_null());
        assert!(plan.changes.iter().all(|c| c.after.is_none()));
        assert!(plan.changed_paths().contains(&"name"));
    }
}
