//! Configuration validation.
//!
//! [`validate`] walks a configuration value alongside its [`Schema`] and
//! reports every problem it finds as a [`Diagnostic`] whose `attribute` is a
//! dotted path, e.g. `cluster_profile.0.autoscale_profile.0.autoscale_type`.
//! Computed-only attributes are never checked. Validators only run when the
//! value has the right type.
//!
//! ```
//! use hemmer_provider_azurerm::schema::{Attribute, Schema, Validator};
//! use hemmer_provider_azurerm::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::required_string().not_empty())
//!     .with_attribute("port", Attribute::optional_int64().with_validator(Validator::PortNumber));
//!
//! assert!(validate(&schema, &json!({"name": "vc1", "port": 443})).is_empty());
//! assert_eq!(validate(&schema, &json!({"name": "", "port": "443"})).len(), 2);
//! ```

use serde_json::{Map, Value};

use crate::resourceids::ArmId;
use crate::schema::{
    Attribute, AttributeType, Block, BlockNestingMode, Diagnostic, NestedBlock, Schema, Validator,
};

/// Check `value` against `schema`. An empty result means it is valid.
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut walker = Walker::default();
    match value {
        Value::Object(map) => walker.block(&schema.block, map, ""),
        Value::Null => {},
        other => walker.push(
            Diagnostic::error("configuration must be an object")
                .with_detail(format!("got {}", kind(other))),
        ),
    }
    walker.diagnostics
}

#[derive(Default)]
struct Walker {
    diagnostics: Vec<Diagnostic>,
}

impl Walker {
    fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn fail(&mut self, path: &str, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(
            Diagnostic::error(summary)
                .with_detail(detail)
                .with_attribute(path),
        );
    }

    fn block(&mut self, block: &Block, map: &Map<String, Value>, path: &str) {
        for (name, attr) in &block.attributes {
            self.attribute(attr, map.get(name), &join(path, name));
        }
        for (name, nested) in &block.blocks {
            self.nested(nested, map.get(name), &join(path, name));
        }
    }

    fn attribute(&mut self, attr: &Attribute, value: Option<&Value>, path: &str) {
        let flags = attr.flags;
        if flags.computed && !flags.optional && !flags.required {
            return;
        }
        match value {
            None | Some(Value::Null) if flags.required => self.fail(
                path,
                format!("Missing required argument {path:?}"),
                "The argument is required, but no definition was found.",
            ),
            None | Some(Value::Null) => {},
            Some(value) => {
                if self.type_matches(&attr.attr_type, value, path) {
                    self.validators(&attr.validators, value, path);
                }
            }
        }
    }

    /// Records a diagnostic for every mismatch and returns whether there
    /// were none.
    fn type_matches(&mut self, attr_type: &AttributeType, value: &Value, path: &str) -> bool {
        let ok = match (attr_type, value) {
            (AttributeType::String, Value::String(_)) => true,
            (AttributeType::Int64, v) => is_int64(v),
            (AttributeType::Float64, Value::Number(_)) => true,
            (AttributeType::Bool, Value::Bool(_)) => true,
            (AttributeType::List(element), Value::Array(items)) => {
                let mut ok = true;
                for (i, item) in items.iter().enumerate() {
                    ok &= self.type_matches(element, item, &join(path, &i.to_string()));
                }
                return ok;
            }
            (AttributeType::Map(element), Value::Object(map)) => {
                let mut ok = true;
                for (key, item) in map {
                    ok &= self.type_matches(element, item, &join(path, key));
                }
                return ok;
            }
            _ => false,
        };
        if !ok {
            self.fail(
                path,
                format!("Incorrect attribute value type for {path:?}"),
                format!("expected {}, got {}", type_name(attr_type), kind(value)),
            );
        }
        ok
    }

    fn validators(&mut self, validators: &[Validator], value: &Value, path: &str) {
        match value {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.validators(validators, item, &join(path, &i.to_string()));
                }
            }
            Value::Object(map) => {
                for (key, item) in map {
                    self.validators(validators, item, &join(path, key));
                }
            }
            scalar => {
                for validator in validators {
                    if let Some(detail) = check(validator, scalar, path) {
                        self.fail(path, format!("Invalid value for {path:?}"), detail);
                    }
                }
            }
        }
    }

    fn nested(&mut self, nested: &NestedBlock, value: Option<&Value>, path: &str) {
        let items: Vec<&Value> = match (nested.nesting_mode, value) {
            (_, None | Some(Value::Null)) => Vec::new(),
            (BlockNestingMode::Single, Some(v)) => vec![v],
            (BlockNestingMode::List, Some(Value::Array(items))) => items.iter().collect(),
            (BlockNestingMode::List, Some(other)) => {
                self.fail(
                    path,
                    format!("Incorrect block type for {path:?}"),
                    format!("expected a list of blocks, got {}", kind(other)),
                );
                return;
            }
        };

        let count = items.len() as u32;
        if count < nested.min_items {
            self.fail(
                path,
                format!("Insufficient {path} blocks"),
                format!("at least {} block(s) are required, got {count}", nested.min_items),
            );
        }
        if nested.max_items > 0 && count > nested.max_items {
            self.fail(
                path,
                format!("Too many {path} blocks"),
                format!("no more than {} block(s) are allowed, got {count}", nested.max_items),
            );
        }

        for (i, item) in items.into_iter().enumerate() {
            let item_path = match nested.nesting_mode {
                BlockNestingMode::Single => path.to_string(),
                BlockNestingMode::List => join(path, &i.to_string()),
            };
            match item {
                Value::Object(map) => self.block(&nested.block, map, &item_path),
                other => self.fail(
                    &item_path,
                    format!("Incorrect block type for {item_path:?}"),
                    format!("expected an object, got {}", kind(other)),
                ),
            }
        }
    }
}

/// The failure message, or `None` when `value` passes.
fn check(validator: &Validator, value: &Value, path: &str) -> Option<String> {
    match (validator, value) {
        (Validator::NotEmpty, Value::String(s)) if s.is_empty() => {
            Some(format!("expected {path:?} to not be an empty string"))
        }
        (Validator::OneOf(allowed), Value::String(s)) if !allowed.contains(s) => {
            Some(format!("expected {path} to be one of {allowed:?}, got {s}"))
        }
        (Validator::PortNumber, Value::Number(n)) => match n.as_i64() {
            Some(1..=65535) => None,
            _ => Some(format!("expected {path} to be a valid port number, got {n}")),
        },
        (Validator::IntAtLeast(min), Value::Number(n)) => match n.as_i64() {
            Some(v) if v >= *min => None,
            _ => Some(format!("expected {path} to be at least ({min}), got {n}")),
        },
        (Validator::Uuid, Value::String(s)) => match uuid::Uuid::try_parse(s) {
            Ok(_) if s.len() == 36 => None,
            _ => Some(format!("expected {path:?} to be a valid UUID, got {s}")),
        },
        (Validator::ResourceId(expected), Value::String(s)) => match ArmId::parse(s) {
            Ok(id) if id.is_type(expected) => None,
            Ok(id) => Some(format!(
                "expected {path} to be a {expected} ID, got a {} ID",
                id.type_chain()
            )),
            Err(err) => Some(format!("expected {path} to be a {expected} ID: {}", err.message())),
        },
        _ => None,
    }
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}.{name}")
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn type_name(attr_type: &AttributeType) -> &'static str {
    match attr_type {
        AttributeType::String => "string",
        AttributeType::Int64 => "number (integer)",
        AttributeType::Float64 => "number",
        AttributeType::Bool => "bool",
        AttributeType::List(_) => "list",
        AttributeType::Map(_) => "map",
    }
}

/// Integers, including floats with no fractional part.
fn is_int64(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.is_i64() => true,
        Value::Number(n) => n
            .as_f64()
            .is_some_and(|f| f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Block, NestedBlock, Schema};
    use serde_json::json;

    fn vm_schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string().not_empty())
            .with_attribute("firmware_type", Attribute::optional_string().one_of(&["bios", "efi"]))
            .with_attribute("memory_size_mb", Attribute::optional_int64())
            .with_attribute("secure_boot_enabled", Attribute::optional_bool())
            .with_attribute("tags", Attribute::tags())
            .with_block(
                "network_profile",
                NestedBlock::list_max_one(Block::new().with_block(
                    "network_interface",
                    NestedBlock::list(
                        Block::new()
                            .with_attribute("name", Attribute::required_string())
                            .with_attribute("dns_servers", Attribute::string_list().not_empty()),
                    )
                    .with_min_items(1),
                )),
            )
    }

    fn paths(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().filter_map(|d| d.attribute.as_deref()).collect()
    }

    #[test]
    fn test_valid_config() {
        let config = json!({
            "name": "vm1",
            "firmware_type": "efi",
            "memory_size_mb": 4096.0,
            "tags": {"env": "dev"},
            "network_profile": [{"network_interface": [{"name": "nic1", "dns_servers": ["10.0.0.1"]}]}]
        });
        assert!(validate(&vm_schema(), &config).is_empty());
        let unset = json!({"name": "vm1", "network_profile": null});
        assert!(validate(&vm_schema(), &unset).is_empty());
    }

    #[test]
    fn test_required_and_computed() {
        let diagnostics = validate(&vm_schema(), &json!({"id": 12}));
        assert_eq!(paths(&diagnostics), ["name"]);
        assert!(diagnostics[0].summary.starts_with("Missing required argument"));

        assert_eq!(paths(&validate(&vm_schema(), &json!({"name": null}))), ["name"]);
    }

    #[test]
    fn test_type_errors() {
        let diagnostics = validate(
            &vm_schema(),
            &json!({
                "name": "vm1",
                "memory_size_mb": 1.5,
                "secure_boot_enabled": "yes",
                "tags": {"env": 1}
            }),
        );
        assert_eq!(paths(&diagnostics), ["memory_size_mb", "secure_boot_enabled", "tags.env"]);
        assert_eq!(diagnostics[1].detail.as_deref(), Some("expected bool, got string"));
    }

    #[test]
    fn test_root_must_be_an_object() {
        let diagnostics = validate(&vm_schema(), &json!([1]));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].attribute.is_none());
    }

    #[test]
    fn test_nested_paths_and_cardinality() {
        let diagnostics = validate(
            &vm_schema(),
            &json!({
                "name": "vm1",
                "network_profile": [
                    {"network_interface": [{"dns_servers": ["10.0.0.1", ""]}]},
                    {"network_interface": []}
                ]
            }),
        );
        assert_eq!(
            paths(&diagnostics),
            [
                "network_profile",
                "network_profile.0.network_interface.0.dns_servers.1",
                "network_profile.0.network_interface.0.name",
                "network_profile.1.network_interface",
            ]
        );

        let diagnostics =
            validate(&vm_schema(), &json!({"name": "vm1", "network_profile": {"a": 1}}));
        assert_eq!(paths(&diagnostics), ["network_profile"]);
    }

    #[test]
    fn test_not_empty_and_one_of() {
        let diagnostics = validate(&vm_schema(), &json!({"name": "", "firmware_type": "EFI"}));
        assert_eq!(paths(&diagnostics), ["firmware_type", "name"]);
        assert!(diagnostics[0].detail.as_deref().unwrap_or_default().contains("one of"));
    }

    #[test]
    fn test_validators_skipped_on_type_error() {
        let schema = Schema::v0().with_attribute(
            "port",
            Attribute::optional_int64().with_validator(Validator::PortNumber),
        );
        let diagnostics = validate(&schema, &json!({"port": "443"}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.starts_with("Incorrect attribute value type"));
    }

    #[test]
    fn test_numeric_validators() {
        let schema = Schema::v0()
            .with_attribute(
                "port",
                Attribute::optional_int64().with_validator(Validator::PortNumber),
            )
            .with_attribute(
                "count",
                Attribute::optional_int64().with_validator(Validator::IntAtLeast(1)),
            );
        assert!(validate(&schema, &json!({"port": 443, "count": 1})).is_empty());
        assert_eq!(validate(&schema, &json!({"port": 0})).len(), 1);
        assert_eq!(validate(&schema, &json!({"port": 70000})).len(), 1);
        assert_eq!(validate(&schema, &json!({"count": 0})).len(), 1);
    }

    #[test]
    fn test_uuid_validator() {
        let schema = Schema::v0().with_attribute(
            "smbios_uuid",
            Attribute::optional_string().with_validator(Validator::Uuid),
        );
        let check = |value: &str| validate(&schema, &json!({ "smbios_uuid": value })).len();
        assert_eq!(check("4b8e3a1c-2f0d-4e7b-9c55-6a1d2e3f4b5c"), 0);
        assert_eq!(check("not-a-uuid"), 1);
        assert_eq!(check("4b8e3a1c2f0d4e7b9c556a1d2e3f4b5c"), 1);
    }

    #[test]
    fn test_resource_id_validator() {
        let schema = Schema::v0().with_attribute(
            "app_service_id",
            Attribute::required_string()
                .with_validator(Validator::ResourceId("Microsoft.Web/sites".to_string())),
        );
        let app = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg/providers/Microsoft.Web/sites/app1";
        assert!(validate(&schema, &json!({"app_service_id": app})).is_empty());

        let vault = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/kv1";
        let diagnostics = validate(&schema, &json!({"app_service_id": vault}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0]
            .detail
            .as_deref()
            .unwrap_or_default()
            .contains("Microsoft.KeyVault/vaults"));

        assert_eq!(validate(&schema, &json!({"app_service_id": "app1"})).len(), 1);
    }
}
