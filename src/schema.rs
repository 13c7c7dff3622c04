//! Schema types for the provider block, resources and data sources.
//!
//! A [`Schema`] is built once per type with the builder methods below and
//! drives three things: [`crate::validation`], plan diffing in
//! [`crate::plan`] and the `GetSchema` response.
//!
//! ```
//! use hemmer_provider_azurerm::schema::{Attribute, Block, NestedBlock, Schema};
//!
//! let schema = Schema::v0()
//!     .with_attribute("id", Attribute::computed_string())
//!     .with_attribute("name", Attribute::required_string().with_force_new().not_empty())
//!     .with_attribute("tags", Attribute::tags())
//!     .with_block(
//!         "identity",
//!         NestedBlock::list_max_one(
//!             Block::new().with_attribute("type", Attribute::required_string()),
//!         ),
//!     );
//! assert!(schema.block.attributes["name"].force_new);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The type of an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// A string.
    String,
    /// A 64-bit integer.
    Int64,
    /// A 64-bit float.
    Float64,
    /// A boolean.
    Bool,
    /// An ordered list.
    List(Box<AttributeType>),
    /// A string-keyed map, e.g. `tags`.
    Map(Box<AttributeType>),
}

impl AttributeType {
    /// `list(element)`
    pub fn list(element: AttributeType) -> Self {
        Self::List(Box::new(element))
    }

    /// `map(element)`
    pub fn map(element: AttributeType) -> Self {
        Self::Map(Box::new(element))
    }
}

/// Who sets an attribute: the user, the provider or either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttributeFlags {
    /// Must be present in configuration.
    pub required: bool,
    /// May be present in configuration.
    pub optional: bool,
    /// Set by the provider from the API response.
    pub computed: bool,
    /// Redacted in plans and logs.
    pub sensitive: bool,
}

impl AttributeFlags {
    /// User must set it.
    pub fn required() -> Self {
        Self {
            required: true,
            ..Default::default()
        }
    }

    /// User may set it.
    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Default::default()
        }
    }

    /// Only the provider sets it.
    pub fn computed() -> Self {
        Self {
            computed: true,
            ..Default::default()
        }
    }

    /// User may set it; the API fills it in otherwise.
    pub fn optional_computed() -> Self {
        Self {
            optional: true,
            computed: true,
            ..Default::default()
        }
    }
}

/// One attribute of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Value type.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Required, optional, computed and sensitive bits.
    #[serde(flatten)]
    pub flags: AttributeFlags,
    /// Shown in `GetSchema`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// A change to this attribute replaces the resource.
    #[serde(default)]
    pub force_new: bool,
    /// Value used when the attribute is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Checks run by [`crate::validation::validate`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Attribute {
    /// An attribute of `attr_type` with `flags` and nothing else set.
    pub fn new(attr_type: AttributeType, flags: AttributeFlags) -> Self {
        Self {
            attr_type,
            flags,
            description: None,
            force_new: false,
            default: None,
            validators: Vec::new(),
        }
    }

    /// Required string.
    pub fn required_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::required())
    }

    /// Optional string.
    pub fn optional_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::optional())
    }

    /// Computed string.
    pub fn computed_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::computed())
    }

    /// Optional string that the API fills in when unset.
    pub fn optional_computed_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::optional_computed())
    }

    /// Required integer.
    pub fn required_int64() -> Self {
        Self::new(AttributeType::Int64, AttributeFlags::required())
    }

    /// Optional integer.
    pub fn optional_int64() -> Self {
        Self::new(AttributeType::Int64, AttributeFlags::optional())
    }

    /// Optional float.
    pub fn optional_float64() -> Self {
        Self::new(AttributeType::Float64, AttributeFlags::optional())
    }

    /// Required bool.
    pub fn required_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeFlags::required())
    }

    /// Optional bool.
    pub fn optional_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeFlags::optional())
    }

    /// Optional list of strings.
    pub fn string_list() -> Self {
        Self::new(AttributeType::list(AttributeType::String), AttributeFlags::optional())
    }

    /// The optional `tags` map carried by most Azure resources.
    pub fn tags() -> Self {
        Self::new(AttributeType::map(AttributeType::String), AttributeFlags::optional())
    }

    /// Make the attribute required.
    pub fn required(mut self) -> Self {
        self.flags.required = true;
        self.flags.optional = false;
        self
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the resource when this attribute changes.
    pub fn with_force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Use `default` when the attribute is unset.
    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Redact the value.
    pub fn sensitive(mut self) -> Self {
        self.flags.sensitive = true;
        self
    }

    /// Add a value check.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Restrict a string to one of `values`.
    pub fn one_of(self, values: &[&str]) -> Self {
        self.with_validator(Validator::OneOf(values.iter().map(|v| v.to_string()).collect()))
    }

    /// Reject empty strings.
    pub fn not_empty(self) -> Self {
        self.with_validator(Validator::NotEmpty)
    }
}

/// A check applied to an attribute value.
///
/// List and map values are checked element by element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Validator {
    /// Non-empty string.
    NotEmpty,
    /// One of the listed strings, case-sensitive.
    OneOf(Vec<String>),
    /// TCP port, 1 to 65535.
    PortNumber,
    /// Integer no smaller than the bound.
    IntAtLeast(i64),
    /// Canonical hyphenated UUID.
    Uuid,
    /// ARM resource ID whose type chain matches, e.g. `Microsoft.Web/sites`.
    ResourceId(String),
}

/// How the elements of a nested block are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockNestingMode {
    /// An object, not wrapped in a list.
    #[default]
    Single,
    /// A list of objects. Azure sub-objects use this with `max_items = 1`.
    List,
}

/// Attributes and nested blocks at one level of a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Attributes by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Attribute>,
    /// Nested blocks by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub blocks: BTreeMap<String, NestedBlock>,
    /// Shown in `GetSchema`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Block {
    /// An empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    /// Add a nested block.
    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.blocks.insert(name.into(), block);
        self
    }
}

/// A block nested inside another, with its cardinality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedBlock {
    /// Element schema.
    #[serde(flatten)]
    pub block: Block,
    /// Element arrangement.
    #[serde(default)]
    pub nesting_mode: BlockNestingMode,
    /// Fewest elements allowed.
    #[serde(default)]
    pub min_items: u32,
    /// Most elements allowed, 0 for no limit.
    #[serde(default)]
    pub max_items: u32,
    /// Any change inside the block replaces the resource.
    #[serde(default)]
    pub force_new: bool,
}

impl NestedBlock {
    /// A list of any length.
    pub fn list(block: Block) -> Self {
        Self {
            block,
            nesting_mode: BlockNestingMode::List,
            min_items: 0,
            max_items: 0,
            force_new: false,
        }
    }

    /// A list of zero or one element, the usual shape of an optional
    /// sub-object.
    pub fn list_max_one(block: Block) -> Self {
        Self {
            max_items: 1,
            ..Self::list(block)
        }
    }

    /// A list of exactly one element.
    pub fn list_exactly_one(block: Block) -> Self {
        Self {
            min_items: 1,
            ..Self::list_max_one(block)
        }
    }

    /// Require at least `min` elements.
    pub fn with_min_items(mut self, min: u32) -> Self {
        self.min_items = min;
        self
    }

    /// Replace the resource when anything inside the block changes.
    pub fn with_force_new(mut self) -> Self {
        self.force_new = true;
        self
    }
}

/// Schema for one resource, data source or the provider block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Bumped when the state layout changes.
    #[serde(default)]
    pub version: u64,
    /// Top-level attributes and blocks.
    #[serde(flatten)]
    pub block: Block,
}

impl Schema {
    /// An empty schema at `version`.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            block: Block::new(),
        }
    }

    /// An empty schema at version 0.
    pub fn v0() -> Self {
        Self::new(0)
    }

    /// Add a top-level attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.block.attributes.insert(name.into(), attr);
        self
    }

    /// Add a top-level nested block.
    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.block.blocks.insert(name.into(), block);
        self
    }
}

/// Everything `GetSchema` returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderSchema {
    /// The provider block.
    #[serde(default)]
    pub provider: Schema,
    /// Resource schemas by type name.
    #[serde(default)]
    pub resources: BTreeMap<String, Schema>,
    /// Data source schemas by type name.
    #[serde(default)]
    pub data_sources: BTreeMap<String, Schema>,
}

impl ProviderSchema {
    /// No provider block, resources or data sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider block schema.
    pub fn with_provider_config(mut self, schema: Schema) -> Self {
        self.provider = schema;
        self
    }

    /// Add a resource type.
    pub fn with_resource(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(name.into(), schema);
        self
    }

    /// Add a data source type.
    pub fn with_data_source(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.data_sources.insert(name.into(), schema);
        self
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Blocks the operation.
    Error,
    /// Reported, but the operation goes ahead.
    Warning,
}

/// A problem reported back to the engine instead of failing the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Error or warning.
    pub severity: DiagnosticSeverity,
    /// One-line summary.
    pub summary: String,
    /// Longer explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Dotted path of the offending attribute, e.g. `network_profile.0.nic`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    fn with_severity(severity: DiagnosticSeverity, summary: impl Into<String>) -> Self {
        Self {
            severity,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// An error.
    pub fn error(summary: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Error, summary)
    }

    /// A warning.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Warning, summary)
    }

    /// Attach a longer explanation.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Point at an attribute path.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Whether this blocks the operation.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_block_shapes() {
        let optional = NestedBlock::list_max_one(Block::new());
        assert_eq!((optional.min_items, optional.max_items), (0, 1));
        assert_eq!(optional.nesting_mode, BlockNestingMode::List);

        let required = NestedBlock::list_exactly_one(Block::new()).with_force_new();
        assert_eq!((required.min_items, required.max_items), (1, 1));
        assert!(required.force_new);

        let nodes = NestedBlock::list(Block::new()).with_min_items(1);
        assert_eq!((nodes.min_items, nodes.max_items), (1, 0));
    }

    #[test]
    fn test_attribute_builders() {
        let attr = Attribute::optional_string()
            .required()
            .with_force_new()
            .not_empty()
            .one_of(&["Kubernetes"]);
        assert!(attr.flags.required);
        assert!(!attr.flags.optional);
        assert!(attr.force_new);
        assert_eq!(
            attr.validators,
            vec![Validator::NotEmpty, Validator::OneOf(vec!["Kubernetes".to_string()])]
        );

        let secret = Attribute::optional_string().sensitive();
        assert!(secret.flags.sensitive && secret.flags.optional);
    }

    #[test]
    fn test_attribute_type_wire_form() {
        assert_eq!(serde_json::to_value(AttributeType::String).unwrap(), json!("string"));
        assert_eq!(
            serde_json::to_value(Attribute::tags().attr_type).unwrap(),
            json!({"map": "string"})
        );
        assert_eq!(
            serde_json::to_value(Validator::ResourceId("Microsoft.Web/sites".to_string())).unwrap(),
            json!({"kind": "resource_id", "value": "Microsoft.Web/sites"})
        );
        assert_eq!(serde_json::to_value(Validator::Uuid).unwrap(), json!({"kind": "uuid"}));
    }

    #[test]
    fn test_provider_schema_is_sorted() {
        let schema = ProviderSchema::new()
            .with_resource("azurerm_b", Schema::v0())
            .with_resource("azurerm_a", Schema::new(1))
            .with_data_source("azurerm_c", Schema::v0());
        assert_eq!(schema.resources.keys().collect::<Vec<_>>(), ["azurerm_a", "azurerm_b"]);
        assert_eq!(schema.resources["azurerm_a"].version, 1);
        assert!(schema.data_sources.contains_key("azurerm_c"));
    }

    #[test]
    fn test_diagnostic() {
        let diag = Diagnostic::error("invalid value")
            .with_detail("expected a UUID")
            .with_attribute("identity.0.client_id");
        assert!(diag.is_error());
        assert_eq!(diag.attribute.as_deref(), Some("identity.0.client_id"));
        assert!(!Diagnostic::warning("deprecated").is_error());
    }
}
