//! Helpers shared by the resource implementations: model decoding, the
//! create-time existence check, read-side "gone" handling and the schema
//! fragments most ARM resources carry.

use std::collections::HashMap;
use std::fmt::Display;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ResourceContext;
use crate::error::{ProviderError, ResultExt};
use crate::schema::{Attribute, Block, NestedBlock};

/// Resource tags as sent to and received from ARM.
pub type Tags = HashMap<String, String>;

/// Drop `null` object members so `#[serde(default)]` fills them in.
fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

/// Decode a configuration or state object into its model.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ProviderError> {
    serde_json::from_value(strip_nulls(value))
        .map_err(|e| ProviderError::Validation(format!("decoding configuration: {e}")))
}

/// Encode a model into a state object.
pub fn encode<T: Serialize>(model: &T) -> Result<Value, ProviderError> {
    Ok(serde_json::to_value(model)?)
}

/// The `id` recorded in `state`.
pub fn state_id(state: &Value) -> Result<&str, ProviderError> {
    state
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ProviderError::InvalidRequest("state has no resource ID".to_string()))
}

/// Canonical form of an Azure region: lowercase with spaces removed, so
/// `West Europe` and `westeurope` compare equal.
pub fn normalize_location(location: &str) -> String {
    location.replace(' ', "").to_lowercase()
}

/// `None` for an empty string.
pub fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// `None` for zero.
pub fn non_zero(value: i64) -> Option<i64> {
    (value != 0).then_some(value)
}

/// The `extended_location` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendedLocationModel {
    /// Custom location resource ID.
    pub name: String,
    /// Usually `CustomLocation`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// ARM `extendedLocation`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedLocation {
    /// Custom location resource ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Extended location type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// The API form of the first `extended_location` element.
pub fn expand_extended_location(input: &[ExtendedLocationModel]) -> Option<ExtendedLocation> {
    input.first().map(|v| ExtendedLocation {
        name: non_empty(&v.name),
        kind: non_empty(&v.kind),
    })
}

/// The block form of an API `extendedLocation`.
pub fn flatten_extended_location(input: Option<&ExtendedLocation>) -> Vec<ExtendedLocationModel> {
    input
        .map(|v| ExtendedLocationModel {
            name: v.name.clone().unwrap_or_default(),
            kind: v.kind.clone().unwrap_or_default(),
        })
        .into_iter()
        .collect()
}

/// Fail with the import error if `id` already exists.
pub async fn check_requires_import(
    ctx: &ResourceContext,
    id: &(impl Display + ?Sized),
    api_version: &str,
) -> Result<(), ProviderError> {
    let existing: Option<Value> = ctx
        .client
        .get_optional(&id.to_string(), api_version)
        .await
        .with_context(|| format!("checking for presence of existing {id}"))?;
    if existing.is_some() {
        return Err(ProviderError::requires_import(id));
    }
    Ok(())
}

/// GET `id`, with a 404 meaning the resource is gone.
pub async fn read_or_gone<T: DeserializeOwned>(
    ctx: &ResourceContext,
    id: &(impl Display + ?Sized),
    api_version: &str,
) -> Result<Option<T>, ProviderError> {
    match ctx.client.get(&id.to_string(), api_version).await {
        Ok(model) => Ok(Some(model)),
        Err(err) if err.is_not_found() => {
            tracing::info!(id = %id, "Resource was not found, removing from state");
            Ok(None)
        }
        Err(err) => Err(ProviderError::from(err).context(format!("retrieving {id}"))),
    }
}

/// `name`: required, ForceNew, non-empty.
pub fn name_attribute() -> Attribute {
    Attribute::required_string().with_force_new().not_empty()
}

/// `resource_group_name`: required, ForceNew, non-empty.
pub fn resource_group_name_attribute() -> Attribute {
    Attribute::required_string().with_force_new().not_empty()
}

/// `location`: required, ForceNew, non-empty.
pub fn location_attribute() -> Attribute {
    Attribute::required_string().with_force_new().not_empty()
}

/// An `extended_location` list with at most one `{name, type}` element.
pub fn extended_location_block() -> NestedBlock {
    NestedBlock::list_max_one(
        Block::new()
            .with_attribute("name", Attribute::required_string().not_empty())
            .with_attribute("type", Attribute::required_string().not_empty()),
    )
    .with_force_new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resourceids::ClusterId;
    use crate::testing::fake_arm::FakeArm;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Model {
        name: String,
        num_cpus: i64,
        extended_location: Vec<ExtendedLocationModel>,
        tags: Tags,
    }

    #[test]
    fn test_decode_treats_null_as_unset() {
        let model: Model = decode(json!({
            "name": "c1",
            "num_cpus": null,
            "tags": null,
            "extended_location": [{"name": "cl", "type": null}]
        }))
        .unwrap();
        assert_eq!(model.name, "c1");
        assert_eq!(model.num_cpus, 0);
        assert!(model.tags.is_empty());
        assert_eq!(model.extended_location[0].kind, "");
    }

    #[test]
    fn test_decode_type_mismatch_is_validation_error() {
        let err = decode::<Model>(json!({"num_cpus": "four"})).unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
        assert!(err.message().starts_with("decoding configuration"));
    }

    #[test]
    fn test_state_id() {
        assert_eq!(state_id(&json!({"id": "/x"})).unwrap(), "/x");
        assert!(state_id(&json!({"id": ""})).is_err());
        assert!(state_id(&json!({})).is_err());
    }

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location("West Europe"), "westeurope");
        assert_eq!(normalize_location("eastus"), "eastus");
    }

    #[test]
    fn test_extended_location_expand_flatten() {
        let model = vec![ExtendedLocationModel {
            name: "/subscriptions/s/resourceGroups/rg/providers/Microsoft.ExtendedLocation/customLocations/cl".to_string(),
            kind: "CustomLocation".to_string(),
        }];
        let api = expand_extended_location(&model);
        assert_eq!(
            serde_json::to_value(&api).unwrap()["type"],
            json!("CustomLocation")
        );
        assert_eq!(flatten_extended_location(api.as_ref()), model);
        assert!(expand_extended_location(&[]).is_none());
        assert!(flatten_extended_location(None).is_empty());
    }

    #[tokio::test]
    async fn test_check_requires_import() {
        let arm = FakeArm::start().await;
        let id = ClusterId::new("sub", "rg", "c1");
        let ctx = arm.context();

        check_requires_import(&ctx, &id, "2023-10-01").await.unwrap();

        arm.insert(&id.to_string(), json!({"location": "westus"}));
        let err = check_requires_import(&ctx, &id, "2023-10-01").await.unwrap_err();
        assert!(matches!(err, ProviderError::AlreadyExists(_)));
        assert!(err.message().contains("needs to be imported into the State"));
        assert!(err.message().contains(&id.to_string()));
    }

    #[tokio::test]
    async fn test_read_or_gone() {
        let arm = FakeArm::start().await;
        let id = ClusterId::new("sub", "rg", "c1");
        let ctx = arm.context();

        let gone: Option<Value> = read_or_gone(&ctx, &id, "2023-10-01").await.unwrap();
        assert!(gone.is_none());

        arm.insert(&id.to_string(), json!({"kind": "VMware"}));
        let found: Option<Value> = read_or_gone(&ctx, &id, "2023-10-01").await.unwrap();
        assert_eq!(found.unwrap()["kind"], "VMware");
    }

    #[tokio::test]
    async fn test_read_error_carries_context() {
        let arm = FakeArm::start().await;
        arm.fail_next("GET", 500).await;
        let id = ClusterId::new("sub", "rg", "c1");

        let err = read_or_gone::<Value>(&arm.context(), &id, "2023-10-01")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
        assert!(err.message().starts_with(&format!("retrieving {id}: ")));
    }
}
