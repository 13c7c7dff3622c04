use serde::{Deserialize, Serialize};

use crate::resources::common::{
    expand_extended_location, extended_location_block, flatten_extended_location,
    location_attribute, name_attribute, non_empty, normalize_location,
    resource_group_name_attribute, ExtendedLocation, ExtendedLocationModel, Tags,
};
use crate::schema::{Attribute, Block};

/// Arguments shared by every vSphere object projected into Azure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ConnectedVmwareModel {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub extended_location: Vec<ExtendedLocationModel>,
    pub kind: String,
    pub inventory_item_id: String,
    pub mo_ref_id: String,
    pub vcenter_id: String,
    pub tags: Tags,
}

/// The common argument set. The VM nests it under `connected_vmware`; the
/// other resources use it at the top level.
pub(crate) fn common_block() -> Block {
    Block::new()
        .with_attribute("name", name_attribute())
        .with_attribute("resource_group_name", resource_group_name_attribute())
        .with_attribute("location", location_attribute())
        .with_block("extended_location", extended_location_block())
        .with_attribute("kind", Attribute::optional_string().with_force_new())
        .with_attribute(
            "inventory_item_id",
            Attribute::optional_string().with_force_new().not_empty(),
        )
        .with_attribute(
            "mo_ref_id",
            Attribute::optional_string().with_force_new().not_empty(),
        )
        .with_attribute(
            "vcenter_id",
            Attribute::optional_string().with_force_new().not_empty(),
        )
        .with_attribute("tags", Attribute::tags())
}

/// The `properties` members every vSphere object carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VSphereProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mo_ref_id: Option<String>,
    #[serde(rename = "vCenterId", default, skip_serializing_if = "Option::is_none")]
    pub v_center_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

/// A cluster, datastore, host or resource pool as ARM returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VSphereResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_location: Option<ExtendedLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub properties: VSphereProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

/// `{"tags": ...}`, the only thing these resources can change in place.
#[derive(Debug, Serialize)]
pub(crate) struct TagsPatch<'a> {
    pub tags: &'a Tags,
}

impl ConnectedVmwareModel {
    pub(crate) fn expand_properties(&self) -> VSphereProperties {
        VSphereProperties {
            inventory_item_id: non_empty(&self.inventory_item_id),
            mo_ref_id: non_empty(&self.mo_ref_id),
            v_center_id: non_empty(&self.vcenter_id),
            provisioning_state: None,
        }
    }

    pub(crate) fn expand(&self) -> VSphereResource {
        VSphereResource {
            id: None,
            name: None,
            location: self.location.clone(),
            extended_location: expand_extended_location(&self.extended_location),
            kind: non_empty(&self.kind),
            properties: self.expand_properties(),
            tags: Some(self.tags.clone()),
        }
    }

    /// Rebuild the arguments from an API object. Name and resource group
    /// come from the parsed ID.
    pub(crate) fn flatten(
        name: &str,
        resource_group_name: &str,
        location: &str,
        extended_location: Option<&ExtendedLocation>,
        kind: Option<&str>,
        properties: &VSphereProperties,
        tags: Option<&Tags>,
    ) -> Self {
        Self {
            name: name.to_string(),
            resource_group_name: resource_group_name.to_string(),
            location: normalize_location(location),
            extended_location: flatten_extended_location(extended_location),
            kind: kind.unwrap_or_default().to_string(),
            inventory_item_id: properties.inventory_item_id.clone().unwrap_or_default(),
            mo_ref_id: properties.mo_ref_id.clone().unwrap_or_default(),
            vcenter_id: properties.v_center_id.clone().unwrap_or_default(),
            tags: tags.cloned().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> ConnectedVmwareModel {
        ConnectedVmwareModel {
            name: "cluster1".to_string(),
            resource_group_name: "rg".to_string(),
            location: "westus".to_string(),
            extended_location: vec![ExtendedLocationModel {
                name: "/subscriptions/s/resourceGroups/rg/providers/Microsoft.ExtendedLocation/customLocations/cl".to_string(),
                kind: "CustomLocation".to_string(),
            }],
            kind: "VMware".to_string(),
            inventory_item_id: String::new(),
            mo_ref_id: "domain-c7".to_string(),
            vcenter_id: "/subscriptions/s/resourceGroups/rg/providers/Microsoft.ConnectedVMwarevSphere/vcenters/vc".to_string(),
            tags: Tags::from([("env".to_string(), "test".to_string())]),
        }
    }

    #[test]
    fn test_expand_request_body() {
        let body = serde_json::to_value(model().expand()).unwrap();
        assert_eq!(
            body,
            json!({
                "location": "westus",
                "extendedLocation": {
                    "name": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.ExtendedLocation/customLocations/cl",
                    "type": "CustomLocation"
                },
                "kind": "VMware",
                "properties": {
                    "moRefId": "domain-c7",
                    "vCenterId": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.ConnectedVMwarevSphere/vcenters/vc"
                },
                "tags": {"env": "test"}
            })
        );
    }

    #[test]
    fn test_flatten_restores_arguments() {
        let original = model();
        let api = original.expand();
        let flattened = ConnectedVmwareModel::flatten(
            "cluster1",
            "rg",
            "West US",
            api.extended_location.as_ref(),
            api.kind.as_deref(),
            &api.properties,
            api.tags.as_ref(),
        );
        assert_eq!(flattened, original);
    }

    #[test]
    fn test_provisioning_state_is_read_only() {
        let api: VSphereResource = serde_json::from_value(json!({
            "location": "westus",
            "properties": {"provisioningState": "Succeeded", "moRefId": "host-1"}
        }))
        .unwrap();
        assert_eq!(api.properties.provisioning_state.as_deref(), Some("Succeeded"));
        let body = serde_json::to_value(&api).unwrap();
        assert!(body["properties"].get("provisioningState").is_none());
    }
}
