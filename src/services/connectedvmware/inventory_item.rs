//! `azurerm_vcenters_inventory_items`
//!
//! An inventory item is a record of one vCenter managed object. Its
//! `properties` are polymorphic on `inventoryType`, which maps onto
//! [`InventoryItemProperties`]. Types added to the API later decode as
//! [`ItemProperties::Other`] and keep their managed-object fields.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::API_VERSION;
use crate::error::{ProviderError, ResultExt};
use crate::resourceids::InventoryItemId;
use crate::resources::common::{
    check_requires_import, decode, encode, non_empty, read_or_gone, state_id,
};
use crate::resources::{Resource, ResourceContext};
use crate::schema::{Attribute, Block, NestedBlock, Schema, Validator};

const INVENTORY_TYPES: &[&str] = &[
    "Cluster",
    "Datastore",
    "Host",
    "ResourcePool",
    "VirtualMachineTemplate",
    "VirtualMachine",
    "VirtualNetwork",
];

const OS_TYPES: &[&str] = &["Windows", "Linux", "Other"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct InventoryItemModel {
    id: String,
    name: String,
    resource_group_name: String,
    vcenter_name: String,
    inventory_type: String,
    kind: String,
    managed_resource_id: String,
    mo_name: String,
    mo_ref_id: String,
    parent: Vec<InventoryItemDetailsModel>,
    capacity_gb: i64,
    free_space_gb: i64,
    folder_path: String,
    memory_size_mb: i64,
    num_cpus: i64,
    num_cores_per_socket: i64,
    os_name: String,
    os_type: String,
    host: Vec<InventoryItemDetailsModel>,
    instance_uuid: String,
    ip_addresses: Vec<String>,
    resource_pool: Vec<InventoryItemDetailsModel>,
    smbios_uuid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct InventoryItemDetailsModel {
    inventory_item_id: String,
    mo_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InventoryItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    properties: ItemProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum ItemProperties {
    Known(InventoryItemProperties),
    Other(UnknownItem),
}

/// An item whose `inventoryType` is not one of [`INVENTORY_TYPES`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnknownItem {
    inventory_type: String,
    #[serde(flatten)]
    object: ManagedObject,
}

/// Type-specific item properties, tagged by `inventoryType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "inventoryType")]
enum InventoryItemProperties {
    Cluster(ManagedObject),
    Datastore(DatastoreItem),
    Host(ParentedItem),
    ResourcePool(ParentedItem),
    VirtualMachine(VirtualMachineItem),
    VirtualMachineTemplate(VirtualMachineTemplateItem),
    VirtualNetwork(ManagedObject),
}

/// Fields every inventory item carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManagedObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    managed_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mo_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mo_ref_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryItemDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inventory_item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mo_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParentedItem {
    #[serde(flatten)]
    object: ManagedObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<InventoryItemDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatastoreItem {
    #[serde(flatten)]
    object: ManagedObject,
    #[serde(rename = "capacityGB", default, skip_serializing_if = "Option::is_none")]
    capacity_gb: Option<i64>,
    #[serde(rename = "freeSpaceGB", default, skip_serializing_if = "Option::is_none")]
    free_space_gb: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VirtualMachineItem {
    #[serde(flatten)]
    object: ManagedObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    folder_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    host: Option<InventoryItemDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instance_uuid: Option<String>,
    #[serde(rename = "ipAddresses", default, skip_serializing_if = "Option::is_none")]
    ip_addresses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    os_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    os_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource_pool: Option<InventoryItemDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    smbios_uuid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VirtualMachineTemplateItem {
    #[serde(flatten)]
    object: ManagedObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    folder_path: Option<String>,
    #[serde(rename = "memorySizeMB", default, skip_serializing_if = "Option::is_none")]
    memory_size_mb: Option<i64>,
    #[serde(rename = "numCPUs", default, skip_serializing_if = "Option::is_none")]
    num_cpus: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    num_cores_per_socket: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    os_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    os_type: Option<String>,
}

fn expand_details(input: &[InventoryItemDetailsModel]) -> Option<InventoryItemDetails> {
    input.first().map(|d| InventoryItemDetails {
        inventory_item_id: non_empty(&d.inventory_item_id),
        mo_name: non_empty(&d.mo_name),
    })
}

fn flatten_details(input: Option<InventoryItemDetails>) -> Vec<InventoryItemDetailsModel> {
    input
        .map(|d| InventoryItemDetailsModel {
            inventory_item_id: d.inventory_item_id.unwrap_or_default(),
            mo_name: d.mo_name.unwrap_or_default(),
        })
        .into_iter()
        .collect()
}

impl InventoryItemModel {
    fn managed_object(&self) -> ManagedObject {
        ManagedObject {
            managed_resource_id: non_empty(&self.managed_resource_id),
            mo_name: non_empty(&self.mo_name),
            mo_ref_id: non_empty(&self.mo_ref_id),
        }
    }

    fn expand(&self) -> Result<InventoryItem, ProviderError> {
        let object = self.managed_object();
        let properties = match self.inventory_type.as_str() {
            "Cluster" => InventoryItemProperties::Cluster(object),
            "VirtualNetwork" => InventoryItemProperties::VirtualNetwork(object),
            "Host" => InventoryItemProperties::Host(ParentedItem {
                object,
                parent: expand_details(&self.parent),
            }),
            "ResourcePool" => InventoryItemProperties::ResourcePool(ParentedItem {
                object,
                parent: expand_details(&self.parent),
            }),
            "Datastore" => InventoryItemProperties::Datastore(DatastoreItem {
                object,
                capacity_gb: Some(self.capacity_gb),
                free_space_gb: Some(self.free_space_gb),
            }),
            "VirtualMachine" => InventoryItemProperties::VirtualMachine(VirtualMachineItem {
                object,
                folder_path: non_empty(&self.folder_path),
                host: expand_details(&self.host),
                instance_uuid: non_empty(&self.instance_uuid),
                ip_addresses: (!self.ip_addresses.is_empty()).then(|| self.ip_addresses.clone()),
                os_name: non_empty(&self.os_name),
                os_type: non_empty(&self.os_type),
                resource_pool: expand_details(&self.resource_pool),
                smbios_uuid: non_empty(&self.smbios_uuid),
            }),
            "VirtualMachineTemplate" => {
                InventoryItemProperties::VirtualMachineTemplate(VirtualMachineTemplateItem {
                    object,
                    folder_path: non_empty(&self.folder_path),
                    memory_size_mb: Some(self.memory_size_mb),
                    num_cpus: Some(self.num_cpus),
                    num_cores_per_socket: Some(self.num_cores_per_socket),
                    os_name: non_empty(&self.os_name),
                    os_type: non_empty(&self.os_type),
                })
            }
            other => {
                return Err(ProviderError::Validation(format!(
                    "unsupported inventory_type {other:?}"
                )))
            }
        };
        Ok(InventoryItem {
            kind: non_empty(&self.kind),
            properties: ItemProperties::Known(properties),
        })
    }

    /// Only the fields belonging to the item's type are populated.
    fn flatten(id: &InventoryItemId, api: InventoryItem) -> Self {
        let mut state = Self {
            id: id.to_string(),
            name: id.inventory_item_name.clone(),
            resource_group_name: id.resource_group_name.clone(),
            vcenter_name: id.vcenter_name.clone(),
            kind: api.kind.unwrap_or_default(),
            ..Self::default()
        };

        let object = match api.properties {
            ItemProperties::Other(item) => {
                state.inventory_type = item.inventory_type;
                item.object
            }
            ItemProperties::Known(properties) => match properties {
                InventoryItemProperties::Cluster(object) => {
                    state.inventory_type = "Cluster".to_string();
                    object
                }
                InventoryItemProperties::VirtualNetwork(object) => {
                    state.inventory_type = "VirtualNetwork".to_string();
                    object
                }
                InventoryItemProperties::Host(item) => {
                    state.inventory_type = "Host".to_string();
                    state.parent = flatten_details(item.parent);
                    item.object
                }
                InventoryItemProperties::ResourcePool(item) => {
                    state.inventory_type = "ResourcePool".to_string();
                    state.parent = flatten_details(item.parent);
                    item.object
                }
                InventoryItemProperties::Datastore(item) => {
                    state.inventory_type = "Datastore".to_string();
                    state.capacity_gb = item.capacity_gb.unwrap_or_default();
                    state.free_space_gb = item.free_space_gb.unwrap_or_default();
                    item.object
                }
                InventoryItemProperties::VirtualMachine(item) => {
                    state.inventory_type = "VirtualMachine".to_string();
                    state.folder_path = item.folder_path.unwrap_or_default();
                    state.host = flatten_details(item.host);
                    state.instance_uuid = item.instance_uuid.unwrap_or_default();
                    state.ip_addresses = item.ip_addresses.unwrap_or_default();
                    state.os_name = item.os_name.unwrap_or_default();
                    state.os_type = item.os_type.unwrap_or_default();
                    state.resource_pool = flatten_details(item.resource_pool);
                    state.smbios_uuid = item.smbios_uuid.unwrap_or_default();
                    item.object
                }
                InventoryItemProperties::VirtualMachineTemplate(item) => {
                    state.inventory_type = "VirtualMachineTemplate".to_string();
                    state.folder_path = item.folder_path.unwrap_or_default();
                    state.memory_size_mb = item.memory_size_mb.unwrap_or_default();
                    state.num_cpus = item.num_cpus.unwrap_or_default();
                    state.num_cores_per_socket = item.num_cores_per_socket.unwrap_or_default();
                    state.os_name = item.os_name.unwrap_or_default();
                    state.os_type = item.os_type.unwrap_or_default();
                    item.object
                }
            },
        };

        state.managed_resource_id = object.managed_resource_id.unwrap_or_default();
        state.mo_name = object.mo_name.unwrap_or_default();
        state.mo_ref_id = object.mo_ref_id.unwrap_or_default();
        state
    }
}

fn details_block() -> NestedBlock {
    NestedBlock::list_max_one(
        Block::new()
            .with_attribute("inventory_item_id", Attribute::required_string().not_empty())
            .with_attribute("mo_name", Attribute::required_string().not_empty()),
    )
    .with_force_new()
}

fn force_new_string() -> Attribute {
    Attribute::optional_string().with_force_new().not_empty()
}

fn force_new_int() -> Attribute {
    Attribute::optional_int64().with_force_new()
}

pub(crate) struct InventoryItemResource;

#[async_trait::async_trait]
impl Resource for InventoryItemResource {
    fn type_name(&self) -> &'static str {
        "azurerm_vcenters_inventory_items"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string().with_force_new().not_empty())
            .with_attribute(
                "resource_group_name",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute(
                "vcenter_name",
                Attribute::required_string().with_force_new().not_empty(),
            )
            .with_attribute(
                "inventory_type",
                Attribute::required_string().with_force_new().one_of(INVENTORY_TYPES),
            )
            .with_attribute("kind", Attribute::optional_string().with_force_new())
            .with_attribute("managed_resource_id", force_new_string())
            .with_attribute("mo_name", force_new_string())
            .with_attribute("mo_ref_id", force_new_string())
            .with_block("parent", details_block())
            .with_attribute("capacity_gb", force_new_int())
            .with_attribute("free_space_gb", force_new_int())
            .with_attribute("folder_path", force_new_string())
            .with_attribute("memory_size_mb", force_new_int())
            .with_attribute("num_cpus", force_new_int())
            .with_attribute("num_cores_per_socket", force_new_int())
            .with_attribute("os_name", force_new_string())
            .with_attribute(
                "os_type",
                Attribute::optional_string().with_force_new().one_of(OS_TYPES),
            )
            .with_block("host", details_block())
            .with_attribute(
                "instance_uuid",
                Attribute::optional_string()
                    .with_force_new()
                    .with_validator(Validator::Uuid),
            )
            .with_attribute(
                "ip_addresses",
                Attribute::string_list().with_force_new(),
            )
            .with_block("resource_pool", details_block())
            .with_attribute(
                "smbios_uuid",
                Attribute::optional_string()
                    .with_force_new()
                    .with_validator(Validator::Uuid),
            )
    }

    fn validate_id(&self, id: &str) -> Result<(), ProviderError> {
        InventoryItemId::validate(id)
    }

    async fn create(&self, ctx: &ResourceContext, config: Value) -> Result<Value, ProviderError> {
        let model: InventoryItemModel = decode(config)?;
        let id = InventoryItemId::new(
            &ctx.subscription_id,
            &model.resource_group_name,
            &model.vcenter_name,
            &model.name,
        );

        check_requires_import(ctx, &id, API_VERSION).await?;

        let body = model.expand()?;
        let _: Value = ctx
            .client
            .put(&id.to_string(), API_VERSION, &body)
            .await
            .with_context(|| format!("creating {id}"))?;
        info!(id = %id, inventory_type = %model.inventory_type, "Created inventory item");

        self.read(ctx, json!({ "id": id.to_string() }))
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found after creation")))
    }

    async fn read(
        &self,
        ctx: &ResourceContext,
        state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let id = InventoryItemId::parse(state_id(&state)?)?;
        match read_or_gone::<InventoryItem>(ctx, &id, API_VERSION).await? {
            Some(api) => encode(&InventoryItemModel::flatten(&id, api)).map(Some),
            None => Ok(None),
        }
    }

    /// Every argument forces replacement, so there is nothing to send.
    async fn update(
        &self,
        ctx: &ResourceContext,
        prior: Value,
        _planned: Value,
    ) -> Result<Value, ProviderError> {
        let id = InventoryItemId::parse(state_id(&prior)?)?;
        self.read(ctx, prior)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found")))
    }

    async fn delete(&self, ctx: &ResourceContext, state: Value) -> Result<(), ProviderError> {
        let id = InventoryItemId::parse(state_id(&state)?)?;
        info!(id = %id, "Deleting inventory item");
        ctx.client
            .delete(&id.to_string(), API_VERSION)
            .await
            .with_context(|| format!("deleting {id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_arm::{FakeArm, SUBSCRIPTION_ID};
    use crate::validation::validate;

    fn config(inventory_type: &str) -> Value {
        json!({
            "name": "item1",
            "resource_group_name": "rg",
            "vcenter_name": "vc1",
            "inventory_type": inventory_type,
            "mo_name": "esx-01",
            "mo_ref_id": "host-10",
            "parent": [{"inventory_item_id": "cluster-item", "mo_name": "Cluster01"}],
            "capacity_gb": null,
            "free_space_gb": null,
            "memory_size_mb": null,
            "num_cpus": null,
            "num_cores_per_socket": null,
            "ip_addresses": []
        })
    }

    #[test]
    fn test_properties_are_tagged_by_inventory_type() {
        let model: InventoryItemModel = decode(config("Host")).unwrap();
        let body = serde_json::to_value(model.expand().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "properties": {
                    "inventoryType": "Host",
                    "moName": "esx-01",
                    "moRefId": "host-10",
                    "parent": {"inventoryItemId": "cluster-item", "moName": "Cluster01"}
                }
            })
        );
    }

    #[test]
    fn test_flatten_maps_only_fields_of_the_type() {
        let api: InventoryItem = serde_json::from_value(json!({
            "kind": "VMware",
            "properties": {
                "inventoryType": "VirtualMachine",
                "moName": "web-01",
                "instanceUuid": "5f0e2b7c-1d3a-4a43-9a3b-2f6f8c1e9d10",
                "ipAddresses": ["10.0.0.5"],
                "osType": "Linux",
                "host": {"inventoryItemId": "h", "moName": "esx-01"},
                "provisioningState": "Succeeded"
            }
        }))
        .unwrap();
        let id = InventoryItemId::new(SUBSCRIPTION_ID, "rg", "vc1", "vm-item");
        let state = InventoryItemModel::flatten(&id, api);

        assert_eq!(state.inventory_type, "VirtualMachine");
        assert_eq!(state.kind, "VMware");
        assert_eq!(state.ip_addresses, vec!["10.0.0.5".to_string()]);
        assert_eq!(state.host[0].mo_name, "esx-01");
        assert!(state.parent.is_empty());
        assert_eq!(state.capacity_gb, 0);
        assert_eq!(state.vcenter_name, "vc1");
    }

    #[tokio::test]
    async fn test_read_of_unrecognized_inventory_type() {
        let arm = FakeArm::start().await;
        let id = InventoryItemId::new(SUBSCRIPTION_ID, "rg", "vc1", "folder-item");
        arm.insert(
            &id.to_string(),
            json!({
                "kind": "VMware",
                "properties": {
                    "inventoryType": "Folder",
                    "moName": "Discovered VMs",
                    "moRefId": "group-v3",
                    "childCount": 4
                }
            }),
        );

        let state = InventoryItemResource
            .read(&arm.context(), json!({"id": id.to_string()}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state["inventory_type"], "Folder");
        assert_eq!(state["mo_name"], "Discovered VMs");
        assert_eq!(state["mo_ref_id"], "group-v3");
        assert_eq!(state["kind"], "VMware");
        assert_eq!(state["parent"], json!([]));
    }

    #[test]
    fn test_schema_rejects_unknown_inventory_type() {
        let diagnostics = validate(&InventoryItemResource.schema(), &config("Folder"));
        assert!(diagnostics
            .iter()
            .any(|d| d.attribute.as_deref() == Some("inventory_type")));
    }

    #[tokio::test]
    async fn test_datastore_item_lifecycle() {
        let arm = FakeArm::start().await;
        let ctx = arm.context();
        let mut cfg = config("Datastore");
        cfg["capacity_gb"] = json!(512);
        cfg["free_space_gb"] = json!(128);

        let state = InventoryItemResource.create(&ctx, cfg).await.unwrap();
        let id = InventoryItemId::new(SUBSCRIPTION_ID, "rg", "vc1", "item1").to_string();
        assert_eq!(state["id"], id);
        assert_eq!(state["capacity_gb"], 512);
        assert_eq!(state["parent"], json!([]));

        InventoryItemResource.delete(&ctx, state.clone()).await.unwrap();
        assert!(InventoryItemResource.read(&ctx, state).await.unwrap().is_none());
    }
}
