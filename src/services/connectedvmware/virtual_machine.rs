//! `azurerm_connected_vmware_virtual_machine`
//!
//! The VM nests the common vSphere arguments under a `connected_vmware`
//! block and talks to the older `2020-10-01-preview` API, where create,
//! update and delete are long-running.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::models::{common_block, ConnectedVmwareModel, VSphereProperties};
use super::VIRTUAL_MACHINE_API_VERSION as API_VERSION;
use crate::error::{ProviderError, ResultExt};
use crate::resourceids::VirtualMachineId;
use crate::resources::common::{
    check_requires_import, decode, encode, expand_extended_location, non_empty, non_zero,
    read_or_gone, state_id, ExtendedLocation, Tags,
};
use crate::resources::{Resource, ResourceContext};
use crate::schema::{Attribute, Block, NestedBlock, Schema, Validator};

const FIRMWARE_TYPES: &[&str] = &["bios", "efi"];
const OS_TYPES: &[&str] = &["Linux", "Windows"];
const NIC_TYPES: &[&str] = &["vmxnet3", "vmxnet2", "vmxnet", "e1000", "e1000e", "pcnet32"];
const POWER_ON_BOOT: &[&str] = &["enabled", "disabled"];
const ALLOCATION_METHODS: &[&str] = &["unset", "dynamic", "static", "linklayer", "random", "other"];
const DISK_MODES: &[&str] = &["persistent", "independent_persistent", "independent_nonpersistent"];
const DISK_TYPES: &[&str] = &[
    "flat",
    "pmem",
    "rawphysical",
    "rawvirtual",
    "sparse",
    "sesparse",
    "unknown",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct VirtualMachineModel {
    id: String,
    connected_vmware: Vec<ConnectedVmwareModel>,
    firmware_type: String,
    memory_size_mb: i64,
    num_cpus: i64,
    num_cores_per_socket: i64,
    admin_username: String,
    admin_password: String,
    computer_name: String,
    guest_id: String,
    os_type: String,
    cluster_id: String,
    datastore_id: String,
    host_id: String,
    resource_pool_id: String,
    smbios_uuid: String,
    template_id: String,
    network_interface: Vec<NetworkInterfaceModel>,
    disk: Vec<DiskModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct NetworkInterfaceModel {
    name: String,
    network_id: String,
    device_key: i64,
    nic_type: String,
    power_on_boot: String,
    ip_settings: Vec<IpSettingsModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct IpSettingsModel {
    allocation_method: String,
    dns_servers: Vec<String>,
    gateway: Vec<String>,
    ip_address: String,
    subnet_mask: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct DiskModel {
    name: String,
    controller_key: i64,
    device_key: i64,
    device_name: String,
    unit_number: i64,
    disk_size_gb: i64,
    disk_mode: String,
    disk_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VirtualMachine {
    #[serde(default)]
    location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extended_location: Option<ExtendedLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default)]
    properties: VirtualMachineProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VirtualMachineProperties {
    #[serde(flatten)]
    vsphere: VSphereProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hardware_profile: Option<HardwareProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    os_profile: Option<OsProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    placement_profile: Option<PlacementProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    network_profile: Option<NetworkProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    storage_profile: Option<StorageProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    firmware_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    smbios_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct HardwareProfile {
    #[serde(rename = "memorySizeMB", default, skip_serializing_if = "Option::is_none")]
    memory_size_mb: Option<i64>,
    #[serde(rename = "numCPUs", default, skip_serializing_if = "Option::is_none")]
    num_cpus: Option<i64>,
    #[serde(rename = "numCoresPerSocket", default, skip_serializing_if = "Option::is_none")]
    num_cores_per_socket: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OsProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    admin_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    admin_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    computer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    guest_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    os_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlacementProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cluster_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    datastore_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    host_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource_pool_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkProfile {
    #[serde(default)]
    network_interfaces: Vec<NetworkInterface>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkInterface {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    network_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    device_key: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nic_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    power_on_boot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ip_settings: Option<NicIpSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NicIpSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allocation_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dns_servers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gateway: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subnet_mask: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageProfile {
    #[serde(default)]
    disks: Vec<VirtualDisk>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VirtualDisk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    controller_key: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    device_key: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit_number: Option<i64>,
    #[serde(rename = "diskSizeGB", default, skip_serializing_if = "Option::is_none")]
    disk_size_gb: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    disk_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    disk_type: Option<String>,
}

/// The in-place changes a VM accepts.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct VirtualMachineUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Tags>,
    #[serde(skip_serializing_if = "VirtualMachineUpdateProperties::is_empty")]
    properties: VirtualMachineUpdateProperties,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct VirtualMachineUpdateProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    hardware_profile: Option<HardwareProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network_profile: Option<NetworkProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_profile: Option<StorageProfile>,
}

impl VirtualMachineUpdateProperties {
    fn is_empty(&self) -> bool {
        self.hardware_profile.is_none()
            && self.network_profile.is_none()
            && self.storage_profile.is_none()
    }
}

impl VirtualMachineUpdate {
    fn is_empty(&self) -> bool {
        self.tags.is_none() && self.properties.is_empty()
    }
}

fn expand_network_interfaces(input: &[NetworkInterfaceModel]) -> NetworkProfile {
    NetworkProfile {
        network_interfaces: input
            .iter()
            .map(|nic| NetworkInterface {
                name: non_empty(&nic.name),
                network_id: non_empty(&nic.network_id),
                device_key: non_zero(nic.device_key),
                nic_type: non_empty(&nic.nic_type),
                power_on_boot: non_empty(&nic.power_on_boot),
                ip_settings: nic.ip_settings.first().map(|ip| NicIpSettings {
                    allocation_method: non_empty(&ip.allocation_method),
                    dns_servers: (!ip.dns_servers.is_empty()).then(|| ip.dns_servers.clone()),
                    gateway: (!ip.gateway.is_empty()).then(|| ip.gateway.clone()),
                    ip_address: non_empty(&ip.ip_address),
                    subnet_mask: non_empty(&ip.subnet_mask),
                }),
            })
            .collect(),
    }
}

fn flatten_network_interfaces(input: Option<NetworkProfile>) -> Vec<NetworkInterfaceModel> {
    input
        .map(|p| p.network_interfaces)
        .unwrap_or_default()
        .into_iter()
        .map(|nic| NetworkInterfaceModel {
            name: nic.name.unwrap_or_default(),
            network_id: nic.network_id.unwrap_or_default(),
            device_key: nic.device_key.unwrap_or_default(),
            nic_type: nic.nic_type.unwrap_or_default(),
            power_on_boot: nic.power_on_boot.unwrap_or_default(),
            ip_settings: nic
                .ip_settings
                .map(|ip| IpSettingsModel {
                    allocation_method: ip.allocation_method.unwrap_or_default(),
                    dns_servers: ip.dns_servers.unwrap_or_default(),
                    gateway: ip.gateway.unwrap_or_default(),
                    ip_address: ip.ip_address.unwrap_or_default(),
                    subnet_mask: ip.subnet_mask.unwrap_or_default(),
                })
                .into_iter()
                .collect(),
        })
        .collect()
}

fn expand_disks(input: &[DiskModel]) -> StorageProfile {
    StorageProfile {
        disks: input
            .iter()
            .map(|disk| VirtualDisk {
                name: non_empty(&disk.name),
                controller_key: Some(disk.controller_key),
                device_key: Some(disk.device_key),
                device_name: non_empty(&disk.device_name),
                // Unit 0 is a valid SCSI slot.
                unit_number: Some(disk.unit_number),
                disk_size_gb: non_zero(disk.disk_size_gb),
                disk_mode: non_empty(&disk.disk_mode),
                disk_type: non_empty(&disk.disk_type),
            })
            .collect(),
    }
}

fn flatten_disks(input: Option<StorageProfile>) -> Vec<DiskModel> {
    input
        .map(|p| p.disks)
        .unwrap_or_default()
        .into_iter()
        .map(|disk| DiskModel {
            name: disk.name.unwrap_or_default(),
            controller_key: disk.controller_key.unwrap_or_default(),
            device_key: disk.device_key.unwrap_or_default(),
            device_name: disk.device_name.unwrap_or_default(),
            unit_number: disk.unit_number.unwrap_or_default(),
            disk_size_gb: disk.disk_size_gb.unwrap_or_default(),
            disk_mode: disk.disk_mode.unwrap_or_default(),
            disk_type: disk.disk_type.unwrap_or_default(),
        })
        .collect()
}

impl VirtualMachineModel {
    fn common(&self) -> Result<&ConnectedVmwareModel, ProviderError> {
        self.connected_vmware
            .first()
            .ok_or_else(|| ProviderError::Validation("no connected_vmware provided".to_string()))
    }

    fn hardware_profile(&self) -> HardwareProfile {
        HardwareProfile {
            memory_size_mb: non_zero(self.memory_size_mb),
            num_cpus: non_zero(self.num_cpus),
            num_cores_per_socket: non_zero(self.num_cores_per_socket),
        }
    }

    fn expand(&self) -> Result<VirtualMachine, ProviderError> {
        let common = self.common()?;
        Ok(VirtualMachine {
            location: common.location.clone(),
            extended_location: expand_extended_location(&common.extended_location),
            kind: non_empty(&common.kind),
            properties: VirtualMachineProperties {
                vsphere: common.expand_properties(),
                hardware_profile: Some(self.hardware_profile()),
                os_profile: Some(OsProfile {
                    admin_username: non_empty(&self.admin_username),
                    admin_password: non_empty(&self.admin_password),
                    computer_name: non_empty(&self.computer_name),
                    guest_id: non_empty(&self.guest_id),
                    os_type: non_empty(&self.os_type),
                }),
                placement_profile: Some(PlacementProfile {
                    cluster_id: non_empty(&self.cluster_id),
                    datastore_id: non_empty(&self.datastore_id),
                    host_id: non_empty(&self.host_id),
                    resource_pool_id: non_empty(&self.resource_pool_id),
                }),
                network_profile: Some(expand_network_interfaces(&self.network_interface)),
                storage_profile: Some(expand_disks(&self.disk)),
                firmware_type: non_empty(&self.firmware_type),
                smbios_uuid: non_empty(&self.smbios_uuid),
                template_id: non_empty(&self.template_id),
            },
            tags: Some(common.tags.clone()),
        })
    }

    /// The admin password is write-only and carried over from `prior_password`.
    fn flatten(id: &VirtualMachineId, api: VirtualMachine, prior_password: &str) -> Self {
        let props = api.properties;
        let common = ConnectedVmwareModel::flatten(
            &id.virtual_machine_name,
            &id.resource_group_name,
            &api.location,
            api.extended_location.as_ref(),
            api.kind.as_deref(),
            &props.vsphere,
            api.tags.as_ref(),
        );
        let hardware = props.hardware_profile.unwrap_or_default();
        let os = props.os_profile.unwrap_or_default();
        let placement = props.placement_profile.unwrap_or_default();

        Self {
            id: id.to_string(),
            connected_vmware: vec![common],
            firmware_type: props.firmware_type.unwrap_or_default(),
            memory_size_mb: hardware.memory_size_mb.unwrap_or_default(),
            num_cpus: hardware.num_cpus.unwrap_or_default(),
            num_cores_per_socket: hardware.num_cores_per_socket.unwrap_or_default(),
            admin_username: os.admin_username.unwrap_or_default(),
            admin_password: os.admin_password.unwrap_or_else(|| prior_password.to_string()),
            computer_name: os.computer_name.unwrap_or_default(),
            guest_id: os.guest_id.unwrap_or_default(),
            os_type: os.os_type.unwrap_or_default(),
            cluster_id: placement.cluster_id.unwrap_or_default(),
            datastore_id: placement.datastore_id.unwrap_or_default(),
            host_id: placement.host_id.unwrap_or_default(),
            resource_pool_id: placement.resource_pool_id.unwrap_or_default(),
            smbios_uuid: props.smbios_uuid.unwrap_or_default(),
            template_id: props.template_id.unwrap_or_default(),
            network_interface: flatten_network_interfaces(props.network_profile),
            disk: flatten_disks(props.storage_profile),
        }
    }
}

/// The PATCH body for moving from `prior` to `planned`, holding only what
/// changed.
fn update_body(
    prior: &VirtualMachineModel,
    planned: &VirtualMachineModel,
) -> Result<VirtualMachineUpdate, ProviderError> {
    let prior_tags = &prior.common()?.tags;
    let planned_tags = &planned.common()?.tags;
    let hardware = planned.hardware_profile();

    Ok(VirtualMachineUpdate {
        tags: (prior_tags != planned_tags).then(|| planned_tags.clone()),
        properties: VirtualMachineUpdateProperties {
            hardware_profile: (prior.hardware_profile() != hardware).then_some(hardware),
            network_profile: (prior.network_interface != planned.network_interface)
                .then(|| expand_network_interfaces(&planned.network_interface)),
            storage_profile: (prior.disk != planned.disk).then(|| expand_disks(&planned.disk)),
        },
    })
}

fn network_interface_block() -> NestedBlock {
    NestedBlock::list(
        Block::new()
            .with_attribute("name", Attribute::optional_string().not_empty())
            .with_attribute("network_id", Attribute::optional_string().not_empty())
            .with_attribute("device_key", Attribute::optional_int64())
            .with_attribute("nic_type", Attribute::optional_string().one_of(NIC_TYPES))
            .with_attribute("power_on_boot", Attribute::optional_string().one_of(POWER_ON_BOOT))
            .with_block(
                "ip_settings",
                NestedBlock::list_max_one(
                    Block::new()
                        .with_attribute(
                            "allocation_method",
                            Attribute::optional_string().one_of(ALLOCATION_METHODS),
                        )
                        .with_attribute("dns_servers", Attribute::string_list())
                        .with_attribute("gateway", Attribute::string_list())
                        .with_attribute("ip_address", Attribute::optional_string().not_empty())
                        .with_attribute("subnet_mask", Attribute::optional_string().not_empty()),
                ),
            ),
    )
}

fn disk_block() -> NestedBlock {
    NestedBlock::list(
        Block::new()
            .with_attribute("name", Attribute::optional_string().not_empty())
            .with_attribute("controller_key", Attribute::optional_int64())
            .with_attribute("device_key", Attribute::optional_int64())
            .with_attribute("device_name", Attribute::optional_string().not_empty())
            .with_attribute("unit_number", Attribute::optional_int64())
            .with_attribute("disk_size_gb", Attribute::optional_int64())
            .with_attribute("disk_mode", Attribute::optional_string().one_of(DISK_MODES))
            .with_attribute("disk_type", Attribute::optional_string().one_of(DISK_TYPES)),
    )
}

fn force_new_string() -> Attribute {
    Attribute::optional_string().with_force_new().not_empty()
}

pub(crate) struct VirtualMachineResource;

impl VirtualMachineResource {
    async fn read_with_password(
        &self,
        ctx: &ResourceContext,
        id: &VirtualMachineId,
        prior_password: &str,
    ) -> Result<Option<Value>, ProviderError> {
        match read_or_gone::<VirtualMachine>(ctx, id, API_VERSION).await? {
            Some(api) => encode(&VirtualMachineModel::flatten(id, api, prior_password)).map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl Resource for VirtualMachineResource {
    fn type_name(&self) -> &'static str {
        "azurerm_connected_vmware_virtual_machine"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_block("connected_vmware", NestedBlock::list_exactly_one(common_block()))
            .with_attribute(
                "firmware_type",
                Attribute::optional_string().with_force_new().one_of(FIRMWARE_TYPES),
            )
            .with_attribute(
                "memory_size_mb",
                Attribute::optional_int64().with_validator(Validator::IntAtLeast(1)),
            )
            .with_attribute(
                "num_cpus",
                Attribute::optional_int64().with_validator(Validator::IntAtLeast(1)),
            )
            .with_attribute(
                "num_cores_per_socket",
                Attribute::optional_int64().with_validator(Validator::IntAtLeast(1)),
            )
            .with_attribute("admin_username", force_new_string())
            .with_attribute("admin_password", force_new_string().sensitive())
            .with_attribute("computer_name", force_new_string())
            .with_attribute("guest_id", force_new_string())
            .with_attribute(
                "os_type",
                Attribute::optional_string().with_force_new().one_of(OS_TYPES),
            )
            .with_attribute("cluster_id", force_new_string())
            .with_attribute("datastore_id", force_new_string())
            .with_attribute("host_id", force_new_string())
            .with_attribute("resource_pool_id", force_new_string())
            .with_attribute(
                "smbios_uuid",
                Attribute::optional_string()
                    .with_force_new()
                    .with_validator(Validator::Uuid),
            )
            .with_attribute("template_id", force_new_string())
            .with_block("network_interface", network_interface_block())
            .with_block("disk", disk_block())
    }

    fn validate_id(&self, id: &str) -> Result<(), ProviderError> {
        VirtualMachineId::validate(id)
    }

    async fn create(&self, ctx: &ResourceContext, config: Value) -> Result<Value, ProviderError> {
        let model: VirtualMachineModel = decode(config)?;
        let common = model.common()?;
        let id =
            VirtualMachineId::new(&ctx.subscription_id, &common.resource_group_name, &common.name);

        check_requires_import(ctx, &id, API_VERSION).await?;

        let body = model.expand()?;
        let _: Value = ctx
            .client
            .put_and_wait(&id.to_string(), API_VERSION, &body)
            .await
            .with_context(|| format!("creating {id}"))?;
        info!(id = %id, "Created virtual machine");

        self.read_with_password(ctx, &id, &model.admin_password)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found after creation")))
    }

    async fn read(
        &self,
        ctx: &ResourceContext,
        state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let id = VirtualMachineId::parse(state_id(&state)?)?;
        let prior: VirtualMachineModel = decode(state)?;
        self.read_with_password(ctx, &id, &prior.admin_password).await
    }

    async fn update(
        &self,
        ctx: &ResourceContext,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: VirtualMachineModel = decode(prior)?;
        let planned: VirtualMachineModel = decode(planned)?;
        let id = VirtualMachineId::parse(&prior.id)?;

        let body = update_body(&prior, &planned)?;
        if !body.is_empty() {
            let _: Value = ctx
                .client
                .patch_and_wait(&id.to_string(), API_VERSION, &body)
                .await
                .with_context(|| format!("updating {id}"))?;
            info!(id = %id, "Updated virtual machine");
        }

        self.read_with_password(ctx, &id, &planned.admin_password)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found after update")))
    }

    async fn delete(&self, ctx: &ResourceContext, state: Value) -> Result<(), ProviderError> {
        let id = VirtualMachineId::parse(state_id(&state)?)?;
        info!(id = %id, "Deleting virtual machine");
        ctx.client
            .delete_and_wait(&id.to_string(), API_VERSION)
            .await
            .with_context(|| format!("deleting {id}"))
    }
}
