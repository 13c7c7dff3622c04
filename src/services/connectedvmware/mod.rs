//! Arc-enabled VMware vSphere.

mod inventory_item;
mod models;
mod vcenter;
mod virtual_machine;
mod vsphere;

use crate::resources::{Resource, ServiceRegistration};

use inventory_item::InventoryItemResource;
use vcenter::VCenterResource;
use virtual_machine::VirtualMachineResource;
use vsphere::{VSphereObject, VSphereObjectResource};

pub(crate) const API_VERSION: &str = "2023-10-01";

/// Virtual machines still go through the preview API.
pub(crate) const VIRTUAL_MACHINE_API_VERSION: &str = "2020-10-01-preview";

pub(crate) struct Registration;

impl ServiceRegistration for Registration {
    fn name(&self) -> &'static str {
        "ConnectedVmware"
    }

    fn resources(&self) -> Vec<Box<dyn Resource>> {
        vec![
            Box::new(VSphereObjectResource::new(VSphereObject::Cluster)),
            Box::new(VSphereObjectResource::new(VSphereObject::Datastore)),
            Box::new(VSphereObjectResource::new(VSphereObject::Host)),
            Box::new(VSphereObjectResource::new(VSphereObject::ResourcePool)),
            Box::new(VCenterResource),
            Box::new(VirtualMachineResource),
            Box::new(InventoryItemResource),
        ]
    }
}
