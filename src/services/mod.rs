//! Per-service resource and data source registrations.

mod connectedvmware;
mod devcenter;
mod dynatrace;
mod extendedlocation;
mod hdinsight;
mod serviceconnector;

use crate::resources::ServiceRegistration;

/// Every service this provider ships.
pub fn registrations() -> Vec<Box<dyn ServiceRegistration>> {
    vec![
        Box::new(connectedvmware::Registration),
        Box::new(devcenter::Registration),
        Box::new(dynatrace::Registration),
        Box::new(extendedlocation::Registration),
        Box::new(hdinsight::Registration),
        Box::new(serviceconnector::Registration),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_type_names_are_unique() {
        let mut seen = HashSet::new();
        for service in registrations() {
            for resource in service.resources() {
                let name = resource.type_name();
                assert!(seen.insert(name), "{name} registered twice");
            }
            for data_source in service.data_sources() {
                let name = data_source.type_name();
                assert!(seen.insert(name), "{name} registered twice");
            }
        }
        assert!(seen.contains("azurerm_connected_vmware_virtual_machine"));
        assert!(seen.contains("azurerm_spring_cloud_connection"));
    }
}
