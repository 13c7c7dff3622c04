//! Typed Azure Resource Manager resource IDs.
//!
//! Every managed resource is addressed by an ID of the shape
//! `/subscriptions/{s}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}[/{type}/{name}]`.
//! The typed IDs below are declared with [`resource_id!`] and share one
//! segment parser, so they all reject the same malformed inputs.
//!
//! Static segments and the provider namespace match case-insensitively.
//! [`Display`](std::fmt::Display) always renders the canonical casing.

use std::fmt;

use crate::error::ProviderError;

/// One expected segment of a resource ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// A fixed keyword such as `resourceGroups` or `clusters`.
    Static(&'static str),
    /// A provider namespace such as `Microsoft.DevCenter`.
    Provider(&'static str),
    /// A user-chosen value; the name is used in error messages.
    UserSpecified(&'static str),
}

/// Split `input` against `segments` and return the user-specified values in
/// order.
pub fn parse_segments(input: &str, segments: &[Segment]) -> Result<Vec<String>, ProviderError> {
    if input.is_empty() {
        return Err(ProviderError::Validation("ID was empty".to_string()));
    }
    let trimmed = input.strip_prefix('/').ok_or_else(|| {
        ProviderError::Validation(format!("parsing {input:?}: ID must start with '/'"))
    })?;
    let parts: Vec<&str> = if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    };

    let mut values = Vec::new();
    for (position, segment) in segments.iter().enumerate() {
        let part = parts.get(position).copied();
        match (segment, part) {
            (Segment::Static(expected), Some(actual))
            | (Segment::Provider(expected), Some(actual))
                if actual.eq_ignore_ascii_case(expected) => {},
            (Segment::Static(expected), _) | (Segment::Provider(expected), _) => {
                return Err(ProviderError::Validation(format!(
                    "parsing {input:?}: ID was missing the '{expected}' element"
                )));
            }
            (Segment::UserSpecified(_), Some(actual)) if !actual.is_empty() => {
                values.push(actual.to_string());
            }
            (Segment::UserSpecified(name), _) => {
                return Err(ProviderError::Validation(format!(
                    "parsing {input:?}: ID was missing the '{name}' element"
                )));
            }
        }
    }

    if parts.len() > segments.len() {
        return Err(ProviderError::Validation(format!(
            "parsing {input:?}: unexpected segment '{}' after the resource name",
            parts[segments.len()]
        )));
    }

    Ok(values)
}

/// Declare a resource-group scoped ID type.
///
/// ```ignore
/// resource_id! {
///     /// A Dev Center Dev Box Definition.
///     DevBoxDefinitionId, "Microsoft.DevCenter", {
///         "devCenters" => dev_center_name,
///         "devBoxDefinitions" => dev_box_definition_name,
///     }
/// }
/// ```
#[macro_export]
macro_rules! resource_id {
    (
        $(#[$meta:meta])*
        $name:ident, $namespace:literal, {
            $( $segment:literal => $field:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            /// The subscription the resource lives in.
            pub subscription_id: String,
            /// The resource group the resource lives in.
            pub resource_group_name: String,
            $(
                #[doc = concat!("The `", $segment, "` segment value.")]
                pub $field: String,
            )+
        }

        impl $name {
            /// Build an ID from its components.
            pub fn new(
                subscription_id: impl Into<String>,
                resource_group_name: impl Into<String>,
                $( $field: impl Into<String>, )+
            ) -> Self {
                Self {
                    subscription_id: subscription_id.into(),
                    resource_group_name: resource_group_name.into(),
                    $( $field: $field.into(), )+
                }
            }

            /// The segments this ID is made of.
            pub fn segments() -> Vec<$crate::resourceids::Segment> {
                use $crate::resourceids::Segment;
                vec![
                    Segment::Static("subscriptions"),
                    Segment::UserSpecified("subscriptionId"),
                    Segment::Static("resourceGroups"),
                    Segment::UserSpecified("resourceGroupName"),
                    Segment::Static("providers"),
                    Segment::Provider($namespace),
                    $(
                        Segment::Static($segment),
                        Segment::UserSpecified(stringify!($field)),
                    )+
                ]
            }

            /// Parse an ID, accepting any casing of the fixed segments.
            pub fn parse(input: &str) -> Result<Self, $crate::ProviderError> {
                let values = $crate::resourceids::parse_segments(input, &Self::segments())?;
                let mut values = values.into_iter();
                Ok(Self {
                    subscription_id: values.next().unwrap_or_default(),
                    resource_group_name: values.next().unwrap_or_default(),
                    $( $field: values.next().unwrap_or_default(), )+
                })
            }

            /// Check that `input` parses as this ID type.
            pub fn validate(input: &str) -> Result<(), $crate::ProviderError> {
                Self::parse(input).map(|_| ())
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(
                    f,
                    "/subscriptions/{}/resourceGroups/{}/providers/{}",
                    self.subscription_id, self.resource_group_name, $namespace
                )?;
                $( write!(f, "/{}/{}", $segment, self.$field)?; )+
                Ok(())
            }
        }
    };
}

resource_id! {
    /// A VMware cluster projected into Azure.
    ClusterId, "Microsoft.ConnectedVMwarevSphere", {
        "clusters" => cluster_name,
    }
}

resource_id! {
    /// A VMware datastore projected into Azure.
    DatastoreId, "Microsoft.ConnectedVMwarevSphere", {
        "datastores" => datastore_name,
    }
}

resource_id! {
    /// A VMware ESXi host projected into Azure.
    HostId, "Microsoft.ConnectedVMwarevSphere", {
        "hosts" => host_name,
    }
}

resource_id! {
    /// A VMware resource pool projected into Azure.
    ResourcePoolId, "Microsoft.ConnectedVMwarevSphere", {
        "resourcePools" => resource_pool_name,
    }
}

resource_id! {
    /// A vCenter registered with Azure Arc.
    VCenterId, "Microsoft.ConnectedVMwarevSphere", {
        "vcenters" => vcenter_name,
    }
}

resource_id! {
    /// An Arc-enabled VMware virtual machine.
    VirtualMachineId, "Microsoft.ConnectedVMwarevSphere", {
        "virtualMachines" => virtual_machine_name,
    }
}

resource_id! {
    /// An inventory item discovered in a vCenter.
    InventoryItemId, "Microsoft.ConnectedVMwarevSphere", {
        "vcenters" => vcenter_name,
        "inventoryItems" => inventory_item_name,
    }
}

resource_id! {
    /// A Dev Box Definition inside a Dev Center.
    DevBoxDefinitionId, "Microsoft.DevCenter", {
        "devCenters" => dev_center_name,
        "devBoxDefinitions" => dev_box_definition_name,
    }
}

resource_id! {
    /// A single sign-on configuration of a Dynatrace monitor.
    SingleSignOnConfigurationId, "Dynatrace.Observability", {
        "monitors" => monitor_name,
        "singleSignOnConfigurations" => single_sign_on_configuration_name,
    }
}

resource_id! {
    /// A cluster inside an HDInsight on AKS cluster pool.
    HdInsightClusterId, "Microsoft.HDInsight", {
        "clusterPools" => cluster_pool_name,
        "clusters" => cluster_name,
    }
}

resource_id! {
    /// An Arc custom location.
    CustomLocationId, "Microsoft.ExtendedLocation", {
        "customLocations" => custom_location_name,
    }
}

const LINKER_SEPARATOR: &str = "/providers/Microsoft.ServiceLinker/linkers/";

/// A Service Connector linker, scoped under an arbitrary resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopedLinkerId {
    /// The ID of the resource the linker is attached to.
    pub resource_uri: String,
    /// The linker name.
    pub linker_name: String,
}

impl ScopedLinkerId {
    /// Build a linker ID under `resource_uri`.
    pub fn new(resource_uri: impl Into<String>, linker_name: impl Into<String>) -> Self {
        Self {
            resource_uri: resource_uri.into(),
            linker_name: linker_name.into(),
        }
    }

    /// Parse a linker ID.
    pub fn parse(input: &str) -> Result<Self, ProviderError> {
        let lower = input.to_ascii_lowercase();
        let sep = LINKER_SEPARATOR.to_ascii_lowercase();
        let at = lower.rfind(&sep).ok_or_else(|| {
            ProviderError::Validation(format!(
                "parsing {input:?}: ID was missing the 'Microsoft.ServiceLinker/linkers' element"
            ))
        })?;
        let resource_uri = &input[..at];
        let linker_name = &input[at + sep.len()..];
        if resource_uri.is_empty() || !resource_uri.starts_with('/') {
            return Err(ProviderError::Validation(format!(
                "parsing {input:?}: ID was missing the 'resourceUri' element"
            )));
        }
        if linker_name.is_empty() || linker_name.contains('/') {
            return Err(ProviderError::Validation(format!(
                "parsing {input:?}: ID was missing the 'linkerName' element"
            )));
        }
        Ok(Self::new(resource_uri, linker_name))
    }
}

impl fmt::Display for ScopedLinkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.resource_uri, LINKER_SEPARATOR, self.linker_name)
    }
}

/// A loosely parsed ARM ID of any resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmId {
    /// The subscription segment.
    pub subscription_id: String,
    /// The resource group segment.
    pub resource_group_name: String,
    /// The provider namespace, e.g. `Microsoft.Web`.
    pub namespace: String,
    /// `(type, name)` pairs following the namespace.
    pub types: Vec<(String, String)>,
}

impl ArmId {
    /// Parse any resource-group scoped ID.
    pub fn parse(input: &str) -> Result<Self, ProviderError> {
        let prefix = parse_segments_prefix(input)?;
        let (subscription_id, resource_group_name, namespace, rest) = prefix;
        if rest.is_empty() || rest.len() % 2 != 0 {
            return Err(ProviderError::Validation(format!(
                "parsing {input:?}: expected type/name pairs after the provider namespace"
            )));
        }
        let mut types = Vec::new();
        for pair in rest.chunks(2) {
            if pair[0].is_empty() || pair[1].is_empty() {
                return Err(ProviderError::Validation(format!(
                    "parsing {input:?}: empty segment"
                )));
            }
            types.push((pair[0].to_string(), pair[1].to_string()));
        }
        Ok(Self {
            subscription_id,
            resource_group_name,
            namespace,
            types,
        })
    }

    /// The namespace and type chain, e.g. `Microsoft.AppPlatform/Spring/apps`.
    pub fn type_chain(&self) -> String {
        let mut out = self.namespace.clone();
        for (ty, _) in &self.types {
            out.push('/');
            out.push_str(ty);
        }
        out
    }

    /// Whether this ID addresses a resource of `kind`, compared case-insensitively.
    pub fn is_type(&self, kind: &str) -> bool {
        self.type_chain().eq_ignore_ascii_case(kind)
    }
}

fn parse_segments_prefix(
    input: &str,
) -> Result<(String, String, String, Vec<&str>), ProviderError> {
    let head = [
        Segment::Static("subscriptions"),
        Segment::UserSpecified("subscriptionId"),
        Segment::Static("resourceGroups"),
        Segment::UserSpecified("resourceGroupName"),
        Segment::Static("providers"),
    ];
    let trimmed = input.trim_start_matches('/');
    let parts: Vec<&str> = trimmed.split('/').collect();
    if parts.len() < head.len() + 1 {
        // Reuse the strict parser for its error message.
        parse_segments(input, &head)?;
        return Err(ProviderError::Validation(format!(
            "parsing {input:?}: ID was missing the provider namespace"
        )));
    }
    let joined = format!("/{}", parts[..head.len()].join("/"));
    let values = parse_segments(&joined, &head)?;
    let namespace = parts[head.len()].to_string();
    if namespace.is_empty() {
        return Err(ProviderError::Validation(format!(
            "parsing {input:?}: ID was missing the provider namespace"
        )));
    }
    let mut values = values.into_iter();
    Ok((
        values.next().unwrap_or_default(),
        values.next().unwrap_or_default(),
        namespace,
        parts[head.len() + 1..].to_vec(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUB: &str = "12345678-1234-9876-4563-123456789012";

    #[test]
    fn test_cluster_id_round_trip() {
        let id = ClusterId::new(SUB, "rg1", "cluster1");
        let s = id.to_string();
        assert_eq!(
            s,
            format!("/subscriptions/{SUB}/resourceGroups/rg1/providers/Microsoft.ConnectedVMwarevSphere/clusters/cluster1")
        );
        assert_eq!(ClusterId::parse(&s).unwrap(), id);
    }

    #[test]
    fn test_parse_is_case_insensitive_for_fixed_segments() {
        let input = format!(
            "/SUBSCRIPTIONS/{SUB}/resourcegroups/rg1/providers/microsoft.connectedvmwarevsphere/CLUSTERS/c1"
        );
        let id = ClusterId::parse(&input).unwrap();
        assert_eq!(id.resource_group_name, "rg1");
        assert_eq!(id.cluster_name, "c1");
        assert!(id.to_string().contains("Microsoft.ConnectedVMwarevSphere/clusters/c1"));
    }

    #[test]
    fn test_every_truncated_prefix_is_rejected() {
        let full = InventoryItemId::new(SUB, "rg1", "vc1", "item1").to_string();
        let parts: Vec<&str> = full.split('/').collect();
        for end in 1..parts.len() {
            let prefix = parts[..end].join("/");
            assert!(
                InventoryItemId::parse(&prefix).is_err(),
                "prefix {prefix:?} should not parse"
            );
        }
        assert!(InventoryItemId::parse(&full).is_ok());
    }

    #[test]
    fn test_missing_segment_error_names_it() {
        let err =
            DevBoxDefinitionId::parse(&format!("/subscriptions/{SUB}/providers/x")).unwrap_err();
        assert!(err.message().contains("'resourceGroups'"), "{}", err);

        let err = DevBoxDefinitionId::parse("").unwrap_err();
        assert!(err.message().contains("empty"));

        let err = DevBoxDefinitionId::parse("/").unwrap_err();
        assert!(err.message().contains("'subscriptions'"));
    }

    #[test]
    fn test_extra_segments_rejected() {
        let input = format!("{}/extra/stuff", HostId::new(SUB, "rg", "h1"));
        assert!(HostId::parse(&input).is_err());
    }

    #[test]
    fn test_wrong_type_rejected() {
        let datastore = DatastoreId::new(SUB, "rg", "ds").to_string();
        assert!(HostId::parse(&datastore).is_err());
        assert!(DatastoreId::validate(&datastore).is_ok());
    }

    #[test]
    fn test_dynatrace_namespace() {
        let id = SingleSignOnConfigurationId::new(SUB, "rg", "monitor1", "default");
        let s = id.to_string();
        assert!(s.contains(
            "/providers/Dynatrace.Observability/monitors/monitor1/singleSignOnConfigurations/default"
        ));
        assert_eq!(SingleSignOnConfigurationId::parse(&s).unwrap().monitor_name, "monitor1");
    }

    #[test]
    fn test_scoped_linker_id() {
        let app =
            format!("/subscriptions/{SUB}/resourceGroups/rg/providers/Microsoft.Web/sites/app1");
        let id = ScopedLinkerId::new(&app, "conn1");
        let s = id.to_string();
        assert_eq!(s, format!("{app}/providers/Microsoft.ServiceLinker/linkers/conn1"));

        let parsed = ScopedLinkerId::parse(&s).unwrap();
        assert_eq!(parsed.resource_uri, app);
        assert_eq!(parsed.linker_name, "conn1");

        assert!(ScopedLinkerId::parse(&app).is_err());
        assert!(ScopedLinkerId::parse("/providers/Microsoft.ServiceLinker/linkers/x").is_err());
        let unnamed = format!("{app}/providers/Microsoft.ServiceLinker/linkers/");
        assert!(ScopedLinkerId::parse(&unnamed).is_err());
    }

    #[test]
    fn test_arm_id_type_chain() {
        let id = ArmId::parse(&format!(
            "/subscriptions/{SUB}/resourceGroups/rg/providers/Microsoft.AppPlatform/Spring/svc/apps/app/deployments/default"
        ))
        .unwrap();
        assert_eq!(id.type_chain(), "Microsoft.AppPlatform/Spring/apps/deployments");
        assert!(id.is_type("microsoft.appplatform/spring/apps/deployments"));
        assert!(!id.is_type("Microsoft.Web/sites"));

        let collection =
            format!("/subscriptions/{SUB}/resourceGroups/rg/providers/Microsoft.Web/sites");
        assert!(ArmId::parse(&collection).is_err());
        assert!(ArmId::parse(&format!("/subscriptions/{SUB}/resourceGroups/rg")).is_err());
        assert!(ArmId::parse("not-an-id").is_err());
    }
}
