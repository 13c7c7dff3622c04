use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct LinkerResource {
    #[serde(default)]
    pub properties: LinkerProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LinkerProperties {
    #[serde(default)]
    pub auth_info: Option<AuthInfo>,
    #[serde(default)]
    pub target_service: Option<TargetService>,
    #[serde(default)]
    pub client_type: Option<String>,
    #[serde(rename = "vNetSolution", default)]
    pub vnet_solution: Option<VNetSolution>,
    #[serde(default)]
    pub secret_store: Option<SecretStore>,
}

/// How the source resource authenticates against the target.
///
/// Auth types this provider does not model keep only their `authType`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(super) enum AuthInfo {
    Known(KnownAuthInfo),
    #[serde(rename_all = "camelCase")]
    Other { auth_type: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "authType", rename_all = "camelCase")]
pub(super) enum KnownAuthInfo {
    Secret {
        #[serde(default)]
        name: Option<String>,
    },
    SystemAssignedIdentity {},
    #[serde(rename_all = "camelCase")]
    UserAssignedIdentity {
        #[serde(default)]
        client_id: Option<String>,
        #[serde(default)]
        subscription_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ServicePrincipalSecret {
        #[serde(default)]
        client_id: String,
        #[serde(default)]
        principal_id: String,
    },
    #[serde(rename_all = "camelCase")]
    ServicePrincipalCertificate {
        #[serde(default)]
        client_id: String,
        #[serde(default)]
        principal_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub(super) enum TargetService {
    AzureResource {
        #[serde(default)]
        id: Option<String>,
    },
    ConfluentBootstrapServer {
        #[serde(default)]
        endpoint: Option<String>,
    },
    ConfluentSchemaRegistry {
        #[serde(default)]
        endpoint: Option<String>,
    },
    SelfHostedServer {
        #[serde(default)]
        endpoint: Option<String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct VNetSolution {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SecretStore {
    #[serde(default)]
    pub key_vault_id: Option<String>,
}

/// One element of the `authentication` block.
///
/// Secret and certificate values are never returned by the service, so
/// they stay empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(super) struct AuthenticationModel {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub secret: String,
    pub client_id: String,
    pub subscription_id: String,
    pub principal_id: String,
    pub certificate: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(super) struct SecretStoreModel {
    pub key_vault_id: String,
}

/// The computed part shared by every connection data source.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct Connection {
    pub target_resource_id: String,
    pub client_type: String,
    pub vnet_solution: String,
    pub secret_store: Vec<SecretStoreModel>,
    pub authentication: Vec<AuthenticationModel>,
}

impl From<AuthInfo> for AuthenticationModel {
    fn from(input: AuthInfo) -> Self {
        match input {
            AuthInfo::Known(known) => known.into(),
            AuthInfo::Other { auth_type } => Self {
                kind: auth_type,
                ..Default::default()
            },
        }
    }
}

impl From<KnownAuthInfo> for AuthenticationModel {
    fn from(input: KnownAuthInfo) -> Self {
        match input {
            KnownAuthInfo::Secret { name } => Self {
                kind: "secret".to_string(),
                name: name.unwrap_or_default(),
                ..Default::default()
            },
            KnownAuthInfo::SystemAssignedIdentity {} => Self {
                kind: "systemAssignedIdentity".to_string(),
                ..Default::default()
            },
            KnownAuthInfo::UserAssignedIdentity {
                client_id,
                subscription_id,
            } => Self {
                kind: "userAssignedIdentity".to_string(),
                client_id: client_id.unwrap_or_default(),
                subscription_id: subscription_id.unwrap_or_default(),
                ..Default::default()
            },
            KnownAuthInfo::ServicePrincipalSecret {
                client_id,
                principal_id,
            } => Self {
                kind: "servicePrincipalSecret".to_string(),
                client_id,
                principal_id,
                ..Default::default()
            },
            KnownAuthInfo::ServicePrincipalCertificate {
                client_id,
                principal_id,
            } => Self {
                kind: "servicePrincipalCertificate".to_string(),
                client_id,
                principal_id,
                ..Default::default()
            },
        }
    }
}

impl TargetService {
    fn resource_id(self) -> String {
        match self {
            Self::AzureResource { id } => id,
            Self::ConfluentBootstrapServer { endpoint }
            | Self::ConfluentSchemaRegistry { endpoint }
            | Self::SelfHostedServer { endpoint } => endpoint,
            Self::Other => None,
        }
        .unwrap_or_default()
    }
}

impl Connection {
    /// `None` when the service left out the auth info or target.
    pub fn flatten(props: LinkerProperties) -> Option<Self> {
        let auth_info = props.auth_info?;
        let target = props.target_service?;
        Some(Self {
            target_resource_id: target.resource_id(),
            client_type: props.client_type.unwrap_or_default(),
            vnet_solution: props
                .vnet_solution
                .and_then(|v| v.kind)
                .unwrap_or_default(),
            secret_store: props
                .secret_store
                .map(|s| SecretStoreModel {
                    key_vault_id: s.key_vault_id.unwrap_or_default(),
                })
                .into_iter()
                .collect(),
            authentication: vec![auth_info.into()],
        })
    }
}
