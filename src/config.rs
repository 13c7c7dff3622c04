//! Provider block configuration.
//!
//! The provider block is deserialized into [`ProviderConfig`]; any field left
//! unset falls back to its `ARM_*` environment variable. [`ProviderConfig::resolve`]
//! then checks the result and produces a [`ResolvedConfig`] with concrete
//! endpoints and a single authentication method.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ProviderError;
use crate::schema::{Attribute, Diagnostic, Schema, Validator};

/// Default delay between long-running operation polls.
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 10;

/// The raw provider block, before environment fallback and validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Subscription every resource is created in.
    pub subscription_id: Option<String>,
    /// Entra ID tenant used for client secret authentication.
    pub tenant_id: Option<String>,
    /// Application (client) ID.
    pub client_id: Option<String>,
    /// Client secret for the application.
    pub client_secret: Option<String>,
    /// A pre-acquired bearer token. Takes precedence over client secret auth.
    pub access_token: Option<String>,
    /// `public`, `usgovernment` or `china`.
    pub environment: Option<String>,
    /// Overrides the environment's Resource Manager endpoint.
    pub resource_manager_endpoint: Option<String>,
    /// Overrides the environment's login host.
    pub authority_host: Option<String>,
    /// Delay between long-running operation polls.
    pub poll_interval_seconds: Option<u64>,
}

/// Azure clouds with their well-known endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudEnvironment {
    /// Azure public cloud.
    Public,
    /// Azure US Government.
    UsGovernment,
    /// Azure China (21Vianet).
    China,
}

impl CloudEnvironment {
    /// Values accepted by the `environment` attribute.
    pub const NAMES: [&'static str; 3] = ["public", "usgovernment", "china"];

    /// Parse an environment name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "public" => Some(Self::Public),
            "usgovernment" => Some(Self::UsGovernment),
            "china" => Some(Self::China),
            _ => None,
        }
    }

    /// The Resource Manager endpoint.
    pub fn resource_manager(&self) -> &'static str {
        match self {
            Self::Public => "https://management.azure.com/",
            Self::UsGovernment => "https://management.usgovcloudapi.net/",
            Self::China => "https://management.chinacloudapi.cn/",
        }
    }

    /// The Entra ID login host.
    pub fn authority_host(&self) -> &'static str {
        match self {
            Self::Public => "https://login.microsoftonline.com/",
            Self::UsGovernment => "https://login.microsoftonline.us/",
            Self::China => "https://login.chinacloudapi.cn/",
        }
    }
}

/// How requests are authenticated.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// A bearer token supplied by the caller.
    AccessToken(String),
    /// OAuth2 client credentials.
    ClientSecret {
        /// Tenant to request tokens from.
        tenant_id: String,
        /// Application (client) ID.
        client_id: String,
        /// Client secret.
        client_secret: String,
    },
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            Self::ClientSecret {
                tenant_id,
                client_id,
                ..
            } => f
                .debug_struct("ClientSecret")
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

/// A validated configuration, ready to build clients from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Subscription every resource is created in.
    pub subscription_id: String,
    /// Resource Manager base URL.
    pub resource_manager_endpoint: Url,
    /// Entra ID login host.
    pub authority_host: Url,
    /// Credentials to use.
    pub auth: AuthMethod,
    /// Delay between long-running operation polls.
    pub poll_interval: Duration,
}

impl ProviderConfig {
    /// The provider block schema.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "subscription_id",
                Attribute::optional_string()
                    .with_description("Subscription ID. Falls back to ARM_SUBSCRIPTION_ID.")
                    .with_validator(Validator::Uuid),
            )
            .with_attribute(
                "tenant_id",
                Attribute::optional_string()
                    .with_description("Tenant ID. Falls back to ARM_TENANT_ID.")
                    .with_validator(Validator::Uuid),
            )
            .with_attribute(
                "client_id",
                Attribute::optional_string()
                    .with_description("Client ID. Falls back to ARM_CLIENT_ID."),
            )
            .with_attribute(
                "client_secret",
                Attribute::optional_string()
                    .sensitive()
                    .with_description("Client secret. Falls back to ARM_CLIENT_SECRET."),
            )
            .with_attribute(
                "access_token",
                Attribute::optional_string()
                    .sensitive()
                    .with_description("Bearer token. Falls back to ARM_ACCESS_TOKEN."),
            )
            .with_attribute(
                "environment",
                Attribute::optional_string()
                    .one_of(&CloudEnvironment::NAMES)
                    .with_description("Cloud environment. Falls back to ARM_ENVIRONMENT."),
            )
            .with_attribute(
                "resource_manager_endpoint",
                Attribute::optional_string().not_empty(),
            )
            .with_attribute("authority_host", Attribute::optional_string().not_empty())
            .with_attribute(
                "poll_interval_seconds",
                Attribute::optional_int64().with_validator(Validator::IntAtLeast(1)),
            )
    }

    /// Decode the provider block. A null block is an empty configuration.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value.clone())
            .map_err(|e| ProviderError::Configuration(format!("decoding provider block: {e}")))
    }

    /// Fill unset fields from the process environment.
    pub fn with_env_fallback(self) -> Self {
        self.with_fallback(|key| std::env::var(key).ok())
    }

    /// Fill unset fields from `lookup`, keyed by `ARM_*` variable name.
    /// Empty strings count as unset on both sides.
    pub fn with_fallback(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |current: Option<String>, key: &str| {
            non_empty(current).or_else(|| non_empty(lookup(key)))
        };
        Self {
            subscription_id: pick(self.subscription_id, "ARM_SUBSCRIPTION_ID"),
            tenant_id: pick(self.tenant_id, "ARM_TENANT_ID"),
            client_id: pick(self.client_id, "ARM_CLIENT_ID"),
            client_secret: pick(self.client_secret, "ARM_CLIENT_SECRET"),
            access_token: pick(self.access_token, "ARM_ACCESS_TOKEN"),
            environment: pick(self.environment, "ARM_ENVIRONMENT"),
            resource_manager_endpoint: pick(
                self.resource_manager_endpoint,
                "ARM_RESOURCE_MANAGER_ENDPOINT",
            ),
            authority_host: pick(self.authority_host, "ARM_AUTHORITY_HOST"),
            poll_interval_seconds: self.poll_interval_seconds,
        }
    }

    /// Check the configuration and choose endpoints and credentials.
    ///
    /// Every problem is reported, not just the first.
    pub fn resolve(self) -> Result<ResolvedConfig, Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();

        let subscription_id = self.subscription_id.unwrap_or_default();
        if subscription_id.is_empty() {
            diagnostics.push(
                Diagnostic::error("subscription_id is required")
                    .with_detail(
                        "Set subscription_id in the provider block or ARM_SUBSCRIPTION_ID.",
                    )
                    .with_attribute("subscription_id"),
            );
        }

        let environment = match self.environment.as_deref() {
            None => Some(CloudEnvironment::Public),
            Some(name) => {
                let env = CloudEnvironment::from_name(name);
                if env.is_none() {
                    diagnostics.push(
                        Diagnostic::error(format!("unknown environment {name:?}"))
                            .with_detail(format!("expected one of {:?}", CloudEnvironment::NAMES))
                            .with_attribute("environment"),
                    );
                }
                env
            }
        };
        let environment = environment.unwrap_or(CloudEnvironment::Public);

        let resource_manager_endpoint = parse_endpoint(
            "resource_manager_endpoint",
            self.resource_manager_endpoint.as_deref(),
            environment.resource_manager(),
            &mut diagnostics,
        );
        let authority_host = parse_endpoint(
            "authority_host",
            self.authority_host.as_deref(),
            environment.authority_host(),
            &mut diagnostics,
        );

        let auth = match self.access_token {
            Some(token) => Some(AuthMethod::AccessToken(token)),
            None => {
                let missing: Vec<&str> = [
                    ("tenant_id", self.tenant_id.is_none()),
                    ("client_id", self.client_id.is_none()),
                    ("client_secret", self.client_secret.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                for name in &missing {
                    let summary = format!("{name} is required for client secret authentication");
                    diagnostics.push(
                        Diagnostic::error(summary)
                            .with_detail(format!(
                                "Set {name} (or ARM_{}), or supply access_token instead.",
                                name.to_ascii_uppercase()
                            ))
                            .with_attribute(*name),
                    );
                }
                match (self.tenant_id, self.client_id, self.client_secret) {
                    (Some(tenant_id), Some(client_id), Some(client_secret)) => {
                        Some(AuthMethod::ClientSecret {
                            tenant_id,
                            client_id,
                            client_secret,
                        })
                    }
                    _ => None,
                }
            }
        };

        let poll_interval = Duration::from_secs(
            self.poll_interval_seconds
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECONDS)
                .max(1),
        );

        match (resource_manager_endpoint, authority_host, auth) {
            (Some(resource_manager_endpoint), Some(authority_host), Some(auth))
                if diagnostics.is_empty() =>
            {
                Ok(ResolvedConfig {
                    subscription_id,
                    resource_manager_endpoint,
                    authority_host,
                    auth,
                    poll_interval,
                })
            },
            _ => Err(diagnostics),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_endpoint(
    attribute: &str,
    configured: Option<&str>,
    default: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Url> {
    let raw = configured.unwrap_or(default);
    // A base URL without a trailing slash would drop its last path segment on join.
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    match Url::parse(&normalized) {
        Ok(url) => Some(url),
        Err(e) => {
            diagnostics.push(
                Diagnostic::error(format!("invalid {attribute}"))
                    .with_detail(format!("{raw:?}: {e}"))
                    .with_attribute(attribute),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;
    use serde_json::json;
    use std::collections::HashMap;

    const SUB: &str = "00000000-0000-0000-0000-000000000001";

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_value_null_is_default() {
        let config = ProviderConfig::from_value(&serde_json::Value::Null).unwrap();
        assert_eq!(config, ProviderConfig::default());
    }

    #[test]
    fn test_from_value_rejects_wrong_types() {
        let err = ProviderConfig::from_value(&json!({"poll_interval_seconds": "ten"})).unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[test]
    fn test_env_fallback_only_fills_unset_fields() {
        let config = ProviderConfig {
            subscription_id: Some(SUB.to_string()),
            client_id: Some(String::new()),
            ..Default::default()
        }
        .with_fallback(env(&[
            ("ARM_SUBSCRIPTION_ID", "ignored"),
            ("ARM_CLIENT_ID", "from-env"),
            ("ARM_TENANT_ID", "tenant"),
        ]));

        assert_eq!(config.subscription_id.as_deref(), Some(SUB));
        assert_eq!(config.client_id.as_deref(), Some("from-env"));
        assert_eq!(config.tenant_id.as_deref(), Some("tenant"));
        assert_eq!(config.client_secret, None);
    }

    #[test]
    fn test_resolve_access_token_defaults_to_public_cloud() {
        let resolved = ProviderConfig {
            subscription_id: Some(SUB.to_string()),
            access_token: Some("token".to_string()),
            ..Default::default()
        }
        .resolve()
        .unwrap();

        assert_eq!(resolved.subscription_id, SUB);
        assert_eq!(resolved.auth, AuthMethod::AccessToken("token".to_string()));
        assert_eq!(
            resolved.resource_manager_endpoint.as_str(),
            "https://management.azure.com/"
        );
        assert_eq!(
            resolved.poll_interval,
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECONDS)
        );
    }

    #[test]
    fn test_resolve_client_secret_in_china() {
        let resolved = ProviderConfig {
            subscription_id: Some(SUB.to_string()),
            tenant_id: Some("t".to_string()),
            client_id: Some("c".to_string()),
            client_secret: Some("s".to_string()),
            environment: Some("China".to_string()),
            poll_interval_seconds: Some(2),
            ..Default::default()
        }
        .resolve()
        .unwrap();

        assert!(matches!(resolved.auth, AuthMethod::ClientSecret { .. }));
        assert_eq!(resolved.authority_host.as_str(), "https://login.chinacloudapi.cn/");
        assert_eq!(resolved.poll_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_resolve_endpoint_override_gets_trailing_slash() {
        let resolved = ProviderConfig {
            subscription_id: Some(SUB.to_string()),
            access_token: Some("token".to_string()),
            resource_manager_endpoint: Some("http://127.0.0.1:8080/arm".to_string()),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(
            resolved.resource_manager_endpoint.as_str(),
            "http://127.0.0.1:8080/arm/"
        );
    }

    #[test]
    fn test_resolve_reports_every_problem() {
        let diagnostics = ProviderConfig {
            client_id: Some("c".to_string()),
            environment: Some("mars".to_string()),
            ..Default::default()
        }
        .resolve()
        .unwrap_err();

        let attributes: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_deref())
            .collect();
        assert_eq!(
            attributes,
            vec!["subscription_id", "environment", "tenant_id", "client_secret"]
        );
    }

    #[test]
    fn test_auth_debug_redacts_secrets() {
        let auth = AuthMethod::ClientSecret {
            tenant_id: "t".to_string(),
            client_id: "c".to_string(),
            client_secret: "hunter2".to_string(),
        };
        assert!(!format!("{auth:?}").contains("hunter2"));
        assert!(!format!("{:?}", AuthMethod::AccessToken("sekret".to_string())).contains("sekret"));
    }

    #[test]
    fn test_schema_validates_environment_and_interval() {
        let schema = ProviderConfig::schema();
        assert!(validate(&schema, &json!({"environment": "usgovernment"})).is_empty());
        assert_eq!(validate(&schema, &json!({"environment": "mars"})).len(), 1);
        assert_eq!(validate(&schema, &json!({"poll_interval_seconds": 0})).len(), 1);
        assert!(schema.block.attributes["client_secret"].flags.sensitive);
    }
}
