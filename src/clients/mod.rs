//! Clients for Azure Resource Manager.

pub mod arm;
pub mod credentials;
pub(crate) mod poller;

use std::sync::Arc;

pub use arm::ArmClient;
pub use credentials::{ClientSecretCredential, StaticTokenCredential, TokenCredential};

use crate::config::{AuthMethod, ResolvedConfig};
use crate::error::ArmError;

/// Build an authenticated [`ArmClient`] from a resolved configuration.
pub fn build_arm_client(config: &ResolvedConfig) -> Result<ArmClient, ArmError> {
    let http = ArmClient::default_http_client()?;
    let credential: Arc<dyn TokenCredential> = match &config.auth {
        AuthMethod::AccessToken(token) => Arc::new(StaticTokenCredential::new(token.clone())),
        AuthMethod::ClientSecret {
            tenant_id,
            client_id,
            client_secret,
        } => Arc::new(ClientSecretCredential::new(
            http.clone(),
            &config.authority_host,
            tenant_id,
            client_id.clone(),
            client_secret.clone(),
            &config.resource_manager_endpoint,
        )?),
    };
    Ok(ArmClient::new(
        http,
        config.resource_manager_endpoint.clone(),
        credential,
        config.poll_interval,
    ))
}
