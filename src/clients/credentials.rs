//! Bearer tokens for Resource Manager.
//!
//! [`ClientSecretCredential`] runs the OAuth2 client-credentials flow against
//! Entra ID and caches the token until shortly before it expires.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::RwLock;
use url::Url;

use crate::error::ArmError;

/// Refresh cached tokens this long before they actually expire.
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Used when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Something that can hand out a bearer token.
#[async_trait::async_trait]
pub trait TokenCredential: Send + Sync {
    /// A token valid for at least the next request.
    async fn token(&self) -> Result<String, ArmError>;
}

/// A fixed token supplied by the user.
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    /// Wrap an existing token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn token(&self) -> Result<String, ArmError> {
        Ok(self.token.clone())
    }
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// Expiry with [`TOKEN_EXPIRY_BUFFER`] already applied.
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Some endpoints send this as a string.
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
}

#[derive(Deserialize, Default)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

fn expires_in(value: Option<&serde_json::Value>) -> Duration {
    let seconds = match value {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    };
    seconds
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TOKEN_TTL)
}

/// OAuth2 client credentials for an application registration.
pub struct ClientSecretCredential {
    http: reqwest::Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
    scope: String,
    cache: RwLock<Option<CachedToken>>,
}

impl ClientSecretCredential {
    /// Build a credential that requests `{resource_manager}/.default` tokens
    /// from `{authority_host}/{tenant_id}/oauth2/v2.0/token`.
    pub fn new(
        http: reqwest::Client,
        authority_host: &Url,
        tenant_id: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        resource_manager: &Url,
    ) -> Result<Self, ArmError> {
        let token_url = authority_host.join(&format!("{tenant_id}/oauth2/v2.0/token"))?;
        let scope = format!("{}/.default", resource_manager.as_str().trim_end_matches('/'));
        Ok(Self {
            http,
            token_url,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope,
            cache: RwLock::new(None),
        })
    }

    async fn request_token(&self) -> Result<CachedToken, ArmError> {
        tracing::debug!(url = %self.token_url, "Requesting access token");
        let response = self
            .http
            .post(self.token_url.clone())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let err: TokenErrorResponse = serde_json::from_str(&body).unwrap_or_default();
            return Err(ArmError::Authentication(format!(
                "token endpoint returned {}: {}: {}",
                status.as_u16(),
                err.error,
                err.error_description
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        let ttl = expires_in(token.expires_in.as_ref());
        Ok(CachedToken {
            token: token.access_token,
            expires_at: Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER),
        })
    }
}

#[async_trait::async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn token(&self) -> Result<String, ArmError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let mut cache = self.cache.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(cached) = cache.as_ref().filter(|c| c.is_valid()) {
            return Ok(cached.token.clone());
        }
        let fresh = self.request_token().await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn credential(server: &MockServer) -> ClientSecretCredential {
        let authority = Url::parse(&format!("{}/", server.uri())).unwrap();
        let arm = Url::parse("https://management.azure.com/").unwrap();
        ClientSecretCredential::new(
            reqwest::Client::new(),
            &authority,
            "tenant-1",
            "app",
            "secret",
            &arm,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_static_token() {
        let credential = StaticTokenCredential::new("abc");
        assert_eq!(credential.token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_client_secret_token_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("scope=https%3A%2F%2Fmanagement.azure.com%2F.default"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_type": "Bearer",
                "expires_in": "3599",
                "access_token": "tok-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credential = credential(&server).await;
        assert_eq!(credential.token().await.unwrap(), "tok-1");
        assert_eq!(credential.token().await.unwrap(), "tok-1");
    }

    #[tokio::test]
    async fn test_short_lived_token_is_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "expires_in": 30,
                "access_token": "short"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let credential = credential(&server).await;
        credential.token().await.unwrap();
        credential.token().await.unwrap();
    }

    #[tokio::test]
    async fn test_token_error_is_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })))
            .mount(&server)
            .await;

        let err = credential(&server).await.token().await.unwrap_err();
        match err {
            ArmError::Authentication(msg) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("invalid_client"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_expires_in_parsing() {
        assert_eq!(expires_in(Some(&json!(120))), Duration::from_secs(120));
        assert_eq!(expires_in(Some(&json!("90"))), Duration::from_secs(90));
        assert_eq!(expires_in(None), DEFAULT_TOKEN_TTL);
    }
}
