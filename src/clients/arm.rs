//! Resource Manager REST client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use super::credentials::TokenCredential;
use super::poller::{self, Operation};
use crate::error::ArmError;

/// Maximum length of a response body written to the log.
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Truncate a body for logging and strip control characters.
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };
    truncated.replace(|c: char| c.is_control(), "")
}

#[derive(Deserialize, Default)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Deserialize, Default)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// A response whose status has not been judged yet.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decode the body, treating an empty body as JSON `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ArmError> {
        if self.body.trim().is_empty() {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Turn a non-success status into an [`ArmError`].
    pub fn error_for_status(self) -> Result<Self, ArmError> {
        if (200..300).contains(&self.status) {
            return Ok(self);
        }
        let envelope: ErrorEnvelope = serde_json::from_str(&self.body).unwrap_or_default();
        tracing::debug!(
            status = self.status,
            body = %sanitize_for_log(&self.body),
            "Resource Manager returned an error"
        );
        if self.status == 404 {
            let message = if envelope.error.message.is_empty() {
                envelope.error.code
            } else {
                envelope.error.message
            };
            return Err(ArmError::NotFound(message));
        }
        Err(ArmError::Api {
            status: self.status,
            code: envelope.error.code,
            message: envelope.error.message,
        })
    }
}

/// An authenticated client for `https://management.azure.com` (or a
/// sovereign cloud equivalent).
#[derive(Clone)]
pub struct ArmClient {
    http: Client,
    endpoint: Url,
    credential: Arc<dyn TokenCredential>,
    poll_interval: Duration,
}

impl ArmClient {
    /// Build a client for `endpoint`. `poll_interval` is used between
    /// long-running operation polls when the service sends no `Retry-After`.
    pub fn new(
        http: Client,
        endpoint: Url,
        credential: Arc<dyn TokenCredential>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            http,
            endpoint,
            credential,
            poll_interval,
        }
    }

    /// The `reqwest` client with this provider's user agent.
    pub fn default_http_client() -> Result<Client, ArmError> {
        Ok(Client::builder()
            .user_agent(concat!("hemmer-provider-azurerm/", env!("CARGO_PKG_VERSION")))
            .build()?)
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// The request URL for resource `id`.
    pub fn url(&self, id: &str, api_version: &str) -> Result<Url, ArmError> {
        let mut url = self.endpoint.join(id.trim_start_matches('/'))?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<RawResponse, ArmError> {
        tracing::debug!(method = %method, url = %url, "Resource Manager request");
        let token = self.credential.token().await?;
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header("x-ms-client-request-id", uuid::Uuid::new_v4().to_string());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    async fn send_to(
        &self,
        method: Method,
        id: &str,
        api_version: &str,
        body: Option<serde_json::Value>,
    ) -> Result<RawResponse, ArmError> {
        let url = self.url(id, api_version)?;
        self.send(method, url, body.as_ref()).await?.error_for_status()
    }

    /// GET a resource. A 404 is [`ArmError::NotFound`].
    pub async fn get<T: DeserializeOwned>(
        &self,
        id: &str,
        api_version: &str,
    ) -> Result<T, ArmError> {
        self.send_to(Method::GET, id, api_version, None).await?.json()
    }

    /// GET a resource, with 404 as `None`.
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        id: &str,
        api_version: &str,
    ) -> Result<Option<T>, ArmError> {
        match self.get(id, api_version).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// PUT `body` and decode the synchronous response.
    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        id: &str,
        api_version: &str,
        body: &B,
    ) -> Result<T, ArmError> {
        let body = serde_json::to_value(body)?;
        self.send_to(Method::PUT, id, api_version, Some(body))
            .await?
            .json()
    }

    /// PATCH `body` and decode the synchronous response.
    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        id: &str,
        api_version: &str,
        body: &B,
    ) -> Result<T, ArmError> {
        let body = serde_json::to_value(body)?;
        self.send_to(Method::PATCH, id, api_version, Some(body))
            .await?
            .json()
    }

    /// DELETE a resource without waiting. A 404 counts as success.
    pub async fn delete(&self, id: &str, api_version: &str) -> Result<(), ArmError> {
        match self.send_to(Method::DELETE, id, api_version, None).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// PUT `body`, wait for the operation to finish, then GET the result.
    pub async fn put_and_wait<B: Serialize, T: DeserializeOwned>(
        &self,
        id: &str,
        api_version: &str,
        body: &B,
    ) -> Result<T, ArmError> {
        let body = serde_json::to_value(body)?;
        let initial = self.send_to(Method::PUT, id, api_version, Some(body)).await?;
        poller::wait(self, initial, Operation::CreateOrUpdate).await?;
        self.get(id, api_version).await
    }

    /// PATCH `body`, wait for the operation to finish, then GET the result.
    pub async fn patch_and_wait<B: Serialize, T: DeserializeOwned>(
        &self,
        id: &str,
        api_version: &str,
        body: &B,
    ) -> Result<T, ArmError> {
        let body = serde_json::to_value(body)?;
        let initial = self
            .send_to(Method::PATCH, id, api_version, Some(body))
            .await?;
        poller::wait(self, initial, Operation::Update).await?;
        self.get(id, api_version).await
    }

    /// DELETE a resource and wait until it is gone. A 404 at any stage
    /// counts as success.
    pub async fn delete_and_wait(&self, id: &str, api_version: &str) -> Result<(), ArmError> {
        let initial = match self.send_to(Method::DELETE, id, api_version, None).await {
            Ok(response) => response,
            Err(err) if err.is_not_found() => return Ok(()),
            Err(err) => return Err(err),
        };
        poller::wait(self, initial, Operation::Delete).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::credentials::StaticTokenCredential;
    use serde_json::{json, Value};
    use wiremock::matchers::{bearer_token, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ID: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.ExtendedLocation/customLocations/cl1";
    const API: &str = "2021-08-15";

    fn client(server: &MockServer) -> ArmClient {
        ArmClient::new(
            Client::new(),
            Url::parse(&format!("{}/", server.uri())).unwrap(),
            Arc::new(StaticTokenCredential::new("test-token")),
            Duration::from_millis(10),
        )
    }

    #[test]
    fn test_sanitize_for_log() {
        let long = "x".repeat(500);
        let sanitized = sanitize_for_log(&long);
        assert!(sanitized.starts_with(&"x".repeat(200)));
        assert!(sanitized.contains("500 bytes total"));
        assert_eq!(sanitize_for_log("a\nb\tc"), "abc");
    }

    #[test]
    fn test_url_appends_api_version() {
        let client = ArmClient::new(
            Client::new(),
            Url::parse("https://management.azure.com/").unwrap(),
            Arc::new(StaticTokenCredential::new("t")),
            Duration::from_secs(1),
        );
        let url = client.url(ID, API).unwrap();
        assert_eq!(
            url.as_str(),
            format!("https://management.azure.com{ID}?api-version={API}")
        );
    }

    #[tokio::test]
    async fn test_get_sends_token_and_request_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ID))
            .and(query_param("api-version", API))
            .and(bearer_token("test-token"))
            .and(header_exists("x-ms-client-request-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "cl1"})))
            .mount(&server)
            .await;

        let body: Value = client(&server).get(ID, API).await.unwrap();
        assert_eq!(body["name"], "cl1");
    }

    #[tokio::test]
    async fn test_get_optional_maps_404_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "ResourceNotFound", "message": "not here"}
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let found: Option<Value> = client.get_optional(ID, API).await.unwrap();
        assert!(found.is_none());

        let err = client.get::<Value>(ID, API).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_error_envelope_is_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": {"code": "Conflict", "message": "operation in progress"}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .put::<_, Value>(ID, API, &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(
            err.to_string(),
            "unexpected status 409 with error: Conflict: operation in progress"
        );
    }

    #[tokio::test]
    async fn test_delete_ignores_404() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client(&server);
        client.delete(ID, API).await.unwrap();
        client.delete_and_wait(ID, API).await.unwrap();
    }

    #[tokio::test]
    async fn test_put_and_wait_reads_back() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(ID))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "cl1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ID))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "cl1",
                "properties": {"provisioningState": "Succeeded"}
            })))
            .mount(&server)
            .await;

        let body: Value = client(&server)
            .put_and_wait(ID, API, &json!({"location": "westus"}))
            .await
            .unwrap();
        assert_eq!(body["properties"]["provisioningState"], "Succeeded");
    }
}
