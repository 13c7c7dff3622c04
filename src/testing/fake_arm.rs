//! An in-memory Resource Manager behind a `wiremock` server.
//!
//! PUT stores the body under the request path, GET returns it (or a 404
//! envelope), PATCH merges into it and DELETE removes it. With
//! [`FakeArm::start_with_async_operations`] every write answers with an
//! `Azure-AsyncOperation` header so the poller is exercised too.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use crate::clients::{ArmClient, StaticTokenCredential};
use crate::resources::ResourceContext;

pub(crate) const SUBSCRIPTION_ID: &str = "00000000-0000-0000-0000-000000000000";

const OPERATIONS_PATH: &str = "/fake-operations/";

type Store = Arc<Mutex<HashMap<String, Value>>>;

fn key(path: &str) -> String {
    path.trim_end_matches('/').to_ascii_lowercase()
}

fn not_found(path: &str) -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "error": {
            "code": "ResourceNotFound",
            "message": format!("The Resource '{path}' was not found.")
        }
    }))
}

/// RFC 7396 merge: objects merge recursively, `null` removes a member.
fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (k, v) in patch {
                if v.is_null() {
                    target.remove(&k);
                } else {
                    merge(target.entry(k).or_insert(Value::Null), v);
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

struct Responder {
    store: Store,
    base_uri: String,
    async_operations: bool,
    operations: AtomicUsize,
}

impl Responder {
    fn accepted(&self, status: u16, body: Option<Value>) -> ResponseTemplate {
        let mut response = ResponseTemplate::new(status);
        if let Some(body) = body {
            response = response.set_body_json(body);
        }
        if self.async_operations {
            let n = self.operations.fetch_add(1, Ordering::SeqCst);
            // The request URL seen by a responder carries no port.
            let url = format!("{}{OPERATIONS_PATH}{n}", self.base_uri);
            response = response
                .insert_header("Azure-AsyncOperation", url.as_str())
                .insert_header("Retry-After", "0");
        }
        response
    }
}

impl Respond for Responder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let path = request.url.path().to_string();
        if path.starts_with(OPERATIONS_PATH) {
            return ResponseTemplate::new(200).set_body_json(json!({"status": "Succeeded"}));
        }

        let mut store = match self.store.lock() {
            Ok(store) => store,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = key(&path);
        match request.method.as_str() {
            "GET" => match store.get(&id) {
                Some(body) => ResponseTemplate::new(200).set_body_json(body),
                None => not_found(&path),
            },
            "PUT" => {
                let mut body: Value =
                    serde_json::from_slice(&request.body).unwrap_or_else(|_| json!({}));
                if let Value::Object(map) = &mut body {
                    map.insert("id".to_string(), Value::String(path.clone()));
                    let name = path.rsplit('/').next().unwrap_or_default();
                    map.insert("name".to_string(), Value::String(name.to_string()));
                }
                let status = if store.contains_key(&id) { 200 } else { 201 };
                store.insert(id, body.clone());
                self.accepted(status, Some(body))
            }
            "PATCH" => match store.get_mut(&id) {
                Some(existing) => {
                    let patch: Value =
                        serde_json::from_slice(&request.body).unwrap_or_else(|_| json!({}));
                    merge(existing, patch);
                    let body = existing.clone();
                    self.accepted(200, Some(body))
                }
                None => not_found(&path),
            },
            "DELETE" => match store.remove(&id) {
                Some(_) => self.accepted(200, None),
                None => ResponseTemplate::new(204),
            },
            _ => ResponseTemplate::new(405),
        }
    }
}

/// A running fake Resource Manager.
pub(crate) struct FakeArm {
    server: MockServer,
    store: Store,
}

impl FakeArm {
    /// A fake that answers every write synchronously.
    pub(crate) async fn start() -> Self {
        Self::start_inner(false).await
    }

    /// A fake whose writes complete through `Azure-AsyncOperation` polling.
    pub(crate) async fn start_with_async_operations() -> Self {
        Self::start_inner(true).await
    }

    async fn start_inner(async_operations: bool) -> Self {
        let server = MockServer::start().await;
        let store: Store = Arc::default();
        Mock::given(wiremock::matchers::any())
            .respond_with(Responder {
                store: store.clone(),
                base_uri: server.uri(),
                async_operations,
                operations: AtomicUsize::new(0),
            })
            .mount(&server)
            .await;
        Self { server, store }
    }

    /// An ARM client pointed at this fake.
    pub(crate) fn client(&self) -> ArmClient {
        let endpoint = Url::parse(&format!("{}/", self.server.uri()))
            .unwrap_or_else(|e| panic!("mock server URI: {e}"));
        ArmClient::new(
            reqwest::Client::new(),
            endpoint,
            Arc::new(StaticTokenCredential::new("fake-token")),
            Duration::from_millis(1),
        )
    }

    /// A resource context for [`SUBSCRIPTION_ID`].
    pub(crate) fn context(&self) -> ResourceContext {
        ResourceContext::new(self.client(), SUBSCRIPTION_ID)
    }

    /// The base URL, for provider configuration.
    pub(crate) fn uri(&self) -> String {
        self.server.uri()
    }

    fn store(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        match self.store.lock() {
            Ok(store) => store,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Seed a resource as if it had been created out of band.
    pub(crate) fn insert(&self, id: &str, mut body: Value) {
        if let Value::Object(map) = &mut body {
            map.entry("id").or_insert_with(|| Value::String(id.to_string()));
        }
        self.store().insert(key(id), body);
    }

    /// The stored body for `id`.
    pub(crate) fn get(&self, id: &str) -> Option<Value> {
        self.store().get(&key(id)).cloned()
    }

    /// Remove `id` behind the provider's back.
    pub(crate) fn remove(&self, id: &str) {
        self.store().remove(&key(id));
    }

    /// Answer the next request with `method` with `status` and an ARM error
    /// envelope.
    pub(crate) async fn fail_next(&self, http_method: &str, status: u16) {
        Mock::given(method(http_method))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {"code": "InjectedFailure", "message": "injected by test"}
            })))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// JSON bodies received for `id` with `http_method`, oldest first.
    pub(crate) async fn bodies(&self, http_method: &str, id: &str) -> Vec<Value> {
        let id = key(id);
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == http_method && key(r.url.path()) == id)
            .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
            .collect()
    }

    /// The last body sent with `http_method` to `id`, or `null`.
    pub(crate) async fn last_body(&self, http_method: &str, id: &str) -> Value {
        self.bodies(http_method, id).await.pop().unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg/providers/Microsoft.ConnectedVMwarevSphere/hosts/h1";

    #[test]
    fn test_merge_patch() {
        let mut target = json!({"tags": {"a": "1", "b": "2"}, "location": "westus"});
        merge(&mut target, json!({"tags": {"b": null, "c": "3"}}));
        assert_eq!(target, json!({"tags": {"a": "1", "c": "3"}, "location": "westus"}));
    }

    #[tokio::test]
    async fn test_put_get_patch_delete() {
        let arm = FakeArm::start().await;
        let client = arm.client();

        let created: Value = client
            .put(ID, "2023-10-01", &json!({"location": "westus", "tags": {"env": "dev"}}))
            .await
            .unwrap();
        assert_eq!(created["name"], "h1");

        let _: Value = client
            .patch(ID, "2023-10-01", &json!({"tags": {"env": "prod"}}))
            .await
            .unwrap();
        let read: Value = client.get(ID, "2023-10-01").await.unwrap();
        assert_eq!(read["tags"]["env"], "prod");
        assert_eq!(read["location"], "westus");

        client.delete(ID, "2023-10-01").await.unwrap();
        assert!(arm.get(ID).is_none());
        assert!(client.get::<Value>(ID, "2023-10-01").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_async_operations_are_polled() {
        let arm = FakeArm::start_with_async_operations().await;
        let body: Value = arm
            .client()
            .put_and_wait(ID, "2023-10-01", &json!({"location": "westus"}))
            .await
            .unwrap();
        assert_eq!(body["location"], "westus");
        arm.client().delete_and_wait(ID, "2023-10-01").await.unwrap();
        assert!(arm.get(ID).is_none());
    }

    #[tokio::test]
    async fn test_operation_url_points_at_the_server() {
        let arm = FakeArm::start_with_async_operations().await;
        let response = reqwest::Client::new()
            .put(format!("{}{ID}", arm.uri()))
            .json(&json!({"location": "westus"}))
            .send()
            .await
            .unwrap();
        let operation = response
            .headers()
            .get("Azure-AsyncOperation")
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert_eq!(operation, format!("{}{OPERATIONS_PATH}0", arm.uri()));

        let status: Value = reqwest::get(&operation).await.unwrap().json().await.unwrap();
        assert_eq!(status["status"], "Succeeded");
    }

    #[tokio::test]
    async fn test_fail_next() {
        let arm = FakeArm::start().await;
        arm.insert(ID, json!({}));
        arm.fail_next("GET", 429).await;

        let err = arm.client().get::<Value>(ID, "2023-10-01").await.unwrap_err();
        assert_eq!(err.status(), Some(429));
        assert!(arm.client().get::<Value>(ID, "2023-10-01").await.is_ok());
    }
}
