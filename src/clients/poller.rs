//! Long-running operation polling.
//!
//! ARM signals an asynchronous PUT/PATCH/DELETE with one of two headers:
//! `Azure-AsyncOperation` points at a status resource whose `status` field
//! reaches `Succeeded`, `Failed` or `Canceled`; `Location` (with a 202)
//! points at a URL that keeps answering 202 until the work is done.

use std::time::Duration;

use reqwest::Method;
use serde::Deserialize;
use url::Url;

use super::arm::{ArmClient, ErrorBody, RawResponse};
use crate::error::ArmError;

/// The kind of request that started the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    CreateOrUpdate,
    Update,
    Delete,
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Self::CreateOrUpdate => "CreateOrUpdate",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

#[derive(Deserialize)]
struct OperationStatus {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<ErrorBody>,
}

/// The delay requested by `Retry-After` (in seconds), if any.
fn retry_after(response: &RawResponse) -> Option<Duration> {
    response
        .header("retry-after")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn poll_delay(client: &ArmClient, response: &RawResponse) -> Duration {
    retry_after(response).unwrap_or_else(|| client.poll_interval())
}

/// Drive the operation started by `initial` to completion.
pub(crate) async fn wait(
    client: &ArmClient,
    initial: RawResponse,
    operation: Operation,
) -> Result<(), ArmError> {
    if let Some(url) = initial.header("azure-asyncoperation") {
        let url = Url::parse(url)?;
        return poll_async_operation(client, url, operation, poll_delay(client, &initial)).await;
    }
    if initial.status == 202 {
        if let Some(url) = initial.header("location") {
            let url = Url::parse(url)?;
            return poll_location(client, url, operation, poll_delay(client, &initial)).await;
        }
    }
    Ok(())
}

async fn poll_async_operation(
    client: &ArmClient,
    url: Url,
    operation: Operation,
    mut delay: Duration,
) -> Result<(), ArmError> {
    loop {
        tokio::time::sleep(delay).await;
        let response = client.send(Method::GET, url.clone(), None).await?;
        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(err) if err.is_not_found() && operation == Operation::Delete => return Ok(()),
            Err(err) => return Err(err),
        };

        let status: OperationStatus = response.json()?;
        tracing::trace!(operation = operation.name(), status = %status.status, "Polled operation");
        match status.status.to_ascii_lowercase().as_str() {
            "succeeded" => return Ok(()),
            "failed" | "canceled" | "cancelled" => {
                let error = status.error.unwrap_or_default();
                return Err(ArmError::OperationFailed {
                    operation: operation.name().to_string(),
                    status: status.status,
                    code: error.code,
                    message: error.message,
                });
            }
            _ => delay = poll_delay(client, &response),
        }
    }
}

async fn poll_location(
    client: &ArmClient,
    url: Url,
    operation: Operation,
    mut delay: Duration,
) -> Result<(), ArmError> {
    loop {
        tokio::time::sleep(delay).await;
        let response = client.send(Method::GET, url.clone(), None).await?;
        if response.status == 202 {
            delay = poll_delay(client, &response);
            continue;
        }
        return match response.error_for_status() {
            Ok(_) => Ok(()),
            Err(err) if err.is_not_found() && operation == Operation::Delete => Ok(()),
            Err(err) => Err(err),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::credentials::StaticTokenCredential;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ID: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.HDInsight/clusterPools/pool/clusters/c1";
    const API: &str = "2024-05-01";

    fn client(server: &MockServer) -> ArmClient {
        ArmClient::new(
            reqwest::Client::new(),
            Url::parse(&format!("{}/", server.uri())).unwrap(),
            Arc::new(StaticTokenCredential::new("t")),
            Duration::from_millis(5),
        )
    }

    #[tokio::test]
    async fn test_async_operation_until_succeeded() {
        let server = MockServer::start().await;
        let op_url = format!("{}/operations/op1", server.uri());

        Mock::given(method("PUT"))
            .and(path(ID))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("Azure-AsyncOperation", op_url.as_str())
                    .insert_header("Retry-After", "0")
                    .set_body_json(json!({"properties": {"provisioningState": "Accepted"}})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/op1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "InProgress"})))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/op1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Succeeded"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ID))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "c1"})))
            .mount(&server)
            .await;

        let body: Value = client(&server)
            .put_and_wait(ID, API, &json!({}))
            .await
            .unwrap();
        assert_eq!(body["name"], "c1");
    }

    #[tokio::test]
    async fn test_async_operation_failure_carries_error() {
        let server = MockServer::start().await;
        let op_url = format!("{}/operations/op2", server.uri());

        Mock::given(method("PATCH"))
            .respond_with(
                ResponseTemplate::new(202).insert_header("Azure-AsyncOperation", op_url.as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/op2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "Failed",
                "error": {"code": "QuotaExceeded", "message": "not enough cores"}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .patch_and_wait::<_, Value>(ID, API, &json!({"tags": {}}))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "polling after Update: operation Failed: QuotaExceeded: not enough cores"
        );
    }

    #[tokio::test]
    async fn test_location_polling_for_delete() {
        let server = MockServer::start().await;
        let location = format!("{}/operationResults/op3", server.uri());

        Mock::given(method("DELETE"))
            .and(path(ID))
            .respond_with(
                ResponseTemplate::new(202)
                    .insert_header("Location", location.as_str())
                    .insert_header("Retry-After", "0"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operationResults/op3"))
            .respond_with(ResponseTemplate::new(202).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operationResults/op3"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        client(&server).delete_and_wait(ID, API).await.unwrap();
    }

    #[tokio::test]
    async fn test_synchronous_response_needs_no_polling() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        client(&server).delete_and_wait(ID, API).await.unwrap();
    }

    #[test]
    fn test_retry_after_parsing() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("retry-after", "7".parse().unwrap());
        let response = RawResponse {
            status: 202,
            headers,
            body: String::new(),
        };
        assert_eq!(retry_after(&response), Some(Duration::from_secs(7)));
    }
}
