//! gRPC plumbing between Hemmer and a [`ProviderService`].
//!
//! [`ProviderService`] is the Rust-typed surface a provider implements;
//! `ProviderGrpcService` adapts it to the generated `hemmer.provider.v1`
//! service. States cross the wire as JSON bytes. An empty byte string
//! stands for "no value", which is also how a read reports a resource that
//! no longer exists.
//!
//! # Signal Handling
//!
//! On SIGTERM or SIGINT the server:
//! 1. Stops accepting new connections
//! 2. Gives in-flight requests up to [`ServeOptions::shutdown_timeout`] to finish
//! 3. Calls the provider's `stop()` method

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::net::TcpListener;
use tonic::transport::Server;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ProviderError;
use crate::generated;
use crate::schema::{BlockNestingMode, Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::types::{
    ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities, HANDSHAKE_PREFIX,
    PROTOCOL_VERSION,
};

/// The provider-side surface of the Hemmer protocol.
///
/// Every method takes and returns plain `serde_json::Value` states. Errors
/// are reported to Hemmer as error diagnostics.
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Return the provider's schema including all resources and data sources.
    fn schema(&self) -> ProviderSchema;

    /// Resource and data source names, sorted. Derived from the schema by
    /// default.
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        ProviderMetadata {
            resources: schema.resources.into_keys().collect(),
            data_sources: schema.data_sources.into_keys().collect(),
            capabilities: ServerCapabilities { plan_destroy: true },
        }
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate the provider configuration before configuring.
    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = config;
        Ok(vec![])
    }

    /// Configure the provider with credentials and settings.
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Stop the provider gracefully.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource's configuration before planning.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (resource_type, config);
        Ok(vec![])
    }

    /// Upgrade resource state from an older schema version.
    async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError> {
        let _ = (resource_type, version);
        Ok(state)
    }

    /// Plan changes for a resource.
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError>;

    /// Create a new resource.
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Read the current state of a resource. `Value::Null` means the
    /// resource is gone and should be dropped from state.
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError>;

    /// Update an existing resource.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete a resource.
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError>;

    /// Import existing infrastructure into management.
    async fn import_resource(
        &self,
        resource_type: &str,
        _id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        Err(ProviderError::Unimplemented(format!(
            "import is not supported for {}",
            resource_type
        )))
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source's configuration.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (data_source_type, config);
        Ok(vec![])
    }

    /// Read data from an external source.
    async fn read_data_source(
        &self,
        data_source_type: &str,
        _config: Value,
    ) -> Result<Value, ProviderError> {
        Err(ProviderError::UnknownResource(format!(
            "Unknown data source type: {}",
            data_source_type
        )))
    }
}

/// Adapts a [`ProviderService`] to the generated gRPC trait.
struct ProviderGrpcService<P: ProviderService> {
    provider: Arc<P>,
}

fn decode_state(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes).unwrap_or(Value::Null)
}

fn encode_state(value: &Value) -> Vec<u8> {
    if value.is_null() {
        return Vec::new();
    }
    serde_json::to_vec(value).unwrap_or_default()
}

fn diagnostics_to_proto(diagnostics: Vec<Diagnostic>) -> Vec<generated::Diagnostic> {
    diagnostics
        .into_iter()
        .map(|d| generated::Diagnostic {
            severity: match d.severity {
                DiagnosticSeverity::Error => generated::diagnostic::Severity::Error as i32,
                DiagnosticSeverity::Warning => generated::diagnostic::Severity::Warning as i32,
            },
            summary: d.summary,
            detail: d.detail.unwrap_or_default(),
            attribute: d.attribute.unwrap_or_default(),
        })
        .collect()
}

fn error_to_diagnostics(err: ProviderError) -> Vec<generated::Diagnostic> {
    vec![generated::Diagnostic {
        severity: generated::diagnostic::Severity::Error as i32,
        summary: err.to_string(),
        detail: String::new(),
        attribute: String::new(),
    }]
}

/// Encodes the state a call returned, or turns its error into diagnostics.
fn state_outcome(
    operation: &str,
    subject: &str,
    result: Result<Value, ProviderError>,
) -> (Vec<u8>, Vec<generated::Diagnostic>) {
    match result {
        Ok(state) => (encode_state(&state), vec![]),
        Err(e) => {
            error!(subject, error = %e, "{} failed", operation);
            (vec![], error_to_diagnostics(e))
        }
    }
}

/// Logs the outcome of a validate call and converts it for the wire.
fn validation_response(
    operation: &str,
    subject: &str,
    result: Result<Vec<Diagnostic>, ProviderError>,
) -> Vec<generated::Diagnostic> {
    match result {
        Ok(diagnostics) => {
            let errors = diagnostics.iter().filter(|d| d.is_error()).count();
            if errors > 0 {
                warn!(subject, errors, "{} completed with errors", operation);
            } else {
                debug!(subject, "{} completed", operation);
            }
            diagnostics_to_proto(diagnostics)
        }
        Err(e) => {
            error!(subject, error = %e, "{} failed", operation);
            error_to_diagnostics(e)
        }
    }
}

fn schema_to_proto(schema: &crate::schema::Schema) -> generated::Schema {
    generated::Schema {
        version: schema.version as i64,
        block: Some(block_to_proto(&schema.block)),
    }
}

fn block_to_proto(block: &crate::schema::Block) -> generated::Block {
    generated::Block {
        attributes: block
            .attributes
            .iter()
            .map(|(name, attr)| generated::Attribute {
                name: name.clone(),
                r#type: serde_json::to_vec(&attr.attr_type).unwrap_or_default(),
                required: attr.flags.required,
                optional: attr.flags.optional,
                computed: attr.flags.computed,
                sensitive: attr.flags.sensitive,
                description: attr.description.clone().unwrap_or_default(),
                force_new: attr.force_new,
                default_value: attr
                    .default
                    .as_ref()
                    .map(|v| serde_json::to_vec(v).unwrap_or_default())
                    .unwrap_or_default(),
            })
            .collect(),
        block_types: block
            .blocks
            .iter()
            .map(|(name, nested)| generated::NestedBlock {
                type_name: name.clone(),
                block: Some(block_to_proto(&nested.block)),
                nesting_mode: match nested.nesting_mode {
                    BlockNestingMode::Single => generated::nested_block::NestingMode::Single as i32,
                    BlockNestingMode::List => generated::nested_block::NestingMode::List as i32,
                },
                min_items: nested.min_items as i32,
                max_items: nested.max_items as i32,
            })
            .collect(),
        description: block.description.clone().unwrap_or_default(),
    }
}

#[tonic::async_trait]
impl<P: ProviderService> generated::provider_server::Provider for ProviderGrpcService<P> {
    #[instrument(skip(self, _request), name = "grpc.get_metadata")]
    async fn get_metadata(
        &self,
        _request: tonic::Request<generated::GetMetadataRequest>,
    ) -> Result<tonic::Response<generated::GetMetadataResponse>, tonic::Status> {
        let metadata = self.provider.metadata();
        debug!(
            resources = metadata.resources.len(),
            data_sources = metadata.data_sources.len(),
            "GetMetadata completed"
        );
        Ok(tonic::Response::new(generated::GetMetadataResponse {
            server_capabilities: Some(generated::ServerCapabilities {
                plan_destroy: metadata.capabilities.plan_destroy,
            }),
            resources: metadata.resources,
            data_sources: metadata.data_sources,
            diagnostics: vec![],
        }))
    }

    #[instrument(skip(self, _request), name = "grpc.get_schema")]
    async fn get_schema(
        &self,
        _request: tonic::Request<generated::GetSchemaRequest>,
    ) -> Result<tonic::Response<generated::GetSchemaResponse>, tonic::Status> {
        let schema = self.provider.schema();
        debug!(
            resources = schema.resources.len(),
            data_sources = schema.data_sources.len(),
            "GetSchema completed"
        );
        Ok(tonic::Response::new(generated::GetSchemaResponse {
            provider: Some(schema_to_proto(&schema.provider)),
            resources: schema
                .resources
                .iter()
                .map(|(k, v)| (k.clone(), schema_to_proto(v)))
                .collect(),
            data_sources: schema
                .data_sources
                .iter()
                .map(|(k, v)| (k.clone(), schema_to_proto(v)))
                .collect(),
            diagnostics: vec![],
        }))
    }

    #[instrument(skip(self, request), name = "grpc.validate_provider_config")]
    async fn validate_provider_config(
        &self,
        request: tonic::Request<generated::ValidateProviderConfigRequest>,
    ) -> Result<tonic::Response<generated::ValidateProviderConfigResponse>, tonic::Status> {
        let req = request.into_inner();
        let result = self
            .provider
            .validate_provider_config(decode_state(&req.config))
            .await;
        Ok(tonic::Response::new(generated::ValidateProviderConfigResponse {
            diagnostics: validation_response("ValidateProviderConfig", "provider", result),
        }))
    }

    #[instrument(skip(self, request), name = "grpc.configure")]
    async fn configure(
        &self,
        request: tonic::Request<generated::ConfigureRequest>,
    ) -> Result<tonic::Response<generated::ConfigureResponse>, tonic::Status> {
        let req = request.into_inner();
        let result = self.provider.configure(decode_state(&req.config)).await;
        if result.is_ok() {
            info!("Configure called");
        }
        Ok(tonic::Response::new(generated::ConfigureResponse {
            diagnostics: validation_response("Configure", "provider", result),
        }))
    }

    #[instrument(skip(self, _request), name = "grpc.stop")]
    async fn stop(
        &self,
        _request: tonic::Request<generated::StopRequest>,
    ) -> Result<tonic::Response<generated::StopResponse>, tonic::Status> {
        info!("Stop called");
        let error = match self.provider.stop().await {
            Ok(()) => String::new(),
            Err(e) => {
                error!(error = %e, "Stop failed");
                e.to_string()
            }
        };
        Ok(tonic::Response::new(generated::StopResponse { error }))
    }

    #[instrument(skip(self, request), name = "grpc.validate_resource_config")]
    async fn validate_resource_config(
        &self,
        request: tonic::Request<generated::ValidateResourceConfigRequest>,
    ) -> Result<tonic::Response<generated::ValidateResourceConfigResponse>, tonic::Status> {
        let req = request.into_inner();
        let result = self
            .provider
            .validate_resource_config(&req.resource_type, decode_state(&req.config))
            .await;
        Ok(tonic::Response::new(generated::ValidateResourceConfigResponse {
            diagnostics: validation_response("ValidateResourceConfig", &req.resource_type, result),
        }))
    }

    #[instrument(skip(self, request), name = "grpc.upgrade_resource_state")]
    async fn upgrade_resource_state(
        &self,
        request: tonic::Request<generated::UpgradeResourceStateRequest>,
    ) -> Result<tonic::Response<generated::UpgradeResourceStateResponse>, tonic::Status> {
        let req = request.into_inner();
        debug!(resource_type = %req.resource_type, version = req.version, "UpgradeResourceState called");
        let result = self
            .provider
            .upgrade_resource_state(&req.resource_type, req.version, decode_state(&req.raw_state))
            .await;
        let (upgraded_state, diagnostics) =
            state_outcome("UpgradeResourceState", &req.resource_type, result);
        Ok(tonic::Response::new(generated::UpgradeResourceStateResponse {
            upgraded_state,
            diagnostics,
        }))
    }

    #[instrument(skip(self, request), name = "grpc.plan")]
    async fn plan(
        &self,
        request: tonic::Request<generated::PlanRequest>,
    ) -> Result<tonic::Response<generated::PlanResponse>, tonic::Status> {
        let req = request.into_inner();
        let prior_state = match decode_state(&req.prior_state) {
            Value::Null => None,
            state => Some(state),
        };
        debug!(resource_type = %req.resource_type, is_create = prior_state.is_none(), "Plan called");

        let response = match self
            .provider
            .plan(
                &req.resource_type,
                prior_state,
                decode_state(&req.proposed_state),
                decode_state(&req.config),
            )
            .await
        {
            Ok(result) => {
                info!(
                    resource_type = %req.resource_type,
                    changes = result.changes.len(),
                    requires_replace = result.requires_replace,
                    "Plan completed"
                );
                generated::PlanResponse {
                    planned_state: encode_state(&result.planned_state),
                    changes: result.changes.into_iter().map(Into::into).collect(),
                    requires_replace: result.requires_replace,
                    diagnostics: vec![],
                }
            }
            Err(e) => {
                error!(resource_type = %req.resource_type, error = %e, "Plan failed");
                generated::PlanResponse {
                    planned_state: vec![],
                    changes: vec![],
                    requires_replace: false,
                    diagnostics: error_to_diagnostics(e),
                }
            }
        };
        Ok(tonic::Response::new(response))
    }

    #[instrument(skip(self, request), name = "grpc.create")]
    async fn create(
        &self,
        request: tonic::Request<generated::CreateRequest>,
    ) -> Result<tonic::Response<generated::CreateResponse>, tonic::Status> {
        let req = request.into_inner();
        info!(resource_type = %req.resource_type, "Create called");
        let result = self
            .provider
            .create(&req.resource_type, decode_state(&req.planned_state))
            .await;
        let (state, diagnostics) = state_outcome("Create", &req.resource_type, result);
        Ok(tonic::Response::new(generated::CreateResponse { state, diagnostics }))
    }

    #[instrument(skip(self, request), name = "grpc.read")]
    async fn read(
        &self,
        request: tonic::Request<generated::ReadRequest>,
    ) -> Result<tonic::Response<generated::ReadResponse>, tonic::Status> {
        let req = request.into_inner();
        debug!(resource_type = %req.resource_type, "Read called");
        let result = self
            .provider
            .read(&req.resource_type, decode_state(&req.current_state))
            .await;
        if matches!(&result, Ok(Value::Null)) {
            info!(resource_type = %req.resource_type, "Resource no longer exists, removing from state");
        }
        let (state, diagnostics) = state_outcome("Read", &req.resource_type, result);
        Ok(tonic::Response::new(generated::ReadResponse { state, diagnostics }))
    }

    #[instrument(skip(self, request), name = "grpc.update")]
    async fn update(
        &self,
        request: tonic::Request<generated::UpdateRequest>,
    ) -> Result<tonic::Response<generated::UpdateResponse>, tonic::Status> {
        let req = request.into_inner();
        info!(resource_type = %req.resource_type, "Update called");
        let result = self
            .provider
            .update(
                &req.resource_type,
                decode_state(&req.prior_state),
                decode_state(&req.planned_state),
            )
            .await;
        let (state, diagnostics) = state_outcome("Update", &req.resource_type, result);
        Ok(tonic::Response::new(generated::UpdateResponse { state, diagnostics }))
    }

    #[instrument(skip(self, request), name = "grpc.delete")]
    async fn delete(
        &self,
        request: tonic::Request<generated::DeleteRequest>,
    ) -> Result<tonic::Response<generated::DeleteResponse>, tonic::Status> {
        let req = request.into_inner();
        info!(resource_type = %req.resource_type, "Delete called");
        let result = self
            .provider
            .delete(&req.resource_type, decode_state(&req.current_state))
            .await
            .map(|()| Value::Null);
        let (_, diagnostics) = state_outcome("Delete", &req.resource_type, result);
        Ok(tonic::Response::new(generated::DeleteResponse { diagnostics }))
    }

    #[instrument(skip(self, request), name = "grpc.import_resource_state")]
    async fn import_resource_state(
        &self,
        request: tonic::Request<generated::ImportResourceStateRequest>,
    ) -> Result<tonic::Response<generated::ImportResourceStateResponse>, tonic::Status> {
        let req = request.into_inner();
        info!(resource_type = %req.resource_type, id = %req.id, "ImportResourceState called");

        let response = match self
            .provider
            .import_resource(&req.resource_type, &req.id)
            .await
        {
            Ok(imported) => generated::ImportResourceStateResponse {
                imported: imported
                    .into_iter()
                    .map(|r| generated::ImportedResource {
                        resource_type: r.resource_type,
                        state: encode_state(&r.state),
                    })
                    .collect(),
                diagnostics: vec![],
            },
            Err(e) => {
                error!(resource_type = %req.resource_type, id = %req.id, error = %e, "ImportResourceState failed");
                generated::ImportResourceStateResponse {
                    imported: vec![],
                    diagnostics: error_to_diagnostics(e),
                }
            }
        };
        Ok(tonic::Response::new(response))
    }

    #[instrument(skip(self, request), name = "grpc.validate_data_source_config")]
    async fn validate_data_source_config(
        &self,
        request: tonic::Request<generated::ValidateDataSourceConfigRequest>,
    ) -> Result<tonic::Response<generated::ValidateDataSourceConfigResponse>, tonic::Status> {
        let req = request.into_inner();
        let result = self
            .provider
            .validate_data_source_config(&req.data_source_type, decode_state(&req.config))
            .await;
        Ok(tonic::Response::new(generated::ValidateDataSourceConfigResponse {
            diagnostics: validation_response(
                "ValidateDataSourceConfig",
                &req.data_source_type,
                result,
            ),
        }))
    }

    #[instrument(skip(self, request), name = "grpc.read_data_source")]
    async fn read_data_source(
        &self,
        request: tonic::Request<generated::ReadDataSourceRequest>,
    ) -> Result<tonic::Response<generated::ReadDataSourceResponse>, tonic::Status> {
        let req = request.into_inner();
        debug!(data_source_type = %req.data_source_type, "ReadDataSource called");
        let result = self
            .provider
            .read_data_source(&req.data_source_type, decode_state(&req.config))
            .await;
        let (state, diagnostics) = state_outcome("ReadDataSource", &req.data_source_type, result);
        Ok(tonic::Response::new(generated::ReadDataSourceResponse { state, diagnostics }))
    }
}

/// Options for configuring the provider server.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// How long in-flight requests get to finish once a shutdown signal
    /// arrives. Default: 30 seconds.
    pub shutdown_timeout: Duration,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl ServeOptions {
    /// Create new serve options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shutdown timeout.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

/// Resolves on SIGTERM or SIGINT (CTRL+C on Windows). If the handlers
/// cannot be installed the future never resolves and the process relies on
/// being killed.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    error!(error = %e, "Failed to install signal handlers");
                    return std::future::pending::<()>().await;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
            _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
        }
    }

    #[cfg(windows)]
    {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received CTRL+C, initiating graceful shutdown"),
            Err(e) => {
                error!(error = %e, "Failed to install CTRL+C handler");
                std::future::pending::<()>().await
            }
        }
    }

    #[cfg(not(any(unix, windows)))]
    {
        std::future::pending::<()>().await;
    }
}

/// Serve a provider on an ephemeral localhost port.
///
/// Prints `HEMMER_PROVIDER|<version>|<address>` to stdout once the listener
/// is bound, then serves until SIGTERM/SIGINT.
pub async fn serve<P: ProviderService>(provider: P) -> Result<(), Box<dyn std::error::Error>> {
    serve_with_options(provider, ServeOptions::default()).await
}

/// Like [`serve`], with custom [`ServeOptions`].
pub async fn serve_with_options<P: ProviderService>(
    provider: P,
    options: ServeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    serve_on_listener(provider, listener, options).await
}

/// Serve a provider on a specific address.
pub async fn serve_on<P: ProviderService>(
    provider: P,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    serve_on_with_options(provider, addr, ServeOptions::default()).await
}

/// Serve a provider on a specific address with custom options.
pub async fn serve_on_with_options<P: ProviderService>(
    provider: P,
    addr: SocketAddr,
    options: ServeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    serve_on_listener(provider, listener, options).await
}

/// Serve on an already-bound listener until OS shutdown signal.
pub async fn serve_on_listener<P: ProviderService>(
    provider: P,
    listener: TcpListener,
    options: ServeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    serve_until(provider, listener, options, wait_for_shutdown_signal()).await
}

/// Serve on `listener` until `shutdown` resolves, then drain for at most
/// `options.shutdown_timeout` and call the provider's `stop()`.
pub async fn serve_until<P, F>(
    provider: P,
    listener: TcpListener,
    options: ServeOptions,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    P: ProviderService,
    F: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    println!("{}|{}|{}", HANDSHAKE_PREFIX, PROTOCOL_VERSION, addr);
    info!(address = %addr, "Provider server starting");

    let provider = Arc::new(provider);
    let grpc_service = ProviderGrpcService {
        provider: Arc::clone(&provider),
    };

    let (drain_tx, drain_rx) = tokio::sync::oneshot::channel::<()>();
    let server_future = Server::builder()
        .add_service(generated::provider_server::ProviderServer::new(grpc_service))
        .serve_with_incoming_shutdown(
            tokio_stream::wrappers::TcpListenerStream::new(listener),
            async {
                let _ = drain_rx.await;
            },
        );
    tokio::pin!(server_future);

    // The timeout only bounds the drain that follows a shutdown signal.
    tokio::select! {
        result = &mut server_future => {
            if let Err(e) = result {
                error!(error = %e, "Server error");
                return Err(e.into());
            }
        }
        _ = shutdown => {
            let _ = drain_tx.send(());
            match tokio::time::timeout(options.shutdown_timeout, &mut server_future).await {
                Ok(Ok(())) => info!("Server shutdown complete"),
                Ok(Err(e)) => {
                    error!(error = %e, "Server error during shutdown");
                    return Err(e.into());
                }
                Err(_) => warn!(
                    timeout = ?options.shutdown_timeout,
                    "Shutdown timeout exceeded, forcing shutdown"
                ),
            }
        }
    }

    debug!("Calling provider stop()");
    if let Err(e) = provider.stop().await {
        warn!(error = %e, "Provider stop() returned error");
    }

    info!("Provider shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generated::provider_server::Provider;
    use crate::schema::{Attribute, Schema};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct FakeProvider {
        stopped: AtomicBool,
    }

    #[async_trait::async_trait]
    impl ProviderService for FakeProvider {
        fn schema(&self) -> ProviderSchema {
            ProviderSchema::new()
                .with_resource(
                    "azurerm_widget",
                    Schema::v0().with_attribute("name", Attribute::required_string()),
                )
                .with_data_source("azurerm_lookup", Schema::v0())
        }

        async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
            if config.get("subscription_id").is_none() {
                return Ok(vec![Diagnostic::error("subscription_id is required")]);
            }
            Ok(vec![])
        }

        async fn stop(&self) -> Result<(), ProviderError> {
            self.stopped.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn plan(
            &self,
            _resource_type: &str,
            prior_state: Option<Value>,
            proposed_state: Value,
            _config: Value,
        ) -> Result<PlanResult, ProviderError> {
            Ok(PlanResult::with_changes(
                proposed_state,
                vec![],
                prior_state.is_some(),
            ))
        }

        async fn create(
            &self,
            _resource_type: &str,
            planned: Value,
        ) -> Result<Value, ProviderError> {
            Ok(planned)
        }

        async fn read(&self, _resource_type: &str, current: Value) -> Result<Value, ProviderError> {
            if current["name"] == "gone" {
                return Ok(Value::Null);
            }
            Ok(current)
        }

        async fn update(
            &self,
            _resource_type: &str,
            _prior: Value,
            planned: Value,
        ) -> Result<Value, ProviderError> {
            Ok(planned)
        }

        async fn delete(&self, _resource_type: &str, _current: Value) -> Result<(), ProviderError> {
            Err(ProviderError::PermissionDenied("deleting widget: forbidden".to_string()))
        }
    }

    fn service() -> ProviderGrpcService<FakeProvider> {
        ProviderGrpcService {
            provider: Arc::new(FakeProvider::default()),
        }
    }

    #[test]
    fn test_state_encoding() {
        assert!(encode_state(&Value::Null).is_empty());
        assert_eq!(decode_state(b""), Value::Null);
        assert_eq!(decode_state(b"not json"), Value::Null);
        assert_eq!(decode_state(&encode_state(&json!({"a": 1}))), json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_metadata_is_sorted() {
        let response = service()
            .get_metadata(tonic::Request::new(generated::GetMetadataRequest {}))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.resources, vec!["azurerm_widget".to_string()]);
        assert_eq!(response.data_sources, vec!["azurerm_lookup".to_string()]);
        assert!(response.server_capabilities.unwrap().plan_destroy);
    }

    #[tokio::test]
    async fn test_configure_diagnostics_are_forwarded() {
        let response = service()
            .configure(tonic::Request::new(generated::ConfigureRequest {
                config: b"{}".to_vec(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "subscription_id is required");
    }

    #[tokio::test]
    async fn test_read_of_gone_resource_returns_empty_state() {
        let response = service()
            .read(tonic::Request::new(generated::ReadRequest {
                resource_type: "azurerm_widget".to_string(),
                current_state: br#"{"name":"gone"}"#.to_vec(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(response.state.is_empty());
        assert!(response.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_plan_without_prior_state_is_create() {
        let response = service()
            .plan(tonic::Request::new(generated::PlanRequest {
                resource_type: "azurerm_widget".to_string(),
                prior_state: vec![],
                proposed_state: br#"{"name":"w1"}"#.to_vec(),
                config: br#"{"name":"w1"}"#.to_vec(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!response.requires_replace);
        assert_eq!(decode_state(&response.planned_state), json!({"name": "w1"}));
    }

    #[tokio::test]
    async fn test_errors_become_diagnostics() {
        let response = service()
            .delete(tonic::Request::new(generated::DeleteRequest {
                resource_type: "azurerm_widget".to_string(),
                current_state: br#"{"name":"w1"}"#.to_vec(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].summary.contains("forbidden"));
    }

    #[tokio::test]
    async fn test_unknown_data_source() {
        let response = service()
            .read_data_source(tonic::Request::new(generated::ReadDataSourceRequest {
                data_source_type: "azurerm_nope".to_string(),
                config: vec![],
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(response.state.is_empty());
        assert!(response.diagnostics[0].summary.contains("azurerm_nope"));
    }

    #[tokio::test]
    async fn test_serve_until_runs_past_shutdown_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let options = ServeOptions::new().with_shutdown_timeout(Duration::from_millis(50));
        let started = std::time::Instant::now();

        let server = serve_until(FakeProvider::default(), listener, options, async {
            let _ = rx.await;
        });
        // Outlive the drain timeout before signalling.
        let signal = async {
            tokio::time::sleep(Duration::from_millis(150)).await;
            let _ = tx.send(());
        };

        let (result, ()) = tokio::join!(server, signal);
        assert!(result.is_ok());
        assert!(started.elapsed() >= Duration::from_millis(150));
    }
}
