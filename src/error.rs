//! Error types for the Azure provider.
//!
//! [`ProviderError`] is what every provider operation returns and what the
//! gRPC layer turns into diagnostics. [`ArmError`] covers the Resource
//! Manager REST layer and converts into [`ProviderError`] by HTTP status.

use std::fmt::Display;

use thiserror::Error;

/// Errors that can occur while serving provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal error occurred.
    #[error("SDK error: {0}")]
    Sdk(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A gRPC transport error occurred.
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// Resource already exists (create conflict).
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// Permission denied (authentication/authorization failure).
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Quota or rate limit exceeded.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Service temporarily unavailable.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Operation timed out.
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// Operation failed due to current state (precondition not met).
    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    /// Operation not implemented.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    /// Invalid request from client.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Get the error message as a string.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg) => msg,
            Self::Validation(msg) => msg,
            Self::Sdk(msg) => msg,
            Self::Configuration(msg) => msg,
            Self::UnknownResource(msg) => msg,
            Self::Serialization(_err) => "serialization error (see Debug output)",
            Self::Transport(_err) => "transport error (see Debug output)",
            Self::AlreadyExists(msg) => msg,
            Self::PermissionDenied(msg) => msg,
            Self::ResourceExhausted(msg) => msg,
            Self::Unavailable(msg) => msg,
            Self::DeadlineExceeded(msg) => msg,
            Self::FailedPrecondition(msg) => msg,
            Self::Unimplemented(msg) => msg,
            Self::InvalidRequest(msg) => msg,
        }
    }

    /// The error returned by Create when the target ID is already present
    /// in the subscription and must be imported instead.
    pub fn requires_import(id: impl Display) -> Self {
        Self::AlreadyExists(format!(
            "A resource with the ID \"{id}\" already exists - to be managed via Terraform \
             this resource needs to be imported into the State."
        ))
    }

    /// Prefix the message with `context`, keeping the error kind.
    ///
    /// ```
    /// use hemmer_provider_azurerm::ProviderError;
    ///
    /// let err = ProviderError::Unavailable("503".to_string()).context("creating cluster");
    /// assert_eq!(err.message(), "creating cluster: 503");
    /// ```
    pub fn context(self, context: impl Display) -> Self {
        let wrap = |msg: String| format!("{context}: {msg}");
        match self {
            Self::NotFound(msg) => Self::NotFound(wrap(msg)),
            Self::Validation(msg) => Self::Validation(wrap(msg)),
            Self::Sdk(msg) => Self::Sdk(wrap(msg)),
            Self::Configuration(msg) => Self::Configuration(wrap(msg)),
            Self::UnknownResource(msg) => Self::UnknownResource(wrap(msg)),
            Self::Serialization(err) => Self::Sdk(wrap(err.to_string())),
            Self::Transport(err) => Self::Unavailable(wrap(err.to_string())),
            Self::AlreadyExists(msg) => Self::AlreadyExists(wrap(msg)),
            Self::PermissionDenied(msg) => Self::PermissionDenied(wrap(msg)),
            Self::ResourceExhausted(msg) => Self::ResourceExhausted(wrap(msg)),
            Self::Unavailable(msg) => Self::Unavailable(wrap(msg)),
            Self::DeadlineExceeded(msg) => Self::DeadlineExceeded(wrap(msg)),
            Self::FailedPrecondition(msg) => Self::FailedPrecondition(wrap(msg)),
            Self::Unimplemented(msg) => Self::Unimplemented(wrap(msg)),
            Self::InvalidRequest(msg) => Self::InvalidRequest(wrap(msg)),
        }
    }
}

/// Adds operation context to fallible calls, in the style of
/// `anyhow::Context`.
pub trait ResultExt<T> {
    /// Convert the error into a [`ProviderError`] prefixed with `context`.
    fn context<C: Display>(self, context: C) -> Result<T, ProviderError>;

    /// Like [`ResultExt::context`], building the prefix only on error.
    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T, ProviderError>;
}

impl<T, E: Into<ProviderError>> ResultExt<T> for Result<T, E> {
    fn context<C: Display>(self, context: C) -> Result<T, ProviderError> {
        self.map_err(|e| e.into().context(context))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T, ProviderError> {
        self.map_err(|e| e.into().context(f()))
    }
}

impl From<ProviderError> for tonic::Status {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(msg) => tonic::Status::not_found(msg),
            ProviderError::Validation(msg) => tonic::Status::invalid_argument(msg),
            ProviderError::Configuration(msg) => tonic::Status::failed_precondition(msg),
            ProviderError::UnknownResource(msg) => tonic::Status::not_found(msg),
            ProviderError::Sdk(msg) => tonic::Status::internal(msg),
            ProviderError::Serialization(err) => {
                tonic::Status::invalid_argument(format!("Serialization error: {}", err))
            }
            ProviderError::Transport(err) => {
                tonic::Status::unavailable(format!("Transport error: {}", err))
            }
            ProviderError::AlreadyExists(msg) => tonic::Status::already_exists(msg),
            ProviderError::PermissionDenied(msg) => tonic::Status::permission_denied(msg),
            ProviderError::ResourceExhausted(msg) => tonic::Status::resource_exhausted(msg),
            ProviderError::Unavailable(msg) => tonic::Status::unavailable(msg),
            ProviderError::DeadlineExceeded(msg) => tonic::Status::deadline_exceeded(msg),
            ProviderError::FailedPrecondition(msg) => tonic::Status::failed_precondition(msg),
            ProviderError::Unimplemented(msg) => tonic::Status::unimplemented(msg),
            ProviderError::InvalidRequest(msg) => tonic::Status::invalid_argument(msg),
        }
    }
}

/// Errors from the Resource Manager REST layer.
#[derive(Debug, Error)]
pub enum ArmError {
    /// The API answered 404.
    #[error("unexpected status 404 (404 Not Found): {0}")]
    NotFound(String),

    /// The API answered with a non-success status and an error envelope.
    #[error("unexpected status {status} with error: {code}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// ARM error code, e.g. `ResourceGroupNotFound`.
        code: String,
        /// ARM error message.
        message: String,
    },

    /// A long-running operation reached a terminal non-success state.
    #[error("polling after {operation}: operation {status}: {code}: {message}")]
    OperationFailed {
        /// The operation that started the poll, e.g. `CreateOrUpdate`.
        operation: String,
        /// The terminal status, `Failed` or `Canceled`.
        status: String,
        /// ARM error code.
        code: String,
        /// ARM error message.
        message: String,
    },

    /// The HTTP request itself failed.
    #[error("sending request: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("decoding response: {0}")]
    Decode(#[from] serde_json::Error),

    /// No access token could be obtained.
    #[error("obtaining access token: {0}")]
    Authentication(String),

    /// A request URL could not be built.
    #[error("building request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ArmError {
    /// Whether the API reported the target as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// The HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<ArmError> for ProviderError {
    fn from(err: ArmError) -> Self {
        let msg = err.to_string();
        match err {
            ArmError::NotFound(_) => ProviderError::NotFound(msg),
            ArmError::Api { status, .. } => match status {
                400 => ProviderError::InvalidRequest(msg),
                401 | 403 => ProviderError::PermissionDenied(msg),
                404 => ProviderError::NotFound(msg),
                409 => ProviderError::AlreadyExists(msg),
                429 => ProviderError::ResourceExhausted(msg),
                500..=599 => ProviderError::Unavailable(msg),
                _ => ProviderError::Sdk(msg),
            },
            ArmError::OperationFailed { .. } => ProviderError::Sdk(msg),
            ArmError::Http(ref e) if e.is_timeout() => ProviderError::DeadlineExceeded(msg),
            ArmError::Http(ref e) if e.is_connect() => ProviderError::Unavailable(msg),
            ArmError::Http(_) => ProviderError::Sdk(msg),
            ArmError::Decode(e) => ProviderError::Serialization(e),
            ArmError::Authentication(_) => ProviderError::PermissionDenied(msg),
            ArmError::InvalidUrl(_) => ProviderError::Configuration(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::NotFound("resource-123".to_string());
        assert_eq!(format!("{}", err), "Resource not found: resource-123");

        let err = ProviderError::Validation("invalid input".to_string());
        assert_eq!(format!("{}", err), "Validation error: invalid input");

        let err = ProviderError::UnknownResource("azurerm_unknown".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: azurerm_unknown");
    }

    #[test]
    fn test_error_to_status() {
        let err = ProviderError::NotFound("test".to_string());
        let status: tonic::Status = err.into();
        assert_eq!(status.code(), tonic::Code::NotFound);

        let err = ProviderError::Validation("test".to_string());
        let status: tonic::Status = err.into();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        let err = ProviderError::Configuration("test".to_string());
        let status: tonic::Status = err.into();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);

        let err = ProviderError::AlreadyExists("test".to_string());
        let status: tonic::Status = err.into();
        assert_eq!(status.code(), tonic::Code::AlreadyExists);

        let err = ProviderError::DeadlineExceeded("test".to_string());
        let status: tonic::Status = err.into();
        assert_eq!(status.code(), tonic::Code::DeadlineExceeded);
    }

    #[test]
    fn test_requires_import_message() {
        let id = "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.ConnectedVMwarevSphere/clusters/c1";
        let err = ProviderError::requires_import(id);
        assert!(matches!(err, ProviderError::AlreadyExists(_)));
        assert_eq!(
            err.message(),
            format!(
                "A resource with the ID \"{id}\" already exists - to be managed via Terraform \
                 this resource needs to be imported into the State."
            )
        );
    }

    #[test]
    fn test_context_keeps_variant() {
        let err = ProviderError::NotFound("gone".to_string()).context("retrieving thing");
        assert!(matches!(err, ProviderError::NotFound(_)));
        assert_eq!(err.message(), "retrieving thing: gone");

        let decode = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = ProviderError::from(decode).context("decoding");
        assert!(matches!(err, ProviderError::Sdk(_)));
        assert!(err.message().starts_with("decoding: "));
    }

    #[test]
    fn test_result_ext_context() {
        let res: Result<(), ArmError> = Err(ArmError::Api {
            status: 500,
            code: "InternalServerError".to_string(),
            message: "boom".to_string(),
        });
        let err = res.context("creating id-1").unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
        assert!(err.message().starts_with("creating id-1: unexpected status 500"));
    }

    #[test]
    fn test_arm_status_mapping() {
        let api = |status: u16| ArmError::Api {
            status,
            code: "Code".to_string(),
            message: "msg".to_string(),
        };

        assert!(matches!(ProviderError::from(api(400)), ProviderError::InvalidRequest(_)));
        assert!(matches!(ProviderError::from(api(401)), ProviderError::PermissionDenied(_)));
        assert!(matches!(ProviderError::from(api(403)), ProviderError::PermissionDenied(_)));
        assert!(matches!(ProviderError::from(api(409)), ProviderError::AlreadyExists(_)));
        assert!(matches!(ProviderError::from(api(429)), ProviderError::ResourceExhausted(_)));
        assert!(matches!(ProviderError::from(api(503)), ProviderError::Unavailable(_)));
        assert!(matches!(ProviderError::from(api(418)), ProviderError::Sdk(_)));
        assert!(matches!(
            ProviderError::from(ArmError::NotFound("x".to_string())),
            ProviderError::NotFound(_)
        ));
        assert!(matches!(
            ProviderError::from(ArmError::Authentication("no token".to_string())),
            ProviderError::PermissionDenied(_)
        ));
    }

    #[test]
    fn test_arm_error_helpers() {
        let err = ArmError::NotFound("missing".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));

        let err = ArmError::OperationFailed {
            operation: "CreateOrUpdate".to_string(),
            status: "Failed".to_string(),
            code: "Conflict".to_string(),
            message: "busy".to_string(),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.status(), None);
        assert_eq!(
            err.to_string(),
            "polling after CreateOrUpdate: operation Failed: Conflict: busy"
        );
    }
}
