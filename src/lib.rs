//! Hemmer provider for Azure Resource Manager.
//!
//! The binary speaks the Hemmer provider protocol over gRPC and manages
//! Azure resources through the ARM REST API.
//!
//! # Services
//!
//! - **ConnectedVMware**: vCenters, vSphere clusters, datastores, hosts and
//!   resource pools, inventory items and Arc-enabled virtual machines
//! - **DevCenter**: dev box definitions
//! - **Dynatrace**: single sign-on configurations on Dynatrace monitors
//! - **HDInsight**: clusters inside HDInsight on AKS cluster pools
//! - **ServiceConnector**: App Service and Spring Cloud connection lookups
//! - **ExtendedLocation**: custom locations
//!
//! # Layout
//!
//! [`provider::AzureProvider`] implements [`ProviderService`] and routes
//! each call to a [`resources::Resource`] or [`resources::DataSource`]
//! registered by one of the service modules. Resources talk to ARM through
//! [`clients::ArmClient`], which handles authentication, retries and
//! long-running operations.
//!
//! # Handshake Protocol
//!
//! On startup [`serve`] prints one line to stdout:
//!
//! ```text
//! HEMMER_PROVIDER|1|127.0.0.1:50051
//! ```
//!
//! Format: `HEMMER_PROVIDER|<protocol_version>|<address>`. Logs go to
//! stderr so the handshake is the only thing on stdout.
//!
//! # Configuration
//!
//! The provider block (see [`config::ProviderConfig`]) accepts a
//! subscription, a cloud environment and either a bearer token or a
//! service principal secret. Unset fields fall back to the usual `ARM_*`
//! environment variables.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clients;
pub mod config;
pub mod error;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod resourceids;
pub mod resources;
pub mod schema;
pub mod server;
mod services;
pub mod types;
pub mod validation;

#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod generated;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ProviderError, ResultExt};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::AzureProvider;
pub use schema::ProviderSchema;
pub use server::{
    serve, serve_on, serve_on_with_options, serve_with_options, ProviderService, ServeOptions,
};
pub use types::{
    AttributeChange, ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities,
    HANDSHAKE_PREFIX, PROTOCOL_VERSION,
};
pub use validation::validate;
