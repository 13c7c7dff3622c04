use hemmer_provider_azurerm::{init_logging, serve, AzureProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Azure provider");
    serve(AzureProvider::new()).await
}
