// contract-audit-rs/src/main.rs
// Contract Audit - HTTP entry point
// Port 3000 by default (CONTRACT_AUDIT_SERVICE_PORT / CONTRACT_AUDIT_SERVICE_ADDR)

use std::sync::Arc;

use contract_audit::settings::ServiceSettings;
use contract_audit::AuditService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = ServiceSettings::from_env()?;

    tracing::info!("Using Contract Audit address: {}", settings.bind_addr);
    tracing::info!("Using model: {}", settings.gemini.model);
    if !settings.gemini.has_credential() {
        tracing::warn!("GEMINI_API_KEY is not set; model operations will return configuration errors");
    }

    let service = Arc::new(AuditService::from_config(&settings.gemini)?);
    let app = service.create_router();

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("Contract Audit listening on {}", settings.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
