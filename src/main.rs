// --- Generador de Horarios - Archivo principal ---

use quickplan::run_server;
use quickplan::server::{AppState, DEFAULT_BIND};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_env("QUICKPLAN_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let state = AppState::from_env()?;
    let bind = std::env::var("QUICKPLAN_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    run_server(&bind, state).await?;
    Ok(())
}
