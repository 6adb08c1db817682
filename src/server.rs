use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::server_handlers::{health_handler, help_handler, schedules_handler};

pub const DEFAULT_CONFIG_PATH: &str = "config/scoring.json";
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Estado compartido (sólo lectura) entre workers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Base SQLite con la tabla `schedule`; sin ella `/schedules` responde 503.
    pub db_path: Option<PathBuf>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Lee `QUICKPLAN_DB` y `QUICKPLAN_CONFIG` del entorno (ya cargado con dotenv).
    pub fn from_env() -> Result<AppState, Box<dyn Error>> {
        let config_path = env::var("QUICKPLAN_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let config = Config::load(&config_path)?;
        let db_path = env::var("QUICKPLAN_DB").ok().filter(|p| !p.trim().is_empty()).map(PathBuf::from);
        if db_path.is_none() {
            tracing::warn!("QUICKPLAN_DB no está definido; /schedules no tendrá catálogo");
        }
        tracing::info!(config = %config_path, db = ?db_path, "estado del servidor cargado");
        Ok(AppState { db_path, config: Arc::new(config) })
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/schedules", web::post().to(schedules_handler))
        .route("/health", web::get().to(health_handler))
        .route("/help", web::get().to(help_handler));
}

pub async fn run_server(bind_addr: &str, state: AppState) -> std::io::Result<()> {
    let data = web::Data::new(state);
    tracing::info!("escuchando en http://{}", bind_addr);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Cors::permissive())
            .configure(routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
