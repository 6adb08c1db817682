// Biblioteca raíz del crate `quickplan`.
// Generación de horarios sin choques a partir de un catálogo de secciones,
// con puntaje multi-criterio y ranking. `server` expone el pipeline por HTTP.
pub mod models;
pub mod errors;
pub mod metrics;
pub mod config;
pub mod catalog;
pub mod algorithm;
pub mod api_json;
pub mod server;
pub mod server_handlers;

/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;
pub use algorithm::pipeline::{plan_schedules, PlanOptions, ScheduleRun};
