use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use std::sync::Arc;
use std::sync::OnceLock;
use tokio::sync::Semaphore;

use crate::api_json::{solve_request, ScheduleRequest};
use crate::catalog::SqliteCatalog;
use crate::server::AppState;

// Una corrida pesada por CPU a la vez
fn pipeline_semaphore() -> Arc<Semaphore> {
    static GLOBAL_SEM: OnceLock<Arc<Semaphore>> = OnceLock::new();
    GLOBAL_SEM
        .get_or_init(|| {
            let procs = num_cpus::get();
            Arc::new(Semaphore::new(std::cmp::max(1, procs)))
        })
        .clone()
}

/// POST /schedules
pub async fn schedules_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<serde_json::Value>,
) -> impl Responder {
    let request: ScheduleRequest = match serde_json::from_value(body.into_inner()) {
        Ok(r) => r,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": format!("failed to parse input: {}", e)})),
    };
    if let Err(e) = request.validate() {
        return HttpResponse::BadRequest().json(json!({"error": e}));
    }

    let db_path = match state.db_path.clone() {
        Some(p) => p,
        None => return HttpResponse::ServiceUnavailable().json(json!({"error": "QUICKPLAN_DB is not configured"})),
    };
    let config = state.config.clone();

    let client_ip = req.connection_info().realip_remote_addr().unwrap_or("unknown").to_string();
    let start = std::time::Instant::now();

    let permit = match pipeline_semaphore().acquire_owned().await {
        Ok(p) => p,
        Err(_) => return HttpResponse::InternalServerError().json(json!({"error": "failed to acquire semaphore"})),
    };

    let courses = request.courses.len();
    let blocking_handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        // conexión, cachés y ledger propios de esta petición
        let catalog = SqliteCatalog::open(&db_path).map_err(|e| e.to_string())?;
        solve_request(request, catalog, &config)
    });

    let result = match blocking_handle.await {
        Ok(res) => res,
        Err(e) => return HttpResponse::InternalServerError().json(json!({"error": format!("task join error: {}", e)})),
    };

    match result {
        Ok(resp) => {
            tracing::info!(
                ip = %client_ip,
                cursos = courses,
                horarios = resp.count,
                ms = start.elapsed().as_millis() as u64,
                "POST /schedules"
            );
            HttpResponse::Ok().json(resp)
        }
        Err(err_msg) => {
            tracing::error!(ip = %client_ip, error = %err_msg, "POST /schedules falló");
            HttpResponse::InternalServerError().json(json!({"error": err_msg}))
        }
    }
}
