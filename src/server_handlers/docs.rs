use actix_web::{HttpResponse, Responder};
use serde_json::json;

use crate::algorithm::pipeline::PlanOptions;
use crate::api_json::ScheduleRequest;

pub async fn help_handler() -> impl Responder {
    let example = ScheduleRequest {
        courses: vec!["ENG-103".to_string(), "MAT-143".to_string(), "BIO-151".to_string()],
        modality_preferences: Some([("ENG-103".to_string(), "LEC".to_string())].into_iter().collect()),
        availability: Some(
            [("M".to_string(), vec!["11:00 AM - 10:00 PM".to_string()])]
                .into_iter()
                .collect(),
        ),
        top: Some(10),
        options: PlanOptions::default(),
    };

    let help = json!({
        "description": "Genera y ordena horarios sin choques para una lista de cursos. POST /schedules recibe el JSON de 'post_example'; menor 'score.combined' es mejor.",
        "post_example": example,
        "errors": "La respuesta incluye 'errors': etapa -> mensajes (retrieve_section_info, generate_combinations, resolve_corequisites, score_combinations).",
        "metrics": "La respuesta incluye 'metrics': etapa -> {calls, total_ms}.",
        "health": "GET /health"
    });

    HttpResponse::Ok().json(help)
}

pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "ok"}))
}
