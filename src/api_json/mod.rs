use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::algorithm::pipeline::{plan_schedules, PlanOptions, ScheduleRun};
use crate::algorithm::scoring::Score;
use crate::catalog::SectionLookup;
use crate::config::Config;
use crate::errors::ErrorLedger;
use crate::metrics::RunMetrics;
use crate::models::Section;

/// Cuerpo de `POST /schedules`.
///
/// - `courses`: códigos de curso a combinar (requerido, no vacío)
/// - `modality_preferences`: curso -> método preferido; reemplaza el de la config
/// - `availability`: día -> ["HH:MM AM - HH:MM PM"]; reemplaza el de la config
/// - `top`: cuántos horarios devolver (todos si falta)
/// - `options`: agrupación y orden de candidatos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
	pub courses: Vec<String>,
	#[serde(default)]
	pub modality_preferences: Option<HashMap<String, String>>,
	#[serde(default)]
	pub availability: Option<HashMap<String, Vec<String>>>,
	#[serde(default)]
	pub top: Option<usize>,
	#[serde(default)]
	pub options: PlanOptions,
}

impl ScheduleRequest {
	pub fn validate(&self) -> Result<(), String> {
		if self.courses.iter().all(|c| c.trim().is_empty()) {
			return Err("courses must contain at least one course code".to_string());
		}
		if self.top == Some(0) {
			return Err("top must be greater than zero".to_string());
		}
		Ok(())
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntry {
	pub rank: usize,
	pub sections: Vec<Section>,
	pub score: Score,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResponse {
	/// Total de horarios puntuados (antes de aplicar `top`).
	pub count: usize,
	pub schedules: Vec<ScheduleEntry>,
	pub errors: ErrorLedger,
	/// etapa -> {calls, total_ms}
	pub metrics: RunMetrics,
}

pub fn parse_json_input(json_str: &str) -> Result<ScheduleRequest, serde_json::Error> {
	serde_json::from_str::<ScheduleRequest>(json_str)
}

/// Arma la respuesta a partir de una corrida; el rank parte en 1.
pub fn build_response(run: ScheduleRun, top: Option<usize>) -> ScheduleResponse {
	let count = run.ranking.len();
	let limit = top.unwrap_or(count);
	let schedules = run
		.ranking
		.entries
		.into_iter()
		.take(limit)
		.enumerate()
		.map(|(i, scored)| ScheduleEntry {
			rank: i + 1,
			sections: scored.combination.sections,
			score: scored.score,
		})
		.collect();
	ScheduleResponse {
		count,
		schedules,
		errors: run.ledger,
		metrics: run.metrics,
	}
}

/// Corre una petición completa contra un catálogo: aplica las preferencias del
/// estudiante sobre la config base y ejecuta el pipeline.
pub fn solve_request<L: SectionLookup>(
	request: ScheduleRequest,
	lookup: L,
	base_config: &Config,
) -> Result<ScheduleResponse, String> {
	request.validate()?;
	let config = base_config
		.clone()
		.with_student_preferences(request.modality_preferences, request.availability);
	let run = plan_schedules(&request.courses, lookup, &config, request.options);
	Ok(build_response(run, request.top))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_minimal_request() {
		let req = parse_json_input(r#"{"courses": ["ENG-103", "MAT-143"]}"#).expect("Debe parsear");
		assert_eq!(req.courses, vec!["ENG-103", "MAT-143"]);
		assert!(req.top.is_none());
		assert!(req.options.group_sections);
		assert!(req.options.sort_by_enrollment);
		assert!(!req.options.sort_by_variance);
	}

	#[test]
	fn test_parse_full_request() {
		let json_data = r#"
		{
			"courses": ["ENG-103"],
			"modality_preferences": {"ENG-103": "ONLIN"},
			"availability": {"M": ["11:00 AM - 10:00 PM"]},
			"top": 5,
			"options": {"group_sections": false, "sort_by_variance": true}
		}
		"#;
		let req = parse_json_input(json_data).expect("Debe parsear");
		assert_eq!(req.top, Some(5));
		assert!(!req.options.group_sections);
		// no se envió: queda el default
		assert!(req.options.sort_by_enrollment);
		assert!(req.options.sort_by_variance);
		assert_eq!(req.modality_preferences.unwrap()["ENG-103"], "ONLIN");
	}

	#[test]
	fn test_validate() {
		let req = parse_json_input(r#"{"courses": [" "]}"#).unwrap();
		assert!(req.validate().is_err());
		let req = parse_json_input(r#"{"courses": ["ENG-103"], "top": 0}"#).unwrap();
		assert!(req.validate().is_err());
		assert!(parse_json_input(r#"{"top": 3}"#).is_err());
	}
}
