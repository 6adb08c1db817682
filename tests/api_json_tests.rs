use quickplan::api_json::{parse_json_input, solve_request};
use quickplan::catalog::InMemoryCatalog;
use quickplan::config::Config;
use quickplan::models::{course_of, Section};

fn sec(name: &str, start: &str, end: &str, days: &str, method: &str) -> Section {
    Section {
        course_code: course_of(name),
        name: name.to_string(),
        start_time: Some(start.to_string()),
        end_time: Some(end.to_string()),
        meeting_days: Some(days.to_string()),
        method: method.to_string(),
        location: Some("MAIN".to_string()),
        ..Default::default()
    }
}

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::from_sections(vec![
        sec("ENG-103-101", "08:00 AM", "09:00 AM", "M, W", "LEC"),
        sec("ENG-103-102", "06:00 PM", "07:00 PM", "T", "HYBRD"),
        sec("MAT-143-101", "10:00 AM", "11:00 AM", "M, W", "LEC"),
        sec("MAT-143-102", "01:00 PM", "02:00 PM", "T, TH", "LEC"),
    ])
}

#[test]
fn test_solve_request_end_to_end() {
    let base = Config::load("config/scoring.json").unwrap();
    let req = parse_json_input(
        r#"{
            "courses": ["ENG-103", "MAT-143"],
            "modality_preferences": {"ENG-103": "HYBRD"},
            "top": 2
        }"#,
    )
    .unwrap();
    let resp = solve_request(req, catalog(), &base).unwrap();

    assert_eq!(resp.count, 4);
    assert_eq!(resp.schedules.len(), 2);
    assert_eq!(resp.schedules[0].rank, 1);
    assert_eq!(resp.schedules[1].rank, 2);
    assert!(resp.schedules[0].score.combined <= resp.schedules[1].score.combined);
    // la preferencia híbrida de la petición reemplaza la de la config
    assert!(resp.schedules[0].sections.iter().any(|s| s.name == "ENG-103-102"));
    assert!(resp.errors.is_empty());
}

#[test]
fn test_response_json_shape() {
    let base = Config::load("config/scoring.json").unwrap();
    let req = parse_json_input(r#"{"courses": ["ENG-103"]}"#).unwrap();
    let resp = solve_request(req, catalog(), &base).unwrap();
    let v = serde_json::to_value(&resp).unwrap();

    assert_eq!(v["count"], 2);
    assert!(v["errors"].as_object().unwrap().is_empty());
    let first = &v["schedules"][0];
    assert_eq!(first["rank"], 1);
    assert!(first["sections"].is_array());
    assert!(first["score"]["combined"].is_number());
    assert!(first["score"]["subscores"]["gaps"].is_number());
    assert!(first["score"]["subscores"]["location_change"].is_number());

    let metrics = v["metrics"].as_object().unwrap();
    for stage in ["retrieve_section_info", "generate_combinations", "score_combinations", "rank_combinations"] {
        assert!(metrics[stage]["calls"].as_u64().unwrap() >= 1, "etapa {}", stage);
        assert!(metrics[stage]["total_ms"].as_f64().unwrap() >= 0.0);
    }
}

#[test]
fn test_request_availability_override_and_errors() {
    let base = Config::load("config/scoring.json").unwrap();
    let req = parse_json_input(
        r#"{"courses": ["ENG-103", "NOPE-000"], "availability": {"M": ["bad window"]}}"#,
    )
    .unwrap();
    let resp = solve_request(req, catalog(), &base).unwrap();
    assert_eq!(resp.count, 0);
    let v = serde_json::to_value(&resp).unwrap();
    assert_eq!(v["errors"]["retrieve_section_info"][0], "no open sections for course NOPE-000");

    let req = parse_json_input(r#"{"courses": ["ENG-103"], "availability": {"M": ["bad window"]}}"#).unwrap();
    let resp = solve_request(req, catalog(), &base).unwrap();
    assert_eq!(resp.count, 0);
    assert_eq!(resp.errors.count("score_combinations"), 1);
}

#[test]
fn test_invalid_request_is_rejected() {
    let base = Config::default();
    let req = parse_json_input(r#"{"courses": []}"#).unwrap();
    assert!(solve_request(req, catalog(), &base).is_err());
}
