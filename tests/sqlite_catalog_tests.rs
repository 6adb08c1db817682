use rusqlite::{params, Connection};

use quickplan::algorithm::pipeline::{plan_schedules, PlanOptions};
use quickplan::catalog::{CachedLookup, SectionLookup, SqliteCatalog};
use quickplan::config::Config;
use quickplan::models::TermDuration;

const SCHEMA: &str = "
    CREATE TABLE schedule (
        Course_Name TEXT, Name TEXT, STime TEXT, ETime TEXT, SDate TEXT, EDate TEXT,
        Mtg_Days TEXT, Method TEXT, Location TEXT, Building TEXT, Credits REAL,
        Fraction_Full REAL, Fraction_Full_Deviation REAL, Coreq_Sections TEXT,
        Restricted_section TEXT, Cohorted_section INTEGER, Duration TEXT,
        Faculty_Full_Name TEXT, Status TEXT, Avail_Seats INTEGER
    )";

#[allow(clippy::too_many_arguments)]
fn insert(
    conn: &Connection,
    course: &str,
    name: &str,
    start: Option<&str>,
    days: &str,
    fill: f64,
    coreqs: Option<&str>,
    status: &str,
    seats: i64,
) {
    let end = start.map(|_| "09:15 AM");
    conn.execute(
        "INSERT INTO schedule VALUES (?1, ?2, ?3, ?4, '2024-01-08 00:00:00', '2024-05-10 00:00:00',
                ?5, 'LEC', 'MAIN', 'B1', 3, ?6, NULL, ?7, NULL, 0, 'Full Semester', 'Dr. Smith', ?8, ?9)",
        params![course, name, start, end, days, fill, coreqs, status, seats],
    )
    .unwrap();
}

fn seeded() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute(SCHEMA, []).unwrap();
    insert(&conn, "ENG-103", "ENG-103-101", Some("08:00 AM"), "M, W", 0.25, None, "A", 5);
    insert(&conn, "ENG-103", "ENG-103-102", Some("08:00 AM"), "T, TH", 0.75, None, "A", 2);
    insert(&conn, "ENG-103", "ENG-103-103", Some("08:00 AM"), "F", 0.5, None, "A", 0);
    insert(&conn, "ENG-103", "ENG-103-104", Some("08:00 AM"), "F", 0.5, None, "C", 9);
    insert(&conn, "BIO-151", "BIO-151-101", Some("08:00 AM"), "F", 0.5, Some("BIO-151-L01, BIO-151-L02"), "A", 3);
    insert(&conn, "BIO-151", "BIO-151-L01", None, "", 0.5, None, "A", 3);
    conn
}

#[test]
fn test_only_open_sections_with_seats_are_returned() {
    let mut cat = SqliteCatalog::from_connection(seeded());
    let sections = cat.lookup("ENG-103").unwrap();
    let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["ENG-103-101", "ENG-103-102"]);

    let s = &sections[0];
    assert_eq!(s.start_time.as_deref(), Some("08:00 AM"));
    assert_eq!(s.meeting_days.as_deref(), Some("M, W"));
    assert_eq!(s.credits, Some(3.0));
    assert_eq!(s.duration, TermDuration::FullTerm);
    assert_eq!(s.faculty.as_deref(), Some("Dr. Smith"));
    assert!(!s.cohorted);
}

#[test]
fn test_fill_deviation_is_computed_against_median() {
    let mut cat = SqliteCatalog::from_connection(seeded());
    let sections = cat.lookup("ENG-103").unwrap();
    // mediana de [0.25, 0.75] = 0.5
    assert_eq!(sections[0].fraction_full_deviation, Some(-0.25));
    assert_eq!(sections[1].fraction_full_deviation, Some(0.25));
}

#[test]
fn test_coreqs_and_async_rows() {
    let mut cat = SqliteCatalog::from_connection(seeded());
    let sections = cat.lookup(" BIO-151 ").unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].coreq_sections, vec!["BIO-151-L01", "BIO-151-L02"]);
    assert!(sections[1].is_async());
    assert!(sections[1].coreq_sections.is_empty());
}

#[test]
fn test_unknown_course_is_empty() {
    let mut cat = SqliteCatalog::from_connection(seeded());
    assert!(cat.lookup("XYZ-999").unwrap().is_empty());
}

#[test]
fn test_missing_table_is_a_query_error() {
    let mut cat = SqliteCatalog::from_connection(Connection::open_in_memory().unwrap());
    let err = cat.lookup("ENG-103").unwrap_err();
    assert!(err.to_string().contains("ENG-103"));
}

#[test]
fn test_cached_lookup_counts_hits() {
    let mut cat = CachedLookup::new(SqliteCatalog::from_connection(seeded()));
    cat.lookup("ENG-103").unwrap();
    cat.lookup("eng-103").unwrap();
    cat.lookup("BIO-151").unwrap();
    assert_eq!(cat.stats(), (1, 2, 2));
}

#[test]
fn test_pipeline_over_sqlite() {
    let cfg = Config::load("config/scoring.json").unwrap();
    let courses = vec!["ENG-103".to_string(), "BIO-151".to_string()];
    let run = plan_schedules(&courses, SqliteCatalog::from_connection(seeded()), &cfg, PlanOptions::default());
    // BIO-151-L02 no existe: la rama con L01 (asíncrona) sobrevive
    assert!(run.ledger.is_empty(), "ledger: {:?}", run.ledger);
    assert!(!run.ranking.is_empty());
    for entry in &run.ranking.entries {
        if entry.combination.contains_id("BIO-151-101") {
            assert!(entry.combination.contains_id("BIO-151-L01"));
        }
    }
}
