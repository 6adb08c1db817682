use quickplan::algorithm::conflict::{parse_clock_range, parsed_conflict, ConflictDetector, ParsedSection};
use quickplan::errors::ScheduleError;
use quickplan::models::Section;

fn sec(name: &str, start: &str, end: &str, days: &str) -> Section {
    Section {
        course_code: quickplan::models::course_of(name),
        name: name.to_string(),
        start_time: Some(start.to_string()),
        end_time: Some(end.to_string()),
        start_date: Some("2024-01-08 00:00:00".to_string()),
        end_date: Some("2024-05-10 00:00:00".to_string()),
        meeting_days: Some(days.to_string()),
        method: "LEC".to_string(),
        ..Default::default()
    }
}

#[test]
fn test_separated_classes_do_not_conflict() {
    let mut det = ConflictDetector::new();
    let a = sec("ENG-103-101", "08:00 AM", "09:00 AM", "M, W");
    let b = sec("MAT-143-101", "10:00 AM", "11:00 AM", "M, W");
    assert_eq!(det.pair_conflicts(&a, &b), Ok(false));
}

#[test]
fn test_overlapping_classes_conflict() {
    let mut det = ConflictDetector::new();
    let a = sec("ENG-103-101", "08:00 AM", "09:00 AM", "M");
    let b = sec("MAT-143-101", "08:30 AM", "09:30 AM", "M");
    assert_eq!(det.pair_conflicts(&a, &b), Ok(true));
    assert_eq!(det.pair_conflicts(&b, &a), Ok(true));
}

#[test]
fn test_touching_boundaries_do_not_conflict() {
    let mut det = ConflictDetector::new();
    let a = sec("ENG-103-101", "08:00 AM", "09:00 AM", "T, TH");
    let b = sec("MAT-143-101", "09:00 AM", "10:00 AM", "TH");
    assert_eq!(det.pair_conflicts(&a, &b), Ok(false));
}

#[test]
fn test_different_days_or_dates_do_not_conflict() {
    let mut det = ConflictDetector::new();
    let a = sec("ENG-103-101", "08:00 AM", "09:00 AM", "M, W");
    let b = sec("MAT-143-101", "08:00 AM", "09:00 AM", "T, TH");
    assert_eq!(det.pair_conflicts(&a, &b), Ok(false));

    // primera mitad vs segunda mitad del término
    let mut c = sec("BIO-151-101", "08:00 AM", "09:00 AM", "M");
    c.start_date = Some("2024-01-08".to_string());
    c.end_date = Some("2024-03-01".to_string());
    let mut d = sec("CHM-121-101", "08:00 AM", "09:00 AM", "M");
    d.start_date = Some("2024-03-04".to_string());
    d.end_date = Some("2024-05-10".to_string());
    assert_eq!(det.pair_conflicts(&c, &d), Ok(false));
}

#[test]
fn test_async_section_never_conflicts() {
    let mut det = ConflictDetector::new();
    let mut online = sec("PSY-150-W01", "", "", "M, T, W, TH, F");
    online.start_time = None;
    online.end_time = Some(String::new());
    online.method = "ONLIN".to_string();
    let a = sec("ENG-103-101", "08:00 AM", "09:00 AM", "M, T, W, TH, F");
    assert!(online.is_async());
    assert_eq!(det.pair_conflicts(&online, &a), Ok(false));
    assert_eq!(det.has_conflict(&[online.clone(), a.clone(), online]), Ok(false));
}

#[test]
fn test_missing_dates_are_unbounded() {
    let mut det = ConflictDetector::new();
    let mut a = sec("ENG-103-101", "08:00 AM", "09:00 AM", "M");
    a.start_date = None;
    a.end_date = None;
    let b = sec("MAT-143-101", "08:30 AM", "09:30 AM", "M");
    assert_eq!(det.pair_conflicts(&a, &b), Ok(true));
}

#[test]
fn test_has_conflict_over_combination() {
    let mut det = ConflictDetector::new();
    let ok = vec![
        sec("ENG-103-101", "08:00 AM", "09:00 AM", "M, W"),
        sec("MAT-143-101", "09:15 AM", "10:15 AM", "M, W"),
        sec("BIO-151-101", "08:00 AM", "11:00 AM", "F"),
    ];
    assert_eq!(det.has_conflict(&ok), Ok(false));

    let mut bad = ok.clone();
    bad.push(sec("HIS-101-101", "10:00 AM", "11:00 AM", "W"));
    assert_eq!(det.has_conflict(&bad), Ok(true));
    // cada sección se parsea una sola vez
    assert_eq!(det.cached_len(), 4);
}

#[test]
fn test_malformed_time_is_an_error() {
    let mut det = ConflictDetector::new();
    let a = sec("ENG-103-101", "8 o'clock", "09:00 AM", "M");
    let b = sec("MAT-143-101", "10:00 AM", "11:00 AM", "M");
    match det.pair_conflicts(&a, &b) {
        Err(ScheduleError::Parse { section, field, .. }) => {
            assert_eq!(section, "ENG-103-101");
            assert_eq!(field, "start time");
        }
        other => panic!("se esperaba error de parseo, llegó {:?}", other),
    }

    let c = sec("CHM-121-101", "10:00 AM", "11:00 AM", "M, XX");
    assert!(ParsedSection::parse(&c).is_err());
}

#[test]
fn test_parsed_conflict_is_symmetric() {
    let a = ParsedSection::parse(&sec("ENG-103-101", "1:00 PM", "2:15 PM", "T")).unwrap();
    let b = ParsedSection::parse(&sec("MAT-143-101", "2:00 PM", "3:00 PM", "T")).unwrap();
    assert!(parsed_conflict(&a, &b));
    assert!(parsed_conflict(&b, &a));
    assert_eq!(parse_clock_range("11:00 AM - 10:00 PM"), Some((660, 1320)));
}

fn dated(mut s: Section, from: &str, to: &str) -> Section {
    s.start_date = Some(format!("{} 00:00:00", from));
    s.end_date = Some(format!("{} 00:00:00", to));
    s
}

#[test]
fn test_scan_reaches_overlap_past_disjoint_range() {
    let mut det = ConflictDetector::new();
    let a = dated(sec("ENG-103-101", "08:00 AM", "09:00 AM", "M"), "2024-01-08", "2024-05-10");
    let b = dated(sec("HIS-101-101", "08:00 AM", "09:00 AM", "W"), "2024-02-01", "2024-03-01");
    let c = dated(sec("MAT-143-101", "08:30 AM", "09:30 AM", "M"), "2024-04-01", "2024-05-10");

    // B y C no comparten fechas; A abarca ambas
    assert_eq!(det.pair_conflicts(&b, &c), Ok(false));
    assert_eq!(det.has_conflict(&[c.clone(), b.clone(), a.clone()]), Ok(true));
    assert_eq!(det.has_conflict(&[b.clone(), a.clone(), c.clone()]), Ok(true));
    assert_eq!(det.conflicts_with(&[a.clone(), b.clone()], &c), Ok(true));

    let later = dated(sec("MAT-143-102", "10:00 AM", "11:00 AM", "M"), "2024-04-01", "2024-05-10");
    assert_eq!(det.has_conflict(&[a, b, later]), Ok(false));
}

#[test]
fn test_scan_stops_only_after_range_ends() {
    let mut det = ConflictDetector::new();
    let first = dated(sec("ENG-103-101", "08:00 AM", "09:00 AM", "M"), "2024-01-08", "2024-03-01");
    let second = dated(sec("MAT-143-101", "08:00 AM", "09:00 AM", "M"), "2024-03-04", "2024-05-10");
    let tail = dated(sec("BIO-151-101", "08:30 AM", "09:30 AM", "M"), "2024-03-01", "2024-05-10");
    // `tail` empieza el mismo día que termina `first`
    assert_eq!(det.has_conflict(&[first.clone(), second.clone()]), Ok(false));
    assert_eq!(det.has_conflict(&[second, first, tail]), Ok(true));
}
