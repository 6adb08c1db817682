// Agrupación de secciones equivalentes y orden de candidatos antes de generar.
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{expand_id, Section, TermDuration, GROUP_SEPARATOR};

/// Todo lo que hace a dos secciones del mismo curso intercambiables en un horario.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    course: String,
    start_time: String,
    end_time: String,
    start_date: String,
    end_date: String,
    days: String,
    duration: TermDuration,
    method: String,
    location: String,
}

fn norm(v: &Option<String>) -> String {
    v.as_deref()
        .unwrap_or_default()
        .split_whitespace()
        .collect::<String>()
        .to_uppercase()
}

impl GroupKey {
    fn of(s: &Section) -> GroupKey {
        GroupKey {
            course: s.course_code.trim().to_uppercase(),
            start_time: norm(&s.start_time),
            end_time: norm(&s.end_time),
            start_date: norm(&s.start_date),
            end_date: norm(&s.end_date),
            days: norm(&s.meeting_days),
            duration: s.duration,
            method: s.method.trim().to_uppercase(),
            location: norm(&s.location),
        }
    }
}

/// Fusiona secciones equivalentes de un mismo curso en una sección sintética
/// cuyo nombre es la lista de miembros ("ENG-103-101, ENG-103-102"). El resto
/// de atributos sale del primer miembro. Las secciones con correquisitos no se
/// agrupan. El orden de salida es el de primera aparición.
pub fn group_sections(sections: Vec<Section>) -> Vec<Section> {
    let mut out: Vec<Section> = Vec::new();
    let mut members: Vec<Vec<String>> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for s in sections {
        if s.has_coreqs() {
            members.push(vec![s.name.clone()]);
            out.push(s);
            continue;
        }
        let key = GroupKey::of(&s);
        match index.get(&key) {
            Some(&pos) => members[pos].extend(s.member_ids()),
            None => {
                index.insert(key, out.len());
                members.push(s.member_ids());
                out.push(s);
            }
        }
    }

    for (s, ids) in out.iter_mut().zip(members) {
        if ids.len() > 1 {
            s.name = ids.join(GROUP_SEPARATOR);
        }
    }
    out
}

/// Inverso de la agrupación: identificadores de los miembros de un grupo.
pub fn expand_group_id(id: &str) -> Vec<String> {
    expand_id(id)
}

fn fill_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ordena las secciones de un curso por ocupación ascendente (estable).
/// Empuja levemente a la generación hacia secciones menos llenas.
pub fn sort_sections_by_enrollment(sections: &mut [Section]) {
    sections.sort_by(|a, b| {
        a.course_code
            .cmp(&b.course_code)
            .then_with(|| fill_order(a.fraction_full, b.fraction_full))
    });
}

/// Varianza muestral de la ocupación de las secciones (0 con menos de dos datos).
pub fn fill_variance(sections: &[Section]) -> f64 {
    let vals: Vec<f64> = sections.iter().filter_map(|s| s.fraction_full).collect();
    if vals.len() < 2 {
        return 0.0;
    }
    let n = vals.len() as f64;
    let mean = vals.iter().sum::<f64>() / n;
    vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
}

/// Reordena cursos completos por varianza de ocupación, de mayor a menor.
pub fn sort_courses_by_variance(courses: &mut [(String, Vec<Section>)]) {
    courses.sort_by(|a, b| fill_variance(&b.1).total_cmp(&fill_variance(&a.1)));
}
