//! Colaborador de búsqueda de secciones.
//!
//! El núcleo sólo conoce el trait `SectionLookup`; aquí viven además los
//! adaptadores concretos (memoria, SQLite) y el caché por curso.

mod cache;
mod sqlite;

use std::collections::HashMap;

use crate::errors::CatalogError;
use crate::models::Section;

pub use cache::CachedLookup;
pub use sqlite::SqliteCatalog;

/// `lookup(course_code)` -> secciones abiertas del curso, en orden estable.
///
/// Debe ser determinista para un mismo estado del catálogo. Un curso
/// desconocido devuelve una lista vacía, no un error.
pub trait SectionLookup {
    fn lookup(&mut self, course_code: &str) -> Result<Vec<Section>, CatalogError>;
}

impl<T: SectionLookup + ?Sized> SectionLookup for &mut T {
    fn lookup(&mut self, course_code: &str) -> Result<Vec<Section>, CatalogError> {
        (**self).lookup(course_code)
    }
}

/// Catálogo en memoria, indexado por código de curso.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    by_course: HashMap<String, Vec<Section>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sections(sections: Vec<Section>) -> Self {
        let mut cat = InMemoryCatalog::new();
        for s in sections {
            cat.insert(s);
        }
        cat
    }

    pub fn insert(&mut self, section: Section) {
        let key = section.course_code.trim().to_uppercase();
        self.by_course.entry(key).or_default().push(section);
    }
}

impl SectionLookup for InMemoryCatalog {
    fn lookup(&mut self, course_code: &str) -> Result<Vec<Section>, CatalogError> {
        let key = course_code.trim().to_uppercase();
        Ok(self.by_course.get(&key).cloned().unwrap_or_default())
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Completa `fraction_full_deviation` (ocupación menos la mediana de su curso)
/// en las secciones que no la traen. Se asume que `sections` son sólo
/// secciones abiertas.
pub fn annotate_fill_deviation(sections: &mut [Section]) {
    let mut fills: HashMap<String, Vec<f64>> = HashMap::new();
    for s in sections.iter() {
        if let Some(f) = s.fraction_full {
            fills.entry(s.course_code.clone()).or_default().push(f);
        }
    }
    let medians: HashMap<String, f64> = fills
        .into_iter()
        .filter_map(|(course, mut v)| median(&mut v).map(|m| (course, m)))
        .collect();

    for s in sections.iter_mut() {
        if s.fraction_full_deviation.is_some() {
            continue;
        }
        if let (Some(f), Some(m)) = (s.fraction_full, medians.get(&s.course_code)) {
            s.fraction_full_deviation = Some(f - m);
        }
    }
}
