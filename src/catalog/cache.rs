//! Caché simple en memoria para búsquedas de secciones por curso.
//!
//! A diferencia de un caché global, vive dentro de una corrida: cada pipeline
//! crea el suyo y lo descarta al terminar.

use std::collections::HashMap;

use super::SectionLookup;
use crate::errors::CatalogError;
use crate::models::Section;

/// Envuelve un `SectionLookup` y memoiza el resultado por código de curso.
/// Los errores no se guardan: un fallo se vuelve a consultar.
#[derive(Debug)]
pub struct CachedLookup<L> {
    inner: L,
    courses: HashMap<String, Vec<Section>>,
    hits: usize,
    misses: usize,
}

impl<L: SectionLookup> CachedLookup<L> {
    pub fn new(inner: L) -> Self {
        CachedLookup {
            inner,
            courses: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// (hits, misses, entradas)
    pub fn stats(&self) -> (usize, usize, usize) {
        (self.hits, self.misses, self.courses.len())
    }

    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L: SectionLookup> SectionLookup for CachedLookup<L> {
    fn lookup(&mut self, course_code: &str) -> Result<Vec<Section>, CatalogError> {
        let key = course_code.trim().to_uppercase();
        if let Some(existing) = self.courses.get(&key) {
            self.hits += 1;
            return Ok(existing.clone());
        }
        self.misses += 1;
        let sections = self.inner.lookup(course_code)?;
        tracing::debug!(course = %key, secciones = sections.len(), "curso cargado desde el catálogo");
        self.courses.insert(key, sections.clone());
        Ok(sections)
    }
}
