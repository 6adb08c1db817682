//! Generador de combinaciones: producto cartesiano entre cursos, poda por
//! conflictos y expansión de correquisitos.
//!
//! Pasos por cada tupla base (una sección por curso):
//! 1. se descarta si tiene un conflicto interno (filtro barato, va primero);
//! 2. se resuelven correquisitos con una cola FIFO de combinaciones
//!    provisorias. Cada provisoria lleva su propio `ResolutionContext` con los
//!    identificadores ya incluidos y los correquisitos ya procesados;
//! 3. las provisorias que terminan de recorrer sus miembros son el resultado.
//!
//! El orden de salida es determinista: orden del producto y, dentro de una
//! tupla, orden de la cola.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::algorithm::conflict::ConflictDetector;
use crate::catalog::SectionLookup;
use crate::errors::{ErrorLedger, ScheduleError, STAGE_COREQS, STAGE_GENERATE};
use crate::models::{course_of, normalize_id, Combination, Section};

/// Resultado de la etapa de generación.
#[derive(Debug, Default)]
pub struct Generated {
    pub combinations: Vec<Combination>,
    pub ledger: ErrorLedger,
    /// Tuplas del producto cartesiano revisadas.
    pub base_tuples: usize,
    /// Tuplas descartadas por conflicto antes de mirar correquisitos.
    pub pruned: usize,
}

/// Qué identificadores ya están en la combinación y qué correquisitos ya se procesaron.
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    pub included: HashSet<String>,
    pub processed: HashSet<String>,
}

impl ResolutionContext {
    fn for_sections(sections: &[Section]) -> Self {
        let included = sections
            .iter()
            .flat_map(|s| s.member_ids())
            .map(|id| normalize_id(&id))
            .collect();
        ResolutionContext {
            included,
            processed: HashSet::new(),
        }
    }

    fn is_pending(&self, coreq: &str) -> bool {
        !self.included.contains(coreq) && !self.processed.contains(coreq)
    }
}

#[derive(Debug, Clone)]
struct Provisional {
    sections: Vec<Section>,
    ctx: ResolutionContext,
    /// Próximo miembro cuyos correquisitos hay que revisar.
    cursor: usize,
}

/// Busca secciones correquisito a través del colaborador, con caché por identificador.
pub struct CoreqResolver<'a> {
    lookup: &'a mut dyn SectionLookup,
    cache: HashMap<String, Option<Section>>,
}

impl<'a> CoreqResolver<'a> {
    pub fn new(lookup: &'a mut dyn SectionLookup) -> Self {
        CoreqResolver {
            lookup,
            cache: HashMap::new(),
        }
    }

    /// Sección cuyo identificador es `coreq` (normalizado), o `None` si el
    /// curso no la ofrece abierta.
    pub fn resolve(&mut self, coreq: &str) -> Result<Option<Section>, ScheduleError> {
        if let Some(hit) = self.cache.get(coreq) {
            return Ok(hit.clone());
        }
        let course = course_of(coreq);
        let sections = self
            .lookup
            .lookup(&course)
            .map_err(|e| ScheduleError::Corequisite {
                coreq: coreq.to_string(),
                reason: e.to_string(),
            })?;
        let found = sections
            .into_iter()
            .find(|s| s.member_ids().iter().any(|m| normalize_id(m) == coreq));
        self.cache.insert(coreq.to_string(), found.clone());
        Ok(found)
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

/// Índices del producto cartesiano, el último curso varía más rápido.
struct ProductIndices {
    sizes: Vec<usize>,
    current: Option<Vec<usize>>,
}

impl ProductIndices {
    fn new(sizes: Vec<usize>) -> Self {
        let current = if sizes.is_empty() || sizes.contains(&0) {
            None
        } else {
            Some(vec![0; sizes.len()])
        };
        ProductIndices { sizes, current }
    }
}

impl Iterator for ProductIndices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let out = self.current.clone()?;
        let mut idx = self.current.take()?;
        let mut pos = idx.len();
        while pos > 0 {
            pos -= 1;
            idx[pos] += 1;
            if idx[pos] < self.sizes[pos] {
                self.current = Some(idx);
                return Some(out);
            }
            idx[pos] = 0;
        }
        // se agotó el producto; `current` queda en None
        Some(out)
    }
}

/// Genera todas las combinaciones válidas para los candidatos por curso.
///
/// `candidates[i]` son las secciones (posiblemente agrupadas) del curso i.
/// Una lista vacía de cursos, o un curso sin candidatos, da un resultado vacío.
pub fn generate_combinations(
    candidates: &[Vec<Section>],
    lookup: &mut dyn SectionLookup,
) -> Generated {
    let mut out = Generated::default();
    let mut detector = ConflictDetector::new();
    let mut resolver = CoreqResolver::new(lookup);

    let sizes: Vec<usize> = candidates.iter().map(|c| c.len()).collect();
    for indices in ProductIndices::new(sizes) {
        out.base_tuples += 1;
        let base: Vec<Section> = indices
            .iter()
            .enumerate()
            .map(|(course, &i)| candidates[course][i].clone())
            .collect();

        match detector.has_conflict(&base) {
            Ok(false) => {}
            Ok(true) => {
                out.pruned += 1;
                continue;
            }
            Err(e) => {
                out.pruned += 1;
                let names: Vec<&str> = base.iter().map(|s| s.name.as_str()).collect();
                out.ledger.record(
                    STAGE_GENERATE,
                    format!("{} in combination [{}]", e, names.join(" | ")),
                );
                continue;
            }
        }

        let expanded = expand_corequisites(base, &mut resolver, &mut detector, &mut out.ledger);
        out.combinations.extend(expanded);
    }

    tracing::info!(
        tuplas = out.base_tuples,
        podadas = out.pruned,
        validas = out.combinations.len(),
        correquisitos_en_cache = resolver.cached(),
        "generación de combinaciones terminada"
    );
    out
}

/// Expande una tupla base sin conflictos con sus correquisitos.
///
/// Si un miembro declara correquisitos pendientes y ninguno entra (no existe,
/// falla la búsqueda o choca), esa provisoria se descarta; si era la única,
/// la tupla base completa queda fuera.
pub fn expand_corequisites(
    base: Vec<Section>,
    resolver: &mut CoreqResolver<'_>,
    detector: &mut ConflictDetector,
    ledger: &mut ErrorLedger,
) -> Vec<Combination> {
    let ctx = ResolutionContext::for_sections(&base);
    let mut queue: VecDeque<Provisional> = VecDeque::new();
    queue.push_back(Provisional {
        sections: base,
        ctx,
        cursor: 0,
    });
    let mut done: Vec<Combination> = Vec::new();

    while let Some(mut prov) = queue.pop_front() {
        if prov.cursor >= prov.sections.len() {
            done.push(Combination::new(prov.sections));
            continue;
        }

        let (owner, pending) = {
            let section = &prov.sections[prov.cursor];
            let declared: Vec<String> = section
                .coreq_sections
                .iter()
                .map(|c| normalize_id(c))
                .filter(|c| !c.is_empty())
                .collect();
            let mut pending: Vec<String> = Vec::new();
            // los correquisitos son alternativas: con uno presente basta
            if !declared.iter().any(|c| prov.ctx.included.contains(c)) {
                for c in declared {
                    if prov.ctx.is_pending(&c) && !pending.contains(&c) {
                        pending.push(c);
                    }
                }
            }
            (section.name.clone(), pending)
        };

        if pending.is_empty() {
            prov.cursor += 1;
            queue.push_back(prov);
            continue;
        }

        let mut branches = 0usize;
        for coreq in pending {
            let candidate = match resolver.resolve(&coreq) {
                Ok(Some(c)) => c,
                Ok(None) => {
                    tracing::debug!(%coreq, section = %owner, "correquisito no disponible");
                    continue;
                }
                Err(e) => {
                    ledger.record(STAGE_COREQS, format!("{} in section {}", e, owner));
                    continue;
                }
            };

            match detector.conflicts_with(&prov.sections, &candidate) {
                Ok(false) => {}
                Ok(true) => {
                    tracing::debug!(%coreq, section = %owner, "correquisito en conflicto");
                    continue;
                }
                Err(e) => {
                    ledger.record(STAGE_COREQS, format!("{} in section {}", e, owner));
                    continue;
                }
            }

            let mut next = Provisional {
                sections: prov.sections.clone(),
                ctx: prov.ctx.clone(),
                cursor: prov.cursor + 1,
            };
            next.ctx
                .included
                .extend(candidate.member_ids().iter().map(|id| normalize_id(id)));
            next.ctx.processed.insert(coreq);
            next.sections.push(candidate);
            queue.push_back(next);
            branches += 1;
        }

        if branches == 0 {
            tracing::debug!(section = %owner, "correquisitos insatisfechos; se descarta la rama");
        }
    }

    done
}
