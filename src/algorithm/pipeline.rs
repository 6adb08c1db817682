//! Corrida completa: búsqueda -> orden -> agrupación -> generación -> puntaje -> ranking.
//!
//! Cada corrida crea sus propios cachés y su propio `ErrorLedger`; nada se
//! comparte entre corridas.

use serde::{Deserialize, Serialize};

use crate::algorithm::generator::generate_combinations;
use crate::algorithm::grouping::{group_sections, sort_courses_by_variance, sort_sections_by_enrollment};
use crate::algorithm::ranker::{rank, Ranking};
use crate::algorithm::scoring::ScoringEngine;
use crate::catalog::{CachedLookup, SectionLookup};
use crate::config::Config;
use crate::errors::{ErrorLedger, STAGE_GENERATE, STAGE_LOOKUP, STAGE_RANK, STAGE_SCORING};
use crate::metrics::RunMetrics;
use crate::models::{normalize_id, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanOptions {
    pub group_sections: bool,
    pub sort_by_enrollment: bool,
    pub sort_by_variance: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        PlanOptions {
            group_sections: true,
            sort_by_enrollment: true,
            sort_by_variance: false,
        }
    }
}

/// Resultado de una corrida: ranking completo más el ledger de errores.
#[derive(Debug, Default)]
pub struct ScheduleRun {
    pub ranking: Ranking,
    pub ledger: ErrorLedger,
    /// Combinaciones válidas antes de puntuar.
    pub generated: usize,
    /// (hits, misses, entradas) del caché de cursos.
    pub lookup_stats: (usize, usize, usize),
    /// Llamadas y tiempo por etapa.
    pub metrics: RunMetrics,
}

/// Corre el pipeline con el registro estándar de sub-scores.
pub fn plan_schedules<L: SectionLookup>(
    courses: &[String],
    lookup: L,
    config: &Config,
    options: PlanOptions,
) -> ScheduleRun {
    plan_with_engine(courses, lookup, config, options, &ScoringEngine::standard())
}

pub fn plan_with_engine<L: SectionLookup>(
    courses: &[String],
    lookup: L,
    config: &Config,
    options: PlanOptions,
    engine: &ScoringEngine,
) -> ScheduleRun {
    let mut ledger = ErrorLedger::new();
    let mut metrics = RunMetrics::new();
    let mut catalog = CachedLookup::new(lookup);

    // cursos repetidos se piden una sola vez
    let mut wanted: Vec<String> = Vec::new();
    for c in courses {
        let c = normalize_id(c);
        if !c.is_empty() && !wanted.contains(&c) {
            wanted.push(c);
        }
    }

    let mut per_course: Vec<(String, Vec<Section>)> = Vec::with_capacity(wanted.len());
    for course in wanted {
        let sections = match metrics.time(STAGE_LOOKUP, || catalog.lookup(&course)) {
            Ok(v) => v,
            Err(e) => {
                ledger.record(STAGE_LOOKUP, e.to_string());
                Vec::new()
            }
        };
        if sections.is_empty() {
            ledger.record(STAGE_LOOKUP, format!("no open sections for course {}", course));
        }
        per_course.push((course, sections));
    }

    if options.sort_by_enrollment {
        for (_, sections) in per_course.iter_mut() {
            sort_sections_by_enrollment(sections);
        }
    }
    if options.sort_by_variance {
        sort_courses_by_variance(&mut per_course);
    }

    let candidates: Vec<Vec<Section>> = per_course
        .into_iter()
        .map(|(_, sections)| {
            if options.group_sections {
                group_sections(sections)
            } else {
                sections
            }
        })
        .collect();
    tracing::info!(
        cursos = candidates.len(),
        candidatos = candidates.iter().map(|c| c.len()).sum::<usize>(),
        "candidatos listos"
    );

    let generated = metrics.time(STAGE_GENERATE, || generate_combinations(&candidates, &mut catalog));
    ledger.merge(generated.ledger);
    let total = generated.combinations.len();

    let scored = metrics.time(STAGE_SCORING, || engine.score_all(generated.combinations, config));
    ledger.merge(scored.ledger);

    let ranking = metrics.time(STAGE_RANK, || rank(scored.scored));

    metrics.log_summary();
    for (stage, msgs) in ledger.stages() {
        tracing::info!(stage, errores = msgs.len(), "resumen del ledger");
    }
    ScheduleRun {
        ranking,
        ledger,
        generated: total,
        lookup_stats: catalog.stats(),
        metrics,
    }
}
