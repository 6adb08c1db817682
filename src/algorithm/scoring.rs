//! Motor de puntajes: cada sub-score es una función pura de (Combinación, Config).
//!
//! Los sub-scores viven en un registro (`ScoringEngine`). Cada entrada declara
//! su nombre, la clave de peso que usa y el peso por defecto; el puntaje
//! combinado es la suma ponderada redondeada a un decimal. Menor es mejor.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::algorithm::conflict::ParsedSection;
use crate::config::Config;
use crate::errors::{ErrorLedger, ScheduleError, STAGE_SCORING};
use crate::models::{normalize_id, Combination, WEEK};

pub const MODALITY: &str = "modality";
pub const DAYS: &str = "days";
pub const GAPS: &str = "gaps";
pub const MAX_SECTIONS: &str = "max_sections";
pub const START_CONSISTENCY: &str = "start_consistency";
pub const END_CONSISTENCY: &str = "end_consistency";
pub const AVAILABILITY: &str = "availability";
pub const ENROLLMENT_BALANCE: &str = "enrollment_balance";
pub const LOCATION_CHANGE: &str = "location_change";

pub fn round1(x: f64) -> f64 {
    // empates al par
    (x * 10.0).round_ties_even() / 10.0
}

/// Bloque de un día: una sección (o el descanso obligatorio) con horario.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: String,
    pub start: u32,
    pub end: u32,
    pub location: Option<String>,
}

/// Combinación ya parseada y repartida por día de la semana.
#[derive(Debug)]
pub struct ScoringInput<'a> {
    pub combination: &'a Combination,
    pub parsed: Vec<ParsedSection>,
    /// Índice = días desde el lunes; cada día ordenado por hora de inicio.
    pub days: [Vec<Slot>; 7],
}

impl<'a> ScoringInput<'a> {
    pub fn build(combination: &'a Combination) -> Result<Self, ScheduleError> {
        let mut parsed = Vec::with_capacity(combination.len());
        let mut days: [Vec<Slot>; 7] = Default::default();
        for section in combination.iter() {
            let p = ParsedSection::parse(section)?;
            if let (Some(start), Some(end)) = (p.start, p.end) {
                for day in p.days.iter() {
                    days[day.num_days_from_monday() as usize].push(Slot {
                        name: section.name.clone(),
                        start,
                        end,
                        location: section.location.clone(),
                    });
                }
            }
            parsed.push(p);
        }
        for d in days.iter_mut() {
            d.sort_by_key(|s| s.start);
        }
        Ok(ScoringInput { combination, parsed, days })
    }

    /// Días (en orden) que tienen al menos un bloque con horario.
    pub fn busy_days(&self) -> impl Iterator<Item = (chrono::Weekday, &[Slot])> + '_ {
        WEEK.iter()
            .map(|d| (*d, self.days[d.num_days_from_monday() as usize].as_slice()))
            .filter(|(_, slots)| !slots.is_empty())
    }
}

pub type ScoreFn = fn(&ScoringInput<'_>, &Config) -> Result<f64, ScheduleError>;

/// Entrada del registro de sub-scores.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    pub name: &'static str,
    pub weight_key: &'static str,
    pub default_weight: f64,
    pub compute: ScoreFn,
}

/// Puntaje de una combinación: sub-scores por nombre y combinado.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Score {
    pub combined: f64,
    pub subscores: BTreeMap<&'static str, f64>,
}

impl Score {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.subscores.get(name).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCombination {
    pub combination: Combination,
    pub score: Score,
}

#[derive(Debug, Default)]
pub struct Scored {
    pub scored: Vec<ScoredCombination>,
    pub ledger: ErrorLedger,
}

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    scorers: Vec<Scorer>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        ScoringEngine::standard()
    }
}

impl ScoringEngine {
    /// Registro vacío.
    pub fn new() -> Self {
        ScoringEngine { scorers: Vec::new() }
    }

    /// Los nueve sub-scores estándar.
    pub fn standard() -> Self {
        ScoringEngine::new()
            .with(Scorer { name: MODALITY, weight_key: "modality", default_weight: 1.0, compute: score_modality })
            .with(Scorer { name: DAYS, weight_key: "days", default_weight: 1.0, compute: score_days_on_campus })
            .with(Scorer { name: GAPS, weight_key: "gaps", default_weight: 1.0, compute: score_gaps })
            .with(Scorer { name: MAX_SECTIONS, weight_key: "sections_per_day", default_weight: 1.0, compute: score_max_sections_per_day })
            .with(Scorer { name: START_CONSISTENCY, weight_key: "consistency_start_time", default_weight: 1.0, compute: score_start_consistency })
            .with(Scorer { name: END_CONSISTENCY, weight_key: "consistency_end_time", default_weight: 1.0, compute: score_end_consistency })
            .with(Scorer { name: AVAILABILITY, weight_key: "availability", default_weight: 1.0, compute: score_availability })
            .with(Scorer { name: ENROLLMENT_BALANCE, weight_key: "enrollment_balancing", default_weight: 1.0, compute: score_enrollment_balance })
            .with(Scorer { name: LOCATION_CHANGE, weight_key: "location_change", default_weight: 1.0, compute: score_location_change })
    }

    /// Agrega (o reemplaza, si el nombre ya existe) un sub-score.
    pub fn with(mut self, scorer: Scorer) -> Self {
        match self.scorers.iter_mut().find(|s| s.name == scorer.name) {
            Some(existing) => *existing = scorer,
            None => self.scorers.push(scorer),
        }
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.scorers.iter().map(|s| s.name).collect()
    }

    /// Puntaje de una combinación. Falla con el primer sub-score activo que
    /// no pueda calcularse (p.ej. clave de configuración ausente).
    pub fn score(&self, combination: &Combination, config: &Config) -> Result<Score, ScheduleError> {
        let input = ScoringInput::build(combination)?;
        let mut subscores = BTreeMap::new();
        let mut combined = 0.0;
        for scorer in self.scorers.iter().filter(|s| config.is_active(s.name)) {
            let value = (scorer.compute)(&input, config)?;
            combined += config.weight(scorer.weight_key, scorer.default_weight) * value;
            subscores.insert(scorer.name, value);
        }
        Ok(Score { combined: round1(combined), subscores })
    }

    /// Puntúa un lote. Una combinación que falla se registra en el ledger y
    /// se omite; el lote sigue.
    pub fn score_all(&self, combinations: Vec<Combination>, config: &Config) -> Scored {
        let mut out = Scored::default();
        let total = combinations.len();
        for combination in combinations {
            match self.score(&combination, config) {
                Ok(score) => out.scored.push(ScoredCombination { combination, score }),
                Err(e) => {
                    out.ledger.record(STAGE_SCORING, e.to_string());
                }
            }
        }
        tracing::info!(total, puntuadas = out.scored.len(), "puntajes calculados");
        out
    }
}

/// Secciones cuyo método difiere del preferido para su curso.
pub fn score_modality(input: &ScoringInput<'_>, config: &Config) -> Result<f64, ScheduleError> {
    let prefs: BTreeMap<String, String> = config
        .modality_preferences
        .iter()
        .map(|(course, m)| (normalize_id(course), m.trim().to_uppercase()))
        .collect();
    let mismatches = input
        .combination
        .iter()
        .filter(|s| match prefs.get(&normalize_id(&s.course_code)) {
            Some(preferred) => s.method.trim().to_uppercase() != *preferred,
            None => false,
        })
        .count();
    Ok(mismatches as f64)
}

/// Días con al menos una sección no remota, por sobre lo preferido.
pub fn score_days_on_campus(input: &ScoringInput<'_>, config: &Config) -> Result<f64, ScheduleError> {
    let preferred = config.require_preferred_num_days()?;
    let penalty = config.require_penalty_per_excess_day()?;
    let remote = config.remote_methods();

    let mut on_campus = crate::models::DaySet::EMPTY;
    for (section, parsed) in input.combination.iter().zip(&input.parsed) {
        if remote.contains(&section.method.trim().to_uppercase()) {
            continue;
        }
        for d in parsed.days.iter() {
            on_campus.insert(d);
        }
    }
    let excess = on_campus.len().saturating_sub(preferred as usize);
    Ok(excess as f64 * penalty)
}

/// Secciones por día por sobre el tope configurado.
pub fn score_max_sections_per_day(input: &ScoringInput<'_>, config: &Config) -> Result<f64, ScheduleError> {
    let cap = config.require_max_sections_per_day()? as usize;
    let penalty = config.require_penalty_per_excess_section()?;

    let mut per_day = [0usize; 7];
    for parsed in &input.parsed {
        for d in parsed.days.iter() {
            per_day[d.num_days_from_monday() as usize] += 1;
        }
    }
    let excess: usize = per_day.iter().map(|c| c.saturating_sub(cap)).sum();
    Ok(excess as f64 * penalty)
}

/// Huecos entre clases consecutivas de un día, por sobre el umbral libre.
pub fn score_gaps(input: &ScoringInput<'_>, config: &Config) -> Result<f64, ScheduleError> {
    let settings = config.gap_settings()?;
    let mut total = 0.0;

    for (day, slots) in input.busy_days() {
        let mut slots: Vec<Slot> = slots.to_vec();
        if let Some((b_start, b_end)) = settings.mandatory_break {
            if settings.break_days.contains(day) {
                let before = slots.iter().any(|s| s.end <= b_start);
                let after = slots.iter().any(|s| s.start >= b_end);
                if before && after {
                    slots.push(Slot {
                        name: "Mandatory Break".to_string(),
                        start: b_start,
                        end: b_end,
                        location: None,
                    });
                    slots.sort_by_key(|s| s.start);
                }
            }
        }
        total += day_gap_penalty(&slots, settings.max_allowed_gap, settings.penalty_per_gap_hour);
    }
    Ok(total)
}

/// Penalización de huecos de un día ya ordenado.
pub fn day_gap_penalty(slots: &[Slot], max_allowed_gap: f64, penalty_per_hour: f64) -> f64 {
    slots
        .windows(2)
        .map(|w| w[1].start as f64 - w[0].end as f64)
        .filter(|gap| *gap > max_allowed_gap)
        .map(|gap| (gap / 60.0).round_ties_even() * penalty_per_hour)
        .sum()
}

/// Desviación (en horas, ponderada) del inicio y fin de cada día respecto del
/// promedio semanal. Devuelve (inicio, fin).
pub fn consistency_scores(input: &ScoringInput<'_>, config: &Config) -> Result<(f64, f64), ScheduleError> {
    let weight = config.require_consistency_penalty_weight()?;

    let bounds: Vec<(u32, u32)> = input
        .busy_days()
        .map(|(_, slots)| {
            let first = slots.iter().map(|s| s.start).min().unwrap_or(0);
            let last = slots.iter().map(|s| s.end).max().unwrap_or(0);
            (first, last)
        })
        .collect();
    if bounds.len() < 2 {
        return Ok((0.0, 0.0));
    }

    let n = bounds.len() as u32;
    // promedio truncado al minuto
    let avg_start = bounds.iter().map(|b| b.0).sum::<u32>() / n;
    let avg_end = bounds.iter().map(|b| b.1).sum::<u32>() / n;

    let dev = |t: u32, avg: u32| (t as f64 - avg as f64).abs() / 60.0;
    let start: f64 = bounds.iter().map(|b| dev(b.0, avg_start)).sum();
    let end: f64 = bounds.iter().map(|b| dev(b.1, avg_end)).sum();
    Ok((round1(start * weight), round1(end * weight)))
}

pub fn score_start_consistency(input: &ScoringInput<'_>, config: &Config) -> Result<f64, ScheduleError> {
    consistency_scores(input, config).map(|(s, _)| s)
}

pub fn score_end_consistency(input: &ScoringInput<'_>, config: &Config) -> Result<f64, ScheduleError> {
    consistency_scores(input, config).map(|(_, e)| e)
}

/// Minutos de la envolvente [primer inicio, último fin] de cada día que caen
/// fuera de la ventana de disponibilidad declarada para ese día.
pub fn score_availability(input: &ScoringInput<'_>, config: &Config) -> Result<f64, ScheduleError> {
    let windows = config.availability_windows()?;
    let rate = config.require_availability_penalty_per_hour()?;
    let unit = config.availability_granularity_minutes.filter(|u| *u > 0);

    let mut total = 0.0;
    for (day, slots) in input.busy_days() {
        let first = slots.iter().map(|s| s.start).min().unwrap_or(0);
        let last = slots.iter().map(|s| s.end).max().unwrap_or(0);
        let envelope = last.saturating_sub(first);

        let outside = match windows.get(&day).copied().flatten() {
            Some((w_start, w_end)) => {
                let overlap = last.min(w_end).saturating_sub(first.max(w_start));
                envelope - overlap.min(envelope)
            }
            None => envelope,
        };
        let outside = match unit {
            Some(u) => outside.div_ceil(u) * u,
            None => outside,
        };
        total += outside as f64 / 60.0 * rate;
    }
    Ok(total)
}

/// Suma de desviaciones de ocupación respecto de la mediana del curso, por una tasa con signo.
pub fn score_enrollment_balance(input: &ScoringInput<'_>, config: &Config) -> Result<f64, ScheduleError> {
    let rate = config.require_enrollment_rate()?;
    let sum: f64 = input
        .combination
        .iter()
        .filter_map(|s| s.fraction_full_deviation)
        .sum();
    Ok(round1(sum * rate))
}

/// Cambios de sede entre clases consecutivas de un mismo día.
pub fn score_location_change(input: &ScoringInput<'_>, config: &Config) -> Result<f64, ScheduleError> {
    let settings = config.location_settings()?;
    let mut total = 0.0;
    for (_, slots) in input.busy_days() {
        for w in slots.windows(2) {
            let (Some(a), Some(b)) = (w[0].location.as_deref(), w[1].location.as_deref()) else {
                continue;
            };
            if a.trim().eq_ignore_ascii_case(b.trim()) {
                continue;
            }
            let gap = w[1].start as f64 - w[0].end as f64;
            total += if gap < settings.minimum_gap_minutes {
                settings.unacceptable_gap_penalty
            } else {
                settings.acceptable_gap_penalty
            };
        }
    }
    Ok(total)
}
