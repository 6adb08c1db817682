//! Configuración de pesos y umbrales del motor de puntajes.
//!
//! Se carga una vez por corrida desde JSON. Todos los umbrales son `Option`
//! para que su ausencia sea observable: cada sub-score pide sus claves con los
//! accesores `require_*`, que fallan con `ConfigError::MissingKey` en vez de
//! inventar un valor por defecto. Sólo los pesos tienen un default (1.0).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::algorithm::conflict::{parse_clock, parse_clock_range};
use crate::errors::ConfigError;
use crate::models::{parse_day, WEEK};

/// Métodos de entrega considerados 100% remotos cuando la config no dice otra cosa.
pub const DEFAULT_REMOTE_METHODS: [&str; 1] = ["ONLIN"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Peso por sub-score, p.ej. {"days": 1, "modality": 10}.
    pub weights: HashMap<String, f64>,
    /// Si se entrega, sólo estos sub-scores participan.
    pub active_scores: Option<Vec<String>>,
    pub preferred_num_days: Option<u32>,
    pub penalty_per_excess_day: Option<f64>,
    pub gap_weights: Option<GapWeights>,
    pub preferred_max_sections_per_day: Option<u32>,
    pub penalty_per_excess_section: Option<f64>,
    pub consistency_penalty_weight: Option<f64>,
    pub availability_penalty_per_hour: Option<f64>,
    /// Si se define, los minutos fuera de disponibilidad se redondean hacia
    /// arriba a múltiplos de este valor antes de convertir a horas.
    pub availability_granularity_minutes: Option<u32>,
    /// Tasa con signo: positiva penaliza secciones más llenas que la mediana.
    pub enrollment_balancing_penalty_rate: Option<f64>,
    pub location_change: Option<LocationChange>,
    /// Curso -> método preferido ("LEC", "ONLIN", ...).
    pub modality_preferences: HashMap<String, String>,
    /// Día -> ventana(s) "11:00 AM - 10:00 PM". Sólo se usa la primera.
    pub availability: Option<HashMap<String, Vec<String>>>,
    pub remote_methods: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapWeights {
    pub max_allowed_gap: Option<f64>,
    pub penalty_per_gap_hour: Option<f64>,
    pub mandatory_break_start: Option<String>,
    pub mandatory_break_end: Option<String>,
    pub mandatory_break_days: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationChange {
    /// En horas.
    pub minimum_permissible_gap: Option<f64>,
    pub unacceptable_gap_penalty: Option<f64>,
    pub acceptable_gap_penalty: Option<f64>,
}

/// Parámetros de huecos ya validados.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapSettings {
    pub max_allowed_gap: f64,
    pub penalty_per_gap_hour: f64,
    /// (inicio, fin) en minutos desde medianoche.
    pub mandatory_break: Option<(u32, u32)>,
    pub break_days: crate::models::DaySet,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSettings {
    pub minimum_gap_minutes: f64,
    pub unacceptable_gap_penalty: f64,
    pub acceptable_gap_penalty: f64,
}

/// Ventana de disponibilidad por día (minutos desde medianoche); `None` = sin disponibilidad.
pub type AvailabilityWindows = HashMap<Weekday, Option<(u32, u32)>>;

fn require<T: Copy>(value: Option<T>, key: &str) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

impl Config {
    pub fn from_json_str(raw: &str) -> Result<Config, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Unreadable {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Reemplaza las preferencias del estudiante que vienen en la petición.
    pub fn with_student_preferences(
        mut self,
        modality_preferences: Option<HashMap<String, String>>,
        availability: Option<HashMap<String, Vec<String>>>,
    ) -> Config {
        if let Some(m) = modality_preferences {
            self.modality_preferences = m;
        }
        if availability.is_some() {
            self.availability = availability;
        }
        self
    }

    /// Peso de un sub-score; si la clave no existe se usa `default`.
    pub fn weight(&self, key: &str, default: f64) -> f64 {
        self.weights.get(key).copied().unwrap_or(default)
    }

    pub fn is_active(&self, score_name: &str) -> bool {
        match &self.active_scores {
            Some(list) => list.iter().any(|s| s == score_name),
            None => true,
        }
    }

    pub fn require_preferred_num_days(&self) -> Result<u32, ConfigError> {
        require(self.preferred_num_days, "preferred_num_days")
    }

    pub fn require_penalty_per_excess_day(&self) -> Result<f64, ConfigError> {
        require(self.penalty_per_excess_day, "penalty_per_excess_day")
    }

    pub fn require_max_sections_per_day(&self) -> Result<u32, ConfigError> {
        require(
            self.preferred_max_sections_per_day,
            "preferred_max_sections_per_day",
        )
    }

    pub fn require_penalty_per_excess_section(&self) -> Result<f64, ConfigError> {
        require(self.penalty_per_excess_section, "penalty_per_excess_section")
    }

    pub fn require_consistency_penalty_weight(&self) -> Result<f64, ConfigError> {
        require(self.consistency_penalty_weight, "consistency_penalty_weight")
    }

    pub fn require_availability_penalty_per_hour(&self) -> Result<f64, ConfigError> {
        require(
            self.availability_penalty_per_hour,
            "availability_penalty_per_hour",
        )
    }

    pub fn require_enrollment_rate(&self) -> Result<f64, ConfigError> {
        require(
            self.enrollment_balancing_penalty_rate,
            "enrollment_balancing_penalty_rate",
        )
    }

    pub fn remote_methods(&self) -> Vec<String> {
        match &self.remote_methods {
            Some(list) => list.iter().map(|m| m.trim().to_uppercase()).collect(),
            None => DEFAULT_REMOTE_METHODS.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn gap_settings(&self) -> Result<GapSettings, ConfigError> {
        let gw = self
            .gap_weights
            .as_ref()
            .ok_or_else(|| ConfigError::MissingKey("gap_weights".into()))?;
        let max_allowed_gap = require(gw.max_allowed_gap, "gap_weights.max_allowed_gap")?;
        let penalty_per_gap_hour =
            require(gw.penalty_per_gap_hour, "gap_weights.penalty_per_gap_hour")?;

        let mut break_days = crate::models::DaySet::EMPTY;
        for d in &gw.mandatory_break_days {
            let day = parse_day(d).ok_or_else(|| ConfigError::InvalidValue {
                key: "gap_weights.mandatory_break_days".into(),
                reason: format!("unknown weekday '{}'", d),
            })?;
            break_days.insert(day);
        }

        // El descanso sólo es obligatorio si hay días declarados
        let mandatory_break = if break_days.is_empty() {
            None
        } else {
            let start = clock_key(&gw.mandatory_break_start, "gap_weights.mandatory_break_start")?;
            let end = clock_key(&gw.mandatory_break_end, "gap_weights.mandatory_break_end")?;
            Some((start, end))
        };

        Ok(GapSettings {
            max_allowed_gap,
            penalty_per_gap_hour,
            mandatory_break,
            break_days,
        })
    }

    pub fn location_settings(&self) -> Result<LocationSettings, ConfigError> {
        let lc = self
            .location_change
            .as_ref()
            .ok_or_else(|| ConfigError::MissingKey("location_change".into()))?;
        let hours = require(
            lc.minimum_permissible_gap,
            "location_change.minimum_permissible_gap",
        )?;
        Ok(LocationSettings {
            minimum_gap_minutes: hours * 60.0,
            unacceptable_gap_penalty: require(
                lc.unacceptable_gap_penalty,
                "location_change.unacceptable_gap_penalty",
            )?,
            acceptable_gap_penalty: require(
                lc.acceptable_gap_penalty,
                "location_change.acceptable_gap_penalty",
            )?,
        })
    }

    /// Ventanas de disponibilidad por día. Los días no declarados (o con lista
    /// vacía) quedan en `None`.
    pub fn availability_windows(&self) -> Result<AvailabilityWindows, ConfigError> {
        let raw = self
            .availability
            .as_ref()
            .ok_or_else(|| ConfigError::MissingKey("availability".into()))?;
        let mut out: AvailabilityWindows = WEEK.iter().map(|d| (*d, None)).collect();
        for (day_key, windows) in raw {
            let day = parse_day(day_key).ok_or_else(|| ConfigError::InvalidValue {
                key: "availability".into(),
                reason: format!("unknown weekday '{}'", day_key),
            })?;
            let Some(first) = windows.iter().find(|w| !w.trim().is_empty()) else {
                continue;
            };
            let window = parse_clock_range(first).ok_or_else(|| ConfigError::InvalidValue {
                key: format!("availability.{}", day_key),
                reason: format!("malformed window '{}'", first),
            })?;
            out.insert(day, Some(window));
        }
        Ok(out)
    }
}

fn clock_key(value: &Option<String>, key: &str) -> Result<u32, ConfigError> {
    let raw = value
        .as_deref()
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))?;
    parse_clock(raw).ok_or_else(|| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: format!("malformed time '{}'", raw),
    })
}
