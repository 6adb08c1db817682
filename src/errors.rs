// Errores tipados del planificador y el registro (ledger) de errores por etapa.
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Falta (o es inválida) una clave de configuración requerida por un sub-score.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing critical configuration: '{0}'")]
    MissingKey(String),

    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("failed to read configuration '{path}': {message}")]
    Unreadable { path: String, message: String },
}

/// Errores del pipeline de combinaciones.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("malformed {field} '{value}' in section {section}")]
    Parse {
        section: String,
        field: &'static str,
        value: String,
    },

    #[error("corequisite {coreq} could not be resolved: {reason}")]
    Corequisite { coreq: String, reason: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errores del colaborador de búsqueda de secciones.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog query failed for course {course}: {message}")]
    Query { course: String, message: String },

    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        CatalogError::Unavailable(e.to_string())
    }
}

// Nombres de etapa usados como categoría en el ledger
pub const STAGE_LOOKUP: &str = "retrieve_section_info";
pub const STAGE_GENERATE: &str = "generate_combinations";
pub const STAGE_COREQS: &str = "resolve_corequisites";
pub const STAGE_SCORING: &str = "score_combinations";
pub const STAGE_RANK: &str = "rank_combinations";

/// Acumulador de errores de una corrida: etapa -> mensajes distintos.
///
/// Es puramente informativo; ninguna etapa decide nada en base a él.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorLedger {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl ErrorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un mensaje bajo `stage`. Devuelve `true` si el mensaje es nuevo.
    pub fn record(&mut self, stage: &str, message: impl Into<String>) -> bool {
        let message = message.into();
        let fresh = self
            .entries
            .entry(stage.to_string())
            .or_default()
            .insert(message.clone());
        if fresh {
            tracing::warn!(stage, error = %message, "error registrado");
        }
        fresh
    }

    pub fn messages(&self, stage: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(stage)
    }

    pub fn count(&self, stage: &str) -> usize {
        self.entries.get(stage).map_or(0, |s| s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|s| s.is_empty())
    }

    pub fn stages(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Incorpora otro ledger (p.ej. el de una etapa) en este.
    pub fn merge(&mut self, other: ErrorLedger) {
        for (stage, msgs) in other.entries {
            self.entries.entry(stage).or_default().extend(msgs);
        }
    }
}
