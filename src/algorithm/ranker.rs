// Ordena combinaciones puntuadas: menor puntaje combinado primero.
use serde::Serialize;

use crate::algorithm::scoring::ScoredCombination;

/// Resultado ordenado. Los empates conservan el orden de generación.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Ranking {
    pub entries: Vec<ScoredCombination>,
}

pub fn rank(mut scored: Vec<ScoredCombination>) -> Ranking {
    // sort_by es estable
    scored.sort_by(|a, b| a.score.combined.total_cmp(&b.score.combined));
    Ranking { entries: scored }
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&ScoredCombination> {
        self.entries.first()
    }

    /// Las k mejores (o todas si hay menos).
    pub fn top(&self, k: usize) -> &[ScoredCombination] {
        &self.entries[..k.min(self.entries.len())]
    }

    /// Las k peores, de peor a mejor.
    pub fn bottom(&self, k: usize) -> Vec<&ScoredCombination> {
        self.entries.iter().rev().take(k).collect()
    }
}
