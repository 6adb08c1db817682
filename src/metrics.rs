// Métricas de una corrida: por etapa, cuántas llamadas y cuánto tiempo total.
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StageMetrics {
    pub calls: u64,
    /// Tiempo acumulado en milisegundos.
    pub total_ms: f64,
}

/// Acumulador etapa -> (llamadas, tiempo total). Uno por corrida.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RunMetrics {
    stages: BTreeMap<String, StageMetrics>,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: &str, elapsed: Duration) {
        let entry = self.stages.entry(stage.to_string()).or_default();
        entry.calls += 1;
        entry.total_ms += elapsed.as_secs_f64() * 1000.0;
    }

    /// Mide `f` y lo registra bajo `stage`.
    pub fn time<T>(&mut self, stage: &str, f: impl FnOnce() -> T) -> T {
        let t0 = Instant::now();
        let out = f();
        self.record(stage, t0.elapsed());
        out
    }

    pub fn get(&self, stage: &str) -> Option<&StageMetrics> {
        self.stages.get(stage)
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> impl Iterator<Item = (&str, &StageMetrics)> {
        self.stages.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn log_summary(&self) {
        for (stage, m) in self.stages() {
            tracing::info!(stage, llamadas = m.calls, ms = format!("{:.3}", m.total_ms), "métrica de etapa");
        }
    }
}
