// Núcleo del planificador: choques, agrupación, generación, puntaje y ranking.
pub mod conflict;
pub mod grouping;
pub mod generator;
pub mod scoring;
pub mod ranker;
pub mod pipeline;

pub use conflict::ConflictDetector;
pub use generator::{generate_combinations, Generated};
pub use grouping::group_sections;
pub use pipeline::{plan_schedules, plan_with_engine, PlanOptions, ScheduleRun};
pub use ranker::{rank, Ranking};
pub use scoring::{Score, ScoredCombination, Scorer, ScoringEngine};
