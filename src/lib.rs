//! Adaptive assessment core for skill coaching.
//!
//! The crate tracks a learner's proficiency across professional roles and
//! their skill domains, and turns that state into the next question to ask
//! and a daily study schedule:
//!
//! - [`catalog`]: the immutable question bank and skill taxonomy, loaded and
//!   validated once at startup.
//! - [`engine`]: exponential-smoothing ratings, adaptive question selection
//!   with repeat avoidance, answer history and aggregate stats.
//! - [`planner`]: daily plan generation (quiz blocks targeting weak domains
//!   plus a project block) and plan persistence with retention.
//! - [`store`]: the key-value persistence contract with in-memory and
//!   JSON-file implementations.
//! - [`config`], [`error`], [`logging`]: the usual ambient pieces.
//!
//! ```no_run
//! use skillcoach::{Allocation, Catalog, DailyPlanner, EngineConfig, PlannerConfig};
//! use skillcoach::{JsonFileStore, LogConfig, QuizEngine, QuizOutcome, RoleId};
//! use std::sync::Arc;
//!
//! # async fn run() -> skillcoach::Result<()> {
//! let _log_guard = skillcoach::logging::init_tracing(&LogConfig::from_env());
//!
//! let catalog = Catalog::load("questions.json", "taxonomy.json").await?;
//! let store = Arc::new(JsonFileStore::open("state.json")?);
//!
//! let mut engine = QuizEngine::new(catalog, store.clone(), EngineConfig::from_env())?;
//! if let Some(question) = engine.select_next(&[RoleId::Swe]) {
//!     let outcome = QuizOutcome { correct: true, elapsed_secs: 24, confidence: 4 };
//!     engine.update_rating(&question, question.answer, outcome)?;
//! }
//!
//! let mut planner = DailyPlanner::new(store, PlannerConfig::from_env());
//! let plan = planner.generate(&engine, 2.0, &[RoleId::Swe], Allocation::default());
//! planner.save_plan(plan)?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod planner;
pub mod store;

pub use catalog::{Catalog, Difficulty, DomainSpec, Question, RoleId, RoleSpec, SkillsTaxonomy};
pub use config::{EngineConfig, PlannerConfig};
pub use engine::{
    AnswerRecord, DomainRating, HistoryFilter, ProgressStats, QuizEngine, QuizOutcome, QuizStats,
    RatingsExport, RecentWindow, WeakArea,
};
pub use error::{Error, Result};
pub use logging::{FileLogGuard, LogConfig};
pub use planner::{Allocation, BlockKind, DailyPlan, DailyPlanner, PlanSuggestion, StudyBlock};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
