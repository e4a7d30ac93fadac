//! Rating engine: turns quiz outcomes into per-(role, domain) proficiency
//! estimates, keeps the answer history, and reports weak areas and stats.
//!
//! The engine is an explicit object constructed once at startup from a
//! loaded [`Catalog`] and a [`KeyValueStore`]; callers pass it by reference.
//! All operations are synchronous and in-memory, each mutation followed by a
//! full-record persist.

mod rating;
pub mod selector;
pub mod types;

pub use selector::RecentWindow;
pub use types::{
    AnswerRecord, DomainRating, HistoryFilter, ProgressStats, QuizOutcome, QuizStats, RatingBook,
    RatingsExport, WeakArea,
};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::catalog::{Catalog, Question, RoleId};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::store::KeyValueStore;

pub(crate) const RATINGS_KEY: &str = "ratings";
pub(crate) const HISTORY_KEY: &str = "quiz_history";

const EXPORT_VERSION: &str = "1.0";

pub struct QuizEngine {
    config: EngineConfig,
    catalog: Catalog,
    ratings: RatingBook,
    /// Most recent entry first, capped at `config.history_cap`.
    history: Vec<AnswerRecord>,
    recent: RecentWindow,
    store: Arc<dyn KeyValueStore>,
    rng: ChaCha8Rng,
}

impl QuizEngine {
    /// Builds an engine, rehydrating ratings and history from the store.
    pub fn new(catalog: Catalog, store: Arc<dyn KeyValueStore>, config: EngineConfig) -> Result<Self> {
        Self::with_rng(catalog, store, config, ChaCha8Rng::from_entropy())
    }

    /// Same as [`new`](Self::new) with a fixed RNG seed, for deterministic
    /// selection in tests.
    pub fn with_seed(
        catalog: Catalog,
        store: Arc<dyn KeyValueStore>,
        config: EngineConfig,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(catalog, store, config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(
        catalog: Catalog,
        store: Arc<dyn KeyValueStore>,
        config: EngineConfig,
        rng: ChaCha8Rng,
    ) -> Result<Self> {
        let ratings: RatingBook = match store.get(RATINGS_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => HashMap::new(),
        };
        let history: Vec<AnswerRecord> = match store.get(HISTORY_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };

        tracing::info!(
            rated_domains = ratings.values().map(|d| d.len()).sum::<usize>(),
            history_entries = history.len(),
            "rating engine rehydrated"
        );

        let recent = RecentWindow::new(config.recent_window);
        Ok(Self {
            config,
            catalog,
            ratings,
            history,
            recent,
            store,
            rng,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current rating for a (role, domain) pair. Unseen pairs read as the
    /// default estimate; nothing is persisted until the first update.
    pub fn rating(&self, role: RoleId, domain: &str) -> DomainRating {
        self.ratings
            .get(&role)
            .and_then(|domains| domains.get(domain))
            .copied()
            .unwrap_or_else(|| DomainRating::fresh(self.config.default_mean))
    }

    /// Mean rating across a role's domains; the default estimate when the
    /// role has no domains or is absent from the taxonomy.
    pub fn role_score(&self, role: RoleId) -> f64 {
        let Some(spec) = self.catalog.taxonomy().role(role) else {
            return self.config.default_mean;
        };
        if spec.domains.is_empty() {
            return self.config.default_mean;
        }

        let total: f64 = spec
            .domains
            .iter()
            .map(|d| self.rating(role, &d.id).mean)
            .sum();
        total / spec.domains.len() as f64
    }

    /// Grades one outcome: moves the domain rating toward the
    /// difficulty-anchored target, persists the snapshot, and appends an
    /// answer record (trimmed to the history cap).
    pub fn update_rating(
        &mut self,
        question: &Question,
        chosen_option: usize,
        outcome: QuizOutcome,
    ) -> Result<DomainRating> {
        let current = self.rating(question.role, &question.domain);
        let target = rating::target_score(question.difficulty, outcome.correct);
        let mean = rating::smoothed_mean(
            current.mean,
            target,
            self.config.learning_rate,
            self.config.rating_floor,
            self.config.rating_ceiling,
        );

        let now = Utc::now();
        let updated = DomainRating {
            mean,
            count: current.count + 1,
            last_updated: now,
        };
        self.ratings
            .entry(question.role)
            .or_default()
            .insert(question.domain.clone(), updated);
        self.persist_ratings()?;

        let record = AnswerRecord {
            id: format!("{}_{}", question.id, now.timestamp_millis()),
            question: question.clone(),
            chosen_option,
            correct: outcome.correct,
            elapsed_secs: outcome.elapsed_secs,
            confidence: outcome.confidence.clamp(1, 5),
            timestamp: now,
        };
        self.history.insert(0, record);
        self.history.truncate(self.config.history_cap);
        self.persist_history()?;

        tracing::debug!(
            question = %question.id,
            role = question.role.as_str(),
            domain = %question.domain,
            correct = outcome.correct,
            mean = updated.mean,
            "rating updated"
        );
        Ok(updated)
    }

    /// Every (role, domain) pair in taxonomy order, ascending by rating.
    /// Ties keep taxonomy order (stable sort).
    pub fn weak_areas(&self, limit: usize) -> Vec<WeakArea> {
        let mut areas: Vec<WeakArea> = self
            .catalog
            .taxonomy()
            .pairs()
            .map(|(role, domain)| WeakArea {
                role,
                domain: domain.id.clone(),
                rating: self.rating(role, &domain.id).mean,
            })
            .collect();

        areas.sort_by(|a, b| a.rating.total_cmp(&b.rating));
        areas.truncate(limit);
        areas
    }

    /// Answer history, most recent first.
    pub fn history(&self) -> &[AnswerRecord] {
        &self.history
    }

    /// Answer history narrowed by role, domain, correctness, and count.
    pub fn filtered_history(&self, filter: &HistoryFilter) -> Vec<AnswerRecord> {
        let mut entries: Vec<AnswerRecord> = self
            .history
            .iter()
            .filter(|e| filter.role.map_or(true, |r| e.question.role == r))
            .filter(|e| {
                filter
                    .domain
                    .as_deref()
                    .map_or(true, |d| e.question.domain == d)
            })
            .filter(|e| filter.correct.map_or(true, |c| e.correct == c))
            .cloned()
            .collect();

        if let Some(limit) = filter.limit {
            entries.truncate(limit);
        }
        entries
    }

    /// Aggregates over the whole history; all zeros when it is empty.
    pub fn quiz_stats(&self) -> QuizStats {
        if self.history.is_empty() {
            return QuizStats::default();
        }

        let total = self.history.len();
        let correct = self.history.iter().filter(|e| e.correct).count();
        let total_secs: u64 = self.history.iter().map(|e| u64::from(e.elapsed_secs)).sum();
        let total_confidence: u64 = self.history.iter().map(|e| u64::from(e.confidence)).sum();
        let streak = self.history.iter().take_while(|e| e.correct).count();

        QuizStats {
            total_questions: total,
            correct_answers: correct,
            accuracy: ((correct as f64 / total as f64) * 100.0).round() as u32,
            average_secs: (total_secs as f64 / total as f64).round() as u32,
            average_confidence: (total_confidence as f64 / total as f64 * 10.0).round() / 10.0,
            streak_count: streak,
        }
    }

    /// Overall and per-role progress, plus catalog/attempt counters.
    pub fn progress_stats(&self) -> ProgressStats {
        let taxonomy = self.catalog.taxonomy();
        let mut by_role = HashMap::new();
        let mut total_score = 0.0;
        let mut questions_answered: u64 = 0;

        for spec in &taxonomy.roles {
            let score = self.role_score(spec.id);
            by_role.insert(spec.id, score);
            total_score += score;
            for d in &spec.domains {
                questions_answered += u64::from(self.rating(spec.id, &d.id).count);
            }
        }

        let overall = if taxonomy.roles.is_empty() {
            self.config.default_mean
        } else {
            total_score / taxonomy.roles.len() as f64
        };

        ProgressStats {
            overall,
            by_role,
            total_questions: self.catalog.questions().len(),
            questions_answered,
        }
    }

    /// Snapshot of all ratings for backup or transfer.
    pub fn export_ratings(&self) -> RatingsExport {
        RatingsExport {
            ratings: self.ratings.clone(),
            export_date: Utc::now(),
            version: EXPORT_VERSION.to_string(),
        }
    }

    /// Replaces the rating book with an exported snapshot and persists it.
    /// Means are re-clamped so an edited export cannot break the invariant.
    pub fn import_ratings(&mut self, export: RatingsExport) -> Result<()> {
        let mut ratings = export.ratings;
        for domains in ratings.values_mut() {
            for entry in domains.values_mut() {
                entry.mean = entry
                    .mean
                    .clamp(self.config.rating_floor, self.config.rating_ceiling);
            }
        }
        self.ratings = ratings;
        self.persist_ratings()?;
        tracing::info!(version = %export.version, "ratings imported");
        Ok(())
    }

    fn persist_ratings(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.ratings)?;
        self.store.set(RATINGS_KEY, &raw)
    }

    fn persist_history(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.history)?;
        self.store.set(HISTORY_KEY, &raw)
    }
}
