//! Daily plan generation and plan persistence.
//!
//! A plan splits the caller's available time into quiz blocks and a project
//! block according to an [`Allocation`]. Quiz time targets the focus role's
//! weakest domains; project time draws a concrete idea from a per-role pool.
//! The store keeps at most one plan per date and drops plans older than the
//! retention window on every write.

mod ideas;
pub mod types;

pub use types::{Allocation, BlockKind, DailyPlan, PlanSuggestion, StudyBlock};

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::catalog::RoleId;
use crate::config::PlannerConfig;
use crate::engine::types::WeakArea;
use crate::engine::QuizEngine;
use crate::error::Result;
use crate::store::KeyValueStore;

pub(crate) const PLANS_KEY: &str = "daily_plans";

pub struct DailyPlanner {
    store: Arc<dyn KeyValueStore>,
    config: PlannerConfig,
    rng: ChaCha8Rng,
}

impl DailyPlanner {
    pub fn new(store: Arc<dyn KeyValueStore>, config: PlannerConfig) -> Self {
        Self {
            store,
            config,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Same as [`new`](Self::new) with a fixed RNG seed, for deterministic
    /// project-idea picks in tests.
    pub fn with_seed(store: Arc<dyn KeyValueStore>, config: PlannerConfig, seed: u64) -> Self {
        Self {
            store,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Builds today's plan from the current ratings. The plan is returned,
    /// not persisted; call [`save_plan`](Self::save_plan) to keep it.
    pub fn generate(
        &mut self,
        engine: &QuizEngine,
        available_hours: f64,
        priorities: &[RoleId],
        allocation: Allocation,
    ) -> DailyPlan {
        let quiz_minutes = (available_hours * 60.0 * allocation.quiz_ratio).round() as u32;
        let project_minutes = (available_hours * 60.0 * allocation.project_ratio).round() as u32;

        let focus = self.focus_role(engine, priorities);
        let weak: Vec<WeakArea> = engine.weak_areas(self.config.weak_area_cycle);

        let mut blocks = Vec::new();
        if quiz_minutes > 0 {
            self.push_quiz_blocks(engine, &mut blocks, quiz_minutes, focus, &weak);
        }
        if project_minutes > 0 {
            blocks.push(self.project_block(focus, project_minutes));
        }

        let now = Utc::now();
        let plan = DailyPlan {
            date: now.date_naive(),
            total_hours: available_hours,
            blocks,
            focus,
            created_at: now,
            updated_at: now,
        };
        tracing::debug!(
            date = %plan.date,
            focus = focus.as_str(),
            blocks = plan.blocks.len(),
            "daily plan generated"
        );
        plan
    }

    /// The role today's plan concentrates on: the weakest among the given
    /// priorities, where an earlier priority that is already below the weak
    /// threshold wins outright.
    fn focus_role(&self, engine: &QuizEngine, priorities: &[RoleId]) -> RoleId {
        let mut focus: Option<RoleId> = None;
        let mut lowest = f64::INFINITY;
        for &role in priorities {
            let score = engine.role_score(role);
            if score < lowest {
                lowest = score;
                focus = Some(role);
            }
            if lowest < engine.config().weak_threshold && focus == Some(role) {
                break;
            }
        }

        focus
            .or_else(|| priorities.first().copied())
            .or_else(|| engine.catalog().taxonomy().roles.first().map(|r| r.id))
            .unwrap_or(RoleId::Embedded)
    }

    fn push_quiz_blocks(
        &self,
        engine: &QuizEngine,
        blocks: &mut Vec<StudyBlock>,
        quiz_minutes: u32,
        focus: RoleId,
        weak: &[WeakArea],
    ) {
        if quiz_minutes < self.config.split_threshold_min {
            // Short budgets stay a single sitting.
            let target = weak.iter().find(|w| w.role == focus).or_else(|| weak.first());
            blocks.push(self.quiz_block(engine, "Adaptive Quiz", quiz_minutes, target));
            return;
        }

        let block_len = self.config.block_cap_min.min(quiz_minutes / 2);
        let mut remaining = quiz_minutes;
        let mut count = 0;
        while remaining > self.config.min_leftover_min && count < self.config.max_quiz_blocks {
            let duration = block_len.min(remaining);
            let target = if weak.is_empty() {
                None
            } else {
                weak.get(count % weak.len())
            };
            blocks.push(self.quiz_block(
                engine,
                &format!("Quiz Block {}", count + 1),
                duration,
                target,
            ));
            remaining -= duration;
            count += 1;
        }
    }

    fn quiz_block(
        &self,
        engine: &QuizEngine,
        title: &str,
        duration_min: u32,
        target: Option<&WeakArea>,
    ) -> StudyBlock {
        let (role, domain, description) = match target {
            Some(w) => {
                let taxonomy = engine.catalog().taxonomy();
                let role_name = taxonomy
                    .role(w.role)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| w.role.as_str().to_string());
                let domain_name = taxonomy
                    .domain(w.role, &w.domain)
                    .map(|d| d.name.clone())
                    .unwrap_or_else(|| humanize(&w.domain));
                (
                    Some(w.role),
                    Some(w.domain.clone()),
                    format!("Target: {role_name} - {domain_name}"),
                )
            }
            None => (None, None, "Mixed review across domains".to_string()),
        };

        StudyBlock {
            id: Uuid::new_v4().to_string(),
            kind: BlockKind::Quiz,
            duration_min,
            title: title.to_string(),
            description,
            role,
            domain,
            completed: false,
            started_at: None,
            completed_at: None,
        }
    }

    fn project_block(&mut self, focus: RoleId, duration_min: u32) -> StudyBlock {
        let pool = ideas::ideas_for(focus);
        let idea = pool[self.rng.gen_range(0..pool.len())];

        StudyBlock {
            id: Uuid::new_v4().to_string(),
            kind: BlockKind::Project,
            duration_min,
            title: "Project Work".to_string(),
            description: idea.to_string(),
            role: Some(focus),
            domain: None,
            completed: false,
            started_at: None,
            completed_at: None,
        }
    }

    /// Persists a plan, replacing any existing plan for the same date and
    /// purging plans older than the retention window.
    pub fn save_plan(&self, plan: DailyPlan) -> Result<()> {
        let mut plans = self.plans()?;
        plans.retain(|p| p.date != plan.date);
        plans.push(plan);
        self.prune(&mut plans);
        self.persist(&plans)
    }

    /// All stored plans in storage order.
    pub fn plans(&self) -> Result<Vec<DailyPlan>> {
        match self.store.get(PLANS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn todays_plan(&self) -> Result<Option<DailyPlan>> {
        let today = Utc::now().date_naive();
        Ok(self.plans()?.into_iter().find(|p| p.date == today))
    }

    /// Marks a block as started. Missing plans or blocks are a silent no-op.
    pub fn start_block(&self, date: NaiveDate, block_id: &str) -> Result<()> {
        self.touch_block(date, block_id, |block| {
            block.started_at = Some(Utc::now());
        })
    }

    /// Marks a block as completed. Missing plans or blocks are a silent no-op.
    pub fn complete_block(&self, date: NaiveDate, block_id: &str) -> Result<()> {
        self.touch_block(date, block_id, |block| {
            block.completed = true;
            block.completed_at = Some(Utc::now());
        })
    }

    fn touch_block<F: FnOnce(&mut StudyBlock)>(
        &self,
        date: NaiveDate,
        block_id: &str,
        apply: F,
    ) -> Result<()> {
        let mut plans = self.plans()?;
        let Some(plan) = plans.iter_mut().find(|p| p.date == date) else {
            return Ok(());
        };
        let Some(block) = plan.blocks.iter_mut().find(|b| b.id == block_id) else {
            return Ok(());
        };

        apply(block);
        plan.updated_at = Utc::now();
        self.prune(&mut plans);
        self.persist(&plans)
    }

    /// Preset time splits offered to callers picking a plan shape.
    pub fn suggestions(&self) -> Vec<PlanSuggestion> {
        vec![
            PlanSuggestion {
                hours: 2.0,
                allocation: Allocation { quiz_ratio: 0.5, project_ratio: 0.5 },
                description: "60m quiz, 60m project".to_string(),
            },
            PlanSuggestion {
                hours: 3.0,
                allocation: Allocation { quiz_ratio: 0.4, project_ratio: 0.6 },
                description: "70m quiz, 110m project".to_string(),
            },
            PlanSuggestion {
                hours: 4.0,
                allocation: Allocation { quiz_ratio: 0.4, project_ratio: 0.6 },
                description: "95m quiz, 145m project".to_string(),
            },
            PlanSuggestion {
                hours: 5.0,
                allocation: Allocation { quiz_ratio: 0.35, project_ratio: 0.65 },
                description: "105m quiz, 195m project".to_string(),
            },
        ]
    }

    fn prune(&self, plans: &mut Vec<DailyPlan>) {
        let cutoff = Utc::now().date_naive() - Duration::days(self.config.retention_days);
        plans.retain(|p| p.date >= cutoff);
    }

    fn persist(&self, plans: &[DailyPlan]) -> Result<()> {
        let raw = serde_json::to_string(plans)?;
        self.store.set(PLANS_KEY, &raw)
    }
}

/// "system_design" -> "System Design".
fn humanize(id: &str) -> String {
    id.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, DomainSpec, RoleSpec, SkillsTaxonomy};
    use crate::config::EngineConfig;
    use crate::engine::types::{DomainRating, RatingBook};
    use crate::engine::RATINGS_KEY;
    use crate::store::MemoryStore;

    fn domain(id: &str) -> DomainSpec {
        DomainSpec {
            id: id.to_string(),
            name: humanize(id),
            description: String::new(),
            skills: vec![],
        }
    }

    fn taxonomy() -> SkillsTaxonomy {
        SkillsTaxonomy {
            roles: vec![
                RoleSpec {
                    id: RoleId::Swe,
                    name: "Software Engineering".to_string(),
                    priority: 1,
                    domains: vec![domain("algorithms"), domain("system_design")],
                },
                RoleSpec {
                    id: RoleId::Embedded,
                    name: "Embedded/Firmware".to_string(),
                    priority: 2,
                    domains: vec![domain("firmware")],
                },
            ],
        }
    }

    fn engine(store: Arc<dyn KeyValueStore>) -> QuizEngine {
        let catalog = Catalog::from_parts(vec![], taxonomy()).unwrap();
        QuizEngine::with_seed(catalog, store, EngineConfig::default(), 1).unwrap()
    }

    fn planner(store: Arc<dyn KeyValueStore>) -> DailyPlanner {
        DailyPlanner::with_seed(store, PlannerConfig::default(), 1)
    }

    fn seed_rating(store: &dyn KeyValueStore, role: RoleId, domain: &str, mean: f64) {
        let raw = store.get(RATINGS_KEY).unwrap();
        let mut book: RatingBook = raw
            .map(|r| serde_json::from_str(&r).unwrap())
            .unwrap_or_default();
        book.entry(role).or_default().insert(
            domain.to_string(),
            DomainRating {
                mean,
                count: 1,
                last_updated: Utc::now(),
            },
        );
        store
            .set(RATINGS_KEY, &serde_json::to_string(&book).unwrap())
            .unwrap();
    }

    fn quiz_blocks(plan: &DailyPlan) -> Vec<&StudyBlock> {
        plan.blocks.iter().filter(|b| b.kind == BlockKind::Quiz).collect()
    }

    #[test]
    fn test_two_hour_even_split() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let mut planner = planner(store);

        let plan = planner.generate(&engine, 2.0, &[RoleId::Swe], Allocation::default());

        let quiz = quiz_blocks(&plan);
        assert_eq!(quiz.len(), 2);
        assert!(quiz.iter().all(|b| b.duration_min == 30));
        assert_eq!(quiz[0].title, "Quiz Block 1");

        let project: Vec<_> = plan
            .blocks
            .iter()
            .filter(|b| b.kind == BlockKind::Project)
            .collect();
        assert_eq!(project.len(), 1);
        assert_eq!(project[0].duration_min, 60);
        assert_eq!(project[0].title, "Project Work");
    }

    #[test]
    fn test_short_budget_stays_single_block() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let mut planner = planner(store);

        let plan = planner.generate(&engine, 1.0, &[RoleId::Swe], Allocation::default());

        let quiz = quiz_blocks(&plan);
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz[0].duration_min, 30);
        assert_eq!(quiz[0].title, "Adaptive Quiz");
    }

    #[test]
    fn test_small_leftover_is_dropped() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let mut planner = planner(store);

        // 75 quiz minutes -> two 30-minute blocks, 15 leftover dropped.
        let plan = planner.generate(&engine, 2.5, &[RoleId::Swe], Allocation::default());

        let quiz = quiz_blocks(&plan);
        assert_eq!(quiz.len(), 2);
        assert!(quiz.iter().all(|b| b.duration_min == 30));
    }

    #[test]
    fn test_quiz_blocks_are_capped() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let mut planner = planner(store);

        // 120 quiz minutes would fill four blocks; the cap stops at three.
        let plan = planner.generate(&engine, 4.0, &[RoleId::Swe], Allocation::default());
        assert_eq!(quiz_blocks(&plan).len(), 3);
    }

    #[test]
    fn test_quiz_blocks_target_weak_areas() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        seed_rating(store.as_ref(), RoleId::Swe, "algorithms", 2.0);
        seed_rating(store.as_ref(), RoleId::Swe, "system_design", 3.0);

        let engine = engine(store.clone());
        let mut planner = planner(store);
        let plan = planner.generate(&engine, 2.0, &[RoleId::Swe], Allocation::default());

        let quiz = quiz_blocks(&plan);
        assert_eq!(quiz[0].domain.as_deref(), Some("algorithms"));
        assert_eq!(quiz[1].domain.as_deref(), Some("system_design"));
        assert_eq!(
            quiz[1].description,
            "Target: Software Engineering - System Design"
        );
    }

    #[test]
    fn test_focus_prefers_weak_priority_over_weaker_later_role() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        seed_rating(store.as_ref(), RoleId::Swe, "algorithms", 6.9);
        seed_rating(store.as_ref(), RoleId::Swe, "system_design", 6.9);
        seed_rating(store.as_ref(), RoleId::Embedded, "firmware", 2.0);

        let engine = engine(store.clone());
        let mut planner = planner(store);
        let plan = planner.generate(
            &engine,
            2.0,
            &[RoleId::Swe, RoleId::Embedded],
            Allocation::default(),
        );
        assert_eq!(plan.focus, RoleId::Swe);
    }

    #[test]
    fn test_save_replaces_same_date() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let mut planner = planner(store);

        let first = planner.generate(&engine, 2.0, &[RoleId::Swe], Allocation::default());
        let second = planner.generate(&engine, 3.0, &[RoleId::Swe], Allocation::default());

        planner.save_plan(first).unwrap();
        planner.save_plan(second).unwrap();

        let plans = planner.plans().unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].total_hours, 3.0);
    }

    #[test]
    fn test_save_prunes_expired_plans() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let mut planner = planner(store);

        let mut old = planner.generate(&engine, 2.0, &[RoleId::Swe], Allocation::default());
        old.date = Utc::now().date_naive() - Duration::days(40);
        planner.save_plan(old).unwrap();

        let today = planner.generate(&engine, 2.0, &[RoleId::Swe], Allocation::default());
        planner.save_plan(today).unwrap();

        let plans = planner.plans().unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].date, Utc::now().date_naive());
    }

    #[test]
    fn test_todays_plan() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let mut planner = planner(store);

        assert!(planner.todays_plan().unwrap().is_none());
        let plan = planner.generate(&engine, 2.0, &[RoleId::Swe], Allocation::default());
        planner.save_plan(plan).unwrap();
        assert!(planner.todays_plan().unwrap().is_some());
    }

    #[test]
    fn test_complete_block_sets_flags() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let mut planner = planner(store);

        let plan = planner.generate(&engine, 1.0, &[RoleId::Swe], Allocation::default());
        let date = plan.date;
        let block_id = plan.blocks[0].id.clone();
        planner.save_plan(plan).unwrap();

        planner.start_block(date, &block_id).unwrap();
        planner.complete_block(date, &block_id).unwrap();

        let plan = planner.todays_plan().unwrap().unwrap();
        let block = plan.block(&block_id).unwrap();
        assert!(block.completed);
        assert!(block.started_at.is_some());
        assert!(block.completed_at.is_some());
    }

    #[test]
    fn test_block_updates_on_missing_target_are_silent() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let planner = planner(store);

        let date = Utc::now().date_naive();
        planner.start_block(date, "nope").unwrap();
        planner.complete_block(date, "nope").unwrap();
        assert!(planner.plans().unwrap().is_empty());
    }

    #[test]
    fn test_suggestions_presets() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let planner = planner(store);

        let presets = planner.suggestions();
        assert_eq!(presets.len(), 4);
        assert_eq!(presets[0].hours, 2.0);
        assert_eq!(presets[3].allocation.quiz_ratio, 0.35);
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("system_design"), "System Design");
        assert_eq!(humanize("firmware"), "Firmware");
    }
}
