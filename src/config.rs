//! Tunable parameters for the rating engine and the daily planner.
//!
//! Defaults match the published behavior; `from_env` allows overriding the
//! handful of knobs that are safe to tune without changing record shapes.

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

/// Parameters of the rating engine and question selector.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Exponential smoothing weight applied to each new outcome.
    pub learning_rate: f64,
    /// Lower clamp for a domain rating.
    pub rating_floor: f64,
    /// Upper clamp for a domain rating.
    pub rating_ceiling: f64,
    /// Rating assigned to a domain before any graded attempt.
    pub default_mean: f64,
    /// Ratings below this mark a role/domain as needing work.
    pub weak_threshold: f64,
    /// How many recently shown question ids are excluded from selection.
    pub recent_window: usize,
    /// Maximum retained answer-history entries (oldest evicted first).
    pub history_cap: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.2,
            rating_floor: 1.0,
            rating_ceiling: 10.0,
            default_mean: 5.0,
            weak_threshold: 7.0,
            recent_window: 10,
            history_cap: 500,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(alpha) = env_parse::<f64>("SKILLCOACH_LEARNING_RATE") {
            if alpha > 0.0 && alpha <= 1.0 {
                config.learning_rate = alpha;
            }
        }
        if let Some(cap) = env_parse::<usize>("SKILLCOACH_HISTORY_CAP") {
            if cap > 0 {
                config.history_cap = cap;
            }
        }
        config
    }
}

/// Parameters of the daily plan generator.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Quiz budgets under this many minutes stay a single block.
    pub split_threshold_min: u32,
    /// Upper bound on a single quiz block.
    pub block_cap_min: u32,
    /// Leftover quiz time at or under this is dropped, not emitted.
    pub min_leftover_min: u32,
    /// Maximum number of quiz blocks per plan.
    pub max_quiz_blocks: usize,
    /// Weak areas cycled through when splitting quiz time.
    pub weak_area_cycle: usize,
    /// Plans older than this many days are purged on every save.
    pub retention_days: i64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            split_threshold_min: 40,
            block_cap_min: 30,
            min_leftover_min: 15,
            max_quiz_blocks: 3,
            weak_area_cycle: 3,
            retention_days: 30,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(days) = env_parse::<i64>("SKILLCOACH_PLAN_RETENTION_DAYS") {
            if days > 0 {
                config.retention_days = days;
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.learning_rate, 0.2);
        assert_eq!(config.recent_window, 10);
        assert_eq!(config.history_cap, 500);
        assert_eq!(config.weak_threshold, 7.0);
    }

    #[test]
    fn test_planner_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.split_threshold_min, 40);
        assert_eq!(config.block_cap_min, 30);
        assert_eq!(config.min_leftover_min, 15);
        assert_eq!(config.max_quiz_blocks, 3);
        assert_eq!(config.retention_days, 30);
    }
}
