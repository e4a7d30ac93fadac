use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::RoleId;

/// What a plan block asks the learner to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Quiz,
    Project,
    Applications,
    Study,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Project => "project",
            Self::Applications => "applications",
            Self::Study => "study",
        }
    }
}

/// One scheduled block of a daily plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyBlock {
    pub id: String,
    pub kind: BlockKind,
    pub duration_min: u32,
    pub title: String,
    pub description: String,
    /// Targeted role, set for quiz blocks.
    pub role: Option<RoleId>,
    /// Targeted domain, set for quiz blocks.
    pub domain: Option<String>,
    pub completed: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A full day's schedule. At most one plan exists per date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlan {
    pub date: NaiveDate,
    pub total_hours: f64,
    pub blocks: Vec<StudyBlock>,
    /// Role the day's quiz work concentrates on.
    pub focus: RoleId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DailyPlan {
    pub fn block(&self, id: &str) -> Option<&StudyBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }
}

/// How available time is split between quiz and project work.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub quiz_ratio: f64,
    pub project_ratio: f64,
}

impl Default for Allocation {
    fn default() -> Self {
        Self {
            quiz_ratio: 0.5,
            project_ratio: 0.5,
        }
    }
}

/// A preset plan shape offered to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSuggestion {
    pub hours: f64,
    pub allocation: Allocation,
    pub description: String,
}
