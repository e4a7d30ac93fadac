use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Question, RoleId};

/// Proficiency estimate for one (role, domain) pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRating {
    /// Smoothed estimate, clamped to the configured [floor, ceiling].
    pub mean: f64,
    /// Number of graded attempts folded into `mean`.
    pub count: u32,
    pub last_updated: DateTime<Utc>,
}

impl DomainRating {
    /// State of a domain before any graded attempt.
    pub fn fresh(mean: f64) -> Self {
        Self {
            mean,
            count: 0,
            last_updated: Utc::now(),
        }
    }
}

/// Persisted rating snapshot: role -> domain -> rating.
pub type RatingBook = HashMap<RoleId, HashMap<String, DomainRating>>;

/// A graded quiz outcome, as reported by the caller.
#[derive(Debug, Clone, Copy)]
pub struct QuizOutcome {
    pub correct: bool,
    pub elapsed_secs: u32,
    /// Self-reported confidence, 1-5.
    pub confidence: u8,
}

/// One answered question. Immutable once created; the log keeps the most
/// recent entries first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub id: String,
    pub question: Question,
    pub chosen_option: usize,
    pub correct: bool,
    pub elapsed_secs: u32,
    pub confidence: u8,
    pub timestamp: DateTime<Utc>,
}

/// Aggregates over the answer history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStats {
    pub total_questions: usize,
    pub correct_answers: usize,
    /// Percentage, rounded to the nearest integer.
    pub accuracy: u32,
    /// Mean elapsed seconds, rounded to the nearest integer.
    pub average_secs: u32,
    /// Mean confidence, rounded to one decimal.
    pub average_confidence: f64,
    /// Consecutive correct answers counted back from the most recent entry.
    pub streak_count: usize,
}

/// One entry of the weak-areas report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakArea {
    pub role: RoleId,
    pub domain: String,
    pub rating: f64,
}

/// Overall progress snapshot across every role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub overall: f64,
    pub by_role: HashMap<RoleId, f64>,
    /// Size of the question catalog.
    pub total_questions: usize,
    /// Total graded attempts across all domains.
    pub questions_answered: u64,
}

/// Optional filters for reading back the answer history.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub role: Option<RoleId>,
    pub domain: Option<String>,
    pub correct: Option<bool>,
    pub limit: Option<usize>,
}

/// Rating snapshot export for backup or transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingsExport {
    pub ratings: RatingBook,
    pub export_date: DateTime<Utc>,
    pub version: String,
}
