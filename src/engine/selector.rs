//! Adaptive question selection.
//!
//! Selection targets the weakest rated domain, scanned in caller priority
//! order: a priority role whose weakest domain is already below the weak
//! threshold wins outright, so earlier priorities are never starved by a
//! globally weaker role further down the list.
//!
//! Matching relaxes in stages rather than failing: exact tier first, then
//! any tier, then any domain of the role, then a shortened repeat window
//! for small pools, and finally the full (role, domain) pool.

use std::collections::VecDeque;

use rand::Rng;

use crate::catalog::{Difficulty, Question, RoleId};

use super::QuizEngine;

/// Sliding window of recently served question ids.
///
/// Pushing an id that is already present is a no-op: the id keeps its
/// original position and is still the first evicted once the cap is
/// reached. Repeat picks do not refresh recency.
#[derive(Debug, Clone)]
pub struct RecentWindow {
    ids: VecDeque<String>,
    cap: usize,
}

impl RecentWindow {
    pub fn new(cap: usize) -> Self {
        Self {
            ids: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|x| x == id)
    }

    pub fn push(&mut self, id: &str) {
        if self.contains(id) {
            return;
        }
        self.ids.push_back(id.to_string());
        while self.ids.len() > self.cap {
            self.ids.pop_front();
        }
    }

    /// Drops the oldest ids until at most `keep` remain. Used when a small
    /// question pool would otherwise be exhausted by its own repeat window.
    pub fn shrink_to(&mut self, keep: usize) {
        while self.ids.len() > keep {
            self.ids.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn filter_questions<'a>(
    questions: &'a [Question],
    role: RoleId,
    domain: Option<&str>,
    difficulty: Option<Difficulty>,
    recent: Option<&RecentWindow>,
) -> Vec<&'a Question> {
    questions
        .iter()
        .filter(|q| q.role == role)
        .filter(|q| domain.map_or(true, |d| q.domain == d))
        .filter(|q| difficulty.map_or(true, |t| q.difficulty == t))
        .filter(|q| recent.map_or(true, |w| !w.contains(&q.id)))
        .collect()
}

/// Window size a pool of the given size can sustain without starving the
/// selector; `usize::MAX` means no shrink is needed.
fn sustainable_window(pool: usize) -> usize {
    if pool <= 3 {
        1
    } else if pool <= 5 {
        2
    } else {
        usize::MAX
    }
}

impl QuizEngine {
    /// Picks the next adaptive question for the given role priorities.
    ///
    /// Returns `None` when the catalog or taxonomy is empty, or when the
    /// targeted role has no questions at all.
    pub fn select_next(&mut self, priorities: &[RoleId]) -> Option<Question> {
        if self.catalog.questions().is_empty() || self.catalog.taxonomy().is_empty() {
            return None;
        }

        let mut target: Option<(RoleId, String)> = None;
        let mut lowest = f64::INFINITY;
        for &role in priorities {
            let Some(spec) = self.catalog.taxonomy().role(role) else {
                continue;
            };
            for d in &spec.domains {
                let mean = self.rating(role, &d.id).mean;
                if mean < lowest {
                    lowest = mean;
                    target = Some((role, d.id.clone()));
                }
            }
            // A priority role that is already weak ends the scan: later
            // roles cannot displace it no matter how low they rate.
            if lowest < self.config.weak_threshold
                && target.as_ref().is_some_and(|(r, _)| *r == role)
            {
                break;
            }
        }

        let (role, domain) = match target {
            Some(t) => t,
            None => {
                let (r, d) = self.catalog.taxonomy().pairs().next()?;
                (r, d.id.clone())
            }
        };
        let difficulty = Difficulty::for_mean(self.rating(role, &domain).mean);

        let choice = self.pick(role, &domain, Some(difficulty))?;
        tracing::debug!(
            question = %choice.id,
            role = role.as_str(),
            domain = %domain,
            tier = difficulty.label(),
            "adaptive question selected"
        );
        Some(choice)
    }

    /// Picks a question for free practice in a role, optionally pinned to
    /// one domain. Difficulty follows the domain rating when a domain is
    /// pinned, but never at the cost of returning nothing.
    pub fn select_for_practice(&mut self, role: RoleId, domain: Option<&str>) -> Option<Question> {
        let questions = self.catalog.questions();
        let mut candidates = filter_questions(questions, role, domain, None, Some(&self.recent));
        if candidates.is_empty() {
            candidates = filter_questions(questions, role, domain, None, None);
        }

        if let Some(domain) = domain {
            let keep = sustainable_window(self.catalog.pool_size(role, domain));
            if keep < self.recent.len() {
                self.recent.shrink_to(keep);
                candidates =
                    filter_questions(questions, role, Some(domain), None, Some(&self.recent));
                if candidates.is_empty() {
                    candidates = filter_questions(questions, role, Some(domain), None, None);
                }
            }

            let tier = Difficulty::for_mean(self.rating(role, domain).mean);
            let narrowed: Vec<&Question> = candidates
                .iter()
                .copied()
                .filter(|q| q.difficulty == tier)
                .collect();
            if !narrowed.is_empty() {
                candidates = narrowed;
            }
        }

        if candidates.is_empty() {
            return None;
        }
        let choice = candidates[self.rng.gen_range(0..candidates.len())].clone();
        self.recent.push(&choice.id);
        Some(choice)
    }

    /// Relaxation ladder over the (role, domain) target, ending with a
    /// random pick from whatever stage first yields candidates.
    fn pick(&mut self, role: RoleId, domain: &str, difficulty: Option<Difficulty>) -> Option<Question> {
        let questions = self.catalog.questions();

        let mut candidates =
            filter_questions(questions, role, Some(domain), difficulty, Some(&self.recent));
        if candidates.is_empty() {
            candidates = filter_questions(questions, role, Some(domain), None, Some(&self.recent));
        }
        if candidates.is_empty() {
            candidates = filter_questions(questions, role, None, None, Some(&self.recent));
        }
        if candidates.is_empty() {
            let keep = sustainable_window(self.catalog.pool_size(role, domain));
            if keep < self.recent.len() {
                // Retry at the original strictness with the shorter window.
                self.recent.shrink_to(keep);
                candidates =
                    filter_questions(questions, role, Some(domain), difficulty, Some(&self.recent));
            }
        }
        if candidates.is_empty() {
            // Last resort: allow repeats rather than stalling the session.
            candidates = filter_questions(questions, role, Some(domain), None, None);
        }
        if candidates.is_empty() {
            return None;
        }

        let choice = candidates[self.rng.gen_range(0..candidates.len())].clone();
        self.recent.push(&choice.id);
        Some(choice)
    }
}
