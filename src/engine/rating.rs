//! Smoothed rating update.
//!
//! Each graded outcome produces a difficulty-anchored target score; the
//! domain rating moves a fixed fraction of the way toward that target. The
//! anchor encodes difficulty; the +/-1 adjustment is deliberately constant
//! so convergence speed is the same at every tier.

use crate::catalog::Difficulty;

/// Target score for one graded outcome.
pub(crate) fn target_score(difficulty: Difficulty, correct: bool) -> f64 {
    let adjustment = if correct { 1.0 } else { -1.0 };
    difficulty.base_score() + adjustment
}

/// One exponential-smoothing step, clamped to [floor, ceiling].
pub(crate) fn smoothed_mean(current: f64, target: f64, alpha: f64, floor: f64, ceiling: f64) -> f64 {
    (current + alpha * (target - current)).clamp(floor, ceiling)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALPHA: f64 = 0.2;
    const FLOOR: f64 = 1.0;
    const CEILING: f64 = 10.0;

    #[test]
    fn test_target_scores_by_tier() {
        assert_eq!(target_score(Difficulty::Basic, true), 4.0);
        assert_eq!(target_score(Difficulty::Basic, false), 2.0);
        assert_eq!(target_score(Difficulty::Intermediate, true), 7.0);
        assert_eq!(target_score(Difficulty::Intermediate, false), 5.0);
        assert_eq!(target_score(Difficulty::Advanced, true), 9.0);
        assert_eq!(target_score(Difficulty::Advanced, false), 7.0);
    }

    #[test]
    fn test_smoothing_step_values() {
        // 5.0 toward 9.0 at alpha 0.2 moves to 5.8.
        let next = smoothed_mean(5.0, target_score(Difficulty::Advanced, true), ALPHA, FLOOR, CEILING);
        assert!((next - 5.8).abs() < 1e-12);

        // 5.0 toward 2.0 moves to 4.4.
        let next = smoothed_mean(5.0, target_score(Difficulty::Basic, false), ALPHA, FLOOR, CEILING);
        assert!((next - 4.4).abs() < 1e-12);
    }

    #[test]
    fn test_high_rating_regresses_even_on_correct_advanced() {
        // Target for a correct Advanced answer is 9, so a 10.0 rating drifts down.
        let next = smoothed_mean(10.0, target_score(Difficulty::Advanced, true), ALPHA, FLOOR, CEILING);
        assert!((next - 9.8).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(smoothed_mean(1.0, -50.0, ALPHA, FLOOR, CEILING), 1.0);
        assert_eq!(smoothed_mean(10.0, 50.0, ALPHA, FLOOR, CEILING), 10.0);
    }

    proptest! {
        #[test]
        fn prop_mean_stays_in_bounds(outcomes in proptest::collection::vec((1u8..=3, any::<bool>()), 0..200)) {
            let mut mean = 5.0;
            for (tier, correct) in outcomes {
                let difficulty = Difficulty::try_from(tier).unwrap();
                let next = smoothed_mean(mean, target_score(difficulty, correct), ALPHA, FLOOR, CEILING);
                // No single update moves the estimate by more than alpha * 9.
                prop_assert!((next - mean).abs() <= ALPHA * 9.0 + 1e-12);
                mean = next;
                prop_assert!((FLOOR..=CEILING).contains(&mean));
            }
        }
    }
}
