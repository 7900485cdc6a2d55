//! Mastery points and status derivation.
//!
//! Both are pure functions of the attempt aggregates, the latest estimator
//! output and the unlock verdict. Nothing here is stored independently of
//! its inputs; callers recompute on every sync.

use super::types::{AbilityEstimate, SkillProgress, SkillStatus, UnlockThresholds};

pub const FAMILIAR_ACCURACY: f64 = 70.0;
pub const PROFICIENT_ACCURACY: f64 = 90.0;
pub const PROFICIENT_PROBABILITY: f64 = 0.80;
pub const MASTERY_PROBABILITY: f64 = 0.95;

pub fn accuracy_pct(correct: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        return 0.0;
    }
    (correct.min(attempts) as f64 * 100.0) / attempts as f64
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Normalised 0-100 mastery score.
pub fn mastery_points(attempts: u32, accuracy: f64, mastery_probability: f64) -> u32 {
    if attempts == 0 {
        return 0;
    }
    let accuracy = if accuracy.is_finite() {
        accuracy.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let p = clamp_probability(mastery_probability);

    if accuracy < FAMILIAR_ACCURACY {
        (accuracy / FAMILIAR_ACCURACY * 49.0).floor() as u32
    } else if accuracy < PROFICIENT_ACCURACY {
        50 + ((accuracy - FAMILIAR_ACCURACY) / 20.0 * 29.0).floor() as u32
    } else if p < MASTERY_PROBABILITY {
        80 + (p / MASTERY_PROBABILITY * 19.0).floor() as u32
    } else {
        100
    }
}

/// Status for a node whose unlock verdict is already known.
pub fn derive_status(
    unlocked: bool,
    progress: &SkillProgress,
    thresholds: &UnlockThresholds,
) -> SkillStatus {
    if !unlocked {
        return SkillStatus::Locked;
    }

    let attempts = progress.attempts;
    let accuracy = progress.accuracy;
    let p = clamp_probability(progress.mastery_probability);
    let enough_for_mastery = attempts >= thresholds.mastery_questions;
    let ability_ok = progress
        .ability_estimate
        .is_some_and(|ability| ability >= thresholds.ability_threshold);

    if enough_for_mastery && p >= MASTERY_PROBABILITY && ability_ok {
        SkillStatus::Mastered
    } else if enough_for_mastery && accuracy >= PROFICIENT_ACCURACY && p >= PROFICIENT_PROBABILITY
    {
        SkillStatus::Proficient
    } else if attempts >= thresholds.familiarity_questions && accuracy >= FAMILIAR_ACCURACY {
        SkillStatus::Familiar
    } else if attempts >= thresholds.familiarity_questions {
        SkillStatus::Attempted
    } else {
        SkillStatus::Available
    }
}

/// Refreshes the derived fields (accuracy, points, peak) from the counters.
pub fn recompute_progress(progress: &SkillProgress) -> SkillProgress {
    let mut next = progress.clone();
    next.correct = next.correct.min(next.attempts);
    next.accuracy = accuracy_pct(next.correct, next.attempts);
    next.mastery_probability = clamp_probability(next.mastery_probability);
    next.mastery_points = mastery_points(next.attempts, next.accuracy, next.mastery_probability);
    next.peak_mastery_points = next.peak_mastery_points.max(next.mastery_points);
    next
}

pub fn apply_estimate(progress: &mut SkillProgress, estimate: &AbilityEstimate) {
    if estimate.ability.is_some() {
        progress.ability_estimate = estimate.ability;
    }
    if estimate.standard_error.is_some() {
        progress.standard_error = estimate.standard_error;
    }
    progress.mastery_probability = clamp_probability(estimate.mastery_probability);
}
