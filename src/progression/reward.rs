//! XP economics for attempts and status transitions.

use serde::{Deserialize, Serialize};

use super::config::RewardConfig;
use super::types::{AttemptOutcome, SkillProgress, SkillStatus, SkillTier};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardBreakdown {
    pub base: u64,
    pub speed_bonus: u64,
    pub first_attempt_bonus: u64,
    /// (points threshold, bonus) for every threshold crossed for the first time.
    pub point_milestones: Vec<(u32, u64)>,
    pub perfect_bonus: u64,
}

impl RewardBreakdown {
    pub fn total(&self) -> u64 {
        self.base
            + self.speed_bonus
            + self.first_attempt_bonus
            + self.point_milestones.iter().map(|(_, xp)| xp).sum::<u64>()
            + self.perfect_bonus
    }
}

/// XP for one attempt. `before` is the progress prior to the attempt and
/// `after` the recomputed progress including it.
pub fn attempt_reward(
    tier: SkillTier,
    outcome: &AttemptOutcome,
    before: &SkillProgress,
    after: &SkillProgress,
    config: &RewardConfig,
) -> RewardBreakdown {
    let tier_base = config.tier_base.for_tier(tier);
    let base = if outcome.correct {
        tier_base
    } else {
        (tier_base as f64 * config.incorrect_ratio.clamp(0.0, 1.0)).floor() as u64
    };

    let speed_bonus = if outcome.correct && outcome.response_time_ms < config.speed_threshold_ms {
        config.speed_bonus
    } else {
        0
    };

    let first_attempt_bonus = if before.attempts == 0 {
        config.first_attempt_bonus
    } else {
        0
    };

    let point_milestones = config
        .point_milestones
        .iter()
        .filter(|m| before.peak_mastery_points < m.points && after.mastery_points >= m.points)
        .map(|m| (m.points, m.bonus))
        .collect();

    let perfect = after.attempts >= config.perfect_min_attempts
        && after.correct == after.attempts
        && after.mastery_points == 100
        && !before.perfect_bonus_awarded;
    let perfect_bonus = if perfect { config.perfect_bonus } else { 0 };

    RewardBreakdown {
        base,
        speed_bonus,
        first_attempt_bonus,
        point_milestones,
        perfect_bonus,
    }
}

/// Bonus for reaching `new` from `old`; zero for lateral or backward moves.
pub fn status_milestone_bonus(
    old: SkillStatus,
    new: SkillStatus,
    tier: SkillTier,
    config: &RewardConfig,
) -> u64 {
    if new <= old {
        return 0;
    }
    let base = config.status_bonuses.base_for(new) as f64;
    (base * tier.reward_multiplier()).round() as u64
}
