use serde::{Deserialize, Serialize};

use super::types::{SkillStatus, SkillTier};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierRewards {
    pub foundation: u64,
    pub core: u64,
    pub advanced: u64,
    pub expert: u64,
    pub master: u64,
}

impl Default for TierRewards {
    fn default() -> Self {
        Self {
            foundation: 10,
            core: 15,
            advanced: 20,
            expert: 30,
            master: 50,
        }
    }
}

impl TierRewards {
    pub fn for_tier(&self, tier: SkillTier) -> u64 {
        match tier {
            SkillTier::Foundation => self.foundation,
            SkillTier::Core => self.core,
            SkillTier::Advanced => self.advanced,
            SkillTier::Expert => self.expert,
            SkillTier::Master => self.master,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBonuses {
    pub attempted: u64,
    pub familiar: u64,
    pub proficient: u64,
    pub mastered: u64,
}

impl Default for StatusBonuses {
    fn default() -> Self {
        Self {
            attempted: 50,
            familiar: 150,
            proficient: 300,
            mastered: 1000,
        }
    }
}

impl StatusBonuses {
    pub fn base_for(&self, status: SkillStatus) -> u64 {
        match status {
            SkillStatus::Attempted => self.attempted,
            SkillStatus::Familiar => self.familiar,
            SkillStatus::Proficient => self.proficient,
            SkillStatus::Mastered => self.mastered,
            SkillStatus::Locked | SkillStatus::Available => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointMilestone {
    pub points: u32,
    pub bonus: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardConfig {
    pub tier_base: TierRewards,
    pub incorrect_ratio: f64,
    pub speed_bonus: u64,
    pub speed_threshold_ms: u64,
    pub first_attempt_bonus: u64,
    pub point_milestones: Vec<PointMilestone>,
    pub perfect_bonus: u64,
    pub perfect_min_attempts: u32,
    pub status_bonuses: StatusBonuses,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            tier_base: TierRewards::default(),
            incorrect_ratio: 0.2,
            speed_bonus: 5,
            speed_threshold_ms: 10_000,
            first_attempt_bonus: 10,
            point_milestones: vec![
                PointMilestone { points: 50, bonus: 25 },
                PointMilestone { points: 80, bonus: 50 },
                PointMilestone { points: 100, bonus: 100 },
            ],
            perfect_bonus: 200,
            perfect_min_attempts: 10,
            status_bonuses: StatusBonuses::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionConfig {
    pub rewards: RewardConfig,
    pub recommendation_limit: usize,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            rewards: RewardConfig::default(),
            recommendation_limit: 5,
        }
    }
}

impl ProgressionConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SKILL_FORGE_SPEED_BONUS") {
            config.rewards.speed_bonus = val.parse().unwrap_or(config.rewards.speed_bonus);
        }
        if let Ok(val) = std::env::var("SKILL_FORGE_SPEED_THRESHOLD_MS") {
            config.rewards.speed_threshold_ms =
                val.parse().unwrap_or(config.rewards.speed_threshold_ms);
        }
        if let Ok(val) = std::env::var("SKILL_FORGE_FIRST_ATTEMPT_BONUS") {
            config.rewards.first_attempt_bonus =
                val.parse().unwrap_or(config.rewards.first_attempt_bonus);
        }
        if let Ok(val) = std::env::var("SKILL_FORGE_PERFECT_BONUS") {
            config.rewards.perfect_bonus = val.parse().unwrap_or(config.rewards.perfect_bonus);
        }
        if let Ok(val) = std::env::var("SKILL_FORGE_RECOMMENDATION_LIMIT") {
            config.recommendation_limit = val.parse().unwrap_or(config.recommendation_limit);
        }

        config
    }
}
