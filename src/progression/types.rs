use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum SkillTier {
    #[default]
    Foundation,
    Core,
    Advanced,
    Expert,
    Master,
}

impl SkillTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Foundation => "FOUNDATION",
            Self::Core => "CORE",
            Self::Advanced => "ADVANCED",
            Self::Expert => "EXPERT",
            Self::Master => "MASTER",
        }
    }

    /// 1-based position in the tier ladder.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Foundation => 1,
            Self::Core => 2,
            Self::Advanced => 3,
            Self::Expert => 4,
            Self::Master => 5,
        }
    }

    pub fn min_level(&self) -> u32 {
        match self {
            Self::Foundation => 1,
            Self::Core => 3,
            Self::Advanced => 8,
            Self::Expert => 15,
            Self::Master => 25,
        }
    }

    pub fn reward_multiplier(&self) -> f64 {
        match self {
            Self::Foundation => 1.0,
            Self::Core => 1.5,
            Self::Advanced => 2.0,
            Self::Expert => 2.5,
            Self::Master => 3.0,
        }
    }
}

/// Ordered: every variant is strictly more advanced than the ones above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum SkillStatus {
    #[default]
    Locked,
    Available,
    Attempted,
    Familiar,
    Proficient,
    Mastered,
}

impl SkillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "LOCKED",
            Self::Available => "AVAILABLE",
            Self::Attempted => "ATTEMPTED",
            Self::Familiar => "FAMILIAR",
            Self::Proficient => "PROFICIENT",
            Self::Mastered => "MASTERED",
        }
    }

    pub fn is_unlocked(&self) -> bool {
        *self != Self::Locked
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Attempted | Self::Familiar | Self::Proficient)
    }

    pub fn all() -> &'static [SkillStatus] {
        &[
            Self::Locked,
            Self::Available,
            Self::Attempted,
            Self::Familiar,
            Self::Proficient,
            Self::Mastered,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockThresholds {
    pub required_xp: u64,
    pub familiarity_questions: u32,
    pub mastery_questions: u32,
    pub ability_threshold: f64,
}

impl Default for UnlockThresholds {
    fn default() -> Self {
        Self {
            required_xp: 0,
            familiarity_questions: 3,
            mastery_questions: 10,
            ability_threshold: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "type", content = "value")]
pub enum MilestoneKind {
    Status(SkillStatus),
    Points(u32),
    Perfect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub node_id: String,
    pub kind: MilestoneKind,
    pub xp: u64,
    pub achieved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillProgress {
    pub attempts: u32,
    pub correct: u32,
    /// Percentage, 0-100.
    pub accuracy: f64,
    pub ability_estimate: Option<f64>,
    pub standard_error: Option<f64>,
    pub mastery_probability: f64,
    pub xp_earned: u64,
    pub mastery_points: u32,
    pub study_time_ms: u64,
    pub session_count: u32,
    pub peak_mastery_points: u32,
    pub highest_rewarded_status: SkillStatus,
    pub perfect_bonus_awarded: bool,
    pub milestones: Vec<Milestone>,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillNode {
    pub id: String,
    pub objective_id: String,
    #[serde(default)]
    pub tier: SkillTier,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub thresholds: UnlockThresholds,
    #[serde(default)]
    pub status: SkillStatus,
    #[serde(default)]
    pub progress: SkillProgress,
}

impl SkillNode {
    pub fn new(id: impl Into<String>, objective_id: impl Into<String>, tier: SkillTier) -> Self {
        Self {
            id: id.into(),
            objective_id: objective_id.into(),
            tier,
            prerequisites: Vec::new(),
            thresholds: UnlockThresholds::default(),
            status: SkillStatus::Locked,
            progress: SkillProgress::default(),
        }
    }

    pub fn with_prerequisites<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites = prerequisites.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_thresholds(mut self, thresholds: UnlockThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

/// `from` must be mastered before `to` unlocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSnapshot {
    pub nodes: Vec<SkillNode>,
    #[serde(default)]
    pub edges: Vec<PrerequisiteEdge>,
}

/// Values supplied by the gamification ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerContext {
    pub level: u32,
    pub total_xp: u64,
    pub as_of: DateTime<Utc>,
}

/// Output of the external ability estimator for one node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityEstimate {
    pub ability: Option<f64>,
    pub standard_error: Option<f64>,
    pub mastery_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutcome {
    pub correct: bool,
    pub response_time_ms: u64,
    pub answered_at: DateTime<Utc>,
    #[serde(default)]
    pub new_session: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerTreeProgress {
    pub total_nodes: usize,
    pub nodes_unlocked: usize,
    pub nodes_attempted: usize,
    pub nodes_mastered: usize,
    pub status_counts: BTreeMap<SkillStatus, usize>,
    pub total_xp: u64,
    pub completion_pct: f64,
    pub recommended_next: Vec<String>,
    pub milestone_log: Vec<Milestone>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProgressionError {
    #[error("duplicate skill node {0}")]
    DuplicateNode(String),
    #[error("node {node} references unknown prerequisite {prerequisite}")]
    UnknownPrerequisite { node: String, prerequisite: String },
    #[error("edge references unknown node {0}")]
    UnknownNode(String),
    #[error("prerequisite cycle through nodes: {}", .0.join(", "))]
    CyclicPrerequisites(Vec<String>),
    #[error("invalid thresholds on node {node}: {reason}")]
    InvalidThresholds { node: String, reason: String },
}
