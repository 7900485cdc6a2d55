//! Skill mastery progression.
//!
//! Status is recomputed from inputs on every sync rather than event-sourced,
//! so a node whose prerequisite loses MASTERED goes back to LOCKED. Reward
//! bookkeeping (peak points, highest rewarded status, perfect flag) only
//! moves forward, so bonuses are never paid twice.

pub mod attempt;
pub mod config;
pub mod mastery;
pub mod reward;
pub mod sync;
pub mod types;
pub mod unlock;

pub use attempt::{record_attempt, AttemptResult};
pub use config::{ProgressionConfig, RewardConfig};
pub use mastery::{derive_status, mastery_points};
pub use reward::{attempt_reward, status_milestone_bonus, RewardBreakdown};
pub use sync::{recommend_next, summarize, sync_tree, StatusChange, TreeSync};
pub use types::{
    AbilityEstimate, AttemptOutcome, LearnerContext, LearnerTreeProgress, Milestone,
    MilestoneKind, PrerequisiteEdge, ProgressionError, SkillNode, SkillProgress, SkillStatus,
    SkillTier, TreeSnapshot, UnlockThresholds,
};
pub use unlock::{evaluate_unlock, LockReason, UnlockDecision};
