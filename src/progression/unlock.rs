use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{LearnerContext, ProgressionError, SkillNode, SkillStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "reason")]
pub enum LockReason {
    #[serde(rename_all = "camelCase")]
    InsufficientXp { required: u64, actual: u64 },
    #[serde(rename_all = "camelCase")]
    LevelTooLow { required: u32, actual: u32 },
    #[serde(rename_all = "camelCase")]
    PrerequisiteNotMastered { prerequisite: String, status: SkillStatus },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockDecision {
    pub unlocked: bool,
    pub reasons: Vec<LockReason>,
}

/// XP, level and prerequisite-mastery gate. Every failing condition is
/// reported; any one of them keeps the node locked.
pub fn evaluate_unlock(
    node: &SkillNode,
    prerequisites: &[String],
    statuses: &HashMap<String, SkillStatus>,
    learner: &LearnerContext,
) -> Result<UnlockDecision, ProgressionError> {
    let mut reasons = Vec::new();

    if learner.total_xp < node.thresholds.required_xp {
        reasons.push(LockReason::InsufficientXp {
            required: node.thresholds.required_xp,
            actual: learner.total_xp,
        });
    }

    let min_level = node.tier.min_level();
    if learner.level < min_level {
        reasons.push(LockReason::LevelTooLow {
            required: min_level,
            actual: learner.level,
        });
    }

    for prerequisite in prerequisites {
        let status = statuses.get(prerequisite).copied().ok_or_else(|| {
            ProgressionError::UnknownPrerequisite {
                node: node.id.clone(),
                prerequisite: prerequisite.clone(),
            }
        })?;
        if status != SkillStatus::Mastered {
            reasons.push(LockReason::PrerequisiteNotMastered {
                prerequisite: prerequisite.clone(),
                status,
            });
        }
    }

    Ok(UnlockDecision {
        unlocked: reasons.is_empty(),
        reasons,
    })
}
