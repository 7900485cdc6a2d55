use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::RewardConfig;
use super::mastery::{apply_estimate, derive_status, recompute_progress};
use super::reward::{attempt_reward, status_milestone_bonus, RewardBreakdown};
use super::types::{
    AbilityEstimate, AttemptOutcome, Milestone, MilestoneKind, SkillNode, SkillProgress,
    SkillStatus, SkillTier,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub node: SkillNode,
    pub previous_status: SkillStatus,
    pub status_changed: bool,
    pub xp_earned: u64,
    pub reward: RewardBreakdown,
    pub status_bonus: u64,
    pub milestones: Vec<Milestone>,
}

/// Awards the status milestone for `old -> new` unless that status (or a
/// higher one) was already rewarded for this node.
pub(crate) fn apply_status_milestone(
    node_id: &str,
    tier: SkillTier,
    old: SkillStatus,
    new: SkillStatus,
    progress: &mut SkillProgress,
    at: DateTime<Utc>,
    config: &RewardConfig,
) -> Option<Milestone> {
    if new <= old || new <= progress.highest_rewarded_status {
        return None;
    }
    let xp = status_milestone_bonus(old.max(progress.highest_rewarded_status), new, tier, config);
    progress.highest_rewarded_status = new;
    if xp == 0 {
        return None;
    }

    progress.xp_earned += xp;
    let milestone = Milestone {
        node_id: node_id.to_string(),
        kind: MilestoneKind::Status(new),
        xp,
        achieved_at: at,
    };
    progress.milestones.push(milestone.clone());
    Some(milestone)
}

/// Single-node update for one answered question. The unlock verdict is the
/// one carried by the node's current status; the tree synchronizer is
/// responsible for re-evaluating the gate. Persisting the result and
/// serialising writes per learner is the caller's job.
pub fn record_attempt(
    node: &SkillNode,
    outcome: &AttemptOutcome,
    estimate: &AbilityEstimate,
    config: &RewardConfig,
) -> AttemptResult {
    let before = &node.progress;

    let mut progress = before.clone();
    progress.attempts = progress.attempts.saturating_add(1);
    if outcome.correct {
        progress.correct = progress.correct.saturating_add(1);
    }
    progress.study_time_ms = progress.study_time_ms.saturating_add(outcome.response_time_ms);
    if outcome.new_session || before.session_count == 0 {
        progress.session_count = progress.session_count.saturating_add(1);
    }
    progress.last_attempt_at = Some(outcome.answered_at);
    apply_estimate(&mut progress, estimate);

    let mut progress = recompute_progress(&progress);
    let reward = attempt_reward(node.tier, outcome, before, &progress, config);

    let mut milestones = Vec::new();
    for (points, xp) in &reward.point_milestones {
        milestones.push(Milestone {
            node_id: node.id.clone(),
            kind: MilestoneKind::Points(*points),
            xp: *xp,
            achieved_at: outcome.answered_at,
        });
    }
    if reward.perfect_bonus > 0 {
        progress.perfect_bonus_awarded = true;
        milestones.push(Milestone {
            node_id: node.id.clone(),
            kind: MilestoneKind::Perfect,
            xp: reward.perfect_bonus,
            achieved_at: outcome.answered_at,
        });
    }
    progress.milestones.extend(milestones.iter().cloned());
    progress.xp_earned = progress.xp_earned.saturating_add(reward.total());

    let unlocked = node.status.is_unlocked();
    let status = derive_status(unlocked, &progress, &node.thresholds);
    let xp_before_status = progress.xp_earned;
    if let Some(milestone) = apply_status_milestone(
        &node.id,
        node.tier,
        node.status,
        status,
        &mut progress,
        outcome.answered_at,
        config,
    ) {
        milestones.push(milestone);
    }
    let status_bonus = progress.xp_earned - xp_before_status;

    if status != node.status {
        tracing::debug!(
            node = %node.id,
            from = node.status.as_str(),
            to = status.as_str(),
            "skill status changed"
        );
    }

    let mut updated = node.clone();
    updated.progress = progress;
    updated.status = status;

    AttemptResult {
        node: updated,
        previous_status: node.status,
        status_changed: status != node.status,
        xp_earned: reward.total() + status_bonus,
        reward,
        status_bonus,
        milestones,
    }
}
