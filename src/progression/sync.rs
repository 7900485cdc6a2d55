//! Whole-tree re-derivation.
//!
//! Snapshot in, snapshot out: the caller hands over every node plus the
//! learner ledger values and receives a new node collection. Nodes are
//! visited in prerequisite order so each gate sees statuses from this pass,
//! which makes a second run over the output a no-op.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::attempt::apply_status_milestone;
use super::config::ProgressionConfig;
use super::mastery::{derive_status, recompute_progress};
use super::types::{
    LearnerContext, LearnerTreeProgress, Milestone, ProgressionError, SkillNode, SkillStatus,
    TreeSnapshot,
};
use super::unlock::{evaluate_unlock, LockReason};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub node_id: String,
    pub from: SkillStatus,
    pub to: SkillStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSync {
    pub nodes: Vec<SkillNode>,
    pub progress: LearnerTreeProgress,
    pub changes: Vec<StatusChange>,
    pub lock_reasons: BTreeMap<String, Vec<LockReason>>,
    pub xp_awarded: u64,
    pub new_milestones: Vec<Milestone>,
}

pub fn sync_tree(
    snapshot: TreeSnapshot,
    learner: &LearnerContext,
    config: &ProgressionConfig,
) -> Result<TreeSync, ProgressionError> {
    let TreeSnapshot { mut nodes, edges } = snapshot;

    let index = index_nodes(&nodes)?;
    for node in &nodes {
        validate_thresholds(node)?;
    }

    for edge in &edges {
        if !index.contains_key(&edge.from) {
            return Err(ProgressionError::UnknownNode(edge.from.clone()));
        }
        let Some(&target) = index.get(&edge.to) else {
            return Err(ProgressionError::UnknownNode(edge.to.clone()));
        };
        nodes[target].prerequisites.push(edge.from.clone());
    }

    for node in &mut nodes {
        let mut seen = HashSet::new();
        node.prerequisites.retain(|p| seen.insert(p.clone()));
        for prerequisite in &node.prerequisites {
            if !index.contains_key(prerequisite) {
                return Err(ProgressionError::UnknownPrerequisite {
                    node: node.id.clone(),
                    prerequisite: prerequisite.clone(),
                });
            }
        }
    }

    let order = topological_order(&nodes, &index)?;

    let mut statuses: HashMap<String, SkillStatus> = HashMap::with_capacity(nodes.len());
    let mut changes = Vec::new();
    let mut lock_reasons = BTreeMap::new();
    let mut new_milestones = Vec::new();
    let mut xp_awarded = 0u64;

    for idx in order {
        let node = &nodes[idx];
        let mut progress = recompute_progress(&node.progress);
        let decision = evaluate_unlock(node, &node.prerequisites, &statuses, learner)?;
        let status = derive_status(decision.unlocked, &progress, &node.thresholds);

        let xp_before = progress.xp_earned;
        if let Some(milestone) = apply_status_milestone(
            &node.id,
            node.tier,
            node.status,
            status,
            &mut progress,
            learner.as_of,
            &config.rewards,
        ) {
            new_milestones.push(milestone);
        }
        xp_awarded += progress.xp_earned - xp_before;

        if status != node.status {
            changes.push(StatusChange {
                node_id: node.id.clone(),
                from: node.status,
                to: status,
            });
        }
        if !decision.unlocked {
            lock_reasons.insert(node.id.clone(), decision.reasons);
        }

        statuses.insert(node.id.clone(), status);
        let node = &mut nodes[idx];
        node.progress = progress;
        node.status = status;
    }

    let progress = summarize(&nodes, config.recommendation_limit);

    tracing::info!(
        nodes = nodes.len(),
        changed = changes.len(),
        mastered = progress.nodes_mastered,
        xp_awarded,
        "skill tree synchronized"
    );

    Ok(TreeSync {
        nodes,
        progress,
        changes,
        lock_reasons,
        xp_awarded,
        new_milestones,
    })
}

fn index_nodes(nodes: &[SkillNode]) -> Result<HashMap<String, usize>, ProgressionError> {
    let mut index = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        if index.insert(node.id.clone(), i).is_some() {
            return Err(ProgressionError::DuplicateNode(node.id.clone()));
        }
    }
    Ok(index)
}

fn validate_thresholds(node: &SkillNode) -> Result<(), ProgressionError> {
    let t = &node.thresholds;
    if t.familiarity_questions > t.mastery_questions {
        return Err(ProgressionError::InvalidThresholds {
            node: node.id.clone(),
            reason: format!(
                "familiarity minimum {} exceeds mastery minimum {}",
                t.familiarity_questions, t.mastery_questions
            ),
        });
    }
    if !t.ability_threshold.is_finite() {
        return Err(ProgressionError::InvalidThresholds {
            node: node.id.clone(),
            reason: "ability threshold must be finite".to_string(),
        });
    }
    Ok(())
}

/// Kahn's algorithm; among ready nodes the earliest in input order goes first.
fn topological_order(
    nodes: &[SkillNode],
    index: &HashMap<String, usize>,
) -> Result<Vec<usize>, ProgressionError> {
    let mut in_degree = vec![0usize; nodes.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];

    for (i, node) in nodes.iter().enumerate() {
        for prerequisite in &node.prerequisites {
            let from = index[prerequisite];
            dependents[from].push(i);
            in_degree[i] += 1;
        }
    }

    let mut ready: BTreeSet<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(nodes.len());

    while let Some(i) = ready.pop_first() {
        order.push(i);
        for &dependent in &dependents[i] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() < nodes.len() {
        let cyclic = (0..nodes.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| nodes[i].id.clone())
            .collect();
        return Err(ProgressionError::CyclicPrerequisites(cyclic));
    }

    Ok(order)
}

/// Aggregate view, derived purely from the node collection.
pub fn summarize(nodes: &[SkillNode], recommendation_limit: usize) -> LearnerTreeProgress {
    let mut status_counts: BTreeMap<SkillStatus, usize> =
        SkillStatus::all().iter().map(|s| (*s, 0)).collect();
    for node in nodes {
        *status_counts.entry(node.status).or_insert(0) += 1;
    }

    let total_nodes = nodes.len();
    let nodes_mastered = status_counts[&SkillStatus::Mastered];
    let completion_pct = if total_nodes == 0 {
        0.0
    } else {
        nodes_mastered as f64 / total_nodes as f64 * 100.0
    };

    LearnerTreeProgress {
        total_nodes,
        nodes_unlocked: nodes.iter().filter(|n| n.status.is_unlocked()).count(),
        nodes_attempted: nodes.iter().filter(|n| n.progress.attempts > 0).count(),
        nodes_mastered,
        status_counts,
        total_xp: nodes.iter().map(|n| n.progress.xp_earned).sum(),
        completion_pct,
        recommended_next: recommend_next(nodes, recommendation_limit),
        milestone_log: nodes
            .iter()
            .flat_map(|n| n.progress.milestones.iter().cloned())
            .collect(),
    }
}

/// In-progress nodes by mastery points (highest first), then available
/// nodes by tier (lowest first). Input order breaks ties.
pub fn recommend_next(nodes: &[SkillNode], limit: usize) -> Vec<String> {
    let mut in_progress: Vec<&SkillNode> =
        nodes.iter().filter(|n| n.status.is_in_progress()).collect();
    in_progress.sort_by(|a, b| b.progress.mastery_points.cmp(&a.progress.mastery_points));

    let mut available: Vec<&SkillNode> = nodes
        .iter()
        .filter(|n| n.status == SkillStatus::Available)
        .collect();
    available.sort_by_key(|n| n.tier.rank());

    in_progress
        .into_iter()
        .chain(available)
        .take(limit)
        .map(|n| n.id.clone())
        .collect()
}
