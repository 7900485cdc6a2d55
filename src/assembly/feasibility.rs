use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{ItemPoolEntry, TopicTarget};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityReport {
    pub feasible: bool,
    pub deficits: Vec<String>,
}

/// Number of pool items tagging each target topic.
pub fn topic_supply(targets: &[TopicTarget], pool: &[ItemPoolEntry]) -> HashMap<String, usize> {
    let mut supply: HashMap<String, usize> = targets
        .iter()
        .map(|t| (t.topic_id.clone(), 0))
        .collect();

    for item in pool {
        for topic in &item.topics {
            if let Some(count) = supply.get_mut(topic) {
                *count += 1;
            }
        }
    }

    supply
}

pub fn check_feasibility(targets: &[TopicTarget], pool: &[ItemPoolEntry]) -> FeasibilityReport {
    let supply = topic_supply(targets, pool);
    let length: usize = targets.iter().map(|t| t.required).sum();

    let mut deficits = Vec::new();
    for target in targets {
        let have = supply.get(&target.topic_id).copied().unwrap_or(0);
        if target.required > have {
            deficits.push(format!(
                "{}: need {}, have {}",
                target.topic_id, target.required, have
            ));
        }
    }
    if pool.len() < length {
        deficits.push(format!("pool: need {}, have {}", length, pool.len()));
    }

    FeasibilityReport {
        feasible: deficits.is_empty(),
        deficits,
    }
}
