//! Greedy deficit-first item selection.
//!
//! At each step the topic furthest below its target is served first. This is
//! a heuristic: with heavily overlapping tags a later topic can end up short
//! even when some other assignment would have satisfied every target.

use std::collections::HashSet;

use super::rng::SelectionRng;
use super::types::{ItemPoolEntry, TopicTarget};

/// Returns `min(length, distinct pool ids)` distinct item ids in pick order.
pub fn select_items<R: SelectionRng>(
    pool: &[ItemPoolEntry],
    targets: &[TopicTarget],
    length: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut seen = HashSet::with_capacity(pool.len());
    let candidates: Vec<&ItemPoolEntry> = pool
        .iter()
        .filter(|item| seen.insert(item.id.as_str()))
        .collect();

    let wanted = length.min(candidates.len());
    let mut used = vec![false; candidates.len()];
    let mut delivered = vec![0usize; targets.len()];
    let mut selected = Vec::with_capacity(wanted);

    while selected.len() < wanted {
        let mut open: Vec<(usize, usize)> = targets
            .iter()
            .enumerate()
            .filter(|(i, t)| t.required > delivered[*i])
            .map(|(i, t)| (i, t.required - delivered[i]))
            .collect();
        // Stable, so equal deficits keep target order.
        open.sort_by(|a, b| b.1.cmp(&a.1));

        let mut pick = None;
        for (target_idx, _) in open {
            let topic = targets[target_idx].topic_id.as_str();
            let matching: Vec<usize> = (0..candidates.len())
                .filter(|&i| !used[i] && candidates[i].covers(topic))
                .collect();
            if !matching.is_empty() {
                pick = Some(matching[rng.pick_index(matching.len())]);
                break;
            }
        }

        let chosen = match pick {
            Some(idx) => idx,
            None => {
                let unused: Vec<usize> = (0..candidates.len()).filter(|&i| !used[i]).collect();
                if unused.is_empty() {
                    break;
                }
                unused[rng.pick_index(unused.len())]
            }
        };

        used[chosen] = true;
        let item = candidates[chosen];
        for (i, target) in targets.iter().enumerate() {
            if item.covers(&target.topic_id) {
                delivered[i] += 1;
            }
        }
        selected.push(item.id.clone());
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::rng::LehmerRng;
    use crate::assembly::types::ItemStatus;

    struct FixedSequence {
        values: Vec<f64>,
        cursor: usize,
    }

    impl SelectionRng for FixedSequence {
        fn next_unit(&mut self) -> f64 {
            let v = self.values[self.cursor % self.values.len()];
            self.cursor += 1;
            v
        }
    }

    fn target(topic: &str, required: usize) -> TopicTarget {
        TopicTarget {
            topic_id: topic.to_string(),
            required,
        }
    }

    fn item(id: &str, topics: &[&str]) -> ItemPoolEntry {
        ItemPoolEntry::new(id, topics.iter().copied(), ItemStatus::Published)
    }

    #[test]
    fn test_serves_largest_deficit_first() {
        let pool = vec![item("a1", &["A"]), item("b1", &["B"]), item("b2", &["B"])];
        let targets = vec![target("A", 1), target("B", 2)];
        let mut rng = FixedSequence {
            values: vec![0.0],
            cursor: 0,
        };

        let picked = select_items(&pool, &targets, 3, &mut rng);
        // B (deficit 2) first, then A and B tie at 1 and A wins by order
        assert_eq!(picked, vec!["b1", "a1", "b2"]);
    }

    #[test]
    fn test_fixed_sequence_drives_choice() {
        let pool = vec![item("a1", &["A"]), item("a2", &["A"]), item("a3", &["A"])];
        let targets = vec![target("A", 2)];
        let mut rng = FixedSequence {
            values: vec![0.99, 0.0],
            cursor: 0,
        };

        let picked = select_items(&pool, &targets, 2, &mut rng);
        assert_eq!(picked, vec!["a3", "a1"]);
    }

    #[test]
    fn test_fills_from_any_item_when_targets_met() {
        let pool = vec![item("a1", &["A"]), item("x1", &["X"]), item("x2", &["X"])];
        let targets = vec![target("A", 1), target("B", 1)];
        let mut rng = LehmerRng::new(3);

        let picked = select_items(&pool, &targets, 2, &mut rng);
        assert_eq!(picked.len(), 2);
        assert!(picked.contains(&"a1".to_string()));
    }

    #[test]
    fn test_never_duplicates_and_caps_at_pool_size() {
        let pool = vec![item("a1", &["A"]), item("a1", &["A"]), item("a2", &["A"])];
        let targets = vec![target("A", 5)];
        let mut rng = LehmerRng::new(11);

        let picked = select_items(&pool, &targets, 5, &mut rng);
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0], picked[1]);
    }

    #[test]
    fn test_same_seed_same_order() {
        let pool: Vec<ItemPoolEntry> = (0..30)
            .map(|i| {
                let topics: &[&str] = if i % 3 == 0 { &["A"] } else { &["B", "C"] };
                item(&format!("i{i}"), topics)
            })
            .collect();
        let targets = vec![target("A", 4), target("B", 3), target("C", 3)];

        let first = select_items(&pool, &targets, 10, &mut LehmerRng::new(2024));
        let second = select_items(&pool, &targets, 10, &mut LehmerRng::new(2024));
        assert_eq!(first, second);
    }
}
