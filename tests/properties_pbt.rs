//! Property-based tests for form assembly and progression
//!
//! Invariants covered:
//! - Apportionment sums exactly to the requested length, at any weight magnitude
//! - Feasibility never flips to infeasible when items are added
//! - Selection is duplicate-free, sized min(N, pool) and seed-deterministic
//! - Mastery points are monotone in accuracy and in mastery probability
//! - Nodes behind an unmastered prerequisite are always LOCKED
//! - Status milestone bonuses are paid at most once

use std::collections::HashSet;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use skill_forge::assembly::{
    apportion, check_feasibility, select_items, ItemPoolEntry, ItemStatus, LehmerRng, TopicWeight,
};
use skill_forge::progression::{
    mastery_points, sync_tree, LearnerContext, ProgressionConfig, SkillNode, SkillProgress,
    SkillStatus, SkillTier, TreeSnapshot,
};

// ============================================================================
// Arbitrary Generators
// ============================================================================

const TOPICS: [&str; 5] = ["alg", "geo", "stat", "calc", "trig"];

fn arb_weights() -> impl Strategy<Value = Vec<TopicWeight>> {
    prop::collection::vec(0u32..=100u32, 1..=TOPICS.len())
        .prop_filter("at least one positive weight", |ws| ws.iter().any(|w| *w > 0))
        .prop_map(|ws| {
            ws.into_iter()
                .enumerate()
                .map(|(i, w)| TopicWeight::new(TOPICS[i], w as f64 / 10.0))
                .collect()
        })
}

fn arb_item(id: usize) -> impl Strategy<Value = ItemPoolEntry> {
    prop::sample::subsequence(TOPICS.to_vec(), 1..=2).prop_map(move |topics| {
        ItemPoolEntry::new(format!("item-{id}"), topics, ItemStatus::Published)
    })
}

fn arb_pool(max: usize) -> impl Strategy<Value = Vec<ItemPoolEntry>> {
    (0..=max).prop_flat_map(|len| {
        (0..len)
            .map(arb_item)
            .collect::<Vec<_>>()
    })
}

fn arb_tier() -> impl Strategy<Value = SkillTier> {
    prop_oneof![
        Just(SkillTier::Foundation),
        Just(SkillTier::Core),
        Just(SkillTier::Advanced),
        Just(SkillTier::Expert),
        Just(SkillTier::Master),
    ]
}

fn arb_progress() -> impl Strategy<Value = SkillProgress> {
    (0u32..40, 0u32..40, 0u32..=100u32, proptest::option::of(-3.0f64..3.0)).prop_map(
        |(attempts, correct, p, ability)| SkillProgress {
            attempts,
            correct: correct.min(attempts),
            mastery_probability: p as f64 / 100.0,
            ability_estimate: ability,
            ..Default::default()
        },
    )
}

fn learner(level: u32, total_xp: u64) -> LearnerContext {
    LearnerContext {
        level,
        total_xp,
        as_of: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

// ============================================================================
// Form assembly
// ============================================================================

proptest! {
    #[test]
    fn prop_apportionment_sums_to_length(weights in arb_weights(), length in 1usize..500) {
        let targets = apportion(&weights, length).unwrap();
        prop_assert_eq!(targets.len(), weights.len());
        prop_assert_eq!(targets.iter().map(|t| t.required).sum::<usize>(), length);
    }

    #[test]
    fn prop_apportionment_handles_extreme_magnitudes(
        exponents in prop::collection::vec(-300i32..=308i32, 1..=TOPICS.len()),
        length in 1usize..200,
    ) {
        let weights: Vec<TopicWeight> = exponents
            .iter()
            .enumerate()
            .map(|(i, e)| TopicWeight::new(TOPICS[i], 10f64.powi(*e)))
            .collect();
        let targets = apportion(&weights, length).unwrap();
        prop_assert_eq!(targets.iter().map(|t| t.required).sum::<usize>(), length);
    }

    #[test]
    fn prop_feasibility_monotone_in_supply(
        weights in arb_weights(),
        length in 1usize..20,
        pool in arb_pool(25),
        extra in prop::collection::vec(prop::sample::subsequence(TOPICS.to_vec(), 1..=2), 0..10),
    ) {
        let targets = apportion(&weights, length).unwrap();
        let before = check_feasibility(&targets, &pool);

        let mut bigger = pool.clone();
        for (i, topics) in extra.into_iter().enumerate() {
            bigger.push(ItemPoolEntry::new(format!("extra-{i}"), topics, ItemStatus::Draft));
        }
        let after = check_feasibility(&targets, &bigger);

        if before.feasible {
            prop_assert!(after.feasible);
        }
        prop_assert!(after.deficits.len() <= before.deficits.len());
    }

    #[test]
    fn prop_selection_distinct_sized_and_deterministic(
        weights in arb_weights(),
        length in 1usize..30,
        pool in arb_pool(40),
        seed in any::<u64>(),
    ) {
        let targets = apportion(&weights, length).unwrap();
        let first = select_items(&pool, &targets, length, &mut LehmerRng::new(seed));
        let second = select_items(&pool, &targets, length, &mut LehmerRng::new(seed));

        let unique: HashSet<&String> = first.iter().collect();
        prop_assert_eq!(unique.len(), first.len());
        prop_assert_eq!(first.len(), length.min(pool.len()));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_feasible_pool_meets_every_target(
        weights in arb_weights(),
        length in 1usize..15,
        seed in any::<u64>(),
    ) {
        // Single-topic items: greedy selection is exact when supply suffices.
        let targets = apportion(&weights, length).unwrap();
        let mut pool = Vec::new();
        for target in &targets {
            for i in 0..target.required + 2 {
                pool.push(ItemPoolEntry::new(
                    format!("{}-{i}", target.topic_id),
                    [target.topic_id.clone()],
                    ItemStatus::Published,
                ));
            }
        }
        prop_assert!(check_feasibility(&targets, &pool).feasible);

        let picked = select_items(&pool, &targets, length, &mut LehmerRng::new(seed));
        for target in &targets {
            let prefix = format!("{}-", target.topic_id);
            let delivered = picked.iter().filter(|id| id.starts_with(&prefix)).count();
            prop_assert_eq!(delivered, target.required);
        }
    }
}

// ============================================================================
// Progression
// ============================================================================

proptest! {
    #[test]
    fn prop_points_monotone_in_accuracy(
        a in 0u32..=1000u32,
        b in 0u32..=1000u32,
        p in 0u32..=100u32,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let p = p as f64 / 100.0;
        let lo_points = mastery_points(10, lo as f64 / 10.0, p);
        let hi_points = mastery_points(10, hi as f64 / 10.0, p);
        prop_assert!(lo_points <= hi_points);
        prop_assert!(hi_points <= 100);
    }

    #[test]
    fn prop_points_monotone_in_probability_above_ninety(
        accuracy in 900u32..=1000u32,
        a in 0u32..=100u32,
        b in 0u32..=100u32,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let acc = accuracy as f64 / 10.0;
        prop_assert!(
            mastery_points(10, acc, lo as f64 / 100.0) <= mastery_points(10, acc, hi as f64 / 100.0)
        );
    }

    #[test]
    fn prop_unmastered_prerequisite_locks(
        parent in arb_progress(),
        child in arb_progress(),
        tier in arb_tier(),
    ) {
        let mut parent_node = SkillNode::new("parent", "o", SkillTier::Foundation);
        parent_node.progress = parent;
        let mut child_node = SkillNode::new("child", "o", tier).with_prerequisites(["parent"]);
        child_node.progress = child;

        let sync = sync_tree(
            TreeSnapshot { nodes: vec![parent_node, child_node], edges: Vec::new() },
            &learner(99, u64::MAX / 2),
            &ProgressionConfig::default(),
        )
        .unwrap();

        if sync.nodes[0].status != SkillStatus::Mastered {
            prop_assert_eq!(sync.nodes[1].status, SkillStatus::Locked);
        } else {
            prop_assert_ne!(sync.nodes[1].status, SkillStatus::Locked);
        }
    }

    #[test]
    fn prop_status_bonus_at_most_once(
        progress in arb_progress(),
        tier in arb_tier(),
    ) {
        let mut node = SkillNode::new("n", "o", tier);
        node.progress = progress;
        let config = ProgressionConfig::default();

        let first = sync_tree(
            TreeSnapshot { nodes: vec![node], edges: Vec::new() },
            &learner(99, 0),
            &config,
        )
        .unwrap();
        let second = sync_tree(
            TreeSnapshot { nodes: first.nodes.clone(), edges: Vec::new() },
            &learner(99, 0),
            &config,
        )
        .unwrap();

        prop_assert!(first.new_milestones.len() <= 1);
        prop_assert_eq!(second.xp_awarded, 0);
        prop_assert_eq!(&first.nodes, &second.nodes);
    }
}
