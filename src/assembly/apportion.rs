//! Largest-remainder (Hamilton) apportionment of a form length over blueprint
//! topic weights.

use std::collections::HashSet;

use super::types::{AssemblyError, TopicTarget, TopicWeight};

/// Checks the weight list and returns the largest weight.
pub fn validate_weights(weights: &[TopicWeight]) -> Result<f64, AssemblyError> {
    if weights.is_empty() {
        return Err(AssemblyError::EmptyBlueprint);
    }

    let mut seen = HashSet::with_capacity(weights.len());
    let mut largest = 0.0f64;
    for tw in weights {
        if tw.topic_id.trim().is_empty() {
            return Err(AssemblyError::MalformedBlueprint(
                "topic id must not be empty".to_string(),
            ));
        }
        if !seen.insert(tw.topic_id.as_str()) {
            return Err(AssemblyError::MalformedBlueprint(format!(
                "duplicate topic {}",
                tw.topic_id
            )));
        }
        if !tw.weight.is_finite() || tw.weight < 0.0 {
            return Err(AssemblyError::MalformedBlueprint(format!(
                "topic {} has invalid weight {}",
                tw.topic_id, tw.weight
            )));
        }
        largest = largest.max(tw.weight);
    }

    if largest <= 0.0 {
        return Err(AssemblyError::MalformedBlueprint(
            "at least one topic weight must be positive".to_string(),
        ));
    }

    Ok(largest)
}

/// Integer target per topic, in blueprint order, summing exactly to `length`.
pub fn apportion(weights: &[TopicWeight], length: usize) -> Result<Vec<TopicTarget>, AssemblyError> {
    if length == 0 {
        return Err(AssemblyError::InvalidLength(length));
    }
    let largest = validate_weights(weights)?;

    // Scaled weights lie in [0, 1], so neither the sum nor the shares overflow.
    let scaled: Vec<f64> = weights.iter().map(|tw| tw.weight / largest).collect();
    let total: f64 = scaled.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(AssemblyError::MalformedBlueprint(format!(
            "topic weights do not sum to a usable total ({total})"
        )));
    }

    let n = length as f64;
    let mut counts = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    let mut assigned = 0usize;

    for (idx, &share) in scaled.iter().enumerate() {
        let raw = (share / total * n).min(n);
        let base = raw.floor();
        counts.push(base as usize);
        assigned = assigned.saturating_add(base as usize);
        if share > 0.0 {
            remainders.push((idx, raw - base));
        }
    }

    // Float noise can push the bases one over; trim from the smallest remainders.
    while assigned > length {
        let Some(&(idx, _)) = remainders
            .iter()
            .filter(|(i, _)| counts[*i] > 0)
            .min_by(|a, b| a.1.total_cmp(&b.1))
        else {
            break;
        };
        counts[idx] -= 1;
        assigned -= 1;
    }

    // Stable sort keeps input order among equal remainders.
    remainders.sort_by(|a, b| b.1.total_cmp(&a.1));
    let mut cursor = 0usize;
    while assigned < length && !remainders.is_empty() {
        let (idx, _) = remainders[cursor % remainders.len()];
        counts[idx] += 1;
        assigned += 1;
        cursor += 1;
    }

    tracing::debug!(length, topics = weights.len(), "apportioned blueprint");

    Ok(weights
        .iter()
        .zip(counts)
        .map(|(tw, required)| TopicTarget {
            topic_id: tw.topic_id.clone(),
            required,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(pairs: &[(&str, f64)]) -> Vec<TopicWeight> {
        pairs.iter().map(|(t, w)| TopicWeight::new(*t, *w)).collect()
    }

    fn counts(targets: &[TopicTarget]) -> Vec<usize> {
        targets.iter().map(|t| t.required).collect()
    }

    #[test]
    fn test_exact_split() {
        let targets = apportion(&weights(&[("A", 0.6), ("B", 0.4)]), 10).unwrap();
        assert_eq!(counts(&targets), vec![6, 4]);
        assert_eq!(targets[0].topic_id, "A");
    }

    #[test]
    fn test_weights_need_not_sum_to_one() {
        let targets = apportion(&weights(&[("A", 3.0), ("B", 1.0)]), 8).unwrap();
        assert_eq!(counts(&targets), vec![6, 2]);
    }

    #[test]
    fn test_largest_remainder_wins() {
        // raw = 3.333.., 3.333.., 3.333.. -> tie, first topic gets the extra unit
        let targets = apportion(&weights(&[("A", 1.0), ("B", 1.0), ("C", 1.0)]), 10).unwrap();
        assert_eq!(counts(&targets), vec![4, 3, 3]);

        // raw = 1.5, 2.5, 1.0 -> both .5 remainders tie, input order decides
        let targets = apportion(&weights(&[("A", 0.3), ("B", 0.5), ("C", 0.2)]), 5).unwrap();
        assert_eq!(counts(&targets).iter().sum::<usize>(), 5);
        assert_eq!(counts(&targets), vec![2, 2, 1]);
    }

    #[test]
    fn test_zero_weight_topic_gets_nothing() {
        let targets = apportion(&weights(&[("A", 1.0), ("B", 0.0)]), 7).unwrap();
        assert_eq!(counts(&targets), vec![7, 0]);
    }

    #[test]
    fn test_many_units_few_topics() {
        let targets = apportion(&weights(&[("A", 0.999), ("B", 0.001)]), 1000).unwrap();
        assert_eq!(counts(&targets).iter().sum::<usize>(), 1000);
    }

    #[test]
    fn test_huge_weights_stay_proportional() {
        let targets = apportion(&weights(&[("A", 1e308), ("B", 1.0)]), 10).unwrap();
        assert_eq!(counts(&targets), vec![10, 0]);

        let targets = apportion(&weights(&[("A", 1e307), ("B", 1e307)]), 100).unwrap();
        assert_eq!(counts(&targets), vec![50, 50]);

        let targets =
            apportion(&weights(&[("A", f64::MAX), ("B", f64::MAX), ("C", 0.0)]), 7).unwrap();
        assert_eq!(counts(&targets), vec![4, 3, 0]);
    }

    #[test]
    fn test_tiny_weights_are_scaled_up() {
        let targets = apportion(&weights(&[("A", 3e-320), ("B", 1e-320)]), 8).unwrap();
        assert_eq!(counts(&targets).iter().sum::<usize>(), 8);
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert_eq!(
            apportion(&weights(&[("A", 1.0)]), 0),
            Err(AssemblyError::InvalidLength(0))
        );
        assert_eq!(apportion(&[], 5), Err(AssemblyError::EmptyBlueprint));
        assert!(matches!(
            apportion(&weights(&[("A", 0.0), ("B", 0.0)]), 5),
            Err(AssemblyError::MalformedBlueprint(_))
        ));
        assert!(matches!(
            apportion(&weights(&[("A", -1.0), ("B", 2.0)]), 5),
            Err(AssemblyError::MalformedBlueprint(_))
        ));
        assert!(matches!(
            apportion(&weights(&[("A", 1.0), ("A", 2.0)]), 5),
            Err(AssemblyError::MalformedBlueprint(_))
        ));
        assert!(matches!(
            apportion(&weights(&[("A", f64::NAN)]), 5),
            Err(AssemblyError::MalformedBlueprint(_))
        ));
    }
}
