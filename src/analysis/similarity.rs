//! Pairwise collaboration similarity.
//!
//! For developers `a` and `b`, similarity is the weight both of them put on
//! files they share, over their combined total weight:
//!
//! ```text
//! shared   = sum over files touched by both of (w_a(f) + w_b(f))
//! combined = total(a) + total(b)
//! sim      = shared / combined
//! ```
//!
//! Both sides' weight counts toward `shared`, so heavy investment in the
//! same files scores higher than a thin overlap of file sets.

use super::weights::{total_weight, DeveloperWeightTable};
use crate::error::{CollabError, Result};
use crate::model::SimilarityPair;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Similarity of one pair, or `None` when the pair is below `min_activity`.
pub fn pair_similarity(
    weights: &DeveloperWeightTable,
    a: &str,
    b: &str,
    min_activity: f64,
) -> Result<Option<f64>> {
    let empty = BTreeMap::new();
    let files_a = weights.get(a).unwrap_or(&empty);
    let files_b = weights.get(b).unwrap_or(&empty);
    score(a, files_a, total_weight(files_a), b, files_b, total_weight(files_b), min_activity)
}

fn score(
    a: &str,
    files_a: &BTreeMap<String, f64>,
    total_a: f64,
    b: &str,
    files_b: &BTreeMap<String, f64>,
    total_b: f64,
    min_activity: f64,
) -> Result<Option<f64>> {
    let combined = total_a + total_b;
    if combined < min_activity {
        trace!(a, b, combined, "pair below activity floor");
        return Ok(None);
    }
    if combined <= 0.0 {
        return Err(CollabError::ZeroActivity(a.to_string(), b.to_string()));
    }

    let (small, large) = if files_a.len() <= files_b.len() {
        (files_a, files_b)
    } else {
        (files_b, files_a)
    };
    let shared: f64 = small
        .iter()
        .filter(|(_, w)| **w > 0.0)
        .filter_map(|(path, w)| {
            large
                .get(path)
                .filter(|other| **other > 0.0)
                .map(|other| w + other)
        })
        .sum();

    Ok(Some(shared / combined))
}

/// Every unordered pair of `developers` whose similarity is strictly above
/// `threshold`, sorted by similarity, highest first.
pub fn similar_pairs(
    weights: &DeveloperWeightTable,
    developers: &[String],
    threshold: f64,
    min_activity: f64,
) -> Result<Vec<SimilarityPair>> {
    let ordered: Vec<&str> = developers
        .iter()
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let empty = BTreeMap::new();
    let profiles: Vec<(&str, &BTreeMap<String, f64>, f64)> = ordered
        .iter()
        .map(|dev| {
            let files = weights.get(*dev).unwrap_or(&empty);
            (*dev, files, total_weight(files))
        })
        .collect();

    let mut scored: Vec<(f64, SimilarityPair)> = Vec::new();
    for (i, (a, files_a, total_a)) in profiles.iter().enumerate() {
        for (b, files_b, total_b) in &profiles[i + 1..] {
            let Some(sim) = score(a, files_a, *total_a, b, files_b, *total_b, min_activity)? else {
                continue;
            };
            if sim > threshold {
                scored.push((
                    sim,
                    SimilarityPair {
                        developer_a: a.to_string(),
                        developer_b: b.to_string(),
                        similarity_percent: to_percent(sim),
                    },
                ));
            }
        }
    }

    scored.sort_by(|(x, px), (y, py)| {
        y.total_cmp(x)
            .then_with(|| px.developer_a.cmp(&py.developer_a))
            .then_with(|| px.developer_b.cmp(&py.developer_b))
    });
    debug!(
        developers = ordered.len(),
        pairs = scored.len(),
        threshold,
        "computed similarity pairs"
    );
    Ok(scored.into_iter().map(|(_, pair)| pair).collect())
}

/// Floor, not round: 0.999 is 99%.
fn to_percent(similarity: f64) -> u8 {
    (similarity * 100.0).floor().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(rows: &[(&str, &str, f64)]) -> DeveloperWeightTable {
        let mut t = DeveloperWeightTable::new();
        for (dev, file, w) in rows {
            *t.entry(dev.to_string())
                .or_default()
                .entry(file.to_string())
                .or_insert(0.0) += w;
        }
        t
    }

    fn devs(t: &DeveloperWeightTable) -> Vec<String> {
        t.keys().cloned().collect()
    }

    #[test]
    fn low_activity_pair_is_excluded() {
        let t = table(&[("x", "f", 10.0), ("y", "f", 10.0)]);
        assert!(similar_pairs(&t, &devs(&t), 0.0, 100.0).unwrap().is_empty());
        assert_eq!(pair_similarity(&t, "x", "y", 100.0).unwrap(), None);
    }

    #[test]
    fn full_overlap_scores_one_hundred() {
        let t = table(&[("x", "f", 60.0), ("y", "f", 60.0)]);
        let pairs = similar_pairs(&t, &devs(&t), 0.6, 100.0).unwrap();
        assert_eq!(
            pairs,
            vec![SimilarityPair {
                developer_a: "x".into(),
                developer_b: "y".into(),
                similarity_percent: 100,
            }]
        );
    }

    #[test]
    fn files_touched_by_one_side_do_not_count() {
        let t = table(&[
            ("x", "shared", 40.0),
            ("x", "solo", 60.0),
            ("y", "shared", 20.0),
            ("y", "other", 80.0),
        ]);
        let sim = pair_similarity(&t, "x", "y", 100.0).unwrap().unwrap();
        assert!((sim - 0.3).abs() < 1e-12);
        assert!(similar_pairs(&t, &devs(&t), 0.3, 100.0).unwrap().is_empty());
        let pairs = similar_pairs(&t, &devs(&t), 0.29, 100.0).unwrap();
        assert_eq!(pairs[0].similarity_percent, 30);
    }

    #[test]
    fn percent_is_floored() {
        assert_eq!(to_percent(0.999), 99);
        assert_eq!(to_percent(0.615), 61);
        assert_eq!(to_percent(1.0), 100);
    }

    #[test]
    fn similarity_is_symmetric() {
        let t = table(&[
            ("a", "f1", 30.0),
            ("a", "f2", 90.0),
            ("b", "f2", 10.0),
            ("b", "f3", 70.0),
            ("c", "f1", 5.0),
        ]);
        for (x, y) in [("a", "b"), ("a", "c"), ("b", "c")] {
            assert_eq!(
                pair_similarity(&t, x, y, 0.0).unwrap(),
                pair_similarity(&t, y, x, 0.0).unwrap()
            );
        }
    }

    #[test]
    fn raising_threshold_never_adds_pairs() {
        let t = table(&[
            ("a", "f1", 50.0),
            ("a", "f2", 50.0),
            ("b", "f1", 80.0),
            ("c", "f2", 40.0),
            ("c", "f3", 40.0),
            ("d", "f1", 60.0),
            ("d", "f2", 60.0),
        ]);
        let mut previous: Option<Vec<SimilarityPair>> = None;
        for step in 0..10 {
            let threshold = step as f64 / 10.0;
            let pairs = similar_pairs(&t, &devs(&t), threshold, 50.0).unwrap();
            if let Some(prev) = &previous {
                assert!(pairs.iter().all(|p| prev.contains(p)), "threshold {threshold}");
            }
            previous = Some(pairs);
        }
    }

    #[test]
    fn self_pairs_and_duplicates_are_never_emitted() {
        let t = table(&[("x", "f", 60.0), ("y", "f", 60.0)]);
        let list = vec!["y".to_string(), "x".to_string(), "x".to_string()];
        let pairs = similar_pairs(&t, &list, 0.0, 0.0).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].developer_a, "x");
    }

    #[test]
    fn zero_floor_with_idle_developers_is_an_error() {
        let t = DeveloperWeightTable::new();
        let list = vec!["x".to_string(), "y".to_string()];
        assert!(matches!(
            similar_pairs(&t, &list, 0.5, 0.0),
            Err(CollabError::ZeroActivity(_, _))
        ));
    }

    #[test]
    fn pairs_are_sorted_by_similarity() {
        let t = table(&[
            ("a", "f", 100.0),
            ("b", "f", 100.0),
            ("c", "f", 50.0),
            ("c", "g", 50.0),
        ]);
        let pairs = similar_pairs(&t, &devs(&t), 0.0, 0.0).unwrap();
        let order: Vec<_> = pairs
            .iter()
            .map(|p| (p.developer_a.as_str(), p.developer_b.as_str(), p.similarity_percent))
            .collect();
        assert_eq!(order, vec![("a", "b", 100), ("a", "c", 75), ("b", "c", 75)]);
    }
}
