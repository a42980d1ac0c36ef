//! Miss-ratio curves: the same trace replayed at many capacities.

use std::path::Path;

use hashbrown::HashSet;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::evict_policy::{new_policy, EvictPolicy, PolicyKind};
use crate::simulator::run;
use crate::Key;

/// One labelled curve; points are `(capacity, miss ratio)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Serialize)]
struct CurveRow<'a> {
    policy: &'a str,
    capacity: usize,
    miss_ratio: f64,
}

/// Number of distinct keys in `keys`.
pub fn working_set_size(keys: &[Key]) -> usize {
    keys.iter().map(String::as_str).collect::<HashSet<_>>().len()
}

/// Replays `keys` once per capacity, each on a fresh policy. Capacities are
/// independent runs, so they are simulated in parallel.
pub fn miss_ratio_curve(keys: &[Key], kind: PolicyKind, capacities: &[usize]) -> SimulationResult {
    let points = capacities
        .par_iter()
        .map(|&capacity| {
            let mut policy = new_policy(capacity, kind);
            let stats = run(&mut policy, keys);
            (policy.capacity() as f64, stats.miss_rate())
        })
        .collect();
    SimulationResult {
        label: kind.to_string(),
        points,
    }
}

/// Curves for every kind over capacities `1..=max_capacity`.
pub fn sweep(keys: &[Key], kinds: &[PolicyKind], max_capacity: usize) -> Vec<SimulationResult> {
    let capacities: Vec<usize> = (1..=max_capacity.max(1)).collect();
    info!(
        "sweeping {} capacities over {} keys ({} distinct)",
        capacities.len(),
        keys.len(),
        working_set_size(keys)
    );
    kinds
        .iter()
        .map(|&kind| miss_ratio_curve(keys, kind, &capacities))
        .collect()
}

/// Writes every point of every curve as a CSV row.
pub fn write_csv(results: &[SimulationResult], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for result in results {
        for &(capacity, miss_ratio) in &result.points {
            wtr.serialize(CurveRow {
                policy: &result.label,
                capacity: capacity as usize,
                miss_ratio,
            })?;
        }
    }
    wtr.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(s: &str) -> Vec<Key> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn working_set_counts_distinct_keys() {
        assert_eq!(working_set_size(&keys("a b a c b")), 3);
        assert_eq!(working_set_size(&[]), 0);
    }

    #[test]
    fn curve_keeps_capacity_order() {
        let trace = keys("a b c a b c a b c");
        let curve = miss_ratio_curve(&trace, PolicyKind::Lru, &[3, 1, 2]);
        let xs: Vec<f64> = curve.points.iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![3.0, 1.0, 2.0]);
        assert_eq!(curve.label, "LRU");
        // cyclic trace thrashes LRU below the working set size
        assert_eq!(curve.points[1].1, 1.0);
        assert_eq!(curve.points[2].1, 1.0);
        assert!((curve.points[0].1 - 3.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn zero_capacity_point_is_plotted_at_one() {
        let curve = miss_ratio_curve(&keys("a a"), PolicyKind::Fifo, &[0]);
        assert_eq!(curve.points, vec![(1.0, 0.5)]);
    }

    #[test]
    fn miss_ratio_never_increases_for_lru() {
        let trace = keys("a b c d a b e a b c d e f a");
        let curve = miss_ratio_curve(&trace, PolicyKind::Lru, &[1, 2, 3, 4, 5, 6]);
        for pair in curve.points.windows(2) {
            assert!(pair[1].1 <= pair[0].1);
        }
    }

    #[test]
    fn sweep_produces_one_curve_per_kind() {
        let results = sweep(&keys("a b a"), &PolicyKind::ALL, 2);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.points.len() == 2));
    }

    #[test]
    fn csv_has_a_row_per_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.csv");
        let results = sweep(&keys("a b a"), &[PolicyKind::Lfu], 2);
        write_csv(&results, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "policy,capacity,miss_ratio");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("LFU,1,"));
    }
}
