use std::collections::BTreeMap;

use crate::util::sorted_samples;

/// Percentiles interpolate linearly between closest ranks. `std_dev` divides
/// by n, `sample_std_dev` and `variance` by n - 1 and are absent for a
/// single value.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub sample_std_dev: Option<f64>,
    pub variance: Option<f64>,
    pub mode: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p75: f64,
}

impl Summary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let sorted = sorted_samples(values);
        let count = sorted.len();
        let n = count as f64;

        let mean = sorted.iter().sum::<f64>() / n;
        let squared_error = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        let variance = (count > 1).then(|| squared_error / (n - 1.0));

        Some(Self {
            count,
            mean,
            median: percentile_sorted(&sorted, 50.0),
            std_dev: (squared_error / n).sqrt(),
            sample_std_dev: variance.map(f64::sqrt),
            variance,
            mode: mode_sorted(&sorted),
            min: sorted[0],
            max: sorted[count - 1],
            p25: percentile_sorted(&sorted, 25.0),
            p75: percentile_sorted(&sorted, 75.0),
        })
    }

    pub fn from_counts(counts: &[usize]) -> Option<Self> {
        let values = counts.iter().map(|&c| c as f64).collect::<Vec<_>>();
        Self::from_values(&values)
    }
}

fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

/// Most frequent value, the smallest one on ties.
fn mode_sorted(sorted: &[f64]) -> f64 {
    let mut best = (sorted[0], 0usize);
    let mut run = (sorted[0], 0usize);
    for &value in sorted {
        if value == run.0 {
            run.1 += 1;
        } else {
            run = (value, 1);
        }
        if run.1 > best.1 {
            best = run;
        }
    }
    best.0
}

pub fn histogram(values: impl IntoIterator<Item = usize>) -> BTreeMap<usize, usize> {
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_sample_has_no_summary() {
        assert_eq!(Summary::from_values(&[]), None);
    }

    #[test]
    fn summary_matches_numpy_defaults() {
        let summary = Summary::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(summary.count, 4);
        assert!(close(summary.mean, 2.5));
        assert!(close(summary.median, 2.5));
        // np.std([1, 2, 3, 4]), then with ddof=1
        assert!(close(summary.std_dev, 1.118033988749895));
        assert!(close(summary.sample_std_dev.unwrap(), 1.2909944487358056));
        assert!(close(summary.variance.unwrap(), 1.6666666666666667));
        assert!(close(summary.p25, 1.75));
        assert!(close(summary.p75, 3.25));
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
    }

    #[test]
    fn single_value_has_no_sample_variance() {
        let summary = Summary::from_counts(&[7]).unwrap();
        assert_eq!(summary.variance, None);
        assert_eq!(summary.sample_std_dev, None);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.p25, 7.0);
        assert_eq!(summary.mode, 7.0);
    }

    #[test]
    fn mode_prefers_smallest_on_ties() {
        let summary = Summary::from_counts(&[3, 1, 3, 1, 2]).unwrap();
        assert_eq!(summary.mode, 1.0);
        let summary = Summary::from_counts(&[5, 2, 5, 1]).unwrap();
        assert_eq!(summary.mode, 5.0);
    }

    #[test]
    fn histogram_counts_each_value() {
        let counts = histogram([0, 2, 2, 5, 0, 2]);
        assert_eq!(
            counts.into_iter().collect::<Vec<_>>(),
            vec![(0, 2), (2, 3), (5, 1)]
        );
    }
}
