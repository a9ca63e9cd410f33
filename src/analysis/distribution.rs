//! Descriptive statistics for box and violin style summaries.

use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Five-number summary plus mean and whiskers for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub label: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Lowest value within 1.5 IQR of the first quartile.
    pub whisker_low: f64,
    /// Highest value within 1.5 IQR of the third quartile.
    pub whisker_high: f64,
}

impl BoxSummary {
    /// Summarize a sample. Returns `None` for an empty one.
    pub fn from_values(label: impl Into<String>, values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let q1 = percentile(&sorted, 25.0);
        let q3 = percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= q1 - 1.5 * iqr)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= q3 + 1.5 * iqr)
            .unwrap_or(q3);

        let std = if sorted.len() > 1 {
            sorted.iter().std_dev()
        } else {
            0.0
        };

        Some(Self {
            label: label.into(),
            count: sorted.len(),
            mean: sorted.iter().mean(),
            std,
            min: sorted[0],
            q1,
            median: percentile(&sorted, 50.0),
            q3,
            max: sorted[sorted.len() - 1],
            whisker_low,
            whisker_high,
        })
    }
}

/// Percentile of sorted values using linear interpolation (NumPy compatible).
pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_values[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted_values[lower]
    } else {
        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }
}

/// One summary per group label, in label order. Empty groups are skipped.
pub fn summarize_groups<I>(samples: I) -> Vec<BoxSummary>
where
    I: IntoIterator<Item = (String, f64)>,
{
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (label, value) in samples {
        groups.entry(label).or_default().push(value);
    }
    groups
        .into_iter()
        .filter_map(|(label, values)| BoxSummary::from_values(label, &values))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 50.0), 2.5);
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 100.0), 4.0);
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_box_summary() {
        let summary = BoxSummary::from_values("all", &[20.0, 22.0, 24.0, 26.0, 60.0]).unwrap();
        assert_eq!(summary.count, 5);
        assert_eq!(summary.median, 24.0);
        assert_eq!(summary.q1, 22.0);
        assert_eq!(summary.q3, 26.0);
        assert!((summary.mean - 30.4).abs() < 1e-9);
        // 60 lies beyond q3 + 1.5 * IQR
        assert_eq!(summary.whisker_high, 26.0);
        assert_eq!(summary.max, 60.0);
    }

    #[test]
    fn test_single_value() {
        let summary = BoxSummary::from_values("one", &[31.0]).unwrap();
        assert_eq!(summary.std, 0.0);
        assert_eq!(summary.q1, 31.0);
        assert!(BoxSummary::from_values("none", &[]).is_none());
    }

    #[test]
    fn test_summarize_groups() {
        let groups = summarize_groups(vec![
            ("Male".to_string(), 25.0),
            ("Female".to_string(), 22.0),
            ("Male".to_string(), 27.0),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Female");
        assert!((groups[1].mean - 26.0).abs() < 1e-9);
    }
}
