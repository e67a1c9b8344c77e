//! Descriptive statistics over numeric columns.
//!
//! All functions skip NaN (missing) values unless documented otherwise.

use super::error::DashboardError;
use super::table::Table;

/// Summary statistics of a series, in the order they are displayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

pub const DESCRIBE_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

impl Describe {
    /// `(label, value)` pairs in display order.
    pub fn rows(&self) -> [(&'static str, f64); 8] {
        [
            (DESCRIBE_LABELS[0], self.count as f64),
            (DESCRIBE_LABELS[1], self.mean),
            (DESCRIBE_LABELS[2], self.std),
            (DESCRIBE_LABELS[3], self.min),
            (DESCRIBE_LABELS[4], self.q25),
            (DESCRIBE_LABELS[5], self.median),
            (DESCRIBE_LABELS[6], self.q75),
            (DESCRIBE_LABELS[7], self.max),
        ]
    }

    pub fn rounded(&self, places: u32) -> Self {
        Self {
            count: self.count,
            mean: round_to(self.mean, places),
            std: round_to(self.std, places),
            min: round_to(self.min, places),
            q25: round_to(self.q25, places),
            median: round_to(self.median, places),
            q75: round_to(self.q75, places),
            max: round_to(self.max, places),
        }
    }
}

fn sorted_valid(values: &[f64]) -> Vec<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    v.sort_by(f64::total_cmp);
    v
}

/// Quantile of an ascending, NaN-free slice with linear interpolation
/// between the two nearest order statistics.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn mean(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|x| !x.is_nan())
        .fold((0.0_f64, 0usize), |(s, n), x| (s + x, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> f64 {
    let valid: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    if valid.len() < 2 {
        return f64::NAN;
    }
    let m = valid.iter().sum::<f64>() / valid.len() as f64;
    let ss: f64 = valid.iter().map(|x| (x - m) * (x - m)).sum();
    (ss / (valid.len() - 1) as f64).sqrt()
}

pub fn describe(values: &[f64]) -> Describe {
    let sorted = sorted_valid(values);
    let (min, max) = match (sorted.first(), sorted.last()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => (f64::NAN, f64::NAN),
    };
    Describe {
        count: sorted.len(),
        mean: mean(&sorted),
        std: sample_std(&sorted),
        min,
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max,
    }
}

/// Round to `places` decimals, ties to even. NaN and infinities pass
/// through unchanged.
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places as i32);
    (value * factor).round_ties_even() / factor
}

/// Fractional period-over-period change.
///
/// Missing values are forward-filled from the last valid observation before
/// differencing, so a gap yields 0.0 rather than NaN. The first element, and
/// anything before the first valid observation, is NaN.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut last: Option<f64> = None;

    for &v in values {
        let current = if v.is_nan() { last } else { Some(v) };
        let change = match (last, current) {
            (Some(prev), Some(cur)) => cur / prev - 1.0,
            _ => f64::NAN,
        };
        out.push(change);
        if current.is_some() {
            last = current;
        }
    }
    out
}

/// Percentage returns: `pct_change * 100`.
pub fn returns_pct(values: &[f64]) -> Vec<f64> {
    pct_change(values).into_iter().map(|r| r * 100.0).collect()
}

/// Pearson correlation over pairwise-complete observations.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in &pairs {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a <= 0.0 || var_b <= 0.0 {
        return f64::NAN;
    }
    (cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major, `labels.len()` squared.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn compute(table: &Table, columns: &[&str]) -> Result<Self, DashboardError> {
        let series = columns
            .iter()
            .map(|c| table.numeric_column(c))
            .collect::<Result<Vec<_>, _>>()?;

        let n = series.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = if i == j {
                    if sample_std(&series[i]) > 0.0 { 1.0 } else { f64::NAN }
                } else {
                    pearson(&series[i], &series[j])
                };
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Ok(Self {
            labels: columns.iter().map(|c| c.to_string()).collect(),
            values,
        })
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        Some(self.values[i][j])
    }
}

/// Count of strictly positive and strictly negative observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReturnSplit {
    pub positive: usize,
    pub negative: usize,
}

impl ReturnSplit {
    pub fn count(values: &[f64]) -> Self {
        values.iter().fold(Self::default(), |mut acc, &v| {
            if v > 0.0 {
                acc.positive += 1;
            } else if v < 0.0 {
                acc.negative += 1;
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative
    }

    pub fn positive_pct(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.positive as f64 / self.total() as f64 * 100.0
        }
    }

    pub fn negative_pct(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.negative as f64 / self.total() as f64 * 100.0
        }
    }
}

/// Box-and-whisker summary. Whiskers reach the furthest observation within
/// 1.5 IQR of the box; anything beyond is an outlier.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub mean: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
    pub count: usize,
}

const WHISKER_IQR_FACTOR: f64 = 1.5;

impl BoxStats {
    /// `None` when the series has no valid observations.
    pub fn compute(values: &[f64]) -> Option<Self> {
        let sorted = sorted_valid(values);
        if sorted.is_empty() {
            return None;
        }

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let lower_fence = q1 - WHISKER_IQR_FACTOR * iqr;
        let upper_fence = q3 + WHISKER_IQR_FACTOR * iqr;

        let inside = sorted
            .iter()
            .copied()
            .filter(|&v| v >= lower_fence && v <= upper_fence);
        // Skewed samples can leave no observation between the fence and the
        // box edge; the whisker then collapses onto the box.
        let whisker_low = inside.clone().fold(q1, f64::min);
        let whisker_high = inside.fold(q3, f64::max);

        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < lower_fence || v > upper_fence)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            mean: mean(&sorted),
            whisker_low,
            whisker_high,
            outliers,
            count: sorted.len(),
        })
    }

    /// Smallest and largest value the chart must show.
    pub fn extent(&self) -> (f64, f64) {
        let lo = self
            .outliers
            .iter()
            .copied()
            .fold(self.whisker_low, f64::min);
        let hi = self
            .outliers
            .iter()
            .copied()
            .fold(self.whisker_high, f64::max);
        (lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::Cell;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn describe_matches_known_values() {
        let d = describe(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(d.count, 4);
        assert_relative_eq!(d.mean, 2.5);
        assert_relative_eq!(d.std, 1.2909944487358056, epsilon = 1e-12);
        assert_relative_eq!(d.min, 1.0);
        assert_relative_eq!(d.q25, 1.75);
        assert_relative_eq!(d.median, 2.5);
        assert_relative_eq!(d.q75, 3.25);
        assert_relative_eq!(d.max, 4.0);
    }

    #[test]
    fn describe_skips_nan() {
        let d = describe(&[f64::NAN, 5.0, f64::NAN, 7.0]);
        assert_eq!(d.count, 2);
        assert_relative_eq!(d.mean, 6.0);
        assert_relative_eq!(d.median, 6.0);
    }

    #[test]
    fn describe_of_single_value_has_nan_std() {
        let d = describe(&[3.0]);
        assert_eq!(d.count, 1);
        assert!(d.std.is_nan());
        assert_relative_eq!(d.q25, 3.0);
    }

    #[test]
    fn describe_of_empty_is_all_nan() {
        let d = describe(&[]);
        assert_eq!(d.count, 0);
        assert!(d.mean.is_nan());
        assert!(d.min.is_nan());
        assert!(d.max.is_nan());
    }

    #[test]
    fn describe_rows_are_labelled_in_order() {
        let rows = describe(&[1.0, 2.0]).rows();
        let labels: Vec<&str> = rows.iter().map(|r| r.0).collect();
        assert_eq!(labels, DESCRIBE_LABELS.to_vec());
        assert_eq!(rows[0].1, 2.0);
    }

    #[test]
    fn round_to_two_places() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-1.235, 1), -1.2);
        assert!(round_to(f64::NAN, 2).is_nan());
    }

    #[test]
    fn round_to_ties_go_to_even() {
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(0.5, 0), 0.0);
        assert_eq!(round_to(-2.5, 0), -2.0);
    }

    #[test]
    fn pct_change_first_is_nan() {
        let r = pct_change(&[100.0, 110.0, 99.0]);
        assert!(r[0].is_nan());
        assert_relative_eq!(r[1], 0.1, epsilon = 1e-12);
        assert_relative_eq!(r[2], -0.1, epsilon = 1e-12);
    }

    #[test]
    fn pct_change_forward_fills_gaps() {
        let r = pct_change(&[f64::NAN, 100.0, f64::NAN, 120.0]);
        assert!(r[0].is_nan());
        assert!(r[1].is_nan());
        assert_relative_eq!(r[2], 0.0);
        assert_relative_eq!(r[3], 0.2, epsilon = 1e-12);
    }

    #[test]
    fn returns_pct_scales_by_hundred() {
        let r = returns_pct(&[50.0, 55.0]);
        assert_relative_eq!(r[1], 10.0, epsilon = 1e-9);
    }

    #[test]
    fn pearson_perfect_and_inverse() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        let c = [4.0, 3.0, 2.0, 1.0];
        assert_relative_eq!(pearson(&a, &b), 1.0, epsilon = 1e-12);
        assert_relative_eq!(pearson(&a, &c), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn pearson_uses_pairwise_complete_rows() {
        let a = [1.0, 2.0, f64::NAN, 4.0];
        let b = [1.0, 2.0, 100.0, 4.0];
        assert_relative_eq!(pearson(&a, &b), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pearson_degenerate_is_nan() {
        assert!(pearson(&[1.0], &[2.0]).is_nan());
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn correlation_matrix_is_symmetric() {
        let table = Table::from_rows(
            vec!["X".into(), "Y".into(), "Z".into()],
            vec![
                vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Number(5.0)],
                vec![Cell::Number(2.0), Cell::Number(1.0), Cell::Number(3.0)],
                vec![Cell::Number(3.0), Cell::Number(4.0), Cell::Number(1.0)],
                vec![Cell::Number(4.0), Cell::Number(3.0), Cell::Number(2.0)],
            ],
        )
        .unwrap();

        let m = CorrelationMatrix::compute(&table, &["X", "Y", "Z"]).unwrap();
        assert_eq!(m.values.len(), 3);
        for i in 0..3 {
            assert_eq!(m.values[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(m.values[i][j], m.values[j][i]);
            }
        }
        assert_relative_eq!(m.get("X", "Y").unwrap(), 0.6, epsilon = 1e-12);
        assert!(m.get("X", "W").is_none());
    }

    #[test]
    fn correlation_matrix_missing_column() {
        let table = Table::new(vec!["X".into()]);
        assert!(CorrelationMatrix::compute(&table, &["X", "Y"]).is_err());
    }

    #[test]
    fn return_split_ignores_zero_and_nan() {
        let s = ReturnSplit::count(&[1.0, -0.5, 0.0, f64::NAN, 2.0]);
        assert_eq!(s.positive, 2);
        assert_eq!(s.negative, 1);
        assert_relative_eq!(s.positive_pct(), 200.0 / 3.0, epsilon = 1e-9);
        assert_eq!(ReturnSplit::default().negative_pct(), 0.0);
    }

    #[test]
    fn box_stats_flags_outliers() {
        let b = BoxStats::compute(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_relative_eq!(b.q1, 2.25);
        assert_relative_eq!(b.median, 3.5);
        assert_relative_eq!(b.q3, 4.75);
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.whisker_low, 1.0);
        assert_eq!(b.whisker_high, 5.0);
        assert_eq!(b.extent(), (1.0, 100.0));
    }

    #[test]
    fn box_stats_whisker_never_inside_box() {
        let b = BoxStats::compute(&[-1000.0, 0.0, 0.0, 0.0]).unwrap();
        assert_relative_eq!(b.q1, -250.0);
        assert_eq!(b.whisker_low, -250.0);
        assert_eq!(b.outliers, vec![-1000.0]);
    }

    #[test]
    fn box_stats_empty_is_none() {
        assert!(BoxStats::compute(&[f64::NAN]).is_none());
    }

    proptest! {
        #[test]
        fn describe_is_ordered(values in prop::collection::vec(-1e6f64..1e6, 1..64)) {
            let d = describe(&values);
            prop_assert!(d.min <= d.q25);
            prop_assert!(d.q25 <= d.median);
            prop_assert!(d.median <= d.q75);
            prop_assert!(d.q75 <= d.max);
            prop_assert!(d.mean >= d.min - 1e-6 && d.mean <= d.max + 1e-6);
        }

        #[test]
        fn pearson_is_bounded(
            pairs in prop::collection::vec((-1e3f64..1e3, -1e3f64..1e3), 2..64)
        ) {
            let (a, b): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
            let r = pearson(&a, &b);
            prop_assert!(r.is_nan() || (-1.0..=1.0).contains(&r));
        }

        #[test]
        fn whiskers_lie_within_data(values in prop::collection::vec(-1e3f64..1e3, 1..64)) {
            let b = BoxStats::compute(&values).unwrap();
            prop_assert!(b.whisker_low <= b.q1 + 1e-9);
            prop_assert!(b.whisker_high >= b.q3 - 1e-9);
            for o in &b.outliers {
                prop_assert!(*o < b.whisker_low || *o > b.whisker_high);
            }
        }
    }
}
