//! Five-number summary used for box plot tooltips and tables

use crate::api::BoxStats;

/// Min, quartiles and max of a sample, plus its size
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FiveNumberSummary {
    pub(crate) min: f64,
    pub(crate) q1: f64,
    pub(crate) median: f64,
    pub(crate) q3: f64,
    pub(crate) max: f64,
    pub(crate) count: usize,
}

/// Summarize a sample; `None` when it is empty.
///
/// Quartiles interpolate linearly between adjacent order statistics at the
/// midpoint rank `n*p - 0.5`, clamped to the sample. At `p = 0.5` that rank is
/// the plain median, so `q1 <= median <= q3` always holds.
pub(crate) fn summarize(samples: &[f64]) -> Option<FiveNumberSummary> {
    if samples.is_empty() {
        return None;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();

    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    Some(FiveNumberSummary {
        min: sorted[0],
        q1: quartile(&sorted, 0.25),
        median,
        q3: quartile(&sorted, 0.75),
        max: sorted[n - 1],
        count: n,
    })
}

/// Quantile of an ascending, non-empty slice at midpoint rank
pub(crate) fn quartile(sorted: &[f64], p: f64) -> f64 {
    let last = (sorted.len() - 1) as f64;
    let rank = (sorted.len() as f64 * p - 0.5).clamp(0.0, last);
    interpolate(sorted, rank)
}

/// Linear interpolation between the order statistics around `rank`
pub(crate) fn interpolate(sorted: &[f64], rank: f64) -> f64 {
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo])
}

impl From<&BoxStats> for FiveNumberSummary {
    fn from(stats: &BoxStats) -> Self {
        Self {
            min: stats.min,
            q1: stats.q1,
            median: stats.median,
            q3: stats.q3,
            max: stats.max,
            count: stats.count,
        }
    }
}
