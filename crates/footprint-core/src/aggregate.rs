//! Aggregation of category results into a report

use crate::types::{CategoryResult, FootprintReport};

/// Round to 2 decimal places
#[inline]
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Build a report from per-category results
///
/// Results are put into the fixed category order before summing, so the
/// total does not depend on input order. Only the total is rounded; each
/// category keeps full precision. Degraded results are summed like any
/// other and only raise `any_degraded`.
#[must_use]
pub fn aggregate(mut results: Vec<CategoryResult>) -> FootprintReport {
    results.sort_by_key(|r| r.category);

    let total: f64 = results.iter().map(|r| r.annual_emission_tonnes).sum();
    let any_degraded = results.iter().any(|r| r.degraded);

    FootprintReport {
        per_category: results,
        total_tonnes: round2(total),
        any_degraded,
    }
}
