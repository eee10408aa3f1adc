//! Positive-doubling average: keep the strictly positive values, double them,
//! and average what survives.
//!
//! Two renditions exist. [`average_of_doubled_positives`] refuses to divide
//! by zero and reports [`AverageError::EmptyResultSet`]. The `_lossy` form
//! divides unconditionally, so an input with no positive values produces NaN.

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AverageError {
    #[error("no strictly positive values to average")]
    EmptyResultSet,
}

/// Sum of the doubled positives and how many there were. Accumulated in
/// `i128` so doubling any `i64` cannot overflow.
fn doubled_positive_totals(values: &[i64]) -> (i128, usize) {
    values
        .iter()
        .filter(|&&v| v > 0)
        .fold((0i128, 0usize), |(sum, count), &v| (sum + 2 * i128::from(v), count + 1))
}

/// Averages `2 * v` over every `v > 0` in `values`.
pub fn average_of_doubled_positives(values: &[i64]) -> Result<f64, AverageError> {
    let (sum, count) = doubled_positive_totals(values);
    debug!(inputs = values.len(), positives = count, "averaging doubled positives");
    if count == 0 {
        return Err(AverageError::EmptyResultSet);
    }
    Ok(sum as f64 / count as f64)
}

/// Same arithmetic without the zero-count check. An empty filter result is
/// `0.0 / 0.0`, i.e. NaN.
pub fn average_of_doubled_positives_lossy(values: &[i64]) -> f64 {
    let (sum, count) = doubled_positive_totals(values);
    sum as f64 / count as f64
}
