//! Regression metrics
//!
//! `root_mean_squared_error` is the headline validation metric. The other
//! functions feed the training metrics recorded by
//! [`autolog`](crate::tracking::autolog).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

fn check_inputs(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.is_empty() {
        return Err(Error::InvalidInput("metric inputs are empty".to_string()));
    }
    if y_true.len() != y_pred.len() {
        return Err(Error::InvalidInput(format!(
            "y_true has {} values but y_pred has {}",
            y_true.len(),
            y_pred.len()
        )));
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    values.sum::<f64>() / n as f64
}

/// Mean squared error
///
/// # Errors
/// Returns `Error::InvalidInput` if the slices are empty or differ in length
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_inputs(y_true, y_pred)?;
    Ok(mean(
        y_true.iter().zip(y_pred).map(|(t, p)| (t - p) * (t - p)),
        y_true.len(),
    ))
}

/// Root mean squared error, `sqrt(MSE)`
///
/// # Errors
/// Returns `Error::InvalidInput` if the slices are empty or differ in length
///
/// # Examples
///
/// ```rust
/// use forest_track::metrics::root_mean_squared_error;
///
/// let rmse = root_mean_squared_error(&[1.0, 2.0], &[1.0, 4.0])?;
/// assert!((rmse - 2.0_f64.sqrt()).abs() < 1e-12);
/// # Ok::<(), forest_track::Error>(())
/// ```
pub fn root_mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    mean_squared_error(y_true, y_pred).map(f64::sqrt)
}

/// Mean absolute error
///
/// # Errors
/// Returns `Error::InvalidInput` if the slices are empty or differ in length
pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_inputs(y_true, y_pred)?;
    Ok(mean(
        y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()),
        y_true.len(),
    ))
}

/// Coefficient of determination.
///
/// A constant `y_true` has no variance to explain: the score is 1.0 for a
/// perfect prediction and 0.0 otherwise.
///
/// # Errors
/// Returns `Error::InvalidInput` if the slices are empty or differ in length
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_inputs(y_true, y_pred)?;
    let y_mean = mean(y_true.iter().copied(), y_true.len());
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p) * (t - p)).sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - y_mean) * (t - y_mean)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// All regression metrics for one `(y_true, y_pred)` pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    /// Mean squared error
    pub mse: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute error
    pub mae: f64,
    /// R²
    pub r2: f64,
}

impl RegressionReport {
    /// Compute every metric
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if the slices are empty or differ in length
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        let mse = mean_squared_error(y_true, y_pred)?;
        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mae: mean_absolute_error(y_true, y_pred)?,
            r2: r2_score(y_true, y_pred)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rmse_is_sqrt_of_mse() {
        let y_true = [3.0, -0.5, 2.0, 7.0];
        let y_pred = [2.5, 0.0, 2.0, 8.0];
        let mse = mean_squared_error(&y_true, &y_pred).unwrap();
        assert!((mse - 0.375).abs() < 1e-12);
        let rmse = root_mean_squared_error(&y_true, &y_pred).unwrap();
        assert!((rmse - 0.375_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_prediction() {
        let y = [1.0, 2.0, 3.0];
        let report = RegressionReport::compute(&y, &y).unwrap();
        assert!(report.rmse.abs() < f64::EPSILON);
        assert!(report.mae.abs() < f64::EPSILON);
        assert!((report.r2 - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mae_and_r2() {
        let y_true = [3.0, -0.5, 2.0, 7.0];
        let y_pred = [2.5, 0.0, 2.0, 8.0];
        assert!((mean_absolute_error(&y_true, &y_pred).unwrap() - 0.5).abs() < 1e-12);
        let r2 = r2_score(&y_true, &y_pred).unwrap();
        assert!((r2 - 0.948_608_137_044_968).abs() < 1e-9);
    }

    #[test]
    fn test_r2_constant_target() {
        assert!((r2_score(&[2.0, 2.0], &[2.0, 2.0]).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!(r2_score(&[2.0, 2.0], &[1.0, 3.0]).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn test_length_mismatch() {
        let err = root_mean_squared_error(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(mean_squared_error(&[], &[]).is_err());
    }
}
