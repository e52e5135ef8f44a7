//! Classical ARIMA(2,1,2) forecasting backend.
//!
//! Fallback path when the hosted service is unavailable. The series is
//! differenced once and an ARMA(2,2) is fit by conditional least
//! squares in the Hannan-Rissanen style: a long autoregression first
//! estimates the innovation sequence, then one OLS pass regresses the
//! differenced series on its own lags and the lagged innovations.
//! Forecasts iterate the fitted recursion with future shocks at zero
//! and re-integrate onto the last observed level.
//!
//! The (2,1,2) order is hardcoded and not validated against the series;
//! a fit that cannot be computed (too few observations, singular normal
//! equations, divergence) surfaces its error instead of retrying with
//! a different order.

use async_trait::async_trait;

use crate::error::ForecastError;

use super::series::{ForecastPoint, HistoricalSeries};
use super::strategy::ForecastStrategy;

/// AR order.
const P: usize = 2;
/// MA order.
const Q: usize = 2;

/// ARIMA(2,1,2) strategy over a historical series.
pub struct ArimaStrategy;

#[async_trait]
impl ForecastStrategy for ArimaStrategy {
    async fn forecast(
        &self,
        series: &HistoricalSeries,
        horizon: u32,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        let values = series.values();
        let predicted = arima_212_forecast(&values, horizon as usize)?;
        let labels = series.future_labels(horizon);
        Ok(labels
            .into_iter()
            .zip(predicted)
            .map(|(date, value)| ForecastPoint { date, value })
            .collect())
    }

    fn name(&self) -> &str {
        "arima(2,1,2)"
    }
}

/// Fit ARIMA(2,1,2) on `values` and project `steps` periods ahead.
pub fn arima_212_forecast(values: &[f64], steps: usize) -> Result<Vec<f64>, ForecastError> {
    if steps == 0 {
        return Ok(Vec::new());
    }

    // d = 1: work on first differences.
    let diff: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    // Long-AR order for the innovation estimate. Shrink toward P when
    // the sample is short; below the floor the fit is not attempted.
    // Stage 2 needs at least 1 + P + Q rows past its burn-in.
    let mut p_long = (P + Q).max(4);
    while p_long > P && diff.len() < p_long + Q + 1 + P + Q {
        p_long -= 1;
    }
    let stage2_start = p_long + Q;
    let stage2_rows = diff.len().saturating_sub(stage2_start);
    if stage2_rows < 1 + P + Q {
        return Err(ForecastError::Fit(format!(
            "series too short to fit ARIMA({},1,{}): {} observations",
            P,
            Q,
            values.len()
        )));
    }

    // Stage 1: long autoregression, residuals approximate the shocks.
    let mut x1 = Vec::with_capacity(diff.len() - p_long);
    let mut y1 = Vec::with_capacity(diff.len() - p_long);
    for t in p_long..diff.len() {
        let mut row = Vec::with_capacity(p_long + 1);
        row.push(1.0);
        for i in 1..=p_long {
            row.push(diff[t - i]);
        }
        x1.push(row);
        y1.push(diff[t]);
    }
    let ar_coef = ols(&x1, &y1)
        .ok_or_else(|| ForecastError::Fit("singular normal equations in long-AR stage".into()))?;

    let mut shocks = vec![0.0; diff.len()];
    for t in p_long..diff.len() {
        let mut fitted = ar_coef[0];
        for i in 1..=p_long {
            fitted += ar_coef[i] * diff[t - i];
        }
        shocks[t] = diff[t] - fitted;
    }

    // Stage 2: regress the differenced series on its own lags and the
    // lagged shock estimates.
    let mut x2 = Vec::with_capacity(stage2_rows);
    let mut y2 = Vec::with_capacity(stage2_rows);
    for t in stage2_start..diff.len() {
        let mut row = Vec::with_capacity(1 + P + Q);
        row.push(1.0);
        for i in 1..=P {
            row.push(diff[t - i]);
        }
        for j in 1..=Q {
            row.push(shocks[t - j]);
        }
        x2.push(row);
        y2.push(diff[t]);
    }
    let coef = ols(&x2, &y2)
        .ok_or_else(|| ForecastError::Fit("singular normal equations in ARMA stage".into()))?;
    let intercept = coef[0];
    let phi = &coef[1..=P];
    let theta = &coef[1 + P..];

    // Iterate the recursion forward with future shocks at zero.
    let mut diff_lags = [diff[diff.len() - 1], diff[diff.len() - 2]];
    let mut shock_lags = [shocks[diff.len() - 1], shocks[diff.len() - 2]];
    let mut level = values[values.len() - 1];
    let mut out = Vec::with_capacity(steps);
    for _ in 0..steps {
        let step = intercept
            + phi[0] * diff_lags[0]
            + phi[1] * diff_lags[1]
            + theta[0] * shock_lags[0]
            + theta[1] * shock_lags[1];
        if !step.is_finite() {
            return Err(ForecastError::Fit("forecast diverged".into()));
        }
        level += step;
        out.push(level);
        diff_lags = [step, diff_lags[0]];
        shock_lags = [0.0, shock_lags[0]];
    }
    Ok(out)
}

/// Ordinary least squares via the normal equations; `None` when the
/// system is singular.
fn ols(x: &[Vec<f64>], y: &[f64]) -> Option<Vec<f64>> {
    let k = x.first()?.len();
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &target) in x.iter().zip(y) {
        for i in 0..k {
            xty[i] += row[i] * target;
            for j in 0..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    solve(xtx, xty)
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n).max_by(|&i, &j| {
            a[i][col]
                .abs()
                .partial_cmp(&a[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot_row][col].abs() < 1e-10 {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for j in col..n {
                a[row][j] -= factor * a[col][j];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for j in (row + 1)..n {
            sum -= a[row][j] * x[j];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}
