//! Logistic regression by Newton-Raphson.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-8;
const PROB_FLOOR: f64 = 1e-12;

/// One fitted coefficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub p_value: f64,
    pub odds_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionResult {
    /// Intercept first, then one entry per feature.
    pub coefficients: Vec<Coefficient>,
    pub pseudo_r2: f64,
    pub n: usize,
    pub converged: bool,
}

impl RegressionResult {
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }
}

/// Fit `P(y) = sigmoid(b0 + X b)`.
///
/// Returns `None` when the outcome is constant, the design is empty, or the
/// information matrix is singular.
pub fn fit_logistic(names: &[&str], rows: &[Vec<f64>], outcome: &[bool]) -> Option<RegressionResult> {
    let n = rows.len();
    let k = names.len() + 1;
    if n == 0 || n != outcome.len() || n <= k {
        return None;
    }
    let positives = outcome.iter().filter(|o| **o).count();
    if positives == 0 || positives == n {
        return None;
    }

    let x = DMatrix::from_fn(n, k, |i, j| if j == 0 { 1.0 } else { rows[i].get(j - 1).copied().unwrap_or(0.0) });
    let y = DVector::from_iterator(n, outcome.iter().map(|o| if *o { 1.0 } else { 0.0 }));

    let mut beta = DVector::<f64>::zeros(k);
    let mut converged = false;
    for _ in 0..MAX_ITERATIONS {
        let p = probabilities(&x, &beta);
        let gradient = x.transpose() * (&y - &p);
        let info = information(&x, &p);
        let step = info.clone().cholesky().map(|c| c.solve(&gradient)).or_else(|| info.lu().solve(&gradient))?;
        beta += &step;
        if !beta.iter().all(|b| b.is_finite()) {
            return None;
        }
        if step.amax() < TOLERANCE {
            converged = true;
            break;
        }
    }

    let p = probabilities(&x, &beta);
    let covariance = information(&x, &p).try_inverse()?;
    let normal = Normal::new(0.0, 1.0).ok()?;

    let log_likelihood = log_likelihood(&y, &p);
    let base_rate = positives as f64 / n as f64;
    let null_likelihood = positives as f64 * base_rate.ln() + (n - positives) as f64 * (1.0 - base_rate).ln();
    let pseudo_r2 = 1.0 - log_likelihood / null_likelihood;

    let coefficients = std::iter::once("const")
        .chain(names.iter().copied())
        .enumerate()
        .map(|(j, name)| {
            let estimate = beta[j];
            let std_error = covariance[(j, j)].max(0.0).sqrt();
            let p_value = if std_error > 0.0 {
                2.0 * normal.sf((estimate / std_error).abs())
            } else {
                1.0
            };
            Coefficient {
                name: name.to_string(),
                estimate,
                std_error,
                p_value,
                odds_ratio: estimate.exp(),
            }
        })
        .collect();

    Some(RegressionResult {
        coefficients,
        pseudo_r2,
        n,
        converged,
    })
}

fn probabilities(x: &DMatrix<f64>, beta: &DVector<f64>) -> DVector<f64> {
    (x * beta).map(|z| (1.0 / (1.0 + (-z).exp())).clamp(PROB_FLOOR, 1.0 - PROB_FLOOR))
}

/// X' W X with W = diag(p (1 - p)).
fn information(x: &DMatrix<f64>, p: &DVector<f64>) -> DMatrix<f64> {
    let weights = p.map(|pi| pi * (1.0 - pi));
    let mut weighted = x.clone();
    for (mut row, w) in weighted.row_iter_mut().zip(weights.iter()) {
        row *= *w;
    }
    x.transpose() * weighted
}

fn log_likelihood(y: &DVector<f64>, p: &DVector<f64>) -> f64 {
    y.iter()
        .zip(p.iter())
        .map(|(yi, pi)| yi * pi.ln() + (1.0 - yi) * (1.0 - pi).ln())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_direction_of_effect() {
        // Blunders concentrate on short thinks, with overlap so the fit is finite.
        let mut rows = Vec::new();
        let mut outcome = Vec::new();
        for i in 0..200 {
            let think = f64::from(i % 20) / 10.0;
            rows.push(vec![think]);
            outcome.push((i % 20 < 6 && i % 3 != 0) || i % 17 == 0);
        }
        let fit = fit_logistic(&["think"], &rows, &outcome).unwrap();
        assert!(fit.converged);
        let think = fit.coefficient("think").unwrap();
        assert!(think.estimate < 0.0);
        assert!(think.odds_ratio < 1.0);
        assert!(think.p_value < 0.05);
        assert!(fit.pseudo_r2 > 0.0 && fit.pseudo_r2 < 1.0);
        assert_eq!(fit.coefficients[0].name, "const");
    }

    #[test]
    fn constant_outcome_is_rejected() {
        let rows: Vec<Vec<f64>> = (0..50).map(|i| vec![f64::from(i)]).collect();
        assert!(fit_logistic(&["x"], &rows, &[false; 50]).is_none());
    }
}
