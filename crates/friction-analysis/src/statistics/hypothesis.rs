//! Correlation, two-sample t-test, and 2x2 chi-square.

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, StudentsT};

use super::descriptive::{mean, sample_variance};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub coefficient: f64,
    pub p_value: f64,
    pub n: usize,
}

impl CorrelationResult {
    pub fn neutral(n: usize) -> Self {
        Self {
            coefficient: 0.0,
            p_value: 1.0,
            n,
        }
    }

    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TTestResult {
    pub statistic: f64,
    pub p_value: f64,
    pub mean_group1: f64,
    pub mean_group2: f64,
    pub std_group1: f64,
    pub std_group2: f64,
    pub n_group1: usize,
    pub n_group2: usize,
    /// Cohen's d with pooled standard deviation.
    pub effect_size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: u32,
    /// Rows: condition false/true. Columns: outcome false/true.
    pub observed: [[u64; 2]; 2],
    pub expected: [[f64; 2]; 2],
}

/// Two-sided p-value for a t statistic.
fn t_p_value(t: f64, dof: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    match StudentsT::new(0.0, 1.0, dof) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).min(1.0),
        Err(_) => 1.0,
    }
}

/// Pearson correlation between a continuous variable and a binary one.
/// Neutral below `min_samples` rows or when either variable is constant.
pub fn point_biserial(values: &[f64], flags: &[bool], min_samples: usize) -> CorrelationResult {
    let n = values.len().min(flags.len());
    if n < min_samples.max(3) {
        return CorrelationResult::neutral(n);
    }
    let xs = &values[..n];
    let ys: Vec<f64> = flags[..n].iter().map(|f| if *f { 1.0 } else { 0.0 }).collect();

    let (Some(mx), Some(my)) = (mean(xs), mean(&ys)) else {
        return CorrelationResult::neutral(n);
    };
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(&ys) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return CorrelationResult::neutral(n);
    }

    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let dof = (n - 2) as f64;
    let p_value = if r.abs() >= 1.0 {
        0.0
    } else {
        t_p_value(r * (dof / (1.0 - r * r)).sqrt(), dof)
    };
    CorrelationResult {
        coefficient: r,
        p_value,
        n,
    }
}

/// Student's t-test with pooled variance. Neutral when either group has
/// fewer than two values; statistic 0 when both groups are constant.
pub fn students_t_test(group1: &[f64], group2: &[f64]) -> TTestResult {
    let (n1, n2) = (group1.len(), group2.len());
    let (Some(v1), Some(v2)) = (sample_variance(group1), sample_variance(group2)) else {
        return TTestResult {
            p_value: 1.0,
            n_group1: n1,
            n_group2: n2,
            ..Default::default()
        };
    };
    let m1 = mean(group1).unwrap_or_default();
    let m2 = mean(group2).unwrap_or_default();
    let dof = (n1 + n2 - 2) as f64;
    let pooled = (((n1 - 1) as f64 * v1 + (n2 - 1) as f64 * v2) / dof).sqrt();

    let (statistic, p_value, effect_size) = if pooled > 0.0 {
        let t = (m1 - m2) / (pooled * (1.0 / n1 as f64 + 1.0 / n2 as f64).sqrt());
        (t, t_p_value(t, dof), (m1 - m2) / pooled)
    } else {
        (0.0, 1.0, 0.0)
    };

    TTestResult {
        statistic,
        p_value,
        mean_group1: m1,
        mean_group2: m2,
        std_group1: v1.sqrt(),
        std_group2: v2.sqrt(),
        n_group1: n1,
        n_group2: n2,
        effect_size,
    }
}

/// Chi-square test of independence on a 2x2 table with Yates' continuity
/// correction. Neutral unless every row and column total is non-zero.
pub fn chi_square_2x2(condition: &[bool], outcome: &[bool]) -> ChiSquareResult {
    let mut observed = [[0u64; 2]; 2];
    for (c, o) in condition.iter().zip(outcome) {
        observed[usize::from(*c)][usize::from(*o)] += 1;
    }
    let rows = [observed[0][0] + observed[0][1], observed[1][0] + observed[1][1]];
    let cols = [observed[0][0] + observed[1][0], observed[0][1] + observed[1][1]];
    let total = rows[0] + rows[1];

    if rows.contains(&0) || cols.contains(&0) {
        return ChiSquareResult {
            statistic: 0.0,
            p_value: 1.0,
            dof: 1,
            observed,
            expected: [[0.0; 2]; 2],
        };
    }

    let mut expected = [[0.0; 2]; 2];
    let mut statistic = 0.0;
    for i in 0..2 {
        for j in 0..2 {
            let e = rows[i] as f64 * cols[j] as f64 / total as f64;
            expected[i][j] = e;
            let diff = (observed[i][j] as f64 - e).abs();
            let corrected = (diff - diff.min(0.5)).powi(2);
            statistic += corrected / e;
        }
    }
    let p_value = ChiSquared::new(1.0).map_or(1.0, |d| d.sf(statistic));
    ChiSquareResult {
        statistic,
        p_value,
        dof: 1,
        observed,
        expected,
    }
}
