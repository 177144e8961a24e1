//! Spearman rank correlation

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Rank correlation with its two-sided p-value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spearman {
    pub rho: f64,
    /// `None` when there are too few points for the t approximation
    pub p_value: Option<f64>,
}

/// Ranks starting at 1, ties receiving the average of their positions
#[must_use]
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1..=end
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        sxy += (xi - mx) * (yi - my);
        sxx += (xi - mx).powi(2);
        syy += (yi - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Two-sided p-value of a correlation coefficient over `n` points
///
/// Uses `t = r * sqrt((n - 2) / (1 - r^2))` with `n - 2` degrees of freedom.
#[must_use]
pub fn correlation_p_value(r: f64, n: usize) -> Option<f64> {
    if n < 3 || !r.is_finite() {
        return None;
    }
    let dof = (n - 2) as f64;
    let denom = (1.0 + r) * (1.0 - r);
    if denom <= f64::EPSILON {
        return Some(0.0);
    }
    let t = r * (dof / denom).sqrt();
    let dist = StudentsT::new(0.0, 1.0, dof).ok()?;
    Some((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

/// Spearman correlation of paired samples
///
/// `None` with fewer than two pairs, mismatched lengths, or when either
/// sample is constant.
#[must_use]
pub fn spearman(x: &[f64], y: &[f64]) -> Option<Spearman> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let rho = pearson(&average_ranks(x), &average_ranks(y))?;
    Some(Spearman {
        rho,
        p_value: correlation_p_value(rho, x.len()),
    })
}
