//! Design-matrix features: trend hinges and Fourier terms

use chrono::{Datelike, NaiveDate};
use std::f64::consts::PI;

/// `NaiveDate::num_days_from_ce` of 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Days since the Unix epoch
pub fn epoch_days(date: NaiveDate) -> f64 {
    (date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE) as f64
}

/// `[sin(2πt/P), cos(2πt/P), sin(4πt/P), cos(4πt/P), ...]` for `order` harmonics
pub fn fourier_terms(t_days: f64, period: f64, order: usize) -> Vec<f64> {
    let mut terms = Vec::with_capacity(2 * order);
    for n in 1..=order {
        let x = 2.0 * PI * n as f64 * t_days / period;
        terms.push(x.sin());
        terms.push(x.cos());
    }
    terms
}

/// Changepoint locations on the scaled time axis.
///
/// Evenly spaced over the first `range` fraction of the rows, excluding the first row.
pub fn changepoint_positions(t: &[f64], n_changepoints: usize, range: f64) -> Vec<f64> {
    let hist_size = (t.len() as f64 * range).floor() as usize;
    let n = n_changepoints.min(hist_size.saturating_sub(1));
    if n == 0 {
        return Vec::new();
    }

    let last = (hist_size - 1) as f64;
    let mut positions: Vec<f64> = (1..=n)
        .map(|i| {
            let idx = (i as f64 * last / n as f64).round() as usize;
            t[idx]
        })
        .collect();
    positions.dedup();
    positions
}

/// `[1, t, (t - s_1)+, ..., (t - s_k)+]`
pub fn trend_terms(t: f64, changepoints: &[f64]) -> Vec<f64> {
    let mut terms = Vec::with_capacity(2 + changepoints.len());
    terms.push(1.0);
    terms.push(t);
    terms.extend(changepoints.iter().map(|s| (t - s).max(0.0)));
    terms
}
