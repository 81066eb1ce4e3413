use log::info;
use polars::prelude::*;
use statrs::statistics::Statistics;
use std::cmp::Ordering;
use tabled::{Table, Tabled};

use super::error::Result;
use super::frame;
use super::metrics::DurationBounds;

/// Quantile of already sorted values with linear interpolation between the
/// two closest ranks. `NaN` for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

#[derive(Debug, Clone, PartialEq)]
pub struct DurationStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub q1: f64,
    pub q3: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub skewness: f64,
}

/// Smallest of the most frequent values.
fn mode(sorted: &[f64]) -> f64 {
    let mut best = f64::NAN;
    let mut best_run = 0;
    let mut i = 0;
    while i < sorted.len() {
        let run = sorted[i..].iter().take_while(|v| **v == sorted[i]).count();
        if run > best_run {
            best = sorted[i];
            best_run = run;
        }
        i += run;
    }
    best
}

/// Population (biased) skewness.
fn skewness(values: &[f64], mean: f64) -> f64 {
    let n = values.len() as f64;
    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n;
    if m2 == 0.0 {
        f64::NAN
    } else {
        m3 / m2.powf(1.5)
    }
}

impl DurationStats {
    /// `None` when there is nothing to describe. `NaN` inputs are ignored.
    pub fn from_values(values: &[f64]) -> Option<DurationStats> {
        let sorted = sorted(values);
        let (min, max) = (*sorted.first()?, *sorted.last()?);
        let mean = Statistics::mean(sorted.iter());
        Some(DurationStats {
            count: sorted.len(),
            mean,
            median: quantile(&sorted, 0.5),
            mode: mode(&sorted),
            q1: quantile(&sorted, 0.25),
            q3: quantile(&sorted, 0.75),
            min,
            max,
            std_dev: Statistics::std_dev(sorted.iter()),
            skewness: skewness(&sorted, mean),
        })
    }

    pub fn table(&self) -> String {
        #[derive(Tabled)]
        struct Stat {
            statistic: &'static str,
            minutes: String,
        }
        let rows = vec![
            Stat { statistic: "Count", minutes: self.count.to_string() },
            Stat { statistic: "Mean", minutes: format!("{:.2}", self.mean) },
            Stat { statistic: "Median", minutes: format!("{:.2}", self.median) },
            Stat { statistic: "Mode", minutes: format!("{}", self.mode) },
            Stat { statistic: "Lower Quartile (Q1)", minutes: format!("{:.2}", self.q1) },
            Stat { statistic: "Upper Quartile (Q3)", minutes: format!("{:.2}", self.q3) },
            Stat { statistic: "Minimum", minutes: format!("{}", self.min) },
            Stat { statistic: "Maximum", minutes: format!("{}", self.max) },
            Stat { statistic: "Standard Deviation", minutes: format!("{:.2}", self.std_dev) },
            Stat { statistic: "Skewness", minutes: format!("{:.2}", self.skewness) },
        ];
        Table::new(rows).to_string()
    }
}

/// Rows of a per-game table whose `column` lies inside `bounds`, and the
/// kept values.
pub fn within_bounds(df: &DataFrame, column: &str, bounds: &DurationBounds) -> Result<(DataFrame, Vec<f64>)> {
    let name = frame::require_column(df, column)?;
    let values: Vec<Option<f64>> = frame::string_values(df, &name)?
        .iter()
        .map(|v| v.as_deref().and_then(frame::parse_float))
        .collect();
    let mask: BooleanChunked = values.iter().map(|v| bounds.contains(*v)).collect();
    let kept: Vec<f64> = values.into_iter().flatten().filter(|v| bounds.contains(Some(*v))).collect();
    info!("{} of {} rows within [{}]", kept.len(), df.height(), bounds);
    Ok((df.filter(&mask)?, kept))
}
