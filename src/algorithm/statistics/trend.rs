//! Trend detection over age-binned CV

use itertools::Itertools;
use log::debug;
use rayon::prelude::*;

use super::correlation::spearman;
use super::descriptive::ols_slope;
use crate::config::StatisticsConfig;
use crate::models::statistics::{BinStatistic, TrendMetric};

/// Classifies whether CV declines with age
#[derive(Debug, Clone)]
pub struct TrendDetector {
    min_trend_bins: usize,
    significance_level: f64,
}

impl Default for TrendDetector {
    fn default() -> Self {
        Self::from_config(&StatisticsConfig::default())
    }
}

impl TrendDetector {
    #[must_use]
    pub fn from_config(config: &StatisticsConfig) -> Self {
        Self {
            min_trend_bins: config.min_trend_bins,
            significance_level: config.significance_level,
        }
    }

    /// Trend metrics for the bins of one biomarker and stratum
    ///
    /// Only bins passing the n threshold are used. Returns `None` when no bin
    /// is eligible.
    #[must_use]
    pub fn detect(&self, bins: &[BinStatistic]) -> Option<TrendMetric> {
        let eligible: Vec<&BinStatistic> = bins
            .iter()
            .filter(|b| b.passes_n_threshold)
            .sorted_by(|a, b| a.age_mid.total_cmp(&b.age_mid))
            .collect();
        let first = eligible.first()?;

        let x: Vec<f64> = eligible.iter().map(|b| b.age_mid).collect();
        let y: Vec<f64> = eligible.iter().map(|b| b.cv).collect();

        let correlation = spearman(&x, &y);
        let spearman_rho = correlation.map(|s| s.rho);
        let spearman_p = correlation.and_then(|s| s.p_value);
        let linear_slope_cv_per_year = ols_slope(&x, &y);

        let (log_x, log_y): (Vec<f64>, Vec<f64>) = x
            .iter()
            .zip(&y)
            .filter(|&(_, &cv)| cv > 0.0)
            .map(|(&age, &cv)| (age, cv.ln()))
            .unzip();
        let linear_slope_logcv_per_year = ols_slope(&log_x, &log_y);

        let n_bins = eligible.len();
        let decline_flag = n_bins >= self.min_trend_bins
            && spearman_rho.is_some_and(|rho| rho < 0.0)
            && spearman_p.is_some_and(|p| p < self.significance_level)
            && linear_slope_cv_per_year.is_some_and(|s| s < 0.0);

        if spearman_rho.is_none() {
            debug!(
                "Rank correlation undefined for {} ({}) over {n_bins} bins",
                first.biomarker_id, first.stratum
            );
        }

        Some(TrendMetric {
            biomarker_id: first.biomarker_id.clone(),
            biomarker_name: first.biomarker_name.clone(),
            stratum: first.stratum,
            n_bins,
            spearman_rho,
            spearman_p,
            linear_slope_cv_per_year,
            linear_slope_logcv_per_year,
            decline_flag,
        })
    }

    /// Trend metrics for every `(biomarker, stratum)` in a statistics table
    ///
    /// Ordered by biomarker id then stratum.
    #[must_use]
    pub fn detect_all(&self, bins: &[BinStatistic]) -> Vec<TrendMetric> {
        let groups = bins
            .iter()
            .cloned()
            .into_group_map_by(|b| (b.biomarker_id.clone(), b.stratum));

        let mut metrics: Vec<TrendMetric> = groups
            .into_par_iter()
            .filter_map(|(_, group)| self.detect(&group))
            .collect();
        metrics.sort_by(|a, b| {
            a.biomarker_id
                .cmp(&b.biomarker_id)
                .then(a.stratum.cmp(&b.stratum))
        });
        metrics
    }
}
