//! Age-binned aggregation
//!
//! Summarizes one biomarker's values per age bin: count, mean, sample
//! standard deviation, coefficient of variation and the empirical 95% range.

use std::collections::BTreeMap;

use itertools::Itertools;
use rayon::prelude::*;

use super::binning::AgeBin;
use super::descriptive::{mean, quantile_sorted, sample_std};
use crate::config::StatisticsConfig;
use crate::models::observation::HarmonizedObservation;
use crate::models::statistics::{BinStatistic, Stratum};

const CI95_Z: f64 = 1.96;

/// Identity and display fields copied onto every statistic of a biomarker
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BiomarkerKey {
    pub biomarker_id: String,
    pub biomarker_name: String,
    pub unit: String,
}

impl BiomarkerKey {
    fn of(obs: &HarmonizedObservation) -> Self {
        Self {
            biomarker_id: obs.biomarker_id.clone(),
            biomarker_name: obs.biomarker_name.clone(),
            unit: obs.unit.clone(),
        }
    }
}

/// Computes per-bin statistics
#[derive(Debug, Clone)]
pub struct AgeBinnedAggregator {
    min_bin_n: usize,
    mean_epsilon: f64,
    stratify_by_sex: bool,
}

impl Default for AgeBinnedAggregator {
    fn default() -> Self {
        Self::from_config(&StatisticsConfig::default())
    }
}

impl AgeBinnedAggregator {
    #[must_use]
    pub fn from_config(config: &StatisticsConfig) -> Self {
        Self {
            min_bin_n: config.min_bin_n,
            mean_epsilon: config.mean_epsilon,
            stratify_by_sex: config.stratify_by_sex,
        }
    }

    /// Summarize one sub-population of one biomarker
    ///
    /// Pairs are `(age_years, value)`. Pairs without a bin or with a
    /// non-finite value are ignored. Bins whose CV is undefined (|mean| below
    /// epsilon, fewer than two values, or otherwise non-finite) are dropped.
    /// Output is in age order.
    pub fn aggregate(
        &self,
        key: &BiomarkerKey,
        stratum: Stratum,
        pairs: impl IntoIterator<Item = (f64, f64)>,
    ) -> Vec<BinStatistic> {
        let mut by_bin: BTreeMap<AgeBin, Vec<f64>> = BTreeMap::new();
        for (age, value) in pairs {
            if !value.is_finite() {
                continue;
            }
            if let Some(bin) = AgeBin::for_age(age) {
                by_bin.entry(bin).or_default().push(value);
            }
        }

        by_bin
            .into_iter()
            .filter_map(|(bin, mut values)| self.summarize(key, stratum, bin, &mut values))
            .collect()
    }

    fn summarize(
        &self,
        key: &BiomarkerKey,
        stratum: Stratum,
        bin: AgeBin,
        values: &mut [f64],
    ) -> Option<BinStatistic> {
        let n = values.len();
        let m = mean(values)?;
        let std = sample_std(values)?;
        if m.abs() < self.mean_epsilon {
            return None;
        }
        let cv = std / m.abs();
        if !cv.is_finite() {
            return None;
        }

        values.sort_by(f64::total_cmp);
        let half_width = CI95_Z * std / (n as f64).sqrt();

        Some(BinStatistic {
            biomarker_id: key.biomarker_id.clone(),
            biomarker_name: key.biomarker_name.clone(),
            unit: key.unit.clone(),
            stratum,
            age_bin: bin.label(),
            age_mid: bin.midpoint(),
            n,
            mean: m,
            std,
            cv,
            p2_5: quantile_sorted(values, 0.025)?,
            p97_5: quantile_sorted(values, 0.975)?,
            ci95_low: m - half_width,
            ci95_high: m + half_width,
            passes_n_threshold: n >= self.min_bin_n,
        })
    }

    /// Summarize every biomarker in a harmonized table
    ///
    /// Each biomarker is aggregated for stratum `all` and, when stratifying,
    /// for each known sex. Biomarkers are processed in parallel; the result
    /// is ordered by biomarker id, stratum and age.
    #[must_use]
    pub fn aggregate_all(&self, observations: &[HarmonizedObservation]) -> Vec<BinStatistic> {
        let groups = observations
            .iter()
            .into_group_map_by(|obs| obs.biomarker_id.as_str());

        let mut stats: Vec<BinStatistic> = groups
            .into_par_iter()
            .flat_map_iter(|(_, rows)| self.aggregate_biomarker(&rows))
            .collect();

        stats.sort_by(|a, b| {
            a.biomarker_id
                .cmp(&b.biomarker_id)
                .then(a.stratum.cmp(&b.stratum))
                .then(a.age_mid.total_cmp(&b.age_mid))
        });
        stats
    }

    fn aggregate_biomarker(&self, rows: &[&HarmonizedObservation]) -> Vec<BinStatistic> {
        let Some(first) = rows.first() else {
            return Vec::new();
        };
        let key = BiomarkerKey::of(first);

        let mut out = self.aggregate(
            &key,
            Stratum::All,
            rows.iter().map(|o| (o.age_years, o.value)),
        );
        if self.stratify_by_sex {
            for stratum in [Stratum::Male, Stratum::Female] {
                out.extend(
                    self.aggregate(
                        &key,
                        stratum,
                        rows.iter()
                            .filter(|o| Stratum::for_sex(o.sex) == Some(stratum))
                            .map(|o| (o.age_years, o.value)),
                    ),
                );
            }
        }
        out
    }
}
