//! Continuity test for numeric columns
//!
//! Separates genuinely continuous measurements from coded or near-constant
//! fields that happen to be stored as numbers.

use rustc_hash::FxHashSet;

use crate::config::ScreeningConfig;

/// Why a column failed the continuity test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuityFailure {
    TooFewValues,
    TooFewDistinct,
    IntegerCoded,
    NearConstant,
}

/// Summary of a column as seen by the continuity test
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuityProfile {
    pub n: usize,
    pub distinct: usize,
    pub integer_fraction: f64,
    pub distinct_fraction: f64,
}

/// Thresholds of the continuity test
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuityTest {
    min_non_missing: usize,
    min_distinct: usize,
    integer_tolerance: f64,
    max_integer_fraction: f64,
    max_integer_distinct: usize,
    min_distinct_fraction: f64,
    near_constant_distinct: usize,
}

impl Default for ContinuityTest {
    fn default() -> Self {
        Self::from_config(&ScreeningConfig::default())
    }
}

impl ContinuityTest {
    #[must_use]
    pub fn from_config(config: &ScreeningConfig) -> Self {
        Self {
            min_non_missing: config.min_non_missing,
            min_distinct: config.min_distinct,
            integer_tolerance: config.integer_tolerance,
            max_integer_fraction: config.max_integer_fraction,
            max_integer_distinct: config.max_integer_distinct,
            min_distinct_fraction: config.min_distinct_fraction,
            near_constant_distinct: config.near_constant_distinct,
        }
    }

    /// Profile the non-missing values of a column
    #[must_use]
    pub fn profile(&self, values: &[Option<f64>]) -> ContinuityProfile {
        let mut distinct: FxHashSet<u64> = FxHashSet::default();
        let mut n = 0usize;
        let mut integer_like = 0usize;

        for v in values.iter().flatten().copied().filter(|v| !v.is_nan()) {
            n += 1;
            // +0.0 and -0.0 are the same value
            let key = if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() };
            distinct.insert(key);
            if v.is_infinite() || (v - v.round()).abs() <= self.integer_tolerance {
                integer_like += 1;
            }
        }

        let (integer_fraction, distinct_fraction) = if n == 0 {
            (1.0, 0.0)
        } else {
            (integer_like as f64 / n as f64, distinct.len() as f64 / n as f64)
        };

        ContinuityProfile {
            n,
            distinct: distinct.len(),
            integer_fraction,
            distinct_fraction,
        }
    }

    /// Evaluate a profile; rules are checked in order and the first failure wins
    pub fn evaluate(&self, profile: &ContinuityProfile) -> Result<(), ContinuityFailure> {
        if profile.n < self.min_non_missing {
            return Err(ContinuityFailure::TooFewValues);
        }
        if profile.distinct < self.min_distinct {
            return Err(ContinuityFailure::TooFewDistinct);
        }
        if profile.integer_fraction > self.max_integer_fraction
            && profile.distinct <= self.max_integer_distinct
        {
            return Err(ContinuityFailure::IntegerCoded);
        }
        if profile.distinct_fraction < self.min_distinct_fraction
            && profile.distinct < self.near_constant_distinct
        {
            return Err(ContinuityFailure::NearConstant);
        }
        Ok(())
    }

    /// Whether a column holds continuous numeric data
    #[must_use]
    pub fn is_continuous(&self, values: &[Option<f64>]) -> bool {
        self.evaluate(&self.profile(values)).is_ok()
    }
}
