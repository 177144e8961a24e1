//! Cohort eligibility table
//!
//! Built by demographic and health-flag construction upstream. The pipeline
//! only looks members up by `(cycle_start_year, subject_id)`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{BiomarkerError, Result};
use crate::models::observation::Sex;

/// Youngest age admitted to the cohort
pub const MIN_COHORT_AGE: f64 = 20.0;

/// One participant of one survey cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortMember {
    pub subject_id: i64,
    pub age_years: f64,
    pub sex: Sex,
    pub cycle_start_year: i32,
    pub healthy_flag: bool,
    /// Pipe-joined health exclusions, empty for healthy members
    pub exclusion_reason: String,
}

/// Cohort members indexed by cycle and subject
#[derive(Debug, Clone, Default)]
pub struct CohortTable {
    by_cycle: FxHashMap<i32, FxHashMap<i64, CohortMember>>,
    len: usize,
}

impl CohortTable {
    /// Index cohort members
    ///
    /// Members younger than 20 or with a non-finite age are dropped. A later
    /// row for the same `(cycle, subject)` replaces an earlier one. Fails when
    /// no member remains.
    pub fn new(members: impl IntoIterator<Item = CohortMember>) -> Result<Self> {
        let mut by_cycle: FxHashMap<i32, FxHashMap<i64, CohortMember>> = FxHashMap::default();
        for member in members {
            if !member.age_years.is_finite() || member.age_years < MIN_COHORT_AGE {
                continue;
            }
            by_cycle
                .entry(member.cycle_start_year)
                .or_default()
                .insert(member.subject_id, member);
        }

        let len = by_cycle.values().map(FxHashMap::len).sum();
        if len == 0 {
            return Err(BiomarkerError::EmptyInput(
                "cohort table has no adult members".into(),
            ));
        }
        Ok(Self { by_cycle, len })
    }

    /// Look up a member of a cycle
    #[must_use]
    pub fn member(&self, cycle_start_year: i32, subject_id: i64) -> Option<&CohortMember> {
        self.by_cycle.get(&cycle_start_year)?.get(&subject_id)
    }

    /// Whether any member belongs to the cycle
    #[must_use]
    pub fn has_cycle(&self, cycle_start_year: i32) -> bool {
        self.by_cycle
            .get(&cycle_start_year)
            .is_some_and(|m| !m.is_empty())
    }

    /// Total members across all cycles
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Members with `healthy_flag` set
    #[must_use]
    pub fn healthy_count(&self) -> usize {
        self.by_cycle
            .values()
            .flat_map(FxHashMap::values)
            .filter(|m| m.healthy_flag)
            .count()
    }
}
