//! Fixed adult age bins
//!
//! Five-year buckets `20-24` through `80-84` plus an open-ended `85+`.
//! Intervals are left-inclusive and right-exclusive.

use std::fmt;

const FIRST_BIN_START: u32 = 20;
const BIN_WIDTH: u32 = 5;
const OPEN_BIN_START: u32 = 85;
/// Conventional midpoint of the open-ended bin
const OPEN_BIN_MID: f64 = 87.5;
const BIN_COUNT: u8 = ((OPEN_BIN_START - FIRST_BIN_START) / BIN_WIDTH) as u8 + 1;

/// One age bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgeBin {
    index: u8,
}

impl AgeBin {
    /// Bin containing `age_years`, `None` below 20 or for non-finite ages
    #[must_use]
    pub fn for_age(age_years: f64) -> Option<Self> {
        if !age_years.is_finite() || age_years < f64::from(FIRST_BIN_START) {
            return None;
        }
        if age_years >= f64::from(OPEN_BIN_START) {
            return Some(Self {
                index: BIN_COUNT - 1,
            });
        }
        let offset = ((age_years - f64::from(FIRST_BIN_START)) / f64::from(BIN_WIDTH)).floor();
        Some(Self {
            index: offset as u8,
        })
    }

    /// Every bin in age order
    pub fn all() -> impl Iterator<Item = AgeBin> {
        (0..BIN_COUNT).map(|index| AgeBin { index })
    }

    /// Inclusive lower edge in years
    #[must_use]
    pub fn lower(self) -> u32 {
        FIRST_BIN_START + u32::from(self.index) * BIN_WIDTH
    }

    /// Exclusive upper edge in years, `None` for the open-ended bin
    #[must_use]
    pub fn upper(self) -> Option<u32> {
        (!self.is_open_ended()).then(|| self.lower() + BIN_WIDTH)
    }

    #[must_use]
    pub fn is_open_ended(self) -> bool {
        self.index == BIN_COUNT - 1
    }

    #[must_use]
    pub fn midpoint(self) -> f64 {
        if self.is_open_ended() {
            OPEN_BIN_MID
        } else {
            f64::from(self.lower()) + f64::from(BIN_WIDTH) / 2.0
        }
    }

    /// Label such as `20-24` or `85+`
    #[must_use]
    pub fn label(self) -> String {
        match self.upper() {
            Some(upper) => format!("{}-{}", self.lower(), upper - 1),
            None => format!("{}+", self.lower()),
        }
    }
}

impl fmt::Display for AgeBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
