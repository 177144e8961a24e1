//! Unit signature parsing

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static UNIT_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([pnumcd]?)(g|mol|iu|u|eq|kat)/(l|dl|ml|ul)$").expect("unit grammar is valid")
});

/// Quantity measured in the numerator of a concentration unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumBase {
    G,
    Mol,
    Iu,
    U,
    Eq,
    Kat,
}

impl NumBase {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "g" => Some(NumBase::G),
            "mol" => Some(NumBase::Mol),
            "iu" => Some(NumBase::Iu),
            "u" => Some(NumBase::U),
            "eq" => Some(NumBase::Eq),
            "kat" => Some(NumBase::Kat),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NumBase::G => "g",
            NumBase::Mol => "mol",
            NumBase::Iu => "iu",
            NumBase::U => "u",
            NumBase::Eq => "eq",
            NumBase::Kat => "kat",
        }
    }
}

impl fmt::Display for NumBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical decomposition of a concentration unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSignature {
    pub num_base: NumBase,
    /// Power-of-ten multiplier of the numerator prefix
    pub num_scale: f64,
    /// Denominator volume as a fraction of a litre
    pub den_scale: f64,
    /// The normalized unit string the signature was parsed from
    pub unit_norm: String,
}

impl UnitSignature {
    /// Two signatures are compatible when they measure the same base quantity
    #[must_use]
    pub fn is_compatible(&self, other: &UnitSignature) -> bool {
        self.num_base == other.num_base
    }

    /// Amount of base quantity per litre represented by one unit
    #[must_use]
    pub fn density(&self) -> f64 {
        self.num_scale / self.den_scale
    }

    /// Compatibility class key, e.g. `g/vol`
    #[must_use]
    pub fn compat_key(&self) -> String {
        format!("{}/vol", self.num_base)
    }
}

fn prefix_scale(prefix: &str) -> Option<f64> {
    match prefix {
        "" => Some(1.0),
        "p" => Some(1e-12),
        "n" => Some(1e-9),
        "u" => Some(1e-6),
        "m" => Some(1e-3),
        "c" => Some(1e-2),
        "d" => Some(1e-1),
        _ => None,
    }
}

fn denominator_scale(den: &str) -> Option<f64> {
    match den {
        "l" => Some(1.0),
        "dl" => Some(1e-1),
        "ml" => Some(1e-3),
        "ul" => Some(1e-6),
        _ => None,
    }
}

/// Normalize a raw unit string
///
/// Trims, lowercases, maps both micro sign code points to `u` and removes all
/// whitespace.
#[must_use]
pub fn normalize_unit(unit: &str) -> String {
    unit.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '\u{00b5}' | '\u{03bc}' => 'u',
            other => other,
        })
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Parse a raw unit string into its signature
///
/// Returns `None` for empty input or anything outside
/// `[pnumcd]?(g|mol|iu|u|eq|kat)/(l|dl|ml|ul)`.
#[must_use]
pub fn parse_unit_signature(unit: &str) -> Option<UnitSignature> {
    let unit_norm = normalize_unit(unit);
    if unit_norm.is_empty() {
        return None;
    }
    let caps = UNIT_GRAMMAR.captures(&unit_norm)?;
    let num_scale = prefix_scale(caps.get(1).map_or("", |m| m.as_str()))?;
    let num_base = NumBase::from_token(caps.get(2)?.as_str())?;
    let den_scale = denominator_scale(caps.get(3)?.as_str())?;

    Some(UnitSignature {
        num_base,
        num_scale,
        den_scale,
        unit_norm,
    })
}
