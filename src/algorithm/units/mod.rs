//! Unit algebra for concentration units
//!
//! Units are accepted only from a closed grammar of mass or substance-amount
//! per volume (`mg/dL`, `umol/L`, `IU/mL`, ...). Anything outside the grammar
//! has no signature and is never converted.

pub mod conversion;
pub mod signature;

pub use conversion::{conversion_factor, convert_value};
pub use signature::{NumBase, UnitSignature, normalize_unit, parse_unit_signature};
