//! Conversion between compatible units

use super::signature::parse_unit_signature;

/// Multiplicative factor converting a value in `src_unit` to `dst_unit`
///
/// `None` when either unit has no signature or the base quantities differ.
/// The factor is strictly positive and finite whenever it exists.
#[must_use]
pub fn conversion_factor(src_unit: &str, dst_unit: &str) -> Option<f64> {
    let src = parse_unit_signature(src_unit)?;
    let dst = parse_unit_signature(dst_unit)?;
    if !src.is_compatible(&dst) {
        return None;
    }
    let factor = src.density() / dst.density();
    (factor.is_finite() && factor > 0.0).then_some(factor)
}

/// Convert a value between two units, `None` when they are not reconcilable
#[must_use]
pub fn convert_value(value: f64, src_unit: &str, dst_unit: &str) -> Option<f64> {
    conversion_factor(src_unit, dst_unit).map(|f| value * f)
}
