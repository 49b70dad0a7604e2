use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Currency, coefficients, and rates all use this type so that accrual is
/// deterministic across platforms. Currency may be fractional during
/// accrual; it is floored only at the display/persistence boundary.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of session time (reference period: 1 second).
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only at the data-file boundary.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display/persistence.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Floor a non-negative currency amount to whole points.
#[inline]
pub fn floor_points(v: Fixed64) -> u64 {
    let floored: i64 = v.floor().to_num();
    floored.max(0) as u64
}
