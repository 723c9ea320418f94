/// Sentinel used for an unbounded axis.
pub const INFINITE: f32 = f32::INFINITY;

/// Tolerance for float comparisons.
const EPSILON: f32 = 0.001;

/// True if `value` is close enough to zero to be treated as zero.
pub fn near_zero(value: f32) -> bool {
    value.abs() <= EPSILON
}

/// True if `a` and `b` differ by less than the comparison tolerance.
pub fn near_equal(a: f32, b: f32) -> bool {
    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }
    near_zero(a - b)
}

/// True if `value` should be treated as an unbounded axis.
///
/// Values at or above half of `f32::MAX` count as infinite, so bounds that
/// were derived from the sentinel by subtracting padding still read as
/// unbounded.
pub fn is_infinite(value: f32) -> bool {
    value.is_infinite() || value >= f32::MAX / 2.0
}
