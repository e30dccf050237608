use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Lower bound used when clamping a net power balance. Large enough that
/// no real vessel reaches it, small enough to stay far from `Fixed64::MIN`.
pub const NET_FLOOR: Fixed64 = Fixed64::const_from_int(-9_999_999);

/// Upper bound on the extra capacity a buffer may be grown by.
pub const EXTRA_CEILING: Fixed64 = Fixed64::const_from_int(9_999_999);

/// Convert an f64 to Fixed64. Use only for initialization, never in sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::saturating_from_num(v)
}

/// Convert Fixed64 to f64. Use only for display/logging, never in sim loop.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Clamp `v` into `[lo, hi]`. `lo` must not exceed `hi`.
#[inline]
pub fn clamp(v: Fixed64, lo: Fixed64, hi: Fixed64) -> Fixed64 {
    v.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed64_basic_arithmetic() {
        let a = f64_to_fixed64(1.5);
        let b = f64_to_fixed64(2.0);
        assert_eq!(fixed64_to_f64(a + b), 3.5);
        assert_eq!(fixed64_to_f64(a * b), 3.0);
    }

    #[test]
    fn conversion_saturates_instead_of_panicking() {
        assert_eq!(f64_to_fixed64(1e30), Fixed64::MAX);
        assert_eq!(f64_to_fixed64(-1e30), Fixed64::MIN);
    }

    #[test]
    fn sentinels_have_expected_values() {
        assert_eq!(fixed64_to_f64(NET_FLOOR), -9_999_999.0);
        assert_eq!(fixed64_to_f64(EXTRA_CEILING), 9_999_999.0);
    }

    #[test]
    fn clamp_respects_both_bounds() {
        let zero = Fixed64::ZERO;
        let ten = Fixed64::from_num(10);
        assert_eq!(clamp(Fixed64::from_num(-3), zero, ten), zero);
        assert_eq!(clamp(Fixed64::from_num(12), zero, ten), ten);
        assert_eq!(clamp(Fixed64::from_num(4), zero, ten), Fixed64::from_num(4));
    }
}
