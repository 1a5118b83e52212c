//! IEEE-754 binary16 conversion.
//!
//! Waveform textures store amplitude and band energy as 16-bit floats, so
//! this conversion decides the exact shape drawn at every level boundary.
//! Encoding rounds to nearest, ties to even. Results that are still
//! subnormal after rounding flush to signed zero, overflow saturates to
//! signed infinity.

const F16_SIGN_MASK: u16 = 0x8000;
const F16_INFINITY: u16 = 0x7c00;
const F16_QUIET_NAN: u16 = 0x7e00;
const F16_EXP_BIAS: i32 = 15;
const F32_EXP_BIAS: i32 = 127;

/// Smallest positive normal binary16 value, `2^-14`.
pub const F16_MIN_POSITIVE: f32 = 6.103_515_6e-5;

/// Largest finite binary16 value.
pub const F16_MAX: f32 = 65504.0;

/// Encode an `f32` as binary16 bits.
pub fn f32_to_f16(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) as u16) & F16_SIGN_MASK;
    let exponent = ((bits >> 23) & 0xff) as i32;
    let mantissa = bits & 0x007f_ffff;

    if exponent == 0xff {
        return if mantissa == 0 {
            sign | F16_INFINITY
        } else {
            sign | F16_QUIET_NAN
        };
    }

    let mut half_exponent = exponent - F32_EXP_BIAS + F16_EXP_BIAS;
    if half_exponent >= 0x1f {
        return sign | F16_INFINITY;
    }
    if half_exponent <= 0 {
        // Round onto the subnormal grid first: values that round up to
        // 2^-14 become the smallest normal, everything else flushes.
        let shift = (14 - half_exponent) as u32;
        if shift > 24 {
            return sign;
        }
        let full = mantissa | 0x0080_0000;
        let mut units = full >> shift;
        let remainder = full & ((1 << shift) - 1);
        let halfway = 1 << (shift - 1);
        if remainder > halfway || (remainder == halfway && (units & 1) == 1) {
            units += 1;
        }
        return if units >= 0x400 { sign | 0x0400 } else { sign };
    }

    let mut half_mantissa = mantissa >> 13;
    let remainder = mantissa & 0x1fff;
    if remainder > 0x1000 || (remainder == 0x1000 && (half_mantissa & 1) == 1) {
        half_mantissa += 1;
        if half_mantissa == 0x400 {
            half_mantissa = 0;
            half_exponent += 1;
            if half_exponent >= 0x1f {
                return sign | F16_INFINITY;
            }
        }
    }

    sign | ((half_exponent as u16) << 10) | half_mantissa as u16
}

/// Decode binary16 bits, including subnormals.
pub fn f16_to_f32(half: u16) -> f32 {
    let sign = ((half & F16_SIGN_MASK) as u32) << 16;
    let exponent = ((half >> 10) & 0x1f) as u32;
    let mantissa = (half & 0x03ff) as u32;

    let bits = match (exponent, mantissa) {
        (0, 0) => sign,
        (0, m) => {
            // Subnormal: value = m * 2^-24
            let magnitude = m as f32 * 2.0f32.powi(-24);
            return if sign != 0 { -magnitude } else { magnitude };
        }
        (0x1f, 0) => sign | 0x7f80_0000,
        (0x1f, m) => sign | 0x7f80_0000 | (m << 13),
        (e, m) => {
            let e32 = e as i32 - F16_EXP_BIAS + F32_EXP_BIAS;
            sign | ((e32 as u32) << 23) | (m << 13)
        }
    };

    f32::from_bits(bits)
}

/// Distance between adjacent binary16 values around `x` (normal range).
pub fn f16_step(x: f32) -> f32 {
    let magnitude = x.abs().max(F16_MIN_POSITIVE);
    let exponent = magnitude.log2().floor() as i32;
    2.0f32.powi(exponent - 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_values() {
        assert_eq!(f32_to_f16(0.0), 0x0000);
        assert_eq!(f32_to_f16(-0.0), 0x8000);
        assert_eq!(f32_to_f16(1.0), 0x3c00);
        assert_eq!(f32_to_f16(-2.0), 0xc000);
        assert_eq!(f32_to_f16(0.5), 0x3800);
        assert_eq!(f32_to_f16(F16_MAX), 0x7bff);
        assert_eq!(f32_to_f16(F16_MIN_POSITIVE), 0x0400);
    }

    #[test]
    fn test_round_to_nearest_even() {
        // 1 + 2^-11 is exactly halfway between 1.0 and the next f16; even wins
        assert_eq!(f32_to_f16(1.0 + 2.0f32.powi(-11)), 0x3c00);
        // 1 + 3*2^-11 is halfway between odd 0x3c01 and even 0x3c02
        assert_eq!(f32_to_f16(1.0 + 3.0 * 2.0f32.powi(-11)), 0x3c02);
        // Just above halfway rounds up
        assert_eq!(f32_to_f16(1.0 + 2.0f32.powi(-11) + 2.0f32.powi(-20)), 0x3c01);
    }

    #[test]
    fn test_mantissa_carry_into_exponent() {
        // Largest f32 below 2.0 rounds up to exactly 2.0
        assert_eq!(f32_to_f16(f32::from_bits(0x3fff_ffff)), 0x4000);
    }

    #[test]
    fn test_overflow_to_infinity() {
        assert_eq!(f32_to_f16(65520.0), 0x7c00);
        assert_eq!(f32_to_f16(1e10), 0x7c00);
        assert_eq!(f32_to_f16(-1e10), 0xfc00);
        assert_eq!(f32_to_f16(f32::INFINITY), 0x7c00);
    }

    #[test]
    fn test_subnormal_flushes_to_signed_zero() {
        assert_eq!(f32_to_f16(1e-6), 0x0000);
        assert_eq!(f32_to_f16(-1e-6), 0x8000);
        assert_eq!(f32_to_f16(f32::MIN_POSITIVE), 0x0000);
    }

    #[test]
    fn test_rounds_up_to_smallest_normal() {
        assert_eq!(f32_to_f16(f32::from_bits(0x387f_ffff)), 0x0400);
        assert_eq!(f32_to_f16(-f32::from_bits(0x387f_ffff)), 0x8400);
        // Halfway between the largest subnormal and 2^-14 ties to even.
        assert_eq!(f32_to_f16(1023.5 * 2.0f32.powi(-24)), 0x0400);
        assert_eq!(f32_to_f16(1023.25 * 2.0f32.powi(-24)), 0x0000);
        assert_eq!(f32_to_f16(F16_MIN_POSITIVE), 0x0400);
    }

    #[test]
    fn test_nan_stays_nan() {
        assert!(f16_to_f32(f32_to_f16(f32::NAN)).is_nan());
    }

    #[test]
    fn test_decode_subnormal() {
        assert_eq!(f16_to_f32(0x0001), 2.0f32.powi(-24));
        assert_eq!(f16_to_f32(0x8001), -(2.0f32.powi(-24)));
    }

    #[test]
    fn test_unit_range_round_trip_within_step() {
        for i in 1..=1000 {
            let x = i as f32 / 1000.0;
            let back = f16_to_f32(f32_to_f16(x));
            assert!(
                (back - x).abs() <= f16_step(x) * 0.5,
                "x = {}, back = {}",
                x,
                back
            );
        }
    }
}
