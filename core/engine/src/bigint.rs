//! `BigInt` primitive values: arbitrary-precision integers.
//!
//! Mixing `BigInt` and `Number` in arithmetic is a `TypeError` by spec
//! (§4.A); this module only implements the `BigInt`-to-`BigInt` operations,
//! leaving the mixed-type rejection to the coercion layer in `value`.

use num_bigint::BigInt as RawBigInt;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use std::fmt;
use std::rc::Rc;

/// The JavaScript `bigint` primitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsBigInt {
    inner: Rc<RawBigInt>,
}

impl JsBigInt {
    pub fn new<T: Into<Self>>(value: T) -> Self {
        value.into()
    }

    pub fn zero() -> Self {
        JsBigInt {
            inner: Rc::new(RawBigInt::zero()),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.inner.is_zero()
    }

    /// Parses a decimal, `0x`, `0b`, or `0o` literal, mirroring the string
    /// grammar `ToNumber` accepts for numeric strings (§4.A), minus the
    /// fractional/exponent parts BigInt syntax forbids.
    pub fn from_string(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Some(Self::zero());
        }
        let (radix, digits) = if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            (16, rest)
        } else if let Some(rest) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
            (2, rest)
        } else if let Some(rest) = s.strip_prefix("0o").or_else(|| s.strip_prefix("0O")) {
            (8, rest)
        } else {
            (10, s)
        };
        RawBigInt::parse_bytes(digits.as_bytes(), radix).map(|v| JsBigInt { inner: Rc::new(v) })
    }

    pub fn to_f64(&self) -> f64 {
        self.inner.to_f64().unwrap_or(f64::NAN)
    }

    /// Two's-complement reinterpretation modulo 2^64, for storing into a
    /// `BigInt64Array`/`BigUint64Array` element (§4.F): unlike [`to_f64`],
    /// this never loses precision for magnitudes beyond the 53-bit `f64`
    /// mantissa, since it reads the low 64 bits straight out of the
    /// arbitrary-precision representation instead of round-tripping through
    /// a float.
    pub fn to_u64_wrapping(&self) -> u64 {
        let sign_byte = if self.inner.sign() == num_bigint::Sign::Minus { 0xff } else { 0x00 };
        let bytes = self.inner.to_signed_bytes_le();
        let mut buf = [sign_byte; 8];
        let take = bytes.len().min(8);
        buf[..take].copy_from_slice(&bytes[..take]);
        u64::from_le_bytes(buf)
    }

    pub fn to_i64_wrapping(&self) -> i64 {
        self.to_u64_wrapping() as i64
    }

    pub fn to_string_radix(&self, radix: u32) -> String {
        self.inner.to_str_radix(radix)
    }

    fn binop(a: &Self, b: &Self, f: impl FnOnce(&RawBigInt, &RawBigInt) -> RawBigInt) -> Self {
        JsBigInt {
            inner: Rc::new(f(&a.inner, &b.inner)),
        }
    }

    pub fn add(a: &Self, b: &Self) -> Self {
        Self::binop(a, b, |x, y| x + y)
    }
    pub fn sub(a: &Self, b: &Self) -> Self {
        Self::binop(a, b, |x, y| x - y)
    }
    pub fn mul(a: &Self, b: &Self) -> Self {
        Self::binop(a, b, |x, y| x * y)
    }

    /// Integer division; truncates toward zero like the `/` operator on
    /// `BigInt` operands. Division by zero is the caller's `RangeError` to
    /// raise (this returns `None`).
    pub fn div(a: &Self, b: &Self) -> Option<Self> {
        if b.is_zero() {
            return None;
        }
        Some(Self::binop(a, b, |x, y| x.div_rem(y).0))
    }

    pub fn rem(a: &Self, b: &Self) -> Option<Self> {
        if b.is_zero() {
            return None;
        }
        Some(Self::binop(a, b, |x, y| x.div_rem(y).1))
    }

    /// `None` on negative exponents, which the `**` operator rejects with a
    /// `RangeError`.
    pub fn pow(a: &Self, b: &Self) -> Option<Self> {
        let exp = b.inner.to_u32()?;
        Some(JsBigInt {
            inner: Rc::new(num_traits::pow::Pow::pow(a.inner.as_ref().clone(), exp)),
        })
    }

    pub fn neg(a: &Self) -> Self {
        JsBigInt {
            inner: Rc::new(-a.inner.as_ref()),
        }
    }

    pub fn bitand(a: &Self, b: &Self) -> Self {
        Self::binop(a, b, |x, y| x & y)
    }
    pub fn bitor(a: &Self, b: &Self) -> Self {
        Self::binop(a, b, |x, y| x | y)
    }
    pub fn bitxor(a: &Self, b: &Self) -> Self {
        Self::binop(a, b, |x, y| x ^ y)
    }
    pub fn shl(a: &Self, n: u32) -> Self {
        JsBigInt {
            inner: Rc::new(a.inner.as_ref() << n),
        }
    }
    pub fn shr(a: &Self, n: u32) -> Self {
        JsBigInt {
            inner: Rc::new(a.inner.as_ref() >> n),
        }
    }
}

impl From<i32> for JsBigInt {
    fn from(v: i32) -> Self {
        JsBigInt {
            inner: Rc::new(RawBigInt::from(v)),
        }
    }
}
impl From<i64> for JsBigInt {
    fn from(v: i64) -> Self {
        JsBigInt {
            inner: Rc::new(RawBigInt::from(v)),
        }
    }
}
impl From<u64> for JsBigInt {
    fn from(v: u64) -> Self {
        JsBigInt {
            inner: Rc::new(RawBigInt::from(v)),
        }
    }
}

impl fmt::Display for JsBigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}n", self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_radix_prefixes() {
        assert_eq!(JsBigInt::from_string("0x10"), Some(JsBigInt::from(16)));
        assert_eq!(JsBigInt::from_string("0b101"), Some(JsBigInt::from(5)));
        assert_eq!(JsBigInt::from_string("0o17"), Some(JsBigInt::from(15)));
        assert_eq!(JsBigInt::from_string("42"), Some(JsBigInt::from(42)));
    }

    #[test]
    fn division_by_zero_is_none() {
        assert_eq!(JsBigInt::div(&JsBigInt::from(1), &JsBigInt::zero()), None);
    }

    #[test]
    fn wrapping_conversion_preserves_precision_past_f64_mantissa() {
        // 2^53 + 1 is the smallest integer f64 cannot represent exactly; the
        // wrapping conversion must still round-trip it exactly.
        let big = JsBigInt::from_string("9007199254740993").unwrap();
        assert_eq!(big.to_u64_wrapping(), 9_007_199_254_740_993);
        assert_eq!(big.to_i64_wrapping(), 9_007_199_254_740_993);

        let neg = JsBigInt::neg(&big);
        assert_eq!(neg.to_i64_wrapping(), -9_007_199_254_740_993);
    }

    #[test]
    fn wrapping_conversion_truncates_modulo_2_64() {
        let huge = JsBigInt::from_string("18446744073709551616").unwrap(); // 2^64
        assert_eq!(huge.to_u64_wrapping(), 0);
        let huge_plus_one = JsBigInt::from_string("18446744073709551617").unwrap(); // 2^64 + 1
        assert_eq!(huge_plus_one.to_u64_wrapping(), 1);
    }

    #[test]
    fn arithmetic() {
        let a = JsBigInt::from(10);
        let b = JsBigInt::from(3);
        assert_eq!(JsBigInt::add(&a, &b), JsBigInt::from(13));
        assert_eq!(JsBigInt::div(&a, &b), Some(JsBigInt::from(3)));
        assert_eq!(JsBigInt::rem(&a, &b), Some(JsBigInt::from(1)));
    }
}
