//! Exact decimal arithmetic
//!
//! `BigInt` stores a sign and little-endian base-10⁹ limbs. `Decimal` pairs a
//! `BigInt` mantissa with a decimal scale so that fixed-point digit strings
//! such as `-12.5` can be added, subtracted and multiplied without rounding.
//! Both types only live for the duration of one exact operation; results are
//! rendered back into digit strings.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{Result, SolidError};

const BASE: u64 = 1_000_000_000;
const BASE_DIGITS: usize = 9;

/// Arbitrary precision signed integer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigInt {
    negative: bool,
    /// Little-endian base-10⁹ groups; empty means zero
    limbs: Vec<u32>,
}

impl BigInt {
    pub fn zero() -> Self {
        Self {
            negative: false,
            limbs: Vec::new(),
        }
    }

    pub fn from_u64(value: u64) -> Self {
        let mut limbs = Vec::new();
        let mut rest = value;
        while rest > 0 {
            limbs.push((rest % BASE) as u32);
            rest /= BASE;
        }
        Self {
            negative: false,
            limbs,
        }
    }

    /// Parse an optionally signed run of decimal digits
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let bytes = digits.as_bytes();
        let mut limbs = Vec::with_capacity(bytes.len() / BASE_DIGITS + 1);
        let mut end = bytes.len();
        while end > 0 {
            let start = end.saturating_sub(BASE_DIGITS);
            let mut limb = 0u32;
            for &b in &bytes[start..end] {
                limb = limb * 10 + u32::from(b - b'0');
            }
            limbs.push(limb);
            end = start;
        }

        let mut value = Self { negative, limbs };
        value.normalize();
        Some(value)
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn abs(&self) -> Self {
        Self {
            negative: false,
            limbs: self.limbs.clone(),
        }
    }

    pub fn negated(&self) -> Self {
        let mut value = self.clone();
        value.negative = !value.negative;
        value.normalize();
        value
    }

    /// 10^exponent
    pub fn pow10(exponent: u32) -> Self {
        let mut limbs = vec![0u32; exponent as usize / BASE_DIGITS];
        limbs.push(10u32.pow(exponent % BASE_DIGITS as u32));
        Self {
            negative: false,
            limbs,
        }
    }

    /// Value as `u64` when it is non-negative and fits
    pub fn to_u64(&self) -> Option<u64> {
        if self.negative {
            return None;
        }
        let mut value: u64 = 0;
        for &limb in self.limbs.iter().rev() {
            value = value.checked_mul(BASE)?.checked_add(u64::from(limb))?;
        }
        Some(value)
    }

    pub fn to_f64(&self) -> f64 {
        let magnitude = self
            .limbs
            .iter()
            .rev()
            .fold(0.0f64, |acc, &limb| acc * BASE as f64 + f64::from(limb));
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }

    fn normalize(&mut self) {
        while self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
        if self.limbs.is_empty() {
            self.negative = false;
        }
    }

    /// Compare magnitudes, ignoring sign
    pub fn cmp_magnitude(&self, other: &Self) -> Ordering {
        cmp_limbs(&self.limbs, &other.limbs)
    }

    pub fn add(&self, other: &Self) -> Self {
        let mut result = if self.negative == other.negative {
            Self {
                negative: self.negative,
                limbs: add_limbs(&self.limbs, &other.limbs),
            }
        } else {
            match cmp_limbs(&self.limbs, &other.limbs) {
                Ordering::Less => Self {
                    negative: other.negative,
                    limbs: sub_limbs(&other.limbs, &self.limbs),
                },
                _ => Self {
                    negative: self.negative,
                    limbs: sub_limbs(&self.limbs, &other.limbs),
                },
            }
        };
        result.normalize();
        result
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.negated())
    }

    /// Schoolbook O(n·m) multiplication over base-10⁹ groups
    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let mut acc = vec![0u64; self.limbs.len() + other.limbs.len() + 1];
        for (i, &a) in self.limbs.iter().enumerate() {
            let mut carry = 0u64;
            for (j, &b) in other.limbs.iter().enumerate() {
                let cur = acc[i + j] + u64::from(a) * u64::from(b) + carry;
                acc[i + j] = cur % BASE;
                carry = cur / BASE;
            }
            let mut k = i + other.limbs.len();
            while carry > 0 {
                let cur = acc[k] + carry;
                acc[k] = cur % BASE;
                carry = cur / BASE;
                k += 1;
            }
        }
        let mut result = Self {
            negative: self.negative != other.negative,
            limbs: acc.into_iter().map(|limb| limb as u32).collect(),
        };
        result.normalize();
        result
    }

    fn mul_small_add(&self, factor: u32, addend: u32) -> Self {
        let mut limbs = Vec::with_capacity(self.limbs.len() + 1);
        let mut carry = u64::from(addend);
        for &limb in &self.limbs {
            let cur = u64::from(limb) * u64::from(factor) + carry;
            limbs.push((cur % BASE) as u32);
            carry = cur / BASE;
        }
        while carry > 0 {
            limbs.push((carry % BASE) as u32);
            carry /= BASE;
        }
        let mut result = Self {
            negative: self.negative,
            limbs,
        };
        result.normalize();
        result
    }

    /// Truncating division returning `(quotient, remainder)`; `None` for a zero divisor.
    /// The remainder carries the sign of the dividend.
    pub fn div_rem(&self, divisor: &Self) -> Option<(Self, Self)> {
        if divisor.is_zero() {
            return None;
        }
        let divisor_abs = divisor.abs();
        let digits = self.abs().to_string();

        let mut quotient_digits = String::with_capacity(digits.len());
        let mut remainder = Self::zero();
        for b in digits.bytes() {
            remainder = remainder.mul_small_add(10, u32::from(b - b'0'));
            let mut digit = 0u8;
            while remainder.cmp_magnitude(&divisor_abs) != Ordering::Less {
                remainder = Self {
                    negative: false,
                    limbs: sub_limbs(&remainder.limbs, &divisor_abs.limbs),
                };
                remainder.normalize();
                digit += 1;
            }
            quotient_digits.push(char::from(b'0' + digit));
        }

        let mut quotient = Self::parse(&quotient_digits)?;
        quotient.negative = self.negative != divisor.negative;
        quotient.normalize();
        remainder.negative = self.negative;
        remainder.normalize();
        Some((quotient, remainder))
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((top, rest)) = self.limbs.split_last() else {
            return write!(f, "0");
        };
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "{}", top)?;
        for limb in rest.iter().rev() {
            write!(f, "{:09}", limb)?;
        }
        Ok(())
    }
}

fn cmp_limbs(a: &[u32], b: &[u32]) -> Ordering {
    a.len()
        .cmp(&b.len())
        .then_with(|| a.iter().rev().cmp(b.iter().rev()))
}

fn add_limbs(a: &[u32], b: &[u32]) -> Vec<u32> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut result = Vec::with_capacity(long.len() + 1);
    let mut carry = 0u64;
    for (i, &limb) in long.iter().enumerate() {
        let cur = u64::from(limb) + u64::from(short.get(i).copied().unwrap_or(0)) + carry;
        result.push((cur % BASE) as u32);
        carry = cur / BASE;
    }
    if carry > 0 {
        result.push(carry as u32);
    }
    result
}

/// Requires `a >= b` in magnitude
fn sub_limbs(a: &[u32], b: &[u32]) -> Vec<u32> {
    debug_assert!(cmp_limbs(a, b) != Ordering::Less);
    let mut result = Vec::with_capacity(a.len());
    let mut borrow = 0i64;
    for (i, &limb) in a.iter().enumerate() {
        let mut cur = i64::from(limb) - i64::from(b.get(i).copied().unwrap_or(0)) - borrow;
        if cur < 0 {
            cur += BASE as i64;
            borrow = 1;
        } else {
            borrow = 0;
        }
        result.push(cur as u32);
    }
    result
}

/// Fixed-point decimal: `mantissa / 10^scale`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    mantissa: BigInt,
    scale: u32,
}

impl Decimal {
    pub fn from_bigint(mantissa: BigInt) -> Self {
        Self { mantissa, scale: 0 }
    }

    /// Parse `[-]digits[.digits]`. At least one digit is required.
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        let mut digits = String::with_capacity(body.len() + 1);
        if negative {
            digits.push('-');
        }
        digits.push_str(int_part);
        digits.push_str(frac_part);
        if digits == "-" {
            return None;
        }
        let mantissa = BigInt::parse(&digits)?;
        Some(Self {
            mantissa,
            scale: u32::try_from(frac_part.len()).ok()?,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    pub fn is_integer(&self) -> bool {
        self.normalized().scale == 0
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    fn rescaled(&self, scale: u32) -> BigInt {
        debug_assert!(scale >= self.scale);
        if scale == self.scale {
            self.mantissa.clone()
        } else {
            self.mantissa.mul(&BigInt::pow10(scale - self.scale))
        }
    }

    /// Drop trailing fractional zeros
    pub fn normalized(&self) -> Self {
        let mut value = self.clone();
        let ten = BigInt::from_u64(10);
        while value.scale > 0 {
            match value.mantissa.div_rem(&ten) {
                Some((quotient, remainder)) if remainder.is_zero() => {
                    value.mantissa = quotient;
                    value.scale -= 1;
                }
                _ => break,
            }
        }
        value
    }

    pub fn add(&self, other: &Self) -> Self {
        let scale = self.scale.max(other.scale);
        Self {
            mantissa: self.rescaled(scale).add(&other.rescaled(scale)),
            scale,
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        let scale = self.scale.max(other.scale);
        Self {
            mantissa: self.rescaled(scale).sub(&other.rescaled(scale)),
            scale,
        }
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self {
            mantissa: self.mantissa.mul(&other.mantissa),
            scale: self.scale + other.scale,
        }
    }

    /// Divide, succeeding only when the quotient is an exact integer
    pub fn div_exact(&self, divisor: &Self) -> Result<Self> {
        if divisor.is_zero() {
            return Err(SolidError::invalid_operand("division by exact zero"));
        }
        let scale = self.scale.max(divisor.scale);
        let numerator = self.rescaled(scale);
        let denominator = divisor.rescaled(scale);
        let (quotient, remainder) = numerator
            .div_rem(&denominator)
            .ok_or_else(|| SolidError::invalid_operand("division by exact zero"))?;
        if !remainder.is_zero() {
            return Err(SolidError::not_exact(format!(
                "{} / {} leaves remainder {}",
                self, divisor, remainder
            )));
        }
        Ok(Self::from_bigint(quotient))
    }

    /// Quotient truncated to `fraction_digits` fractional digits; `None` for a zero divisor
    pub fn div_truncated(&self, divisor: &Self, fraction_digits: u32) -> Option<Self> {
        let scale = self.scale.max(divisor.scale);
        let numerator = self.rescaled(scale).mul(&BigInt::pow10(fraction_digits));
        let (quotient, _) = numerator.div_rem(&divisor.rescaled(scale))?;
        Some(Self {
            mantissa: quotient,
            scale: fraction_digits,
        })
    }

    /// Drop fractional digits beyond `max_fraction` (truncation toward zero)
    pub fn truncated(&self, max_fraction: u32) -> Self {
        if self.scale <= max_fraction {
            return self.clone();
        }
        let divisor = BigInt::pow10(self.scale - max_fraction);
        match self.mantissa.div_rem(&divisor) {
            Some((quotient, _)) => Self {
                mantissa: quotient,
                scale: max_fraction,
            },
            None => self.clone(),
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.normalized();
        if value.scale == 0 {
            return write!(f, "{}", value.mantissa);
        }
        let digits = value.mantissa.abs().to_string();
        let scale = value.scale as usize;
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        if value.mantissa.is_negative() {
            write!(f, "-")?;
        }
        write!(f, "{}.{}", int_part, frac_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> BigInt {
        BigInt::parse(s).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::parse(s).unwrap()
    }

    #[test]
    fn test_parse_and_render() {
        assert_eq!(big("0").to_string(), "0");
        assert_eq!(big("-0").to_string(), "0");
        assert_eq!(big("000123").to_string(), "123");
        assert_eq!(big("1000000000").to_string(), "1000000000");
        assert_eq!(big("-98765432123456789").to_string(), "-98765432123456789");
        assert!(BigInt::parse("12a").is_none());
        assert!(BigInt::parse("").is_none());
        assert!(BigInt::parse("-").is_none());
    }

    #[test]
    fn test_add_with_carry_across_limbs() {
        assert_eq!(big("999999999").add(&big("1")).to_string(), "1000000000");
        assert_eq!(
            big("123456789012345678901234567890")
                .add(&big("987654321098765432109876543210"))
                .to_string(),
            "1111111110111111111011111111100"
        );
    }

    #[test]
    fn test_signed_subtraction() {
        assert_eq!(big("5").sub(&big("8")).to_string(), "-3");
        assert_eq!(big("-5").sub(&big("-8")).to_string(), "3");
        assert_eq!(big("1000000000").sub(&big("1")).to_string(), "999999999");
        assert_eq!(big("42").sub(&big("42")).to_string(), "0");
    }

    #[test]
    fn test_schoolbook_multiply() {
        assert_eq!(
            big("123456789").mul(&big("987654321")).to_string(),
            "121932631112635269"
        );
        assert_eq!(big("-12").mul(&big("12")).to_string(), "-144");
        assert_eq!(big("0").mul(&big("-12")).to_string(), "0");
    }

    #[test]
    fn test_div_rem() {
        let (q, r) = big("121932631112635269").div_rem(&big("987654321")).unwrap();
        assert_eq!(q.to_string(), "123456789");
        assert!(r.is_zero());

        let (q, r) = big("-17").div_rem(&big("5")).unwrap();
        assert_eq!(q.to_string(), "-3");
        assert_eq!(r.to_string(), "-2");

        assert!(big("1").div_rem(&BigInt::zero()).is_none());
    }

    #[test]
    fn test_magnitude_compare() {
        assert_eq!(big("-10").cmp_magnitude(&big("9")), Ordering::Greater);
        assert_eq!(big("1000000000").cmp_magnitude(&big("999999999")), Ordering::Greater);
        assert_eq!(big("7").cmp_magnitude(&big("-7")), Ordering::Equal);
    }

    #[test]
    fn test_decimal_arithmetic() {
        assert_eq!(dec("1.5").add(&dec("2.25")).to_string(), "3.75");
        assert_eq!(dec("0.1").sub(&dec("0.35")).to_string(), "-0.25");
        assert_eq!(dec("1.50").add(&dec("1.50")).to_string(), "3");
        assert_eq!(dec("-1.5").mul(&dec("0.2")).to_string(), "-0.3");
        assert_eq!(dec(".5").to_string(), "0.5");
    }

    #[test]
    fn test_decimal_exact_division() {
        assert_eq!(dec("144").div_exact(&dec("12")).unwrap().to_string(), "12");
        assert_eq!(dec("7.5").div_exact(&dec("2.5")).unwrap().to_string(), "3");
        assert!(matches!(
            dec("1").div_exact(&dec("3")),
            Err(SolidError::NotExact { .. })
        ));
        assert_eq!(dec("2").div_truncated(&dec("3"), 4).unwrap().to_string(), "0.6666");
        assert!(dec("2").div_truncated(&dec("0"), 4).is_none());
    }

    #[test]
    fn test_decimal_truncation() {
        assert_eq!(dec("3.14159").truncated(2).to_string(), "3.14");
        assert_eq!(dec("-2.999").truncated(0).to_string(), "-2");
        assert!(dec("4.000").is_integer());
        assert!(!dec("4.001").is_integer());
    }
}
