//! Modular arithmetic and rational approximation helpers
//!
//! Used by terminal-digit extraction (digits far out in a rational expansion),
//! the infinity division algorithm (terminal products via modular inverse)
//! and exact division (repetends of non-integer quotients).

use std::collections::HashMap;

use crate::config;
use crate::exact::Decimal;

/// Fast modular exponentiation: (base^exp) mod m
pub fn power_mod(mut base: i64, mut exp: i64, m: i64) -> i64 {
    if m == 1 {
        return 0;
    }
    if exp == 0 {
        return 1;
    }
    if exp < 0 {
        return match modular_inverse(base, m) {
            Some(inv) => power_mod(inv, -exp, m),
            None => 0,
        };
    }

    let mut result = 1;
    base = ((base % m) + m) % m;

    while exp > 0 {
        if exp % 2 == 1 {
            result = mod_mul(result, base, m);
        }
        exp >>= 1;
        base = mod_mul(base, base, m);
    }

    result
}

/// Modular multiplication with overflow protection
pub fn mod_mul(a: i64, b: i64, m: i64) -> i64 {
    ((a as i128 * b as i128) % m as i128) as i64
}

/// Extended GCD returning (gcd, x, y) where ax + by = gcd
pub fn extended_gcd(a: i64, b: i64) -> (i64, i64, i64) {
    if a == 0 {
        (b, 0, 1)
    } else {
        let (gcd, x1, y1) = extended_gcd(b % a, a);
        (gcd, y1 - (b / a) * x1, x1)
    }
}

/// Modular inverse via the extended Euclidean algorithm
pub fn modular_inverse(a: i64, m: i64) -> Option<i64> {
    let a = ((a % m) + m) % m;
    let (gcd, x, _) = extended_gcd(a, m);
    if gcd != 1 {
        None
    } else {
        Some(((x % m) + m) % m)
    }
}

pub fn gcd(mut a: i64, mut b: i64) -> i64 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Decimal digits `start..start+count` (1-based, after the point) of `num/den`.
///
/// Digit k is `floor(10 · (num·10^(k-1) mod den) / den)`, so no digit before
/// `start` is ever materialized.
pub fn rational_digits(num: i64, den: i64, start: usize, count: usize) -> String {
    if den <= 0 {
        return String::new();
    }
    let num = num.abs() % den;
    let mut remainder = mod_mul(num, power_mod(10, start.saturating_sub(1) as i64, den), den);
    let mut digits = String::with_capacity(count);
    for _ in 0..count {
        let scaled = remainder as i128 * 10;
        let digit = (scaled / den as i128) as u8;
        digits.push(char::from(b'0' + digit));
        remainder = (scaled % den as i128) as i64;
    }
    digits
}

/// Continued fraction terms `[a0; a1, a2, ...]` of `x`
pub fn continued_fraction_terms(x: f64, max_terms: usize) -> Vec<i64> {
    let mut terms = Vec::with_capacity(max_terms);
    if !x.is_finite() {
        return terms;
    }
    let mut rest = x;
    for _ in 0..max_terms {
        let whole = rest.floor();
        if whole.abs() > i64::MAX as f64 / 2.0 {
            break;
        }
        terms.push(whole as i64);
        let frac = rest - whole;
        if frac < 1e-12 {
            break;
        }
        rest = 1.0 / frac;
    }
    terms
}

/// Convergents `p_k / q_k` of a continued fraction, stopping before any overflow
pub fn convergents(terms: &[i64]) -> Vec<(i64, i64)> {
    let mut result = Vec::with_capacity(terms.len());
    let (mut p_prev, mut q_prev) = (1i64, 0i64);
    let (mut p_curr, mut q_curr) = match terms.first() {
        Some(&a0) => (a0, 1i64),
        None => return result,
    };
    result.push((p_curr, q_curr));

    for &a in &terms[1..] {
        let p_next = a.checked_mul(p_curr).and_then(|v| v.checked_add(p_prev));
        let q_next = a.checked_mul(q_curr).and_then(|v| v.checked_add(q_prev));
        let (Some(p_next), Some(q_next)) = (p_next, q_next) else {
            break;
        };
        p_prev = p_curr;
        q_prev = q_curr;
        p_curr = p_next;
        q_curr = q_next;
        result.push((p_curr, q_curr));
    }
    result
}

/// Best rational approximation of `x` with denominator at most `max_denominator`
pub fn best_rational(x: f64, max_denominator: i64) -> (i64, i64) {
    if !x.is_finite() {
        return (0, 1);
    }
    convergents(&continued_fraction_terms(x, 40))
        .into_iter()
        .take_while(|&(_, q)| q <= max_denominator)
        .last()
        .unwrap_or((x.round() as i64, 1))
}

/// Repeating block of the decimal expansion of `numerator / denominator`.
///
/// Terminating expansions repeat `"0"`. Returns `None` when either operand
/// does not fit in 64 bits or the block exceeds the terminal capacity.
pub fn decimal_repetend(numerator: &Decimal, denominator: &Decimal) -> Option<String> {
    let scale = numerator.scale().max(denominator.scale());
    let num = scaled_u64(numerator, scale)?;
    let den = scaled_u64(denominator, scale)?;
    if den == 0 {
        return None;
    }

    let limit = config::max_terminal_digits();
    let mut seen: HashMap<u64, usize> = HashMap::new();
    let mut digits = String::new();
    let mut remainder = num % den;
    while remainder != 0 {
        if let Some(&start) = seen.get(&remainder) {
            let block = &digits[start..];
            return (block.len() <= limit).then(|| block.to_string());
        }
        if digits.len() > limit * 4 {
            return None;
        }
        seen.insert(remainder, digits.len());
        let scaled = u128::from(remainder) * 10;
        digits.push(char::from(b'0' + (scaled / u128::from(den)) as u8));
        remainder = (scaled % u128::from(den)) as u64;
    }
    Some("0".to_string())
}

fn scaled_u64(value: &Decimal, scale: u32) -> Option<u64> {
    let shift = 10u64.checked_pow(scale - value.scale())?;
    value.mantissa().abs().to_u64()?.checked_mul(shift)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_mod() {
        assert_eq!(power_mod(2, 10, 1000), 24);
        assert_eq!(power_mod(3, 4, 7), 4);
        assert_eq!(power_mod(2, 0, 5), 1);
        assert_eq!(power_mod(10, 20, 7), 2);
    }

    #[test]
    fn test_modular_inverse() {
        assert_eq!(modular_inverse(3, 7), Some(5));
        assert_eq!(modular_inverse(2, 6), None);
        assert_eq!(modular_inverse(17, 101), Some(6));
        assert_eq!(modular_inverse(3, 100_000), Some(66_667));
    }

    #[test]
    fn test_extended_gcd() {
        let (g, x, y) = extended_gcd(240, 46);
        assert_eq!(g, 2);
        assert_eq!(240 * x + 46 * y, g);
    }

    #[test]
    fn test_rational_digits() {
        assert_eq!(rational_digits(1, 7, 1, 6), "142857");
        assert_eq!(rational_digits(1, 7, 7, 3), "142");
        assert_eq!(rational_digits(1, 4, 1, 4), "2500");
        assert_eq!(rational_digits(22, 7, 1, 3), "142");
    }

    #[test]
    fn test_convergents_of_golden_ratio() {
        let phi = (1.0 + 5f64.sqrt()) / 2.0;
        let conv = convergents(&continued_fraction_terms(phi, 10));
        assert_eq!(conv[..5], [(1, 1), (2, 1), (3, 2), (5, 3), (8, 5)]);
    }

    #[test]
    fn test_best_rational() {
        assert_eq!(best_rational(0.75, 100), (3, 4));
        assert_eq!(best_rational(std::f64::consts::PI, 1000), (355, 113));
    }

    #[test]
    fn test_decimal_repetend() {
        let d = |s: &str| Decimal::parse(s).unwrap();
        assert_eq!(decimal_repetend(&d("1"), &d("3")).as_deref(), Some("3"));
        assert_eq!(decimal_repetend(&d("1"), &d("7")).as_deref(), Some("142857"));
        assert_eq!(decimal_repetend(&d("1"), &d("6")).as_deref(), Some("6"));
        assert_eq!(decimal_repetend(&d("5"), &d("2")).as_deref(), Some("0"));
        assert_eq!(decimal_repetend(&d("0.1"), &d("0.3")).as_deref(), Some("3"));
    }
}
