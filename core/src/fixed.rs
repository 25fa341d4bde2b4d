//! Six-decimal fixed-point numbers.
//!
//! Every persisted TF, IDF and TF-IDF value is held as integer micro-units so
//! that rounding is identical on every platform. Rounding is half-to-even on
//! the sixth decimal.

use std::fmt;
use std::str::FromStr;

const SCALE: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed6(i64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a finite decimal number")]
pub struct ParseFixedError(pub String);

impl Fixed6 {
    pub const ZERO: Fixed6 = Fixed6(0);

    pub const fn from_micros(micros: i64) -> Self {
        Fixed6(micros)
    }

    pub const fn micros(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `num / den` rounded exactly, without passing through floating point.
    /// Returns `None` when `den` is zero.
    pub fn from_ratio(num: u64, den: u64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let micros = div_round_half_even(num as i128 * SCALE as i128, den as i128);
        Some(Fixed6(saturate(micros)))
    }

    /// Rounds a float to six decimals. NaN maps to zero and out-of-range
    /// values saturate.
    pub fn round(value: f64) -> Self {
        Fixed6((value * SCALE as f64).round_ties_even() as i64)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }
}

impl std::ops::Mul for Fixed6 {
    type Output = Fixed6;

    fn mul(self, rhs: Fixed6) -> Fixed6 {
        let product = self.0 as i128 * rhs.0 as i128;
        Fixed6(saturate(div_round_half_even(product, SCALE as i128)))
    }
}

impl fmt::Display for Fixed6 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = SCALE as u64;
        write!(f, "{sign}{}.{:06}", abs / scale, abs % scale)
    }
}

impl FromStr for Fixed6 {
    type Err = ParseFixedError;

    /// Accepts plain decimals (`-1.5`, `0.693147`, `.25`, `3.`). Digits past the
    /// sixth decimal are rounded half-to-even without leaving integer arithmetic.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        parse_decimal(trimmed).ok_or_else(|| ParseFixedError(trimmed.to_string()))
    }
}

fn parse_decimal(s: &str) -> Option<Fixed6> {
    let (negative, body) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }

    let mut micros: i128 = 0;
    for b in int_part.bytes() {
        micros = micros.checked_mul(10)?.checked_add((b - b'0') as i128)?;
    }
    let frac = frac_part.as_bytes();
    for i in 0..6 {
        let digit = frac.get(i).map_or(0, |b| (b - b'0') as i128);
        micros = micros.checked_mul(10)?.checked_add(digit)?;
    }

    // the dropped tail decides rounding: above, below or exactly half a micro
    let tail = frac.get(6..).unwrap_or(&[]);
    let round_up = match tail.split_first() {
        None => false,
        Some((&first, rest)) => match first.cmp(&b'5') {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => rest.iter().any(|&b| b != b'0') || micros & 1 == 1,
        },
    };
    if round_up {
        micros += 1;
    }
    let micros = if negative { -micros } else { micros };
    i64::try_from(micros).ok().map(Fixed6)
}

/// Integer division rounding to nearest, ties to even. `den` must be positive.
fn div_round_half_even(num: i128, den: i128) -> i128 {
    let q = num.div_euclid(den);
    let r = num.rem_euclid(den);
    match (2 * r).cmp(&den) {
        std::cmp::Ordering::Less => q,
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal => q + (q & 1),
    }
}

fn saturate(v: i128) -> i64 {
    v.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
