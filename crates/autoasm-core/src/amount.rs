#![forbid(unsafe_code)]

//! Fixed-point quantities.
//!
//! Stored item amounts can be fractional (ore and ingots are measured in
//! kilograms), so quantities are kept as signed integers scaled by
//! [`Amount::SCALE`], six decimal places.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// A fixed-point quantity with six decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    /// Number of raw units in one whole unit.
    pub const SCALE: i64 = 1_000_000;

    /// Number of fractional digits.
    pub const DECIMALS: usize = 6;

    /// Zero.
    pub const ZERO: Self = Self(0);

    /// One whole unit.
    pub const ONE: Self = Self(Self::SCALE);

    /// Create an amount from whole units (saturating on overflow).
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units.saturating_mul(Self::SCALE))
    }

    /// Create an amount from raw scaled units.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw scaled value.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Whole part, truncated toward zero.
    #[must_use]
    pub const fn whole(self) -> i64 {
        self.0 / Self::SCALE
    }

    /// Fractional part in raw units (same sign as `self`).
    #[must_use]
    pub const fn fraction(self) -> i64 {
        self.0 % Self::SCALE
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// `max(0, self - other)`.
    #[must_use]
    pub fn shortfall_from(self, other: Self) -> Self {
        self.saturating_sub(other).max(Self::ZERO)
    }

    /// Approximate floating-point value (for display and serialization only).
    #[must_use]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    /// Convert from a float, rounding to the nearest raw unit.
    ///
    /// Non-finite inputs map to zero.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        let raw = (value * Self::SCALE as f64).round();
        if raw >= i64::MAX as f64 {
            Self(i64::MAX)
        } else if raw <= i64::MIN as f64 {
            Self(i64::MIN)
        } else {
            Self(raw as i64)
        }
    }
}

impl From<i64> for Amount {
    fn from(units: i64) -> Self {
        Self::from_units(units)
    }
}

impl From<u32> for Amount {
    fn from(units: u32) -> Self {
        Self::from_units(i64::from(units))
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Amount {
    /// Integers print without a fractional part; fractions drop trailing zeros.
    /// Honors width/alignment flags (`{:>6}`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let scale = Self::SCALE as u64;
        let whole = magnitude / scale;
        let frac = magnitude % scale;
        let text = if frac == 0 {
            format!("{sign}{whole}")
        } else {
            let digits = format!("{frac:06}");
            format!("{sign}{whole}.{}", digits.trim_end_matches('0'))
        };
        f.pad(&text)
    }
}

/// Errors from parsing an [`Amount`] out of a decimal string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    /// Input was empty (or only a sign).
    Empty,
    /// A character other than a digit, one `.`, or a leading `-`.
    InvalidDigit(String),
    /// More than six fractional digits.
    TooPrecise(String),
    /// Value does not fit the fixed-point range.
    Overflow(String),
}

impl fmt::Display for AmountParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty amount"),
            Self::InvalidDigit(s) => write!(f, "invalid amount \"{s}\""),
            Self::TooPrecise(s) => {
                write!(f, "amount \"{s}\" has more than {} decimals", Amount::DECIMALS)
            }
            Self::Overflow(s) => write!(f, "amount \"{s}\" is out of range"),
        }
    }
}

impl std::error::Error for AmountParseError {}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        if body.is_empty() {
            return Err(AmountParseError::Empty);
        }

        let (whole_digits, frac_digits) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole_digits.is_empty() && frac_digits.is_empty())
            || !all_digits(whole_digits)
            || !all_digits(frac_digits)
        {
            return Err(AmountParseError::InvalidDigit(s.to_string()));
        }
        if frac_digits.len() > Self::DECIMALS {
            return Err(AmountParseError::TooPrecise(s.to_string()));
        }

        let overflow = || AmountParseError::Overflow(s.to_string());
        let whole: i64 = if whole_digits.is_empty() {
            0
        } else {
            whole_digits.parse().map_err(|_| overflow())?
        };
        let mut frac: i64 = 0;
        for (i, b) in frac_digits.bytes().enumerate() {
            let place = 10_i64.pow((Self::DECIMALS - 1 - i) as u32);
            frac += i64::from(b - b'0') * place;
        }
        let raw = whole
            .checked_mul(Self::SCALE)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(overflow)?;
        Ok(Self(if negative { -raw } else { raw }))
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Amount;
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    impl Serialize for Amount {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if self.fraction() == 0 {
                serializer.serialize_i64(self.whole())
            } else {
                serializer.collect_str(self)
            }
        }
    }

    struct AmountVisitor;

    impl Visitor<'_> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or a decimal string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
            Ok(Amount::from_units(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
            let units = i64::try_from(v).map_err(|_| E::custom("amount out of range"))?;
            Ok(Amount::from_units(units))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
            Ok(Amount::from_f64(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
            v.parse().map_err(E::custom)
        }
    }

    impl<'de> Deserialize<'de> for Amount {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(AmountVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_integer_has_no_fraction() {
        assert_eq!(Amount::from_units(12000).to_string(), "12000");
        assert_eq!(Amount::ZERO.to_string(), "0");
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(Amount::from_raw(12_500_000).to_string(), "12.5");
        assert_eq!(Amount::from_raw(1).to_string(), "0.000001");
        assert_eq!(Amount::from_raw(-2_250_000).to_string(), "-2.25");
    }

    #[test]
    fn display_honors_width() {
        assert_eq!(format!("{:>6}", Amount::from_units(42)), "    42");
        assert_eq!(format!("{:<5}|", Amount::from_units(7)), "7    |");
    }

    #[test]
    fn parse_accepts_integers_and_fractions() {
        assert_eq!("30000".parse::<Amount>(), Ok(Amount::from_units(30000)));
        assert_eq!("0.25".parse::<Amount>(), Ok(Amount::from_raw(250_000)));
        assert_eq!(".5".parse::<Amount>(), Ok(Amount::from_raw(500_000)));
        assert_eq!("-1.5".parse::<Amount>(), Ok(Amount::from_raw(-1_500_000)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("".parse::<Amount>(), Err(AmountParseError::Empty));
        assert!(matches!("1a".parse::<Amount>(), Err(AmountParseError::InvalidDigit(_))));
        assert!(matches!("1.2.3".parse::<Amount>(), Err(AmountParseError::InvalidDigit(_))));
        assert!(matches!(".".parse::<Amount>(), Err(AmountParseError::InvalidDigit(_))));
        assert!(matches!(
            "1.0000001".parse::<Amount>(),
            Err(AmountParseError::TooPrecise(_))
        ));
        assert!(matches!(
            "99999999999999999999".parse::<Amount>(),
            Err(AmountParseError::Overflow(_))
        ));
    }

    #[test]
    fn shortfall_is_clamped_at_zero() {
        let target = Amount::from_units(30000);
        let observed = Amount::from_units(12000);
        assert_eq!(target.shortfall_from(observed), Amount::from_units(18000));
        assert_eq!(observed.shortfall_from(target), Amount::ZERO);
    }

    #[test]
    fn sum_adds_all() {
        let total: Amount = [1, 2, 3].into_iter().map(Amount::from_units).sum();
        assert_eq!(total, Amount::from_units(6));
    }

    #[test]
    fn whole_truncates_toward_zero() {
        assert_eq!(Amount::from_raw(1_999_999).whole(), 1);
        assert_eq!(Amount::from_raw(-1_999_999).whole(), -1);
    }

    #[test]
    fn from_f64_rounds() {
        assert_eq!(Amount::from_f64(0.1), Amount::from_raw(100_000));
        assert_eq!(Amount::from_f64(f64::NAN), Amount::ZERO);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_accepts_numbers_and_strings() {
        let parsed: Vec<Amount> = serde_json::from_str(r#"[5, 2.5, "0.75"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Amount::from_units(5),
                Amount::from_raw(2_500_000),
                Amount::from_raw(750_000)
            ]
        );
        let json = serde_json::to_string(&parsed).unwrap();
        assert_eq!(json, r#"[5,"2.5","0.75"]"#);
    }
}
