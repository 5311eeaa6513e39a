use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Fixed-point decimal with 2 decimal places, stored as integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Amount(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid amount '{0}'")]
pub struct ParseAmountError(String);

impl Amount {
    const SCALE: i64 = 100;

    pub fn from_cents(cents: i64) -> Self {
        Amount(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseAmountError(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() || frac.len() > 2 {
            return Err(invalid());
        }
        if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        // "1.5" means 50 cents, not 5
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };
        let cents = whole
            .checked_mul(Self::SCALE)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(invalid)?;

        Ok(Amount(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        let whole = abs / Self::SCALE;
        let frac = abs % Self::SCALE;
        write!(f, "{sign}{whole}.{frac:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_number() {
        assert_eq!("100".parse::<Amount>().unwrap(), Amount::from_cents(10_000));
    }

    #[test]
    fn parse_one_fractional_digit_scales_to_cents() {
        assert_eq!("10.5".parse::<Amount>().unwrap(), Amount::from_cents(1_050));
    }

    #[test]
    fn parse_two_fractional_digits() {
        assert_eq!("0.07".parse::<Amount>().unwrap(), Amount::from_cents(7));
        assert_eq!(" 12.34 ".parse::<Amount>().unwrap(), Amount::from_cents(1_234));
    }

    #[test]
    fn parse_negative() {
        assert_eq!("-3.25".parse::<Amount>().unwrap(), Amount::from_cents(-325));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Amount>().is_err());
        assert!("abc".parse::<Amount>().is_err());
        assert!(".5".parse::<Amount>().is_err());
        assert!("1.234".parse::<Amount>().is_err());
        assert!("1.2a".parse::<Amount>().is_err());
        assert!("--1".parse::<Amount>().is_err());
    }

    #[test]
    fn display_formats_positive() {
        assert_eq!(Amount::from_cents(10_000).to_string(), "100.00");
        assert_eq!(Amount::from_cents(1_050).to_string(), "10.50");
        assert_eq!(Amount::from_cents(1).to_string(), "0.01");
        assert_eq!(Amount::default().to_string(), "0.00");
    }

    #[test]
    fn display_formats_negative() {
        assert_eq!(Amount::from_cents(-325).to_string(), "-3.25");
        assert_eq!(Amount::from_cents(-1).to_string(), "-0.01");
    }

    #[test]
    fn ordering() {
        assert!(Amount::from_cents(-1) < Amount::default());
        assert!(Amount::from_cents(100) > Amount::from_cents(99));
    }
}
