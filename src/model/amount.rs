//! Amount type for handling monetary values as they appear in spreadsheet cells.
//!
//! Cells may or may not carry a dollar sign and thousands separators. `Amount` remembers which,
//! so that a table written back to the sheet looks the way it did when it was read.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents how dollar amounts were (or should be) formatted.
///
/// # Examples
///  - `AmountFormat{ dollar: true, commas: true }` -> `-$60,000.00`
///  - `AmountFormat{ dollar: false, commas: true }` -> `-60,000.00`
///  - `AmountFormat{ dollar: false, commas: false }` -> `-60000.00`
///  - `AmountFormat{ dollar: true, commas: false }` -> `-$60000.00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    /// Whether a dollar sign is present in the formatting.
    dollar: bool,
    /// Whether commas are present as thousands separators in the formatting.
    commas: bool,
}

impl Default for AmountFormat {
    fn default() -> Self {
        DEFAULT_FORMAT
    }
}

/// The default format has a dollar sign and commas: e.g. `-$60,000.00`.
const DEFAULT_FORMAT: AmountFormat = AmountFormat {
    dollar: true,
    commas: true,
};

/// The format used for bare numbers, e.g. `1500` or `-12.5`.
const PLAIN_FORMAT: AmountFormat = AmountFormat {
    dollar: false,
    commas: false,
};

/// Represents a dollar amount from a ledger table.
///
/// Formatting is considered significant for the purposes of equality, so for numeric comparisons,
/// you should access the `Decimal` value and use that.
///
/// # Examples
///
/// ```
/// # use finance_tracker::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("-5000.00").unwrap();
/// let b = Amount::from_str("-$5,000.00").unwrap();
/// assert_ne!(a, b);
/// assert_eq!(a.to_string(), "-5000.00");
/// assert_eq!(b.to_string(), "-$5,000.00");
/// assert_eq!(a.value(), b.value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    /// The parsed numerical value.
    value: Decimal,
    /// The way the numerical value was parsed from, or should be written to, a `String`.
    format: AmountFormat,
    /// Whether the cell was empty. An empty cell counts as zero but is written back empty.
    blank: bool,
}

impl Default for Amount {
    fn default() -> Self {
        Self {
            value: Decimal::ZERO,
            format: PLAIN_FORMAT,
            blank: true,
        }
    }
}

impl Amount {
    /// Creates a new Amount from a Decimal value with default `String` formatting. Values with
    /// fewer than two decimal places are shown with two, e.g. `$5.00`.
    pub fn new(mut value: Decimal) -> Self {
        if value.scale() < 2 {
            value.rescale(2);
        }
        Self {
            value,
            format: DEFAULT_FORMAT,
            blank: false,
        }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.value().is_sign_negative() && !self.is_zero()
    }
}

/// An error that can occur when parsing strings into `Decimal` values.
pub struct AmountError {
    input: String,
    source: rust_decimal::Error,
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.source, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a number: {}", self.input, self.source)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut dollar_sign = false;
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // "-$50.00", "$50.00" or no dollar sign at all
        let without_dollar = if let Some(after_minus) = trimmed.strip_prefix('-') {
            if let Some(after_dollar) = after_minus.strip_prefix('$') {
                dollar_sign = true;
                format!("-{after_dollar}")
            } else {
                trimmed.to_string()
            }
        } else if let Some(after_dollar) = trimmed.strip_prefix('$') {
            dollar_sign = true;
            after_dollar.to_string()
        } else {
            trimmed.to_string()
        };

        let without_commas = without_dollar.replace(',', "");
        let commas = without_commas.len() < without_dollar.len();

        let value = Decimal::from_str(&without_commas)
            .or_else(|_| Decimal::from_scientific(&without_commas))
            .map_err(|source| AmountError {
                input: s.to_string(),
                source,
            })?;
        Ok(Amount {
            value,
            format: AmountFormat {
                dollar: dollar_sign,
                commas,
            },
            blank: false,
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.blank {
            return Ok(());
        }

        let (sign, num) = if self.is_negative() {
            (String::from("-"), self.value().abs())
        } else {
            (String::new(), self.value())
        };

        let dol = if self.format.dollar {
            String::from("$")
        } else {
            String::new()
        };

        if self.format.commas {
            write!(f, "{sign}{dol}{}", group_thousands(&num.to_string()))
        } else {
            write!(f, "{sign}{dol}{num}")
        }
    }
}

/// Inserts a comma between every three digits of the integer part of a plain decimal string. The
/// fractional part is left as it is.
fn group_thousands(plain: &str) -> String {
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain, None),
    };
    let len = int_part.len();
    let mut out = String::with_capacity(plain.len() + len / 3);
    for (ix, c) in int_part.chars().enumerate() {
        if ix > 0 && (len - ix) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_with_dollar_sign() {
        let amount = Amount::from_str("$50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_negative_with_dollar_sign() {
        let amount = Amount::from_str("-$50.00").unwrap();
        assert_eq!(amount.value(), dec("-50.00"));
    }

    #[test]
    fn test_parse_integer() {
        let amount = Amount::from_str("1500").unwrap();
        assert_eq!(amount.value(), dec("1500"));
        assert_eq!(amount.to_string(), "1500");
    }

    #[test]
    fn test_parse_empty_string_is_zero_and_stays_blank() {
        let amount = Amount::from_str("  ").unwrap();
        assert_eq!(amount.value(), Decimal::ZERO);
        assert_eq!(amount.to_string(), "");
    }

    #[test]
    fn test_parse_not_a_number() {
        let err = Amount::from_str("twelve").unwrap_err();
        assert!(err.to_string().contains("'twelve' is not a number"));
    }

    #[test]
    fn test_display_new() {
        assert_eq!(Amount::new(dec("-50.00")).to_string(), "-$50.00");
        assert_eq!(Amount::new(Decimal::ZERO).to_string(), "$0.00");
    }

    #[test]
    fn test_parse_retain_commas_no_dollarsign() {
        let s = "1,000,000.00";
        assert_eq!(Amount::from_str(s).unwrap().to_string(), s);
    }

    #[test]
    fn test_commas_keep_the_original_scale() {
        for s in [
            "1,200",
            "1,234.567",
            "$999.5",
            "-$12,345,678,901,234,567.89",
            "100,000",
        ] {
            assert_eq!(Amount::from_str(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_display_new_keeps_large_values_exact() {
        assert_eq!(
            Amount::new(dec("12345678901234567.891")).to_string(),
            "$12,345,678,901,234,567.891"
        );
        assert_eq!(Amount::new(dec("1850")).to_string(), "$1,850.00");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("0.5"), "0.5");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456.78"), "123,456.78");
    }

    #[test]
    fn test_parse_no_commas_retain_dollar_sign() {
        let s = "-$1000000.00";
        assert_eq!(Amount::from_str(s).unwrap().to_string(), s);
    }

    #[test]
    fn test_serde() {
        let amount: Amount = serde_json::from_str("\"-$50.00\"").unwrap();
        assert_eq!(amount.value(), dec("-50.00"));
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"-$50.00\"");
    }
}
