//! Exact decimal numbers
//!
//! Terraform numbers are arbitrary precision. Kubernetes fields are either
//! 64-bit integers or doubles. [`TfNumber`] keeps the exact decimal value and
//! only converts when the target representation holds it without rounding.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, ValueError};

/// Exponents beyond this are rejected while parsing
const MAX_EXPONENT: i64 = 100_000;

/// An exact decimal number: `(-1)^negative * digits * 10^exponent`
///
/// Always normalised: no leading or trailing zeros in `digits`, and zero is
/// represented by empty digits with exponent 0 and positive sign. Derived
/// equality is therefore numeric equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TfNumber {
    negative: bool,
    digits: String,
    exponent: i64,
}

impl TfNumber {
    /// The number zero
    pub fn zero() -> Self {
        Self {
            negative: false,
            digits: String::new(),
            exponent: 0,
        }
    }

    fn from_parts(negative: bool, mantissa: &str, exponent: i64) -> Self {
        let trimmed = mantissa.trim_start_matches('0');
        if trimmed.is_empty() {
            return Self::zero();
        }
        let significant = trimmed.trim_end_matches('0');
        let stripped = (trimmed.len() - significant.len()) as i64;
        Self {
            negative,
            digits: significant.to_string(),
            exponent: exponent + stripped,
        }
    }

    /// Parse decimal text such as `42`, `-0.5`, `1.25e3`
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || ValueError::InvalidNumber(text.to_string());
        let bytes = text.as_bytes();
        let mut pos = 0;

        let mut negative = false;
        if let Some(&sign) = bytes.first()
            && (sign == b'-' || sign == b'+')
        {
            negative = sign == b'-';
            pos += 1;
        }

        let int_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        let int_part = &text[int_start..pos];

        let mut frac_part = "";
        if pos < bytes.len() && bytes[pos] == b'.' {
            pos += 1;
            let frac_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            frac_part = &text[frac_start..pos];
        }

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let mut exponent: i64 = 0;
        if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
            pos += 1;
            let exp_text = &text[pos..];
            if exp_text.is_empty() {
                return Err(invalid());
            }
            exponent = exp_text.parse::<i64>().map_err(|_| invalid())?;
            if exponent.abs() > MAX_EXPONENT {
                return Err(invalid());
            }
            pos = bytes.len();
        }

        if pos != bytes.len() {
            return Err(invalid());
        }

        let mantissa = format!("{int_part}{frac_part}");
        Ok(Self::from_parts(
            negative,
            &mantissa,
            exponent - frac_part.len() as i64,
        ))
    }

    /// Exact conversion from a signed integer
    pub fn from_i64(value: i64) -> Self {
        Self::from_parts(value < 0, &value.unsigned_abs().to_string(), 0)
    }

    /// Exact conversion from an unsigned integer
    pub fn from_u64(value: u64) -> Self {
        Self::from_parts(false, &value.to_string(), 0)
    }

    /// Exact conversion from a finite double, using its shortest round-trip
    /// decimal form
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(ValueError::InvalidNumber(value.to_string()));
        }
        Self::parse(&format!("{value:e}"))
    }

    /// Whether the value has no fractional part
    pub fn is_integer(&self) -> bool {
        self.exponent >= 0
    }

    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    fn precision_loss(&self, target: &'static str) -> ValueError {
        ValueError::PrecisionLoss {
            value: self.to_string(),
            target,
        }
    }

    /// Integer text without exponent, only valid for integers of sane size
    fn integer_text(&self) -> Option<String> {
        if !self.is_integer() || self.exponent > 20 {
            return None;
        }
        if self.is_zero() {
            return Some("0".to_string());
        }
        let mut text = String::with_capacity(self.digits.len() + self.exponent as usize + 1);
        if self.negative {
            text.push('-');
        }
        text.push_str(&self.digits);
        text.extend(std::iter::repeat_n('0', self.exponent as usize));
        Some(text)
    }

    /// Convert to `i64`, failing if the value is fractional or out of range
    pub fn to_i64(&self) -> Result<i64> {
        self.integer_text()
            .and_then(|text| text.parse::<i64>().ok())
            .ok_or_else(|| self.precision_loss("int64"))
    }

    /// Convert to `u64`, failing if the value is fractional, negative or out of range
    pub fn to_u64(&self) -> Result<u64> {
        self.integer_text()
            .and_then(|text| text.parse::<u64>().ok())
            .ok_or_else(|| self.precision_loss("uint64"))
    }

    /// Convert to `f64`, failing unless the double represents this exact decimal
    pub fn to_f64(&self) -> Result<f64> {
        let value: f64 = self
            .scientific()
            .parse()
            .map_err(|_| self.precision_loss("float64"))?;
        if !value.is_finite() {
            return Err(self.precision_loss("float64"));
        }
        match Self::from_f64(value) {
            Ok(back) if back == *self => Ok(value),
            _ => Err(self.precision_loss("float64")),
        }
    }

    /// JSON number: an integer when integral, a float when fractional
    pub fn to_json(&self) -> Result<serde_json::Value> {
        if self.is_integer() {
            if let Ok(v) = self.to_i64() {
                return Ok(serde_json::Value::from(v));
            }
            if let Ok(v) = self.to_u64() {
                return Ok(serde_json::Value::from(v));
            }
            return Err(self.precision_loss("int64"));
        }
        let value = self.to_f64()?;
        serde_json::Number::from_f64(value)
            .map(serde_json::Value::Number)
            .ok_or_else(|| self.precision_loss("float64"))
    }

    /// Exact conversion from a JSON number
    pub fn from_json_number(number: &serde_json::Number) -> Result<Self> {
        if let Some(v) = number.as_i64() {
            Ok(Self::from_i64(v))
        } else if let Some(v) = number.as_u64() {
            Ok(Self::from_u64(v))
        } else if let Some(v) = number.as_f64() {
            Self::from_f64(v)
        } else {
            Err(ValueError::InvalidNumber(number.to_string()))
        }
    }

    fn scientific(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let sign = if self.negative { "-" } else { "" };
        format!("{sign}{}e{}", self.digits, self.exponent)
    }
}

impl Default for TfNumber {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for TfNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        if let Some(text) = self.integer_text() {
            return f.write_str(&text);
        }

        let sign = if self.negative { "-" } else { "" };
        let len = self.digits.len() as i64;
        let point = len + self.exponent;

        if self.exponent < 0 && point > -7 {
            if point > 0 {
                let (whole, frac) = self.digits.split_at(point as usize);
                write!(f, "{sign}{whole}.{frac}")
            } else {
                let zeros = "0".repeat((-point) as usize);
                write!(f, "{sign}0.{zeros}{}", self.digits)
            }
        } else {
            let (first, rest) = self.digits.split_at(1);
            let exp = point - 1;
            if rest.is_empty() {
                write!(f, "{sign}{first}e{exp}")
            } else {
                write!(f, "{sign}{first}.{rest}e{exp}")
            }
        }
    }
}

impl FromStr for TfNumber {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<i64> for TfNumber {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<i32> for TfNumber {
    fn from(value: i32) -> Self {
        Self::from_i64(value.into())
    }
}

impl From<u64> for TfNumber {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl Serialize for TfNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.is_integer() {
            if let Ok(v) = self.to_i64() {
                return serializer.serialize_i64(v);
            }
            if let Ok(v) = self.to_u64() {
                return serializer.serialize_u64(v);
            }
            return Err(serde::ser::Error::custom(self.precision_loss("int64")));
        }
        let value = self.to_f64().map_err(serde::ser::Error::custom)?;
        serializer.serialize_f64(value)
    }
}

struct TfNumberVisitor;

impl Visitor<'_> for TfNumberVisitor {
    type Value = TfNumber;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<TfNumber, E> {
        Ok(TfNumber::from_i64(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<TfNumber, E> {
        Ok(TfNumber::from_u64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<TfNumber, E> {
        TfNumber::from_f64(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<TfNumber, E> {
        TfNumber::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for TfNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(TfNumberVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(text: &str) -> TfNumber {
        TfNumber::parse(text).unwrap()
    }

    #[test]
    fn test_parse_normalises() {
        assert_eq!(n("42"), n("42.000"));
        assert_eq!(n("4.2e1"), n("42"));
        assert_eq!(n("0.50"), n("5e-1"));
        assert_eq!(n("-0"), TfNumber::zero());
        assert_eq!(n("+7"), n("7"));
        assert_eq!(n("1200"), n("1.2e3"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "-", ".", "1e", "1.2.3", "abc", "1e5x", "NaN", "inf", " 1"] {
            assert!(TfNumber::parse(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(n("42").to_string(), "42");
        assert_eq!(n("-3.25").to_string(), "-3.25");
        assert_eq!(n("0.001").to_string(), "0.001");
        assert_eq!(n("1e-10").to_string(), "1e-10");
        assert_eq!(n("1.5e30").to_string(), "1.5e30");
        assert_eq!(n("0").to_string(), "0");
    }

    #[test]
    fn test_integer_detection() {
        assert!(n("10").is_integer());
        assert!(n("1e3").is_integer());
        assert!(n("2.0").is_integer());
        assert!(!n("2.5").is_integer());
        assert!(!n("1e-3").is_integer());
    }

    #[test]
    fn test_to_i64_exact() {
        assert_eq!(n("9223372036854775807").to_i64().unwrap(), i64::MAX);
        assert_eq!(n("-9223372036854775808").to_i64().unwrap(), i64::MIN);
        assert_eq!(n("3e2").to_i64().unwrap(), 300);
    }

    #[test]
    fn test_to_i64_refuses_loss() {
        assert!(matches!(
            n("9223372036854775808").to_i64(),
            Err(ValueError::PrecisionLoss { target: "int64", .. })
        ));
        assert!(n("1.5").to_i64().is_err());
        assert!(n("1e40").to_i64().is_err());
    }

    #[test]
    fn test_to_f64_exact() {
        assert_eq!(n("0.1").to_f64().unwrap(), 0.1);
        assert_eq!(n("-2.5").to_f64().unwrap(), -2.5);
        assert_eq!(n("1e300").to_f64().unwrap(), 1e300);
    }

    #[test]
    fn test_to_f64_refuses_loss() {
        // more significant digits than a double can hold
        assert!(n("0.10000000000000000000001").to_f64().is_err());
        assert!(n("1e400").to_f64().is_err());
    }

    #[test]
    fn test_from_f64_shortest() {
        assert_eq!(TfNumber::from_f64(0.1).unwrap(), n("0.1"));
        assert_eq!(TfNumber::from_f64(3.0).unwrap(), n("3"));
        assert!(TfNumber::from_f64(f64::NAN).is_err());
    }

    #[test]
    fn test_to_json_integer_vs_float() {
        assert_eq!(n("5").to_json().unwrap(), serde_json::json!(5));
        assert!(n("5").to_json().unwrap().is_i64());
        assert_eq!(n("5.5").to_json().unwrap(), serde_json::json!(5.5));
        assert!(n("5.5").to_json().unwrap().is_f64());
        assert_eq!(
            n("18446744073709551615").to_json().unwrap(),
            serde_json::json!(u64::MAX)
        );
        assert!(n("18446744073709551616").to_json().is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let value: TfNumber = serde_json::from_str("12.75").unwrap();
        assert_eq!(value, n("12.75"));
        assert_eq!(serde_json::to_string(&value).unwrap(), "12.75");

        let from_text: TfNumber = serde_json::from_str("\"1e2\"").unwrap();
        assert_eq!(serde_json::to_string(&from_text).unwrap(), "100");
    }

    #[test]
    fn test_serialize_precision_loss_is_error() {
        let huge = n("123456789012345678901234567890");
        assert!(serde_json::to_string(&huge).is_err());
    }
}
