//! Normalized numeric results.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Number of decimal places kept for fractional results.
pub const RESULT_DECIMALS: i32 = 10;

/// Largest magnitude still emitted as a JSON integer.
const MAX_JSON_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A calculation result after display normalization.
///
/// Whole values print without a fractional part; everything else is rounded
/// to [`RESULT_DECIMALS`] places so repeated evaluation prints identically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalcValue(f64);

impl CalcValue {
    /// Normalize a raw arithmetic result. Non-finite input is kept as-is;
    /// callers are expected to reject it before building a value.
    pub fn new(raw: f64) -> Self {
        if !raw.is_finite() || raw.fract() == 0.0 {
            return Self(clear_negative_zero(raw));
        }

        let scale = 10f64.powi(RESULT_DECIMALS);
        let scaled = raw * scale;
        if !scaled.is_finite() {
            return Self(raw);
        }
        Self(clear_negative_zero(scaled.round() / scale))
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }

    pub fn is_whole(&self) -> bool {
        self.0.is_finite() && self.0.fract() == 0.0
    }
}

fn clear_negative_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

impl fmt::Display for CalcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for CalcValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() && self.0.abs() <= MAX_JSON_INTEGER {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for CalcValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(CalcValue::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_values_have_no_fraction() {
        assert_eq!(CalcValue::new(14.0).to_string(), "14");
        assert_eq!(CalcValue::new(-3.0).to_string(), "-3");
        assert_eq!(CalcValue::new(1e20).to_string(), "100000000000000000000");
    }

    #[test]
    fn test_negative_zero_prints_as_zero() {
        assert_eq!(CalcValue::new(-0.0).to_string(), "0");
    }

    #[test]
    fn test_fraction_rounded_to_ten_places() {
        assert_eq!(CalcValue::new(1.0 / 3.0).to_string(), "0.3333333333");
        assert_eq!(CalcValue::new(2.0 / 3.0).to_string(), "0.6666666667");
        assert_eq!(CalcValue::new(0.1 + 0.2).to_string(), "0.3");
        assert_eq!(CalcValue::new(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_tiny_fraction_rounds_to_whole() {
        let v = CalcValue::new(1e-12);
        assert!(v.is_whole());
        assert_eq!(v.to_string(), "0");
    }

    #[test]
    fn test_json_integer_or_float() {
        assert_eq!(serde_json::to_string(&CalcValue::new(20.0)).unwrap(), "20");
        assert_eq!(serde_json::to_string(&CalcValue::new(0.5)).unwrap(), "0.5");
        let big = serde_json::to_value(CalcValue::new(1e20)).unwrap();
        assert!(big.is_f64());
        assert_eq!(big.as_f64(), Some(1e20));
    }
}
