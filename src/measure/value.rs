// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Numeric measure values.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Value of a measure: an exact count, an exact ratio, or a floating aggregate.
///
/// Ratios keep a non-negative denominator; a zero denominator encodes plus or
/// minus infinity (growth rate of a pattern absent from the negative class).
/// Values of different kinds compare numerically.
#[derive(Debug, Clone, Copy)]
pub enum MeasureValue {
    Int(i64),
    Ratio { num: i64, den: i64 },
    Real(f64),
}

impl MeasureValue {
    /// Build the ratio `num / den`, normalised.
    ///
    /// `0 / 0` is taken as zero.
    pub fn ratio(num: i64, den: i64) -> Self {
        match (num.signum(), den.signum()) {
            (0, _) => MeasureValue::Ratio { num: 0, den: 1 },
            (s, 0) => MeasureValue::Ratio { num: s, den: 0 },
            (_, d) => {
                let g = gcd(num.unsigned_abs(), den.unsigned_abs()) as i64;
                MeasureValue::Ratio {
                    num: d * num / g,
                    den: den.abs() / g,
                }
            }
        }
    }

    pub fn infinity() -> Self {
        MeasureValue::Ratio { num: 1, den: 0 }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            MeasureValue::Int(v) => v as f64,
            MeasureValue::Ratio { num, den: 0 } => num as f64 * f64::INFINITY,
            MeasureValue::Ratio { num, den } => num as f64 / den as f64,
            MeasureValue::Real(v) => v,
        }
    }

    pub fn is_infinite(&self) -> bool {
        self.as_f64().is_infinite()
    }

    fn as_fraction(&self) -> Option<(i128, i128)> {
        match *self {
            MeasureValue::Int(v) => Some((v as i128, 1)),
            MeasureValue::Ratio { num, den } => Some((num as i128, den as i128)),
            MeasureValue::Real(_) => None,
        }
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

impl PartialEq for MeasureValue {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for MeasureValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.as_fraction(), other.as_fraction()) {
            (Some((a, 0)), Some((c, 0))) => Some(a.cmp(&c)),
            // Denominators are non-negative.
            (Some((a, b)), Some((c, d))) => Some((a * d).cmp(&(c * b))),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl From<usize> for MeasureValue {
    fn from(value: usize) -> Self {
        MeasureValue::Int(value as i64)
    }
}

impl From<f64> for MeasureValue {
    fn from(value: f64) -> Self {
        MeasureValue::Real(value)
    }
}

impl fmt::Display for MeasureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MeasureValue::Int(v) => write!(f, "{}", v),
            MeasureValue::Ratio { num, den: 0 } if num > 0 => write!(f, "inf"),
            MeasureValue::Ratio { den: 0, .. } => write!(f, "-inf"),
            MeasureValue::Ratio { num, den: 1 } => write!(f, "{}", num),
            MeasureValue::Ratio { num, den } => write!(f, "{}/{}", num, den),
            MeasureValue::Real(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for MeasureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            MeasureValue::Int(v) => serializer.serialize_i64(v),
            _ => serializer.serialize_f64(self.as_f64()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_normalisation() {
        assert!(matches!(
            MeasureValue::ratio(4, 6),
            MeasureValue::Ratio { num: 2, den: 3 }
        ));
        assert!(matches!(
            MeasureValue::ratio(3, -6),
            MeasureValue::Ratio { num: -1, den: 2 }
        ));
        assert!(matches!(
            MeasureValue::ratio(5, 0),
            MeasureValue::Ratio { num: 1, den: 0 }
        ));
        assert!(matches!(
            MeasureValue::ratio(0, 0),
            MeasureValue::Ratio { num: 0, den: 1 }
        ));
    }

    #[test]
    fn test_exact_comparison() {
        let third = MeasureValue::ratio(1, 3);
        let two_sixths = MeasureValue::ratio(2, 6);
        assert_eq!(third, two_sixths);
        assert!(MeasureValue::ratio(2, 3) > third);
        assert!(MeasureValue::Int(1) > MeasureValue::ratio(2, 3));
        assert!(MeasureValue::infinity() > MeasureValue::Int(i64::MAX / 2));
        assert_eq!(MeasureValue::infinity(), MeasureValue::ratio(7, 0));
        assert!(MeasureValue::ratio(-1, 0) < MeasureValue::Int(-1000));
        assert!(MeasureValue::ratio(-1, 0) < MeasureValue::infinity());
    }

    #[test]
    fn test_mixed_kinds() {
        assert!(MeasureValue::Real(0.5) < MeasureValue::ratio(2, 3));
        assert_eq!(MeasureValue::Real(2.0), MeasureValue::Int(2));
        assert_eq!(MeasureValue::Real(f64::NAN).partial_cmp(&MeasureValue::Int(0)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(MeasureValue::Int(3).to_string(), "3");
        assert_eq!(MeasureValue::ratio(6, 4).to_string(), "3/2");
        assert_eq!(MeasureValue::ratio(4, 2).to_string(), "2");
        assert_eq!(MeasureValue::infinity().to_string(), "inf");
        assert_eq!(MeasureValue::Real(1.25).to_string(), "1.25");
    }
}
