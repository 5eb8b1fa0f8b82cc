//! Unit handling for growth measurements
//!
//! Measurements arrive tagged with an explicit unit and are normalized
//! to SI (cm, kg) before any computation.
//!
//! # Design Principles
//!
//! 1. **Internal Consistency**: All computation uses SI units (cm, kg)
//! 2. **Type Safety**: Units are explicit in types, not just f64
//! 3. **Conversion at Boundaries**: Convert on input, not in engines

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical dimension a unit measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Length,
    Mass,
}

/// Unit tag carried by a measurement
///
/// Canonical units are centimeters for length and kilograms for mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementUnit {
    Cm,
    In,
    Kg,
    Lbs,
}

impl MeasurementUnit {
    /// The dimension this unit measures
    pub fn dimension(&self) -> Dimension {
        match self {
            MeasurementUnit::Cm | MeasurementUnit::In => Dimension::Length,
            MeasurementUnit::Kg | MeasurementUnit::Lbs => Dimension::Mass,
        }
    }

    /// Convert a value in this unit to the canonical unit of its
    /// dimension (cm or kg)
    pub fn to_canonical(&self, value: f64) -> f64 {
        match self {
            MeasurementUnit::Cm => value,
            MeasurementUnit::In => value * 2.54,
            MeasurementUnit::Kg => value,
            MeasurementUnit::Lbs => value * 0.453592,
        }
    }

    /// Convert a canonical value (cm or kg) to this unit
    pub fn from_canonical(&self, value: f64) -> f64 {
        match self {
            MeasurementUnit::Cm => value,
            MeasurementUnit::In => value / 2.54,
            MeasurementUnit::Kg => value,
            MeasurementUnit::Lbs => value / 0.453592,
        }
    }

    /// Get the unit abbreviation
    pub fn abbreviation(&self) -> &'static str {
        match self {
            MeasurementUnit::Cm => "cm",
            MeasurementUnit::In => "in",
            MeasurementUnit::Kg => "kg",
            MeasurementUnit::Lbs => "lbs",
        }
    }
}

impl fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl std::str::FromStr for MeasurementUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cm" | "centimeter" | "centimeters" => Ok(MeasurementUnit::Cm),
            "in" | "inch" | "inches" => Ok(MeasurementUnit::In),
            "kg" | "kilogram" | "kilograms" => Ok(MeasurementUnit::Kg),
            "lbs" | "lb" | "pound" | "pounds" => Ok(MeasurementUnit::Lbs),
            _ => Err(format!("Unknown measurement unit: {}", s)),
        }
    }
}
