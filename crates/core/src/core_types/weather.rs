//! Atmospheric observation snapshot
//!
//! A [`WeatherSnapshot`] is the single meteorological input to a run. The
//! engine never fetches weather itself; the caller hands in one observation
//! and the stability layer derives everything else (Pasquill class, friction
//! velocity, mixing height, vertical profile).

use serde::{Deserialize, Serialize};

/// Pasquill-Gifford atmospheric stability class.
///
/// A is strongly convective daytime turbulence, D is neutral (overcast or
/// windy), F is the stable nocturnal surface layer. The class drives the
/// dispersion coefficients, the wind-profile exponent, and the default
/// mixing height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PasquillClass {
    /// Very unstable
    A,
    /// Moderately unstable
    B,
    /// Slightly unstable
    C,
    /// Neutral
    D,
    /// Slightly stable
    E,
    /// Moderately stable
    F,
}

impl PasquillClass {
    /// Power-law wind-profile exponent for open terrain.
    pub fn power_law_exponent(self) -> f64 {
        match self {
            PasquillClass::A => 0.108,
            PasquillClass::B => 0.112,
            PasquillClass::C => 0.120,
            PasquillClass::D => 0.142,
            PasquillClass::E => 0.203,
            PasquillClass::F => 0.253,
        }
    }

    /// True for the stable classes E and F.
    pub fn is_stable(self) -> bool {
        matches!(self, PasquillClass::E | PasquillClass::F)
    }

    /// Potential-temperature lapse dθ/dz (K/m) used by stable plume rise.
    pub fn potential_temperature_gradient(self) -> f64 {
        match self {
            PasquillClass::E => 0.02,
            PasquillClass::F => 0.035,
            _ => 0.0,
        }
    }

    /// One step toward neutral; used to resolve split classifications.
    pub fn toward_neutral(self) -> PasquillClass {
        match self {
            PasquillClass::A => PasquillClass::B,
            PasquillClass::B => PasquillClass::C,
            PasquillClass::C | PasquillClass::D => PasquillClass::D,
            PasquillClass::E => PasquillClass::D,
            PasquillClass::F => PasquillClass::E,
        }
    }
}

impl std::fmt::Display for PasquillClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = match self {
            PasquillClass::A => 'A',
            PasquillClass::B => 'B',
            PasquillClass::C => 'C',
            PasquillClass::D => 'D',
            PasquillClass::E => 'E',
            PasquillClass::F => 'F',
        };
        write!(f, "{c}")
    }
}

/// One level of an upper-air sounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileLevel {
    /// Height above ground (m)
    pub height: f64,
    /// Air temperature (K)
    pub temperature: f64,
    /// Wind speed (m/s)
    pub wind_speed: f64,
}

/// A single surface weather observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Wind speed at the reference height (m/s), >= 0
    pub wind_speed: f64,
    /// Meteorological wind direction (degrees the wind blows from), [0, 360)
    pub wind_direction: f64,
    /// Air temperature (K)
    pub temperature: f64,
    /// Station pressure (Pa)
    pub pressure: f64,
    /// Relative humidity, 0..1
    pub humidity: f64,
    /// Cloud cover fraction, 0..1
    pub cloud_cover: f64,
    /// Measured global solar radiation (W/m²), when available
    pub solar_radiation: Option<f64>,
    /// Local hour of the observation, 0..24
    pub observed_hour: u8,
    /// Caller-supplied stability class; derived by the Turner method when absent
    pub pasquill_class: Option<PasquillClass>,
    /// Upper-air sounding, when available; overrides the tabulated mixing height
    pub vertical_profile: Option<Vec<ProfileLevel>>,
}

impl WeatherSnapshot {
    /// A neutral daytime observation, useful as a test and demo baseline.
    pub fn neutral(wind_speed: f64, wind_direction: f64, temperature: f64) -> Self {
        Self {
            wind_speed,
            wind_direction,
            temperature,
            pressure: crate::core_types::units::STANDARD_PRESSURE,
            humidity: 0.5,
            cloud_cover: 0.5,
            solar_radiation: None,
            observed_hour: 12,
            pasquill_class: Some(PasquillClass::D),
            vertical_profile: None,
        }
    }

    /// True between 06:00 and 18:00 local.
    pub fn is_daytime(&self) -> bool {
        (6..18).contains(&self.observed_hour)
    }

    /// True when the class can be derived without the caller supplying one:
    /// wind speed plus either solar radiation or cloud cover plus the hour.
    pub fn can_derive_stability(&self) -> bool {
        self.wind_speed >= 0.0
            && (self.solar_radiation.is_some() || (0.0..=1.0).contains(&self.cloud_cover))
    }
}
