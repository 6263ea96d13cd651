//! Atmospheric state derivation
//!
//! One [`WeatherSnapshot`] plus the scenario terrain regime yields an
//! [`AtmosphericState`]: stability class, roughness, friction velocity,
//! Monin-Obukhov length, mixing height and the transport wind profile. This
//! is the first stage of every run; everything downstream reads atmospheric
//! parameters from here and never from the raw snapshot.

pub mod profile;
pub mod stability;
pub mod wind;

use tracing::debug;

use crate::core_types::scenario::TerrainRoughness;
use crate::core_types::units;
use crate::core_types::weather::{PasquillClass, WeatherSnapshot};

/// Derived atmospheric parameters for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AtmosphericState {
    /// Stability class (supplied or derived)
    pub pasquill: PasquillClass,
    /// Wind speed at the reference height (m/s)
    pub wind_speed_ref: f64,
    /// Reference height of the wind observation (m)
    pub reference_height: f64,
    /// Meteorological wind direction (degrees from north, blowing from)
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
    /// Ambient air density (kg/m³)
    pub air_density: f64,
    /// Aerodynamic roughness length (m)
    pub roughness: f64,
    /// Friction velocity (m/s)
    pub friction_velocity: f64,
    /// Monin-Obukhov length (m); `+∞` for neutral
    pub monin_obukhov: f64,
    /// Mixing height (m)
    pub mixing_height: f64,
    /// True when the snapshot was taken in the 06-18 local window
    pub daytime: bool,
}

impl AtmosphericState {
    /// Derive the full state from a snapshot and terrain regime.
    ///
    /// Recovery paths (defaulted insolation, profile overrides) append to
    /// `warnings`; the derivation itself cannot fail once the snapshot has
    /// passed input validation.
    pub fn derive(
        weather: &WeatherSnapshot,
        terrain: TerrainRoughness,
        reference_height: f64,
        warnings: &mut Vec<String>,
    ) -> Self {
        let pasquill = stability::classify(weather, warnings);
        let roughness = terrain.roughness_length(weather.wind_speed);
        let friction_velocity =
            wind::friction_velocity(weather.wind_speed, reference_height, roughness);
        let monin_obukhov = wind::monin_obukhov_length(pasquill, roughness);

        let tabulated = stability::default_mixing_height(pasquill, weather.is_daytime());
        let mixing_height = match weather
            .vertical_profile
            .as_deref()
            .and_then(profile::mixing_height_from_profile)
        {
            Some(from_profile) => {
                warnings.push(format!(
                    "mixing height {from_profile:.0} m taken from sounding (tabulated {tabulated:.0} m)"
                ));
                from_profile
            }
            None => tabulated,
        };

        debug!(
            class = %pasquill,
            u_star = friction_velocity,
            mixing_height,
            "atmospheric state derived"
        );

        Self {
            pasquill,
            wind_speed_ref: weather.wind_speed,
            reference_height,
            wind_direction: weather.wind_direction,
            temperature: weather.temperature,
            pressure: weather.pressure,
            humidity: weather.humidity,
            cloud_cover: weather.cloud_cover,
            solar_radiation: weather.solar_radiation,
            air_density: units::air_density(weather.temperature, weather.pressure),
            roughness,
            friction_velocity,
            monin_obukhov,
            mixing_height,
            daytime: weather.is_daytime(),
        }
    }

    /// Transport wind speed (m/s) at height `z` from the power-law profile.
    pub fn wind_at(&self, z: f64) -> f64 {
        wind::wind_at_height(self.wind_speed_ref, self.reference_height, z, self.pasquill)
    }

    /// Water-vapor partial pressure (Pa) from relative humidity, by the
    /// Magnus saturation formula. Used by the thermal transmittance model.
    pub fn water_vapor_pressure(&self) -> f64 {
        let t_c = units::kelvin_to_celsius(self.temperature);
        let saturation = 610.94 * (17.625 * t_c / (t_c + 243.04)).exp();
        self.humidity * saturation
    }
}
