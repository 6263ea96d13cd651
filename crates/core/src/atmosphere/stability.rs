//! Pasquill stability classification by the Turner method
//!
//! The Turner scheme keys the stability class on an insolation category and
//! a surface wind-speed bin, with a separate table for night. Insolation is
//! taken from measured solar radiation when the snapshot has it, otherwise
//! from cloud cover and the hour of day, otherwise defaulted (moderate by
//! day, partly cloudy by night) with a diagnostic warning. Split table
//! entries (A-B, B-C, C-D) resolve toward neutral, as do ties at bin edges.
//!
//! # References
//! - Turner, D.B. (1964). "A diffusion model for an urban area."
//!   Journal of Applied Meteorology, 3(1), 83-91.
//! - Pasquill, F. (1961). "The estimation of the dispersion of windborne
//!   material." Meteorological Magazine, 90, 33-49.

use crate::core_types::weather::{PasquillClass, WeatherSnapshot};

/// Daytime insolation category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insolation {
    /// Clear sky, high sun (> 700 W/m²)
    Strong,
    /// Scattered cloud or moderate sun angle (350-700 W/m²)
    Moderate,
    /// Broken cloud or low sun (< 350 W/m²)
    Slight,
}

/// Nighttime sky category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NightSky {
    /// Cloud cover >= 4/8
    MostlyCloudy,
    /// Cloud cover <= 3/8
    PartlyCloudy,
}

/// Wind-speed bin index for the Turner tables: {<2, 2-3, 3-5, 5-6, >=6} m/s.
fn wind_bin(wind_speed: f64) -> usize {
    if wind_speed < 2.0 {
        0
    } else if wind_speed < 3.0 {
        1
    } else if wind_speed < 5.0 {
        2
    } else if wind_speed < 6.0 {
        3
    } else {
        4
    }
}

/// Day table, split entries already resolved toward neutral.
///
/// Rows are wind bins, columns are {strong, moderate, slight}.
const DAY_TABLE: [[PasquillClass; 3]; 5] = {
    use PasquillClass::{A, B, C, D};
    [
        [A, B, B], // < 2 m/s   (A-B -> B)
        [B, B, C], // 2-3 m/s   (A-B -> B)
        [B, C, C], // 3-5 m/s   (B-C -> C)
        [C, D, D], // 5-6 m/s   (C-D -> D)
        [C, D, D], // >= 6 m/s
    ]
};

/// Night table; columns are {mostly cloudy, partly cloudy/clear}.
const NIGHT_TABLE: [[PasquillClass; 2]; 5] = {
    use PasquillClass::{D, E, F};
    [
        [F, F], // < 2 m/s
        [E, F], // 2-3 m/s
        [D, E], // 3-5 m/s
        [D, D], // 5-6 m/s
        [D, D], // >= 6 m/s
    ]
};

/// Insolation category from measured solar radiation (W/m²).
pub fn insolation_from_radiation(solar_w_m2: f64) -> Insolation {
    if solar_w_m2 >= 700.0 {
        Insolation::Strong
    } else if solar_w_m2 >= 350.0 {
        Insolation::Moderate
    } else {
        Insolation::Slight
    }
}

/// Insolation category from cloud cover and hour of day.
///
/// Midday clear skies give strong insolation; the low-sun shoulder hours
/// never exceed moderate.
pub fn insolation_from_cloud(cloud_cover: f64, hour: u8) -> Insolation {
    let high_sun = (10..15).contains(&hour);
    if cloud_cover < 0.3 && high_sun {
        Insolation::Strong
    } else if cloud_cover < 0.7 {
        Insolation::Moderate
    } else {
        Insolation::Slight
    }
}

/// Classify stability from a weather snapshot.
///
/// Returns the class and pushes a warning when a defaulting path was taken.
/// A caller-supplied class short-circuits the derivation.
pub fn classify(weather: &WeatherSnapshot, warnings: &mut Vec<String>) -> PasquillClass {
    if let Some(class) = weather.pasquill_class {
        return class;
    }

    let bin = wind_bin(weather.wind_speed);

    // Heavy overcast is neutral regardless of sun or hour
    if weather.cloud_cover >= 0.9 {
        return PasquillClass::D;
    }

    if weather.is_daytime() {
        let insolation = match weather.solar_radiation {
            Some(solar) => insolation_from_radiation(solar),
            None if (0.0..=1.0).contains(&weather.cloud_cover) => {
                insolation_from_cloud(weather.cloud_cover, weather.observed_hour)
            }
            None => {
                warnings.push(
                    "stability: no solar radiation or cloud cover; defaulting to moderate insolation"
                        .to_owned(),
                );
                Insolation::Moderate
            }
        };
        let column = match insolation {
            Insolation::Strong => 0,
            Insolation::Moderate => 1,
            Insolation::Slight => 2,
        };
        DAY_TABLE[bin][column]
    } else {
        let sky = if (0.0..=1.0).contains(&weather.cloud_cover) {
            if weather.cloud_cover >= 0.5 { NightSky::MostlyCloudy } else { NightSky::PartlyCloudy }
        } else {
            warnings.push(
                "stability: no usable cloud cover at night; defaulting to partly cloudy".to_owned(),
            );
            NightSky::PartlyCloudy
        };
        let column = match sky {
            NightSky::MostlyCloudy => 0,
            NightSky::PartlyCloudy => 1,
        };
        NIGHT_TABLE[bin][column]
    }
}

/// Default mixing height (m) by class and day/night.
///
/// Convective daytime boundary layers run 1-1.6 km; the stable nocturnal
/// layer collapses to a few hundred metres.
pub fn default_mixing_height(class: PasquillClass, daytime: bool) -> f64 {
    if daytime {
        match class {
            PasquillClass::A => 1600.0,
            PasquillClass::B => 1200.0,
            PasquillClass::C => 1100.0,
            PasquillClass::D | PasquillClass::E | PasquillClass::F => 800.0,
        }
    } else {
        match class {
            PasquillClass::A | PasquillClass::B | PasquillClass::C | PasquillClass::D => 600.0,
            PasquillClass::E => 400.0,
            PasquillClass::F => 200.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(wind: f64, hour: u8, cloud: f64, solar: Option<f64>) -> WeatherSnapshot {
        WeatherSnapshot {
            wind_speed: wind,
            wind_direction: 270.0,
            temperature: 293.15,
            pressure: 101_325.0,
            humidity: 0.5,
            cloud_cover: cloud,
            solar_radiation: solar,
            observed_hour: hour,
            pasquill_class: None,
            vertical_profile: None,
        }
    }

    #[test]
    fn test_sunny_calm_day_is_very_unstable() {
        let mut warnings = Vec::new();
        let class = classify(&snapshot(1.5, 12, 0.1, Some(850.0)), &mut warnings);
        assert_eq!(class, PasquillClass::A);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_windy_day_is_neutral() {
        let mut warnings = Vec::new();
        let class = classify(&snapshot(8.0, 12, 0.4, Some(500.0)), &mut warnings);
        assert_eq!(class, PasquillClass::D);
    }

    #[test]
    fn test_clear_calm_night_is_stable() {
        let mut warnings = Vec::new();
        let class = classify(&snapshot(1.0, 2, 0.1, None), &mut warnings);
        assert_eq!(class, PasquillClass::F);
    }

    #[test]
    fn test_cloudy_breezy_night_is_near_neutral() {
        let mut warnings = Vec::new();
        let class = classify(&snapshot(4.0, 23, 0.7, None), &mut warnings);
        assert_eq!(class, PasquillClass::D);
    }

    #[test]
    fn test_heavy_overcast_is_neutral_day_or_night() {
        let mut warnings = Vec::new();
        assert_eq!(classify(&snapshot(2.5, 12, 0.95, None), &mut warnings), PasquillClass::D);
        assert_eq!(classify(&snapshot(2.5, 2, 0.95, None), &mut warnings), PasquillClass::D);
    }

    #[test]
    fn test_supplied_class_short_circuits() {
        let mut weather = snapshot(1.0, 12, 0.0, Some(900.0));
        weather.pasquill_class = Some(PasquillClass::F);
        let mut warnings = Vec::new();
        assert_eq!(classify(&weather, &mut warnings), PasquillClass::F);
    }

    #[test]
    fn test_split_entries_resolve_toward_neutral() {
        // 2-3 m/s strong insolation is the canonical A-B split, resolved to B
        let mut warnings = Vec::new();
        let class = classify(&snapshot(2.5, 12, 0.1, Some(850.0)), &mut warnings);
        assert_eq!(class, PasquillClass::B);
    }

    #[test]
    fn test_mixing_height_day_exceeds_night() {
        assert!(
            default_mixing_height(PasquillClass::D, true)
                > default_mixing_height(PasquillClass::D, false)
        );
        assert_eq!(default_mixing_height(PasquillClass::F, false), 200.0);
    }
}
