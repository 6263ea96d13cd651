//! Vertical profile interpolation and mixing-height estimation
//!
//! When the weather snapshot carries an upper-air sounding, the mixing
//! height is estimated three independent ways — inversion base, wind-speed
//! maximum, and a bulk-Richardson criterion — and the median of the
//! available estimates overrides the class-tabulated default.

use crate::core_types::units::GRAVITY;
use crate::core_types::weather::ProfileLevel;

/// Bulk Richardson number above which the layer is dynamically decoupled.
const CRITICAL_BULK_RICHARDSON: f64 = 0.25;

/// Dry-adiabatic lapse rate (K/m) used to form potential temperature.
const DRY_ADIABATIC_LAPSE: f64 = 0.0098;

/// Linearly interpolate temperature (K) at height `z` from a sounding.
///
/// Extrapolation is flat beyond the profile ends.
pub fn temperature_at(profile: &[ProfileLevel], z: f64) -> Option<f64> {
    interpolate(profile, z, |level| level.temperature)
}

/// Linearly interpolate wind speed (m/s) at height `z` from a sounding.
pub fn wind_speed_at(profile: &[ProfileLevel], z: f64) -> Option<f64> {
    interpolate(profile, z, |level| level.wind_speed)
}

fn interpolate<F: Fn(&ProfileLevel) -> f64>(
    profile: &[ProfileLevel],
    z: f64,
    value: F,
) -> Option<f64> {
    if profile.is_empty() {
        return None;
    }
    if z <= profile[0].height {
        return Some(value(&profile[0]));
    }
    for pair in profile.windows(2) {
        if z <= pair[1].height {
            let span = pair[1].height - pair[0].height;
            if span <= 0.0 {
                return Some(value(&pair[1]));
            }
            let t = (z - pair[0].height) / span;
            return Some(value(&pair[0]) * (1.0 - t) + value(&pair[1]) * t);
        }
    }
    profile.last().map(value)
}

/// Height of the first temperature inversion base, when one exists.
fn inversion_height(profile: &[ProfileLevel]) -> Option<f64> {
    profile
        .windows(2)
        .find(|pair| pair[1].temperature > pair[0].temperature)
        .map(|pair| pair[0].height)
}

/// Height of an interior wind-speed maximum (low-level jet), when one exists.
fn wind_maximum_height(profile: &[ProfileLevel]) -> Option<f64> {
    if profile.len() < 3 {
        return None;
    }
    profile
        .windows(3)
        .find(|w| w[1].wind_speed > w[0].wind_speed && w[1].wind_speed > w[2].wind_speed)
        .map(|w| w[1].height)
}

/// Height where the bulk Richardson number first exceeds its critical value.
fn richardson_height(profile: &[ProfileLevel]) -> Option<f64> {
    let surface = profile.first()?;
    let theta_0 = surface.temperature + DRY_ADIABATIC_LAPSE * surface.height;
    for level in profile.iter().skip(1) {
        let dz = level.height - surface.height;
        if dz <= 0.0 || level.wind_speed <= 0.1 {
            continue;
        }
        let theta = level.temperature + DRY_ADIABATIC_LAPSE * level.height;
        let ri = GRAVITY / theta_0 * (theta - theta_0) * dz / level.wind_speed.powi(2);
        if ri > CRITICAL_BULK_RICHARDSON {
            return Some(level.height);
        }
    }
    None
}

/// Mixing height from a sounding: the median of the inversion-base,
/// wind-maximum and Richardson-criterion estimates that are available.
///
/// `None` when no criterion yields an estimate.
pub fn mixing_height_from_profile(profile: &[ProfileLevel]) -> Option<f64> {
    let mut estimates: Vec<f64> = [
        inversion_height(profile),
        wind_maximum_height(profile),
        richardson_height(profile),
    ]
    .into_iter()
    .flatten()
    .collect();

    if estimates.is_empty() {
        return None;
    }
    estimates.sort_by(f64::total_cmp);
    let n = estimates.len();
    let median = if n % 2 == 1 {
        estimates[n / 2]
    } else {
        0.5 * (estimates[n / 2 - 1] + estimates[n / 2])
    };
    Some(median)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn level(height: f64, temperature: f64, wind_speed: f64) -> ProfileLevel {
        ProfileLevel { height, temperature, wind_speed }
    }

    #[test]
    fn test_interpolation_between_levels() {
        let profile = vec![level(0.0, 290.0, 2.0), level(100.0, 288.0, 6.0)];
        assert_relative_eq!(temperature_at(&profile, 50.0).unwrap(), 289.0);
        assert_relative_eq!(wind_speed_at(&profile, 25.0).unwrap(), 3.0);
    }

    #[test]
    fn test_interpolation_clamps_at_ends() {
        let profile = vec![level(10.0, 290.0, 2.0), level(100.0, 288.0, 6.0)];
        assert_relative_eq!(temperature_at(&profile, 0.0).unwrap(), 290.0);
        assert_relative_eq!(wind_speed_at(&profile, 5000.0).unwrap(), 6.0);
    }

    #[test]
    fn test_inversion_base_detected() {
        let profile = vec![
            level(0.0, 290.0, 2.0),
            level(200.0, 288.0, 4.0),
            level(400.0, 287.0, 5.0),
            level(600.0, 289.0, 5.0), // inversion starts at 400 m
            level(800.0, 291.0, 5.0),
        ];
        assert_eq!(mixing_height_from_profile(&profile), Some(400.0));
    }

    #[test]
    fn test_median_of_multiple_criteria() {
        // Inversion at 300 m, low-level jet at 500 m: median of two is 400 m
        let profile = vec![
            level(0.0, 290.0, 2.0),
            level(300.0, 288.0, 5.0),
            level(500.0, 289.0, 9.0),
            level(700.0, 290.0, 6.0),
        ];
        let h = mixing_height_from_profile(&profile).unwrap();
        assert!(h >= 300.0 && h <= 500.0, "median estimate {h} outside criteria span");
    }

    #[test]
    fn test_well_mixed_profile_gives_no_estimate() {
        // Adiabatic cooling with monotone wind: no inversion, no jet, Ri small
        let profile = vec![
            level(0.0, 300.0, 5.0),
            level(500.0, 295.0, 7.0),
            level(1000.0, 290.0, 9.0),
        ];
        assert_eq!(mixing_height_from_profile(&profile), None);
    }
}
