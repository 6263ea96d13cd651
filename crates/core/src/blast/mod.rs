//! Vapor cloud explosion blast engine
//!
//! Flammable mass → BST-efficiency TNT equivalence → Kingery-Bulmash
//! overpressure with ground reflection and far-field attenuation →
//! arrival times, shock Mach numbers, and probit casualty probabilities,
//! sampled on the same polar lattice the thermal engine uses.

pub mod kingery;
pub mod tnt;

use tracing::debug;

use crate::atmosphere::AtmosphericState;
use crate::contour;
use crate::core_types::geo::{self, GeoPoint};
use crate::core_types::math::probit_to_probability;
use crate::core_types::output::{BlastDamageCategory, BlastSample, Contour, ContourType};

/// Far-field atmospheric attenuation coefficient (1/m).
const ATTENUATION: f64 = 2e-5;

/// Wind-direction asymmetry gain on the overpressure.
const WIND_ASYMMETRY_GAIN: f64 = 0.05;

/// Overpressures below this (Pa) bound the sampled field extent.
const FIELD_FLOOR: f64 = 200.0;

/// Radial damage-zone thresholds (Pa), severe first.
const ZONE_THRESHOLDS: [(f64, &str); 4] = [
    (35_000.0, "35 kPa - heavy structural damage"),
    (17_000.0, "17 kPa - partial building collapse"),
    (7_000.0, "7 kPa - minor structural damage"),
    (1_000.0, "1 kPa - window glass breakage"),
];

/// Explosion parameters after TNT reduction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlastSource {
    /// Equivalent TNT mass (kg)
    pub tnt_mass: f64,
    /// Ignition height above grade (m)
    pub ignition_height: f64,
    /// Apply the wind-direction asymmetry to the field
    pub wind_asymmetry: bool,
}

/// Ground-reflection factor by ignition height.
///
/// A ground-level burst reflects into a near-hemispherical wave (1.8); an
/// elevated burst approaches the free-air value (1.1).
pub fn ground_reflection_factor(ignition_height: f64) -> f64 {
    let fraction = (ignition_height / 30.0).clamp(0.0, 1.0);
    1.8 - 0.7 * fraction
}

/// Peak overpressure (Pa) at a ground range and direction.
pub fn overpressure_at(
    source: &BlastSource,
    distance: f64,
    angle_deg: f64,
    atmos: &AtmosphericState,
) -> f64 {
    let z = kingery::scaled_distance(distance.max(0.5), source.tnt_mass);
    let mut dp = kingery::overpressure(z) * ground_reflection_factor(source.ignition_height);
    dp *= (-ATTENUATION * distance).exp();
    if source.wind_asymmetry {
        let downwind = geo::downwind_azimuth_east_ccw(atmos.wind_direction);
        let relative = (angle_deg - downwind).to_radians();
        dp *= 1.0 + WIND_ASYMMETRY_GAIN * (atmos.wind_speed_ref / 10.0).min(1.0) * relative.cos();
    }
    dp
}

/// Lethality probability from lung-damage overpressure:
/// `Pr = −77.1 + 6.91·ln(ΔP)`.
pub fn lethality_probability(overpressure_pa: f64) -> f64 {
    if overpressure_pa <= 0.0 {
        return 0.0;
    }
    probit_to_probability(-77.1 + 6.91 * overpressure_pa.ln())
}

/// Injury probability (eardrum rupture): `Pr = −46.1 + 4.82·ln(ΔP)`.
pub fn injury_probability(overpressure_pa: f64) -> f64 {
    if overpressure_pa <= 0.0 {
        return 0.0;
    }
    probit_to_probability(-46.1 + 4.82 * overpressure_pa.ln())
}

/// Damage band for a peak overpressure.
pub fn damage_category(overpressure_pa: f64) -> BlastDamageCategory {
    let kpa = overpressure_pa / 1000.0;
    if kpa < 1.0 {
        BlastDamageCategory::Negligible
    } else if kpa < 7.0 {
        BlastDamageCategory::GlassBreakage
    } else if kpa < 17.0 {
        BlastDamageCategory::MinorDamage
    } else if kpa < 35.0 {
        BlastDamageCategory::MajorDamage
    } else {
        BlastDamageCategory::Destruction
    }
}

/// Sample the blast field on a polar lattice.
pub fn build_field(
    source: &BlastSource,
    atmos: &AtmosphericState,
    max_distance: f64,
) -> Vec<BlastSample> {
    let downwind = geo::downwind_azimuth_east_ccw(atmos.wind_direction);
    let extent = contour::radial_zone(
        |r| overpressure_at(source, r, downwind, atmos),
        FIELD_FLOOR,
        5.0,
        max_distance,
    )
    .unwrap_or(200.0);

    let n_radial = 24;
    let n_angular = 12;
    let log_span = (extent / 5.0).ln();

    let mut samples = Vec::with_capacity(n_radial * n_angular);
    for i in 0..n_radial {
        let distance = 5.0 * (log_span * i as f64 / (n_radial - 1) as f64).exp();
        for j in 0..n_angular {
            let angle = 360.0 * j as f64 / n_angular as f64;
            let dp = overpressure_at(source, distance, angle, atmos);
            samples.push(BlastSample {
                distance,
                angle,
                overpressure: dp,
                arrival_time: kingery::arrival_time(
                    distance,
                    source.tnt_mass,
                    atmos.pressure,
                    atmos.temperature,
                ),
                mach: kingery::shock_mach(dp, atmos.pressure),
                lethality_probability: lethality_probability(dp),
                injury_probability: injury_probability(dp),
                damage: damage_category(dp),
            });
        }
    }

    debug!(extent, tnt_mass = source.tnt_mass, "blast field sampled");
    samples
}

/// Radial damage zones as circular contours around the ignition point.
pub fn damage_zones(
    source: &BlastSource,
    atmos: &AtmosphericState,
    origin: &GeoPoint,
    max_distance: f64,
) -> Vec<Contour> {
    let downwind = geo::downwind_azimuth_east_ccw(atmos.wind_direction);
    ZONE_THRESHOLDS
        .iter()
        .filter_map(|&(threshold, label)| {
            contour::radial_zone(
                |r| overpressure_at(source, r, downwind, atmos),
                threshold,
                1.0,
                max_distance,
            )
            .map(|radius| {
                contour::circle_contour(origin, radius, threshold, label, ContourType::Custom)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::scenario::TerrainRoughness;
    use crate::core_types::weather::WeatherSnapshot;

    fn atmosphere() -> AtmosphericState {
        let weather = WeatherSnapshot::neutral(5.0, 270.0, 293.15);
        let mut warnings = Vec::new();
        AtmosphericState::derive(&weather, TerrainRoughness::OpenCountry, 10.0, &mut warnings)
    }

    fn reference_source() -> BlastSource {
        // 500 kg flammable mass at 7 MJ/kg, reactivity 3, congestion 0.3,
        // confinement 0.2: ~142 kg TNT
        let eta = tnt::efficiency(3, 0.3, 0.2);
        BlastSource {
            tnt_mass: tnt::tnt_equivalent_mass(500.0, 7e6, eta),
            ignition_height: 0.0,
            wind_asymmetry: false,
        }
    }

    #[test]
    fn test_reference_vce_overpressure_at_100_metres() {
        let source = reference_source();
        let atmos = atmosphere();
        assert!((50.0..180.0).contains(&source.tnt_mass), "M_TNT = {:.0} kg", source.tnt_mass);
        let dp = overpressure_at(&source, 100.0, 0.0, &atmos);
        assert!(
            (10_000.0..=40_000.0).contains(&dp),
            "overpressure at 100 m is {:.1} kPa",
            dp / 1000.0
        );
    }

    #[test]
    fn test_ground_reflection_band() {
        assert_eq!(ground_reflection_factor(0.0), 1.8);
        assert!((ground_reflection_factor(15.0) - 1.45).abs() < 1e-9);
        assert_eq!(ground_reflection_factor(100.0), 1.1);
    }

    #[test]
    fn test_probits_order_lethality_below_injury() {
        for dp in [5_000.0, 20_000.0, 80_000.0] {
            assert!(
                injury_probability(dp) > lethality_probability(dp),
                "injury must be likelier than death at {dp} Pa"
            );
        }
        // Weak blasts injure essentially no one
        assert!(injury_probability(1_000.0) < 0.01);
        // Very strong blasts are reliably lethal
        assert!(lethality_probability(400_000.0) > 0.5);
    }

    #[test]
    fn test_field_distance_ordering() {
        let source = reference_source();
        let atmos = atmosphere();
        let field = build_field(&source, &atmos, 10_000.0);
        assert_eq!(field.len(), 24 * 12);
        // Along one azimuth: overpressure falls, arrival grows
        let along: Vec<&BlastSample> = field.iter().filter(|s| s.angle == 0.0).collect();
        for pair in along.windows(2) {
            assert!(pair[1].overpressure < pair[0].overpressure);
            assert!(pair[1].arrival_time > pair[0].arrival_time);
        }
    }

    #[test]
    fn test_zones_nest_by_severity() {
        let source = reference_source();
        let atmos = atmosphere();
        let origin = GeoPoint::new(-32.0, 115.9);
        let zones = damage_zones(&source, &atmos, &origin, 10_000.0);
        assert_eq!(zones.len(), 4, "142 kg TNT produces all four zones");
        for pair in zones.windows(2) {
            assert!(pair[0].max_downwind_m < pair[1].max_downwind_m);
        }
    }

    #[test]
    fn test_wind_asymmetry_skews_downwind() {
        let mut source = reference_source();
        source.wind_asymmetry = true;
        let atmos = atmosphere(); // wind from the west: downwind is east (0°)
        let downwind = overpressure_at(&source, 150.0, 0.0, &atmos);
        let upwind = overpressure_at(&source, 150.0, 180.0, &atmos);
        assert!(downwind > upwind);
    }
}
