//! BLEVE fireball and flash-fire geometry
//!
//! Both are treated as transient spheres. The fireball follows the CCPS
//! cube-root correlations for diameter and duration with the TNO surface
//! emissive power fit; a flash fire is the burning flammable cloud itself,
//! radiating weakly (the 80 kW/m² flame-sheet value) for a few seconds.
//!
//! # References
//! - CCPS (1994). "Guidelines for Evaluating the Characteristics of Vapor
//!   Cloud Explosions, Flash Fires, and BLEVEs."
//! - TNO (1992). Yellow Book, CPR 14E, fireball model.

use super::{FireCharacteristics, FlameGeometry};

/// Surface emissive power of a flash-fire flame sheet (W/m²).
const FLASH_FIRE_SEP: f64 = 80_000.0;

/// Flash-fire burn duration (s).
const FLASH_FIRE_DURATION: f64 = 5.0;

/// Fireball diameter (m): `D = 5.8·M^(1/3)`.
pub fn fireball_diameter(mass_kg: f64) -> f64 {
    5.8 * mass_kg.powf(1.0 / 3.0)
}

/// Fireball duration (s): `t = 0.45·M^(1/3)`.
pub fn fireball_duration(mass_kg: f64) -> f64 {
    0.45 * mass_kg.powf(1.0 / 3.0)
}

/// Fireball surface emissive power (W/m²).
///
/// The TNO fit `280·(M/1000)^0.32` kW/m² above a tonne; smaller fireballs
/// radiate at a flat 200 kW/m².
pub fn fireball_sep(mass_kg: f64) -> f64 {
    if mass_kg > 1000.0 {
        280_000.0 * (mass_kg / 1000.0).powf(0.32)
    } else {
        200_000.0
    }
}

/// BLEVE fireball characteristics for a fuel mass.
///
/// The fireball centre lifts to one diameter above grade.
pub fn bleve_fireball(mass_kg: f64) -> FireCharacteristics {
    let diameter = fireball_diameter(mass_kg);
    FireCharacteristics {
        geometry: FlameGeometry::Sphere { radius: diameter / 2.0, center_height: diameter },
        surface_emissive_power: fireball_sep(mass_kg),
        duration: fireball_duration(mass_kg),
    }
}

/// Flash-fire characteristics for a burning cloud volume.
///
/// The cloud is idealised as a ground-resting sphere of equal volume.
pub fn flash_fire(cloud_volume_m3: f64) -> FireCharacteristics {
    let radius = (3.0 * cloud_volume_m3 / (4.0 * std::f64::consts::PI)).powf(1.0 / 3.0);
    FireCharacteristics {
        geometry: FlameGeometry::Sphere { radius, center_height: radius },
        surface_emissive_power: FLASH_FIRE_SEP,
        duration: FLASH_FIRE_DURATION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ten_tonne_fireball_geometry() {
        // 10 000 kg of propane: D ~ 125 m, t ~ 9.7 s
        assert_relative_eq!(fireball_diameter(10_000.0), 124.9, max_relative = 0.01);
        assert_relative_eq!(fireball_duration(10_000.0), 9.69, max_relative = 0.01);
    }

    #[test]
    fn test_sep_grows_with_mass_above_a_tonne() {
        assert_eq!(fireball_sep(500.0), 200_000.0);
        let ten_tonnes = fireball_sep(10_000.0);
        assert_relative_eq!(ten_tonnes, 585_000.0, max_relative = 0.01);
        assert!(fireball_sep(100_000.0) > ten_tonnes);
    }

    #[test]
    fn test_fireball_centre_at_one_diameter() {
        let fire = bleve_fireball(10_000.0);
        match fire.geometry {
            FlameGeometry::Sphere { radius, center_height } => {
                assert_relative_eq!(center_height, 2.0 * radius);
            }
            FlameGeometry::VerticalCylinder { .. } => panic!("fireball must be a sphere"),
        }
    }

    #[test]
    fn test_flash_fire_recovers_cloud_volume() {
        let fire = flash_fire(4000.0);
        match fire.geometry {
            FlameGeometry::Sphere { radius, .. } => {
                let volume = 4.0 / 3.0 * std::f64::consts::PI * radius.powi(3);
                assert_relative_eq!(volume, 4000.0, max_relative = 1e-9);
            }
            FlameGeometry::VerticalCylinder { .. } => panic!("flash fire must be a sphere"),
        }
        assert_eq!(fire.duration, 5.0);
        assert_eq!(fire.surface_emissive_power, 80_000.0);
    }
}
