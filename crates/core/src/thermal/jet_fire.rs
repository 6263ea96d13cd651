//! Ignited-jet flame geometry
//!
//! Flame length follows the heat-release correlation `L_f = 5.3·Q̇^0.4`
//! (Q̇ in MW); the flame is idealised as a vertical cylinder whose width is
//! set by jet momentum at roughly an eighth of the length. The surface
//! emissive power comes from the radiated fraction of the heat release
//! spread over the cylinder's lateral surface.
//!
//! # References
//! - Hawthorne, W.R., Weddell, D.S., Hottel, H.C. (1949). "Mixing and
//!   combustion in turbulent gas jets." 3rd Symposium on Combustion.
//! - API RP 521 (2014). Flare and jet flame sizing relations.

use crate::core_types::chemical::ChemicalProperties;

use super::{FireCharacteristics, FlameGeometry};

/// Fraction of heat release radiated from the flame surface.
const RADIATED_FRACTION: f64 = 0.25;

/// Width-to-length ratio of a momentum-dominated jet flame.
const WIDTH_RATIO: f64 = 0.125;

/// Jet flame length (m) from heat release: `L_f = 5.3·Q̇_MW^0.4`.
pub fn flame_length(heat_release_mw: f64) -> f64 {
    if heat_release_mw <= 0.0 {
        return 0.0;
    }
    5.3 * heat_release_mw.powf(0.4)
}

/// Jet fire characteristics for a burning release rate.
///
/// Returns a zero-size flame for non-combustible chemicals.
pub fn jet_fire(mass_flow_kg_s: f64, duration: f64, chem: &ChemicalProperties) -> FireCharacteristics {
    let heat_of_combustion = chem.heat_of_combustion.unwrap_or(0.0);
    let heat_release_w = mass_flow_kg_s * heat_of_combustion;
    let length = flame_length(heat_release_w / 1e6);
    let radius = (length * WIDTH_RATIO / 2.0).max(0.01);

    // Radiated fraction of the heat release over the lateral surface
    let lateral_area = 2.0 * std::f64::consts::PI * radius * length;
    let sep = if lateral_area > 0.0 {
        RADIATED_FRACTION * heat_release_w / lateral_area
    } else {
        0.0
    };

    FireCharacteristics {
        geometry: FlameGeometry::VerticalCylinder { radius, height: length },
        surface_emissive_power: sep,
        duration,
    }
}
