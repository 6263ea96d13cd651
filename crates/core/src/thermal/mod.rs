//! Thermal radiation engine
//!
//! Fire-type-specific geometry (fireball, jet, pool, flash fire) feeds a
//! common flux contract: `q″ = F·SEP·τ_atm·wind-tilt`, with the view factor
//! from the flame shape, atmospheric transmittance over the path, and a
//! small downwind enhancement for wind-tilted flames. The field is sampled
//! on a polar lattice and radial damage zones come from the contour
//! module's bisection search.

pub mod dose;
pub mod fireball;
pub mod jet_fire;
pub mod pool_fire;
pub mod view_factor;

use tracing::debug;

use crate::atmosphere::AtmosphericState;
use crate::contour;
use crate::core_types::geo::{self, GeoPoint};
use crate::core_types::output::{Contour, ContourType, ThermalSample};

/// Idealised flame shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlameGeometry {
    /// Fireball or burning cloud
    Sphere {
        /// Flame radius (m)
        radius: f64,
        /// Centre height above grade (m)
        center_height: f64,
    },
    /// Jet or pool flame
    VerticalCylinder {
        /// Flame radius (m)
        radius: f64,
        /// Flame height (m)
        height: f64,
    },
}

/// Everything the flux contract needs to know about one fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireCharacteristics {
    /// Flame shape and size
    pub geometry: FlameGeometry,
    /// Surface emissive power (W/m²)
    pub surface_emissive_power: f64,
    /// Burn duration (s)
    pub duration: f64,
}

/// Default clear-air extinction coefficient (1/m).
const CLEAR_AIR_EXTINCTION: f64 = 7e-5;

/// Wind-tilt flux enhancement coefficient.
const TILT_GAIN: f64 = 0.2;

/// Fluxes below this (W/m²) bound the sampled field extent.
const FIELD_FLOOR: f64 = 100.0;

/// Radial damage-zone thresholds (W/m²), severe first.
const ZONE_THRESHOLDS: [(f64, &str); 4] = [
    (37_500.0, "37.5 kW/m2 - process equipment damage"),
    (12_500.0, "12.5 kW/m2 - wood ignition"),
    (5_000.0, "5 kW/m2 - emergency action limit"),
    (1_600.0, "1.6 kW/m2 - prolonged exposure discomfort"),
];

/// Atmospheric transmittance over a radiation path.
///
/// `τ = exp(−k·L)` in clear air; when a water-vapor partial pressure is
/// supplied the Pietersen humidity fit `τ = 2.02·(p_w·L)^(−0.09)` applies.
pub fn transmissivity(path_length: f64, water_vapor_pressure: Option<f64>) -> f64 {
    match water_vapor_pressure {
        Some(p_w) if p_w > 0.0 => (2.02 * (p_w * path_length.max(1.0)).powf(-0.09)).clamp(0.0, 1.0),
        _ => (-CLEAR_AIR_EXTINCTION * path_length).exp(),
    }
}

/// Incident heat flux (W/m²) at a ground-level target.
///
/// `distance` is horizontal from the flame axis; `angle` is the sample
/// direction in east-CCW degrees, used only for the wind-tilt factor.
pub fn incident_flux(
    fire: &FireCharacteristics,
    distance: f64,
    angle_deg: f64,
    atmos: &AtmosphericState,
    humidity_correction: bool,
) -> f64 {
    let (view, path) = match fire.geometry {
        FlameGeometry::Sphere { radius, center_height } => {
            let slant = (distance * distance + center_height * center_height).sqrt();
            (view_factor::sphere_to_point(radius, slant), slant)
        }
        FlameGeometry::VerticalCylinder { radius, height } => {
            let view = view_factor::vertical_cylinder(radius, height, distance.max(radius * 1.01));
            (view, (distance - radius).max(1.0))
        }
    };

    let tau = transmissivity(
        path,
        humidity_correction.then(|| atmos.water_vapor_pressure()),
    );

    // Flames lean downwind; the tilt pushes flux toward the downwind sector
    let downwind = geo::downwind_azimuth_east_ccw(atmos.wind_direction);
    let relative = (angle_deg - downwind).to_radians();
    let tilt = (1.0 + TILT_GAIN * (atmos.wind_speed_ref / 10.0).min(1.0) * relative.cos()).max(0.8);

    fire.surface_emissive_power * view * tau * tilt
}

/// Sample the thermal field on a polar lattice.
///
/// Distances are log-spaced out to where the downwind flux falls below the
/// field floor; twelve azimuths cover the circle.
pub fn build_field(
    fire: &FireCharacteristics,
    atmos: &AtmosphericState,
    humidity_correction: bool,
    max_distance: f64,
) -> Vec<ThermalSample> {
    let downwind = geo::downwind_azimuth_east_ccw(atmos.wind_direction);
    let extent = contour::radial_zone(
        |r| incident_flux(fire, r, downwind, atmos, humidity_correction),
        FIELD_FLOOR,
        10.0,
        max_distance,
    )
    .unwrap_or(200.0);

    let n_radial = 24;
    let n_angular = 12;
    let log_span = (extent / 10.0).ln();

    let mut samples = Vec::with_capacity(n_radial * n_angular);
    for i in 0..n_radial {
        let distance = 10.0 * (log_span * i as f64 / (n_radial - 1) as f64).exp();
        for j in 0..n_angular {
            let angle = 360.0 * j as f64 / n_angular as f64;
            let q = incident_flux(fire, distance, angle, atmos, humidity_correction);
            samples.push(ThermalSample {
                distance,
                angle,
                heat_flux: q,
                damage: dose::damage_category(q),
                time_to_pain: dose::time_to_dose(q, dose::PAIN_DOSE)
                    .filter(|&t| t <= fire.duration),
                time_to_second_degree: dose::time_to_dose(q, dose::SECOND_DEGREE_DOSE)
                    .filter(|&t| t <= fire.duration),
                lethality_probability: dose::lethality_probability(q, fire.duration),
            });
        }
    }

    debug!(extent, samples = samples.len(), "thermal field sampled");
    samples
}

/// Radial damage zones as circular contours around the fire.
pub fn damage_zones(
    fire: &FireCharacteristics,
    atmos: &AtmosphericState,
    origin: &GeoPoint,
    humidity_correction: bool,
    max_distance: f64,
) -> Vec<Contour> {
    let downwind = geo::downwind_azimuth_east_ccw(atmos.wind_direction);
    ZONE_THRESHOLDS
        .iter()
        .filter_map(|&(threshold, label)| {
            contour::radial_zone(
                |r| incident_flux(fire, r, downwind, atmos, humidity_correction),
                threshold,
                1.0,
                max_distance,
            )
            .map(|radius| contour::circle_contour(origin, radius, threshold, label, ContourType::Custom))
        })
        .collect()
}
