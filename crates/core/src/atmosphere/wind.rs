//! Surface-layer wind structure
//!
//! Power-law profile for transport winds, logarithmic friction velocity, and
//! the Golder (1972) band fit for Monin-Obukhov length. Heights are clamped
//! to a half metre so ground-level queries stay finite.
//!
//! # References
//! - Golder, D. (1972). "Relations among stability parameters in the
//!   surface layer." Boundary-Layer Meteorology, 3(1), 47-58.
//! - Irwin, J.S. (1979). "A theoretical variation of the wind profile
//!   power-law exponent as a function of surface roughness and stability."
//!   Atmospheric Environment, 13(1), 191-194.

use crate::core_types::units::VON_KARMAN;
use crate::core_types::weather::PasquillClass;

/// Minimum height (m) for profile queries; below this the log and power
/// profiles are not meaningful.
pub const MIN_PROFILE_HEIGHT: f64 = 0.5;

/// Wind speed at height `z` from the power-law profile
/// `u(z) = u_ref · (z / z_ref)^n` with the class exponent.
pub fn wind_at_height(u_ref: f64, z_ref: f64, z: f64, class: PasquillClass) -> f64 {
    let z = z.max(MIN_PROFILE_HEIGHT);
    u_ref * (z / z_ref).powf(class.power_law_exponent())
}

/// Friction velocity `u* = κ · u(z_ref) / ln(z_ref / z₀)`.
pub fn friction_velocity(u_ref: f64, z_ref: f64, roughness: f64) -> f64 {
    VON_KARMAN * u_ref / (z_ref / roughness).ln()
}

/// Monin-Obukhov length (m) from the Golder band fit
/// `1/L = a + b · log₁₀(z₀)`.
///
/// Neutral conditions return `+∞` (the 1/L fit passes through zero).
/// Unstable classes give negative L, stable classes positive L.
pub fn monin_obukhov_length(class: PasquillClass, roughness: f64) -> f64 {
    let (a, b) = match class {
        PasquillClass::A => (-0.096, 0.029),
        PasquillClass::B => (-0.037, 0.029),
        PasquillClass::C => (-0.002, 0.018),
        PasquillClass::D => (0.0, 0.0),
        PasquillClass::E => (0.004, -0.018),
        PasquillClass::F => (0.035, -0.036),
    };
    let inv_l = a + b * roughness.log10();
    if inv_l == 0.0 {
        f64::INFINITY
    } else {
        1.0 / inv_l
    }
}
