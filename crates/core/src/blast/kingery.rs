//! Kingery-Bulmash overpressure curve
//!
//! Peak side-on overpressure for a hemispherical surface burst of TNT as a
//! function of scaled distance `Z = R/M^(1/3)`. The mid-range is the
//! piecewise log-polynomial fit (Swisdak's simplified coefficient rows);
//! below the near breakpoint the curve continues on an anchored `Z⁻³`
//! branch, above the far breakpoint it relaxes to the acoustic `1/Z`
//! far field. Both joins are continuous by construction.
//!
//! # References
//! - Kingery, C.N., Bulmash, G. (1984). "Airblast parameters from TNT
//!   spherical air burst and hemispherical surface burst." ARBRL-TR-02555.
//! - Swisdak, M.M. (1994). "Simplified Kingery airblast calculations."
//!   26th DoD Explosives Safety Seminar.

use crate::core_types::math::bisect_to;
use crate::core_types::units::{sound_speed, GAMMA_AIR};

/// Near-field breakpoint in scaled distance (m/kg^(1/3)).
pub const Z_NEAR: f64 = 0.955;

/// Far-field breakpoint in scaled distance (m/kg^(1/3)).
pub const Z_FAR: f64 = 40.0;

/// Log-polynomial segment boundaries of the fitted range.
const Z_SEGMENT_MID: f64 = 2.9;
const Z_SEGMENT_FAR: f64 = 23.8;

/// Fitted overpressure (kPa) inside the log-polynomial range.
fn fitted_kpa(z: f64) -> f64 {
    let u = z.ln();
    let exponent = if z < Z_SEGMENT_MID {
        7.2106 - 2.1069 * u - 0.3229 * u * u + 0.1117 * u.powi(3) + 0.0685 * u.powi(4)
    } else if z < Z_SEGMENT_FAR {
        7.5938 - 3.0523 * u + 0.40977 * u * u + 0.0261 * u.powi(3) - 0.01267 * u.powi(4)
    } else {
        // Far segment is log-linear (higher coefficients zero)
        6.0536 - 1.4066 * u
    };
    exponent.exp()
}

/// Peak side-on overpressure (Pa) at scaled distance `z` (m/kg^(1/3)).
pub fn overpressure(z: f64) -> f64 {
    let z = z.max(0.05);
    let kpa = if z < Z_NEAR {
        // Anchored cube-law continuation of the fitted curve
        fitted_kpa(Z_NEAR) * (Z_NEAR / z).powi(3)
    } else if z <= Z_FAR {
        fitted_kpa(z)
    } else {
        // Acoustic far field decays as 1/Z from the fitted endpoint
        fitted_kpa(Z_FAR) * Z_FAR / z
    };
    kpa * 1000.0
}

/// Scaled distance `Z = R / M^(1/3)`.
pub fn scaled_distance(range_m: f64, tnt_mass_kg: f64) -> f64 {
    range_m / tnt_mass_kg.max(1e-6).powf(1.0 / 3.0)
}

/// Shock Mach number from the Rankine-Hugoniot jump:
/// `M = √(1 + (γ+1)/(2γ)·ΔP/p₀)`.
pub fn shock_mach(overpressure_pa: f64, ambient_pa: f64) -> f64 {
    (1.0 + (GAMMA_AIR + 1.0) / (2.0 * GAMMA_AIR) * overpressure_pa / ambient_pa).sqrt()
}

/// Shock arrival time (s) at `range_m`, by integrating `ds/u_shock` along
/// the decaying wave.
pub fn arrival_time(
    range_m: f64,
    tnt_mass_kg: f64,
    ambient_pa: f64,
    temperature_k: f64,
) -> f64 {
    let c0 = sound_speed(temperature_k);
    let step = 1.0;
    let mut t = 0.0;
    let mut s = 0.5 * step;
    while s < range_m {
        let dp = overpressure(scaled_distance(s, tnt_mass_kg));
        t += step / (shock_mach(dp, ambient_pa) * c0);
        s += step;
    }
    t
}

/// Range (m) at which the overpressure falls to `target_pa`.
pub fn range_for_overpressure(target_pa: f64, tnt_mass_kg: f64) -> Option<f64> {
    bisect_to(
        |r| overpressure(scaled_distance(r, tnt_mass_kg)),
        target_pa,
        0.5,
        1e6,
        1.0,
    )
}
