//! Thermal dose and injury response
//!
//! Thermal injury correlates with the dose `Φ = (q″)^(4/3) · t` (thermal
//! dose units, q″ in kW/m², t in seconds). Stoll-curve dose thresholds give
//! times to pain and second-degree burn; the Eisenberg probits convert the
//! same dose into injury and lethality probabilities.
//!
//! # References
//! - Stoll, A.M., Greene, L.C. (1959). "Relationship between pain and
//!   tissue damage due to thermal radiation." J. Applied Physiology, 14.
//! - Eisenberg, N.A. et al. (1975). "Vulnerability model: a simulation
//!   system for assessing damage resulting from marine spills." CG-D-136-75.

use crate::core_types::math::probit_to_probability;
use crate::core_types::output::ThermalDamageCategory;

/// Stoll dose threshold for the onset of pain ((kW/m²)^(4/3)·s).
pub const PAIN_DOSE: f64 = 92.0;

/// Stoll dose threshold for second-degree burns ((kW/m²)^(4/3)·s).
pub const SECOND_DEGREE_DOSE: f64 = 240.0;

/// Fluxes below this (W/m²) never accumulate an injurious dose; strong
/// summer sun is ~1 kW/m².
pub const HARMLESS_FLUX: f64 = 1000.0;

/// Thermal dose `(q″)^(4/3)·t` in thermal dose units.
pub fn thermal_dose(heat_flux_w_m2: f64, exposure_s: f64) -> f64 {
    (heat_flux_w_m2 / 1000.0).max(0.0).powf(4.0 / 3.0) * exposure_s
}

/// Time (s) to accumulate `dose` at constant flux; `None` below the
/// harmless floor.
pub fn time_to_dose(heat_flux_w_m2: f64, dose: f64) -> Option<f64> {
    if heat_flux_w_m2 <= HARMLESS_FLUX {
        return None;
    }
    Some(dose / (heat_flux_w_m2 / 1000.0).powf(4.0 / 3.0))
}

/// Eisenberg lethality probability for an exposure of `t` seconds.
///
/// `Pr = −14.9 + 2.56·ln(t·q^(4/3)/10⁴)` with `q` in W/m².
pub fn lethality_probability(heat_flux_w_m2: f64, exposure_s: f64) -> f64 {
    if heat_flux_w_m2 <= HARMLESS_FLUX || exposure_s <= 0.0 {
        return 0.0;
    }
    let dose = exposure_s * heat_flux_w_m2.powf(4.0 / 3.0) / 1e4;
    probit_to_probability(-14.9 + 2.56 * dose.ln())
}

/// Damage band for a sustained incident flux.
pub fn damage_category(heat_flux_w_m2: f64) -> ThermalDamageCategory {
    let kw = heat_flux_w_m2 / 1000.0;
    if kw < 1.7 {
        ThermalDamageCategory::Negligible
    } else if kw < 5.0 {
        ThermalDamageCategory::PainThreshold
    } else if kw < 12.5 {
        ThermalDamageCategory::SecondDegreeRisk
    } else if kw < 37.5 {
        ThermalDamageCategory::PotentiallyLethal
    } else {
        ThermalDamageCategory::Destructive
    }
}
