//! Compressible orifice flow
//!
//! Shared by the tank gas branch and the pipeline initial rate. The choked
//! threshold is the critical pressure ratio `(2/(γ+1))^(γ/(γ−1))`; above it
//! the subcritical isentropic branch applies.
//!
//! # References
//! - Perry's Chemical Engineers' Handbook, 8th ed., §6 (flow of fluids).
//! - CCPS (1999). "Guidelines for Consequence Analysis of Chemical
//!   Releases", orifice discharge relations.

use crate::core_types::units::GAS_CONSTANT;

/// Discharge coefficient for a sharp-edged orifice.
pub const DISCHARGE_COEFFICIENT: f64 = 0.61;

/// Critical pressure ratio `p_down/p_up` below which the flow chokes.
pub fn critical_pressure_ratio(gamma: f64) -> f64 {
    (2.0 / (gamma + 1.0)).powf(gamma / (gamma - 1.0))
}

/// Choked (sonic) orifice mass flow (kg/s).
///
/// `ṁ = C_d · A · p · √(γ·MW/(R·T)) · (2/(γ+1))^((γ+1)/(2(γ−1)))`
pub fn choked_mass_flow(
    area_m2: f64,
    pressure_pa: f64,
    temperature_k: f64,
    molecular_weight: f64,
    gamma: f64,
) -> f64 {
    let mw_kg = molecular_weight / 1000.0;
    let sonic_term = (2.0 / (gamma + 1.0)).powf((gamma + 1.0) / (2.0 * (gamma - 1.0)));
    DISCHARGE_COEFFICIENT
        * area_m2
        * pressure_pa
        * (gamma * mw_kg / (GAS_CONSTANT * temperature_k)).sqrt()
        * sonic_term
}

/// Subcritical isentropic orifice mass flow (kg/s) for
/// `p_down/p_up` above the critical ratio.
pub fn subcritical_mass_flow(
    area_m2: f64,
    pressure_pa: f64,
    downstream_pa: f64,
    temperature_k: f64,
    molecular_weight: f64,
    gamma: f64,
) -> f64 {
    let mw_kg = molecular_weight / 1000.0;
    let r = (downstream_pa / pressure_pa).clamp(0.0, 1.0);
    let expansion = r.powf(2.0 / gamma) - r.powf((gamma + 1.0) / gamma);
    if expansion <= 0.0 {
        return 0.0;
    }
    DISCHARGE_COEFFICIENT
        * area_m2
        * pressure_pa
        * (2.0 * mw_kg * gamma / (GAS_CONSTANT * temperature_k * (gamma - 1.0)) * expansion).sqrt()
}

/// Gas orifice flow picking the choked or subcritical branch.
pub fn gas_mass_flow(
    area_m2: f64,
    pressure_pa: f64,
    ambient_pa: f64,
    temperature_k: f64,
    molecular_weight: f64,
    gamma: f64,
) -> f64 {
    if ambient_pa / pressure_pa <= critical_pressure_ratio(gamma) {
        choked_mass_flow(area_m2, pressure_pa, temperature_k, molecular_weight, gamma)
    } else {
        subcritical_mass_flow(area_m2, pressure_pa, ambient_pa, temperature_k, molecular_weight, gamma)
    }
}
