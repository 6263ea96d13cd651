//! TNT equivalence with Baker-Strehlow-Tang efficiency
//!
//! The flammable cloud's combustion energy is reduced to an equivalent TNT
//! mass through a yield efficiency that grows with fuel reactivity, obstacle
//! congestion, and confinement — the three knobs of the Baker-Strehlow-Tang
//! flame-acceleration picture — capped at 50%.
//!
//! # References
//! - Baker, Q.A., Tang, M.J., Scheier, E.A., Silva, G.J. (1996). "Vapor
//!   cloud explosion analysis." Process Safety Progress, 15(2), 106-109.
//! - CCPS (1994). "Guidelines for Evaluating the Characteristics of Vapor
//!   Cloud Explosions, Flash Fires, and BLEVEs."

use crate::atmosphere::AtmosphericState;
use crate::core_types::chemical::ChemicalProperties;
use crate::core_types::output::DispersionGrid;
use crate::core_types::units::{self, TNT_HEAT_OF_COMBUSTION};

/// Hard cap on the explosion yield efficiency.
pub const EFFICIENCY_CAP: f64 = 0.5;

/// Base yield efficiency by reactivity class 1..6.
fn base_efficiency(reactivity: u8) -> f64 {
    match reactivity.clamp(1, 6) {
        1 => 0.02,
        2 => 0.05,
        3 => 0.09,
        4 => 0.13,
        5 => 0.17,
        _ => 0.22,
    }
}

/// BST yield efficiency:
/// `η = η_base(reactivity) · (1 + 2·congestion) · (1 + 1.5·confinement)`,
/// capped at [`EFFICIENCY_CAP`].
pub fn efficiency(reactivity: u8, congestion: f64, confinement: f64) -> f64 {
    let eta = base_efficiency(reactivity)
        * (1.0 + 2.0 * congestion.clamp(0.0, 1.0))
        * (1.0 + 1.5 * confinement.clamp(0.0, 1.0));
    eta.min(EFFICIENCY_CAP)
}

/// Equivalent TNT mass (kg): `M_TNT = M_f·ΔH_c·η / 4.6·10⁶`.
pub fn tnt_equivalent_mass(flammable_mass_kg: f64, heat_of_combustion: f64, eta: f64) -> f64 {
    flammable_mass_kg * heat_of_combustion * eta / TNT_HEAT_OF_COMBUSTION
}

/// Flammable cloud mass (kg) integrated from the dispersion grid.
///
/// Counts ground cells with concentration between the flammability limits,
/// extending each through its Gaussian vertical column
/// (`∫C dz = C₀·σ_z·√(π/2)`, capped at the mixing height). The largest
/// interval total is taken as the cloud mass at ignition.
pub fn flammable_mass_from_grid(
    grid: &DispersionGrid,
    chem: &ChemicalProperties,
    atmos: &AtmosphericState,
) -> f64 {
    let Some(limits) = chem.flammability else {
        return 0.0;
    };
    // Volume percent -> ppm -> mg/m³ at ambient
    let lfl_mg = units::ppm_to_mg_per_m3(
        limits.lfl_vol_pct * 1e4,
        chem.molecular_weight,
        atmos.temperature,
        atmos.pressure,
    );
    let ufl_mg = units::ppm_to_mg_per_m3(
        limits.ufl_vol_pct * 1e4,
        chem.molecular_weight,
        atmos.temperature,
        atmos.pressure,
    );

    let cell_area = grid.spacing_x() * grid.spacing_y();
    let n_x = grid.xs.len();
    let half_pi_sqrt = (std::f64::consts::PI / 2.0).sqrt();

    let mut best = 0.0f64;
    for t in 0..grid.times.len() {
        let mut total = 0.0;
        for ix in 0..n_x {
            let column_depth =
                (grid.sigma_z[t * n_x + ix] * half_pi_sqrt).min(atmos.mixing_height);
            for iy in 0..grid.ys.len() {
                let c = grid.concentration(t, ix, iy);
                if c >= lfl_mg && c <= ufl_mg {
                    // mg/m³ -> kg/m³ over the cell column
                    total += c * 1e-6 * cell_area * column_depth;
                }
            }
        }
        best = best.max(total);
    }
    best
}
