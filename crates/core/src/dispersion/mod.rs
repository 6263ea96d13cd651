//! Dispersion solver: model selection, Gaussian plume, dense-gas slab
//!
//! The passive Gaussian model covers neutrally buoyant releases; chemicals
//! marked as dense-gas candidates switch to the slab model when the source
//! Richardson number `Ri = g′·H_c/u*²` exceeds critical. A caller override
//! forces either model.

pub mod briggs;
pub mod gaussian;
pub mod grid;
pub mod heavy_gas;
pub mod sigma;

use tracing::info;

use crate::atmosphere::AtmosphericState;
use crate::core_types::chemical::ChemicalProperties;
use crate::core_types::output::ModelKind;
use crate::core_types::scenario::Scenario;
use crate::core_types::units::{self, GRAVITY};

pub use grid::{build_grid, DispersionError, GridConfig};
pub use heavy_gas::RI_CRITICAL;

/// Caller preference for the dispersion model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelChoice {
    /// Pick from the Richardson criterion
    #[default]
    Auto,
    /// Force the passive Gaussian model
    Gaussian,
    /// Force the dense-gas slab model
    HeavyGas,
}

/// Source Richardson number for model selection:
/// `Ri = g′·H_c/u*²` with `g′ = g·(ρ_c − ρ_a)/ρ_c`.
pub fn source_richardson(
    chem: &ChemicalProperties,
    atmos: &AtmosphericState,
    scenario: &Scenario,
) -> f64 {
    let rho_c = units::gas_density(chem.molecular_weight, atmos.temperature, atmos.pressure);
    let rho_a = atmos.air_density;
    if rho_c <= rho_a {
        return 0.0;
    }
    let g_prime = GRAVITY * (rho_c - rho_a) / rho_c;
    let h_c = scenario.source.characteristic_height();
    let u_star = atmos.friction_velocity.max(1e-3);
    g_prime * h_c / (u_star * u_star)
}

/// Pick the dispersion model for a run.
pub fn select_model(
    chem: &ChemicalProperties,
    atmos: &AtmosphericState,
    scenario: &Scenario,
    choice: ModelChoice,
) -> (ModelKind, f64) {
    let richardson = source_richardson(chem, atmos, scenario);
    let selected = match choice {
        ModelChoice::Gaussian => ModelKind::Gaussian,
        ModelChoice::HeavyGas => ModelKind::HeavyGas,
        ModelChoice::Auto => {
            if chem.heavy_gas && richardson > RI_CRITICAL {
                ModelKind::HeavyGas
            } else {
                ModelKind::Gaussian
            }
        }
    };
    info!(?selected, richardson, "dispersion model selected");
    (selected, richardson)
}
