//! Aqueous-solution vapor suppression
//!
//! A handful of industrially important chemicals are shipped and spilled as
//! aqueous solutions (hydrochloric acid, aqua ammonia, nitric and
//! hydrofluoric acid, oleum). Over a solution the effective partial pressure
//! of the solute is the pure-component vapor pressure scaled by an activity
//! coefficient that falls off as the solution dilutes. The correlations here
//! are simple linear-in-mass-fraction forms anchored so that activity is 1
//! at the pure end and 0 at infinite dilution.

use rustc_hash::FxHashMap;

use crate::core_types::chemical::ChemicalProperties;

use super::PropertyError;

/// The solution systems with tabulated activity behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolutionSystem {
    /// Hydrochloric acid (HCl in water)
    HydrochloricAcid,
    /// Aqua ammonia (NH₃ in water)
    AquaAmmonia,
    /// Nitric acid (HNO₃ in water)
    NitricAcid,
    /// Hydrofluoric acid (HF in water)
    HydrofluoricAcid,
    /// Oleum (SO₃ in sulfuric acid)
    Oleum,
}

impl SolutionSystem {
    /// Mass fraction below which the solute effectively stops evaporating.
    ///
    /// Strong acids hold their solute tightly once dilute; ammonia keeps an
    /// appreciable vapor pressure to much lower strengths.
    fn retention_floor(self) -> f64 {
        match self {
            SolutionSystem::HydrochloricAcid => 0.20,
            SolutionSystem::AquaAmmonia => 0.05,
            SolutionSystem::NitricAcid => 0.60,
            SolutionSystem::HydrofluoricAcid => 0.30,
            SolutionSystem::Oleum => 0.10,
        }
    }

    /// Activity coefficient for the solute at the given solute mass fraction.
    ///
    /// Linear ramp from 0 at the retention floor to 1 for the pure
    /// component, clamped to [0, 1].
    pub fn activity(self, mass_fraction: f64) -> f64 {
        let floor = self.retention_floor();
        ((mass_fraction - floor) / (1.0 - floor)).clamp(0.0, 1.0)
    }
}

/// Registry mapping chemical names to their solution system.
pub fn solution_registry() -> FxHashMap<&'static str, SolutionSystem> {
    let mut map = FxHashMap::default();
    map.insert("hydrogen chloride", SolutionSystem::HydrochloricAcid);
    map.insert("hydrochloric acid", SolutionSystem::HydrochloricAcid);
    map.insert("ammonia", SolutionSystem::AquaAmmonia);
    map.insert("nitric acid", SolutionSystem::NitricAcid);
    map.insert("hydrogen fluoride", SolutionSystem::HydrofluoricAcid);
    map.insert("hydrofluoric acid", SolutionSystem::HydrofluoricAcid);
    map.insert("sulfur trioxide", SolutionSystem::Oleum);
    map.insert("oleum", SolutionSystem::Oleum);
    map
}

/// Effective solute partial pressure (Pa) over a solution pool.
///
/// Falls back to the pure-component vapor pressure when the chemical has no
/// solution system or no mass fraction was given.
pub fn effective_vapor_pressure(
    chem: &ChemicalProperties,
    temperature_k: f64,
    mass_fraction: Option<f64>,
) -> Result<f64, PropertyError> {
    let pure = super::vapor_pressure(chem, temperature_k)?;
    let Some(fraction) = mass_fraction else {
        return Ok(pure);
    };
    match solution_registry().get(chem.name.as_str()) {
        Some(system) => Ok(pure * system.activity(fraction)),
        None => Ok(pure),
    }
}
