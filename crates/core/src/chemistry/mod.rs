//! Envelope-checked chemical property evaluation
//!
//! Property tables on a [`ChemicalProperties`] record are fits over a stated
//! temperature envelope. Queries outside the envelope return
//! [`PropertyError::OutOfEnvelope`] so a bad input cannot silently
//! extrapolate a polynomial into nonsense; the engine's recovery policy
//! (clamp and warn when extrapolation was requested) sits on top of the
//! `*_clamped` variants.

pub mod solutions;

use thiserror::Error;

use crate::core_types::chemical::{ChemicalProperties, PolynomialProperty};
use crate::core_types::units;

/// A property query failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    /// The requested temperature is outside the fit envelope.
    #[error("{property} requested at {value_k:.1} K, outside envelope [{min_k:.1}, {max_k:.1}] K")]
    OutOfEnvelope {
        /// Which property table rejected the query
        property: String,
        /// Requested temperature (K)
        value_k: f64,
        /// Envelope lower bound (K)
        min_k: f64,
        /// Envelope upper bound (K)
        max_k: f64,
    },
}

fn eval_table(
    table: &PolynomialProperty,
    property: &str,
    temperature_k: f64,
) -> Result<f64, PropertyError> {
    if !table.in_range(temperature_k) {
        return Err(PropertyError::OutOfEnvelope {
            property: property.to_owned(),
            value_k: temperature_k,
            min_k: table.valid_range.0,
            max_k: table.valid_range.1,
        });
    }
    Ok(table.evaluate_unchecked(temperature_k))
}

fn eval_table_clamped(table: &PolynomialProperty, temperature_k: f64) -> (f64, bool) {
    let clamped_t = temperature_k.clamp(table.valid_range.0, table.valid_range.1);
    (table.evaluate_unchecked(clamped_t), clamped_t != temperature_k)
}

/// Saturation vapor pressure (Pa) at `temperature_k`.
pub fn vapor_pressure(chem: &ChemicalProperties, temperature_k: f64) -> Result<f64, PropertyError> {
    if !chem.vapor_pressure.in_range(temperature_k) {
        return Err(PropertyError::OutOfEnvelope {
            property: format!("{} vapor pressure", chem.name),
            value_k: temperature_k,
            min_k: chem.vapor_pressure.valid_range.0,
            max_k: chem.vapor_pressure.valid_range.1,
        });
    }
    Ok(chem.vapor_pressure.evaluate_unchecked(temperature_k))
}

/// Saturation vapor pressure (Pa), clamping into the envelope.
///
/// The second element is true when clamping happened; the caller is
/// responsible for emitting the recovery warning.
pub fn vapor_pressure_clamped(chem: &ChemicalProperties, temperature_k: f64) -> (f64, bool) {
    let (min_k, max_k) = chem.vapor_pressure.valid_range;
    let clamped_t = temperature_k.clamp(min_k, max_k);
    (chem.vapor_pressure.evaluate_unchecked(clamped_t), clamped_t != temperature_k)
}

/// Liquid density (kg/m³) at `temperature_k`.
pub fn liquid_density(chem: &ChemicalProperties, temperature_k: f64) -> Result<f64, PropertyError> {
    eval_table(&chem.liquid_density, &format!("{} liquid density", chem.name), temperature_k)
}

/// Liquid density (kg/m³), clamping into the envelope.
pub fn liquid_density_clamped(chem: &ChemicalProperties, temperature_k: f64) -> (f64, bool) {
    eval_table_clamped(&chem.liquid_density, temperature_k)
}

/// Liquid heat capacity (J/(kg·K)) at `temperature_k`.
pub fn liquid_heat_capacity(
    chem: &ChemicalProperties,
    temperature_k: f64,
) -> Result<f64, PropertyError> {
    eval_table(
        &chem.liquid_heat_capacity,
        &format!("{} liquid heat capacity", chem.name),
        temperature_k,
    )
}

/// Liquid heat capacity (J/(kg·K)), clamping into the envelope.
pub fn liquid_heat_capacity_clamped(chem: &ChemicalProperties, temperature_k: f64) -> (f64, bool) {
    eval_table_clamped(&chem.liquid_heat_capacity, temperature_k)
}

/// Gas heat capacity at constant pressure (J/(kg·K)) at `temperature_k`.
pub fn gas_heat_capacity(
    chem: &ChemicalProperties,
    temperature_k: f64,
) -> Result<f64, PropertyError> {
    eval_table(&chem.gas_heat_capacity, &format!("{} gas heat capacity", chem.name), temperature_k)
}

/// Gas heat capacity (J/(kg·K)), clamping into the envelope.
pub fn gas_heat_capacity_clamped(chem: &ChemicalProperties, temperature_k: f64) -> (f64, bool) {
    eval_table_clamped(&chem.gas_heat_capacity, temperature_k)
}

/// Heat of vaporization (J/kg) at `temperature_k`.
pub fn heat_of_vaporization(
    chem: &ChemicalProperties,
    temperature_k: f64,
) -> Result<f64, PropertyError> {
    eval_table(
        &chem.heat_of_vaporization,
        &format!("{} heat of vaporization", chem.name),
        temperature_k,
    )
}

/// Heat of vaporization (J/kg), clamping into the envelope.
pub fn heat_of_vaporization_clamped(chem: &ChemicalProperties, temperature_k: f64) -> (f64, bool) {
    eval_table_clamped(&chem.heat_of_vaporization, temperature_k)
}

/// Ideal-gas vapor density (kg/m³) at the given state.
pub fn vapor_density(chem: &ChemicalProperties, temperature_k: f64, pressure_pa: f64) -> f64 {
    units::gas_density(chem.molecular_weight, temperature_k, pressure_pa)
}

/// Saturation concentration at the pool surface (kg/m³):
/// `Cs = p_v · MW / (R · T)`.
pub fn saturation_concentration(
    chem: &ChemicalProperties,
    temperature_k: f64,
) -> Result<f64, PropertyError> {
    let p_v = vapor_pressure(chem, temperature_k)?;
    Ok(p_v * (chem.molecular_weight / 1000.0) / (units::GAS_CONSTANT * temperature_k))
}

/// Molecular diffusivity of the vapor in air (m²/s), estimated from the
/// water-vapor reference by Graham's-law scaling: `D = D_H₂O · √(18 / MW)`.
pub fn molecular_diffusivity(chem: &ChemicalProperties) -> f64 {
    2.4e-5 * (18.0 / chem.molecular_weight).sqrt()
}

/// Schmidt number of the vapor in air.
pub fn schmidt_number(chem: &ChemicalProperties) -> f64 {
    const AIR_KINEMATIC_VISCOSITY: f64 = 1.5e-5;
    AIR_KINEMATIC_VISCOSITY / molecular_diffusivity(chem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vapor_pressure_inside_envelope() {
        let benzene = ChemicalProperties::benzene();
        let p = vapor_pressure(&benzene, 293.15).unwrap();
        assert_relative_eq!(p, 10_000.0, max_relative = 0.05);
    }

    #[test]
    fn test_vapor_pressure_outside_envelope_errors() {
        let benzene = ChemicalProperties::benzene();
        let err = vapor_pressure(&benzene, 500.0).unwrap_err();
        match err {
            PropertyError::OutOfEnvelope { value_k, max_k, .. } => {
                assert_eq!(value_k, 500.0);
                assert_eq!(max_k, 377.0);
            }
        }
    }

    #[test]
    fn test_clamped_query_flags_extrapolation() {
        let benzene = ChemicalProperties::benzene();
        let (p, clamped) = vapor_pressure_clamped(&benzene, 500.0);
        assert!(clamped);
        // Clamped to the envelope top, not extrapolated beyond it
        assert_relative_eq!(p, vapor_pressure(&benzene, 377.0).unwrap());

        let (_, clamped) = vapor_pressure_clamped(&benzene, 300.0);
        assert!(!clamped);
    }

    #[test]
    fn test_saturation_concentration_benzene() {
        // Cs = 10 kPa * 0.07811 kg/mol / (8.314 * 293.15) ~ 0.32 kg/m3
        let benzene = ChemicalProperties::benzene();
        let cs = saturation_concentration(&benzene, 293.15).unwrap();
        assert_relative_eq!(cs, 0.32, max_relative = 0.06);
    }

    #[test]
    fn test_schmidt_number_heavier_vapor_diffuses_slower() {
        let benzene = ChemicalProperties::benzene();
        let ammonia = ChemicalProperties::ammonia();
        assert!(schmidt_number(&benzene) > schmidt_number(&ammonia));
        // Benzene vapor in air: Sc ~ 1.3
        assert_relative_eq!(schmidt_number(&benzene), 1.30, max_relative = 0.05);
    }
}
