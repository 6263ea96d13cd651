//! Chemical property records
//!
//! A [`ChemicalProperties`] document carries everything the engine needs to
//! know about one substance: molecular weight, temperature-dependent
//! property tables with their validity envelopes, flammability data, and the
//! reactivity class the blast engine keys its efficiency on.
//!
//! The structs here are plain data; the envelope-checked evaluation lives in
//! the [`crate::chemistry`] module. A handful of reference chemicals with
//! literature coefficients are provided as named constructors; callers
//! normally supply their own records.

use serde::{Deserialize, Serialize};

/// A property expressed as a polynomial in temperature with a validity
/// envelope.
///
/// `value(T) = Σ cᵢ · Tⁱ` with `T` in kelvin; `valid_range` is the
/// `(min, max)` kelvin envelope the coefficients were fitted over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialProperty {
    /// Coefficients in ascending powers of T
    pub coefficients: Vec<f64>,
    /// Kelvin envelope the fit is valid over
    pub valid_range: (f64, f64),
    /// Unit of the evaluated value
    pub units: String,
}

impl PolynomialProperty {
    /// Constant-valued property valid over the given envelope.
    pub fn constant(value: f64, valid_range: (f64, f64), units: &str) -> Self {
        Self { coefficients: vec![value], valid_range, units: units.to_owned() }
    }

    /// Linear property `a0 + a1·T` over the given envelope.
    pub fn linear(a0: f64, a1: f64, valid_range: (f64, f64), units: &str) -> Self {
        Self { coefficients: vec![a0, a1], valid_range, units: units.to_owned() }
    }

    /// Horner evaluation without the envelope check.
    pub fn evaluate_unchecked(&self, temperature_k: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * temperature_k + c)
    }

    /// True when the temperature is inside the fit envelope.
    pub fn in_range(&self, temperature_k: f64) -> bool {
        (self.valid_range.0..=self.valid_range.1).contains(&temperature_k)
    }
}

/// Antoine vapor-pressure coefficients.
///
/// `log10(p[mmHg]) = A − B / (T[K] + C)` — the C offset here is already
/// shifted for kelvin input (published Celsius-referenced C minus 273.15).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AntoineCoefficients {
    /// Antoine A
    pub a: f64,
    /// Antoine B (K)
    pub b: f64,
    /// Antoine C, kelvin-shifted (K)
    pub c: f64,
    /// Kelvin envelope the fit is valid over
    pub valid_range: (f64, f64),
}

impl AntoineCoefficients {
    /// Saturation vapor pressure (Pa) without the envelope check.
    pub fn evaluate_unchecked(&self, temperature_k: f64) -> f64 {
        let log10_mmhg = self.a - self.b / (temperature_k + self.c);
        crate::core_types::units::mmhg_to_pascal(10f64.powf(log10_mmhg))
    }

    /// True when the temperature is inside the fit envelope.
    pub fn in_range(&self, temperature_k: f64) -> bool {
        (self.valid_range.0..=self.valid_range.1).contains(&temperature_k)
    }

    /// Boiling temperature (K) at the given ambient pressure, by inverting
    /// the Antoine form.
    pub fn boiling_point(&self, pressure_pa: f64) -> f64 {
        let log10_mmhg = (pressure_pa / 133.322).log10();
        self.b / (self.a - log10_mmhg) - self.c
    }
}

/// Flammability limits in volume percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlammabilityLimits {
    /// Lower flammability limit (vol %)
    pub lfl_vol_pct: f64,
    /// Upper flammability limit (vol %)
    pub ufl_vol_pct: f64,
}

/// Full property record for one chemical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalProperties {
    /// Substance name, also the key into the solution-chemistry registry
    pub name: String,
    /// Molecular weight (g/mol), must be > 0
    pub molecular_weight: f64,
    /// Normal boiling point (K)
    pub boiling_point: f64,
    /// Antoine vapor-pressure fit
    pub vapor_pressure: AntoineCoefficients,
    /// Liquid density (kg/m³) vs T
    pub liquid_density: PolynomialProperty,
    /// Liquid heat capacity (J/(kg·K)) vs T
    pub liquid_heat_capacity: PolynomialProperty,
    /// Gas heat capacity at constant pressure (J/(kg·K)) vs T
    pub gas_heat_capacity: PolynomialProperty,
    /// Heat of vaporization (J/kg) vs T
    pub heat_of_vaporization: PolynomialProperty,
    /// Lower heat of combustion (J/kg); absent for non-combustibles
    pub heat_of_combustion: Option<f64>,
    /// Flammability limits; absent for non-flammables
    pub flammability: Option<FlammabilityLimits>,
    /// Reactivity class 1 (inert) .. 6 (highly reactive), drives blast efficiency
    pub reactivity: u8,
    /// Marked as a dense-gas candidate for the heavy-gas model
    pub heavy_gas: bool,
}

impl ChemicalProperties {
    /// Ratio of this chemical's vapor density to air at the given state.
    pub fn vapor_density_ratio(&self, temperature_k: f64, pressure_pa: f64) -> f64 {
        use crate::core_types::units::{air_density, gas_density};
        gas_density(self.molecular_weight, temperature_k, pressure_pa)
            / air_density(temperature_k, pressure_pa)
    }

    /// Benzene (C₆H₆)
    pub fn benzene() -> Self {
        Self {
            name: "benzene".to_owned(),
            molecular_weight: 78.11,
            boiling_point: 353.2,
            vapor_pressure: AntoineCoefficients {
                a: 6.90565,
                b: 1211.033,
                c: -52.36,
                valid_range: (278.0, 377.0),
            },
            liquid_density: PolynomialProperty::linear(1184.8, -1.0530, (278.0, 377.0), "kg/m3"),
            liquid_heat_capacity: PolynomialProperty::constant(1740.0, (278.0, 377.0), "J/(kg.K)"),
            gas_heat_capacity: PolynomialProperty::constant(1050.0, (250.0, 500.0), "J/(kg.K)"),
            heat_of_vaporization: PolynomialProperty::linear(6.496e5, -727.0, (278.0, 377.0), "J/kg"),
            heat_of_combustion: Some(4.06e7),
            flammability: Some(FlammabilityLimits { lfl_vol_pct: 1.2, ufl_vol_pct: 7.8 }),
            reactivity: 3,
            heavy_gas: true,
        }
    }

    /// Propane (C₃H₈)
    pub fn propane() -> Self {
        Self {
            name: "propane".to_owned(),
            molecular_weight: 44.10,
            boiling_point: 231.0,
            vapor_pressure: AntoineCoefficients {
                a: 6.80398,
                b: 803.810,
                c: -26.16,
                valid_range: (165.0, 360.0),
            },
            liquid_density: PolynomialProperty::linear(909.0, -1.42, (165.0, 360.0), "kg/m3"),
            liquid_heat_capacity: PolynomialProperty::constant(2500.0, (165.0, 360.0), "J/(kg.K)"),
            gas_heat_capacity: PolynomialProperty::constant(1670.0, (200.0, 500.0), "J/(kg.K)"),
            heat_of_vaporization: PolynomialProperty::linear(7.60e5, -1452.0, (165.0, 360.0), "J/kg"),
            heat_of_combustion: Some(4.635e7),
            flammability: Some(FlammabilityLimits { lfl_vol_pct: 2.1, ufl_vol_pct: 9.5 }),
            reactivity: 3,
            heavy_gas: true,
        }
    }

    /// Chlorine (Cl₂)
    pub fn chlorine() -> Self {
        Self {
            name: "chlorine".to_owned(),
            molecular_weight: 70.90,
            boiling_point: 239.1,
            vapor_pressure: AntoineCoefficients {
                a: 6.93790,
                b: 861.34,
                c: -26.82,
                valid_range: (172.0, 360.0),
            },
            liquid_density: PolynomialProperty::linear(2240.0, -2.83, (172.0, 360.0), "kg/m3"),
            liquid_heat_capacity: PolynomialProperty::constant(950.0, (172.0, 360.0), "J/(kg.K)"),
            gas_heat_capacity: PolynomialProperty::constant(480.0, (200.0, 500.0), "J/(kg.K)"),
            heat_of_vaporization: PolynomialProperty::linear(4.79e5, -800.0, (172.0, 360.0), "J/kg"),
            heat_of_combustion: None,
            flammability: None,
            reactivity: 1,
            heavy_gas: true,
        }
    }

    /// Anhydrous ammonia (NH₃)
    pub fn ammonia() -> Self {
        Self {
            name: "ammonia".to_owned(),
            molecular_weight: 17.03,
            boiling_point: 239.8,
            vapor_pressure: AntoineCoefficients {
                a: 7.36050,
                b: 926.132,
                c: -32.98,
                valid_range: (179.0, 370.0),
            },
            liquid_density: PolynomialProperty::linear(1008.0, -1.36, (179.0, 370.0), "kg/m3"),
            liquid_heat_capacity: PolynomialProperty::constant(4700.0, (179.0, 370.0), "J/(kg.K)"),
            gas_heat_capacity: PolynomialProperty::constant(2175.0, (200.0, 500.0), "J/(kg.K)"),
            heat_of_vaporization: PolynomialProperty::linear(2.30e6, -3870.0, (179.0, 370.0), "J/kg"),
            heat_of_combustion: Some(1.86e7),
            flammability: Some(FlammabilityLimits { lfl_vol_pct: 15.0, ufl_vol_pct: 28.0 }),
            reactivity: 2,
            heavy_gas: false,
        }
    }

    /// Hydrogen chloride (HCl)
    pub fn hydrogen_chloride() -> Self {
        Self {
            name: "hydrogen chloride".to_owned(),
            molecular_weight: 36.46,
            boiling_point: 188.1,
            vapor_pressure: AntoineCoefficients {
                a: 7.17000,
                b: 745.80,
                c: -14.27,
                valid_range: (160.0, 320.0),
            },
            liquid_density: PolynomialProperty::linear(1625.0, -2.30, (160.0, 320.0), "kg/m3"),
            liquid_heat_capacity: PolynomialProperty::constant(1800.0, (160.0, 320.0), "J/(kg.K)"),
            gas_heat_capacity: PolynomialProperty::constant(800.0, (200.0, 500.0), "J/(kg.K)"),
            heat_of_vaporization: PolynomialProperty::linear(7.44e5, -1600.0, (160.0, 320.0), "J/kg"),
            heat_of_combustion: None,
            flammability: None,
            reactivity: 1,
            heavy_gas: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_benzene_vapor_pressure_at_room_temperature() {
        // Benzene at 20 °C: ~10 kPa, the textbook value
        let p = ChemicalProperties::benzene().vapor_pressure.evaluate_unchecked(293.15);
        assert_relative_eq!(p, 10_000.0, max_relative = 0.05);
    }

    #[test]
    fn test_antoine_boiling_point_inversion() {
        use crate::core_types::units::STANDARD_PRESSURE;
        for chem in [
            ChemicalProperties::benzene(),
            ChemicalProperties::propane(),
            ChemicalProperties::chlorine(),
            ChemicalProperties::ammonia(),
        ] {
            let bp = chem.vapor_pressure.boiling_point(STANDARD_PRESSURE);
            assert!(
                (bp - chem.boiling_point).abs() < 3.0,
                "{}: Antoine inversion gives {bp:.1} K, record says {:.1} K",
                chem.name,
                chem.boiling_point
            );
        }
    }

    #[test]
    fn test_chlorine_is_dense_gas() {
        let ratio = ChemicalProperties::chlorine().vapor_density_ratio(293.15, 101_325.0);
        assert_relative_eq!(ratio, 2.45, max_relative = 0.01);
    }

    #[test]
    fn test_polynomial_horner_evaluation() {
        let p = PolynomialProperty {
            coefficients: vec![1.0, 2.0, 3.0],
            valid_range: (0.0, 10.0),
            units: "x".to_owned(),
        };
        // 1 + 2*2 + 3*4 = 17
        assert_relative_eq!(p.evaluate_unchecked(2.0), 17.0);
        assert!(p.in_range(10.0));
        assert!(!p.in_range(10.5));
    }

    #[test]
    fn test_liquid_density_declines_with_temperature() {
        let chem = ChemicalProperties::benzene();
        let cold = chem.liquid_density.evaluate_unchecked(283.15);
        let warm = chem.liquid_density.evaluate_unchecked(343.15);
        assert!(cold > warm);
        assert_relative_eq!(chem.liquid_density.evaluate_unchecked(293.15), 876.0, max_relative = 0.01);
    }
}
