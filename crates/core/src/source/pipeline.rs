//! Ruptured-pipeline source strength (Wilson model)
//!
//! After a break the release starts at the choked orifice rate for the line
//! conditions and decays as the double exponential
//!
//! ```text
//! ṁ(t) = ṁ₀ · ((1 + α)·e^(−t/β) − α·e^(−t/(α·β)))
//! ```
//!
//! with `β = L / a` the acoustic residence time of the line and
//! `α = 1 / (1 + 10·√A_hole / D)` the hole-to-pipe coupling factor. The
//! released mass is additionally capped by the line inventory.
//!
//! # References
//! - Wilson, D.J. (1981). "Release and dispersion of gas from pipelines."
//!   University of Alberta, Department of Mechanical Engineering report.

use crate::atmosphere::AtmosphericState;
use crate::chemistry;
use crate::core_types::chemical::ChemicalProperties;
use crate::core_types::output::ReleaseFrame;
use crate::core_types::units::{self, GAS_CONSTANT};

use super::orifice;
use super::{SolverConfig, SourceError};

/// Hole-to-pipe coupling factor `α = 1 / (1 + 10·√A_hole / D)`.
pub fn coupling_factor(hole_area: f64, diameter: f64) -> f64 {
    1.0 / (1.0 + 10.0 * hole_area.sqrt() / diameter)
}

/// Acoustic decay constant `β = L / a` (s).
pub fn decay_constant(length: f64, chem: &ChemicalProperties, temperature_k: f64) -> f64 {
    let (cp, _) = chemistry::gas_heat_capacity_clamped(chem, temperature_k);
    let r_specific = GAS_CONSTANT / (chem.molecular_weight / 1000.0);
    let gamma = (cp / (cp - r_specific)).clamp(1.05, 1.67);
    let sound_speed = (gamma * r_specific * temperature_k).sqrt();
    length / sound_speed
}

/// Wilson double-exponential rate at time `t`.
pub fn wilson_rate(initial_rate: f64, t: f64, alpha: f64, beta: f64) -> f64 {
    initial_rate * ((1.0 + alpha) * (-t / beta).exp() - alpha * (-t / (alpha * beta)).exp())
}

/// Solve the pipeline release over the scenario duration.
#[allow(clippy::too_many_arguments)]
pub fn solve(
    length: f64,
    diameter: f64,
    pressure: f64,
    temperature: f64,
    hole_area: f64,
    duration: f64,
    chem: &ChemicalProperties,
    atmos: &AtmosphericState,
    config: &SolverConfig,
    warnings: &mut Vec<String>,
) -> Result<Vec<ReleaseFrame>, SourceError> {
    if length <= 0.0 || diameter <= 0.0 || hole_area <= 0.0 {
        return Err(SourceError::Infeasible {
            reason: format!(
                "pipeline geometry is empty: length {length} m, diameter {diameter} m, hole {hole_area} m²"
            ),
        });
    }
    if pressure <= atmos.pressure {
        return Err(SourceError::Infeasible {
            reason: format!(
                "pipeline discharge needs line pressure above ambient: {pressure:.0} Pa <= {:.0} Pa",
                atmos.pressure
            ),
        });
    }

    let (cp, cp_clamped) = chemistry::gas_heat_capacity_clamped(chem, temperature);
    if cp_clamped {
        warnings.push(format!(
            "pipeline: gas heat capacity evaluated outside envelope at {temperature:.1} K, clamped"
        ));
    }
    let r_specific = GAS_CONSTANT / (chem.molecular_weight / 1000.0);
    let gamma = (cp / (cp - r_specific)).clamp(1.05, 1.67);

    let initial_rate =
        orifice::gas_mass_flow(hole_area, pressure, atmos.pressure, temperature, chem.molecular_weight, gamma);
    let alpha = coupling_factor(hole_area, diameter);
    let beta = decay_constant(length, chem, temperature);

    let pipe_area = std::f64::consts::PI * diameter.powi(2) / 4.0;
    let line_density = units::gas_density(chem.molecular_weight, temperature, pressure);
    let inventory = line_density * pipe_area * length;

    let dt = config.frame_step(duration);
    let n_frames = config.frame_count(duration);

    let mut cumulative = 0.0;
    let mut frames = Vec::with_capacity(n_frames);
    for index in 0..n_frames {
        let elapsed = index as f64 * dt;
        // Midpoint rate over the frame, capped by what is left in the line
        let rate = wilson_rate(initial_rate, elapsed + 0.5 * dt, alpha, beta).max(0.0);
        let dm = (rate * dt).min(inventory - cumulative).max(0.0);
        cumulative += dm;

        frames.push(ReleaseFrame {
            index: index as u32,
            elapsed,
            mass_flow: dm / dt,
            temperature,
            pressure,
            density: line_density,
            vapor_fraction: None,
        });
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::scenario::TerrainRoughness;
    use crate::core_types::weather::WeatherSnapshot;
    use approx::assert_relative_eq;

    fn atmosphere() -> AtmosphericState {
        let weather = WeatherSnapshot::neutral(5.0, 270.0, 293.15);
        let mut warnings = Vec::new();
        AtmosphericState::derive(&weather, TerrainRoughness::OpenCountry, 10.0, &mut warnings)
    }

    #[test]
    fn test_wilson_rate_starts_at_initial() {
        // (1+a) - a = 1 at t = 0 regardless of alpha
        assert_relative_eq!(wilson_rate(10.0, 0.0, 0.3, 5.0), 10.0, max_relative = 1e-12);
    }

    #[test]
    fn test_wilson_rate_decays_monotonically() {
        let alpha = 0.2;
        let beta = 10.0;
        let mut last = wilson_rate(5.0, 0.0, alpha, beta);
        for i in 1..100 {
            let now = wilson_rate(5.0, f64::from(i), alpha, beta);
            assert!(now <= last + 1e-12, "rate rose at t = {i}");
            last = now;
        }
        assert!(last < 0.05, "rate should be nearly spent after 10 decay constants");
    }

    #[test]
    fn test_coupling_factor_small_hole_limits() {
        // Tiny puncture: alpha near 1 (line feeds the hole easily)
        assert!(coupling_factor(1e-6, 0.5) > 0.95);
        // Full-bore rupture of a half-metre line: alpha well below 1
        assert!(coupling_factor(0.196, 0.5) < 0.2);
    }

    #[test]
    fn test_release_capped_by_line_inventory() {
        let atmos = atmosphere();
        let propane = ChemicalProperties::propane();
        let mut warnings = Vec::new();
        let frames = solve(
            2000.0, 0.3, 8e5, 293.15, 7e-2, 3600.0, &propane, &atmos,
            &SolverConfig::default(), &mut warnings,
        )
        .unwrap();

        let dt = 3600.0 / frames.len() as f64;
        let released: f64 = frames.iter().map(|f| f.mass_flow * dt).sum();
        let pipe_area = std::f64::consts::PI * 0.3f64.powi(2) / 4.0;
        let inventory =
            units::gas_density(44.10, 293.15, 8e5) * pipe_area * 2000.0;
        assert!(released <= inventory * 1.001, "released {released:.0} kg > line inventory {inventory:.0} kg");
        // The double exponential vents the near-hole inventory within a few
        // decay constants; a large fraction of the line stays behind
        assert!(released > 100.0, "a full-bore break should vent hundreds of kilograms");
    }

    #[test]
    fn test_unpressurised_line_is_infeasible() {
        let atmos = atmosphere();
        let propane = ChemicalProperties::propane();
        let mut warnings = Vec::new();
        let err = solve(
            1000.0, 0.3, 100_000.0, 293.15, 1e-2, 600.0, &propane, &atmos,
            &SolverConfig::default(), &mut warnings,
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Infeasible { .. }));
    }
}
