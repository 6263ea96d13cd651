//! Evaporating-pool source strength
//!
//! Non-boiling pools evaporate by turbulent mass transfer from the
//! saturated surface film: `E = Cs · u* · j_c` with `Cs` the saturation
//! concentration and `j_c` a Schmidt-corrected dimensionless transfer
//! coefficient, enhanced by the Brighton volatility correction once the
//! vapor pressure becomes an appreciable fraction of ambient. The pool
//! temperature follows a surface energy balance (solar, longwave exchange,
//! transient ground conduction, sensible and latent heat); when the pool
//! reaches its pressure-corrected boiling point the release switches to the
//! heat-limited boiling branch `E = Q_net / ΔH_vap`.
//!
//! # References
//! - Brighton, P.W.M. (1985). "Evaporation from a plane liquid surface into
//!   a turbulent boundary layer." Journal of Fluid Mechanics, 159, 323-345.
//! - Kawamura, P.I., Mackay, D. (1987). "The evaporation of volatile
//!   liquids." Journal of Hazardous Materials, 15(3), 343-364.

use crate::atmosphere::AtmosphericState;
use crate::chemistry::{self, solutions};
use crate::core_types::chemical::ChemicalProperties;
use crate::core_types::output::ReleaseFrame;
use crate::core_types::scenario::GroundSurface;
use crate::core_types::units::{self, CP_AIR, STEFAN_BOLTZMANN};

use super::{SourceError, SolverConfig};

/// Dimensionless transfer coefficient before the Schmidt correction,
/// calibrated against mid-range ALOHA pool evaporation rates.
pub const TRANSFER_COEFFICIENT: f64 = 0.17;

/// Pool surface emissivity for longwave exchange.
const POOL_EMISSIVITY: f64 = 0.95;

/// Bulk sensible-heat transfer coefficient (dimensionless Stanton number).
const STANTON_NUMBER: f64 = 0.002;

/// Pool is considered drained below this depth (m).
const MIN_DEPTH: f64 = 1e-3;

/// Energy-balance sub-steps per release frame.
const SUB_STEPS: usize = 10;

/// Schmidt-corrected dimensionless mass-transfer coefficient `j_c`.
pub fn mass_transfer_coefficient(schmidt: f64) -> f64 {
    TRANSFER_COEFFICIENT * schmidt.powf(-2.0 / 3.0)
}

/// Brighton volatility correction `ln(1 − p_v/P) / (−p_v/P)`.
///
/// Applied only once `p_v/P > 0.1`; the correction exceeds one because the
/// induced Stefan flow steepens the surface gradient.
pub fn volatility_correction(pressure_ratio: f64) -> f64 {
    if pressure_ratio > 0.1 {
        let clamped = pressure_ratio.min(0.95);
        (1.0 - clamped).ln() / (-clamped)
    } else {
        1.0
    }
}

/// Non-boiling evaporative mass flux (kg/(m²·s)).
pub fn evaporative_flux(
    chem: &ChemicalProperties,
    pool_temperature: f64,
    ambient_pressure: f64,
    friction_velocity: f64,
    solution_fraction: Option<f64>,
) -> (f64, bool) {
    let (p_pure, clamped) = chemistry::vapor_pressure_clamped(chem, pool_temperature);
    let p_v = match solution_fraction {
        Some(fraction) => match solutions::solution_registry().get(chem.name.as_str()) {
            Some(system) => p_pure * system.activity(fraction),
            None => p_pure,
        },
        None => p_pure,
    };

    let cs = p_v * (chem.molecular_weight / 1000.0) / (units::GAS_CONSTANT * pool_temperature);
    let j_c = mass_transfer_coefficient(chemistry::schmidt_number(chem));
    let correction = volatility_correction(p_v / ambient_pressure);

    ((cs * friction_velocity * j_c * correction).max(0.0), clamped)
}

/// Net surface heat flux into the pool (W/m²), excluding the latent term.
fn heat_input(
    pool_temperature: f64,
    surface: GroundSurface,
    atmos: &AtmosphericState,
    elapsed: f64,
) -> f64 {
    // Solar: measured when available, estimated from cloud cover by day
    let solar = atmos
        .solar_radiation
        .unwrap_or(if atmos.daytime { 500.0 * (1.0 - 0.71 * atmos.cloud_cover) } else { 0.0 });

    // Longwave sky emission; cloudy skies radiate closer to blackbody
    let sky_emissivity = 0.75 + 0.22 * atmos.cloud_cover;
    let longwave_down = sky_emissivity * STEFAN_BOLTZMANN * atmos.temperature.powi(4);
    let longwave_up = POOL_EMISSIVITY * STEFAN_BOLTZMANN * pool_temperature.powi(4);

    // Transient conduction from a semi-infinite substrate at ambient
    let t = elapsed.max(1.0);
    let ground = surface.thermal_inertia() * (atmos.temperature - pool_temperature)
        / (std::f64::consts::PI * t).sqrt();

    // Bulk sensible exchange with the air stream
    let sensible = atmos.air_density
        * CP_AIR
        * STANTON_NUMBER
        * atmos.wind_speed_ref
        * (atmos.temperature - pool_temperature);

    solar + longwave_down - longwave_up + ground + sensible
}

/// Solve the pool release over the scenario duration.
#[allow(clippy::too_many_arguments)]
pub fn solve(
    area: f64,
    depth: f64,
    initial_temperature: f64,
    surface: GroundSurface,
    solution_fraction: Option<f64>,
    duration: f64,
    chem: &ChemicalProperties,
    atmos: &AtmosphericState,
    config: &SolverConfig,
    warnings: &mut Vec<String>,
) -> Result<Vec<ReleaseFrame>, SourceError> {
    if area <= 0.0 || depth <= 0.0 {
        return Err(SourceError::Infeasible {
            reason: format!("puddle geometry is empty: area {area} m², depth {depth} m"),
        });
    }
    if !config.extrapolate && !chem.vapor_pressure.in_range(initial_temperature) {
        return Err(SourceError::Property(chemistry::vapor_pressure(chem, initial_temperature)
            .expect_err("out-of-range query must error")));
    }

    let (rho_l, density_clamped) = chemistry::liquid_density_clamped(chem, initial_temperature);
    if density_clamped {
        warnings.push(format!(
            "puddle: liquid density evaluated outside envelope at {initial_temperature:.1} K, clamped"
        ));
    }

    let boiling_point = chem.vapor_pressure.boiling_point(atmos.pressure);
    let dt = config.frame_step(duration);
    let n_frames = config.frame_count(duration);

    let mut mass = rho_l * area * depth;
    let mut temperature = initial_temperature;
    let mut current_area = area;
    let mut boiling_depth = None::<f64>;
    let mut envelope_warned = false;
    let mut frames = Vec::with_capacity(n_frames);

    for index in 0..n_frames {
        let elapsed = index as f64 * dt;
        if mass <= 0.0 {
            frames.push(frame(index, elapsed, 0.0, temperature, atmos, chem));
            continue;
        }

        let boiling = temperature >= boiling_point;
        if boiling && boiling_depth.is_none() {
            // Depth freezes at boil onset; further loss shrinks the radius
            boiling_depth = Some((mass / (rho_l * current_area)).max(MIN_DEPTH));
        }

        let mut released = 0.0;
        let sub_dt = dt / SUB_STEPS as f64;
        for sub in 0..SUB_STEPS {
            if mass <= 0.0 {
                break;
            }
            let t_now = elapsed + sub as f64 * sub_dt;
            let (cp_l, _) = chemistry::liquid_heat_capacity_clamped(chem, temperature);
            let (dh_vap, _) = chemistry::heat_of_vaporization_clamped(chem, temperature);
            let q_in = heat_input(temperature, surface, atmos, t_now);

            let flux = if temperature >= boiling_point {
                temperature = boiling_point;
                (q_in / dh_vap).max(0.0)
            } else {
                let (flux, clamped) = evaporative_flux(
                    chem,
                    temperature,
                    atmos.pressure,
                    atmos.friction_velocity,
                    solution_fraction,
                );
                if clamped && !envelope_warned {
                    warnings.push(format!(
                        "puddle: vapor pressure clamped to envelope at {temperature:.1} K"
                    ));
                    envelope_warned = true;
                }
                // Latent cooling closes the energy balance
                let depth_now = mass / (rho_l * current_area);
                let heat_capacity_per_area = rho_l * depth_now * cp_l;
                let net = q_in - flux * dh_vap;
                temperature += net / heat_capacity_per_area * sub_dt;
                temperature = temperature.min(boiling_point);
                // Property tables bottom out at the fit envelope (for most
                // liquids that is near the freezing point)
                if temperature < chem.vapor_pressure.valid_range.0 {
                    temperature = chem.vapor_pressure.valid_range.0;
                }
                flux
            };

            let dm = (flux * current_area * sub_dt).min(mass);
            mass -= dm;
            released += dm;

            if let Some(frozen_depth) = boiling_depth {
                // Monotone radius decline once boiling has started
                current_area = (mass / (rho_l * frozen_depth)).min(current_area).max(0.0);
            } else if mass / (rho_l * current_area) < MIN_DEPTH {
                mass = 0.0;
            }
        }

        frames.push(frame(index, elapsed, released / dt, temperature, atmos, chem));
    }

    Ok(frames)
}

fn frame(
    index: usize,
    elapsed: f64,
    mass_flow: f64,
    temperature: f64,
    atmos: &AtmosphericState,
    chem: &ChemicalProperties,
) -> ReleaseFrame {
    ReleaseFrame {
        index: index as u32,
        elapsed,
        mass_flow,
        temperature,
        pressure: atmos.pressure,
        density: units::gas_density(chem.molecular_weight, temperature, atmos.pressure),
        vapor_fraction: None,
    }
}
