//! Source-strength solvers
//!
//! Turns a [`SourceGeometry`] into a finite, strictly ordered sequence of
//! [`ReleaseFrame`]s over the scenario duration, then averages the frames
//! into the five equal-duration dispersion intervals the dispersion layer
//! consumes. Each geometry variant has its own solver module; the dispatch
//! here is exhaustive so a new variant cannot be forgotten.

pub mod orifice;
pub mod pipeline;
pub mod puddle;
pub mod tank;

use thiserror::Error;
use tracing::debug;

use crate::atmosphere::AtmosphericState;
use crate::chemistry::PropertyError;
use crate::core_types::chemical::ChemicalProperties;
use crate::core_types::output::ReleaseFrame;
use crate::core_types::scenario::{Scenario, SourceGeometry};
use crate::core_types::units;

/// Number of equal-duration intervals the dispersion layer works in.
pub const DISPERSION_INTERVALS: usize = 5;

/// A source solver failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// The geometry produces no physical release.
    #[error("infeasible source: {reason}")]
    Infeasible {
        /// What made the geometry unworkable
        reason: String,
    },
    /// A property table rejected a query that could not be recovered.
    #[error(transparent)]
    Property(#[from] PropertyError),
}

/// Time-stepping configuration for the source solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Requested frame step (s)
    pub time_step: f64,
    /// Hard cap on the number of frames; the step stretches to fit
    pub max_frames: usize,
    /// Clamp-and-warn on property envelope violations instead of failing
    pub extrapolate: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self { time_step: 60.0, max_frames: 150, extrapolate: true }
    }
}

impl SolverConfig {
    /// Effective frame step (s): the requested step, stretched so the
    /// duration fits inside the frame cap.
    pub fn frame_step(&self, duration: f64) -> f64 {
        self.time_step.max(duration / self.max_frames as f64)
    }

    /// Number of frames covering the duration at the effective step.
    pub fn frame_count(&self, duration: f64) -> usize {
        let step = self.frame_step(duration);
        ((duration / step).ceil() as usize).clamp(1, self.max_frames)
    }
}

/// One of the five equal-duration averaging windows handed to dispersion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersionInterval {
    /// Interval index, 0-based
    pub index: usize,
    /// Window start (s)
    pub start: f64,
    /// Window end (s)
    pub end: f64,
    /// Mean release rate over the window (kg/s)
    pub mass_flow: f64,
    /// Mass-weighted mean release temperature (K)
    pub temperature: f64,
    /// Mass-weighted mean released density (kg/m³)
    pub density: f64,
}

impl DispersionInterval {
    /// Mid-time of the window (s).
    pub fn mid_time(&self) -> f64 {
        0.5 * (self.start + self.end)
    }
}

/// Solve the scenario source into release frames.
pub fn release_frames(
    scenario: &Scenario,
    chem: &ChemicalProperties,
    atmos: &AtmosphericState,
    config: &SolverConfig,
    warnings: &mut Vec<String>,
) -> Result<Vec<ReleaseFrame>, SourceError> {
    let frames = match scenario.source {
        SourceGeometry::Direct { rate, .. } => {
            direct_frames(rate, scenario.duration, chem, atmos, config)
        }
        SourceGeometry::Puddle { area, depth, temperature, surface, solution_fraction } => {
            puddle::solve(
                area,
                depth,
                temperature,
                surface,
                solution_fraction,
                scenario.duration,
                chem,
                atmos,
                config,
                warnings,
            )?
        }
        SourceGeometry::Tank {
            volume,
            height,
            pressure,
            temperature,
            liquid_level,
            hole_area,
            hole_height,
        } => tank::solve(
            volume,
            height,
            pressure,
            temperature,
            liquid_level,
            hole_area,
            hole_height,
            scenario.duration,
            chem,
            atmos,
            config,
            warnings,
        )?,
        SourceGeometry::Pipeline { length, diameter, pressure, temperature, hole_area } => {
            pipeline::solve(
                length,
                diameter,
                pressure,
                temperature,
                hole_area,
                scenario.duration,
                chem,
                atmos,
                config,
                warnings,
            )?
        }
    };

    debug!(
        frames = frames.len(),
        peak_rate = frames.iter().map(|f| f.mass_flow).fold(0.0, f64::max),
        "source solved"
    );
    Ok(frames)
}

/// Constant-rate direct emission until the duration ends.
fn direct_frames(
    rate: f64,
    duration: f64,
    chem: &ChemicalProperties,
    atmos: &AtmosphericState,
    config: &SolverConfig,
) -> Vec<ReleaseFrame> {
    let dt = config.frame_step(duration);
    let n_frames = config.frame_count(duration);
    (0..n_frames)
        .map(|index| {
            let elapsed = index as f64 * dt;
            // Partial overlap of the last frame with the release window
            let overlap = (duration - elapsed).clamp(0.0, dt);
            ReleaseFrame {
                index: index as u32,
                elapsed,
                mass_flow: rate * overlap / dt,
                temperature: atmos.temperature,
                pressure: atmos.pressure,
                density: units::gas_density(chem.molecular_weight, atmos.temperature, atmos.pressure),
                vapor_fraction: None,
            }
        })
        .collect()
}

/// Average release frames into the five dispersion intervals over
/// `[0, duration]`.
pub fn average_into_intervals(
    frames: &[ReleaseFrame],
    duration: f64,
    frame_step: f64,
) -> Vec<DispersionInterval> {
    let window = duration / DISPERSION_INTERVALS as f64;
    (0..DISPERSION_INTERVALS)
        .map(|index| {
            let start = index as f64 * window;
            let end = start + window;

            let mut released = 0.0;
            let mut weighted_temperature = 0.0;
            let mut weighted_density = 0.0;
            let mut fallback_temperature = 0.0;
            let mut fallback_density = 0.0;
            let mut overlapped = 0.0;
            for frame in frames {
                let f_start = frame.elapsed;
                let f_end = frame.elapsed + frame_step;
                let overlap = (f_end.min(end) - f_start.max(start)).max(0.0);
                if overlap <= 0.0 {
                    continue;
                }
                let dm = frame.mass_flow * overlap;
                released += dm;
                weighted_temperature += frame.temperature * dm;
                weighted_density += frame.density * dm;
                fallback_temperature += frame.temperature * overlap;
                fallback_density += frame.density * overlap;
                overlapped += overlap;
            }

            let (temperature, density) = if released > 0.0 {
                (weighted_temperature / released, weighted_density / released)
            } else if overlapped > 0.0 {
                (fallback_temperature / overlapped, fallback_density / overlapped)
            } else {
                (0.0, 0.0)
            };

            DispersionInterval {
                index,
                start,
                end,
                mass_flow: released / window,
                temperature,
                density,
            }
        })
        .collect()
}
