//! Engine orchestrator
//!
//! One programmatic entry: [`compute`] validates the request, derives the
//! atmospheric state, solves the source, dispatches to the dispersion /
//! thermal / blast strategy for the scenario's hazard kind, extracts
//! contours and zones, evaluates receptors, and returns the whole result as
//! one owned document. Cooperative cancellation is polled between stages
//! and inside the grid fill; failures abort with no partial result.

pub mod error;
pub mod request;

use tracing::info;

use crate::atmosphere::AtmosphericState;
use crate::blast::{self, BlastSource};
use crate::contour::{self, LevelSpec};
use crate::core_types::math::all_finite;
use crate::core_types::output::{
    Contour, ContourType, Diagnostics, DispersionGrid, EngineResult, ModelKind, ReleaseFrame,
};
use crate::core_types::scenario::{HazardKind, SourceGeometry};
use crate::core_types::toxicology::GuidelineTier;
use crate::core_types::units;
use crate::dispersion::{self, GridConfig};
use crate::receptor::{self, Sampling};
use crate::source::{self, SolverConfig};
use crate::thermal::{self, FireCharacteristics};

pub use error::EngineError;
pub use request::{CancellationToken, ComputeOptions, ConcentrationLevel, Request};

/// Structured event for the caller's diagnostics sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent<'a> {
    /// A pipeline stage began.
    StageStarted {
        /// Stage name
        stage: &'static str,
    },
    /// A pipeline stage finished.
    StageCompleted {
        /// Stage name
        stage: &'static str,
    },
    /// A recovery or default path was taken.
    Warning {
        /// Human-readable description
        message: &'a str,
    },
}

/// Compute a run with the default (tracing-only) diagnostics sink.
pub fn compute(request: &Request) -> Result<EngineResult, EngineError> {
    compute_with_sink(request, &|_| {})
}

/// Compute a run, emitting [`EngineEvent`]s into the caller's sink.
pub fn compute_with_sink(
    request: &Request,
    sink: &dyn Fn(EngineEvent),
) -> Result<EngineResult, EngineError> {
    let mut warnings = Vec::new();

    stage(sink, "validate", || validate(request))?;
    check_cancelled(request)?;

    sink(EngineEvent::StageStarted { stage: "atmosphere" });
    let atmos = AtmosphericState::derive(
        &request.weather,
        request.scenario.terrain,
        request.scenario.reference_height,
        &mut warnings,
    );
    sink(EngineEvent::StageCompleted { stage: "atmosphere" });
    check_cancelled(request)?;

    sink(EngineEvent::StageStarted { stage: "source" });
    let solver_config = SolverConfig {
        time_step: request.options.time_step_s,
        max_frames: request.options.max_time_steps as usize,
        extrapolate: request.options.extrapolate,
    };
    let frames = source::release_frames(
        &request.scenario,
        &request.chemical,
        &atmos,
        &solver_config,
        &mut warnings,
    )?;
    let intervals = source::average_into_intervals(
        &frames,
        request.scenario.duration,
        solver_config.frame_step(request.scenario.duration),
    );
    sink(EngineEvent::StageCompleted { stage: "source" });
    check_cancelled(request)?;

    let mut result = match request.scenario.hazard {
        HazardKind::ToxicRelease => {
            toxic_strategy(request, &atmos, &frames, &intervals, &mut warnings, sink)?
        }
        HazardKind::BleveFireball { .. }
        | HazardKind::JetFire
        | HazardKind::PoolFire
        | HazardKind::FlashFire { .. } => {
            fire_strategy(request, &atmos, &frames, &intervals, &mut warnings, sink)?
        }
        HazardKind::VaporCloudExplosion { .. } => {
            blast_strategy(request, &atmos, &frames, &intervals, &mut warnings, sink)?
        }
    };
    check_cancelled(request)?;

    // No partial results: anything non-finite fails the whole run
    if !result.receptor_exposures.iter().all(|e| e.peak.is_finite()) {
        return Err(EngineError::Numerical { stage: "receptors".to_owned() });
    }

    let final_diagnostics = diagnostics(&result, request, warnings);
    result.diagnostics = final_diagnostics;
    for message in &result.diagnostics.warnings {
        sink(EngineEvent::Warning { message });
    }
    info!(
        model = ?result.model_selected,
        contours = result.contours.len(),
        warnings = result.diagnostics.warnings.len(),
        "run complete"
    );
    Ok(result)
}

fn stage<T>(
    sink: &dyn Fn(EngineEvent),
    name: &'static str,
    f: impl FnOnce() -> Result<T, EngineError>,
) -> Result<T, EngineError> {
    sink(EngineEvent::StageStarted { stage: name });
    let out = f()?;
    sink(EngineEvent::StageCompleted { stage: name });
    Ok(out)
}

fn check_cancelled(request: &Request) -> Result<(), EngineError> {
    if request.options.is_cancelled() {
        Err(EngineError::Cancelled)
    } else {
        Ok(())
    }
}

/// Contour levels for a toxic run: caller levels, guideline levels, and the
/// flammability footprint.
fn concentration_levels(request: &Request, atmos: &AtmosphericState) -> Vec<LevelSpec> {
    let chem = &request.chemical;
    let mut levels = Vec::new();

    for level in &request.options.concentration_levels {
        let value = match level.units {
            crate::core_types::toxicology::ConcentrationUnits::MgPerM3 => level.value,
            crate::core_types::toxicology::ConcentrationUnits::Ppm => units::ppm_to_mg_per_m3(
                level.value,
                chem.molecular_weight,
                atmos.temperature,
                atmos.pressure,
            ),
        };
        levels.push(LevelSpec { level: value, label: level.label.clone(), contour_type: ContourType::Custom });
    }

    if let Some(tox) = &request.toxicology {
        let window = request.options.exposure_window_min;
        let convert =
            |v: f64| tox.to_mg_per_m3(v, chem.molecular_weight, atmos.temperature, atmos.pressure);
        let tiers = [
            (GuidelineTier::Tier1, ContourType::Aegl1, ContourType::Erpg1, 1),
            (GuidelineTier::Tier2, ContourType::Aegl2, ContourType::Erpg2, 2),
            (GuidelineTier::Tier3, ContourType::Aegl3, ContourType::Erpg3, 3),
        ];
        for (tier, aegl_type, erpg_type, n) in tiers {
            if let Some(v) = tox.aegl_for(tier, window) {
                levels.push(LevelSpec {
                    level: convert(v),
                    label: format!("AEGL-{n} ({window:.0} min)"),
                    contour_type: aegl_type,
                });
            }
            if let Some(v) = tox.erpg_for(tier) {
                levels.push(LevelSpec {
                    level: convert(v),
                    label: format!("ERPG-{n}"),
                    contour_type: erpg_type,
                });
            }
        }
        if let Some(v) = tox.idlh {
            levels.push(LevelSpec {
                level: convert(v),
                label: "IDLH".to_owned(),
                contour_type: ContourType::Idlh,
            });
        }
    }

    if let Some(limits) = chem.flammability {
        levels.push(LevelSpec {
            level: units::ppm_to_mg_per_m3(
                limits.lfl_vol_pct * 1e4,
                chem.molecular_weight,
                atmos.temperature,
                atmos.pressure,
            ),
            label: "LFL".to_owned(),
            contour_type: ContourType::Flammable,
        });
    }

    levels
}

fn grid_config(request: &Request, levels: &[LevelSpec]) -> GridConfig {
    let smallest = levels
        .iter()
        .map(|l| l.level)
        .filter(|&v| v > 0.0)
        .fold(f64::INFINITY, f64::min);
    GridConfig {
        resolution: request.options.grid_resolution_m,
        max_downwind: request.options.max_downwind_m,
        max_crosswind: request.options.max_crosswind_m,
        smallest_level: if smallest.is_finite() { smallest } else { 1.0 },
        decay_constant: request
            .options
            .include_decay
            .then_some(request.options.decay_constant.unwrap_or(1e-4)),
        deposition_velocity: request.options.include_depletion.then_some(0.01),
    }
}

fn sampling_mode(request: &Request) -> Sampling {
    if request.options.interpolate_receptors {
        Sampling::Bilinear
    } else {
        Sampling::Nearest
    }
}

/// Build the dispersion grid shared by the toxic, flash-fire and VCE paths.
fn run_dispersion(
    request: &Request,
    atmos: &AtmosphericState,
    intervals: &[source::DispersionInterval],
    levels: &[LevelSpec],
) -> Result<(ModelKind, DispersionGrid), EngineError> {
    let (model, _ri) = dispersion::select_model(
        &request.chemical,
        atmos,
        &request.scenario,
        request.options.model_override,
    );
    let config = grid_config(request, levels);
    let token = request.options.cancellation_token.clone().unwrap_or_default();
    let grid = dispersion::build_grid(
        model,
        intervals,
        &request.chemical,
        atmos,
        &request.scenario,
        &config,
        &(move || token.is_cancelled()),
    )?;
    Ok((model, grid))
}

fn toxic_strategy(
    request: &Request,
    atmos: &AtmosphericState,
    frames: &[ReleaseFrame],
    intervals: &[source::DispersionInterval],
    warnings: &mut Vec<String>,
    sink: &dyn Fn(EngineEvent),
) -> Result<EngineResult, EngineError> {
    let levels = concentration_levels(request, atmos);
    if levels.is_empty() {
        warnings.push(
            "no concentration levels requested and no guidelines supplied; contours limited to defaults"
                .to_owned(),
        );
    }

    sink(EngineEvent::StageStarted { stage: "dispersion" });
    let (model, grid) = run_dispersion(request, atmos, intervals, &levels)?;
    sink(EngineEvent::StageCompleted { stage: "dispersion" });
    check_cancelled(request)?;

    let contours = stage(sink, "contours", || Ok(contour::extract_contours(&grid, &levels)))?;
    check_cancelled(request)?;

    let config = grid_config(request, &levels);
    let exposures = stage(sink, "receptors", || {
        Ok(receptor::evaluate_toxic(
            &grid,
            &request.receptors,
            request.toxicology.as_ref(),
            &request.chemical,
            atmos,
            request.scenario.duration,
            request.options.exposure_window_min,
            config.smallest_level,
            sampling_mode(request),
        ))
    })?;

    Ok(skeleton_result(model, atmos, frames, Some(grid), contours, None, None, exposures))
}

fn fire_strategy(
    request: &Request,
    atmos: &AtmosphericState,
    frames: &[ReleaseFrame],
    intervals: &[source::DispersionInterval],
    warnings: &mut Vec<String>,
    sink: &dyn Fn(EngineEvent),
) -> Result<EngineResult, EngineError> {
    sink(EngineEvent::StageStarted { stage: "thermal" });

    let peak_rate = intervals.iter().map(|i| i.mass_flow).fold(0.0, f64::max);
    let mut carried_grid = None;
    let mut model = ModelKind::None;

    let fire: FireCharacteristics = match request.scenario.hazard {
        HazardKind::BleveFireball { mass } => thermal::fireball::bleve_fireball(mass),
        HazardKind::JetFire => {
            if request.chemical.heat_of_combustion.is_none() {
                return Err(EngineError::InvalidInput {
                    field: "chemical.heat_of_combustion".to_owned(),
                    reason: "jet fire needs a combustible chemical".to_owned(),
                });
            }
            thermal::jet_fire::jet_fire(peak_rate, request.scenario.duration, &request.chemical)
        }
        HazardKind::PoolFire => {
            let SourceGeometry::Puddle { area, .. } = request.scenario.source else {
                return Err(EngineError::InvalidInput {
                    field: "scenario.source".to_owned(),
                    reason: "pool fire needs a puddle source".to_owned(),
                });
            };
            thermal::pool_fire::pool_fire(area, request.scenario.duration, &request.chemical, atmos)
        }
        HazardKind::FlashFire { cloud_volume } => {
            let volume = match cloud_volume {
                Some(v) => v,
                None => {
                    // Derive the burning cloud from the dispersed plume
                    let levels = concentration_levels(request, atmos);
                    let (selected, grid) = run_dispersion(request, atmos, intervals, &levels)?;
                    let mass = blast::tnt::flammable_mass_from_grid(&grid, &request.chemical, atmos);
                    let volume = flammable_cloud_volume(mass, &request.chemical, atmos)?;
                    model = selected;
                    carried_grid = Some(grid);
                    if mass <= 0.0 {
                        warnings.push(
                            "no flammable cloud formed; flash fire reduced to a nominal volume"
                                .to_owned(),
                        );
                    }
                    volume
                }
            };
            thermal::fireball::flash_fire(volume.max(1.0))
        }
        _ => unreachable!("fire strategy only sees fire hazards"),
    };

    let thermal_field = thermal::build_field(
        &fire,
        atmos,
        request.options.humidity_correction,
        request.options.max_downwind_m,
    );
    if !all_finite(&thermal_field.iter().map(|s| s.heat_flux).collect::<Vec<_>>()) {
        return Err(EngineError::Numerical { stage: "thermal".to_owned() });
    }
    let contours = thermal::damage_zones(
        &fire,
        atmos,
        &request.scenario.location,
        request.options.humidity_correction,
        request.options.max_downwind_m,
    );
    sink(EngineEvent::StageCompleted { stage: "thermal" });
    check_cancelled(request)?;

    let exposures = stage(sink, "receptors", || {
        Ok(receptor::evaluate_thermal(
            &fire,
            &request.receptors,
            &request.scenario.location,
            atmos,
            request.options.humidity_correction,
        ))
    })?;

    Ok(skeleton_result(
        model,
        atmos,
        frames,
        carried_grid,
        contours,
        Some(thermal_field),
        None,
        exposures,
    ))
}

fn blast_strategy(
    request: &Request,
    atmos: &AtmosphericState,
    frames: &[ReleaseFrame],
    intervals: &[source::DispersionInterval],
    warnings: &mut Vec<String>,
    sink: &dyn Fn(EngineEvent),
) -> Result<EngineResult, EngineError> {
    let HazardKind::VaporCloudExplosion {
        flammable_mass,
        congestion,
        confinement,
        ignition_height,
    } = request.scenario.hazard
    else {
        unreachable!("blast strategy only sees the VCE hazard");
    };

    sink(EngineEvent::StageStarted { stage: "blast" });

    let mut carried_grid = None;
    let mut model = ModelKind::None;
    let mass = match flammable_mass {
        Some(m) => m,
        None => {
            let levels = concentration_levels(request, atmos);
            let (selected, grid) = run_dispersion(request, atmos, intervals, &levels)?;
            let mass = blast::tnt::flammable_mass_from_grid(&grid, &request.chemical, atmos);
            model = selected;
            carried_grid = Some(grid);
            mass
        }
    };

    let Some(heat_of_combustion) = request.chemical.heat_of_combustion else {
        return Err(EngineError::InvalidInput {
            field: "chemical.heat_of_combustion".to_owned(),
            reason: "vapor cloud explosion needs a combustible chemical".to_owned(),
        });
    };
    if mass <= 0.0 {
        return Err(EngineError::InfeasibleSource {
            reason: "no flammable mass between the flammability limits".to_owned(),
        });
    }

    let eta = blast::tnt::efficiency(request.chemical.reactivity, congestion, confinement);
    let source = BlastSource {
        tnt_mass: blast::tnt::tnt_equivalent_mass(mass, heat_of_combustion, eta),
        ignition_height,
        wind_asymmetry: request.options.blast_wind_asymmetry,
    };
    warnings.push(format!(
        "VCE yield: {mass:.0} kg flammable at efficiency {eta:.3} -> {:.0} kg TNT",
        source.tnt_mass
    ));

    let blast_field = blast::build_field(&source, atmos, request.options.max_downwind_m);
    if !all_finite(&blast_field.iter().map(|s| s.overpressure).collect::<Vec<_>>()) {
        return Err(EngineError::Numerical { stage: "blast".to_owned() });
    }
    let contours =
        blast::damage_zones(&source, atmos, &request.scenario.location, request.options.max_downwind_m);
    sink(EngineEvent::StageCompleted { stage: "blast" });
    check_cancelled(request)?;

    let exposures = stage(sink, "receptors", || {
        Ok(receptor::evaluate_blast(&source, &request.receptors, &request.scenario.location, atmos))
    })?;

    Ok(skeleton_result(
        model,
        atmos,
        frames,
        carried_grid,
        contours,
        None,
        Some(blast_field),
        exposures,
    ))
}

/// Burning-cloud volume from the flammable mass, at the mid-range
/// flammable concentration.
fn flammable_cloud_volume(
    mass: f64,
    chem: &crate::core_types::chemical::ChemicalProperties,
    atmos: &AtmosphericState,
) -> Result<f64, EngineError> {
    let Some(limits) = chem.flammability else {
        return Err(EngineError::InvalidInput {
            field: "chemical.flammability".to_owned(),
            reason: "flash fire needs flammability limits".to_owned(),
        });
    };
    let mean_fraction = (limits.lfl_vol_pct + limits.ufl_vol_pct) / 2.0 / 100.0;
    let vapor_density =
        units::gas_density(chem.molecular_weight, atmos.temperature, atmos.pressure);
    Ok(mass / (vapor_density * mean_fraction))
}

#[allow(clippy::too_many_arguments)]
fn skeleton_result(
    model: ModelKind,
    atmos: &AtmosphericState,
    frames: &[ReleaseFrame],
    grid: Option<DispersionGrid>,
    contours: Vec<Contour>,
    thermal_field: Option<Vec<crate::core_types::output::ThermalSample>>,
    blast_field: Option<Vec<crate::core_types::output::BlastSample>>,
    exposures: Vec<crate::core_types::output::ReceptorExposure>,
) -> EngineResult {
    EngineResult {
        model_selected: model,
        pasquill_class: atmos.pasquill,
        friction_velocity: atmos.friction_velocity,
        mixing_height: atmos.mixing_height,
        release_frames: frames.to_vec(),
        dispersion_grid: grid,
        contours,
        thermal_field,
        blast_field,
        receptor_exposures: exposures,
        diagnostics: Diagnostics::default(),
    }
}

/// Final diagnostics: warnings, convergence of the grid extent, and an
/// order-of-magnitude uncertainty estimate.
fn diagnostics(result: &EngineResult, request: &Request, mut warnings: Vec<String>) -> Diagnostics {
    let mut converged = true;
    if let Some(grid) = &result.dispersion_grid {
        let last_x = grid.xs.len() - 1;
        let mid_y = grid.ys.len() / 2;
        let edge = (0..grid.times.len())
            .map(|t| grid.concentration(t, last_x, mid_y))
            .fold(0.0, f64::max);
        let levels = concentration_levels(request, &AtmosphericState::derive(
            &request.weather,
            request.scenario.terrain,
            request.scenario.reference_height,
            &mut Vec::new(),
        ));
        let smallest = grid_config(request, &levels).smallest_level;
        if edge > smallest / 10.0 {
            converged = false;
            warnings.push(format!(
                "downwind extent capped at {:.0} m with edge concentration {edge:.3} mg/m³ still above a tenth of the smallest level",
                request.options.max_downwind_m
            ));
        }
    }

    let mut uncertainty: f64 = 0.3;
    if result.model_selected == ModelKind::HeavyGas {
        uncertainty += 0.1;
    }
    if warnings.iter().any(|w| w.contains("clamped")) {
        uncertainty += 0.1;
    }
    if warnings.iter().any(|w| w.contains("defaulting")) {
        uncertainty += 0.05;
    }

    Diagnostics { warnings, converged, uncertainty: uncertainty.min(0.6) }
}

/// Field-level request validation.
fn validate(request: &Request) -> Result<(), EngineError> {
    let fail = |field: &str, reason: String| {
        Err(EngineError::InvalidInput { field: field.to_owned(), reason })
    };

    // Scenario
    let s = &request.scenario;
    if !(s.duration > 0.0 && s.duration.is_finite()) {
        return fail("scenario.duration", format!("must be positive, got {}", s.duration));
    }
    if s.release_height < 0.0 {
        return fail("scenario.release_height", "must be non-negative".to_owned());
    }
    if s.reference_height <= 0.0 {
        return fail("scenario.reference_height", "must be positive".to_owned());
    }
    if !(-90.0..=90.0).contains(&s.location.latitude) {
        return fail("scenario.location.latitude", "must be in [-90, 90]".to_owned());
    }
    validate_source(&s.source)?;
    validate_hazard(&s.hazard)?;

    // Weather
    let w = &request.weather;
    if !(w.wind_speed >= 0.0 && w.wind_speed.is_finite()) {
        return fail("weather.wind_speed", format!("must be >= 0, got {}", w.wind_speed));
    }
    if !(0.0..360.0).contains(&w.wind_direction) {
        return fail("weather.wind_direction", "must be in [0, 360)".to_owned());
    }
    if w.temperature <= 0.0 {
        return fail("weather.temperature", "must be positive kelvin".to_owned());
    }
    if w.pressure <= 0.0 {
        return fail("weather.pressure", "must be positive pascal".to_owned());
    }
    if !(0.0..=1.0).contains(&w.humidity) {
        return fail("weather.humidity", "must be in [0, 1]".to_owned());
    }
    if !(0.0..=1.0).contains(&w.cloud_cover) {
        return fail("weather.cloud_cover", "must be in [0, 1]".to_owned());
    }
    if w.observed_hour >= 24 {
        return fail("weather.observed_hour", "must be in 0..24".to_owned());
    }
    if w.pasquill_class.is_none() && !w.can_derive_stability() {
        return fail(
            "weather.pasquill_class",
            "supply a class or enough fields to derive one".to_owned(),
        );
    }

    // Chemical
    let c = &request.chemical;
    if c.molecular_weight <= 0.0 {
        return fail("chemical.molecular_weight", "must be positive".to_owned());
    }
    if !(1..=6).contains(&c.reactivity) {
        return fail("chemical.reactivity", format!("must be 1..6, got {}", c.reactivity));
    }

    // Receptors
    for (i, receptor) in request.receptors.iter().enumerate() {
        if receptor.height < 0.0 {
            return fail(&format!("receptors[{i}].height"), "must be non-negative".to_owned());
        }
    }

    // Options
    let o = &request.options;
    if o.grid_resolution_m <= 0.0 {
        return fail("options.grid_resolution_m", "must be positive".to_owned());
    }
    if o.max_downwind_m <= o.grid_resolution_m {
        return fail("options.max_downwind_m", "must exceed the grid resolution".to_owned());
    }
    if o.time_step_s <= 0.0 {
        return fail("options.time_step_s", "must be positive".to_owned());
    }
    if o.max_time_steps == 0 {
        return fail("options.max_time_steps", "must be at least 1".to_owned());
    }
    if o.exposure_window_min <= 0.0 {
        return fail("options.exposure_window_min", "must be positive".to_owned());
    }
    for (i, level) in o.concentration_levels.iter().enumerate() {
        if !(level.value > 0.0 && level.value.is_finite()) {
            return fail(
                &format!("options.concentration_levels[{i}].value"),
                "must be positive".to_owned(),
            );
        }
    }

    Ok(())
}

fn validate_source(source: &SourceGeometry) -> Result<(), EngineError> {
    let fail = |field: &str, reason: &str| {
        Err(EngineError::InvalidInput { field: field.to_owned(), reason: reason.to_owned() })
    };
    match *source {
        SourceGeometry::Direct { rate, area, velocity } => {
            if rate < 0.0 {
                return fail("scenario.source.rate", "must be non-negative");
            }
            if area <= 0.0 {
                return fail("scenario.source.area", "must be positive");
            }
            if velocity < 0.0 {
                return fail("scenario.source.velocity", "must be non-negative");
            }
        }
        SourceGeometry::Puddle { area, depth, temperature, solution_fraction, .. } => {
            if area <= 0.0 {
                return fail("scenario.source.area", "must be positive");
            }
            if depth <= 0.0 {
                return fail("scenario.source.depth", "must be positive");
            }
            if temperature <= 0.0 {
                return fail("scenario.source.temperature", "must be positive kelvin");
            }
            if let Some(f) = solution_fraction {
                if !(0.0..=1.0).contains(&f) {
                    return fail("scenario.source.solution_fraction", "must be in [0, 1]");
                }
            }
        }
        SourceGeometry::Tank { volume, height, pressure, temperature, liquid_level, hole_area, hole_height } => {
            if volume <= 0.0 {
                return fail("scenario.source.volume", "must be positive");
            }
            if height <= 0.0 {
                return fail("scenario.source.height", "must be positive");
            }
            if pressure <= 0.0 {
                return fail("scenario.source.pressure", "must be positive pascal");
            }
            if temperature <= 0.0 {
                return fail("scenario.source.temperature", "must be positive kelvin");
            }
            if !(0.0..=height).contains(&liquid_level) {
                return fail("scenario.source.liquid_level", "must be within the vessel height");
            }
            if hole_area <= 0.0 {
                return fail("scenario.source.hole_area", "must be positive");
            }
            if hole_height < 0.0 {
                return fail("scenario.source.hole_height", "must be non-negative");
            }
        }
        SourceGeometry::Pipeline { length, diameter, pressure, temperature, hole_area } => {
            if length <= 0.0 {
                return fail("scenario.source.length", "must be positive");
            }
            if diameter <= 0.0 {
                return fail("scenario.source.diameter", "must be positive");
            }
            if pressure <= 0.0 {
                return fail("scenario.source.pressure", "must be positive pascal");
            }
            if temperature <= 0.0 {
                return fail("scenario.source.temperature", "must be positive kelvin");
            }
            if hole_area <= 0.0 {
                return fail("scenario.source.hole_area", "must be positive");
            }
        }
    }
    Ok(())
}

fn validate_hazard(hazard: &HazardKind) -> Result<(), EngineError> {
    let fail = |field: &str, reason: &str| {
        Err(EngineError::InvalidInput { field: field.to_owned(), reason: reason.to_owned() })
    };
    match *hazard {
        HazardKind::BleveFireball { mass } => {
            if mass <= 0.0 {
                return fail("scenario.hazard.mass", "must be positive");
            }
        }
        HazardKind::FlashFire { cloud_volume: Some(v) } => {
            if v <= 0.0 {
                return fail("scenario.hazard.cloud_volume", "must be positive");
            }
        }
        HazardKind::VaporCloudExplosion { flammable_mass, congestion, confinement, ignition_height } => {
            if let Some(m) = flammable_mass {
                if m <= 0.0 {
                    return fail("scenario.hazard.flammable_mass", "must be positive");
                }
            }
            if !(0.0..=1.0).contains(&congestion) {
                return fail("scenario.hazard.congestion", "must be in [0, 1]");
            }
            if !(0.0..=1.0).contains(&confinement) {
                return fail("scenario.hazard.confinement", "must be in [0, 1]");
            }
            if ignition_height < 0.0 {
                return fail("scenario.hazard.ignition_height", "must be non-negative");
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::chemical::ChemicalProperties;
    use crate::core_types::geo::GeoPoint;
    use crate::core_types::scenario::Scenario;
    use crate::core_types::weather::WeatherSnapshot;

    fn minimal_request() -> Request {
        Request {
            scenario: Scenario::toxic(
                SourceGeometry::Direct { rate: 1.0, area: 1.0, velocity: 0.0 },
                GeoPoint::new(-32.0, 115.9),
                600.0,
            ),
            weather: WeatherSnapshot::neutral(5.0, 270.0, 293.15),
            chemical: ChemicalProperties::chlorine(),
            toxicology: None,
            receptors: Vec::new(),
            options: ComputeOptions {
                max_downwind_m: 2000.0,
                concentration_levels: vec![ConcentrationLevel {
                    value: 5.0,
                    units: crate::core_types::toxicology::ConcentrationUnits::MgPerM3,
                    label: "level of concern".to_owned(),
                }],
                ..ComputeOptions::default()
            },
        }
    }

    #[test]
    fn test_minimal_toxic_run_completes() {
        let result = compute(&minimal_request()).unwrap();
        assert_eq!(result.model_selected, ModelKind::HeavyGas);
        assert!(result.dispersion_grid.is_some());
        assert!(!result.release_frames.is_empty());
        assert!(result.diagnostics.uncertainty > 0.0);
    }

    #[test]
    fn test_validation_reports_field_paths() {
        let mut request = minimal_request();
        request.weather.wind_direction = 400.0;
        let err = compute(&request).unwrap_err();
        match err {
            EngineError::InvalidInput { field, .. } => {
                assert_eq!(field, "weather.wind_direction");
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_cancellation_before_work() {
        let mut request = minimal_request();
        let token = CancellationToken::new();
        token.cancel();
        request.options.cancellation_token = Some(token);
        assert_eq!(compute(&request).unwrap_err(), EngineError::Cancelled);
    }

    #[test]
    fn test_stage_events_are_emitted() {
        use std::cell::RefCell;
        let request = minimal_request();
        let stages = RefCell::new(Vec::new());
        compute_with_sink(&request, &|event| {
            if let EngineEvent::StageStarted { stage } = event {
                stages.borrow_mut().push(stage);
            }
        })
        .unwrap();
        let seen = stages.borrow();
        for expected in ["validate", "atmosphere", "source", "dispersion", "contours", "receptors"] {
            assert!(seen.contains(&expected), "missing stage {expected}");
        }
    }

    #[test]
    fn test_vce_with_given_mass() {
        let mut request = minimal_request();
        request.chemical = ChemicalProperties::propane();
        request.scenario.hazard = HazardKind::VaporCloudExplosion {
            flammable_mass: Some(500.0),
            congestion: 0.3,
            confinement: 0.2,
            ignition_height: 0.0,
        };
        let result = compute(&request).unwrap();
        let field = result.blast_field.expect("VCE produces a blast field");
        assert!(!field.is_empty());
        assert!(result.contours.iter().any(|c| c.label.contains("kPa")));
        assert_eq!(result.model_selected, ModelKind::None);
    }

    #[test]
    fn test_vce_needs_combustible_chemical() {
        let mut request = minimal_request();
        // Chlorine has no heat of combustion
        request.scenario.hazard = HazardKind::VaporCloudExplosion {
            flammable_mass: Some(500.0),
            congestion: 0.3,
            confinement: 0.2,
            ignition_height: 0.0,
        };
        let err = compute(&request).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_pool_fire_needs_puddle_source() {
        let mut request = minimal_request();
        request.chemical = ChemicalProperties::benzene();
        request.scenario.hazard = HazardKind::PoolFire;
        let err = compute(&request).unwrap_err();
        match err {
            EngineError::InvalidInput { field, .. } => assert_eq!(field, "scenario.source"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }
}
