//! Request document and compute options
//!
//! A [`Request`] bundles everything one run consumes. It is a plain
//! serialisable document; the only non-data member is the optional
//! cancellation token, which is skipped by serde and defaults to
//! "never cancelled".

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core_types::chemical::ChemicalProperties;
use crate::core_types::scenario::{Receptor, Scenario};
use crate::core_types::toxicology::ToxicologicalGuidelines;
use crate::core_types::weather::WeatherSnapshot;
use crate::dispersion::ModelChoice;

/// Cooperative cancellation flag shared with the caller.
///
/// The orchestrator polls it between pipeline stages and per grid row; a
/// fired token aborts the run with `EngineError::Cancelled` and no partial
/// result.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Fresh, un-fired token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the token; every clone observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// True once fired.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// One caller-requested concentration level to contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationLevel {
    /// Level value in `units`
    pub value: f64,
    /// Unit the value is declared in
    pub units: crate::core_types::toxicology::ConcentrationUnits,
    /// Caller-facing label
    pub label: String,
}

/// Tuning knobs of one run; every field has a documented default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeOptions {
    /// Dispersion model preference
    pub model_override: ModelChoice,
    /// Grid cell size (m)
    pub grid_resolution_m: f64,
    /// Downwind extent cap (m)
    pub max_downwind_m: f64,
    /// Crosswind half-extent cap (m)
    pub max_crosswind_m: f64,
    /// Source-solver frame step (s)
    pub time_step_s: f64,
    /// Source-solver frame cap
    pub max_time_steps: u32,
    /// Caller-requested contour levels
    pub concentration_levels: Vec<ConcentrationLevel>,
    /// Enable dry-deposition depletion
    pub include_depletion: bool,
    /// Enable first-order decay
    pub include_decay: bool,
    /// Decay constant (1/s) when decay is on
    pub decay_constant: Option<f64>,
    /// Exposure window for TWA and guideline buckets (minutes)
    pub exposure_window_min: f64,
    /// Bilinear receptor sampling instead of nearest-cell
    pub interpolate_receptors: bool,
    /// Clamp-and-warn on property envelope violations instead of failing
    pub extrapolate: bool,
    /// Humidity-corrected thermal transmittance
    pub humidity_correction: bool,
    /// Wind-direction asymmetry on the blast field
    pub blast_wind_asymmetry: bool,
    /// Cooperative cancellation token (never serialised)
    #[serde(skip)]
    pub cancellation_token: Option<CancellationToken>,
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self {
            model_override: ModelChoice::Auto,
            grid_resolution_m: 10.0,
            max_downwind_m: 10_000.0,
            max_crosswind_m: 5_000.0,
            time_step_s: 60.0,
            max_time_steps: 100,
            concentration_levels: Vec::new(),
            include_depletion: false,
            include_decay: false,
            decay_constant: None,
            exposure_window_min: 60.0,
            interpolate_receptors: false,
            extrapolate: false,
            humidity_correction: false,
            blast_wind_asymmetry: false,
            cancellation_token: None,
        }
    }
}

impl ComputeOptions {
    /// True once the caller's token has fired.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

/// The complete input document of one engine run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Release scenario
    pub scenario: Scenario,
    /// Weather observation
    pub weather: WeatherSnapshot,
    /// Chemical property record
    pub chemical: ChemicalProperties,
    /// Exposure guidelines, when available
    pub toxicology: Option<ToxicologicalGuidelines>,
    /// Points of interest
    pub receptors: Vec<Receptor>,
    /// Tuning knobs
    pub options: ComputeOptions,
}
