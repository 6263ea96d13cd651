//! Engine output documents
//!
//! Everything a run produces is materialised eagerly into the owned structs
//! here and handed back as one [`EngineResult`]. Inputs are only borrowed
//! during the computation; the result shares nothing with them and nothing
//! with other runs.

use serde::{Deserialize, Serialize};

use super::geo::{self, GeoPoint};
use super::weather::PasquillClass;

/// Concentrations below this fraction of a mg/m³ are dropped on emission.
pub const CONCENTRATION_FLOOR: f64 = 1e-12;

/// Which dispersion model a run ended up using.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Passive Gaussian plume
    Gaussian,
    /// Dense-gas box model with Gaussian hand-off
    HeavyGas,
    /// No dispersion ran (fire or blast strategies)
    None,
}

/// One time step of the source-strength solution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReleaseFrame {
    /// Step index, 0-based
    pub index: u32,
    /// Time since release start (s)
    pub elapsed: f64,
    /// Mass flow out of containment (kg/s), >= 0
    pub mass_flow: f64,
    /// Temperature of the released material (K)
    pub temperature: f64,
    /// Pressure driving the release (Pa)
    pub pressure: f64,
    /// Density of the released material (kg/m³)
    pub density: f64,
    /// Vapor mass fraction for two-phase discharge
    pub vapor_fraction: Option<f64>,
}

/// Dense space-time concentration field in scenario-local coordinates.
///
/// Layout is time-major: `concentrations[t][ix][iy]` flattened, with
/// per-`(t, ix)` plume parameters alongside. Geodetic coordinates are only
/// materialised when cells are emitted through [`DispersionGrid::cells`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispersionGrid {
    /// Mid-time of each dispersion interval (s)
    pub times: Vec<f64>,
    /// Downwind cell-centre coordinates (m), ascending from the first cell
    pub xs: Vec<f64>,
    /// Crosswind cell-centre coordinates (m), symmetric about 0
    pub ys: Vec<f64>,
    /// Sampling height above ground (m)
    pub z: f64,
    /// Plume axis azimuth, degrees from east, CCW positive
    pub downwind_azimuth: f64,
    /// Source position; local (0, 0) maps here
    pub origin: GeoPoint,
    /// Concentration (mg/m³), length `times × xs × ys`
    pub concentrations: Vec<f64>,
    /// Lateral dispersion coefficient (m), length `times × xs`
    pub sigma_y: Vec<f64>,
    /// Vertical dispersion coefficient (m), length `times × xs`
    pub sigma_z: Vec<f64>,
    /// Effective plume centreline height (m), length `times × xs`
    pub plume_height: Vec<f64>,
    /// Transport wind speed per interval (m/s), length `times`
    pub wind_speed: Vec<f64>,
}

/// One emitted grid cell with geodetic position attached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// Interval mid-time (s)
    pub time: f64,
    /// Downwind coordinate (m)
    pub x: f64,
    /// Crosswind coordinate (m)
    pub y: f64,
    /// Height above ground (m)
    pub z: f64,
    /// Concentration (mg/m³)
    pub concentration: f64,
    /// Lateral dispersion coefficient (m)
    pub sigma_y: f64,
    /// Vertical dispersion coefficient (m)
    pub sigma_z: f64,
    /// Effective plume height (m)
    pub plume_height: f64,
    /// Transport wind speed (m/s)
    pub wind_speed: f64,
    /// Cell centre in WGS-84
    pub location: GeoPoint,
}

impl DispersionGrid {
    /// Flat index of `(t, ix, iy)`.
    #[inline]
    pub fn index(&self, t: usize, ix: usize, iy: usize) -> usize {
        (t * self.xs.len() + ix) * self.ys.len() + iy
    }

    /// Concentration at a cell (mg/m³).
    #[inline]
    pub fn concentration(&self, t: usize, ix: usize, iy: usize) -> f64 {
        self.concentrations[self.index(t, ix, iy)]
    }

    /// The `(ix, iy)` of the cell whose centre is closest to local `(x, y)`;
    /// `None` outside the grid extents by more than half a cell.
    pub fn nearest_cell(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let dx = self.spacing_x();
        let dy = self.spacing_y();
        let ix = ((x - self.xs[0]) / dx).round();
        let iy = ((y - self.ys[0]) / dy).round();
        if ix < 0.0 || iy < 0.0 {
            return None;
        }
        let (ix, iy) = (ix as usize, iy as usize);
        (ix < self.xs.len() && iy < self.ys.len()).then_some((ix, iy))
    }

    /// Downwind cell spacing (m).
    pub fn spacing_x(&self) -> f64 {
        if self.xs.len() > 1 { self.xs[1] - self.xs[0] } else { 1.0 }
    }

    /// Crosswind cell spacing (m).
    pub fn spacing_y(&self) -> f64 {
        if self.ys.len() > 1 { self.ys[1] - self.ys[0] } else { 1.0 }
    }

    /// Emit cells above the concentration floor with geodetic positions.
    pub fn cells(&self) -> Vec<GridCell> {
        let mut out = Vec::new();
        for (t, &time) in self.times.iter().enumerate() {
            for (ix, &x) in self.xs.iter().enumerate() {
                for (iy, &y) in self.ys.iter().enumerate() {
                    let c = self.concentration(t, ix, iy);
                    if c < CONCENTRATION_FLOOR {
                        continue;
                    }
                    let (east, north) = geo::plume_to_east_north(x, y, self.downwind_azimuth);
                    out.push(GridCell {
                        time,
                        x,
                        y,
                        z: self.z,
                        concentration: c,
                        sigma_y: self.sigma_y[t * self.xs.len() + ix],
                        sigma_z: self.sigma_z[t * self.xs.len() + ix],
                        plume_height: self.plume_height[t * self.xs.len() + ix],
                        wind_speed: self.wind_speed[t],
                        location: geo::offset_geodetic(&self.origin, east, north),
                    });
                }
            }
        }
        out
    }
}

/// What a contour level means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourType {
    /// AEGL-1 footprint
    Aegl1,
    /// AEGL-2 footprint
    Aegl2,
    /// AEGL-3 footprint
    Aegl3,
    /// ERPG-1 footprint
    Erpg1,
    /// ERPG-2 footprint
    Erpg2,
    /// ERPG-3 footprint
    Erpg3,
    /// IDLH footprint
    Idlh,
    /// Caller-supplied level
    Custom,
    /// Lower-flammability-limit footprint
    Flammable,
}

/// A closed iso-concentration (or iso-effect) polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// Level the polygon encloses (mg/m³ for concentration contours)
    pub level: f64,
    /// Caller-facing label for the level
    pub label: String,
    /// Semantics of the level
    pub contour_type: ContourType,
    /// Dispersion interval the polygon belongs to; 0 for static fields
    pub time_index: usize,
    /// Closed ring, counter-clockwise, in WGS-84; last vertex repeats the first
    pub vertices: Vec<GeoPoint>,
    /// Enclosed area in projected square metres
    pub area_m2: f64,
    /// Largest downwind extent of the ring (m from the source)
    pub max_downwind_m: f64,
}

/// Thermal damage band for one incident-flux sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermalDamageCategory {
    /// Below sustained-pain threshold
    Negligible,
    /// Pain within a minute, no lasting injury
    PainThreshold,
    /// Second-degree burns on prolonged exposure
    SecondDegreeRisk,
    /// Lethal exposure within the event duration
    PotentiallyLethal,
    /// Structural ignition and near-certain lethality
    Destructive,
}

/// One sample of the thermal radiation field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalSample {
    /// Distance from the fire centre (m)
    pub distance: f64,
    /// Direction from the source, degrees from east, CCW positive
    pub angle: f64,
    /// Incident heat flux (W/m²)
    pub heat_flux: f64,
    /// Damage band for this flux
    pub damage: ThermalDamageCategory,
    /// Stoll-curve time to pain (s); `None` when never reached
    pub time_to_pain: Option<f64>,
    /// Stoll-curve time to second-degree burn (s); `None` when never reached
    pub time_to_second_degree: Option<f64>,
    /// Eisenberg probit lethality probability over the event duration
    pub lethality_probability: f64,
}

/// Blast damage band for one overpressure sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlastDamageCategory {
    /// No appreciable damage
    Negligible,
    /// Window glass breakage
    GlassBreakage,
    /// Minor structural damage, injuries from debris
    MinorDamage,
    /// Partial collapse of houses, serious injuries
    MajorDamage,
    /// Total destruction of most buildings
    Destruction,
}

/// One sample of the blast overpressure field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlastSample {
    /// Distance from the explosion centre (m)
    pub distance: f64,
    /// Direction from the source, degrees from east, CCW positive
    pub angle: f64,
    /// Peak side-on overpressure including ground reflection (Pa)
    pub overpressure: f64,
    /// Shock arrival time (s)
    pub arrival_time: f64,
    /// Shock Mach number at this distance
    pub mach: f64,
    /// Probit lethality probability
    pub lethality_probability: f64,
    /// Probit injury probability
    pub injury_probability: f64,
    /// Damage band for this overpressure
    pub damage: BlastDamageCategory,
}

/// Severity ladder assigned to a receptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    /// Below every guideline fraction of concern
    NoEffect,
    /// Above a tenth of a guideline but below tier 1
    Mild,
    /// At or above tier-1 guidelines
    Notable,
    /// At or above tier-2 guidelines
    Disabling,
    /// At or above tier-3 guidelines
    LifeThreatening,
}

/// Fraction of one guideline reached at a receptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidelineFraction {
    /// Guideline label, e.g. "AEGL-2 (60 min)"
    pub guideline: String,
    /// Peak concentration divided by the guideline value
    pub fraction: f64,
}

/// Everything the engine knows about one receptor after a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceptorExposure {
    /// Receptor name as supplied
    pub name: String,
    /// Peak concentration over the run (mg/m³)
    pub peak: f64,
    /// Time-weighted average over the exposure window (mg/m³)
    pub time_weighted_average: f64,
    /// Time-integrated dose (mg·s/m³)
    pub integrated_dose: f64,
    /// First time the threshold was reached (s); `None` when never
    pub arrival_time: Option<f64>,
    /// Time of the peak concentration (s)
    pub peak_time: f64,
    /// Total time above the threshold (s)
    pub duration_above_threshold: f64,
    /// Assigned severity
    pub impact_level: ImpactLevel,
    /// Peak as a fraction of every applicable guideline
    pub guideline_fractions: Vec<GuidelineFraction>,
}

/// Run-level diagnostics, returned on success and failure alike.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Human-readable warnings accumulated across all stages
    pub warnings: Vec<String>,
    /// False when any iterative stage hit its step cap before settling
    pub converged: bool,
    /// Order-of-magnitude relative uncertainty of the computed fields
    pub uncertainty: f64,
}

/// The complete output document of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResult {
    /// Dispersion model that ran
    pub model_selected: ModelKind,
    /// Stability class used
    pub pasquill_class: PasquillClass,
    /// Surface friction velocity (m/s)
    pub friction_velocity: f64,
    /// Mixing height used (m)
    pub mixing_height: f64,
    /// Source-strength solution
    pub release_frames: Vec<ReleaseFrame>,
    /// Concentration field; absent for fire and blast strategies
    pub dispersion_grid: Option<DispersionGrid>,
    /// Iso-level footprints (toxic, flammable, thermal, blast zones)
    pub contours: Vec<Contour>,
    /// Thermal radiation field; present for fire strategies
    pub thermal_field: Option<Vec<ThermalSample>>,
    /// Blast field; present for the explosion strategy
    pub blast_field: Option<Vec<BlastSample>>,
    /// Per-receptor exposure summary
    pub receptor_exposures: Vec<ReceptorExposure>,
    /// Warnings, convergence and uncertainty
    pub diagnostics: Diagnostics,
}
