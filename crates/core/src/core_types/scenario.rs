//! Release scenario description
//!
//! A [`Scenario`] is an immutable input document: where the chemical comes
//! out, how, at what height, and what kind of hazard the run should model.
//! Source variants are a sum type so the solver dispatch is exhaustive and
//! the per-variant fields cannot be mixed up.

use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;

/// Default reference height for wind observations (m)
pub const DEFAULT_REFERENCE_HEIGHT: f64 = 10.0;

/// How the chemical leaves containment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceGeometry {
    /// Fixed release rate straight into the air
    Direct {
        /// Mass emission rate (kg/s)
        rate: f64,
        /// Emission cross-section (m²); sets the plume-rise stack radius
        area: f64,
        /// Exit velocity (m/s); zero for a passive area source
        velocity: f64,
    },
    /// Evaporating liquid pool on the ground
    Puddle {
        /// Pool surface area (m²)
        area: f64,
        /// Pool depth (m)
        depth: f64,
        /// Initial liquid temperature (K)
        temperature: f64,
        /// Substrate under the pool, sets ground-conduction properties
        surface: GroundSurface,
        /// Solute mass fraction when the pool is an aqueous solution
        solution_fraction: Option<f64>,
    },
    /// Pressurised vessel with a hole
    Tank {
        /// Total vessel volume (m³)
        volume: f64,
        /// Vessel height (m); the vessel is treated as a vertical cylinder
        height: f64,
        /// Absolute internal pressure (Pa)
        pressure: f64,
        /// Contents temperature (K)
        temperature: f64,
        /// Liquid level above the vessel floor (m); zero for an all-gas vessel
        liquid_level: f64,
        /// Hole area (m²)
        hole_area: f64,
        /// Hole elevation above the vessel floor (m)
        hole_height: f64,
    },
    /// Ruptured pipeline feeding a hole
    Pipeline {
        /// Pipe length upstream of the break (m)
        length: f64,
        /// Pipe internal diameter (m)
        diameter: f64,
        /// Line pressure (Pa)
        pressure: f64,
        /// Gas temperature (K)
        temperature: f64,
        /// Hole area (m²)
        hole_area: f64,
    },
}

impl SourceGeometry {
    /// Characteristic cloud height (m) for the heavy-gas Richardson test.
    ///
    /// Ground-hugging pools produce shallow clouds of order a metre; jets and
    /// orifice flows are taken at the momentum scale of the exit.
    pub fn characteristic_height(&self) -> f64 {
        match self {
            SourceGeometry::Puddle { .. } => 1.0,
            SourceGeometry::Direct { area, .. } => (area / std::f64::consts::PI).sqrt().max(1.0),
            SourceGeometry::Tank { hole_area, .. } | SourceGeometry::Pipeline { hole_area, .. } => {
                (hole_area / std::f64::consts::PI).sqrt().max(1.0)
            }
        }
    }

    /// True for sources that release at ground level as a dense blanket
    /// rather than a momentum jet.
    pub fn is_area_source(&self) -> bool {
        matches!(self, SourceGeometry::Puddle { .. })
    }
}

/// Substrate under an evaporating pool.
///
/// Sets the thermal product `√(k·ρ·c)` used by the transient ground-
/// conduction term of the pool energy balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundSurface {
    /// Concrete pad or paved ground
    Concrete,
    /// Dry soil
    DrySoil,
    /// Moist soil
    MoistSoil,
    /// Open water
    Water,
}

impl GroundSurface {
    /// Thermal inertia `√(k·ρ·c_p)` in J/(m²·K·s^½)
    pub fn thermal_inertia(self) -> f64 {
        match self {
            GroundSurface::Concrete => 2200.0,
            GroundSurface::DrySoil => 900.0,
            GroundSurface::MoistSoil => 1700.0,
            GroundSurface::Water => 1580.0,
        }
    }
}

/// The consequence model the run should evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HazardKind {
    /// Toxic vapor dispersion (Gaussian or heavy-gas, per model selection)
    ToxicRelease,
    /// Boiling-liquid expanding-vapor explosion fireball
    BleveFireball {
        /// Mass of fuel in the fireball (kg)
        mass: f64,
    },
    /// Ignited pressurised jet
    JetFire,
    /// Burning liquid pool
    PoolFire,
    /// Flash fire of a drifting flammable cloud
    FlashFire {
        /// Burning cloud volume (m³); derived from dispersion when absent
        cloud_volume: Option<f64>,
    },
    /// Vapor cloud explosion
    VaporCloudExplosion {
        /// Flammable mass (kg); integrated from dispersion when absent
        flammable_mass: Option<f64>,
        /// Obstacle congestion of the cloud volume, 0..1
        congestion: f64,
        /// Degree of confinement, 0..1
        confinement: f64,
        /// Ignition height above ground (m); sets the ground-reflection factor
        ignition_height: f64,
    },
}

/// Terrain roughness regime for the surface-layer wind profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainRoughness {
    /// Open fields, flat rural terrain (z₀ = 0.03 m)
    OpenCountry,
    /// Urban canopy or forest (z₀ = 1.0 m)
    UrbanForest,
    /// Open water; roughness follows wave state, `2.6e-6 · U₁₀^2.5`
    OpenWater,
}

impl TerrainRoughness {
    /// Aerodynamic roughness length z₀ (m). Open water depends on the
    /// 10 m wind speed through the wave field.
    pub fn roughness_length(self, wind_speed_10m: f64) -> f64 {
        match self {
            TerrainRoughness::OpenCountry => 0.03,
            TerrainRoughness::UrbanForest => 1.0,
            TerrainRoughness::OpenWater => (2.6e-6 * wind_speed_10m.powf(2.5)).max(1e-5),
        }
    }
}

/// Immutable release scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Consequence model to run
    pub hazard: HazardKind,
    /// Source geometry and its parameters
    pub source: SourceGeometry,
    /// Release height above ground (m)
    pub release_height: f64,
    /// Source position
    pub location: GeoPoint,
    /// Wind observation reference height (m)
    pub reference_height: f64,
    /// Release duration (s)
    pub duration: f64,
    /// Terrain regime around the source
    pub terrain: TerrainRoughness,
}

impl Scenario {
    /// Toxic-release scenario with the default 10 m reference height.
    pub fn toxic(source: SourceGeometry, location: GeoPoint, duration: f64) -> Self {
        Self {
            hazard: HazardKind::ToxicRelease,
            source,
            release_height: 0.0,
            location,
            reference_height: DEFAULT_REFERENCE_HEIGHT,
            duration,
            terrain: TerrainRoughness::OpenCountry,
        }
    }
}

/// A point of interest sampled against every computed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receptor {
    /// Display name carried through to the exposure record
    pub name: String,
    /// Position
    pub point: GeoPoint,
    /// Sampling height above ground (m), must be >= 0
    pub height: f64,
}
