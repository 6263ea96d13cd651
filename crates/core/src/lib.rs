//! Hazard Consequence Modelling Engine
//!
//! A scientific-computing core that turns a chemical release scenario and a
//! weather observation into ground-level hazard fields: atmospheric
//! dispersion (Gaussian plume and dense-gas slab), thermal radiation from
//! fires (BLEVE fireball, jet, pool, flash fire), and vapor cloud explosion
//! blast (BST/TNT equivalence with Kingery-Bulmash) — plus the impact
//! zones, receptor exposures and casualty probabilities derived from them.
//!
//! The engine is pure computation: it consumes a [`Request`] and produces an
//! [`EngineResult`]. Persistence, transport and rendering are caller
//! concerns.
//!
//! ```
//! use hazard_sim_core::{compute, ComputeOptions, Request};
//! use hazard_sim_core::core_types::{ChemicalProperties, GeoPoint, Scenario, SourceGeometry, WeatherSnapshot};
//!
//! let request = Request {
//!     scenario: Scenario::toxic(
//!         SourceGeometry::Direct { rate: 1.0, area: 1.0, velocity: 0.0 },
//!         GeoPoint::new(-32.0, 115.9),
//!         600.0,
//!     ),
//!     weather: WeatherSnapshot::neutral(5.0, 270.0, 293.15),
//!     chemical: ChemicalProperties::chlorine(),
//!     toxicology: None,
//!     receptors: Vec::new(),
//!     options: ComputeOptions::default(),
//! };
//! let result = compute(&request).unwrap();
//! assert!(result.dispersion_grid.is_some());
//! ```

pub mod atmosphere;
pub mod blast;
pub mod chemistry;
pub mod contour;
pub mod core_types;
pub mod dispersion;
pub mod engine;
pub mod receptor;
pub mod source;
pub mod thermal;

// Re-export the public entry points and principal documents
pub use core_types::output::{
    BlastSample, Contour, ContourType, Diagnostics, DispersionGrid, EngineResult, ImpactLevel,
    ModelKind, ReceptorExposure, ReleaseFrame, ThermalSample,
};
pub use engine::{
    compute, compute_with_sink, CancellationToken, ComputeOptions, ConcentrationLevel,
    EngineError, EngineEvent, Request,
};
