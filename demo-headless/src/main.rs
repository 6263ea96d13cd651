//! Headless hazard modelling demo
//!
//! Runs one of several canned release incidents through the engine and
//! prints a summary of the computed hazard footprint.

use clap::{Parser, ValueEnum};
use hazard_sim_core::core_types::{
    ChemicalProperties, DurationSeries, GeoPoint, GroundSurface, HazardKind, Receptor, Scenario,
    SourceGeometry, TerrainRoughness, ToxicologicalGuidelines, WeatherSnapshot,
};
use hazard_sim_core::{compute, ComputeOptions, ConcentrationLevel, EngineResult, Request};

/// Canned incident presets
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Incident {
    /// Chlorine tank blowdown with dense-gas dispersion
    ChlorineTank,
    /// Benzene pool evaporating into a Gaussian plume
    BenzenePool,
    /// 10-tonne propane BLEVE fireball
    PropaneBleve,
    /// Vapor cloud explosion of a congested propane cloud
    PropaneVce,
}

#[derive(Parser, Debug)]
#[command(name = "demo-headless")]
#[command(about = "Hazard consequence modelling demo", long_about = None)]
struct Args {
    /// Incident preset to run
    #[arg(short, long, value_enum, default_value_t = Incident::ChlorineTank)]
    incident: Incident,

    /// Release duration in seconds
    #[arg(short, long, default_value_t = 1800.0)]
    duration: f64,

    /// Wind speed at 10 m (m/s)
    #[arg(short, long, default_value_t = 5.0)]
    wind: f64,

    /// Print every receptor exposure in detail
    #[arg(short = 'v', long, default_value_t = false)]
    verbose: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let request = build_request(&args);

    match compute(&request) {
        Ok(result) => print_summary(&result, &args),
        Err(err) => {
            eprintln!("run failed: {err}");
            std::process::exit(1);
        }
    }
}

fn build_request(args: &Args) -> Request {
    let source_location = GeoPoint::new(-32.05, 115.92);
    let weather = WeatherSnapshot::neutral(args.wind, 270.0, 293.15);

    let receptors = vec![
        receptor("fence line", &source_location, 200.0, 0.0),
        receptor("control room", &source_location, 500.0, 80.0),
        receptor("neighbourhood", &source_location, 1500.0, -200.0),
    ];

    let (scenario, chemical, toxicology) = match args.incident {
        Incident::ChlorineTank => (
            Scenario {
                hazard: HazardKind::ToxicRelease,
                source: SourceGeometry::Tank {
                    volume: 15.0,
                    height: 3.0,
                    pressure: 6.8e5,
                    temperature: 293.15,
                    liquid_level: 0.0,
                    hole_area: 2e-3,
                    hole_height: 1.0,
                },
                release_height: 1.0,
                location: source_location,
                reference_height: 10.0,
                duration: args.duration,
                terrain: TerrainRoughness::OpenCountry,
            },
            ChemicalProperties::chlorine(),
            Some(chlorine_guidelines()),
        ),
        Incident::BenzenePool => (
            Scenario {
                hazard: HazardKind::ToxicRelease,
                source: SourceGeometry::Puddle {
                    area: 25.0,
                    depth: 0.02,
                    temperature: 293.15,
                    surface: GroundSurface::Concrete,
                    solution_fraction: None,
                },
                release_height: 0.0,
                location: source_location,
                reference_height: 10.0,
                duration: args.duration,
                terrain: TerrainRoughness::OpenCountry,
            },
            ChemicalProperties::benzene(),
            None,
        ),
        Incident::PropaneBleve => (
            Scenario {
                hazard: HazardKind::BleveFireball { mass: 10_000.0 },
                source: SourceGeometry::Direct { rate: 10.0, area: 1.0, velocity: 0.0 },
                release_height: 0.0,
                location: source_location,
                reference_height: 10.0,
                duration: args.duration,
                terrain: TerrainRoughness::OpenCountry,
            },
            ChemicalProperties::propane(),
            None,
        ),
        Incident::PropaneVce => (
            Scenario {
                hazard: HazardKind::VaporCloudExplosion {
                    flammable_mass: Some(800.0),
                    congestion: 0.4,
                    confinement: 0.2,
                    ignition_height: 0.0,
                },
                source: SourceGeometry::Direct { rate: 10.0, area: 1.0, velocity: 0.0 },
                release_height: 0.0,
                location: source_location,
                reference_height: 10.0,
                duration: args.duration,
                terrain: TerrainRoughness::OpenCountry,
            },
            ChemicalProperties::propane(),
            None,
        ),
    };

    Request {
        scenario,
        weather,
        chemical,
        toxicology,
        receptors,
        options: ComputeOptions {
            extrapolate: true,
            concentration_levels: vec![ConcentrationLevel {
                value: 3.0,
                units: hazard_sim_core::core_types::ConcentrationUnits::MgPerM3,
                label: "level of concern".to_owned(),
            }],
            ..ComputeOptions::default()
        },
    }
}

fn receptor(name: &str, origin: &GeoPoint, east: f64, north: f64) -> Receptor {
    Receptor {
        name: name.to_owned(),
        point: GeoPoint {
            latitude: origin.latitude + north / 111_320.0,
            longitude: origin.longitude + east / (111_320.0 * origin.latitude.to_radians().cos()),
            elevation: 0.0,
        },
        height: 1.5,
    }
}

/// Chlorine AEGL values (ppm) at the five standard durations.
fn chlorine_guidelines() -> ToxicologicalGuidelines {
    let mut tox = ToxicologicalGuidelines::empty();
    tox.units = hazard_sim_core::core_types::ConcentrationUnits::Ppm;
    tox.aegl[0] = DurationSeries { values: [Some(0.5); 5] };
    tox.aegl[1] = DurationSeries {
        values: [Some(2.8), Some(2.8), Some(2.0), Some(1.0), Some(0.71)],
    };
    tox.aegl[2] = DurationSeries {
        values: [Some(50.0), Some(28.0), Some(20.0), Some(10.0), Some(7.1)],
    };
    tox.idlh = Some(10.0);
    tox
}

fn print_summary(result: &EngineResult, args: &Args) {
    println!("=== Hazard summary ===");
    println!("model:             {:?}", result.model_selected);
    println!("stability class:   {}", result.pasquill_class);
    println!("friction velocity: {:.3} m/s", result.friction_velocity);
    println!("mixing height:     {:.0} m", result.mixing_height);

    let peak_rate = result.release_frames.iter().map(|f| f.mass_flow).fold(0.0, f64::max);
    println!("peak release rate: {peak_rate:.3} kg/s over {} frames", result.release_frames.len());

    if let Some(grid) = &result.dispersion_grid {
        println!(
            "grid:              {} x {} x {} cells, {:.0} m downwind",
            grid.times.len(),
            grid.xs.len(),
            grid.ys.len(),
            grid.xs.last().copied().unwrap_or(0.0)
        );
    }

    println!("contours:          {}", result.contours.len());
    for contour in &result.contours {
        println!(
            "  [{:>9.3}] {:<28} area {:>12.0} m², reach {:>6.0} m",
            contour.level, contour.label, contour.area_m2, contour.max_downwind_m
        );
    }

    println!("receptors:");
    for exposure in &result.receptor_exposures {
        println!(
            "  {:<14} peak {:>10.3}  impact {:?}",
            exposure.name, exposure.peak, exposure.impact_level
        );
        if args.verbose {
            for fraction in &exposure.guideline_fractions {
                println!("      {:<32} {:>8.3}", fraction.guideline, fraction.fraction);
            }
        }
    }

    if !result.diagnostics.warnings.is_empty() {
        println!("warnings:");
        for warning in &result.diagnostics.warnings {
            println!("  - {warning}");
        }
    }
    println!(
        "uncertainty: {:.2}  converged: {}",
        result.diagnostics.uncertainty, result.diagnostics.converged
    );
}
