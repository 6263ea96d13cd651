//! End-to-end engine validation scenarios
//!
//! Each test drives the public `compute` entry with a fully specified
//! release and checks the outputs against hand-calculated or published
//! anchor values:
//!
//! 1. Neutral Gaussian point source (textbook centreline value)
//! 2. Benzene pool evaporation (rate band and evaporative cooling)
//! 3. 10-tonne propane BLEVE fireball (flux and burn time at 200 m)
//! 4. Vapor cloud explosion (yield, TNT mass, overpressure, arrival)
//! 5. Off-axis receptor against an AEGL-1 guideline
//! 6. Dense-gas selection and near-field enhancement for chlorine

use hazard_sim_core::core_types::{
    ChemicalProperties, DurationSeries, GeoPoint, GroundSurface, HazardKind, PasquillClass,
    Receptor, Scenario, SourceGeometry, TerrainRoughness, ToxicologicalGuidelines,
    WeatherSnapshot,
};
use hazard_sim_core::dispersion::ModelChoice;
use hazard_sim_core::{compute, ComputeOptions, ConcentrationLevel, ImpactLevel, ModelKind, Request};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

const SOURCE: GeoPoint = GeoPoint { latitude: -32.0, longitude: 115.9, elevation: 0.0 };

/// Scenario skeleton for the fire and blast hazards, which take their
/// energy from the hazard parameters rather than the source solver.
fn incident_scenario(hazard: HazardKind) -> Scenario {
    Scenario {
        hazard,
        source: SourceGeometry::Direct { rate: 10.0, area: 1.0, velocity: 0.0 },
        release_height: 0.0,
        location: SOURCE,
        reference_height: 10.0,
        duration: 600.0,
        terrain: TerrainRoughness::OpenCountry,
    }
}

/// Receptor `east`/`north` metres from the source.
fn receptor_at(name: &str, east: f64, north: f64) -> Receptor {
    Receptor {
        name: name.to_owned(),
        point: GeoPoint {
            latitude: SOURCE.latitude + north / 111_320.0,
            longitude: SOURCE.longitude
                + east / (111_320.0 * SOURCE.latitude.to_radians().cos()),
            elevation: 0.0,
        },
        height: 1.5,
    }
}

/// S1 conditions: 1 kg/s passive point source at ground level, class D,
/// 5 m/s at 10 m, wind from the west.
fn neutral_gaussian_request(rate: f64) -> Request {
    Request {
        scenario: Scenario::toxic(
            SourceGeometry::Direct { rate, area: 1.0, velocity: 0.0 },
            SOURCE,
            1800.0,
        ),
        weather: WeatherSnapshot::neutral(5.0, 270.0, 293.15),
        // Ammonia is lighter than air, so the passive model applies
        chemical: ChemicalProperties::ammonia(),
        toxicology: None,
        receptors: Vec::new(),
        options: ComputeOptions {
            concentration_levels: vec![ConcentrationLevel {
                value: 1.0,
                units: hazard_sim_core::core_types::ConcentrationUnits::MgPerM3,
                label: "level of concern".to_owned(),
            }],
            ..ComputeOptions::default()
        },
    }
}

#[test]
fn s1_neutral_gaussian_point_source() {
    let result = compute(&neutral_gaussian_request(1.0)).unwrap();
    assert_eq!(result.model_selected, ModelKind::Gaussian);
    assert_eq!(result.pasquill_class, PasquillClass::D);

    let grid = result.dispersion_grid.expect("toxic run produces a grid");
    let (ix, iy) = grid.nearest_cell(1000.0, 0.0).expect("1 km cell on the grid");

    // Dispersion coefficients at 1 km, class D
    let sigma_y = grid.sigma_y[ix];
    let sigma_z = grid.sigma_z[ix];
    assert!((sigma_y - 76.0).abs() / 76.0 < 0.05, "sigma_y = {sigma_y:.1}");
    assert!((sigma_z - 32.0).abs() / 32.0 < 0.05, "sigma_z = {sigma_z:.1}");

    // Centreline ground concentration ~ Q/(pi*sy*sz*u) ~ 26.2 mg/m³
    let c = grid.concentration(0, ix, iy);
    assert!((c - 26.2).abs() / 26.2 < 0.05, "centreline concentration = {c:.1} mg/m³");
}

#[test]
fn s2_benzene_pool_evaporation() {
    let request = Request {
        scenario: Scenario::toxic(
            SourceGeometry::Puddle {
                area: 10.0,
                depth: 0.03,
                temperature: 293.0,
                surface: GroundSurface::Concrete,
                solution_fraction: None,
            },
            SOURCE,
            1800.0,
        ),
        weather: WeatherSnapshot::neutral(3.0, 270.0, 293.0),
        chemical: ChemicalProperties::benzene(),
        toxicology: None,
        receptors: Vec::new(),
        options: ComputeOptions {
            extrapolate: true,
            concentration_levels: vec![ConcentrationLevel {
                value: 10.0,
                units: hazard_sim_core::core_types::ConcentrationUnits::MgPerM3,
                label: "level of concern".to_owned(),
            }],
            ..ComputeOptions::default()
        },
    };
    let result = compute(&request).unwrap();

    // Initial Brighton rate for 10 m² of benzene in a 3 m/s wind
    let initial_rate = result.release_frames[0].mass_flow;
    assert!(
        (0.05..=0.2).contains(&initial_rate),
        "initial evaporation rate {initial_rate:.3} kg/s outside [0.05, 0.2]"
    );

    // The pool cools toward its evaporative equilibrium within 30 minutes
    let last = result.release_frames.last().unwrap();
    assert!(last.temperature < 293.0, "pool should cool below ambient");
    let five_min_back = result.release_frames[result.release_frames.len() - 6].temperature;
    assert!(
        (last.temperature - five_min_back).abs() < 1.0,
        "pool temperature still moving fast at 30 min: {five_min_back:.1} -> {:.1} K",
        last.temperature
    );
}

#[test]
fn s3_propane_bleve_fireball() {
    use hazard_sim_core::thermal::dose;
    use hazard_sim_core::thermal::fireball;

    // Geometry correlations for 10 000 kg
    let diameter = fireball::fireball_diameter(10_000.0);
    let duration = fireball::fireball_duration(10_000.0);
    assert!((108.0..=126.0).contains(&diameter), "fireball diameter {diameter:.1} m");
    assert!((8.0..=10.0).contains(&duration), "fireball duration {duration:.1} s");

    let request = Request {
        scenario: incident_scenario(HazardKind::BleveFireball { mass: 10_000.0 }),
        weather: WeatherSnapshot::neutral(5.0, 270.0, 293.15),
        chemical: ChemicalProperties::propane(),
        toxicology: None,
        receptors: vec![receptor_at("200 m", 200.0, 0.0)],
        options: ComputeOptions::default(),
    };
    let result = compute(&request).unwrap();

    assert!(result.thermal_field.is_some());
    let exposure = &result.receptor_exposures[0];
    let q = exposure.peak;
    assert!(
        (35_000.0..=60_000.0).contains(&q),
        "incident flux at 200 m is {:.1} kW/m²",
        q / 1000.0
    );
    let t_burn = dose::time_to_dose(q, dose::SECOND_DEGREE_DOSE).unwrap();
    assert!(t_burn <= 8.0, "time to second-degree burn {t_burn:.1} s");
}

#[test]
fn s4_vapor_cloud_explosion() {
    use hazard_sim_core::blast::tnt;

    // A process stream at 7 MJ/kg, medium reactivity
    let mut chemical = ChemicalProperties::propane();
    chemical.heat_of_combustion = Some(7e6);
    chemical.reactivity = 3;

    let eta = tnt::efficiency(3, 0.3, 0.2);
    assert!((0.1..=0.25).contains(&eta), "yield efficiency {eta:.3}");
    let tnt_mass = tnt::tnt_equivalent_mass(500.0, 7e6, eta);
    assert!((50.0..=180.0).contains(&tnt_mass), "TNT equivalent {tnt_mass:.0} kg");

    let request = Request {
        scenario: incident_scenario(HazardKind::VaporCloudExplosion {
            flammable_mass: Some(500.0),
            congestion: 0.3,
            confinement: 0.2,
            ignition_height: 0.0,
        }),
        weather: WeatherSnapshot::neutral(5.0, 270.0, 293.15),
        chemical,
        toxicology: None,
        receptors: vec![receptor_at("100 m", 100.0, 0.0)],
        options: ComputeOptions::default(),
    };
    let result = compute(&request).unwrap();

    let exposure = &result.receptor_exposures[0];
    assert!(
        (10_000.0..=40_000.0).contains(&exposure.peak),
        "overpressure at 100 m is {:.1} kPa",
        exposure.peak / 1000.0
    );
    let arrival = exposure.arrival_time.unwrap();
    assert!(
        (0.2..=0.5).contains(&arrival),
        "shock arrival at 100 m is {arrival:.2} s"
    );
}

#[test]
fn s5_off_axis_receptor_against_aegl1() {
    let mut tox = ToxicologicalGuidelines::empty();
    tox.aegl[0] = DurationSeries::uniform(5.0); // AEGL-1 = 5 mg/m³

    let mut request = neutral_gaussian_request(1.0);
    request.toxicology = Some(tox);
    // 500 m downwind (east), 100 m crosswind
    request.receptors = vec![receptor_at("off-axis", 500.0, 100.0)];

    let result = compute(&request).unwrap();
    let exposure = &result.receptor_exposures[0];

    assert_eq!(exposure.impact_level, ImpactLevel::Mild);
    let aegl_fraction = exposure
        .guideline_fractions
        .iter()
        .find(|f| f.guideline.starts_with("AEGL-1"))
        .expect("AEGL-1 fraction reported")
        .fraction;
    assert!(
        (0.1..1.0).contains(&aegl_fraction),
        "AEGL-1 fraction {aegl_fraction:.2} outside [0.1, 1.0)"
    );
}

#[test]
fn s6_chlorine_dense_gas_selection_and_enhancement() {
    let puddle = SourceGeometry::Puddle {
        area: 10.0,
        depth: 0.02,
        temperature: 293.15,
        surface: GroundSurface::Concrete,
        solution_fraction: None,
    };
    // 4.36 m/s at 10 m over open country gives u* = 0.3 m/s
    let base = Request {
        scenario: Scenario::toxic(puddle, SOURCE, 1800.0),
        weather: WeatherSnapshot::neutral(4.36, 270.0, 293.15),
        chemical: ChemicalProperties::chlorine(),
        toxicology: None,
        receptors: vec![receptor_at("100 m", 100.0, 0.0)],
        options: ComputeOptions {
            extrapolate: true,
            max_downwind_m: 3000.0,
            concentration_levels: vec![ConcentrationLevel {
                value: 10.0,
                units: hazard_sim_core::core_types::ConcentrationUnits::MgPerM3,
                label: "level of concern".to_owned(),
            }],
            ..ComputeOptions::default()
        },
    };

    let heavy = compute(&base).unwrap();
    assert_eq!(
        heavy.model_selected,
        ModelKind::HeavyGas,
        "chlorine pool with a 2.45 density ratio must select the dense-gas model"
    );

    let mut passive_request = base.clone();
    passive_request.options.model_override = ModelChoice::Gaussian;
    let passive = compute(&passive_request).unwrap();
    assert_eq!(passive.model_selected, ModelKind::Gaussian);

    let heavy_peak = heavy.receptor_exposures[0].peak;
    let passive_peak = passive.receptor_exposures[0].peak;
    assert!(
        heavy_peak >= 3.0 * passive_peak,
        "dense-gas ground concentration at 100 m ({heavy_peak:.0} mg/m³) should be at least \
         3x the passive prediction ({passive_peak:.0} mg/m³)"
    );
}
