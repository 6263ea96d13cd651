//! Universal physics invariants
//!
//! Properties that must hold for all valid inputs, checked on concrete
//! instances:
//!
//! 1. Released mass accounts for the rate integral to 1%
//! 2. Gaussian centreline matches its closed form to 1e-6 relative
//! 3. Contour area is monotone non-increasing in level
//! 4. ppm/mg conversions are an involution to 1e-9 relative
//! 5. Haversine anchors (identity, antipodes)
//! 6. Concentrations and doses are linear in the emission rate
//! 7. Receptor results are independent of receptor order
//! 8. Kingery-Bulmash is continuous across its breakpoints
//! 9. The sphere view factor is bounded and has the right limits
//! 10. Runs are bitwise reproducible

use hazard_sim_core::core_types::units;
use hazard_sim_core::core_types::{
    ChemicalProperties, GeoPoint, Receptor, Scenario, SourceGeometry, WeatherSnapshot,
};
use hazard_sim_core::{compute, ComputeOptions, ConcentrationLevel, Request};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

const SOURCE: GeoPoint = GeoPoint { latitude: -32.0, longitude: 115.9, elevation: 0.0 };

fn level(value: f64, label: &str) -> ConcentrationLevel {
    ConcentrationLevel {
        value,
        units: hazard_sim_core::core_types::ConcentrationUnits::MgPerM3,
        label: label.to_owned(),
    }
}

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

/// Passive ammonia release in neutral conditions; extents pinned so that
/// runs with different rates share grid geometry.
fn passive_request(rate: f64) -> Request {
    Request {
        scenario: Scenario::toxic(
            SourceGeometry::Direct { rate, area: 1.0, velocity: 0.0 },
            SOURCE,
            1800.0,
        ),
        weather: WeatherSnapshot::neutral(5.0, 270.0, 293.15),
        chemical: ChemicalProperties::ammonia(),
        toxicology: None,
        receptors: vec![receptor_at("sentinel", 800.0, 50.0)],
        options: ComputeOptions {
            max_downwind_m: 2000.0,
            concentration_levels: vec![level(1.0, "loc")],
            ..ComputeOptions::default()
        },
    }
}

#[test]
fn invariant_1_mass_balance() {
    let request = passive_request(2.5);
    let result = compute(&request).unwrap();
    let dt = 60.0;
    let released: f64 = result.release_frames.iter().map(|f| f.mass_flow * dt).sum();
    let expected = 2.5 * 1800.0;
    assert!(
        (released - expected).abs() / expected < 0.01,
        "mass balance off: {released:.1} kg vs {expected:.1} kg"
    );
}

#[test]
fn invariant_2_gaussian_centreline_closed_form() {
    use hazard_sim_core::dispersion::gaussian::{concentration, PlumeParams};
    let params = PlumeParams {
        q: 1.0,
        effective_height: 0.0,
        wind_speed: 5.0,
        mixing_height: None,
        decay_constant: None,
        deposition_velocity: None,
    };
    for (sy, sz) in [(10.0, 4.0), (76.0, 32.0), (300.0, 120.0)] {
        let c = concentration(&params, 1000.0, 0.0, 0.0, sy, sz);
        let closed_form = 1.0 / (std::f64::consts::PI * sy * sz * 5.0);
        assert!(
            (c - closed_form).abs() / closed_form < 1e-6,
            "centreline {c:.3e} vs closed form {closed_form:.3e}"
        );
    }
}

#[test]
fn invariant_3_contour_area_monotone_in_level() {
    let mut request = passive_request(5.0);
    request.options.concentration_levels =
        vec![level(2.0, "low"), level(10.0, "mid"), level(40.0, "high")];
    let result = compute(&request).unwrap();

    // Sum ring areas per level at the first time step
    let area_at = |value: f64| -> f64 {
        result
            .contours
            .iter()
            .filter(|c| c.level == value && c.time_index == 0)
            .map(|c| c.area_m2)
            .sum()
    };
    let low = area_at(2.0);
    let mid = area_at(10.0);
    let high = area_at(40.0);
    assert!(low > 0.0, "the lowest level must produce a footprint");
    assert!(low >= mid && mid >= high, "areas must not grow with level: {low} {mid} {high}");
}

#[test]
fn invariant_4_concentration_conversion_involution() {
    for (value, mw, t, p) in [
        (1.0, 17.03, 298.15, 101_325.0),
        (123.456, 70.9, 263.0, 85_000.0),
        (0.002, 78.11, 310.0, 101_325.0),
    ] {
        let round_trip =
            units::mg_per_m3_to_ppm(units::ppm_to_mg_per_m3(value, mw, t, p), mw, t, p);
        assert!(
            (round_trip - value).abs() / value < 1e-9,
            "involution broke: {value} -> {round_trip}"
        );
    }
}

#[test]
fn invariant_5_haversine_anchors() {
    use hazard_sim_core::core_types::geo::{haversine_distance, EARTH_RADIUS};
    let p = GeoPoint::new(12.34, -56.78);
    assert_eq!(haversine_distance(&p, &p), 0.0);

    let antipode = GeoPoint::new(-12.34, 180.0 - 56.78);
    let expected = std::f64::consts::PI * EARTH_RADIUS;
    assert!((haversine_distance(&p, &antipode) - expected).abs() < 1.0);
}

#[test]
fn invariant_6_linearity_in_emission_rate() {
    let single = compute(&passive_request(1.0)).unwrap();
    let double = compute(&passive_request(2.0)).unwrap();

    let g1 = single.dispersion_grid.unwrap();
    let g2 = double.dispersion_grid.unwrap();
    assert_eq!(g1.xs.len(), g2.xs.len(), "pinned extents must match");
    for (a, b) in g1.concentrations.iter().zip(&g2.concentrations) {
        if *a > 0.0 {
            assert!(((b / a) - 2.0).abs() < 1e-9, "cell not doubled: {a} -> {b}");
        }
    }

    let dose1 = single.receptor_exposures[0].integrated_dose;
    let dose2 = double.receptor_exposures[0].integrated_dose;
    assert!(
        ((dose2 / dose1) - 2.0).abs() < 1e-9,
        "receptor dose not doubled: {dose1} -> {dose2}"
    );
}

#[test]
fn invariant_7_receptor_order_independence() {
    let mut forward = passive_request(1.0);
    forward.receptors = vec![receptor_at("a", 500.0, 0.0), receptor_at("b", 900.0, -120.0)];
    let mut reversed = passive_request(1.0);
    reversed.receptors = vec![receptor_at("b", 900.0, -120.0), receptor_at("a", 500.0, 0.0)];

    let f = compute(&forward).unwrap();
    let r = compute(&reversed).unwrap();
    assert_eq!(f.receptor_exposures[0], r.receptor_exposures[1]);
    assert_eq!(f.receptor_exposures[1], r.receptor_exposures[0]);
}

#[test]
fn invariant_8_kingery_bulmash_continuity() {
    use hazard_sim_core::blast::kingery::{overpressure, Z_FAR, Z_NEAR};
    for z in [Z_NEAR, Z_FAR] {
        let below = overpressure(z * 0.999);
        let above = overpressure(z * 1.001);
        let gap = (below - above).abs() / above;
        assert!(gap < 0.05, "curve jumps {gap:.4} at Z = {z}");
    }
}

#[test]
fn invariant_9_sphere_view_factor_limits() {
    use hazard_sim_core::thermal::view_factor::sphere_to_point;
    let radius = 40.0;
    // Bounded by one at every distance
    let mut last = 1.0;
    for i in 0..1000 {
        let l = radius + f64::from(i) * 5.0;
        let f = sphere_to_point(radius, l);
        assert!((0.0..=1.0).contains(&f));
        assert!(f <= last);
        last = f;
    }
    // Limits: 1 at the surface, 0 at infinity
    assert_eq!(sphere_to_point(radius, radius), 1.0);
    assert!(sphere_to_point(radius, 1e9) < 1e-12);
}

#[test]
fn invariant_10_bitwise_reproducibility() {
    let request = passive_request(1.5);
    let first = compute(&request).unwrap();
    let second = compute(&request).unwrap();
    // The full result documents are identical, including every
    // parallel-filled grid cell
    assert_eq!(first, second);

    // And the result document survives serialisation for the caller's
    // persistence layer
    let json = serde_json::to_string(&first).unwrap();
    let back: hazard_sim_core::EngineResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, first);
}
