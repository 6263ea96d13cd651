//! Pasquill-Gifford dispersion coefficients
//!
//! Lateral spread follows the ALOHA class-factor form
//! `σ_y = c · x · (1 + 10⁻⁴·x)^(−1/2)`; vertical spread follows the
//! Martin (1976) power-law fits to the Pasquill-Gifford curves with
//! separate coefficient rows below and above one kilometre. Both are for
//! open-country terrain, `x` in metres.
//!
//! # References
//! - Martin, D.O. (1976). "Comment on the change of concentration standard
//!   deviations with distance." JAPCA, 26(2), 145-147.
//! - Gifford, F.A. (1976). "Turbulent diffusion-typing schemes: a review."
//!   Nuclear Safety, 17(1), 68-86.

use crate::core_types::weather::PasquillClass;

/// Floor for either coefficient (m); keeps near-source cells finite.
const SIGMA_FLOOR: f64 = 0.5;

/// Cap on the vertical coefficient (m); the PG curves are not defined
/// beyond a few kilometres of vertical spread.
const SIGMA_Z_CAP: f64 = 5000.0;

/// Lateral coefficient class factors for σ_y = c·x·(1+1e-4·x)^(-1/2).
fn sigma_y_factor(class: PasquillClass) -> f64 {
    match class {
        PasquillClass::A => 0.22,
        PasquillClass::B => 0.16,
        PasquillClass::C => 0.11,
        PasquillClass::D => 0.08,
        PasquillClass::E => 0.06,
        PasquillClass::F => 0.04,
    }
}

/// Martin coefficient row (a, b, c) for σ_z = a·x_km^b + c.
fn sigma_z_row(class: PasquillClass, x_km: f64) -> (f64, f64, f64) {
    let near = x_km <= 1.0;
    match class {
        PasquillClass::A => {
            if near { (440.8, 1.941, 9.27) } else { (459.7, 2.094, -9.6) }
        }
        PasquillClass::B => {
            if near { (106.6, 1.149, 3.3) } else { (108.2, 1.098, 2.0) }
        }
        PasquillClass::C => (61.0, 0.911, 0.0),
        PasquillClass::D => {
            if near { (33.2, 0.725, -1.7) } else { (44.5, 0.516, -13.0) }
        }
        PasquillClass::E => {
            if near { (22.8, 0.678, -1.3) } else { (55.4, 0.305, -34.0) }
        }
        PasquillClass::F => {
            if near { (14.35, 0.740, -0.35) } else { (62.6, 0.180, -48.6) }
        }
    }
}

/// Lateral dispersion coefficient σ_y (m) at downwind distance `x` (m).
pub fn sigma_y(class: PasquillClass, x: f64) -> f64 {
    if x <= 0.0 {
        return SIGMA_FLOOR;
    }
    (sigma_y_factor(class) * x * (1.0 + 1e-4 * x).powf(-0.5)).max(SIGMA_FLOOR)
}

/// Vertical dispersion coefficient σ_z (m) at downwind distance `x` (m).
pub fn sigma_z(class: PasquillClass, x: f64) -> f64 {
    if x <= 0.0 {
        return SIGMA_FLOOR;
    }
    let x_km = x / 1000.0;
    let (a, b, c) = sigma_z_row(class, x_km);
    (a * x_km.powf(b) + c).clamp(SIGMA_FLOOR, SIGMA_Z_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_class_d_at_one_kilometre() {
        // The neutral-class anchor values: sigma_y ~ 76 m, sigma_z ~ 32 m
        assert_relative_eq!(sigma_y(PasquillClass::D, 1000.0), 76.3, max_relative = 0.01);
        assert_relative_eq!(sigma_z(PasquillClass::D, 1000.0), 31.5, max_relative = 0.01);
    }

    #[test]
    fn test_unstable_spreads_more_than_stable() {
        for x in [200.0, 1000.0, 5000.0] {
            assert!(sigma_y(PasquillClass::A, x) > sigma_y(PasquillClass::F, x));
            assert!(sigma_z(PasquillClass::A, x) > sigma_z(PasquillClass::F, x));
        }
    }

    #[test]
    fn test_sigma_monotone_in_distance() {
        for class in [
            PasquillClass::A,
            PasquillClass::B,
            PasquillClass::C,
            PasquillClass::D,
            PasquillClass::E,
            PasquillClass::F,
        ] {
            let mut last_y = 0.0;
            let mut last_z = 0.0;
            for i in 1..200 {
                let x = f64::from(i) * 50.0;
                let sy = sigma_y(class, x);
                let sz = sigma_z(class, x);
                assert!(sy >= last_y, "sigma_y not monotone for {class} at {x}");
                assert!(sz >= last_z, "sigma_z not monotone for {class} at {x}");
                last_y = sy;
                last_z = sz;
            }
        }
    }

    #[test]
    fn test_martin_rows_continuous_at_one_kilometre() {
        for class in [
            PasquillClass::A,
            PasquillClass::B,
            PasquillClass::D,
            PasquillClass::E,
            PasquillClass::F,
        ] {
            let below = sigma_z(class, 999.9);
            let above = sigma_z(class, 1000.1);
            let gap = (above - below).abs() / below;
            assert!(gap < 0.02, "{class}: sigma_z jumps {gap:.3} across 1 km");
        }
    }

    #[test]
    fn test_near_source_floor() {
        assert_eq!(sigma_y(PasquillClass::D, 0.0), 0.5);
        assert_eq!(sigma_z(PasquillClass::F, 1.0), 0.5);
    }
}
