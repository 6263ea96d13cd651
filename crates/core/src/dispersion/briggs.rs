//! Briggs plume rise
//!
//! Buoyant rise in neutral and unstable air follows the "2/3 law"
//! `Δh = 1.6·F_b^(1/3)·x^(2/3)/u`, capped at the final rise reached at
//! `x_f = 3.5·x*`; in stable air the final rise is
//! `Δh = 2.6·(F_b/(u·s))^(1/3)` with the stability parameter
//! `s = (g/T)·dθ/dz`. Momentum rise is evaluated alongside and the larger
//! of the two wins.
//!
//! # References
//! - Briggs, G.A. (1969). "Plume Rise." USAEC Critical Review Series.
//! - Briggs, G.A. (1975). "Plume rise predictions." In: Lectures on Air
//!   Pollution and Environmental Impact Analyses, AMS, 59-111.

use crate::core_types::units::GRAVITY;
use crate::core_types::weather::PasquillClass;

/// Source exit parameters for plume rise.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExitConditions {
    /// Exit velocity (m/s)
    pub velocity: f64,
    /// Stack/orifice radius (m)
    pub radius: f64,
    /// Exit temperature (K)
    pub temperature: f64,
}

/// Buoyancy flux parameter `F_b = g·v·r²·(T_s − T_a)/T_s` (m⁴/s³).
///
/// Zero for releases at or below ambient temperature.
pub fn buoyancy_flux(exit: &ExitConditions, ambient_temperature: f64) -> f64 {
    if exit.temperature <= ambient_temperature || exit.velocity <= 0.0 {
        return 0.0;
    }
    GRAVITY
        * exit.velocity
        * exit.radius.powi(2)
        * (exit.temperature - ambient_temperature)
        / exit.temperature
}

/// Momentum flux parameter `F_m = v²·r²·T_a/T_s` (m⁴/s²).
pub fn momentum_flux(exit: &ExitConditions, ambient_temperature: f64) -> f64 {
    if exit.velocity <= 0.0 {
        return 0.0;
    }
    let t_s = exit.temperature.max(1.0);
    exit.velocity.powi(2) * exit.radius.powi(2) * ambient_temperature / t_s
}

/// Distance to final buoyant rise in neutral/unstable air.
fn final_rise_distance(f_b: f64) -> f64 {
    let x_star = if f_b < 55.0 { 14.0 * f_b.powf(5.0 / 8.0) } else { 34.0 * f_b.powf(2.0 / 5.0) };
    3.5 * x_star
}

/// Plume rise Δh (m) at downwind distance `x`.
pub fn plume_rise(
    class: PasquillClass,
    exit: &ExitConditions,
    ambient_temperature: f64,
    wind_speed: f64,
    x: f64,
) -> f64 {
    let u = wind_speed.max(0.5);
    let f_b = buoyancy_flux(exit, ambient_temperature);
    let f_m = momentum_flux(exit, ambient_temperature);

    let buoyant = if f_b <= 0.0 {
        0.0
    } else if class.is_stable() {
        let s = GRAVITY / ambient_temperature * class.potential_temperature_gradient();
        2.6 * (f_b / (u * s)).powf(1.0 / 3.0)
    } else {
        // Gradual 2/3-law rise up to the final-rise distance
        let x_eff = x.max(1.0).min(final_rise_distance(f_b));
        1.6 * f_b.powf(1.0 / 3.0) * x_eff.powf(2.0 / 3.0) / u
    };

    let momentum = if f_m <= 0.0 {
        0.0
    } else if class.is_stable() {
        let s = GRAVITY / ambient_temperature * class.potential_temperature_gradient();
        1.5 * (f_m / (u * s.sqrt())).powf(1.0 / 3.0)
    } else {
        // 3·d·v/u with d the exit diameter
        6.0 * exit.radius * exit.velocity / u
    };

    buoyant.max(momentum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hot_stack() -> ExitConditions {
        ExitConditions { velocity: 15.0, radius: 1.0, temperature: 400.0 }
    }

    #[test]
    fn test_ambient_release_has_no_rise() {
        let exit = ExitConditions { velocity: 0.0, radius: 1.0, temperature: 293.0 };
        assert_eq!(plume_rise(PasquillClass::D, &exit, 293.0, 5.0, 1000.0), 0.0);
    }

    #[test]
    fn test_buoyant_rise_grows_then_saturates() {
        let exit = hot_stack();
        let near = plume_rise(PasquillClass::D, &exit, 288.0, 5.0, 100.0);
        let mid = plume_rise(PasquillClass::D, &exit, 288.0, 5.0, 1000.0);
        let far = plume_rise(PasquillClass::D, &exit, 288.0, 5.0, 50_000.0);
        assert!(near < mid);
        // Final rise reached: no further growth
        assert_eq!(mid.max(far), far);
        let very_far = plume_rise(PasquillClass::D, &exit, 288.0, 5.0, 100_000.0);
        assert_eq!(far, very_far);
    }

    #[test]
    fn test_stable_rise_below_neutral_final_rise() {
        let exit = hot_stack();
        let neutral = plume_rise(PasquillClass::D, &exit, 288.0, 5.0, 50_000.0);
        let stable = plume_rise(PasquillClass::F, &exit, 288.0, 5.0, 50_000.0);
        assert!(
            stable < neutral,
            "stable stratification should limit rise: {stable:.1} vs {neutral:.1}"
        );
        assert!(stable > 0.0);
    }

    #[test]
    fn test_wind_suppresses_rise() {
        let exit = hot_stack();
        let light = plume_rise(PasquillClass::D, &exit, 288.0, 2.0, 2000.0);
        let strong = plume_rise(PasquillClass::D, &exit, 288.0, 10.0, 2000.0);
        assert!(light > strong);
    }

    #[test]
    fn test_cold_jet_rises_on_momentum() {
        let exit = ExitConditions { velocity: 30.0, radius: 0.2, temperature: 288.0 };
        let rise = plume_rise(PasquillClass::D, &exit, 288.0, 5.0, 500.0);
        // 6 * 0.2 * 30 / 5 = 7.2 m of momentum rise
        assert!((rise - 7.2).abs() < 1e-9);
    }
}
