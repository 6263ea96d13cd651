//! Radiative view factors
//!
//! Closed forms for the two flame shapes the engine uses: a sphere viewed
//! from a point (fireballs, flash fires) and a vertical cylinder viewed
//! from a ground-level vertical target (jet and pool fires).
//!
//! # References
//! - Beyler, C.L. (2002). "Fire hazard calculations for large, open
//!   hydrocarbon fires." SFPE Handbook, 3rd ed., §3-11.
//! - TNO (1992). "Methods for the calculation of physical effects"
//!   (Yellow Book), CPR 14E.

/// Sphere-to-point view factor `F = (R/L)²` with `L` the distance to the
/// sphere centre.
///
/// Tends to 1 as the receiver approaches the surface (`L → R`) and to 0 at
/// infinity; clamped so a receiver inside the fireball saturates at 1.
pub fn sphere_to_point(radius: f64, center_distance: f64) -> f64 {
    if radius <= 0.0 {
        return 0.0;
    }
    let l = center_distance.max(radius);
    (radius / l).powi(2)
}

/// Vertical-cylinder view factor to a vertical differential target at the
/// base plane (Beyler's closed form).
///
/// `radius` and `height` describe the flame cylinder; `axis_distance` is
/// from the cylinder axis to the target. Returns 0 for a degenerate flame
/// and saturates near the flame surface.
pub fn vertical_cylinder(radius: f64, height: f64, axis_distance: f64) -> f64 {
    if radius <= 0.0 || height <= 0.0 {
        return 0.0;
    }
    let h = height / radius;
    let s = (axis_distance / radius).max(1.001);

    let a = (1.0 + s).powi(2) + h * h;
    let b = (1.0 - s).powi(2) + h * h;

    let term1 = (1.0 / (std::f64::consts::PI * s)) * (h / (s * s - 1.0).sqrt()).atan();
    let term2 = (h / (std::f64::consts::PI * s))
        * (((a - 2.0 * s) / (a * b).sqrt())
            * ((a * (s - 1.0)) / (b * (s + 1.0))).sqrt().atan()
            - ((s - 1.0) / (s + 1.0)).sqrt().atan());

    (term1 + term2).clamp(0.0, 1.0)
}
