//! Small numerical helpers shared across the solvers
//!
//! The standard library has no error function, and both the thermal and
//! blast engines need the normal CDF to turn probit values into
//! probabilities. The contour extractor and the heavy-gas hand-off both need
//! a scalar root bracketing search. Everything here is deterministic and
//! allocation-free.

/// Error function by the Abramowitz & Stegun 7.1.26 rational approximation.
///
/// Maximum absolute error 1.5e-7, more than enough for probit probabilities.
pub fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

/// Standard normal cumulative distribution function.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Convert a probit value to a probability: `Φ((Pr − 5) / √2)`.
///
/// The historical probit scale centres 50% response at Pr = 5.
pub fn probit_to_probability(probit: f64) -> f64 {
    normal_cdf((probit - 5.0) / std::f64::consts::SQRT_2)
}

/// Bisection root search for `f(r) = target` on `[lo, hi]`.
///
/// Requires `f` monotone over the bracket. Returns `None` when the target is
/// not bracketed. Converges to `tolerance` on the abscissa.
pub fn bisect_to<F>(f: F, target: f64, lo: f64, hi: f64, tolerance: f64) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let f_lo = f(lo) - target;
    let f_hi = f(hi) - target;
    if f_lo == 0.0 {
        return Some(lo);
    }
    if f_hi == 0.0 {
        return Some(hi);
    }
    if f_lo.signum() == f_hi.signum() {
        return None;
    }

    let mut lo = lo;
    let mut hi = hi;
    let mut f_lo = f_lo;
    // 200 iterations halves a 10 km bracket far below any useful tolerance
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid) - target;
        if f_mid == 0.0 || (hi - lo) < tolerance {
            return Some(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Some(0.5 * (lo + hi))
}

/// True when every value in the slice is finite.
pub fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_erf_reference_values() {
        assert_relative_eq!(erf(0.0), 0.0);
        assert_relative_eq!(erf(1.0), 0.8427008, max_relative = 1e-5);
        assert_relative_eq!(erf(-1.0), -0.8427008, max_relative = 1e-5);
        assert_relative_eq!(erf(2.0), 0.9953223, max_relative = 1e-5);
    }

    #[test]
    fn test_normal_cdf_symmetry() {
        assert_relative_eq!(normal_cdf(0.0), 0.5, max_relative = 1e-9);
        let p = normal_cdf(1.2816);
        assert_relative_eq!(p, 0.9, max_relative = 1e-3);
        assert_relative_eq!(normal_cdf(-1.2816), 1.0 - p, max_relative = 1e-5);
    }

    #[test]
    fn test_probit_scale_centre() {
        // Pr = 5 is 50% response by construction
        assert_relative_eq!(probit_to_probability(5.0), 0.5, max_relative = 1e-9);
        assert!(probit_to_probability(2.67) < 0.06);
        assert!(probit_to_probability(7.33) > 0.94);
    }

    #[test]
    fn test_bisect_finds_sqrt() {
        let root = bisect_to(|x| x * x, 2.0, 0.0, 2.0, 1e-10).unwrap();
        assert_relative_eq!(root, std::f64::consts::SQRT_2, max_relative = 1e-8);
    }

    #[test]
    fn test_bisect_unbracketed_returns_none() {
        assert!(bisect_to(|x| x, 10.0, 0.0, 1.0, 1e-6).is_none());
    }

    #[test]
    fn test_all_finite_catches_nan() {
        assert!(all_finite(&[1.0, 0.0, -5.0]));
        assert!(!all_finite(&[1.0, f64::NAN]));
        assert!(!all_finite(&[f64::INFINITY]));
    }
}
