//! Gaussian plume concentration kernel
//!
//! The classic bi-Gaussian plume with ground reflection, an optional
//! mixing-lid image-source series, and optional depletion and first-order
//! decay multipliers. Concentrations come back in the units of `q` per m³
//! (the engine feeds mg/s and reads mg/m³).

/// Parameters held fixed while evaluating one plume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlumeParams {
    /// Emission rate (mass/s)
    pub q: f64,
    /// Effective plume centreline height (m)
    pub effective_height: f64,
    /// Transport wind speed (m/s)
    pub wind_speed: f64,
    /// Mixing height (m); `None` disables the lid
    pub mixing_height: Option<f64>,
    /// First-order decay constant (1/s); `None` disables decay
    pub decay_constant: Option<f64>,
    /// Dry-deposition velocity (m/s); `None` disables depletion
    pub deposition_velocity: Option<f64>,
}

/// Image-source terms smaller than this fraction of the direct term are
/// truncated.
const IMAGE_TRUNCATION: f64 = 1e-6;

/// Once σ_z exceeds this multiple of the mixing height the profile is
/// treated as vertically uniform.
const WELL_MIXED_RATIO: f64 = 1.6;

/// Concentration at `(x, y, z)` for the given dispersion coefficients.
///
/// `x` is downwind (must be positive for a nonzero result), `y` crosswind,
/// `z` height above ground.
pub fn concentration(params: &PlumeParams, x: f64, y: f64, z: f64, sigma_y: f64, sigma_z: f64) -> f64 {
    if x <= 0.0 || params.q <= 0.0 {
        return 0.0;
    }
    let u = params.wind_speed.max(0.1);
    let h = params.effective_height;
    let lateral = (-y * y / (2.0 * sigma_y * sigma_y)).exp();

    let vertical = match params.mixing_height {
        Some(zi) if sigma_z > WELL_MIXED_RATIO * zi => {
            // Fully mixed through the boundary layer: uniform in z
            let c = params.q / ((2.0 * std::f64::consts::PI).sqrt() * sigma_y * u * zi) * lateral;
            return c * modifiers(params, x, sigma_z, u);
        }
        Some(zi) => reflected_vertical(z, h, sigma_z, zi),
        None => gaussian_pair(z - h, z + h, sigma_z),
    };

    let c = params.q / (2.0 * std::f64::consts::PI * sigma_y * sigma_z * u) * lateral * vertical;
    c * modifiers(params, x, sigma_z, u)
}

/// Direct plus ground-image vertical terms.
fn gaussian_pair(a: f64, b: f64, sigma_z: f64) -> f64 {
    let two_sz2 = 2.0 * sigma_z * sigma_z;
    (-a * a / two_sz2).exp() + (-b * b / two_sz2).exp()
}

/// Vertical term with the mixing-lid image series.
///
/// Image sources at `±2n·zi` reflect the plume between the ground and the
/// lid; the series truncates once a block falls below `1e-6` of the direct
/// term.
fn reflected_vertical(z: f64, h: f64, sigma_z: f64, zi: f64) -> f64 {
    let direct = gaussian_pair(z - h, z + h, sigma_z);
    let mut total = direct;
    let floor = direct.max(f64::MIN_POSITIVE) * IMAGE_TRUNCATION;
    for n in 1..=50 {
        let offset = 2.0 * f64::from(n) * zi;
        let block = gaussian_pair(z - offset - h, z + offset + h, sigma_z)
            + gaussian_pair(z + offset - h, z - offset + h, sigma_z);
        total += block;
        if block < floor {
            break;
        }
    }
    total
}

/// Decay and depletion multipliers.
fn modifiers(params: &PlumeParams, x: f64, sigma_z: f64, u: f64) -> f64 {
    let mut factor = 1.0;
    if let Some(lambda) = params.decay_constant {
        // First-order chemical decay over the travel time x/u
        factor *= (-lambda * x / u).exp();
    }
    if let Some(v_d) = params.deposition_velocity {
        // Source-depletion approximation for dry deposition
        factor *= (-(2.0 / std::f64::consts::PI).sqrt() * v_d * x / (u * sigma_z)).exp();
    }
    factor
}
