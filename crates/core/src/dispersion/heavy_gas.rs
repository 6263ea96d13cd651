//! Dense-gas slab model
//!
//! A ground-hugging release denser than air slumps into a wide, shallow,
//! gravity-spreading slab that resists vertical mixing. The model marches a
//! steady cross-section downwind: half-width grows by gravity spreading
//! `dW/dx = k_e·√(g′·h)/u_c`, volume flux grows by Richardson-suppressed
//! top entrainment and wind-driven edge entrainment, and the height follows
//! from continuity. Once the local Richardson number falls below critical
//! and the excess density is under one percent the slab hands off to the
//! passive Gaussian kernel through a virtual source that preserves its
//! second moments.
//!
//! # References
//! - Britter, R.E., McQuaid, J. (1988). "Workbook on the dispersion of
//!   dense gases." HSE Contract Research Report 17/1988.
//! - Havens, J., Spicer, T. (1985). "Development of an atmospheric
//!   dispersion model for heavier-than-air gas mixtures." (DEGADIS)

use crate::atmosphere::AtmosphericState;
use crate::core_types::math::bisect_to;
use crate::core_types::units::GRAVITY;
use crate::core_types::weather::PasquillClass;

use super::gaussian::{self, PlumeParams};
use super::sigma;

/// Critical Richardson number for the dense/passive hand-off.
pub const RI_CRITICAL: f64 = 2.0;

/// Excess density ratio below which the slab is passively buoyant.
pub const DENSITY_HANDOFF: f64 = 0.01;

/// Gravity-spreading constant `k_e`.
const SPREADING_CONSTANT: f64 = 1.0;

/// Top-entrainment scale `α_top` applied to the friction velocity.
const ALPHA_TOP: f64 = 0.4;

/// Richardson suppression factor in the top-entrainment denominator.
const TOP_SUPPRESSION: f64 = 30.0;

/// Edge-entrainment scale `α_edge` applied to the transport wind.
const ALPHA_EDGE: f64 = 0.005;

/// March step (m).
const MARCH_STEP: f64 = 5.0;

/// One marched cross-section of the slab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlabSection {
    /// Downwind position (m)
    pub x: f64,
    /// Slab half-width (m)
    pub half_width: f64,
    /// Slab height (m)
    pub height: f64,
    /// Uniform core concentration (kg/m³)
    pub concentration: f64,
    /// Mixture density (kg/m³)
    pub density: f64,
}

/// Virtual-source parameters of the passive hand-off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handoff {
    /// Downwind position of the hand-off (m)
    pub x: f64,
    /// Lateral second moment of the slab at hand-off (m)
    pub sigma_y0: f64,
    /// Vertical second moment of the slab at hand-off (m)
    pub sigma_z0: f64,
    /// Virtual downwind distance whose σ_y matches the slab (m)
    pub virtual_x_y: f64,
    /// Virtual downwind distance whose σ_z matches the slab (m)
    pub virtual_x_z: f64,
}

/// Marched dense-gas solution for one emission rate.
#[derive(Debug, Clone, PartialEq)]
pub struct HeavyGasPlume {
    /// Emission rate (kg/s)
    pub q: f64,
    sections: Vec<SlabSection>,
    handoff: Option<Handoff>,
    class: PasquillClass,
    transport_wind: f64,
}

impl HeavyGasPlume {
    /// March the slab from the source to `x_max`.
    ///
    /// `initial_half_width` and `initial_height` come from the source
    /// geometry (pool radius, characteristic cloud height); `vapor_density`
    /// is the pure-vapor density used to cap the core concentration.
    pub fn march(
        q: f64,
        vapor_density: f64,
        initial_half_width: f64,
        initial_height: f64,
        atmos: &AtmosphericState,
        x_max: f64,
    ) -> Self {
        let rho_a = atmos.air_density;
        let u_star = atmos.friction_velocity.max(1e-3);
        let transport_wind = atmos.wind_at(atmos.reference_height);

        let mut w = initial_half_width.max(0.5);
        // The slab starts as the vapor blanket over the source: thick enough
        // to carry the volumetric vapor flux, never thicker than the source
        // characteristic height
        let u_surface = atmos.wind_at(0.5);
        let blanket = q / (vapor_density * 2.0 * w * u_surface).max(1e-9);
        let mut h = blanket.clamp(0.1, initial_height.max(0.1));
        let mut u_c = atmos.wind_at((h / 2.0).max(0.5));
        let mut volume_flux = (2.0 * w * h * u_c).max(1e-6);
        let mut concentration = (q / volume_flux).min(vapor_density);

        let mut sections = Vec::with_capacity((x_max / MARCH_STEP) as usize + 1);
        let mut handoff = None;

        let mut x = 0.0;
        while x <= x_max {
            // Mixture density from the vapor volume fraction
            let density = rho_a + concentration * (1.0 - rho_a / vapor_density);
            sections.push(SlabSection { x, half_width: w, height: h, concentration, density });

            let excess = (density - rho_a) / density;
            let g_prime = GRAVITY * excess.max(0.0);
            // Characteristic depth of the stratified layer: the slab height
            // plus a width contribution from the spreading front
            let depth_scale = h + 0.1 * w;
            let richardson = g_prime * depth_scale / (u_star * u_star);

            if handoff.is_none()
                && richardson < RI_CRITICAL
                && (density / rho_a - 1.0) < DENSITY_HANDOFF
            {
                handoff = Some(make_handoff(x, w, h, atmos.pasquill));
            }

            // Gravity slumping widens the slab
            let dw = SPREADING_CONSTANT * (g_prime * h).sqrt() / u_c * MARCH_STEP;
            // Richardson-suppressed top entrainment plus edge entrainment
            let w_top = ALPHA_TOP * u_star / (1.0 + TOP_SUPPRESSION * richardson);
            let w_edge = ALPHA_EDGE * u_c;
            let dv = (2.0 * w * w_top + 2.0 * h * w_edge) * MARCH_STEP;

            w += dw;
            volume_flux += dv;
            u_c = atmos.wind_at((h / 2.0).max(0.5));
            h = volume_flux / (2.0 * w * u_c);
            concentration = (q / volume_flux).min(vapor_density);
            x += MARCH_STEP;
        }

        Self { q, sections, handoff, class: atmos.pasquill, transport_wind }
    }

    /// Where the slab handed off to the passive model, if it did.
    pub fn handoff(&self) -> Option<&Handoff> {
        self.handoff.as_ref()
    }

    /// Slab cross-section nearest to `x`.
    pub fn section_at(&self, x: f64) -> &SlabSection {
        let idx = ((x / MARCH_STEP).round() as usize).min(self.sections.len() - 1);
        &self.sections[idx]
    }

    /// Concentration (kg/m³) at local coordinates.
    ///
    /// Uniform inside the slab core, Gaussian fringes outside it, passive
    /// virtual-source Gaussian beyond the hand-off.
    pub fn concentration_at(&self, x: f64, y: f64, z: f64) -> f64 {
        if x <= 0.0 || self.q <= 0.0 {
            return 0.0;
        }

        if let Some(h) = &self.handoff {
            if x > h.x {
                let params = PlumeParams {
                    q: self.q,
                    effective_height: 0.0,
                    wind_speed: self.transport_wind,
                    mixing_height: None,
                    decay_constant: None,
                    deposition_velocity: None,
                };
                let sy = sigma::sigma_y(self.class, x - h.x + h.virtual_x_y);
                let sz = sigma::sigma_z(self.class, x - h.x + h.virtual_x_z);
                return gaussian::concentration(&params, x, y, z, sy, sz);
            }
        }

        let section = self.section_at(x);
        let lateral_excess = (y.abs() - section.half_width).max(0.0);
        let vertical_excess = (z - section.height).max(0.0);
        // Entrainment-scaled fringe widths
        let sigma_fringe_y = (section.half_width / 3.0).max(0.5);
        let sigma_fringe_z = (section.height / 3.0).max(0.1);

        section.concentration
            * (-lateral_excess * lateral_excess / (2.0 * sigma_fringe_y * sigma_fringe_y)).exp()
            * (-vertical_excess * vertical_excess / (2.0 * sigma_fringe_z * sigma_fringe_z)).exp()
    }
}

/// Build the virtual-source hand-off preserving the slab's second moments:
/// a uniform slab of half-width `W` has `σ_y = W/√3`, a uniform layer of
/// depth `h` has `σ_z = h/√3`.
fn make_handoff(x: f64, half_width: f64, height: f64, class: PasquillClass) -> Handoff {
    let sigma_y0 = (half_width / 3f64.sqrt()).max(0.5);
    let sigma_z0 = (height / 3f64.sqrt()).max(0.5);
    let virtual_x_y = bisect_to(|d| sigma::sigma_y(class, d), sigma_y0, 1.0, 2e5, 0.5).unwrap_or(1.0);
    let virtual_x_z = bisect_to(|d| sigma::sigma_z(class, d), sigma_z0, 1.0, 2e5, 0.5).unwrap_or(1.0);
    Handoff { x, sigma_y0, sigma_z0, virtual_x_y, virtual_x_z }
}
