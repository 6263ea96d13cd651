//! Receptor exposure evaluation
//!
//! Every receptor is sampled against whichever field the run produced: the
//! concentration-time series from the dispersion grid, the incident heat
//! flux from a fire, or the peak overpressure from a blast. Toxic exposures
//! are compared against AEGL/ERPG/PAC/IDLH guidelines at the duration
//! bucket matching the exposure window and folded into the impact ladder.

use tracing::debug;

use crate::atmosphere::AtmosphericState;
use crate::blast::{self, BlastSource};
use crate::core_types::chemical::ChemicalProperties;
use crate::core_types::geo;
use crate::core_types::output::{
    DispersionGrid, GuidelineFraction, ImpactLevel, ReceptorExposure,
};
use crate::core_types::scenario::Receptor;
use crate::core_types::toxicology::{GuidelineTier, ToxicologicalGuidelines};
use crate::thermal::{self, dose, FireCharacteristics};

/// Guideline fractions above this register as a mild impact.
const MILD_FRACTION: f64 = 0.1;

/// How a toxic receptor samples the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    /// Nearest cell centre
    Nearest,
    /// Bilinear interpolation between the four surrounding centres
    Bilinear,
}

/// One named guideline value in mg/m³.
struct Guideline {
    label: String,
    tier: Option<GuidelineTier>,
    value_mg: f64,
}

/// Collect every applicable guideline, normalised to mg/m³.
fn collect_guidelines(
    tox: &ToxicologicalGuidelines,
    chem: &ChemicalProperties,
    atmos: &AtmosphericState,
    window_min: f64,
) -> Vec<Guideline> {
    let convert =
        |v: f64| tox.to_mg_per_m3(v, chem.molecular_weight, atmos.temperature, atmos.pressure);
    let mut out = Vec::new();

    for (tier, name) in [
        (GuidelineTier::Tier1, 1),
        (GuidelineTier::Tier2, 2),
        (GuidelineTier::Tier3, 3),
    ] {
        if let Some(v) = tox.aegl_for(tier, window_min) {
            out.push(Guideline {
                label: format!("AEGL-{name} ({window_min:.0} min)"),
                tier: Some(tier),
                value_mg: convert(v),
            });
        }
        if let Some(v) = tox.erpg_for(tier) {
            out.push(Guideline {
                label: format!("ERPG-{name}"),
                tier: Some(tier),
                value_mg: convert(v),
            });
        }
        if let Some(v) = tox.pac_for(tier, window_min) {
            out.push(Guideline {
                label: format!("PAC-{name} ({window_min:.0} min)"),
                tier: Some(tier),
                value_mg: convert(v),
            });
        }
    }
    if let Some(v) = tox.idlh {
        out.push(Guideline { label: "IDLH".to_owned(), tier: None, value_mg: convert(v) });
    }
    if let Some(v) = tox.pel_twa {
        out.push(Guideline { label: "PEL TWA".to_owned(), tier: None, value_mg: convert(v) });
    }
    if let Some(v) = tox.tlv_twa {
        out.push(Guideline { label: "TLV TWA".to_owned(), tier: None, value_mg: convert(v) });
    }
    out
}

/// Impact ladder from the peak against tiered guidelines.
fn impact_from_guidelines(peak: f64, guidelines: &[Guideline]) -> ImpactLevel {
    let tier_hit = |tier: GuidelineTier| {
        guidelines
            .iter()
            .any(|g| g.tier == Some(tier) && g.value_mg > 0.0 && peak >= g.value_mg)
    };
    if tier_hit(GuidelineTier::Tier3) {
        ImpactLevel::LifeThreatening
    } else if tier_hit(GuidelineTier::Tier2) {
        ImpactLevel::Disabling
    } else if tier_hit(GuidelineTier::Tier1) {
        ImpactLevel::Notable
    } else if guidelines
        .iter()
        .any(|g| g.value_mg > 0.0 && peak / g.value_mg > MILD_FRACTION)
    {
        ImpactLevel::Mild
    } else {
        ImpactLevel::NoEffect
    }
}

/// Sample the grid at local plume coordinates for one interval.
fn sample(grid: &DispersionGrid, t: usize, x: f64, y: f64, mode: Sampling) -> f64 {
    match mode {
        Sampling::Nearest => grid
            .nearest_cell(x, y)
            .map_or(0.0, |(ix, iy)| grid.concentration(t, ix, iy)),
        Sampling::Bilinear => {
            let dx = grid.spacing_x();
            let dy = grid.spacing_y();
            let fx = (x - grid.xs[0]) / dx;
            let fy = (y - grid.ys[0]) / dy;
            if fx < 0.0 || fy < 0.0 {
                return 0.0;
            }
            let ix = (fx.floor() as usize).min(grid.xs.len().saturating_sub(1));
            let iy = (fy.floor() as usize).min(grid.ys.len().saturating_sub(1));
            let ix1 = (ix + 1).min(grid.xs.len() - 1);
            let iy1 = (iy + 1).min(grid.ys.len() - 1);
            let tx = (fx - ix as f64).clamp(0.0, 1.0);
            let ty = (fy - iy as f64).clamp(0.0, 1.0);
            let c00 = grid.concentration(t, ix, iy);
            let c10 = grid.concentration(t, ix1, iy);
            let c01 = grid.concentration(t, ix, iy1);
            let c11 = grid.concentration(t, ix1, iy1);
            c00 * (1.0 - tx) * (1.0 - ty)
                + c10 * tx * (1.0 - ty)
                + c01 * (1.0 - tx) * ty
                + c11 * tx * ty
        }
    }
}

/// Evaluate toxic exposures for every receptor against the grid.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_toxic(
    grid: &DispersionGrid,
    receptors: &[Receptor],
    tox: Option<&ToxicologicalGuidelines>,
    chem: &ChemicalProperties,
    atmos: &AtmosphericState,
    duration: f64,
    exposure_window_min: f64,
    threshold_mg: f64,
    mode: Sampling,
) -> Vec<ReceptorExposure> {
    let guidelines = tox
        .map(|t| collect_guidelines(t, chem, atmos, exposure_window_min))
        .unwrap_or_default();
    let n_t = grid.times.len();
    let interval = duration / n_t as f64;
    let window = (exposure_window_min * 60.0).min(duration);

    receptors
        .iter()
        .map(|receptor| {
            let (east, north) = geo::local_offset(&grid.origin, &receptor.point);
            let (x, y) = geo::east_north_to_plume(east, north, grid.downwind_azimuth);

            let series: Vec<f64> = (0..n_t).map(|t| sample(grid, t, x, y, mode)).collect();

            let mut peak = 0.0f64;
            let mut peak_time = 0.0;
            let mut dose = 0.0;
            let mut windowed_dose = 0.0;
            let mut arrival = None;
            let mut above = 0.0;
            for (t, &c) in series.iter().enumerate() {
                let start = t as f64 * interval;
                if c > peak {
                    peak = c;
                    peak_time = grid.times[t];
                }
                dose += c * interval;
                let window_overlap = (window - start).clamp(0.0, interval);
                windowed_dose += c * window_overlap;
                if c >= threshold_mg && threshold_mg > 0.0 {
                    arrival.get_or_insert(start);
                    above += interval;
                }
            }

            let fractions: Vec<GuidelineFraction> = guidelines
                .iter()
                .filter(|g| g.value_mg > 0.0)
                .map(|g| GuidelineFraction {
                    guideline: g.label.clone(),
                    fraction: peak / g.value_mg,
                })
                .collect();

            debug!(name = %receptor.name, peak, "toxic receptor evaluated");

            ReceptorExposure {
                name: receptor.name.clone(),
                peak,
                time_weighted_average: if window > 0.0 { windowed_dose / window } else { 0.0 },
                integrated_dose: dose,
                arrival_time: arrival,
                peak_time,
                duration_above_threshold: above,
                impact_level: impact_from_guidelines(peak, &guidelines),
                guideline_fractions: fractions,
            }
        })
        .collect()
}

/// Evaluate thermal exposures: the peak field carries the incident flux.
pub fn evaluate_thermal(
    fire: &FireCharacteristics,
    receptors: &[Receptor],
    origin: &crate::core_types::geo::GeoPoint,
    atmos: &AtmosphericState,
    humidity_correction: bool,
) -> Vec<ReceptorExposure> {
    receptors
        .iter()
        .map(|receptor| {
            let (east, north) = geo::local_offset(origin, &receptor.point);
            let distance = (east * east + north * north).sqrt();
            let angle = geo::wrap_degrees(north.atan2(east).to_degrees());
            let q = thermal::incident_flux(fire, distance, angle, atmos, humidity_correction);
            let lethality = dose::lethality_probability(q, fire.duration);

            let impact = if lethality > 0.5 {
                ImpactLevel::LifeThreatening
            } else if q >= 12_500.0 {
                ImpactLevel::Disabling
            } else if q >= 5_000.0 {
                ImpactLevel::Notable
            } else if q >= 1_600.0 {
                ImpactLevel::Mild
            } else {
                ImpactLevel::NoEffect
            };

            ReceptorExposure {
                name: receptor.name.clone(),
                peak: q,
                time_weighted_average: q,
                integrated_dose: dose::thermal_dose(q, fire.duration),
                arrival_time: Some(0.0),
                peak_time: 0.0,
                duration_above_threshold: if q >= 1_600.0 { fire.duration } else { 0.0 },
                impact_level: impact,
                guideline_fractions: vec![
                    GuidelineFraction {
                        guideline: "pain threshold flux (5 kW/m2)".to_owned(),
                        fraction: q / 5_000.0,
                    },
                    GuidelineFraction {
                        guideline: "lethality probability".to_owned(),
                        fraction: lethality,
                    },
                ],
            }
        })
        .collect()
}

/// Evaluate blast exposures: the peak field carries the overpressure.
pub fn evaluate_blast(
    source: &BlastSource,
    receptors: &[Receptor],
    origin: &crate::core_types::geo::GeoPoint,
    atmos: &AtmosphericState,
) -> Vec<ReceptorExposure> {
    receptors
        .iter()
        .map(|receptor| {
            let (east, north) = geo::local_offset(origin, &receptor.point);
            let distance = (east * east + north * north).sqrt();
            let angle = geo::wrap_degrees(north.atan2(east).to_degrees());
            let dp = blast::overpressure_at(source, distance, angle, atmos);
            let lethality = blast::lethality_probability(dp);
            let injury = blast::injury_probability(dp);

            let impact = if lethality > 0.5 {
                ImpactLevel::LifeThreatening
            } else if injury > 0.5 || dp >= 35_000.0 {
                ImpactLevel::Disabling
            } else if dp >= 17_000.0 {
                ImpactLevel::Notable
            } else if dp >= 1_000.0 {
                ImpactLevel::Mild
            } else {
                ImpactLevel::NoEffect
            };

            let arrival = crate::blast::kingery::arrival_time(
                distance,
                source.tnt_mass,
                atmos.pressure,
                atmos.temperature,
            );

            ReceptorExposure {
                name: receptor.name.clone(),
                peak: dp,
                time_weighted_average: dp,
                integrated_dose: dp * 0.01,
                arrival_time: Some(arrival),
                peak_time: arrival,
                duration_above_threshold: 0.0,
                impact_level: impact,
                guideline_fractions: vec![
                    GuidelineFraction {
                        guideline: "injury probability".to_owned(),
                        fraction: injury,
                    },
                    GuidelineFraction {
                        guideline: "lethality probability".to_owned(),
                        fraction: lethality,
                    },
                ],
            }
        })
        .collect()
}
