//! Toxicological exposure guidelines
//!
//! AEGL and PAC values are defined per exposure duration; ERPG is a one-hour
//! guideline. The caller declares the unit the values are expressed in and
//! the engine normalises everything to mg/m³ before comparisons.

use serde::{Deserialize, Serialize};

use super::units;

/// The exposure durations (minutes) AEGL and PAC values are published for.
pub const GUIDELINE_DURATIONS_MIN: [f64; 5] = [10.0, 30.0, 60.0, 240.0, 480.0];

/// Unit the guideline concentrations are declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationUnits {
    /// Parts per million by volume
    Ppm,
    /// Milligrams per cubic metre
    MgPerM3,
}

/// Guideline severity tier (1 = discomfort .. 3 = life-threatening).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuidelineTier {
    /// Notable discomfort, reversible effects
    Tier1,
    /// Irreversible or escape-impairing effects
    Tier2,
    /// Life-threatening effects or death
    Tier3,
}

/// One family of duration-indexed guideline values (AEGL or PAC).
///
/// Values align with [`GUIDELINE_DURATIONS_MIN`]; any entry may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DurationSeries {
    /// Values at 10, 30, 60, 240 and 480 minutes
    pub values: [Option<f64>; 5],
}

impl DurationSeries {
    /// Uniform series with the same value at every duration.
    pub fn uniform(value: f64) -> Self {
        Self { values: [Some(value); 5] }
    }

    /// Value for the duration bucket closest to the exposure window,
    /// resolving upward (longer bucket) on ties; `None` when the series has
    /// no value at or around that bucket.
    pub fn for_window(&self, window_min: f64) -> Option<f64> {
        let mut best: Option<(f64, usize)> = None;
        for (i, duration) in GUIDELINE_DURATIONS_MIN.iter().enumerate() {
            if self.values[i].is_none() {
                continue;
            }
            let distance = (duration - window_min).abs();
            let better = match best {
                None => true,
                // Strict < keeps the later (longer) bucket on exact ties
                Some((d, _)) => distance < d,
            };
            if better {
                best = Some((distance, i));
            }
        }
        best.and_then(|(_, i)| self.values[i])
    }
}

/// Full guideline record for one chemical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToxicologicalGuidelines {
    /// Unit every concentration below is declared in
    pub units: ConcentrationUnits,
    /// AEGL-1/2/3 by duration
    pub aegl: [DurationSeries; 3],
    /// ERPG-1/2/3 (60-minute values)
    pub erpg: [Option<f64>; 3],
    /// PAC-1/2/3 by duration
    pub pac: [DurationSeries; 3],
    /// Immediately Dangerous to Life or Health (30-minute basis)
    pub idlh: Option<f64>,
    /// OSHA permissible exposure limit, 8-hour TWA
    pub pel_twa: Option<f64>,
    /// ACGIH threshold limit value, 8-hour TWA
    pub tlv_twa: Option<f64>,
}

impl ToxicologicalGuidelines {
    /// Empty record in mg/m³.
    pub fn empty() -> Self {
        Self {
            units: ConcentrationUnits::MgPerM3,
            aegl: [DurationSeries::default(); 3],
            erpg: [None; 3],
            pac: [DurationSeries::default(); 3],
            idlh: None,
            pel_twa: None,
            tlv_twa: None,
        }
    }

    /// Convert one declared value to mg/m³ at the ambient state.
    pub fn to_mg_per_m3(
        &self,
        value: f64,
        molecular_weight: f64,
        temperature_k: f64,
        pressure_pa: f64,
    ) -> f64 {
        match self.units {
            ConcentrationUnits::MgPerM3 => value,
            ConcentrationUnits::Ppm => {
                units::ppm_to_mg_per_m3(value, molecular_weight, temperature_k, pressure_pa)
            }
        }
    }

    /// AEGL value (declared units) for a tier and exposure window.
    pub fn aegl_for(&self, tier: GuidelineTier, window_min: f64) -> Option<f64> {
        self.aegl[tier_index(tier)].for_window(window_min)
    }

    /// PAC value (declared units) for a tier and exposure window.
    pub fn pac_for(&self, tier: GuidelineTier, window_min: f64) -> Option<f64> {
        self.pac[tier_index(tier)].for_window(window_min)
    }

    /// ERPG value (declared units) for a tier.
    pub fn erpg_for(&self, tier: GuidelineTier) -> Option<f64> {
        self.erpg[tier_index(tier)]
    }
}

fn tier_index(tier: GuidelineTier) -> usize {
    match tier {
        GuidelineTier::Tier1 => 0,
        GuidelineTier::Tier2 => 1,
        GuidelineTier::Tier3 => 2,
    }
}
