//! Physical constants and unit conversions
//!
//! Everything inside the engine is SI: kelvin, pascal, metre, kilogram,
//! second. Concentrations are carried internally in mg/m³; callers may
//! declare guideline values in ppm and the conversions here move between the
//! two using the ideal-gas molar volume. Conversions to the imperial units
//! that appear in published blast and toxicology tables (psi) live here as
//! well so no other module hand-rolls a factor.

/// Gravitational acceleration (m/s²)
pub const GRAVITY: f64 = 9.81;

/// Universal gas constant (J/(mol·K))
pub const GAS_CONSTANT: f64 = 8.314;

/// Specific gas constant for dry air (J/(kg·K))
pub const R_AIR: f64 = 287.05;

/// Ratio of specific heats for air
pub const GAMMA_AIR: f64 = 1.4;

/// Stefan-Boltzmann constant (W/(m²·K⁴))
pub const STEFAN_BOLTZMANN: f64 = 5.67e-8;

/// von Kármán constant for surface-layer profiles
pub const VON_KARMAN: f64 = 0.4;

/// Heat of detonation of TNT (J/kg), the denominator of TNT equivalence
pub const TNT_HEAT_OF_COMBUSTION: f64 = 4.6e6;

/// Standard atmospheric pressure (Pa)
pub const STANDARD_PRESSURE: f64 = 101_325.0;

/// Reference temperature for the 24.45 L/mol molar volume (25 °C)
pub const STANDARD_TEMPERATURE: f64 = 298.15;

/// Ideal-gas molar volume at 25 °C / 1 atm (L/mol)
pub const MOLAR_VOLUME_25C: f64 = 24.45;

/// Specific heat of air at constant pressure (J/(kg·K))
pub const CP_AIR: f64 = 1005.0;

/// Density of liquid water (kg/m³)
pub const WATER_DENSITY: f64 = 1000.0;

/// Convert degrees Celsius to kelvin
#[inline]
pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + 273.15
}

/// Convert kelvin to degrees Celsius
#[inline]
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - 273.15
}

/// Convert pascal to psi
#[inline]
pub fn pascal_to_psi(pascal: f64) -> f64 {
    pascal / 6894.757
}

/// Convert psi to pascal
#[inline]
pub fn psi_to_pascal(psi: f64) -> f64 {
    psi * 6894.757
}

/// Convert pascal to standard atmospheres
#[inline]
pub fn pascal_to_atm(pascal: f64) -> f64 {
    pascal / STANDARD_PRESSURE
}

/// Convert mmHg (Antoine tables) to pascal
#[inline]
pub fn mmhg_to_pascal(mmhg: f64) -> f64 {
    mmhg * 133.322
}

/// Ideal-gas molar volume (L/mol) at the given state.
///
/// `24.45 · (T / 298.15) · (101325 / P)` — the temperature/pressure
/// correction applied when conditions are not 25 °C / 1 atm.
#[inline]
pub fn molar_volume_l(temperature_k: f64, pressure_pa: f64) -> f64 {
    MOLAR_VOLUME_25C * (temperature_k / STANDARD_TEMPERATURE) * (STANDARD_PRESSURE / pressure_pa)
}

/// Convert a gas-phase concentration from ppm (by volume) to mg/m³.
///
/// `C[mg/m³] = C[ppm] · MW / V_m` with `V_m` the molar volume at the ambient
/// state; at 25 °C / 1 atm this is the familiar `MW / 24.45`.
#[inline]
pub fn ppm_to_mg_per_m3(ppm: f64, molecular_weight: f64, temperature_k: f64, pressure_pa: f64) -> f64 {
    ppm * molecular_weight / molar_volume_l(temperature_k, pressure_pa)
}

/// Convert a gas-phase concentration from mg/m³ to ppm (by volume).
#[inline]
pub fn mg_per_m3_to_ppm(
    mg_per_m3: f64,
    molecular_weight: f64,
    temperature_k: f64,
    pressure_pa: f64,
) -> f64 {
    mg_per_m3 * molar_volume_l(temperature_k, pressure_pa) / molecular_weight
}

/// Speed of sound in air (m/s): `√(γ · R_air · T)`
#[inline]
pub fn sound_speed(temperature_k: f64) -> f64 {
    (GAMMA_AIR * R_AIR * temperature_k).sqrt()
}

/// Ideal-gas density (kg/m³) for a species of molecular weight `mw` (g/mol).
#[inline]
pub fn gas_density(molecular_weight: f64, temperature_k: f64, pressure_pa: f64) -> f64 {
    pressure_pa * (molecular_weight / 1000.0) / (GAS_CONSTANT * temperature_k)
}

/// Density of ambient air (kg/m³) from the ideal-gas law.
#[inline]
pub fn air_density(temperature_k: f64, pressure_pa: f64) -> f64 {
    pressure_pa / (R_AIR * temperature_k)
}
