use crate::compare_floats::{clamp_to_unit_interval, max_of_2};
use crate::core::psychrometrics::{Psychrometrics, PsychrometricsError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

/// This module provides the frosting/defrost correction for the outdoor coil of an
/// air-source heat pump in heating mode. The coil surface temperature is estimated
/// from the ambient temperature, and the moisture the air can deposit on a coil at
/// that temperature drives both the fraction of time spent defrosting and the
/// capacity and input power penalties.

/// Coil surface temperature is estimated as `0.82 * T_db - 8.589` (ºC)
const OUTDOOR_COIL_TEMP_SLOPE: f64 = 0.82;
const OUTDOOR_COIL_TEMP_OFFSET: f64 = -8.589;

/// Floor on the frost-driving humidity ratio difference, so that the demand defrost
/// fraction never divides by zero
const MIN_HUMIDITY_RATIO_DIFFERENCE: f64 = 1e-6;

const DEMAND_DEFROST_HUMIDITY_CONSTANT: f64 = 0.01446;
const DEMAND_DEFROST_CAPACITY_FACTOR: f64 = 0.875;
const DEMAND_DEFROST_POWER_FACTOR: f64 = 0.954;

const TIMED_DEFROST_CAPACITY_INTERCEPT: f64 = 0.909;
const TIMED_DEFROST_CAPACITY_SLOPE: f64 = 107.33;
const TIMED_DEFROST_POWER_INTERCEPT: f64 = 0.9;
const TIMED_DEFROST_POWER_SLOPE: f64 = 36.45;

/// About 3.5 minutes of defrost in every hour
pub const DEFAULT_TIMED_DEFROST_FRACTION: f64 = 0.058333;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DefrostStrategy {
    /// Defrost is initiated when frost is detected on the coil
    #[default]
    OnDemand,
    /// Defrost runs for a fixed fraction of every period
    Timed {
        #[serde(default)]
        time_fraction: Option<f64>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DefrostResult {
    pub heating_capacity_multiplier: f64,
    pub input_power_multiplier: f64,
    pub time_fraction: f64,
    /// Difference between the humidity ratio of the outdoor air and the saturation
    /// humidity ratio at the coil surface, floored at a small positive value
    pub humidity_ratio_difference: f64,
}

impl DefrostResult {
    /// Copy of this result with both multipliers restricted to [0, 1]. The timed
    /// defrost fit is linear in the humidity ratio difference, so for very humid
    /// air it extrapolates below zero.
    pub fn clamped(&self) -> Self {
        Self {
            heating_capacity_multiplier: clamp_to_unit_interval(self.heating_capacity_multiplier),
            input_power_multiplier: clamp_to_unit_interval(self.input_power_multiplier),
            ..*self
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum DefrostError {
    #[error("Could not determine frost-driving humidity ratio difference: {0}")]
    Psychrometrics(#[from] PsychrometricsError),
}

/// Estimated outdoor coil surface temperature (ºC) for an outdoor dry-bulb temperature (ºC)
pub fn outdoor_coil_temperature(temp_outdoor_dry_bulb: f64) -> f64 {
    OUTDOOR_COIL_TEMP_SLOPE * temp_outdoor_dry_bulb + OUTDOOR_COIL_TEMP_OFFSET
}

/// Fraction of time spent defrosting under demand defrost control
fn demand_defrost_time_fraction(humidity_ratio_difference: f64) -> f64 {
    1. / (1. + DEMAND_DEFROST_HUMIDITY_CONSTANT / humidity_ratio_difference)
}

/// Calculate the defrost multipliers and time fraction for the outdoor coil
///
/// Arguments:
/// * `psychrometrics` - source of moist-air properties
/// * `temp_outdoor_dry_bulb` - outdoor dry-bulb temperature, in ºC
/// * `temp_outdoor_wet_bulb` - outdoor wet-bulb temperature, in ºC
/// * `atmospheric_pressure` - in Pa
/// * `strategy` - demand or timed defrost
pub fn calc_defrost(
    psychrometrics: &impl Psychrometrics,
    temp_outdoor_dry_bulb: f64,
    temp_outdoor_wet_bulb: f64,
    atmospheric_pressure: f64,
    strategy: DefrostStrategy,
) -> Result<DefrostResult, DefrostError> {
    let temp_outdoor_coil = outdoor_coil_temperature(temp_outdoor_dry_bulb);
    let outdoor_humidity_ratio = psychrometrics.humidity_ratio_from_wet_bulb(
        temp_outdoor_dry_bulb,
        temp_outdoor_wet_bulb,
        atmospheric_pressure,
    )?;
    let coil_saturation_humidity_ratio =
        psychrometrics.saturation_humidity_ratio(temp_outdoor_coil, atmospheric_pressure)?;
    let humidity_ratio_difference = max_of_2(
        MIN_HUMIDITY_RATIO_DIFFERENCE,
        outdoor_humidity_ratio - coil_saturation_humidity_ratio,
    );

    trace!(
        temp_outdoor_coil,
        outdoor_humidity_ratio,
        coil_saturation_humidity_ratio,
        humidity_ratio_difference,
        "outdoor coil frosting conditions"
    );

    let result = match strategy {
        DefrostStrategy::OnDemand => {
            let time_fraction = demand_defrost_time_fraction(humidity_ratio_difference);
            DefrostResult {
                heating_capacity_multiplier: DEMAND_DEFROST_CAPACITY_FACTOR * (1. - time_fraction),
                input_power_multiplier: DEMAND_DEFROST_POWER_FACTOR * (1. - time_fraction),
                time_fraction,
                humidity_ratio_difference,
            }
        }
        DefrostStrategy::Timed { time_fraction } => DefrostResult {
            heating_capacity_multiplier: TIMED_DEFROST_CAPACITY_INTERCEPT
                - TIMED_DEFROST_CAPACITY_SLOPE * humidity_ratio_difference,
            input_power_multiplier: TIMED_DEFROST_POWER_INTERCEPT
                - TIMED_DEFROST_POWER_SLOPE * humidity_ratio_difference,
            time_fraction: time_fraction.unwrap_or(DEFAULT_TIMED_DEFROST_FRACTION),
            humidity_ratio_difference,
        },
    };

    Ok(result)
}
