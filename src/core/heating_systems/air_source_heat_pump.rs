use crate::compare_floats::min_of_2;
use crate::core::heating_systems::defrost::{
    calc_defrost, DefrostError, DefrostResult, DefrostStrategy,
};
use crate::core::heating_systems::performance_curves::PerformanceCurves;
use crate::core::psychrometrics::{AshraePsychrometrics, Psychrometrics, UnitSystem};
use crate::core::units::SECONDS_PER_MINUTE;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;
use tracing::{debug, instrument};

/// This module provides the performance evaluation of an air-source heat pump in
/// heating mode at a single operating point, following the EnergyPlus single-speed
/// DX heating coil model: rated capacity and efficiency are corrected for outdoor
/// temperature, air flow, cycling and (at low ambient temperatures) coil frosting.

/// Outdoor temperature (45ºF) above which the defrost cycle carries no extra load
const DEFROST_LOAD_REFERENCE_TEMP: f64 = 7.222;
const DEFROST_LOAD_FACTOR: f64 = 0.01;
/// Ratio of rated heating capacity to the capacity that runs in reverse during defrost
const DEFROST_CAPACITY_RATIO: f64 = 1.01667;
/// in Pa
pub const DEFAULT_ATMOSPHERIC_PRESSURE: f64 = 98600.;

/// Conditions at which the heat pump is evaluated. Temperatures are in the configured
/// unit system.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OperatingPoint {
    pub temp_outdoor_dry_bulb: f64,
    pub temp_outdoor_wet_bulb: f64,
    pub temp_indoor_wet_bulb: f64,
    /// Heat to be delivered over the timestep, in J
    pub delivered_load: f64,
}

/// Rated performance of one piece of equipment.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EquipmentRating {
    /// in W
    pub rated_total_capacity: f64,
    pub rated_cop: f64,
    /// Highest outdoor dry-bulb temperature at which the coil frosts, in the configured
    /// unit system
    pub temp_max_defrost: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalculationConfig {
    /// Length of the timestep in seconds; powers are reported as energy over this period
    pub timestep_seconds: f64,
    /// In Pa, or psi for the IP unit system. Defaults to `DEFAULT_ATMOSPHERIC_PRESSURE`.
    pub atmospheric_pressure: Option<f64>,
    /// Units of the input temperatures and pressure. Capacity is always in W and load
    /// in J, and the correction curves are always fitted in ºC.
    pub unit_system: UnitSystem,
    /// Ratio of actual to rated air flow across the coil
    pub flow_fraction: f64,
    /// Restrict the defrost capacity and power multipliers to [0, 1]
    pub clamp_defrost_multipliers: bool,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            timestep_seconds: SECONDS_PER_MINUTE as f64,
            atmospheric_pressure: None,
            unit_system: UnitSystem::SI,
            flow_fraction: 1.,
            clamp_defrost_multipliers: false,
        }
    }
}

/// Whether the coil is frosting at an operating point, and if so its defrost correction
#[derive(Clone, Copy, Debug, Display, PartialEq, Serialize)]
pub enum DefrostOperation {
    Active(DefrostResult),
    Inactive,
}

impl DefrostOperation {
    pub fn heating_capacity_multiplier(&self) -> f64 {
        match self {
            DefrostOperation::Active(result) => result.heating_capacity_multiplier,
            DefrostOperation::Inactive => 1.,
        }
    }

    pub fn input_power_multiplier(&self) -> f64 {
        match self {
            DefrostOperation::Active(result) => result.input_power_multiplier,
            DefrostOperation::Inactive => 1.,
        }
    }

    pub fn time_fraction(&self) -> f64 {
        match self {
            DefrostOperation::Active(result) => result.time_fraction,
            DefrostOperation::Inactive => 0.,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, DefrostOperation::Active(_))
    }
}

/// Intermediate quantities of an evaluation. Powers in W.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PerformanceDetails {
    pub total_capacity: f64,
    pub defrost_load: f64,
    pub part_load_ratio: f64,
    pub part_load_factor: f64,
    pub runtime_fraction: f64,
    pub heating_power: f64,
    pub defrost_power: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PerformanceResult {
    /// Electrical energy drawn for heating over the timestep, in J
    pub heating_energy: f64,
    /// Electrical energy drawn by the defrost cycle over the timestep, in J
    pub defrost_energy: f64,
    pub defrost: DefrostOperation,
    pub details: PerformanceDetails,
}

#[derive(Debug, Error, PartialEq)]
pub enum PerformanceError {
    #[error("Total heating capacity of {total_capacity} W at outdoor temperature {temp_outdoor_dry_bulb}ºC is not positive; check the equipment rating and correction curves")]
    NonPositiveCapacity {
        total_capacity: f64,
        temp_outdoor_dry_bulb: f64,
    },
    #[error(transparent)]
    Defrost(#[from] DefrostError),
}

#[derive(Clone, Debug)]
pub struct AirSourceHeatPump<P: Psychrometrics = AshraePsychrometrics> {
    rating: EquipmentRating,
    curves: PerformanceCurves,
    defrost_strategy: DefrostStrategy,
    config: CalculationConfig,
    psychrometrics: P,
    /// in ºC
    temp_max_defrost: f64,
    /// in Pa
    atmospheric_pressure: f64,
}

impl AirSourceHeatPump<AshraePsychrometrics> {
    /// Construct an air-source heat pump using the ASHRAE psychrometric formulation
    ///
    /// Arguments:
    /// * `rating` - rated capacity, COP and maximum defrost temperature
    /// * `curves` - correction curves for capacity, efficiency, cycling and defrost
    /// * `defrost_strategy` - demand or timed defrost
    /// * `config` - timestep, pressure and other calculation settings
    pub fn new(
        rating: EquipmentRating,
        curves: PerformanceCurves,
        defrost_strategy: DefrostStrategy,
        config: CalculationConfig,
    ) -> Self {
        Self::with_psychrometrics(
            rating,
            curves,
            defrost_strategy,
            config,
            AshraePsychrometrics::new(UnitSystem::SI),
        )
    }
}

impl<P: Psychrometrics> AirSourceHeatPump<P> {
    /// Construct an air-source heat pump drawing moist-air properties from the given
    /// provider. Inputs in the IP unit system are converted at this boundary, so the
    /// provider is always queried in ºC and Pa.
    pub fn with_psychrometrics(
        rating: EquipmentRating,
        curves: PerformanceCurves,
        defrost_strategy: DefrostStrategy,
        config: CalculationConfig,
        psychrometrics: P,
    ) -> Self {
        let unit_system = config.unit_system;
        let temp_max_defrost = unit_system.temperature_to_celsius(rating.temp_max_defrost);
        let atmospheric_pressure = config
            .atmospheric_pressure
            .map_or(DEFAULT_ATMOSPHERIC_PRESSURE, |pressure| {
                unit_system.pressure_to_pascals(pressure)
            });

        Self {
            rating,
            curves,
            defrost_strategy,
            config,
            psychrometrics,
            temp_max_defrost,
            atmospheric_pressure,
        }
    }

    /// The coil is treated as frosting at or below the maximum defrost temperature
    fn defrost_active(&self, temp_outdoor_dry_bulb: f64) -> bool {
        temp_outdoor_dry_bulb <= self.temp_max_defrost
    }

    fn operating_point_in_celsius(&self, operating_point: &OperatingPoint) -> OperatingPoint {
        let unit_system = self.config.unit_system;
        OperatingPoint {
            temp_outdoor_dry_bulb: unit_system
                .temperature_to_celsius(operating_point.temp_outdoor_dry_bulb),
            temp_outdoor_wet_bulb: unit_system
                .temperature_to_celsius(operating_point.temp_outdoor_wet_bulb),
            temp_indoor_wet_bulb: unit_system
                .temperature_to_celsius(operating_point.temp_indoor_wet_bulb),
            delivered_load: operating_point.delivered_load,
        }
    }

    fn defrost_operation(
        &self,
        operating_point: &OperatingPoint,
    ) -> Result<DefrostOperation, DefrostError> {
        if !self.defrost_active(operating_point.temp_outdoor_dry_bulb) {
            return Ok(DefrostOperation::Inactive);
        }

        let result = calc_defrost(
            &self.psychrometrics,
            operating_point.temp_outdoor_dry_bulb,
            operating_point.temp_outdoor_wet_bulb,
            self.atmospheric_pressure,
            self.defrost_strategy,
        )?;

        Ok(DefrostOperation::Active(
            if self.config.clamp_defrost_multipliers {
                result.clamped()
            } else {
                result
            },
        ))
    }

    /// Calculate the heating and defrost energy drawn over one timestep at the given
    /// operating point
    #[instrument(skip(self))]
    pub fn evaluate(
        &self,
        operating_point: &OperatingPoint,
    ) -> Result<PerformanceResult, PerformanceError> {
        let operating_point = self.operating_point_in_celsius(operating_point);
        let defrost = self.defrost_operation(&operating_point)?;
        debug!(defrost_active = defrost.is_active(), "selected defrost branch");

        let details = self.performance_details(&operating_point, &defrost)?;
        debug!(?details, "evaluated operating point");

        Ok(PerformanceResult {
            heating_energy: details.heating_power * self.config.timestep_seconds,
            defrost_energy: details.defrost_power * self.config.timestep_seconds,
            defrost,
            details,
        })
    }

    /// Evaluate a batch of independent operating points. Results are returned in
    /// the same order as the operating points.
    pub fn evaluate_all(
        &self,
        operating_points: &[OperatingPoint],
    ) -> Vec<Result<PerformanceResult, PerformanceError>>
    where
        P: Sync,
    {
        operating_points
            .par_iter()
            .map(|operating_point| self.evaluate(operating_point))
            .collect()
    }

    fn performance_details(
        &self,
        operating_point: &OperatingPoint,
        defrost: &DefrostOperation,
    ) -> Result<PerformanceDetails, PerformanceError> {
        let OperatingPoint {
            temp_outdoor_dry_bulb,
            temp_indoor_wet_bulb,
            delivered_load,
            ..
        } = *operating_point;
        let flow_fraction = self.config.flow_fraction;
        let rated_total_capacity = self.rating.rated_total_capacity;

        let total_capacity = rated_total_capacity
            * self
                .curves
                .total_capacity_modifier(temp_outdoor_dry_bulb, flow_fraction)
            * defrost.heating_capacity_multiplier();
        // also rejects NaN
        if !(total_capacity > 0.) {
            return Err(PerformanceError::NonPositiveCapacity {
                total_capacity,
                temp_outdoor_dry_bulb,
            });
        }

        // Extra heat needed to melt frost from the coil is served within the same
        // duty cycle as the delivered load
        let defrost_load = match defrost {
            DefrostOperation::Active(result) => {
                DEFROST_LOAD_FACTOR
                    * result.time_fraction
                    * (DEFROST_LOAD_REFERENCE_TEMP - temp_outdoor_dry_bulb)
                    * (rated_total_capacity / DEFROST_CAPACITY_RATIO)
            }
            DefrostOperation::Inactive => 0.,
        };

        let part_load_ratio = delivered_load / (total_capacity * self.config.timestep_seconds);
        let part_load_ratio = min_of_2(1., part_load_ratio + defrost_load / total_capacity);
        let part_load_factor = self.curves.part_load_factor(part_load_ratio);
        let runtime_fraction = min_of_2(1., part_load_ratio / part_load_factor);

        let defrost_power = match defrost {
            DefrostOperation::Active(result) => {
                self.curves
                    .defrost_eir_modifier(temp_indoor_wet_bulb, temp_outdoor_dry_bulb)
                    * (rated_total_capacity / DEFROST_CAPACITY_RATIO)
                    * result.time_fraction
                    * runtime_fraction
            }
            DefrostOperation::Inactive => 0.,
        };

        let heating_power = (1. / self.rating.rated_cop)
            * total_capacity
            * self
                .curves
                .eer_modifier(temp_outdoor_dry_bulb, flow_fraction)
            * defrost.input_power_multiplier()
            * runtime_fraction;

        Ok(PerformanceDetails {
            total_capacity,
            defrost_load,
            part_load_ratio,
            part_load_factor,
            runtime_fraction,
            heating_power,
            defrost_power,
        })
    }
}
