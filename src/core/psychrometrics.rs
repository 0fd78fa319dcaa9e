use crate::compare_floats::max_of_2;
use crate::core::units::{
    celsius_to_kelvin, fahrenheit_to_celsius, fahrenheit_to_rankine, psi_to_pascals,
    BelowAbsoluteZeroError,
};
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

/// This module provides the moist-air property lookups needed to work out how much
/// moisture the outdoor air can deposit on the coil as frost.
///
/// The formulation follows the ASHRAE Handbook - Fundamentals (2017), chapter 1:
/// saturation vapour pressure from the Hyland-Wexler correlations (eqs. 5 and 6),
/// saturation humidity ratio from eq. 23 and humidity ratio from wet-bulb
/// temperature from eqs. 33 and 35.

/// Ratio of the molecular weight of water vapour to that of dry air
const MOLECULAR_WEIGHT_RATIO: f64 = 0.621945;

/// Humidity ratios are never reported below this value
const MIN_HUMIDITY_RATIO: f64 = 1e-7;

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum UnitSystem {
    /// Temperatures in ºC, pressures in Pa
    #[default]
    SI,
    /// Temperatures in ºF, pressures in psi
    IP,
}

impl UnitSystem {
    /// Express a temperature given in this unit system in ºC
    pub fn temperature_to_celsius(&self, temp: f64) -> f64 {
        match self {
            UnitSystem::SI => temp,
            UnitSystem::IP => fahrenheit_to_celsius(temp),
        }
    }

    /// Express a pressure given in this unit system in Pa
    pub fn pressure_to_pascals(&self, pressure: f64) -> f64 {
        match self {
            UnitSystem::SI => pressure,
            UnitSystem::IP => psi_to_pascals(pressure),
        }
    }

    fn triple_point_water(&self) -> f64 {
        match self {
            UnitSystem::SI => 0.01,
            UnitSystem::IP => 32.018,
        }
    }

    fn freezing_point_water(&self) -> f64 {
        match self {
            UnitSystem::SI => 0.,
            UnitSystem::IP => 32.,
        }
    }

    fn dry_bulb_range(&self) -> (f64, f64) {
        match self {
            UnitSystem::SI => (-100., 200.),
            UnitSystem::IP => (-148., 392.),
        }
    }

    fn absolute_temperature(&self, temp: f64) -> Result<f64, BelowAbsoluteZeroError> {
        match self {
            UnitSystem::SI => celsius_to_kelvin(temp),
            UnitSystem::IP => fahrenheit_to_rankine(temp),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PsychrometricsError {
    #[error("Wet bulb temperature {wet_bulb} is above dry bulb temperature {dry_bulb}")]
    WetBulbAboveDryBulb { dry_bulb: f64, wet_bulb: f64 },
    #[error("Temperature {temp} is outside the range [{min}, {max}] for the {unit_system} unit system")]
    TemperatureOutOfRange {
        temp: f64,
        min: f64,
        max: f64,
        unit_system: UnitSystem,
    },
    #[error(transparent)]
    BelowAbsoluteZero(#[from] BelowAbsoluteZeroError),
    #[error("Atmospheric pressure must be positive, but {0} was given")]
    NonPositivePressure(f64),
    #[error("Atmospheric pressure {pressure} does not exceed the saturation vapour pressure {saturation_vapour_pressure}")]
    PressureBelowSaturation {
        pressure: f64,
        saturation_vapour_pressure: f64,
    },
}

/// Source of moist-air properties for the defrost model.
pub trait Psychrometrics {
    /// Return the humidity ratio (mass of water per mass of dry air) of air at the
    /// given dry-bulb temperature, wet-bulb temperature and pressure
    fn humidity_ratio_from_wet_bulb(
        &self,
        dry_bulb: f64,
        wet_bulb: f64,
        pressure: f64,
    ) -> Result<f64, PsychrometricsError>;

    /// Return the humidity ratio of saturated air at the given temperature and pressure
    fn saturation_humidity_ratio(
        &self,
        dry_bulb: f64,
        pressure: f64,
    ) -> Result<f64, PsychrometricsError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AshraePsychrometrics {
    unit_system: UnitSystem,
}

impl AshraePsychrometrics {
    pub fn new(unit_system: UnitSystem) -> Self {
        Self { unit_system }
    }

    /// Saturation vapour pressure over ice (at or below the triple point) or liquid water
    pub fn saturation_vapour_pressure(&self, dry_bulb: f64) -> Result<f64, PsychrometricsError> {
        let (min, max) = self.unit_system.dry_bulb_range();
        if !(min..=max).contains(&dry_bulb) {
            return Err(PsychrometricsError::TemperatureOutOfRange {
                temp: dry_bulb,
                min,
                max,
                unit_system: self.unit_system,
            });
        }

        let t = self.unit_system.absolute_temperature(dry_bulb)?;

        let over_ice = dry_bulb <= self.unit_system.triple_point_water();
        let ln_pws = match (self.unit_system, over_ice) {
            (UnitSystem::SI, true) => {
                -5.6745359e3 / t + 6.3925247 - 9.677843e-3 * t + 6.2215701e-7 * t.powi(2)
                    + 2.0747825e-9 * t.powi(3)
                    - 9.484024e-13 * t.powi(4)
                    + 4.1635019 * t.ln()
            }
            (UnitSystem::SI, false) => {
                -5.8002206e3 / t + 1.3914993 - 4.8640239e-2 * t + 4.1764768e-5 * t.powi(2)
                    - 1.4452093e-8 * t.powi(3)
                    + 6.5459673 * t.ln()
            }
            (UnitSystem::IP, true) => {
                -1.0214165e4 / t - 4.8932428 - 5.3765794e-3 * t + 1.9202377e-7 * t.powi(2)
                    + 3.5575832e-10 * t.powi(3)
                    - 9.0344688e-14 * t.powi(4)
                    + 4.1635019 * t.ln()
            }
            (UnitSystem::IP, false) => {
                -1.0440397e4 / t - 1.1294650e1 - 2.7022355e-2 * t + 1.2890360e-5 * t.powi(2)
                    - 2.4780681e-9 * t.powi(3)
                    + 6.5459673 * t.ln()
            }
        };

        Ok(ln_pws.exp())
    }
}

impl Psychrometrics for AshraePsychrometrics {
    fn humidity_ratio_from_wet_bulb(
        &self,
        dry_bulb: f64,
        wet_bulb: f64,
        pressure: f64,
    ) -> Result<f64, PsychrometricsError> {
        if wet_bulb > dry_bulb {
            return Err(PsychrometricsError::WetBulbAboveDryBulb { dry_bulb, wet_bulb });
        }

        let sat_hum_ratio_wet_bulb = self.saturation_humidity_ratio(wet_bulb, pressure)?;

        let hum_ratio = match self.unit_system {
            UnitSystem::SI if wet_bulb >= self.unit_system.freezing_point_water() => {
                ((2501. - 2.326 * wet_bulb) * sat_hum_ratio_wet_bulb
                    - 1.006 * (dry_bulb - wet_bulb))
                    / (2501. + 1.86 * dry_bulb - 4.186 * wet_bulb)
            }
            UnitSystem::SI => {
                ((2830. - 0.24 * wet_bulb) * sat_hum_ratio_wet_bulb
                    - 1.006 * (dry_bulb - wet_bulb))
                    / (2830. + 1.86 * dry_bulb - 2.1 * wet_bulb)
            }
            UnitSystem::IP if wet_bulb >= self.unit_system.freezing_point_water() => {
                ((1093. - 0.556 * wet_bulb) * sat_hum_ratio_wet_bulb
                    - 0.240 * (dry_bulb - wet_bulb))
                    / (1093. + 0.444 * dry_bulb - wet_bulb)
            }
            UnitSystem::IP => {
                ((1220. - 0.04 * wet_bulb) * sat_hum_ratio_wet_bulb
                    - 0.240 * (dry_bulb - wet_bulb))
                    / (1220. + 0.444 * dry_bulb - 0.48 * wet_bulb)
            }
        };

        Ok(max_of_2(hum_ratio, MIN_HUMIDITY_RATIO))
    }

    fn saturation_humidity_ratio(
        &self,
        dry_bulb: f64,
        pressure: f64,
    ) -> Result<f64, PsychrometricsError> {
        if pressure <= 0. {
            return Err(PsychrometricsError::NonPositivePressure(pressure));
        }

        let saturation_vapour_pressure = self.saturation_vapour_pressure(dry_bulb)?;
        if pressure <= saturation_vapour_pressure {
            return Err(PsychrometricsError::PressureBelowSaturation {
                pressure,
                saturation_vapour_pressure,
            });
        }

        let sat_hum_ratio = MOLECULAR_WEIGHT_RATIO * saturation_vapour_pressure
            / (pressure - saturation_vapour_pressure);

        Ok(max_of_2(sat_hum_ratio, MIN_HUMIDITY_RATIO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    const STANDARD_PRESSURE_PA: f64 = 101325.;
    const STANDARD_PRESSURE_PSI: f64 = 14.696;

    #[fixture]
    fn si() -> AshraePsychrometrics {
        AshraePsychrometrics::new(UnitSystem::SI)
    }

    #[fixture]
    fn ip() -> AshraePsychrometrics {
        AshraePsychrometrics::new(UnitSystem::IP)
    }

    #[rstest]
    #[case(-5., 401.7641224788012)]
    #[case(20., 2338.8037000739814)]
    fn test_saturation_vapour_pressure(
        si: AshraePsychrometrics,
        #[case] dry_bulb: f64,
        #[case] expected: f64,
    ) {
        assert_relative_eq!(
            si.saturation_vapour_pressure(dry_bulb).unwrap(),
            expected,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_saturation_vapour_pressure_out_of_range(si: AshraePsychrometrics) {
        assert_eq!(
            si.saturation_vapour_pressure(250.),
            Err(PsychrometricsError::TemperatureOutOfRange {
                temp: 250.,
                min: -100.,
                max: 200.,
                unit_system: UnitSystem::SI,
            })
        );
    }

    #[rstest]
    fn test_saturation_humidity_ratio(si: AshraePsychrometrics) {
        assert_relative_eq!(
            si.saturation_humidity_ratio(20., STANDARD_PRESSURE_PA)
                .unwrap(),
            0.01469505164977836,
            max_relative = 1e-12
        );
        // over ice, at the coil surface temperature of the reference heating point
        assert_relative_eq!(
            si.saturation_humidity_ratio(0.82 * 2.7 - 8.589, 98600.)
                .unwrap(),
            0.0022600322001453473,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_saturation_humidity_ratio_is_floored(si: AshraePsychrometrics) {
        assert_eq!(
            si.saturation_humidity_ratio(-90., STANDARD_PRESSURE_PA)
                .unwrap(),
            MIN_HUMIDITY_RATIO
        );
    }

    #[rstest]
    fn test_saturation_humidity_ratio_rejects_bad_pressure(si: AshraePsychrometrics) {
        assert_eq!(
            si.saturation_humidity_ratio(20., 0.),
            Err(PsychrometricsError::NonPositivePressure(0.))
        );
        assert!(matches!(
            si.saturation_humidity_ratio(100., 50000.),
            Err(PsychrometricsError::PressureBelowSaturation { .. })
        ));
    }

    #[rstest]
    #[case(25., 20., STANDARD_PRESSURE_PA, 0.012598004031751205)]
    #[case(2.7, 1.332824959, 98600., 0.003719876990264148)]
    #[case(-2., -3., 98600., 0.0026602892721719895)]
    fn test_humidity_ratio_from_wet_bulb(
        si: AshraePsychrometrics,
        #[case] dry_bulb: f64,
        #[case] wet_bulb: f64,
        #[case] pressure: f64,
        #[case] expected: f64,
    ) {
        assert_relative_eq!(
            si.humidity_ratio_from_wet_bulb(dry_bulb, wet_bulb, pressure)
                .unwrap(),
            expected,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_saturated_air_has_saturation_humidity_ratio(si: AshraePsychrometrics) {
        assert_relative_eq!(
            si.humidity_ratio_from_wet_bulb(5., 5., 98600.).unwrap(),
            si.saturation_humidity_ratio(5., 98600.).unwrap(),
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_humidity_ratio_rejects_wet_bulb_above_dry_bulb(si: AshraePsychrometrics) {
        assert_eq!(
            si.humidity_ratio_from_wet_bulb(2., 3., 98600.),
            Err(PsychrometricsError::WetBulbAboveDryBulb {
                dry_bulb: 2.,
                wet_bulb: 3.,
            })
        );
    }

    #[rstest]
    fn test_ip_unit_system(ip: AshraePsychrometrics) {
        assert_relative_eq!(
            ip.saturation_vapour_pressure(68.).unwrap(),
            0.33921465759971386,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            ip.saturation_humidity_ratio(68., STANDARD_PRESSURE_PSI)
                .unwrap(),
            0.014694993007785812,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            ip.humidity_ratio_from_wet_bulb(77., 68., STANDARD_PRESSURE_PSI)
                .unwrap(),
            0.01260025515949154,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_unit_system_conversions_to_si() {
        assert_eq!(UnitSystem::SI.temperature_to_celsius(2.7), 2.7);
        assert_eq!(UnitSystem::SI.pressure_to_pascals(98600.), 98600.);
        assert_relative_eq!(UnitSystem::IP.temperature_to_celsius(41.), 5., max_relative = 1e-12);
        assert_relative_eq!(
            UnitSystem::IP.pressure_to_pascals(STANDARD_PRESSURE_PSI),
            STANDARD_PRESSURE_PA,
            max_relative = 1e-5
        );
    }

    #[rstest]
    fn test_ip_and_si_agree(si: AshraePsychrometrics, ip: AshraePsychrometrics) {
        assert_relative_eq!(
            ip.humidity_ratio_from_wet_bulb(77., 68., STANDARD_PRESSURE_PSI)
                .unwrap(),
            si.humidity_ratio_from_wet_bulb(25., 20., STANDARD_PRESSURE_PA)
                .unwrap(),
            max_relative = 1e-3
        );
    }
}
