use thiserror::Error;

pub const SECONDS_PER_MINUTE: u32 = 60;
pub const JOULES_PER_KILOWATT_HOUR: u32 = 3_600_000;
pub const PASCALS_PER_PSI: f64 = 6894.757293168;

pub(crate) const ZERO_CELSIUS_AS_KELVIN: f64 = 273.15;
pub(crate) const ZERO_FAHRENHEIT_AS_RANKINE: f64 = 459.67;

pub(crate) fn celsius_to_kelvin(temp_c: f64) -> Result<f64, BelowAbsoluteZeroError> {
    if temp_c < -ZERO_CELSIUS_AS_KELVIN {
        Err(BelowAbsoluteZeroError::from_c(temp_c))
    } else {
        Ok(temp_c + ZERO_CELSIUS_AS_KELVIN)
    }
}

pub(crate) fn fahrenheit_to_rankine(temp_f: f64) -> Result<f64, BelowAbsoluteZeroError> {
    if temp_f < -ZERO_FAHRENHEIT_AS_RANKINE {
        Err(BelowAbsoluteZeroError::from_f(temp_f))
    } else {
        Ok(temp_f + ZERO_FAHRENHEIT_AS_RANKINE)
    }
}

pub fn fahrenheit_to_celsius(temp_f: f64) -> f64 {
    (temp_f - 32.) / 1.8
}

pub fn psi_to_pascals(pressure_psi: f64) -> f64 {
    pressure_psi * PASCALS_PER_PSI
}

/// Convert a per-timestep energy in joules to kWh.
pub fn joules_to_kwh(energy_j: f64) -> f64 {
    energy_j / JOULES_PER_KILOWATT_HOUR as f64
}

#[derive(Debug, Error, PartialEq)]
#[error("A temperature of {k}ºK/{}ºC was encountered, which is less than absolute zero", k - ZERO_CELSIUS_AS_KELVIN)]
pub struct BelowAbsoluteZeroError {
    k: f64,
}

impl BelowAbsoluteZeroError {
    fn from_c(c: f64) -> Self {
        Self {
            k: c + ZERO_CELSIUS_AS_KELVIN,
        }
    }

    fn from_f(f: f64) -> Self {
        Self {
            k: (f + ZERO_FAHRENHEIT_AS_RANKINE) / 1.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_convert_celsius_to_kelvin() {
        assert_eq!(
            celsius_to_kelvin(20.0).unwrap(),
            293.15,
            "incorrect conversion of Celsius to Kelvin"
        );
        assert!(celsius_to_kelvin(-300.).is_err());
    }

    #[rstest]
    fn should_convert_fahrenheit_to_rankine() {
        assert_eq!(fahrenheit_to_rankine(32.).unwrap(), 491.67);
        assert!(fahrenheit_to_rankine(-500.).is_err());
    }

    #[rstest]
    #[case(0., 32.)]
    #[case(100., 212.)]
    #[case(-40., -40.)]
    #[case(7.222, 44.9996)]
    fn should_convert_fahrenheit_to_celsius(#[case] temp_c: f64, #[case] temp_f: f64) {
        assert_relative_eq!(fahrenheit_to_celsius(temp_f), temp_c, epsilon = 1e-12);
    }

    #[rstest]
    fn should_convert_psi_to_pascals() {
        assert_relative_eq!(psi_to_pascals(14.695949), 101325., max_relative = 1e-6);
    }

    #[rstest]
    fn should_report_below_absolute_zero_in_kelvin() {
        let error = celsius_to_kelvin(-280.).unwrap_err();
        assert!(error.to_string().contains("less than absolute zero"));
    }

    #[rstest]
    fn should_convert_joules_to_kwh() {
        assert_eq!(joules_to_kwh(3_600_000.), 1.);
    }
}
