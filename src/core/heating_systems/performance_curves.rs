use serde::{Deserialize, Serialize};

/// This module provides the empirical correction curves applied to the rated
/// capacity and efficiency of an air-source heat pump.
///
/// Every curve is a plain polynomial and is evaluated without any range checking:
/// inputs outside the envelope the coefficients were fitted over are extrapolated.

/// A cubic curve `a + b*x + c*x^2 + d*x^3` of a single driver
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CubicCurve {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl CubicCurve {
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.a + self.b * x + self.c * x.powi(2) + self.d * x.powi(3)
    }
}

/// A biquadratic surface in two drivers:
/// `a + b*x + c*x^2 + d*y + e*y^2 + f*x*y`
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BiquadraticCurve {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl BiquadraticCurve {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.a
            + self.b * x
            + self.c * x.powi(2)
            + self.d * y
            + self.e * y.powi(2)
            + self.f * x * y
    }
}

/// Linear cycling-loss curve of the part load ratio
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PartLoadFactorCurve {
    pub intercept: f64,
    pub slope: f64,
}

impl PartLoadFactorCurve {
    pub fn evaluate(&self, part_load_ratio: f64) -> f64 {
        self.intercept + self.slope * part_load_ratio
    }
}

/// Total heating capacity modifier, driven by outdoor dry-bulb temperature (ºC)
pub const TOTAL_CAPACITY_TEMPERATURE_MODIFIER: CubicCurve =
    CubicCurve::new(0.758746, 0.027626, 0.000148716, 0.0000034992);

/// Total heating capacity modifier, driven by the fraction of rated air flow
pub const TOTAL_CAPACITY_FLOW_MODIFIER: CubicCurve = CubicCurve::new(0.84, 0.16, 0., 0.);

/// Energy efficiency modifier, driven by outdoor dry-bulb temperature (ºC)
pub const EER_TEMPERATURE_MODIFIER: CubicCurve =
    CubicCurve::new(1.19248, -0.0300438, 0.00103745, -0.000023328);

/// Energy efficiency modifier, driven by the fraction of rated air flow
pub const EER_FLOW_MODIFIER: CubicCurve = CubicCurve::new(1.3824, -0.4336, 0.0512, 0.);

pub const PART_LOAD_FACTOR: PartLoadFactorCurve = PartLoadFactorCurve {
    intercept: 0.85,
    slope: 0.15,
};

/// Defrost energy input ratio modifier, driven by indoor wet-bulb (x) and outdoor
/// dry-bulb (y) temperatures. The default surface is flat at unity.
pub const DEFROST_EIR_TEMPERATURE_MODIFIER: BiquadraticCurve =
    BiquadraticCurve::new(1., 0., 0., 0., 0., 0.);

/// The full set of correction curves for one piece of equipment. Any curve left
/// out of an input file takes its default coefficients.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerformanceCurves {
    pub total_capacity_temperature_modifier: CubicCurve,
    pub total_capacity_flow_modifier: CubicCurve,
    pub eer_temperature_modifier: CubicCurve,
    pub eer_flow_modifier: CubicCurve,
    pub part_load_factor: PartLoadFactorCurve,
    pub defrost_eir_temperature_modifier: BiquadraticCurve,
}

impl Default for PerformanceCurves {
    fn default() -> Self {
        Self {
            total_capacity_temperature_modifier: TOTAL_CAPACITY_TEMPERATURE_MODIFIER,
            total_capacity_flow_modifier: TOTAL_CAPACITY_FLOW_MODIFIER,
            eer_temperature_modifier: EER_TEMPERATURE_MODIFIER,
            eer_flow_modifier: EER_FLOW_MODIFIER,
            part_load_factor: PART_LOAD_FACTOR,
            defrost_eir_temperature_modifier: DEFROST_EIR_TEMPERATURE_MODIFIER,
        }
    }
}

impl PerformanceCurves {
    pub fn total_capacity_modifier(&self, temp_outdoor_dry_bulb: f64, flow_fraction: f64) -> f64 {
        self.total_capacity_temperature_modifier
            .evaluate(temp_outdoor_dry_bulb)
            * self.total_capacity_flow_modifier.evaluate(flow_fraction)
    }

    pub fn eer_modifier(&self, temp_outdoor_dry_bulb: f64, flow_fraction: f64) -> f64 {
        self.eer_temperature_modifier.evaluate(temp_outdoor_dry_bulb)
            * self.eer_flow_modifier.evaluate(flow_fraction)
    }

    pub fn part_load_factor(&self, part_load_ratio: f64) -> f64 {
        self.part_load_factor.evaluate(part_load_ratio)
    }

    pub fn defrost_eir_modifier(&self, temp_indoor_wet_bulb: f64, temp_outdoor_dry_bulb: f64) -> f64 {
        self.defrost_eir_temperature_modifier
            .evaluate(temp_indoor_wet_bulb, temp_outdoor_dry_bulb)
    }
}
