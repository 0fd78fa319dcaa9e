use crate::core::heating_systems::air_source_heat_pump::{
    AirSourceHeatPump, CalculationConfig, EquipmentRating, OperatingPoint,
};
use crate::core::heating_systems::defrost::DefrostStrategy;
use crate::core::heating_systems::performance_curves::PerformanceCurves;
use anyhow::bail;
use serde::Deserialize;
use std::io::{BufReader, Read};

pub fn ingest_for_processing(json: impl Read) -> Result<Input, anyhow::Error> {
    let input: Input = serde_json::from_reader(BufReader::new(json))?;
    input.validate()?;

    Ok(input)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Input {
    pub equipment: EquipmentRating,
    #[serde(default)]
    pub defrost_strategy: DefrostStrategy,
    #[serde(default)]
    pub curves: PerformanceCurves,
    #[serde(default)]
    pub calculation: CalculationConfig,
    pub operating_points: Vec<OperatingPoint>,
}

impl Input {
    /// Checks on the shape of the request only. Physical consistency of the
    /// operating points is left to the calculation, and values outside the range
    /// the correction curves were fitted over are accepted as given.
    fn validate(&self) -> anyhow::Result<()> {
        if self.operating_points.is_empty() {
            bail!("At least one operating point must be provided");
        }
        if !(self.calculation.timestep_seconds > 0.) {
            bail!(
                "Timestep must be a positive number of seconds, but was {}",
                self.calculation.timestep_seconds
            );
        }
        if let DefrostStrategy::Timed {
            time_fraction: Some(time_fraction),
        } = self.defrost_strategy
        {
            if !(0. ..=1.).contains(&time_fraction) {
                bail!("Timed defrost fraction must be between 0 and 1, but was {time_fraction}");
            }
        }

        Ok(())
    }

    pub fn heat_pump(&self) -> AirSourceHeatPump {
        AirSourceHeatPump::new(
            self.equipment,
            self.curves,
            self.defrost_strategy,
            self.calculation,
        )
    }
}
