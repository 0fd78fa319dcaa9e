mod compare_floats;
pub mod core;
pub mod errors;
pub mod input;
pub mod output;

use crate::core::heating_systems::air_source_heat_pump::{OperatingPoint, PerformanceResult};
use crate::core::psychrometrics::UnitSystem;
use crate::core::units::joules_to_kwh;
use crate::errors::{AshpError, CalculationError, OutputError};
use crate::input::ingest_for_processing;
use crate::output::Output;
use csv::WriterBuilder;
use std::io::Read;
use tracing::{debug, info};

/// Evaluate every operating point in a JSON input against its equipment, write the
/// results through the given output and return them in input order.
pub fn run_project(
    input: impl Read,
    output: impl Output,
) -> Result<Vec<PerformanceResult>, AshpError> {
    let input = ingest_for_processing(input)?;
    let heat_pump = input.heat_pump();

    info!(
        operating_points = input.operating_points.len(),
        defrost_strategy = ?input.defrost_strategy,
        "evaluating heat pump performance"
    );

    let results = heat_pump
        .evaluate_all(&input.operating_points)
        .into_iter()
        .enumerate()
        .map(|(index, result)| result.map_err(|error| CalculationError::new(index, error)))
        .collect::<Result<Vec<_>, _>>()?;

    if !output.is_noop() {
        write_core_output_file(
            &output,
            &input.operating_points,
            input.calculation.unit_system,
            &results,
        )
            .and_then(|_| write_summary_output_file(&output, &results))
            .map_err(|e| AshpError::ErrorInOutput(OutputError::new(e)))?;
    }

    Ok(results)
}

/// Placeholder for the units of input temperatures, which depend on the unit system
const TEMPERATURE_UNITS: &str = "[temperature]";

const RESULTS_HEADINGS: [(&str, &str); 15] = [
    ("Operating point", "[count]"),
    ("Outdoor dry bulb temperature", TEMPERATURE_UNITS),
    ("Outdoor wet bulb temperature", TEMPERATURE_UNITS),
    ("Indoor wet bulb temperature", TEMPERATURE_UNITS),
    ("Delivered load", "[J]"),
    ("Defrost", "[-]"),
    ("Heating capacity multiplier", "[ratio]"),
    ("Input power multiplier", "[ratio]"),
    ("Defrost time fraction", "[ratio]"),
    ("Total heating capacity", "[W]"),
    ("Part load ratio", "[ratio]"),
    ("Part load factor", "[ratio]"),
    ("Runtime fraction", "[ratio]"),
    ("Heating energy", "[J]"),
    ("Defrost energy", "[J]"),
];

fn write_core_output_file(
    output: &impl Output,
    operating_points: &[OperatingPoint],
    unit_system: UnitSystem,
    results: &[PerformanceResult],
) -> anyhow::Result<()> {
    debug!("writing out results");
    let temperature_units = match unit_system {
        UnitSystem::SI => "[ºC]",
        UnitSystem::IP => "[ºF]",
    };
    let writer = output.writer_for_location_key("results", "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record(RESULTS_HEADINGS.iter().map(|(heading, _)| *heading))?;
    writer.write_record(RESULTS_HEADINGS.iter().map(|(_, units)| match *units {
        TEMPERATURE_UNITS => temperature_units,
        units => units,
    }))?;

    for (idx, (operating_point, result)) in operating_points.iter().zip(results).enumerate() {
        let mut row = vec![idx.to_string()];
        row.extend(
            [
                operating_point.temp_outdoor_dry_bulb,
                operating_point.temp_outdoor_wet_bulb,
                operating_point.temp_indoor_wet_bulb,
                operating_point.delivered_load,
            ]
            .map(|val| val.to_string()),
        );
        row.push(result.defrost.to_string());
        row.extend(
            [
                result.defrost.heating_capacity_multiplier(),
                result.defrost.input_power_multiplier(),
                result.defrost.time_fraction(),
                result.details.total_capacity,
                result.details.part_load_ratio,
                result.details.part_load_factor,
                result.details.runtime_fraction,
                result.heating_energy,
                result.defrost_energy,
            ]
            .map(|val| val.to_string()),
        );

        writer.write_record(&row)?;
    }

    debug!("flushing out CSV");
    writer.flush()?;

    Ok(())
}

fn write_summary_output_file(
    output: &impl Output,
    results: &[PerformanceResult],
) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key("results_summary", "csv")?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    let heating_energy = results.iter().map(|result| result.heating_energy).sum::<f64>();
    let defrost_energy = results.iter().map(|result| result.defrost_energy).sum::<f64>();
    let defrost_active_count = results
        .iter()
        .filter(|result| result.defrost.is_active())
        .count();

    writer.write_record(["Quantity", "Units", "Value"])?;
    writer.write_record(["Operating points", "[count]", results.len().to_string().as_str()])?;
    writer.write_record([
        "Operating points with defrost",
        "[count]",
        defrost_active_count.to_string().as_str(),
    ])?;
    writer.write_record([
        "Total heating energy",
        "[kWh]",
        joules_to_kwh(heating_energy).to_string().as_str(),
    ])?;
    writer.write_record([
        "Total defrost energy",
        "[kWh]",
        joules_to_kwh(defrost_energy).to_string().as_str(),
    ])?;
    writer.write_record([
        "Total electrical energy",
        "[kWh]",
        joules_to_kwh(heating_energy + defrost_energy).to_string().as_str(),
    ])?;

    writer.flush()?;

    Ok(())
}
