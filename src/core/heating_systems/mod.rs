pub mod air_source_heat_pump;
pub mod defrost;
pub mod performance_curves;
