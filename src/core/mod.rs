pub mod heating_systems;
pub mod psychrometrics;
pub mod units;
