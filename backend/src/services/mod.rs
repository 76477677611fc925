//! Business logic services for the Smart Irrigation Platform

pub mod irrigation;
pub mod weather;

pub use irrigation::IrrigationService;
pub use weather::WeatherService;
