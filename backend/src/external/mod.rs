//! External API integrations

pub mod weather;

pub use weather::{FetchError, OpenMeteoClient, WeatherFetcher};
