//! Domain models for the Weather Polygon Dashboard

mod data_source;
mod polygon;
mod weather;

pub use data_source::*;
pub use polygon::*;
pub use weather::*;
