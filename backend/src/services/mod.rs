//! Business logic services for the Weather Polygon Dashboard

pub mod dashboard;
pub mod polygon;

pub use dashboard::Dashboard;
pub use polygon::{PolygonEvent, PolygonStore, SharedRegistry};
