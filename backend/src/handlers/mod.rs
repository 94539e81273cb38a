//! HTTP handlers for the dashboard API

mod data_source;
mod health;
mod polygon;
mod timeline;

pub use data_source::*;
pub use health::*;
pub use polygon::*;
pub use timeline::*;
