//! Shared domain core for the Weather Polygon Dashboard
//!
//! This crate contains the pure, synchronous logic shared between the backend
//! server and the browser (via WASM): geometry, threshold evaluation, the
//! data-source registry and the timeline cursor.

pub mod error;
pub mod geometry;
pub mod models;
pub mod registry;
pub mod threshold;
pub mod timeline;
pub mod types;
pub mod validation;

pub use error::*;
pub use geometry::*;
pub use models::*;
pub use registry::*;
pub use threshold::*;
pub use timeline::*;
pub use types::*;
pub use validation::*;
