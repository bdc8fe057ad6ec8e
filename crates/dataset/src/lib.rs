//! Loading collaborator for the dashboard: reads the pre-joined sales CSV
//! into an immutable, time-sorted `RecordSet` and the state-boundary GeoJSON
//! for the choropleth map.
//!
//! The loader validates the schema up front: a missing required column is
//! reported by name before any row is parsed, and a malformed value is
//! reported with its row and column. Downstream crates can therefore assume
//! every `OrderRecord` is well-formed.

pub mod error;
pub mod geo;
pub mod loader;

pub use error::DatasetError;
pub use geo::StateBoundaries;
pub use loader::{load_csv, load_records};
