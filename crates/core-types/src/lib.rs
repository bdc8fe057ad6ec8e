pub mod enums;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::RatingDirection;
pub use structs::{DateRange, OrderRecord, RecordSet};
