use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Required column '{0}' is missing from the dataset")]
    MissingColumn(String),

    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid value '{value}' in column '{column}' at row {row}: {reason}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
        reason: String,
    },

    #[error("Boundary file is not a GeoJSON FeatureCollection")]
    InvalidBoundaries,
}
