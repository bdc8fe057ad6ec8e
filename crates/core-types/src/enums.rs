use serde::{Deserialize, Serialize};

/// Which end of the rating scale a category-extremes query asks for.
///
/// An explicit enum rather than a boolean flag, so call sites read as
/// `RatingDirection::Worst` instead of an ambiguous `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingDirection {
    Best,
    Worst,
}

impl RatingDirection {
    /// Returns the opposite end of the scale.
    pub fn opposite(&self) -> Self {
        match self {
            RatingDirection::Best => RatingDirection::Worst,
            RatingDirection::Worst => RatingDirection::Best,
        }
    }
}
