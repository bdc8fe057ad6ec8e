use crate::error::DatasetError;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// The state-boundary GeoJSON for the choropleth, plus the set of region
/// codes its features are keyed on (`feature.id`).
///
/// The aggregation layer only produces `(region_code, count)` pairs; the
/// actual shading happens in the consuming map renderer. Keeping the parsed
/// document here lets the server hand both to the frontend in one response.
#[derive(Debug, Clone)]
pub struct StateBoundaries {
    geojson: Value,
    region_codes: HashSet<String>,
}

impl StateBoundaries {
    /// Loads the boundary file from disk.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        let boundaries = Self::from_reader(BufReader::new(file))?;
        tracing::info!(
            regions = boundaries.region_codes.len(),
            path = %path.display(),
            "Loaded state boundary GeoJSON."
        );
        Ok(boundaries)
    }

    /// Parses a GeoJSON FeatureCollection whose features carry a region code
    /// in their `id` field.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let geojson: Value =
            serde_json::from_reader(reader).map_err(|_| DatasetError::InvalidBoundaries)?;

        let features = geojson
            .get("features")
            .and_then(Value::as_array)
            .ok_or(DatasetError::InvalidBoundaries)?;

        let region_codes = features
            .iter()
            .filter_map(|feature| feature.get("id").and_then(Value::as_str))
            .map(str::to_string)
            .collect();

        Ok(Self {
            geojson,
            region_codes,
        })
    }

    pub fn geojson(&self) -> &Value {
        &self.geojson
    }

    pub fn region_codes(&self) -> &HashSet<String> {
        &self.region_codes
    }

    pub fn contains(&self, region_code: &str) -> bool {
        self.region_codes.contains(region_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": "SP", "geometry": null, "properties": {"name": "Sao Paulo"}},
            {"type": "Feature", "id": "RJ", "geometry": null, "properties": {"name": "Rio de Janeiro"}}
        ]
    }"#;

    #[test]
    fn extracts_region_codes_from_feature_ids() {
        let boundaries = StateBoundaries::from_reader(BOUNDARIES.as_bytes()).unwrap();
        assert_eq!(boundaries.region_codes().len(), 2);
        assert!(boundaries.contains("SP"));
        assert!(boundaries.contains("RJ"));
        assert!(!boundaries.contains("MG"));
    }

    #[test]
    fn rejects_documents_without_features() {
        let err = StateBoundaries::from_reader(br#"{"type": "Feature"}"#.as_slice()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidBoundaries));
    }
}
