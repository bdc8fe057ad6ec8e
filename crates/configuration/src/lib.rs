use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{DatasetPaths, ServerSettings, Settings, ViewDefaults};

/// Loads the application configuration from the `dashboard.toml` file.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file, deserializes it into our strongly-typed `Settings`
/// struct, and returns it.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        // Environment variables with the DASHBOARD_ prefix override the file,
        // e.g. DASHBOARD_SERVER__PORT=8080.
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_reports_load_error() {
        let err = load_config(Path::new("no-such-dashboard.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn server_and_view_defaults_apply_when_sections_are_omitted() {
        let toml = r#"
            [dataset]
            orders_path = "data/all_data.csv"
            boundaries_path = "data/brazil_geo.json"
        "#;
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.views.rating_extremes_k, 5);
        assert_eq!(settings.views.category_volume_k, 10);
    }
}
