use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load dashboard configuration: {0}")]
    Load(#[from] config::ConfigError),
}
