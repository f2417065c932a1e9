use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderdeskError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Frame range error: {0}")]
    Frames(#[from] crate::frames::ParseError),

    #[error("Validation error: {0}")]
    Validation(#[from] crate::validation::ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Farm error: {0}")]
    Farm(#[from] crate::farm::FarmError),

    #[error("Submission error: {0}")]
    Submit(#[from] crate::submit::SubmitError),

    #[error("Daily error: {0}")]
    Daily(#[from] crate::daily::DailyError),

    #[error("Secret error: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

pub type Result<T> = std::result::Result<T, RenderdeskError>;
