use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;
use crate::validation::{MAX_PRIORITY, MIN_PRIORITY};

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

/// Environment variable overriding `project_root`.
pub const PROJECT_ROOT_ENV: &str = "PROJECT_ROOT";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let mut config: Config = serde_json::from_value(json_value)?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let errors: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !errors.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: errors.join("; "),
        });
    }

    Ok(())
}

fn apply_env_overrides(config: &mut Config) {
    if let Some(root) = std::env::var_os(PROJECT_ROOT_ENV).filter(|v| !v.is_empty()) {
        config.project_root = Some(PathBuf::from(root));
    }
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.database.name.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "database.name must not be empty".to_string(),
        });
    }

    for (field, value) in [
        ("maya.layer_priority", config.maya.layer_priority),
        ("daily.priority", config.daily.priority),
    ] {
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&value) {
            return Err(ConfigError::Validation {
                message: format!(
                    "{} must be between {} and {}, got {}",
                    field, MIN_PRIORITY, MAX_PRIORITY, value
                ),
            });
        }
    }

    if config.daily.project_root.is_some() != config.daily.network_root.is_some() {
        return Err(ConfigError::Validation {
            message: "daily.project_root and daily.network_root must be set together".to_string(),
        });
    }

    if let Some(farm) = &config.farm {
        if farm.user_name.is_some()
            && !crate::secrets::has_secret_source(
                farm.password.as_deref(),
                farm.password_file.as_deref(),
                farm.password_env.as_deref(),
            )
        {
            tracing::warn!("farm.user_name is set without a password source");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_minimal_config() {
        std::env::remove_var(PROJECT_ROOT_ENV);
        let config = load_config_from_str(r#"{"version": "1.0"}"#).unwrap();
        assert_eq!(config.version, "1.0");
        assert!(config.project_root.is_none());
        assert_eq!(config.daily.priority, 80);
    }

    #[test]
    #[serial]
    fn test_load_full_config() {
        std::env::remove_var(PROJECT_ROOT_ENV);
        let config_json = r#"
        {
            "version": "1.0",
            "database": {"name": "rendering", "directory": "/data", "alias": "farm"},
            "farm": {"url": "http://deadline:8082", "user_name": "render", "password_env": "DL_PASS"},
            "maya": {"renderer": "arnold", "chunk_size": 5, "environment": {"MAYA_MODULE_PATH": "/pipe/render"}},
            "daily": {
                "scripts_root": "/repo/nk_dailies",
                "project_root": "Z:/Projects/Show",
                "network_root": "//nas/Projects/Show",
                "split_passes": {"FLOOR_AO": ["AO_Pass"]}
            },
            "project_root": "/projects/show"
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(config.database.alias, "farm");
        assert_eq!(config.farm.as_ref().unwrap().timeout_secs, 30);
        assert_eq!(config.maya.renderer, "arnold");
        assert_eq!(config.maya.chunk_size, 5);
        assert_eq!(config.daily.split_passes["FLOOR_AO"], vec!["AO_Pass"]);
        assert_eq!(config.project_root, Some(PathBuf::from("/projects/show")));
    }

    #[test]
    #[serial]
    fn test_project_root_env_override() {
        std::env::set_var(PROJECT_ROOT_ENV, "/mnt/override");
        let config =
            load_config_from_str(r#"{"version": "1.0", "project_root": "/projects/show"}"#)
                .unwrap();
        std::env::remove_var(PROJECT_ROOT_ENV);
        assert_eq!(config.project_root, Some(PathBuf::from("/mnt/override")));
    }

    #[test]
    fn test_missing_version() {
        let result = load_config_from_str(r#"{"database": {"name": "x"}}"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = load_config_from_str(r#"{"version": "1.0", "render_host": "localhost"}"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_farm_url_must_be_http() {
        let result = load_config_from_str(r#"{"version": "1.0", "farm": {"url": "deadline:8082"}}"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_unsupported_version() {
        let result = load_config_from_str(r#"{"version": "2.0"}"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_priority_out_of_range() {
        let result = load_config_from_str(r#"{"version": "1.0", "daily": {"priority": 101}}"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_root_remap_needs_both_sides() {
        let result =
            load_config_from_str(r#"{"version": "1.0", "daily": {"project_root": "Z:/Projects"}}"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_invalid_json() {
        let result = load_config_from_str("{ not json");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_read_missing_file() {
        let result = load_config("/nonexistent/renderdesk.json");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
