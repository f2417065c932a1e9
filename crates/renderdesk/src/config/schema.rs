use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::maya_job::DEFAULT_LAYER_PRIORITY;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub farm: Option<FarmConfig>,
    #[serde(default)]
    pub maya: MayaSettings,
    #[serde(default)]
    pub daily: DailyConfig,
    /// Root that relative scene paths are joined onto. `PROJECT_ROOT`
    /// overrides it.
    #[serde(default)]
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Resolves a scene path against `project_root` when it is relative.
    pub fn resolve_scene_path(&self, path: impl Into<PathBuf>) -> PathBuf {
        let path = path.into();
        match &self.project_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            database: DatabaseConfig::default(),
            farm: None,
            maya: MayaSettings::default(),
            daily: DailyConfig::default(),
            project_root: None,
        }
    }
}

/// Where the job documents live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_name")]
    pub name: String,
    /// Directory holding `<name>.db`. Defaults to the platform data dir.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_alias")]
    pub alias: String,
    #[serde(default)]
    pub in_memory: bool,
}

fn default_database_name() -> String {
    "rendering".to_string()
}

fn default_alias() -> String {
    "default".to_string()
}

impl DatabaseConfig {
    pub fn in_memory() -> Self {
        Self {
            in_memory: true,
            ..Self::default()
        }
    }

    /// The database file, or `None` for an in-memory store.
    pub fn path(&self) -> Option<PathBuf> {
        if self.in_memory {
            return None;
        }
        let dir = self
            .directory
            .clone()
            .or_else(crate::db::default_data_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Some(dir.join(format!("{}.db", self.name)))
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_database_name(),
            directory: None,
            alias: default_alias(),
            in_memory: false,
        }
    }
}

/// Deadline Web Service connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmConfig {
    pub url: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_file: Option<String>,
    #[serde(default)]
    pub password_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Defaults for MayaBatch layer submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MayaSettings {
    #[serde(default = "default_renderer")]
    pub renderer: String,
    #[serde(default = "default_maya_version")]
    pub version: String,
    #[serde(default = "default_image_width")]
    pub image_width: u32,
    #[serde(default = "default_image_height")]
    pub image_height: u32,
    #[serde(default = "default_output_prefix")]
    pub output_file_prefix: String,
    #[serde(default = "default_layer_chunk_size")]
    pub chunk_size: u32,
    #[serde(default = "default_maya_group")]
    pub group: String,
    #[serde(default = "default_farm_user")]
    pub user_name: String,
    #[serde(default = "default_layer_priority")]
    pub layer_priority: i64,
    /// Extra `KEY=VALUE` pairs passed to the render process.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

fn default_renderer() -> String {
    "vray".to_string()
}

fn default_maya_version() -> String {
    "2020".to_string()
}

fn default_image_width() -> u32 {
    1920
}

fn default_image_height() -> u32 {
    1080
}

fn default_output_prefix() -> String {
    "<Scene>_<Layer>".to_string()
}

fn default_layer_chunk_size() -> u32 {
    1
}

fn default_maya_group() -> String {
    "maya".to_string()
}

fn default_farm_user() -> String {
    "admin".to_string()
}

fn default_layer_priority() -> i64 {
    DEFAULT_LAYER_PRIORITY
}

impl Default for MayaSettings {
    fn default() -> Self {
        Self {
            renderer: default_renderer(),
            version: default_maya_version(),
            image_width: default_image_width(),
            image_height: default_image_height(),
            output_file_prefix: default_output_prefix(),
            chunk_size: default_layer_chunk_size(),
            group: default_maya_group(),
            user_name: default_farm_user(),
            layer_priority: default_layer_priority(),
            environment: BTreeMap::new(),
        }
    }
}

/// Settings for the Nuke daily that assembles a shot's layers into a movie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyConfig {
    /// Generated scripts go to `<scripts_root>/dailies/`.
    #[serde(default = "default_scripts_root")]
    pub scripts_root: PathBuf,
    /// Template script. Defaults to `<scripts_root>/template`.
    #[serde(default)]
    pub template: Option<PathBuf>,
    #[serde(default = "default_render_scenes_dir")]
    pub render_scenes_dir: String,
    #[serde(default = "default_renders_dir")]
    pub renders_dir: String,
    /// Local project root rewritten to `network_root` in render paths.
    #[serde(default)]
    pub project_root: Option<String>,
    #[serde(default)]
    pub network_root: Option<String>,
    #[serde(default = "default_daily_priority")]
    pub priority: i64,
    #[serde(default = "default_daily_group")]
    pub group: String,
    #[serde(default = "default_daily_chunk_size")]
    pub chunk_size: u32,
    #[serde(default = "default_daily_department")]
    pub department: String,
    #[serde(default = "default_nuke_version")]
    pub nuke_version: String,
    #[serde(default = "default_write_node")]
    pub write_node: String,
    /// Layers rendered as several passes, each read by its own node.
    #[serde(default = "default_split_passes")]
    pub split_passes: BTreeMap<String, Vec<String>>,
}

fn default_scripts_root() -> PathBuf {
    PathBuf::from("nk_dailies")
}

fn default_render_scenes_dir() -> String {
    "Render_scenes".to_string()
}

fn default_renders_dir() -> String {
    "Render".to_string()
}

fn default_daily_priority() -> i64 {
    80
}

fn default_daily_group() -> String {
    "nuke".to_string()
}

fn default_daily_chunk_size() -> u32 {
    1000
}

fn default_daily_department() -> String {
    "lighting".to_string()
}

fn default_nuke_version() -> String {
    "11.3".to_string()
}

fn default_write_node() -> String {
    "COMP_OUT".to_string()
}

fn default_split_passes() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([(
        "FLOOR_AO".to_string(),
        vec!["AO_Pass".to_string(), "matteShadow".to_string()],
    )])
}

impl DailyConfig {
    pub fn template_path(&self) -> PathBuf {
        self.template
            .clone()
            .unwrap_or_else(|| self.scripts_root.join("template"))
    }
}

impl Default for DailyConfig {
    fn default() -> Self {
        Self {
            scripts_root: default_scripts_root(),
            template: None,
            render_scenes_dir: default_render_scenes_dir(),
            renders_dir: default_renders_dir(),
            project_root: None,
            network_root: None,
            priority: default_daily_priority(),
            group: default_daily_group(),
            chunk_size: default_daily_chunk_size(),
            department: default_daily_department(),
            nuke_version: default_nuke_version(),
            write_node: default_write_node(),
            split_passes: default_split_passes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path() {
        let config = DatabaseConfig {
            name: "rendering".to_string(),
            directory: Some(PathBuf::from("/data")),
            alias: "default".to_string(),
            in_memory: false,
        };
        assert_eq!(config.path(), Some(PathBuf::from("/data/rendering.db")));
        assert_eq!(DatabaseConfig::in_memory().path(), None);
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: Config = serde_json::from_str(r#"{"version": "1.0"}"#).unwrap();
        assert!(config.farm.is_none());
        assert_eq!(config.database.name, "rendering");
        assert_eq!(config.maya.renderer, "vray");
        assert_eq!(config.daily.write_node, "COMP_OUT");
        assert_eq!(
            config.daily.split_passes["FLOOR_AO"],
            vec!["AO_Pass", "matteShadow"]
        );
        assert_eq!(
            config.daily.template_path(),
            PathBuf::from("nk_dailies/template")
        );
    }

    #[test]
    fn test_resolve_scene_path() {
        let config = Config {
            project_root: Some(PathBuf::from("/projects/show")),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_scene_path("ep01/sc_010.ma"),
            PathBuf::from("/projects/show/ep01/sc_010.ma")
        );
        assert_eq!(
            config.resolve_scene_path("/abs/sc_010.ma"),
            PathBuf::from("/abs/sc_010.ma")
        );
    }
}
