//! Isolated environment for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use renderdesk::config::{DailyConfig, DatabaseConfig};
use renderdesk::submit::SubmitSettings;
use renderdesk::Database;

/// Minimal daily template using every placeholder.
pub const DAILY_TEMPLATE: &str = "\
Root { name ___SHOTNAME___ first_frame ___FIRST_FRAME___ last_frame ___LAST_FRAME___ }
Read { file ___BEAUTY_IN___filename }
Read { file ___AO_Pass_IN___filename }
Write { name COMP_OUT file ___RENDER_OUTPUT___ }
";

pub struct TestHarness {
    temp_dir: TempDir,
    /// Scene files live under `<temp>/Render_scenes/ep01/`.
    pub scenes_dir: PathBuf,
    /// Daily scripts root, holding `template`.
    pub scripts_dir: PathBuf,
    pub db: Database,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        let scenes_dir = base.join("Render_scenes").join("ep01");
        let scripts_dir = base.join("nk_dailies");
        std::fs::create_dir_all(&scenes_dir).expect("Failed to create scenes dir");
        std::fs::create_dir_all(&scripts_dir).expect("Failed to create scripts dir");
        std::fs::write(scripts_dir.join("template"), DAILY_TEMPLATE)
            .expect("Failed to write daily template");

        let db = Database::open_in_memory().expect("Failed to open database");

        Self {
            temp_dir,
            scenes_dir,
            scripts_dir,
            db,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Creates a scene file and returns its path.
    pub fn write_scene(&self, filename: &str) -> PathBuf {
        let path = self.scenes_dir.join(filename);
        std::fs::write(&path, "//Maya ASCII 2020 scene").expect("Failed to write scene");
        path
    }

    /// Submission settings whose dailies are written inside the harness.
    pub fn settings(&self) -> SubmitSettings {
        SubmitSettings {
            daily: DailyConfig {
                scripts_root: self.scripts_dir.clone(),
                ..DailyConfig::default()
            },
            ..SubmitSettings::default()
        }
    }

    /// A file-backed database config inside the harness.
    pub fn database_config(&self, name: &str) -> DatabaseConfig {
        DatabaseConfig {
            name: name.to_string(),
            directory: Some(self.temp_path().join("db")),
            alias: "test".to_string(),
            in_memory: false,
        }
    }

    pub fn daily_script(&self, batch_name: &str) -> PathBuf {
        self.scripts_dir.join("dailies").join(format!("{}.nk", batch_name))
    }
}
