use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::scene;
use crate::frames;

pub const DEFAULT_COMP_DEPARTMENT: &str = "compositing";
pub const DEFAULT_NUKE_PRIORITY: i64 = 100;
pub const DEFAULT_NUKE_VERSION: &str = "11.3";
pub const DEFAULT_RENDER_EXTENSION: &str = "exr";

/// A Nuke comp script registered for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NukeJob {
    pub id: String,
    pub batch_name: String,
    pub scene_file: PathBuf,
    pub frames: String,
    pub group: Option<String>,
    pub department: String,
    pub output_directory: Option<String>,
    pub rez_env: String,
    pub priority: i64,
    pub nuke_version: String,
    pub render_extension: String,
    pub job_id: Option<String>,
}

impl NukeJob {
    pub fn new(
        batch_name: impl Into<String>,
        scene_file: impl Into<PathBuf>,
        frames: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            batch_name: batch_name.into(),
            scene_file: scene_file.into(),
            frames: frames.into(),
            group: None,
            department: DEFAULT_COMP_DEPARTMENT.to_string(),
            output_directory: None,
            rez_env: String::new(),
            priority: DEFAULT_NUKE_PRIORITY,
            nuke_version: DEFAULT_NUKE_VERSION.to_string(),
            render_extension: DEFAULT_RENDER_EXTENSION.to_string(),
            job_id: None,
        }
    }

    /// Derives a job from a comp laid out as `<episode>/<shot>/<comp dir>/<comp>.nk`:
    /// the batch is the episode folder and renders go to `<shot>/render`.
    pub fn from_comp(comp_file: impl Into<PathBuf>, first: i64, last: i64) -> Self {
        let comp_file = comp_file.into();
        let shot_dir = comp_file.parent().and_then(Path::parent);
        let episode = shot_dir
            .and_then(Path::parent)
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut job = Self::new(episode, comp_file.clone(), frames::format_range(first, last));
        job.group = Some("nuke".to_string());
        job.output_directory = shot_dir.map(|d| d.join("render").to_string_lossy().into_owned());
        job
    }

    pub fn comp_name(&self) -> String {
        scene::comp_name(&self.scene_file)
    }

    /// Output file pattern with a `####` frame placeholder.
    pub fn output_filename(&self) -> String {
        format!("{}.####.{}", self.comp_name(), self.render_extension)
    }

    pub fn shot_number(&self) -> Option<u32> {
        scene::shot_number(&self.scene_file)
    }
}

impl std::fmt::Display for NukeJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.comp_name())
    }
}
