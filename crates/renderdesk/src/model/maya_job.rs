use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scene;
use super::status::JobStatus;
use crate::frames::{self, ParseError};

pub const DEFAULT_LAYER_PRIORITY: i64 = 50;
pub const DEFAULT_LIGHTING_DEPARTMENT: &str = "lighting";

/// A render layer embedded in a [`MayaJob`]. It has no identity outside its
/// parent job and is addressed by `layer_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderLayer {
    pub layer_name: String,
    #[serde(default)]
    pub batch_name: String,
    #[serde(default)]
    pub output_directory: Option<String>,
    #[serde(default)]
    pub output_filename: Option<String>,
    #[serde(default = "default_layer_priority")]
    pub priority: i64,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub frames: Option<String>,
    /// Farm job id from the last successful submission.
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default = "default_true")]
    pub renderable: bool,
}

fn default_layer_priority() -> i64 {
    DEFAULT_LAYER_PRIORITY
}

fn default_true() -> bool {
    true
}

impl RenderLayer {
    pub fn new(layer_name: impl Into<String>, batch_name: impl Into<String>) -> Self {
        Self {
            layer_name: layer_name.into(),
            batch_name: batch_name.into(),
            output_directory: None,
            output_filename: None,
            priority: DEFAULT_LAYER_PRIORITY,
            comment: String::new(),
            frames: None,
            job_id: None,
            renderable: true,
        }
    }

    /// Frames in coarse-to-fine render order.
    pub fn qc_frames(&self) -> Result<String, ParseError> {
        frames::frame_list(self.frames.as_deref().unwrap_or_default())
    }

    /// Name shown on the farm, `"<batch> - <layer>"`.
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.batch_name, self.layer_name)
    }
}

/// Frames and farm id of a layer, as returned by [`MayaJob::layers`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerSummary {
    pub frames: Option<String>,
    pub job_id: Option<String>,
}

/// A Maya lighting scene registered for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MayaJob {
    pub id: String,
    pub batch_name: String,
    pub scene_file: PathBuf,
    pub episode_name: Option<String>,
    pub camera_name: Option<String>,
    pub camera_list: Vec<String>,
    pub season: Option<String>,
    pub scene_preview: Option<String>,
    pub department: String,
    pub rez_env: String,
    pub status: JobStatus,
    pub has_daily: bool,
    /// Farm job id of the daily review job.
    pub daily: Option<String>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    pub render_layers: Vec<RenderLayer>,
}

impl MayaJob {
    /// Creates a new, unsubmitted job with a fresh id.
    pub fn new(batch_name: impl Into<String>, scene_file: impl Into<PathBuf>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            batch_name: batch_name.into(),
            scene_file: scene_file.into(),
            episode_name: None,
            camera_name: None,
            camera_list: Vec::new(),
            season: None,
            scene_preview: None,
            department: DEFAULT_LIGHTING_DEPARTMENT.to_string(),
            rez_env: String::new(),
            status: JobStatus::New,
            has_daily: false,
            daily: None,
            date_created: now,
            date_updated: now,
            render_layers: Vec::new(),
        }
    }

    pub fn with_layer(mut self, layer: RenderLayer) -> Self {
        self.render_layers.push(layer);
        self
    }

    pub fn layer(&self, name: &str) -> Option<&RenderLayer> {
        self.render_layers.iter().find(|l| l.layer_name == name)
    }

    pub fn layers(&self) -> BTreeMap<String, LayerSummary> {
        self.render_layers
            .iter()
            .map(|l| {
                (
                    l.layer_name.clone(),
                    LayerSummary {
                        frames: l.frames.clone(),
                        job_id: l.job_id.clone(),
                    },
                )
            })
            .collect()
    }

    /// Layer name to farm id, for layers that have been submitted.
    pub fn submitted_layers(&self) -> BTreeMap<String, String> {
        self.render_layers
            .iter()
            .filter_map(|l| l.job_id.clone().map(|id| (l.layer_name.clone(), id)))
            .collect()
    }

    pub fn shot_number(&self) -> Option<u32> {
        scene::shot_number(&self.scene_file)
    }
}

impl std::fmt::Display for MayaJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Maya Job - {}", self.batch_name)
    }
}
