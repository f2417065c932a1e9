//! Job documents stored in the render database.

pub mod light_preset;
pub mod maya_job;
pub mod nuke_job;
pub mod scene;
pub mod status;

pub use light_preset::{Light, LightPreset};
pub use maya_job::{LayerSummary, MayaJob, RenderLayer};
pub use nuke_job::NukeJob;
pub use scene::{comp_name, normalize_scene_path, shot_number};
pub use status::JobStatus;
