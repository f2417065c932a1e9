//! Write-time validation of job documents.
//!
//! Every check runs against the live filesystem; nothing is cached between
//! writes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::frames::{FrameList, ParseError};
use crate::model::{LightPreset, MayaJob, NukeJob, RenderLayer};

pub const MIN_PRIORITY: i64 = 1;
pub const MAX_PRIORITY: i64 = 100;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Scene file does not exist: {0}")]
    SceneFileMissing(PathBuf),

    #[error("Scene file must be an absolute path: {0}")]
    SceneFileNotAbsolute(PathBuf),

    #[error("Priority {value} for {field} is out of range (1-100)")]
    PriorityOutOfRange { field: String, value: i64 },

    #[error("Duplicate render layer '{0}'")]
    DuplicateLayer(String),

    #[error("Invalid frames for {field}: {source}")]
    InvalidFrames {
        field: String,
        #[source]
        source: ParseError,
    },

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Unknown job status '{0}'")]
    UnknownStatus(String),
}

pub type Result<T> = std::result::Result<T, ValidationError>;

pub fn check_scene_file(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::MissingField("scene_file"));
    }
    if !path.is_absolute() {
        return Err(ValidationError::SceneFileNotAbsolute(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(ValidationError::SceneFileMissing(path.to_path_buf()));
    }
    Ok(())
}

pub fn check_priority(field: &str, value: i64) -> Result<()> {
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&value) {
        return Err(ValidationError::PriorityOutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

pub fn check_frames(field: &str, expr: &str) -> Result<FrameList> {
    FrameList::parse(expr).map_err(|source| ValidationError::InvalidFrames {
        field: field.to_string(),
        source,
    })
}

pub fn validate_layer(layer: &RenderLayer) -> Result<()> {
    if layer.layer_name.trim().is_empty() {
        return Err(ValidationError::MissingField("layer_name"));
    }
    check_priority(&format!("layer '{}'", layer.layer_name), layer.priority)?;
    if let Some(frames) = &layer.frames {
        check_frames(&format!("layer '{}'", layer.layer_name), frames)?;
    }
    Ok(())
}

pub fn validate_maya_job(job: &MayaJob) -> Result<()> {
    check_scene_file(&job.scene_file)?;

    let mut seen = HashSet::new();
    for layer in &job.render_layers {
        validate_layer(layer)?;
        if !seen.insert(layer.layer_name.as_str()) {
            return Err(ValidationError::DuplicateLayer(layer.layer_name.clone()));
        }
    }
    Ok(())
}

pub fn validate_nuke_job(job: &NukeJob) -> Result<()> {
    check_scene_file(&job.scene_file)?;
    if job.frames.trim().is_empty() {
        return Err(ValidationError::MissingField("frames"));
    }
    check_frames("frames", &job.frames)?;
    check_priority("priority", job.priority)
}

pub fn validate_light_preset(preset: &LightPreset) -> Result<()> {
    if preset.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    Ok(())
}
