//! Builds the Nuke script for a shot's daily review movie.
//!
//! The script is a copy of a template with placeholders filled in:
//!
//! | placeholder                  | value                                 |
//! |------------------------------|---------------------------------------|
//! | `___SHOTNAME___`             | `shot_` + batch name after `sc_`       |
//! | `___FIRST_FRAME___`          | first frame over all layers           |
//! | `___LAST_FRAME___`           | last frame over all layers            |
//! | `___RENDER_OUTPUT___`        | the movie path                        |
//! | `___<WRITE>_IN___filename`   | read path of layer or pass `<WRITE>`  |

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::DailyConfig;
use crate::frames::{self, Frame, ParseError};
use crate::model::{MayaJob, RenderLayer};
use crate::sanitize::redact_path;

#[derive(Error, Debug)]
pub enum DailyError {
    #[error("Job has no render layers")]
    NoLayers,

    #[error("Layers not submitted yet: {}", .layers.join(", "))]
    MissingDependencies { layers: Vec<String> },

    #[error("Layer '{layer}' has no frames")]
    MissingFrames { layer: String },

    #[error("Layer '{layer}' has no output directory")]
    MissingOutputDirectory { layer: String },

    #[error("Invalid frames: {0}")]
    Frames(#[from] ParseError),

    #[error("Failed to read template '{path}': {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write script '{path}': {source}")]
    WriteScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DailyError>;

/// Everything needed to write and submit a daily.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPlan {
    pub batch_name: String,
    pub shot_name: String,
    pub first_frame: Frame,
    pub last_frame: Frame,
    /// Read node name to image sequence path.
    pub read_paths: BTreeMap<String, String>,
    pub render_dir: String,
    pub movie_path: String,
    pub script_path: PathBuf,
    /// Farm ids of the layer jobs, in layer order.
    pub dependencies: Vec<String>,
}

impl DailyPlan {
    /// Frame range in `first-last` form.
    pub fn frames(&self) -> String {
        frames::format_range(self.first_frame, self.last_frame)
    }
}

fn to_slashes(s: &str) -> String {
    s.replace('\\', "/")
}

/// `shot_` followed by whatever comes after the last `sc_` in the batch name.
pub fn shot_name(batch_name: &str) -> String {
    let tail = batch_name.rsplit("sc_").next().unwrap_or(batch_name);
    format!("shot_{}", tail)
}

/// Name of the folder containing the layer's output directory.
fn scene_folder(output_directory: &str) -> &str {
    let mut parts = output_directory.rsplit(['/', '\\']).skip(1);
    parts.find(|p| !p.is_empty()).unwrap_or("")
}

fn join(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches(['/', '\\']), name)
}

/// Read paths for the layers, keyed by read node name. Layers listed in
/// `split_passes` contribute one entry per pass.
pub fn layer_read_paths(
    layers: &[RenderLayer],
    split_passes: &BTreeMap<String, Vec<String>>,
) -> Result<BTreeMap<String, String>> {
    let mut paths = BTreeMap::new();
    for layer in layers {
        let dir = layer
            .output_directory
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| DailyError::MissingOutputDirectory {
                layer: layer.layer_name.clone(),
            })?;
        let scene = scene_folder(dir);

        match split_passes.get(&layer.layer_name) {
            Some(passes) => {
                for pass in passes {
                    let file = format!("{}_{}.{}.####.exr", scene, layer.layer_name, pass);
                    paths.insert(pass.clone(), to_slashes(&join(&join(dir, pass), &file)));
                }
            }
            None => {
                let file = format!("{}_{}.####.exr", scene, layer.layer_name);
                paths.insert(layer.layer_name.clone(), to_slashes(&join(dir, &file)));
            }
        }
    }
    Ok(paths)
}

/// Directory the daily movie is rendered under: the scene file's directory
/// with the render-scenes folder swapped for the renders folder and the
/// local project root swapped for its network path.
pub fn render_dir(scene_file: &Path, config: &DailyConfig) -> String {
    let scene = to_slashes(&scene_file.to_string_lossy());
    let dir = match scene.rfind('/') {
        Some(i) => &scene[..i],
        None => "",
    };
    let mut dir = dir.replace(&config.render_scenes_dir, &config.renders_dir);
    if let (Some(local), Some(network)) = (&config.project_root, &config.network_root) {
        dir = dir.replace(&to_slashes(local), &to_slashes(network));
    }
    dir
}

/// Layers that feed the daily: renderable ones, plus disabled ones that
/// rendered in an earlier round.
fn daily_layers(job: &MayaJob) -> Vec<&RenderLayer> {
    job.render_layers
        .iter()
        .filter(|l| l.renderable || l.job_id.is_some())
        .collect()
}

/// Works out the daily for a job without touching the filesystem.
///
/// `submitted` holds the farm ids sent out in the current submission round;
/// the daily depends on exactly those. When it is empty (a daily submitted
/// on its own) every contributing layer must carry a recorded farm id and
/// those ids are used instead.
pub fn plan_daily(job: &MayaJob, config: &DailyConfig, submitted: &[String]) -> Result<DailyPlan> {
    let layers = daily_layers(job);
    if layers.is_empty() {
        return Err(DailyError::NoLayers);
    }

    let dependencies = if submitted.is_empty() {
        let missing: Vec<String> = layers
            .iter()
            .filter(|l| l.job_id.is_none())
            .map(|l| l.layer_name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(DailyError::MissingDependencies { layers: missing });
        }
        layers.iter().filter_map(|l| l.job_id.clone()).collect()
    } else {
        submitted.to_vec()
    };

    let mut first = Frame::MAX;
    let mut last = Frame::MIN;
    for layer in &layers {
        let span = frames::frame_span(layer.frames.as_deref().unwrap_or_default())?.ok_or_else(
            || DailyError::MissingFrames {
                layer: layer.layer_name.clone(),
            },
        )?;
        first = first.min(span.0);
        last = last.max(span.1);
    }

    let render_dir = render_dir(&job.scene_file, config);
    let movie_path = join(&join(&render_dir, "dailies"), &format!("{}.mov", job.batch_name));
    let script_path = config
        .scripts_root
        .join("dailies")
        .join(format!("{}.nk", job.batch_name));
    let read_layers: Vec<RenderLayer> = layers.into_iter().cloned().collect();

    Ok(DailyPlan {
        batch_name: job.batch_name.clone(),
        shot_name: shot_name(&job.batch_name),
        first_frame: first,
        last_frame: last,
        read_paths: layer_read_paths(&read_layers, &config.split_passes)?,
        render_dir,
        movie_path,
        script_path,
        dependencies,
    })
}

/// Fills the template's placeholders.
pub fn render_script(template: &str, plan: &DailyPlan) -> String {
    let mut text = template
        .replace("___SHOTNAME___", &plan.shot_name)
        .replace("___FIRST_FRAME___", &plan.first_frame.to_string())
        .replace("___LAST_FRAME___", &plan.last_frame.to_string())
        .replace("___RENDER_OUTPUT___", &to_slashes(&plan.movie_path));
    for (write, path) in &plan.read_paths {
        text = text.replace(&format!("___{}_IN___filename", write), &to_slashes(path));
    }
    text
}

/// Plans the daily, renders the template and writes the script.
pub fn build_daily(job: &MayaJob, config: &DailyConfig, submitted: &[String]) -> Result<DailyPlan> {
    let plan = plan_daily(job, config, submitted)?;

    let template_path = config.template_path();
    let template =
        std::fs::read_to_string(&template_path).map_err(|source| DailyError::Template {
            path: template_path.clone(),
            source,
        })?;

    if let Some(parent) = plan.script_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| DailyError::WriteScript {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&plan.script_path, render_script(&template, &plan)).map_err(|source| {
        DailyError::WriteScript {
            path: plan.script_path.clone(),
            source,
        }
    })?;

    tracing::info!(
        script = %redact_path(&plan.script_path),
        frames = %plan.frames(),
        "Wrote daily script"
    );
    Ok(plan)
}
