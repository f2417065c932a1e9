//! Farm payloads for layer renders and dailies.

use crate::config::{DailyConfig, MayaSettings};
use crate::daily::DailyPlan;
use crate::farm::{JobInfo, PluginInfo};
use crate::model::{MayaJob, RenderLayer};

use super::error::SubmitError;

fn info<const N: usize>(pairs: [(&str, String); N]) -> JobInfo {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Job and plugin info for rendering one layer with the MayaBatch plugin.
///
/// Frames are sent in coarse-to-fine order so the first finished frames
/// already cover the whole range.
pub fn build_layer_payload(
    job: &MayaJob,
    layer: &RenderLayer,
    settings: &MayaSettings,
) -> Result<(JobInfo, PluginInfo), SubmitError> {
    let frames = layer.qc_frames().map_err(|source| SubmitError::Frames {
        layer: layer.layer_name.clone(),
        source,
    })?;
    if frames.is_empty() {
        return Err(SubmitError::NoFrames {
            layer: layer.layer_name.clone(),
        });
    }
    let output_directory = layer.output_directory.clone().unwrap_or_default();
    let scene_file = job.scene_file.to_string_lossy().into_owned();

    let mut job_info = info([
        ("BatchName", job.batch_name.clone()),
        ("Group", settings.group.clone()),
        ("Department", job.department.clone()),
        ("Frames", frames),
        ("Name", layer.display_name()),
        ("Priority", layer.priority.to_string()),
        ("OutputDirectory0", output_directory.clone()),
        (
            "OutputFilename0",
            layer.output_filename.clone().unwrap_or_default(),
        ),
        ("Comment", layer.comment.clone()),
        ("OverrideTaskExtraInfoNames", "False".to_string()),
        ("Plugin", "MayaBatch".to_string()),
        ("UserName", settings.user_name.clone()),
        ("ChunkSize", settings.chunk_size.to_string()),
    ]);
    for (n, (key, value)) in settings.environment.iter().enumerate() {
        job_info.insert(format!("EnvironmentKeyValue{}", n), format!("{}={}", key, value));
    }

    let plugin_info = info([
        ("Animation", "1".to_string()),
        ("Build", "64bit".to_string()),
        ("Camera", job.camera_name.clone().unwrap_or_default()),
        ("SceneFile", scene_file),
        ("OutputFilePath", output_directory),
        ("RenderLayer", layer.layer_name.clone()),
        ("FrameNumberOffset", "0".to_string()),
        ("IgnoreError211", "0".to_string()),
        ("ImageHeight", settings.image_height.to_string()),
        ("ImageWidth", settings.image_width.to_string()),
        ("OutputFilePrefix", settings.output_file_prefix.clone()),
        ("RenderSetupIncludeLights", "1".to_string()),
        ("Renderer", settings.renderer.clone()),
        ("StrictErrorChecking", "0".to_string()),
        ("UseLegacyRenderLayers", "1".to_string()),
        ("UseLocalAssetCaching", "0".to_string()),
        ("UsingRenderLayers", "1".to_string()),
        ("VRayAutoMemoryBuffer", "500".to_string()),
        ("VRayAutoMemoryEnabled", "0".to_string()),
        ("Version", settings.version.clone()),
    ]);

    Ok((job_info, plugin_info))
}

/// Job and plugin info for the Nuke daily. The daily waits on every layer
/// job through `JobDependency<n>` entries.
pub fn build_daily_payload(
    plan: &DailyPlan,
    config: &DailyConfig,
    user_name: &str,
) -> (JobInfo, PluginInfo) {
    let mut job_info = info([
        ("BatchName", plan.batch_name.clone()),
        ("Name", format!("{} - Daily", plan.batch_name)),
        ("ChunkSize", config.chunk_size.to_string()),
        ("Department", config.department.clone()),
        ("EventOptIns", String::new()),
        ("Frames", plan.frames()),
        ("OutputFilename0", plan.movie_path.clone()),
        ("Group", config.group.clone()),
        ("OverrideTaskExtraInfoNames", "False".to_string()),
        ("Plugin", "Nuke".to_string()),
        ("Priority", config.priority.to_string()),
        ("UserName", user_name.to_string()),
    ]);
    for (n, dependency) in plan.dependencies.iter().enumerate() {
        job_info.insert(format!("JobDependency{}", n), dependency.clone());
    }

    let plugin_info = info([
        ("BatchMode", "True".to_string()),
        ("BatchModeIsMovie", "True".to_string()),
        ("ContinueOnError", "True".to_string()),
        ("EnforceRenderOrder", "False".to_string()),
        ("GpuOverride", "0".to_string()),
        ("NukeX", "True".to_string()),
        ("PerformanceProfiler", "False".to_string()),
        ("RamUse", "0".to_string()),
        ("RenderMode", "Use Scene Settings".to_string()),
        ("SceneFile", plan.script_path.to_string_lossy().into_owned()),
        ("StackSize", "0".to_string()),
        ("Threads", "0".to_string()),
        ("UseGpu", "False".to_string()),
        ("Version", config.nuke_version.clone()),
        ("Views", String::new()),
        ("WriteNode", config.write_node.clone()),
    ]);

    (job_info, plugin_info)
}
