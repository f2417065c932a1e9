use tracing::{debug, info, info_span, warn};

use crate::config::{Config, DailyConfig, MayaSettings};
use crate::daily;
use crate::db::maya_job_repo::{self, LayerPatch};
use crate::db::Database;
use crate::farm::{DryRunFarm, FarmClient, RecordedSubmission};
use crate::model::{JobStatus, MayaJob, RenderLayer};
use crate::sanitize;

use super::error::SubmitError;
use super::payload::{build_daily_payload, build_layer_payload};

/// Plugin defaults used when building farm payloads.
#[derive(Debug, Clone, Default)]
pub struct SubmitSettings {
    pub maya: MayaSettings,
    pub daily: DailyConfig,
}

impl From<&Config> for SubmitSettings {
    fn from(config: &Config) -> Self {
        Self {
            maya: config.maya.clone(),
            daily: config.daily.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DailyOutcome {
    Submitted(String),
    /// The farm still had the previous daily, which was put back in the queue.
    Requeued(String),
    Failed(String),
}

/// What happened to each layer of a submitted job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    pub job_id: String,
    pub batch_name: String,
    /// `(layer_name, farm_id)` in layer order.
    pub submitted: Vec<(String, String)>,
    /// `(layer_name, error message)` in layer order.
    pub failed: Vec<(String, String)>,
    /// Layers flagged as not renderable.
    pub skipped: Vec<String>,
    pub daily: Option<DailyOutcome>,
}

impl SubmissionReport {
    pub fn all_submitted(&self) -> bool {
        self.failed.is_empty()
    }
}

fn load_job(db: &Database, id: &str) -> Result<MayaJob, SubmitError> {
    maya_job_repo::find_by_id(db, id)?.ok_or_else(|| SubmitError::JobNotFound { id: id.to_string() })
}

/// Submits one layer and returns the farm id.
fn submit_layer(
    farm: &dyn FarmClient,
    job: &MayaJob,
    layer: &RenderLayer,
    settings: &MayaSettings,
) -> Result<String, SubmitError> {
    let (job_info, plugin_info) = build_layer_payload(job, layer, settings)?;
    Ok(farm.submit_job(&job_info, &plugin_info)?)
}

/// Submits every renderable layer of a job, then its daily.
///
/// A failing layer is recorded in the report and the remaining layers are
/// still attempted. Every layer is written back afterwards; a failed attempt
/// leaves the layer's previous farm id in place. The job moves to
/// `rendering` when at least one layer went out.
pub fn submit_job(
    db: &Database,
    farm: &dyn FarmClient,
    id: &str,
    settings: &SubmitSettings,
) -> Result<SubmissionReport, SubmitError> {
    let job = load_job(db, id)?;
    let scene = sanitize::redact_path(&job.scene_file);
    let _span = info_span!("submit", job_id = %job.id, batch = %job.batch_name, scene = %scene)
        .entered();

    let mut report = SubmissionReport {
        job_id: job.id.clone(),
        batch_name: job.batch_name.clone(),
        ..SubmissionReport::default()
    };

    for layer in &job.render_layers {
        let _step = info_span!("layer", name = %layer.layer_name).entered();
        let mut layer = layer.clone();

        if layer.renderable {
            match submit_layer(farm, &job, &layer, &settings.maya) {
                Ok(farm_id) => {
                    info!(farm_id = %farm_id, "Layer submitted");
                    layer.job_id = Some(farm_id.clone());
                    report.submitted.push((layer.layer_name.clone(), farm_id));
                }
                Err(e) => {
                    warn!(error = %e, "Layer submission failed");
                    report.failed.push((layer.layer_name.clone(), e.to_string()));
                }
            }
        } else {
            debug!("Layer not renderable, skipped");
            report.skipped.push(layer.layer_name.clone());
        }

        maya_job_repo::update_layer(db, &job.id, &layer.layer_name, &LayerPatch::from_layer(&layer))?;
    }

    if !report.submitted.is_empty() {
        maya_job_repo::mark_submitted(db, &job.id)?;
    }

    let job = load_job(db, id)?;
    let round: Vec<String> = report.submitted.iter().map(|(_, id)| id.clone()).collect();
    let outcome = {
        let _step = info_span!("daily").entered();
        match submit_daily(db, farm, &job, settings, &round) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Daily not submitted");
                DailyOutcome::Failed(e.to_string())
            }
        }
    };
    report.daily = Some(outcome);

    info!(
        submitted = report.submitted.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        "Submission finished"
    );
    Ok(report)
}

/// Submits the review daily for a job, or requeues it if the farm still has
/// the one recorded on the job.
///
/// `submitted` lists the layer jobs sent in the same round; the daily waits
/// on those. Pass an empty slice for a daily submitted on its own.
pub fn submit_daily(
    db: &Database,
    farm: &dyn FarmClient,
    job: &MayaJob,
    settings: &SubmitSettings,
    submitted: &[String],
) -> Result<DailyOutcome, SubmitError> {
    if let (true, Some(existing)) = (job.has_daily, job.daily.as_deref()) {
        if farm.job_exists(existing)? {
            farm.requeue_job(existing)?;
            info!(farm_id = existing, "Daily requeued");
            return Ok(DailyOutcome::Requeued(existing.to_string()));
        }
        debug!(farm_id = existing, "Recorded daily no longer on the farm");
    }

    let plan = daily::build_daily(job, &settings.daily, submitted)?;
    let (job_info, plugin_info) = build_daily_payload(&plan, &settings.daily, &settings.maya.user_name);
    let farm_id = farm.submit_job(&job_info, &plugin_info)?;
    maya_job_repo::record_daily(db, &job.id, &farm_id)?;

    info!(farm_id = %farm_id, frames = %plan.frames(), "Daily submitted");
    Ok(DailyOutcome::Submitted(farm_id))
}

/// What a submission would send, produced without touching the store, the
/// farm or the daily scripts directory.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPreview {
    pub report: SubmissionReport,
    /// Layer jobs in order, then the daily.
    pub submissions: Vec<RecordedSubmission>,
}

/// Dry run of [`submit_job`]. Payloads go to a [`DryRunFarm`] and farm ids
/// only live on an in-memory copy of the job.
pub fn preview_job(
    db: &Database,
    id: &str,
    settings: &SubmitSettings,
) -> Result<SubmissionPreview, SubmitError> {
    let job = load_job(db, id)?;
    let _span = info_span!("preview", job_id = %job.id, batch = %job.batch_name).entered();
    let farm = DryRunFarm::new();

    let mut report = SubmissionReport {
        job_id: job.id.clone(),
        batch_name: job.batch_name.clone(),
        ..SubmissionReport::default()
    };
    let mut planned = job.clone();
    for layer in planned.render_layers.iter_mut() {
        if !layer.renderable {
            report.skipped.push(layer.layer_name.clone());
            continue;
        }
        match submit_layer(&farm, &job, layer, &settings.maya) {
            Ok(farm_id) => {
                layer.job_id = Some(farm_id.clone());
                report.submitted.push((layer.layer_name.clone(), farm_id));
            }
            Err(e) => report.failed.push((layer.layer_name.clone(), e.to_string())),
        }
    }

    let round: Vec<String> = report.submitted.iter().map(|(_, id)| id.clone()).collect();
    let daily = match daily::plan_daily(&planned, &settings.daily, &round) {
        Ok(plan) => {
            let (job_info, plugin_info) =
                build_daily_payload(&plan, &settings.daily, &settings.maya.user_name);
            DailyOutcome::Submitted(farm.submit_job(&job_info, &plugin_info)?)
        }
        Err(e) => DailyOutcome::Failed(SubmitError::from(e).to_string()),
    };
    report.daily = Some(daily);

    Ok(SubmissionPreview {
        report,
        submissions: farm.submissions(),
    })
}

/// Applies a farm status update, refusing moves the lifecycle does not allow
/// (e.g. `new → done`).
pub fn apply_status(db: &Database, id: &str, next: JobStatus) -> Result<(), SubmitError> {
    let job = load_job(db, id)?;
    if !job.status.can_transition_to(next) {
        return Err(SubmitError::InvalidTransition {
            from: job.status,
            to: next,
        });
    }
    maya_job_repo::set_status(db, id, next)?;
    Ok(())
}
