use anyhow::{bail, Context};
use renderdesk::db::maya_job_repo::{self, LayerPatch, MayaJobFilter};
use renderdesk::farm::DeadlineClient;
use renderdesk::submit::{self, SubmitSettings};
use renderdesk::{with_session, Config, JobStatus, MayaJob, RenderLayer};

use crate::args::MayaCmd;
use crate::print;

/// Parses a `NAME=FRAMES` layer argument.
fn parse_layer(arg: &str, batch: &str, config: &Config) -> anyhow::Result<RenderLayer> {
    let (name, frames) = arg
        .split_once('=')
        .with_context(|| format!("layer '{}' must look like NAME=FRAMES", arg))?;
    let mut layer = RenderLayer::new(name.trim(), batch);
    layer.frames = Some(frames.trim().to_string());
    layer.priority = config.maya.layer_priority;
    Ok(layer)
}

fn farm_client(config: &Config) -> anyhow::Result<DeadlineClient> {
    let farm = config
        .farm
        .as_ref()
        .context("no farm configured (add a \"farm\" section or use --dry-run)")?;
    Ok(DeadlineClient::new(farm)?)
}

pub fn handle(config: &Config, cmd: MayaCmd) -> anyhow::Result<()> {
    match cmd {
        MayaCmd::Add {
            scene_file,
            batch,
            camera,
            episode,
            layers,
            output_root,
        } => {
            let mut job = MayaJob::new(batch.clone(), config.resolve_scene_path(scene_file));
            job.camera_name = camera;
            job.episode_name = episode;
            for arg in &layers {
                let mut layer = parse_layer(arg, &batch, config)?;
                if let Some(root) = &output_root {
                    layer.output_directory =
                        Some(format!("{}/{}", root.trim_end_matches('/'), layer.layer_name));
                }
                job.render_layers.push(layer);
            }

            with_session(&config.database, |db| maya_job_repo::insert(db, &job))?;
            println!("{}", job.id);
            Ok(())
        }
        MayaCmd::List {
            status,
            search,
            limit,
            offset,
        } => {
            let filter = MayaJobFilter {
                status: status.map(JobStatus::from),
                search,
                limit,
                offset,
            };
            let jobs = with_session(&config.database, |db| maya_job_repo::query(db, &filter))?;
            print::maya_rows(&jobs);
            Ok(())
        }
        MayaCmd::Show { id } => {
            let job = with_session(&config.database, |db| maya_job_repo::find_by_id(db, &id))?
                .with_context(|| format!("Maya job not found: {}", id))?;
            print::print_json(&job)
        }
        MayaCmd::Shot { number } => {
            let jobs = with_session(&config.database, |db| {
                maya_job_repo::find_by_shot_number(db, number)
            })?;
            print::maya_rows(&jobs);
            Ok(())
        }
        MayaCmd::Layer {
            id,
            layer,
            frames,
            priority,
            comment,
            output_directory,
            renderable,
        } => {
            let patch = LayerPatch {
                frames,
                priority,
                comment,
                output_directory,
                renderable,
                ..LayerPatch::default()
            };
            with_session(&config.database, |db| {
                maya_job_repo::update_layer(db, &id, &layer, &patch)
            })?;
            Ok(())
        }
        MayaCmd::Status { id, status, force } => {
            let status = JobStatus::from(status);
            with_session(&config.database, |db| -> anyhow::Result<()> {
                if force {
                    maya_job_repo::set_status(db, &id, status)?;
                } else {
                    submit::apply_status(db, &id, status)?;
                }
                Ok(())
            })
        }
        MayaCmd::Submit { id, dry_run } => {
            let settings = SubmitSettings::from(config);
            let report = if dry_run {
                let preview = with_session(&config.database, |db| -> anyhow::Result<_> {
                    Ok(submit::preview_job(db, &id, &settings)?)
                })?;
                print::preview(&preview)?;
                preview.report
            } else {
                let farm = farm_client(config)?;
                let report = with_session(&config.database, |db| -> anyhow::Result<_> {
                    Ok(submit::submit_job(db, &farm, &id, &settings)?)
                })?;
                print::report(&report);
                report
            };
            if !report.all_submitted() {
                bail!("{} layer(s) failed to submit", report.failed.len());
            }
            Ok(())
        }
        MayaCmd::Delete { id } => {
            if !with_session(&config.database, |db| maya_job_repo::delete(db, &id))? {
                bail!("Maya job not found: {}", id);
            }
            Ok(())
        }
    }
}
