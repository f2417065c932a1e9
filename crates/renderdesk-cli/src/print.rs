use serde::Serialize;

use renderdesk::submit::{DailyOutcome, SubmissionPreview};
use renderdesk::{MayaJob, NukeJob, SubmissionReport};

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn maya_rows(jobs: &[MayaJob]) {
    for job in jobs {
        println!(
            "{}  {:<10} {:<24} {}",
            job.id,
            job.status,
            job.batch_name,
            job.scene_file.display()
        );
    }
}

pub fn nuke_rows(jobs: &[NukeJob]) {
    for job in jobs {
        println!(
            "{}  {:<12} {:<12} {}",
            job.id,
            job.frames,
            job.job_id.as_deref().unwrap_or("-"),
            job
        );
    }
}

pub fn report(report: &SubmissionReport) {
    println!("{}", report.batch_name);
    for (layer, id) in &report.submitted {
        println!("  submitted  {:<20} {}", layer, id);
    }
    for (layer, error) in &report.failed {
        println!("  failed     {:<20} {}", layer, error);
    }
    for layer in &report.skipped {
        println!("  skipped    {}", layer);
    }
    match &report.daily {
        Some(DailyOutcome::Submitted(id)) => println!("  daily      submitted {}", id),
        Some(DailyOutcome::Requeued(id)) => println!("  daily      requeued {}", id),
        Some(DailyOutcome::Failed(error)) => println!("  daily      failed: {}", error),
        None => {}
    }
}

/// Dry-run output: the report, then every payload that would be sent.
pub fn preview(preview: &SubmissionPreview) -> anyhow::Result<()> {
    report(&preview.report);
    for submission in &preview.submissions {
        println!("\n# {}", submission.id);
        print_json(&serde_json::json!({
            "JobInfo": submission.job_info,
            "PluginInfo": submission.plugin_info,
        }))?;
    }
    Ok(())
}
