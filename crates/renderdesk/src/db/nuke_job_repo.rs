//! Nuke job repository: CRUD for the `nuke_jobs` table.

use std::path::{Path, PathBuf};

use rusqlite::{params, OptionalExtension, Row};

use super::assign::Assignments;
use super::{scene_key, Database, DatabaseError};
use crate::model::NukeJob;
use crate::validation;

/// Fields to merge into an existing Nuke job.
#[derive(Debug, Default, Clone)]
pub struct NukeJobPatch {
    pub batch_name: Option<String>,
    pub scene_file: Option<PathBuf>,
    pub frames: Option<String>,
    pub group: Option<String>,
    pub department: Option<String>,
    pub output_directory: Option<String>,
    pub rez_env: Option<String>,
    pub priority: Option<i64>,
    pub nuke_version: Option<String>,
    pub render_extension: Option<String>,
    pub job_id: Option<Option<String>>,
}

impl NukeJobPatch {
    /// A patch carrying every registration field of `job`, used when a comp
    /// script is registered again.
    pub fn from_job(job: &NukeJob) -> Self {
        Self {
            batch_name: Some(job.batch_name.clone()),
            scene_file: Some(job.scene_file.clone()),
            frames: Some(job.frames.clone()),
            group: job.group.clone(),
            department: Some(job.department.clone()),
            output_directory: job.output_directory.clone(),
            rez_env: Some(job.rez_env.clone()),
            priority: Some(job.priority),
            nuke_version: Some(job.nuke_version.clone()),
            render_extension: Some(job.render_extension.clone()),
            job_id: None,
        }
    }
}

/// Outcome of [`upsert_by_scene_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

fn job_from_row(row: &Row<'_>) -> Result<NukeJob, rusqlite::Error> {
    Ok(NukeJob {
        id: row.get("id")?,
        batch_name: row.get("batch_name")?,
        scene_file: PathBuf::from(row.get::<_, String>("scene_file")?),
        frames: row.get("frames")?,
        group: row.get("group")?,
        department: row.get("department")?,
        output_directory: row.get("output_directory")?,
        rez_env: row.get("rez_env")?,
        priority: row.get("priority")?,
        nuke_version: row.get("nuke_version")?,
        render_extension: row.get("render_extension")?,
        job_id: row.get("job_id")?,
    })
}

/// Inserts a new job after validating it.
pub fn insert(db: &Database, job: &NukeJob) -> Result<(), DatabaseError> {
    validation::validate_nuke_job(job)?;
    let scene_file = scene_key(&job.scene_file);

    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO nuke_jobs (id, batch_name, scene_file, frames, \"group\", department,
             output_directory, rez_env, priority, nuke_version, render_extension, job_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                job.id,
                job.batch_name,
                scene_file,
                job.frames,
                job.group,
                job.department,
                job.output_directory,
                job.rez_env,
                job.priority,
                job.nuke_version,
                job.render_extension,
                job.job_id,
            ],
        )
        .map_err(|e| DatabaseError::unique(e, "scene_file", &scene_file))?;
        Ok(())
    })
}

/// Finds a job by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<NukeJob>, DatabaseError> {
    db.with_conn(|conn| {
        Ok(conn
            .query_row("SELECT * FROM nuke_jobs WHERE id = ?1", params![id], job_from_row)
            .optional()?)
    })
}

pub fn find_by_scene_file(db: &Database, scene_file: &Path) -> Result<Option<NukeJob>, DatabaseError> {
    db.with_conn(|conn| {
        Ok(conn
            .query_row(
                "SELECT * FROM nuke_jobs WHERE scene_file = ?1",
                params![scene_key(scene_file)],
                job_from_row,
            )
            .optional()?)
    })
}

/// All jobs ordered by batch name, then scene file.
pub fn list(db: &Database) -> Result<Vec<NukeJob>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM nuke_jobs ORDER BY batch_name, scene_file")?;
        let jobs = stmt
            .query_map([], job_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(jobs)
    })
}

/// Jobs whose comp script encodes the given shot number.
pub fn find_by_shot_number(db: &Database, number: u32) -> Result<Vec<NukeJob>, DatabaseError> {
    Ok(list(db)?
        .into_iter()
        .filter(|j| j.shot_number() == Some(number))
        .collect())
}

/// Merges `patch` into the job with primary key `id`.
pub fn update(db: &Database, id: &str, patch: &NukeJobPatch) -> Result<(), DatabaseError> {
    if let Some(scene_file) = &patch.scene_file {
        validation::check_scene_file(scene_file)?;
    }
    if let Some(frames) = &patch.frames {
        validation::check_frames("frames", frames)?;
    }
    if let Some(priority) = patch.priority {
        validation::check_priority("priority", priority)?;
    }
    let scene_text = patch.scene_file.as_deref().map(scene_key);

    let mut assign = Assignments::default();
    assign.set_opt("batch_name", patch.batch_name.clone());
    assign.set_opt("scene_file", scene_text.clone());
    assign.set_opt("frames", patch.frames.clone());
    assign.set_opt("\"group\"", patch.group.clone());
    assign.set_opt("department", patch.department.clone());
    assign.set_opt("output_directory", patch.output_directory.clone());
    assign.set_opt("rez_env", patch.rez_env.clone());
    assign.set_opt("priority", patch.priority);
    assign.set_opt("nuke_version", patch.nuke_version.clone());
    assign.set_opt("render_extension", patch.render_extension.clone());
    assign.set_opt("job_id", patch.job_id.clone());

    if assign.is_empty() {
        return match find_by_id(db, id)? {
            Some(_) => Ok(()),
            None => Err(DatabaseError::not_found("Nuke job", id)),
        };
    }

    let changed = db.with_conn(|conn| {
        assign
            .execute(conn, "nuke_jobs", &[("id", id)])
            .map_err(|e| match (e, &scene_text) {
                (DatabaseError::Sqlite(err), Some(scene)) => {
                    DatabaseError::unique(err, "scene_file", scene)
                }
                (e, _) => e,
            })
    })?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Nuke job", id));
    }
    Ok(())
}

/// Registers a comp script: updates the job already recorded for the same
/// scene file, or inserts `job` as a new one.
///
/// A concurrent registration of the same script that wins the insert race
/// is handled by falling back to the update path.
pub fn upsert_by_scene_file(db: &Database, job: &NukeJob) -> Result<(NukeJob, Upsert), DatabaseError> {
    if let Some(existing) = find_by_scene_file(db, &job.scene_file)? {
        update(db, &existing.id, &NukeJobPatch::from_job(job))?;
        return Ok((reload(db, &existing.id)?, Upsert::Updated));
    }

    match insert(db, job) {
        Ok(()) => Ok((reload(db, &job.id)?, Upsert::Created)),
        Err(DatabaseError::NotUnique { .. }) => {
            let existing = find_by_scene_file(db, &job.scene_file)?.ok_or_else(|| {
                DatabaseError::not_found("Nuke job", job.scene_file.to_string_lossy())
            })?;
            update(db, &existing.id, &NukeJobPatch::from_job(job))?;
            Ok((reload(db, &existing.id)?, Upsert::Updated))
        }
        Err(e) => Err(e),
    }
}

fn reload(db: &Database, id: &str) -> Result<NukeJob, DatabaseError> {
    find_by_id(db, id)?.ok_or_else(|| DatabaseError::not_found("Nuke job", id))
}

/// Records the farm id of a submitted comp render.
pub fn set_job_id(db: &Database, id: &str, job_id: Option<&str>) -> Result<(), DatabaseError> {
    update(
        db,
        id,
        &NukeJobPatch {
            job_id: Some(job_id.map(str::to_string)),
            ..Default::default()
        },
    )
}

/// Deletes a job. Returns whether a job was removed.
pub fn delete(db: &Database, id: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let removed = conn.execute("DELETE FROM nuke_jobs WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    })
}
