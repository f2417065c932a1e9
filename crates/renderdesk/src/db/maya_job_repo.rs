//! Maya job repository: the `maya_jobs` table and its embedded
//! `render_layers`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::assign::Assignments;
use super::{scene_key, Database, DatabaseError};
use crate::model::{JobStatus, MayaJob, RenderLayer};
use crate::validation;

/// Query filter parameters for job listing.
#[derive(Debug, Default, Clone)]
pub struct MayaJobFilter {
    pub status: Option<JobStatus>,
    /// Case-insensitive substring of `batch_name` or `scene_file`.
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Fields to merge into an existing job. `None` leaves a field untouched.
#[derive(Debug, Default, Clone)]
pub struct MayaJobPatch {
    pub batch_name: Option<String>,
    pub scene_file: Option<PathBuf>,
    pub episode_name: Option<String>,
    pub camera_name: Option<String>,
    pub camera_list: Option<Vec<String>>,
    pub season: Option<String>,
    pub scene_preview: Option<String>,
    pub department: Option<String>,
    pub rez_env: Option<String>,
    pub status: Option<JobStatus>,
    pub has_daily: Option<bool>,
    pub daily: Option<Option<String>>,
}

/// Fields to merge into one render layer. `None` leaves a field untouched;
/// `job_id: Some(None)` clears the farm id.
#[derive(Debug, Default, Clone)]
pub struct LayerPatch {
    pub batch_name: Option<String>,
    pub output_directory: Option<String>,
    pub output_filename: Option<String>,
    pub priority: Option<i64>,
    pub comment: Option<String>,
    pub frames: Option<String>,
    pub job_id: Option<Option<String>>,
    pub renderable: Option<bool>,
}

impl LayerPatch {
    /// A patch carrying every editable field of `layer`.
    pub fn from_layer(layer: &RenderLayer) -> Self {
        Self {
            batch_name: Some(layer.batch_name.clone()),
            output_directory: layer.output_directory.clone(),
            output_filename: layer.output_filename.clone(),
            priority: Some(layer.priority),
            comment: Some(layer.comment.clone()),
            frames: layer.frames.clone(),
            job_id: Some(layer.job_id.clone()),
            renderable: Some(layer.renderable),
        }
    }

    fn validate(&self, layer_name: &str) -> Result<(), DatabaseError> {
        let field = format!("layer '{}'", layer_name);
        if let Some(priority) = self.priority {
            validation::check_priority(&field, priority)?;
        }
        if let Some(frames) = &self.frames {
            validation::check_frames(&field, frames)?;
        }
        Ok(())
    }
}

fn json_column<T: serde::de::DeserializeOwned>(
    row: &Row<'_>,
    column: &str,
) -> Result<T, rusqlite::Error> {
    let text: String = row.get(column)?;
    let idx = row.as_ref().column_index(column)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn job_from_row(row: &Row<'_>) -> Result<MayaJob, rusqlite::Error> {
    Ok(MayaJob {
        id: row.get("id")?,
        batch_name: row.get("batch_name")?,
        scene_file: PathBuf::from(row.get::<_, String>("scene_file")?),
        episode_name: row.get("episode_name")?,
        camera_name: row.get("camera_name")?,
        camera_list: json_column(row, "camera_list")?,
        season: row.get("season")?,
        scene_preview: row.get("scene_preview")?,
        department: row.get("department")?,
        rez_env: row.get("rez_env")?,
        status: row.get("status")?,
        has_daily: row.get("has_daily")?,
        daily: row.get("daily")?,
        date_created: row.get("date_created")?,
        date_updated: row.get("date_updated")?,
        render_layers: Vec::new(),
    })
}

fn layer_from_row(row: &Row<'_>) -> Result<RenderLayer, rusqlite::Error> {
    Ok(RenderLayer {
        layer_name: row.get("layer_name")?,
        batch_name: row.get("batch_name")?,
        output_directory: row.get("output_directory")?,
        output_filename: row.get("output_filename")?,
        priority: row.get("priority")?,
        comment: row.get("comment")?,
        frames: row.get("frames")?,
        job_id: row.get("job_id")?,
        renderable: row.get("renderable")?,
    })
}

fn load_layers(conn: &Connection, job_id: &str) -> Result<Vec<RenderLayer>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM render_layers WHERE maya_job_id = ?1 ORDER BY position, layer_name",
    )?;
    let layers = stmt
        .query_map(params![job_id], layer_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layers)
}

fn with_layers(conn: &Connection, mut job: MayaJob) -> Result<MayaJob, DatabaseError> {
    job.render_layers = load_layers(conn, &job.id)?;
    Ok(job)
}

fn insert_layer(
    conn: &Connection,
    job_id: &str,
    position: i64,
    layer: &RenderLayer,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO render_layers (maya_job_id, position, layer_name, batch_name,
         output_directory, output_filename, priority, comment, frames, job_id, renderable)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            job_id,
            position,
            layer.layer_name,
            layer.batch_name,
            layer.output_directory,
            layer.output_filename,
            layer.priority,
            layer.comment,
            layer.frames,
            layer.job_id,
            layer.renderable,
        ],
    )
    .map_err(|e| DatabaseError::unique(e, "layer_name", &layer.layer_name))?;
    Ok(())
}

fn job_exists(conn: &Connection, id: &str) -> Result<bool, DatabaseError> {
    Ok(conn
        .query_row("SELECT 1 FROM maya_jobs WHERE id = ?1", params![id], |_| Ok(()))
        .optional()?
        .is_some())
}

fn touch(conn: &Connection, id: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE maya_jobs SET date_updated = ?2 WHERE id = ?1",
        params![id, Utc::now()],
    )?;
    Ok(())
}

/// Inserts a new job with its render layers after validating it.
///
/// Fails with [`DatabaseError::NotUnique`] when another job already uses the
/// same scene file.
pub fn insert(db: &Database, job: &MayaJob) -> Result<(), DatabaseError> {
    validation::validate_maya_job(job)?;
    let scene_file = scene_key(&job.scene_file);

    db.with_transaction(|conn| {
        conn.execute(
            "INSERT INTO maya_jobs (id, batch_name, scene_file, episode_name, camera_name,
             camera_list, season, scene_preview, department, rez_env, status, has_daily,
             daily, date_created, date_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                job.id,
                job.batch_name,
                scene_file,
                job.episode_name,
                job.camera_name,
                serde_json::to_string(&job.camera_list)?,
                job.season,
                job.scene_preview,
                job.department,
                job.rez_env,
                job.status,
                job.has_daily,
                job.daily,
                job.date_created,
                job.date_updated,
            ],
        )
        .map_err(|e| DatabaseError::unique(e, "scene_file", &scene_file))?;

        for (position, layer) in job.render_layers.iter().enumerate() {
            insert_layer(conn, &job.id, position as i64, layer)?;
        }
        Ok(())
    })?;

    log::debug!("Inserted maya job {} ({})", job.id, job.batch_name);
    Ok(())
}

/// Finds a job by its primary key.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<MayaJob>, DatabaseError> {
    db.with_conn(|conn| {
        let job = conn
            .query_row(
                "SELECT * FROM maya_jobs WHERE id = ?1",
                params![id],
                job_from_row,
            )
            .optional()?;
        job.map(|j| with_layers(conn, j)).transpose()
    })
}

/// Finds the job registered for a scene file.
pub fn find_by_scene_file(db: &Database, scene_file: &Path) -> Result<Option<MayaJob>, DatabaseError> {
    db.with_conn(|conn| {
        let job = conn
            .query_row(
                "SELECT * FROM maya_jobs WHERE scene_file = ?1",
                params![scene_key(scene_file)],
                job_from_row,
            )
            .optional()?;
        job.map(|j| with_layers(conn, j)).transpose()
    })
}

/// Escapes `LIKE` wildcards so the search text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Lists jobs ordered by batch name.
pub fn query(db: &Database, filter: &MayaJobFilter) -> Result<Vec<MayaJob>, DatabaseError> {
    db.with_conn(|conn| {
        let mut conditions = Vec::new();
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            param_values.push(Box::new(status));
            conditions.push(format!("status = ?{}", param_values.len()));
        }
        if let Some(ref search) = filter.search {
            param_values.push(Box::new(format!("%{}%", escape_like(search))));
            let n = param_values.len();
            conditions.push(format!(
                "(batch_name LIKE ?{n} ESCAPE '\\' OR scene_file LIKE ?{n} ESCAPE '\\')"
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.map(|l| l as i64).unwrap_or(-1);
        let offset = filter.offset.unwrap_or(0) as i64;
        param_values.push(Box::new(limit));
        param_values.push(Box::new(offset));
        let sql = format!(
            "SELECT * FROM maya_jobs {} ORDER BY batch_name, date_created LIMIT ?{} OFFSET ?{}",
            where_clause,
            param_values.len() - 1,
            param_values.len()
        );

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let jobs = stmt
            .query_map(params_ref.as_slice(), job_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        jobs.into_iter().map(|j| with_layers(conn, j)).collect()
    })
}

/// Jobs whose scene file encodes the given shot number. Jobs that do not
/// follow the naming convention never match.
pub fn find_by_shot_number(db: &Database, number: u32) -> Result<Vec<MayaJob>, DatabaseError> {
    Ok(query(db, &MayaJobFilter::default())?
        .into_iter()
        .filter(|j| j.shot_number() == Some(number))
        .collect())
}

/// Merges `patch` into the job with primary key `id`. Render layers are
/// never touched; use [`update_layer`] for those.
pub fn update(db: &Database, id: &str, patch: &MayaJobPatch) -> Result<(), DatabaseError> {
    if let Some(scene_file) = &patch.scene_file {
        validation::check_scene_file(scene_file)?;
    }
    let scene_text = patch.scene_file.as_deref().map(scene_key);

    let mut assign = Assignments::default();
    assign.set_opt("batch_name", patch.batch_name.clone());
    assign.set_opt("scene_file", scene_text.clone());
    assign.set_opt("episode_name", patch.episode_name.clone());
    assign.set_opt("camera_name", patch.camera_name.clone());
    if let Some(cameras) = &patch.camera_list {
        assign.set("camera_list", serde_json::to_string(cameras)?);
    }
    assign.set_opt("season", patch.season.clone());
    assign.set_opt("scene_preview", patch.scene_preview.clone());
    assign.set_opt("department", patch.department.clone());
    assign.set_opt("rez_env", patch.rez_env.clone());
    assign.set_opt("status", patch.status);
    assign.set_opt("has_daily", patch.has_daily);
    assign.set_opt("daily", patch.daily.clone());
    assign.set("date_updated", Utc::now());

    let changed = db.with_conn(|conn| {
        assign
            .execute(conn, "maya_jobs", &[("id", id)])
            .map_err(|e| match (e, &scene_text) {
                (DatabaseError::Sqlite(err), Some(scene)) => {
                    DatabaseError::unique(err, "scene_file", scene)
                }
                (e, _) => e,
            })
    })?;

    if changed == 0 {
        return Err(DatabaseError::not_found("Maya job", id));
    }
    Ok(())
}

/// Updates one embedded layer addressed by `(id, layer_name)`, leaving the
/// job's other layers and fields as they are.
pub fn update_layer(
    db: &Database,
    id: &str,
    layer_name: &str,
    patch: &LayerPatch,
) -> Result<(), DatabaseError> {
    patch.validate(layer_name)?;

    let mut assign = Assignments::default();
    assign.set_opt("batch_name", patch.batch_name.clone());
    assign.set_opt("output_directory", patch.output_directory.clone());
    assign.set_opt("output_filename", patch.output_filename.clone());
    assign.set_opt("priority", patch.priority);
    assign.set_opt("comment", patch.comment.clone());
    assign.set_opt("frames", patch.frames.clone());
    assign.set_opt("job_id", patch.job_id.clone());
    assign.set_opt("renderable", patch.renderable);

    db.with_transaction(|conn| {
        let found = if assign.is_empty() {
            conn.query_row(
                "SELECT 1 FROM render_layers WHERE maya_job_id = ?1 AND layer_name = ?2",
                params![id, layer_name],
                |_| Ok(()),
            )
            .optional()?
            .is_some()
        } else {
            assign.execute(
                conn,
                "render_layers",
                &[("maya_job_id", id), ("layer_name", layer_name)],
            )? > 0
        };

        if !found {
            return Err(DatabaseError::not_found(
                "Render layer",
                format!("{}/{}", id, layer_name),
            ));
        }
        touch(conn, id)
    })
}

/// Appends a render layer to an existing job.
pub fn add_layer(db: &Database, id: &str, layer: &RenderLayer) -> Result<(), DatabaseError> {
    validation::validate_layer(layer)?;
    db.with_transaction(|conn| {
        if !job_exists(conn, id)? {
            return Err(DatabaseError::not_found("Maya job", id));
        }
        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM render_layers WHERE maya_job_id = ?1",
            params![id],
            |r| r.get(0),
        )?;
        insert_layer(conn, id, position, layer)?;
        touch(conn, id)
    })
}

/// Removes a render layer from a job.
pub fn remove_layer(db: &Database, id: &str, layer_name: &str) -> Result<(), DatabaseError> {
    db.with_transaction(|conn| {
        let removed = conn.execute(
            "DELETE FROM render_layers WHERE maya_job_id = ?1 AND layer_name = ?2",
            params![id, layer_name],
        )?;
        if removed == 0 {
            return Err(DatabaseError::not_found(
                "Render layer",
                format!("{}/{}", id, layer_name),
            ));
        }
        touch(conn, id)
    })
}

/// Sets the status of a job.
pub fn set_status(db: &Database, id: &str, status: JobStatus) -> Result<(), DatabaseError> {
    update(
        db,
        id,
        &MayaJobPatch {
            status: Some(status),
            ..Default::default()
        },
    )
}

/// Moves a job to `rendering` after a submission. Layer farm ids are written
/// separately and left as they are.
pub fn mark_submitted(db: &Database, id: &str) -> Result<(), DatabaseError> {
    set_status(db, id, JobStatus::Rendering)
}

/// Records the farm id of the job's daily review render.
pub fn record_daily(db: &Database, id: &str, daily_id: &str) -> Result<(), DatabaseError> {
    update(
        db,
        id,
        &MayaJobPatch {
            has_daily: Some(true),
            daily: Some(Some(daily_id.to_string())),
            ..Default::default()
        },
    )
}

/// Deletes a job and its layers. Returns whether a job was removed.
pub fn delete(db: &Database, id: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let removed = conn.execute("DELETE FROM maya_jobs WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    })
}
