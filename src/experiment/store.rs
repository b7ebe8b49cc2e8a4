//! Experiment Store - SQLite-backed tracking backend
//!
//! Metadata (experiments, runs, tags, params, metrics, artifact index) lives
//! in a single SQLite file; artifact bytes are copied into a directory tree:
//!
//! ```text
//! <artifact_root>/<experiment_id>/<run_id>/artifacts/<path>
//! ```
//!
//! The store assumes sole access to its database file for the lifetime of
//! the process. All writes to a run require it to be `RUNNING`.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

use super::{
    ArtifactRecord, ExperimentRecord, LifecycleStage, MetricRecord, ParamRecord, RunRecord,
    RunStatus, TagRecord, TrackingUri,
};
use crate::{Error, Result};

/// Name of the experiment that always exists with ID 0
pub const DEFAULT_EXPERIMENT_NAME: &str = "Default";

const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS experiments (
    experiment_id     INTEGER PRIMARY KEY,
    name              TEXT NOT NULL UNIQUE,
    artifact_location TEXT NOT NULL,
    lifecycle_stage   TEXT NOT NULL DEFAULT 'active',
    creation_time     INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS runs (
    run_uuid      TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    experiment_id INTEGER NOT NULL REFERENCES experiments(experiment_id),
    status        TEXT NOT NULL,
    start_time    INTEGER NOT NULL,
    end_time      INTEGER,
    artifact_uri  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tags (
    run_uuid TEXT NOT NULL REFERENCES runs(run_uuid),
    key      TEXT NOT NULL,
    value    TEXT NOT NULL,
    PRIMARY KEY (run_uuid, key)
);

CREATE TABLE IF NOT EXISTS params (
    run_uuid TEXT NOT NULL REFERENCES runs(run_uuid),
    key      TEXT NOT NULL,
    value    TEXT NOT NULL,
    PRIMARY KEY (run_uuid, key)
);

CREATE TABLE IF NOT EXISTS metrics (
    run_uuid  TEXT NOT NULL REFERENCES runs(run_uuid),
    key       TEXT NOT NULL,
    value     REAL NOT NULL,
    is_nan    INTEGER NOT NULL DEFAULT 0,
    step      INTEGER NOT NULL,
    timestamp INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_metrics_run_key ON metrics (run_uuid, key);

CREATE TABLE IF NOT EXISTS artifacts (
    run_uuid   TEXT NOT NULL REFERENCES runs(run_uuid),
    path       TEXT NOT NULL,
    cas_hash   TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (run_uuid, path)
);
";

type ExperimentRow = (i64, String, String, String, i64);
type RunRow = (String, String, i64, String, i64, Option<i64>, String);
type MetricRow = (String, f64, bool, i64, i64);
type ArtifactRow = (String, String, i64, i64);

const EXPERIMENT_COLUMNS: &str =
    "experiment_id, name, artifact_location, lifecycle_stage, creation_time";
const RUN_COLUMNS: &str =
    "run_uuid, name, experiment_id, status, start_time, end_time, artifact_uri";
const METRIC_COLUMNS: &str = "key, value, is_nan, step, timestamp";

/// SQLite-backed experiment tracking store.
///
/// ## Example
///
/// ```rust
/// use forest_track::experiment::{RunStatus, TrackingStore, TrackingUri};
///
/// let dir = tempfile::tempdir()?;
/// let store = TrackingStore::open(&TrackingUri::from_path(dir.path().join("mlflow.db")))?;
///
/// let experiment = store.set_experiment("demo")?;
/// let run = store.create_run(experiment.experiment_id(), None)?;
/// store.log_param(run.run_id(), "max_depth", "10")?;
/// store.log_metric(run.run_id(), "rmse", 5.4, 0)?;
/// store.end_run(run.run_id(), RunStatus::Finished)?;
///
/// assert_eq!(store.get_run(run.run_id())?.status(), RunStatus::Finished);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct TrackingStore {
    conn: Connection,
    db_path: PathBuf,
    artifact_root: PathBuf,
}

impl TrackingStore {
    /// Open (or create) the store at `uri` with artifacts under `mlruns`
    /// beside the database file
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or the schema created
    pub fn open(uri: &TrackingUri) -> Result<Self> {
        Self::open_with_artifact_root(uri, uri.default_artifact_root())
    }

    /// Open (or create) the store at `uri` with an explicit artifact root
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or the schema created
    pub fn open_with_artifact_root(uri: &TrackingUri, artifact_root: impl Into<PathBuf>) -> Result<Self> {
        let db_path = uri.db_path().to_path_buf();
        if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let conn = Connection::open(&db_path)?;
        conn.execute_batch(SCHEMA)?;

        let store = Self {
            conn,
            db_path,
            artifact_root: artifact_root.into(),
        };
        store.conn.execute(
            "INSERT OR IGNORE INTO experiments
                 (experiment_id, name, artifact_location, lifecycle_stage, creation_time)
             VALUES (0, ?1, ?2, 'active', ?3)",
            params![
                DEFAULT_EXPERIMENT_NAME,
                path_string(&store.artifact_root.join("0")),
                now().timestamp_millis()
            ],
        )?;

        tracing::debug!(db = %store.db_path.display(), artifacts = %store.artifact_root.display(), "opened tracking store");
        Ok(store)
    }

    /// Database file path
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Root directory for experiment artifact locations
    #[must_use]
    pub fn artifact_root(&self) -> &Path {
        &self.artifact_root
    }

    // ------------------------------------------------------------------
    // Experiments
    // ------------------------------------------------------------------

    /// Return the active experiment called `name`, creating it if needed
    ///
    /// # Errors
    /// Returns `Error::ExperimentDeleted` if the name belongs to a deleted
    /// experiment, or a database error
    pub fn set_experiment(&self, name: &str) -> Result<ExperimentRecord> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("experiment name is empty".to_string()));
        }

        if let Some(existing) = self.get_experiment_by_name(name)? {
            if existing.lifecycle_stage() == LifecycleStage::Deleted {
                return Err(Error::ExperimentDeleted(name.to_string()));
            }
            return Ok(existing);
        }

        let tx = self.conn.unchecked_transaction()?;
        let experiment_id: i64 = tx.query_row(
            "SELECT COALESCE(MAX(experiment_id), -1) + 1 FROM experiments",
            [],
            |row| row.get(0),
        )?;
        let record = ExperimentRecord::builder(
            experiment_id,
            name,
            path_string(&self.artifact_root.join(experiment_id.to_string())),
        )
        .created_at(now())
        .build();
        tx.execute(
            "INSERT INTO experiments
                 (experiment_id, name, artifact_location, lifecycle_stage, creation_time)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.experiment_id(),
                record.name(),
                record.artifact_location(),
                record.lifecycle_stage().as_str(),
                record.created_at().timestamp_millis()
            ],
        )?;
        tx.commit()?;

        tracing::info!(experiment_id, experiment = name, "created experiment");
        Ok(record)
    }

    /// Look up an experiment by name
    ///
    /// # Errors
    /// Returns a database error
    pub fn get_experiment_by_name(&self, name: &str) -> Result<Option<ExperimentRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {EXPERIMENT_COLUMNS} FROM experiments WHERE name = ?1"),
                [name],
                experiment_row,
            )
            .optional()?;
        row.map(experiment_from_row).transpose()
    }

    /// Look up an experiment by ID
    ///
    /// # Errors
    /// Returns a database error
    pub fn get_experiment(&self, experiment_id: i64) -> Result<Option<ExperimentRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {EXPERIMENT_COLUMNS} FROM experiments WHERE experiment_id = ?1"),
                [experiment_id],
                experiment_row,
            )
            .optional()?;
        row.map(experiment_from_row).transpose()
    }

    /// All experiments, ordered by ID
    ///
    /// # Errors
    /// Returns a database error
    pub fn list_experiments(&self) -> Result<Vec<ExperimentRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EXPERIMENT_COLUMNS} FROM experiments ORDER BY experiment_id"
        ))?;
        let rows = stmt
            .query_map([], experiment_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(experiment_from_row).collect()
    }

    /// Soft-delete an experiment
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` for an unknown ID or the default experiment
    pub fn delete_experiment(&self, experiment_id: i64) -> Result<()> {
        if experiment_id == 0 {
            return Err(Error::InvalidInput("the default experiment cannot be deleted".to_string()));
        }
        let updated = self.conn.execute(
            "UPDATE experiments SET lifecycle_stage = ?1 WHERE experiment_id = ?2",
            params![LifecycleStage::Deleted.as_str(), experiment_id],
        )?;
        if updated == 0 {
            return Err(Error::InvalidInput(format!("no experiment with id {experiment_id}")));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Runs
    // ------------------------------------------------------------------

    /// Create a `RUNNING` run in an active experiment
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` for an unknown experiment,
    /// `Error::ExperimentDeleted` for a deleted one, or a database error
    pub fn create_run(&self, experiment_id: i64, run_name: Option<&str>) -> Result<RunRecord> {
        let experiment = self
            .get_experiment(experiment_id)?
            .ok_or_else(|| Error::InvalidInput(format!("no experiment with id {experiment_id}")))?;
        if experiment.lifecycle_stage() == LifecycleStage::Deleted {
            return Err(Error::ExperimentDeleted(experiment.name().to_string()));
        }

        let run_id = Uuid::new_v4().simple().to_string();
        let artifact_uri = Path::new(experiment.artifact_location())
            .join(&run_id)
            .join("artifacts");
        let mut builder = RunRecord::builder(&run_id, experiment_id, path_string(&artifact_uri))
            .started_at(now());
        if let Some(name) = run_name {
            builder = builder.run_name(name);
        }
        let run = builder.build();

        self.conn.execute(
            &format!("INSERT INTO runs ({RUN_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6)"),
            params![
                run.run_id(),
                run.run_name(),
                run.experiment_id(),
                run.status().as_str(),
                run.started_at().timestamp_millis(),
                run.artifact_uri()
            ],
        )?;

        tracing::info!(run_id = %run.run_id(), experiment_id, "started run");
        Ok(run)
    }

    /// Fetch a run
    ///
    /// # Errors
    /// Returns `Error::RunNotFound` for an unknown ID
    pub fn get_run(&self, run_id: &str) -> Result<RunRecord> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {RUN_COLUMNS} FROM runs WHERE run_uuid = ?1"),
                [run_id],
                run_row,
            )
            .optional()?;
        row.map_or_else(|| Err(Error::RunNotFound(run_id.to_string())), run_from_row)
    }

    /// Runs of an experiment, oldest first
    ///
    /// # Errors
    /// Returns a database error
    pub fn list_runs(&self, experiment_id: i64) -> Result<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RUN_COLUMNS} FROM runs WHERE experiment_id = ?1 ORDER BY start_time, run_uuid"
        ))?;
        let rows = stmt
            .query_map([experiment_id], run_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(run_from_row).collect()
    }

    /// Close a run with a terminal status
    ///
    /// # Errors
    /// Returns `Error::RunNotFound`, `Error::RunAlreadyEnded`, or
    /// `Error::InvalidInput` if `status` is `Running`
    pub fn end_run(&self, run_id: &str, status: RunStatus) -> Result<RunRecord> {
        if !status.is_terminal() {
            return Err(Error::InvalidInput("a run cannot be ended as RUNNING".to_string()));
        }

        let mut run = self.running_run(run_id)?;
        run.complete(status, now());
        self.conn.execute(
            "UPDATE runs SET status = ?1, end_time = ?2 WHERE run_uuid = ?3",
            params![
                run.status().as_str(),
                run.ended_at().map(|t| t.timestamp_millis()),
                run_id
            ],
        )?;

        tracing::info!(run_id, status = %status, "ended run");
        Ok(run)
    }

    // ------------------------------------------------------------------
    // Run data
    // ------------------------------------------------------------------

    /// Set (or overwrite) a tag
    ///
    /// # Errors
    /// Returns `Error::RunNotFound` or `Error::RunAlreadyEnded`
    pub fn set_tag(&self, run_id: &str, key: &str, value: &str) -> Result<()> {
        self.running_run(run_id)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO tags (run_uuid, key, value) VALUES (?1, ?2, ?3)",
            params![run_id, key, value],
        )?;
        tracing::debug!(run_id, key, value, "set tag");
        Ok(())
    }

    /// Log a param. Re-logging the same value is a no-op.
    ///
    /// # Errors
    /// Returns `Error::ParamConflict` if `key` already holds a different value,
    /// `Error::RunNotFound` or `Error::RunAlreadyEnded`
    pub fn log_param(&self, run_id: &str, key: &str, value: &str) -> Result<()> {
        self.running_run(run_id)?;

        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM params WHERE run_uuid = ?1 AND key = ?2",
                [run_id, key],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(old) if old == value => Ok(()),
            Some(old) => Err(Error::ParamConflict {
                key: key.to_string(),
                old,
                new: value.to_string(),
            }),
            None => {
                self.conn.execute(
                    "INSERT INTO params (run_uuid, key, value) VALUES (?1, ?2, ?3)",
                    params![run_id, key, value],
                )?;
                tracing::debug!(run_id, key, value, "logged param");
                Ok(())
            }
        }
    }

    /// Append a metric point
    ///
    /// Non-finite values are kept: infinities are stored as-is and NaN is
    /// flagged in a separate column, since SQLite reads NaN back as NULL.
    ///
    /// # Errors
    /// Returns `Error::RunNotFound` or `Error::RunAlreadyEnded`
    pub fn log_metric(&self, run_id: &str, key: &str, value: f64, step: i64) -> Result<MetricRecord> {
        self.running_run(run_id)?;
        if !value.is_finite() {
            tracing::warn!(run_id, key, value, "logging non-finite metric");
        }

        let metric = MetricRecord::new(run_id, key, step, value).with_timestamp(now());
        let is_nan = value.is_nan();
        self.conn.execute(
            "INSERT INTO metrics (run_uuid, key, value, is_nan, step, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                metric.run_id(),
                metric.key(),
                if is_nan { 0.0 } else { value },
                is_nan,
                metric.step(),
                metric.timestamp().timestamp_millis()
            ],
        )?;
        tracing::debug!(run_id, key, value, step, "logged metric");
        Ok(metric)
    }

    /// Copy a local file into the run's artifact directory under its file name
    ///
    /// # Errors
    /// Returns error if the file cannot be read or copied, or the run is not
    /// running
    pub fn log_artifact(&self, run_id: &str, local_path: &Path) -> Result<ArtifactRecord> {
        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::InvalidInput(format!("{} has no usable file name", local_path.display()))
            })?
            .to_string();
        let content = fs::read(local_path)?;
        self.log_artifact_bytes(run_id, &file_name, &content)
    }

    /// Write `content` to `artifact_path` inside the run's artifact directory
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if `artifact_path` is absolute or escapes
    /// the artifact directory, an IO error, or a run state error
    pub fn log_artifact_bytes(
        &self,
        run_id: &str,
        artifact_path: &str,
        content: &[u8],
    ) -> Result<ArtifactRecord> {
        let relative = Path::new(artifact_path);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
            && relative.components().any(|c| matches!(c, Component::Normal(_)));
        if !contained {
            return Err(Error::InvalidInput(format!(
                "artifact path '{artifact_path}' must be relative and stay inside the run directory"
            )));
        }

        let run = self.running_run(run_id)?;
        let destination = Path::new(run.artifact_uri()).join(relative);
        let record = ArtifactRecord::from_bytes(run_id, artifact_path, content).with_created_at(now());
        let size = i64::try_from(record.size_bytes()).map_err(|_| {
            Error::InvalidInput(format!("artifact '{artifact_path}' is too large to index"))
        })?;

        // Index row and file land together: a failed write rolls the row back.
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO artifacts (run_uuid, path, cas_hash, size_bytes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.run_id(),
                record.path(),
                record.cas_hash(),
                size,
                record.created_at().timestamp_millis()
            ],
        )?;
        if let Some(dir) = destination.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&destination, content)?;
        if let Err(e) = tx.commit() {
            if let Err(rm) = fs::remove_file(&destination) {
                tracing::warn!(path = %destination.display(), error = %rm, "failed to remove unindexed artifact");
            }
            return Err(e.into());
        }

        tracing::debug!(run_id, path = artifact_path, bytes = content.len(), "logged artifact");
        Ok(record)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Tags of a run, ordered by key
    ///
    /// # Errors
    /// Returns a database error
    pub fn get_tags(&self, run_id: &str) -> Result<Vec<TagRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM tags WHERE run_uuid = ?1 ORDER BY key")?;
        let tags = stmt
            .query_map([run_id], |row| Ok(TagRecord::new(run_id, row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    /// Params of a run, ordered by key
    ///
    /// # Errors
    /// Returns a database error
    pub fn get_params(&self, run_id: &str) -> Result<Vec<ParamRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM params WHERE run_uuid = ?1 ORDER BY key")?;
        let params = stmt
            .query_map([run_id], |row| Ok(ParamRecord::new(run_id, row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(params)
    }

    /// Every point logged for `key`, ordered by step then timestamp
    ///
    /// # Errors
    /// Returns a database error, or `Error::InvalidInput` for an out-of-range
    /// stored timestamp
    pub fn get_metric_history(&self, run_id: &str, key: &str) -> Result<Vec<MetricRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {METRIC_COLUMNS} FROM metrics
             WHERE run_uuid = ?1 AND key = ?2
             ORDER BY step, timestamp, rowid"
        ))?;
        let rows = stmt
            .query_map([run_id, key], metric_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(|row| metric_from_row(run_id, row)).collect()
    }

    /// Latest point (highest step, then newest) for each metric key, ordered by key
    ///
    /// # Errors
    /// Returns a database error
    pub fn latest_metrics(&self, run_id: &str) -> Result<Vec<MetricRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {METRIC_COLUMNS} FROM metrics WHERE run_uuid = ?1 ORDER BY key, rowid"
        ))?;
        let all = stmt
            .query_map([run_id], metric_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(|row| metric_from_row(run_id, row))
            .collect::<Result<Vec<_>>>()?;

        let mut latest: Vec<MetricRecord> = Vec::new();
        for metric in all {
            match latest.last_mut() {
                Some(last) if last.key() == metric.key() => {
                    // later inserts win ties
                    if metric.series_order(last).is_ge() {
                        *last = metric;
                    }
                }
                _ => latest.push(metric),
            }
        }
        Ok(latest)
    }

    /// Artifacts of a run, ordered by path
    ///
    /// # Errors
    /// Returns a database error, or `Error::InvalidInput` for a stored row
    /// with a negative size or out-of-range timestamp
    pub fn list_artifacts(&self, run_id: &str) -> Result<Vec<ArtifactRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT path, cas_hash, size_bytes, created_at FROM artifacts
             WHERE run_uuid = ?1 ORDER BY path",
        )?;
        let rows = stmt
            .query_map([run_id], |row| -> rusqlite::Result<ArtifactRow> {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter()
            .map(|(path, cas_hash, size, created)| {
                let size = u64::try_from(size).map_err(|_| {
                    Error::InvalidInput(format!("artifact '{path}' has negative size {size}"))
                })?;
                Ok(ArtifactRecord::new(run_id, path, cas_hash, size).with_created_at(from_millis(created)?))
            })
            .collect()
    }

    fn running_run(&self, run_id: &str) -> Result<RunRecord> {
        let run = self.get_run(run_id)?;
        if run.status().is_terminal() {
            return Err(Error::RunAlreadyEnded(run_id.to_string()));
        }
        Ok(run)
    }
}

// Millisecond precision so records compare equal after a store round trip
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| Error::InvalidInput(format!("stored timestamp {millis} ms is out of range")))
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn experiment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExperimentRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn experiment_from_row(
    (experiment_id, name, artifact_location, stage, created): ExperimentRow,
) -> Result<ExperimentRecord> {
    Ok(ExperimentRecord::builder(experiment_id, name, artifact_location)
        .lifecycle_stage(stage.parse()?)
        .created_at(from_millis(created)?)
        .build())
}

fn run_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RunRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn run_from_row(
    (run_id, name, experiment_id, status, start, end, artifact_uri): RunRow,
) -> Result<RunRecord> {
    Ok(RunRecord::builder(run_id, experiment_id, artifact_uri)
        .run_name(name)
        .status(status.parse()?)
        .started_at(from_millis(start)?)
        .ended_at(end.map(from_millis).transpose()?)
        .build())
}

fn metric_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MetricRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn metric_from_row(
    run_id: &str,
    (key, value, is_nan, step, timestamp): MetricRow,
) -> Result<MetricRecord> {
    let value = if is_nan { f64::NAN } else { value };
    Ok(MetricRecord::new(run_id, key, step, value).with_timestamp(from_millis(timestamp)?))
}
