//! Workload file loading.
//!
//! Turns a task file into a validated [`TaskSet`].  The format is chosen from
//! the file extension:
//!
//! * `.yaml` / `.yml`
//!   ```yaml
//!   tasks:
//!     - name: T1
//!       arrival_time: 0
//!       burst_time: 4
//!       deadline: 10
//!   ```
//! * `.json` – an array of objects with the same four fields.
//! * `.csv` – a header row naming the columns
//!   `name,arrival_time,burst_time,deadline` (any order, extra columns
//!   ignored), then one task per record.  Fields may be quoted.
//!
//! Every record goes through [`TaskSet::add_task`]: a task that fails
//! validation is logged and recorded as rejected, but the load still
//! succeeds.  Only I/O and syntax problems are errors.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::task::TaskSet;

// ── Private deserialization types ─────────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
struct WorkloadFile {
    #[serde(default)]
    tasks: Vec<TaskEntry>,
}

/// One task as it appears in a YAML, JSON or CSV file.
///
/// Times are signed so that negative values reach validation and are
/// reported as rejections instead of parse errors.
#[derive(Debug, Deserialize)]
struct TaskEntry {
    name: String,
    arrival_time: i64,
    burst_time: i64,
    deadline: i64,
}

const CSV_COLUMNS: [&str; 4] = ["name", "arrival_time", "burst_time", "deadline"];

// ── Format detection ──────────────────────────────────────────────────────────

/// Supported workload file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadFormat {
    Yaml,
    Json,
    Csv,
}

impl WorkloadFormat {
    /// Pick a format from the file extension (case-insensitive).
    ///
    /// # Errors
    /// If the extension is missing or not one of `yaml`, `yml`, `json`,
    /// `csv`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| anyhow!("workload file has no extension: {}", path.display()))?;

        match ext.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => bail!(
                "unsupported workload format '.{other}' (expected .yaml, .yml, .json or .csv): {}",
                path.display()
            ),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read and validate the workload at `path`.
///
/// # Errors
/// Returns an error if the file cannot be read, its extension is unknown, or
/// its content is structurally invalid.  Tasks that parse but fail
/// validation are *not* errors; see [`TaskSet::rejected`].
pub fn load_workload(path: &Path) -> Result<TaskSet> {
    info!("Loading workload from: {}", path.display());

    let format = WorkloadFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open workload file: {}", path.display()))?;

    let set = parse_workload(&content, format)
        .with_context(|| format!("Failed to parse workload file: {}", path.display()))?;

    info!(
        accepted = set.len(),
        rejected = set.rejected().len(),
        "Workload loaded"
    );
    Ok(set)
}

/// Parse workload `content` in the given `format`.
pub fn parse_workload(content: &str, format: WorkloadFormat) -> Result<TaskSet> {
    let entries = match format {
        WorkloadFormat::Yaml => serde_yaml::from_str::<WorkloadFile>(content)
            .context("invalid YAML workload")?
            .tasks,
        WorkloadFormat::Json => {
            serde_json::from_str::<Vec<TaskEntry>>(content).context("invalid JSON workload")?
        }
        WorkloadFormat::Csv => parse_csv(content)?,
    };

    if entries.is_empty() {
        warn!("Workload contains no tasks");
    }

    let mut set = TaskSet::new();
    for e in entries {
        debug!(
            "  Task: {} | arrival: {} | burst: {} | deadline: {}",
            e.name, e.arrival_time, e.burst_time, e.deadline
        );
        // Rejections are recorded in the set and logged by add_task
        let _ = set.add_task(e.name, e.arrival_time, e.burst_time, e.deadline);
    }
    Ok(set)
}

fn parse_csv(content: &str) -> Result<Vec<TaskEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .context("CSV workload has no readable header row")?
        .clone();
    for column in CSV_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            bail!("CSV header is missing column '{column}'");
        }
    }

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.context("malformed CSV record")?;
        let line = record.position().map_or(0, |p| p.line());
        let entry: TaskEntry = record
            .deserialize(Some(&headers))
            .with_context(|| format!("line {line}: invalid task record"))?;
        entries.push(entry);
    }
    Ok(entries)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
