//! Report snapshots and their storage.
//!
//! A [`ReportRecord`] is an immutable, named copy of one computation's
//! input and output.  Loading a report never recomputes it: what was
//! saved is what is shown, even if the formulas have changed since.
//!
//! Storage sits behind the [`SnapshotStore`] trait so callers do not
//! care whether reports live in memory or in a JSON file on disk.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, RwLock},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{EventFinancialInput, EventFinancialOutput};
use crate::validation::{check_output, validate, ValidationError};

/// Version of the record layout written by this crate.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("report not found: {0}")]
    NotFound(String),

    #[error("report already exists: {0}")]
    AlreadyExists(String),

    #[error("report name must not be blank")]
    InvalidName,

    #[error("report cannot be stored: {0}")]
    Invalid(#[from] ValidationError),

    #[error("unsupported report schema version {found} (expected {})", SCHEMA_VERSION)]
    UnsupportedSchema { found: u32 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("report store lock poisoned")]
    Poisoned,
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub schema_version: u32,
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub input: EventFinancialInput,
    pub output: EventFinancialOutput,
}

impl ReportRecord {
    pub fn to_json(&self) -> SnapshotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> SnapshotResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Wrap a computation into a named record stamped with the current time.
/// The name is kept exactly as given.
pub fn serialize(
    input: EventFinancialInput,
    output: EventFinancialOutput,
    name: &str,
) -> ReportRecord {
    ReportRecord {
        schema_version: SCHEMA_VERSION,
        name: name.to_string(),
        saved_at: Utc::now(),
        input,
        output,
    }
}

/// Unpack a record.  Only records written with [`SCHEMA_VERSION`] are accepted.
pub fn deserialize(
    record: ReportRecord,
) -> SnapshotResult<(EventFinancialInput, EventFinancialOutput)> {
    if record.schema_version != SCHEMA_VERSION {
        return Err(SnapshotError::UnsupportedSchema {
            found: record.schema_version,
        });
    }
    Ok((record.input, record.output))
}

/// Repository for saved reports, keyed by report name.
///
/// Stores must be thread-safe (`Send + Sync`) because the API shares one
/// store across all request handlers.
pub trait SnapshotStore: Send + Sync {
    /// Persist a new report.  Names are unique and records are never
    /// overwritten.
    fn save(&self, record: ReportRecord) -> SnapshotResult<()>;
    fn load(&self, name: &str) -> SnapshotResult<ReportRecord>;
    /// All reports, ordered by name.
    fn list(&self) -> SnapshotResult<Vec<ReportRecord>>;
    fn delete(&self, name: &str) -> SnapshotResult<()>;
}

// A stored record must read back as written: no blank keys and no
// non-finite numbers, which serde_json would write as `null`.
fn check_record(record: &ReportRecord) -> SnapshotResult<()> {
    if record.name.trim().is_empty() {
        return Err(SnapshotError::InvalidName);
    }
    validate(&record.input)?;
    check_output(&record.output)?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    reports: RwLock<BTreeMap<String, ReportRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&self, record: ReportRecord) -> SnapshotResult<()> {
        check_record(&record)?;
        let mut reports = self.reports.write().map_err(|_| SnapshotError::Poisoned)?;
        if reports.contains_key(&record.name) {
            return Err(SnapshotError::AlreadyExists(record.name));
        }
        reports.insert(record.name.clone(), record);
        Ok(())
    }

    fn load(&self, name: &str) -> SnapshotResult<ReportRecord> {
        let reports = self.reports.read().map_err(|_| SnapshotError::Poisoned)?;
        reports
            .get(name)
            .cloned()
            .ok_or_else(|| SnapshotError::NotFound(name.to_string()))
    }

    fn list(&self) -> SnapshotResult<Vec<ReportRecord>> {
        let reports = self.reports.read().map_err(|_| SnapshotError::Poisoned)?;
        Ok(reports.values().cloned().collect())
    }

    fn delete(&self, name: &str) -> SnapshotResult<()> {
        let mut reports = self.reports.write().map_err(|_| SnapshotError::Poisoned)?;
        reports
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| SnapshotError::NotFound(name.to_string()))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ReportFile {
    reports: Vec<ReportRecord>,
}

/// Keeps every report in a single pretty-printed JSON document.
///
/// A missing file reads as an empty store; parent directories are created
/// on the first save.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serialises read-modify-write cycles on the file.
    guard: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> SnapshotResult<ReportFile> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ReportFile::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, file: &ReportFile) -> SnapshotResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, payload)?;
        tracing::debug!(
            "wrote {} report(s) to {}",
            file.reports.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(&self, record: ReportRecord) -> SnapshotResult<()> {
        check_record(&record)?;
        let _guard = self.guard.lock().map_err(|_| SnapshotError::Poisoned)?;
        let mut file = self.read()?;
        if file.reports.iter().any(|r| r.name == record.name) {
            return Err(SnapshotError::AlreadyExists(record.name));
        }
        file.reports.push(record);
        file.reports.sort_by(|a, b| a.name.cmp(&b.name));
        self.write(&file)
    }

    fn load(&self, name: &str) -> SnapshotResult<ReportRecord> {
        let _guard = self.guard.lock().map_err(|_| SnapshotError::Poisoned)?;
        self.read()?
            .reports
            .into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| SnapshotError::NotFound(name.to_string()))
    }

    fn list(&self) -> SnapshotResult<Vec<ReportRecord>> {
        let _guard = self.guard.lock().map_err(|_| SnapshotError::Poisoned)?;
        let mut reports = self.read()?.reports;
        reports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(reports)
    }

    fn delete(&self, name: &str) -> SnapshotResult<()> {
        let _guard = self.guard.lock().map_err(|_| SnapshotError::Poisoned)?;
        let mut file = self.read()?;
        let before = file.reports.len();
        file.reports.retain(|r| r.name != name);
        if file.reports.len() == before {
            return Err(SnapshotError::NotFound(name.to_string()));
        }
        self.write(&file)
    }
}

/// Totals across saved events, taken from their snapshots as saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub event_count: usize,
    pub total_guests: u64,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_business_tax: f64,
    pub total_net_profit: f64,
    /// Mean of the per-event margins; zero with no events.
    pub average_margin_percent: f64,
}

pub fn summarize(records: &[ReportRecord]) -> FinancialSummary {
    let mut summary = FinancialSummary {
        event_count: records.len(),
        ..FinancialSummary::default()
    };
    let mut margin_sum = 0.0;
    for record in records {
        let output = &record.output;
        summary.total_guests += u64::from(record.input.guest_count);
        summary.total_revenue += output.total_revenue;
        summary.total_cost += output.total_cost;
        summary.total_business_tax += output.business_tax;
        summary.total_net_profit += output.net_profit;
        margin_sum += output.profit_margin_percent;
    }
    if !records.is_empty() {
        summary.average_margin_percent = margin_sum / records.len() as f64;
    }
    summary
}
