use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

use crate::error::TranscriptError;

pub const TRANSCRIPT_FEATURE: &str = "youtube_transcript";

/// Default monthly allowance per caller, in estimated tokens.
pub const DEFAULT_MONTHLY_TOKEN_LIMIT: u64 = 1_000_000;

#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<UsageError> for TranscriptError {
    fn from(err: UsageError) -> Self {
        TranscriptError::Usage(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub identity: String,
    pub feature: String,
    pub input_units: u64,
    pub output_units: u64,
    pub timestamp: DateTime<Utc>,
}

impl UsageRecord {
    pub fn new(
        identity: impl Into<String>,
        feature: impl Into<String>,
        input_units: u64,
        output_units: u64,
    ) -> Self {
        Self {
            identity: identity.into(),
            feature: feature.into(),
            input_units,
            output_units,
            timestamp: Utc::now(),
        }
    }

    pub fn total_units(&self) -> u64 {
        self.input_units + self.output_units
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub total_requests: u64,
    pub total_input_units: u64,
    pub total_output_units: u64,
    pub by_feature: HashMap<String, u64>,
}

pub trait UsageStore: Send + Sync {
    fn record(&self, record: &UsageRecord) -> Result<(), UsageError>;
    fn load_all(&self) -> Result<Vec<UsageRecord>, UsageError>;
}

pub struct InMemoryUsageStore {
    records: Mutex<Vec<UsageRecord>>,
}

impl InMemoryUsageStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryUsageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageStore for InMemoryUsageStore {
    fn record(&self, record: &UsageRecord) -> Result<(), UsageError> {
        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        guard.push(record.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<UsageRecord>, UsageError> {
        let guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }
}

/// Append-only JSON lines file, one record per line.
pub struct FileUsageStore {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileUsageStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, UsageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        // Terminate a torn last line so the next record starts on its own line.
        if ends_mid_line(&mut file)? {
            file.write_all(b"\n")?;
        }
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// `~/.studyscribe/usage.jsonl`
    pub fn new_default() -> Result<Self, UsageError> {
        let dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".studyscribe");
        Self::new(dir.join("usage.jsonl"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UsageStore for FileUsageStore {
    fn record(&self, record: &UsageRecord) -> Result<(), UsageError> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let line = serde_json::to_string(record)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<UsageRecord>, UsageError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let reader = BufReader::new(file);
        let mut out = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            // A torn write leaves a partial last line.
            match serde_json::from_str(&line) {
                Ok(record) => out.push(record),
                Err(e) => warn!(
                    target: "usage.ledger",
                    path = %self.path.display(),
                    line = index + 1,
                    error = %e,
                    "skipping unreadable usage record"
                ),
            }
        }
        Ok(out)
    }
}

fn ends_mid_line(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Monthly usage ledger gating whether the engine is invoked at all.
#[derive(Clone)]
pub struct UsageLedger {
    pub store: Arc<dyn UsageStore>,
    pub monthly_token_limit: u64,
}

impl std::fmt::Debug for UsageLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageLedger")
            .field("store", &"<dyn UsageStore>")
            .field("monthly_token_limit", &self.monthly_token_limit)
            .finish()
    }
}

impl UsageLedger {
    pub fn new(store: Arc<dyn UsageStore>, monthly_token_limit: u64) -> Self {
        Self {
            store,
            monthly_token_limit,
        }
    }

    pub fn in_memory(monthly_token_limit: u64) -> Self {
        Self::new(Arc::new(InMemoryUsageStore::new()), monthly_token_limit)
    }

    pub fn new_default() -> Result<Self, UsageError> {
        let store = Arc::new(FileUsageStore::new_default()?);
        Ok(Self::new(store, DEFAULT_MONTHLY_TOKEN_LIMIT))
    }

    /// Whether `identity` can spend `token_budget` more units this month.
    pub fn is_under_limit(&self, identity: &str, token_budget: u64) -> Result<bool, UsageError> {
        self.is_under_limit_at(identity, token_budget, Utc::now())
    }

    pub fn is_under_limit_at(
        &self,
        identity: &str,
        token_budget: u64,
        now: DateTime<Utc>,
    ) -> Result<bool, UsageError> {
        let used = self.monthly_total_at(identity, now)?;
        Ok(used.saturating_add(token_budget) <= self.monthly_token_limit)
    }

    pub fn record_usage(
        &self,
        identity: &str,
        feature: &str,
        input_units: u64,
        output_units: u64,
    ) -> Result<(), UsageError> {
        self.store
            .record(&UsageRecord::new(identity, feature, input_units, output_units))
    }

    /// Units spent by `identity` in the current calendar month.
    pub fn monthly_total(&self, identity: &str) -> Result<u64, UsageError> {
        self.monthly_total_at(identity, Utc::now())
    }

    pub fn monthly_total_at(&self, identity: &str, now: DateTime<Utc>) -> Result<u64, UsageError> {
        let records = self.store.load_all()?;
        Ok(records
            .iter()
            .filter(|r| r.identity == identity)
            .filter(|r| same_month(r.timestamp, now))
            .map(UsageRecord::total_units)
            .sum())
    }

    pub fn summarize(&self, identity: &str) -> Result<UsageSummary, UsageError> {
        let records = self.store.load_all()?;
        let mut summary = UsageSummary::default();
        for record in records.iter().filter(|r| r.identity == identity) {
            summary.total_requests += 1;
            summary.total_input_units += record.input_units;
            summary.total_output_units += record.output_units;
            *summary
                .by_feature
                .entry(record.feature.clone())
                .or_insert(0) += record.total_units();
        }
        Ok(summary)
    }
}

fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn record_at(identity: &str, units: u64, when: DateTime<Utc>) -> UsageRecord {
        UsageRecord {
            identity: identity.to_string(),
            feature: TRANSCRIPT_FEATURE.to_string(),
            input_units: 0,
            output_units: units,
            timestamp: when,
        }
    }

    #[test]
    fn test_limit_counts_current_month_only() {
        let ledger = UsageLedger::in_memory(100);
        ledger.store.record(&record_at("alice", 70, at(2024, 4, 30))).unwrap();
        ledger.store.record(&record_at("alice", 60, at(2024, 5, 2))).unwrap();
        ledger.store.record(&record_at("bob", 100, at(2024, 5, 3))).unwrap();

        let now = at(2024, 5, 15);
        assert_eq!(ledger.monthly_total_at("alice", now).unwrap(), 60);
        assert!(ledger.is_under_limit_at("alice", 40, now).unwrap());
        assert!(!ledger.is_under_limit_at("alice", 41, now).unwrap());
        assert!(!ledger.is_under_limit_at("bob", 1, now).unwrap());
        assert!(ledger.is_under_limit_at("carol", 100, now).unwrap());
    }

    #[test]
    fn test_record_and_summarize() {
        let ledger = UsageLedger::in_memory(DEFAULT_MONTHLY_TOKEN_LIMIT);
        ledger.record_usage("alice", TRANSCRIPT_FEATURE, 0, 250).unwrap();
        ledger.record_usage("alice", "summary", 1000, 300).unwrap();
        ledger.record_usage("bob", TRANSCRIPT_FEATURE, 0, 5).unwrap();

        let summary = ledger.summarize("alice").unwrap();
        assert_eq!(summary.total_requests, 2);
        assert_eq!(summary.total_input_units, 1000);
        assert_eq!(summary.total_output_units, 550);
        assert_eq!(summary.by_feature.get(TRANSCRIPT_FEATURE), Some(&250));
        assert_eq!(summary.by_feature.get("summary"), Some(&1300));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("usage.jsonl");

        let store = FileUsageStore::new(&path).unwrap();
        store.record(&record_at("alice", 10, at(2024, 5, 1))).unwrap();
        store.record(&record_at("bob", 20, at(2024, 5, 2))).unwrap();

        let records = store.load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identity, "alice");
        assert_eq!(records[1].output_units, 20);
        assert_eq!(records[1].timestamp, at(2024, 5, 2));
    }

    #[test]
    fn test_truncated_line_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.jsonl");

        let store = FileUsageStore::new(&path).unwrap();
        store.record(&record_at("local", 100, Utc::now())).unwrap();
        drop(store);
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(br#"{"identity":"local","feat"#).unwrap();
        drop(file);

        let store = FileUsageStore::new(&path).unwrap();
        let records = store.load_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].output_units, 100);

        let ledger = UsageLedger::new(Arc::new(store), 1_000);
        assert!(ledger.is_under_limit("local", 900).unwrap());
        assert!(!ledger.is_under_limit("local", 901).unwrap());

        ledger.record_usage("local", TRANSCRIPT_FEATURE, 0, 5).unwrap();
        assert_eq!(ledger.monthly_total("local").unwrap(), 105);
    }

    #[test]
    fn test_reopen_keeps_clean_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.jsonl");

        FileUsageStore::new(&path)
            .unwrap()
            .record(&record_at("alice", 1, at(2024, 5, 1)))
            .unwrap();
        let before = fs::read_to_string(&path).unwrap();
        FileUsageStore::new(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUsageStore::new(dir.path().join("usage.jsonl")).unwrap();
        std::fs::remove_file(store.path()).unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }
}
