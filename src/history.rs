use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

/// How a round ended.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum Outcome {
    Won,
    Lost,
}

/// One finished round, appended to the history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub finished_at: DateTime<Local>,
    pub room: String,
    pub outcome: Outcome,
    pub points: usize,
    pub total: usize,
    pub time_limit_secs: u64,
    pub elapsed_secs: u64,
}

/// Aggregate view of the log, shown in the intro and win dialogs.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub games: usize,
    pub wins: usize,
    pub best_win_secs: Option<u64>,
    pub last_finished: Option<DateTime<Local>>,
}

pub fn summarize(records: &[HistoryRecord]) -> Option<HistorySummary> {
    if records.is_empty() {
        return None;
    }

    let outcomes = records.iter().map(|r| r.outcome).counts();
    let wins = outcomes.get(&Outcome::Won).copied().unwrap_or(0);
    let best_win_secs = records
        .iter()
        .filter(|r| r.outcome == Outcome::Won)
        .map(|r| r.elapsed_secs)
        .min();
    let last_finished = records.iter().map(|r| r.finished_at).max();

    Some(HistorySummary {
        games: records.len(),
        wins,
        best_win_secs,
        last_finished,
    })
}

/// CSV-backed round log under the state directory.
#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
}

impl History {
    /// None when no state directory can be resolved; the game then simply
    /// plays without a log.
    pub fn new() -> Option<Self> {
        AppDirs::history_path().map(|path| Self { path })
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, record: &HistoryRecord) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Emit the header only when starting a fresh log
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        Ok(())
    }

    /// All recorded rounds, oldest first. Missing log reads as empty;
    /// unparseable lines are skipped.
    pub fn load(&self) -> Vec<HistoryRecord> {
        let Ok(reader) = csv::Reader::from_path(&self.path) else {
            return Vec::new();
        };

        reader
            .into_deserialize()
            .filter_map(Result::ok)
            .collect()
    }

    pub fn summary(&self) -> Option<HistorySummary> {
        summarize(&self.load())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(outcome: Outcome, elapsed_secs: u64) -> HistoryRecord {
        HistoryRecord {
            finished_at: Local::now(),
            room: "meeting_room".into(),
            outcome,
            points: 8,
            total: 8,
            time_limit_secs: 30,
            elapsed_secs,
        }
    }

    #[test]
    fn test_load_missing_log_is_empty() {
        let dir = tempdir().unwrap();
        let history = History::with_path(dir.path().join("history.csv"));

        assert!(history.load().is_empty());
        assert_eq!(history.summary(), None);
    }

    #[test]
    fn test_append_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let history = History::with_path(dir.path().join("history.csv"));

        history.append(&record(Outcome::Won, 21)).unwrap();
        history.append(&record(Outcome::Lost, 30)).unwrap();

        let records = history.load();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].outcome, Outcome::Won);
        assert_eq!(records[0].elapsed_secs, 21);
        assert_eq!(records[1].outcome, Outcome::Lost);
        assert_eq!(records[1].room, "meeting_room");
    }

    #[test]
    fn test_header_is_written_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let history = History::with_path(&path);

        history.append(&record(Outcome::Won, 10)).unwrap();
        history.append(&record(Outcome::Won, 12)).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("finished_at,room,outcome"));
        assert_eq!(raw.matches("finished_at").count(), 1);
    }

    #[test]
    fn test_append_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let history = History::with_path(dir.path().join("state").join("history.csv"));

        history.append(&record(Outcome::Lost, 30)).unwrap();
        assert_eq!(history.load().len(), 1);
    }

    #[test]
    fn test_summary_counts_and_best_time() {
        let dir = tempdir().unwrap();
        let history = History::with_path(dir.path().join("history.csv"));

        history.append(&record(Outcome::Lost, 30)).unwrap();
        history.append(&record(Outcome::Won, 24)).unwrap();
        history.append(&record(Outcome::Won, 19)).unwrap();

        let summary = history.summary().unwrap();
        assert_eq!(summary.games, 3);
        assert_eq!(summary.wins, 2);
        assert_eq!(summary.best_win_secs, Some(19));
        assert!(summary.last_finished.is_some());
    }

    #[test]
    fn test_summary_without_wins_has_no_best_time() {
        let records = vec![record(Outcome::Lost, 30), record(Outcome::Lost, 30)];

        let summary = summarize(&records).unwrap();
        assert_eq!(summary.games, 2);
        assert_eq!(summary.wins, 0);
        assert_eq!(summary.best_win_secs, None);
    }

    #[test]
    fn test_summarize_empty_is_none() {
        assert_eq!(summarize(&[]), None);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Won.to_string(), "Won");
        assert_eq!(Outcome::Lost.to_string(), "Lost");
    }
}
