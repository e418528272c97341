//! Core data types shared across the reconciliation pipeline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

/// Index of an entry inside the in-memory catalog.
pub type EntryId = usize;

// ============================================================================
// Feed and catalog records
// ============================================================================

/// One listen event from the remote feed export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenRecord {
    pub artist: String,
    pub album: String,
    pub title: String,
    pub timestamp: NaiveDateTime,
}

/// One track of the local library, as logged in a catalog snapshot.
///
/// `play_count` and `time_played` start at zero and are only touched by the
/// aggregation pass after matching is done.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogEntry {
    pub filepath: PathBuf,
    pub album: String,
    pub album_artist: String,
    pub artist: String,
    pub title: String,
    pub disc_num: Option<u32>,
    pub original_artist: String,
    pub release_date: String,
    pub track_num: Option<u32>,
    pub bit_rate: u32,
    pub time_secs: f64,
    pub play_count: u64,
    pub time_played: f64,
}

// ============================================================================
// Corrections and ignores
// ============================================================================

/// Which part of the (artist, album, title) triple a correction rewrites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Artist,
    Album,
    Title,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Artist => "artist",
            Field::Album => "album",
            Field::Title => "title",
        }
    }

    pub fn parse(s: &str) -> Option<Field> {
        match s {
            "artist" => Some(Field::Artist),
            "album" => Some(Field::Album),
            "title" => Some(Field::Title),
            _ => None,
        }
    }
}

/// A learned mapping from one raw feed string to a catalog string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrectionEntry {
    pub field: Field,
    pub raw: String,
    pub resolved: String,
}

/// A feed triple known to have no catalog counterpart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IgnoreEntry {
    pub artist: String,
    pub album: String,
    pub title: String,
}

// ============================================================================
// Outcomes
// ============================================================================

/// How a resolved record found its catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPath {
    /// The raw triple hit the index directly.
    Exact,
    /// Stored corrections rewrote the triple into an index hit.
    Correction,
    /// The folder naming convention pinned the entry after the cascade failed.
    Rediscovery,
    /// The interactive cascade resolved all three fields.
    Fuzzy,
}

/// Why an unmatched record stayed unmatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissReason {
    /// The triple was already on the ignore list.
    Ignored,
    /// Some cascade stage had an empty candidate pool.
    NoCandidates,
    /// The user declined every offer for this record.
    Declined,
}

/// Final disposition of one listen record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Resolved { entry: EntryId, via: MatchPath },
    Unmatched(MissReason),
}

// ============================================================================
// Errors
// ============================================================================

/// Conditions that end a run (or a record) instead of degrading it.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("catalog holds more than one entry for {artist} - {album} - {title}; duplicate triples make listens unattributable")]
    AmbiguousCatalog {
        artist: String,
        album: String,
        title: String,
    },

    #[error("catalog lists {path} more than once")]
    DuplicateCatalogPath { path: PathBuf },

    #[error("date range {input:?} does not fit YYYY[-MM][-DD]")]
    MalformedDateRange { input: String },

    #[error("run aborted at user request")]
    Aborted,
}

// ============================================================================
// Run statistics
// ============================================================================

/// Counters for a reconciliation run, dumped as JSON alongside the reports.
///
/// Record-level counters (exact_matches through unmatched_declined) partition
/// `records_total`; the prompt counters below them count individual
/// interactions and can exceed the record count.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunStats {
    pub records_total: usize,
    pub exact_matches: usize,
    pub correction_matches: usize,
    pub ignored_skips: usize,
    pub rediscovery_matches: usize,
    pub fuzzy_matches: usize,
    pub unmatched_no_candidates: usize,
    pub unmatched_declined: usize,

    pub auto_accepts: usize,
    pub prompts_confirmed: usize,
    pub prompts_declined: usize,
    pub path_picks: usize,

    pub corrections_staged: usize,
    pub ignores_staged: usize,
    pub elapsed_seconds: f64,
}

impl RunStats {
    pub fn resolved_total(&self) -> usize {
        self.exact_matches + self.correction_matches + self.rediscovery_matches + self.fuzzy_matches
    }

    pub fn unmatched_total(&self) -> usize {
        self.ignored_skips + self.unmatched_no_candidates + self.unmatched_declined
    }

    /// Share of records that resolved, as a percentage.
    pub fn match_rate(&self) -> f64 {
        if self.records_total == 0 {
            return 0.0;
        }
        self.resolved_total() as f64 / self.records_total as f64 * 100.0
    }

    /// One-line JSON dump to stderr, prefixed with a label.
    pub fn log(&self, label: &str) {
        match serde_json::to_string(self) {
            Ok(json) => eprintln!("[stats] {}: {}", label, json),
            Err(err) => eprintln!("[stats] {}: serialization failed: {}", label, err),
        }
    }

    pub fn write_to_file(&self, path: &std::path::Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize run stats")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write run stats to {}", path.display()))?;
        Ok(())
    }
}
