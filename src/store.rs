//! Durable correction and ignore tables.
//!
//! Both stores keep a merged in-memory view (durable rows plus anything
//! staged this session) that lookups hit immediately, while `flush` appends
//! only the staged rows. Flushing happens once, at the clean end of a batch;
//! an aborted run drops its staged rows by never flushing.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::models::{CorrectionEntry, Field, IgnoreEntry};
use crate::normalize::repair_feed_text;

const CORRECTION_COLUMNS: [&str; 3] = ["field", "raw_value", "resolved_value"];
const IGNORE_COLUMNS: [&str; 3] = ["artist", "album", "title"];

// ============================================================================
// Corrections
// ============================================================================

/// Learned (field, raw) → resolved mappings.
#[derive(Debug)]
pub struct CorrectionStore {
    path: PathBuf,
    delimiter: char,
    entries: FxHashMap<(Field, String), String>,
    staged: Vec<CorrectionEntry>,
}

impl CorrectionStore {
    /// Load the durable table. A missing file is an empty store, not an
    /// error. Raw keys are repaired on the way in so that old files written
    /// before an encoding fix still match repaired feed strings; duplicate
    /// keys keep the last row, so re-learned corrections win.
    pub fn load(path: &Path, delimiter: char) -> Result<Self> {
        let mut store = CorrectionStore {
            path: path.to_path_buf(),
            delimiter,
            entries: FxHashMap::default(),
            staged: Vec::new(),
        };
        if !path.exists() {
            return Ok(store);
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read corrections {}", path.display()))?;
        let mut lines = text.lines().enumerate();
        match lines.next() {
            // A pre-created empty file is as good as a missing one
            None => return Ok(store),
            Some((_, header)) => check_header(path, header, &CORRECTION_COLUMNS, delimiter)?,
        }
        for (idx, line) in lines {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(delimiter).collect();
            if fields.len() != CORRECTION_COLUMNS.len() {
                bail!(
                    "{} line {}: expected {} fields, got {}",
                    path.display(),
                    line_no,
                    CORRECTION_COLUMNS.len(),
                    fields.len()
                );
            }
            let field = Field::parse(fields[0]).with_context(|| {
                format!(
                    "{} line {}: unknown field {:?}",
                    path.display(),
                    line_no,
                    fields[0]
                )
            })?;
            let raw = repair_feed_text(fields[1]);
            store.entries.insert((field, raw), fields[2].to_string());
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    pub fn lookup(&self, field: Field, raw: &str) -> Option<&str> {
        self.entries
            .get(&(field, raw.to_string()))
            .map(String::as_str)
    }

    /// Stage a mapping and apply it immediately. Returns whether anything
    /// new was staged; repeating an identical mapping is a no-op, while a
    /// changed resolution replaces the old one.
    pub fn record(&mut self, field: Field, raw: &str, resolved: &str) -> bool {
        let key = (field, raw.to_string());
        if self.entries.get(&key).map(String::as_str) == Some(resolved) {
            return false;
        }
        self.entries.insert(key, resolved.to_string());
        self.staged.push(CorrectionEntry {
            field,
            raw: raw.to_string(),
            resolved: resolved.to_string(),
        });
        true
    }

    /// Append staged rows to the durable table. Creates the file (with its
    /// header) on first use. Returns how many rows were written.
    pub fn flush(&mut self) -> Result<usize> {
        if self.staged.is_empty() {
            return Ok(0);
        }
        let rows: Vec<[&str; 3]> = self
            .staged
            .iter()
            .map(|c| [c.field.as_str(), c.raw.as_str(), c.resolved.as_str()])
            .collect();
        append_rows(&self.path, self.delimiter, &CORRECTION_COLUMNS, &rows)?;
        let count = self.staged.len();
        self.staged.clear();
        Ok(count)
    }
}

// ============================================================================
// Ignores
// ============================================================================

/// Feed triples known to have no catalog counterpart.
pub struct IgnoreStore {
    path: PathBuf,
    delimiter: char,
    entries: FxHashSet<(String, String, String)>,
    staged: Vec<IgnoreEntry>,
}

impl IgnoreStore {
    pub fn load(path: &Path, delimiter: char) -> Result<Self> {
        let mut store = IgnoreStore {
            path: path.to_path_buf(),
            delimiter,
            entries: FxHashSet::default(),
            staged: Vec::new(),
        };
        if !path.exists() {
            return Ok(store);
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read ignore list {}", path.display()))?;
        let mut lines = text.lines().enumerate();
        match lines.next() {
            None => return Ok(store),
            Some((_, header)) => check_header(path, header, &IGNORE_COLUMNS, delimiter)?,
        }
        for (idx, line) in lines {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(delimiter).collect();
            if fields.len() != IGNORE_COLUMNS.len() {
                bail!(
                    "{} line {}: expected {} fields, got {}",
                    path.display(),
                    line_no,
                    IGNORE_COLUMNS.len(),
                    fields.len()
                );
            }
            store.entries.insert((
                repair_feed_text(fields[0]),
                repair_feed_text(fields[1]),
                repair_feed_text(fields[2]),
            ));
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    pub fn contains(&self, artist: &str, album: &str, title: &str) -> bool {
        self.entries
            .contains(&(artist.to_string(), album.to_string(), title.to_string()))
    }

    /// Stage a triple and apply it immediately. Idempotent; returns whether
    /// anything new was staged.
    pub fn record(&mut self, artist: &str, album: &str, title: &str) -> bool {
        let inserted = self.entries.insert((
            artist.to_string(),
            album.to_string(),
            title.to_string(),
        ));
        if inserted {
            self.staged.push(IgnoreEntry {
                artist: artist.to_string(),
                album: album.to_string(),
                title: title.to_string(),
            });
        }
        inserted
    }

    pub fn flush(&mut self) -> Result<usize> {
        if self.staged.is_empty() {
            return Ok(0);
        }
        let rows: Vec<[&str; 3]> = self
            .staged
            .iter()
            .map(|i| [i.artist.as_str(), i.album.as_str(), i.title.as_str()])
            .collect();
        append_rows(&self.path, self.delimiter, &IGNORE_COLUMNS, &rows)?;
        let count = self.staged.len();
        self.staged.clear();
        Ok(count)
    }
}

// ============================================================================
// Shared table plumbing
// ============================================================================

fn check_header(path: &Path, header: &str, columns: &[&str; 3], delimiter: char) -> Result<()> {
    let expected = columns.join(delimiter.to_string().as_str());
    if header != expected {
        bail!(
            "{} has unexpected columns: {:?}",
            path.display(),
            header
        );
    }
    Ok(())
}

fn append_rows(path: &Path, delimiter: char, columns: &[&str; 3], rows: &[[&str; 3]]) -> Result<()> {
    let sep = delimiter.to_string();
    // An existing but empty file still needs its header row
    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let mut out = String::new();
    if needs_header {
        out.push_str(&columns.join(sep.as_str()));
        out.push('\n');
    }
    for row in rows {
        for field in row {
            if field.contains(delimiter) {
                bail!(
                    "cannot store {:?}: it contains the field delimiter {:?}",
                    field,
                    delimiter
                );
            }
        }
        out.push_str(&row.join(sep.as_str()));
        out.push('\n');
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {} for append", path.display()))?;
    file.write_all(out.as_bytes())
        .with_context(|| format!("failed to append to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = CorrectionStore::load(&dir.path().join("corrections.csv"), '‽').unwrap();
        assert!(store.is_empty());
        let ignores = IgnoreStore::load(&dir.path().join("ignored.csv"), '‽').unwrap();
        assert!(ignores.is_empty());
    }

    #[test]
    fn test_record_applies_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CorrectionStore::load(&dir.path().join("corrections.csv"), '‽').unwrap();

        assert!(store.record(Field::Artist, "Bjork", "Björk"));
        assert_eq!(store.lookup(Field::Artist, "Bjork"), Some("Björk"));
        // Same mapping again stages nothing new
        assert!(!store.record(Field::Artist, "Bjork", "Björk"));
        assert_eq!(store.staged_len(), 1);
        // A field mismatch is a different key
        assert_eq!(store.lookup(Field::Album, "Bjork"), None);
    }

    #[test]
    fn test_flush_and_reload_corrections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrections.csv");

        let mut store = CorrectionStore::load(&path, '‽').unwrap();
        store.record(Field::Artist, "Bjork", "Björk");
        store.record(Field::Title, "Joga", "Jóga");
        assert_eq!(store.flush().unwrap(), 2);
        assert_eq!(store.staged_len(), 0);
        // Nothing staged, nothing written
        assert_eq!(store.flush().unwrap(), 0);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("field‽raw_value‽resolved_value\n"));
        assert!(text.contains("artist‽Bjork‽Björk\n"));

        let reloaded = CorrectionStore::load(&path, '‽').unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.lookup(Field::Artist, "Bjork"), Some("Björk"));
        assert_eq!(reloaded.lookup(Field::Title, "Joga"), Some("Jóga"));
    }

    #[test]
    fn test_second_flush_appends_without_second_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrections.csv");

        let mut store = CorrectionStore::load(&path, '‽').unwrap();
        store.record(Field::Artist, "Bjork", "Björk");
        store.flush().unwrap();

        let mut second = CorrectionStore::load(&path, '‽').unwrap();
        second.record(Field::Album, "Homogenik", "Homogenic");
        second.flush().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("field‽raw_value").count(), 1);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_relearned_correction_wins_on_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrections.csv");

        let mut store = CorrectionStore::load(&path, '‽').unwrap();
        store.record(Field::Artist, "Bjork", "Bjork Gudmundsdottir");
        store.flush().unwrap();

        let mut second = CorrectionStore::load(&path, '‽').unwrap();
        assert!(second.record(Field::Artist, "Bjork", "Björk"));
        second.flush().unwrap();

        let reloaded = CorrectionStore::load(&path, '‽').unwrap();
        assert_eq!(reloaded.lookup(Field::Artist, "Bjork"), Some("Björk"));
    }

    #[test]
    fn test_ignore_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ignored.csv");

        let mut store = IgnoreStore::load(&path, '‽').unwrap();
        assert!(store.record("Podcast", "Episode 12", "Interview"));
        assert!(!store.record("Podcast", "Episode 12", "Interview"));
        assert!(store.contains("Podcast", "Episode 12", "Interview"));
        assert_eq!(store.flush().unwrap(), 1);

        let reloaded = IgnoreStore::load(&path, '‽').unwrap();
        assert!(reloaded.contains("Podcast", "Episode 12", "Interview"));
        assert!(!reloaded.contains("Podcast", "Episode 13", "Interview"));
    }

    #[test]
    fn test_flush_into_pre_created_empty_file_keeps_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrections.csv");
        // A user touching the file ahead of the first run must not cost a row
        fs::write(&path, "").unwrap();

        let mut store = CorrectionStore::load(&path, '‽').unwrap();
        assert!(store.is_empty());
        store.record(Field::Artist, "Bjork", "Björk");
        assert_eq!(store.flush().unwrap(), 1);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("field‽raw_value‽resolved_value\n"));

        let reloaded = CorrectionStore::load(&path, '‽').unwrap();
        assert_eq!(reloaded.lookup(Field::Artist, "Bjork"), Some("Björk"));
    }

    #[test]
    fn test_ignore_flush_into_pre_created_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ignored.csv");
        fs::write(&path, "").unwrap();

        let mut store = IgnoreStore::load(&path, '‽').unwrap();
        store.record("Podcast", "Episode 12", "Interview");
        assert_eq!(store.flush().unwrap(), 1);

        let reloaded = IgnoreStore::load(&path, '‽').unwrap();
        assert!(reloaded.contains("Podcast", "Episode 12", "Interview"));
    }

    #[test]
    fn test_load_rejects_unexpected_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrections.csv");
        fs::write(&path, "artist‽Bjork‽Björk\n").unwrap();

        let err = CorrectionStore::load(&path, '‽').unwrap_err();
        assert!(err.to_string().contains("unexpected columns"));

        let ignores = dir.path().join("ignored.csv");
        fs::write(&ignores, "artist‽album‽track\n").unwrap();
        assert!(IgnoreStore::load(&ignores, '‽').is_err());
    }

    #[test]
    fn test_load_repairs_raw_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrections.csv");
        fs::write(
            &path,
            "field‽raw_value‽resolved_value\ntitle‽Can?t Stop‽Can't Stop\n",
        )
        .unwrap();

        let store = CorrectionStore::load(&path, '‽').unwrap();
        assert_eq!(store.lookup(Field::Title, "Can't Stop"), Some("Can't Stop"));
    }

    #[test]
    fn test_load_rejects_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrections.csv");
        fs::write(&path, "field‽raw_value‽resolved_value\nartist‽only-two\n").unwrap();
        assert!(CorrectionStore::load(&path, '‽').is_err());

        fs::write(&path, "field‽raw_value‽resolved_value\ngenre‽a‽b\n").unwrap();
        assert!(CorrectionStore::load(&path, '‽').is_err());
    }

    #[test]
    fn test_delimiter_inside_field_refuses_to_flush() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CorrectionStore::load(&dir.path().join("corrections.csv"), '‽').unwrap();
        store.record(Field::Title, "weird‽title", "Weird Title");
        assert!(store.flush().is_err());
    }
}
