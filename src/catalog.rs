//! The catalog index: every known library track, addressable three ways.
//!
//! Exact lookups go through the (artist, album, title) triple, the fuzzy
//! cascade draws its candidate pools from the per-artist and per-album
//! sibling tables, and the rediscovery rescue walks the folder naming
//! convention embedded in each filepath. The index itself never changes
//! within a run; only the play counters on its entries do, and only during
//! aggregation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::models::{CatalogEntry, EntryId, ReconcileError};
use crate::normalize::{fold_key, primary_artist};
use crate::progress::{create_progress_bar, create_spinner};

/// Column order of a catalog snapshot table.
pub const SNAPSHOT_HEADER: [&str; 11] = [
    "filepath",
    "album",
    "album_artist",
    "artist",
    "title",
    "disc_num",
    "original_artist",
    "release_date",
    "track_num",
    "bit_rate",
    "time_secs",
];

pub const AUDIO_EXTENSIONS: [&str; 2] = ["mp3", "flac"];

/// Album folders carry their release date up front: "[1997] Homogenic",
/// "[1997-09-22] Homogenic".
static ALBUM_FOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(\d{4}(?:-\d{2})?(?:-\d{2})?)\] (.+)$").unwrap());

/// Track files start with an optional disc digit and a two-digit track
/// number: "03 Jóga", "1-03 Jóga" (extension already stripped).
static TRACK_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:(\d)-)?(\d{2}) (.+)$").unwrap());

// ============================================================================
// Folder naming convention
// ============================================================================

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Album name of a folder, with the "[date] " prefix stripped when present.
pub fn folder_album_name(folder: &str) -> &str {
    match ALBUM_FOLDER.captures(folder) {
        Some(caps) => caps.get(2).map_or(folder, |m| m.as_str()),
        None => folder,
    }
}

/// Title portion of a track file name: extension and the disc/track number
/// prefix stripped. "1-03 Jóga.mp3" → "Jóga".
pub fn file_title_stem(name: &str) -> &str {
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    match TRACK_FILE.captures(stem) {
        Some(caps) => caps.get(3).map_or(stem, |m| m.as_str()),
        None => stem,
    }
}

/// (artist folder, album folder, file name) of a catalog path.
fn folder_parts(path: &Path) -> Option<(&str, &str, &str)> {
    let file = path.file_name()?.to_str()?;
    let album_dir = path.parent()?.file_name()?.to_str()?;
    let artist_dir = path.parent()?.parent()?.file_name()?.to_str()?;
    Some((artist_dir, album_dir, file))
}

// ============================================================================
// Index
// ============================================================================

#[derive(Debug)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    by_triple: FxHashMap<(String, String, String), EntryId>,
    by_path: FxHashMap<PathBuf, EntryId>,
    artists: Vec<String>,
    albums_by_artist: FxHashMap<String, Vec<String>>,
    titles_by_album: FxHashMap<(String, String), Vec<String>>,
}

impl CatalogIndex {
    /// Build the index, rejecting catalogs where a listen could not be
    /// attributed to a single entry.
    pub fn build(entries: Vec<CatalogEntry>) -> Result<Self, ReconcileError> {
        let mut by_triple = FxHashMap::default();
        let mut by_path = FxHashMap::default();

        for (id, entry) in entries.iter().enumerate() {
            if by_path.insert(entry.filepath.clone(), id).is_some() {
                return Err(ReconcileError::DuplicateCatalogPath {
                    path: entry.filepath.clone(),
                });
            }
            let triple = (
                entry.artist.clone(),
                entry.album.clone(),
                entry.title.clone(),
            );
            if by_triple.insert(triple, id).is_some() {
                return Err(ReconcileError::AmbiguousCatalog {
                    artist: entry.artist.clone(),
                    album: entry.album.clone(),
                    title: entry.title.clone(),
                });
            }
        }

        let mut artists: Vec<String> = entries.iter().map(|e| e.artist.clone()).collect();
        artists.sort();
        artists.dedup();

        let mut albums_by_artist: FxHashMap<String, Vec<String>> = FxHashMap::default();
        let mut titles_by_album: FxHashMap<(String, String), Vec<String>> = FxHashMap::default();
        for entry in &entries {
            albums_by_artist
                .entry(entry.artist.clone())
                .or_default()
                .push(entry.album.clone());
            titles_by_album
                .entry((entry.artist.clone(), entry.album.clone()))
                .or_default()
                .push(entry.title.clone());
        }
        for albums in albums_by_artist.values_mut() {
            albums.sort();
            albums.dedup();
        }
        for titles in titles_by_album.values_mut() {
            titles.sort();
        }

        Ok(CatalogIndex {
            entries,
            by_triple,
            by_path,
            artists,
            albums_by_artist,
            titles_by_album,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> &CatalogEntry {
        &self.entries[id]
    }

    pub fn entry_mut(&mut self, id: EntryId) -> &mut CatalogEntry {
        &mut self.entries[id]
    }

    /// Case-sensitive lookup on the raw triple.
    pub fn exact_lookup(&self, artist: &str, album: &str, title: &str) -> Option<EntryId> {
        self.by_triple
            .get(&(artist.to_string(), album.to_string(), title.to_string()))
            .copied()
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<EntryId> {
        self.by_path.get(path).copied()
    }

    /// Every distinct artist name, sorted.
    pub fn artist_names(&self) -> &[String] {
        &self.artists
    }

    /// Albums credited to one artist, sorted. Empty for unknown artists.
    pub fn album_names(&self, artist: &str) -> &[String] {
        self.albums_by_artist
            .get(artist)
            .map(|albums| albums.as_slice())
            .unwrap_or(&[])
    }

    /// Titles on one album, sorted.
    pub fn title_names(&self, artist: &str, album: &str) -> &[String] {
        self.titles_by_album
            .get(&(artist.to_string(), album.to_string()))
            .map(|titles| titles.as_slice())
            .unwrap_or(&[])
    }

    /// Find the single entry whose folder naming matches the raw triple:
    /// artist folder equal after folding, album folder carrying a date
    /// prefix and starting with the raw album, track file numbered and
    /// starting with the raw title. More than one structural match is as
    /// useless as none, so both return `None`.
    pub fn rediscover(&self, artist: &str, album: &str, title: &str) -> Option<EntryId> {
        let artist_key = fold_key(artist);
        let album_key = fold_key(album);
        let title_key = fold_key(title);

        let mut found = None;
        for (id, entry) in self.entries.iter().enumerate() {
            let Some((artist_dir, album_dir, file)) = folder_parts(&entry.filepath) else {
                continue;
            };
            if fold_key(artist_dir) != artist_key {
                continue;
            }
            let Some(album_caps) = ALBUM_FOLDER.captures(album_dir) else {
                continue;
            };
            let album_name = album_caps.get(2).map_or("", |m| m.as_str());
            if !fold_key(album_name).starts_with(&album_key) {
                continue;
            }
            let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
            let Some(track_caps) = TRACK_FILE.captures(stem) else {
                continue;
            };
            let track_title = track_caps.get(3).map_or("", |m| m.as_str());
            if !fold_key(track_title).starts_with(&title_key) {
                continue;
            }

            if found.is_some() {
                return None;
            }
            found = Some(id);
        }
        found
    }
}

// ============================================================================
// Snapshot I/O
// ============================================================================

/// Read a catalog snapshot table. Play counters are not part of snapshots;
/// entries come back with both at zero.
pub fn read_snapshot(path: &Path, delimiter: char) -> Result<Vec<CatalogEntry>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog snapshot {}", path.display()))?;

    let mut lines = text.lines();
    let header = lines
        .next()
        .with_context(|| format!("catalog snapshot {} is empty", path.display()))?;
    let expected = SNAPSHOT_HEADER.join(delimiter.to_string().as_str());
    if header != expected {
        bail!(
            "catalog snapshot {} has unexpected columns: {:?}",
            path.display(),
            header
        );
    }

    let row_count = text.lines().count().saturating_sub(1);
    let pb = create_progress_bar(row_count as u64, "Loading catalog snapshot");

    let mut entries = Vec::with_capacity(row_count);
    for (idx, line) in lines.enumerate() {
        let line_no = idx + 2;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(delimiter).collect();
        if fields.len() != SNAPSHOT_HEADER.len() {
            bail!(
                "{} line {}: expected {} fields, got {}",
                path.display(),
                line_no,
                SNAPSHOT_HEADER.len(),
                fields.len()
            );
        }

        entries.push(CatalogEntry {
            filepath: PathBuf::from(fields[0]),
            album: fields[1].to_string(),
            album_artist: fields[2].to_string(),
            artist: fields[3].to_string(),
            title: fields[4].to_string(),
            disc_num: parse_optional_number(fields[5], "disc_num", path, line_no)?,
            original_artist: fields[6].to_string(),
            release_date: fields[7].to_string(),
            track_num: parse_optional_number(fields[8], "track_num", path, line_no)?,
            bit_rate: parse_optional_number(fields[9], "bit_rate", path, line_no)?.unwrap_or(0),
            time_secs: parse_time_secs(fields[10], path, line_no)?,
            play_count: 0,
            time_played: 0.0,
        });
        pb.inc(1);
    }

    pb.finish_with_message(format!("Loaded {} catalog entries", entries.len()));
    Ok(entries)
}

/// Write a catalog snapshot table.
pub fn write_snapshot(entries: &[CatalogEntry], path: &Path, delimiter: char) -> Result<()> {
    let sep = delimiter.to_string();
    let mut out = String::new();
    out.push_str(&SNAPSHOT_HEADER.join(sep.as_str()));
    out.push('\n');

    for entry in entries {
        let fields = [
            entry.filepath.display().to_string(),
            entry.album.clone(),
            entry.album_artist.clone(),
            entry.artist.clone(),
            entry.title.clone(),
            entry.disc_num.map(|n| n.to_string()).unwrap_or_default(),
            entry.original_artist.clone(),
            entry.release_date.clone(),
            entry.track_num.map(|n| n.to_string()).unwrap_or_default(),
            entry.bit_rate.to_string(),
            entry.time_secs.to_string(),
        ];
        for field in &fields {
            if field.contains(delimiter) {
                bail!(
                    "cannot write snapshot: field {:?} contains the delimiter {:?}",
                    field,
                    delimiter
                );
            }
        }
        out.push_str(&fields.join(sep.as_str()));
        out.push('\n');
    }

    fs::write(path, out)
        .with_context(|| format!("failed to write catalog snapshot {}", path.display()))?;
    Ok(())
}

fn parse_optional_number(
    value: &str,
    column: &str,
    path: &Path,
    line_no: usize,
) -> Result<Option<u32>> {
    if value.is_empty() {
        return Ok(None);
    }
    let parsed = value.parse().with_context(|| {
        format!(
            "{} line {}: bad {} value {:?}",
            path.display(),
            line_no,
            column,
            value
        )
    })?;
    Ok(Some(parsed))
}

fn parse_time_secs(value: &str, path: &Path, line_no: usize) -> Result<f64> {
    if value.is_empty() {
        return Ok(0.0);
    }
    value.parse().with_context(|| {
        format!(
            "{} line {}: bad time_secs value {:?}",
            path.display(),
            line_no,
            value
        )
    })
}

// ============================================================================
// Library folder scan
// ============================================================================

/// Walk a library folder laid out as artist/album/track and derive catalog
/// entries from names alone. No tags are read, so durations and bit rates
/// come back as zero; a tagged snapshot is the better catalog source when
/// one exists.
pub fn scan_library(dir: &Path) -> Result<Vec<CatalogEntry>> {
    let spinner = create_spinner("Scanning library folders");

    let mut artist_dirs: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read library folder {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    artist_dirs.sort();

    let scanned: Result<Vec<Vec<CatalogEntry>>> = artist_dirs
        .par_iter()
        .map(|artist_dir| {
            let entries = scan_artist_dir(artist_dir)?;
            spinner.inc(1);
            Ok(entries)
        })
        .collect();

    let mut entries: Vec<CatalogEntry> = scanned?.into_iter().flatten().collect();
    entries.sort_by(|a, b| a.filepath.cmp(&b.filepath));

    spinner.finish_with_message(format!(
        "Scanned {} tracks under {} artist folders",
        entries.len(),
        artist_dirs.len()
    ));
    Ok(entries)
}

fn scan_artist_dir(artist_dir: &Path) -> Result<Vec<CatalogEntry>> {
    let folder_name = match artist_dir.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.to_string(),
        None => return Ok(Vec::new()),
    };

    let mut album_dirs: Vec<PathBuf> = fs::read_dir(artist_dir)
        .with_context(|| format!("failed to read artist folder {}", artist_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    album_dirs.sort();

    let mut entries = Vec::new();
    for album_dir in album_dirs {
        let album_folder = match album_dir.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        let (release_date, album) = match ALBUM_FOLDER.captures(&album_folder) {
            Some(caps) => (
                caps.get(1).map_or("", |m| m.as_str()).to_string(),
                caps.get(2).map_or("", |m| m.as_str()).to_string(),
            ),
            None => (String::new(), album_folder.clone()),
        };

        let mut files: Vec<PathBuf> = fs::read_dir(&album_dir)
            .with_context(|| format!("failed to read album folder {}", album_dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_audio_file(path))
            .collect();
        files.sort();

        for file in files {
            let file_name = match file.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            let stem = file_name.rsplit_once('.').map_or(file_name, |(s, _)| s);
            let (disc_num, track_num, title) = match TRACK_FILE.captures(stem) {
                Some(caps) => (
                    caps.get(1).and_then(|m| m.as_str().parse().ok()),
                    caps.get(2).and_then(|m| m.as_str().parse().ok()),
                    caps.get(3).map_or(stem, |m| m.as_str()).to_string(),
                ),
                None => (None, None, stem.to_string()),
            };

            entries.push(CatalogEntry {
                filepath: file.clone(),
                album: album.clone(),
                album_artist: folder_name.clone(),
                artist: primary_artist(&folder_name).to_string(),
                title,
                disc_num,
                original_artist: String::new(),
                release_date: release_date.clone(),
                track_num,
                bit_rate: 0,
                time_secs: 0.0,
                play_count: 0,
                time_played: 0.0,
            });
        }
    }
    Ok(entries)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_at(path: &str, artist: &str, album: &str, title: &str) -> CatalogEntry {
        CatalogEntry {
            filepath: PathBuf::from(path),
            album: album.to_string(),
            album_artist: artist.to_string(),
            artist: artist.to_string(),
            title: title.to_string(),
            disc_num: None,
            original_artist: String::new(),
            release_date: String::new(),
            track_num: None,
            bit_rate: 0,
            time_secs: 0.0,
            play_count: 0,
            time_played: 0.0,
        }
    }

    #[test]
    fn test_index_is_debug_formattable() {
        // unwrap_err() on build() needs the Ok type to be Debug
        let index = CatalogIndex::build(vec![entry_at(
            "/lib/b/h/03 Joga.mp3",
            "Björk",
            "Homogenic",
            "Jóga",
        )])
        .unwrap();
        assert!(format!("{:?}", index).contains("Homogenic"));
    }

    #[test]
    fn test_build_rejects_duplicate_triple() {
        let entries = vec![
            entry_at("/lib/a/x/01 One.mp3", "A", "X", "One"),
            entry_at("/lib/a/x/02 One.mp3", "A", "X", "One"),
        ];
        let err = CatalogIndex::build(entries).unwrap_err();
        assert!(matches!(err, ReconcileError::AmbiguousCatalog { .. }));
    }

    #[test]
    fn test_build_rejects_duplicate_path() {
        let entries = vec![
            entry_at("/lib/a/x/01 One.mp3", "A", "X", "One"),
            entry_at("/lib/a/x/01 One.mp3", "A", "X", "Two"),
        ];
        let err = CatalogIndex::build(entries).unwrap_err();
        assert!(matches!(err, ReconcileError::DuplicateCatalogPath { .. }));
    }

    #[test]
    fn test_exact_lookup_is_case_sensitive() {
        let index = CatalogIndex::build(vec![entry_at(
            "/lib/b/h/03 Joga.mp3",
            "Björk",
            "Homogenic",
            "Jóga",
        )])
        .unwrap();

        assert!(index.exact_lookup("Björk", "Homogenic", "Jóga").is_some());
        assert!(index.exact_lookup("björk", "Homogenic", "Jóga").is_none());
        assert!(index.exact_lookup("Björk", "Homogenic", "Joga").is_none());
    }

    #[test]
    fn test_sibling_pools_sorted_and_scoped() {
        let index = CatalogIndex::build(vec![
            entry_at("/lib/b/p/01 Army of Me.mp3", "Björk", "Post", "Army of Me"),
            entry_at("/lib/b/h/03 Joga.mp3", "Björk", "Homogenic", "Jóga"),
            entry_at("/lib/p/d/01 Roads.mp3", "Portishead", "Dummy", "Roads"),
        ])
        .unwrap();

        assert_eq!(index.artist_names(), &["Björk", "Portishead"]);
        assert_eq!(index.album_names("Björk"), &["Homogenic", "Post"]);
        assert_eq!(index.album_names("Nobody"), &[] as &[String]);
        assert_eq!(index.title_names("Björk", "Homogenic"), &["Jóga"]);
        assert_eq!(index.title_names("Björk", "Dummy"), &[] as &[String]);
    }

    #[test]
    fn test_entry_by_path() {
        let index = CatalogIndex::build(vec![entry_at(
            "/lib/b/h/03 Joga.mp3",
            "Björk",
            "Homogenic",
            "Jóga",
        )])
        .unwrap();
        assert_eq!(index.entry_by_path(Path::new("/lib/b/h/03 Joga.mp3")), Some(0));
        assert_eq!(index.entry_by_path(Path::new("/lib/b/h/04 Other.mp3")), None);
    }

    #[test]
    fn test_rediscover_unique_structural_match() {
        let index = CatalogIndex::build(vec![
            entry_at(
                "/music/Björk/[1997] Homogenic/03 Jóga.mp3",
                "Björk",
                "Homogenic",
                "Jóga (1997 Mix)",
            ),
            entry_at(
                "/music/Björk/[1995] Post/01 Army of Me.mp3",
                "Björk",
                "Post",
                "Army of Me",
            ),
        ])
        .unwrap();

        assert_eq!(index.rediscover("Bjork", "Homogenic", "Joga"), Some(0));
        // Wrong artist folder
        assert_eq!(index.rediscover("Portishead", "Homogenic", "Joga"), None);
        // Album folder prefix must match
        assert_eq!(index.rediscover("Bjork", "Vespertine", "Joga"), None);
    }

    #[test]
    fn test_rediscover_rejects_multiple_matches() {
        let index = CatalogIndex::build(vec![
            entry_at(
                "/music/Björk/[1997] Homogenic/03 Jóga.mp3",
                "Björk",
                "Homogenic",
                "Jóga",
            ),
            entry_at(
                "/music/Björk/[1998] Homogenic Live/03 Jóga Live.mp3",
                "Björk",
                "Homogenic Live",
                "Jóga Live",
            ),
        ])
        .unwrap();
        // Both album folders start with "Homogenic" and both tracks start
        // with "Jóga", so neither can be trusted.
        assert_eq!(index.rediscover("Björk", "Homogenic", "Jóga"), None);
    }

    #[test]
    fn test_rediscover_requires_date_prefix() {
        let index = CatalogIndex::build(vec![entry_at(
            "/music/Björk/Homogenic/03 Jóga.mp3",
            "Björk",
            "Homogenic",
            "Jóga",
        )])
        .unwrap();
        assert_eq!(index.rediscover("Björk", "Homogenic", "Jóga"), None);
    }

    #[test]
    fn test_folder_name_helpers() {
        assert_eq!(folder_album_name("[1997] Homogenic"), "Homogenic");
        assert_eq!(folder_album_name("[1997-09-22] Homogenic"), "Homogenic");
        assert_eq!(folder_album_name("Homogenic"), "Homogenic");

        assert_eq!(file_title_stem("03 Jóga.mp3"), "Jóga");
        assert_eq!(file_title_stem("1-03 Jóga.flac"), "Jóga");
        assert_eq!(file_title_stem("Jóga.mp3"), "Jóga");
        assert_eq!(file_title_stem("Jóga"), "Jóga");
    }

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("/x/01 A.mp3")));
        assert!(is_audio_file(Path::new("/x/01 A.FLAC")));
        assert!(!is_audio_file(Path::new("/x/cover.jpg")));
        assert!(!is_audio_file(Path::new("/x/notes")));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.csv");

        let mut first = entry_at("/lib/b/h/03 Joga.mp3", "Björk", "Homogenic", "Jóga");
        first.disc_num = Some(1);
        first.track_num = Some(3);
        first.release_date = "1997-09-22".to_string();
        first.bit_rate = 320;
        first.time_secs = 304.5;
        let second = entry_at("/lib/p/d/01 Roads.mp3", "Portishead", "Dummy", "Roads");

        let entries = vec![first, second];
        write_snapshot(&entries, &path, '‽').unwrap();
        let loaded = read_snapshot(&path, '‽').unwrap();
        assert_eq!(loaded, entries);
    }

    #[test]
    fn test_snapshot_rejects_bad_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.csv");
        fs::write(&path, "artist‽album‽title\n").unwrap();
        assert!(read_snapshot(&path, '‽').is_err());
    }

    #[test]
    fn test_snapshot_rejects_short_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.csv");
        let header = SNAPSHOT_HEADER.join("‽");
        fs::write(&path, format!("{}\nonly‽three‽fields\n", header)).unwrap();
        assert!(read_snapshot(&path, '‽').is_err());
    }

    #[test]
    fn test_scan_library() {
        let dir = tempfile::tempdir().unwrap();
        let album = dir.path().join("Björk").join("[1997] Homogenic");
        fs::create_dir_all(&album).unwrap();
        fs::write(album.join("03 Jóga.mp3"), b"").unwrap();
        fs::write(album.join("1-05 Immature.flac"), b"").unwrap();
        fs::write(album.join("cover.jpg"), b"").unwrap();

        let loose = dir.path().join("Portishead").join("Singles");
        fs::create_dir_all(&loose).unwrap();
        fs::write(loose.join("Roads.mp3"), b"").unwrap();

        let entries = scan_library(dir.path()).unwrap();
        assert_eq!(entries.len(), 3);

        let joga = entries
            .iter()
            .find(|e| e.title == "Jóga")
            .expect("Jóga scanned");
        assert_eq!(joga.artist, "Björk");
        assert_eq!(joga.album, "Homogenic");
        assert_eq!(joga.release_date, "1997");
        assert_eq!(joga.disc_num, None);
        assert_eq!(joga.track_num, Some(3));
        assert_eq!(joga.time_secs, 0.0);

        let immature = entries
            .iter()
            .find(|e| e.title == "Immature")
            .expect("Immature scanned");
        assert_eq!(immature.disc_num, Some(1));
        assert_eq!(immature.track_num, Some(5));

        let roads = entries
            .iter()
            .find(|e| e.title == "Roads")
            .expect("Roads scanned");
        assert_eq!(roads.album, "Singles");
        assert_eq!(roads.release_date, "");
        assert_eq!(roads.track_num, None);
    }
}
