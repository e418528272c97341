//! Play statistics: accumulation onto catalog entries, then rollup views.
//!
//! Rollups group on the exact catalog strings. Casing differences between
//! catalog entries are deliberate distinctions there, unlike in matching.

use rustc_hash::FxHashMap;

use crate::catalog::CatalogIndex;
use crate::models::ReconcileOutcome;

/// Fold one outcome into the catalog's play counters. A record that played
/// counts once and contributes the track's full duration; unmatched records
/// contribute nothing.
pub fn accumulate(catalog: &mut CatalogIndex, outcome: ReconcileOutcome) {
    if let ReconcileOutcome::Resolved { entry, .. } = outcome {
        let entry = catalog.entry_mut(entry);
        entry.play_count += 1;
        entry.time_played += entry.time_secs;
    }
}

pub fn total_plays(catalog: &CatalogIndex) -> u64 {
    catalog.entries().iter().map(|e| e.play_count).sum()
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackRow {
    pub artist: String,
    pub album: String,
    pub title: String,
    pub play_count: u64,
    pub time_played: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlbumRow {
    pub artist: String,
    pub album: String,
    pub play_count: u64,
    pub time_played: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArtistRow {
    pub artist: String,
    pub play_count: u64,
    pub time_played: f64,
}

/// Per-track table: every entry that played at least once, most played
/// first, ties in catalog order.
pub fn track_rows(catalog: &CatalogIndex) -> Vec<TrackRow> {
    let mut rows: Vec<TrackRow> = catalog
        .entries()
        .iter()
        .filter(|e| e.play_count > 0)
        .map(|e| TrackRow {
            artist: e.artist.clone(),
            album: e.album.clone(),
            title: e.title.clone(),
            play_count: e.play_count,
            time_played: e.time_played,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.play_count.cmp(&a.play_count).then_with(|| {
            (&a.artist, &a.album, &a.title).cmp(&(&b.artist, &b.album, &b.title))
        })
    });
    rows
}

/// Per-album table: counts and time summed across every entry sharing the
/// (artist, album) pair, whatever their titles.
pub fn album_rows(catalog: &CatalogIndex) -> Vec<AlbumRow> {
    let mut groups: FxHashMap<(String, String), (u64, f64)> = FxHashMap::default();
    for entry in catalog.entries() {
        let group = groups
            .entry((entry.artist.clone(), entry.album.clone()))
            .or_default();
        group.0 += entry.play_count;
        group.1 += entry.time_played;
    }

    let mut rows: Vec<AlbumRow> = groups
        .into_iter()
        .filter(|(_, (count, _))| *count > 0)
        .map(|((artist, album), (play_count, time_played))| AlbumRow {
            artist,
            album,
            play_count,
            time_played,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.play_count
            .cmp(&a.play_count)
            .then_with(|| (&a.artist, &a.album).cmp(&(&b.artist, &b.album)))
    });
    rows
}

/// Per-artist table.
pub fn artist_rows(catalog: &CatalogIndex) -> Vec<ArtistRow> {
    let mut groups: FxHashMap<String, (u64, f64)> = FxHashMap::default();
    for entry in catalog.entries() {
        let group = groups.entry(entry.artist.clone()).or_default();
        group.0 += entry.play_count;
        group.1 += entry.time_played;
    }

    let mut rows: Vec<ArtistRow> = groups
        .into_iter()
        .filter(|(_, (count, _))| *count > 0)
        .map(|(artist, (play_count, time_played))| ArtistRow {
            artist,
            play_count,
            time_played,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.play_count
            .cmp(&a.play_count)
            .then_with(|| a.artist.cmp(&b.artist))
    });
    rows
}
