//! Report output.
//!
//! Each run writes its tallies under a fresh `<out_dir>/<stamp>/` directory:
//! one delimited table per rollup level plus the run statistics as JSON.
//! Table writes go through a retry prompt so a run is not lost to a file
//! held open by another program.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::confirm::{Answer, Confirmer};
use crate::models::RunStats;
use crate::stats::{AlbumRow, ArtistRow, TrackRow};

const TRACKS_FILE: &str = "tracks.csv";
const ALBUMS_FILE: &str = "albums.csv";
const ARTISTS_FILE: &str = "artists.csv";
const STATS_FILE: &str = "run_stats.json";

/// Write every report table under `<out_dir>/<stamp>/` and return that
/// directory.
pub fn write_reports(
    out_dir: &Path,
    stamp: &str,
    delimiter: char,
    tracks: &[TrackRow],
    albums: &[AlbumRow],
    artists: &[ArtistRow],
    stats: &RunStats,
    confirmer: &mut dyn Confirmer,
) -> Result<PathBuf> {
    let report_dir = out_dir.join(stamp);
    fs::create_dir_all(&report_dir)
        .with_context(|| format!("failed to create report directory {}", report_dir.display()))?;

    let tracks_rows: Vec<Vec<String>> = tracks
        .iter()
        .map(|row| {
            vec![
                row.artist.clone(),
                row.album.clone(),
                row.title.clone(),
                row.play_count.to_string(),
                row.time_played.to_string(),
            ]
        })
        .collect();
    let albums_rows: Vec<Vec<String>> = albums
        .iter()
        .map(|row| {
            vec![
                row.artist.clone(),
                row.album.clone(),
                row.play_count.to_string(),
                row.time_played.to_string(),
            ]
        })
        .collect();
    let artists_rows: Vec<Vec<String>> = artists
        .iter()
        .map(|row| {
            vec![
                row.artist.clone(),
                row.play_count.to_string(),
                row.time_played.to_string(),
            ]
        })
        .collect();

    let tables = [
        (
            TRACKS_FILE,
            render_table(
                &["artist", "album", "title", "play_count", "time_played"],
                &tracks_rows,
                delimiter,
            )?,
        ),
        (
            ALBUMS_FILE,
            render_table(
                &["artist", "album", "play_count", "time_played"],
                &albums_rows,
                delimiter,
            )?,
        ),
        (
            ARTISTS_FILE,
            render_table(&["artist", "play_count", "time_played"], &artists_rows, delimiter)?,
        ),
    ];

    for (name, contents) in &tables {
        write_with_retry(&report_dir.join(name), contents, confirmer)?;
    }
    stats.write_to_file(&report_dir.join(STATS_FILE))?;

    Ok(report_dir)
}

fn render_table(columns: &[&str], rows: &[Vec<String>], delimiter: char) -> Result<String> {
    let sep = delimiter.to_string();
    let mut out = String::new();
    out.push_str(&columns.join(sep.as_str()));
    out.push('\n');
    for row in rows {
        for field in row {
            if field.contains(delimiter) {
                bail!(
                    "cannot write report: field {:?} contains the delimiter {:?}",
                    field,
                    delimiter
                );
            }
        }
        out.push_str(&row.join(sep.as_str()));
        out.push('\n');
    }
    Ok(out)
}

/// Keep offering a retry while the user says yes. Anything else gives up on
/// the run's output.
fn write_with_retry(path: &Path, contents: &str, confirmer: &mut dyn Confirmer) -> Result<()> {
    loop {
        match fs::write(path, contents) {
            Ok(()) => return Ok(()),
            Err(err) => {
                let prompt = format!(
                    "Could not write {} ({}). Release the file and retry?",
                    path.display(),
                    err
                );
                match confirmer.confirm(&prompt) {
                    Answer::Yes | Answer::Path(_) => continue,
                    Answer::No | Answer::Exit => {
                        return Err(err).with_context(|| {
                            format!("failed to write report {}", path.display())
                        })
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::DeclineAll;
    use std::collections::VecDeque;

    struct Scripted(VecDeque<Answer>);

    impl Confirmer for Scripted {
        fn confirm(&mut self, _prompt: &str) -> Answer {
            self.0.pop_front().expect("confirmer got an unscripted prompt")
        }
    }

    fn sample_rows() -> (Vec<TrackRow>, Vec<AlbumRow>, Vec<ArtistRow>) {
        let tracks = vec![TrackRow {
            artist: "Björk".to_string(),
            album: "Homogenic".to_string(),
            title: "Jóga".to_string(),
            play_count: 3,
            time_played: 900.0,
        }];
        let albums = vec![AlbumRow {
            artist: "Björk".to_string(),
            album: "Homogenic".to_string(),
            play_count: 3,
            time_played: 900.0,
        }];
        let artists = vec![ArtistRow {
            artist: "Björk".to_string(),
            play_count: 3,
            time_played: 900.0,
        }];
        (tracks, albums, artists)
    }

    #[test]
    fn test_writes_all_tables() {
        let dir = tempfile::tempdir().unwrap();
        let (tracks, albums, artists) = sample_rows();
        let stats = RunStats {
            records_total: 3,
            exact_matches: 3,
            ..RunStats::default()
        };
        let mut confirmer = DeclineAll;

        let report_dir = write_reports(
            dir.path(),
            "2021-06-01_10-00",
            '‽',
            &tracks,
            &albums,
            &artists,
            &stats,
            &mut confirmer,
        )
        .unwrap();

        assert_eq!(report_dir, dir.path().join("2021-06-01_10-00"));
        let tracks_text = fs::read_to_string(report_dir.join("tracks.csv")).unwrap();
        assert!(tracks_text.starts_with("artist‽album‽title‽play_count‽time_played\n"));
        assert!(tracks_text.contains("Björk‽Homogenic‽Jóga‽3‽900\n"));

        let artists_text = fs::read_to_string(report_dir.join("artists.csv")).unwrap();
        assert_eq!(artists_text, "artist‽play_count‽time_played\nBjörk‽3‽900\n");

        let stats_text = fs::read_to_string(report_dir.join("run_stats.json")).unwrap();
        assert!(stats_text.contains("\"records_total\": 3"));
    }

    #[test]
    fn test_declined_retry_gives_up() {
        let dir = tempfile::tempdir().unwrap();
        let (tracks, albums, artists) = sample_rows();
        // A directory where the table should go makes every write fail
        fs::create_dir_all(dir.path().join("stamp").join(TRACKS_FILE)).unwrap();
        let mut confirmer = Scripted(VecDeque::from([Answer::No]));

        let err = write_reports(
            dir.path(),
            "stamp",
            '‽',
            &tracks,
            &albums,
            &artists,
            &RunStats::default(),
            &mut confirmer,
        )
        .unwrap_err();

        assert!(err.to_string().contains("failed to write report"));
    }

    #[test]
    fn test_confirmed_retry_tries_again() {
        let dir = tempfile::tempdir().unwrap();
        let (tracks, albums, artists) = sample_rows();
        fs::create_dir_all(dir.path().join("stamp").join(TRACKS_FILE)).unwrap();
        // Yes retries once against the same blocked path, then no gives up
        let mut confirmer = Scripted(VecDeque::from([Answer::Yes, Answer::No]));

        let result = write_reports(
            dir.path(),
            "stamp",
            '‽',
            &tracks,
            &albums,
            &artists,
            &RunStats::default(),
            &mut confirmer,
        );

        assert!(result.is_err());
        assert!(confirmer.0.is_empty());
    }

    #[test]
    fn test_delimiter_inside_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (mut tracks, albums, artists) = sample_rows();
        tracks[0].title = "Jóga‽Live".to_string();
        let mut confirmer = DeclineAll;

        let err = write_reports(
            dir.path(),
            "stamp",
            '‽',
            &tracks,
            &albums,
            &artists,
            &RunStats::default(),
            &mut confirmer,
        )
        .unwrap_err();

        assert!(err.to_string().contains("contains the delimiter"));
    }
}
