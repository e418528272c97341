//! Listen feed parsing.
//!
//! The feed is a delimited export of (artist, album, title, timestamp) rows.
//! Text fields pass through mojibake repair on the way in, so the rest of
//! the pipeline only ever sees repaired strings.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;

use crate::models::ListenRecord;
use crate::normalize::repair_feed_text;
use crate::progress::create_progress_bar;
use crate::window::{Window, STAMP_FORMAT};

pub const FEED_HEADER: [&str; 4] = ["artist", "album", "title", "timestamp"];

/// Read a feed export and keep the listens whose timestamp falls inside
/// `window`.
pub fn read_listens(path: &Path, delimiter: char, window: &Window) -> Result<Vec<ListenRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read listen feed {}", path.display()))?;

    let mut lines = text.lines();
    let header = lines
        .next()
        .with_context(|| format!("listen feed {} is empty", path.display()))?;
    let expected = FEED_HEADER.join(delimiter.to_string().as_str());
    if header != expected {
        bail!(
            "listen feed {} has unexpected columns: {:?}",
            path.display(),
            header
        );
    }

    let row_count = text.lines().count().saturating_sub(1);
    let pb = create_progress_bar(row_count as u64, "Loading listen feed");

    let mut records = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line_no = idx + 2;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(delimiter).collect();
        if fields.len() != FEED_HEADER.len() {
            bail!(
                "{} line {}: expected {} fields, got {}",
                path.display(),
                line_no,
                FEED_HEADER.len(),
                fields.len()
            );
        }

        let timestamp =
            NaiveDateTime::parse_from_str(fields[3], STAMP_FORMAT).with_context(|| {
                format!(
                    "{} line {}: bad timestamp {:?}",
                    path.display(),
                    line_no,
                    fields[3]
                )
            })?;
        pb.inc(1);
        if !window.contains(timestamp) {
            continue;
        }

        records.push(ListenRecord {
            artist: repair_feed_text(fields[0]),
            album: repair_feed_text(fields[1]),
            title: repair_feed_text(fields[2]),
            timestamp,
        });
    }

    pb.finish_with_message(format!("Kept {} listens in range", records.len()));
    Ok(records)
}
