use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;

use scrobble_tally::catalog::{self, CatalogIndex};
use scrobble_tally::confirm::{Confirmer, DeclineAll, TerminalConfirmer};
use scrobble_tally::engine::{self, Reconciler};
use scrobble_tally::feed;
use scrobble_tally::fuzzy::NormalizedLevenshtein;
use scrobble_tally::models::{CatalogEntry, ReconcileError};
use scrobble_tally::progress::{self, create_progress_bar};
use scrobble_tally::report;
use scrobble_tally::safety;
use scrobble_tally::stats;
use scrobble_tally::store::{CorrectionStore, IgnoreStore};
use scrobble_tally::window::{Window, STAMP_FORMAT};

#[derive(Parser)]
#[command(name = "scrobble-tally")]
#[command(about = "Reconcile a listen feed against a local music library and tally plays")]
struct Args {
    /// Period to tally: one or two YYYY[-MM][-DD] values
    #[arg(short = 'r', long, num_args = 1..=2)]
    date_range: Vec<String>,

    /// Listen feed export
    #[arg(long)]
    listens: Option<PathBuf>,

    /// Catalog snapshot to reconcile against
    #[arg(long)]
    library: Option<PathBuf>,

    /// Library root to scan when no snapshot is at hand
    #[arg(long)]
    library_dir: Option<PathBuf>,

    /// Scan --library-dir, write a catalog snapshot here, and exit
    #[arg(long)]
    write_snapshot: Option<PathBuf>,

    /// Let --write-snapshot replace an existing file
    #[arg(long)]
    force: bool,

    /// Directory that collects one report folder per run
    #[arg(long, default_value = "stats")]
    out_dir: PathBuf,

    #[arg(long, default_value = "corrections.csv")]
    corrections: PathBuf,

    #[arg(long, default_value = "ignored.csv")]
    ignored: PathBuf,

    /// Field delimiter for every table this tool reads or writes
    #[arg(long, default_value_t = '‽')]
    delimiter: char,

    /// Answer no to every prompt instead of asking
    #[arg(long)]
    non_interactive: bool,

    /// Hide progress bars; log phase lines to stderr instead
    #[arg(long)]
    log_only: bool,

    #[arg(long, default_value = "0")]
    workers: usize,
}

fn load_catalog(args: &Args) -> Result<Vec<CatalogEntry>> {
    if let Some(snapshot) = args.library.as_ref() {
        return catalog::read_snapshot(snapshot, args.delimiter);
    }
    if let Some(dir) = args.library_dir.as_ref() {
        return catalog::scan_library(dir);
    }
    bail!("pass --library <snapshot> or --library-dir <root> to load the catalog");
}

/// Scan the library and persist it as a snapshot instead of tallying.
fn write_snapshot_mode(args: &Args, target: &Path) -> Result<()> {
    let library_dir = args
        .library_dir
        .as_ref()
        .context("--write-snapshot needs --library-dir to scan")?;

    let mut inputs: Vec<&Path> = vec![args.corrections.as_path(), args.ignored.as_path()];
    if let Some(listens) = args.listens.as_ref() {
        inputs.push(listens.as_path());
    }
    safety::validate_write_target(target, &inputs)?;
    safety::check_overwrite(target, args.force)?;

    let entries = catalog::scan_library(library_dir)?;
    // Surface duplicate paths or triples before the snapshot lands on disk
    let index = CatalogIndex::build(entries)?;
    catalog::write_snapshot(index.entries(), target, args.delimiter)?;

    println!("Wrote {} entries to {}", index.len(), target.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    progress::set_log_only(args.log_only);

    if args.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.workers)
            .build_global()
            .context("Failed to set thread pool size")?;
    }

    let start = Instant::now();

    if let Some(target) = args.write_snapshot.as_ref() {
        return write_snapshot_mode(&args, target);
    }

    if args.date_range.is_empty() {
        bail!("--date-range is required: pass one or two YYYY[-MM][-DD] values");
    }
    let window = Window::parse(&args.date_range)?;

    let mut catalog = CatalogIndex::build(load_catalog(&args)?)?;
    println!("Catalog holds {} tracks", catalog.len());

    let listens_path = args
        .listens
        .as_ref()
        .context("--listens is required to tally plays")?;

    let mut corrections = CorrectionStore::load(&args.corrections, args.delimiter)?;
    let mut ignored = IgnoreStore::load(&args.ignored, args.delimiter)?;
    println!(
        "Loaded {} corrections and {} ignored triples",
        corrections.len(),
        ignored.len()
    );

    let mut records = feed::read_listens(listens_path, args.delimiter, &window)?;
    engine::sort_records(&mut records);

    let scorer = NormalizedLevenshtein;
    let mut terminal = TerminalConfirmer::new();
    let mut decline = DeclineAll;
    let confirmer: &mut dyn Confirmer = if args.non_interactive {
        &mut decline
    } else {
        &mut terminal
    };

    let pb = create_progress_bar(records.len() as u64, "Reconciling listens");
    let mut outcomes = Vec::with_capacity(records.len());
    let mut aborted = false;
    let mut run_stats = {
        let mut reconciler = Reconciler::new(
            &catalog,
            &mut corrections,
            &mut ignored,
            &scorer,
            &mut *confirmer,
        );
        for record in &records {
            match reconciler.reconcile(record) {
                Ok(outcome) => outcomes.push(outcome),
                Err(ReconcileError::Aborted) => {
                    aborted = true;
                    break;
                }
                Err(err) => return Err(err.into()),
            }
            pb.inc(1);
            progress::log_progress("reconcile", outcomes.len() as u64, records.len() as u64, 500);
        }
        reconciler.stats
    };

    if aborted {
        pb.finish_and_clear();
        println!("Run aborted; staged corrections and ignores were discarded.");
        return Ok(());
    }
    pb.finish_with_message(format!("Reconciled {} listens", outcomes.len()));

    let new_corrections = corrections.flush()?;
    let new_ignores = ignored.flush()?;
    if new_corrections > 0 || new_ignores > 0 {
        println!(
            "Learned {} corrections and {} ignored triples",
            new_corrections, new_ignores
        );
    }

    for outcome in outcomes {
        stats::accumulate(&mut catalog, outcome);
    }

    let tracks = stats::track_rows(&catalog);
    let albums = stats::album_rows(&catalog);
    let artists = stats::artist_rows(&catalog);
    if stats::total_plays(&catalog) == 0 {
        println!("No plays attributed in this period; reports will be empty.");
    }

    run_stats.elapsed_seconds = start.elapsed().as_secs_f64();
    run_stats.log("run");

    let stamp = chrono::Local::now().naive_local().format(STAMP_FORMAT).to_string();
    let report_dir = report::write_reports(
        &args.out_dir,
        &stamp,
        args.delimiter,
        &tracks,
        &albums,
        &artists,
        &run_stats,
        &mut *confirmer,
    )?;

    println!("\n{:=<60}", "");
    println!("Reconciliation complete!");
    println!("  Listens in range: {}", run_stats.records_total);
    println!(
        "  Resolved: {} ({:.1}% match rate)",
        run_stats.resolved_total(),
        run_stats.match_rate()
    );
    println!(
        "  Unmatched: {} ({} ignored, {} without candidates, {} declined)",
        run_stats.unmatched_total(),
        run_stats.ignored_skips,
        run_stats.unmatched_no_candidates,
        run_stats.unmatched_declined
    );
    println!("  Plays attributed: {}", stats::total_plays(&catalog));
    println!("  Reports: {}", report_dir.display());
    println!("  Elapsed: {}", progress::format_duration(start.elapsed()));
    println!("{:=<60}", "");

    Ok(())
}
