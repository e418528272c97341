//! Per-record reconciliation: exact lookup, stored corrections, the ignore
//! list, and the interactive fuzzy cascade.
//!
//! The reconciler owns nothing; it borrows the catalog read-only and the two
//! stores mutably, so everything it learns during a batch (corrections,
//! ignores) is visible to the very next record. Batches are expected in
//! `sort_records` order, which keeps identical feed strings adjacent and
//! lets one confirmed correction cover its whole cluster without another
//! prompt.

use std::path::Path;

use crate::catalog::{self, CatalogIndex};
use crate::confirm::{Answer, Confirmer};
use crate::fuzzy::{self, MatchOutcome, Scorer};
use crate::models::{
    EntryId, Field, ListenRecord, MatchPath, MissReason, ReconcileError, ReconcileOutcome,
    RunStats,
};
use crate::normalize::fold_key;
use crate::store::{CorrectionStore, IgnoreStore};

/// Batch order: (artist, album, title, timestamp).
pub fn sort_records(records: &mut [ListenRecord]) {
    records.sort_by(|a, b| {
        (&a.artist, &a.album, &a.title, a.timestamp)
            .cmp(&(&b.artist, &b.album, &b.title, b.timestamp))
    });
}

/// How the fuzzy cascade (plus its rediscovery rescue) ended.
enum Cascade {
    Hit(EntryId, MatchPath),
    Miss(MissReason),
}

/// How one cascade stage ended.
enum Stage {
    /// The field resolved to this catalog name.
    Resolved(String),
    /// The user pointed at a catalog file; resolve the whole record to it.
    Entry(EntryId),
    Failed(MissReason),
}

pub struct Reconciler<'a> {
    catalog: &'a CatalogIndex,
    corrections: &'a mut CorrectionStore,
    ignored: &'a mut IgnoreStore,
    scorer: &'a dyn Scorer,
    confirmer: &'a mut dyn Confirmer,
    pub stats: RunStats,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        catalog: &'a CatalogIndex,
        corrections: &'a mut CorrectionStore,
        ignored: &'a mut IgnoreStore,
        scorer: &'a dyn Scorer,
        confirmer: &'a mut dyn Confirmer,
    ) -> Self {
        Reconciler {
            catalog,
            corrections,
            ignored,
            scorer,
            confirmer,
            stats: RunStats::default(),
        }
    }

    /// Run one record through the full cascade. The only error that can come
    /// back is `Aborted`; everything else a record can hit degrades into an
    /// `Unmatched` outcome.
    pub fn reconcile(
        &mut self,
        record: &ListenRecord,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        self.stats.records_total += 1;

        if let Some(id) =
            self.catalog
                .exact_lookup(&record.artist, &record.album, &record.title)
        {
            self.stats.exact_matches += 1;
            return Ok(ReconcileOutcome::Resolved {
                entry: id,
                via: MatchPath::Exact,
            });
        }

        if let Some(id) = self.correction_lookup(record) {
            self.stats.correction_matches += 1;
            return Ok(ReconcileOutcome::Resolved {
                entry: id,
                via: MatchPath::Correction,
            });
        }

        if self
            .ignored
            .contains(&record.artist, &record.album, &record.title)
        {
            self.stats.ignored_skips += 1;
            return Ok(ReconcileOutcome::Unmatched(MissReason::Ignored));
        }

        match self.fuzzy_cascade(record)? {
            Cascade::Hit(id, via) => {
                match via {
                    MatchPath::Rediscovery => self.stats.rediscovery_matches += 1,
                    _ => self.stats.fuzzy_matches += 1,
                }
                Ok(ReconcileOutcome::Resolved { entry: id, via })
            }
            Cascade::Miss(reason) => {
                if self
                    .ignored
                    .record(&record.artist, &record.album, &record.title)
                {
                    self.stats.ignores_staged += 1;
                }
                match reason {
                    MissReason::NoCandidates => self.stats.unmatched_no_candidates += 1,
                    MissReason::Declined => self.stats.unmatched_declined += 1,
                    MissReason::Ignored => {}
                }
                Ok(ReconcileOutcome::Unmatched(reason))
            }
        }
    }

    /// Substitute stored corrections into the triple and retry the exact
    /// lookup. Without at least one applicable correction there is nothing
    /// to retry.
    fn correction_lookup(&self, record: &ListenRecord) -> Option<EntryId> {
        let artist = self.corrections.lookup(Field::Artist, &record.artist);
        let album = self.corrections.lookup(Field::Album, &record.album);
        let title = self.corrections.lookup(Field::Title, &record.title);
        if artist.is_none() && album.is_none() && title.is_none() {
            return None;
        }
        self.catalog.exact_lookup(
            artist.unwrap_or(&record.artist),
            album.unwrap_or(&record.album),
            title.unwrap_or(&record.title),
        )
    }

    /// Resolve artist over the whole catalog, album within that artist,
    /// title within that album. Any stage failing hands the record to the
    /// structural rescue.
    fn fuzzy_cascade(&mut self, record: &ListenRecord) -> Result<Cascade, ReconcileError> {
        let artist = match self.resolve_stage(
            Field::Artist,
            &record.artist,
            self.catalog.artist_names(),
        )? {
            Stage::Resolved(name) => name,
            Stage::Entry(id) => return Ok(self.accept_entry(record, id, MatchPath::Fuzzy)),
            Stage::Failed(reason) => return self.rescue(record, reason),
        };

        let album = match self.resolve_stage(
            Field::Album,
            &record.album,
            self.catalog.album_names(&artist),
        )? {
            Stage::Resolved(name) => name,
            Stage::Entry(id) => return Ok(self.accept_entry(record, id, MatchPath::Fuzzy)),
            Stage::Failed(reason) => return self.rescue(record, reason),
        };

        let title = match self.resolve_stage(
            Field::Title,
            &record.title,
            self.catalog.title_names(&artist, &album),
        )? {
            Stage::Resolved(name) => name,
            Stage::Entry(id) => return Ok(self.accept_entry(record, id, MatchPath::Fuzzy)),
            Stage::Failed(reason) => return self.rescue(record, reason),
        };

        // The pools come from the index itself, so the assembled triple is
        // always present.
        match self.catalog.exact_lookup(&artist, &album, &title) {
            Some(id) => Ok(Cascade::Hit(id, MatchPath::Fuzzy)),
            None => Ok(Cascade::Miss(MissReason::NoCandidates)),
        }
    }

    fn resolve_stage(
        &mut self,
        field: Field,
        raw: &str,
        candidates: &[String],
    ) -> Result<Stage, ReconcileError> {
        match fuzzy::resolve(self.scorer, raw, candidates) {
            MatchOutcome::NoCandidates => Ok(Stage::Failed(MissReason::NoCandidates)),
            MatchOutcome::AutoAccepted(name) => {
                self.stats.auto_accepts += 1;
                self.stage_correction(field, raw, &name);
                Ok(Stage::Resolved(name))
            }
            MatchOutcome::NeedsConfirmation(name) => {
                let prompt = format!("Correct {} for {}: {}?", field.as_str(), raw, name);
                match self.confirmer.confirm(&prompt) {
                    Answer::Yes => {
                        self.stats.prompts_confirmed += 1;
                        self.stage_correction(field, raw, &name);
                        Ok(Stage::Resolved(name))
                    }
                    Answer::No => {
                        self.stats.prompts_declined += 1;
                        Ok(Stage::Failed(MissReason::Declined))
                    }
                    Answer::Path(path) => {
                        if let Some(id) = self.catalog.entry_by_path(&path) {
                            self.stats.path_picks += 1;
                            return Ok(Stage::Entry(id));
                        }
                        match pick_candidate(field, &path, candidates) {
                            Some(picked) => {
                                self.stats.path_picks += 1;
                                self.stage_correction(field, raw, &picked);
                                Ok(Stage::Resolved(picked))
                            }
                            None => {
                                self.stats.prompts_declined += 1;
                                Ok(Stage::Failed(MissReason::Declined))
                            }
                        }
                    }
                    Answer::Exit => Err(ReconcileError::Aborted),
                }
            }
        }
    }

    /// Last chance for a failed cascade: if the folder naming convention
    /// pins down exactly one entry for the raw triple, offer it.
    fn rescue(
        &mut self,
        record: &ListenRecord,
        reason: MissReason,
    ) -> Result<Cascade, ReconcileError> {
        if let Some(id) = self
            .catalog
            .rediscover(&record.artist, &record.album, &record.title)
        {
            let entry = self.catalog.entry(id);
            let prompt = format!("Confirm the track: {}?", entry.filepath.display());
            match self.confirmer.confirm(&prompt) {
                Answer::Yes => {
                    self.stats.prompts_confirmed += 1;
                    return Ok(self.accept_entry(record, id, MatchPath::Rediscovery));
                }
                Answer::Path(path) => {
                    if let Some(picked) = self.catalog.entry_by_path(&path) {
                        self.stats.path_picks += 1;
                        return Ok(self.accept_entry(record, picked, MatchPath::Fuzzy));
                    }
                    self.stats.prompts_declined += 1;
                }
                Answer::No => {
                    self.stats.prompts_declined += 1;
                }
                Answer::Exit => return Err(ReconcileError::Aborted),
            }
        }
        Ok(Cascade::Miss(reason))
    }

    /// Resolve the record to a known entry and learn corrections for every
    /// field where the feed string differs from the catalog string.
    fn accept_entry(&mut self, record: &ListenRecord, id: EntryId, via: MatchPath) -> Cascade {
        let entry = self.catalog.entry(id);
        self.stage_correction(Field::Artist, &record.artist, &entry.artist);
        self.stage_correction(Field::Album, &record.album, &entry.album);
        self.stage_correction(Field::Title, &record.title, &entry.title);
        Cascade::Hit(id, via)
    }

    fn stage_correction(&mut self, field: Field, raw: &str, resolved: &str) {
        if raw != resolved && self.corrections.record(field, raw, resolved) {
            self.stats.corrections_staged += 1;
        }
    }
}

/// Map a user-picked path onto a candidate name: the final path component,
/// stripped of the folder convention's date or track prefix, must fold to
/// the same key as a candidate.
fn pick_candidate(field: Field, path: &Path, candidates: &[String]) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stripped = match field {
        Field::Artist => name,
        Field::Album => catalog::folder_album_name(name),
        Field::Title => catalog::file_title_stem(name),
    };
    let key = fold_key(stripped);
    candidates
        .iter()
        .find(|candidate| fold_key(candidate) == key)
        .cloned()
}
