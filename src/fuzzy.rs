//! Best-candidate selection for one raw feed string against a candidate pool.
//!
//! Each cascade stage hands the resolver a sorted pool of catalog names. The
//! resolver never answers with more than one candidate: either the best one
//! is folded-equal to the raw string (no confirmation needed), or it is a
//! guess the user must confirm, or the pool was empty.

use crate::normalize::fold_key;

/// Similarity between two already-folded strings, in [0.0, 1.0].
pub trait Scorer {
    fn score(&self, a: &str, b: &str) -> f64;
}

/// Default scorer: Levenshtein distance normalized by the longer string.
#[derive(Clone, Copy, Debug, Default)]
pub struct NormalizedLevenshtein;

impl Scorer for NormalizedLevenshtein {
    fn score(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }
}

/// What the resolver proposes for one field.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchOutcome {
    /// Best candidate folds to the same key as the raw string.
    AutoAccepted(String),
    /// Best candidate differs after folding; needs a yes from the user.
    NeedsConfirmation(String),
    /// Empty pool; nothing to offer.
    NoCandidates,
}

/// Pick the best candidate for `raw` out of `candidates`.
///
/// Callers pass the pool in sorted order; ties on score keep the earlier
/// candidate, which makes the pick deterministic across runs.
pub fn resolve(scorer: &dyn Scorer, raw: &str, candidates: &[String]) -> MatchOutcome {
    if candidates.is_empty() {
        return MatchOutcome::NoCandidates;
    }

    let raw_key = fold_key(raw);
    let mut best = &candidates[0];
    let mut best_key = fold_key(best);
    let mut best_score = scorer.score(&raw_key, &best_key);

    for candidate in &candidates[1..] {
        let key = fold_key(candidate);
        let score = scorer.score(&raw_key, &key);
        if score > best_score {
            best = candidate;
            best_key = key;
            best_score = score;
        }
    }

    if best_key == raw_key {
        MatchOutcome::AutoAccepted(best.clone())
    } else {
        MatchOutcome::NeedsConfirmation(best.clone())
    }
}
