//! Pipeline orchestration
//!
//! This module provides the public entry point for a segmentation run. It
//! captures "now" exactly once and threads that instant through enrichment
//! and every membership rule, so all eight predicates agree on day
//! boundaries within a run.

use chrono::{NaiveDateTime, Utc};
use tracing::info;

use crate::enricher::Enricher;
use crate::error::SegmentError;
use crate::normalizer::Normalizer;
use crate::segmenter::{SegmentMap, Segmenter};
use crate::types::RawTable;

/// Run the segmentation pipeline at the current instant.
///
/// The user roster and behavior log are required; the prior snapshot is
/// optional and only gates the two level-change segments.
pub fn run_segmentation(
    user: &RawTable,
    behavior: &RawTable,
    prior: Option<&RawTable>,
) -> Result<SegmentMap, SegmentError> {
    SegmentationPipeline::new().run(user, behavior, prior)
}

/// One segmentation run with a fixed evaluation instant.
pub struct SegmentationPipeline {
    now: NaiveDateTime,
}

impl Default for SegmentationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentationPipeline {
    /// Capture the evaluation instant for this run.
    pub fn new() -> Self {
        Self {
            now: Utc::now().naive_utc(),
        }
    }

    /// Pin the evaluation instant, for reproducible runs and tests.
    pub fn with_now(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// The instant this run evaluates against.
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Normalize, enrich, and segment the supplied tables.
    ///
    /// Pure given the inputs and the pinned instant: identical inputs and
    /// `now` produce identical segment membership.
    pub fn run(
        &self,
        user: &RawTable,
        behavior: &RawTable,
        prior: Option<&RawTable>,
    ) -> Result<SegmentMap, SegmentError> {
        let users = Normalizer::users(user)?;
        let behavior = Normalizer::behavior(behavior)?;
        let prior = prior.map(Normalizer::prior).transpose()?;

        info!(
            users = users.len(),
            behavior_rows = behavior.len(),
            prior_rows = prior.as_ref().map(Vec::len),
            "pipeline inputs normalized"
        );

        let totals = Enricher::aggregate_wagers(&behavior);
        let enriched = Enricher::enrich(users, &totals, self.now);

        let segments = Segmenter::segment(&enriched, prior.as_deref(), self.now);

        info!(
            segments = segments.len(),
            matched = segments.values().map(Vec::len).sum::<usize>(),
            "segmentation complete"
        );

        Ok(segments)
    }
}
