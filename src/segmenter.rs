//! Segment membership
//!
//! This module evaluates the eight marketing-segment rules over the enriched
//! roster. Rules are independent: a record may land in zero, one, or several
//! segments. Two rules compare against the optional prior snapshot; when no
//! snapshot is supplied those two segments are omitted from the result
//! entirely rather than produced empty.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::enricher::elapsed_days;
use crate::types::{labels, EnrichedRecord, PriorUserRecord};

/// Name → row-subset mapping. `BTreeMap` plus the numeric label prefixes give
/// a stable reporting and archive order.
pub type SegmentMap = BTreeMap<String, Vec<EnrichedRecord>>;

/// Segmenter for partitioning the enriched roster into named segments
pub struct Segmenter;

impl Segmenter {
    /// Evaluate all membership rules at the single captured instant `now`.
    ///
    /// `now` must be the same instant the enricher derived tenure with, so
    /// that every rule agrees on day boundaries.
    pub fn segment(
        enriched: &[EnrichedRecord],
        prior: Option<&[PriorUserRecord]>,
        now: NaiveDateTime,
    ) -> SegmentMap {
        let mut segments = SegmentMap::new();

        for (label, day) in [
            (labels::REGISTERED_1D_NO_DEPOSIT, 1),
            (labels::REGISTERED_2D_NO_DEPOSIT, 2),
            (labels::REGISTERED_3D_NO_DEPOSIT, 3),
            (labels::REGISTERED_4D_NO_DEPOSIT, 4),
        ] {
            segments.insert(
                label.to_string(),
                collect(enriched, |r| registered_no_deposit(r, day)),
            );
        }

        if let Some(prior) = prior {
            let prior_levels = prior_level_lookup(prior);

            segments.insert(
                labels::LEVEL_1_TO_2.to_string(),
                collect(enriched, |r| {
                    prior_levels
                        .get(r.identity.as_str())
                        .is_some_and(|&prev| prev == 1.0 && r.level == 2.0)
                }),
            );
            segments.insert(
                labels::LEVEL_UP.to_string(),
                collect(enriched, |r| {
                    prior_levels
                        .get(r.identity.as_str())
                        .is_some_and(|&prev| r.level > prev)
                }),
            );
        }

        segments.insert(
            labels::BALANCE_30D_INACTIVE.to_string(),
            collect(enriched, |r| balance_held_inactive(r, now)),
        );
        segments.insert(
            labels::HIGH_BALANCE_NO_WAGER.to_string(),
            collect(enriched, high_balance_no_wager),
        );

        for (label, rows) in &segments {
            debug!(segment = %label, rows = rows.len(), "segment evaluated");
        }

        segments
    }
}

fn collect<F>(enriched: &[EnrichedRecord], predicate: F) -> Vec<EnrichedRecord>
where
    F: Fn(&EnrichedRecord) -> bool,
{
    enriched.iter().filter(|r| predicate(r)).cloned().collect()
}

/// Inner-join lookup for the level-change rules. Identities present only in
/// the current or only in the prior roster match neither rule. Duplicate
/// prior rows resolve last-occurrence-wins.
fn prior_level_lookup(prior: &[PriorUserRecord]) -> HashMap<&str, f64> {
    prior
        .iter()
        .map(|p| (p.identity.as_str(), p.level))
        .collect()
}

/// Rules 1-4: registered exactly `day` whole days ago, no deposits yet.
/// Strict equality keeps the four segments mutually exclusive.
fn registered_no_deposit(r: &EnrichedRecord, day: i64) -> bool {
    r.registered_at.is_some()
        && r.days_since_registration == Some(day)
        && r.deposit_count == 0.0
}

/// Rule 7: holds a balance but has not logged in for 30+ whole days.
fn balance_held_inactive(r: &EnrichedRecord, now: NaiveDateTime) -> bool {
    r.balance >= 1.0
        && r.last_login_at
            .is_some_and(|login| elapsed_days(now, login) >= 30)
}

/// Rule 8: high balance, essentially no wagering, at least one day of tenure.
fn high_balance_no_wager(r: &EnrichedRecord) -> bool {
    r.balance >= 3000.0
        && r.total_wager < 1.0
        && r.registered_at.is_some()
        && r.days_since_registration.is_some_and(|d| d >= 1)
}
