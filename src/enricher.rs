//! Row enrichment
//!
//! This module joins the behavior log onto the user roster and derives tenure:
//! - Behavior rows are summed into one wager total per identity
//! - The total is left-joined onto users; identities with no behavior rows
//!   get an explicit `0.0`, not a missing value
//! - Whole days since registration are derived from the run's captured
//!   instant, `None` when the registration timestamp is missing
//!
//! The output is a pure function of the inputs and the supplied `now`; time
//! is never re-sampled here.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::types::{BehaviorRecord, EnrichedRecord, UserRecord};

const SECONDS_PER_DAY: i64 = 86_400;

/// Enricher for joining behavior aggregates onto the user roster
pub struct Enricher;

impl Enricher {
    /// Sum wager amounts per identity. Identities absent from the behavior
    /// log are absent from the map; the zero fill happens at join time.
    pub fn aggregate_wagers(behavior: &[BehaviorRecord]) -> HashMap<String, f64> {
        let mut totals: HashMap<String, f64> = HashMap::new();
        for row in behavior {
            *totals.entry(row.identity.clone()).or_insert(0.0) += row.wager;
        }
        totals
    }

    /// Left-join wager totals onto users and derive tenure at `now`.
    ///
    /// Duplicate identities in the roster all survive independently; each
    /// duplicate receives the same wager total for its identity.
    pub fn enrich(
        users: Vec<UserRecord>,
        totals: &HashMap<String, f64>,
        now: NaiveDateTime,
    ) -> Vec<EnrichedRecord> {
        users
            .into_iter()
            .map(|user| {
                let total_wager = totals.get(&user.identity).copied().unwrap_or(0.0);
                let days_since_registration =
                    user.registered_at.map(|reg| elapsed_days(now, reg));

                EnrichedRecord {
                    identity: user.identity,
                    registered_at: user.registered_at,
                    last_login_at: user.last_login_at,
                    balance: user.balance,
                    level: user.level,
                    deposit_count: user.deposit_count,
                    total_wager,
                    days_since_registration,
                }
            })
            .collect()
    }
}

/// Whole days elapsed from `then` to `now`, floored. A `then` in the future
/// yields a negative count (`-1` for anything under a day ahead), so
/// strict-equality day rules can never match it.
pub fn elapsed_days(now: NaiveDateTime, then: NaiveDateTime) -> i64 {
    (now - then).num_seconds().div_euclid(SECONDS_PER_DAY)
}
