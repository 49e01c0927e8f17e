//! Table normalization
//!
//! This module coerces raw string tables into typed rows:
//! - Header lookup trims surrounding whitespace
//! - Timestamp cells that do not parse become `None`, never an error
//! - Numeric cells that do not parse become `0.0`, never an error
//!
//! The only failure mode is a required column missing from the table
//! entirely, which aborts the run.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::SegmentError;
use crate::types::{columns, BehaviorRecord, PriorUserRecord, RawTable, UserRecord};

/// Normalizer for coercing raw tables into typed rows
pub struct Normalizer;

impl Normalizer {
    /// Normalize the current user roster.
    pub fn users(table: &RawTable) -> Result<Vec<UserRecord>, SegmentError> {
        let identity = require(table, columns::IDENTITY)?;
        let registered_at = require(table, columns::REGISTERED_AT)?;
        let last_login_at = require(table, columns::LAST_LOGIN_AT)?;
        let balance = require(table, columns::BALANCE)?;
        let level = require(table, columns::LEVEL)?;
        let deposit_count = require(table, columns::DEPOSIT_COUNT)?;

        Ok(table
            .rows
            .iter()
            .map(|row| UserRecord {
                identity: table.cell(row, identity).to_string(),
                registered_at: parse_timestamp(table.cell(row, registered_at)),
                last_login_at: parse_timestamp(table.cell(row, last_login_at)),
                balance: parse_number(table.cell(row, balance)),
                level: parse_number(table.cell(row, level)),
                deposit_count: parse_number(table.cell(row, deposit_count)),
            })
            .collect())
    }

    /// Normalize the behavior log.
    pub fn behavior(table: &RawTable) -> Result<Vec<BehaviorRecord>, SegmentError> {
        let identity = require(table, columns::IDENTITY)?;
        let wager = require(table, columns::WAGER)?;

        Ok(table
            .rows
            .iter()
            .map(|row| BehaviorRecord {
                identity: table.cell(row, identity).to_string(),
                wager: parse_number(table.cell(row, wager)),
            })
            .collect())
    }

    /// Normalize the prior-snapshot roster.
    pub fn prior(table: &RawTable) -> Result<Vec<PriorUserRecord>, SegmentError> {
        let identity = require(table, columns::IDENTITY)?;
        let level = require(table, columns::LEVEL)?;

        Ok(table
            .rows
            .iter()
            .map(|row| PriorUserRecord {
                identity: table.cell(row, identity).to_string(),
                level: parse_number(table.cell(row, level)),
            })
            .collect())
    }
}

fn require(table: &RawTable, name: &str) -> Result<usize, SegmentError> {
    table
        .column_index(name)
        .ok_or_else(|| SegmentError::MissingColumn(name.to_string()))
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a timestamp cell. Unparsable or empty cells become `None`.
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(cell, fmt) {
            return Some(ts);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cell, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Parse a numeric cell. Unparsable or empty cells become `0.0`.
pub fn parse_number(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(0.0)
}
