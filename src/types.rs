//! Core types for the segmentation pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw tables, typed rows, and enriched rows ready for segmentation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Column headers of the production data files. Lookups trim surrounding
/// whitespace, so a header of `" レベル "` still resolves.
pub mod columns {
    /// User identity, the join key across every table.
    pub const IDENTITY: &str = "ユーザー名";
    /// Registration timestamp (user table).
    pub const REGISTERED_AT: &str = "登録時間";
    /// Last-login timestamp (user table).
    pub const LAST_LOGIN_AT: &str = "ログイン時間";
    /// Cash balance (user table).
    pub const BALANCE: &str = "現金残高";
    /// Level (user table and prior-snapshot table).
    pub const LEVEL: &str = "レベル";
    /// Deposit-count tag (user table).
    pub const DEPOSIT_COUNT: &str = "入金回数タグ";
    /// Wager amount (behavior table).
    pub const WAGER: &str = "賭け金額";
    /// Derived: total wager per identity (exported).
    pub const TOTAL_WAGER: &str = "賭け金額合計";
    /// Derived: whole days since registration (exported).
    pub const DAYS_SINCE_REGISTRATION: &str = "登録経過日数";
}

/// Segment labels. The numeric prefix fixes the reporting order and names the
/// exported CSV files deterministically.
pub mod labels {
    pub const REGISTERED_1D_NO_DEPOSIT: &str = "01_登録翌日_未入金";
    pub const REGISTERED_2D_NO_DEPOSIT: &str = "02_登録2日後_未入金";
    pub const REGISTERED_3D_NO_DEPOSIT: &str = "03_登録3日後_未入金";
    pub const REGISTERED_4D_NO_DEPOSIT: &str = "04_登録4日後_未入金";
    pub const LEVEL_1_TO_2: &str = "05_レベル1から2昇格";
    pub const LEVEL_UP: &str = "06_レベルアップ";
    pub const BALANCE_30D_INACTIVE: &str = "07_残高あり30日非ログイン";
    pub const HIGH_BALANCE_NO_WAGER: &str = "08_高残高で賭けなし";
}

/// An untyped table as produced by the loader: one header row plus string
/// cells. Rows may be shorter than the header; missing cells read as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Find a column by name, trimming header whitespace before comparison.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Cell at (row, column), empty string when the row is short.
    pub fn cell<'a>(&'a self, row: &'a [String], col: usize) -> &'a str {
        row.get(col).map(String::as_str).unwrap_or("")
    }
}

/// One row of the current user roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub identity: String,
    pub registered_at: Option<NaiveDateTime>,
    pub last_login_at: Option<NaiveDateTime>,
    pub balance: f64,
    pub level: f64,
    pub deposit_count: f64,
}

/// One behavioral event, reduced to a per-identity wager total by the
/// enricher and then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorRecord {
    pub identity: String,
    pub wager: f64,
}

/// One row of the optional prior-snapshot roster. Only the level is carried;
/// it exists solely to detect level transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorUserRecord {
    pub identity: String,
    pub level: f64,
}

/// A user row joined with its wager total and tenure, the unit the segmenter
/// operates on and the shape every exported segment shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub identity: String,
    pub registered_at: Option<NaiveDateTime>,
    pub last_login_at: Option<NaiveDateTime>,
    pub balance: f64,
    pub level: f64,
    pub deposit_count: f64,
    /// Left-join result; `0.0` when the identity has no behavior rows.
    pub total_wager: f64,
    /// Floor of elapsed whole days at the run's captured instant; `None` when
    /// the registration timestamp is missing.
    pub days_since_registration: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index_trims_headers() {
        let table = RawTable {
            headers: vec![" ユーザー名 ".to_string(), "レベル".to_string()],
            rows: vec![],
        };

        assert_eq!(table.column_index(columns::IDENTITY), Some(0));
        assert_eq!(table.column_index(columns::LEVEL), Some(1));
        assert_eq!(table.column_index(columns::BALANCE), None);
    }

    #[test]
    fn test_cell_handles_short_rows() {
        let table = RawTable {
            headers: vec!["a".to_string(), "b".to_string()],
            rows: vec![vec!["x".to_string()]],
        };

        assert_eq!(table.cell(&table.rows[0], 0), "x");
        assert_eq!(table.cell(&table.rows[0], 1), "");
    }
}
