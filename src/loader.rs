//! Table loading
//!
//! This module turns raw delimited-text bytes into a [`RawTable`]:
//! - UTF-8 BOM stripped when present
//! - Two-attempt decode: strict UTF-8 first, Shift-JIS on failure
//! - Flexible row lengths (short rows are padded by the consumer)

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use csv::ReaderBuilder;
use encoding_rs::SHIFT_JIS;
use tracing::{debug, warn};

use crate::error::SegmentError;
use crate::types::RawTable;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Load a delimited-text file from disk.
pub fn load_csv_file<P: AsRef<Path>>(path: P) -> Result<RawTable, SegmentError> {
    let bytes = fs::read(path.as_ref())?;
    debug!(path = %path.as_ref().display(), bytes = bytes.len(), "loading table");
    load_csv_bytes(&bytes)
}

/// Parse delimited-text bytes into a raw table.
///
/// Decoding is an explicit two-attempt strategy: bytes that are not valid
/// UTF-8 are retried as Shift-JIS, and only when that decode also reports
/// malformed sequences does loading fail.
pub fn load_csv_bytes(bytes: &[u8]) -> Result<RawTable, SegmentError> {
    let text = decode(bytes)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(columns = headers.len(), rows = rows.len(), "table loaded");
    Ok(RawTable { headers, rows })
}

fn decode(bytes: &[u8]) -> Result<Cow<'_, str>, SegmentError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(Cow::Borrowed(text)),
        Err(_) => {
            warn!("input is not valid UTF-8, retrying as Shift-JIS");
            let (text, _, had_errors) = SHIFT_JIS.decode(bytes);
            if had_errors {
                Err(SegmentError::Decode)
            } else {
                Ok(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_utf8_csv() {
        let csv = "ユーザー名,レベル\nu1,2\nu2,3\n";
        let table = load_csv_bytes(csv.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["ユーザー名", "レベル"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["u1", "2"]);
    }

    #[test]
    fn test_bom_is_stripped_from_first_header() {
        let mut bytes = Vec::from(&b"\xef\xbb\xbf"[..]);
        bytes.extend_from_slice("a,b\n1,2\n".as_bytes());

        let table = load_csv_bytes(&bytes).unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
    }

    #[test]
    fn test_shift_jis_fallback() {
        let (encoded, _, had_errors) = SHIFT_JIS.encode("ユーザー名,レベル\nユーザー壱,1\n");
        assert!(!had_errors);

        let table = load_csv_bytes(&encoded).unwrap();
        assert_eq!(table.headers, vec!["ユーザー名", "レベル"]);
        assert_eq!(table.rows[0][0], "ユーザー壱");
    }

    #[test]
    fn test_undecodable_bytes_fail() {
        // 0x80 is invalid UTF-8 and an incomplete Shift-JIS lead byte.
        let bytes = b"a,b\n\x80\x80\x80,2\n\xff";
        assert!(matches!(
            load_csv_bytes(bytes),
            Err(SegmentError::Decode) | Err(SegmentError::Csv(_))
        ));
    }

    #[test]
    fn test_short_rows_survive() {
        let csv = "a,b,c\n1,2\n";
        let table = load_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0], vec!["1", "2"]);
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        std::fs::write(&path, "ユーザー名,現金残高\nu1,500\n").unwrap();

        let table = load_csv_file(&path).unwrap();
        assert_eq!(table.rows, vec![vec!["u1".to_string(), "500".to_string()]]);
    }
}
