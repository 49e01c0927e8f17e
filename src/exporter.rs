//! Artifact export
//!
//! This module serializes segments for download:
//! - One CSV per segment, UTF-8 with a byte-order mark so spreadsheet tools
//!   pick the encoding up correctly
//! - One ZIP archive bundling only the non-empty segments
//!
//! Every exported segment shares the same eight-column shape regardless of
//! which rule produced it.

use std::io::{Cursor, Write};

use chrono::NaiveDateTime;
use csv::WriterBuilder;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::SegmentError;
use crate::segmenter::SegmentMap;
use crate::types::{columns, EnrichedRecord};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

const EXPORT_HEADERS: [&str; 8] = [
    columns::IDENTITY,
    columns::REGISTERED_AT,
    columns::LAST_LOGIN_AT,
    columns::BALANCE,
    columns::LEVEL,
    columns::DEPOSIT_COUNT,
    columns::TOTAL_WAGER,
    columns::DAYS_SINCE_REGISTRATION,
];

/// File name of a segment's CSV artifact, inside and outside the archive.
pub fn csv_file_name(label: &str) -> String {
    format!("{label}.csv")
}

/// Serialize one segment to CSV bytes (BOM + header + rows).
pub fn segment_to_csv(rows: &[EnrichedRecord]) -> Result<Vec<u8>, SegmentError> {
    let mut buf = Vec::from(UTF8_BOM);

    let mut writer = WriterBuilder::new().from_writer(&mut buf);
    writer.write_record(EXPORT_HEADERS)?;
    for row in rows {
        writer.write_record([
            row.identity.clone(),
            format_timestamp(row.registered_at),
            format_timestamp(row.last_login_at),
            format_number(row.balance),
            format_number(row.level),
            format_number(row.deposit_count),
            format_number(row.total_wager),
            row.days_since_registration
                .map(|d| d.to_string())
                .unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    drop(writer);

    Ok(buf)
}

/// Bundle all non-empty segments into one ZIP archive. Empty segments are
/// excluded; callers report them as "no matching records" instead.
pub fn write_archive(segments: &SegmentMap) -> Result<Vec<u8>, SegmentError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (label, rows) in segments {
        if rows.is_empty() {
            continue;
        }
        zip.start_file(csv_file_name(label), options)?;
        zip.write_all(&segment_to_csv(rows)?)?;
    }

    Ok(zip.finish()?.into_inner())
}

fn format_timestamp(ts: Option<NaiveDateTime>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn format_number(value: f64) -> String {
    // shortest representation that round-trips through f64 parsing
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_csv_bytes;
    use crate::normalizer::{parse_number, parse_timestamp};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::io::Read;

    fn sample_rows() -> Vec<EnrichedRecord> {
        vec![EnrichedRecord {
            identity: "u1".to_string(),
            registered_at: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(6, 30, 0),
            last_login_at: None,
            balance: 1500.5,
            level: 2.0,
            deposit_count: 0.0,
            total_wager: 12.5,
            days_since_registration: Some(1),
        }]
    }

    #[test]
    fn test_csv_starts_with_bom() {
        let bytes = segment_to_csv(&sample_rows()).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);
    }

    #[test]
    fn test_csv_round_trips_through_loader() {
        let rows = sample_rows();
        let bytes = segment_to_csv(&rows).unwrap();

        let table = load_csv_bytes(&bytes).unwrap();
        assert_eq!(table.headers, EXPORT_HEADERS);
        assert_eq!(table.rows.len(), 1);

        let row = &table.rows[0];
        assert_eq!(row[0], rows[0].identity);
        assert_eq!(parse_timestamp(&row[1]), rows[0].registered_at);
        assert_eq!(parse_timestamp(&row[2]), rows[0].last_login_at);
        assert_eq!(parse_number(&row[3]), rows[0].balance);
        assert_eq!(parse_number(&row[4]), rows[0].level);
        assert_eq!(parse_number(&row[5]), rows[0].deposit_count);
        assert_eq!(parse_number(&row[6]), rows[0].total_wager);
        assert_eq!(row[7].parse::<i64>().ok(), rows[0].days_since_registration);
    }

    #[test]
    fn test_archive_excludes_empty_segments() {
        let mut segments = SegmentMap::new();
        segments.insert("01_full".to_string(), sample_rows());
        segments.insert("02_empty".to_string(), Vec::new());

        let bytes = write_archive(&segments).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        assert_eq!(archive.len(), 1);
        assert_eq!(archive.by_index(0).unwrap().name(), "01_full.csv");
    }

    #[test]
    fn test_archive_entries_match_standalone_csv() {
        let mut segments = SegmentMap::new();
        segments.insert("01_full".to_string(), sample_rows());

        let bytes = write_archive(&segments).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        let mut entry = archive.by_name("01_full.csv").unwrap();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();

        assert_eq!(contents, segment_to_csv(&sample_rows()).unwrap());
    }
}
