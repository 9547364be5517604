//! Delimited-text ingest and export.
//!
//! Servers sometimes return an HTML error page where a CSV file was
//! expected, so text is sniffed before it reaches the CSV reader.

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::{ExportError, TableError};
use crate::model::Row;

/// How far into the text to look for HTML markers.
const SNIFF_LIMIT: usize = 1024;

/// A parsed table: headers in file order plus one [`Row`] per record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Cheap check that `text` plausibly holds a delimited table.
pub fn sniff(text: &str) -> Result<(), TableError> {
    let trimmed = text.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Err(TableError::NotTabular("empty document"));
    }
    if trimmed.starts_with('<') {
        return Err(TableError::NotTabular("document starts with markup"));
    }

    let mut end = trimmed.len().min(SNIFF_LIMIT);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    let head = trimmed[..end].to_ascii_lowercase();
    if head.contains("<html") || head.contains("<!doctype") || head.contains("<body") {
        return Err(TableError::NotTabular("document looks like HTML"));
    }
    if !trimmed.contains('\n') && !trimmed.contains(',') {
        return Err(TableError::NotTabular("single line without a delimiter"));
    }
    Ok(())
}

/// Returns `true` if [`sniff`] accepts the text.
pub fn looks_like_table(text: &str) -> bool {
    sniff(text).is_ok()
}

/// Parse CSV text with a header line into rows keyed by header.
///
/// Short records are padded with empty cells; records whose cells are all
/// blank are skipped.
pub fn parse_table(text: &str) -> Result<Table, TableError> {
    sniff(text)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(TableError::NotTabular("header line is empty"));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), record.get(i).unwrap_or("")))
            .collect();
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    tracing::debug!("parsed table with {} columns and {} rows", headers.len(), rows.len());
    Ok(Table { headers, rows })
}

/// Serialize rows back to CSV with the given header order.
pub fn export_csv<'a, I>(headers: &[String], rows: I) -> Result<String, ExportError>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(headers.iter().map(|h| row.get(h)))?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_keyed_by_header() {
        let text = "Username,Q1,Q1 [Score]\nalice,4,1/1\nbob,5,0/1\n";
        let table = parse_table(text).unwrap();
        assert_eq!(table.headers, vec!["Username", "Q1", "Q1 [Score]"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].get("Q1 [Score]"), "0/1");
    }

    #[test]
    fn quoted_multiline_headers_survive() {
        let text = "\"What is\nyour name?\",\"What is\nyour name? [Score]\"\nAda,1\n";
        let table = parse_table(text).unwrap();
        assert_eq!(table.headers[0], "What is\nyour name?");
        assert_eq!(table.rows[0].get("What is\nyour name?"), "Ada");
    }

    #[test]
    fn short_records_are_padded_and_blank_rows_skipped() {
        let text = "A,B,C\n1\n,,\n4,5,6\n";
        let table = parse_table(text).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("A"), "1");
        assert_eq!(table.rows[0].get("C"), "");
        assert!(table.rows[0].contains_column("C"));
    }

    #[test]
    fn bom_is_stripped_from_first_header() {
        let text = "\u{feff}Username,Total score\nalice,3/10\n";
        let table = parse_table(text).unwrap();
        assert_eq!(table.headers[0], "Username");
        assert_eq!(table.rows[0].get("Username"), "alice");
    }

    #[test]
    fn html_is_not_a_table() {
        assert!(!looks_like_table("<!DOCTYPE html><html><body>404</body></html>"));
        assert!(!looks_like_table("  <html>"));
        assert!(!looks_like_table("Error\n<HTML><BODY>oops</BODY></HTML>"));
        assert!(matches!(
            parse_table("<html></html>"),
            Err(TableError::NotTabular(_))
        ));
    }

    #[test]
    fn empty_is_not_a_table() {
        assert!(!looks_like_table(""));
        assert!(!looks_like_table(" \n\n "));
        assert!(looks_like_table("Question\nWhat?"));
    }

    #[test]
    fn bare_message_is_not_a_table() {
        assert!(!looks_like_table("Not Found"));
        assert!(looks_like_table("Username,Total score"));
    }

    #[test]
    fn header_only_table_has_no_rows() {
        let table = parse_table("Username,Total score\n").unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.headers.len(), 2);
    }

    #[test]
    fn export_keeps_header_order_and_quotes() {
        let table = parse_table("B,A\n\"x, y\",1\nz,2\n").unwrap();
        let csv = export_csv(&table.headers, &table.rows).unwrap();
        assert_eq!(csv, "B,A\n\"x, y\",1\nz,2\n");
    }

    #[test]
    fn export_of_nothing_is_header_only() {
        let headers = vec!["Username".to_string()];
        let csv = export_csv(&headers, std::iter::empty()).unwrap();
        assert_eq!(csv, "Username\n");
    }
}
