//! CSV export functionality
//!
//! Serializes report rows to CSV text. Headers come from the row type's
//! serde field names.

use csv::{Terminator, WriterBuilder};
use serde::Serialize;

use crate::AnalyticsError;

/// Serialize rows to CSV text.
///
/// Records are separated by `\n` with no trailing newline. Fields holding a
/// delimiter, a quote or a line break are quoted and inner quotes doubled.
/// `None` fields become empty. An empty slice yields an empty string.
pub fn to_csv_string<T: Serialize>(rows: &[T]) -> Result<String, AnalyticsError> {
    if rows.is_empty() {
        return Ok(String::new());
    }

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AnalyticsError::Serialization(format!("Failed to write CSV record: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AnalyticsError::Serialization(format!("Failed to flush CSV: {}", e)))?;
    let mut text = String::from_utf8(bytes)
        .map_err(|e| AnalyticsError::Serialization(format!("CSV output is not UTF-8: {}", e)))?;

    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Email")]
        email: String,
        #[serde(rename = "Model")]
        model: Option<String>,
        #[serde(rename = "Count")]
        count: u64,
    }

    fn row(name: &str, model: Option<&str>) -> Row {
        Row {
            name: name.to_string(),
            email: "a@x.com".to_string(),
            model: model.map(String::from),
            count: 3,
        }
    }

    #[test]
    fn test_header_and_rows() {
        let text = to_csv_string(&[row("Ada", Some("gpt-4")), row("Bo", None)]).unwrap();
        let lines: Vec<&str> = text.split('\n').collect();

        assert_eq!(lines, vec!["Name,Email,Model,Count", "Ada,a@x.com,gpt-4,3", "Bo,a@x.com,,3"]);
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_empty_rows() {
        let rows: Vec<Row> = Vec::new();
        assert_eq!(to_csv_string(&rows).unwrap(), "");
    }

    #[test]
    fn test_quoting() {
        let text = to_csv_string(&[row("Smith, Jane", None), row("Jane \"JJ\" Doe", None)]).unwrap();
        assert!(text.contains("\"Smith, Jane\""));
        assert!(text.contains("\"Jane \"\"JJ\"\" Doe\""));

        let multiline = to_csv_string(&[row("line\nbreak", None)]).unwrap();
        assert!(multiline.contains("\"line\nbreak\""));
    }

    #[test]
    fn test_reads_back() {
        let rows = vec![row("Smith, Jane", Some("claude")), row("Bo", None)];
        let text = to_csv_string(&rows).unwrap();

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let parsed: Vec<Row> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(parsed, rows);
    }
}
