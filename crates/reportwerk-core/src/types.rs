// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Reportwerk: the three request inputs and the finished
// report handed back to the caller.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// Fallback for header values absent from the metadata source.
pub const NOT_AVAILABLE: &str = "N/A";

/// Format used for the "Generated on" line and the suggested filename.
pub const GENERATED_DATE_FORMAT: &str = "%b %d, %Y";

/// Format a date the way reports print it, e.g. `Jan 05, 2024`.
pub fn format_generated_date(date: NaiveDate) -> String {
    date.format(GENERATED_DATE_FORMAT).to_string()
}

// -- Table --------------------------------------------------------------------

/// Ragged matrix of cell strings. Row 0 is the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Build a table from borrowed string rows (handy for tests and fixtures).
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Total number of rows, header included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reject tables without a header row and at least one data row.
    pub fn ensure_well_formed(&self) -> Result<()> {
        if self.rows.len() < 2 {
            return Err(ReportError::MalformedTable(format!(
                "table data must include at least one header row and one data row (got {} row(s))",
                self.rows.len()
            )));
        }
        Ok(())
    }

    /// The header row (empty if the table has no rows at all).
    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// All rows after the header.
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Number of columns, as defined by the header row.
    pub fn column_count(&self) -> usize {
        self.header().len()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

// -- Header / footer ----------------------------------------------------------

/// The second line of the right header frame.
///
/// Metadata has historically arrived in two shapes that disagree on what this
/// line means: a positional list carries an inspector name, a keyed map
/// carries a product name. The variant records which one the caller supplied;
/// both render their text verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecondaryIdentity {
    /// Person who inspected the data (positional metadata).
    Inspector(String),
    /// Product the data describes (keyed metadata).
    ProductName(String),
}

impl SecondaryIdentity {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inspector(name) | Self::ProductName(name) => name,
        }
    }
}

impl Default for SecondaryIdentity {
    fn default() -> Self {
        Self::Inspector(NOT_AVAILABLE.into())
    }
}

/// Resolved header values shared by every section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFields {
    /// Logo image; checked for existence on every generation call.
    pub logo_path: PathBuf,
    pub title: String,
    /// Already formatted, see [`format_generated_date`].
    pub generated_date: String,
    pub company_name: String,
    pub identity: SecondaryIdentity,
    pub date_range: String,
}

impl Default for HeaderFields {
    fn default() -> Self {
        Self {
            logo_path: PathBuf::new(),
            title: NOT_AVAILABLE.into(),
            generated_date: NOT_AVAILABLE.into(),
            company_name: NOT_AVAILABLE.into(),
            identity: SecondaryIdentity::default(),
            date_range: NOT_AVAILABLE.into(),
        }
    }
}

impl HeaderFields {
    /// Deterministic download name: `{title}_{generated-date}.pdf`.
    pub fn suggested_file_name(&self) -> String {
        format!("{}_{}.pdf", self.title, self.generated_date)
    }
}

/// Footer options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterFields {
    pub show_page_numbers: bool,
    /// Optional right-aligned annotation.
    pub right_text: Option<String>,
}

impl FooterFields {
    /// Footer with page numbering and no annotation.
    pub fn page_numbers() -> Self {
        Self {
            show_page_numbers: true,
            right_text: None,
        }
    }
}

// -- Output -------------------------------------------------------------------

/// A finished report.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

impl GeneratedReport {
    pub const MIME_TYPE: &'static str = "application/pdf";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_date_uses_abbreviated_month_and_padded_day() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_generated_date(date), "Jan 05, 2024");
    }

    #[test]
    fn file_name_joins_title_and_date() {
        let header = HeaderFields {
            title: "Weekly Scan".into(),
            generated_date: "Jan 05, 2024".into(),
            ..HeaderFields::default()
        };
        assert_eq!(header.suggested_file_name(), "Weekly Scan_Jan 05, 2024.pdf");
    }

    #[test]
    fn header_only_table_is_malformed() {
        let table = TableData::from_rows([["Name", "Score"]]);
        let err = table.ensure_well_formed().unwrap_err();
        assert!(matches!(err, ReportError::MalformedTable(_)));
    }

    #[test]
    fn table_accessors_split_header_from_data() {
        let table = TableData::from_rows(vec![vec!["Name", "Score"], vec!["Alice", "10"]]);
        table.ensure_well_formed().unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.header(), ["Name", "Score"]);
        assert_eq!(table.data_rows().len(), 1);
    }

    #[test]
    fn empty_table_has_no_header() {
        let table = TableData::default();
        assert!(table.header().is_empty());
        assert!(table.data_rows().is_empty());
    }

    #[test]
    fn identity_renders_its_text() {
        assert_eq!(SecondaryIdentity::Inspector("Dana".into()).as_str(), "Dana");
        assert_eq!(SecondaryIdentity::ProductName("Gateway".into()).as_str(), "Gateway");
    }
}
