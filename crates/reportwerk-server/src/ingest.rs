// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Input adaptation — turns the decoded form into engine inputs: CSV rows via
// the `csv` crate, metadata JSON in either accepted shape, and the
// server-supplied header values.

use chrono::NaiveDate;
use reportwerk_core::error::{ReportError, Result};
use reportwerk_core::{
    FooterFields, HeaderFields, NOT_AVAILABLE, SecondaryIdentity, TableData,
    format_generated_date,
};
use serde::Deserialize;
use tracing::debug;

use crate::config::ServerConfig;
use crate::http::MultipartForm;

pub const IMAGE_FIELD: &str = "image";
pub const TABLE_FIELD: &str = "tableData";
pub const METADATA_FIELD: &str = "metadata";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// -- CSV ----------------------------------------------------------------------

/// Tokenise CSV bytes into rows, the header row included.
///
/// Rows may have differing lengths; blank lines are skipped.
pub fn parse_csv(data: &[u8]) -> Result<TableData> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| ReportError::InvalidCsv(err.to_string()))?;
        rows.push(record.iter().map(str::to_owned).collect());
    }

    debug!(rows = rows.len(), "CSV parsed");
    Ok(TableData::new(rows))
}

// -- Metadata -----------------------------------------------------------------

/// Report metadata as sent by clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Metadata {
    /// `[title, inspector, dateRange]`
    Positional(Vec<Option<String>>),
    Keyed(KeyedMetadata),
}

/// `{"Title": …, "ProductName": …, "DateRange": …}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyedMetadata {
    pub title: Option<String>,
    pub product_name: Option<String>,
    pub date_range: Option<String>,
}

impl Metadata {
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(ReportError::MissingInput("metadata is empty".into()));
        }
        serde_json::from_str(text).map_err(|err| ReportError::InvalidMetadata(err.to_string()))
    }

    /// Title, second header line and date range, with "N/A" for gaps.
    pub fn resolve(self) -> (String, SecondaryIdentity, String) {
        match self {
            Self::Positional(values) => {
                let mut values = values.into_iter();
                let mut next = || or_not_available(values.next().flatten());
                let title = next();
                let inspector = next();
                let date_range = next();
                (title, SecondaryIdentity::Inspector(inspector), date_range)
            }
            Self::Keyed(keyed) => (
                or_not_available(keyed.title),
                SecondaryIdentity::ProductName(or_not_available(keyed.product_name)),
                or_not_available(keyed.date_range),
            ),
        }
    }
}

fn or_not_available(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

// -- Request ------------------------------------------------------------------

/// Everything one generation call needs.
#[derive(Debug)]
pub struct ReportRequest {
    pub image: Vec<u8>,
    pub table: TableData,
    pub header: HeaderFields,
    pub footer: FooterFields,
}

impl ReportRequest {
    /// Validate the form and resolve all inputs.
    ///
    /// Missing or empty parts are reported before any parsing; the table is
    /// checked for a header and a data row before the metadata is decoded.
    pub fn from_form(form: &MultipartForm, config: &ServerConfig, today: NaiveDate) -> Result<Self> {
        let image = form.part(IMAGE_FIELD).filter(|part| !part.data.is_empty());
        let table = form.part(TABLE_FIELD).filter(|part| !part.data.is_empty());
        let metadata = form
            .text(METADATA_FIELD)
            .filter(|text| !text.trim().is_empty());

        let (Some(image), Some(table), Some(metadata)) = (image, table, metadata) else {
            return Err(ReportError::MissingInput(format!(
                "expected form fields {IMAGE_FIELD}, {TABLE_FIELD} and {METADATA_FIELD}"
            )));
        };

        debug!(
            image = ?image.file_name,
            table = ?table.file_name,
            image_bytes = image.data.len(),
            "form fields present"
        );

        let table = parse_csv(&table.data)?;
        table.ensure_well_formed()?;

        let (title, identity, date_range) = Metadata::parse(&metadata)?.resolve();

        Ok(Self {
            image: image.data.clone(),
            table,
            header: HeaderFields {
                logo_path: config.logo_path.clone(),
                title,
                generated_date: format_generated_date(today),
                company_name: config.company_name.clone(),
                identity,
                date_range,
            },
            footer: FooterFields {
                show_page_numbers: true,
                right_text: config.footer_annotation.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::{content_type, multipart_body};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[test]
    fn csv_keeps_header_row_and_quotes() {
        let table = parse_csv(b"Name,Comment\r\nAlice,\"hello, world\"\r\nBob,\"say \"\"hi\"\"\"\r\n")
            .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.header(), ["Name", "Comment"]);
        assert_eq!(table.data_rows()[0][1], "hello, world");
        assert_eq!(table.data_rows()[1][1], "say \"hi\"");
    }

    #[test]
    fn csv_strips_bom_and_allows_ragged_rows() {
        let table = parse_csv(b"\xEF\xBB\xBFA,B,C\n1\n1,2,3,4\n").unwrap();
        assert_eq!(table.header()[0], "A");
        assert_eq!(table.data_rows()[0].len(), 1);
        assert_eq!(table.data_rows()[1].len(), 4);
    }

    #[test]
    fn csv_rejects_invalid_utf8() {
        let err = parse_csv(b"Name\n\xff\xfe\n").unwrap_err();
        assert!(matches!(err, ReportError::InvalidCsv(_)));
    }

    #[test]
    fn positional_metadata_names_an_inspector() {
        let (title, identity, range) = Metadata::parse(r#"["Latency", "R. Diaz", "Feb 2025"]"#)
            .unwrap()
            .resolve();
        assert_eq!(title, "Latency");
        assert_eq!(identity, SecondaryIdentity::Inspector("R. Diaz".into()));
        assert_eq!(range, "Feb 2025");
    }

    #[test]
    fn short_positional_metadata_falls_back() {
        let (title, identity, range) = Metadata::parse(r#"["Latency", null]"#).unwrap().resolve();
        assert_eq!(title, "Latency");
        assert_eq!(identity.as_str(), NOT_AVAILABLE);
        assert_eq!(range, NOT_AVAILABLE);
    }

    #[test]
    fn keyed_metadata_names_a_product() {
        let (title, identity, range) =
            Metadata::parse(r#"{"Title": "Throughput", "ProductName": "Widget X"}"#)
                .unwrap()
                .resolve();
        assert_eq!(title, "Throughput");
        assert_eq!(identity, SecondaryIdentity::ProductName("Widget X".into()));
        assert_eq!(range, NOT_AVAILABLE);
    }

    #[test]
    fn metadata_errors() {
        assert!(matches!(
            Metadata::parse("  ").unwrap_err(),
            ReportError::MissingInput(_)
        ));
        assert!(matches!(
            Metadata::parse("{not json").unwrap_err(),
            ReportError::InvalidMetadata(_)
        ));
        assert!(matches!(
            Metadata::parse("42").unwrap_err(),
            ReportError::InvalidMetadata(_)
        ));
    }

    #[test]
    fn request_resolves_server_values() {
        let body = multipart_body(&[
            (IMAGE_FIELD, Some("chart.png"), &b"png-bytes"[..]),
            (TABLE_FIELD, Some("data.csv"), &b"Name,Score\nAlice,10\n"[..]),
            (METADATA_FIELD, None, &br#"["Scores","R. Diaz","Q4"]"#[..]),
        ]);
        let form = MultipartForm::parse(&content_type(), &body).unwrap();
        let config = ServerConfig {
            company_name: "Acme".into(),
            footer_annotation: Some("Confidential".into()),
            ..ServerConfig::default()
        };

        let request = ReportRequest::from_form(&form, &config, today()).unwrap();
        assert_eq!(request.image, b"png-bytes");
        assert_eq!(request.table.len(), 2);
        assert_eq!(request.header.company_name, "Acme");
        assert_eq!(request.header.generated_date, "Jan 05, 2024");
        assert_eq!(request.header.logo_path, config.logo_path);
        assert!(request.footer.show_page_numbers);
        assert_eq!(request.footer.right_text.as_deref(), Some("Confidential"));
    }

    #[test]
    fn request_without_table_is_missing_input() {
        let body = multipart_body(&[
            (IMAGE_FIELD, Some("chart.png"), &b"png-bytes"[..]),
            (METADATA_FIELD, None, &b"[]"[..]),
        ]);
        let form = MultipartForm::parse(&content_type(), &body).unwrap();
        let err = ReportRequest::from_form(&form, &ServerConfig::default(), today()).unwrap_err();
        assert!(matches!(err, ReportError::MissingInput(_)));
    }

    #[test]
    fn header_only_csv_is_malformed() {
        let body = multipart_body(&[
            (IMAGE_FIELD, Some("chart.png"), &b"png-bytes"[..]),
            (TABLE_FIELD, Some("data.csv"), &b"Name,Score\n"[..]),
            (METADATA_FIELD, None, &b"[]"[..]),
        ]);
        let form = MultipartForm::parse(&content_type(), &body).unwrap();
        let err = ReportRequest::from_form(&form, &ServerConfig::default(), today()).unwrap_err();
        assert!(matches!(err, ReportError::MalformedTable(_)));
    }
}
