// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report generation entry point — assemble, render, name the file.

use std::io::Read;
use std::sync::Arc;

use reportwerk_core::config::LayoutConfig;
use reportwerk_core::error::Result;
use reportwerk_core::{FooterFields, GeneratedReport, HeaderFields, TableData};
use tracing::{info, instrument};

use crate::assemble::ReportAssembler;
use crate::observe::{PhaseObserver, TracingObserver};
use crate::pdf::PdfRenderer;
use crate::render::RenderBackend;

/// Produces finished reports from raw inputs.
///
/// Holds no per-request state, so one generator can serve concurrent calls.
pub struct ReportGenerator<B: RenderBackend = PdfRenderer> {
    config: LayoutConfig,
    backend: B,
    observer: Arc<dyn PhaseObserver>,
}

impl ReportGenerator<PdfRenderer> {
    /// A generator rendering PDF and tracing each phase.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            backend: PdfRenderer,
            observer: Arc::new(TracingObserver),
        }
    }
}

impl Default for ReportGenerator<PdfRenderer> {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl<B: RenderBackend> ReportGenerator<B> {
    /// Swap the rendering backend.
    pub fn with_backend<C: RenderBackend>(self, backend: C) -> ReportGenerator<C> {
        ReportGenerator {
            config: self.config,
            backend,
            observer: self.observer,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PhaseObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Generate a report.
    ///
    /// The table must hold a header row and at least one data row. Nothing is
    /// rendered if assembly fails.
    #[instrument(skip_all, fields(title = %header.title, rows = table.len()))]
    pub fn generate(
        &self,
        image: &[u8],
        table: &TableData,
        header: &HeaderFields,
        footer: &FooterFields,
    ) -> Result<GeneratedReport> {
        let observer = self.observer.as_ref();
        let document =
            ReportAssembler::new(&self.config, observer).assemble(image, table, header, footer)?;
        let bytes = self.backend.render(&document, observer)?;
        let file_name = header.suggested_file_name();

        info!(file_name, bytes = bytes.len(), "Report generated");
        Ok(GeneratedReport { bytes, file_name })
    }

    /// Generate a report, reading the image from `image`.
    pub fn generate_from_reader(
        &self,
        mut image: impl Read,
        table: &TableData,
        header: &HeaderFields,
        footer: &FooterFields,
    ) -> Result<GeneratedReport> {
        let mut bytes = Vec::new();
        image.read_to_end(&mut bytes)?;
        self.generate(&bytes, table, header, footer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::raster::tests::png_bytes;
    use crate::model::Document;
    use crate::observe::{NoopObserver, Phase};
    use crate::observe::tests::RecordingObserver;
    use crate::pdf::PdfInspector;
    use reportwerk_core::error::ReportError;
    use reportwerk_core::SecondaryIdentity;
    use std::io::Cursor;

    fn header() -> HeaderFields {
        HeaderFields {
            logo_path: "does/not/exist.png".into(),
            title: "Scores".into(),
            generated_date: "Jan 05, 2024".into(),
            company_name: "Acme".into(),
            identity: SecondaryIdentity::Inspector("R. Diaz".into()),
            date_range: "Q4 2023".into(),
        }
    }

    fn generator() -> ReportGenerator {
        ReportGenerator::new(LayoutConfig::default())
    }

    fn table() -> TableData {
        TableData::from_rows(vec![vec!["Name", "Score"], vec!["Alice", "10"]])
    }

    #[test]
    fn generates_named_two_page_pdf() {
        let report = generator()
            .with_observer(Arc::new(NoopObserver))
            .generate(&png_bytes(120, 80), &table(), &header(), &FooterFields::page_numbers())
            .unwrap();

        assert_eq!(report.file_name, "Scores_Jan 05, 2024.pdf");
        assert!(report.bytes.starts_with(b"%PDF-"));
        assert_eq!(PdfInspector::from_bytes(&report.bytes).unwrap().page_count(), 2);
    }

    #[test]
    fn header_only_table_fails_without_output() {
        let err = generator()
            .generate(
                &png_bytes(120, 80),
                &TableData::from_rows([["Name", "Score"]]),
                &header(),
                &FooterFields::page_numbers(),
            )
            .unwrap_err();
        assert!(matches!(err, ReportError::MalformedTable(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn reads_image_from_reader() {
        let report = generator()
            .generate_from_reader(
                Cursor::new(png_bytes(50, 50)),
                &table(),
                &header(),
                &FooterFields::page_numbers(),
            )
            .unwrap();
        assert!(!report.bytes.is_empty());
    }

    #[test]
    fn every_phase_is_reported_once_per_pass() {
        let recorder = Arc::new(RecordingObserver::default());
        generator()
            .with_observer(recorder.clone())
            .generate(&png_bytes(120, 80), &table(), &header(), &FooterFields::page_numbers())
            .unwrap();

        let phases = recorder.phases();
        assert_eq!(phases.first(), Some(&Phase::ImageLayout));
        assert_eq!(&phases[phases.len() - 2..], &[Phase::Render, Phase::Serialize]);
    }

    struct FailingBackend;

    impl RenderBackend for FailingBackend {
        fn render(&self, _document: &Document, _observer: &dyn PhaseObserver) -> Result<Vec<u8>> {
            Err(ReportError::RenderingBackend("disk full".into()))
        }
    }

    #[test]
    fn backend_failures_propagate() {
        let err = generator()
            .with_backend(FailingBackend)
            .generate(&png_bytes(120, 80), &table(), &header(), &FooterFields::page_numbers())
            .unwrap_err();
        assert!(matches!(err, ReportError::RenderingBackend(_)));
        assert!(!err.is_client_error());
    }
}
