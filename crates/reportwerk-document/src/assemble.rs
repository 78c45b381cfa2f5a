// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembly — turns the request inputs into the two-section abstract
// document (cover image, data table) without touching any rendering backend.

use reportwerk_core::config::{LayoutConfig, TableConfig};
use reportwerk_core::error::{ReportError, Result};
use reportwerk_core::{FooterFields, HeaderFields, TableData};
use tracing::{debug, instrument};

use crate::image::probe_dimensions;
use crate::layout::{
    CoverGeometry, TableGeometry, build_footer, build_header, cover_geometry, insert_soft_breaks,
    table_geometry,
};
use crate::model::{
    Alignment, Body, Border, Cell, Column, CoverImage, Document, Footer, Header, ImageBlock,
    ImageSource, Margins, PageSetup, Paragraph, ParagraphStyle, Rgb, Row, Run, Section, Table,
};
use crate::observe::{Phase, PhaseObserver, observe};

/// Builds the abstract document for one report.
pub struct ReportAssembler<'a> {
    config: &'a LayoutConfig,
    observer: &'a dyn PhaseObserver,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(config: &'a LayoutConfig, observer: &'a dyn PhaseObserver) -> Self {
        Self { config, observer }
    }

    /// Assemble the cover and table sections.
    ///
    /// The table is validated before any layout work starts; any failure
    /// aborts the whole assembly.
    #[instrument(skip_all, fields(image_len = image.len(), rows = table.len()))]
    pub fn assemble(
        &self,
        image: &[u8],
        table: &TableData,
        header: &HeaderFields,
        footer: &FooterFields,
    ) -> Result<Document> {
        table.ensure_well_formed()?;

        let cover = self.cover_section(image, header, footer)?;
        let data = self.table_section(table, header, footer)?;

        debug!(
            cover_width_cm = cover.page.width_cm,
            table_width_cm = data.page.width_cm,
            "Document assembled"
        );

        Ok(Document {
            title: header.title.clone(),
            sections: vec![cover, data],
        })
    }

    fn cover_section(
        &self,
        image: &[u8],
        header: &HeaderFields,
        footer: &FooterFields,
    ) -> Result<Section> {
        let cover = &self.config.cover;
        let geometry: CoverGeometry = observe(self.observer, Phase::ImageLayout, || {
            let dimensions = probe_dimensions(image)?;
            cover_geometry(dimensions, cover)
        })?;

        let page = PageSetup {
            width_cm: geometry.page_width_cm,
            height_cm: geometry.page_height_cm,
            margins: Margins {
                top_cm: self.config.section_top_margin_cm,
                ..Margins::uniform(cover.margin_cm)
            },
        };

        let (section_header, section_footer) = self.header_and_footer(page.width_cm, header, footer)?;

        Ok(Section {
            page,
            header: section_header,
            footer: section_footer,
            body: Body::Image(CoverImage {
                block: ImageBlock {
                    source: ImageSource::Encoded(image.to_vec()),
                    width_cm: geometry.image_width_cm,
                    alignment: Alignment::Center,
                    space_before_cm: cover.image_space_before_cm,
                },
                height_cm: geometry.image_height_cm,
            }),
        })
    }

    fn table_section(
        &self,
        table: &TableData,
        header: &HeaderFields,
        footer: &FooterFields,
    ) -> Result<Section> {
        let config = &self.config.table;
        let geometry: TableGeometry = observe(self.observer, Phase::ColumnSizing, || {
            Ok::<_, ReportError>(table_geometry(table, config))
        })?;

        let page = PageSetup {
            width_cm: geometry.page_width_cm,
            height_cm: config.page_height_cm,
            margins: Margins {
                top_cm: self.config.section_top_margin_cm,
                right_cm: geometry.side_margin_cm,
                bottom_cm: config.margin_bottom_cm,
                left_cm: geometry.side_margin_cm,
            },
        };

        let (section_header, section_footer) = self.header_and_footer(page.width_cm, header, footer)?;

        let body = observe(self.observer, Phase::CellWrapping, || {
            Ok::<_, ReportError>(self.build_table(table, &geometry))
        })?;

        Ok(Section {
            page,
            header: section_header,
            footer: section_footer,
            body: Body::Table(body),
        })
    }

    fn header_and_footer(
        &self,
        page_width_cm: f32,
        header: &HeaderFields,
        footer: &FooterFields,
    ) -> Result<(Header, Footer)> {
        observe(self.observer, Phase::HeaderLayout, || {
            Ok((
                build_header(page_width_cm, header, &self.config.header),
                build_footer(footer, &self.config.footer),
            ))
        })
    }

    /// Populate the table. Every cell's text gets its soft breaks here, once.
    fn build_table(&self, table: &TableData, geometry: &TableGeometry) -> Table {
        let config = &self.config.table;
        let interval = self.config.soft_break_interval;
        let column_count = table.column_count();

        let header = Row {
            cells: table
                .header()
                .iter()
                .map(|text| header_cell(&insert_soft_breaks(text, interval), config))
                .collect(),
        };

        let rows = table
            .data_rows()
            .iter()
            .map(|record| Row {
                cells: (0..column_count)
                    .map(|index| {
                        let text = record
                            .get(index)
                            .map(|cell| insert_soft_breaks(cell, interval))
                            .unwrap_or_default();
                        data_cell(text, config)
                    })
                    .collect(),
            })
            .collect();

        Table {
            columns: geometry
                .column_widths_cm
                .iter()
                .map(|&width_cm| Column { width_cm })
                .collect(),
            header,
            rows,
            cell_padding_cm: config.cell_padding_cm,
        }
    }
}

fn header_cell(text: &str, config: &TableConfig) -> Cell {
    Cell {
        paragraph: Paragraph::new(
            ParagraphStyle::sized(config.header_font_size_pt)
                .spaced(config.header_spacing_cm, config.header_spacing_cm),
        )
        .with_run(Run::bold(text)),
        border_bottom: Border {
            width_pt: config.header_border_pt,
            color: Rgb::BLACK,
        },
    }
}

fn data_cell(text: String, config: &TableConfig) -> Cell {
    Cell {
        paragraph: Paragraph::new(
            ParagraphStyle::sized(config.body_font_size_pt)
                .spaced(config.body_spacing_cm, config.body_spacing_cm),
        )
        .with_run(Run::text(text)),
        border_bottom: Border {
            width_pt: config.body_border_pt,
            color: Rgb::GRAY,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::raster::tests::png_bytes;
    use crate::layout::SOFT_BREAK;
    use crate::observe::NoopObserver;
    use crate::observe::tests::RecordingObserver;
    use reportwerk_core::SecondaryIdentity;

    fn header_fields() -> HeaderFields {
        HeaderFields {
            logo_path: "missing-logo.png".into(),
            title: "Latency".into(),
            generated_date: "Mar 02, 2025".into(),
            company_name: "Acme".into(),
            identity: SecondaryIdentity::Inspector("R. Diaz".into()),
            date_range: "Feb 2025".into(),
        }
    }

    fn table() -> TableData {
        TableData::from_rows(vec![vec!["Name", "Score"], vec!["Alice", "10"]])
    }

    fn assemble_with(
        observer: &dyn PhaseObserver,
        table: &TableData,
    ) -> Result<Document> {
        let config = LayoutConfig::default();
        ReportAssembler::new(&config, observer).assemble(
            &png_bytes(200, 100),
            table,
            &header_fields(),
            &FooterFields::page_numbers(),
        )
    }

    fn table_body(document: &Document) -> &Table {
        match &document.sections[1].body {
            Body::Table(table) => table,
            Body::Image(_) => panic!("second section must hold the table"),
        }
    }

    #[test]
    fn builds_cover_then_table_section() {
        let document = assemble_with(&NoopObserver, &table()).unwrap();
        assert_eq!(document.title, "Latency");
        assert_eq!(document.sections.len(), 2);

        let cover = &document.sections[0];
        let Body::Image(image) = &cover.body else {
            panic!("first section must hold the image");
        };
        assert_eq!(image.block.width_cm, 15.0);
        assert!((image.height_cm - 7.5).abs() < 1e-4);
        assert_eq!(image.block.alignment, Alignment::Center);
        assert_eq!(cover.page.margins.top_cm, 5.0);
        assert_eq!(cover.page.margins.left_cm, 1.0);

        let data = &document.sections[1];
        assert_eq!(data.page.width_cm, 21.0);
        assert_eq!(data.page.height_cm, 34.0);
        assert_eq!(data.page.margins.left_cm, data.page.margins.right_cm);
    }

    #[test]
    fn every_section_gets_header_and_footer() {
        let document = assemble_with(&NoopObserver, &table()).unwrap();
        for section in &document.sections {
            assert_eq!(section.header.frames.len(), 2);
            let right = &section.header.frames[1];
            assert!((section.page.width_cm - right.left_cm - right.width_cm - 1.5).abs() < 1e-4);
            assert!(section.footer.paragraph.is_some());
        }
    }

    #[test]
    fn header_only_table_is_rejected_before_layout() {
        let recorder = RecordingObserver::default();
        let err = assemble_with(&recorder, &TableData::from_rows([["Name", "Score"]])).unwrap_err();
        assert!(matches!(err, ReportError::MalformedTable(_)));
        assert!(recorder.phases().is_empty());
    }

    #[test]
    fn unreadable_image_aborts_assembly() {
        let config = LayoutConfig::default();
        let err = ReportAssembler::new(&config, &NoopObserver)
            .assemble(b"not an image", &table(), &header_fields(), &FooterFields::page_numbers())
            .unwrap_err();
        assert!(matches!(err, ReportError::UnreadableImage(_)));
    }

    #[test]
    fn ragged_rows_are_padded_and_truncated() {
        let ragged = TableData::from_rows(vec![
            vec!["A", "B", "C"],
            vec!["1"],
            vec!["1", "2", "3", "4"],
        ]);
        let document = assemble_with(&NoopObserver, &ragged).unwrap();
        let body = table_body(&document);

        assert_eq!(body.columns.len(), 3);
        assert_eq!(body.rows[0].cells.len(), 3);
        assert_eq!(body.rows[0].cells[1].paragraph.plain_text(), "");
        assert_eq!(body.rows[1].cells.len(), 3);
        assert_eq!(body.rows[1].cells[2].paragraph.plain_text(), "3");
    }

    #[test]
    fn long_cells_get_soft_breaks_once() {
        let long = "x".repeat(45);
        let data = TableData::from_rows(vec![vec!["Hash".to_string()], vec![long.clone()]]);
        let document = assemble_with(&NoopObserver, &data).unwrap();
        let text = table_body(&document).rows[0].cells[0].paragraph.plain_text();
        assert_eq!(text.matches(SOFT_BREAK).count(), 2);
        assert_eq!(text.replace(SOFT_BREAK, ""), long);
    }

    #[test]
    fn header_cells_are_bold_with_heavier_rule() {
        let document = assemble_with(&NoopObserver, &table()).unwrap();
        let body = table_body(&document);
        let header = &body.header.cells[0];
        let data = &body.rows[0].cells[0];

        assert!(header.paragraph.has_bold());
        assert!(!data.paragraph.has_bold());
        assert!(header.paragraph.style.font_size_pt > data.paragraph.style.font_size_pt);
        assert!(header.border_bottom.width_pt > data.border_bottom.width_pt);
        assert_eq!(data.border_bottom.color, Rgb::GRAY);
    }

    #[test]
    fn phases_fire_in_pipeline_order() {
        let recorder = RecordingObserver::default();
        assemble_with(&recorder, &table()).unwrap();
        assert_eq!(
            recorder.phases(),
            vec![
                Phase::ImageLayout,
                Phase::HeaderLayout,
                Phase::ColumnSizing,
                Phase::HeaderLayout,
                Phase::CellWrapping,
            ]
        );
    }
}
