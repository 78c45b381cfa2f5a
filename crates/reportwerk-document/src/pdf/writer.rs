// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF renderer — flattens the abstract document into pages using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. It has no layout engine, so pagination, line breaking
// and page-field substitution happen here.

use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::Range;

use printpdf::{
    PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, RawImage, RawImageData, RawImageFormat,
    XObjectId,
};
use reportwerk_core::config::{cm_to_pt, pt_to_cm};
use reportwerk_core::error::{ReportError, Result};
use tracing::{debug, info, instrument, warn};

use crate::image::RasterImage;
use crate::layout::ImageDimensions;
use crate::model::{
    Alignment, Block, Body, CoverImage, Document, Frame, ImageSource, Paragraph, ParagraphStyle,
    Row, Run, Section, Table,
};
use crate::observe::{Phase, PhaseObserver, observe};
use crate::pdf::canvas::PageCanvas;
use crate::pdf::text::{TextLine, layout_lines};
use crate::render::RenderBackend;

/// Line advance as a multiple of the font size.
const LINE_SPACING: f32 = 1.2;

/// Baseline position within a line, as a multiple of the font size.
const BASELINE: f32 = 0.9;

/// Renders documents to PDF bytes with the built-in Helvetica faces.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl RenderBackend for PdfRenderer {
    #[instrument(skip_all, fields(title = %document.title, sections = document.sections.len()))]
    fn render(&self, document: &Document, observer: &dyn PhaseObserver) -> Result<Vec<u8>> {
        let mut pdf = PdfDocument::new(&document.title);

        let pages = observe(observer, Phase::Render, || plan_pages(document, &mut pdf))?;
        let page_count = pages.len();

        let bytes = observe(observer, Phase::Serialize, || {
            pdf.with_pages(pages);
            let mut warnings: Vec<PdfWarnMsg> = Vec::new();
            let bytes = pdf.save(&PdfSaveOptions::default(), &mut warnings);
            if !warnings.is_empty() {
                debug!(warnings = warnings.len(), "printpdf reported warnings");
            }
            if bytes.is_empty() {
                return Err(ReportError::RenderingBackend(
                    "PDF serialisation produced no output".into(),
                ));
            }
            Ok(bytes)
        })?;

        info!(pages = page_count, bytes = bytes.len(), "PDF rendered");
        Ok(bytes)
    }
}

// -- Page planning ------------------------------------------------------------

/// A page whose body and header are drawn but whose footer waits for the
/// final page count.
struct PlannedPage<'d> {
    section: &'d Section,
    canvas: PageCanvas,
}

fn plan_pages(document: &Document, pdf: &mut PdfDocument) -> Result<Vec<PdfPage>> {
    let mut images = ImageStore::default();
    let mut planned: Vec<PlannedPage<'_>> = Vec::new();

    for section in &document.sections {
        let first = planned.len();
        match &section.body {
            Body::Image(cover) => {
                let mut canvas = PageCanvas::new(&section.page);
                draw_cover(&mut canvas, section, cover, &mut images, pdf)?;
                planned.push(PlannedPage { section, canvas });
            }
            Body::Table(table) => {
                for canvas in draw_table(section, table) {
                    planned.push(PlannedPage { section, canvas });
                }
            }
        }

        for page in &mut planned[first..] {
            for frame in &section.header.frames {
                draw_frame(&mut page.canvas, frame, &mut images, pdf)?;
            }
        }
        debug!(pages = planned.len() - first, "Section paginated");
    }

    let total = planned.len();
    Ok(planned
        .into_iter()
        .enumerate()
        .map(|(index, mut page)| {
            let numbers = PageNumbers {
                current: index + 1,
                total,
            };
            draw_footer(&mut page.canvas, page.section, numbers);
            page.canvas.into_page()
        })
        .collect())
}

fn draw_cover(
    canvas: &mut PageCanvas,
    section: &Section,
    cover: &CoverImage,
    images: &mut ImageStore,
    pdf: &mut PdfDocument,
) -> Result<()> {
    let page = &section.page;
    let block = &cover.block;
    let (id, dimensions) = images.embed(&block.source, pdf)?;
    let x = page.margins.left_cm
        + align_offset(block.alignment, page.content_width_cm(), block.width_cm);
    let top = page.margins.top_cm + block.space_before_cm;
    canvas.image(id, dimensions, x, top, block.width_cm, cover.height_cm);
    Ok(())
}

fn draw_frame(
    canvas: &mut PageCanvas,
    frame: &Frame,
    images: &mut ImageStore,
    pdf: &mut PdfDocument,
) -> Result<()> {
    let mut cursor = frame.top_cm;

    for block in &frame.blocks {
        match block {
            Block::Paragraph(paragraph) => {
                let laid = LaidParagraph::new(paragraph, frame.width_cm, None);
                laid.draw(canvas, frame.left_cm, cursor, frame.width_cm);
                cursor += laid.height_cm();
            }
            Block::Image(image) => {
                let (id, dimensions) = match images.embed(&image.source, pdf) {
                    Ok(embedded) => embedded,
                    Err(err) => {
                        warn!(%err, "Skipping header image that failed to load");
                        continue;
                    }
                };
                let height = image.width_cm * dimensions.height_px as f32
                    / dimensions.width_px as f32;
                let x = frame.left_cm + align_offset(image.alignment, frame.width_cm, image.width_cm);
                let top = cursor + image.space_before_cm;
                canvas.image(id, dimensions, x, top, image.width_cm, height);
                cursor = top + height;
            }
        }
    }
    Ok(())
}

fn draw_footer(canvas: &mut PageCanvas, section: &Section, numbers: PageNumbers) {
    let Some(paragraph) = &section.footer.paragraph else {
        return;
    };
    let page = &section.page;
    let width = page.content_width_cm();
    let laid = LaidParagraph::new(paragraph, width, Some(numbers));
    let top = page.height_cm - section.footer.distance_cm - laid.text_height_cm();
    laid.draw_lines(canvas, page.margins.left_cm, top, width);
}

// -- Tables -------------------------------------------------------------------

/// A table row with every cell laid out for its column width.
struct LaidRow<'t> {
    row: &'t Row,
    cells: Vec<LaidParagraph>,
    height_cm: f32,
}

impl<'t> LaidRow<'t> {
    fn new(row: &'t Row, table: &Table) -> Self {
        let cells: Vec<LaidParagraph> = row
            .cells
            .iter()
            .zip(&table.columns)
            .map(|(cell, column)| {
                let inner = column.width_cm - 2.0 * table.cell_padding_cm;
                LaidParagraph::new(&cell.paragraph, inner, None)
            })
            .collect();
        let height_cm = cells
            .iter()
            .map(LaidParagraph::height_cm)
            .fold(0.0, f32::max);
        Self {
            row,
            cells,
            height_cm,
        }
    }

    fn draw(&self, canvas: &mut PageCanvas, table: &Table, left_cm: f32, top_cm: f32) {
        let mut x = left_cm;
        for ((laid, cell), column) in self.cells.iter().zip(&self.row.cells).zip(&table.columns) {
            let inner = column.width_cm - 2.0 * table.cell_padding_cm;
            let cell_top = top_cm + (self.height_cm - laid.height_cm()) / 2.0;
            laid.draw(canvas, x + table.cell_padding_cm, cell_top, inner);

            let border = cell.border_bottom;
            if border.width_pt > 0.0 {
                canvas.rule(
                    x,
                    x + column.width_cm,
                    top_cm + self.height_cm,
                    border.width_pt,
                    border.color,
                );
            }
            x += column.width_cm;
        }
    }
}

/// Draw the table across as many pages as it needs, repeating the header row
/// at the top of each.
fn draw_table(section: &Section, table: &Table) -> Vec<PageCanvas> {
    let page = &section.page;
    let header = LaidRow::new(&table.header, table);
    let rows: Vec<LaidRow<'_>> = table.rows.iter().map(|row| LaidRow::new(row, table)).collect();
    let heights: Vec<f32> = rows.iter().map(|row| row.height_cm).collect();
    let available = page.height_cm - page.margins.top_cm - page.margins.bottom_cm;

    paginate(&heights, header.height_cm, available)
        .into_iter()
        .map(|range| {
            let mut canvas = PageCanvas::new(page);
            let mut top = page.margins.top_cm;
            header.draw(&mut canvas, table, page.margins.left_cm, top);
            top += header.height_cm;
            for row in &rows[range] {
                row.draw(&mut canvas, table, page.margins.left_cm, top);
                top += row.height_cm;
            }
            canvas
        })
        .collect()
}

/// Split rows into per-page ranges.
///
/// Each page holds the header plus as many rows as fit in `available_cm`. A
/// row taller than a whole page still gets a page of its own. Always returns
/// at least one (possibly empty) range.
fn paginate(row_heights: &[f32], header_cm: f32, available_cm: f32) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut used = header_cm;

    for (index, height) in row_heights.iter().enumerate() {
        if index > start && used + height > available_cm {
            pages.push(start..index);
            start = index;
            used = header_cm;
        }
        used += height;
    }

    pages.push(start..row_heights.len());
    pages
}

// -- Paragraphs ---------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageNumbers {
    current: usize,
    total: usize,
}

/// Resolve a paragraph's runs to styled text. Page fields become empty text
/// when no numbers are known.
fn styled_runs(paragraph: &Paragraph, numbers: Option<PageNumbers>) -> Vec<(Cow<'_, str>, bool)> {
    paragraph
        .runs
        .iter()
        .map(|run| match run {
            Run::Text { text, bold } => (Cow::Borrowed(text.as_str()), *bold),
            Run::PageNumber => (
                Cow::Owned(numbers.map(|n| n.current.to_string()).unwrap_or_default()),
                false,
            ),
            Run::PageCount => (
                Cow::Owned(numbers.map(|n| n.total.to_string()).unwrap_or_default()),
                false,
            ),
        })
        .collect()
}

/// A paragraph broken into lines for a given width.
struct LaidParagraph {
    lines: Vec<TextLine>,
    style: ParagraphStyle,
}

impl LaidParagraph {
    fn new(paragraph: &Paragraph, width_cm: f32, numbers: Option<PageNumbers>) -> Self {
        let style = paragraph.style;
        let lines = layout_lines(
            &styled_runs(paragraph, numbers),
            style.font_size_pt,
            cm_to_pt(width_cm.max(0.0)),
        );
        Self { lines, style }
    }

    fn line_height_cm(&self) -> f32 {
        pt_to_cm(self.style.font_size_pt * LINE_SPACING)
    }

    fn text_height_cm(&self) -> f32 {
        self.lines.len() as f32 * self.line_height_cm()
    }

    /// Height including the paragraph's spacing.
    fn height_cm(&self) -> f32 {
        self.style.space_before_cm + self.text_height_cm() + self.style.space_after_cm
    }

    /// Draw with `top_cm` at the top of the space before the paragraph.
    fn draw(&self, canvas: &mut PageCanvas, left_cm: f32, top_cm: f32, width_cm: f32) {
        self.draw_lines(canvas, left_cm, top_cm + self.style.space_before_cm, width_cm);
    }

    /// Draw with `top_cm` at the top of the first line.
    fn draw_lines(&self, canvas: &mut PageCanvas, left_cm: f32, top_cm: f32, width_cm: f32) {
        let line_height = self.line_height_cm();
        let baseline = pt_to_cm(self.style.font_size_pt * BASELINE);

        for (index, line) in self.lines.iter().enumerate() {
            let x = left_cm + align_offset(self.style.alignment, width_cm, pt_to_cm(line.width_pt));
            let y = top_cm + index as f32 * line_height + baseline;
            canvas.text(x, y, &line.segments, self.style.font_size_pt);
        }
    }
}

fn align_offset(alignment: Alignment, available_cm: f32, used_cm: f32) -> f32 {
    match alignment {
        Alignment::Left => 0.0,
        Alignment::Center => (available_cm - used_cm) / 2.0,
        Alignment::Right => available_cm - used_cm,
    }
}

// -- Images -------------------------------------------------------------------

/// Embeds each distinct image source once per document.
#[derive(Default)]
struct ImageStore {
    embedded: HashMap<ImageSource, (XObjectId, ImageDimensions)>,
}

impl ImageStore {
    fn embed(
        &mut self,
        source: &ImageSource,
        pdf: &mut PdfDocument,
    ) -> Result<(XObjectId, ImageDimensions)> {
        if let Some((id, dimensions)) = self.embedded.get(source) {
            return Ok((id.clone(), *dimensions));
        }

        let raster = match source {
            ImageSource::Encoded(bytes) => RasterImage::from_bytes(bytes),
            ImageSource::File(path) => RasterImage::open(path),
        }
        .map_err(|err| ReportError::RenderingBackend(format!("failed to embed image: {}", err)))?;

        let dimensions = raster.dimensions();
        let raw = RawImage {
            pixels: RawImageData::U8(raster.into_rgb8()),
            width: dimensions.width_px as usize,
            height: dimensions.height_px as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let id = pdf.add_image(&raw);
        debug!(
            width = dimensions.width_px,
            height = dimensions.height_px,
            "Image embedded"
        );

        self.embedded.insert(source.clone(), (id.clone(), dimensions));
        Ok((id, dimensions))
    }
}
