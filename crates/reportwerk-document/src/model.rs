// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Abstract document model — plain values describing pages, frames, paragraphs
// and tables. The layout engine builds it; a `RenderBackend` flattens it.
//
// Lengths are centimetres measured from the page's top-left corner, type
// sizes and rule widths are points.

use std::path::PathBuf;

/// A complete report: an ordered list of sections.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Title embedded in the output's metadata.
    pub title: String,
    pub sections: Vec<Section>,
}

/// One logical page template with its own size, margins, header and footer.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub page: PageSetup,
    pub header: Header,
    pub footer: Footer,
    pub body: Body,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width_cm: f32,
    pub height_cm: f32,
    pub margins: Margins,
}

impl PageSetup {
    /// Width available between the left and right margins.
    pub fn content_width_cm(&self) -> f32 {
        self.width_cm - self.margins.left_cm - self.margins.right_cm
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top_cm: f32,
    pub right_cm: f32,
    pub bottom_cm: f32,
    pub left_cm: f32,
}

impl Margins {
    pub fn uniform(cm: f32) -> Self {
        Self {
            top_cm: cm,
            right_cm: cm,
            bottom_cm: cm,
            left_cm: cm,
        }
    }
}

// -- Header / footer ----------------------------------------------------------

/// Absolutely positioned frames drawn on every page of a section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub frames: Vec<Frame>,
}

/// A rectangle positioned relative to the page, holding its own blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub left_cm: f32,
    pub top_cm: f32,
    pub width_cm: f32,
    pub height_cm: f32,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Image(ImageBlock),
}

/// Footer line anchored above the bottom page edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Footer {
    /// `None` when there is nothing to show.
    pub paragraph: Option<Paragraph>,
    /// Distance from the bottom page edge to the paragraph's last line.
    pub distance_cm: f32,
}

// -- Text ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParagraphStyle {
    pub font_size_pt: f32,
    pub alignment: Alignment,
    pub space_before_cm: f32,
    pub space_after_cm: f32,
}

impl ParagraphStyle {
    pub fn sized(font_size_pt: f32) -> Self {
        Self {
            font_size_pt,
            alignment: Alignment::Left,
            space_before_cm: 0.0,
            space_after_cm: 0.0,
        }
    }

    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn spaced(mut self, before_cm: f32, after_cm: f32) -> Self {
        self.space_before_cm = before_cm;
        self.space_after_cm = after_cm;
        self
    }
}

/// A piece of paragraph content.
///
/// Page fields are symbolic: their values only exist once the renderer has
/// paginated the whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Run {
    Text { text: String, bold: bool },
    PageNumber,
    PageCount,
}

impl Run {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            bold: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub style: ParagraphStyle,
}

impl Paragraph {
    pub fn new(style: ParagraphStyle) -> Self {
        Self {
            runs: Vec::new(),
            style,
        }
    }

    pub fn with_run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    /// Concatenated text with page fields shown as `{PAGE}` / `{PAGES}`.
    pub fn plain_text(&self) -> String {
        self.runs
            .iter()
            .map(|run| match run {
                Run::Text { text, .. } => text.as_str(),
                Run::PageNumber => "{PAGE}",
                Run::PageCount => "{PAGES}",
            })
            .collect()
    }

    /// Whether any run is bold.
    pub fn has_bold(&self) -> bool {
        self.runs
            .iter()
            .any(|run| matches!(run, Run::Text { bold: true, .. }))
    }
}

// -- Images -------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    /// Encoded image bytes already in memory.
    Encoded(Vec<u8>),
    /// Image file read at render time.
    File(PathBuf),
}

/// An image displayed at a fixed width; height follows the aspect ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    pub source: ImageSource,
    pub width_cm: f32,
    pub alignment: Alignment,
    pub space_before_cm: f32,
}

// -- Body ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Image(CoverImage),
    Table(Table),
}

/// The cover page's image with its derived display height.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverImage {
    pub block: ImageBlock,
    pub height_cm: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    /// Repeated at the top of every page the table spans.
    pub header: Row,
    pub rows: Vec<Row>,
    pub cell_padding_cm: f32,
}

impl Table {
    pub fn width_cm(&self) -> f32 {
        self.columns.iter().map(|column| column.width_cm).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub width_cm: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

/// A vertically centred cell with a bottom rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub paragraph: Paragraph,
    pub border_bottom: Border,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub width_pt: f32,
    pub color: Rgb,
}

/// RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const GRAY: Rgb = Rgb {
        r: 0.5,
        g: 0.5,
        b: 0.5,
    };
}
