// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Header and footer frame layout, applied identically to every section.

use reportwerk_core::config::{FooterConfig, HeaderConfig};
use reportwerk_core::{FooterFields, HeaderFields};
use tracing::debug;

use crate::model::{
    Alignment, Block, Footer, Frame, Header, ImageBlock, ImageSource, Paragraph, ParagraphStyle,
    Run,
};

/// Build both header frames for a section `page_width_cm` wide.
///
/// The left frame sits at a fixed offset from the top-left corner. The right
/// frame's left edge is computed from the page width so it hugs the right
/// edge whatever the section's size. The logo file is checked on every call.
pub fn build_header(page_width_cm: f32, fields: &HeaderFields, config: &HeaderConfig) -> Header {
    Header {
        frames: vec![
            left_frame(fields, config),
            right_frame(page_width_cm, fields, config),
        ],
    }
}

/// Logo (or placeholder), report title and generation date.
fn left_frame(fields: &HeaderFields, config: &HeaderConfig) -> Frame {
    let mut blocks = Vec::with_capacity(3);

    if fields.logo_path.is_file() {
        blocks.push(Block::Image(ImageBlock {
            source: ImageSource::File(fields.logo_path.clone()),
            width_cm: config.logo_width_cm,
            alignment: Alignment::Left,
            space_before_cm: 0.0,
        }));
    } else {
        debug!(path = %fields.logo_path.display(), "logo not found, using placeholder");
        blocks.push(Block::Paragraph(
            Paragraph::new(ParagraphStyle::sized(config.generated_font_size_pt))
                .with_run(Run::text(config.logo_placeholder.clone())),
        ));
    }

    blocks.push(Block::Paragraph(
        Paragraph::new(
            ParagraphStyle::sized(config.title_font_size_pt)
                .spaced(config.title_spacing_cm, config.title_spacing_cm),
        )
        .with_run(Run::bold(fields.title.clone())),
    ));

    blocks.push(Block::Paragraph(
        Paragraph::new(ParagraphStyle::sized(config.generated_font_size_pt))
            .with_run(Run::bold("Generated on "))
            .with_run(Run::text(fields.generated_date.clone())),
    ));

    Frame {
        left_cm: config.left_frame_left_cm,
        top_cm: config.left_frame_top_cm,
        width_cm: config.left_frame_width_cm,
        height_cm: config.left_frame_height_cm,
        blocks,
    }
}

/// Company name, secondary identity and date range, all right-aligned.
fn right_frame(page_width_cm: f32, fields: &HeaderFields, config: &HeaderConfig) -> Frame {
    let detail = ParagraphStyle::sized(config.detail_font_size_pt).aligned(Alignment::Right);

    let blocks = vec![
        Block::Paragraph(
            Paragraph::new(
                ParagraphStyle::sized(config.company_font_size_pt)
                    .aligned(Alignment::Right)
                    .spaced(0.0, config.detail_space_after_cm),
            )
            .with_run(Run::bold(fields.company_name.clone())),
        ),
        Block::Paragraph(
            Paragraph::new(detail.spaced(0.0, config.detail_space_after_cm))
                .with_run(Run::text(fields.identity.as_str())),
        ),
        Block::Paragraph(
            Paragraph::new(detail).with_run(Run::text(format!("Data from {}", fields.date_range))),
        ),
    ];

    Frame {
        left_cm: right_frame_left(page_width_cm, config),
        top_cm: config.right_frame_top_cm,
        width_cm: config.right_frame_width_cm,
        height_cm: config.right_frame_height_cm,
        blocks,
    }
}

/// Left edge of the right header frame for a page `page_width_cm` wide.
pub fn right_frame_left(page_width_cm: f32, config: &HeaderConfig) -> f32 {
    page_width_cm - config.right_frame_width_cm - config.right_frame_margin_cm
}

/// Build the right-aligned footer line.
///
/// With page numbers on, the annotation is written before the page block
/// with a `" | "` separator; an annotation is then written once more at the
/// end of the line. Both copies are kept so existing reports stay identical.
pub fn build_footer(fields: &FooterFields, config: &FooterConfig) -> Footer {
    let annotation = fields.right_text.as_deref().filter(|text| !text.is_empty());
    let mut paragraph =
        Paragraph::new(ParagraphStyle::sized(config.font_size_pt).aligned(Alignment::Right));

    if fields.show_page_numbers {
        if let Some(text) = annotation {
            paragraph.runs.push(Run::text(text));
            paragraph.runs.push(Run::text(" | "));
        }
        paragraph.runs.push(Run::text("Page "));
        paragraph.runs.push(Run::PageNumber);
        paragraph.runs.push(Run::text(" of "));
        paragraph.runs.push(Run::PageCount);
    }

    if let Some(text) = annotation {
        paragraph.runs.push(Run::text(text));
    }

    Footer {
        paragraph: (!paragraph.runs.is_empty()).then_some(paragraph),
        distance_cm: config.distance_cm,
    }
}
