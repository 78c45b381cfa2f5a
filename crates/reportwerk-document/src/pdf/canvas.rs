// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page canvas — collects printpdf operations for one page, converting the
// model's top-left centimetre coordinates into PDF points from the
// bottom-left corner.

use printpdf::{
    BuiltinFont, Color, Line, LinePoint, Mm, Op, PdfPage, Point, Pt, TextItem, XObjectId,
    XObjectTransform,
};
use reportwerk_core::config::{POINTS_PER_INCH, cm_to_pt};

use crate::layout::ImageDimensions;
use crate::model::{PageSetup, Rgb};
use crate::pdf::text::Segment;

/// Resolution images are registered at; placement scales from it.
const IMAGE_DPI: f32 = 96.0;

pub(crate) struct PageCanvas {
    width_cm: f32,
    height_cm: f32,
    ops: Vec<Op>,
}

impl PageCanvas {
    pub(crate) fn new(page: &PageSetup) -> Self {
        Self {
            width_cm: page.width_cm,
            height_cm: page.height_cm,
            ops: Vec::new(),
        }
    }

    fn point(&self, x_cm: f32, top_cm: f32) -> Point {
        Point {
            x: Pt(cm_to_pt(x_cm)),
            y: Pt(cm_to_pt(self.height_cm - top_cm)),
        }
    }

    /// Write one line of text with its baseline `baseline_cm` below the top edge.
    pub(crate) fn text(&mut self, x_cm: f32, baseline_cm: f32, segments: &[Segment], size_pt: f32) {
        if segments.is_empty() {
            return;
        }

        self.ops.push(Op::StartTextSection);
        self.ops.push(Op::SetTextCursor {
            pos: self.point(x_cm, baseline_cm),
        });
        for segment in segments {
            let font = if segment.bold {
                BuiltinFont::HelveticaBold
            } else {
                BuiltinFont::Helvetica
            };
            self.ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(size_pt),
                font,
            });
            self.ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(segment.text.clone())],
                font,
            });
        }
        self.ops.push(Op::EndTextSection);
    }

    /// Draw a horizontal rule at `top_cm` from `x1_cm` to `x2_cm`.
    pub(crate) fn rule(&mut self, x1_cm: f32, x2_cm: f32, top_cm: f32, width_pt: f32, color: Rgb) {
        self.ops.push(Op::SaveGraphicsState);
        self.ops.push(Op::SetOutlineColor {
            col: Color::Rgb(printpdf::Rgb::new(color.r, color.g, color.b, None)),
        });
        self.ops.push(Op::SetOutlineThickness { pt: Pt(width_pt) });
        self.ops.push(Op::DrawLine {
            line: Line {
                points: vec![
                    LinePoint {
                        p: self.point(x1_cm, top_cm),
                        bezier: false,
                    },
                    LinePoint {
                        p: self.point(x2_cm, top_cm),
                        bezier: false,
                    },
                ],
                is_closed: false,
            },
        });
        self.ops.push(Op::RestoreGraphicsState);
    }

    /// Place an embedded image in the box whose top-left corner is
    /// (`x_cm`, `top_cm`).
    pub(crate) fn image(
        &mut self,
        id: XObjectId,
        dimensions: ImageDimensions,
        x_cm: f32,
        top_cm: f32,
        width_cm: f32,
        height_cm: f32,
    ) {
        let native_w_pt = dimensions.width_px as f32 / IMAGE_DPI * POINTS_PER_INCH;
        let native_h_pt = dimensions.height_px as f32 / IMAGE_DPI * POINTS_PER_INCH;
        let origin = self.point(x_cm, top_cm + height_cm);

        self.ops.push(Op::UseXobject {
            id,
            transform: XObjectTransform {
                translate_x: Some(origin.x),
                translate_y: Some(origin.y),
                scale_x: Some(cm_to_pt(width_cm) / native_w_pt),
                scale_y: Some(cm_to_pt(height_cm) / native_h_pt),
                dpi: Some(IMAGE_DPI),
                rotate: None,
            },
        });
    }

    pub(crate) fn into_page(self) -> PdfPage {
        PdfPage::new(Mm(self.width_cm * 10.0), Mm(self.height_cm * 10.0), self.ops)
    }

    #[cfg(test)]
    pub(crate) fn ops(&self) -> &[Op] {
        &self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Margins;

    fn canvas() -> PageCanvas {
        PageCanvas::new(&PageSetup {
            width_cm: 21.0,
            height_cm: 29.7,
            margins: Margins::uniform(1.0),
        })
    }

    #[test]
    fn top_left_coordinates_flip_to_pdf_space() {
        let canvas = canvas();
        let point = canvas.point(2.54, 29.7 - 2.54);
        assert!((point.x.0 - 72.0).abs() < 1e-3);
        assert!((point.y.0 - 72.0).abs() < 1e-3);
    }

    #[test]
    fn text_switches_font_per_segment() {
        let mut canvas = canvas();
        let segments = vec![
            Segment {
                text: "Generated on".into(),
                bold: true,
            },
            Segment {
                text: " Jan 05, 2024".into(),
                bold: false,
            },
        ];
        canvas.text(1.5, 3.0, &segments, 12.0);
        let writes = canvas
            .ops()
            .iter()
            .filter(|op| matches!(op, Op::WriteTextBuiltinFont { .. }))
            .count();
        assert_eq!(writes, 2);
    }

    #[test]
    fn empty_line_emits_nothing() {
        let mut canvas = canvas();
        canvas.text(1.0, 1.0, &[], 10.0);
        assert!(canvas.ops().is_empty());
    }
}
