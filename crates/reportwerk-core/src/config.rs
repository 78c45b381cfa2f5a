// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout configuration. Every constant the layout engine uses lives here so a
// single immutable value can be threaded through a generation call and
// overridden in tests.
//
// Lengths are centimetres (`_cm`), type sizes and rule widths are points (`_pt`).

use serde::{Deserialize, Serialize};

/// Centimetres per inch.
pub const CM_PER_INCH: f32 = 2.54;

/// PDF points per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Convert points to centimetres.
pub fn pt_to_cm(pt: f32) -> f32 {
    pt / POINTS_PER_INCH * CM_PER_INCH
}

/// Convert centimetres to points.
pub fn cm_to_pt(cm: f32) -> f32 {
    cm / CM_PER_INCH * POINTS_PER_INCH
}

/// Complete layout configuration for one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Number of visible characters between inserted soft break markers.
    pub soft_break_interval: usize,
    /// Top margin applied to every section; clears both header frames.
    pub section_top_margin_cm: f32,
    pub cover: CoverConfig,
    pub table: TableConfig,
    pub header: HeaderConfig,
    pub footer: FooterConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            soft_break_interval: 20,
            section_top_margin_cm: 5.0,
            cover: CoverConfig::default(),
            table: TableConfig::default(),
            header: HeaderConfig::default(),
            footer: FooterConfig::default(),
        }
    }
}

/// Cover (image) section geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverConfig {
    /// Assumed resolution of the uploaded image.
    pub dpi: f32,
    /// Displayed image width; height always follows the aspect ratio.
    pub target_image_width_cm: f32,
    /// Left, right and bottom margin of the cover page.
    pub margin_cm: f32,
    pub min_page_width_cm: f32,
    pub min_page_height_cm: f32,
    /// Extra page height reserved for the header and footer bands.
    pub header_footer_allowance_cm: f32,
    /// Gap between the top margin and the image.
    pub image_space_before_cm: f32,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            dpi: 96.0,
            target_image_width_cm: 15.0,
            margin_cm: 1.0,
            min_page_width_cm: 16.0,
            min_page_height_cm: 16.0,
            header_footer_allowance_cm: 6.0,
            image_space_before_cm: 1.0,
        }
    }
}

/// Table section geometry and cell typography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Estimated width of one character in a table cell.
    pub char_width_cm: f32,
    pub min_column_width_cm: f32,
    pub max_column_width_cm: f32,
    /// Every column is at least this many characters wide before clamping.
    pub reference_length: usize,
    /// Added to the table width before clamping the page width.
    pub padding_cm: f32,
    pub min_page_width_cm: f32,
    pub max_page_width_cm: f32,
    pub page_height_cm: f32,
    pub margin_bottom_cm: f32,
    /// Horizontal inset of cell text from the column edges.
    pub cell_padding_cm: f32,
    pub header_font_size_pt: f32,
    pub body_font_size_pt: f32,
    /// Space above and below header cell text.
    pub header_spacing_cm: f32,
    /// Space above and below data cell text.
    pub body_spacing_cm: f32,
    pub header_border_pt: f32,
    pub body_border_pt: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            char_width_cm: 0.23,
            min_column_width_cm: 2.0,
            max_column_width_cm: 10.0,
            reference_length: 10,
            padding_cm: 3.0,
            min_page_width_cm: 21.0,
            max_page_width_cm: 70.0,
            page_height_cm: 34.0,
            margin_bottom_cm: 2.5,
            cell_padding_cm: 0.12,
            header_font_size_pt: 12.0,
            body_font_size_pt: 10.0,
            header_spacing_cm: 0.3,
            body_spacing_cm: 0.15,
            header_border_pt: 0.75,
            body_border_pt: 0.5,
        }
    }
}

/// Header frame placement and typography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Left frame, anchored from the page's top-left corner.
    pub left_frame_left_cm: f32,
    pub left_frame_top_cm: f32,
    pub left_frame_width_cm: f32,
    pub left_frame_height_cm: f32,
    pub logo_width_cm: f32,
    /// Shown in place of the logo when the logo file does not exist.
    pub logo_placeholder: String,
    pub title_font_size_pt: f32,
    pub title_spacing_cm: f32,
    pub generated_font_size_pt: f32,

    /// Right frame; its left edge is derived from the page width.
    pub right_frame_width_cm: f32,
    pub right_frame_height_cm: f32,
    /// Slightly below the left frame so the company line sits level with the
    /// logo centre.
    pub right_frame_top_cm: f32,
    /// Gap between the right frame and the page's right edge.
    pub right_frame_margin_cm: f32,
    pub company_font_size_pt: f32,
    pub detail_font_size_pt: f32,
    pub detail_space_after_cm: f32,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            left_frame_left_cm: 1.5,
            left_frame_top_cm: 1.5,
            left_frame_width_cm: 10.0,
            left_frame_height_cm: 4.0,
            logo_width_cm: 4.0,
            logo_placeholder: "Logo Not Found".into(),
            title_font_size_pt: 16.0,
            title_spacing_cm: 0.3,
            generated_font_size_pt: 12.0,
            right_frame_width_cm: 7.0,
            right_frame_height_cm: 4.0,
            right_frame_top_cm: 2.1,
            right_frame_margin_cm: 1.5,
            company_font_size_pt: 14.0,
            detail_font_size_pt: 12.0,
            detail_space_after_cm: 0.35,
        }
    }
}

/// Footer typography and placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterConfig {
    pub font_size_pt: f32,
    /// Distance from the bottom page edge to the footer's last line.
    pub distance_cm: f32,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            font_size_pt: 12.0,
            distance_cm: 1.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_conversions_round_trip() {
        assert!((cm_to_pt(2.54) - 72.0).abs() < 1e-4);
        assert!((pt_to_cm(72.0) - 2.54).abs() < 1e-4);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{ "soft_break_interval": 8, "table": { "char_width_cm": 0.3 } }"#)
                .unwrap();
        assert_eq!(config.soft_break_interval, 8);
        assert_eq!(config.table.char_width_cm, 0.3);
        assert_eq!(config.table.max_column_width_cm, 10.0);
        assert_eq!(config.cover, CoverConfig::default());
    }
}
