// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cover page geometry derived from an image's pixel dimensions.

use reportwerk_core::config::{CM_PER_INCH, CoverConfig};
use reportwerk_core::error::{ReportError, Result};

/// Pixel size of a raster image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width_px: u32,
    pub height_px: u32,
}

impl ImageDimensions {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }
}

/// Page and image size of the cover section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverGeometry {
    pub page_width_cm: f32,
    pub page_height_cm: f32,
    /// Always the configured target width.
    pub image_width_cm: f32,
    /// Derived from the aspect ratio, never set independently.
    pub image_height_cm: f32,
}

/// Size the cover page for an image displayed at the target width.
///
/// Pixel dimensions are converted to physical length at the configured DPI,
/// the aspect ratio fixes the displayed height, and the page grows to fit
/// image, margins and the header/footer allowance but never shrinks below the
/// configured minimum.
pub fn cover_geometry(dimensions: ImageDimensions, config: &CoverConfig) -> Result<CoverGeometry> {
    if dimensions.width_px == 0 || dimensions.height_px == 0 {
        return Err(ReportError::UnreadableImage(format!(
            "image has degenerate dimensions {}x{}",
            dimensions.width_px, dimensions.height_px
        )));
    }

    let width_cm = dimensions.width_px as f32 / config.dpi * CM_PER_INCH;
    let height_cm = dimensions.height_px as f32 / config.dpi * CM_PER_INCH;
    let aspect_ratio = height_cm / width_cm;

    let image_width_cm = config.target_image_width_cm;
    let image_height_cm = image_width_cm * aspect_ratio;

    let page_width_cm = config
        .min_page_width_cm
        .max(image_width_cm + 2.0 * config.margin_cm);
    let page_height_cm = config.min_page_height_cm.max(
        image_height_cm + 2.0 * config.margin_cm + config.header_footer_allowance_cm,
    );

    Ok(CoverGeometry {
        page_width_cm,
        page_height_cm,
        image_width_cm,
        image_height_cm,
    })
}
