// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster image access — header-only dimension probing for layout, full
// decoding for embedding. Operates on in-memory images using the `image`
// crate.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageReader};
use reportwerk_core::error::{ReportError, Result};
use tracing::{debug, instrument};

use crate::layout::ImageDimensions;

/// Read an encoded image's pixel size without decoding its pixels.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn probe_dimensions(data: &[u8]) -> Result<ImageDimensions> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|err| ReportError::UnreadableImage(format!("failed to read image: {err}")))?;

    if reader.format().is_none() {
        return Err(ReportError::UnreadableImage(
            "could not identify image format".into(),
        ));
    }

    let (width, height) = reader.into_dimensions().map_err(|err| {
        ReportError::UnreadableImage(format!("could not determine image dimensions: {err}"))
    })?;

    debug!(width, height, "Image dimensions probed");
    Ok(ImageDimensions::new(width, height))
}

/// A fully decoded raster image.
pub struct RasterImage {
    image: DynamicImage,
}

impl RasterImage {
    /// Decode an image from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data)
            .map_err(|err| ReportError::UnreadableImage(format!("failed to decode image: {err}")))?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image })
    }

    /// Decode an image file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let image = image::open(path.as_ref()).map_err(|err| {
            ReportError::UnreadableImage(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        Ok(Self { image })
    }

    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.image.width(), self.image.height())
    }

    /// Consume the image and return tightly packed 8-bit RGB pixels.
    pub fn into_rgb8(self) -> Vec<u8> {
        self.image.to_rgb8().into_raw()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    /// Encode a solid-colour PNG of the given size.
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([40, 120, 200]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn probe_reads_png_dimensions() {
        let dimensions = probe_dimensions(&png_bytes(64, 32)).unwrap();
        assert_eq!(dimensions, ImageDimensions::new(64, 32));
    }

    #[test]
    fn probe_rejects_garbage() {
        let err = probe_dimensions(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ReportError::UnreadableImage(_)));
    }

    #[test]
    fn probe_rejects_truncated_png() {
        let png = png_bytes(16, 16);
        let err = probe_dimensions(&png[..10]).unwrap_err();
        assert!(matches!(err, ReportError::UnreadableImage(_)));
    }

    #[test]
    fn decode_yields_rgb_pixels() {
        let raster = RasterImage::from_bytes(&png_bytes(3, 2)).unwrap();
        assert_eq!(raster.dimensions(), ImageDimensions::new(3, 2));
        let pixels = raster.into_rgb8();
        assert_eq!(pixels.len(), 3 * 2 * 3);
        assert_eq!(&pixels[..3], &[40, 120, 200]);
    }

    #[test]
    fn open_reports_missing_file() {
        let err = RasterImage::open("no/such/logo.png").err().unwrap();
        assert!(err.to_string().contains("no/such/logo.png"));
    }
}
