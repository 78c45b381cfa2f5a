// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF inspection — structural checks on generated output using the `lopdf`
// crate. Used by tests and the benchmark to confirm what the renderer wrote.

use lopdf::{Document, Object};
use reportwerk_core::error::{ReportError, Result};
use tracing::{debug, instrument};

/// Read-only view over a serialised PDF.
pub struct PdfInspector {
    document: Document,
}

impl PdfInspector {
    /// Parse PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            ReportError::RenderingBackend(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Media box size of each page as `(width, height)` in points, in page
    /// order.
    pub fn media_boxes(&self) -> Result<Vec<(f32, f32)>> {
        self.document
            .get_pages()
            .into_values()
            .map(|page_id| {
                let page = self
                    .document
                    .get_object(page_id)
                    .and_then(Object::as_dict)
                    .map_err(|err| pdf_error("page object", err))?;
                let media_box = page
                    .get(b"MediaBox")
                    .and_then(|object| self.document.dereference(object))
                    .and_then(|(_, object)| object.as_array())
                    .map_err(|err| pdf_error("MediaBox", err))?;

                let coords = media_box
                    .iter()
                    .map(|value| value.as_float().map_err(|err| pdf_error("MediaBox entry", err)))
                    .collect::<Result<Vec<f32>>>()?;
                match coords.as_slice() {
                    [x0, y0, x1, y1] => Ok((x1 - x0, y1 - y0)),
                    _ => Err(ReportError::RenderingBackend(format!(
                        "MediaBox has {} entries",
                        coords.len()
                    ))),
                }
            })
            .collect()
    }

    /// Number of image XObjects stored in the file.
    pub fn image_count(&self) -> usize {
        self.document
            .objects
            .values()
            .filter(|object| match object {
                Object::Stream(stream) => stream
                    .dict
                    .get(b"Subtype")
                    .and_then(Object::as_name)
                    .is_ok_and(|name| name == b"Image"),
                _ => false,
            })
            .count()
    }
}

fn pdf_error(what: &str, err: lopdf::Error) -> ReportError {
    ReportError::RenderingBackend(format!("invalid {}: {}", what, err))
}
