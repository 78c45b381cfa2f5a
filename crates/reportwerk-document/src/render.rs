// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rendering boundary — the single capability that flattens an abstract
// document into output bytes.

use reportwerk_core::error::Result;

use crate::model::Document;
use crate::observe::PhaseObserver;

/// Turns a finished [`Document`] into a byte stream.
///
/// Implementations report the `Render` and `Serialize` phases to `observer`
/// and map every internal failure to `ReportError::RenderingBackend`.
pub trait RenderBackend: Send + Sync {
    fn render(&self, document: &Document, observer: &dyn PhaseObserver) -> Result<Vec<u8>>;
}
