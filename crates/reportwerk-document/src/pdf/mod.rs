// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — the printpdf rendering backend and a lopdf-based inspector
// for the bytes it produces.

mod canvas;
pub mod reader;
mod text;
pub mod writer;

pub use reader::PdfInspector;
pub use writer::PdfRenderer;
