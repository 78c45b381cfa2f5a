// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// reportwerk-document — Report layout and PDF rendering for Reportwerk.
//
// Builds a two-section document (cover image, data table) from an image, a
// parsed table and header metadata, then renders it to PDF through a
// pluggable backend.

pub mod assemble;
pub mod generate;
pub mod image;
pub mod layout;
pub mod model;
pub mod observe;
pub mod pdf;
pub mod render;

// Re-export the primary structs so callers can use `reportwerk_document::ReportGenerator` etc.
pub use assemble::ReportAssembler;
pub use generate::ReportGenerator;
pub use observe::{NoopObserver, Phase, PhaseObserver, TracingObserver};
pub use pdf::{PdfInspector, PdfRenderer};
pub use render::RenderBackend;
