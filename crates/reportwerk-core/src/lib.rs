// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reportwerk — Core types, layout configuration and error definitions shared
// across all crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::LayoutConfig;
pub use error::ReportError;
pub use types::*;
