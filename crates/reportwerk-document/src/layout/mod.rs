// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout module — soft breaks, column sizing, cover geometry and header/footer
// frames. Pure functions of their inputs and the layout configuration.

pub mod columns;
pub mod frames;
pub mod geometry;
pub mod wrap;

pub use columns::{ColumnSizing, TableGeometry, column_width, table_geometry};
pub use frames::{build_footer, build_header, right_frame_left};
pub use geometry::{CoverGeometry, ImageDimensions, cover_geometry};
pub use wrap::{SOFT_BREAK, insert_soft_breaks, strip_soft_breaks};
