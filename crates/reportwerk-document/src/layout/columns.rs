// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Column width estimation and table page sizing.

use reportwerk_core::TableData;
use reportwerk_core::config::TableConfig;

/// Tunables for [`column_width`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSizing {
    /// Width of one character.
    pub char_width_cm: f32,
    pub min_width_cm: f32,
    pub max_width_cm: f32,
    /// Character count every column is sized for at minimum.
    pub reference_length: usize,
}

impl From<&TableConfig> for ColumnSizing {
    fn from(config: &TableConfig) -> Self {
        Self {
            char_width_cm: config.char_width_cm,
            min_width_cm: config.min_column_width_cm,
            max_width_cm: config.max_column_width_cm,
            reference_length: config.reference_length,
        }
    }
}

/// Estimate the width of column `index`.
///
/// The widest of (a) the longest word in the header cell, (b) the longest
/// cell in the column, header included, and (c) the reference length is
/// converted to centimetres and clamped to `[min, max]`. Rows too short to
/// reach `index` are skipped rather than counted as empty.
pub fn column_width(
    header: &[String],
    data_rows: &[Vec<String>],
    index: usize,
    sizing: &ColumnSizing,
) -> f32 {
    let header_cell = header.get(index).map(String::as_str).unwrap_or("");

    let longest_header_word = header_cell
        .split_whitespace()
        .map(|word| word.chars().count())
        .max()
        .unwrap_or(0);

    let longest_cell = data_rows
        .iter()
        .filter_map(|row| row.get(index))
        .map(|cell| cell.chars().count())
        .chain(std::iter::once(header_cell.chars().count()))
        .max()
        .unwrap_or(0);

    let chars = longest_header_word
        .max(longest_cell)
        .max(sizing.reference_length);

    (chars as f32 * sizing.char_width_cm)
        .max(sizing.min_width_cm)
        .min(sizing.max_width_cm)
}

/// Column widths and page geometry of the table section.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGeometry {
    pub column_widths_cm: Vec<f32>,
    pub table_width_cm: f32,
    pub page_width_cm: f32,
    /// Equal left and right margin that centres the table.
    pub side_margin_cm: f32,
}

/// Size every column of `table` and derive a page that centres it.
pub fn table_geometry(table: &TableData, config: &TableConfig) -> TableGeometry {
    let sizing = ColumnSizing::from(config);
    let header = table.header();
    let data_rows = table.data_rows();

    let column_widths_cm: Vec<f32> = (0..table.column_count())
        .map(|index| column_width(header, data_rows, index, &sizing))
        .collect();

    let table_width_cm: f32 = column_widths_cm.iter().sum();
    let page_width_cm = (table_width_cm + config.padding_cm)
        .min(config.max_page_width_cm)
        .max(config.min_page_width_cm);
    let side_margin_cm = (page_width_cm - table_width_cm) / 2.0;

    TableGeometry {
        column_widths_cm,
        table_width_cm,
        page_width_cm,
        side_margin_cm,
    }
}
