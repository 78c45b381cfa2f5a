// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line breaking for the built-in Helvetica faces.
//
// Glyph widths are estimated from an average advance rather than font
// metrics, which is close enough for header lines and table cells.

use std::borrow::Cow;

use crate::layout::SOFT_BREAK;

/// Average Helvetica advance as a fraction of the font size.
const REGULAR_ADVANCE: f32 = 0.50;

/// Average Helvetica-Bold advance as a fraction of the font size.
const BOLD_ADVANCE: f32 = 0.55;

/// Estimated width of `text` in points. Soft break markers have no width.
pub(crate) fn text_width_pt(text: &str, size_pt: f32, bold: bool) -> f32 {
    let advance = if bold { BOLD_ADVANCE } else { REGULAR_ADVANCE };
    let glyphs = text.chars().filter(|&ch| ch != SOFT_BREAK).count();
    glyphs as f32 * size_pt * advance
}

/// A run of same-weight text on one line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Segment {
    pub(crate) text: String,
    pub(crate) bold: bool,
}

/// One laid-out line.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TextLine {
    pub(crate) segments: Vec<Segment>,
    pub(crate) width_pt: f32,
}

impl TextLine {
    fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn push(&mut self, text: &str, bold: bool, size_pt: f32) {
        self.width_pt += text_width_pt(text, size_pt, bold);
        match self.segments.last_mut() {
            Some(last) if last.bold == bold => last.text.push_str(text),
            _ => self.segments.push(Segment {
                text: text.to_owned(),
                bold,
            }),
        }
    }

    #[cfg(test)]
    pub(crate) fn text(&self) -> String {
        self.segments.iter().map(|segment| segment.text.as_str()).collect()
    }
}

/// An unbreakable piece of text.
struct Atom {
    text: String,
    bold: bool,
    /// Preceded by a word space in the source.
    space_before: bool,
}

/// Split styled runs into atoms at spaces and soft break markers.
fn atoms(runs: &[(Cow<'_, str>, bool)]) -> Vec<Atom> {
    let mut atoms = Vec::new();
    let mut pending_space = false;

    for (text, bold) in runs {
        let mut current = String::new();
        for ch in text.chars() {
            match ch {
                ' ' | '\t' | '\n' | '\r' => {
                    flush(&mut atoms, &mut current, *bold, &mut pending_space);
                    pending_space = true;
                }
                SOFT_BREAK => flush(&mut atoms, &mut current, *bold, &mut pending_space),
                _ => current.push(ch),
            }
        }
        flush(&mut atoms, &mut current, *bold, &mut pending_space);
    }

    atoms
}

fn flush(atoms: &mut Vec<Atom>, current: &mut String, bold: bool, pending_space: &mut bool) {
    if current.is_empty() {
        return;
    }
    atoms.push(Atom {
        text: std::mem::take(current),
        bold,
        space_before: std::mem::take(pending_space),
    });
}

/// Greedily fill lines no wider than `max_width_pt`.
///
/// Lines break at spaces and soft break markers; an atom wider than a whole
/// line is cut at character boundaries. Always returns at least one line.
pub(crate) fn layout_lines(
    runs: &[(Cow<'_, str>, bool)],
    size_pt: f32,
    max_width_pt: f32,
) -> Vec<TextLine> {
    let mut lines = Vec::new();
    let mut line = TextLine::default();

    for atom in atoms(runs) {
        let width = text_width_pt(&atom.text, size_pt, atom.bold);
        let gap = if atom.space_before && !line.is_empty() {
            text_width_pt(" ", size_pt, atom.bold)
        } else {
            0.0
        };

        if !line.is_empty() && line.width_pt + gap + width > max_width_pt {
            lines.push(std::mem::take(&mut line));
        } else if gap > 0.0 {
            line.push(" ", atom.bold, size_pt);
        }

        if line.is_empty() && width > max_width_pt {
            let mut chunks = force_break(&atom.text, size_pt, atom.bold, max_width_pt);
            let last = chunks.pop().unwrap_or_default();
            for chunk in chunks {
                let mut full = TextLine::default();
                full.push(&chunk, atom.bold, size_pt);
                lines.push(full);
            }
            line.push(&last, atom.bold, size_pt);
            continue;
        }

        line.push(&atom.text, atom.bold, size_pt);
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Cut `text` into pieces that each fit `max_width_pt` (at least one glyph).
fn force_break(text: &str, size_pt: f32, bold: bool, max_width_pt: f32) -> Vec<String> {
    let per_glyph = text_width_pt("m", size_pt, bold);
    let per_line = ((max_width_pt / per_glyph).floor() as usize).max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(per_line)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
