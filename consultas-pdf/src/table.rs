//! Cell wrapping and page breaking for the detail table.

use std::ops::Range;

use consultas_core::EnrichedConsultation;

use crate::styles::{
    column_widths, CELL_PADDING, DETAIL_COLUMNS, TABLE_CHAR_WIDTH, TABLE_LINE, TABLE_SIZE,
};

/// A table row with its cells already wrapped to the column widths.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub cells: Vec<Vec<String>>,
    pub height: f32,
}

impl RowLayout {
    pub fn new(values: [&str; 5]) -> Self {
        let widths = column_widths();
        let cells: Vec<Vec<String>> = values
            .iter()
            .zip(widths)
            .map(|(value, width)| wrap_text(value, chars_for(width)))
            .collect();
        Self::from_cells(cells)
    }

    fn from_cells(cells: Vec<Vec<String>>) -> Self {
        let lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
        Self {
            cells,
            height: lines as f32 * TABLE_LINE + 2.0 * CELL_PADDING,
        }
    }

    pub fn line_count(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Continuation rows of at most `lines` wrapped lines each.
    fn chunks(&self, lines: usize) -> Vec<RowLayout> {
        (0..self.line_count())
            .step_by(lines)
            .map(|start| {
                let cells: Vec<Vec<String>> = self
                    .cells
                    .iter()
                    .map(|cell| cell.iter().skip(start).take(lines).cloned().collect())
                    .collect();
                Self::from_cells(cells)
            })
            .collect()
    }
}

pub fn header_row() -> RowLayout {
    RowLayout::new(DETAIL_COLUMNS.map(|column| column.title))
}

pub fn detail_row(row: &EnrichedConsultation) -> RowLayout {
    RowLayout::new([
        &row.formatted_date,
        &row.athlete_name,
        &row.professional_name,
        &row.diagnosis,
        &row.treatment,
    ])
}

fn chars_for(width: f32) -> usize {
    chars_fitting(width - 2.0 * CELL_PADDING, TABLE_SIZE)
}

/// Characters of `size`-point text that fit across `width` millimetres.
pub fn chars_fitting(width: f32, size: f32) -> usize {
    let advance = TABLE_CHAR_WIDTH * size / TABLE_SIZE;
    ((width / advance) as usize).max(1)
}

/// Cut every row taller than `max_height` into continuation rows that fit,
/// keeping all wrapped lines in order.
pub fn split_rows(rows: Vec<RowLayout>, max_height: f32) -> Vec<RowLayout> {
    let lines = (((max_height - 2.0 * CELL_PADDING) / TABLE_LINE) as usize).max(1);
    let mut fitted = Vec::with_capacity(rows.len());
    for row in rows {
        if row.height <= max_height {
            fitted.push(row);
        } else {
            fitted.extend(row.chunks(lines));
        }
    }
    fitted
}

/// Greedy word wrap; words longer than `max_chars` are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = current.chars().count() + word.chars().count() + 1;
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Split rows into pages. The first page has `first_space` millimetres left,
/// later pages `page_space`; every page repeats a header of `header` height.
/// A row taller than a page still gets a page of its own; run `split_rows`
/// first so none is.
pub fn paginate(heights: &[f32], first_space: f32, page_space: f32, header: f32) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut available = first_space - header;
    let mut used = 0.0;

    for (index, height) in heights.iter().enumerate() {
        if used + height > available && index > start {
            pages.push(start..index);
            start = index;
            used = 0.0;
            available = page_space - header;
        }
        used += height;
    }
    if start < heights.len() {
        pages.push(start..heights.len());
    }
    pages
}
