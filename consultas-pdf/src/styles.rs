//! Page geometry, type sizes and colours for the consultation report.

use printpdf::{Color, Rgb};

/// US letter, in millimetres.
pub const PAGE_WIDTH: f32 = 215.9;
pub const PAGE_HEIGHT: f32 = 279.4;
/// 30pt margins.
pub const MARGIN: f32 = 10.6;

pub const TITLE_SIZE: f32 = 16.0;
pub const SUBTITLE_SIZE: f32 = 12.0;
pub const BODY_SIZE: f32 = 10.0;
pub const TABLE_SIZE: f32 = 8.0;
pub const SMALL_SIZE: f32 = 7.0;

pub const BODY_LINE: f32 = 5.0;
pub const TABLE_LINE: f32 = 3.8;
pub const CELL_PADDING: f32 = 2.0;

/// Rough Helvetica advance at `TABLE_SIZE`, used to wrap cell text.
pub const TABLE_CHAR_WIDTH: f32 = 1.55;

pub struct Column {
    pub title: &'static str,
    /// Share of the usable page width.
    pub weight: f32,
}

pub const DETAIL_COLUMNS: [Column; 5] = [
    Column { title: "Fecha", weight: 1.2 },
    Column { title: "Atleta", weight: 1.5 },
    Column { title: "Profesional", weight: 1.5 },
    Column { title: "Diagnóstico", weight: 2.0 },
    Column { title: "Tratamiento", weight: 2.0 },
];

pub fn usable_width() -> f32 {
    PAGE_WIDTH - 2.0 * MARGIN
}

/// Column widths in millimetres, in `DETAIL_COLUMNS` order.
pub fn column_widths() -> [f32; 5] {
    let total: f32 = DETAIL_COLUMNS.iter().map(|column| column.weight).sum();
    DETAIL_COLUMNS.map(|column| usable_width() * column.weight / total)
}

pub fn accent() -> Color {
    Color::Rgb(Rgb::new(0.231, 0.510, 0.965, None))
}

pub fn text() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

pub fn muted() -> Color {
    Color::Rgb(Rgb::new(0.5, 0.5, 0.5, None))
}

pub fn grid() -> Color {
    Color::Rgb(Rgb::new(0.898, 0.906, 0.922, None))
}
