//! Paginated PDF rendering of a consultation report.

mod styles;
mod table;

use std::io::BufWriter;

use consultas_core::{ReportData, ReportError};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};
use tracing::{debug, warn};

use styles::*;
use table::{chars_fitting, detail_row, header_row, paginate, split_rows, wrap_text, RowLayout};

const TITLE: &str = "Reporte de Consultas Médicas";
const NO_RESULTS: &str = "No se encontraron consultas que cumplan con los criterios de filtrado.";
const FOOTER: &str = "Este reporte fue generado automáticamente por el Sistema de Gestión Médica.";
/// Left offset of the per-professional summary entries.
const INDENT: f32 = 6.0;

/// Render the report to PDF bytes.
pub fn render_report(data: &ReportData) -> Result<Vec<u8>, ReportError> {
    let (doc, layout) = build_document(data)?;
    debug!(
        pages = layout.pages,
        rows = data.rows.len(),
        lowest_baseline = layout.lowest_baseline,
        "report laid out"
    );

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Render(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::Render(format!("PDF buffer error: {e}")))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// What the layout produced, for checks that need no PDF parsing.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Layout {
    pages: usize,
    /// Lowest text baseline drawn on any page.
    lowest_baseline: f32,
}

/// Writing position on the current page; y grows upwards from the bottom edge.
struct Canvas<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
    lowest_baseline: f32,
}

impl<'a> Canvas<'a> {
    fn remaining(&self) -> f32 {
        self.y - MARGIN
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Página {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure(&mut self, height: f32) {
        if self.remaining() < height {
            self.new_page();
        }
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn text_at(&mut self, text: &str, size: f32, x: f32, y: f32, font: &IndirectFontRef) {
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
        self.lowest_baseline = self.lowest_baseline.min(y);
    }

    fn write(&mut self, text: &str, size: f32, font: &IndirectFontRef, color: Color) {
        self.write_indented(text, 0.0, size, font, color);
    }

    /// Body text wrapped to the right margin, one `BODY_LINE` per line.
    fn write_indented(
        &mut self,
        text: &str,
        indent: f32,
        size: f32,
        font: &IndirectFontRef,
        color: Color,
    ) {
        let x = MARGIN + indent;
        let chars = chars_fitting(PAGE_WIDTH - MARGIN - x, size);
        for line in wrap_text(text, chars) {
            self.ensure(BODY_LINE);
            self.y -= BODY_LINE;
            self.layer.set_fill_color(color.clone());
            self.text_at(&line, size, x, self.y, font);
        }
    }

    fn rule(&self, y: f32) {
        self.layer.set_outline_color(grid());
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), Mm(y)), false),
                (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn row(&mut self, row: &RowLayout, font: &IndirectFontRef, color: Color) {
        let top = self.y;
        self.layer.set_fill_color(color);
        let mut x = MARGIN;
        for (cell, width) in row.cells.iter().zip(column_widths()) {
            let mut baseline = top - CELL_PADDING;
            for line in cell {
                baseline -= TABLE_LINE;
                self.text_at(line, TABLE_SIZE, x + CELL_PADDING, baseline, font);
            }
            x += width;
        }
        self.y = top - row.height;
        self.rule(self.y);
    }
}

fn build_document(data: &ReportData) -> Result<(PdfDocumentReference, Layout), ReportError> {
    let (doc, page, layer) = PdfDocument::new(TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Página 1");
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Render(format!("PDF font error: {e}")))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Render(format!("PDF font error: {e}")))?,
    };

    let layout = {
        let mut canvas = Canvas {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            y: PAGE_HEIGHT - MARGIN,
            pages: 1,
            lowest_baseline: PAGE_HEIGHT,
        };

        write_header(&mut canvas, &fonts, data);
        write_summary(&mut canvas, &fonts, data);
        write_details(&mut canvas, &fonts, data);

        canvas.gap(BODY_LINE);
        canvas.write(FOOTER, SMALL_SIZE, &fonts.regular, muted());
        Layout {
            pages: canvas.pages,
            lowest_baseline: canvas.lowest_baseline,
        }
    };

    Ok((doc, layout))
}

fn write_header(canvas: &mut Canvas, fonts: &Fonts, data: &ReportData) {
    canvas.write(TITLE, TITLE_SIZE, &fonts.bold, text());
    canvas.write(
        &format!("Generado el: {}", data.generated_at.format("%d/%m/%Y %H:%M")),
        SMALL_SIZE,
        &fonts.regular,
        muted(),
    );
    canvas.gap(BODY_LINE);

    canvas.write("Filtros Aplicados:", SUBTITLE_SIZE, &fonts.bold, accent());
    canvas.write(
        &format!("Período: {}", data.period),
        BODY_SIZE,
        &fonts.regular,
        text(),
    );
    if let Some(athlete) = &data.athlete_label {
        canvas.write(&format!("Atleta: {athlete}"), BODY_SIZE, &fonts.regular, text());
    }
    if let Some(professional) = &data.professional_label {
        canvas.write(
            &format!("Profesional: {professional}"),
            BODY_SIZE,
            &fonts.regular,
            text(),
        );
    }
    canvas.gap(BODY_LINE);
}

fn write_summary(canvas: &mut Canvas, fonts: &Fonts, data: &ReportData) {
    canvas.write("Resumen Estadístico:", SUBTITLE_SIZE, &fonts.bold, accent());
    canvas.write(
        &format!("Total de Consultas: {}", data.total),
        BODY_SIZE,
        &fonts.bold,
        text(),
    );
    if !data.per_professional.is_empty() {
        canvas.write(
            "Consultas por Profesional:",
            BODY_SIZE,
            &fonts.regular,
            text(),
        );
        for entry in &data.per_professional {
            canvas.write_indented(
                &format!("{}: {}", entry.name, entry.count),
                INDENT,
                BODY_SIZE,
                &fonts.regular,
                text(),
            );
        }
    }
    canvas.gap(BODY_LINE);
}

fn write_details(canvas: &mut Canvas, fonts: &Fonts, data: &ReportData) {
    if data.rows.is_empty() {
        canvas.write(NO_RESULTS, BODY_SIZE, &fonts.regular, text());
        canvas.gap(2.0 * BODY_LINE);
        return;
    }

    canvas.write("Detalle de Consultas:", SUBTITLE_SIZE, &fonts.bold, accent());
    canvas.gap(CELL_PADDING);

    let header = header_row();
    let page_space = PAGE_HEIGHT - 2.0 * MARGIN;
    let rows = split_rows(
        data.rows.iter().map(detail_row).collect(),
        page_space - header.height,
    );
    if rows.len() > data.rows.len() {
        warn!(
            consultas = data.rows.len(),
            filas = rows.len(),
            "rows taller than a page continue on the next page"
        );
    }
    let heights: Vec<f32> = rows.iter().map(|row| row.height).collect();

    canvas.ensure(header.height + heights[0]);
    let pages = paginate(&heights, canvas.remaining(), page_space, header.height);

    for (index, range) in pages.into_iter().enumerate() {
        if index > 0 {
            canvas.new_page();
        }
        canvas.rule(canvas.y);
        canvas.row(&header, &fonts.bold, accent());
        for row in &rows[range] {
            canvas.row(row, &fonts.regular, text());
        }
    }
}
