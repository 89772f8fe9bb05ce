//! Export serialization.
//!
//! Every writer takes the same input: a header list and a row matrix already
//! projected through the resource schema. The export worker assembles the
//! matrix (checking for cancellation between batches) and then hands it to
//! exactly one of these.

use rust_xlsxwriter::Workbook;

use printpdf::{BuiltinFont, Mm, PdfDocument};

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("workbook write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("PDF write error: {0}")]
    Pdf(String),
}

pub fn to_csv(headers: &[String], rows: &[Vec<String>]) -> Result<Vec<u8>, SerializeError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.into_inner().map_err(|e| SerializeError::Io(e.into_error()))
}

pub fn to_xlsx(
    sheet_name: &str,
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<Vec<u8>, SerializeError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, header)?;
    }
    for (row_index, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            worksheet.write_string(row_index as u32 + 1, col as u16, value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

// A4 landscape, millimetres.
const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 14.0;
const LINE_HEIGHT: f32 = 6.0;
const TITLE_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 8.0;
// Rough advance width of 8pt Helvetica, used to truncate overlong cells.
const CHAR_WIDTH: f32 = 1.7;

pub fn to_pdf(
    title: &str,
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<Vec<u8>, SerializeError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "table");
    let body_font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| SerializeError::Pdf(e.to_string()))?;
    let header_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| SerializeError::Pdf(e.to_string()))?;

    let columns = headers.len().max(1);
    let column_width = (PAGE_WIDTH - 2.0 * MARGIN) / columns as f32;
    let chars_per_cell = ((column_width - 2.0) / CHAR_WIDTH).max(4.0) as usize;

    // Title and header consume the top of every page.
    let body_top = PAGE_HEIGHT - MARGIN - 2.0 * LINE_HEIGHT;
    let body_lines = ((body_top - MARGIN) / LINE_HEIGHT) as usize;
    let lines_per_page = body_lines.max(1);

    let pages = if rows.is_empty() { 1 } else { rows.len().div_ceil(lines_per_page) };
    for page_index in 0..pages {
        let layer = if page_index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "table");
            doc.get_page(page).get_layer(layer)
        };

        layer.use_text(title, TITLE_SIZE, Mm(MARGIN), Mm(PAGE_HEIGHT - MARGIN), &header_font);
        for (col, header) in headers.iter().enumerate() {
            layer.use_text(
                truncate(header, chars_per_cell),
                BODY_SIZE,
                Mm(MARGIN + col as f32 * column_width),
                Mm(body_top),
                &header_font,
            );
        }

        let start = page_index * lines_per_page;
        let page_rows = &rows[start..rows.len().min(start + lines_per_page)];
        for (line, row) in page_rows.iter().enumerate() {
            let y = body_top - (line as f32 + 1.0) * LINE_HEIGHT;
            for (col, value) in row.iter().enumerate() {
                layer.use_text(
                    truncate(value, chars_per_cell),
                    BODY_SIZE,
                    Mm(MARGIN + col as f32 * column_width),
                    Mm(y),
                    &body_font,
                );
            }
        }
    }

    doc.save_to_bytes().map_err(|e| SerializeError::Pdf(e.to_string()))
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
