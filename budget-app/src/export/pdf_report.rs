//! PDF budget export.
//!
//! A4 pages, Helvetica 12 pt, one text line every 10 mm starting 10 mm from
//! the top. The first lines are the title and the client; then one line per
//! item. Lines that do not fit continue on a new page.
//!
//! Text is drawn with the builtin Helvetica font, so only characters in its
//! Latin set (accented Portuguese names such as "Orçamento" included) render;
//! other scripts need an embedded font.

use std::io::BufWriter;

use budget_core::calculations::common::format_two_places;
use budget_core::{Client, LineResult};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::debug;

use super::ExportError;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
const LINE_SPACING_MM: f32 = 10.0;
const FONT_SIZE: f32 = 12.0;
const LAYER_NAME: &str = "Layer 1";

pub const TITLE: &str = "Budget";

/// Text lines that make up the document, in drawing order.
pub fn text_lines(
    client: Option<&Client>,
    lines: &[LineResult],
) -> Vec<String> {
    let client_line = match client {
        Some(c) => format!("Client: {}", c.name),
        None => "Client: No client selected".to_string(),
    };

    let mut text = Vec::with_capacity(lines.len() + 2);
    text.push(TITLE.to_string());
    text.push(client_line);
    text.extend(lines.iter().map(|line| {
        format!(
            "{} - Quantity: {} - Price: R$ {}",
            line.product_name,
            line.quantity,
            format_two_places(line.sale_price)
        )
    }));
    text
}

/// Number of text lines that fit on one page.
fn lines_per_page() -> usize {
    ((PAGE_HEIGHT_MM - 2.0 * MARGIN_MM) / LINE_SPACING_MM) as usize + 1
}

/// Renders the budget as a PDF document.
pub fn render(
    client: Option<&Client>,
    lines: &[LineResult],
) -> Result<Vec<u8>, ExportError> {
    let text = text_lines(client, lines);

    let (doc, first_page, first_layer) = PdfDocument::new(
        TITLE,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER_NAME,
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let mut pages = 0;
    for (index, chunk) in text.chunks(lines_per_page()).enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
            doc.get_page(page).get_layer(layer)
        };

        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
        for line in chunk {
            layer.use_text(line.as_str(), FONT_SIZE, Mm(MARGIN_MM), Mm(y), &font);
            y -= LINE_SPACING_MM;
        }
        pages += 1;
    }

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    debug!(items = lines.len(), pages, bytes = bytes.len(), "rendered PDF budget");
    Ok(bytes)
}
