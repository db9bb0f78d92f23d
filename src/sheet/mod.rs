// src/sheet/mod.rs

mod layout;

use crate::config::{self, DEFAULT_FONT_SIZE};
use crate::error::{Error, Result};
use crate::table::ResultTable;
use layout::Mark;
use oxidize_pdf::{Color, Document, Page};
use std::path::Path;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{debug, info};

/// Knobs for the picking sheet.
#[derive(Debug, Clone)]
pub struct SheetOptions {
    /// Size of the header row and the Qtd/Unid/Código cells.
    pub item_font_size: u32,
    /// Printed in the footer.
    pub generated_at: OffsetDateTime,
}

impl SheetOptions {
    pub fn new(item_font_size: u32) -> Result<Self> {
        Ok(Self {
            item_font_size: config::check_font_size(item_font_size)?,
            ..Self::default()
        })
    }

    pub fn with_generated_at(mut self, at: OffsetDateTime) -> Self {
        self.generated_at = at;
        self
    }
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            item_font_size: DEFAULT_FONT_SIZE,
            generated_at: OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()),
        }
    }
}

/// Render the picking sheet for `table` and write it to `path`.
///
/// The title block always shows the header of the first row, even when later
/// rows came from pages with a different header. An empty table gives a
/// single "Sem itens." page.
pub fn write_sheet(table: &ResultTable, options: &SheetOptions, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let pages = if table.is_empty() {
        info!("Empty table, rendering notice page");
        layout::notice_page("Sem itens.")
    } else {
        let stamp = options
            .generated_at
            .format(format_description!(
                "[day]/[month]/[year] [hour]:[minute]:[second]"
            ))
            .map_err(|e| Error::Render(e.to_string()))?;
        layout::sheet_pages(
            table.rows(),
            options.item_font_size as f64,
            &format!("Gerado em {stamp}"),
        )
    };

    let mut doc = Document::new();
    doc.set_title("Pedido de Venda - separação");
    for marks in &pages {
        let mut page = Page::a4();
        for mark in marks {
            paint(&mut page, mark)?;
        }
        doc.add_page(page);
    }
    doc.save(path).map_err(render_error)?;
    strip_volatile_metadata(path)?;

    info!(
        rows = table.len(),
        pages = pages.len(),
        font_size = options.item_font_size,
        path = %path.display(),
        "Rendered picking sheet"
    );
    Ok(())
}

fn render_error(e: impl std::fmt::Display) -> Error {
    Error::Render(e.to_string())
}

fn paint(page: &mut Page, mark: &Mark) -> Result<()> {
    match mark {
        Mark::Text {
            x,
            y,
            face,
            size,
            text,
        } => {
            page.text()
                .set_font(face.font(), *size)
                .at(*x, *y)
                .write(text)
                .map_err(render_error)?;
        }
        Mark::Fill {
            x,
            y,
            width,
            height,
            gray,
        } => {
            let graphics = page.graphics();
            graphics
                .set_fill_color(Color::rgb(*gray, *gray, *gray))
                .rect(*x, *y, *width, *height)
                .fill();
            graphics.set_fill_color(Color::black());
        }
        Mark::Stroke {
            x,
            y,
            width,
            height,
            line_width,
        } => {
            page.graphics()
                .set_stroke_color(Color::black())
                .set_line_width(*line_width)
                .rect(*x, *y, *width, *height)
                .stroke();
        }
    }
    Ok(())
}

/// Drop the creation/modification dates and the file ID so that the same
/// table and options always produce the same file.
fn strip_volatile_metadata(path: &Path) -> Result<()> {
    let mut doc = lopdf::Document::load(path)?;

    let info_id = doc.trailer.get(b"Info").and_then(lopdf::Object::as_reference).ok();
    let info = match info_id {
        Some(id) => doc.get_dictionary_mut(id).ok(),
        None => doc
            .trailer
            .get_mut(b"Info")
            .and_then(lopdf::Object::as_dict_mut)
            .ok(),
    };
    if let Some(info) = info {
        info.remove(b"CreationDate");
        info.remove(b"ModDate");
    }
    doc.trailer.remove(b"ID");

    doc.compress();
    doc.save(path)?;
    debug!(path = %path.display(), "Sheet metadata normalised");
    Ok(())
}

/// Format a quantity the pt-BR way: `.` for thousands, `,` for decimals.
pub fn format_quantity(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{frac_part}")
}
