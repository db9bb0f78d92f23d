// src/sheet/layout.rs

use super::format_quantity;
use crate::table::ResultRow;
use oxidize_pdf::Font;
use oxidize_pdf::text::measure_text;

/// ISO A4 in points.
pub const PAGE_WIDTH: f64 = 595.0;
pub const PAGE_HEIGHT: f64 = 842.0;
pub const MARGIN: f64 = 24.0;
const TOP: f64 = PAGE_HEIGHT - MARGIN;
const FRAME_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;

const BODY_SIZE: f64 = 10.0;
const BODY_LEADING: f64 = 12.0;
const TITLE_SIZE: f64 = 18.0;
const TITLE_LEADING: f64 = 22.0;
const TITLE_SPACE_AFTER: f64 = 6.0;

/// Descrição is printed at this size whatever the item size is.
pub const DESCRIPTION_FONT_SIZE: f64 = 10.0;
const DESCRIPTION_LEADING: f64 = 12.0;

const COLUMN_WIDTHS: [f64; 6] = [55.0, 45.0, 40.0, 45.0, 95.0, 250.0];
const COLUMN_TITLES: [&str; 6] = ["Qtd", "Unid", "QTD", "CHECK", "Código", "Descrição"];
const DESCRIPTION_COLUMN: usize = 5;

const GRID_WIDTH: f64 = 0.25;
const HEADER_FILL_GRAY: f64 = 0.827;
const HEADER_PAD_V: f64 = 3.0;
const BODY_PAD_V: f64 = 8.0;
const PAD_H: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

const BODY_ALIGN: [Align; 6] = [
    Align::Right,
    Align::Right,
    Align::Center,
    Align::Center,
    Align::Left,
    Align::Left,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
}

impl Face {
    pub fn font(self) -> Font {
        match self {
            Face::Regular => Font::Helvetica,
            Face::Bold => Font::HelveticaBold,
        }
    }
}

pub fn text_width(face: Face, size: f64, text: &str) -> f64 {
    measure_text(text, face.font(), size)
}

/// One drawing instruction, in page coordinates (origin bottom left).
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    /// `y` is the baseline.
    Text {
        x: f64,
        y: f64,
        face: Face,
        size: f64,
        text: String,
    },
    Fill {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        gray: f64,
    },
    Stroke {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        line_width: f64,
    },
}

/// Lay out the whole sheet. Rows must not be empty.
pub fn sheet_pages(rows: &[ResultRow], item_font_size: f64, footer: &str) -> Vec<Vec<Mark>> {
    let mut flow = Flow::new();
    if let Some(first) = rows.first() {
        title_block(&mut flow, first);
        TableLayout::new(item_font_size).draw(&mut flow, rows);
    }
    flow.space(12.0);
    flow.paragraph(&[(Face::Regular, footer)]);
    flow.finish()
}

/// The single page printed for an empty table.
pub fn notice_page(notice: &str) -> Vec<Vec<Mark>> {
    let mut flow = Flow::new();
    flow.paragraph(&[(Face::Regular, notice)]);
    flow.finish()
}

fn title_block(flow: &mut Flow, row: &ResultRow) {
    flow.title(&format!("Pedido {}", row.order_number));
    flow.space(8.0);
    flow.paragraph(&[(Face::Bold, "Cliente:"), (Face::Regular, &row.client)]);
    flow.space(6.0);
    flow.paragraph(&[(Face::Bold, "Inclusão:"), (Face::Regular, &row.inclusion_timestamp)]);
    flow.paragraph(&[
        (Face::Bold, "Previsão Faturamento:"),
        (Face::Regular, &row.billing_forecast_date),
    ]);
    flow.space(6.0);
    flow.paragraph(&[(Face::Bold, "Obs.:"), (Face::Regular, &row.observation)]);
    flow.space(12.0);
}

/// Top-down cursor over the frame of the current page.
struct Flow {
    done: Vec<Vec<Mark>>,
    current: Vec<Mark>,
    y: f64,
}

impl Flow {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            current: Vec::new(),
            y: TOP,
        }
    }

    fn finish(mut self) -> Vec<Vec<Mark>> {
        self.done.push(self.current);
        self.done
    }

    fn new_page(&mut self) {
        self.done.push(std::mem::take(&mut self.current));
        self.y = TOP;
    }

    fn space(&mut self, h: f64) {
        self.y -= h;
    }

    fn room(&self) -> f64 {
        self.y - MARGIN
    }

    fn fits(&self, h: f64) -> bool {
        h <= self.room() + 0.01
    }

    /// Start a new page when `h` points no longer fit above the bottom margin.
    fn reserve(&mut self, h: f64) -> bool {
        if !self.fits(h) && self.y < TOP {
            self.new_page();
            return true;
        }
        false
    }

    fn text(&mut self, x: f64, y: f64, face: Face, size: f64, text: &str) {
        self.current.push(Mark::Text {
            x,
            y,
            face,
            size,
            text: text.to_string(),
        });
    }

    fn title(&mut self, text: &str) {
        for line in wrap(Face::Bold, TITLE_SIZE, text, FRAME_WIDTH) {
            self.reserve(TITLE_LEADING);
            let x = MARGIN + (FRAME_WIDTH - text_width(Face::Bold, TITLE_SIZE, &line)) / 2.0;
            let y = baseline(self.y, TITLE_LEADING, TITLE_SIZE);
            self.text(x, y, Face::Bold, TITLE_SIZE, &line);
            self.y -= TITLE_LEADING;
        }
        self.y -= TITLE_SPACE_AFTER;
    }

    /// Body-style paragraph made of runs in different faces, word-wrapped to the frame.
    fn paragraph(&mut self, runs: &[(Face, &str)]) {
        for line in wrap_runs(runs, BODY_SIZE, FRAME_WIDTH) {
            self.reserve(BODY_LEADING);
            let y = baseline(self.y, BODY_LEADING, BODY_SIZE);
            let mut x = MARGIN;
            for (face, run) in &line {
                self.text(x, y, *face, BODY_SIZE, run);
                x += text_width(*face, BODY_SIZE, run);
            }
            self.y -= BODY_LEADING;
        }
    }
}

/// Baseline of a line of `size` text vertically centred in a slot of `leading`.
fn baseline(top: f64, leading: f64, size: f64) -> f64 {
    top - leading / 2.0 - size * 0.35
}

/// Greedy word wrap. A word wider than `max_width` is split by characters.
pub fn wrap(face: Face, size: f64, text: &str, max_width: f64) -> Vec<String> {
    let space = text_width(face, size, " ");
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut width = 0.0;

    for word in text.split_whitespace() {
        let word_w = text_width(face, size, word);
        if word_w > max_width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let mut pieces = split_long_word(face, size, word, max_width);
            line = pieces.pop().unwrap_or_default();
            width = text_width(face, size, &line);
            lines.extend(pieces);
            continue;
        }
        if !line.is_empty() && width + space + word_w > max_width {
            lines.push(std::mem::take(&mut line));
            width = 0.0;
        }
        if !line.is_empty() {
            line.push(' ');
            width += space;
        }
        line.push_str(word);
        width += word_w;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn split_long_word(face: Face, size: f64, word: &str, max_width: f64) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for c in word.chars() {
        piece.push(c);
        if text_width(face, size, &piece) > max_width && piece.chars().count() > 1 {
            piece.pop();
            pieces.push(std::mem::replace(&mut piece, c.to_string()));
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Wrap a sequence of differently styled runs into lines of runs. Each run
/// after the first on a line carries its leading space.
fn wrap_runs(runs: &[(Face, &str)], size: f64, max_width: f64) -> Vec<Vec<(Face, String)>> {
    let mut lines: Vec<Vec<(Face, String)>> = Vec::new();
    let mut line: Vec<(Face, String)> = Vec::new();
    let mut width = 0.0;

    for (face, text) in runs {
        let space_w = text_width(*face, size, " ");
        for word in text.split_whitespace() {
            let word_w = text_width(*face, size, word);
            if !line.is_empty() && width + space_w + word_w > max_width {
                lines.push(std::mem::take(&mut line));
                width = 0.0;
            }
            let sep = if line.is_empty() { "" } else { " " };
            match line.last_mut() {
                Some((last_face, last)) if *last_face == *face => {
                    last.push_str(sep);
                    last.push_str(word);
                }
                _ => line.push((*face, format!("{sep}{word}"))),
            }
            width += if sep.is_empty() { word_w } else { space_w + word_w };
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// One cell's text lines and the face/size/leading to draw them with.
#[derive(Debug, Clone)]
struct Cell {
    lines: Vec<String>,
    face: Face,
    size: f64,
    leading: f64,
}

impl Cell {
    fn height(&self) -> f64 {
        self.lines.len() as f64 * self.leading
    }
}

struct TableLayout {
    x: f64,
    width: f64,
    item_size: f64,
    item_leading: f64,
}

impl TableLayout {
    fn new(item_size: f64) -> Self {
        let width: f64 = COLUMN_WIDTHS.iter().sum();
        Self {
            x: MARGIN + (FRAME_WIDTH - width) / 2.0,
            width,
            item_size,
            item_leading: item_size * 1.2,
        }
    }

    fn header_height(&self) -> f64 {
        self.item_leading + 2.0 * HEADER_PAD_V
    }

    /// Body height available on a page that holds nothing but the header row.
    fn page_body_height(&self) -> f64 {
        TOP - MARGIN - self.header_height()
    }

    fn draw(&self, flow: &mut Flow, rows: &[ResultRow]) {
        // keep the header together with at least one line of the first row
        flow.reserve(self.header_height() + self.item_leading + 2.0 * BODY_PAD_V);
        self.draw_header(flow);
        for row in rows {
            self.draw_row(flow, row);
        }
    }

    fn continue_on_new_page(&self, flow: &mut Flow) {
        flow.new_page();
        self.draw_header(flow);
    }

    fn draw_header(&self, flow: &mut Flow) {
        let cells: Vec<Cell> = COLUMN_TITLES
            .iter()
            .map(|title| Cell {
                lines: vec![title.to_string()],
                face: Face::Bold,
                size: self.item_size,
                leading: self.item_leading,
            })
            .collect();
        let height = self.header_height();
        flow.current.push(Mark::Fill {
            x: self.x,
            y: flow.y - height,
            width: self.width,
            height,
            gray: HEADER_FILL_GRAY,
        });
        self.draw_cells(flow, &cells, height, HEADER_PAD_V, &[Align::Center; 6]);
    }

    /// Draw one item. A row that does not fit moves to the next page; a row
    /// taller than a whole page is split between description lines, and the
    /// pieces after the first carry only the rest of the description.
    fn draw_row(&self, flow: &mut Flow, row: &ResultRow) {
        let mut cells = self.body_cells(row);
        let mut fresh_page = false;

        loop {
            let height = self.row_height(&cells);
            if flow.fits(height) {
                self.draw_cells(flow, &cells, height, BODY_PAD_V, &BODY_ALIGN);
                return;
            }
            if !fresh_page && height <= self.page_body_height() {
                self.continue_on_new_page(flow);
                fresh_page = true;
                continue;
            }

            let items_height = cells[..DESCRIPTION_COLUMN]
                .iter()
                .map(Cell::height)
                .fold(0.0, f64::max);
            let content_room = flow.room() - 2.0 * BODY_PAD_V;
            let mut take = (content_room / DESCRIPTION_LEADING).floor().max(0.0) as usize;
            if items_height > content_room {
                take = 0;
            }
            if take == 0 && fresh_page {
                // nothing else can go on an empty page, always make progress
                take = 1;
            }
            if take == 0 {
                self.continue_on_new_page(flow);
                fresh_page = true;
                continue;
            }

            let split_at = take.min(cells[DESCRIPTION_COLUMN].lines.len());
            let rest = cells[DESCRIPTION_COLUMN].lines.split_off(split_at);
            let height = self.row_height(&cells);
            self.draw_cells(flow, &cells, height, BODY_PAD_V, &BODY_ALIGN);

            for cell in &mut cells[..DESCRIPTION_COLUMN] {
                cell.lines.clear();
            }
            cells[DESCRIPTION_COLUMN].lines = rest;
            if cells[DESCRIPTION_COLUMN].lines.is_empty() {
                return;
            }
            self.continue_on_new_page(flow);
            fresh_page = true;
        }
    }

    fn row_height(&self, cells: &[Cell]) -> f64 {
        cells.iter().map(Cell::height).fold(0.0, f64::max) + 2.0 * BODY_PAD_V
    }

    fn body_cells(&self, row: &ResultRow) -> Vec<Cell> {
        let item = |text: String| Cell {
            lines: if text.is_empty() { Vec::new() } else { vec![text] },
            face: Face::Regular,
            size: self.item_size,
            leading: self.item_leading,
        };
        let description_width = COLUMN_WIDTHS[DESCRIPTION_COLUMN] - 2.0 * PAD_H;
        vec![
            item(format_quantity(row.quantity)),
            item(row.unit.clone()),
            item(String::new()),
            item(String::new()),
            item(row.code.clone()),
            Cell {
                lines: wrap(
                    Face::Regular,
                    DESCRIPTION_FONT_SIZE,
                    &row.description,
                    description_width,
                ),
                face: Face::Regular,
                size: DESCRIPTION_FONT_SIZE,
                leading: DESCRIPTION_LEADING,
            },
        ]
    }

    fn draw_cells(&self, flow: &mut Flow, cells: &[Cell], height: f64, pad_v: f64, align: &[Align; 6]) {
        let top = flow.y;
        let mut x = self.x;
        for (i, cell) in cells.iter().enumerate() {
            let width = COLUMN_WIDTHS[i];
            flow.current.push(Mark::Stroke {
                x,
                y: top - height,
                width,
                height,
                line_width: GRID_WIDTH,
            });

            let free = height - 2.0 * pad_v - cell.height();
            let mut line_top = top - pad_v - free / 2.0;
            for line in &cell.lines {
                let w = text_width(cell.face, cell.size, line);
                let tx = match align[i] {
                    Align::Left => x + PAD_H,
                    Align::Center => x + (width - w) / 2.0,
                    Align::Right => x + width - PAD_H - w,
                };
                let y = baseline(line_top, cell.leading, cell.size);
                flow.text(tx, y, cell.face, cell.size, line);
                line_top -= cell.leading;
            }
            x += width;
        }
        flow.y -= height;
    }
}
