// src/lib.rs

//! Turns vendor "Pedido de Venda" PDFs into a large-font picking sheet and a CSV.
//!
//! The pipeline is linear: read each page's text, mask personal data, pull
//! the order header and the item lines with keyword-anchored rules, join them
//! into a [`ResultTable`], then export CSV or render the sheet.

pub mod config;
pub mod error;
pub mod heuristics;
pub mod masking;
pub mod pdf_text;
pub mod pipeline;
pub mod sheet;
pub mod table;

pub use error::{Error, Result};
pub use pipeline::{Extractor, extract_from_pdf};
pub use sheet::{SheetOptions, write_sheet};
pub use table::{ResultRow, ResultTable};
