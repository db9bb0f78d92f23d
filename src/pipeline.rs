// src/pipeline.rs

use crate::error::Result;
use crate::heuristics::{Heuristics, OrderHeader, OrderItem};
use crate::masking::Masker;
use crate::pdf_text;
use crate::table::ResultTable;
use tracing::{info, warn};

/// Everything needed to turn page text into rows. Built fresh for each document.
#[derive(Debug)]
pub struct Extractor {
    masker: Masker,
    heuristics: Heuristics,
}

impl Extractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            masker: Masker::new()?,
            heuristics: Heuristics::new()?,
        })
    }

    /// Mask one page, then pull its header and items.
    pub fn extract_page(&self, raw_text: &str) -> (OrderHeader, Vec<OrderItem>) {
        let text = self.masker.mask(raw_text);
        let header = self.heuristics.extract_header(&text);
        let items = self.heuristics.extract_items(&text);
        (header, items)
    }

    /// Run every page through masking and extraction, in page order.
    pub fn extract_rows<I, S>(&self, pages: I) -> ResultTable
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = ResultTable::new();
        for (i, page) in pages.into_iter().enumerate() {
            let span = tracing::info_span!("page", number = i + 1);
            let _guard = span.enter();

            let (header, items) = self.extract_page(page.as_ref());
            let (filled, total) = header.coverage();
            info!(
                filled,
                total,
                order = %header.order_number,
                items = items.len(),
                "Page extracted"
            );
            table.extend_page(&header, items);
        }
        table
    }
}

/// Full pipeline: PDF bytes in, Result Table out.
///
/// An unreadable PDF is an error; a readable PDF with no recognizable items
/// gives an empty table.
pub fn extract_from_pdf(pdf_bytes: &[u8]) -> Result<ResultTable> {
    let pages = pdf_text::read_pages(pdf_bytes)?;
    let extractor = Extractor::new()?;
    let table = extractor.extract_rows(&pages.texts);

    if table.is_empty() {
        if pdf_text::looks_like_scanned(&pages.document) {
            warn!("No items found and the PDF looks scanned; text extraction needs OCR");
        } else {
            warn!(pages = pages.texts.len(), "No items recognized in document");
        }
    } else {
        info!(rows = table.len(), pages = pages.texts.len(), "Extraction complete");
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::masking::{MASKED_EMAIL, MASKED_PHONE, MASKED_TAX_ID};
    use crate::pdf_text::fixtures;

    fn extractor() -> Extractor {
        Extractor::new().unwrap()
    }

    #[test]
    fn test_two_page_scenario() {
        let page1 = "\
Pedido de Venda Nº 555
Informações do Cliente

ACME LTDA
Itens do Pedido de Venda
10,00 UN COD1 DESCRIPTION A
";
        let page2 = "\
Itens do Pedido de Venda
5,00 CX COD2 DESCRIPTION B
";
        let table = extractor().extract_rows([page1, page2]);
        assert_eq!(table.len(), 2);

        let row1 = &table.rows()[0];
        assert_eq!(row1.order_number, "555");
        assert_eq!(row1.client, "ACME LTDA");
        assert_eq!(row1.code, "COD1");
        assert_eq!(row1.quantity, 10.0);

        let row2 = &table.rows()[1];
        assert_eq!(row2.code, "COD2");
        assert_eq!(row2.quantity, 5.0);
        assert_eq!(row2.unit, "CX");
        assert_eq!(row2.header(), OrderHeader::default());
    }

    #[test]
    fn test_masking_happens_before_extraction() {
        let page = "\
Pedido de Venda Nº 42
OBS: ligar (11) 98765-4321 ou compras@acme.com.br
Informações do Cliente
ACME LTDA CNPJ 12.345.678/0001-90
Itens do Pedido de Venda
1,00 UN A1 ITEM
";
        let (header, items) = extractor().extract_page(page);
        assert_eq!(header.observation, format!("ligar {MASKED_PHONE} ou {MASKED_EMAIL}"));
        assert_eq!(header.client, format!("ACME LTDA CNPJ {MASKED_TAX_ID}"));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let page = "Itens do Pedido de Venda\n1,00 UN A1 ITEM\n1,00 UN A1 ITEM";
        let table = extractor().extract_rows([page, page]);
        assert_eq!(table.len(), 4);
        assert!(table.rows().iter().all(|r| r.code == "A1"));
    }

    #[test]
    fn test_no_pages_no_rows() {
        let table = extractor().extract_rows(Vec::<String>::new());
        assert!(table.is_empty());
    }

    #[test]
    fn test_pdf_end_to_end() {
        let pdf = fixtures::text_pdf(&[
            &[
                "OBS: fragil",
                "Itens do Pedido de Venda",
                "10,00 UN COD1 DESCRIPTION A",
                "1.234,50 CX COD-9 DESCRIPTION C",
                "Outras Informacoes",
            ],
            &["Itens do Pedido de Venda", "5,00 CX COD2 DESCRIPTION B"],
        ]);
        let table = extract_from_pdf(&pdf).unwrap();
        let codes: Vec<_> = table.rows().iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["COD1", "COD-9", "COD2"]);
        assert_eq!(table.rows()[1].quantity, 1234.5);
        assert_eq!(table.rows()[0].observation, "fragil");
        assert_eq!(table.rows()[2].observation, "");
    }

    #[test]
    fn test_pdf_rows_drawn_cell_by_cell() {
        let pdf = fixtures::cell_rows_pdf(&[
            &["Itens do Pedido de Venda"],
            &["10,00", "UN", "COD1", "DESCRIPTION A"],
            &["2,50", "KG", "AB/7", "OTHER ITEM"],
        ]);
        let table = extract_from_pdf(&pdf).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].code, "COD1");
        assert_eq!(table.rows()[0].quantity, 10.0);
        assert_eq!(table.rows()[1].unit, "KG");
        assert_eq!(table.rows()[1].description, "OTHER ITEM");
    }

    #[test]
    fn test_pdf_without_items_is_empty_not_error() {
        let pdf = fixtures::text_pdf(&[&["Pedido sem itens reconhecidos"]]);
        let table = extract_from_pdf(&pdf).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_malformed_pdf_is_error() {
        let err = extract_from_pdf(b"this is not a pdf").unwrap_err();
        assert!(matches!(err, Error::Pdf(_) | Error::Io(_)));
    }
}
