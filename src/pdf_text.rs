// src/pdf_text.rs

use crate::error::Result;
use lopdf::{Document, ObjectId};
use tracing::{debug, info, warn};

/// A parsed input PDF together with the raw text of each page, in page order.
#[derive(Debug)]
pub struct PdfPages {
    pub document: Document,
    pub texts: Vec<String>,
}

/// Open `pdf_bytes` and pull the text of every page.
///
/// pdf-extract does the reading because it places a space wherever the glyph
/// positions leave a gap, which keeps table cells apart. Pages it leaves blank
/// (or every page, when it fails outright) are retried with lopdf's own
/// extractor. A document lopdf cannot parse at all is a hard error.
pub fn read_pages(pdf_bytes: &[u8]) -> Result<PdfPages> {
    let document = Document::load_mem(pdf_bytes)?;
    let page_count = document.get_pages().len();
    info!(pages = page_count, bytes = pdf_bytes.len(), "Opened PDF");

    let mut texts = match pdf_extract::extract_text_from_mem_by_pages(pdf_bytes) {
        Ok(texts) => texts,
        Err(e) => {
            warn!(error = %e, "pdf-extract failed, falling back to lopdf for every page");
            Vec::new()
        }
    };
    if texts.len() != page_count {
        debug!(extracted = texts.len(), expected = page_count, "Page count mismatch");
        texts.resize(page_count, String::new());
    }

    fill_blank_pages(&document, &mut texts);

    for (i, text) in texts.iter().enumerate() {
        debug!(page = i + 1, chars = text.len(), "Page text");
    }

    Ok(PdfPages { document, texts })
}

fn fill_blank_pages(document: &Document, texts: &mut [String]) {
    let page_numbers = document.get_pages().into_keys();
    for (text, page_num) in texts.iter_mut().zip(page_numbers) {
        if !text.trim().is_empty() {
            continue;
        }
        match document.extract_text(&[page_num]) {
            Ok(other) => *text = other,
            Err(e) => warn!(page = page_num, error = %e, "lopdf could not extract page text"),
        }
    }
}

/// True when at least 80% of the pages draw images but declare no fonts,
/// which is what a scanner produces. Such pages have no text to extract.
pub fn looks_like_scanned(doc: &Document) -> bool {
    let pages = doc.get_pages();
    if pages.is_empty() {
        return false;
    }

    let scanned = pages
        .values()
        .filter(|&&page_id| page_is_image_only(doc, page_id))
        .count();
    let share = scanned as f64 / pages.len() as f64;
    info!(pages = pages.len(), image_only = scanned, share, "Checked for scanned pages");

    share >= 0.8
}

fn page_is_image_only(doc: &Document, page_id: ObjectId) -> bool {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return false;
    };
    let resources = page
        .get(b"Resources")
        .and_then(|r| doc.dereference(r))
        .and_then(|(_, r)| r.as_dict())
        .ok();

    let non_empty = |key: &[u8]| {
        resources
            .and_then(|res| res.get(key).ok())
            .and_then(|v| doc.dereference(v).ok())
            .and_then(|(_, v)| v.as_dict().ok())
            .is_some_and(|dict| !dict.is_empty())
    };

    non_empty(b"XObject") && !non_empty(b"Font")
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_garbage_bytes() {
        let result = read_pages(b"this is not a pdf");
        assert!(matches!(result, Err(Error::Pdf(_)) | Err(Error::Io(_))));
    }

    #[test]
    fn test_pages_in_order() {
        let pdf = fixtures::text_pdf(&[&["first page", "line two"], &["second page"]]);
        let pages = read_pages(&pdf).unwrap();
        assert_eq!(pages.texts.len(), 2);
        assert!(pages.texts[0].contains("first page"));
        assert!(pages.texts[0].contains("line two"));
        assert!(pages.texts[1].contains("second page"));
        assert!(!looks_like_scanned(&pages.document));
    }

    #[test]
    fn test_lines_are_separate() {
        let pdf = fixtures::text_pdf(&[&["Itens do Pedido de Venda", "10,00 UN COD1 DESCRIPTION A"]]);
        let pages = read_pages(&pdf).unwrap();
        let lines: Vec<&str> = pages.texts[0].lines().map(str::trim).collect();
        assert!(lines.contains(&"10,00 UN COD1 DESCRIPTION A"));
    }

    #[test]
    fn test_cells_drawn_one_by_one_keep_their_spacing() {
        let pdf = fixtures::cell_rows_pdf(&[
            &["Itens do Pedido de Venda"],
            &["10,00", "UN", "COD1", "DESCRIPTION A"],
        ]);
        let pages = read_pages(&pdf).unwrap();
        let lines: Vec<&str> = pages.texts[0].lines().map(str::trim).collect();
        assert!(lines.contains(&"10,00 UN COD1 DESCRIPTION A"), "{lines:?}");
    }

    #[test]
    fn test_kerned_cells_keep_their_spacing() {
        let pdf = fixtures::kerned_rows_pdf(&[&["5,00", "CX", "COD2", "DESCRIPTION B"]]);
        let pages = read_pages(&pdf).unwrap();
        let lines: Vec<&str> = pages.texts[0].lines().map(str::trim).collect();
        assert!(lines.contains(&"5,00 CX COD2 DESCRIPTION B"), "{lines:?}");
    }

    #[test]
    fn test_image_only_page_looks_scanned() {
        let doc = Document::load_mem(&fixtures::image_only_pdf()).unwrap();
        assert!(looks_like_scanned(&doc));
    }

    #[test]
    fn test_text_pages_are_not_image_only() {
        let doc = Document::load_mem(&fixtures::text_pdf(&[&["Pedido"], &["Itens"]])).unwrap();
        for page_id in doc.get_pages().into_values() {
            assert!(!page_is_image_only(&doc, page_id));
        }
        assert!(!looks_like_scanned(&doc));
    }
}
