use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

use super::layout::classify_layout;
use super::line_items::decode_line_items;
use super::table_layout::decode_table_layout;
use crate::error::{Error, Result};
use crate::models::{LineItem, ReceiptLayout, ReceiptRecord};

static RECEIPT_BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.article.pre").expect("Invalid receipt body selector"));

/// Pull the preformatted receipt body out of the HTML export.
pub fn receipt_text_from_html(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    document
        .select(&RECEIPT_BODY_SELECTOR)
        .next()
        .map(|body| body.text().collect::<String>())
        .ok_or_else(|| Error::decode("receipt export has no article body"))
}

/// Classify and decode receipt text. Either every row decodes or the receipt fails.
pub fn decode_receipt_text(text: &str) -> Result<(ReceiptLayout, Vec<LineItem>)> {
    let layout = classify_layout(text)?;
    let items = match layout {
        ReceiptLayout::TypeOne => decode_line_items(text)?,
        ReceiptLayout::TypeTwo => decode_table_layout(text)?,
    };
    debug!("Decoded {} receipt with {} items", layout, items.len());
    Ok((layout, items))
}

pub fn parse_receipt_text(receipt_id: &str, text: &str, pdf: Option<Vec<u8>>) -> Result<ReceiptRecord> {
    let (layout, items) = decode_receipt_text(text).map_err(|e| e.for_receipt(receipt_id))?;
    Ok(ReceiptRecord::new(receipt_id, layout, items, pdf).with_raw_text(text))
}

/// Build a record from the receipt's HTML export and optional PDF bytes.
pub fn parse_receipt_html(receipt_id: &str, html: &str, pdf: Option<Vec<u8>>) -> Result<ReceiptRecord> {
    let text = receipt_text_from_html(html).map_err(|e| e.for_receipt(receipt_id))?;
    parse_receipt_text(receipt_id, &text, pdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn decodes_type_one_export() {
        let html = r#"<html><body><div class="article pre">
Bananen
     2 x 1.20          2.40
Brot                   2.90  1
Total                  5.30 CHF
</div></body></html>"#;

        let record = parse_receipt_html("R-1", html, Some(b"%PDF-1.4".to_vec())).unwrap();

        assert_eq!(record.layout, ReceiptLayout::TypeOne);
        assert_eq!(record.line_items.len(), 2);
        assert_eq!(record.total(), Some(dec!(5.30)));
        assert_eq!(record.raw_pdf(), Some(&b"%PDF-1.4"[..]));
        assert!(record.raw_text().unwrap().contains("Total                  5.30 CHF"));
    }

    #[test]
    fn raw_text_allows_re_decoding() {
        let text = "Brot   2.90  1\nTotal   2.90 CHF\n";
        let record = parse_receipt_text("R-4", text, None).unwrap();

        assert_eq!(record.raw_text(), Some(text));
        let (layout, items) = decode_receipt_text(record.raw_text().unwrap()).unwrap();
        assert_eq!(layout, record.layout);
        assert_eq!(items, record.line_items);
    }

    #[test]
    fn missing_body_names_the_receipt() {
        let err = parse_receipt_html("R-2", "<html><body></body></html>", None).unwrap_err();
        assert!(err.is_decode_error());
        assert!(err.to_string().contains("R-2"));
    }

    #[test]
    fn empty_body_is_a_failure_not_an_empty_table() {
        let html = r#"<div class="article pre">   </div>"#;
        assert!(parse_receipt_html("R-3", html, None).is_err());
    }
}
