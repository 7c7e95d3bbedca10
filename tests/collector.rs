use async_trait::async_trait;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Mutex;

use cumulus_receipts::client::{ReceiptCollector, ReceiptSource};
use cumulus_receipts::models::{Period, ReceiptLayout};
use cumulus_receipts::{Error, Result};

const BASE: &str = "https://www.migros.ch/de/cumulus/konto/kassenbons.html";

struct FakePortal {
    pages: Vec<String>,
    receipts: HashMap<String, String>,
    pdfs: HashMap<String, Vec<u8>>,
    requested_pages: Mutex<Vec<u32>>,
}

#[async_trait]
impl ReceiptSource for FakePortal {
    async fn listing_page(&self, _period: &Period, page: u32) -> Result<String> {
        self.requested_pages.lock().unwrap().push(page);
        self.pages
            .get(page as usize - 1)
            .cloned()
            .ok_or(Error::HttpStatus {
                status: 404,
                url: format!("{}?p={}", BASE, page),
            })
    }

    async fn receipt_html(&self, receipt_id: &str) -> Result<String> {
        self.receipts.get(receipt_id).cloned().ok_or(Error::HttpStatus {
            status: 404,
            url: receipt_id.to_string(),
        })
    }

    async fn receipt_pdf(&self, receipt_id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.pdfs.get(receipt_id).cloned())
    }

    fn listing_base_url(&self) -> &str {
        BASE
    }
}

fn listing_page(entries: &[(&str, &str)], total_pages: u32) -> String {
    let rows: String = entries
        .iter()
        .map(|(download_id, receipt_id)| {
            format!(
                r#"<tr><td><input type="checkbox" value="{download_id}"></td>
                   <td><a class="ui-js-toggle-modal" href="/service/avantaReceiptExport/html?receiptId={receipt_id}">Bon</a></td>
                   <td>MM Limmatplatz</td><td>12.90</td><td>12</td></tr>"#
            )
        })
        .collect();
    let anchors: String = (1..=total_pages)
        .map(|p| format!(r#"<a aria-label="Seite" data-value="{p}">{p}</a>"#))
        .collect();

    format!(
        r#"<html><body><table><tr><th><input type="checkbox" value="all"></th></tr>{rows}</table>
           <nav>{anchors}</nav></body></html>"#
    )
}

fn export(body: &str) -> String {
    format!(r#"<html><body><div class="article pre">{body}</div></body></html>"#)
}

fn period() -> Period {
    Period::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
    )
    .unwrap()
}

fn portal() -> FakePortal {
    let pages = vec![
        listing_page(&[("d-1", "R-1"), ("d-2", "R-2")], 3),
        listing_page(&[("d-3", "R-3")], 3),
        listing_page(&[("d-4", "R-4"), ("d-1", "R-1")], 3),
    ];

    let mut receipts = HashMap::new();
    receipts.insert(
        "R-1".to_string(),
        export("AKT  Shampoo\n   2 x 3.50   7.00-\n   Aktion   1.50-\nBrot   2.90  1\nTotal  4.40 CHF\n"),
    );
    receipts.insert(
        "R-2".to_string(),
        export("Artikelbezeichnung   Menge   Preis   Aktion   Total\nRuchbrot   1   2.90   2.90\n"),
    );
    receipts.insert("R-3".to_string(), export("Bananen\nTotal  2.40 CHF\n"));

    let mut pdfs = HashMap::new();
    pdfs.insert("R-1".to_string(), b"%PDF-1.4".to_vec());

    FakePortal {
        pages,
        receipts,
        pdfs,
        requested_pages: Mutex::new(Vec::new()),
    }
}

#[tokio::test]
async fn walks_every_page_once_and_merges_entries() {
    let collector = ReceiptCollector::new(portal());

    let index = collector.list_receipts(&period()).await.unwrap();

    assert_eq!(*collector.source().requested_pages.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(index.receipt_ids(), vec!["R-1", "R-2", "R-3", "R-4"]);
}

#[tokio::test]
async fn single_page_listing_stops_after_first_request() {
    let mut source = portal();
    source.pages = vec![listing_page(&[("d-1", "R-1")], 0)];
    let collector = ReceiptCollector::new(source);

    let index = collector.list_receipts(&period()).await.unwrap();

    assert_eq!(index.len(), 1);
    assert_eq!(*collector.source().requested_pages.lock().unwrap(), vec![1]);
}

#[tokio::test]
async fn broken_listing_page_names_the_page() {
    let mut source = portal();
    source.pages[1] = r#"<input type="checkbox" value="d-9">"#.to_string();
    let collector = ReceiptCollector::new(source);

    let err = collector.list_receipts(&period()).await.unwrap_err();

    assert!(matches!(err, Error::ListingPage { page: 2, .. }));
    assert!(err.is_decode_error());
}

#[tokio::test]
async fn failing_receipt_does_not_stop_the_batch() {
    let collector = ReceiptCollector::new(portal());
    let ids: Vec<String> = ["R-1", "R-3", "R-2", "R-404"].iter().map(|s| s.to_string()).collect();

    let results = collector.fetch_receipts(&ids).await;

    assert_eq!(results.len(), 4);

    let first = results[0].1.as_ref().unwrap();
    assert_eq!(first.layout, ReceiptLayout::TypeOne);
    assert_eq!(first.line_items.len(), 2);
    assert_eq!(first.line_items[0].total, dec!(-8.50));
    assert!(first.raw_pdf().is_some());

    let err = results[1].1.as_ref().unwrap_err();
    assert!(err.is_decode_error());
    assert!(err.to_string().contains("R-3"));

    let second = results[2].1.as_ref().unwrap();
    assert_eq!(second.layout, ReceiptLayout::TypeTwo);
    assert!(second.raw_pdf().is_none());
    assert_eq!(second.table().rows[0][3], "");

    assert!(matches!(results[3].1, Err(Error::Receipt { .. })));
}

#[tokio::test]
async fn fetching_twice_yields_identical_items() {
    let collector = ReceiptCollector::new(portal());

    let first = collector.fetch_receipt("R-1").await.unwrap();
    let again = collector.fetch_receipt("R-1?lang=de").await.unwrap();

    assert_eq!(again.receipt_id, "R-1");
    assert_eq!(first.line_items, again.line_items);
}
