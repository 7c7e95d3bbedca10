use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::models::{Period, ReceiptIndex, ReceiptRecord};
use crate::parsers::{parse_listing_page, parse_receipt_html};

pub mod auth;
mod migros;

pub use migros::MigrosClient;

/// Raw documents from the loyalty portal. Implementations own the session;
/// callers only see HTML and PDF bytes.
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    async fn listing_page(&self, period: &Period, page: u32) -> Result<String>;
    async fn receipt_html(&self, receipt_id: &str) -> Result<String>;
    async fn receipt_pdf(&self, receipt_id: &str) -> Result<Option<Vec<u8>>>;
    /// URL that relative receipt links on listing pages resolve against.
    fn listing_base_url(&self) -> &str;
}

/// Walks listing pages and fetches receipts one at a time.
pub struct ReceiptCollector<S> {
    source: S,
}

impl<S: ReceiptSource> ReceiptCollector<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// All receipts in `period`, keyed by download id in listing order.
    pub async fn list_receipts(&self, period: &Period) -> Result<ReceiptIndex> {
        info!("Listing receipts from {}", period);
        let mut index = ReceiptIndex::new();

        let mut current_page = 1;
        let mut total_pages = self.collect_page(period, current_page, &mut index).await?;

        while current_page < total_pages {
            current_page += 1;
            total_pages = self.collect_page(period, current_page, &mut index).await?;
        }

        info!("Found {} receipts on {} pages", index.len(), current_page);
        Ok(index)
    }

    async fn collect_page(&self, period: &Period, page: u32, index: &mut ReceiptIndex) -> Result<u32> {
        let html = self
            .source
            .listing_page(period, page)
            .await
            .map_err(|e| e.on_page(page))?;
        let listing = parse_listing_page(&html, self.source.listing_base_url())
            .map_err(|e| e.on_page(page))?;

        info!("Page {}/{}: {} receipts", page, listing.total_pages, listing.entries.len());
        let total_pages = listing.total_pages;
        index.merge(listing);
        Ok(total_pages)
    }

    /// Fetch and decode one receipt. A missing PDF does not fail the receipt.
    pub async fn fetch_receipt(&self, receipt_id: &str) -> Result<ReceiptRecord> {
        let receipt_id = receipt_id.split('?').next().unwrap_or(receipt_id);

        let html = self
            .source
            .receipt_html(receipt_id)
            .await
            .map_err(|e| e.for_receipt(receipt_id))?;

        let pdf = match self.source.receipt_pdf(receipt_id).await {
            Ok(pdf) => pdf,
            Err(e) => {
                warn!("No PDF for receipt {}: {}", receipt_id, e);
                None
            }
        };

        parse_receipt_html(receipt_id, &html, pdf)
    }

    /// Fetch a batch; each receipt succeeds or fails on its own.
    pub async fn fetch_receipts(&self, receipt_ids: &[String]) -> Vec<(String, Result<ReceiptRecord>)> {
        let mut results = Vec::with_capacity(receipt_ids.len());

        for receipt_id in receipt_ids {
            let result = self.fetch_receipt(receipt_id).await;
            if let Err(e) = &result {
                error!("Failed to decode receipt {}: {}", receipt_id, e);
            }
            results.push((receipt_id.clone(), result));
        }

        results
    }
}
