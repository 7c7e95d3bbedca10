use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;
use crate::models::ReceiptRecord;

mod pdf;
pub use pdf::FsReceiptStore;

#[async_trait]
pub trait ReceiptStore: Send + Sync {
    /// Persist the receipt's PDF, replacing any earlier copy.
    async fn save_pdf(&self, receipt: &ReceiptRecord) -> Result<PathBuf>;
}
