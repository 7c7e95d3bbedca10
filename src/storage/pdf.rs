use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::ReceiptRecord;
use crate::storage::ReceiptStore;

/// Writes `<receipt_id>.pdf` files into one directory.
pub struct FsReceiptStore {
    dir: PathBuf,
}

impl FsReceiptStore {
    pub async fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, receipt_id: &str) -> PathBuf {
        self.dir.join(format!("{}.pdf", receipt_id))
    }
}

#[async_trait]
impl ReceiptStore for FsReceiptStore {
    async fn save_pdf(&self, receipt: &ReceiptRecord) -> Result<PathBuf> {
        let pdf = receipt.raw_pdf().ok_or_else(|| Error::MissingArtifact {
            receipt_id: receipt.receipt_id.clone(),
        })?;

        let path = self.path_for(&receipt.receipt_id);
        tokio::fs::write(&path, pdf).await?;
        debug!("Saved file: {}", path.display());
        Ok(path)
    }
}
