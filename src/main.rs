use anyhow::{bail, Context, Result};
use chrono::{Duration, Local};
use std::sync::Arc;
use tracing::{error, info};

use cumulus_receipts::client::{MigrosClient, ReceiptCollector};
use cumulus_receipts::config::Config;
use cumulus_receipts::models::Period;
use cumulus_receipts::storage::{FsReceiptStore, ReceiptStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cumulus_receipts=info".parse()?),
        )
        .init();

    info!("Starting Cumulus receipt export");

    let config = Arc::new(Config::load().context("Failed to load configuration")?);
    if config.username.is_empty() || config.password.is_empty() {
        bail!("MIGROS_USERNAME and MIGROS_PASSWORD must be set");
    }

    let today = Local::now().date_naive();
    let period = Period::new(
        config.period_from.unwrap_or(today - Duration::days(30)),
        config.period_to.unwrap_or(today),
    )?;

    let client = MigrosClient::connect(config.clone())
        .await
        .context("Login failed")?;
    let collector = ReceiptCollector::new(client);

    let index = collector.list_receipts(&period).await?;
    let results = collector.fetch_receipts(&index.receipt_ids()).await;

    let store = match &config.pdf_dir {
        Some(dir) => Some(FsReceiptStore::new(dir).await?),
        None => None,
    };

    let mut records = Vec::new();
    let mut failed = 0;
    for (receipt_id, result) in results {
        match result {
            Ok(record) => {
                info!(
                    "Receipt {} ({}): {} items, total {}",
                    receipt_id,
                    record.layout,
                    record.line_items.len(),
                    record.total().map_or("out of range".to_string(), |t| t.to_string())
                );
                if let Some(store) = &store {
                    if let Err(e) = store.save_pdf(&record).await {
                        error!("Could not save PDF for {}: {}", receipt_id, e);
                    }
                }
                records.push(record);
            }
            Err(_) => failed += 1,
        }
    }

    println!("{}", serde_json::to_string_pretty(&records)?);
    info!(
        "Exported {} receipts for {}, {} failed",
        records.len(),
        period,
        failed
    );

    Ok(())
}
