use anyhow::{Context, Result};
use std::env;
use std::fs;

use cumulus_receipts::parsers::{parse_receipt_html, parse_receipt_text};

/// Decode a saved receipt export (HTML) or its plain text body and print the table.
fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .context("usage: inspect_receipt <receipt.html|receipt.txt>")?;
    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))?;

    let receipt_id = path
        .rsplit('/')
        .next()
        .and_then(|name| name.split('.').next())
        .unwrap_or("receipt")
        .to_string();

    let record = if content.trim_start().starts_with('<') {
        parse_receipt_html(&receipt_id, &content, None)?
    } else {
        parse_receipt_text(&receipt_id, &content, None)?
    };

    println!("Receipt {} ({})", record.receipt_id, record.layout);
    print!("{}", record.table());
    match record.total() {
        Some(total) => println!("Total: {}", total),
        None => println!("Total: out of range"),
    }

    Ok(())
}
