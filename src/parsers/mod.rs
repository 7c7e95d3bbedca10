pub mod amount;
pub mod layout;
pub mod line_items;
pub mod listing;
pub mod receipt;
pub mod table_layout;

pub use amount::*;
pub use layout::*;
pub use line_items::{decode_grid, decode_line_items};
pub use listing::parse_listing_page;
pub use receipt::*;
pub use table_layout::decode_table_layout;

use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

static COLUMN_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("Invalid column regex"));

/// Clean and normalize text by removing extra whitespace and decoding HTML entities
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    decoded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Split a receipt line on runs of two or more spaces, dropping empty tokens.
pub fn split_columns(line: &str) -> Vec<String> {
    COLUMN_SPLIT
        .split(line)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// One receipt line as position-significant tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// Zero-based index in the decoded grid, used in error messages.
    pub index: usize,
    pub tokens: Vec<String>,
}

impl RawLine {
    pub fn new(index: usize, tokens: Vec<String>) -> Self {
        Self { index, tokens }
    }

    pub fn column(&self, idx: usize) -> Option<&str> {
        self.tokens.get(idx).map(String::as_str)
    }

    /// Column that must be present for the row to be decodable.
    pub fn require(&self, idx: usize, what: &str) -> Result<&str> {
        self.column(idx).ok_or_else(|| {
            Error::decode(format!(
                "row {} has {} columns, expected {} in column {}",
                self.index,
                self.tokens.len(),
                what,
                idx
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
