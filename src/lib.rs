//! Migros Cumulus receipt download and receipt text decoding.
//!
//! The parsers are pure functions over HTML and text; [`client`] wraps the
//! portal session behind the [`client::ReceiptSource`] trait.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod parsers;
pub mod storage;
pub mod utils;

pub use error::{Error, Result};
