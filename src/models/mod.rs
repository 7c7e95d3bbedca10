pub mod listing;
pub mod period;
pub mod receipt;

pub use listing::*;
pub use period::*;
pub use receipt::*;

/// Column marker for promotion rows on type-one receipts.
pub const PROMO_MARKER: &str = "AKT";
/// Currency marker that identifies type-one receipts.
pub const CURRENCY_MARKER: &str = "CHF";
