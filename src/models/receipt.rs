use once_cell::sync::OnceCell;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output column order shared by both receipt layouts.
pub const RECEIPT_COLUMNS: [&str; 5] = ["description", "quantity", "unit_price", "discount", "total"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiptLayout {
    /// Promotion-bearing layout, recognised by the `CHF` marker.
    TypeOne,
    /// Header-driven column layout.
    TypeTwo,
}

impl fmt::Display for ReceiptLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiptLayout::TypeOne => write!(f, "type-one"),
            ReceiptLayout::TypeTwo => write!(f, "type-two"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Signed correction; promotions carry a negative value.
    pub discount: Decimal,
    pub total: Decimal,
}

impl LineItem {
    pub fn single(description: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity: Decimal::ONE,
            unit_price,
            discount: Decimal::ZERO,
            total: unit_price,
        }
    }
}

/// String table view of a receipt, always five columns in [`RECEIPT_COLUMNS`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptTable {
    pub columns: [&'static str; 5],
    pub rows: Vec<[String; 5]>,
}

impl ReceiptTable {
    fn build(layout: ReceiptLayout, items: &[LineItem]) -> Self {
        let rows = items
            .iter()
            .map(|item| {
                let discount = match layout {
                    ReceiptLayout::TypeOne => item.discount.to_string(),
                    ReceiptLayout::TypeTwo => String::new(),
                };
                [
                    item.description.clone(),
                    item.quantity.to_string(),
                    item.unit_price.to_string(),
                    discount,
                    item.total.to_string(),
                ]
            })
            .collect();

        Self {
            columns: RECEIPT_COLUMNS,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for ReceiptTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.columns.join("\t"))?;
        for row in &self.rows {
            writeln!(f, "{}", row.join("\t"))?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ReceiptRecord {
    pub receipt_id: String,
    pub layout: ReceiptLayout,
    pub line_items: Vec<LineItem>,
    #[serde(skip)]
    raw_pdf: Option<Vec<u8>>,
    #[serde(skip)]
    raw_text: Option<String>,
    #[serde(skip)]
    table: OnceCell<ReceiptTable>,
}

impl ReceiptRecord {
    pub fn new(
        receipt_id: impl Into<String>,
        layout: ReceiptLayout,
        line_items: Vec<LineItem>,
        raw_pdf: Option<Vec<u8>>,
    ) -> Self {
        Self {
            receipt_id: receipt_id.into(),
            layout,
            line_items,
            raw_pdf: raw_pdf.filter(|bytes| !bytes.is_empty()),
            raw_text: None,
            table: OnceCell::new(),
        }
    }

    /// Keep the receipt body the items were decoded from.
    pub fn with_raw_text(mut self, text: impl Into<String>) -> Self {
        self.raw_text = Some(text.into());
        self
    }

    pub fn raw_pdf(&self) -> Option<&[u8]> {
        self.raw_pdf.as_deref()
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref()
    }

    /// Tabular view, built on first access.
    pub fn table(&self) -> &ReceiptTable {
        self.table
            .get_or_init(|| ReceiptTable::build(self.layout, &self.line_items))
    }

    /// Sum of all item totals, `None` when it does not fit a `Decimal`.
    pub fn total(&self) -> Option<Decimal> {
        self.line_items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total))
    }
}
