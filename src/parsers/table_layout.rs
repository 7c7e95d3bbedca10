use rust_decimal::Decimal;
use tracing::debug;

use super::amount::{parse_amount, parse_quantity_lenient};
use super::{split_columns, RawLine};
use crate::error::{Error, Result};
use crate::models::LineItem;

/// Header names of the type-two layout that feed the output columns.
const DESCRIPTION_HEADER: &str = "Artikelbezeichnung";
const QUANTITY_HEADER: &str = "Menge";
const PRICE_HEADER: &str = "Preis";
const TOTAL_HEADER: &str = "Total";

/// Position of the optional promotion cell that short rows omit.
const OPTIONAL_COLUMN: usize = 3;

struct Schema {
    width: usize,
    description: usize,
    quantity: usize,
    price: usize,
    total: usize,
}

impl Schema {
    fn from_header(header: &[String]) -> Result<Self> {
        let position = |name: &str| {
            header
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| Error::decode(format!("table header has no {:?} column", name)))
        };

        Ok(Self {
            width: header.len(),
            description: position(DESCRIPTION_HEADER)?,
            quantity: position(QUANTITY_HEADER)?,
            price: position(PRICE_HEADER)?,
            total: position(TOTAL_HEADER)?,
        })
    }

    /// Pad a short row and check it lines up with the header.
    fn fit(&self, mut row: RawLine) -> Result<RawLine> {
        if row.len() + 1 == self.width && self.width > OPTIONAL_COLUMN {
            row.tokens.insert(OPTIONAL_COLUMN, String::new());
        }
        if row.len() != self.width {
            return Err(Error::decode(format!(
                "row {} has {} columns, header has {}",
                row.index,
                row.len(),
                self.width
            )));
        }
        Ok(row)
    }

    fn item(&self, row: &RawLine) -> Result<LineItem> {
        let description = row.require(self.description, "description")?;
        let unit_price = parse_amount(row.require(self.price, "price")?)?;
        let quantity = row
            .column(self.quantity)
            .and_then(parse_quantity_lenient)
            .unwrap_or(Decimal::ONE);
        let total = match row.column(self.total) {
            Some(cell) if !cell.is_empty() => parse_amount(cell)?,
            _ => unit_price,
        };

        Ok(LineItem {
            description: description.to_string(),
            quantity,
            unit_price,
            discount: Decimal::ZERO,
            total,
        })
    }
}

/// Decode a header-driven (type-two) receipt body.
pub fn decode_table_layout(text: &str) -> Result<Vec<LineItem>> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .map(split_columns)
        .ok_or_else(|| Error::decode("receipt has no header row"))?;
    let schema = Schema::from_header(&header)?;

    let items = lines
        .enumerate()
        .map(|(idx, line)| {
            let row = schema.fit(RawLine::new(idx + 1, split_columns(line)))?;
            schema.item(&row)
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Decoded {} table rows against {} header columns", items.len(), schema.width);
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReceiptLayout, ReceiptRecord, RECEIPT_COLUMNS};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const RECEIPT: &str = "\
Artikelbezeichnung   Menge   Preis   Aktion   Total
Ruchbrot              1       2.90             2.90
Bananen               0.850 kg  3.40   0.60-   2.29

Rivella Rot           2       1.95             3.90
";

    #[test]
    fn short_rows_get_an_empty_promotion_cell() {
        let items = decode_table_layout(RECEIPT).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            LineItem {
                description: "Ruchbrot".to_string(),
                quantity: dec!(1),
                unit_price: dec!(2.90),
                discount: Decimal::ZERO,
                total: dec!(2.90),
            }
        );
        assert_eq!(items[1].quantity, dec!(0.850));
        assert_eq!(items[1].total, dec!(2.29));
        assert_eq!(items[2].total, dec!(3.90));
    }

    #[test]
    fn table_view_has_five_columns_and_blank_discounts() {
        let record = ReceiptRecord::new(
            "R1",
            ReceiptLayout::TypeTwo,
            decode_table_layout(RECEIPT).unwrap(),
            None,
        );
        let table = record.table();

        assert_eq!(table.columns, RECEIPT_COLUMNS);
        assert!(table.rows.iter().all(|row| row[3].is_empty()));
    }

    #[test]
    fn missing_header_column_is_rejected() {
        let text = "Artikel   Menge   Preis\nBrot   1   2.90\n";
        assert!(decode_table_layout(text).unwrap_err().is_decode_error());
    }

    #[test]
    fn misaligned_row_is_rejected() {
        let text = "Artikelbezeichnung   Menge   Preis   Aktion   Total\nBrot   2.90\n";
        assert!(decode_table_layout(text).is_err());
    }
}
