//! Decoder for the promotion-bearing (type-one) receipt layout.
//!
//! Item boundaries are implicit. A row without a fourth column is a header
//! whose details live in the following rows:
//!
//! ```text
//! AKT  Shampoo                 <- promo header
//!      2 x 3.50      7.00-     <- quantity x price, raw total
//!      Aktion        1.50-     <- promotion discount
//!      Bananen                 <- multi-unit header
//!      2 x 1.20      2.40      <- quantity x price, total
//!      Milch         1.60  1   <- plain row
//! ```
//!
//! Rows are tagged in one forward pass, then promo, multi-unit and plain items
//! are rebuilt in three independent passes over the tagged grid.

use rust_decimal::Decimal;
use tracing::debug;

use super::amount::{parse_amount, parse_quantity_price};
use super::{split_columns, RawLine};
use crate::error::{Error, Result};
use crate::models::{LineItem, CURRENCY_MARKER, PROMO_MARKER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Plain,
    MultiUnit,
    Promo,
}

/// Consumption state of a grid row after the classification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTag {
    Unconsumed,
    PromoDetail,
    PromoDiscount,
    MultiDetail,
}

impl RowKind {
    fn of(row: &RawLine) -> Self {
        let has_fourth = row.column(3).map_or(false, |c| !c.is_empty());
        if has_fourth {
            RowKind::Plain
        } else if row.column(0) == Some(PROMO_MARKER) {
            RowKind::Promo
        } else {
            RowKind::MultiUnit
        }
    }
}

/// Build the token grid: blank and currency lines are dropped, rows without a
/// leading promo marker get an empty first column.
pub fn build_grid(text: &str) -> Vec<RawLine> {
    let mut grid = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() || line.contains(CURRENCY_MARKER) {
            continue;
        }

        let mut tokens = split_columns(line);
        if tokens.first().map(String::as_str) != Some(PROMO_MARKER) {
            tokens.insert(0, String::new());
        }
        grid.push(RawLine::new(grid.len(), tokens));
    }

    grid
}

/// Tag the follow-up rows of every promo and multi-unit header.
pub fn tag_rows(grid: &[RawLine]) -> Result<Vec<RowTag>> {
    let mut tags = vec![RowTag::Unconsumed; grid.len()];

    for (i, row) in grid.iter().enumerate() {
        if tags[i] != RowTag::Unconsumed {
            continue;
        }

        match RowKind::of(row) {
            RowKind::Promo => {
                if i + 2 >= grid.len() {
                    return Err(Error::decode(format!(
                        "promotion on row {} is missing its price or discount row",
                        i
                    )));
                }
                tags[i + 1] = RowTag::PromoDetail;
                tags[i + 2] = RowTag::PromoDiscount;
            }
            RowKind::MultiUnit => {
                if i + 1 >= grid.len() {
                    return Err(Error::decode(format!(
                        "row {} has no quantity row following it",
                        i
                    )));
                }
                tags[i + 1] = RowTag::MultiDetail;
            }
            RowKind::Plain => {}
        }
    }

    Ok(tags)
}

/// Decode type-one receipt text into line items, ordered promo, multi-unit, plain.
pub fn decode_line_items(text: &str) -> Result<Vec<LineItem>> {
    decode_grid(&build_grid(text))
}

/// Rebuild line items from an already padded token grid.
pub fn decode_grid(grid: &[RawLine]) -> Result<Vec<LineItem>> {
    if grid.is_empty() {
        return Err(Error::decode("receipt has no item rows"));
    }

    let tags = tag_rows(grid)?;
    let headers = |kind| unconsumed_rows(grid, &tags, kind);

    let mut items = Vec::with_capacity(grid.len());

    for (pos, header) in headers(RowKind::Promo) {
        let discount_row = &grid[pos + 2];
        let discount = parse_amount(discount_row.require(2, "promotion discount")?)?;
        items.push(grouped_item(header, &grid[pos + 1], discount)?);
    }
    let promo_count = items.len();

    for (pos, header) in headers(RowKind::MultiUnit) {
        items.push(grouped_item(header, &grid[pos + 1], Decimal::ZERO)?);
    }
    let several_count = items.len() - promo_count;

    for (_, row) in headers(RowKind::Plain) {
        let description = row.require(1, "description")?;
        let unit_price = parse_amount(row.require(2, "price")?)?;
        items.push(LineItem::single(description, unit_price));
    }

    debug!(
        "Decoded {} rows into {} promo, {} multi-unit and {} plain items",
        grid.len(),
        promo_count,
        several_count,
        items.len() - promo_count - several_count
    );

    Ok(items)
}

fn unconsumed_rows<'a>(
    grid: &'a [RawLine],
    tags: &'a [RowTag],
    kind: RowKind,
) -> impl Iterator<Item = (usize, &'a RawLine)> + 'a {
    grid.iter()
        .zip(tags.iter())
        .enumerate()
        .filter(move |(_, (row, tag))| **tag == RowTag::Unconsumed && RowKind::of(row) == kind)
        .map(|(pos, (row, _))| (pos, row))
}

/// Rebuild an item from its header row and `"<qty> x <price>"` detail row.
/// The raw total already nets the discount, so the discount is added back.
fn grouped_item(header: &RawLine, detail: &RawLine, discount: Decimal) -> Result<LineItem> {
    let description = header.require(1, "description")?;
    let (quantity, unit_price) = parse_quantity_price(detail.require(1, "quantity x price")?)
        .map_err(|e| Error::decode(format!("row {}: {}", detail.index, e)))?;
    let raw_total = parse_amount(detail.require(2, "total")?)?;
    let total = raw_total.checked_add(discount).ok_or_else(|| {
        Error::decode(format!(
            "row {}: total {} with discount {} is out of range",
            detail.index, raw_total, discount
        ))
    })?;

    Ok(LineItem {
        description: description.to_string(),
        quantity,
        unit_price,
        discount,
        total,
    })
}
