use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Parse a receipt amount. A trailing `-` marks a credit and negates the value.
pub fn parse_amount(token: &str) -> Result<Decimal> {
    let token = token.trim();
    let (digits, negative) = match token.strip_suffix('-') {
        Some(rest) => (rest.trim_end(), true),
        None => (token, false),
    };

    let cleaned = digits.replace('\'', "");
    let value = Decimal::from_str(&cleaned)
        .map_err(|_| Error::decode(format!("invalid amount {:?}", token)))?;

    Ok(if negative { -value } else { value })
}

/// Split a `"<qty> x <unit_price>"` token into its two decimals.
pub fn parse_quantity_price(token: &str) -> Result<(Decimal, Decimal)> {
    let mut parts = token.split('x');
    let (quantity, price) = match (parts.next(), parts.next(), parts.next()) {
        (Some(q), Some(p), None) => (q.trim(), p.trim()),
        _ => {
            return Err(Error::decode(format!(
                "expected \"<qty> x <price>\", found {:?}",
                token
            )))
        }
    };

    let quantity = Decimal::from_str(&quantity.replace('\'', ""))
        .map_err(|_| Error::decode(format!("invalid quantity in {:?}", token)))?;
    let price = parse_amount(price)?;

    Ok((quantity, price))
}

/// Lenient quantity read used by the table layout, where the column may carry units.
pub fn parse_quantity_lenient(token: &str) -> Option<Decimal> {
    let numeric: String = token
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    Decimal::from_str(&numeric).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn trailing_minus_negates() {
        assert_eq!(parse_amount("7.00-").unwrap(), dec!(-7.00));
        assert_eq!(parse_amount(" 1.50 ").unwrap(), dec!(1.50));
        assert_eq!(parse_amount("1'234.50").unwrap(), dec!(1234.50));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_amount("Milch").is_err());
        assert!(parse_amount("-").is_err());
    }

    #[test]
    fn splits_quantity_and_price() {
        assert_eq!(parse_quantity_price("2 x 3.50").unwrap(), (dec!(2), dec!(3.50)));
        assert_eq!(parse_quantity_price("0.5x12.00").unwrap(), (dec!(0.5), dec!(12.00)));
        assert!(parse_quantity_price("Bananen").is_err());
    }

    #[test]
    fn lenient_quantity_drops_units() {
        assert_eq!(parse_quantity_lenient("0.450 kg"), Some(dec!(0.450)));
        assert_eq!(parse_quantity_lenient("3"), Some(dec!(3)));
        assert_eq!(parse_quantity_lenient(""), None);
    }
}
