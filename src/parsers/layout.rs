use crate::error::{Error, Result};
use crate::models::{ReceiptLayout, CURRENCY_MARKER};

/// Pick the decoder for a receipt body. The first line carrying the currency
/// marker decides; later lines are never consulted.
pub fn classify_layout(text: &str) -> Result<ReceiptLayout> {
    if text.trim().is_empty() {
        return Err(Error::decode("receipt text is empty"));
    }

    let layout = if text.lines().any(|line| line.contains(CURRENCY_MARKER)) {
        ReceiptLayout::TypeOne
    } else {
        ReceiptLayout::TypeTwo
    };

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_marker_anywhere_means_type_one() {
        let text = "Bananen\n   2 x 1.20   2.40\nTotal   12.90 CHF\n";
        assert_eq!(classify_layout(text).unwrap(), ReceiptLayout::TypeOne);
        assert_eq!(classify_layout("12.90 CHF").unwrap(), ReceiptLayout::TypeOne);
    }

    #[test]
    fn no_marker_means_type_two() {
        let text = "Artikelbezeichnung  Menge  Preis  Aktion  Total\nBrot  1  2.90  2.90\n";
        assert_eq!(classify_layout(text).unwrap(), ReceiptLayout::TypeTwo);
    }

    #[test]
    fn blank_text_is_a_decode_error() {
        let err = classify_layout(" \n\t\n").unwrap_err();
        assert!(err.is_decode_error());
    }
}
