//! Flat cart encoding used by the key-value strategy.
//!
//! A cart is stored as `bookId:quantity` entries joined by `%`, e.g.
//! `"7:3%9:1"`. Decoding is lenient: an entry whose quantity is missing or
//! not a number decodes to quantity 0, an entry whose book id is not a number
//! is skipped. Both cases are logged and neither fails the whole load.

use std::collections::BTreeMap;

use tracing::warn;

use crate::catalog::models::BookId;

/// Separates entries.
pub const ENTRY_DELIMITER: &str = "%";
/// Separates the book id from the quantity within an entry.
pub const FIELD_SEPARATOR: &str = ":";

pub fn encode_lines(quantities: &BTreeMap<BookId, u32>) -> String {
    quantities
        .iter()
        .map(|(book_id, quantity)| format!("{book_id}{FIELD_SEPARATOR}{quantity}"))
        .collect::<Vec<_>>()
        .join(ENTRY_DELIMITER)
}

pub fn decode_lines(encoded: &str) -> BTreeMap<BookId, u32> {
    let mut quantities = BTreeMap::new();

    for entry in encoded.split(ENTRY_DELIMITER).filter(|e| !e.is_empty()) {
        let (raw_id, raw_quantity) = match entry.split_once(FIELD_SEPARATOR) {
            Some(fields) => fields,
            None => (entry, ""),
        };

        let Ok(book_id) = raw_id.trim().parse::<BookId>() else {
            warn!(entry, "skipping cart entry with malformed book id");
            continue;
        };

        let quantity = raw_quantity.trim().parse::<u32>().unwrap_or_else(|_| {
            warn!(entry, "cart entry has malformed quantity, treating as 0");
            0
        });

        quantities.insert(book_id, quantity);
    }

    quantities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_in_book_id_order() {
        let quantities = BTreeMap::from([(9, 1), (7, 3)]);
        assert_eq!(encode_lines(&quantities), "7:3%9:1");
        assert_eq!(encode_lines(&BTreeMap::new()), "");
    }

    #[test]
    fn decoding_an_encoded_cart_gives_back_the_mapping() {
        let quantities = BTreeMap::from([(1, 12), (42, 1), (1000, 3)]);
        assert_eq!(decode_lines(&encode_lines(&quantities)), quantities);
    }

    #[test]
    fn malformed_quantity_decodes_to_zero() {
        assert_eq!(decode_lines("7:3%9:x"), BTreeMap::from([(7, 3), (9, 0)]));
    }

    #[test]
    fn missing_separator_decodes_to_zero() {
        assert_eq!(decode_lines("7:3%9"), BTreeMap::from([(7, 3), (9, 0)]));
    }

    #[test]
    fn malformed_book_id_is_skipped() {
        assert_eq!(decode_lines("abc:2%5:1"), BTreeMap::from([(5, 1)]));
    }

    #[test]
    fn empty_value_is_an_empty_cart() {
        assert!(decode_lines("").is_empty());
        assert!(decode_lines("%%").is_empty());
    }
}
