//! Conversion between typed records and store items.
//!
//! Pure functions, testable without a store.

use aws_sdk_dynamodb::types::AttributeValue;
use thiserror::Error;

use crate::storage::{Item, KeySchema, Result, StorageError};

/// A typed record that can be stored in a table.
///
/// The gateway only talks to records through this trait, so adding
/// attributes to a record never touches the gateway.
pub trait Record: Sized + Send + Sync {
    /// Name used in errors and log lines.
    const ENTITY_TYPE: &'static str;

    /// Key schema of the table that holds this record.
    fn key_schema() -> KeySchema;

    /// Every stored attribute, key attributes included. Used as the scan projection.
    fn attribute_names() -> Vec<&'static str>;

    /// An item holding exactly the key attributes.
    fn encode_key(&self) -> Result<Item>;

    /// An item holding every attribute.
    fn encode_full(&self) -> Result<Item>;

    /// Inverse of [`Record::encode_full`].
    fn decode_item(item: &Item) -> Result<Self>;

    /// Human readable key, e.g. for not-found errors.
    fn key_display(&self) -> String;
}

/// Encode a string attribute.
pub fn string_value(value: &str) -> AttributeValue {
    AttributeValue::S(value.to_string())
}

/// Most significant digits a stored number can carry.
pub const MAX_NUMBER_DIGITS: usize = 38;

/// Why a string cannot be stored as a number.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NumberError {
    #[error("is not a number")]
    NotANumber,
    #[error("has more than 38 significant digits")]
    TooPrecise,
    #[error("is outside the range the store can hold")]
    OutOfRange,
}

/// Canonical text of a decimal number, the way the store hands numbers back.
///
/// Numbers compare by value in the store, so `1`, `1.0`, `01` and `1e0`
/// all become `1`. Exponents are expanded, trailing fractional zeros and
/// leading zeros are dropped and `-0` becomes `0`. Magnitudes must lie in
/// `1E-130 ..= 9.99..E+125` with at most [`MAX_NUMBER_DIGITS`] significant digits.
pub fn canonical_number(value: &str) -> std::result::Result<String, NumberError> {
    let (negative, unsigned) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(idx) => (&unsigned[..idx], Some(&unsigned[idx + 1..])),
        None => (unsigned, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (mantissa, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty())
        || !all_digits(int_part)
        || !all_digits(frac_part)
    {
        return Err(NumberError::NotANumber);
    }

    let exponent: i64 = match exponent {
        None => 0,
        Some(text) => {
            let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
            if digits.is_empty() || !all_digits(digits) {
                return Err(NumberError::NotANumber);
            }
            // Anything this long is far outside the store's range.
            text.parse().map_err(|_| NumberError::OutOfRange)?
        }
    };

    // value = digits * 10^scale
    let digits = format!("{int_part}{frac_part}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok("0".to_string());
    }
    let significant = digits.trim_end_matches('0');
    let scale = exponent
        .checked_sub(frac_part.len() as i64)
        .and_then(|s| s.checked_add((digits.len() - significant.len()) as i64))
        .ok_or(NumberError::OutOfRange)?;

    if significant.len() > MAX_NUMBER_DIGITS {
        return Err(NumberError::TooPrecise);
    }
    let magnitude = significant.len() as i64 - 1 + scale;
    if !(-130..=125).contains(&magnitude) {
        return Err(NumberError::OutOfRange);
    }

    let mut canonical = String::new();
    if negative {
        canonical.push('-');
    }
    if scale >= 0 {
        canonical.push_str(significant);
        canonical.extend(std::iter::repeat('0').take(scale as usize));
    } else {
        let point = significant.len() as i64 + scale;
        if point > 0 {
            let (whole, fraction) = significant.split_at(point as usize);
            canonical.push_str(whole);
            canonical.push('.');
            canonical.push_str(fraction);
        } else {
            canonical.push_str("0.");
            canonical.extend(std::iter::repeat('0').take((-point) as usize));
            canonical.push_str(significant);
        }
    }

    Ok(canonical)
}

/// Encode a number attribute in canonical form.
///
/// Fails with [`StorageError::Encoding`] when the store cannot hold `value`.
pub fn number_value(field: &str, value: &str) -> Result<AttributeValue> {
    canonical_number(value)
        .map(AttributeValue::N)
        .map_err(|e| StorageError::Encoding(format!("{field} '{value}' {e}")))
}

/// The record exactly as a later read will return it.
pub fn stored_form<R: Record>(record: &R) -> Result<R> {
    R::decode_item(&record.encode_full()?)
}

/// Get a required string attribute.
pub fn get_string(item: &Item, key: &str) -> Result<String> {
    let value = item
        .get(key)
        .ok_or_else(|| StorageError::Decoding(format!("Missing attribute: {key}")))?;

    value.as_s().map(|s| s.to_string()).map_err(|other| {
        StorageError::Decoding(format!("Attribute {key} is not a string: {other:?}"))
    })
}

/// Get a required number attribute, kept in its decimal string form.
pub fn get_number(item: &Item, key: &str) -> Result<String> {
    let value = item
        .get(key)
        .ok_or_else(|| StorageError::Decoding(format!("Missing attribute: {key}")))?;

    value.as_n().map(|n| n.to_string()).map_err(|other| {
        StorageError::Decoding(format!("Attribute {key} is not a number: {other:?}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_value_accepts_decimals() {
        assert_eq!(
            number_value("id", "42").unwrap(),
            AttributeValue::N("42".to_string())
        );
        assert!(number_value("id", "-1.5").is_ok());
        assert!(number_value("id", "1e3").is_ok());
    }

    #[test]
    fn test_number_value_rejects_non_numbers() {
        for bad in ["", "abc", " 1", "NaN", "inf", "1 2", "-", ".", "1e", "1.2.3", "0x10"] {
            assert_eq!(
                number_value("id", bad).unwrap_err(),
                StorageError::Encoding(format!("id '{bad}' is not a number")),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_equal_numbers_share_canonical_form() {
        for same in ["1", "1.0", "01", "+1", "1e0", "10e-1", "0.1E1", "1.000"] {
            assert_eq!(canonical_number(same).unwrap(), "1", "{same:?}");
        }
    }

    #[test]
    fn test_canonical_form() {
        let cases = [
            ("0", "0"),
            ("-0", "0"),
            ("0.000", "0"),
            ("-0.50", "-0.5"),
            (".5", "0.5"),
            ("5.", "5"),
            ("1e3", "1000"),
            ("1200", "1200"),
            ("12.340", "12.34"),
            ("1.5e-3", "0.0015"),
            ("-123.45e1", "-1234.5"),
        ];
        for (input, expected) in cases {
            assert_eq!(canonical_number(input).unwrap(), expected, "{input:?}");
        }
    }

    #[test]
    fn test_number_range_limits() {
        assert!(canonical_number("9.9999999999999999999999999999999999999e125").is_ok());
        assert!(canonical_number("1e-130").is_ok());

        assert_eq!(canonical_number("1e126"), Err(NumberError::OutOfRange));
        assert_eq!(canonical_number("1e200"), Err(NumberError::OutOfRange));
        assert_eq!(canonical_number("1e-131"), Err(NumberError::OutOfRange));
        assert_eq!(
            canonical_number("1e99999999999999999999"),
            Err(NumberError::OutOfRange)
        );
    }

    #[test]
    fn test_number_precision_limit() {
        let thirty_eight = "1".repeat(38);
        let thirty_nine = "1".repeat(39);

        assert_eq!(canonical_number(&thirty_eight).unwrap(), thirty_eight);
        assert_eq!(canonical_number(&format!("{thirty_eight}000")).unwrap().len(), 41);
        assert_eq!(canonical_number(&thirty_nine), Err(NumberError::TooPrecise));
        assert_eq!(
            number_value("id", &thirty_nine).unwrap_err(),
            StorageError::Encoding(format!("id '{thirty_nine}' has more than 38 significant digits"))
        );
    }

    #[test]
    fn test_get_string_missing_field() {
        let item = Item::new();
        assert_eq!(
            get_string(&item, "name").unwrap_err(),
            StorageError::Decoding("Missing attribute: name".to_string())
        );
    }

    #[test]
    fn test_get_string_wrong_type() {
        let mut item = Item::new();
        item.insert("name".to_string(), AttributeValue::N("7".to_string()));
        assert!(matches!(
            get_string(&item, "name"),
            Err(StorageError::Decoding(_))
        ));
    }

    #[test]
    fn test_get_number_wrong_type() {
        let mut item = Item::new();
        item.insert("id".to_string(), AttributeValue::S("7".to_string()));
        assert!(matches!(get_number(&item, "id"), Err(StorageError::Decoding(_))));
    }
}
