//! Opaque page cursors for catalog pagination.
//!
//! A cursor is the standard-alphabet base64 encoding of its parts joined by
//! [`DELIMITER`]. Catalog pages nest two levels:
//!
//! ```text
//! inner = base64(key_1 || key_2 || ... || key_n)
//! page  = base64(inner || total || page_size)    -- total known
//! page  = base64(inner || page_size)             -- total unknown
//! ```
//!
//! `page_size` is always the last field. A value that itself contains the
//! delimiter cannot round-trip; such keys are not supported.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::CoreError;

/// Separator placed between cursor parts before encoding.
pub const DELIMITER: &str = "||";

/// Wildcard value that collapses a cursor to "first page".
const WILDCARD: &str = "*";

/// Encode cursor parts into an opaque token.
///
/// Returns `None` (no cursor, i.e. the first page) when `parts` is empty or
/// the first part is absent or the `*` wildcard.
pub fn encode_cursor<S: AsRef<str>>(parts: &[Option<S>]) -> Option<String> {
    match parts.first() {
        None | Some(None) => return None,
        Some(Some(first)) if first.as_ref() == WILDCARD => return None,
        _ => {}
    }

    let joined = parts
        .iter()
        .map(|p| p.as_ref().map_or("", |s| s.as_ref()))
        .collect::<Vec<&str>>()
        .join(DELIMITER);

    Some(STANDARD.encode(joined))
}

/// Decode an opaque token back into its parts.
///
/// Absent or empty input yields an empty list. Input that is not valid
/// base64 or does not decode to UTF-8 is a validation error.
pub fn decode_cursor(cursor: Option<&str>) -> Result<Vec<String>, CoreError> {
    let Some(cursor) = cursor.filter(|c| !c.is_empty()) else {
        return Ok(Vec::new());
    };

    let bytes = STANDARD
        .decode(cursor)
        .map_err(|_| malformed("not valid base64"))?;
    let text = String::from_utf8(bytes).map_err(|_| malformed("not valid UTF-8"))?;

    Ok(text.split(DELIMITER).map(str::to_string).collect())
}

// ---------------------------------------------------------------------------
// Page cursor
// ---------------------------------------------------------------------------

/// Decoded position of a catalog page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    /// Sort-key values of the last row on the previous page.
    pub key: Vec<String>,
    /// Total number of matching rows, counted on the first page.
    pub total: Option<i64>,
    /// Page size fixed by the first request.
    pub page_size: i64,
}

impl PageCursor {
    /// Encode into the nested wire format. `None` when the key collapses.
    pub fn encode(&self) -> Option<String> {
        let inner = encode_cursor(&self.key.iter().map(Some).collect::<Vec<_>>())?;

        let mut parts = vec![Some(inner)];
        if let Some(total) = self.total {
            parts.push(Some(total.to_string()));
        }
        parts.push(Some(self.page_size.to_string()));

        encode_cursor(&parts)
    }

    /// Decode a page cursor produced by [`PageCursor::encode`].
    pub fn decode(cursor: &str) -> Result<Self, CoreError> {
        let outer = decode_cursor(Some(cursor))?;

        let (inner, total, page_size) = match outer.as_slice() {
            [inner, page_size] => (inner, None, page_size),
            [inner, total, page_size] => (inner, Some(total), page_size),
            _ => return Err(malformed("unexpected number of fields")),
        };

        let page_size: i64 = page_size
            .parse()
            .map_err(|_| malformed("page size is not a number"))?;
        if page_size < 1 {
            return Err(malformed("page size must be positive"));
        }

        let total = total
            .map(|t| t.parse::<i64>())
            .transpose()
            .map_err(|_| malformed("total is not a number"))?;

        let key = decode_cursor(Some(inner))?;
        if key.is_empty() {
            return Err(malformed("missing sort key"));
        }

        Ok(Self {
            key,
            total,
            page_size,
        })
    }
}

fn malformed(reason: &str) -> CoreError {
    CoreError::Validation(format!("Malformed page cursor: {reason}"))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn round_trips_plain_parts() {
        let token = encode_cursor(&[Some("SWT"), Some("KEYS"), Some("500")]).unwrap();
        let parts = decode_cursor(Some(&token)).unwrap();
        assert_eq!(parts, vec!["SWT", "KEYS", "500"]);
    }

    #[test]
    fn uses_standard_base64_of_joined_parts() {
        let token = encode_cursor(&[Some("a"), Some("b")]).unwrap();
        assert_eq!(token, STANDARD.encode("a||b"));
    }

    #[test]
    fn wildcard_or_missing_first_part_collapses() {
        assert_eq!(encode_cursor(&[Some("*"), Some("x")]), None);
        assert_eq!(encode_cursor::<&str>(&[None, Some("x")]), None);
        assert_eq!(encode_cursor::<&str>(&[]), None);
    }

    #[test]
    fn wildcard_in_later_part_is_kept() {
        let token = encode_cursor(&[Some("SWT"), Some("*")]).unwrap();
        assert_eq!(decode_cursor(Some(&token)).unwrap(), vec!["SWT", "*"]);
    }

    #[test]
    fn empty_input_decodes_to_nothing() {
        assert!(decode_cursor(None).unwrap().is_empty());
        assert!(decode_cursor(Some("")).unwrap().is_empty());
    }

    #[test]
    fn garbage_is_rejected() {
        assert_matches!(decode_cursor(Some("!!not base64!!")), Err(CoreError::Validation(_)));
    }

    #[test]
    fn page_cursor_round_trip_with_total() {
        let cursor = PageCursor {
            key: vec!["SWT".into(), "PROJ-0499".into()],
            total: Some(1000),
            page_size: 500,
        };
        let token = cursor.encode().unwrap();
        assert_eq!(PageCursor::decode(&token).unwrap(), cursor);
    }

    #[test]
    fn page_cursor_round_trip_without_total() {
        let cursor = PageCursor {
            key: vec!["LRL".into()],
            total: None,
            page_size: 25,
        };
        let token = cursor.encode().unwrap();
        assert_eq!(PageCursor::decode(&token).unwrap(), cursor);
    }

    #[test]
    fn page_size_is_last_field() {
        let cursor = PageCursor {
            key: vec!["SWT".into(), "A".into()],
            total: Some(7),
            page_size: 3,
        };
        let outer = decode_cursor(Some(&cursor.encode().unwrap())).unwrap();
        assert_eq!(outer.last().map(String::as_str), Some("3"));
        assert_eq!(outer[1], "7");
    }

    #[test]
    fn page_cursor_rejects_bad_page_size() {
        let token = encode_cursor(&[Some(STANDARD.encode("SWT||A")), Some("zero".into())]).unwrap();
        assert_matches!(PageCursor::decode(&token), Err(CoreError::Validation(_)));

        let token = encode_cursor(&[Some(STANDARD.encode("SWT||A")), Some("0".into())]).unwrap();
        assert_matches!(PageCursor::decode(&token), Err(CoreError::Validation(_)));
    }

    #[test]
    fn page_cursor_rejects_too_many_fields() {
        let token = encode_cursor(&[Some("a"), Some("b"), Some("c"), Some("d")]).unwrap();
        assert_matches!(PageCursor::decode(&token), Err(CoreError::Validation(_)));
    }
}
