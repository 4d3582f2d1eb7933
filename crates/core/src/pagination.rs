//! Keyset catalog pagination.
//!
//! A catalog page holds at most `page_size` items ordered by a multi-column
//! sort key. A full page carries a cursor for the next one; the page after
//! the last full page is the terminal page (possibly empty) with no cursor.
//! Continuation pages resume strictly after the last key of the previous
//! page, so rows inserted behind the cursor are never seen and no row is
//! returned twice.

use serde::Serialize;

use crate::cursor::PageCursor;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Page size limits
// ---------------------------------------------------------------------------

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Default page size of the time-series profile, parser and instance catalogs.
pub const DEFAULT_PROFILE_PAGE_SIZE: i64 = 500;

/// Upper bound for a requested page size.
pub const MAX_PAGE_SIZE: i64 = 500;

/// Clamp a requested page size to `[1, max]`, defaulting when absent.
pub fn clamp_page_size(page_size: Option<i64>, default: i64, max: i64) -> i64 {
    page_size.unwrap_or(default).clamp(1, max.max(1))
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A resolved page request: either the first page or a continuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// The cursor this request was resolved from, echoed back as `page`.
    pub cursor: Option<String>,
    /// Sort key of the last row already returned. `None` on the first page.
    pub after: Option<Vec<String>>,
    pub page_size: i64,
    /// Total carried by the cursor. Counted by the caller on the first page.
    pub total: Option<i64>,
}

impl PageRequest {
    /// Resolve the `page` / `page-size` query pair.
    ///
    /// A cursor's embedded page size overrides `page_size`.
    pub fn resolve(
        cursor: Option<&str>,
        page_size: Option<i64>,
        default: i64,
        max: i64,
    ) -> Result<Self, CoreError> {
        match cursor.filter(|c| !c.is_empty()) {
            None => Ok(Self::first(clamp_page_size(page_size, default, max))),
            Some(token) => {
                let decoded = PageCursor::decode(token)?;
                Ok(Self {
                    cursor: Some(token.to_string()),
                    after: Some(decoded.key),
                    page_size: decoded.page_size.min(max.max(1)),
                    total: decoded.total,
                })
            }
        }
    }

    /// A first-page request.
    pub fn first(page_size: i64) -> Self {
        Self {
            cursor: None,
            after: None,
            page_size,
            total: None,
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.after.is_none()
    }

    /// Check that a continuation key has the arity the catalog sorts by.
    pub fn after_key(&self, arity: usize) -> Result<Option<&[String]>, CoreError> {
        match &self.after {
            None => Ok(None),
            Some(key) if key.len() == arity => Ok(Some(key.as_slice())),
            Some(key) => Err(CoreError::Validation(format!(
                "Malformed page cursor: expected {arity} key fields, found {}",
                key.len()
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// One page of a catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor of this page (`None` on the first page).
    pub page: Option<String>,
    /// Cursor of the next page (`None` on the terminal page).
    pub next_page: Option<String>,
    pub page_size: i64,
    pub total: Option<i64>,
}

impl<T> Page<T> {
    /// Assemble a page from rows already fetched in sort-key order.
    ///
    /// `total` overrides the request's total (counted on the first page).
    pub fn from_rows<F>(rows: Vec<T>, request: &PageRequest, total: Option<i64>, key: F) -> Self
    where
        F: Fn(&T) -> Vec<String>,
    {
        let total = total.or(request.total);
        let next_page = match rows.last() {
            Some(last) if rows.len() as i64 == request.page_size => PageCursor {
                key: key(last),
                total,
                page_size: request.page_size,
            }
            .encode(),
            _ => None,
        };

        Self {
            items: rows,
            page: request.cursor.clone(),
            next_page,
            page_size: request.page_size,
            total,
        }
    }
}

/// Paginate an in-memory collection already sorted by `key`.
///
/// Uses the same strictly-greater-than continuation rule as the SQL catalogs.
pub fn paginate<T, F>(sorted: &[T], request: &PageRequest, key: F) -> Page<T>
where
    T: Clone,
    F: Fn(&T) -> Vec<String>,
{
    let start = match &request.after {
        None => 0,
        Some(after) => sorted.partition_point(|item| key(item).as_slice() <= after.as_slice()),
    };
    let total = request.is_first_page().then_some(sorted.len() as i64);
    let size = usize::try_from(request.page_size).unwrap_or(usize::MAX);
    let rows = sorted.iter().skip(start).take(size).cloned().collect();

    Page::from_rows(rows, request, total, key)
}
