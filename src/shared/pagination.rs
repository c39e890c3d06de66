//! Pagination Types
//!
//! Cursor pagination (feeds, comments, conversations) and offset
//! pagination (search, recommendations). Cursors are row IDs, passed
//! over the wire as decimal strings.

use super::error::AppError;
use super::snowflake;

/// Default page size when the client omits `limit`
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Hard cap on page size
pub const MAX_PAGE_SIZE: i64 = 100;

/// Position relative to a cursor row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Page immediately preceding the cursor row
    Before(i64),
    /// Page following the cursor row
    After(i64),
}

/// Parsed cursor pagination parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorPagination {
    limit: Option<i64>,
    cursor: Option<Cursor>,
}

impl CursorPagination {
    /// Parse raw query parameters.
    ///
    /// At most one of `before`/`after` may be supplied; a cursor that is
    /// not a decimal ID is rejected.
    pub fn parse(
        limit: Option<i64>,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Result<Self, AppError> {
        if before.is_some() && after.is_some() {
            return Err(AppError::Validation(
                "Only one of 'before' and 'after' may be supplied".into(),
            ));
        }

        let cursor = match (before, after) {
            (Some(raw), None) => Some(Cursor::Before(parse_cursor(raw)?)),
            (None, Some(raw)) => Some(Cursor::After(parse_cursor(raw)?)),
            _ => None,
        };

        Ok(Self { limit, cursor })
    }

    /// First page with an explicit limit
    pub fn first_page(limit: i64) -> Self {
        Self {
            limit: Some(limit),
            cursor: None,
        }
    }

    /// Page after the given row
    pub fn after(cursor_id: i64, limit: i64) -> Self {
        Self {
            limit: Some(limit),
            cursor: Some(Cursor::After(cursor_id)),
        }
    }

    /// Page before the given row
    pub fn before(cursor_id: i64, limit: i64) -> Self {
        Self {
            limit: Some(limit),
            cursor: Some(Cursor::Before(cursor_id)),
        }
    }

    /// Effective page size, clamped to [1, MAX_PAGE_SIZE]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }
}

fn parse_cursor(raw: &str) -> Result<i64, AppError> {
    snowflake::from_string(raw)
        .map_err(|_| AppError::BadRequest(format!("Invalid cursor: {}", raw)))
}

/// Offset pagination parameters (`limit` + `skip`)
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetPagination {
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

impl OffsetPagination {
    /// Effective page size, clamped to [1, MAX_PAGE_SIZE]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Effective row offset, never negative
    pub fn offset(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }
}
