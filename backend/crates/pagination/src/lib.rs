//! Offset pagination primitives shared by directory list endpoints.
//!
//! Purpose: keep page-size clamping, sort direction defaults and the page
//! envelope in one place so every list query applies identical bounds.
//!
//! Public surface:
//! - [`PaginationLimits`] — configured default and maximum page sizes.
//! - [`PageWindow`] — clamped `limit`/`offset` pair ready for a query.
//! - [`SortDirection`] — ascending or descending order, newest first by
//!   default.
//! - [`Page`] — one page of items plus the total across all pages.

use serde::{Deserialize, Serialize};

/// Page size used when a request omits the limit.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a request may ask for.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Errors raised when constructing [`PaginationLimits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaginationLimitsError {
    /// The default page size was zero or negative.
    #[error("default page size must be positive, got {value}")]
    NonPositiveDefault {
        /// Rejected default page size.
        value: i64,
    },
    /// The maximum page size was zero or negative.
    #[error("maximum page size must be positive, got {value}")]
    NonPositiveMaximum {
        /// Rejected maximum page size.
        value: i64,
    },
    /// The default page size exceeded the maximum.
    #[error("default page size {default} exceeds maximum page size {max}")]
    DefaultExceedsMaximum {
        /// Requested default page size.
        default: i64,
        /// Requested maximum page size.
        max: i64,
    },
}

/// Server-side bounds applied to every paginated request.
///
/// ## Invariants
/// - `0 < default_limit <= max_limit`.
///
/// # Examples
/// ```
/// use pagination::PaginationLimits;
///
/// let limits = PaginationLimits::new(10, 50).expect("valid limits");
/// let window = limits.window(Some(500), Some(-3));
/// assert_eq!(window.limit(), 50);
/// assert_eq!(window.offset(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationLimits {
    default_limit: i64,
    max_limit: i64,
}

impl PaginationLimits {
    /// Validate and construct pagination limits.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationLimitsError`] when either size is not positive or
    /// the default exceeds the maximum.
    pub const fn new(default_limit: i64, max_limit: i64) -> Result<Self, PaginationLimitsError> {
        if default_limit <= 0 {
            return Err(PaginationLimitsError::NonPositiveDefault {
                value: default_limit,
            });
        }
        if max_limit <= 0 {
            return Err(PaginationLimitsError::NonPositiveMaximum { value: max_limit });
        }
        if default_limit > max_limit {
            return Err(PaginationLimitsError::DefaultExceedsMaximum {
                default: default_limit,
                max: max_limit,
            });
        }
        Ok(Self {
            default_limit,
            max_limit,
        })
    }

    /// Page size applied when a request omits the limit.
    #[must_use]
    pub const fn default_limit(&self) -> i64 {
        self.default_limit
    }

    /// Largest page size a request can obtain.
    #[must_use]
    pub const fn max_limit(&self) -> i64 {
        self.max_limit
    }

    /// Clamp caller-supplied values into a bounded window.
    ///
    /// A missing, zero or negative limit falls back to the default; a limit
    /// above the maximum is clamped to the maximum. A missing or negative
    /// offset becomes zero.
    #[must_use]
    pub fn window(&self, limit: Option<i64>, offset: Option<i64>) -> PageWindow {
        let limit = match limit {
            Some(requested) if requested > 0 => requested.min(self.max_limit),
            _ => self.default_limit,
        };
        let offset = offset.unwrap_or(0).max(0);
        PageWindow { limit, offset }
    }
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_SIZE,
            max_limit: MAX_PAGE_SIZE,
        }
    }
}

/// A clamped `LIMIT`/`OFFSET` pair.
///
/// Only [`PaginationLimits::window`] constructs windows, so a window's limit
/// is always positive and its offset never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    limit: i64,
    offset: i64,
}

impl PageWindow {
    /// Maximum number of rows the page may hold.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of matching rows skipped before the page starts.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.offset
    }
}

/// Ordering applied to the sort column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest values first.
    Ascending,
    /// Largest values first; newest rows lead when sorting by time.
    #[default]
    Descending,
}

impl SortDirection {
    /// Resolve an optional `reverse` flag into a direction.
    ///
    /// An absent flag keeps the descending default.
    ///
    /// # Examples
    /// ```
    /// use pagination::SortDirection;
    ///
    /// assert_eq!(SortDirection::from_reverse(None), SortDirection::Descending);
    /// assert_eq!(SortDirection::from_reverse(Some(false)), SortDirection::Ascending);
    /// ```
    #[must_use]
    pub const fn from_reverse(reverse: Option<bool>) -> Self {
        match reverse {
            Some(false) => Self::Ascending,
            Some(true) | None => Self::Descending,
        }
    }
}

/// One page of results together with the total match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in query order.
    pub items: Vec<T>,
    /// Number of matching rows across every page.
    pub total: u64,
}

impl<T> Page<T> {
    /// Build a page from its items and the overall total.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    /// A page with no items and a zero total.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}
