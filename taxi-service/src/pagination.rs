//! Fixed-size pagination for list pages
//!
//! Page numbers are 1-based and read from `?page=`. `last` selects the final
//! page. Anything that is not a page of the result set (zero, past the end,
//! not a number) is a 404, while an empty result set still has one page.

use serde::Deserialize;

use crate::error::TaxiError;

/// Records per page on every list view
pub const PAGE_SIZE: i64 = 5;

/// `?page=` query parameter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParam {
    /// Requested page number or `last`
    pub page: Option<String>,
}

/// Splits a result count into pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: i64,
    per_page: i64,
}

impl Paginator {
    /// Paginator over `count` records at [`PAGE_SIZE`] per page
    #[must_use]
    pub const fn new(count: i64) -> Self {
        Self::with_page_size(count, PAGE_SIZE)
    }

    /// Paginator with a custom page size
    #[must_use]
    pub const fn with_page_size(count: i64, per_page: i64) -> Self {
        let per_page = if per_page < 1 { 1 } else { per_page };
        let count = if count < 0 { 0 } else { count };
        Self { count, per_page }
    }

    /// Total number of records
    #[must_use]
    pub const fn count(&self) -> i64 {
        self.count
    }

    /// Number of pages, at least one
    #[must_use]
    pub const fn num_pages(&self) -> i64 {
        if self.count == 0 {
            1
        } else {
            (self.count + self.per_page - 1) / self.per_page
        }
    }

    /// Resolve a requested page
    ///
    /// # Errors
    ///
    /// Returns [`TaxiError::NotFound`] when the page does not exist
    pub fn page(&self, requested: Option<&str>) -> Result<Page, TaxiError> {
        let num_pages = self.num_pages();
        let number = match requested.map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| TaxiError::NotFound(format!("page {raw:?} is not a number")))?,
        };

        if number < 1 || number > num_pages {
            return Err(TaxiError::NotFound(format!("page {number} of {num_pages}")));
        }

        Ok(Page {
            number,
            num_pages,
            count: self.count,
            per_page: self.per_page,
            query: String::new(),
        })
    }
}

/// One resolved page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub number: i64,
    /// Total number of pages
    pub num_pages: i64,
    /// Total number of records
    pub count: i64,
    /// Records per page
    pub per_page: i64,
    query: String,
}

impl Page {
    /// Carry extra query parameters (the search term) into page links
    ///
    /// Pairs with an empty value are skipped.
    #[must_use]
    pub fn with_query<'a, I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in pairs {
            if !value.is_empty() {
                serializer.append_pair(key, value);
            }
        }
        self.query = serializer.finish();
        self
    }

    /// SQL `LIMIT`
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.per_page
    }

    /// SQL `OFFSET`
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    /// Whether the records span more than one page
    #[must_use]
    pub const fn is_paginated(&self) -> bool {
        self.num_pages > 1
    }

    /// Whether a later page exists
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    /// Whether an earlier page exists
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// 1-based index of the first record on this page (0 when empty)
    #[must_use]
    pub const fn start_index(&self) -> i64 {
        if self.count == 0 {
            0
        } else {
            self.offset() + 1
        }
    }

    /// 1-based index of the last record on this page
    #[must_use]
    pub const fn end_index(&self) -> i64 {
        let end = self.number * self.per_page;
        if end > self.count {
            self.count
        } else {
            end
        }
    }

    /// Relative link to page `number`, keeping the extra query
    #[must_use]
    pub fn link(&self, number: i64) -> String {
        if self.query.is_empty() {
            format!("?page={number}")
        } else {
            format!("?page={number}&{}", self.query)
        }
    }

    /// Link to the next page
    #[must_use]
    pub fn next_link(&self) -> String {
        self.link(self.number + 1)
    }

    /// Link to the previous page
    #[must_use]
    pub fn previous_link(&self) -> String {
        self.link(self.number - 1)
    }
}
