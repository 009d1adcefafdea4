// MRT
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! The `Pagination` data type.

/// Page number used when the client does not request one.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the client does not request one or requests a non-positive one.
pub const DEFAULT_LIMIT: i64 = 10;

/// Offset/limit pagination parameters for listing a collection.
///
/// Pages are 1-based.  The page number is not validated: pages below 1 yield a zero offset, which
/// is what document stores do when asked to skip a negative number of documents.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pagination {
    /// The 1-based page number.
    page: i64,

    /// Maximum number of records in the page.  Always positive.
    limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT }
    }
}

impl Pagination {
    /// Creates a new set of pagination parameters, capping `limit` at `max_limit`.
    pub fn new(page: i64, limit: i64, max_limit: i64) -> Self {
        let limit = if limit <= 0 { DEFAULT_LIMIT } else { limit };
        Self { page, limit: limit.min(max_limit.max(1)) }
    }

    /// Creates a new set of pagination parameters from the raw values of a query string.
    ///
    /// Missing or non-numeric values fall back to `DEFAULT_PAGE` and `DEFAULT_LIMIT`.
    pub fn from_query(page: Option<&str>, limit: Option<&str>, max_limit: i64) -> Self {
        let parse = |value: Option<&str>, default: i64| {
            value.and_then(|v| v.trim().parse::<i64>().ok()).unwrap_or(default)
        };
        Self::new(parse(page, DEFAULT_PAGE), parse(limit, DEFAULT_LIMIT), max_limit)
    }

    /// Returns the 1-based page number.
    pub fn page(&self) -> i64 {
        self.page
    }

    /// Returns the maximum number of records to return.
    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Returns the number of records to skip before the page starts.
    pub fn offset(&self) -> u64 {
        let offset = self.page.saturating_sub(1).saturating_mul(self.limit);
        u64::try_from(offset).unwrap_or(0)
    }
}
