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

//! API to get a page of records.

use crate::model::Resource;
use crate::rest::ResourceState;
use axum::Json;
use axum::extract::{RawQuery, State};
use axum::response::IntoResponse;
use mrt_core::model::Pagination;
use mrt_core::rest::{EmptyBody, RestError};

/// Raw pagination parameters.  Values that are not numbers are ignored.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct PageQuery {
    /// The 1-based page number.
    page: Option<String>,

    /// Maximum number of records to return.
    limit: Option<String>,
}

impl PageQuery {
    /// Extracts the pagination parameters from a raw query string.
    ///
    /// Parsing never fails: undecodable input yields no parameters, repeated keys keep their
    /// first value, and unknown keys are ignored.
    fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .and_then(|raw| serde_urlencoded::from_str::<Vec<(String, String)>>(raw).ok())
            .unwrap_or_default();

        let mut query = PageQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut query.page,
                "limit" => &mut query.limit,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// API handler.
pub(crate) async fn handler<R: Resource>(
    State(state): State<ResourceState<R>>,
    RawQuery(raw_query): RawQuery,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let query = PageQuery::parse(raw_query.as_deref());
    let pagination = Pagination::from_query(
        query.page.as_deref(),
        query.limit.as_deref(),
        state.max_page_size,
    );

    let ctx = state.context();
    match state.service.get_all(&ctx, pagination).await {
        Ok(records) => Ok(Json(records)),
        Err(_) => Err(RestError::InternalError(format!("Failed to get all {} data", R::NAME))),
    }
}
