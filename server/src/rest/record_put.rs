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

//! API to replace an existing record.

use crate::model::Resource;
use crate::rest::ResourceState;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use mrt_core::model::DocId;
use mrt_core::rest::{JsonBody, RestError};

/// API handler.
///
/// The identifier in the path wins over any identifier in the body.
pub(crate) async fn handler<R: Resource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
    JsonBody(record): JsonBody<R>,
) -> Result<impl IntoResponse, RestError> {
    let id = DocId::parse(id)?;

    let ctx = state.context();
    state.service.update(&ctx, &id, &record).await?;
    Ok(Json(record.with_id(id)))
}
