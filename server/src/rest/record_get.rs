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

//! API to get a single record.

use crate::model::Resource;
use crate::rest::ResourceState;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use mrt_core::model::DocId;
use mrt_core::rest::{EmptyBody, RestError};

/// API handler.
pub(crate) async fn handler<R: Resource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let id = DocId::parse(id)?;

    let ctx = state.context();
    match state.service.get_by_id(&ctx, &id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(RestError::NotFound("Data not found".to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use crate::model::*;
    use crate::rest::testutils::*;
    use axum::http;
    use mrt_core::model::DocId;
    use mrt_core::rest::testutils::*;

    fn route(resource: &str, id: &str) -> (http::Method, String) {
        (http::Method::GET, format!("/{}/{}", resource, id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let device = Device { name: "pump-1".to_owned(), ..Default::default() };
        let id = context.create("device", &device).await;
        context.create("device", &Device::default()).await;

        let response = OneShotBuilder::new(context.app(), route("device", &id.to_hex()))
            .send_empty()
            .await
            .expect_json::<Device>()
            .await;
        assert_eq!(device.with_id(id), response);
    }

    #[tokio::test]
    async fn test_uppercase_id() {
        let context = TestContext::setup().await;

        let id = context.create("sensor", &Sensor::default()).await;

        let route = route("sensor", &id.to_hex().to_uppercase());
        let response = OneShotBuilder::new(context.app(), route)
            .send_empty()
            .await
            .expect_json::<Sensor>()
            .await;
        assert_eq!(Some(id), response.id);
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        for resource in ["waste-water", "device", "sensor"] {
            OneShotBuilder::new(context.app(), route(resource, &DocId::generate().to_hex()))
                .send_empty()
                .await
                .expect_status(http::StatusCode::NOT_FOUND)
                .expect_error("^Data not found$")
                .await;
        }
    }

    #[tokio::test]
    async fn test_record_of_another_resource_is_not_found() {
        let context = TestContext::setup().await;

        let id = context.create("device", &Device::default()).await;

        OneShotBuilder::new(context.app(), route("sensor", &id.to_hex()))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("^Data not found$")
            .await;
    }

    #[tokio::test]
    async fn test_malformed_id() {
        let context = TestContext::setup().await;

        for resource in ["waste-water", "device", "sensor"] {
            OneShotBuilder::new(context.app(), route(resource, "not-an-id"))
                .send_empty()
                .await
                .expect_status(http::StatusCode::BAD_REQUEST)
                .expect_error("Invalid identifier 'not-an-id'")
                .await;
        }
    }

    #[tokio::test]
    async fn test_storage_error() {
        OneShotBuilder::new(failing_app(), route("waste-water", &DocId::generate().to_hex()))
            .send_empty()
            .await
            .expect_status(http::StatusCode::INTERNAL_SERVER_ERROR)
            .expect_error("boom")
            .await;
    }

    test_payload_must_be_empty!(
        TestContext::setup().await.into_app(),
        route("device", &DocId::generate().to_hex())
    );
}
