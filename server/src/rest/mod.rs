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

//! Entry point to the REST server.

use crate::ServerOptions;
use crate::driver::{Driver, Service};
use crate::model::Resource;
use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use log::info;
use mrt_core::context::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::CorsLayer;

mod record_delete;
mod record_get;
mod record_put;
mod records_get;
mod records_post;
mod root_get;
#[cfg(test)]
mod testutils;

/// State shared by the handlers of the APIs of one record type.
pub(crate) struct ResourceState<R: Resource> {
    /// Service that handles the records.
    service: Arc<dyn Service<R>>,

    /// Maximum time a request may spend waiting for the database.
    request_timeout: Duration,

    /// Upper bound of the page size requested by clients.
    max_page_size: i64,
}

impl<R: Resource> Clone for ResourceState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            request_timeout: self.request_timeout,
            max_page_size: self.max_page_size,
        }
    }
}

impl<R: Resource> ResourceState<R> {
    /// Creates the context for a new request.
    fn context(&self) -> Context {
        Context::with_timeout(self.request_timeout)
    }
}

/// Creates the router for the CRUD APIs of the records of type `R` served under `path`.
fn resource_router<R: Resource>(
    path: &str,
    service: Arc<dyn Service<R>>,
    options: &ServerOptions,
) -> Router {
    use axum::routing::get;

    let state = ResourceState {
        service,
        request_timeout: options.request_timeout,
        max_page_size: options.max_page_size,
    };
    Router::new()
        .route(path, get(records_get::handler::<R>).post(records_post::handler::<R>))
        .route(
            &format!("{}/:id", path),
            get(record_get::handler::<R>)
                .put(record_put::handler::<R>)
                .delete(record_delete::handler::<R>),
        )
        .with_state(state)
}

/// Logs the outcome of every request.
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    response
}

/// Creates the router for the application.
pub(crate) fn app(driver: Driver, options: &ServerOptions) -> Router {
    use axum::routing::get;
    Router::new()
        .route("/", get(root_get::handler))
        .merge(resource_router("/waste-water", driver.waste_water(), options))
        .merge(resource_router("/device", driver.device(), options))
        .merge(resource_router("/sensor", driver.sensor(), options))
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
}
