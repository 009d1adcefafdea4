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

//! Test utilities for the REST API.

use crate::ServerOptions;
use crate::db::Repository;
use crate::db::sqlite::testutils::setup;
use crate::driver::{Driver, Service};
use crate::model::Resource;
use crate::rest::app;
use async_trait::async_trait;
use axum::Router;
use mrt_core::context::Context;
use mrt_core::db::{Db, DbError};
use mrt_core::driver::{DriverError, DriverResult};
use mrt_core::model::{DocId, Pagination};
use std::sync::Arc;

pub(crate) struct TestContext {
    db: Arc<dyn Db + Send + Sync>,
    app: Router,
}

impl TestContext {
    pub(crate) async fn setup() -> Self {
        Self::setup_with_options(ServerOptions::default()).await
    }

    pub(crate) async fn setup_with_options(options: ServerOptions) -> Self {
        let db = setup().await;
        let driver = Driver::new(db.clone(), &options.collections);
        let app = app(driver, &options);
        Self { db, app }
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Stores `record` directly in `collection`, bypassing the API.
    pub(crate) async fn create<R: Resource>(&self, collection: &str, record: &R) -> DocId {
        Repository::<R>::new(self.db.clone(), collection)
            .create(&Context::background(), record)
            .await
            .unwrap()
    }

    pub(crate) async fn get<R: Resource>(&self, collection: &str, id: &DocId) -> Option<R> {
        Repository::<R>::new(self.db.clone(), collection)
            .get_by_id(&Context::background(), id)
            .await
            .unwrap()
    }

    pub(crate) async fn count<R: Resource>(&self, collection: &str) -> usize {
        let all = Pagination::new(1, i64::MAX, i64::MAX);
        Repository::<R>::new(self.db.clone(), collection)
            .get_all(&Context::background(), all)
            .await
            .unwrap()
            .len()
    }
}

/// A service whose storage always fails.
pub(crate) struct FailingService;

#[async_trait]
impl<R: Resource> Service<R> for FailingService {
    async fn create(&self, _ctx: &Context, _record: &R) -> DriverResult<DocId> {
        Err(DriverError::BackendError("Database error: boom".to_owned()))
    }

    async fn get_all(&self, _ctx: &Context, _pagination: Pagination) -> DriverResult<Vec<R>> {
        Err(DriverError::BackendError("Database error: boom".to_owned()))
    }

    async fn get_by_id(&self, _ctx: &Context, _id: &DocId) -> DriverResult<Option<R>> {
        Err(DriverError::BackendError("Database error: boom".to_owned()))
    }

    async fn update(&self, _ctx: &Context, _id: &DocId, _record: &R) -> DriverResult<()> {
        Err(DriverError::BackendError("Database error: boom".to_owned()))
    }

    async fn delete(&self, _ctx: &Context, _id: &DocId) -> DriverResult<()> {
        Err(DriverError::BackendError("Database error: boom".to_owned()))
    }
}

/// Creates an app where every storage operation fails.
pub(crate) fn failing_app() -> Router {
    let driver = Driver::from_services(
        Arc::new(FailingService),
        Arc::new(FailingService),
        Arc::new(FailingService),
    );
    app(driver, &ServerOptions::default())
}

/// A service whose storage never answers, so every operation runs until the deadline.
pub(crate) struct StalledService;

impl StalledService {
    /// Waits for the deadline of `ctx` to expire.
    async fn stall<T>(ctx: &Context) -> DriverResult<T> {
        ctx.run(futures::future::pending::<DriverResult<T>>()).await.map_err(DbError::from)?
    }
}

#[async_trait]
impl<R: Resource> Service<R> for StalledService {
    async fn create(&self, ctx: &Context, _record: &R) -> DriverResult<DocId> {
        Self::stall(ctx).await
    }

    async fn get_all(&self, ctx: &Context, _pagination: Pagination) -> DriverResult<Vec<R>> {
        Self::stall(ctx).await
    }

    async fn get_by_id(&self, ctx: &Context, _id: &DocId) -> DriverResult<Option<R>> {
        Self::stall(ctx).await
    }

    async fn update(&self, ctx: &Context, _id: &DocId, _record: &R) -> DriverResult<()> {
        Self::stall(ctx).await
    }

    async fn delete(&self, ctx: &Context, _id: &DocId) -> DriverResult<()> {
        Self::stall(ctx).await
    }
}

/// Creates an app configured with `options` where no storage operation ever completes.
pub(crate) fn stalled_app(options: ServerOptions) -> Router {
    let driver = Driver::from_services(
        Arc::new(StalledService),
        Arc::new(StalledService),
        Arc::new(StalledService),
    );
    app(driver, &options)
}
