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

//! Database abstraction in terms of the operations needed by the server.
//!
//! Every record type lives in its own collection of documents.  The free functions in this module
//! operate on a collection through an `Executor` and the `Repository` type binds them to a
//! specific collection and record type.

use crate::model::Resource;
use derivative::Derivative;
use mrt_core::context::Context;
use mrt_core::db::{Db, DbResult, Executor};
use mrt_core::model::{DocId, Pagination};
use std::marker::PhantomData;
use std::sync::Arc;

mod mongo;
#[cfg(test)]
pub(crate) mod sqlite;

/// Initializes the database schema.
pub(crate) async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        // Collections are created on first use.
        Executor::Mongo(_) => Ok(()),

        #[cfg(test)]
        Executor::Sqlite(ex) => {
            mrt_core::db::sqlite::run_schema(ex, include_str!("sqlite.sql")).await
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Stores `record` as a new document in `collection` and returns its storage-assigned identifier.
///
/// Any identifier already present in `record` is ignored.
pub(crate) async fn insert_record<R: Resource>(
    ex: &mut Executor,
    collection: &str,
    record: &R,
) -> DbResult<DocId> {
    match ex {
        Executor::Mongo(ex) => mongo::insert_record(ex, collection, record).await,

        #[cfg(test)]
        Executor::Sqlite(ex) => sqlite::insert_record(ex, collection, record).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets one page of the records in `collection`, in storage order.
pub(crate) async fn find_records<R: Resource>(
    ex: &mut Executor,
    collection: &str,
    pagination: Pagination,
) -> DbResult<Vec<R>> {
    match ex {
        Executor::Mongo(ex) => mongo::find_records(ex, collection, pagination).await,

        #[cfg(test)]
        Executor::Sqlite(ex) => sqlite::find_records(ex, collection, pagination).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets the record identified by `id` in `collection`, or `None` if it does not exist.
pub(crate) async fn find_record<R: Resource>(
    ex: &mut Executor,
    collection: &str,
    id: &DocId,
) -> DbResult<Option<R>> {
    match ex {
        Executor::Mongo(ex) => mongo::find_record(ex, collection, id).await,

        #[cfg(test)]
        Executor::Sqlite(ex) => sqlite::find_record(ex, collection, id).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Overwrites the record identified by `id` in `collection` with `record`.
///
/// Fields not present in `record` are lost.  Replacing a record that does not exist is a no-op.
pub(crate) async fn replace_record<R: Resource>(
    ex: &mut Executor,
    collection: &str,
    id: &DocId,
    record: &R,
) -> DbResult<()> {
    match ex {
        Executor::Mongo(ex) => mongo::replace_record(ex, collection, id, record).await,

        #[cfg(test)]
        Executor::Sqlite(ex) => sqlite::replace_record(ex, collection, id, record).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Deletes the record identified by `id` from `collection`.  Deleting a missing record is a no-op.
pub(crate) async fn delete_record(
    ex: &mut Executor,
    collection: &str,
    id: &DocId,
) -> DbResult<()> {
    match ex {
        Executor::Mongo(ex) => mongo::delete_record(ex, collection, id).await,

        #[cfg(test)]
        Executor::Sqlite(ex) => sqlite::delete_record(ex, collection, id).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Access to the records of type `R` stored in one collection.
///
/// Every operation is bounded by the deadline of the `Context` it receives.
#[derive(Derivative)]
#[derivative(Clone(bound = ""))]
pub(crate) struct Repository<R> {
    /// The database holding the collection.
    db: Arc<dyn Db + Send + Sync>,

    /// Name of the collection holding the records.
    collection: Arc<str>,

    /// Marker for the record type.
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Repository<R> {
    /// Creates a new repository for the records in `collection` of `db`.
    pub(crate) fn new<C: Into<Arc<str>>>(db: Arc<dyn Db + Send + Sync>, collection: C) -> Self {
        Self { db, collection: collection.into(), _resource: PhantomData }
    }

    /// Stores a new `record` and returns its identifier.
    pub(crate) async fn create(&self, ctx: &Context, record: &R) -> DbResult<DocId> {
        ctx.run(async {
            let mut ex = self.db.ex().await?;
            insert_record(&mut ex, &self.collection, record).await
        })
        .await?
    }

    /// Gets the records in the page described by `pagination`.
    pub(crate) async fn get_all(&self, ctx: &Context, pagination: Pagination) -> DbResult<Vec<R>> {
        ctx.run(async {
            let mut ex = self.db.ex().await?;
            find_records(&mut ex, &self.collection, pagination).await
        })
        .await?
    }

    /// Gets the record identified by `id`, if any.
    pub(crate) async fn get_by_id(&self, ctx: &Context, id: &DocId) -> DbResult<Option<R>> {
        ctx.run(async {
            let mut ex = self.db.ex().await?;
            find_record(&mut ex, &self.collection, id).await
        })
        .await?
    }

    /// Replaces the record identified by `id` with `record`.
    pub(crate) async fn update(&self, ctx: &Context, id: &DocId, record: &R) -> DbResult<()> {
        ctx.run(async {
            let mut ex = self.db.ex().await?;
            replace_record(&mut ex, &self.collection, id, record).await
        })
        .await?
    }

    /// Deletes the record identified by `id`.
    pub(crate) async fn delete(&self, ctx: &Context, id: &DocId) -> DbResult<()> {
        ctx.run(async {
            let mut ex = self.db.ex().await?;
            delete_record(&mut ex, &self.collection, id).await
        })
        .await?
    }
}
