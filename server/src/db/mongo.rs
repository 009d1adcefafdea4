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

//! Implementation of the database abstraction using MongoDB.

use crate::model::Resource;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, Document, doc};
use mrt_core::db::mongo::{MongoExecutor, map_mongo_error};
use mrt_core::db::{DbError, DbResult};
use mrt_core::model::{DocId, Pagination};

/// Converts a `record` into the document to store, dropping its identifier.
///
/// The identifier lives in the `_id` field, which MongoDB manages on its own.
fn to_document<R: Resource>(record: &R) -> DbResult<Document> {
    let mut doc = bson::to_document(record).map_err(|e| {
        DbError::DataIntegrityError(format!("Cannot serialize record for storage: {}", e))
    })?;
    doc.remove("id");
    Ok(doc)
}

/// Converts a stored `doc` into a record, exposing its `_id` as the record's identifier.
fn from_document<R: Resource>(mut doc: Document) -> DbResult<R> {
    let oid = match doc.remove("_id") {
        Some(Bson::ObjectId(oid)) => oid,
        Some(other) => {
            return Err(DbError::DataIntegrityError(format!(
                "Stored document has a non-ObjectId identifier: {}",
                other
            )));
        }
        None => {
            return Err(DbError::DataIntegrityError(
                "Stored document has no identifier".to_owned(),
            ));
        }
    };
    doc.insert("id", oid.to_hex());
    bson::from_document(doc).map_err(|e| DbError::DataIntegrityError(e.to_string()))
}

/// Builds a filter that matches the document identified by `id`.
fn by_id(id: &DocId) -> Document {
    doc! { "_id": ObjectId::from(*id) }
}

pub(super) async fn insert_record<R: Resource>(
    ex: &mut MongoExecutor,
    collection: &str,
    record: &R,
) -> DbResult<DocId> {
    let result =
        ex.collection(collection).insert_one(to_document(record)?).await.map_err(map_mongo_error)?;
    match result.inserted_id.as_object_id() {
        Some(oid) => Ok(DocId::from(oid)),
        None => Err(DbError::BackendError(format!(
            "Insertion returned a non-ObjectId identifier: {}",
            result.inserted_id
        ))),
    }
}

pub(super) async fn find_records<R: Resource>(
    ex: &mut MongoExecutor,
    collection: &str,
    pagination: Pagination,
) -> DbResult<Vec<R>> {
    let mut cursor = ex
        .collection(collection)
        .find(doc! {})
        .skip(pagination.offset())
        .limit(pagination.limit())
        .await
        .map_err(map_mongo_error)?;

    let mut records = vec![];
    while let Some(doc) = cursor.try_next().await.map_err(map_mongo_error)? {
        records.push(from_document(doc)?);
    }
    Ok(records)
}

pub(super) async fn find_record<R: Resource>(
    ex: &mut MongoExecutor,
    collection: &str,
    id: &DocId,
) -> DbResult<Option<R>> {
    let maybe_doc =
        ex.collection(collection).find_one(by_id(id)).await.map_err(map_mongo_error)?;
    match maybe_doc {
        None => Ok(None),
        Some(doc) => Ok(Some(from_document(doc)?)),
    }
}

pub(super) async fn replace_record<R: Resource>(
    ex: &mut MongoExecutor,
    collection: &str,
    id: &DocId,
    record: &R,
) -> DbResult<()> {
    ex.collection(collection)
        .replace_one(by_id(id), to_document(record)?)
        .await
        .map_err(map_mongo_error)?;
    Ok(())
}

pub(super) async fn delete_record(
    ex: &mut MongoExecutor,
    collection: &str,
    id: &DocId,
) -> DbResult<()> {
    ex.collection(collection).delete_one(by_id(id)).await.map_err(map_mongo_error)?;
    Ok(())
}
