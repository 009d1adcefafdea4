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

//! Implementation of the database abstraction using SQLite.
//!
//! Documents are kept as JSON text in a single table keyed by collection and identifier.

use crate::model::Resource;
use futures::TryStreamExt;
use mrt_core::db::sqlite::{SqliteExecutor, map_sqlx_error};
use mrt_core::db::{DbError, DbResult};
use mrt_core::model::{DocId, Pagination};
use serde_json::Value;
use sqlx::Row;

/// Converts a `record` into the JSON text to store, dropping its identifier.
fn to_json<R: Resource>(record: &R) -> DbResult<String> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(ref mut map) = value {
        map.remove("id");
    }
    Ok(serde_json::to_string(&value)?)
}

/// Converts the stored JSON text `doc` of the document `id` into a record.
fn from_json<R: Resource>(id: &str, doc: &str) -> DbResult<R> {
    let mut value: Value = serde_json::from_str(doc)?;
    match value {
        Value::Object(ref mut map) => {
            map.insert("id".to_owned(), Value::String(id.to_owned()));
        }
        _ => {
            return Err(DbError::DataIntegrityError(format!(
                "Stored document {} is not an object",
                id
            )));
        }
    }
    Ok(serde_json::from_value(value)?)
}

pub(super) async fn insert_record<R: Resource>(
    ex: &mut SqliteExecutor,
    collection: &str,
    record: &R,
) -> DbResult<DocId> {
    let id = DocId::generate();

    let query_str = "INSERT INTO documents (collection, id, doc) VALUES (?, ?, ?)";
    sqlx::query(query_str)
        .bind(collection)
        .bind(id.to_hex())
        .bind(to_json(record)?)
        .execute(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    Ok(id)
}

pub(super) async fn find_records<R: Resource>(
    ex: &mut SqliteExecutor,
    collection: &str,
    pagination: Pagination,
) -> DbResult<Vec<R>> {
    let offset = i64::try_from(pagination.offset())
        .map_err(|e| DbError::BackendError(format!("Offset out of range: {}", e)))?;

    let query_str = "
        SELECT id, doc FROM documents
        WHERE collection = ?
        ORDER BY seq
        LIMIT ? OFFSET ?
    ";
    let mut rows = sqlx::query(query_str)
        .bind(collection)
        .bind(pagination.limit())
        .bind(offset)
        .fetch(ex.conn());

    let mut records = vec![];
    while let Some(row) = rows.try_next().await.map_err(map_sqlx_error)? {
        let id: String = row.try_get("id").map_err(map_sqlx_error)?;
        let doc: String = row.try_get("doc").map_err(map_sqlx_error)?;
        records.push(from_json(&id, &doc)?);
    }
    Ok(records)
}

pub(super) async fn find_record<R: Resource>(
    ex: &mut SqliteExecutor,
    collection: &str,
    id: &DocId,
) -> DbResult<Option<R>> {
    let query_str = "SELECT id, doc FROM documents WHERE collection = ? AND id = ?";
    let maybe_row = sqlx::query(query_str)
        .bind(collection)
        .bind(id.to_hex())
        .fetch_optional(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    match maybe_row {
        None => Ok(None),
        Some(row) => {
            let id: String = row.try_get("id").map_err(map_sqlx_error)?;
            let doc: String = row.try_get("doc").map_err(map_sqlx_error)?;
            Ok(Some(from_json(&id, &doc)?))
        }
    }
}

pub(super) async fn replace_record<R: Resource>(
    ex: &mut SqliteExecutor,
    collection: &str,
    id: &DocId,
    record: &R,
) -> DbResult<()> {
    let query_str = "UPDATE documents SET doc = ? WHERE collection = ? AND id = ?";
    let done = sqlx::query(query_str)
        .bind(to_json(record)?)
        .bind(collection)
        .bind(id.to_hex())
        .execute(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    if done.rows_affected() > 1 {
        return Err(DbError::BackendError("Update affected more than one row".to_owned()));
    }
    Ok(())
}

pub(super) async fn delete_record(
    ex: &mut SqliteExecutor,
    collection: &str,
    id: &DocId,
) -> DbResult<()> {
    let query_str = "DELETE FROM documents WHERE collection = ? AND id = ?";
    let done = sqlx::query(query_str)
        .bind(collection)
        .bind(id.to_hex())
        .execute(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    if done.rows_affected() > 1 {
        return Err(DbError::BackendError("Deletion affected more than one row".to_owned()));
    }
    Ok(())
}

/// Test utilities for the SQLite backend.
pub(crate) mod testutils {
    use crate::db::init_schema;
    use mrt_core::db::Db;
    use std::sync::Arc;

    /// Creates an in-memory database with the schema already loaded.
    pub(crate) async fn setup() -> Arc<dyn Db + Send + Sync> {
        let db = Arc::new(mrt_core::db::sqlite::testutils::setup().await);
        init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::generate_db_tests;
    use crate::model::Device;

    generate_db_tests!(testutils::setup().await);

    #[test]
    fn test_to_json_drops_id() {
        let device = Device { name: "pump".to_owned(), ..Default::default() }
            .with_id(DocId::generate());
        let value: Value = serde_json::from_str(&to_json(&device).unwrap()).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(Some("pump"), value.get("name").and_then(Value::as_str));
    }

    #[test]
    fn test_from_json_not_an_object() {
        let err = from_json::<Device>("65a1f0c2e4b0a1b2c3d4e5f6", "[1, 2]").unwrap_err();
        assert_eq!(
            DbError::DataIntegrityError(
                "Stored document 65a1f0c2e4b0a1b2c3d4e5f6 is not an object".to_owned()
            ),
            err
        );
    }

    #[test]
    fn test_from_json_bad_id() {
        let err = from_json::<Device>("xyz", "{}").unwrap_err();
        assert!(matches!(err, DbError::DataIntegrityError(_)));
    }
}
