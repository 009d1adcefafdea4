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

//! The `DocId` data type.

use crate::model::{ModelError, ModelResult};
use mongodb::bson::oid::ObjectId;
use serde::de::Visitor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a document as assigned by the storage layer.
///
/// Identifiers are 12-byte values that travel through the API as 24-character hex strings.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DocId(ObjectId);

impl DocId {
    /// Parses an identifier from an untrusted hex string `s`.
    pub fn parse<S: AsRef<str>>(s: S) -> ModelResult<Self> {
        let s = s.as_ref();
        match ObjectId::parse_str(s) {
            Ok(oid) => Ok(Self(oid)),
            Err(e) => Err(ModelError(format!("Invalid identifier '{}': {}", s, e))),
        }
    }

    /// Generates a new unique identifier.  Only backends that cannot assign identifiers on their
    /// own should need this.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Returns the identifier as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl From<ObjectId> for DocId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl From<DocId> for ObjectId {
    fn from(id: DocId) -> Self {
        id.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for DocId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_hex())
    }
}

/// A deserialization visitor for a `DocId`.
struct DocIdVisitor;

impl Visitor<'_> for DocIdVisitor {
    type Value = DocId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a 24-character hex string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        DocId::parse(v).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for DocId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(DocIdVisitor)
    }
}
