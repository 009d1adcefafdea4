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

//! Business logic for the service.

use crate::db::Repository;
use crate::model::{Device, Resource, Sensor, WasteWaterData};
use async_trait::async_trait;
use log::warn;
use mrt_core::context::Context;
use mrt_core::db::{Db, DbError};
use mrt_core::driver::{DriverError, DriverResult};
use mrt_core::model::{DocId, Pagination};
use std::sync::Arc;

#[cfg(test)]
pub(crate) mod testutils;

/// Operations on the records of type `R`.
///
/// Every operation receives the request's `Context`, which must be forwarded to the database.
#[async_trait]
pub(crate) trait Service<R: Resource>: Send + Sync {
    /// Stores a new `record` and returns its storage-assigned identifier.
    async fn create(&self, ctx: &Context, record: &R) -> DriverResult<DocId>;

    /// Gets the records in the page described by `pagination`.
    async fn get_all(&self, ctx: &Context, pagination: Pagination) -> DriverResult<Vec<R>>;

    /// Gets the record identified by `id`, or `None` if it does not exist.
    async fn get_by_id(&self, ctx: &Context, id: &DocId) -> DriverResult<Option<R>>;

    /// Replaces the record identified by `id` with `record`.
    async fn update(&self, ctx: &Context, id: &DocId, record: &R) -> DriverResult<()>;

    /// Deletes the record identified by `id`.
    async fn delete(&self, ctx: &Context, id: &DocId) -> DriverResult<()>;
}

/// Logs a failed database `op` on the records of type `R` and converts `e` to a driver error.
fn storage_failure<R: Resource>(op: &str, e: DbError) -> DriverError {
    warn!("Failed to {} {} data: {}", op, R::NAME, e);
    DriverError::from(e)
}

/// Implementation of `Service` that forwards every call to a `Repository`.
#[derive(Clone)]
pub(crate) struct ResourceService<R> {
    /// Storage of the records.
    repository: Repository<R>,
}

impl<R: Resource> ResourceService<R> {
    /// Creates a new service backed by `repository`.
    pub(crate) fn new(repository: Repository<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: Resource> Service<R> for ResourceService<R> {
    async fn create(&self, ctx: &Context, record: &R) -> DriverResult<DocId> {
        self.repository.create(ctx, record).await.map_err(|e| storage_failure::<R>("create", e))
    }

    async fn get_all(&self, ctx: &Context, pagination: Pagination) -> DriverResult<Vec<R>> {
        self.repository.get_all(ctx, pagination).await.map_err(|e| storage_failure::<R>("list", e))
    }

    async fn get_by_id(&self, ctx: &Context, id: &DocId) -> DriverResult<Option<R>> {
        self.repository.get_by_id(ctx, id).await.map_err(|e| storage_failure::<R>("get", e))
    }

    async fn update(&self, ctx: &Context, id: &DocId, record: &R) -> DriverResult<()> {
        self.repository.update(ctx, id, record).await.map_err(|e| storage_failure::<R>("update", e))
    }

    async fn delete(&self, ctx: &Context, id: &DocId) -> DriverResult<()> {
        self.repository.delete(ctx, id).await.map_err(|e| storage_failure::<R>("delete", e))
    }
}

/// Names of the collections that hold each record type.
#[derive(Clone, Debug, PartialEq)]
pub struct Collections {
    /// Collection for `WasteWaterData` records.
    pub waste_water: String,

    /// Collection for `Device` records.
    pub device: String,

    /// Collection for `Sensor` records.
    pub sensor: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            waste_water: "waste_water".to_owned(),
            device: "device".to_owned(),
            sensor: "sensor".to_owned(),
        }
    }
}

/// Business logic.
///
/// Holds one service per record type.  The services are independent of each other.
#[derive(Clone)]
pub(crate) struct Driver {
    /// Service for waste-water readings.
    waste_water: Arc<dyn Service<WasteWaterData>>,

    /// Service for devices.
    device: Arc<dyn Service<Device>>,

    /// Service for sensors.
    sensor: Arc<dyn Service<Sensor>>,
}

impl Driver {
    /// Creates a new driver that stores every record type in its own collection of `db`.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>, collections: &Collections) -> Self {
        Self::from_services(
            Arc::new(ResourceService::new(Repository::new(db.clone(), &*collections.waste_water))),
            Arc::new(ResourceService::new(Repository::new(db.clone(), &*collections.device))),
            Arc::new(ResourceService::new(Repository::new(db, &*collections.sensor))),
        )
    }

    /// Creates a new driver backed by the given injected services.
    pub(crate) fn from_services(
        waste_water: Arc<dyn Service<WasteWaterData>>,
        device: Arc<dyn Service<Device>>,
        sensor: Arc<dyn Service<Sensor>>,
    ) -> Self {
        Self { waste_water, device, sensor }
    }

    /// Returns the service for waste-water readings.
    pub(crate) fn waste_water(&self) -> Arc<dyn Service<WasteWaterData>> {
        self.waste_water.clone()
    }

    /// Returns the service for devices.
    pub(crate) fn device(&self) -> Arc<dyn Service<Device>> {
        self.device.clone()
    }

    /// Returns the service for sensors.
    pub(crate) fn sensor(&self) -> Arc<dyn Service<Sensor>> {
        self.sensor.clone()
    }
}
