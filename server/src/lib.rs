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

//! REST service that manages waste-water readings, devices and sensors.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::{info, warn};
use mrt_core::db::Db;
use mrt_core::env::get_optional_var;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub(crate) mod db;
use db::init_schema;
pub(crate) mod driver;
pub use driver::Collections;
use driver::Driver;
pub mod model;
mod rest;
use rest::app;

/// Default port to listen on.
const DEFAULT_PORT: u16 = 3000;

/// Default maximum time a request may wait for the database.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default upper bound of the page size requested by clients.
const DEFAULT_MAX_PAGE_SIZE: i64 = 100;

/// Configuration of the server.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerOptions {
    /// Port to listen on.
    pub port: u16,

    /// Maximum time a request may wait for the database.
    pub request_timeout: Duration,

    /// Upper bound of the page size requested by clients.
    pub max_page_size: i64,

    /// Names of the collections that hold the records.
    pub collections: Collections,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            collections: Collections::default(),
        }
    }
}

impl ServerOptions {
    /// Initializes a set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_PORT` and `<prefix>_DEVICE_COLLECTION`.  All of
    /// them are optional and unset variables take their default values.
    pub fn from_env(prefix: &str) -> Result<ServerOptions, String> {
        let defaults = ServerOptions::default();

        let request_timeout = match get_optional_var::<u64>(prefix, "REQUEST_TIMEOUT_SECS")? {
            Some(secs) => Duration::from_secs(secs),
            None => defaults.request_timeout,
        };

        let max_page_size =
            get_optional_var::<i64>(prefix, "MAX_PAGE_SIZE")?.unwrap_or(defaults.max_page_size);
        if max_page_size < 1 {
            return Err(format!("Invalid value in environment variable {}_MAX_PAGE_SIZE", prefix));
        }

        Ok(ServerOptions {
            port: get_optional_var::<u16>(prefix, "PORT")?.unwrap_or(defaults.port),
            request_timeout,
            max_page_size,
            collections: Collections {
                waste_water: get_optional_var::<String>(prefix, "WASTE_WATER_COLLECTION")?
                    .unwrap_or(defaults.collections.waste_water),
                device: get_optional_var::<String>(prefix, "DEVICE_COLLECTION")?
                    .unwrap_or(defaults.collections.device),
                sensor: get_optional_var::<String>(prefix, "SENSOR_COLLECTION")?
                    .unwrap_or(defaults.collections.sensor),
            },
        })
    }
}

/// Waits for a request to terminate the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for the shutdown signal: {}", e);
    }
    info!("Shutting down");
}

/// Instantiates all resources to serve the application on `bind_addr`.
///
/// Returns once the server has been asked to terminate and all pending requests are done.  The
/// caller retains ownership of `db` and is responsible for closing it.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db: Arc<dyn Db + Send + Sync>,
    options: ServerOptions,
) -> Result<(), Box<dyn Error>> {
    init_schema(&mut db.ex().await?).await?;

    let driver = Driver::new(db, &options.collections);
    let app = app(driver, &options);

    let listener = tokio::net::TcpListener::bind(bind_addr.into()).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
