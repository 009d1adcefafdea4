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

//! Entry point to the service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use mrt_core::db::Db;
use mrt_core::db::mongo::{MongoDb, MongoOptions};
use mrt_server::{ServerOptions, serve};
use std::net::Ipv4Addr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    env_logger::init();

    let options = ServerOptions::from_env("MRT").unwrap();
    let addr = (Ipv4Addr::UNSPECIFIED, options.port);

    let db_opts = MongoOptions::from_env("MONGO").unwrap();
    let db = Arc::new(MongoDb::connect(db_opts).await.unwrap());
    db.ping().await.expect("Cannot reach the database");

    serve(addr, db.clone(), options).await.unwrap();

    db.close().await;
}
