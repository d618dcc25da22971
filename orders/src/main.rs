// III-IV
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

//! Entry point to the order service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use order_crud::serve;
use order_crud_core::db::postgres::PostgresOptions;
use order_crud_core::env::get_optional_var;
use std::net::Ipv4Addr;

/// Name of the database to use when the environment does not specify one.
const DEFAULT_DATABASE: &str = "orders_db";

/// Port to listen on when the environment does not specify one.
const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() {
    env_logger::init();

    let port = get_optional_var::<u16>("ORDERS", "PORT")
        .expect("Invalid port configuration")
        .unwrap_or(DEFAULT_PORT);
    let addr = (Ipv4Addr::UNSPECIFIED, port);

    let mut db_opts =
        PostgresOptions::from_env("ORDERS_DB").expect("Invalid database configuration");
    if db_opts.database.is_none() {
        db_opts.database = Some(DEFAULT_DATABASE.to_owned());
    }

    serve(addr, db_opts).await.expect("Server failed")
}
