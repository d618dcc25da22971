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

//! REST service to manage customer orders.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

#[cfg(feature = "postgres")]
use {
    db::init_schema,
    driver::Driver,
    log::{info, warn},
    model::OrderIdGenerator,
    order_crud_core::clocks::SystemClock,
    order_crud_core::db::Db,
    order_crud_core::db::postgres::{PostgresDb, PostgresOptions},
    rest::app,
    std::error::Error,
    std::net::SocketAddr,
    std::sync::Arc,
    tokio::net::TcpListener,
};

pub(crate) mod db;
pub(crate) mod driver;
pub(crate) mod model;
mod rest;

/// Waits until the process is asked to terminate.
#[cfg(feature = "postgres")]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {}", e);
            futures::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                futures::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = futures::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => (),
        _ = terminate => (),
    }
    info!("Shutdown requested; draining in-flight requests");
}

/// Sets up the schema and serves the application on `bind_addr` until asked to terminate.
#[cfg(feature = "postgres")]
async fn run(
    db: Arc<PostgresDb>,
    bind_addr: SocketAddr,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    init_schema(&mut db.ex().await?).await?;
    info!("Database schema ready");

    let driver = Driver::new(
        db.clone(),
        Arc::from(SystemClock::default()),
        Arc::from(OrderIdGenerator::default()),
    );
    let app = app(driver);

    let listener = TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

/// Instantiates all resources to serve the application on `bind_addr`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
///
/// The database pool is closed before returning, whether serving succeeded or not.
#[cfg(feature = "postgres")]
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db_opts: PostgresOptions,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let db = Arc::from(PostgresDb::connect(db_opts)?);
    let result = run(db.clone(), bind_addr.into()).await;

    db.close().await;
    info!("Database connection closed");
    result
}
