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

//! Test utilities for the REST API.

use crate::db;
use crate::driver::Driver;
use crate::model::*;
use crate::rest::app;
use axum::Router;
use order_crud_core::clocks::Clock;
use order_crud_core::clocks::testutils::SettableClock;
use order_crud_core::db::{Db, DbError};
use std::sync::Arc;
use time::macros::datetime;

/// State of a test for the REST layer.
pub(crate) struct TestContext {
    /// The database backing the app, for direct inspection.
    db: Arc<dyn Db + Send + Sync>,

    /// The clock backing the app, for manipulation.
    clock: Arc<SettableClock>,

    /// The router under test.
    app: Router,
}

impl TestContext {
    /// Initializes the app over an empty in-memory database with a frozen clock.
    pub(crate) async fn setup() -> Self {
        let db = Arc::from(order_crud_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let clock = Arc::from(SettableClock::new(datetime!(2024-01-15 10:30:00 UTC)));
        let ids = Arc::from(OrderIdGenerator::new([0xa1, 0xa2, 0xa3, 0xa4, 0xa5], 0));
        let driver = Driver::new(db.clone(), clock.clone(), ids);
        let app = app(driver);
        Self { db, clock, app }
    }

    /// Returns a copy of the router to send a request to.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and returns its router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Returns the clock used by the app.
    pub(crate) fn clock(&self) -> &SettableClock {
        &self.clock
    }

    /// Stores an order for `customer_name` with identifier `id`, bypassing the driver.
    pub(crate) async fn insert_order(&self, id: &'static str, customer_name: &str) -> Order {
        let fields = OrderFields {
            customer_name: customer_name.to_owned(),
            total_amount: 25.5,
            status: DEFAULT_STATUS.to_owned(),
            description: None,
        };
        let now = self.clock.now_utc();
        let order = Order::new(OrderId::from(id), fields, now, now);
        db::insert_order(&mut self.db.ex().await.unwrap(), &order).await.unwrap();
        order
    }

    /// Fetches the order identified by `id` straight from the database, if it exists.
    pub(crate) async fn get_order(&self, id: &'static str) -> Option<Order> {
        match db::get_order(&mut self.db.ex().await.unwrap(), &OrderId::from(id)).await {
            Ok(order) => Some(order),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("Unexpected database error: {}", e),
        }
    }

    /// Returns the number of orders in the database.
    pub(crate) async fn count_orders(&self) -> usize {
        db::list_orders(&mut self.db.ex().await.unwrap(), 0, u32::MAX).await.unwrap().len()
    }
}
