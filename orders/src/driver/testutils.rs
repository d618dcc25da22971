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

//! Test utilities for the business layer.

use crate::db;
use crate::driver::Driver;
use crate::model::OrderIdGenerator;
use order_crud_core::clocks::testutils::SettableClock;
use order_crud_core::db::{Db, Executor};
use std::sync::Arc;
use time::OffsetDateTime;
use time::macros::datetime;

/// Time at which the clock of a new `TestContext` starts.
pub(crate) const START_TIME: OffsetDateTime = datetime!(2024-01-15 10:30:00 UTC);

/// State of a test for the business layer.
pub(crate) struct TestContext {
    /// The database backing the driver, for direct inspection.
    db: Arc<dyn Db + Send + Sync>,

    /// The clock backing the driver, for manipulation.
    clock: Arc<SettableClock>,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes a driver over an empty in-memory database.
    ///
    /// Identifiers are generated deterministically: the first one will end in `000000`.
    pub(crate) async fn setup() -> Self {
        let db = Arc::from(order_crud_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let clock = Arc::from(SettableClock::new(START_TIME));
        let ids = Arc::from(OrderIdGenerator::new([0xa1, 0xa2, 0xa3, 0xa4, 0xa5], 0));
        let driver = Driver::new(db.clone(), clock.clone(), ids);
        Self { db, clock, driver }
    }

    /// Returns an executor against the test database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Returns the clock used by the driver.
    pub(crate) fn clock(&self) -> &SettableClock {
        &self.clock
    }

    /// Returns a copy of the driver under test.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }
}
