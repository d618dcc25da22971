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

//! Operations on orders.

use crate::db;
use crate::driver::Driver;
use crate::model::{NewOrder, Order, OrderId, OrderPatch};
use log::debug;
use order_crud_core::db::DbError;
use order_crud_core::driver::{DriverError, DriverResult};

/// Converts a database error into a driver error, describing missing entities as orders.
fn map_order_error(e: DbError) -> DriverError {
    match e {
        DbError::NotFound => DriverError::NotFound("Order not found".to_owned()),
        e => e.into(),
    }
}

impl Driver {
    /// Creates a new order with the given contents, assigning it a fresh identifier and
    /// timestamps.
    pub(crate) async fn create_order(self, new: NewOrder) -> DriverResult<Order> {
        let now = self.clock.now_utc();
        let order = Order::new(self.ids.next(now), new.fields, now, now);

        db::insert_order(&mut self.db.ex().await?, &order).await?;
        debug!("Created order {}", order.id());
        Ok(order)
    }

    /// Gets up to `limit` orders after skipping the first `skip` ones.
    pub(crate) async fn list_orders(self, skip: u32, limit: u32) -> DriverResult<Vec<Order>> {
        let orders = db::list_orders(&mut self.db.ex().await?, skip, limit).await?;
        Ok(orders)
    }

    /// Gets the order identified by `id`.
    pub(crate) async fn get_order(self, id: OrderId) -> DriverResult<Order> {
        let order = db::get_order(&mut self.db.ex().await?, &id).await.map_err(map_order_error)?;
        Ok(order)
    }

    /// Applies the present fields of `patch` to the order identified by `id`.
    ///
    /// The modification time never goes backwards, even if the clock does.
    pub(crate) async fn update_order(self, id: OrderId, patch: OrderPatch) -> DriverResult<Order> {
        let mut tx = self.db.begin().await?;
        let current = db::get_order(tx.ex(), &id).await.map_err(map_order_error)?;

        let now = self.clock.now_utc().max(*current.updated_at());
        let order = db::update_order(tx.ex(), &id, &patch, now).await.map_err(map_order_error)?;
        tx.commit().await?;

        debug!("Updated order {}", order.id());
        Ok(order)
    }

    /// Deletes the order identified by `id`.
    pub(crate) async fn delete_order(self, id: OrderId) -> DriverResult<()> {
        db::delete_order(&mut self.db.ex().await?, &id).await.map_err(map_order_error)?;
        debug!("Deleted order {}", id);
        Ok(())
    }
}
