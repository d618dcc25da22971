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

//! Database abstraction in terms of the operations needed by the server.

use crate::model::{Order, OrderFields, OrderId, OrderPatch};
use futures::TryStreamExt;
#[cfg(feature = "postgres")]
use order_crud_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use order_crud_core::db::sqlite::{self, build_timestamp, unpack_timestamp};
use order_crud_core::db::{DbError, DbResult, Executor};
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;
use time::OffsetDateTime;

#[cfg(test)]
pub(crate) mod tests;

/// Initializes the database schema.
///
/// This is idempotent so it is safe to call on every startup.
pub(crate) async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Order {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: String = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let customer_name: String =
            row.try_get("customer_name").map_err(postgres::map_sqlx_error)?;
        let total_amount: f64 = row.try_get("total_amount").map_err(postgres::map_sqlx_error)?;
        let status: String = row.try_get("status").map_err(postgres::map_sqlx_error)?;
        let description: Option<String> =
            row.try_get("description").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

        let fields = OrderFields { customer_name, total_amount, status, description };
        Ok(Order::new(OrderId::new(id)?, fields, created_at, updated_at))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Order {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: String = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let customer_name: String = row.try_get("customer_name").map_err(sqlite::map_sqlx_error)?;
        let total_amount: f64 = row.try_get("total_amount").map_err(sqlite::map_sqlx_error)?;
        let status: String = row.try_get("status").map_err(sqlite::map_sqlx_error)?;
        let description: Option<String> =
            row.try_get("description").map_err(sqlite::map_sqlx_error)?;
        let created_at_secs: i64 =
            row.try_get("created_at_secs").map_err(sqlite::map_sqlx_error)?;
        let created_at_nsecs: i64 =
            row.try_get("created_at_nsecs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_secs: i64 =
            row.try_get("updated_at_secs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_nsecs: i64 =
            row.try_get("updated_at_nsecs").map_err(sqlite::map_sqlx_error)?;

        let fields = OrderFields { customer_name, total_amount, status, description };
        Ok(Order::new(
            OrderId::new(id)?,
            fields,
            build_timestamp(created_at_secs, created_at_nsecs)?,
            build_timestamp(updated_at_secs, updated_at_nsecs)?,
        ))
    }
}

/// Stores a new `order` as is.
pub(crate) async fn insert_order(ex: &mut Executor, order: &Order) -> DbResult<()> {
    let fields = order.fields();

    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO orders
                    (id, customer_name, total_amount, status, description, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)";
            let done = sqlx::query(query_str)
                .bind(order.id().as_str())
                .bind(&fields.customer_name)
                .bind(fields.total_amount)
                .bind(&fields.status)
                .bind(fields.description.as_deref())
                .bind(*order.created_at())
                .bind(*order.updated_at())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (created_at_secs, created_at_nsecs) = unpack_timestamp(*order.created_at())?;
            let (updated_at_secs, updated_at_nsecs) = unpack_timestamp(*order.updated_at())?;

            let query_str = "
                INSERT INTO orders (
                    id, customer_name, total_amount, status, description,
                    created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(order.id().as_str())
                .bind(&fields.customer_name)
                .bind(fields.total_amount)
                .bind(&fields.status)
                .bind(fields.description.as_deref())
                .bind(created_at_secs)
                .bind(created_at_nsecs)
                .bind(updated_at_secs)
                .bind(updated_at_nsecs)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    if rows_affected != 1 {
        return Err(DbError::BackendError("Insertion affected more than one row".to_owned()));
    }
    Ok(())
}

/// Gets the order identified by `id`.
pub(crate) async fn get_order(ex: &mut Executor, id: &OrderId) -> DbResult<Order> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM orders WHERE id = $1";
            let row = sqlx::query(query_str)
                .bind(id.as_str())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            Order::try_from(row)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM orders WHERE id = ?";
            let row = sqlx::query(query_str)
                .bind(id.as_str())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Order::try_from(row)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets up to `limit` orders after skipping the first `skip` ones, in creation order.
pub(crate) async fn list_orders(ex: &mut Executor, skip: u32, limit: u32) -> DbResult<Vec<Order>> {
    let mut orders = vec![];
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM orders ORDER BY created_at, id LIMIT $1 OFFSET $2";
            let mut rows = sqlx::query(query_str)
                .bind(i64::from(limit))
                .bind(i64::from(skip))
                .fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                orders.push(Order::try_from(row)?);
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT * FROM orders
                ORDER BY created_at_secs, created_at_nsecs, id
                LIMIT ? OFFSET ?";
            let mut rows = sqlx::query(query_str)
                .bind(i64::from(limit))
                .bind(i64::from(skip))
                .fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                orders.push(Order::try_from(row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(orders)
}

/// Applies the fields present in `patch` to the order identified by `id` and sets its
/// modification time to `updated_at`.  Returns the order after the update.
pub(crate) async fn update_order(
    ex: &mut Executor,
    id: &OrderId,
    patch: &OrderPatch,
    updated_at: OffsetDateTime,
) -> DbResult<Order> {
    let customer_name = patch.customer_name.as_set();
    let total_amount = patch.total_amount.as_set();
    let status = patch.status.as_set();
    let description = patch.description.as_set();

    let row = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE orders SET
                    customer_name = CASE WHEN $2 THEN $3 ELSE customer_name END,
                    total_amount = CASE WHEN $4 THEN $5 ELSE total_amount END,
                    status = CASE WHEN $6 THEN $7 ELSE status END,
                    description = CASE WHEN $8 THEN $9 ELSE description END,
                    updated_at = $10
                WHERE id = $1
                RETURNING *";
            let row = sqlx::query(query_str)
                .bind(id.as_str())
                .bind(customer_name.is_some())
                .bind(customer_name.map(String::as_str))
                .bind(total_amount.is_some())
                .bind(total_amount.copied())
                .bind(status.is_some())
                .bind(status.map(String::as_str))
                .bind(description.is_some())
                .bind(description.and_then(Option::as_deref))
                .bind(updated_at)
                .fetch_optional(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.map(Order::try_from)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (updated_at_secs, updated_at_nsecs) = unpack_timestamp(updated_at)?;

            let query_str = "
                UPDATE orders SET
                    customer_name = CASE WHEN ? THEN ? ELSE customer_name END,
                    total_amount = CASE WHEN ? THEN ? ELSE total_amount END,
                    status = CASE WHEN ? THEN ? ELSE status END,
                    description = CASE WHEN ? THEN ? ELSE description END,
                    updated_at_secs = ?,
                    updated_at_nsecs = ?
                WHERE id = ?
                RETURNING *";
            let row = sqlx::query(query_str)
                .bind(customer_name.is_some())
                .bind(customer_name.map(String::as_str))
                .bind(total_amount.is_some())
                .bind(total_amount.copied())
                .bind(status.is_some())
                .bind(status.map(String::as_str))
                .bind(description.is_some())
                .bind(description.and_then(Option::as_deref))
                .bind(updated_at_secs)
                .bind(updated_at_nsecs)
                .bind(id.as_str())
                .fetch_optional(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.map(Order::try_from)
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match row {
        Some(order) => order,
        None => Err(DbError::NotFound),
    }
}

/// Deletes the order identified by `id`.
pub(crate) async fn delete_order(ex: &mut Executor, id: &OrderId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM orders WHERE id = $1";
            let done = sqlx::query(query_str)
                .bind(id.as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM orders WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(id.as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}
