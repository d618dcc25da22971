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

//! Common tests for any database implementation.

use crate::db::*;
use crate::model::{Order, OrderFields, OrderId, OrderPatch, Patch};
use order_crud_core::db::{DbError, Executor};
use time::OffsetDateTime;
use time::macros::datetime;

/// Creates a test order with the given `id`, `customer_name` and creation time `ts`.
fn make_order(id: &'static str, customer_name: &str, ts: OffsetDateTime) -> Order {
    let fields = OrderFields {
        customer_name: customer_name.to_owned(),
        total_amount: 99.99,
        status: "pending".to_owned(),
        description: None,
    };
    Order::new(OrderId::from(id), fields, ts, ts)
}

async fn test_init_schema_is_idempotent(ex: &mut Executor) {
    let order = make_order("000000000000000000000001", "Alice", datetime!(2024-01-15 10:30:00 UTC));
    insert_order(ex, &order).await.unwrap();

    init_schema(ex).await.unwrap();

    assert_eq!(order, get_order(ex, order.id()).await.unwrap());
}

async fn test_insert_and_get(ex: &mut Executor) {
    let mut order =
        make_order("000000000000000000000001", "Alice", datetime!(2024-01-15 10:30:00.123456 UTC));
    insert_order(ex, &order).await.unwrap();
    assert_eq!(order, get_order(ex, order.id()).await.unwrap());

    let fields = OrderFields {
        customer_name: "Bob".to_owned(),
        total_amount: 0.0,
        status: "shipped".to_owned(),
        description: Some("Something".to_owned()),
    };
    order = Order::new(
        OrderId::from("000000000000000000000002"),
        fields,
        datetime!(2024-01-15 10:30:00 UTC),
        datetime!(2024-01-16 11:00:00.000001 UTC),
    );
    insert_order(ex, &order).await.unwrap();
    assert_eq!(order, get_order(ex, order.id()).await.unwrap());
}

async fn test_insert_duplicate(ex: &mut Executor) {
    let order = make_order("000000000000000000000001", "Alice", datetime!(2024-01-15 10:30:00 UTC));
    insert_order(ex, &order).await.unwrap();

    let other = make_order("000000000000000000000001", "Bob", datetime!(2024-01-16 10:30:00 UTC));
    assert_eq!(DbError::AlreadyExists, insert_order(ex, &other).await.unwrap_err());

    assert_eq!(order, get_order(ex, order.id()).await.unwrap());
}

async fn test_get_not_found(ex: &mut Executor) {
    assert_eq!(
        DbError::NotFound,
        get_order(ex, &OrderId::from("000000000000000000000001")).await.unwrap_err()
    );
}

async fn test_list_empty(ex: &mut Executor) {
    assert!(list_orders(ex, 0, 10).await.unwrap().is_empty());
}

async fn test_list_order_and_pagination(ex: &mut Executor) {
    let order3 = make_order("00000000000000000000000a", "C", datetime!(2024-01-15 10:30:02 UTC));
    let order1 = make_order("00000000000000000000000c", "A", datetime!(2024-01-15 10:30:00 UTC));
    let order2a = make_order("00000000000000000000000b", "B", datetime!(2024-01-15 10:30:01 UTC));
    let order2b = make_order("00000000000000000000000d", "D", datetime!(2024-01-15 10:30:01 UTC));
    for order in [&order3, &order1, &order2b, &order2a] {
        insert_order(ex, order).await.unwrap();
    }

    assert_eq!(
        vec![order1.clone(), order2a.clone(), order2b.clone(), order3.clone()],
        list_orders(ex, 0, 10).await.unwrap()
    );
    assert_eq!(vec![order1.clone(), order2a.clone()], list_orders(ex, 0, 2).await.unwrap());
    assert_eq!(vec![order2b.clone(), order3.clone()], list_orders(ex, 2, 2).await.unwrap());
    assert_eq!(vec![order3.clone()], list_orders(ex, 3, 10).await.unwrap());
    assert!(list_orders(ex, 4, 10).await.unwrap().is_empty());
    assert!(list_orders(ex, 0, 0).await.unwrap().is_empty());
}

async fn test_update_partial(ex: &mut Executor) {
    let created_at = datetime!(2024-01-15 10:30:00 UTC);
    let order = make_order("000000000000000000000001", "Alice", created_at);
    insert_order(ex, &order).await.unwrap();
    let other = make_order("000000000000000000000002", "Bob", created_at);
    insert_order(ex, &other).await.unwrap();

    let updated_at = datetime!(2024-01-15 11:00:00.000005 UTC);
    let patch = OrderPatch {
        status: Patch::Set("shipped".to_owned()),
        description: Patch::Set(Some("Express".to_owned())),
        ..Default::default()
    };
    let updated = update_order(ex, order.id(), &patch, updated_at).await.unwrap();

    let exp_fields = OrderFields {
        customer_name: "Alice".to_owned(),
        total_amount: 99.99,
        status: "shipped".to_owned(),
        description: Some("Express".to_owned()),
    };
    let exp_order = Order::new(order.id().clone(), exp_fields, created_at, updated_at);
    assert_eq!(exp_order, updated);
    assert_eq!(exp_order, get_order(ex, order.id()).await.unwrap());

    assert_eq!(other, get_order(ex, other.id()).await.unwrap());
}

async fn test_update_all_fields(ex: &mut Executor) {
    let created_at = datetime!(2024-01-15 10:30:00 UTC);
    let order = make_order("000000000000000000000001", "Alice", created_at);
    insert_order(ex, &order).await.unwrap();

    let updated_at = datetime!(2024-01-15 10:30:00 UTC);
    let patch = OrderPatch {
        customer_name: Patch::Set("Alicia".to_owned()),
        total_amount: Patch::Set(150.5),
        status: Patch::Set("delivered".to_owned()),
        description: Patch::Set(Some("Gift".to_owned())),
    };
    let updated = update_order(ex, order.id(), &patch, updated_at).await.unwrap();

    let exp_fields = OrderFields {
        customer_name: "Alicia".to_owned(),
        total_amount: 150.5,
        status: "delivered".to_owned(),
        description: Some("Gift".to_owned()),
    };
    assert_eq!(Order::new(order.id().clone(), exp_fields, created_at, updated_at), updated);
}

async fn test_update_clears_description(ex: &mut Executor) {
    let created_at = datetime!(2024-01-15 10:30:00 UTC);
    let mut fields = make_order("000000000000000000000001", "Alice", created_at).fields().clone();
    fields.description = Some("To be removed".to_owned());
    let order = Order::new(OrderId::from("000000000000000000000001"), fields, created_at, created_at);
    insert_order(ex, &order).await.unwrap();

    let updated_at = datetime!(2024-01-15 10:31:00 UTC);
    let patch = OrderPatch { description: Patch::Set(None), ..Default::default() };
    let updated = update_order(ex, order.id(), &patch, updated_at).await.unwrap();
    assert_eq!(None, updated.fields().description);
    assert_eq!("Alice", updated.fields().customer_name);
    assert_eq!(updated_at, *updated.updated_at());
}

async fn test_update_empty_patch_touches_updated_at(ex: &mut Executor) {
    let created_at = datetime!(2024-01-15 10:30:00 UTC);
    let order = make_order("000000000000000000000001", "Alice", created_at);
    insert_order(ex, &order).await.unwrap();

    let updated_at = datetime!(2024-01-15 10:31:00 UTC);
    let updated =
        update_order(ex, order.id(), &OrderPatch::default(), updated_at).await.unwrap();
    assert_eq!(order.fields(), updated.fields());
    assert_eq!(created_at, *updated.created_at());
    assert_eq!(updated_at, *updated.updated_at());
}

async fn test_update_not_found(ex: &mut Executor) {
    let patch = OrderPatch { status: Patch::Set("shipped".to_owned()), ..Default::default() };
    assert_eq!(
        DbError::NotFound,
        update_order(
            ex,
            &OrderId::from("000000000000000000000001"),
            &patch,
            datetime!(2024-01-15 10:31:00 UTC)
        )
        .await
        .unwrap_err()
    );
    assert!(list_orders(ex, 0, 10).await.unwrap().is_empty());
}

async fn test_delete_ok(ex: &mut Executor) {
    let ts = datetime!(2024-01-15 10:30:00 UTC);
    let order1 = make_order("000000000000000000000001", "Alice", ts);
    let order2 = make_order("000000000000000000000002", "Bob", ts);
    insert_order(ex, &order1).await.unwrap();
    insert_order(ex, &order2).await.unwrap();

    delete_order(ex, order1.id()).await.unwrap();

    assert_eq!(DbError::NotFound, get_order(ex, order1.id()).await.unwrap_err());
    assert_eq!(vec![order2], list_orders(ex, 0, 10).await.unwrap());
}

async fn test_delete_not_found(ex: &mut Executor) {
    let order = make_order("000000000000000000000001", "Alice", datetime!(2024-01-15 10:30:00 UTC));
    insert_order(ex, &order).await.unwrap();

    assert_eq!(
        DbError::NotFound,
        delete_order(ex, &OrderId::from("000000000000000000000002")).await.unwrap_err()
    );
    delete_order(ex, order.id()).await.unwrap();
    assert_eq!(DbError::NotFound, delete_order(ex, order.id()).await.unwrap_err());
}

macro_rules! generate_db_tests [
    ( $setup:expr $(, #[$extra:meta] )? ) => {
        order_crud_core::db::testutils::generate_tests!(
            $(#[$extra],)?
            $setup,
            $crate::db::tests,
            test_init_schema_is_idempotent,
            test_insert_and_get,
            test_insert_duplicate,
            test_get_not_found,
            test_list_empty,
            test_list_order_and_pagination,
            test_update_partial,
            test_update_all_fields,
            test_update_clears_description,
            test_update_empty_patch_touches_updated_at,
            test_update_not_found,
            test_delete_ok,
            test_delete_not_found
        );
    }
];

#[cfg(feature = "postgres")]
mod postgres {
    use crate::db::init_schema;
    use order_crud_core::db::Db;
    use order_crud_core::db::postgres::PostgresDb;

    async fn setup() -> PostgresDb {
        let db = order_crud_core::db::postgres::testutils::setup().await;
        init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        db
    }

    generate_db_tests!(
        setup().await,
        #[ignore = "Requires environment configuration and is expensive"]
    );
}

mod sqlite {
    use crate::db::init_schema;
    use order_crud_core::db::Db;
    use order_crud_core::db::sqlite::SqliteDb;

    async fn setup() -> SqliteDb {
        let db = order_crud_core::db::sqlite::testutils::setup().await;
        init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        db
    }

    generate_db_tests!(setup().await);
}
