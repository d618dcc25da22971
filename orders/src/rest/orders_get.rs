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

//! API to list existing orders.

use crate::driver::Driver;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use order_crud_core::rest::{EmptyBody, RestError};
use serde::{Deserialize, Serialize};

/// Number of orders to return when the client does not specify a limit.
const DEFAULT_LIMIT: u32 = 10;

/// Pagination parameters for the listing.
#[derive(Default, Deserialize, Serialize)]
pub(crate) struct ListQuery {
    /// Number of orders to skip from the beginning of the listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) skip: Option<u32>,

    /// Maximum number of orders to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) limit: Option<u32>,
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    query: Result<Query<ListQuery>, QueryRejection>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let Query(query) = query?;
    let orders = driver
        .list_orders(query.skip.unwrap_or(0), query.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(Json(orders))
}
