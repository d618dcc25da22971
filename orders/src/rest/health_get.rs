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

//! API to check that the service is up.

use axum::Json;
use axum::response::IntoResponse;
use order_crud_core::rest::{EmptyBody, RestError};
use serde::{Deserialize, Serialize};

/// Message returned by the API.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct HealthResponse {
    /// Always `ok` while the server is able to answer.
    pub(crate) status: String,

    /// Human-readable description of the status.
    pub(crate) message: String,
}

/// API handler.
pub(crate) async fn handler(_: EmptyBody) -> Result<impl IntoResponse, RestError> {
    Ok(Json(HealthResponse { status: "ok".to_owned(), message: "API is running".to_owned() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http;
    use order_crud_core::rest::testutils::*;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_empty()
            .await
            .expect_json::<HealthResponse>()
            .await;
        let exp_response =
            HealthResponse { status: "ok".to_owned(), message: "API is running".to_owned() };
        assert_eq!(exp_response, response);
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route());
}
