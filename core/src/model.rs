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

//! Generic types shared by the model layer of all services.
//!
//! Services define their own `model` module with the data types of their domain.  Constructors
//! of those types validate their input and report problems via `ModelError`, which the upper
//! layers know how to translate: a `ModelError` coming from user input is a bad request, but a
//! `ModelError` coming from the database is a data integrity problem.

/// Model errors.  The contained string is a user-facing description of the problem.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ModelError(pub String);

/// Result type for this module.
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_display() {
        assert_eq!("Bad input", ModelError("Bad input".to_owned()).to_string());
    }
}
