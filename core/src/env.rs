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

//! Utilities to deal with environment variables.
//!
//! Configuration is always read from variables named `<prefix>_<suffix>` so that a single process
//! can host more than one configurable component without name clashes.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Errors while reading configuration from the environment.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum EnvError {
    /// The variable is set but its value does not parse as the requested type.
    #[error("Invalid value in environment variable {0}: {1}")]
    BadValue(String, String),

    /// The variable is set but its value is not valid Unicode.
    #[error("Invalid value in environment variable {0}: not valid unicode")]
    NotUnicode(String),
}

/// Result type for this module.
pub type EnvResult<T> = Result<T, EnvError>;

/// Gets an optional environment variable whose name is `<prefix>_<suffix>`, parsed as `T`.
///
/// Returns `None` if the variable is not set.  A variable that is set but cannot be parsed is an
/// error, not a missing value.
pub fn get_optional_var<T>(prefix: &str, suffix: &str) -> EnvResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let name = format!("{}_{}", prefix, suffix);
    match env::var(&name) {
        Ok(value) => match value.parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(e) => Err(EnvError::BadValue(name, e.to_string())),
        },
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(EnvError::NotUnicode(name)),
    }
}
