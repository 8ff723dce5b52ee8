// SPDX-License-Identifier: GPL-3.0-only

use std::fmt::Display;
use std::str::FromStr;

use serde::de::DeserializeOwned;

use super::{Result, ShareError};

/// Captured output of one remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Trimmed stdout, or `None` when the remote answered nothing.
    pub fn trimmed(&self) -> Option<&str> {
        let trimmed = self.stdout.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Interpret stdout as one scalar value; absent output is `None`.
    pub fn optional_scalar<T>(&self) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.trimmed() {
            None => Ok(None),
            Some(raw) => raw.parse::<T>().map(Some).map_err(|error| {
                ShareError::UnexpectedOutput(format!("scalar {raw:?} did not parse: {error}"))
            }),
        }
    }

    /// Interpret stdout as one scalar value; absent output is a fault.
    pub fn required_scalar<T>(&self) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional_scalar::<T>()?.ok_or_else(|| {
            ShareError::UnexpectedOutput("expected a value, remote answered nothing".to_string())
        })
    }

    /// Interpret stdout as a JSON document; absent output is `None`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match self.trimmed() {
            None => Ok(None),
            Some(raw) => serde_json::from_str(raw).map(Some).map_err(|error| {
                ShareError::UnexpectedOutput(format!("malformed JSON payload: {error}"))
            }),
        }
    }
}
