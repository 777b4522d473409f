// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the engine layer.

use shift_slots::CoreError;
use thiserror::Error;

/// Failures reported by a `ShiftDirectory` implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The directory could not be reached.
    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    /// The directory did not answer in time.
    #[error("Directory request timed out")]
    Timeout,

    /// The directory answered with an error.
    #[error("Directory rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Engine-level errors returned to callers of the public mutators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The slot store rejected the command.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The engine has been torn down.
    #[error("Engine is shut down")]
    Closed,
}

impl From<shift_slots_domain::DomainError> for EngineError {
    fn from(err: shift_slots_domain::DomainError) -> Self {
        Self::Core(CoreError::from(err))
    }
}
