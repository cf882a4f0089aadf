// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::fmt;

/// Error type shared by the rigctl client and server.
///
/// A failed round trip is always one of these, never a sentinel numeric
/// value, so a legitimately negative reading (RIT offset, repeater shift)
/// can not be mistaken for a failure.
#[derive(Debug)]
pub enum RigctlError {
    /// The peer closed the connection.
    Closed,
    /// A receive did not complete within the configured timeout.
    Timeout,
    /// Underlying transport failure.
    Io(std::io::Error),
    /// Malformed line, wrong token count or unparsable number.
    Protocol(String),
    /// A mode token did not decode, or `Mode::Invalid` was passed to a set.
    InvalidMode,
    /// The operation is recognized but not implemented by this client.
    NotSupported,
}

pub type RigctlResult<T> = Result<T, RigctlError>;

impl fmt::Display for RigctlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RigctlError::Closed => write!(f, "connection closed by peer"),
            RigctlError::Timeout => write!(f, "receive timed out"),
            RigctlError::Io(e) => write!(f, "transport error: {}", e),
            RigctlError::Protocol(msg) => write!(f, "protocol error: {}", msg),
            RigctlError::InvalidMode => write!(f, "invalid mode"),
            RigctlError::NotSupported => write!(f, "operation not supported"),
        }
    }
}

impl std::error::Error for RigctlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RigctlError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RigctlError {
    fn from(e: std::io::Error) -> Self {
        RigctlError::Io(e)
    }
}
