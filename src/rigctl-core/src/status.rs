// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! RPRT status codes, following Hamlib's error numbering.

/// Successful completion.
pub const STATUS_OK: i32 = 0;
/// Invalid parameter or unrecognized command.
pub const STATUS_INVALID_PARAM: i32 = -1;
/// Function not implemented.
pub const STATUS_NOT_IMPLEMENTED: i32 = -4;
/// Internal error.
pub const STATUS_INTERNAL: i32 = -7;
/// Protocol error (malformed arguments).
pub const STATUS_PROTOCOL: i32 = -8;
/// Function not available on this rig.
pub const STATUS_NOT_AVAILABLE: i32 = -11;

/// Literal verb of a status reply line.
pub const RPRT: &str = "RPRT";
