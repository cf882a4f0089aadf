// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Core types for the rigctl wire protocol.
//!
//! This crate holds everything both sides of the protocol share: the
//! modulation-mode tables, the line tokenizer, numeric parsing and
//! formatting, status-code constants and the error taxonomy. The actual
//! transports live in `rigctl-client` and `rigctl-server`.

pub mod error;
pub mod mode;
pub mod status;
pub mod wire;

pub use error::{RigctlError, RigctlResult};
pub use mode::Mode;
pub use status::{
    STATUS_INTERNAL, STATUS_INVALID_PARAM, STATUS_NOT_AVAILABLE, STATUS_NOT_IMPLEMENTED, STATUS_OK,
    STATUS_PROTOCOL,
};
pub use wire::{
    format_float, parse_float, parse_int, tokenize, VERB_GET_CTCSS_SQL, VERB_GET_DCD,
    VERB_SET_CTCSS_SQL,
};
