// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! rigctl client: a synchronous request/response driver for the
//! rigctld-compatible ASCII protocol.

mod client;

pub use client::{Client, DEFAULT_TIMEOUT};
