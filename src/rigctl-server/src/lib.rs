// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! rigctld-compatible server.
//!
//! Accepts any number of client connections speaking the rigctl ASCII
//! protocol and dispatches each command line to externally bound parameter
//! handlers. The server owns no radio state of its own; everything behind
//! a get/set goes through the `RigHandlers` registry.

mod connection;
mod handlers;
mod server;

pub use handlers::{
    GetFloatHandler, GetIntHandler, GetModeHandler, RigHandlers, SetFloatHandler, SetIntHandler,
    SetModeHandler, StatusCode,
};
pub use server::Server;
