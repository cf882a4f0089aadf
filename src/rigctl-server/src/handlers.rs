// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Externally supplied parameter handlers.
//!
//! One optional slot per supported parameter. An unbound slot makes the
//! matching verb answer `RPRT -11` (not available). Handlers are invoked
//! concurrently from different connection tasks and must be safe under
//! concurrent invocation; the server does not serialize them.

use std::sync::Arc;

use rigctl_core::mode::Mode;

/// Application-level status code carried in a `RPRT` line. Zero is success.
pub type StatusCode = i32;

pub type GetIntHandler = Arc<dyn Fn() -> Result<i32, StatusCode> + Send + Sync>;
pub type SetIntHandler = Arc<dyn Fn(i32) -> Result<(), StatusCode> + Send + Sync>;
pub type GetFloatHandler = Arc<dyn Fn() -> Result<f64, StatusCode> + Send + Sync>;
pub type SetFloatHandler = Arc<dyn Fn(f64) -> Result<(), StatusCode> + Send + Sync>;
pub type GetModeHandler = Arc<dyn Fn() -> Result<(Mode, i32), StatusCode> + Send + Sync>;
pub type SetModeHandler = Arc<dyn Fn(Mode, i32) -> Result<(), StatusCode> + Send + Sync>;

/// Registry of get/set callbacks, one slot per supported parameter.
///
/// Frequencies, offsets and the tuning step are in Hz; the CTCSS tone and
/// squelch are in Hz as well (the wire scaling to tenths happens in the
/// dispatcher); PTT and DCD are 0/1 integers.
#[derive(Default, Clone)]
pub struct RigHandlers {
    pub get_freq: Option<GetFloatHandler>,
    pub set_freq: Option<SetFloatHandler>,
    pub get_mode: Option<GetModeHandler>,
    pub set_mode: Option<SetModeHandler>,
    pub get_rit: Option<GetFloatHandler>,
    pub set_rit: Option<SetFloatHandler>,
    pub get_xit: Option<GetFloatHandler>,
    pub set_xit: Option<SetFloatHandler>,
    pub get_ptt: Option<GetIntHandler>,
    pub set_ptt: Option<SetIntHandler>,
    pub get_split_freq: Option<GetFloatHandler>,
    pub set_split_freq: Option<SetFloatHandler>,
    pub get_antenna: Option<GetIntHandler>,
    pub set_antenna: Option<SetIntHandler>,
    pub get_repeater_offset: Option<GetFloatHandler>,
    pub set_repeater_offset: Option<SetFloatHandler>,
    pub get_ctcss_tone: Option<GetFloatHandler>,
    pub set_ctcss_tone: Option<SetFloatHandler>,
    pub get_ctcss_squelch: Option<GetFloatHandler>,
    pub set_ctcss_squelch: Option<SetFloatHandler>,
    pub get_tuning_step: Option<GetFloatHandler>,
    pub set_tuning_step: Option<SetFloatHandler>,
    pub get_mem: Option<GetIntHandler>,
    pub set_mem: Option<SetIntHandler>,
    pub set_bank: Option<SetIntHandler>,
    pub get_dcd: Option<GetIntHandler>,
}

impl RigHandlers {
    pub fn new() -> Self {
        Self::default()
    }
}
