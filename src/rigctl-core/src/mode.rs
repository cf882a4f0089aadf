// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Modulation modes and their wire representation.
//!
//! The decode direction is many-to-one: Hamlib accepts several aliases for
//! the same mode (`CW-R` and `CWR`, `USB-D` and `PKTUSB`, ...). The encode
//! direction is one-to-one, with exactly one canonical string per mode.
//! The two tables are kept separate on purpose; the relation between them
//! is not symmetric.

use serde::{Deserialize, Serialize};

/// Modulation mode as carried by the rigctl protocol.
///
/// `Invalid` is a sentinel that is never produced by a successful decode of
/// a known token. Passing it to a set operation fails locally without any
/// wire traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    USB,
    LSB,
    CW,
    CWR,
    RTTY,
    RTTYR,
    AM,
    FM,
    WFM,
    AMS,
    PKTLSB,
    PKTUSB,
    PKTFM,
    ECSSUSB,
    ECSSLSB,
    FA,
    SAM,
    SAL,
    SAH,
    DSB,
    Invalid,
}

impl Mode {
    /// Decode a wire token into a mode. Unknown tokens yield `Invalid`.
    ///
    /// Alias set taken from Hamlib's src/misc.c; keys are unique even though
    /// several keys map to the same mode.
    pub fn decode(token: &str) -> Mode {
        match token {
            "USB" => Mode::USB,
            "LSB" => Mode::LSB,
            "CW" => Mode::CW,
            "CWR" | "CW-R" => Mode::CWR,
            "RTTY" => Mode::RTTY,
            "RTTYR" | "RTTY-R" => Mode::RTTYR,
            "AM" => Mode::AM,
            "FM" => Mode::FM,
            "WFM" => Mode::WFM,
            "AMS" => Mode::AMS,
            "PKTLSB" | "LSB-D" => Mode::PKTLSB,
            "PKTUSB" | "USB-D" => Mode::PKTUSB,
            "PKTFM" | "FM-D" => Mode::PKTFM,
            "ECSSUSB" => Mode::ECSSUSB,
            "ECSSLSB" => Mode::ECSSLSB,
            // Not a Hamlib mode; accepted here so the canonical name of
            // every mode this crate can emit also decodes.
            "FA" => Mode::FA,
            "SAM" => Mode::SAM,
            "SAL" => Mode::SAL,
            "SAH" => Mode::SAH,
            "DSB" => Mode::DSB,
            _ => Mode::Invalid,
        }
    }

    /// Canonical wire string for this mode, `None` only for `Invalid`.
    pub fn wire_name(&self) -> Option<&'static str> {
        match self {
            Mode::USB => Some("USB"),
            Mode::LSB => Some("LSB"),
            Mode::CW => Some("CW"),
            Mode::CWR => Some("CWR"),
            Mode::RTTY => Some("RTTY"),
            Mode::RTTYR => Some("RTTYR"),
            Mode::AM => Some("AM"),
            Mode::FM => Some("FM"),
            Mode::WFM => Some("WFM"),
            Mode::AMS => Some("AMS"),
            Mode::PKTLSB => Some("PKTLSB"),
            Mode::PKTUSB => Some("PKTUSB"),
            Mode::PKTFM => Some("PKTFM"),
            Mode::ECSSUSB => Some("ECSSUSB"),
            Mode::ECSSLSB => Some("ECSSLSB"),
            Mode::FA => Some("FA"),
            Mode::SAM => Some("SAM"),
            Mode::SAL => Some("SAL"),
            Mode::SAH => Some("SAH"),
            Mode::DSB => Some("DSB"),
            Mode::Invalid => None,
        }
    }

    /// Every mode with a wire representation, in wire-table order.
    pub fn all() -> &'static [Mode] {
        &[
            Mode::USB,
            Mode::LSB,
            Mode::CW,
            Mode::CWR,
            Mode::RTTY,
            Mode::RTTYR,
            Mode::AM,
            Mode::FM,
            Mode::WFM,
            Mode::AMS,
            Mode::PKTLSB,
            Mode::PKTUSB,
            Mode::PKTFM,
            Mode::ECSSUSB,
            Mode::ECSSLSB,
            Mode::FA,
            Mode::SAM,
            Mode::SAL,
            Mode::SAH,
            Mode::DSB,
        ]
    }
}
