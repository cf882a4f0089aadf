// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Per-connection command loop and verb dispatch.
//!
//! One task per connection: read a line, look the verb up, write the reply.
//! Protocol-level problems (unknown verb, malformed arguments, unbound
//! handler) answer an error status and keep the connection open; only
//! transport-level problems end the loop.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, warn};

use rigctl_core::mode::Mode;
use rigctl_core::status::{STATUS_INVALID_PARAM, STATUS_NOT_AVAILABLE, STATUS_OK, STATUS_PROTOCOL};
use rigctl_core::wire::{
    format_float, parse_float, parse_int, tokenize, VERB_GET_CTCSS_SQL, VERB_GET_DCD,
    VERB_SET_CTCSS_SQL,
};

use crate::handlers::{
    GetFloatHandler, GetIntHandler, GetModeHandler, RigHandlers, SetFloatHandler, SetIntHandler,
    SetModeHandler,
};

/// A blocked read wakes up this often to re-check for new data; a timeout
/// is a retry, not an error.
const READ_RETRY_TIMEOUT: Duration = Duration::from_millis(1000);

/// Drive one client connection until it closes or shutdown is signalled.
pub(crate) async fn run_connection<S>(
    stream: S,
    label: &str,
    handlers: &RigHandlers,
    mut shutdown_rx: watch::Receiver<bool>,
) -> std::io::Result<()>
where
    S: AsyncRead + AsyncWrite,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut raw = Vec::new();

    loop {
        // The buffer is only cleared after a complete line so a read that
        // times out mid-line does not lose the partial data.
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    debug!("connection {}: shutdown signalled", label);
                    break;
                }
                continue;
            }
            result = time::timeout(READ_RETRY_TIMEOUT, reader.read_until(b'\n', &mut raw)) => {
                match result {
                    Err(_) => continue,
                    Ok(Ok(0)) => {
                        debug!("connection {}: peer disconnected", label);
                        break;
                    }
                    Ok(Err(e)) => return Err(e),
                    Ok(Ok(_)) => {}
                }
            }
        }

        if let Some(reply) = dispatch(&raw, handlers) {
            writer.write_all(reply.as_bytes()).await?;
            writer.flush().await?;
        }
        raw.clear();
    }

    Ok(())
}

fn status_line(code: i32) -> String {
    format!("RPRT {}\n", code)
}

fn reply_get_int(slot: &Option<GetIntHandler>) -> String {
    let Some(get) = slot else {
        return status_line(STATUS_NOT_AVAILABLE);
    };
    match get() {
        Ok(value) => format!("{}\n", value),
        Err(code) => status_line(code),
    }
}

fn reply_get_float(slot: &Option<GetFloatHandler>) -> String {
    let Some(get) = slot else {
        return status_line(STATUS_NOT_AVAILABLE);
    };
    match get() {
        Ok(value) => format!("{}\n", format_float(value)),
        Err(code) => status_line(code),
    }
}

fn reply_get_mode(slot: &Option<GetModeHandler>) -> String {
    let Some(get) = slot else {
        return status_line(STATUS_NOT_AVAILABLE);
    };
    match get() {
        Ok((mode, passband)) => match mode.wire_name() {
            Some(name) => format!("{}\n{}\n", name, passband),
            None => status_line(STATUS_PROTOCOL),
        },
        Err(code) => status_line(code),
    }
}

/// CTCSS tone travels as tenths of Hz; the handler deals in Hz.
fn reply_get_ctcss_tone(slot: &Option<GetFloatHandler>) -> String {
    let Some(get) = slot else {
        return status_line(STATUS_NOT_AVAILABLE);
    };
    match get() {
        Ok(tone) => format!("{}\n", (tone * 10.0).round() as i32),
        Err(code) => status_line(code),
    }
}

fn reply_set_int(slot: &Option<SetIntHandler>, args: &[&str]) -> String {
    let Some(set) = slot else {
        return status_line(STATUS_NOT_AVAILABLE);
    };
    if args.len() != 1 {
        return status_line(STATUS_PROTOCOL);
    }
    let Ok(value) = parse_int(args[0]) else {
        return status_line(STATUS_PROTOCOL);
    };
    match set(value) {
        Ok(()) => status_line(STATUS_OK),
        Err(code) => status_line(code),
    }
}

fn reply_set_float(slot: &Option<SetFloatHandler>, args: &[&str]) -> String {
    let Some(set) = slot else {
        return status_line(STATUS_NOT_AVAILABLE);
    };
    if args.len() != 1 {
        return status_line(STATUS_PROTOCOL);
    }
    let Ok(value) = parse_float(args[0]) else {
        return status_line(STATUS_PROTOCOL);
    };
    match set(value) {
        Ok(()) => status_line(STATUS_OK),
        Err(code) => status_line(code),
    }
}

fn reply_set_ctcss_tone(slot: &Option<SetFloatHandler>, args: &[&str]) -> String {
    let Some(set) = slot else {
        return status_line(STATUS_NOT_AVAILABLE);
    };
    if args.len() != 1 {
        return status_line(STATUS_PROTOCOL);
    }
    let Ok(tenths) = parse_int(args[0]) else {
        return status_line(STATUS_PROTOCOL);
    };
    match set(tenths as f64 / 10.0) {
        Ok(()) => status_line(STATUS_OK),
        Err(code) => status_line(code),
    }
}

fn reply_set_mode(slot: &Option<SetModeHandler>, args: &[&str]) -> String {
    let Some(set) = slot else {
        return status_line(STATUS_NOT_AVAILABLE);
    };
    if args.len() != 2 {
        return status_line(STATUS_PROTOCOL);
    }
    let mode = Mode::decode(args[0]);
    if mode == Mode::Invalid {
        return status_line(STATUS_PROTOCOL);
    }
    let Ok(passband) = parse_int(args[1]) else {
        return status_line(STATUS_PROTOCOL);
    };
    match set(mode, passband) {
        Ok(()) => status_line(STATUS_OK),
        Err(code) => status_line(code),
    }
}

/// Map one raw command line to its reply, `None` for blank lines.
///
/// A single verb lookup with one fallback arm; nothing can double-reply.
/// The legacy verbs are matched on the raw first byte since they are not
/// valid UTF-8 on their own.
fn dispatch(raw: &[u8], h: &RigHandlers) -> Option<String> {
    let mut line = raw;
    while let [rest @ .., b'\n' | b'\r'] = line {
        line = rest;
    }
    if line.is_empty() {
        return None;
    }

    match line[0] {
        VERB_GET_DCD => Some(reply_get_int(&h.get_dcd)),
        VERB_GET_CTCSS_SQL => Some(reply_get_float(&h.get_ctcss_squelch)),
        VERB_SET_CTCSS_SQL => {
            let Ok(rest) = std::str::from_utf8(&line[1..]) else {
                return Some(status_line(STATUS_PROTOCOL));
            };
            Some(reply_set_float(&h.set_ctcss_squelch, &tokenize(rest)))
        }
        _ => {
            let Ok(text) = std::str::from_utf8(line) else {
                return Some(status_line(STATUS_PROTOCOL));
            };
            let tokens = tokenize(text);
            let (verb, args) = tokens.split_first()?;
            Some(match *verb {
                "f" | "\\get_freq" => reply_get_float(&h.get_freq),
                "F" | "\\set_freq" => reply_set_float(&h.set_freq, args),
                "m" | "\\get_mode" => reply_get_mode(&h.get_mode),
                "M" | "\\set_mode" => reply_set_mode(&h.set_mode, args),
                "j" | "\\get_rit" => reply_get_float(&h.get_rit),
                "J" | "\\set_rit" => reply_set_float(&h.set_rit, args),
                "z" | "\\get_xit" => reply_get_float(&h.get_xit),
                "Z" | "\\set_xit" => reply_set_float(&h.set_xit, args),
                "t" | "\\get_ptt" => reply_get_int(&h.get_ptt),
                "T" | "\\set_ptt" => reply_set_int(&h.set_ptt, args),
                "i" | "\\get_split_freq" => reply_get_float(&h.get_split_freq),
                "I" | "\\set_split_freq" => reply_set_float(&h.set_split_freq, args),
                "y" | "\\get_ant" => reply_get_int(&h.get_antenna),
                "Y" | "\\set_ant" => reply_set_int(&h.set_antenna, args),
                "o" | "\\get_rptr_offs" => reply_get_float(&h.get_repeater_offset),
                "O" | "\\set_rptr_offs" => reply_set_float(&h.set_repeater_offset, args),
                "c" | "\\get_ctcss_tone" => reply_get_ctcss_tone(&h.get_ctcss_tone),
                "C" | "\\set_ctcss_tone" => reply_set_ctcss_tone(&h.set_ctcss_tone, args),
                "n" | "\\get_ts" => reply_get_float(&h.get_tuning_step),
                "N" | "\\set_ts" => reply_set_float(&h.set_tuning_step, args),
                "e" | "\\get_mem" => reply_get_int(&h.get_mem),
                "E" | "\\set_mem" => reply_set_int(&h.set_mem, args),
                "B" | "\\set_bank" => reply_set_int(&h.set_bank, args),
                other => {
                    warn!("unknown rigctl verb: {:?}", other);
                    status_line(STATUS_INVALID_PARAM)
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    fn freq_only_handlers() -> RigHandlers {
        let mut h = RigHandlers::new();
        h.get_freq = Some(Arc::new(|| Ok(7000000.0)));
        h
    }

    #[test]
    fn blank_line_gets_no_reply() {
        let h = RigHandlers::new();
        assert_eq!(dispatch(b"\n", &h), None);
        assert_eq!(dispatch(b"   \r\n", &h), None);
    }

    #[test]
    fn bound_get_replies_with_value_line() {
        let h = freq_only_handlers();
        assert_eq!(dispatch(b"f\n", &h).unwrap(), "7000000.000000\n");
        assert_eq!(dispatch(b"\\get_freq\n", &h).unwrap(), "7000000.000000\n");
    }

    #[test]
    fn unbound_verb_answers_not_available() {
        let h = freq_only_handlers();
        assert_eq!(dispatch(b"y\n", &h).unwrap(), "RPRT -11\n");
    }

    #[test]
    fn unknown_verb_answers_generic_error() {
        let h = freq_only_handlers();
        assert_eq!(dispatch(b"x\n", &h).unwrap(), "RPRT -1\n");
    }

    #[test]
    fn set_with_malformed_argument_skips_the_handler() {
        let called = Arc::new(AtomicBool::new(false));
        let observer = Arc::clone(&called);
        let mut h = RigHandlers::new();
        h.set_freq = Some(Arc::new(move |_| {
            observer.store(true, Ordering::SeqCst);
            Ok(())
        }));

        assert_eq!(dispatch(b"F abc\n", &h).unwrap(), "RPRT -8\n");
        assert_eq!(dispatch(b"F\n", &h).unwrap(), "RPRT -8\n");
        assert!(!called.load(Ordering::SeqCst));

        assert_eq!(dispatch(b"F 7100000\n", &h).unwrap(), "RPRT 0\n");
        assert!(called.load(Ordering::SeqCst));
    }

    #[test]
    fn handler_status_code_is_relayed() {
        let mut h = RigHandlers::new();
        h.set_antenna = Some(Arc::new(|_| Err(-9)));
        assert_eq!(dispatch(b"Y 2\n", &h).unwrap(), "RPRT -9\n");
    }

    #[test]
    fn get_mode_replies_with_two_lines() {
        let mut h = RigHandlers::new();
        h.get_mode = Some(Arc::new(|| Ok((Mode::USB, 2400))));
        assert_eq!(dispatch(b"m\n", &h).unwrap(), "USB\n2400\n");
    }

    #[test]
    fn set_mode_decodes_aliases() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let mut h = RigHandlers::new();
        h.set_mode = Some(Arc::new(move |mode, passband| {
            *sink.lock().unwrap() = Some((mode, passband));
            Ok(())
        }));

        assert_eq!(dispatch(b"M CW-R 500\n", &h).unwrap(), "RPRT 0\n");
        assert_eq!(*seen.lock().unwrap(), Some((Mode::CWR, 500)));

        assert_eq!(dispatch(b"M BOGUS 500\n", &h).unwrap(), "RPRT -8\n");
    }

    #[test]
    fn ctcss_tone_wire_scaling() {
        let seen = Arc::new(Mutex::new(0.0f64));
        let sink = Arc::clone(&seen);
        let mut h = RigHandlers::new();
        h.get_ctcss_tone = Some(Arc::new(|| Ok(88.5)));
        h.set_ctcss_tone = Some(Arc::new(move |hz| {
            *sink.lock().unwrap() = hz;
            Ok(())
        }));

        assert_eq!(dispatch(b"c\n", &h).unwrap(), "885\n");
        assert_eq!(dispatch(b"C 885\n", &h).unwrap(), "RPRT 0\n");
        assert_eq!(*seen.lock().unwrap(), 88.5);
    }

    #[test]
    fn legacy_byte_verbs_dispatch() {
        let mut h = RigHandlers::new();
        h.get_dcd = Some(Arc::new(|| Ok(1)));
        h.get_ctcss_squelch = Some(Arc::new(|| Ok(5.0)));
        h.set_ctcss_squelch = Some(Arc::new(|_| Ok(())));

        assert_eq!(dispatch(&[VERB_GET_DCD, b'\n'], &h).unwrap(), "1\n");
        assert_eq!(
            dispatch(&[VERB_GET_CTCSS_SQL, b'\n'], &h).unwrap(),
            "5.000000\n"
        );

        let mut line = vec![VERB_SET_CTCSS_SQL];
        line.extend_from_slice(b" 5.000000\n");
        assert_eq!(dispatch(&line, &h).unwrap(), "RPRT 0\n");
    }

    #[test]
    fn non_utf8_line_is_a_protocol_error() {
        let h = RigHandlers::new();
        assert_eq!(dispatch(&[b'f', 0xFF, b'\n'], &h).unwrap(), "RPRT -8\n");
    }
}
