// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! In-memory rig state and the handler bindings exposing it.

use std::sync::{Arc, Mutex};

use rigctl_core::mode::Mode;
use rigctl_core::status::STATUS_INTERNAL;
use rigctl_server::RigHandlers;

/// Emulated rig. Every parameter is plain state: sets store, gets load.
#[derive(Debug, Clone)]
pub struct DummyRig {
    pub freq: f64,
    pub mode: Mode,
    pub passband: i32,
    pub rit: f64,
    pub xit: f64,
    pub ptt: bool,
    pub split_freq: f64,
    pub antenna: i32,
    pub repeater_offset: f64,
    pub ctcss_tone: f64,
    pub ctcss_squelch: f64,
    pub tuning_step: f64,
    pub mem: i32,
    pub bank: i32,
    pub dcd: bool,
}

impl DummyRig {
    pub fn new(freq: f64, mode: Mode, passband: i32) -> DummyRig {
        DummyRig {
            freq,
            mode,
            passband,
            rit: 0.0,
            xit: 0.0,
            ptt: false,
            split_freq: freq,
            antenna: 0,
            repeater_offset: 0.0,
            ctcss_tone: 0.0,
            ctcss_squelch: 0.0,
            tuning_step: 100.0,
            mem: 0,
            bank: 0,
            dcd: false,
        }
    }
}

macro_rules! get_field {
    ($rig:expr, $field:ident) => {{
        let rig = Arc::clone($rig);
        Some(Arc::new(move || {
            rig.lock().map(|r| r.$field).map_err(|_| STATUS_INTERNAL)
        }) as _)
    }};
}

macro_rules! set_field {
    ($rig:expr, $field:ident, $ty:ty) => {{
        let rig = Arc::clone($rig);
        Some(Arc::new(move |v: $ty| {
            rig.lock().map(|mut r| r.$field = v).map_err(|_| STATUS_INTERNAL)
        }) as _)
    }};
}

/// Bind every handler slot to the shared rig state.
pub fn bind_handlers(rig: &Arc<Mutex<DummyRig>>) -> RigHandlers {
    let mut h = RigHandlers::new();

    h.get_freq = get_field!(rig, freq);
    h.set_freq = set_field!(rig, freq, f64);
    h.get_rit = get_field!(rig, rit);
    h.set_rit = set_field!(rig, rit, f64);
    h.get_xit = get_field!(rig, xit);
    h.set_xit = set_field!(rig, xit, f64);
    h.get_split_freq = get_field!(rig, split_freq);
    h.set_split_freq = set_field!(rig, split_freq, f64);
    h.get_antenna = get_field!(rig, antenna);
    h.set_antenna = set_field!(rig, antenna, i32);
    h.get_repeater_offset = get_field!(rig, repeater_offset);
    h.set_repeater_offset = set_field!(rig, repeater_offset, f64);
    h.get_ctcss_tone = get_field!(rig, ctcss_tone);
    h.set_ctcss_tone = set_field!(rig, ctcss_tone, f64);
    h.get_ctcss_squelch = get_field!(rig, ctcss_squelch);
    h.set_ctcss_squelch = set_field!(rig, ctcss_squelch, f64);
    h.get_tuning_step = get_field!(rig, tuning_step);
    h.set_tuning_step = set_field!(rig, tuning_step, f64);
    h.get_mem = get_field!(rig, mem);
    h.set_mem = set_field!(rig, mem, i32);
    h.set_bank = set_field!(rig, bank, i32);

    let r = Arc::clone(rig);
    h.get_mode = Some(Arc::new(move || {
        r.lock()
            .map(|rig| (rig.mode, rig.passband))
            .map_err(|_| STATUS_INTERNAL)
    }));
    let r = Arc::clone(rig);
    h.set_mode = Some(Arc::new(move |mode, passband| {
        r.lock()
            .map(|mut rig| {
                rig.mode = mode;
                rig.passband = passband;
            })
            .map_err(|_| STATUS_INTERNAL)
    }));

    let r = Arc::clone(rig);
    h.get_ptt = Some(Arc::new(move || {
        r.lock().map(|rig| rig.ptt as i32).map_err(|_| STATUS_INTERNAL)
    }));
    let r = Arc::clone(rig);
    h.set_ptt = Some(Arc::new(move |v| {
        r.lock().map(|mut rig| rig.ptt = v != 0).map_err(|_| STATUS_INTERNAL)
    }));
    let r = Arc::clone(rig);
    h.get_dcd = Some(Arc::new(move || {
        r.lock().map(|rig| rig.dcd as i32).map_err(|_| STATUS_INTERNAL)
    }));

    h
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use tokio::time;

    use rigctl_client::Client;
    use rigctl_server::Server;

    fn new_rig() -> Arc<Mutex<DummyRig>> {
        Arc::new(Mutex::new(DummyRig::new(14_074_000.0, Mode::USB, 2400)))
    }

    #[test]
    fn set_handlers_mutate_shared_state() {
        let rig = new_rig();
        let h = bind_handlers(&rig);

        h.set_freq.as_ref().unwrap()(7_030_000.0).unwrap();
        h.set_mode.as_ref().unwrap()(Mode::CW, 500).unwrap();
        h.set_ptt.as_ref().unwrap()(1).unwrap();
        h.set_bank.as_ref().unwrap()(3).unwrap();

        let state = rig.lock().unwrap();
        assert_eq!(state.freq, 7_030_000.0);
        assert_eq!(state.mode, Mode::CW);
        assert_eq!(state.passband, 500);
        assert!(state.ptt);
        assert_eq!(state.bank, 3);
    }

    #[test]
    fn get_handlers_reflect_shared_state() {
        let rig = new_rig();
        let h = bind_handlers(&rig);

        rig.lock().unwrap().dcd = true;
        rig.lock().unwrap().antenna = 2;

        assert_eq!(h.get_freq.as_ref().unwrap()().unwrap(), 14_074_000.0);
        assert_eq!(h.get_mode.as_ref().unwrap()().unwrap(), (Mode::USB, 2400));
        assert_eq!(h.get_dcd.as_ref().unwrap()().unwrap(), 1);
        assert_eq!(h.get_antenna.as_ref().unwrap()().unwrap(), 2);
        assert_eq!(h.get_ptt.as_ref().unwrap()().unwrap(), 0);
    }

    #[tokio::test]
    async fn full_stack_set_then_get() {
        let rig = new_rig();
        let server = Server::detached(bind_handlers(&rig));
        let (near, far) = tokio::io::duplex(1024);
        server.spawn_connection(near, "test");

        let mut client = Client::from_stream(far);
        client.set_freq(7_074_000.0).await.unwrap();
        assert_eq!(client.get_freq().await.unwrap(), 7_074_000.0);
        client.set_mode(Mode::RTTYR, 170).await.unwrap();
        assert_eq!(client.get_mode().await.unwrap(), (Mode::RTTYR, 170));
        client.set_ptt(true).await.unwrap();
        assert!(client.get_ptt().await.unwrap());
        client.set_ctcss_tone(88.5).await.unwrap();
        assert_eq!(client.get_ctcss_tone().await.unwrap(), 88.5);

        time::timeout(Duration::from_secs(5), server.stop())
            .await
            .expect("stop must return");
    }

    #[tokio::test]
    #[ignore = "requires TCP bind permissions"]
    async fn full_stack_over_tcp() {
        let rig = new_rig();
        let server = Server::start("127.0.0.1:0".parse().unwrap(), bind_handlers(&rig))
            .await
            .expect("bind");
        let addr = server.local_addr().unwrap();

        let mut client = Client::connect(&addr.ip().to_string(), addr.port())
            .await
            .unwrap();
        client.set_freq(7_074_000.0).await.unwrap();
        assert_eq!(client.get_freq().await.unwrap(), 7_074_000.0);
        client.set_mode(Mode::RTTYR, 170).await.unwrap();
        assert_eq!(client.get_mode().await.unwrap(), (Mode::RTTYR, 170));
        client.set_ptt(true).await.unwrap();
        assert!(client.get_ptt().await.unwrap());
        client.set_ctcss_tone(88.5).await.unwrap();
        assert_eq!(client.get_ctcss_tone().await.unwrap(), 88.5);

        time::timeout(Duration::from_secs(5), server.stop())
            .await
            .expect("stop must return");
    }
}
