// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Request/response driver against a rigctld-compatible peer.
//!
//! Every accessor performs exactly one blocking round trip: send one
//! command line, read the reply line(s) with a bounded timeout. A `Client`
//! supports one in-flight request at a time; concurrent callers must
//! serialize externally or use one client per connection.

use std::time::Duration;

use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf,
};
use tokio::net::TcpStream;
use tokio::time;
use tracing::debug;

use rigctl_core::error::{RigctlError, RigctlResult};
use rigctl_core::mode::Mode;
use rigctl_core::status::RPRT;
use rigctl_core::wire::{
    format_float, parse_float, parse_int, tokenize, VERB_GET_CTCSS_SQL, VERB_GET_DCD,
    VERB_SET_CTCSS_SQL,
};

/// Default bound on a single receive.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// rigctl protocol client. Exclusively owns one connection.
pub struct Client<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    timeout: Duration,
}

impl Client<TcpStream> {
    /// Connect to a rigctld-compatible server.
    pub async fn connect(host: &str, port: u16) -> std::io::Result<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        debug!("connected to rigctld at {}:{}", host, port);
        Ok(Self::from_stream(stream))
    }
}

impl<S: AsyncRead + AsyncWrite> Client<S> {
    /// Wrap an already-established stream.
    pub fn from_stream(stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Client {
            reader: BufReader::new(reader),
            writer,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Change the per-round-trip receive timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Shut down the write side of the connection.
    pub async fn close(&mut self) -> RigctlResult<()> {
        self.writer.shutdown().await?;
        Ok(())
    }

    async fn send_line(&mut self, line: &[u8]) -> RigctlResult<()> {
        self.writer.write_all(line).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Read one line within the timeout and split it into tokens.
    async fn recv_line(&mut self) -> RigctlResult<Vec<String>> {
        let mut raw = Vec::new();
        let n = time::timeout(self.timeout, self.reader.read_until(b'\n', &mut raw))
            .await
            .map_err(|_| RigctlError::Timeout)??;
        if n == 0 {
            return Err(RigctlError::Closed);
        }
        let line = String::from_utf8_lossy(&raw);
        Ok(tokenize(line.trim_end_matches(&['\r', '\n']))
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Read and decode a `RPRT <code>` status line.
    async fn recv_status(&mut self) -> RigctlResult<i32> {
        let args = self.recv_line().await?;
        if args.len() != 2 || args[0] != RPRT {
            return Err(RigctlError::Protocol(format!(
                "expected status line, got {} token(s)",
                args.len()
            )));
        }
        parse_int(&args[1])
    }

    async fn get_int(&mut self, cmd: &[u8]) -> RigctlResult<i32> {
        let mut line = cmd.to_vec();
        line.push(b'\n');
        self.send_line(&line).await?;
        let args = self.recv_line().await?;
        if args.len() != 1 {
            return Err(RigctlError::Protocol(format!(
                "expected one value token, got {}",
                args.len()
            )));
        }
        parse_int(&args[0])
    }

    async fn get_float(&mut self, cmd: &[u8]) -> RigctlResult<f64> {
        let mut line = cmd.to_vec();
        line.push(b'\n');
        self.send_line(&line).await?;
        let args = self.recv_line().await?;
        if args.len() != 1 {
            return Err(RigctlError::Protocol(format!(
                "expected one value token, got {}",
                args.len()
            )));
        }
        parse_float(&args[0])
    }

    async fn set_int(&mut self, cmd: &[u8], value: i32) -> RigctlResult<i32> {
        let mut line = cmd.to_vec();
        line.extend_from_slice(format!(" {}\n", value).as_bytes());
        self.send_line(&line).await?;
        self.recv_status().await
    }

    async fn set_float(&mut self, cmd: &[u8], value: f64) -> RigctlResult<i32> {
        let mut line = cmd.to_vec();
        line.extend_from_slice(format!(" {}\n", format_float(value)).as_bytes());
        self.send_line(&line).await?;
        self.recv_status().await
    }

    /// Get the current frequency in Hz.
    pub async fn get_freq(&mut self) -> RigctlResult<f64> {
        self.get_float(b"f").await
    }

    /// Set the frequency in Hz. Returns the signed RPRT status code.
    pub async fn set_freq(&mut self, freq: f64) -> RigctlResult<i32> {
        self.set_float(b"F", freq).await
    }

    /// Get the current mode and passband width in Hz.
    ///
    /// The reply is two lines (mode, then passband). If the mode token does
    /// not decode, the passband line is still consumed so the next round
    /// trip stays framed, and the call fails with `InvalidMode`.
    pub async fn get_mode(&mut self) -> RigctlResult<(Mode, i32)> {
        self.send_line(b"m\n").await?;

        let args = self.recv_line().await?;
        if args.len() != 1 {
            return Err(RigctlError::Protocol(format!(
                "expected one mode token, got {}",
                args.len()
            )));
        }
        let mode = Mode::decode(&args[0]);
        if mode == Mode::Invalid {
            // Consume the passband line to leave the connection usable.
            let _ = self.recv_line().await;
            return Err(RigctlError::InvalidMode);
        }

        let args = self.recv_line().await?;
        if args.len() != 1 {
            return Err(RigctlError::Protocol(format!(
                "expected one passband token, got {}",
                args.len()
            )));
        }
        let passband = parse_int(&args[0])?;
        Ok((mode, passband))
    }

    /// Set mode and passband. `Mode::Invalid` fails locally without any
    /// wire traffic.
    pub async fn set_mode(&mut self, mode: Mode, passband: i32) -> RigctlResult<i32> {
        let Some(name) = mode.wire_name() else {
            return Err(RigctlError::InvalidMode);
        };
        self.send_line(format!("M {} {}\n", name, passband).as_bytes())
            .await?;
        self.recv_status().await
    }

    /// Get the receiver incremental tuning offset in Hz.
    pub async fn get_rit(&mut self) -> RigctlResult<f64> {
        self.get_float(b"j").await
    }

    /// Set the receiver incremental tuning offset in Hz.
    pub async fn set_rit(&mut self, rit: f64) -> RigctlResult<i32> {
        self.set_float(b"J", rit).await
    }

    /// Get the transmitter incremental tuning offset in Hz.
    pub async fn get_xit(&mut self) -> RigctlResult<f64> {
        self.get_float(b"z").await
    }

    /// Set the transmitter incremental tuning offset in Hz.
    pub async fn set_xit(&mut self, xit: f64) -> RigctlResult<i32> {
        self.set_float(b"Z", xit).await
    }

    /// Get the push-to-talk state.
    pub async fn get_ptt(&mut self) -> RigctlResult<bool> {
        Ok(self.get_int(b"t").await? != 0)
    }

    /// Key or unkey the transmitter.
    pub async fn set_ptt(&mut self, ptt: bool) -> RigctlResult<i32> {
        self.set_int(b"T", ptt as i32).await
    }

    /// Get the split (TX) frequency in Hz.
    pub async fn get_split_freq(&mut self) -> RigctlResult<f64> {
        self.get_float(b"i").await
    }

    /// Set the split (TX) frequency in Hz.
    pub async fn set_split_freq(&mut self, freq: f64) -> RigctlResult<i32> {
        self.set_float(b"I", freq).await
    }

    /// Get the selected antenna number.
    pub async fn get_antenna(&mut self) -> RigctlResult<i32> {
        self.get_int(b"y").await
    }

    /// Select an antenna.
    pub async fn set_antenna(&mut self, antenna: i32) -> RigctlResult<i32> {
        self.set_int(b"Y", antenna).await
    }

    /// Get the data-carrier-detect state (read-only legacy verb).
    pub async fn get_dcd(&mut self) -> RigctlResult<bool> {
        Ok(self.get_int(&[VERB_GET_DCD]).await? != 0)
    }

    /// Get the repeater offset in Hz.
    pub async fn get_repeater_offset(&mut self) -> RigctlResult<f64> {
        self.get_float(b"o").await
    }

    /// Set the repeater offset in Hz.
    pub async fn set_repeater_offset(&mut self, offset: f64) -> RigctlResult<i32> {
        self.set_float(b"O", offset).await
    }

    /// Get the CTCSS tone in Hz. The wire carries tenths of Hz.
    pub async fn get_ctcss_tone(&mut self) -> RigctlResult<f64> {
        Ok(self.get_int(b"c").await? as f64 / 10.0)
    }

    /// Set the CTCSS tone in Hz, rounded to the nearest tenth on the wire.
    pub async fn set_ctcss_tone(&mut self, tone: f64) -> RigctlResult<i32> {
        self.set_int(b"C", (tone * 10.0).round() as i32).await
    }

    /// Get the CTCSS squelch level (legacy verb).
    pub async fn get_ctcss_squelch(&mut self) -> RigctlResult<f64> {
        self.get_float(&[VERB_GET_CTCSS_SQL]).await
    }

    /// Set the CTCSS squelch level (legacy verb).
    pub async fn set_ctcss_squelch(&mut self, squelch: f64) -> RigctlResult<i32> {
        self.set_float(&[VERB_SET_CTCSS_SQL], squelch).await
    }

    /// Get the tuning step in Hz.
    pub async fn get_tuning_step(&mut self) -> RigctlResult<f64> {
        self.get_float(b"n").await
    }

    /// Set the tuning step in Hz.
    pub async fn set_tuning_step(&mut self, step: f64) -> RigctlResult<i32> {
        self.set_float(b"N", step).await
    }

    /// Select a memory bank (write-only).
    pub async fn set_bank(&mut self, bank: i32) -> RigctlResult<i32> {
        self.set_int(b"B", bank).await
    }

    /// Get the selected memory channel.
    pub async fn get_mem(&mut self) -> RigctlResult<i32> {
        self.get_int(b"e").await
    }

    /// Select a memory channel.
    pub async fn set_mem(&mut self, mem: i32) -> RigctlResult<i32> {
        self.set_int(b"E", mem).await
    }

    /// String-valued gets are not implemented by this client.
    pub async fn get_string(&mut self, _cmd: &str) -> RigctlResult<String> {
        Err(RigctlError::NotSupported)
    }

    /// String-valued sets are not implemented by this client.
    pub async fn set_string(&mut self, _cmd: &str, _value: &str) -> RigctlResult<i32> {
        Err(RigctlError::NotSupported)
    }
}
