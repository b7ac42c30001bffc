//! KISS framing over a serial port (or a TCP-forwarded serial link).
//!
//! A full implementation of the standard byte-stuffing scheme
//! (FEND/FESC/TFEND/TFESC) backing `SerialKISS`.
use std::io::{Read, Write};
use std::time::{Duration, Instant};

use serialport::SerialPort;

use super::Interface;
use crate::error::{TransportError, TransportResult};

const FEND: u8 = 0xC0;
const FESC: u8 = 0xDB;
const TFEND: u8 = 0xDC;
const TFESC: u8 = 0xDD;
const DATA_FRAME_CMD: u8 = 0x00;

const DEFAULT_MTU: usize = 1024;
/// AX100 serial default line parameters: 115200 8N1.
pub const DEFAULT_BAUD: u32 = 115200;

/// Wrap `data` in a single KISS data frame (port 0, command 0).
pub fn encode_frame(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 4);
    out.push(FEND);
    out.push(DATA_FRAME_CMD);
    for &byte in data {
        match byte {
            FEND => {
                out.push(FESC);
                out.push(TFEND);
            }
            FESC => {
                out.push(FESC);
                out.push(TFESC);
            }
            other => out.push(other),
        }
    }
    out.push(FEND);
    out
}

/// Unescape a single KISS frame's body (bytes strictly between its
/// delimiting `FEND`s, command byte already stripped).
fn unescape(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    let mut iter = body.iter().copied();
    while let Some(byte) = iter.next() {
        if byte == FESC {
            match iter.next() {
                Some(TFEND) => out.push(FEND),
                Some(TFESC) => out.push(FESC),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(byte);
        }
    }
    out
}

/// Scan `buf` for a complete `FEND ... FEND` frame. Returns the decoded
/// payload (command byte stripped, escaping undone) and the number of
/// leading bytes of `buf` that frame consumed, or `None` if no complete
/// frame is present yet.
fn extract_frame(buf: &[u8]) -> Option<(Vec<u8>, usize)> {
    let start = buf.iter().position(|&b| b == FEND)?;
    let end = buf[start + 1..].iter().position(|&b| b == FEND)? + start + 1;
    let body = &buf[start + 1..end];
    let body = if body.first() == Some(&DATA_FRAME_CMD) {
        &body[1..]
    } else {
        body
    };
    Some((unescape(body), end + 1))
}

/// A KISS-framed transport over any `serialport::SerialPort`, including one
/// obtained from a TCP-forwarded virtual serial device.
pub struct SerialKISS {
    name: String,
    mtu: usize,
    port: Box<dyn SerialPort>,
    rx_buf: Vec<u8>,
}

impl SerialKISS {
    pub fn new(name: impl Into<String>, path: &str, baud: u32) -> TransportResult<Self> {
        let port = serialport::new(path, baud)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|e| TransportError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        Ok(Self {
            name: name.into(),
            mtu: DEFAULT_MTU,
            port,
            rx_buf: Vec::new(),
        })
    }

    pub fn with_mtu(mut self, mtu: usize) -> Self {
        self.mtu = mtu;
        self
    }
}

impl Interface for SerialKISS {
    fn send(&mut self, data: &[u8]) -> TransportResult<()> {
        let frame = encode_frame(data);
        self.port
            .write_all(&frame)
            .map_err(|e| TransportError::Io(e))?;
        Ok(())
    }

    fn recv(&mut self, timeout: Duration) -> TransportResult<Option<Vec<u8>>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some((payload, consumed)) = extract_frame(&self.rx_buf) {
                self.rx_buf.drain(..consumed);
                return Ok(Some(payload));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            let mut chunk = [0u8; 256];
            match self.port.read(&mut chunk) {
                Ok(0) => return Ok(None),
                Ok(n) => self.rx_buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => continue,
                Err(e) => return Err(TransportError::Io(e)),
            }
        }
    }

    fn mtu(&self) -> usize {
        self.mtu
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encode_then_extract_round_trip() {
        let data = b"hello kiss";
        let frame = encode_frame(data);
        let (payload, consumed) = extract_frame(&frame).unwrap();
        assert_eq!(payload, data);
        assert_eq!(consumed, frame.len());
    }

    #[test]
    fn escapes_fend_and_fesc_bytes_in_payload() {
        let data = [FEND, FESC, 0x01];
        let frame = encode_frame(&data);
        // Body must not contain a bare FEND or FESC other than the delimiters
        // and the escape sequences themselves.
        let (payload, _) = extract_frame(&frame).unwrap();
        assert_eq!(payload, data);
    }

    #[test]
    fn extract_frame_returns_none_on_incomplete_buffer() {
        let data = b"partial";
        let mut frame = encode_frame(data);
        frame.pop(); // drop the trailing FEND
        assert_eq!(extract_frame(&frame), None);
    }
}
