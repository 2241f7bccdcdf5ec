//! Frame extraction from a streaming, possibly noisy, byte source.
//!
//! The bus is free-running: frames can arrive split across reads, glued
//! together, or surrounded by line noise. The decoder scans every candidate
//! offset of its buffer and only yields frames whose checksum verifies,
//! resynchronizing past garbage as it goes.

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use super::checksum::{verify_frame, Checksum};

/// Commands `0x00`-`0x03` are the only defined command codes; any other value
/// at a candidate frame start is line noise.
pub const MAX_COMMAND: u8 = 0x03;

/// Declared payload lengths above this are rejected as noise. Real frames are small.
pub const MAX_PAYLOAD_LEN: u8 = 50;

/// Smallest possible frame: cmd(1) + addr(3) + len(1) + checksum(2).
pub const MIN_FRAME_LEN: usize = 7;

// Once the buffer grows past CAP without yielding a frame, the oldest TRIM
// bytes are discarded so noise cannot accumulate without bound.
const BUFFER_CAP: usize = 256;
const BUFFER_TRIM: usize = 128;

/// One complete protocol message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub command: u8,

    /// 24-bit unit address.
    pub address: u32,

    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(command: u8, address: u32, payload: Vec<u8>) -> Self {
        Self {
            command,
            address,
            payload,
        }
    }

    /// Total on-wire length including the checksum trailer.
    pub fn wire_len(&self) -> usize {
        5 + self.payload.len() + 2
    }

    /// Encode to wire bytes, checksum trailer included.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.wire_len());
        buf.push(self.command);
        buf.push((self.address >> 16) as u8);
        buf.push((self.address >> 8) as u8);
        buf.push(self.address as u8);
        buf.push(self.payload.len() as u8);
        buf.extend_from_slice(&self.payload);

        let sum = buf.iter().checksum();
        buf.extend_from_slice(&sum.to_be_bytes());

        buf
    }
}

#[derive(Error, Debug)]
pub enum FramingError {
    #[error("frame payload of {0} bytes exceeds the one-byte length field")]
    PayloadTooLong(usize),
}

#[derive(Debug, Default)]
pub struct FgaProtocolCodec;

impl FgaProtocolCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for FgaProtocolCodec {
    type Item = Frame;

    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() >= MIN_FRAME_LEN {
            let mut i = 0;
            while i <= src.len() - MIN_FRAME_LEN {
                let command = src[i];

                if command > MAX_COMMAND {
                    i += 1;
                    continue;
                }

                let payload_len = src[i + 4];
                if payload_len > MAX_PAYLOAD_LEN {
                    i += 1;
                    continue;
                }

                let expected = 5 + payload_len as usize + 2;
                if i + expected > src.len() {
                    if i == 0 {
                        // possible frame start at the very front of the buffer:
                        // wait for the rest before giving up on it
                        return Ok(None);
                    }
                    i += 1;
                    continue;
                }

                let address = (u32::from(src[i + 1]) << 16)
                    | (u32::from(src[i + 2]) << 8)
                    | u32::from(src[i + 3]);

                // an all-zero header is a known idle/noise pattern on this bus,
                // not a frame, even though its checksum can verify
                if command == 0x00 && address == 0 && payload_len == 0 {
                    trace!(offset = i, "skipping idle pattern");
                    i += 1;
                    continue;
                }

                let candidate = &src[i..i + expected];
                if verify_frame(candidate) {
                    let frame = Frame {
                        command,
                        address,
                        payload: candidate[5..5 + payload_len as usize].to_vec(),
                    };

                    // drop the frame and any garbage that preceded it
                    src.advance(i + expected);
                    return Ok(Some(frame));
                }

                debug!(offset = i, "checksum failed for candidate frame");
                i += 1;
            }
        }

        if src.len() > BUFFER_CAP {
            debug!(
                discarded = BUFFER_TRIM,
                "no frame in oversized buffer, discarding oldest bytes"
            );
            src.advance(BUFFER_TRIM);
        }

        Ok(None)
    }
}

impl Encoder<Frame> for FgaProtocolCodec {
    type Error = std::io::Error;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if frame.payload.len() > u8::MAX as usize {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                FramingError::PayloadTooLong(frame.payload.len()),
            ));
        }

        dst.reserve(frame.wire_len());
        dst.put(frame.encode().as_slice());

        Ok(())
    }
}
