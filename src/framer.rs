//! Byte-level synchronizer and length-prefixed reassembly buffer (§4.1).
//!
//! The framer is a pure state machine: every entry point in [`crate::decoder`] (stream or
//! file) funnels bytes through [`Framer::feed_byte`], so no framing logic is duplicated between
//! them (§4.9).

use crate::constants::{CRC_LEN, HEADER_LEN, LENGTH_OFFSET, MAXRAWLEN, SYNC, SYNC_LEN};
use crate::error::DecodeError;
use crate::fields::u16_le;

/// Result of feeding one byte (or, in file mode, one bulk chunk) to the [`Framer`].
pub(crate) enum FramerEvent {
    /// Still synchronizing or still waiting on more bytes.
    Incomplete,
    /// A complete frame (header + body + CRC) is ready for dispatch.
    Frame(Vec<u8>),
    /// A framing error: oversize declared length. The framer has already resumed
    /// synchronizing; no partial message is ever delivered (§4.1 fail modes).
    Error(DecodeError),
}

#[derive(Debug, Clone)]
pub(crate) struct Framer {
    buf: Vec<u8>,
    nbyte: usize,
    frame_size: usize,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framer {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(HEADER_LEN + 64),
            nbyte: 0,
            frame_size: 0,
        }
    }

    /// Feeds a single byte through the sync/reassembly state machine.
    pub fn feed_byte(&mut self, byte: u8) -> FramerEvent {
        if self.nbyte == 0 {
            // Looking for sync: shift the tail of what we've seen and test for a match,
            // exactly mirroring the three-byte sliding window in §4.1.
            if self.buf.len() >= SYNC_LEN {
                self.buf.remove(0);
            }
            self.buf.push(byte);
            if self.buf.len() == SYNC_LEN && self.buf[..] == SYNC {
                self.nbyte = SYNC_LEN;
            }
            return FramerEvent::Incomplete;
        }

        self.buf.push(byte);
        self.nbyte += 1;

        if self.nbyte == LENGTH_OFFSET + 2 {
            let body_len = u16_le(&self.buf, LENGTH_OFFSET) as usize;
            let total = HEADER_LEN + body_len;
            if total + CRC_LEN > MAXRAWLEN {
                self.reset();
                return FramerEvent::Error(DecodeError::OutOfMemory {
                    required_size: total + CRC_LEN,
                });
            }
            self.frame_size = total;
        }

        if self.frame_size > 0 && self.nbyte == self.frame_size + CRC_LEN {
            let frame = core::mem::take(&mut self.buf);
            self.reset();
            return FramerEvent::Frame(frame);
        }

        FramerEvent::Incomplete
    }

    fn reset(&mut self) {
        self.buf.clear();
        self.nbyte = 0;
        self.frame_size = 0;
    }

    /// `true` once the three sync bytes have been matched (§4.9 file-mode bulk-read fast path).
    pub fn synced(&self) -> bool {
        self.nbyte >= SYNC_LEN
    }

    /// Bytes still needed to complete the current frame once the declared length is known
    /// (`nbyte` has reached [`crate::constants::MIN_HEADER_PEEK`]).
    pub fn bytes_until_length_known(&self) -> usize {
        crate::constants::MIN_HEADER_PEEK.saturating_sub(self.nbyte)
    }

    pub fn bytes_remaining_in_frame(&self) -> usize {
        (self.frame_size + CRC_LEN).saturating_sub(self.nbyte)
    }
}
