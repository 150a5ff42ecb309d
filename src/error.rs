use core::fmt;

/// Error produced while reassembling or decoding a single frame.
///
/// Mirrors the numeric status codes returned by [`crate::Decoder::input_stream`] and
/// [`crate::Decoder::input_file`] (see the crate-level docs), but carries enough detail for
/// callers that want more than a bare `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The computed CRC-32 over the frame body did not match the trailing 4 bytes.
    InvalidChecksum { expect: u32, got: u32 },
    /// The declared body length does not match what a decoder expects for this message.
    InvalidLength {
        message: &'static str,
        expect: usize,
        got: usize,
    },
    /// A field inside an otherwise well-framed message failed validation.
    InvalidField {
        message: &'static str,
        field: &'static str,
    },
    /// The declared frame size does not fit in the reassembly buffer.
    OutOfMemory { required_size: usize },
    /// The GPS week field was zero, which the wire format uses to mean "unknown".
    ZeroWeek,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidChecksum { expect, got } => write!(
                f,
                "invalid frame checksum, expected 0x{expect:08x}, got 0x{got:08x}"
            ),
            DecodeError::InvalidLength {
                message,
                expect,
                got,
            } => write!(
                f,
                "invalid {message} length, expected {expect} bytes, got {got}"
            ),
            DecodeError::InvalidField { message, field } => {
                write!(f, "invalid field {field} in {message}")
            },
            DecodeError::OutOfMemory { required_size } => write!(
                f,
                "frame of {required_size} bytes exceeds the reassembly buffer"
            ),
            DecodeError::ZeroWeek => f.write_str("zero GPS week field"),
        }
    }
}

impl std::error::Error for DecodeError {}
