//! CRC-32 validation of a reassembled frame.
//!
//! The polynomial itself (reflected, 0xEDB88320) is an external primitive: we delegate the
//! actual table-driven computation to the `crc` crate's `CRC_32_ISO_HDLC` algorithm, which is
//! bit-for-bit the same construction the NovAtel OEM documentation specifies, and only own the
//! frame-shaped validation around it.

use crate::constants::CRC_LEN;
use crate::error::DecodeError;

const CRC32: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);

/// Computes the CRC-32 over `body`.
pub(crate) fn compute(body: &[u8]) -> u32 {
    CRC32.checksum(body)
}

/// Validates a complete frame (header + payload + trailing CRC) and returns the decoded
/// checksum on success.
pub(crate) fn validate_frame(frame: &[u8]) -> Result<(), DecodeError> {
    let crc_start = frame.len() - CRC_LEN;
    let expect = u32::from_le_bytes(
        frame[crc_start..]
            .try_into()
            .expect("CRC_LEN-sized slice converts to [u8; 4]"),
    );
    let got = compute(&frame[..crc_start]);
    if expect == got {
        Ok(())
    } else {
        Err(DecodeError::InvalidChecksum { expect, got })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_crc_32_iso_hdlc_reference_vector() {
        // "123456789" is the standard check vector for CRC-32/ISO-HDLC.
        assert_eq!(compute(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn validates_a_well_formed_trailer() {
        let mut frame = b"hello world".to_vec();
        let crc = compute(&frame);
        frame.extend_from_slice(&crc.to_le_bytes());
        assert!(validate_frame(&frame).is_ok());
    }

    #[test]
    fn rejects_a_corrupted_trailer() {
        let mut frame = b"hello world".to_vec();
        let crc = compute(&frame);
        frame.extend_from_slice(&crc.to_le_bytes());
        *frame.last_mut().unwrap() ^= 0xFF;
        assert!(matches!(
            validate_frame(&frame),
            Err(DecodeError::InvalidChecksum { .. })
        ));
    }
}
