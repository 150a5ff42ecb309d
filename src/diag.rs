//! Verbose diagnostic string formatting (§6).

use crate::constants::{msg_id, CRC_LEN, HEADER_LEN, MSG_ID_OFFSET, MSG_TYPE_OFFSET, TOW_MS_OFFSET, WEEK_OFFSET};
use crate::fields::{bitfield, u16_le, u32_le};

/// Builds the `"UNICORE<id> (<len>): msg=<nibble> <time>"` diagnostic line for a reassembled
/// frame, with a per-message-type suffix appended when the body is long enough to read it from.
///
/// Produced unconditionally when a caller asks for it (the returned string never depends on the
/// `log` feature); [`crate::dispatch::dispatch`] additionally emits the same information through
/// the `log` facade when that feature is enabled (§7).
pub(crate) fn describe(frame: &[u8]) -> String {
    let id = u16_le(frame, MSG_ID_OFFSET);
    let len = frame.len().saturating_sub(HEADER_LEN + CRC_LEN);
    let nibble = bitfield(frame[MSG_TYPE_OFFSET] as u32, 4, 2);
    let week = u16_le(frame, WEEK_OFFSET);
    let tow = f64::from(u32_le(frame, TOW_MS_OFFSET)) * 1e-3;

    let mut line = format!("UNICORE{id} ({len}): msg={nibble} {week}:{tow:.3}");

    let body = &frame[HEADER_LEN..frame.len() - CRC_LEN];
    match id {
        msg_id::RANGE | msg_id::RANGECMP => {
            if body.len() >= 4 {
                let nobs = u32_le(body, 0);
                line.push_str(&format!(" nobs={nobs}"));
            }
        },
        msg_id::GPS_EPHEM | msg_id::GLO_EPHEM | msg_id::GAL_EPHEM | msg_id::BDS_EPHEM => {
            if body.len() >= 16 {
                let prn = u32_le(body, 0);
                let iod = u32_le(body, 12);
                line.push_str(&format!(" prn={prn} iod={iod}"));
            }
        },
        _ => {},
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_range_diagnostic_line() {
        let mut frame = vec![0u8; HEADER_LEN];
        frame[MSG_ID_OFFSET..MSG_ID_OFFSET + 2].copy_from_slice(&msg_id::RANGE.to_le_bytes());
        frame[WEEK_OFFSET..WEEK_OFFSET + 2].copy_from_slice(&2300u16.to_le_bytes());
        frame[TOW_MS_OFFSET..TOW_MS_OFFSET + 4].copy_from_slice(&100_000u32.to_le_bytes());
        frame.extend_from_slice(&1u32.to_le_bytes());
        frame.extend_from_slice(&[0u8; CRC_LEN]);

        let line = describe(&frame);
        assert!(line.starts_with("UNICORE43"));
        assert!(line.contains("nobs=1"));
    }
}
