//! Frame-level dispatch: CRC check, header field extraction, message-ID routing (§4.2).

use crate::checksum::validate_frame;
use crate::constants::{msg_id, CRC_LEN, HEADER_LEN, MSG_ID_OFFSET, TOW_MS_OFFSET, WEEK_OFFSET};
use crate::decode::ephemeris::{beidou, galileo, glonass, gps, EphemerisContext};
use crate::decode::{range, rangecmp, DecodeContext};
use crate::error::DecodeError;
use crate::fields::{u16_le, u32_le};
use crate::nav::NavStore;
use crate::observation::ObsBuffer;
use crate::time::{adjust_gps_week, GpsTime};
use crate::Decoder;

/// Validates and dispatches one reassembled frame, updating `decoder`'s current time and
/// writing into `obs`/`nav` as appropriate. Returns the frame-level status code from §6.
pub(crate) fn dispatch(
    frame: &[u8],
    decoder: &mut Decoder,
    obs: &mut ObsBuffer,
    nav: &mut NavStore,
) -> i32 {
    match dispatch_inner(frame, decoder, obs, nav) {
        Ok(code) => code,
        Err(_err) => {
            #[cfg(feature = "log")]
            log::warn!("frame rejected: {_err}");
            -1
        },
    }
}

fn dispatch_inner(
    frame: &[u8],
    decoder: &mut Decoder,
    obs: &mut ObsBuffer,
    nav: &mut NavStore,
) -> Result<i32, DecodeError> {
    validate_frame(frame)?;

    let id = u16_le(frame, MSG_ID_OFFSET);
    let raw_week = u16_le(frame, WEEK_OFFSET);
    if raw_week == 0 {
        return Err(DecodeError::ZeroWeek);
    }
    let tow_ms = u32_le(frame, TOW_MS_OFFSET);
    let tow = f64::from(tow_ms) * 1e-3;

    let week = adjust_gps_week(raw_week, decoder.base_week);
    decoder.time = GpsTime::new(week, tow);
    decoder.base_week = week;

    if decoder.verbose {
        decoder.last_diagnostic = Some(crate::diag::describe(frame));
    }

    let body = &frame[HEADER_LEN..frame.len() - CRC_LEN];

    match id {
        msg_id::RANGE => {
            let mut ctx = DecodeContext {
                time: decoder.time,
                options: &decoder.options,
                sat_table: decoder.sat_table.as_ref(),
                wavelength_table: decoder.wavelength_table.as_ref(),
                lock: &mut decoder.lock,
            };
            range::decode(body, &mut ctx, obs, nav)
        },
        msg_id::RANGECMP => {
            let mut ctx = DecodeContext {
                time: decoder.time,
                options: &decoder.options,
                sat_table: decoder.sat_table.as_ref(),
                wavelength_table: decoder.wavelength_table.as_ref(),
                lock: &mut decoder.lock,
            };
            rangecmp::decode(body, &mut ctx, obs, nav)
        },
        msg_id::GPS_EPHEM => {
            let ctx = EphemerisContext {
                time: decoder.time,
                options: &decoder.options,
                sat_table: decoder.sat_table.as_ref(),
                ura_index: decoder.ura_index.as_ref(),
            };
            gps::decode(body, &ctx, nav)
        },
        msg_id::GLO_EPHEM => {
            let ctx = EphemerisContext {
                time: decoder.time,
                options: &decoder.options,
                sat_table: decoder.sat_table.as_ref(),
                ura_index: decoder.ura_index.as_ref(),
            };
            glonass::decode(body, &ctx, nav)
        },
        msg_id::GAL_EPHEM => {
            let ctx = EphemerisContext {
                time: decoder.time,
                options: &decoder.options,
                sat_table: decoder.sat_table.as_ref(),
                ura_index: decoder.ura_index.as_ref(),
            };
            galileo::decode(body, &ctx, nav)
        },
        msg_id::BDS_EPHEM => {
            let ctx = EphemerisContext {
                time: decoder.time,
                options: &decoder.options,
                sat_table: decoder.sat_table.as_ref(),
                ura_index: decoder.ura_index.as_ref(),
            };
            beidou::decode(body, &ctx, nav)
        },
        // Event-log and other recognized-but-undecoded IDs, and anything unknown, return 0
        // without touching any state (§9 open question: no invented behavior for these).
        _ => Ok(0),
    }
}
