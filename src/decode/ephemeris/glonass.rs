//! GLONASS broadcast ephemeris decoder (§4.6).

use crate::decode::ephemeris::{Cursor, EphemerisContext};
use crate::error::DecodeError;
use crate::nav::{GlonassEphemeris, NavStore};
use crate::status::System;
use crate::time::{glonasst_to_gpst, DEFAULT_GLONASST_GPST_OFFSET_SECONDS};

const EXPECTED_LEN: usize = 107;

/// Decodes a GLONASS ephemeris body and stores it unless deduplicated (§4.6, §6).
pub(crate) fn decode(
    body: &[u8],
    ctx: &EphemerisContext<'_>,
    nav: &mut NavStore,
) -> Result<i32, DecodeError> {
    if body.len() != EXPECTED_LEN {
        return Err(DecodeError::InvalidLength {
            message: "GLONASS ephemeris",
            expect: EXPECTED_LEN,
            got: body.len(),
        });
    }

    let mut c = Cursor::new(body);
    let prn = c.u32() as u16;
    let raw_tof = c.f64();
    let raw_channel = c.u16();
    let health = c.u32() as u8;
    let age = c.u8();
    let pos = [c.f64(), c.f64(), c.f64()];
    let vel = [c.f64(), c.f64(), c.f64()];
    let accel = [c.f64(), c.f64(), c.f64()];
    let tau_n = c.f64();
    let gamma_n = c.f64();

    let Some(sat) = ctx.sat_table.sat_index(System::Glonass, prn) else {
        return Err(DecodeError::InvalidField {
            message: "GLONASS ephemeris",
            field: "prn",
        });
    };

    let freq_channel = raw_channel as i8 - 7;
    let toff = DEFAULT_GLONASST_GPST_OFFSET_SECONDS;
    let toe = glonasst_to_gpst(raw_tof, toff, ctx.time);

    let eph = GlonassEphemeris {
        sat,
        toe,
        freq_channel,
        pos,
        vel,
        accel,
        tau_n,
        gamma_n,
        health,
        age,
    };

    let stored = nav.insert_glonass(eph, ctx.options.store_all_ephemerides);
    Ok(if stored { 2 } else { 0 })
}
