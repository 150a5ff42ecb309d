//! Uncompressed RANGE observation record decoder (§3, §4.4).

use crate::decode::{lli_for, resolve_prn, DecodeContext};
use crate::error::DecodeError;
use crate::fields::{f32_le, f64_le, u16_le, u32_le};
use crate::nav::NavStore;
use crate::observation::{LockState, ObsBuffer, SlotObservation};
use crate::status::{System, TrackingStatus};

const RECORD_LEN: usize = 44;

mod offset {
    pub const PRN: usize = 0;
    pub const GLOFREQ: usize = 2;
    pub const PSR: usize = 4;
    pub const ADR: usize = 16;
    pub const DOPPLER: usize = 28;
    pub const CN0: usize = 32;
    pub const LOCKTIME: usize = 36;
    pub const TRACKING_STATUS: usize = 40;
}

/// Decodes a RANGE message body (`nobs` followed by `nobs` 44-byte records) and folds each
/// accepted record into `obs`, returning `1` if at least one observation was written and `0`
/// otherwise (§6 return codes).
pub(crate) fn decode(
    body: &[u8],
    ctx: &mut DecodeContext<'_>,
    obs: &mut ObsBuffer,
    nav: &mut NavStore,
) -> Result<i32, DecodeError> {
    if body.len() < 4 {
        return Err(DecodeError::InvalidLength {
            message: "RANGE",
            expect: 4,
            got: body.len(),
        });
    }
    let nobs = u32_le(body, 0) as usize;
    let expect = 4 + RECORD_LEN * nobs;
    if body.len() != expect {
        return Err(DecodeError::InvalidLength {
            message: "RANGE",
            expect,
            got: body.len(),
        });
    }

    let mut updated = 0usize;
    for i in 0..nobs {
        let record = &body[4 + i * RECORD_LEN..4 + (i + 1) * RECORD_LEN];
        if decode_record(record, ctx, obs, nav) {
            updated += 1;
        }
    }

    Ok(if updated > 0 { 1 } else { 0 })
}

fn decode_record(
    record: &[u8],
    ctx: &mut DecodeContext<'_>,
    obs: &mut ObsBuffer,
    nav: &mut NavStore,
) -> bool {
    let raw_status = u32_le(record, offset::TRACKING_STATUS);
    let Some(status) = TrackingStatus::decode(raw_status) else {
        return false;
    };
    let Some((slot, code)) = status.resolve_slot(ctx.options) else {
        return false;
    };
    if status.system == System::Glonass && !status.parity_known {
        return false;
    }

    let raw_prn = u16_le(record, offset::PRN);
    let prn = resolve_prn(status.system, raw_prn);
    let Some(sat) = ctx.sat_table.sat_index(status.system, prn) else {
        return false;
    };

    if status.system == System::Glonass {
        let raw_channel = u16_le(record, offset::GLOFREQ);
        let channel = raw_channel as i8 - 7;
        if nav.glonass_channel(sat) != Some(channel) {
            nav.set_glonass_channel(sat, channel);
        }
    }

    let mut psr = f64_le(record, offset::PSR);
    let adr = f64_le(record, offset::ADR);
    let mut doppler = f32_le(record, offset::DOPPLER);
    let cn0 = f32_le(record, offset::CN0);
    let lock_time = f32_le(record, offset::LOCKTIME);

    let mut carrier = -adr;
    if !status.code_lock {
        psr = 0.0;
    }
    if !status.phase_lock {
        carrier = 0.0;
        doppler = 0.0;
    }

    let prior = ctx.lock.get(sat, slot);
    let lli = lli_for(
        prior,
        ctx.time,
        lock_time,
        status.parity_known,
        status.half_cycle_added,
        false,
    );

    let snr = {
        let scaled = (f64::from(cn0) * 4.0).round();
        if (0.0..=255.0).contains(&scaled) {
            scaled as u8
        } else {
            0
        }
    };

    obs.record(
        ctx.time,
        status.system,
        sat,
        slot,
        SlotObservation {
            carrier,
            code: psr,
            doppler,
            snr,
            lli,
            code_id: code as u8,
            valid: true,
        },
    );

    ctx.lock.set(
        sat,
        slot,
        LockState {
            time: Some(ctx.time),
            lock_time,
            half_cycle: status.half_cycle_added,
        },
    );

    true
}
