//! Compressed RANGECMP observation record decoder, including ADR roll reconstruction (§3, §4.5).

use crate::constants::{MAXVAL, RANGECMP_LOCKTIME_SATURATION};
use crate::decode::{lli_for, resolve_prn, wavelength_for, DecodeContext};
use crate::error::DecodeError;
use crate::fields::{bitfield, i32_le, sign_extend, u16_le, u32_le};
use crate::nav::NavStore;
use crate::observation::{LockState, ObsBuffer, SlotObservation};
use crate::status::{native_freq, System, TrackingStatus};

const RECORD_LEN: usize = 24;

mod offset {
    pub const TRACKING_STATUS: usize = 0;
    pub const DOPPLER_WORD: usize = 4;
    pub const PSR_WORD: usize = 7;
    pub const PSR_LOW_BYTE: usize = 11;
    pub const ADR_RAW: usize = 12;
    pub const PRN: usize = 17;
    pub const LOCKTIME_WORD: usize = 18;
    pub const CN0_WORD: usize = 20;
}

/// Reconstructs the rolled-over carrier phase in cycles from the decompressed pseudorange,
/// wavelength, and raw (mod-[`MAXVAL`]) ADR fraction, per the invariant in §8.3: the result
/// satisfies `|L + adr_raw - MAXVAL*k| < MAXVAL` for `k = round((P/lambda + adr_raw)/MAXVAL)`.
pub(crate) fn reconstruct_adr(psr: f64, lambda: f64, adr_raw: f64) -> f64 {
    let maxval = MAXVAL as f64;
    let adr_rolls = (psr / lambda + adr_raw) / maxval;
    let k = if adr_rolls <= 0.0 {
        (adr_rolls - 0.5).floor()
    } else {
        (adr_rolls + 0.5).floor()
    };
    -adr_raw + maxval * k
}

/// Decodes a RANGECMP message body (`nobs` followed by `nobs` 24-byte records), mirroring
/// [`crate::decode::range::decode`]'s outer loop and return convention.
pub(crate) fn decode(
    body: &[u8],
    ctx: &mut DecodeContext<'_>,
    obs: &mut ObsBuffer,
    nav: &mut NavStore,
) -> Result<i32, DecodeError> {
    if body.len() < 4 {
        return Err(DecodeError::InvalidLength {
            message: "RANGECMP",
            expect: 4,
            got: body.len(),
        });
    }
    let nobs = u32_le(body, 0) as usize;
    let expect = 4 + RECORD_LEN * nobs;
    if body.len() != expect {
        return Err(DecodeError::InvalidLength {
            message: "RANGECMP",
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
    nav: &NavStore,
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

    let raw_prn = record[offset::PRN] as u16;
    let prn = resolve_prn(status.system, raw_prn);
    let Some(sat) = ctx.sat_table.sat_index(status.system, prn) else {
        return false;
    };

    let doppler_word = u32_le(record, offset::DOPPLER_WORD);
    let mut doppler = sign_extend(bitfield(doppler_word, 0, 28), 28) as f32 / 256.0;

    let psr_word = u32_le(record, offset::PSR_WORD);
    let psr_upper = f64::from(psr_word >> 4) / 128.0;
    let psr_lower = f64::from(record[offset::PSR_LOW_BYTE]) * 2_097_152.0;
    let mut psr = psr_upper + psr_lower;

    let adr_raw = f64::from(i32_le(record, offset::ADR_RAW)) / 256.0;

    let lock_word = u32_le(record, offset::LOCKTIME_WORD);
    let lock_time = bitfield(lock_word, 0, 21) as f32 / 32.0;

    let cn0_word = u16_le(record, offset::CN0_WORD) as u32;
    let cn0 = bitfield(cn0_word, 5, 5) as f64 + 20.0;

    let lambda = wavelength_for(ctx, nav, status.system, sat, native_freq(code));
    let mut carrier = match lambda {
        Some(lambda) => reconstruct_adr(psr, lambda, adr_raw),
        None => 0.0,
    };

    if !status.code_lock {
        psr = 0.0;
    }
    if !status.phase_lock {
        carrier = 0.0;
        doppler = 0.0;
    }

    let saturated = lock_time >= RANGECMP_LOCKTIME_SATURATION as f32;
    let prior = ctx.lock.get(sat, slot);
    let lli = lli_for(
        prior,
        ctx.time,
        lock_time,
        status.parity_known,
        status.half_cycle_added,
        saturated,
    );

    let snr = {
        let scaled = (cn0 * 4.0).round();
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconstructed_adr_satisfies_roll_invariant() {
        let lambda = 0.19029367;
        let psr = 22_000_000.0;
        let adr_raw = 1234.5;
        let l = reconstruct_adr(psr, lambda, adr_raw);

        let maxval = MAXVAL as f64;
        let k = ((l + adr_raw) / maxval).round();
        assert!((l + adr_raw - maxval * k).abs() < maxval);
    }

    #[test]
    fn no_roll_when_psr_over_lambda_plus_adr_is_well_inside_one_band() {
        let lambda = 0.19029367;
        let adr_raw = 1_000_000.3;
        let psr = adr_raw * lambda; // psr/lambda + adr_raw == 2*adr_raw, well under MAXVAL
        let l = reconstruct_adr(psr, lambda, adr_raw);
        assert_eq!(l, -adr_raw);
    }

    proptest::proptest! {
        #[test]
        fn reconstruct_adr_satisfies_roll_invariant_for_arbitrary_inputs(
            psr in 1.0e7_f64..6.0e7,
            lambda in 0.10_f64..0.30,
            adr_raw in 0.0_f64..(MAXVAL as f64),
        ) {
            let l = reconstruct_adr(psr, lambda, adr_raw);

            let maxval = MAXVAL as f64;
            let k = ((psr / lambda + adr_raw) / maxval).round();
            proptest::prop_assert!((l + adr_raw - maxval * k).abs() < maxval);
        }
    }
}
