//! Message-type decoders: observation records (§4.4, §4.5) and broadcast ephemerides (§4.6).

pub(crate) mod ephemeris;
pub(crate) mod range;
pub(crate) mod rangecmp;

use crate::constants::LLI_SLIP_MARGIN;
use crate::nav::{NavStore, SatelliteTable, WavelengthTable};
use crate::observation::{LockState, LockTable, Lli};
use crate::options::Options;
use crate::status::System;
use crate::time::GpsTime;

/// Shared, borrowed state every observation-record decoder needs, gathered so the per-record
/// loops in [`range`] and [`rangecmp`] don't each carry a half-dozen parameters.
pub(crate) struct DecodeContext<'a> {
    pub time: GpsTime,
    pub options: &'a Options,
    pub sat_table: &'a dyn SatelliteTable,
    pub wavelength_table: &'a dyn WavelengthTable,
    pub lock: &'a mut LockTable,
}

/// Resolves the wire PRN field to a satellite PRN, undoing the GLONASS receiver-channel offset
/// (§4.4: "GLO PRN = raw − 37").
pub(crate) fn resolve_prn(system: System, raw_prn: u16) -> u16 {
    if system == System::Glonass {
        raw_prn.saturating_sub(37)
    } else {
        raw_prn
    }
}

/// Computes the loss-of-lock indicator for one (sat, slot) observation, given the previously
/// stored lock state for that slot (§4.4, §4.5, §8.5).
///
/// `saturated` disables the slip check when the compressed lock-time field has pegged at its
/// maximum representable value, since the delta is no longer meaningful there (§4.5).
pub(crate) fn lli_for(
    prior: Option<LockState>,
    time: GpsTime,
    lock_time: f32,
    parity_known: bool,
    half_cycle_added: bool,
    saturated: bool,
) -> Lli {
    let mut lli = Lli::empty();

    if let Some(prior) = prior {
        if let Some(prior_time) = prior.time {
            if !saturated {
                let dt = time.sub_seconds(prior_time);
                let delta_lock = f64::from(lock_time) - f64::from(prior.lock_time);
                if delta_lock + LLI_SLIP_MARGIN <= dt {
                    lli |= Lli::SLIP;
                }
            }
        }
    }

    if !parity_known {
        lli |= Lli::HALFC;
    }
    if half_cycle_added {
        lli |= Lli::HALFA;
    }

    lli
}

/// Looks up a satellite's carrier wavelength, falling back to the GLONASS channel-dependent
/// default recorded by the RANGE decoder's side effect when the ephemeris-derived value is
/// unavailable (§4.5, §4.8).
pub(crate) fn wavelength_for(
    ctx: &DecodeContext<'_>,
    nav: &NavStore,
    system: System,
    sat: usize,
    freq: usize,
) -> Option<f64> {
    ctx.wavelength_table.wavelength(system, sat, freq, nav)
}
