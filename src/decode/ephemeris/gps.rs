//! GPS broadcast ephemeris decoder (§4.6).

use crate::decode::ephemeris::{Cursor, EphemerisContext};
use crate::error::DecodeError;
use crate::nav::{KeplerianEphemeris, NavStore};
use crate::status::System;
use crate::time::{adjust_week_for_toe, GpsTime};

const EXPECTED_LEN: usize = 191;

/// Decodes a GPS ephemeris body and stores it unless deduplicated, returning `0` (no-op) or `2`
/// (stored) per §6. A primary/secondary IODE mismatch aborts the record and returns an error,
/// leaving the store untouched (§8.6).
pub(crate) fn decode(
    body: &[u8],
    ctx: &EphemerisContext<'_>,
    nav: &mut NavStore,
) -> Result<i32, DecodeError> {
    if body.len() != EXPECTED_LEN {
        return Err(DecodeError::InvalidLength {
            message: "GPS ephemeris",
            expect: EXPECTED_LEN,
            got: body.len(),
        });
    }

    let mut c = Cursor::new(body);
    let prn = c.u32() as u16;
    let tow = c.f64();
    let health = c.u32() as u8;
    let iode1 = c.u32() as i32;
    let iodc = c.u32() as i32;
    let raw_week = c.u16();
    let toe = c.f64();
    let sqrt_a = c.f64();
    let delta_n = c.f64();
    let m0 = c.f64();
    let e = c.f64();
    let omega = c.f64();
    let cuc = c.f64();
    let cus = c.f64();
    let crc = c.f64();
    let crs = c.f64();
    let cic = c.f64();
    let cis = c.f64();
    let i0 = c.f64();
    let idot = c.f64();
    let omega0 = c.f64();
    let omega_dot = c.f64();
    let iode2 = c.u32() as i32;
    let tgd = c.f64();
    let af0 = c.f64();
    let af1 = c.f64();
    let af2 = c.f64();
    let raw_ura = c.u8();

    if iode1 != iode2 {
        return Err(DecodeError::InvalidField {
            message: "GPS ephemeris",
            field: "iode",
        });
    }

    let Some(sat) = ctx.sat_table.sat_index(System::Gps, prn) else {
        return Err(DecodeError::InvalidField {
            message: "GPS ephemeris",
            field: "prn",
        });
    };

    let toe_week = adjust_week_for_toe(raw_week, toe, ctx.time);
    let ttr_week = adjust_week_for_toe(raw_week, tow, ctx.time);

    let eph = KeplerianEphemeris {
        system: System::Gps,
        sat,
        toe: GpsTime::new(toe_week, toe),
        toc: GpsTime::new(toe_week, toe),
        ttr: GpsTime::new(ttr_week, tow),
        iode: iode1,
        iodc,
        sqrt_a,
        e,
        i0,
        omega0,
        omega,
        m0,
        delta_n,
        omega_dot,
        idot,
        cus,
        cuc,
        cis,
        cic,
        crs,
        crc,
        af0,
        af1,
        af2,
        tgd: [tgd, 0.0],
        health,
        ura_index: ctx.ura_index.index(raw_ura),
        code_bits: 0,
    };

    let stored = nav.insert_keplerian(eph, ctx.options.store_all_ephemerides);
    Ok(if stored { 2 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::{DefaultSatelliteTable, DefaultUraIndex};
    use crate::options::Options;

    fn record(iode1: u32, iode2: u32, toe: f64) -> Vec<u8> {
        let mut c = Vec::with_capacity(EXPECTED_LEN);
        c.extend_from_slice(&5u32.to_le_bytes()); // prn
        c.extend_from_slice(&100.0f64.to_le_bytes()); // tow
        c.extend_from_slice(&0u32.to_le_bytes()); // health
        c.extend_from_slice(&iode1.to_le_bytes());
        c.extend_from_slice(&20u32.to_le_bytes()); // iodc
        c.extend_from_slice(&2300u16.to_le_bytes()); // week
        c.extend_from_slice(&toe.to_le_bytes());
        // sqrt_a, delta_n, m0, e, omega, cuc, cus, crc, crs, cic, cis, i0, idot, omega0, omega_dot
        for _ in 0..15 {
            c.extend_from_slice(&0.0f64.to_le_bytes());
        }
        c.extend_from_slice(&iode2.to_le_bytes());
        for _ in 0..4 {
            c.extend_from_slice(&0.0f64.to_le_bytes());
        }
        c.push(0); // ura
        assert_eq!(c.len(), EXPECTED_LEN);
        c
    }

    fn context() -> (DefaultSatelliteTable, DefaultUraIndex, Options) {
        (DefaultSatelliteTable, DefaultUraIndex, Options::default())
    }

    #[test]
    fn stores_new_ephemeris_then_dedups_identical() {
        let (sat_table, ura_index, options) = context();
        let ctx = EphemerisContext {
            time: GpsTime::new(2300, 100.0),
            options: &options,
            sat_table: &sat_table,
            ura_index: &ura_index,
        };
        let mut nav = NavStore::new();
        let body = record(10, 10, 100.0);

        assert_eq!(decode(&body, &ctx, &mut nav).unwrap(), 2);
        assert_eq!(decode(&body, &ctx, &mut nav).unwrap(), 0);
    }

    #[test]
    fn mismatched_iode_is_rejected() {
        let (sat_table, ura_index, options) = context();
        let ctx = EphemerisContext {
            time: GpsTime::new(2300, 100.0),
            options: &options,
            sat_table: &sat_table,
            ura_index: &ura_index,
        };
        let mut nav = NavStore::new();
        let body = record(10, 11, 100.0);

        assert!(decode(&body, &ctx, &mut nav).is_err());
        assert!(nav.keplerian(System::Gps, 5).is_none());
    }
}
