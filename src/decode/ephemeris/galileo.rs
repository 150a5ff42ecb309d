//! Galileo broadcast ephemeris decoder: dual INAV/FNAV clocks, health packing, data-source bits
//! (§4.6).

use crate::decode::ephemeris::{Cursor, EphemerisContext};
use crate::error::DecodeError;
use crate::nav::{KeplerianEphemeris, NavStore};
use crate::options::GalileoClockSource;
use crate::status::System;
use crate::time::{adjust_week_for_toe, GpsTime};

const EXPECTED_LEN: usize = 219;

const INAV_CODE_BITS: u32 = (1 << 0) | (1 << 9);
const FNAV_CODE_BITS: u32 = (1 << 1) | (1 << 8);

struct Clock {
    af0: f64,
    af1: f64,
    af2: f64,
}

/// Decodes a Galileo ephemeris body, choosing between the INAV and FNAV clock solutions per
/// [`GalileoClockSource`], and stores it unless deduplicated (§4.6, §6).
pub(crate) fn decode(
    body: &[u8],
    ctx: &EphemerisContext<'_>,
    nav: &mut NavStore,
) -> Result<i32, DecodeError> {
    if body.len() != EXPECTED_LEN {
        return Err(DecodeError::InvalidLength {
            message: "Galileo ephemeris",
            expect: EXPECTED_LEN,
            got: body.len(),
        });
    }

    let mut c = Cursor::new(body);
    let prn = c.u32() as u16;
    let tow = c.f64();
    let rcv_inav = c.u8() != 0;
    let rcv_fnav = c.u8() != 0;
    let iod_nav = c.u32() as i32;
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
    let inav = Clock {
        af0: c.f64(),
        af1: c.f64(),
        af2: c.f64(),
    };
    let fnav = Clock {
        af0: c.f64(),
        af1: c.f64(),
        af2: c.f64(),
    };
    let tgd_e1e5a = c.f64();
    let tgd_e1e5b = c.f64();
    let svh_e1b = c.u8();
    let dvs_e1b = c.u8();
    let svh_e5a = c.u8();
    let dvs_e5a = c.u8();
    let svh_e5b = c.u8();
    let dvs_e5b = c.u8();
    let raw_sisa = c.u8();

    let Some(sat) = ctx.sat_table.sat_index(System::Galileo, prn) else {
        return Err(DecodeError::InvalidField {
            message: "Galileo ephemeris",
            field: "prn",
        });
    };

    let use_inav = match ctx.options.galileo_clock {
        GalileoClockSource::Inav => true,
        GalileoClockSource::Fnav => false,
        GalileoClockSource::Auto => rcv_inav || !rcv_fnav,
    };
    let (clock, code_bits) = if use_inav {
        (&inav, INAV_CODE_BITS)
    } else {
        (&fnav, FNAV_CODE_BITS)
    };

    let health = ((svh_e5b as u32) << 7
        | (dvs_e5b as u32) << 6
        | (svh_e5a as u32) << 4
        | (dvs_e5a as u32) << 3
        | (svh_e1b as u32) << 1
        | dvs_e1b as u32) as u8;

    let toe_week = adjust_week_for_toe(raw_week, toe, ctx.time);
    let ttr_week = adjust_week_for_toe(raw_week, tow, ctx.time);

    let eph = KeplerianEphemeris {
        system: System::Galileo,
        sat,
        toe: GpsTime::new(toe_week, toe),
        toc: GpsTime::new(toe_week, toe),
        ttr: GpsTime::new(ttr_week, tow),
        iode: iod_nav,
        iodc: 0,
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
        af0: clock.af0,
        af1: clock.af1,
        af2: clock.af2,
        tgd: [tgd_e1e5a, tgd_e1e5b],
        health,
        ura_index: ctx.ura_index.index(raw_sisa),
        code_bits,
    };

    let stored = nav.insert_keplerian(eph, ctx.options.store_all_ephemerides);
    Ok(if stored { 2 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::{DefaultSatelliteTable, DefaultUraIndex};
    use crate::options::Options;

    fn record(rcv_inav: u8, rcv_fnav: u8, iod_nav: u32) -> Vec<u8> {
        let mut c = Vec::with_capacity(EXPECTED_LEN);
        c.extend_from_slice(&11u32.to_le_bytes()); // prn
        c.extend_from_slice(&100.0f64.to_le_bytes()); // tow
        c.push(rcv_inav);
        c.push(rcv_fnav);
        c.extend_from_slice(&iod_nav.to_le_bytes());
        c.extend_from_slice(&2300u16.to_le_bytes()); // week
        c.extend_from_slice(&100.0f64.to_le_bytes()); // toe
        // sqrt_a, delta_n, m0, e, omega, cuc, cus, crc, crs, cic, cis, i0, idot, omega0, omega_dot
        for _ in 0..15 {
            c.extend_from_slice(&0.0f64.to_le_bytes());
        }
        // inav af0/af1/af2
        for _ in 0..3 {
            c.extend_from_slice(&0.0f64.to_le_bytes());
        }
        // fnav af0/af1/af2
        for _ in 0..3 {
            c.extend_from_slice(&0.0f64.to_le_bytes());
        }
        c.extend_from_slice(&0.0f64.to_le_bytes()); // tgd_e1e5a
        c.extend_from_slice(&0.0f64.to_le_bytes()); // tgd_e1e5b
        c.extend_from_slice(&[0, 0, 0, 0, 0, 0]); // health bits
        c.push(0); // sisa
        assert_eq!(c.len(), EXPECTED_LEN);
        c
    }

    #[test]
    fn fnav_only_reception_selects_fnav_code_bits() {
        let options = Options::default();
        let sat_table = DefaultSatelliteTable;
        let ura_index = DefaultUraIndex;
        let ctx = EphemerisContext {
            time: GpsTime::new(2300, 100.0),
            options: &options,
            sat_table: &sat_table,
            ura_index: &ura_index,
        };
        let mut nav = NavStore::new();
        let body = record(0, 1, 42);
        decode(&body, &ctx, &mut nav).unwrap();
        let sat = sat_table.sat_index(System::Galileo, 11).unwrap();
        assert_eq!(nav.keplerian(System::Galileo, sat).unwrap().code_bits, FNAV_CODE_BITS);
    }

    #[test]
    fn inav_preferred_when_both_received() {
        let options = Options::default();
        let sat_table = DefaultSatelliteTable;
        let ura_index = DefaultUraIndex;
        let ctx = EphemerisContext {
            time: GpsTime::new(2300, 100.0),
            options: &options,
            sat_table: &sat_table,
            ura_index: &ura_index,
        };
        let mut nav = NavStore::new();
        let body = record(1, 1, 42);
        decode(&body, &ctx, &mut nav).unwrap();
        let sat = sat_table.sat_index(System::Galileo, 11).unwrap();
        assert_eq!(nav.keplerian(System::Galileo, sat).unwrap().code_bits, INAV_CODE_BITS);
    }
}
