//! BeiDou broadcast ephemeris decoder: BDT to GPST conversion (§4.6).

use crate::decode::ephemeris::{Cursor, EphemerisContext};
use crate::error::DecodeError;
use crate::nav::{KeplerianEphemeris, NavStore};
use crate::status::System;
use crate::time::bdt_to_gpst;

const EXPECTED_LEN: usize = 195;

/// Decodes a BeiDou ephemeris body and stores it unless deduplicated (§4.6, §6).
pub(crate) fn decode(
    body: &[u8],
    ctx: &EphemerisContext<'_>,
    nav: &mut NavStore,
) -> Result<i32, DecodeError> {
    if body.len() != EXPECTED_LEN {
        return Err(DecodeError::InvalidLength {
            message: "BeiDou ephemeris",
            expect: EXPECTED_LEN,
            got: body.len(),
        });
    }

    let mut c = Cursor::new(body);
    let prn = c.u32() as u16;
    let health = c.u32();
    let iode = c.u32() as i32; // AODE
    let iodc = c.u32() as i32; // AODC
    let week = c.u16();
    let toe_tow = c.f64();
    let toc_tow = c.f64();
    let sqrt_a = c.f64();
    let e = c.f64();
    let i0 = c.f64();
    let omega0 = c.f64();
    let omega = c.f64();
    let m0 = c.f64();
    let delta_n = c.f64();
    let omega_dot = c.f64();
    let idot = c.f64();
    let cus = c.f64();
    let cuc = c.f64();
    let cis = c.f64();
    let cic = c.f64();
    let crs = c.f64();
    let crc = c.f64();
    let tgd1 = c.f64();
    let tgd2 = c.f64();
    let af0 = c.f64();
    let af1 = c.f64();
    let af2 = c.f64();
    let raw_ura = c.u8();

    let Some(sat) = ctx.sat_table.sat_index(System::BeiDou, prn) else {
        return Err(DecodeError::InvalidField {
            message: "BeiDou ephemeris",
            field: "prn",
        });
    };

    let toe = bdt_to_gpst(week, toe_tow);
    let toc = bdt_to_gpst(week, toc_tow);

    let eph = KeplerianEphemeris {
        system: System::BeiDou,
        sat,
        toe,
        toc,
        ttr: ctx.time,
        iode,
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
        tgd: [tgd1, tgd2],
        health: (health & 1) as u8,
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
    use crate::time::GpsTime;

    fn record(health: u32, iode: u32, toe_tow: f64) -> Vec<u8> {
        let mut c = Vec::with_capacity(EXPECTED_LEN);
        c.extend_from_slice(&6u32.to_le_bytes()); // prn
        c.extend_from_slice(&health.to_le_bytes());
        c.extend_from_slice(&iode.to_le_bytes());
        c.extend_from_slice(&30u32.to_le_bytes()); // iodc
        c.extend_from_slice(&700u16.to_le_bytes()); // week
        c.extend_from_slice(&toe_tow.to_le_bytes());
        c.extend_from_slice(&toe_tow.to_le_bytes()); // toc
        for _ in 0..15 {
            c.extend_from_slice(&0.0f64.to_le_bytes());
        }
        c.extend_from_slice(&0.0f64.to_le_bytes()); // tgd1
        c.extend_from_slice(&0.0f64.to_le_bytes()); // tgd2
        c.extend_from_slice(&0.0f64.to_le_bytes()); // af0
        c.extend_from_slice(&0.0f64.to_le_bytes()); // af1
        c.extend_from_slice(&0.0f64.to_le_bytes()); // af2
        c.push(0); // ura
        assert_eq!(c.len(), EXPECTED_LEN);
        c
    }

    #[test]
    fn converts_bdt_week_and_extracts_low_health_bit() {
        let sat_table = DefaultSatelliteTable;
        let ura_index = DefaultUraIndex;
        let options = Options::default();
        let ctx = EphemerisContext {
            time: GpsTime::new(700 + 1356, 200.0),
            options: &options,
            sat_table: &sat_table,
            ura_index: &ura_index,
        };
        let mut nav = NavStore::new();
        let body = record(0b101, 3, 200.0);
        assert_eq!(decode(&body, &ctx, &mut nav).unwrap(), 2);
        let sat = sat_table.sat_index(System::BeiDou, 6).unwrap();
        let eph = nav.keplerian(System::BeiDou, sat).unwrap();
        assert_eq!(eph.toe.week, 700 + 1356);
        assert_eq!(eph.health, 1);
    }

    #[test]
    fn identical_record_is_deduplicated() {
        let sat_table = DefaultSatelliteTable;
        let ura_index = DefaultUraIndex;
        let options = Options::default();
        let ctx = EphemerisContext {
            time: GpsTime::new(700 + 1356, 200.0),
            options: &options,
            sat_table: &sat_table,
            ura_index: &ura_index,
        };
        let mut nav = NavStore::new();
        let body = record(0, 3, 200.0);
        decode(&body, &ctx, &mut nav).unwrap();
        assert_eq!(decode(&body, &ctx, &mut nav).unwrap(), 0);
    }
}
