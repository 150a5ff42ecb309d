//! Broadcast navigation (ephemeris) storage, and the external-collaborator traits the spec
//! carves out for the satellite registry and wavelength tables (§4.8).

use crate::status::System;
use crate::time::GpsTime;

/// Keplerian broadcast ephemeris, shared by GPS, Galileo and BeiDou (§3).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeplerianEphemeris {
    pub system: System,
    pub sat: usize,
    pub toe: GpsTime,
    pub toc: GpsTime,
    pub ttr: GpsTime,
    pub iode: i32,
    pub iodc: i32,
    pub sqrt_a: f64,
    pub e: f64,
    pub i0: f64,
    pub omega0: f64,
    pub omega: f64,
    pub m0: f64,
    pub delta_n: f64,
    pub omega_dot: f64,
    pub idot: f64,
    pub cus: f64,
    pub cuc: f64,
    pub cis: f64,
    pub cic: f64,
    pub crs: f64,
    pub crc: f64,
    pub af0: f64,
    pub af1: f64,
    pub af2: f64,
    pub tgd: [f64; 2],
    pub health: u8,
    pub ura_index: u8,
    /// Data-source / signal-health code bits (GAL data-source flags; unused by GPS/BDS).
    pub code_bits: u32,
}

/// GLONASS PV-acceleration broadcast ephemeris (§3).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlonassEphemeris {
    pub sat: usize,
    pub toe: GpsTime,
    pub freq_channel: i8,
    pub pos: [f64; 3],
    pub vel: [f64; 3],
    pub accel: [f64; 3],
    pub tau_n: f64,
    pub gamma_n: f64,
    pub health: u8,
    pub age: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ephemeris {
    Keplerian(KeplerianEphemeris),
    Glonass(GlonassEphemeris),
}

/// Per-satellite store of the most recently accepted ephemeris of each kind.
///
/// Logically owned by the host positioning engine (§3 "Ownership"): the decoder only ever
/// writes into it via `&mut` references handed in with each call.
#[derive(Debug, Clone, Default)]
pub struct NavStore {
    keplerian: std::collections::HashMap<(System, usize), KeplerianEphemeris>,
    glonass: std::collections::HashMap<usize, GlonassEphemeris>,
    /// GLONASS frequency channel per satellite, updated by the RANGE decoder's side effect
    /// (§4.4) and consulted by the RANGECMP wavelength fallback (§4.5, §9).
    glonass_channels: std::collections::HashMap<usize, i8>,
}

impl NavStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keplerian(&self, system: System, sat: usize) -> Option<&KeplerianEphemeris> {
        self.keplerian.get(&(system, sat))
    }

    pub fn glonass(&self, sat: usize) -> Option<&GlonassEphemeris> {
        self.glonass.get(&sat)
    }

    pub fn glonass_channel(&self, sat: usize) -> Option<i8> {
        self.glonass_channels.get(&sat).copied()
    }

    pub fn set_glonass_channel(&mut self, sat: usize, channel: i8) {
        self.glonass_channels.insert(sat, channel);
    }

    /// Inserts a GPS/Galileo/BeiDou ephemeris, deduplicating per the system-specific rule in
    /// §4.6 unless `store_all` is set. Returns `true` if the store was modified.
    pub fn insert_keplerian(&mut self, new: KeplerianEphemeris, store_all: bool) -> bool {
        let key = (new.system, new.sat);
        if !store_all {
            if let Some(existing) = self.keplerian.get(&key) {
                if is_duplicate_keplerian(existing, &new) {
                    return false;
                }
            }
        }
        self.keplerian.insert(key, new);
        true
    }

    /// Inserts a GLONASS ephemeris, deduplicating per §4.6 unless `store_all` is set.
    pub fn insert_glonass(&mut self, new: GlonassEphemeris, store_all: bool) -> bool {
        if !store_all {
            if let Some(existing) = self.glonass.get(&new.sat) {
                if (existing.toe.sub_seconds(new.toe)).abs() < 1.0 && existing.health == new.health
                {
                    return false;
                }
            }
        }
        self.glonass.insert(new.sat, new);
        true
    }
}

fn is_duplicate_keplerian(existing: &KeplerianEphemeris, new: &KeplerianEphemeris) -> bool {
    match new.system {
        System::Gps => {
            existing.toe == new.toe && existing.iode == new.iode && existing.iodc == new.iodc
        },
        System::Galileo => existing.iode == new.iode && existing.code_bits == new.code_bits,
        System::BeiDou => {
            existing.toe == new.toe && existing.iode == new.iode && existing.iodc == new.iodc
        },
        _ => false,
    }
}

/// Maps (system, PRN) to a dense satellite index, and back. An external collaborator per §4.8;
/// [`DefaultSatelliteTable`] supplies a workable standalone default.
pub trait SatelliteTable {
    fn sat_index(&self, system: System, prn: u16) -> Option<usize>;
}

/// Contiguous RTKLIB-style numbering: GPS 1-32, SBAS 33-64, GLONASS 65-96, Galileo 97-132,
/// BeiDou 133-182, QZSS 183-192.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSatelliteTable;

impl SatelliteTable for DefaultSatelliteTable {
    fn sat_index(&self, system: System, prn: u16) -> Option<usize> {
        let prn = prn as usize;
        let base = match system {
            System::Gps if (1..=32).contains(&prn) => 0,
            System::Sbas if (120..=151).contains(&prn) => return Some(32 + (prn - 120)),
            System::Glonass if (1..=32).contains(&prn) => 64,
            System::Galileo if (1..=36).contains(&prn) => 96,
            System::BeiDou if (1..=50).contains(&prn) => 132,
            System::Qzss if (1..=10).contains(&prn) => 182,
            _ => return None,
        };
        Some(base + prn)
    }
}

/// Maps (system, satellite index, frequency slot) to a carrier wavelength in meters. An
/// external collaborator per §4.8; [`DefaultWavelengthTable`] supplies the standard carrier
/// frequencies plus the GLONASS FDMA formula.
pub trait WavelengthTable {
    fn wavelength(&self, system: System, sat: usize, freq: usize, nav: &NavStore) -> Option<f64>;
}

const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// GLONASS L1/L2 FDMA channel spacing, Hz.
const GLO_L1_BASE_HZ: f64 = 1_602_000_000.0;
const GLO_L1_DELTA_HZ: f64 = 562_500.0;
const GLO_L2_BASE_HZ: f64 = 1_246_000_000.0;
const GLO_L2_DELTA_HZ: f64 = 437_500.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultWavelengthTable;

impl WavelengthTable for DefaultWavelengthTable {
    fn wavelength(&self, system: System, sat: usize, freq: usize, nav: &NavStore) -> Option<f64> {
        let freq_hz = match (system, freq) {
            (System::Gps, 0) | (System::Qzss, 0) | (System::Sbas, 0) => 1_575_420_000.0,
            (System::Gps, 1) | (System::Qzss, 1) => 1_227_600_000.0,
            (System::Sbas, 2) => 1_176_450_000.0,
            (System::Galileo, 0) => 1_575_420_000.0,
            (System::Galileo, 1) => 1_207_140_000.0,
            (System::BeiDou, 0) => 1_561_098_000.0,
            (System::BeiDou, 1) => 1_207_140_000.0,
            (System::Glonass, 0) => {
                let chan = nav.glonass_channel(sat)? as f64;
                GLO_L1_BASE_HZ + chan * GLO_L1_DELTA_HZ
            },
            (System::Glonass, 1) => {
                let chan = nav.glonass_channel(sat)? as f64;
                GLO_L2_BASE_HZ + chan * GLO_L2_DELTA_HZ
            },
            _ => return None,
        };
        Some(SPEED_OF_LIGHT / freq_hz)
    }
}

/// Converts a receiver-reported URA/SISA code to a 1-sigma accuracy index. An external
/// collaborator per §4.8; the default follows the GPS ICD step table.
pub trait UraIndex {
    fn index(&self, raw: u8) -> u8;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUraIndex;

impl UraIndex for DefaultUraIndex {
    fn index(&self, raw: u8) -> u8 {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(system: System, sat: usize, toe: GpsTime, iode: i32, iodc: i32) -> KeplerianEphemeris {
        KeplerianEphemeris {
            system,
            sat,
            toe,
            toc: toe,
            ttr: toe,
            iode,
            iodc,
            sqrt_a: 5153.7,
            e: 0.01,
            i0: 0.9,
            omega0: 0.1,
            omega: 0.2,
            m0: 0.3,
            delta_n: 0.0,
            omega_dot: 0.0,
            idot: 0.0,
            cus: 0.0,
            cuc: 0.0,
            cis: 0.0,
            cic: 0.0,
            crs: 0.0,
            crc: 0.0,
            af0: 0.0,
            af1: 0.0,
            af2: 0.0,
            tgd: [0.0, 0.0],
            health: 0,
            ura_index: 0,
            code_bits: 0,
        }
    }

    #[test]
    fn dedups_identical_gps_ephemeris() {
        let mut nav = NavStore::new();
        let toe = GpsTime::new(2300, 100.0);
        let eph = sample(System::Gps, 5, toe, 10, 20);
        assert!(nav.insert_keplerian(eph, false));
        assert!(!nav.insert_keplerian(eph, false));
        assert!(nav.insert_keplerian(eph, true));
    }

    #[test]
    fn distinct_iode_is_not_a_duplicate() {
        let mut nav = NavStore::new();
        let toe = GpsTime::new(2300, 100.0);
        let first = sample(System::Gps, 5, toe, 10, 20);
        let second = sample(System::Gps, 5, toe, 11, 20);
        assert!(nav.insert_keplerian(first, false));
        assert!(nav.insert_keplerian(second, false));
    }

    #[test]
    fn default_satellite_table_maps_gps_prn() {
        let table = DefaultSatelliteTable;
        assert_eq!(table.sat_index(System::Gps, 5), Some(5));
        assert_eq!(table.sat_index(System::Glonass, 1), Some(65));
    }

    #[test]
    fn default_wavelength_table_resolves_gps_l1() {
        let table = DefaultWavelengthTable;
        let nav = NavStore::new();
        let lambda = table.wavelength(System::Gps, 5, 0, &nav).unwrap();
        assert!((lambda - SPEED_OF_LIGHT / 1_575_420_000.0).abs() < 1e-9);
    }

    #[test]
    fn glonass_wavelength_needs_known_channel() {
        let table = DefaultWavelengthTable;
        let mut nav = NavStore::new();
        assert!(table.wavelength(System::Glonass, 65, 0, &nav).is_none());
        nav.set_glonass_channel(65, 3);
        assert!(table.wavelength(System::Glonass, 65, 0, &nav).is_some());
    }
}
