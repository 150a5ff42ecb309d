//! The satellite-indexed epoch observation buffer and cross-epoch lock-time state (§3, §4.7).

use bitflags::bitflags;

use crate::constants::{EPOCH_TOLERANCE_SECONDS, MAXOBS, NUM_SLOTS};
use crate::status::System;
use crate::time::GpsTime;

bitflags! {
    /// Loss-of-lock indicator bits (§3 glossary, §4.4).
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Lli: u8 {
        /// Cycle slip detected since the previous observation of this (sat, slot).
        const SLIP = 0x01;
        /// Half-cycle ambiguity unresolved (parity not known).
        const HALFC = 0x02;
        /// A half-cycle phase adjustment was applied by the receiver.
        const HALFA = 0x04;
    }
}

/// One (frequency, code) slot's worth of measurements for a single satellite (§3).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotObservation {
    /// Carrier phase, cycles.
    pub carrier: f64,
    /// Pseudorange, meters.
    pub code: f64,
    /// Doppler, Hz.
    pub doppler: f32,
    /// C/N0 in 1/4 dB-Hz units.
    pub snr: u8,
    pub lli: Lli,
    /// Opaque code identity for this slot (see [`crate::status::Code`]).
    pub code_id: u8,
    /// `false` until a measurement has actually been written into this slot.
    pub valid: bool,
}

/// All slots for one satellite within one epoch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SatObservation {
    pub time: GpsTime,
    pub system: System,
    pub sat: usize,
    pub slots: [SlotObservation; NUM_SLOTS],
}

/// The epoch observation accumulator: an ordered list of at most [`MAXOBS`] per-satellite
/// entries, all sharing one epoch time (§3, §4.7).
#[derive(Debug, Clone, Default)]
pub struct ObsBuffer {
    entries: Vec<SatObservation>,
}

impl ObsBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SatObservation] {
        &self.entries
    }

    pub fn time(&self) -> Option<GpsTime> {
        self.entries.first().map(|e| e.time)
    }

    fn find_index(&self, sat: usize) -> Option<usize> {
        self.entries.iter().position(|e| e.sat == sat)
    }

    /// Flushes the buffer if `time` differs from the buffer's epoch by more than the epoch
    /// tolerance, then writes `value` into `slot` for `(system, sat)`, allocating a new entry if
    /// necessary. Excess entries beyond [`MAXOBS`] are silently dropped (§4.7).
    pub fn record(
        &mut self,
        time: GpsTime,
        system: System,
        sat: usize,
        slot: usize,
        value: SlotObservation,
    ) {
        if let Some(head) = self.time() {
            if (time.sub_seconds(head)).abs() > EPOCH_TOLERANCE_SECONDS {
                self.entries.clear();
            }
        }

        let index = match self.find_index(sat) {
            Some(index) => index,
            None => {
                if self.entries.len() >= MAXOBS {
                    return;
                }
                self.entries.push(SatObservation {
                    time,
                    system,
                    sat,
                    slots: Default::default(),
                });
                self.entries.len() - 1
            },
        };

        self.entries[index].slots[slot] = value;
    }
}

/// Per-satellite, per-slot lock state used solely to compute LLI on the next observation of the
/// same (sat, slot) (§3).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct LockState {
    pub time: Option<GpsTime>,
    pub lock_time: f32,
    pub half_cycle: bool,
}

/// Dense (satellite, slot) matrix of [`LockState`], sized at registration time per §5.
#[derive(Debug, Clone)]
pub(crate) struct LockTable {
    states: Vec<[LockState; NUM_SLOTS]>,
}

impl LockTable {
    pub fn new(max_sat: usize) -> Self {
        Self {
            states: vec![[LockState::default(); NUM_SLOTS]; max_sat],
        }
    }

    pub fn get(&self, sat: usize, slot: usize) -> Option<LockState> {
        self.states.get(sat).map(|row| row[slot])
    }

    pub fn set(&mut self, sat: usize, slot: usize, state: LockState) {
        if let Some(row) = self.states.get_mut(sat) {
            row[slot] = state;
        }
    }
}

impl Default for LockTable {
    fn default() -> Self {
        Self::new(crate::constants::MAXSAT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(carrier: f64) -> SlotObservation {
        SlotObservation {
            carrier,
            code: 22_000_000.0,
            doppler: -1000.0,
            snr: 180,
            lli: Lli::empty(),
            code_id: 0,
            valid: true,
        }
    }

    #[test]
    fn records_into_new_entry() {
        let mut buf = ObsBuffer::new();
        let t = GpsTime::new(2300, 100.0);
        buf.record(t, System::Gps, 5, 0, obs(1e8));
        assert_eq!(buf.entries().len(), 1);
        assert_eq!(buf.entries()[0].slots[0].carrier, 1e8);
    }

    #[test]
    fn flushes_on_new_epoch() {
        let mut buf = ObsBuffer::new();
        let t0 = GpsTime::new(2300, 100.0);
        let t1 = GpsTime::new(2300, 101.0);
        buf.record(t0, System::Gps, 5, 0, obs(1e8));
        buf.record(t1, System::Gps, 6, 0, obs(2e8));
        assert_eq!(buf.entries().len(), 1);
        assert_eq!(buf.entries()[0].sat, 6);
    }

    #[test]
    fn keeps_single_entry_per_satellite() {
        let mut buf = ObsBuffer::new();
        let t = GpsTime::new(2300, 100.0);
        buf.record(t, System::Gps, 5, 0, obs(1e8));
        buf.record(t, System::Gps, 5, 1, obs(2e8));
        assert_eq!(buf.entries().len(), 1);
        assert_eq!(buf.entries()[0].slots[1].carrier, 2e8);
    }

    #[test]
    fn drops_entries_beyond_maxobs() {
        let mut buf = ObsBuffer::new();
        let t = GpsTime::new(2300, 100.0);
        for sat in 0..(MAXOBS + 5) {
            buf.record(t, System::Gps, sat, 0, obs(1.0));
        }
        assert_eq!(buf.entries().len(), MAXOBS);
    }

    #[test]
    fn lock_table_roundtrips_state() {
        let mut table = LockTable::new(4);
        assert!(table.get(1, 0).unwrap().time.is_none());
        table.set(
            1,
            0,
            LockState {
                time: Some(GpsTime::new(2300, 5.0)),
                lock_time: 5.0,
                half_cycle: false,
            },
        );
        assert_eq!(table.get(1, 0).unwrap().lock_time, 5.0);
    }
}
