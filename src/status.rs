//! Tracking-status bitfield decoding and the signal/slot tables built on top of it.

use crate::options::Options;
use crate::fields::bitfield;

/// GNSS constellation, decoded from bits 16-18 of the tracking-status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum System {
    Gps,
    Glonass,
    Sbas,
    Galileo,
    BeiDou,
    Qzss,
}

impl System {
    pub(crate) fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(System::Gps),
            1 => Some(System::Glonass),
            2 => Some(System::Sbas),
            3 => Some(System::Galileo),
            4 => Some(System::BeiDou),
            5 => Some(System::Qzss),
            _ => None,
        }
    }
}

/// Signal/code identity, decoded from the system-specific signal-type table (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Code {
    L1Ca,
    L2PCodeless,
    L2C,
    E1B,
    E1C,
    E5bQ,
    B1I,
    B2I,
    L5I,
}

/// The native frequency slot a [`Code`] naturally belongs to, before any slot-policy override.
pub(crate) fn native_freq(code: Code) -> usize {
    match code {
        Code::L1Ca | Code::E1B | Code::E1C | Code::B1I => 0,
        Code::L2PCodeless | Code::L2C | Code::E5bQ | Code::B2I => 1,
        Code::L5I => 2,
    }
}

/// Looks up the (frequency index, code) pair for a (system, signal-type) combination. Returns
/// `None` for combinations absent from the table (§4.3), which the caller must drop.
pub(crate) fn signal_lookup(system: System, signal: u32) -> Option<(usize, Code)> {
    use System::*;
    match (system, signal) {
        (Gps, 0) => Some((0, Code::L1Ca)),
        (Gps, 9) => Some((1, Code::L2PCodeless)),
        (Qzss, 0) => Some((0, Code::L1Ca)),
        (Qzss, 9) => Some((1, Code::L2C)),
        (Glonass, 0) => Some((0, Code::L1Ca)),
        (Glonass, 5) => Some((1, Code::L2C)),
        (Galileo, 1) => Some((0, Code::E1B)),
        (Galileo, 2) => Some((0, Code::E1C)),
        (Galileo, 17) => Some((1, Code::E5bQ)),
        (BeiDou, 0) => Some((0, Code::B1I)),
        (BeiDou, 17) => Some((1, Code::B2I)),
        (Sbas, 0) => Some((0, Code::L1Ca)),
        (Sbas, 6) => Some((2, Code::L5I)),
        _ => None,
    }
}

/// Decoded view of a 32-bit tracking-status word (§3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingStatus {
    pub raw: u32,
    pub tracking_state: u8,
    pub phase_lock: bool,
    pub parity_known: bool,
    pub code_lock: bool,
    pub system: System,
    pub signal: u32,
    pub half_cycle_added: bool,
}

impl TrackingStatus {
    /// Decodes the bitfield, rejecting unknown system codes (§4.3).
    pub fn decode(raw: u32) -> Option<Self> {
        let system = System::from_bits(bitfield(raw, 16, 3))?;
        Some(Self {
            raw,
            tracking_state: bitfield(raw, 0, 5) as u8,
            phase_lock: bitfield(raw, 10, 1) != 0,
            parity_known: bitfield(raw, 11, 1) != 0,
            code_lock: bitfield(raw, 12, 1) != 0,
            system,
            signal: bitfield(raw, 21, 5),
            half_cycle_added: bitfield(raw, 28, 1) != 0,
        })
    }

    /// Resolves this status to a (slot index, code) pair under the given options, or `None` if
    /// the (system, signal) combination is not recognized (§4.3).
    pub(crate) fn resolve_slot(&self, options: &Options) -> Option<(usize, Code)> {
        let (freq, code) = signal_lookup(self.system, self.signal)?;
        let slot = slot_for(self.system, code, freq, options);
        Some((slot, code))
    }
}

/// Forcing tokens recognized in the options string that pin a non-native code into the primary
/// slot for its frequency (§4.3, §6).
fn forced_primary(system: System, code: Code, options: &Options) -> bool {
    match (system, code) {
        (System::Gps, Code::L2PCodeless) => options.force_gps_l1p,
        (System::Gps, Code::L2C) => options.force_gps_l2x,
        (System::Glonass, Code::L2C) => options.force_glo_l2c,
        (System::Galileo, Code::E1B) => options.force_gal_e1b,
        _ => false,
    }
}

/// Maps (system, code, native frequency) to a concrete slot index in `0..NUM_SLOTS`.
///
/// Codes already occupying their native frequency slot for the "primary" variant of a system
/// (the first entry encountered for that frequency) keep it; everything else spills into the
/// extended slots `NFREQ..NFREQ+NEXOBS` in order of first use, unless explicitly forced back
/// into a primary slot by [`Options`].
fn slot_for(system: System, code: Code, freq: usize, options: &Options) -> usize {
    use crate::constants::NFREQ;

    let is_primary_for_system = matches!(
        (system, code),
        (System::Gps, Code::L1Ca)
            | (System::Qzss, Code::L1Ca)
            | (System::Qzss, Code::L2C)
            | (System::Glonass, Code::L1Ca)
            | (System::Galileo, Code::E1C)
            | (System::Galileo, Code::E5bQ)
            | (System::BeiDou, Code::B1I)
            | (System::BeiDou, Code::B2I)
            | (System::Sbas, Code::L1Ca)
            | (System::Sbas, Code::L5I)
    );

    if is_primary_for_system || forced_primary(system, code, options) {
        freq.min(NFREQ - 1)
    } else {
        // Spill into the extended band. Frequency 0 is always occupied by a primary code (L1Ca
        // or E1C), so the first extended slot is reserved for frequency 1's alternates (GPS
        // L2 P-codeless, GLONASS L2C); still keyed by native frequency so repeated alternates
        // for the same frequency collapse onto the same extended slot.
        NFREQ + (freq.saturating_sub(1) % crate::constants::NEXOBS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(tracking_state: u32, phase: u32, parity: u32, code: u32, system: u32, signal: u32, half_cycle: u32) -> u32 {
        tracking_state
            | (phase << 10)
            | (parity << 11)
            | (code << 12)
            | (system << 16)
            | (signal << 21)
            | (half_cycle << 28)
    }

    #[test]
    fn decodes_gps_l1ca_status() {
        let raw = word(0, 1, 1, 1, 0, 0, 0);
        let status = TrackingStatus::decode(raw).unwrap();
        assert_eq!(status.system, System::Gps);
        assert!(status.phase_lock);
        assert!(status.parity_known);
        assert!(status.code_lock);
        assert!(!status.half_cycle_added);
    }

    #[test]
    fn rejects_unknown_system() {
        let raw = word(0, 0, 0, 0, 7, 0, 0);
        assert!(TrackingStatus::decode(raw).is_none());
    }

    #[test]
    fn resolves_gps_l1ca_to_slot_zero() {
        let status = TrackingStatus::decode(word(0, 1, 1, 1, 0, 0, 0)).unwrap();
        let options = Options::default();
        let (slot, code) = status.resolve_slot(&options).unwrap();
        assert_eq!(slot, 0);
        assert_eq!(code, Code::L1Ca);
    }

    #[test]
    fn gps_l2_codeless_spills_to_extended_slot_by_default() {
        let status = TrackingStatus::decode(word(0, 1, 1, 1, 0, 9, 0)).unwrap();
        let options = Options::default();
        let (slot, _) = status.resolve_slot(&options).unwrap();
        assert_eq!(slot, 3);
    }

    #[test]
    fn gps_l1p_option_forces_primary_slot() {
        let status = TrackingStatus::decode(word(0, 1, 1, 1, 0, 9, 0)).unwrap();
        let options = Options::parse("-GL1P");
        let (slot, _) = status.resolve_slot(&options).unwrap();
        assert_eq!(slot, 1);
    }

    #[test]
    fn galileo_e1b_spills_to_extended_slot_by_default() {
        let status = TrackingStatus::decode(word(0, 1, 1, 1, 3, 1, 0)).unwrap();
        let options = Options::default();
        let (slot, code) = status.resolve_slot(&options).unwrap();
        assert_eq!(code, Code::E1B);
        assert_eq!(slot, 3);
    }

    #[test]
    fn galileo_e1c_resolves_to_primary_slot_by_default() {
        let status = TrackingStatus::decode(word(0, 1, 1, 1, 3, 2, 0)).unwrap();
        let options = Options::default();
        let (slot, code) = status.resolve_slot(&options).unwrap();
        assert_eq!(code, Code::E1C);
        assert_eq!(slot, 0);
    }

    #[test]
    fn el1b_option_forces_primary_slot() {
        let status = TrackingStatus::decode(word(0, 1, 1, 1, 3, 1, 0)).unwrap();
        let options = Options::parse("-EL1B");
        let (slot, _) = status.resolve_slot(&options).unwrap();
        assert_eq!(slot, 0);
    }
}
