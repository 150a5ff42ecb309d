//! Frame layout offsets and fixed-capacity limits.
//!
//! Offsets are counted from the first sync byte, matching the NovAtel OEM4 binary header
//! layout that the Unicore-style receivers derive their framing from.

/// Three-byte sync prefix that opens every frame.
pub const SYNC: [u8; 3] = [0xAA, 0x44, 0x12];
pub(crate) const SYNC_LEN: usize = SYNC.len();

/// Total header length, sync bytes included.
pub const HEADER_LEN: usize = 28;
/// Length of the trailing CRC-32.
pub const CRC_LEN: usize = 4;

/// Offset of the 16-bit message ID.
pub(crate) const MSG_ID_OFFSET: usize = 4;
/// Offset of the byte whose high nibble bits [5:4] carry the message-type field.
pub(crate) const MSG_TYPE_OFFSET: usize = 6;
/// Offset of the 16-bit declared body length.
pub(crate) const LENGTH_OFFSET: usize = 8;
/// Offset of the 16-bit GPS week.
pub(crate) const WEEK_OFFSET: usize = 14;
/// Offset of the 32-bit time-of-week, in milliseconds.
pub(crate) const TOW_MS_OFFSET: usize = 16;

/// Byte count read before the declared body length is available.
pub(crate) const MIN_HEADER_PEEK: usize = LENGTH_OFFSET + 2;

/// Message IDs dispatched by [`crate::dispatch`].
pub mod msg_id {
    pub const RANGE: u16 = 43;
    pub const RANGECMP: u16 = 140;
    pub const GPS_EPHEM: u16 = 7;
    pub const GLO_EPHEM: u16 = 723;
    pub const GAL_EPHEM: u16 = 1122;
    pub const BDS_EPHEM: u16 = 1047;
}

/// Upper bound on a reassembled frame (header + body + CRC). Oversize declared lengths are
/// rejected rather than grown into.
pub const MAXRAWLEN: usize = 1 << 14;

/// Maximum number of simultaneous per-satellite entries in one observation epoch.
pub const MAXOBS: usize = 96;
/// Maximum dense satellite index used to size the per-satellite lock-state matrices.
pub const MAXSAT: usize = 196;
/// Number of "native" frequency slots tracked per satellite (e.g. L1, L2, L5).
pub const NFREQ: usize = 3;
/// Number of additional, non-native ("extended") slots available for spillover signals.
pub const NEXOBS: usize = 3;
/// Total slot count per satellite entry.
pub const NUM_SLOTS: usize = NFREQ + NEXOBS;

/// Modulus of the compressed ADR integer-cycle rollover (2^23).
pub const MAXVAL: i64 = 1 << 23;

/// Minimum slip-rule margin added to the lock-time delta, in seconds.
pub(crate) const LLI_SLIP_MARGIN: f64 = 0.05;
/// Saturation ceiling for RANGECMP lock time (21-bit field at 1/32s resolution).
pub(crate) const RANGECMP_LOCKTIME_SATURATION: f64 = 65535.968;

/// Epoch dedup/flush tolerance, in seconds.
pub(crate) const EPOCH_TOLERANCE_SECONDS: f64 = 1e-9;

/// Half a week, in seconds — the week-adjustment threshold shared by every ephemeris decoder.
pub(crate) const HALF_WEEK_SECONDS: f64 = 302_400.0;
/// Seconds in a week.
pub(crate) const WEEK_SECONDS: f64 = 604_800.0;
/// Seconds in a day.
pub(crate) const DAY_SECONDS: f64 = 86_400.0;
