//! Multi-GNSS time reconstruction: GPS week rollover, and BDS/GLONASS to GPS time conversion.

use crate::constants::{DAY_SECONDS, HALF_WEEK_SECONDS, WEEK_SECONDS};

/// Week/time-of-week pair, the common currency for every decoded timestamp in this crate.
///
/// `tow` is always expressed in GPS time system seconds once a record leaves a decoder; the
/// BDS/GLONASS decoders convert into this frame before storing anything.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpsTime {
    pub week: u16,
    pub tow: f64,
}

impl GpsTime {
    pub const fn new(week: u16, tow: f64) -> Self {
        Self { week, tow }
    }

    /// Seconds elapsed between `self` and `other`, positive when `self` is later.
    pub fn sub_seconds(self, other: GpsTime) -> f64 {
        f64::from(self.week as i32 - other.week as i32) * WEEK_SECONDS + (self.tow - other.tow)
    }
}

/// GPS week number, as broadcast, wraps at 10 bits (1024 weeks, ~19.6 years). The receiver
/// only ever transmits the modulo-1024 remainder; reconstructing the absolute week requires an
/// external reference point (e.g. the host's own clock). `base_week` stands in for that
/// external collaborator: pass the most recent known-good absolute week, or a hardcoded recent
/// rollover epoch when none is available.
pub fn adjust_gps_week(raw_week: u16, base_week: u16) -> u16 {
    const ROLLOVER: u16 = 1024;
    let mut week = raw_week;
    while week + ROLLOVER <= base_week.saturating_add(ROLLOVER) && week < base_week {
        week += ROLLOVER;
    }
    week
}

/// Shifts `week` by whole weeks so that `toe` (already expressed in seconds-of-week against
/// `week`) falls within half a week of `current`. Mirrors the "IODE epoch vs. current epoch"
/// week-adjustment rule shared by every ephemeris decoder (§4.6).
pub fn adjust_week_for_toe(week: u16, toe: f64, current: GpsTime) -> u16 {
    let candidate = GpsTime::new(week, toe);
    let delta = candidate.sub_seconds(current);
    if delta > HALF_WEEK_SECONDS {
        week.wrapping_sub(1)
    } else if delta < -HALF_WEEK_SECONDS {
        week.wrapping_add(1)
    } else {
        week
    }
}

/// BeiDou time (BDT) epoch began 2006-01-01 00:00:00 UTC, 1356 weeks and 14 leap seconds after
/// the GPS epoch. Converts a (BDT week, BDT tow) pair to GPS time, normalizing the resulting
/// tow back into `[0, WEEK_SECONDS)`.
pub fn bdt_to_gpst(week: u16, tow: f64) -> GpsTime {
    const BDT_GPST_WEEK_OFFSET: u16 = 1356;
    const BDT_GPST_LEAP_OFFSET_SECONDS: f64 = 14.0;

    let mut gps_week = week + BDT_GPST_WEEK_OFFSET;
    let mut gps_tow = tow + BDT_GPST_LEAP_OFFSET_SECONDS;
    if gps_tow >= WEEK_SECONDS {
        gps_tow -= WEEK_SECONDS;
        gps_week += 1;
    }
    GpsTime::new(gps_week, gps_tow)
}

/// GLONASS broadcasts time-of-frame in GLONASS time (Moscow time, UTC+3h, no GPS-style leap
/// seconds). `toff` is the GLONASST -> GPST offset in seconds (3h minus the current GPS-UTC
/// leap-second count); hosts that track leap seconds precisely should compute and pass their
/// own value rather than relying on [`DEFAULT_GLONASST_GPST_OFFSET_SECONDS`].
pub const DEFAULT_GLONASST_GPST_OFFSET_SECONDS: f64 = 3.0 * 3600.0 - 18.0;

/// Converts a raw GLONASS time-of-frame value (seconds-of-day, GLONASS time system) to a GPS
/// time-of-week, anchored to the same GPS day as `current`.
pub fn glonasst_to_gpst(raw_tof: f64, toff: f64, current: GpsTime) -> GpsTime {
    let mut tof = raw_tof - toff;

    let day = (current.tow / DAY_SECONDS).floor() * DAY_SECONDS;
    tof += day;

    let delta = tof - current.tow;
    if delta < -DAY_SECONDS / 2.0 {
        tof += DAY_SECONDS;
    } else if delta > DAY_SECONDS / 2.0 {
        tof -= DAY_SECONDS;
    }

    GpsTime::new(current.week, tof)
}
