//! Streaming decoder for Unicore/NovAtel OEM4-style multi-GNSS binary telemetry.
//!
//! Feed bytes from a serial link or a file into a [`Decoder`] along with the two stores it
//! writes into — an [`ObsBuffer`] of per-epoch observations and a [`NavStore`] of broadcast
//! ephemerides — and read back a status code after each complete frame (see the module docs on
//! [`Decoder::input_stream`] for the full list).
//!
//! ```no_run
//! use oem4_decode::{Decoder, NavStore, ObsBuffer};
//! use std::io::Read;
//!
//! let mut decoder = Decoder::new();
//! let mut obs = ObsBuffer::new();
//! let mut nav = NavStore::new();
//! let mut file = std::fs::File::open("log.bin").unwrap();
//! let mut byte = [0u8];
//! while file.read_exact(&mut byte).is_ok() {
//!     match decoder.input_stream(byte[0], &mut obs, &mut nav) {
//!         1 => println!("{} satellites this epoch", obs.entries().len()),
//!         2 => println!("ephemeris updated"),
//!         _ => {},
//!     }
//! }
//! ```

mod checksum;
mod constants;
mod decode;
mod diag;
mod dispatch;
mod error;
mod fields;
mod framer;
mod nav;
mod observation;
mod options;
mod status;
mod time;

use std::io::Read;

use framer::{Framer, FramerEvent};

pub use constants::{MAXOBS, MAXRAWLEN, MAXSAT, MAXVAL, NEXOBS, NFREQ, NUM_SLOTS, SYNC};
pub use error::DecodeError;
pub use nav::{
    DefaultSatelliteTable, DefaultUraIndex, DefaultWavelengthTable, Ephemeris, GlonassEphemeris,
    KeplerianEphemeris, NavStore, SatelliteTable, UraIndex, WavelengthTable,
};
pub use observation::{Lli, ObsBuffer, SatObservation, SlotObservation};
pub use options::{GalileoClockSource, Options};
pub use status::{Code, System, TrackingStatus};
pub use time::GpsTime;

/// A GPS week far enough past the last known rollover (2019-04-06) to seed [`Decoder::new`]'s
/// rollover base before any frame has been received.
const DEFAULT_BASE_WEEK: u16 = 2238;

/// The decoder's full mutable state: reassembly buffer, current epoch time, and the per-slot
/// lock tables used for loss-of-lock detection (§9's `raw_t` bundle). Owned entirely by the
/// caller; create one per independent stream.
pub struct Decoder {
    pub(crate) framer: Framer,
    pub(crate) options: Options,
    pub(crate) sat_table: Box<dyn SatelliteTable>,
    pub(crate) wavelength_table: Box<dyn WavelengthTable>,
    pub(crate) ura_index: Box<dyn UraIndex>,
    pub(crate) lock: observation::LockTable,
    pub(crate) time: GpsTime,
    pub(crate) base_week: u16,
    pub(crate) verbose: bool,
    pub(crate) last_diagnostic: Option<String>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Builds a decoder using the in-crate default satellite/wavelength/URA tables (§4.8).
    pub fn new() -> Self {
        Self::with_collaborators(
            Box::new(DefaultSatelliteTable),
            Box::new(DefaultWavelengthTable),
            Box::new(DefaultUraIndex),
        )
    }

    /// Builds a decoder against host-supplied external collaborators (§4.8).
    pub fn with_collaborators(
        sat_table: Box<dyn SatelliteTable>,
        wavelength_table: Box<dyn WavelengthTable>,
        ura_index: Box<dyn UraIndex>,
    ) -> Self {
        Self {
            framer: Framer::new(),
            options: Options::default(),
            sat_table,
            wavelength_table,
            ura_index,
            lock: observation::LockTable::default(),
            time: GpsTime::new(DEFAULT_BASE_WEEK, 0.0),
            base_week: DEFAULT_BASE_WEEK,
            verbose: false,
            last_diagnostic: None,
        }
    }

    /// Parses and installs the decoder-wide options string (§6).
    pub fn set_options(&mut self, options: &str) {
        self.options = Options::parse(options);
    }

    /// Enables or disables the verbose diagnostic string (§6).
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// The decoder's current epoch time, as reconstructed from the most recently dispatched
    /// frame's header.
    pub fn time(&self) -> GpsTime {
        self.time
    }

    /// The diagnostic line produced for the most recently dispatched frame, if verbose mode was
    /// on at the time (§6).
    pub fn last_diagnostic(&self) -> Option<&str> {
        self.last_diagnostic.as_deref()
    }

    /// Feeds one byte from a stream (serial link) into the decoder (§4.1, §4.9).
    ///
    /// Returns: `-1` on a frame/record error, `0` on an incomplete frame or a no-op (unknown
    /// message ID, deduplicated ephemeris), `1` when observations were updated, `2` when an
    /// ephemeris was updated. `3` and `9` are reserved (§6) and never produced by this decoder.
    pub fn input_stream(&mut self, byte: u8, obs: &mut ObsBuffer, nav: &mut NavStore) -> i32 {
        match self.framer.feed_byte(byte) {
            FramerEvent::Incomplete => 0,
            FramerEvent::Error(_err) => {
                #[cfg(feature = "log")]
                log::warn!("framing error: {_err}");
                -1
            },
            FramerEvent::Frame(frame) => dispatch::dispatch(&frame, self, obs, nav),
        }
    }

    /// Feeds frames from a buffered reader (file or other bulk source) into the decoder (§4.9).
    ///
    /// Synchronizes one byte at a time, then performs two bulk reads per frame once synced for
    /// throughput; falls back to the byte-at-a-time path to resynchronize after any error. An
    /// incomplete read at any point returns `-2` (EOF), never a partial frame.
    pub fn input_file(
        &mut self,
        reader: &mut impl Read,
        obs: &mut ObsBuffer,
        nav: &mut NavStore,
    ) -> i32 {
        loop {
            if !self.framer.synced() {
                let mut byte = [0u8; 1];
                if reader.read_exact(&mut byte).is_err() {
                    return -2;
                }
                match self.framer.feed_byte(byte[0]) {
                    FramerEvent::Frame(frame) => return dispatch::dispatch(&frame, self, obs, nav),
                    FramerEvent::Error(_) => return -1,
                    FramerEvent::Incomplete => continue,
                }
            }

            let peek_len = self.framer.bytes_until_length_known();
            let mut peek = vec![0u8; peek_len];
            if reader.read_exact(&mut peek).is_err() {
                return -2;
            }
            for b in peek {
                match self.framer.feed_byte(b) {
                    FramerEvent::Frame(frame) => return dispatch::dispatch(&frame, self, obs, nav),
                    FramerEvent::Error(_) => return -1,
                    FramerEvent::Incomplete => {},
                }
            }

            let remaining = self.framer.bytes_remaining_in_frame();
            let mut rest = vec![0u8; remaining];
            if reader.read_exact(&mut rest).is_err() {
                return -2;
            }
            for b in rest {
                match self.framer.feed_byte(b) {
                    FramerEvent::Frame(frame) => return dispatch::dispatch(&frame, self, obs, nav),
                    FramerEvent::Error(_) => return -1,
                    FramerEvent::Incomplete => {},
                }
            }

            return 0;
        }
    }
}
