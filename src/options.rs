//! Parses the space-separated options string (§6) into a typed configuration struct.

/// Galileo clock source preference (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GalileoClockSource {
    /// No explicit preference: prefer INAV unless only FNAV was received.
    #[default]
    Auto,
    Inav,
    Fnav,
}

/// Decoder-wide options, parsed from the space-separated token string described in §6.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Options {
    /// `-EPHALL`: store every ephemeris, skipping the dedup check.
    pub store_all_ephemerides: bool,
    /// `-GL1P`: force GPS L2 P-codeless into its primary slot.
    pub force_gps_l1p: bool,
    /// `-GL2X`: force GPS L2C into its primary slot.
    pub force_gps_l2x: bool,
    /// `-RL2C`: force GLONASS L2C into its primary slot.
    pub force_glo_l2c: bool,
    /// `-EL1B`: force Galileo E1B into its primary slot.
    pub force_gal_e1b: bool,
    /// `-GALINAV` / `-GALFNAV`: explicit Galileo clock selection.
    pub galileo_clock: GalileoClockSource,
}

impl Options {
    /// Parses a space-separated options string, ignoring unrecognized tokens.
    pub fn parse(input: &str) -> Self {
        let mut options = Options::default();
        for token in input.split_whitespace() {
            match token {
                "-EPHALL" => options.store_all_ephemerides = true,
                "-GL1P" => options.force_gps_l1p = true,
                "-GL2X" => options.force_gps_l2x = true,
                "-RL2C" => options.force_glo_l2c = true,
                "-EL1B" => options.force_gal_e1b = true,
                "-GALINAV" => options.galileo_clock = GalileoClockSource::Inav,
                "-GALFNAV" => options.galileo_clock = GalileoClockSource::Fnav,
                #[cfg(feature = "log")]
                other => log::trace!("ignoring unrecognized option token {other:?}"),
                #[cfg(not(feature = "log"))]
                _ => {},
            }
        }
        options
    }
}

impl core::str::FromStr for Options {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Options::parse(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_handful_of_tokens() {
        let options = Options::parse("-EPHALL -GALFNAV -RL2C");
        assert!(options.store_all_ephemerides);
        assert!(options.force_glo_l2c);
        assert_eq!(options.galileo_clock, GalileoClockSource::Fnav);
        assert!(!options.force_gps_l1p);
    }

    #[test]
    fn ignores_unknown_tokens() {
        let options = Options::parse("-BOGUS -GL1P --also-bogus");
        assert!(options.force_gps_l1p);
    }

    #[test]
    fn empty_string_is_all_defaults() {
        assert_eq!(Options::parse(""), Options::default());
    }
}
