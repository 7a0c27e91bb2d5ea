// Rearrange
// Copyright (c) 2024 The Project Rearrange Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `config` module defines the two tunable parameters of the rearrange element.

use std::fmt;

use crate::errors::{config_error, Error, Result};

/// The channel count of a rearranged stream.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub enum OutputChannels {
    /// Stereo.
    Two,
    /// Quadrophonic.
    Four,
    /// 5.1 surround.
    Six,
    /// 7.1 surround.
    #[default]
    Eight,
}

impl OutputChannels {
    /// Every supported output channel count.
    pub const ALL: [OutputChannels; 4] =
        [OutputChannels::Two, OutputChannels::Four, OutputChannels::Six, OutputChannels::Eight];

    /// Get the channel count.
    pub fn count(&self) -> usize {
        match self {
            OutputChannels::Two => 2,
            OutputChannels::Four => 4,
            OutputChannels::Six => 6,
            OutputChannels::Eight => 8,
        }
    }
}

impl TryFrom<u32> for OutputChannels {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            2 => Ok(OutputChannels::Two),
            4 => Ok(OutputChannels::Four),
            6 => Ok(OutputChannels::Six),
            8 => Ok(OutputChannels::Eight),
            _ => config_error("output channel count must be 2, 4, 6, or 8"),
        }
    }
}

impl From<OutputChannels> for u32 {
    fn from(value: OutputChannels) -> Self {
        value.count() as u32
    }
}

impl fmt::Display for OutputChannels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// The channel pair of the output frame that receives the input signal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub enum Placement {
    /// Channels 0 and 1: front-left and front-right.
    #[default]
    Front,
    /// Channels 2 and 3: rear-left and rear-right.
    Rear,
    /// Channels 4 and 5: front-center and LFE.
    CenterLfe,
    /// Channels 6 and 7: side-left and side-right.
    Side,
}

impl Placement {
    /// Every placement, in selector order.
    pub const ALL: [Placement; 4] =
        [Placement::Front, Placement::Rear, Placement::CenterLfe, Placement::Side];

    /// Get the selector value (0 to 3).
    pub fn index(&self) -> usize {
        match self {
            Placement::Front => 0,
            Placement::Rear => 1,
            Placement::CenterLfe => 2,
            Placement::Side => 3,
        }
    }

    /// Get the index of the first output channel of the pair.
    pub fn first_channel(&self) -> usize {
        2 * self.index()
    }

    /// Returns `true` if both channels of the pair exist in a frame of `channels` channels.
    pub fn fits(&self, channels: OutputChannels) -> bool {
        self.first_channel() + 1 < channels.count()
    }
}

impl TryFrom<u32> for Placement {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Placement::Front),
            1 => Ok(Placement::Rear),
            2 => Ok(Placement::CenterLfe),
            3 => Ok(Placement::Side),
            _ => config_error("placement must be 0 (front), 1 (rear), 2 (center/lfe), or 3 (side)"),
        }
    }
}

impl From<Placement> for u32 {
    fn from(value: Placement) -> Self {
        value.index() as u32
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Front => write!(f, "front"),
            Placement::Rear => write!(f, "rear"),
            Placement::CenterLfe => write!(f, "center/lfe"),
            Placement::Side => write!(f, "side"),
        }
    }
}

/// The configuration of a rearrange element.
///
/// Each field is range checked on its own when set. Whether the placement fits within the output
/// channel count is only known once both are set, so that is checked by [`Config::validate`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// The output channel count. Defaults to 8.
    pub channels: OutputChannels,
    /// The output channel pair. Defaults to the front pair.
    #[cfg_attr(feature = "serde", serde(rename = "pos"))]
    pub placement: Placement,
}

impl Config {
    /// Create a configuration from raw parameter values.
    pub fn try_new(channels: u32, pos: u32) -> Result<Config> {
        let channels = OutputChannels::try_from(channels)?;
        let placement = Placement::try_from(pos)?;

        let config = Config { channels, placement };
        config.validate()?;
        Ok(config)
    }

    /// Check that the placement fits within the output channel count.
    pub fn validate(&self) -> Result<()> {
        if !self.placement.fits(self.channels) {
            return config_error("placement does not fit within the output channel count");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_defaults() {
        let config = Config::default();
        assert_eq!(config.channels.count(), 8);
        assert_eq!(config.placement.index(), 0);
        assert!(config.validate().is_ok());

        assert_eq!(OutputChannels::default(), OutputChannels::Eight);
        assert_eq!(Placement::default(), Placement::Front);
    }

    #[test]
    fn verify_domains() {
        for (value, channels) in [2, 4, 6, 8].into_iter().zip(OutputChannels::ALL) {
            assert_eq!(OutputChannels::try_from(value).ok(), Some(channels));
            assert_eq!(u32::from(channels), value);
        }

        for value in [0, 1, 3, 5, 7, 9, 16] {
            assert!(matches!(OutputChannels::try_from(value), Err(Error::ConfigError(_))));
        }

        for (value, placement) in (0..4).zip(Placement::ALL) {
            assert_eq!(Placement::try_from(value).ok(), Some(placement));
            assert_eq!(placement.first_channel(), 2 * value as usize);
        }

        assert!(matches!(Placement::try_from(4), Err(Error::ConfigError(_))));
    }

    #[test]
    fn verify_placement_fits() {
        for channels in OutputChannels::ALL {
            for placement in Placement::ALL {
                let expected = 2 * placement.index() + 1 < channels.count();
                assert_eq!(placement.fits(channels), expected);
                assert_eq!(Config { channels, placement }.validate().is_ok(), expected);
            }
        }

        assert!(matches!(Config::try_new(2, 3), Err(Error::ConfigError(_))));
        assert!(matches!(Config::try_new(6, 3), Err(Error::ConfigError(_))));
        assert!(Config::try_new(8, 3).is_ok());
        assert!(Config::try_new(2, 0).is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn verify_config_serde() {
        let config: Config = serde_json::from_str(r#"{ "channels": 4, "pos": 1 }"#).unwrap();
        assert_eq!(config, Config { channels: OutputChannels::Four, placement: Placement::Rear });

        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());

        assert!(serde_json::from_str::<Config>(r#"{ "channels": 5 }"#).is_err());
        assert!(serde_json::from_str::<Config>(r#"{ "pos": 4 }"#).is_err());

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"channels":8,"pos":0}"#);
    }
}
