// Rearrange
// Copyright (c) 2024 The Project Rearrange Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `resolve` module derives the output format of a rearranged stream from its input format.

use crate::caps::{Caps, FrameFormat};
use crate::channels::ChannelLayout;
use crate::config::OutputChannels;
use crate::errors::{unsupported_error, Result};

/// Resolve the output format for an input format and an output channel count.
///
/// The sample format and rate pass through unchanged. The output has `channels` channels, which
/// are assigned the first `channels` entries of
/// [`REARRANGE_ORDER`](crate::channels::REARRANGE_ORDER).
///
/// Only mono or stereo input can be rearranged.
pub fn resolve(input: &FrameFormat, channels: OutputChannels) -> Result<FrameFormat> {
    if input.channels() != 1 && input.channels() != 2 {
        return unsupported_error("input must have 1 or 2 channels");
    }

    let layout = match ChannelLayout::rearranged(channels.count()) {
        Some(layout) => layout,
        _ => return unsupported_error("output channel count exceeds 8"),
    };

    Ok(FrameFormat::with_layout(input.sample_format(), layout, input.rate()))
}

/// Resolve the output format for the caps attached to an input buffer.
///
/// Fails if any required field of the caps is missing. No default is ever assumed.
pub fn resolve_caps(input: &Caps, channels: OutputChannels) -> Result<FrameFormat> {
    resolve(&FrameFormat::try_from_caps(input)?, channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{Position, REARRANGE_ORDER};
    use crate::errors::Error;
    use crate::sample::{SampleEncoding, SampleFormat};

    #[test]
    fn verify_format_passthrough() {
        for sample_format in SampleFormat::ALL {
            for in_channels in [1, 2] {
                for channels in OutputChannels::ALL {
                    let input = FrameFormat::new(sample_format, in_channels, 96000);
                    let output = resolve(&input, channels).unwrap();

                    assert_eq!(output.sample_format(), sample_format);
                    assert_eq!(output.rate(), 96000);
                    assert_eq!(output.channels(), channels.count());

                    let layout = output.layout().unwrap();
                    assert_eq!(layout.count(), channels.count());
                    assert_eq!(layout.positions(), &REARRANGE_ORDER[..channels.count()]);
                }
            }
        }
    }

    #[test]
    fn verify_resolve_six_channels() {
        let input = FrameFormat::new(SampleFormat::F32, 2, 44100);
        let output = resolve(&input, OutputChannels::Six).unwrap();

        let layout = output.layout().unwrap();
        assert_eq!(layout.index_of(Position::FRONT_CENTER), Some(4));
        assert_eq!(layout.index_of(Position::LFE), Some(5));
        assert_eq!(layout.index_of(Position::SIDE_LEFT), None);
        assert_eq!(output.bytes_per_frame(), 24);
    }

    #[test]
    fn verify_resolve_rejects_multichannel_input() {
        let input = FrameFormat::new(SampleFormat::S16, 4, 44100);
        assert!(matches!(resolve(&input, OutputChannels::Eight), Err(Error::Unsupported(_))));
    }

    #[test]
    fn verify_resolve_caps() {
        let caps = Caps::new()
            .with_encoding(SampleEncoding::Float)
            .with_width(64)
            .with_channels(1)
            .with_rate(22050);

        let output = resolve_caps(&caps, OutputChannels::Four).unwrap();
        assert_eq!(output.sample_format(), SampleFormat::F64);
        assert_eq!(output.channels(), 4);
        assert_eq!(output.rate(), 22050);

        let caps = Caps::new().with_encoding(SampleEncoding::Float).with_channels(1).with_rate(22050);
        assert!(matches!(
            resolve_caps(&caps, OutputChannels::Four),
            Err(Error::MissingField("width"))
        ));
    }
}
