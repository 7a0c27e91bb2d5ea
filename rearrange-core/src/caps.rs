// Rearrange
// Copyright (c) 2024 The Project Rearrange Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `caps` module describes the format of audio buffers.
//!
//! Three levels of description are used:
//!
//! * [`Caps`] is the format attached to a buffer by whoever produced it. Any field may be missing.
//! * [`FrameFormat`] is a complete and validated description of one interleaved frame.
//! * [`CapsTemplate`] is a set of acceptable formats, used when two stages negotiate a format
//!   before any buffer flows.

use std::fmt;
use std::ops::RangeInclusive;

use smallvec::SmallVec;

use crate::channels::ChannelLayout;
use crate::errors::{missing_field_error, unsupported_error, Result};
use crate::sample::{SampleEncoding, SampleFormat};

/// The format attached to a buffer.
///
/// Every field is optional because the producer of a buffer is not trusted to have filled them
/// in. A missing field is never replaced by a default value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Caps {
    /// The sample encoding.
    pub encoding: Option<SampleEncoding>,
    /// The width of a sample in bits.
    pub width: Option<u32>,
    /// The number of interleaved channels.
    pub channels: Option<u32>,
    /// The sample rate in Hz.
    pub rate: Option<u32>,
    /// The ordered channel positions.
    pub layout: Option<ChannelLayout>,
}

impl Caps {
    /// Instantiate empty caps.
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the sample encoding.
    pub fn with_encoding(mut self, encoding: SampleEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Set the sample width in bits.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the channel count.
    pub fn with_channels(mut self, channels: u32) -> Self {
        self.channels = Some(channels);
        self
    }

    /// Set the sample rate in Hz.
    pub fn with_rate(mut self, rate: u32) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Set the ordered channel positions.
    pub fn with_layout(mut self, layout: ChannelLayout) -> Self {
        self.layout = Some(layout);
        self
    }
}

impl fmt::Display for Caps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn field<T: fmt::Display>(value: &Option<T>) -> String {
            value.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
        }

        write!(
            f,
            "audio/{}, width={}, channels={}, rate={}",
            field(&self.encoding),
            field(&self.width),
            field(&self.channels),
            field(&self.rate),
        )?;

        if let Some(layout) = &self.layout {
            write!(f, ", positions={}", layout)?;
        }

        Ok(())
    }
}

/// A complete description of an interleaved PCM frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameFormat {
    sample_format: SampleFormat,
    channels: usize,
    rate: u32,
    layout: Option<ChannelLayout>,
}

impl FrameFormat {
    /// Create a frame format without channel positions.
    ///
    /// # Panics
    ///
    /// Panics if `channels` or `rate` is 0.
    pub fn new(sample_format: SampleFormat, channels: usize, rate: u32) -> Self {
        assert!(channels > 0, "frame must have at least one channel");
        assert!(rate > 0, "sample rate must be positive");
        FrameFormat { sample_format, channels, rate, layout: None }
    }

    /// Create a frame format with ordered channel positions. The channel count is the number of
    /// positions.
    ///
    /// # Panics
    ///
    /// Panics if `layout` is empty or `rate` is 0.
    pub fn with_layout(sample_format: SampleFormat, layout: ChannelLayout, rate: u32) -> Self {
        let mut format = FrameFormat::new(sample_format, layout.count(), rate);
        format.layout = Some(layout);
        format
    }

    /// Read a frame format from caps.
    ///
    /// Encoding, width, channel count, and rate are all required. Channel positions are optional,
    /// but if present they must agree with the channel count.
    pub fn try_from_caps(caps: &Caps) -> Result<FrameFormat> {
        let encoding = match caps.encoding {
            Some(encoding) => encoding,
            _ => return missing_field_error("encoding"),
        };

        let width = match caps.width {
            Some(width) => width,
            _ => return missing_field_error("width"),
        };

        let channels = match caps.channels {
            Some(channels) => channels,
            _ => return missing_field_error("channels"),
        };

        let rate = match caps.rate {
            Some(rate) => rate,
            _ => return missing_field_error("rate"),
        };

        let sample_format = SampleFormat::try_from_encoding(encoding, width)?;

        if channels == 0 {
            return unsupported_error("channel count must be positive");
        }

        if rate == 0 {
            return unsupported_error("sample rate must be positive");
        }

        if let Some(layout) = &caps.layout {
            if layout.count() != channels as usize {
                return unsupported_error("channel positions do not match the channel count");
            }
        }

        Ok(FrameFormat {
            sample_format,
            channels: channels as usize,
            rate,
            layout: caps.layout.clone(),
        })
    }

    /// Get the caps fully describing this format.
    pub fn to_caps(&self) -> Caps {
        Caps {
            encoding: Some(self.sample_format.encoding()),
            width: Some(self.sample_format.bits_per_sample()),
            channels: Some(self.channels as u32),
            rate: Some(self.rate),
            layout: self.layout.clone(),
        }
    }

    /// Get the sample format.
    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }

    /// Get the number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Get the sample rate in Hz.
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Get the ordered channel positions, if known.
    pub fn layout(&self) -> Option<&ChannelLayout> {
        self.layout.as_ref()
    }

    /// Get the width of one sample in bytes.
    pub fn bytes_per_sample(&self) -> usize {
        self.sample_format.bytes_per_sample()
    }

    /// Get the size of one interleaved frame in bytes.
    pub fn bytes_per_frame(&self) -> usize {
        self.channels * self.bytes_per_sample()
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_caps(), f)
    }
}

/// One family of acceptable formats: a single encoding, with sets of acceptable widths and
/// channel counts, and a range of acceptable sample rates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapsStructure {
    pub encoding: SampleEncoding,
    pub widths: SmallVec<[u32; 2]>,
    pub channels: SmallVec<[u32; 4]>,
    pub rate: RangeInclusive<u32>,
}

impl CapsStructure {
    /// Instantiate a structure from its accepted widths (in bits), channel counts, and rates.
    pub fn new(
        encoding: SampleEncoding,
        widths: &[u32],
        channels: &[u32],
        rate: RangeInclusive<u32>,
    ) -> Self {
        CapsStructure {
            encoding,
            widths: SmallVec::from_slice(widths),
            channels: SmallVec::from_slice(channels),
            rate,
        }
    }

    /// Intersect two structures. Returns `None` if no format satisfies both.
    pub fn intersect(&self, other: &CapsStructure) -> Option<CapsStructure> {
        if self.encoding != other.encoding {
            return None;
        }

        let widths: SmallVec<[u32; 2]> =
            self.widths.iter().filter(|w| other.widths.contains(w)).copied().collect();

        let channels: SmallVec<[u32; 4]> =
            self.channels.iter().filter(|c| other.channels.contains(c)).copied().collect();

        let start = *self.rate.start().max(other.rate.start());
        let end = *self.rate.end().min(other.rate.end());

        if widths.is_empty() || channels.is_empty() || start > end {
            return None;
        }

        Some(CapsStructure { encoding: self.encoding, widths, channels, rate: start..=end })
    }

    /// Returns `true` if the complete format is a member of this structure.
    pub fn contains(&self, format: &FrameFormat) -> bool {
        let sample_format = format.sample_format();

        self.encoding == sample_format.encoding()
            && self.widths.contains(&sample_format.bits_per_sample())
            && self.channels.contains(&(format.channels() as u32))
            && self.rate.contains(&format.rate())
    }
}

impl fmt::Display for CapsStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "audio/{}, width={:?}, channels={:?}, rate=[{},{}]",
            self.encoding,
            self.widths.as_slice(),
            self.channels.as_slice(),
            self.rate.start(),
            self.rate.end()
        )
    }
}

/// A set of acceptable formats.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapsTemplate {
    structures: Vec<CapsStructure>,
}

impl CapsTemplate {
    /// Instantiate a template accepting the union of `structures`.
    pub fn new(structures: Vec<CapsStructure>) -> Self {
        CapsTemplate { structures }
    }

    /// Get the structures of the template.
    pub fn structures(&self) -> &[CapsStructure] {
        &self.structures
    }

    /// Returns `true` if no format is acceptable.
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Intersect two templates pairwise, dropping empty results.
    pub fn intersect(&self, other: &CapsTemplate) -> CapsTemplate {
        let structures = self
            .structures
            .iter()
            .flat_map(|a| other.structures.iter().filter_map(move |b| a.intersect(b)))
            .collect();

        CapsTemplate { structures }
    }

    /// Replace the channel constraint of every structure.
    ///
    /// Used to mirror the width, encoding, and rate constraints of one side of the element onto
    /// the other, where the channel count is always different.
    pub fn with_channels(&self, channels: &[u32]) -> CapsTemplate {
        let structures = self
            .structures
            .iter()
            .map(|s| CapsStructure { channels: SmallVec::from_slice(channels), ..s.clone() })
            .collect();

        CapsTemplate { structures }
    }

    /// Returns `true` if the complete format is a member of any structure.
    pub fn contains(&self, format: &FrameFormat) -> bool {
        self.structures.iter().any(|s| s.contains(format))
    }
}

impl fmt::Display for CapsTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.structures.is_empty() {
            return write!(f, "EMPTY");
        }

        let list = self.structures.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        write!(f, "{}", list.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    fn stereo_s16_caps() -> Caps {
        Caps::new().with_encoding(SampleEncoding::Int).with_width(16).with_channels(2).with_rate(48000)
    }

    #[test]
    fn verify_frame_format_from_caps() {
        let format = FrameFormat::try_from_caps(&stereo_s16_caps()).unwrap();

        assert_eq!(format.sample_format(), SampleFormat::S16);
        assert_eq!(format.channels(), 2);
        assert_eq!(format.rate(), 48000);
        assert_eq!(format.bytes_per_frame(), 4);
        assert!(format.layout().is_none());
        assert_eq!(format.to_caps(), stereo_s16_caps());
    }

    #[test]
    fn verify_missing_fields_are_not_defaulted() {
        let mut caps = stereo_s16_caps();
        caps.width = None;
        assert!(matches!(FrameFormat::try_from_caps(&caps), Err(Error::MissingField("width"))));

        let mut caps = stereo_s16_caps();
        caps.channels = None;
        assert!(matches!(FrameFormat::try_from_caps(&caps), Err(Error::MissingField("channels"))));

        let mut caps = stereo_s16_caps();
        caps.encoding = None;
        assert!(matches!(FrameFormat::try_from_caps(&caps), Err(Error::MissingField("encoding"))));

        let mut caps = stereo_s16_caps();
        caps.rate = None;
        assert!(matches!(FrameFormat::try_from_caps(&caps), Err(Error::MissingField("rate"))));
    }

    #[test]
    fn verify_invalid_field_values() {
        let caps = stereo_s16_caps().with_rate(0);
        assert!(matches!(FrameFormat::try_from_caps(&caps), Err(Error::Unsupported(_))));

        let caps = stereo_s16_caps().with_channels(0);
        assert!(matches!(FrameFormat::try_from_caps(&caps), Err(Error::Unsupported(_))));

        let caps = stereo_s16_caps().with_layout(ChannelLayout::rearranged(4).unwrap());
        assert!(matches!(FrameFormat::try_from_caps(&caps), Err(Error::Unsupported(_))));

        let caps = stereo_s16_caps().with_encoding(SampleEncoding::Float);
        assert!(matches!(FrameFormat::try_from_caps(&caps), Err(Error::Unsupported(_))));
    }

    #[test]
    fn verify_structure_intersection() {
        let a = CapsStructure::new(SampleEncoding::Float, &[32, 64], &[1, 2], 1..=192000);
        let b = CapsStructure::new(SampleEncoding::Float, &[64], &[2, 4], 8000..=i32::MAX as u32);

        let c = a.intersect(&b).unwrap();
        assert_eq!(c.widths.as_slice(), &[64]);
        assert_eq!(c.channels.as_slice(), &[2]);
        assert_eq!(c.rate, 8000..=192000);

        let d = CapsStructure::new(SampleEncoding::Int, &[16], &[1, 2], 1..=48000);
        assert!(a.intersect(&d).is_none());

        let e = CapsStructure::new(SampleEncoding::Float, &[32], &[1, 2], 200000..=300000);
        assert!(a.intersect(&e).is_none());
    }

    #[test]
    fn verify_template_intersection() {
        let ours = CapsTemplate::new(vec![
            CapsStructure::new(SampleEncoding::Int, &[16], &[1, 2], 1..=u32::MAX),
            CapsStructure::new(SampleEncoding::Float, &[32, 64], &[1, 2], 1..=u32::MAX),
        ]);
        let theirs = CapsTemplate::new(vec![CapsStructure::new(
            SampleEncoding::Float,
            &[32],
            &[4],
            44100..=48000,
        )]);

        assert!(ours.intersect(&theirs).is_empty());
        assert_eq!(ours.intersect(&theirs).to_string(), "EMPTY");
        assert!(ours.intersect(&CapsTemplate::default()).is_empty());

        let mirrored = ours.intersect(&theirs.with_channels(&[1, 2]));
        assert_eq!(mirrored.structures().len(), 1);
        assert_eq!(mirrored.structures()[0].widths.as_slice(), &[32]);
        assert_eq!(mirrored.structures()[0].rate, 44100..=48000);

        let f32_stereo = FrameFormat::new(SampleFormat::F32, 2, 44100);
        let f64_stereo = FrameFormat::new(SampleFormat::F64, 2, 44100);
        assert!(mirrored.contains(&f32_stereo));
        assert!(!mirrored.contains(&f64_stereo));
    }
}
