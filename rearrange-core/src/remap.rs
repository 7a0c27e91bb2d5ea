// Rearrange
// Copyright (c) 2024 The Project Rearrange Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `remap` module moves a mono or stereo signal into one channel pair of a multichannel
//! stream.
//!
//! Every output frame is `out_channels * width` bytes. The channel pair selected by the
//! [`Placement`] occupies the byte range `[2 * pos * width, 2 * pos * width + 2 * width)` of the
//! frame, called the active window. The active window receives the input frame, and every other
//! byte of the frame is zero (silence for all supported sample formats).
//!
//! Samples are copied verbatim. No sample is ever scaled, mixed, or converted, so the remapper
//! only needs to know the width of a sample and not its encoding.
//!
//! A mono input sample is written into both channels of the active window.

use std::ops::Range;

use crate::config::{OutputChannels, Placement};
use crate::errors::{config_error, malformed_buffer_error, Error, Result};
use crate::sample::Sample;

/// A validated set of remapping parameters.
///
/// All configuration faults are detected when the remapper is instantiated, so a remapper can
/// never fail part way through a buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Remapper {
    in_channels: usize,
    width: usize,
    out_channels: usize,
    window_start: usize,
}

impl Remapper {
    /// Instantiate a remapper.
    ///
    /// `in_channels` must be 1 or 2, `width` is the width of a sample in bytes and must be 2, 4, or
    /// 8, and the placement must fit within the output channel count.
    pub fn try_new(
        in_channels: usize,
        width: usize,
        channels: OutputChannels,
        placement: Placement,
    ) -> Result<Remapper> {
        if in_channels != 1 && in_channels != 2 {
            return config_error("input channel count must be 1 or 2");
        }

        if width != 2 && width != 4 && width != 8 {
            return config_error("sample width must be 2, 4, or 8 bytes");
        }

        let out_channels = channels.count();
        let window_start = placement.first_channel() * width;

        // The active window is exactly one channel pair, and must lie within the output frame.
        if window_start + 2 * width > out_channels * width {
            return config_error("placement does not fit within the output channel count");
        }

        Ok(Remapper { in_channels, width, out_channels, window_start })
    }

    /// Get the number of input channels.
    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    /// Get the width of a sample in bytes.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the number of output channels.
    pub fn out_channels(&self) -> usize {
        self.out_channels
    }

    /// Get the size of an input frame in bytes.
    pub fn in_frame_bytes(&self) -> usize {
        self.in_channels * self.width
    }

    /// Get the size of an output frame in bytes.
    pub fn out_frame_bytes(&self) -> usize {
        self.out_channels * self.width
    }

    /// Get the byte range of the active window within an output frame.
    pub fn active_window(&self) -> Range<usize> {
        self.window_start..self.window_start + 2 * self.width
    }

    /// Get the length in bytes of the output for an input of `input_len` bytes.
    ///
    /// Fails if the input is not a whole number of frames.
    pub fn output_len(&self, input_len: usize) -> Result<usize> {
        if input_len % self.in_frame_bytes() != 0 {
            return malformed_buffer_error("buffer length is not a multiple of the frame size");
        }

        let frames = input_len / self.in_frame_bytes();

        frames.checked_mul(self.out_frame_bytes()).ok_or(Error::AllocationError)
    }

    /// Remap an input buffer into a caller provided output buffer.
    ///
    /// The output buffer must be exactly [`output_len`](Self::output_len) bytes long. Every byte of
    /// the output buffer is written.
    pub fn remap_into(&self, src: &[u8], dst: &mut [u8]) -> Result<()> {
        if self.output_len(src.len())? != dst.len() {
            return malformed_buffer_error("output buffer length does not match the input");
        }

        let window = self.active_window();
        let width = self.width;

        let in_frames = src.chunks_exact(self.in_frame_bytes());
        let out_frames = dst.chunks_exact_mut(self.out_frame_bytes());

        for (in_frame, out_frame) in in_frames.zip(out_frames) {
            let (before, rest) = out_frame.split_at_mut(window.start);
            let (active, after) = rest.split_at_mut(window.len());

            before.fill(0);
            after.fill(0);

            let (first, second) = active.split_at_mut(width);

            first.copy_from_slice(&in_frame[..width]);

            // A mono sample is read once and written to both channels of the pair.
            match self.in_channels {
                1 => second.copy_from_slice(&in_frame[..width]),
                _ => second.copy_from_slice(&in_frame[width..2 * width]),
            }
        }

        Ok(())
    }

    /// Remap an input buffer into a newly allocated output buffer.
    ///
    /// All faults are reported before the output buffer is allocated.
    pub fn remap(&self, src: &[u8]) -> Result<Vec<u8>> {
        let len = self.output_len(src.len())?;

        let mut dst = Vec::new();
        dst.try_reserve_exact(len).map_err(|_| Error::AllocationError)?;
        dst.resize(len, 0);

        self.remap_into(src, &mut dst)?;

        Ok(dst)
    }
}

/// Remap an interleaved input buffer of `in_channels` channels and `width` byte samples into an
/// output buffer of `channels` channels, placing the signal at `placement`.
///
/// The output is `src.len() * channels / in_channels` bytes long.
pub fn remap(
    src: &[u8],
    in_channels: usize,
    width: usize,
    channels: OutputChannels,
    placement: Placement,
) -> Result<Vec<u8>> {
    Remapper::try_new(in_channels, width, channels, placement)?.remap(src)
}

/// Remap a slice of typed interleaved samples.
///
/// This is identical to [`remap`] with the sample width taken from the sample type.
pub fn remap_samples<S: Sample>(
    src: &[S],
    in_channels: usize,
    channels: OutputChannels,
    placement: Placement,
) -> Result<Vec<S>> {
    let remapper =
        Remapper::try_new(in_channels, S::FORMAT.bytes_per_sample(), channels, placement)?;

    let src_bytes: &[u8] = bytemuck::cast_slice(src);
    let len = remapper.output_len(src_bytes.len())? / remapper.width();

    let mut dst = Vec::new();
    dst.try_reserve_exact(len).map_err(|_| Error::AllocationError)?;
    dst.resize(len, S::zeroed());

    remapper.remap_into(src_bytes, bytemuck::cast_slice_mut(&mut dst[..]))?;

    Ok(dst)
}
