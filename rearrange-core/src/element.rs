// Rearrange
// Copyright (c) 2024 The Project Rearrange Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `element` module provides the rearrange element: a pipeline stage that routes a mono or
//! stereo stream into one channel pair of a 2, 4, 6, or 8 channel stream.
//!
//! Several independent sources can be routed to distinct channel pairs of a single multichannel
//! device by rearranging each to a different [`Placement`] with the same output channel count and
//! summing the results downstream.
//!
//! ## Reconfiguration
//!
//! The configuration may only be changed through a mutable reference, so it can never change
//! while a buffer is being processed. Each buffer is processed with a copy of the configuration
//! taken when processing begins. A change therefore takes effect from the next buffer onwards,
//! and the caps of that buffer describe the new channel count.

use log::{debug, trace, warn};

use crate::buffer::{PcmBuffer, Sink};
use crate::caps::{Caps, CapsStructure, CapsTemplate, FrameFormat};
use crate::config::{Config, OutputChannels, Placement};
use crate::errors::{Error, Result};
use crate::remap::Remapper;
use crate::resolve::resolve;
use crate::sample::SampleEncoding;

/// The log target of all records emitted by the element.
pub const LOG_TARGET: &str = "rearrange";

/// The channel counts accepted on the input.
pub const INPUT_CHANNELS: [u32; 2] = [1, 2];

/// The channel counts produced on the output.
pub const OUTPUT_CHANNELS: [u32; 4] = [2, 4, 6, 8];

const RATE_MAX: u32 = i32::MAX as u32;

fn template(channels: &[u32]) -> CapsTemplate {
    CapsTemplate::new(vec![
        CapsStructure::new(SampleEncoding::Int, &[16], channels, 1..=RATE_MAX),
        CapsStructure::new(SampleEncoding::Float, &[32, 64], channels, 1..=RATE_MAX),
    ])
}

/// Get the template of all formats the element accepts on its input.
pub fn sink_template() -> CapsTemplate {
    template(&INPUT_CHANNELS)
}

/// Get the template of all formats the element may produce on its output.
pub fn src_template() -> CapsTemplate {
    template(&OUTPUT_CHANNELS)
}

/// The rearrange element.
#[derive(Clone, Debug, Default)]
pub struct Rearrange {
    config: Config,
}

impl Rearrange {
    /// Instantiate the element with a configuration.
    pub fn new(config: Config) -> Self {
        Rearrange { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Replace the configuration. Takes effect from the next buffer.
    ///
    /// The placement is allowed to not fit within the channel count. Such a configuration rejects
    /// every buffer until it is corrected.
    pub fn set_config(&mut self, config: Config) {
        debug!(
            target: LOG_TARGET,
            "configured: channels={}, pos={} ({})",
            config.channels,
            config.placement.index(),
            config.placement
        );

        if let Err(err) = config.validate() {
            warn!(target: LOG_TARGET, "{}", err);
        }

        self.config = config;
    }

    /// Set the output channel count from a raw value. Takes effect from the next buffer.
    pub fn set_channels(&mut self, channels: u32) -> Result<()> {
        let channels = OutputChannels::try_from(channels)?;
        self.set_config(Config { channels, ..self.config });
        Ok(())
    }

    /// Set the placement from a raw selector value. Takes effect from the next buffer.
    pub fn set_placement(&mut self, pos: u32) -> Result<()> {
        let placement = Placement::try_from(pos)?;
        self.set_config(Config { placement, ..self.config });
        Ok(())
    }

    /// Get the output channel count.
    pub fn channels(&self) -> OutputChannels {
        self.config.channels
    }

    /// Get the placement.
    pub fn placement(&self) -> Placement {
        self.config.placement
    }

    /// Resolve the output format for the caps of an input buffer.
    pub fn resolve(&self, caps: &Caps) -> Result<FrameFormat> {
        let input = read_format(caps)?;
        resolve(&input, self.config.channels)
    }

    /// Rearrange one buffer.
    ///
    /// The returned buffer is tagged with the resolved output caps. On failure no output buffer is
    /// allocated.
    pub fn process(&self, buf: &PcmBuffer) -> Result<PcmBuffer> {
        // Snapshot.
        let config = self.config;

        config.validate()?;

        let input = read_format(buf.caps())?;
        let output = resolve(&input, config.channels)?;

        let remapper = Remapper::try_new(
            input.channels(),
            input.bytes_per_sample(),
            config.channels,
            config.placement,
        )?;

        let data = remapper.remap(buf.data())?;

        trace!(
            target: LOG_TARGET,
            "rearranged {} bytes ({}) into {} bytes ({})",
            buf.len(),
            input,
            data.len(),
            output
        );

        Ok(PcmBuffer::new(data, output.to_caps()))
    }

    /// Rearrange one buffer and push the result downstream.
    ///
    /// A refusal by the sink is returned unchanged as [`Error::FlowError`]. The refused buffer is
    /// not retried or retained.
    pub fn chain<S: Sink + ?Sized>(&self, buf: &PcmBuffer, sink: &mut S) -> Result<()> {
        let out = self.process(buf)?;

        sink.push(out).map_err(|err| {
            warn!(target: LOG_TARGET, "push failed: {}", err);
            Error::FlowError(err)
        })
    }

    /// Get the formats the element can accept on its input, given the formats accepted downstream.
    ///
    /// The width, encoding, and rate constraints of downstream are mirrored onto the input. If
    /// nothing is linked downstream, the sink template is returned.
    pub fn sink_caps(&self, downstream: Option<&CapsTemplate>) -> CapsTemplate {
        let caps = match downstream {
            Some(downstream) => {
                sink_template().intersect(&downstream.with_channels(&INPUT_CHANNELS))
            }
            None => sink_template(),
        };

        debug!(target: LOG_TARGET, "sink caps: {}", caps);
        caps
    }

    /// Get the formats the element can produce on its output, given the formats produced upstream.
    ///
    /// The width, encoding, and rate constraints of upstream are mirrored onto the output, and
    /// the channel count is fixed to the configured count.
    pub fn src_caps(&self, upstream: Option<&CapsTemplate>) -> CapsTemplate {
        let channels = [u32::from(self.config.channels)];

        let src = src_template().with_channels(&channels);

        let caps = match upstream {
            Some(upstream) => src.intersect(&upstream.with_channels(&channels)),
            None => src,
        };

        debug!(target: LOG_TARGET, "src caps: {}", caps);
        caps
    }

    /// Returns `true` if the caps fully describe a format the element accepts on its input.
    pub fn accept_caps(&self, caps: &Caps) -> bool {
        match FrameFormat::try_from_caps(caps) {
            Ok(format) => sink_template().contains(&format),
            Err(err) => {
                debug!(target: LOG_TARGET, "refusing caps {}: {}", caps, err);
                false
            }
        }
    }
}

fn read_format(caps: &Caps) -> Result<FrameFormat> {
    FrameFormat::try_from_caps(caps).inspect_err(|err| {
        if let Error::MissingField(field) = err {
            warn!(target: LOG_TARGET, "problem getting caps field '{}' (caps: '{}')", field, caps);
        }
    })
}
