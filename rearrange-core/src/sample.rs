// Rearrange
// Copyright (c) 2024 The Project Rearrange Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `sample` module defines the supported PCM sample formats.
//!
//! Samples are always native byte order. Rearrange never interprets sample values, but the width of
//! a sample fixes the stride of every frame, so it must be known exactly.

use std::fmt;

use crate::errors::{unsupported_error, Result};

/// The numeric encoding family of a sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SampleEncoding {
    /// Signed integer PCM.
    Int,
    /// IEEE 754 floating point PCM.
    Float,
}

impl fmt::Display for SampleEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleEncoding::Int => write!(f, "int"),
            SampleEncoding::Float => write!(f, "float"),
        }
    }
}

/// An enumeration of the supported sample formats.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    /// Signed 16-bit integer.
    S16,
    /// Single precision (32-bit) floating point.
    F32,
    /// Double precision (64-bit) floating point.
    F64,
}

impl SampleFormat {
    /// Every supported sample format.
    pub const ALL: [SampleFormat; 3] = [SampleFormat::S16, SampleFormat::F32, SampleFormat::F64];

    /// Try to get the sample format for an encoding and a width in bits.
    pub fn try_from_encoding(encoding: SampleEncoding, width_bits: u32) -> Result<SampleFormat> {
        match (encoding, width_bits) {
            (SampleEncoding::Int, 16) => Ok(SampleFormat::S16),
            (SampleEncoding::Float, 32) => Ok(SampleFormat::F32),
            (SampleEncoding::Float, 64) => Ok(SampleFormat::F64),
            (SampleEncoding::Int, _) => unsupported_error("integer samples must be 16 bits wide"),
            (SampleEncoding::Float, _) => {
                unsupported_error("float samples must be 32 or 64 bits wide")
            }
        }
    }

    /// Get the encoding family.
    pub fn encoding(&self) -> SampleEncoding {
        match self {
            SampleFormat::S16 => SampleEncoding::Int,
            SampleFormat::F32 | SampleFormat::F64 => SampleEncoding::Float,
        }
    }

    /// Get the width of one sample in bits.
    pub fn bits_per_sample(&self) -> u32 {
        match self {
            SampleFormat::S16 => 16,
            SampleFormat::F32 => 32,
            SampleFormat::F64 => 64,
        }
    }

    /// Get the width of one sample in bytes.
    pub fn bytes_per_sample(&self) -> usize {
        self.bits_per_sample() as usize / 8
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleFormat::S16 => write!(f, "s16"),
            SampleFormat::F32 => write!(f, "f32"),
            SampleFormat::F64 => write!(f, "f64"),
        }
    }
}

/// A sample data type that may be remapped directly as a typed slice.
///
/// The remapper itself only ever moves bytes, so this trait only ties a plain-old-data type to its
/// runtime [`SampleFormat`].
pub trait Sample: bytemuck::Pod {
    /// The runtime sample format of this type.
    const FORMAT: SampleFormat;
}

impl Sample for i16 {
    const FORMAT: SampleFormat = SampleFormat::S16;
}

impl Sample for f32 {
    const FORMAT: SampleFormat = SampleFormat::F32;
}

impl Sample for f64 {
    const FORMAT: SampleFormat = SampleFormat::F64;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn verify_sample_format_widths() {
        assert_eq!(SampleFormat::S16.bytes_per_sample(), 2);
        assert_eq!(SampleFormat::F32.bytes_per_sample(), 4);
        assert_eq!(SampleFormat::F64.bytes_per_sample(), 8);

        for format in SampleFormat::ALL {
            let found =
                SampleFormat::try_from_encoding(format.encoding(), format.bits_per_sample());
            assert_eq!(found.ok(), Some(format));
        }
    }

    #[test]
    fn verify_unsupported_widths() {
        assert!(matches!(
            SampleFormat::try_from_encoding(SampleEncoding::Int, 32),
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            SampleFormat::try_from_encoding(SampleEncoding::Float, 16),
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            SampleFormat::try_from_encoding(SampleEncoding::Int, 24),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn verify_sample_type_formats() {
        assert_eq!(<i16 as Sample>::FORMAT, SampleFormat::S16);
        assert_eq!(<f32 as Sample>::FORMAT, SampleFormat::F32);
        assert_eq!(<f64 as Sample>::FORMAT, SampleFormat::F64);
        assert_eq!(std::mem::size_of::<f64>(), SampleFormat::F64.bytes_per_sample());
    }
}
