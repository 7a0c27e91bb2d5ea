// Rearrange
// Copyright (c) 2024 The Project Rearrange Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::error;
use std::fmt;
use std::io;
use std::result;

use crate::buffer::FlowError;

/// `Error` provides an enumeration of all possible errors reported by Rearrange.
///
/// Every error is scoped to the single buffer, configuration update, or negotiation step that
/// produced it. None are retried internally.
#[derive(Debug)]
pub enum Error {
    /// An IO error occured while reading or writing a stream.
    IoError(std::io::Error),
    /// The output channel count, placement, or their combination is out of domain.
    ConfigError(&'static str),
    /// A required field could not be read from the caps attached to a buffer.
    MissingField(&'static str),
    /// A caps field was read, but its value is not supported.
    Unsupported(&'static str),
    /// The buffer does not contain a whole number of frames.
    MalformedBuffer(&'static str),
    /// The output buffer could not be allocated.
    AllocationError,
    /// The downstream sink refused a buffer.
    FlowError(FlowError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::IoError(ref err) => err.fmt(f),
            Error::ConfigError(msg) => {
                write!(f, "invalid configuration: {}", msg)
            }
            Error::MissingField(field) => {
                write!(f, "caps field missing: {}", field)
            }
            Error::Unsupported(feature) => {
                write!(f, "unsupported feature: {}", feature)
            }
            Error::MalformedBuffer(msg) => {
                write!(f, "malformed buffer: {}", msg)
            }
            Error::AllocationError => {
                write!(f, "output buffer allocation failed")
            }
            Error::FlowError(ref flow) => {
                write!(f, "downstream rejected buffer: {}", flow)
            }
        }
    }
}

impl std::error::Error for Error {
    fn cause(&self) -> Option<&dyn error::Error> {
        match *self {
            Error::IoError(ref err) => Some(err),
            Error::ConfigError(_) => None,
            Error::MissingField(_) => None,
            Error::Unsupported(_) => None,
            Error::MalformedBuffer(_) => None,
            Error::AllocationError => None,
            Error::FlowError(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

impl From<FlowError> for Error {
    fn from(err: FlowError) -> Error {
        Error::FlowError(err)
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create a configuration error.
pub fn config_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::ConfigError(desc))
}

/// Convenience function to create a missing caps field error.
pub fn missing_field_error<T>(field: &'static str) -> Result<T> {
    Err(Error::MissingField(field))
}

/// Convenience function to create an unsupported feature error.
pub fn unsupported_error<T>(feature: &'static str) -> Result<T> {
    Err(Error::Unsupported(feature))
}

/// Convenience function to create a malformed buffer error.
pub fn malformed_buffer_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::MalformedBuffer(desc))
}
