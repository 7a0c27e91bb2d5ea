// Rearrange
// Copyright (c) 2024 The Project Rearrange Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `buffer` module defines the buffers exchanged between pipeline stages, and the interface of
//! the stage downstream of the rearrange element.

use std::fmt;

use crate::caps::Caps;

/// An owned buffer of interleaved PCM frames, tagged with its format.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PcmBuffer {
    data: Box<[u8]>,
    caps: Caps,
}

impl PcmBuffer {
    /// Instantiate a buffer from its payload and the caps describing it.
    pub fn new(data: impl Into<Box<[u8]>>, caps: Caps) -> Self {
        PcmBuffer { data: data.into(), caps }
    }

    /// Get the payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the caps attached to the payload.
    pub fn caps(&self) -> &Caps {
        &self.caps
    }

    /// Get the length of the payload in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume the buffer, returning the payload and the caps.
    pub fn into_parts(self) -> (Box<[u8]>, Caps) {
        (self.data, self.caps)
    }
}

/// The reason a downstream stage refused a buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlowError {
    /// Nothing is linked downstream.
    NotLinked,
    /// Downstream is flushing and discards all buffers.
    Flushing,
    /// Downstream failed to process the buffer.
    Error,
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::NotLinked => write!(f, "not linked"),
            FlowError::Flushing => write!(f, "flushing"),
            FlowError::Error => write!(f, "processing error"),
        }
    }
}

/// A `Sink` is the stage downstream of the rearrange element.
///
/// Ownership of each buffer passes to the sink on push, even if the sink refuses it.
pub trait Sink {
    /// Push a buffer downstream.
    fn push(&mut self, buf: PcmBuffer) -> Result<(), FlowError>;
}

/// Collecting pushed buffers in a vector never fails.
impl Sink for Vec<PcmBuffer> {
    fn push(&mut self, buf: PcmBuffer) -> Result<(), FlowError> {
        Vec::push(self, buf);
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn push(&mut self, buf: PcmBuffer) -> Result<(), FlowError> {
        (**self).push(buf)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn push(&mut self, buf: PcmBuffer) -> Result<(), FlowError> {
        (**self).push(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_vec_sink() {
        let mut sink: Vec<PcmBuffer> = Vec::new();

        Sink::push(&mut sink, PcmBuffer::new(vec![1, 2], Caps::new())).unwrap();
        Sink::push(&mut &mut sink, PcmBuffer::new(vec![3, 4], Caps::new().with_rate(8000)))
            .unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].data(), &[3, 4]);
        assert_eq!(sink[1].caps().rate, Some(8000));

        let (data, caps) = sink.remove(0).into_parts();
        assert_eq!(&*data, &[1, 2]);
        assert_eq!(caps, Caps::new());
    }
}
