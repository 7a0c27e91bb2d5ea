// Rearrange Tool
// Copyright (c) 2024 The Project Rearrange Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io::Write;

use rearrange_core::buffer::{FlowError, PcmBuffer, Sink};
use rearrange_core::caps::Caps;

use log::{error, info};

/// A sink writing the payload of every buffer to a writer.
pub struct WriterSink<W: Write> {
    writer: W,
    n_buffers: u64,
    n_bytes: u64,
    caps: Option<Caps>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        WriterSink { writer, n_buffers: 0, n_bytes: 0, caps: None }
    }

    /// Get the number of buffers written.
    pub fn n_buffers(&self) -> u64 {
        self.n_buffers
    }

    /// Get the number of bytes written.
    pub fn n_bytes(&self) -> u64 {
        self.n_bytes
    }

    /// Get the caps of the last buffer written.
    pub fn caps(&self) -> Option<&Caps> {
        self.caps.as_ref()
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn push(&mut self, buf: PcmBuffer) -> Result<(), FlowError> {
        if let Err(err) = self.writer.write_all(buf.data()) {
            error!("write failed: {}", err);
            return Err(FlowError::Error);
        }

        if self.caps.as_ref() != Some(buf.caps()) {
            info!("output caps: {}", buf.caps());
            self.caps = Some(buf.caps().clone());
        }

        self.n_buffers += 1;
        self.n_bytes += buf.len() as u64;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use rearrange_core::sample::SampleEncoding;

    use super::*;

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn verify_writer_sink() {
        let caps = Caps::new().with_encoding(SampleEncoding::Int).with_width(16).with_channels(4);

        let mut sink = WriterSink::new(Vec::new());
        sink.push(PcmBuffer::new(vec![1, 2, 3, 4], caps.clone())).unwrap();
        sink.push(PcmBuffer::new(vec![5, 6, 7, 8], caps.clone())).unwrap();

        assert_eq!(sink.n_buffers(), 2);
        assert_eq!(sink.n_bytes(), 8);
        assert_eq!(sink.caps(), Some(&caps));
        assert_eq!(sink.writer, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn verify_writer_sink_failure() {
        let mut sink = WriterSink::new(BrokenWriter);
        let res = sink.push(PcmBuffer::new(vec![1, 2], Caps::new()));

        assert_eq!(res, Err(FlowError::Error));
        assert_eq!(sink.n_buffers(), 0);
    }
}
