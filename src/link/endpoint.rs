//! Per-line framing endpoint.

use crate::link::{slip, LinkError, SerialLine};

/// Adapts one raw serial line into discrete datagram delivery.
///
/// Incoming bytes accumulate in a frame buffer that is split on the SLIP
/// delimiter on every receive event; the unterminated tail stays buffered
/// for the next chunk. However the transport chops the stream up, the
/// reassembled datagrams come out the same.
pub struct LinkEndpoint {
    line: Box<dyn SerialLine>,
    buffer: Vec<u8>,
}

impl LinkEndpoint {
    pub fn new(line: Box<dyn SerialLine>) -> Self {
        LinkEndpoint {
            line,
            buffer: Vec::new(),
        }
    }

    /// Frame a datagram and hand it to the serial line.
    ///
    /// A transport failure propagates unmodified; nothing is retried.
    pub fn send(&mut self, datagram: &[u8]) -> Result<(), LinkError> {
        self.line.transmit(&slip::encode(datagram))?;
        Ok(())
    }

    /// Feed a chunk of raw bytes, returning every datagram it completes.
    ///
    /// Empty frames (adjacent delimiters) are skipped. A chunk with no
    /// delimiter only grows the buffer and returns nothing.
    pub fn receive_raw(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);

        let (datagrams, tail) = {
            let mut segments: Vec<&[u8]> = self.buffer.split(|&b| b == slip::END).collect();
            // The last segment is not yet terminated and becomes the new
            // buffer; it is empty when the chunk ended on a delimiter.
            let tail = segments.pop().unwrap_or(&[]).to_vec();
            let datagrams = segments
                .into_iter()
                .filter(|segment| !segment.is_empty())
                .map(slip::decode)
                .collect();
            (datagrams, tail)
        };

        self.buffer = tail;
        datagrams
    }
}
