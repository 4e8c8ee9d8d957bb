//! In-memory serial lines for exercising the stack in tests.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use super::SerialLine;

/// Records every transmitted byte into a shared buffer the test can
/// inspect.
#[derive(Clone, Default)]
pub struct RecordingLine {
    sent: Rc<RefCell<Vec<u8>>>,
}

impl RecordingLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything transmitted so far.
    pub fn take(&self) -> Vec<u8> {
        self.sent.borrow_mut().split_off(0)
    }
}

impl SerialLine for RecordingLine {
    fn transmit(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.sent.borrow_mut().extend_from_slice(bytes);
        Ok(())
    }
}

/// Fails every transmit, standing in for a line that went down.
pub struct BrokenLine;

impl SerialLine for BrokenLine {
    fn transmit(&mut self, _bytes: &[u8]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "line down"))
    }
}
