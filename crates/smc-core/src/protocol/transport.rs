//! Transport abstraction
//!
//! The controller session talks to the line through this trait so the protocol
//! logic can run against a real serial port or an in-memory stand-in.

use super::ProtocolError;

/// Byte transport carrying frames to the device and responses back
pub trait Transport: Send {
    /// Write all bytes to the line
    fn write(&mut self, bytes: &[u8]) -> Result<(), ProtocolError>;

    /// Read exactly `n` bytes, failing if the line errors or the read times out
    fn read(&mut self, n: usize) -> Result<Vec<u8>, ProtocolError>;

    /// Release the underlying connection. Further calls are no-ops.
    fn close(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }
}
