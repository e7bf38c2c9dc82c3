//! Frame encoding
//!
//! Implements the addressed frame format of the Pololu protocol.
//!
//! Frame format:
//! - 1 byte: sync byte (0xAA)
//! - 1 byte: device number
//! - N bytes: payload (opcode with MSB cleared, then data bytes)

use super::{CommandKind, FRAME_HEADER_LEN, SYNC_BYTE};

/// Assemble the wire bytes for a payload addressed to `device_number`
pub fn build_frame(device_number: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    bytes.push(SYNC_BYTE);
    bytes.push(device_number);
    bytes.extend_from_slice(payload);
    bytes
}

/// A command addressed to one device, ready to be written to the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Target device number
    pub device_number: u8,
    /// Command the payload was built from
    pub kind: CommandKind,
    /// Specialized payload
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create a frame from an already specialized payload
    pub fn new(device_number: u8, kind: CommandKind, payload: Vec<u8>) -> Self {
        Self {
            device_number,
            kind,
            payload,
        }
    }

    /// Encode the frame to raw bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        build_frame(self.device_number, &self.payload)
    }

    /// Get the total encoded size
    pub fn encoded_size(&self) -> usize {
        FRAME_HEADER_LEN + self.payload.len()
    }

    /// Number of response bytes expected after this frame is sent
    pub fn response_len(&self) -> usize {
        self.kind.response_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DEFAULT_DEVICE_NUMBER;

    #[test]
    fn test_build_frame_header() {
        for kind in CommandKind::ALL {
            let payload = kind.descriptor().payload;
            let bytes = build_frame(0x2A, payload);
            assert_eq!(bytes[0], SYNC_BYTE);
            assert_eq!(bytes[1], 0x2A);
            assert_eq!(bytes.len(), 2 + payload.len());
            assert_eq!(&bytes[2..], payload);
        }
    }

    #[test]
    fn test_frame_encoding() {
        let frame = Frame::new(DEFAULT_DEVICE_NUMBER, CommandKind::GetFirmwareVersion, vec![0x42]);
        assert_eq!(frame.to_bytes(), vec![0xAA, 0x0D, 0x42]);
        assert_eq!(frame.encoded_size(), 3);
        assert_eq!(frame.response_len(), 4);
    }

    #[test]
    fn test_frame_empty_payload() {
        assert_eq!(build_frame(0, &[]), vec![0xAA, 0x00]);
    }
}
