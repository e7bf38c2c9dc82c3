//! Protocol errors

use thiserror::Error;

use super::CommandKind;

/// Errors that can occur during protocol communication
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Serial port error: {0}")]
    SerialError(String),

    #[error("Response timeout: expected {expected} bytes, got {received}")]
    Timeout { expected: usize, received: usize },

    #[error("Not connected to motor controller")]
    NotConnected,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Payload byte out of range: value {value} at index {index} (payload length {len})")]
    OutOfRange { index: usize, value: u16, len: usize },

    #[error("Failed to write to transport: {0}")]
    TransportWriteFailed(String),

    #[error("Failed to read from transport: {0}")]
    TransportReadFailed(String),

    #[error("Invalid response to {command:?}: expected {expected} bytes, got {actual}")]
    InvalidResponse {
        command: CommandKind,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown variable ID: {0}")]
    UnknownVariable(u8),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
