//! Pololu Serial Protocol
//!
//! Implements the addressed command protocol used by Pololu Simple Motor Controllers.
//!
//! Every frame starts with the sync byte `0xAA` followed by the device number, so several
//! controllers can share one serial line and only the addressed unit acts on a command.
//! The remaining bytes are the compact-protocol command with its most significant bit cleared.

pub mod command_builder;
pub mod commands;
mod controller;
mod error;
mod packet;
pub mod response;
pub mod serial;
mod transport;
pub mod variables;

pub use command_builder::{encode_speed, set_payload_byte, CommandBuilder};
pub use commands::{CommandDescriptor, CommandKind};
pub use controller::{Controller, ControllerConfig, ControllerState, SendOutcome};
pub use error::ProtocolError;
pub use packet::{build_frame, Frame};
pub use response::{FirmwareInfo, Response};
pub use serial::{list_ports, open_port, PortInfo, SerialTransport};
pub use transport::Transport;
pub use variables::Variable;

/// First byte of every addressed frame, also used by the device for baud rate detection
pub const SYNC_BYTE: u8 = 0xAA;

/// Factory default device number of a Simple Motor Controller
pub const DEFAULT_DEVICE_NUMBER: u8 = 0x0D;

/// Default baud rate for controller communication
pub const DEFAULT_BAUD_RATE: u32 = 115200;

/// Default timeout for responses in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Number of framing bytes (sync byte + device number) preceding the payload
pub const FRAME_HEADER_LEN: usize = 2;

/// Highest meaningful forward/reverse speed
pub const MAX_SPEED: u16 = 3200;

/// Highest brake amount the device accepts; larger values cause a serial format error
pub const MAX_BRAKE_AMOUNT: u8 = 32;

/// Default brake amount used by the demo and callers without a preference
pub const DEFAULT_BRAKE_AMOUNT: u8 = 1;

/// Logical frame index of the variable ID in a Get Variable command
pub const VARIABLE_ID_BYTE_INDEX: usize = 3;

/// Logical frame index of the low speed byte in motor forward/reverse commands
pub const SPEED_LOW_BYTE_INDEX: usize = 3;

/// Logical frame index of the high speed byte in motor forward/reverse commands
pub const SPEED_HIGH_BYTE_INDEX: usize = 4;

/// Logical frame index of the brake amount in a Motor Brake command
pub const BRAKE_AMOUNT_BYTE_INDEX: usize = 3;
