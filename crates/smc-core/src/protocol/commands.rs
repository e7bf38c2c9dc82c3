//! Protocol commands
//!
//! Defines the commands supported by the Simple Motor Controller in Pololu protocol mode.
//!
//! Each [`CommandKind`] maps to an immutable [`CommandDescriptor`] holding the payload
//! template (opcode plus placeholder data bytes, without the two framing bytes) and the
//! number of response bytes the device sends back. Templates are never mutated: a
//! [`Frame`](super::Frame) carries a per-call copy that may be specialized before it is sent.

use serde::{Deserialize, Serialize};

use super::{response::Response, ProtocolError};

/// Commands known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Read product ID and firmware version (0x42)
    GetFirmwareVersion,

    /// Clear the safe-start interlock (0x03)
    ExitSafeStart,

    /// Set forward target speed (0x05)
    MotorForward,

    /// Set reverse target speed (0x06)
    MotorReverse,

    /// Brake by a given amount (0x12)
    MotorBrake,

    /// Stop the motor and re-arm safe-start (0x60)
    StopMotor,

    /// Read a 16-bit device variable (0x21)
    GetVariable,
}

/// Immutable command template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// Human-readable command name
    pub name: &'static str,
    /// Device documentation for the command
    pub description: &'static str,
    /// Opcode and data byte template, excluding sync byte and device number
    pub payload: &'static [u8],
    /// Number of response bytes (0 if the command has no serial response)
    pub response_len: usize,
}

const GET_FIRMWARE_VERSION: CommandDescriptor = CommandDescriptor {
    name: "Get Firmware Version",
    description: "Reads the product ID and firmware version. The first two response bytes \
        are the low and high bytes of the product ID, the last two are the firmware minor and \
        major version numbers in binary-coded decimal.",
    payload: &[0x42],
    response_len: 4,
};

const EXIT_SAFE_START: CommandDescriptor = CommandDescriptor {
    name: "Exit Safe-Start (Serial/USB input mode only)",
    description: "Required before the motor can run when safe-start protection is enabled. \
        Must be issued after power up, after any reset and after any error stops the motor. \
        This command has no serial response.",
    payload: &[0x03],
    response_len: 0,
};

const MOTOR_FORWARD: CommandDescriptor = CommandDescriptor {
    name: "Motor Forward (Serial/USB input mode only)",
    description: "Sets the full-resolution forward target speed (0 to 3200). The first data \
        byte holds the low five bits of the speed, the second holds the high seven bits. \
        This command has no serial response.",
    payload: &[0x05, 0x00, 0x00],
    response_len: 0,
};

const MOTOR_REVERSE: CommandDescriptor = CommandDescriptor {
    name: "Motor Reverse (Serial/USB input mode only)",
    description: "Sets the full-resolution reverse target speed (0 to 3200), encoded the same \
        way as Motor Forward. This command has no serial response.",
    payload: &[0x06, 0x00, 0x00],
    response_len: 0,
};

const MOTOR_BRAKE: CommandDescriptor = CommandDescriptor {
    name: "Motor Brake (Serial/USB input mode only)",
    description: "Brakes immediately by the given amount, ignoring deceleration limits. \
        0 is maximum coasting, 32 is full braking; larger values cause a serial format error. \
        This command has no serial response.",
    payload: &[0x12, 0x00],
    response_len: 0,
};

const STOP_MOTOR: CommandDescriptor = CommandDescriptor {
    name: "Stop Motor (any input mode)",
    description: "Sets the target speed to zero respecting deceleration limits and re-arms \
        safe-start, so Exit Safe-Start is needed before the motor moves again. \
        This command has no serial response.",
    payload: &[0x60],
    response_len: 0,
};

const GET_VARIABLE: CommandDescriptor = CommandDescriptor {
    name: "Get Variable (any input mode)",
    description: "Reads a 16-bit variable, sent low byte first. Signed variables must be \
        reinterpreted as 16-bit two's complement. Variable IDs between 41 and 127 cause a \
        serial format error and no response is transmitted.",
    payload: &[0x21, 0x00],
    response_len: 2,
};

impl CommandKind {
    /// Every command in the catalog
    pub const ALL: [CommandKind; 7] = [
        CommandKind::GetFirmwareVersion,
        CommandKind::ExitSafeStart,
        CommandKind::MotorForward,
        CommandKind::MotorReverse,
        CommandKind::MotorBrake,
        CommandKind::StopMotor,
        CommandKind::GetVariable,
    ];

    /// Get the immutable descriptor for this command
    pub fn descriptor(&self) -> &'static CommandDescriptor {
        match self {
            CommandKind::GetFirmwareVersion => &GET_FIRMWARE_VERSION,
            CommandKind::ExitSafeStart => &EXIT_SAFE_START,
            CommandKind::MotorForward => &MOTOR_FORWARD,
            CommandKind::MotorReverse => &MOTOR_REVERSE,
            CommandKind::MotorBrake => &MOTOR_BRAKE,
            CommandKind::StopMotor => &STOP_MOTOR,
            CommandKind::GetVariable => &GET_VARIABLE,
        }
    }

    /// Get the opcode (first payload byte)
    pub fn opcode(&self) -> u8 {
        self.descriptor().payload[0]
    }

    /// Number of response bytes the device sends back
    pub fn response_len(&self) -> usize {
        self.descriptor().response_len
    }

    /// Check if this command expects a response
    pub fn expects_response(&self) -> bool {
        self.response_len() > 0
    }

    /// Normalize raw response bytes for this command
    pub fn normalize(&self, raw: &[u8]) -> Result<Response, ProtocolError> {
        Response::normalize(*self, raw)
    }
}
