//! Response normalization
//!
//! Turns raw response bytes into typed values. Multi-byte values are little-endian.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CommandKind, ProtocolError};

/// Product ID and firmware version reported by Get Firmware Version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareInfo {
    /// Product ID (unique per controller model)
    pub product_id: u16,
    /// Major version byte, BCD
    pub major: u8,
    /// Minor version byte, BCD
    pub minor: u8,
}

impl FirmwareInfo {
    /// Product ID as a 4-digit lowercase hex string, e.g. `0x1234`
    pub fn product_id_hex(&self) -> String {
        format!("0x{:04x}", self.product_id)
    }

    /// Firmware version as written in hex, e.g. `1.15` for major 0x01 / minor 0x15
    pub fn firmware_version(&self) -> String {
        format!("{:x}.{:02x}", self.major, self.minor)
    }
}

impl fmt::Display for FirmwareInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "product {} firmware {}",
            self.product_id_hex(),
            self.firmware_version()
        )
    }
}

/// A normalized command response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Command has no serial response
    None,
    /// Reply to Get Firmware Version
    FirmwareVersion(FirmwareInfo),
    /// Raw 16-bit value from Get Variable
    Variable(u16),
}

impl Response {
    /// Normalize `raw` according to the response layout of `kind`
    pub fn normalize(kind: CommandKind, raw: &[u8]) -> Result<Self, ProtocolError> {
        match kind {
            CommandKind::GetFirmwareVersion => firmware_version(raw).map(Response::FirmwareVersion),
            CommandKind::GetVariable => variable_value(raw).map(Response::Variable),
            _ => Ok(Response::None),
        }
    }
}

fn check_len(kind: CommandKind, raw: &[u8]) -> Result<(), ProtocolError> {
    if raw.len() != kind.response_len() {
        return Err(ProtocolError::InvalidResponse {
            command: kind,
            expected: kind.response_len(),
            actual: raw.len(),
        });
    }
    Ok(())
}

/// Decode a 4-byte firmware version response
pub fn firmware_version(raw: &[u8]) -> Result<FirmwareInfo, ProtocolError> {
    check_len(CommandKind::GetFirmwareVersion, raw)?;
    Ok(FirmwareInfo {
        product_id: LittleEndian::read_u16(&raw[0..2]),
        minor: raw[2],
        major: raw[3],
    })
}

/// Decode a 2-byte variable response as an unsigned value
pub fn variable_value(raw: &[u8]) -> Result<u16, ProtocolError> {
    check_len(CommandKind::GetVariable, raw)?;
    Ok(LittleEndian::read_u16(raw))
}

/// Decode an input voltage response, in millivolts
pub fn input_voltage(raw: &[u8]) -> Result<u32, ProtocolError> {
    variable_value(raw).map(u32::from)
}

/// Decode a temperature response, in degrees Celsius
pub fn temperature(raw: &[u8]) -> Result<f64, ProtocolError> {
    variable_value(raw).map(|tenths| tenths as f64 / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firmware_version() {
        let info = firmware_version(&[0x34, 0x12, 0x15, 0x01]).unwrap();
        assert_eq!(info.product_id_hex(), "0x1234");
        assert_eq!(info.firmware_version(), "1.15");
        assert_eq!(info.to_string(), "product 0x1234 firmware 1.15");
    }

    #[test]
    fn test_firmware_version_pads_minor() {
        let info = firmware_version(&[0xA1, 0x00, 0x04, 0x10]).unwrap();
        assert_eq!(info.product_id_hex(), "0x00a1");
        assert_eq!(info.firmware_version(), "10.04");
    }

    #[test]
    fn test_voltage() {
        assert_eq!(input_voltage(&[0xE8, 0x03]).unwrap(), 1000);
        assert_eq!(input_voltage(&[0xFF, 0xFF]).unwrap(), 65535);
    }

    #[test]
    fn test_temperature() {
        assert_eq!(temperature(&[0xFA, 0x00]).unwrap(), 25.0);
        assert_eq!(temperature(&[0x00, 0x00]).unwrap(), 0.0);
    }

    #[test]
    fn test_short_response_rejected() {
        let err = firmware_version(&[0x34, 0x12]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidResponse {
                command: CommandKind::GetFirmwareVersion,
                expected: 4,
                actual: 2
            }
        ));
        assert!(temperature(&[0xFA]).is_err());
    }

    #[test]
    fn test_normalize_dispatch() {
        assert_eq!(
            Response::normalize(CommandKind::GetVariable, &[0xE8, 0x03]).unwrap(),
            Response::Variable(1000)
        );
        assert_eq!(
            Response::normalize(CommandKind::StopMotor, &[]).unwrap(),
            Response::None
        );
        assert!(matches!(
            CommandKind::GetFirmwareVersion.normalize(&[1, 0, 2, 3]),
            Ok(Response::FirmwareVersion(_))
        ));
    }
}
