//! Command Builder
//!
//! Specializes catalog payload templates with runtime parameters.
//!
//! Byte positions are given as logical frame indices: index 0 is the sync byte,
//! index 1 the device number and index 2 the opcode, so the first data byte of any
//! command is logical index 3. Every builder starts from a fresh copy of the template.

use super::{
    CommandKind, Frame, ProtocolError, Variable, BRAKE_AMOUNT_BYTE_INDEX, FRAME_HEADER_LEN,
    SPEED_HIGH_BYTE_INDEX, SPEED_LOW_BYTE_INDEX, VARIABLE_ID_BYTE_INDEX,
};

/// Write `value` at a logical frame index within `payload`.
///
/// Fails with [`ProtocolError::OutOfRange`] when `value` does not fit in a byte or the
/// index falls outside the payload; the payload is left untouched in that case.
pub fn set_payload_byte(
    payload: &mut [u8],
    logical_index: usize,
    value: u16,
) -> Result<(), ProtocolError> {
    let len = payload.len();
    let out_of_range = || ProtocolError::OutOfRange {
        index: logical_index,
        value,
        len,
    };

    let byte = u8::try_from(value).map_err(|_| out_of_range())?;
    let slot = logical_index
        .checked_sub(FRAME_HEADER_LEN)
        .and_then(|i| payload.get_mut(i))
        .ok_or_else(out_of_range)?;
    *slot = byte;
    Ok(())
}

/// Split a motor speed into its two data bytes.
///
/// The first holds the low five bits (`speed & 0x1F`), the second the remaining
/// high bits (`speed >> 5`). No clamping is done here; values whose high part does
/// not fit a byte are rejected later by [`set_payload_byte`].
pub fn encode_speed(speed: u16) -> (u16, u16) {
    (speed & 0x1F, speed >> 5)
}

/// Builds a specialized command from a catalog template
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    kind: CommandKind,
    payload: Vec<u8>,
}

impl CommandBuilder {
    /// Start from a fresh copy of the command's payload template
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            payload: kind.descriptor().payload.to_vec(),
        }
    }

    /// Set a single byte at a logical frame index
    pub fn byte(mut self, logical_index: usize, value: u16) -> Result<Self, ProtocolError> {
        set_payload_byte(&mut self.payload, logical_index, value)?;
        Ok(self)
    }

    /// Fill in the two speed bytes of a motor forward/reverse command
    pub fn speed(self, speed: u16) -> Result<Self, ProtocolError> {
        let (low, high) = encode_speed(speed);
        self.byte(SPEED_LOW_BYTE_INDEX, low)?
            .byte(SPEED_HIGH_BYTE_INDEX, high)
    }

    /// Fill in the brake amount of a motor brake command
    pub fn brake_amount(self, amount: u8) -> Result<Self, ProtocolError> {
        self.byte(BRAKE_AMOUNT_BYTE_INDEX, amount as u16)
    }

    /// Fill in the variable ID of a get variable command
    pub fn variable(self, variable: Variable) -> Result<Self, ProtocolError> {
        self.byte(VARIABLE_ID_BYTE_INDEX, variable.id() as u16)
    }

    /// Command being built
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Payload as specialized so far
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Address the command to a device
    pub fn build(self, device_number: u8) -> Frame {
        Frame::new(device_number, self.kind, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_speed_split() {
        assert_eq!(encode_speed(0), (0, 0));
        assert_eq!(encode_speed(300), (12, 9));
        assert_eq!(encode_speed(3200), (0, 100));
        assert_eq!(encode_speed(0x1F), (0x1F, 0));
    }

    #[test]
    fn test_encode_speed_recombines() {
        for speed in 0..=3200u16 {
            let (low, high) = encode_speed(speed);
            assert!(low <= 0x1F);
            assert_eq!(low | (high << 5), speed);
        }
    }

    #[test]
    fn test_set_payload_byte_writes_value() {
        let mut payload = vec![0x05, 0x00, 0x00];
        for index in [3usize, 4] {
            for value in 0..=255u16 {
                set_payload_byte(&mut payload, index, value).unwrap();
                assert_eq!(payload[index - 2], value as u8);
            }
        }
        assert_eq!(payload[0], 0x05);
    }

    #[test]
    fn test_set_payload_byte_rejects_large_value() {
        let mut payload = vec![0x12, 0x07];
        let err = set_payload_byte(&mut payload, 3, 256).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::OutOfRange {
                index: 3,
                value: 256,
                len: 2
            }
        ));
        assert_eq!(payload, vec![0x12, 0x07]);
    }

    #[test]
    fn test_set_payload_byte_rejects_bad_index() {
        let mut payload = vec![0x21, 0x00];
        assert!(set_payload_byte(&mut payload, 4, 1).is_err());
        assert!(set_payload_byte(&mut payload, 1, 1).is_err());
        assert!(set_payload_byte(&mut payload, 0, 1).is_err());
        assert_eq!(payload, vec![0x21, 0x00]);
    }

    #[test]
    fn test_builder_does_not_touch_template() {
        let cmd = CommandBuilder::new(CommandKind::MotorForward)
            .speed(3200)
            .unwrap();
        assert_eq!(cmd.payload(), &[0x05, 0x00, 100]);
        assert_eq!(
            CommandKind::MotorForward.descriptor().payload,
            &[0x05, 0x00, 0x00]
        );
    }

    #[test]
    fn test_builder_speed_too_large() {
        // 8192 >> 5 == 256, which no longer fits the high byte
        let result = CommandBuilder::new(CommandKind::MotorReverse).speed(8192);
        assert!(matches!(result, Err(ProtocolError::OutOfRange { .. })));
    }

    #[test]
    fn test_builder_brake_and_variable() {
        let brake = CommandBuilder::new(CommandKind::MotorBrake)
            .brake_amount(10)
            .unwrap();
        assert_eq!(brake.payload(), &[0x12, 10]);

        let var = CommandBuilder::new(CommandKind::GetVariable)
            .variable(Variable::Temperature)
            .unwrap();
        assert_eq!(var.payload(), &[0x21, 24]);
    }

    #[test]
    fn test_builder_speed_on_short_payload_fails() {
        let result = CommandBuilder::new(CommandKind::MotorBrake).speed(100);
        assert!(result.is_err());
    }
}
