//! Device variables
//!
//! Readable 16-bit registers exposed through the Get Variable command.
//! IDs between 41 and 127 (other than 127 itself) are rejected by the device
//! with a serial format error and produce no response.

use serde::{Deserialize, Serialize};

use super::ProtocolError;

/// Named device variables and their numeric IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Variable {
    // Status flag registers
    /// Currently active errors that stop the motor
    ErrorStatus = 0,
    /// Errors that have occurred since this variable was last cleared
    ErrorsOccurred = 1,
    /// Serial errors that have occurred since this variable was last cleared
    SerialErrorsOccurred = 2,
    /// Conditions currently limiting the motor controller
    LimitStatus = 3,
    /// Flags describing the source of the last reset
    ResetFlags = 127,

    // RC channel inputs
    /// RC1 pulse width in units of 0.25 us, ignoring limits
    Rc1UnlimitedRawValue = 4,
    /// RC1 pulse width in units of 0.25 us
    Rc1RawValue = 5,
    /// RC1 input scaled to -3200..3200
    Rc1ScaledValue = 6,
    /// RC2 pulse width in units of 0.25 us, ignoring limits
    Rc2UnlimitedRawValue = 8,
    /// RC2 pulse width in units of 0.25 us
    Rc2RawValue = 9,
    /// RC2 input scaled to -3200..3200
    Rc2ScaledValue = 10,

    // Analog channel inputs
    /// AN1 12-bit ADC reading, ignoring limits
    An1UnlimitedRawValue = 12,
    /// AN1 12-bit ADC reading
    An1RawValue = 13,
    /// AN1 input scaled to -3200..3200
    An1ScaledValue = 14,
    /// AN2 12-bit ADC reading, ignoring limits
    An2UnlimitedRawValue = 16,
    /// AN2 12-bit ADC reading
    An2RawValue = 17,
    /// AN2 input scaled to -3200..3200
    An2ScaledValue = 18,

    // Diagnostic variables
    /// Motor target speed (-3200..3200)
    TargetSpeed = 20,
    /// Current motor speed (-3200..3200)
    Speed = 21,
    /// Current brake amount (0..32, or 0xFF when not stopped)
    BrakeAmount = 22,
    /// Measured input voltage in millivolts
    InputVoltage = 23,
    /// Board temperature in tenths of a degree Celsius
    Temperature = 24,
    /// RC period in units of 0.1 ms
    RcPeriod = 26,
    /// Raw baud rate register value
    BaudRateRegister = 27,
    /// Low 16 bits of the uptime in milliseconds
    SystemTimeLow = 28,
    /// High 16 bits of the uptime in milliseconds
    SystemTimeHigh = 29,

    // Temporary motor limits
    /// Forward maximum speed
    MaxSpeedForward = 30,
    /// Forward maximum acceleration
    MaxAccelerationForward = 31,
    /// Forward maximum deceleration
    MaxDecelerationForward = 32,
    /// Forward brake duration
    BrakeDurationForward = 33,
    /// Reverse maximum speed
    MaxSpeedReverse = 36,
    /// Reverse maximum acceleration
    MaxAccelerationReverse = 37,
    /// Reverse maximum deceleration
    MaxDecelerationReverse = 38,
    /// Reverse brake duration
    BrakeDurationReverse = 39,
}

impl Variable {
    /// Every variable known to the registry, in ID order
    pub const ALL: [Variable; 34] = [
        Variable::ErrorStatus,
        Variable::ErrorsOccurred,
        Variable::SerialErrorsOccurred,
        Variable::LimitStatus,
        Variable::Rc1UnlimitedRawValue,
        Variable::Rc1RawValue,
        Variable::Rc1ScaledValue,
        Variable::Rc2UnlimitedRawValue,
        Variable::Rc2RawValue,
        Variable::Rc2ScaledValue,
        Variable::An1UnlimitedRawValue,
        Variable::An1RawValue,
        Variable::An1ScaledValue,
        Variable::An2UnlimitedRawValue,
        Variable::An2RawValue,
        Variable::An2ScaledValue,
        Variable::TargetSpeed,
        Variable::Speed,
        Variable::BrakeAmount,
        Variable::InputVoltage,
        Variable::Temperature,
        Variable::RcPeriod,
        Variable::BaudRateRegister,
        Variable::SystemTimeLow,
        Variable::SystemTimeHigh,
        Variable::MaxSpeedForward,
        Variable::MaxAccelerationForward,
        Variable::MaxDecelerationForward,
        Variable::BrakeDurationForward,
        Variable::MaxSpeedReverse,
        Variable::MaxAccelerationReverse,
        Variable::MaxDecelerationReverse,
        Variable::BrakeDurationReverse,
        Variable::ResetFlags,
    ];

    /// Get the numeric variable ID sent in the Get Variable payload
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Get the register name as documented by the device
    pub fn name(self) -> &'static str {
        match self {
            Variable::ErrorStatus => "ERROR_STATUS",
            Variable::ErrorsOccurred => "ERRORS_OCCURRED",
            Variable::SerialErrorsOccurred => "SERIAL_ERRORS_OCCURRED",
            Variable::LimitStatus => "LIMIT_STATUS",
            Variable::ResetFlags => "RESET_FLAGS",
            Variable::Rc1UnlimitedRawValue => "RC1_UNLIMITED_RAW_VALUE",
            Variable::Rc1RawValue => "RC1_RAW_VALUE",
            Variable::Rc1ScaledValue => "RC1_SCALED_VALUE",
            Variable::Rc2UnlimitedRawValue => "RC2_UNLIMITED_RAW_VALUE",
            Variable::Rc2RawValue => "RC2_RAW_VALUE",
            Variable::Rc2ScaledValue => "RC2_SCALED_VALUE",
            Variable::An1UnlimitedRawValue => "AN1_UNLIMITED_RAW_VALUE",
            Variable::An1RawValue => "AN1_RAW_VALUE",
            Variable::An1ScaledValue => "AN1_SCALED_VALUE",
            Variable::An2UnlimitedRawValue => "AN2_UNLIMITED_RAW_VALUE",
            Variable::An2RawValue => "AN2_RAW_VALUE",
            Variable::An2ScaledValue => "AN2_SCALED_VALUE",
            Variable::TargetSpeed => "TARGET_SPEED",
            Variable::Speed => "SPEED",
            Variable::BrakeAmount => "BRAKE_AMOUNT",
            Variable::InputVoltage => "INPUT_VOLTAGE",
            Variable::Temperature => "TEMPERATURE",
            Variable::RcPeriod => "RC_PERIOD",
            Variable::BaudRateRegister => "BAUD_RATE_REGISTER",
            Variable::SystemTimeLow => "SYSTEM_TIME_LOW",
            Variable::SystemTimeHigh => "SYSTEM_TIME_HIGH",
            Variable::MaxSpeedForward => "MAX_SPEED_FORWARD",
            Variable::MaxAccelerationForward => "MAX_ACCELERATION_FORWARD",
            Variable::MaxDecelerationForward => "MAX_DECELERATION_FORWARD",
            Variable::BrakeDurationForward => "BRAKE_DURATION_FORWARD",
            Variable::MaxSpeedReverse => "MAX_SPEED_REVERSE",
            Variable::MaxAccelerationReverse => "MAX_ACCELERATION_REVERSE",
            Variable::MaxDecelerationReverse => "MAX_DECELERATION_REVERSE",
            Variable::BrakeDurationReverse => "BRAKE_DURATION_REVERSE",
        }
    }

    /// Check if the device reports this variable as a signed 16-bit value
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Variable::Rc1ScaledValue
                | Variable::Rc2ScaledValue
                | Variable::An1ScaledValue
                | Variable::An2ScaledValue
                | Variable::TargetSpeed
                | Variable::Speed
        )
    }

    /// Look up a variable by its numeric ID
    pub fn from_id(id: u8) -> Result<Self, ProtocolError> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.id() == id)
            .ok_or(ProtocolError::UnknownVariable(id))
    }

    /// Look up a variable by its register name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.name().eq_ignore_ascii_case(name))
    }

    /// Interpret a raw register value according to the variable's signedness
    pub fn interpret(self, raw: u16) -> i32 {
        if self.is_signed() {
            raw as i16 as i32
        } else {
            raw as i32
        }
    }
}

impl TryFrom<u8> for Variable {
    type Error = ProtocolError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Variable::from_id(id)
    }
}

impl From<Variable> for u8 {
    fn from(variable: Variable) -> u8 {
        variable.id()
    }
}
