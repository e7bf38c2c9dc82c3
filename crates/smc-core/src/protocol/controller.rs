//! Controller session
//!
//! Binds a transport to one device number and exposes the high-level motor
//! controller operations. Each call performs at most one write and one read;
//! there is no retry, and no overlap between exchanges.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{
    response, CommandBuilder, CommandKind, FirmwareInfo, ProtocolError, Response, SerialTransport,
    Transport, Variable, DEFAULT_BAUD_RATE, DEFAULT_DEVICE_NUMBER, DEFAULT_TIMEOUT_MS,
    MAX_BRAKE_AMOUNT, MAX_SPEED,
};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerState {
    /// No transport open
    Disconnected,
    /// Transport open and device answered the firmware query
    Connected,
}

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Serial port name
    pub port_name: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Device number the commands are addressed to
    pub device_number: u8,
    /// Response timeout in milliseconds.
    ///
    /// Reads never block indefinitely; 0 is rejected by [`ControllerConfig::validate`].
    pub read_timeout_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            device_number: DEFAULT_DEVICE_NUMBER,
            read_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ControllerConfig {
    /// Default configuration for the given port
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            ..Default::default()
        }
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ProtocolError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings can be used to open a serial session
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.baud_rate == 0 {
            return Err(ProtocolError::Config("baud_rate must be non-zero".to_string()));
        }
        if self.read_timeout_ms == 0 {
            return Err(ProtocolError::Config(
                "read_timeout_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a JSON configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProtocolError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Response timeout as a duration
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Result of a single send: whether the frame went out, and the raw response if one was read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// Frame was written to the transport
    pub sent: bool,
    /// Unnormalized response bytes, when the command has a response
    pub response: Option<Vec<u8>>,
    /// Transport error message when the frame could not be written
    pub write_error: Option<String>,
}

/// Session with one motor controller on a serial line
pub struct Controller {
    /// Transport handle, present only while connected
    transport: Option<Box<dyn Transport>>,
    /// Current session state
    state: ControllerState,
    /// Controller configuration
    config: ControllerConfig,
    /// Product ID and firmware version read during connect
    device_info: Option<FirmwareInfo>,
}

impl Controller {
    /// Create a new session (not yet connected)
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            transport: None,
            state: ControllerState::Disconnected,
            config,
            device_info: None,
        }
    }

    /// Open `port_name` and connect to the controller at `device_number`
    pub fn open(port_name: &str, baud_rate: u32, device_number: u8) -> Result<Self, ProtocolError> {
        let mut controller = Self::new(ControllerConfig {
            port_name: port_name.to_string(),
            baud_rate,
            device_number,
            ..Default::default()
        });
        controller.connect()?;
        Ok(controller)
    }

    /// Connect over the configured serial port
    pub fn connect(&mut self) -> Result<(), ProtocolError> {
        self.connect_with(|config| {
            config.validate()?;
            let transport =
                SerialTransport::open(&config.port_name, config.baud_rate, config.read_timeout())?;
            Ok(Box::new(transport) as Box<dyn Transport>)
        })
    }

    /// Connect over an already open transport
    pub fn connect_transport<T>(&mut self, transport: T) -> Result<(), ProtocolError>
    where
        T: Transport + 'static,
    {
        self.connect_with(move |_| Ok(Box::new(transport) as Box<dyn Transport>))
    }

    /// Connect using `open_transport` to create the transport.
    ///
    /// Any open failure is reported as [`ProtocolError::ConnectionFailed`]. Once the
    /// transport is open the firmware version is queried; if that fails the transport is
    /// closed again, the session stays disconnected and the cause is reported as
    /// [`ProtocolError::ConnectionFailed`] too.
    pub fn connect_with<F>(&mut self, open_transport: F) -> Result<(), ProtocolError>
    where
        F: FnOnce(&ControllerConfig) -> Result<Box<dyn Transport>, ProtocolError>,
    {
        if self.state == ControllerState::Connected {
            return Err(ProtocolError::AlreadyConnected);
        }

        let transport = open_transport(&self.config).map_err(|e| match e {
            ProtocolError::ConnectionFailed(reason) => ProtocolError::ConnectionFailed(reason),
            other => ProtocolError::ConnectionFailed(other.to_string()),
        })?;
        self.transport = Some(transport);
        self.state = ControllerState::Connected;

        match self.get_firmware_version() {
            Ok(info) => {
                info!(
                    port = %self.config.port_name,
                    device = %self.device_number_hex(),
                    "connected to {}",
                    info
                );
                self.device_info = Some(info);
                Ok(())
            }
            Err(e) => {
                warn!("firmware query during connect failed: {}", e);
                self.close_transport();
                Err(ProtocolError::ConnectionFailed(format!(
                    "no firmware reply from device {}: {}",
                    self.device_number_hex(),
                    e
                )))
            }
        }
    }

    /// Stop the motor if possible, then close the transport.
    ///
    /// Does nothing when already disconnected.
    pub fn disconnect(&mut self) {
        if self.state != ControllerState::Connected {
            return;
        }

        if let Err(e) = self.stop_motor() {
            warn!("failed to stop motor before disconnect: {}", e);
        }
        self.close_transport();
        info!(port = %self.config.port_name, "disconnected");
    }

    fn close_transport(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close() {
                warn!("failed to close transport: {}", e);
            }
        }
        self.device_info = None;
        self.state = ControllerState::Disconnected;
    }

    fn ensure_connected(&self) -> Result<(), ProtocolError> {
        if self.state != ControllerState::Connected || self.transport.is_none() {
            return Err(ProtocolError::NotConnected);
        }
        Ok(())
    }

    /// Get current session state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Check if the session is connected
    pub fn is_connected(&self) -> bool {
        self.state == ControllerState::Connected
    }

    /// Get the session configuration
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Serial port name
    pub fn port_name(&self) -> &str {
        &self.config.port_name
    }

    /// Baud rate
    pub fn baud_rate(&self) -> u32 {
        self.config.baud_rate
    }

    /// Device number commands are addressed to
    pub fn device_number(&self) -> u8 {
        self.config.device_number
    }

    /// Device number as a hex string, e.g. `0xd`
    pub fn device_number_hex(&self) -> String {
        format!("{:#x}", self.config.device_number)
    }

    /// Product ID and firmware version read during connect
    pub fn device_info(&self) -> Option<&FirmwareInfo> {
        self.device_info.as_ref()
    }

    /// Send a specialized command and read its response, if it has one.
    ///
    /// A failed write is logged and reported as `sent == false` rather than an error.
    /// A failed or short read after a successful write is an error.
    pub fn send(&mut self, command: CommandBuilder) -> Result<SendOutcome, ProtocolError> {
        self.ensure_connected()?;

        let frame = command.build(self.config.device_number);
        let bytes = frame.to_bytes();
        let transport = self.transport.as_mut().ok_or(ProtocolError::NotConnected)?;

        debug!("sending {:?}: {:02x?}", frame.kind, bytes);
        if let Err(e) = transport.write(&bytes) {
            warn!("failed to send {:?}: {}", frame.kind, e);
            return Ok(SendOutcome {
                sent: false,
                response: None,
                write_error: Some(e.to_string()),
            });
        }

        let expected = frame.response_len();
        if expected == 0 {
            return Ok(SendOutcome {
                sent: true,
                response: None,
                write_error: None,
            });
        }

        let response = transport.read(expected)?;
        if response.len() != expected {
            return Err(ProtocolError::InvalidResponse {
                command: frame.kind,
                expected,
                actual: response.len(),
            });
        }
        debug!("response to {:?}: {:02x?}", frame.kind, response);

        Ok(SendOutcome {
            sent: true,
            response: Some(response),
            write_error: None,
        })
    }

    /// Send the unmodified catalog template for `kind`
    pub fn send_command(&mut self, kind: CommandKind) -> Result<SendOutcome, ProtocolError> {
        self.send(CommandBuilder::new(kind))
    }

    /// Send and require that the frame actually went out
    fn exchange(&mut self, command: CommandBuilder) -> Result<Option<Vec<u8>>, ProtocolError> {
        let kind = command.kind();
        let outcome = self.send(command)?;
        if !outcome.sent {
            return Err(ProtocolError::TransportWriteFailed(format!(
                "{} was not sent: {}",
                kind.descriptor().name,
                outcome.write_error.unwrap_or_default()
            )));
        }
        Ok(outcome.response)
    }

    fn exchange_with_response(
        &mut self,
        command: CommandBuilder,
    ) -> Result<Vec<u8>, ProtocolError> {
        let kind = command.kind();
        self.exchange(command)?.ok_or(ProtocolError::InvalidResponse {
            command: kind,
            expected: kind.response_len(),
            actual: 0,
        })
    }

    /// Exchange and normalize the reply according to the command kind
    fn query(&mut self, command: CommandBuilder) -> Result<Response, ProtocolError> {
        let kind = command.kind();
        let raw = self.exchange_with_response(command)?;
        kind.normalize(&raw)
    }

    fn unexpected_response(kind: CommandKind, response: Response) -> ProtocolError {
        warn!("unexpected normalized response to {:?}: {:?}", kind, response);
        ProtocolError::InvalidResponse {
            command: kind,
            expected: kind.response_len(),
            actual: 0,
        }
    }

    /// Read product ID and firmware version
    pub fn get_firmware_version(&mut self) -> Result<FirmwareInfo, ProtocolError> {
        self.ensure_connected()?;
        match self.query(CommandBuilder::new(CommandKind::GetFirmwareVersion))? {
            Response::FirmwareVersion(info) => Ok(info),
            other => Err(Self::unexpected_response(CommandKind::GetFirmwareVersion, other)),
        }
    }

    /// Clear the safe-start interlock so motion commands take effect.
    ///
    /// The device needs this once per power-up and again after any stop or error.
    pub fn exit_safe_start(&mut self) -> Result<(), ProtocolError> {
        self.ensure_connected()?;
        self.exchange(CommandBuilder::new(CommandKind::ExitSafeStart))?;
        Ok(())
    }

    /// Drive forward at `speed` (0..=3200)
    pub fn motor_forward(&mut self, speed: u16) -> Result<(), ProtocolError> {
        self.drive(CommandKind::MotorForward, speed)
    }

    /// Drive in reverse at `speed` (0..=3200)
    pub fn motor_reverse(&mut self, speed: u16) -> Result<(), ProtocolError> {
        self.drive(CommandKind::MotorReverse, speed)
    }

    fn drive(&mut self, kind: CommandKind, speed: u16) -> Result<(), ProtocolError> {
        self.ensure_connected()?;
        if speed > MAX_SPEED {
            warn!("speed {} exceeds the maximum of {}", speed, MAX_SPEED);
        }
        let command = CommandBuilder::new(kind).speed(speed)?;
        self.exchange(command).map(|_| ())
    }

    /// Brake by `brake_amount` (0 = coast, 32 = full brake).
    ///
    /// Amounts above 32 are sent as-is; the device answers them with a serial format error.
    pub fn motor_brake(&mut self, brake_amount: u8) -> Result<(), ProtocolError> {
        self.ensure_connected()?;
        if brake_amount > MAX_BRAKE_AMOUNT {
            warn!(
                "brake amount {} exceeds the maximum of {}",
                brake_amount, MAX_BRAKE_AMOUNT
            );
        }
        let command = CommandBuilder::new(CommandKind::MotorBrake).brake_amount(brake_amount)?;
        self.exchange(command).map(|_| ())
    }

    /// Stop the motor; safe-start must be exited again before the next motion command
    pub fn stop_motor(&mut self) -> Result<(), ProtocolError> {
        self.ensure_connected()?;
        self.exchange(CommandBuilder::new(CommandKind::StopMotor))?;
        Ok(())
    }

    /// Read the raw 16-bit value of a device variable
    pub fn get_variable_raw(&mut self, variable: Variable) -> Result<u16, ProtocolError> {
        self.ensure_connected()?;
        let command = CommandBuilder::new(CommandKind::GetVariable).variable(variable)?;
        match self.query(command)? {
            Response::Variable(raw) => Ok(raw),
            other => Err(Self::unexpected_response(CommandKind::GetVariable, other)),
        }
    }

    fn read_variable_bytes(&mut self, variable: Variable) -> Result<Vec<u8>, ProtocolError> {
        self.ensure_connected()?;
        let command = CommandBuilder::new(CommandKind::GetVariable).variable(variable)?;
        self.exchange_with_response(command)
    }

    /// Read a device variable, sign-extended when the device reports it as signed
    pub fn get_variable(&mut self, variable: Variable) -> Result<i32, ProtocolError> {
        self.get_variable_raw(variable)
            .map(|raw| variable.interpret(raw))
    }

    /// Read the input voltage in millivolts
    pub fn get_input_voltage(&mut self) -> Result<u32, ProtocolError> {
        let raw = self.read_variable_bytes(Variable::InputVoltage)?;
        response::input_voltage(&raw)
    }

    /// Read the board temperature near the motor driver, in degrees Celsius
    pub fn get_temperature(&mut self) -> Result<f64, ProtocolError> {
        let raw = self.read_variable_bytes(Variable::Temperature)?;
        response::temperature(&raw)
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_config_default() {
        let config = ControllerConfig::default();
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.device_number, 0x0D);
        assert_eq!(config.read_timeout(), Duration::from_millis(2000));
    }

    #[test]
    fn test_config_from_json_partial() {
        let config = ControllerConfig::from_json(r#"{"port_name": "COM7", "device_number": 14}"#)
            .unwrap();
        assert_eq!(config.port_name, "COM7");
        assert_eq!(config.device_number, 14);
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
    }

    #[test]
    fn test_config_from_bad_json() {
        assert!(matches!(
            ControllerConfig::from_json("{not json"),
            Err(ProtocolError::Config(_))
        ));
    }

    #[test]
    fn test_controller_state() {
        let controller = Controller::new(ControllerConfig::new("/dev/ttyACM0"));
        assert_eq!(controller.state(), ControllerState::Disconnected);
        assert!(controller.device_info().is_none());
        assert_eq!(controller.device_number_hex(), "0xd");
        assert_eq!(controller.port_name(), "/dev/ttyACM0");
    }

    #[test]
    fn test_operations_require_connection() {
        let mut controller = Controller::new(ControllerConfig::default());
        assert!(matches!(
            controller.get_firmware_version(),
            Err(ProtocolError::NotConnected)
        ));
        assert!(matches!(
            controller.motor_forward(100),
            Err(ProtocolError::NotConnected)
        ));
        assert!(matches!(
            controller.send_command(CommandKind::StopMotor),
            Err(ProtocolError::NotConnected)
        ));
    }

    #[test]
    fn test_connect_open_failure() {
        let mut controller = Controller::new(ControllerConfig::default());
        let result = controller.connect_with(|_| Err(ProtocolError::SerialError("busy".into())));
        assert!(matches!(result, Err(ProtocolError::ConnectionFailed(_))));
        assert_eq!(controller.state(), ControllerState::Disconnected);
    }
}
