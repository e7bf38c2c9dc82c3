//! Serial port handling
//!
//! Provides the serialport-backed [`Transport`] used to reach real controllers.
//! Ports are always configured 8N1 without flow control.

use serialport::{SerialPort, SerialPortInfo, SerialPortType};
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::{ProtocolError, Transport, DEFAULT_BAUD_RATE};

/// Information about an available serial port
#[derive(Debug, Clone)]
pub struct PortInfo {
    /// Port name (e.g., "/dev/ttyACM0" or "COM7")
    pub name: String,

    /// USB vendor ID (if USB device)
    pub vid: Option<u16>,

    /// USB product ID (if USB device)
    pub pid: Option<u16>,

    /// Product name (if available)
    pub product: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        match info.port_type {
            SerialPortType::UsbPort(usb) => Self {
                name: info.port_name,
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                product: usb.product,
            },
            _ => Self {
                name: info.port_name,
                vid: None,
                pid: None,
                product: None,
            },
        }
    }
}

/// List serial ports present on this host, sorted by name
pub fn list_ports() -> Vec<PortInfo> {
    let mut ports: Vec<PortInfo> = serialport::available_ports()
        .unwrap_or_default()
        .into_iter()
        .map(PortInfo::from)
        .collect();
    ports.sort_by(|a, b| a.name.cmp(&b.name));
    ports
}

/// Open a serial port configured 8N1 with the given read timeout
pub fn open_port(
    name: &str,
    baud_rate: Option<u32>,
    timeout: Duration,
) -> Result<Box<dyn SerialPort>, ProtocolError> {
    serialport::new(name, baud_rate.unwrap_or(DEFAULT_BAUD_RATE))
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .flow_control(serialport::FlowControl::None)
        .timeout(timeout)
        .open()
        .map_err(|e| ProtocolError::ConnectionFailed(format!("{}: {}", name, e)))
}

/// Time left of a read budget, or `None` once it is used up
fn remaining_budget(timeout: Duration, elapsed: Duration) -> Option<Duration> {
    timeout
        .checked_sub(elapsed)
        .filter(|remaining| !remaining.is_zero())
}

/// Serial line to one or more daisy-chained controllers
pub struct SerialTransport {
    port: Option<Box<dyn SerialPort>>,
    name: String,
    timeout: Duration,
}

impl SerialTransport {
    /// Open `name` at `baud_rate`; reads give up after `timeout`
    pub fn open(name: &str, baud_rate: u32, timeout: Duration) -> Result<Self, ProtocolError> {
        let port = open_port(name, Some(baud_rate), timeout)?;
        port.clear(serialport::ClearBuffer::All)
            .map_err(|e| ProtocolError::SerialError(e.to_string()))?;
        debug!(port = name, baud_rate, "serial port opened");

        Ok(Self {
            port: Some(port),
            name: name.to_string(),
            timeout,
        })
    }

    /// Port name this transport was opened on
    pub fn name(&self) -> &str {
        &self.name
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, ProtocolError> {
        self.port.as_mut().ok_or(ProtocolError::NotConnected)
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        let port = self.port()?;
        port.write_all(bytes)
            .and_then(|_| port.flush())
            .map_err(|e| ProtocolError::TransportWriteFailed(e.to_string()))
    }

    fn read(&mut self, n: usize) -> Result<Vec<u8>, ProtocolError> {
        let timeout = self.timeout;
        let port = self.port()?;
        let mut buf = vec![0u8; n];
        let mut offset = 0;
        let start = Instant::now();

        while offset < n {
            let remaining = remaining_budget(timeout, start.elapsed()).ok_or(
                ProtocolError::Timeout {
                    expected: n,
                    received: offset,
                },
            )?;
            port.set_timeout(remaining)
                .map_err(|e| ProtocolError::SerialError(e.to_string()))?;

            match port.read(&mut buf[offset..]) {
                Ok(0) => {
                    return Err(ProtocolError::TransportReadFailed(format!(
                        "end of stream after {} of {} bytes",
                        offset, n
                    )))
                }
                Ok(count) => {
                    trace!("read {} bytes: {:02x?}", count, &buf[offset..offset + count]);
                    offset += count;
                }
                Err(ref e) if e.kind() == ErrorKind::TimedOut => {
                    return Err(ProtocolError::Timeout {
                        expected: n,
                        received: offset,
                    })
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(ProtocolError::TransportReadFailed(e.to_string())),
            }
        }

        Ok(buf)
    }

    fn close(&mut self) -> Result<(), ProtocolError> {
        if self.port.take().is_some() {
            debug!(port = %self.name, "serial port closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_ports() {
        // Only checks that enumeration does not panic on hosts without ports
        let ports = list_ports();
        for pair in ports.windows(2) {
            assert!(pair[0].name <= pair[1].name);
        }
    }

    #[test]
    fn test_remaining_budget_shrinks() {
        let timeout = Duration::from_millis(2000);
        assert_eq!(
            remaining_budget(timeout, Duration::ZERO),
            Some(Duration::from_millis(2000))
        );
        assert_eq!(
            remaining_budget(timeout, Duration::from_millis(1500)),
            Some(Duration::from_millis(500))
        );
        assert_eq!(remaining_budget(timeout, Duration::from_millis(2000)), None);
        assert_eq!(remaining_budget(timeout, Duration::from_millis(2500)), None);
        assert_eq!(remaining_budget(Duration::ZERO, Duration::ZERO), None);
    }

    #[test]
    fn test_open_missing_port_fails() {
        let result = SerialTransport::open(
            "/dev/this-port-does-not-exist",
            DEFAULT_BAUD_RATE,
            Duration::from_millis(10),
        );
        assert!(matches!(result, Err(ProtocolError::ConnectionFailed(_))));
    }
}
