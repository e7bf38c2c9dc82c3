//! # SMC Core Library
//!
//! Core functionality for driving Simple Motor Controllers over a shared serial line.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - The Pololu addressed command protocol (sync byte + device number + payload)
//! - A fixed catalog of motor controller commands and device variables
//! - Response normalization into typed values (firmware version, voltage, temperature)
//! - A controller session that owns the serial port and issues one exchange per call
//!
//! ## Example
//!
//! ```rust,ignore
//! use smc_core::protocol::{Controller, ControllerConfig};
//!
//! let config = ControllerConfig {
//!     port_name: "/dev/ttyACM0".to_string(),
//!     ..Default::default()
//! };
//!
//! let mut controller = Controller::new(config);
//! controller.connect()?;
//!
//! println!("Input voltage: {} mV", controller.get_input_voltage()?);
//! controller.exit_safe_start()?;
//! controller.motor_forward(1600)?;
//! controller.disconnect();
//! ```

pub mod protocol;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::protocol::{
        CommandKind, Controller, ControllerConfig, ControllerState, FirmwareInfo, ProtocolError,
        Transport, Variable,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
