//! Simple Motor Controller Drive Demo
//!
//! Connects to a controller, prints its identity and diagnostics, then runs the motor
//! forward, brakes, runs it in reverse and stops.
//!
//! Usage:
//!   cargo run --example drive_demo -- [OPTIONS] [PORT]
//!
//! Options:
//!   --port PORT       Serial port (default: /dev/ttyACM0)
//!   --baud RATE       Baud rate (default: 115200)
//!   --device N        Device number, decimal or 0x-prefixed hex (default: 0x0D)
//!   --speed N         Drive speed 0-3200 (default: 300)
//!   --brake N         Brake amount 0-32 (default: 10)
//!   --config FILE     Load settings from a JSON config file
//!   --list            List serial ports and exit
//!
//! Set RUST_LOG=debug to see the frames on the wire.

use anyhow::{bail, Context, Result};
use smc_core::protocol::{list_ports, Controller, ControllerConfig, Variable};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn parse_number(value: &str) -> Result<u16> {
    let parsed = match value.strip_prefix("0x") {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.with_context(|| format!("invalid number: {}", value))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut config = ControllerConfig::new("/dev/ttyACM0");
    let mut speed = 300u16;
    let mut brake = 10u8;

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1).map(String::as_str);
        match (args[i].as_str(), value) {
            ("--port" | "-p", Some(v)) => {
                config.port_name = v.to_string();
                i += 1;
            }
            ("--baud" | "-b", Some(v)) => {
                config.baud_rate = v.parse().context("invalid baud rate")?;
                i += 1;
            }
            ("--device" | "-d", Some(v)) => {
                config.device_number =
                    u8::try_from(parse_number(v)?).context("device number must fit in a byte")?;
                i += 1;
            }
            ("--speed" | "-s", Some(v)) => {
                speed = parse_number(v)?;
                i += 1;
            }
            ("--brake", Some(v)) => {
                brake = u8::try_from(parse_number(v)?).context("brake amount must fit in a byte")?;
                i += 1;
            }
            ("--config" | "-c", Some(v)) => {
                config = ControllerConfig::load(v)
                    .with_context(|| format!("failed to load config {}", v))?;
                i += 1;
            }
            ("--list" | "-l", _) => {
                for port in list_ports() {
                    println!("{}  {}", port.name, port.product.unwrap_or_default());
                }
                return Ok(());
            }
            ("--help" | "-h", _) => {
                print_help();
                return Ok(());
            }
            (arg, _) if !arg.starts_with('-') => {
                config.port_name = arg.to_string();
            }
            (arg, _) => bail!("unknown or incomplete option: {}", arg),
        }
        i += 1;
    }

    println!("Configuration:");
    println!("  Port:          {}", config.port_name);
    println!("  Baud rate:     {}", config.baud_rate);
    println!("  Device number: {:#04x}", config.device_number);
    println!();

    let mut controller = Controller::new(config);
    controller.connect().context("failed to connect")?;

    if let Some(info) = controller.device_info() {
        println!("Product ID:       {}", info.product_id_hex());
        println!("Firmware version: {}", info.firmware_version());
    }
    println!("Input voltage:    {} mV", controller.get_input_voltage()?);
    println!("Temperature:      {:.1} °C", controller.get_temperature()?);
    println!(
        "Error status:     {:#06x}",
        controller.get_variable(Variable::ErrorStatus)?
    );

    controller.exit_safe_start()?;

    println!("Forward at {}", speed);
    controller.motor_forward(speed)?;
    std::thread::sleep(Duration::from_secs(3));

    println!("Brake by {}", brake);
    controller.motor_brake(brake)?;
    std::thread::sleep(Duration::from_secs(3));

    println!("Reverse at {}", speed);
    controller.motor_reverse(speed)?;
    std::thread::sleep(Duration::from_secs(3));

    controller.disconnect();
    println!("Motor stopped, port closed");
    Ok(())
}

fn print_help() {
    println!("Simple Motor Controller Drive Demo");
    println!();
    println!("Usage: drive_demo [OPTIONS] [PORT]");
    println!();
    println!("Options:");
    println!("  --port, -p PORT     Serial port (default: /dev/ttyACM0)");
    println!("  --baud, -b RATE     Baud rate (default: 115200)");
    println!("  --device, -d N      Device number (default: 0x0D)");
    println!("  --speed, -s N       Drive speed 0-3200 (default: 300)");
    println!("  --brake N           Brake amount 0-32 (default: 10)");
    println!("  --config, -c FILE   Load settings from a JSON file");
    println!("  --list, -l          List serial ports and exit");
    println!("  --help, -h          Show this help");
}
