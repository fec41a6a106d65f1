//! Serial port configuration and connection management
//!
//! Handles opening the sensor's USB serial port and enumerating ports.

use super::lines::{LineEvent, LineReader, LineSource};
use super::SerialError;
use colored::Colorize;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::time::Duration;

/// Configuration for serial port connection
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Serial port path (e.g., /dev/ttyACM0, /dev/ttyUSB0)
    pub port_path: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits (default: 8)
    pub data_bits: DataBits,
    /// Parity (default: None)
    pub parity: Parity,
    /// Stop bits (default: 1)
    pub stop_bits: StopBits,
    /// Flow control (default: None)
    pub flow_control: FlowControl,
    /// Read timeout
    pub timeout: Duration,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            port_path: String::from("/dev/ttyACM0"),
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            timeout: Duration::from_millis(100),
        }
    }
}

impl PortConfig {
    /// Create a new 8N1 configuration for the given port
    pub fn new(port_path: &str) -> Self {
        Self {
            port_path: port_path.to_string(),
            ..Default::default()
        }
    }

    /// Set the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the read timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// An open serial port that reads sensor lines
pub struct SerialConnection {
    reader: LineReader<Box<dyn SerialPort>>,
    config: PortConfig,
}

impl SerialConnection {
    /// Open a serial connection with the given configuration.
    ///
    /// There is no retry: a missing, busy or forbidden device is reported
    /// straight back to the caller.
    pub fn open(config: PortConfig) -> Result<Self, SerialError> {
        let port = serialport::new(&config.port_path, config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .flow_control(config.flow_control)
            .timeout(config.timeout)
            .open()
            .map_err(|source| SerialError::Open {
                path: config.port_path.clone(),
                source,
            })?;

        log::info!(
            "opened {} at {} baud (timeout {:?})",
            config.port_path,
            config.baud_rate,
            config.timeout
        );

        Ok(Self {
            reader: LineReader::new(port),
            config,
        })
    }

    /// Release the port
    pub fn close(self) {
        log::info!("closing {}", self.config.port_path);
        drop(self.reader);
    }
}

impl LineSource for SerialConnection {
    fn next_event(&mut self) -> Result<LineEvent, SerialError> {
        self.reader.read_event()
    }
}

/// Information about a detected serial port
#[derive(Debug, Clone)]
pub struct PortInfo {
    pub path: String,
    pub port_type: PortType,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PortType {
    UsbSerial,
    PciSerial,
    Bluetooth,
    Unknown,
}

impl std::fmt::Display for PortType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortType::UsbSerial => write!(f, "USB Serial"),
            PortType::PciSerial => write!(f, "PCI Serial"),
            PortType::Bluetooth => write!(f, "Bluetooth"),
            PortType::Unknown => write!(f, "Unknown"),
        }
    }
}

impl From<serialport::SerialPortInfo> for PortInfo {
    fn from(p: serialport::SerialPortInfo) -> Self {
        let (port_type, manufacturer, product, serial_number, vid, pid) = match p.port_type {
            serialport::SerialPortType::UsbPort(info) => (
                PortType::UsbSerial,
                info.manufacturer,
                info.product,
                info.serial_number,
                Some(info.vid),
                Some(info.pid),
            ),
            serialport::SerialPortType::PciPort => {
                (PortType::PciSerial, None, None, None, None, None)
            }
            serialport::SerialPortType::BluetoothPort => {
                (PortType::Bluetooth, None, None, None, None, None)
            }
            serialport::SerialPortType::Unknown => {
                (PortType::Unknown, None, None, None, None, None)
            }
        };

        PortInfo {
            path: p.port_name,
            port_type,
            manufacturer,
            product,
            serial_number,
            vid,
            pid,
        }
    }
}

/// List all available serial ports
pub fn list_ports() -> Result<Vec<PortInfo>, SerialError> {
    let ports = serialport::available_ports().map_err(SerialError::Enumerate)?;
    Ok(ports.into_iter().map(PortInfo::from).collect())
}

/// Print formatted list of available serial ports
pub fn print_ports(expected: &[(&str, &str)]) -> Result<(), SerialError> {
    let ports = list_ports()?;

    if ports.is_empty() {
        println!("{}", "No serial ports found".yellow());
        println!("\n{}", "Troubleshooting tips:".cyan().bold());
        println!("  1. Connect the microcontroller over USB");
        println!("  2. Check if the device is recognized: ls -la /dev/ttyUSB* /dev/ttyACM*");
        println!("  3. Add your user to the 'dialout' group: sudo usermod -aG dialout $USER");
        return Ok(());
    }

    println!("{}", "Available Serial Ports:".green().bold());
    println!("{}", "=".repeat(60));

    for port in &ports {
        println!("\n{}: {}", "Port".cyan(), port.path.white().bold());
        println!("  Type: {}", port.port_type);

        if let Some(ref mfg) = port.manufacturer {
            println!("  Manufacturer: {}", mfg);
        }
        if let Some(ref prod) = port.product {
            println!("  Product: {}", prod);
        }
        if let Some(ref sn) = port.serial_number {
            println!("  Serial: {}", sn);
        }
        if let (Some(vid), Some(pid)) = (port.vid, port.pid) {
            println!("  VID:PID: {:04x}:{:04x}", vid, pid);
        }
    }

    println!("\n{}", "=".repeat(60));
    for (view, path) in expected {
        let status = if ports.iter().any(|p| p.path == *path) {
            "[OK]".green().bold()
        } else {
            "[MISSING]".red().bold()
        };
        println!("{} {} view reads {}", status, view, path.white());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PortConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
    }

    #[test]
    fn test_config_builder() {
        let config = PortConfig::new("/dev/ttyUSB0")
            .with_baud_rate(115200)
            .with_timeout(Duration::from_secs(1));

        assert_eq!(config.port_path, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_open_missing_port_fails() {
        let config = PortConfig::new("/dev/sensor-plot-does-not-exist");
        match SerialConnection::open(config) {
            Err(SerialError::Open { path, .. }) => {
                assert_eq!(path, "/dev/sensor-plot-does-not-exist")
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opened a port that does not exist"),
        }
    }

    #[test]
    fn test_usb_port_info_conversion() {
        let info = serialport::SerialPortInfo {
            port_name: "/dev/ttyACM0".to_string(),
            port_type: serialport::SerialPortType::UsbPort(serialport::UsbPortInfo {
                vid: 0x2341,
                pid: 0x0043,
                serial_number: None,
                manufacturer: Some("Arduino".to_string()),
                product: None,
            }),
        };

        let port = PortInfo::from(info);
        assert_eq!(port.port_type, PortType::UsbSerial);
        assert_eq!(port.vid, Some(0x2341));
        assert_eq!(port.manufacturer.as_deref(), Some("Arduino"));
    }
}
