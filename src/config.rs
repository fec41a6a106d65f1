//! Fixed runtime parameters for the two views
//!
//! Nothing here is read from the command line or from files. Each view has a
//! profile describing the device it talks to and the shape of its display.

use crate::protocol::GridShape;
use crate::serial::PortConfig;
use std::time::Duration;

/// Baud rate both sketches use on the microcontroller side
pub const SENSOR_BAUD: u32 = 9600;

/// Settings for the single-channel rolling line chart
#[derive(Debug, Clone, Copy)]
pub struct ScalarProfile {
    /// Serial device path
    pub port_path: &'static str,
    /// Baud rate
    pub baud_rate: u32,
    /// Read timeout. Only used so the loop can notice user interrupts.
    pub read_timeout: Duration,
    /// Number of samples kept in the rolling window
    pub history_len: usize,
    /// Fixed vertical range of the chart
    pub y_range: (f64, f64),
}

impl ScalarProfile {
    /// Port configuration for this profile
    pub fn port_config(&self) -> PortConfig {
        PortConfig::new(self.port_path)
            .with_baud_rate(self.baud_rate)
            .with_timeout(self.read_timeout)
    }
}

/// Settings for the heatmap + surface view
#[derive(Debug, Clone, Copy)]
pub struct GridProfile {
    /// Serial device path
    pub port_path: &'static str,
    /// Baud rate
    pub baud_rate: u32,
    /// Read timeout (bounds how long the reader takes to notice a stop request)
    pub read_timeout: Duration,
    /// Delay after opening the port before reading; boards reset on open
    pub settle_delay: Duration,
    /// Grid dimensions carried by each line
    pub shape: GridShape,
    /// Consumer tick period
    pub refresh_interval: Duration,
    /// Fixed height range of the surface plot
    pub z_range: (f64, f64),
}

impl GridProfile {
    /// Port configuration for this profile
    pub fn port_config(&self) -> PortConfig {
        PortConfig::new(self.port_path)
            .with_baud_rate(self.baud_rate)
            .with_timeout(self.read_timeout)
    }
}

/// Single-channel EMG style sensor on the Arduino's native USB port
pub const SCALAR_PROFILE: ScalarProfile = ScalarProfile {
    port_path: "/dev/ttyACM0",
    baud_rate: SENSOR_BAUD,
    read_timeout: Duration::from_millis(100),
    history_len: 100,
    y_range: (0.0, 1024.0),
};

/// 8x8 sensor matrix behind a USB-to-serial adapter
pub const GRID_PROFILE: GridProfile = GridProfile {
    port_path: "/dev/ttyUSB0",
    baud_rate: SENSOR_BAUD,
    read_timeout: Duration::from_secs(1),
    settle_delay: Duration::from_secs(2),
    shape: GridShape::new(8, 8),
    refresh_interval: Duration::from_millis(100),
    z_range: (0.0, 1023.0),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_port_config() {
        let config = SCALAR_PROFILE.port_config();
        assert_eq!(config.port_path, "/dev/ttyACM0");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.timeout, Duration::from_millis(100));
    }

    #[test]
    fn test_grid_profile() {
        let config = GRID_PROFILE.port_config();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(GRID_PROFILE.shape.cell_count(), 64);
        assert_eq!(GRID_PROFILE.settle_delay, Duration::from_secs(2));
    }
}
