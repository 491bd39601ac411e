//! Sensor board discovery.

use async_trait::async_trait;
use tokio_serial::{SerialPortInfo, SerialPortType};

use common::{AcquireError, SensorInfo};

/// Enumerates the sensor boards currently attached to the host.
#[async_trait]
pub trait SensorRegistry: Send + Sync {
    async fn connected_sensors(&self) -> Result<Vec<SensorInfo>, AcquireError>;
}

/// Registry backed by the host's serial port enumeration.
pub struct SerialRegistry;

#[async_trait]
impl SensorRegistry for SerialRegistry {
    async fn connected_sensors(&self) -> Result<Vec<SensorInfo>, AcquireError> {
        let ports = tokio_serial::available_ports()
            .map_err(|e| AcquireError::ChannelUnavailable(e.to_string()))?;
        Ok(ports
            .into_iter()
            .enumerate()
            .map(|(i, port)| describe_port(i, port))
            .collect())
    }
}

fn describe_port(index: usize, port: SerialPortInfo) -> SensorInfo {
    let serial = match port.port_type {
        SerialPortType::UsbPort(usb) => usb.serial_number.unwrap_or_else(|| "-".to_string()),
        _ => "-".to_string(),
    };
    SensorInfo {
        id: index.to_string(),
        path: port.port_name.clone(),
        name: port.port_name,
        serial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_serial::UsbPortInfo;

    #[test]
    fn test_usb_port_carries_serial_number() {
        let info = describe_port(
            0,
            SerialPortInfo {
                port_name: "/dev/ttyUSB0".to_string(),
                port_type: SerialPortType::UsbPort(UsbPortInfo {
                    vid: 0x0403,
                    pid: 0x6001,
                    serial_number: Some("A7004wJq".to_string()),
                    manufacturer: None,
                    product: None,
                }),
            },
        );
        assert_eq!(info.id, "0");
        assert_eq!(info.path, "/dev/ttyUSB0");
        assert_eq!(info.serial, "A7004wJq");
    }

    #[test]
    fn test_non_usb_port_serial_falls_back() {
        let info = describe_port(
            3,
            SerialPortInfo {
                port_name: "/dev/ttyS0".to_string(),
                port_type: SerialPortType::Unknown,
            },
        );
        assert_eq!(info.id, "3");
        assert_eq!(info.serial, "-");
    }
}
