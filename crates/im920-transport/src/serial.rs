use tracing::{debug, info};

use crate::config::LinkConfig;
use crate::error::{Result, TransportError};
use crate::stream::RadioStream;

/// A serial device that may host a radio module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Device path.
    pub name: String,
    /// Short description of the port kind (`usb`, `pci`, `bluetooth`, `unknown`).
    pub kind: &'static str,
    /// USB product string, when the port is a USB bridge that reports one.
    pub product: Option<String>,
}

/// Serial transport.
///
/// Opens the UART the module is attached to with the framing the module
/// expects: 8 data bits, no parity, 1 stop bit, no flow control.
pub struct SerialLink;

impl SerialLink {
    /// Open the configured serial device (blocking I/O).
    pub fn open(config: &LinkConfig) -> Result<RadioStream> {
        let port = serialport::new(&config.port, config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(config.write_timeout)
            .open()
            .map_err(|source| TransportError::Open {
                port: config.port.clone(),
                source,
            })?;

        let stream = RadioStream::from_serial(port, config.read_timeout)?;
        info!(port = %config.port, baud_rate = config.baud_rate, "opened serial link");
        Ok(stream)
    }

    /// List serial devices visible to the host.
    pub fn available_ports() -> Result<Vec<PortInfo>> {
        let ports = serialport::available_ports().map_err(TransportError::Enumerate)?;
        debug!(count = ports.len(), "enumerated serial ports");
        Ok(ports
            .into_iter()
            .map(|port| {
                let (kind, product) = match port.port_type {
                    serialport::SerialPortType::UsbPort(usb) => ("usb", usb.product),
                    serialport::SerialPortType::PciPort => ("pci", None),
                    serialport::SerialPortType::BluetoothPort => ("bluetooth", None),
                    serialport::SerialPortType::Unknown => ("unknown", None),
                };
                PortInfo {
                    name: port.port_name,
                    kind,
                    product,
                }
            })
            .collect())
    }

    /// Transport name for diagnostics.
    pub fn transport_name() -> &'static str {
        "serial"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_device_reports_port() {
        let cfg = LinkConfig::new("/dev/im920-does-not-exist", 19200);
        let err = SerialLink::open(&cfg).unwrap_err();
        match err {
            TransportError::Open { port, .. } => assert_eq!(port, "/dev/im920-does-not-exist"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn transport_name_is_serial() {
        assert_eq!(SerialLink::transport_name(), "serial");
    }
}
