use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use im920_radio::{ModuleConfig, ModuleParams, Packet, TimeInfo};
use im920_transport::PortInfo;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PacketOutput {
    sender: u16,
    sender_hex: String,
    rssi: i16,
    payload_size: usize,
    payload: String,
    payload_hex: String,
    timestamp: String,
}

pub fn print_packet(packet: &Packet, format: OutputFormat) {
    let data = packet.data().as_ref();
    match format {
        OutputFormat::Json => {
            let out = PacketOutput {
                sender: packet.sender(),
                sender_hex: format!("{:04x}", packet.sender()),
                rssi: packet.rssi(),
                payload_size: data.len(),
                payload: payload_preview(data),
                payload_hex: hex::encode(data),
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SENDER", "RSSI", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    format!("{:04x}", packet.sender()),
                    packet.rssi().to_string(),
                    data.len().to_string(),
                    payload_preview(data),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "sender={:04x} rssi={} size={} payload={}",
                packet.sender(),
                packet.rssi(),
                data.len(),
                payload_preview(data)
            );
        }
        OutputFormat::Raw => print_raw(data),
    }
}

#[derive(Serialize)]
struct ParamsOutput<'a> {
    config: &'a ModuleConfig,
    params: Vec<ParamEntry>,
}

#[derive(Serialize)]
struct ParamEntry {
    key: String,
    value: String,
}

pub fn print_params(params: &ModuleParams, config: &ModuleConfig, format: OutputFormat) {
    let entries: Vec<ParamEntry> = params
        .iter()
        .map(|(key, value)| ParamEntry {
            key: key.to_string(),
            value: String::from_utf8_lossy(value).into_owned(),
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&ParamsOutput {
            config,
            params: entries,
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PARAMETER", "VALUE"]);
            for entry in entries {
                table.add_row(vec![entry.key, entry.value]);
            }
            println!("{table}");
            println!(
                "node_id={} text_mode={} baud_rate={}",
                display_node_id(config),
                config.text_mode,
                config.baud_rate
            );
        }
        OutputFormat::Pretty => {
            println!(
                "node_id={} text_mode={} baud_rate={}",
                display_node_id(config),
                config.text_mode,
                config.baud_rate
            );
            for entry in entries {
                println!("  {}={}", entry.key, entry.value);
            }
        }
        OutputFormat::Raw => {
            for entry in entries {
                println!("{}:{}", entry.key, entry.value);
            }
        }
    }
}

pub fn print_time(time: &TimeInfo, format: OutputFormat) {
    let clock = format!(
        "{:02}:{:02}:{:02}.{:03}",
        time.hour, time.minute, time.second, time.millisecond
    );
    match format {
        OutputFormat::Json => print_json(time),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["TIME", "SYNCED"])
                .add_row(vec![clock, time.sync.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("time={clock} synced={}", time.sync),
        OutputFormat::Raw => println!("{clock}"),
    }
}

#[derive(Serialize)]
struct PortOutput<'a> {
    name: &'a str,
    kind: &'a str,
    product: Option<&'a str>,
}

pub fn print_ports(ports: &[PortInfo], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out: Vec<PortOutput<'_>> = ports
                .iter()
                .map(|port| PortOutput {
                    name: &port.name,
                    kind: port.kind,
                    product: port.product.as_deref(),
                })
                .collect();
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "KIND", "PRODUCT"]);
            for port in ports {
                table.add_row(vec![
                    port.name.clone(),
                    port.kind.to_string(),
                    port.product.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for port in ports {
                match &port.product {
                    Some(product) => println!("{} ({}, {product})", port.name, port.kind),
                    None => println!("{} ({})", port.name, port.kind),
                }
            }
        }
        OutputFormat::Raw => {
            for port in ports {
                println!("{}", port.name);
            }
        }
    }
}

/// Confirmation line for commands that only need an `OK`.
pub fn print_status(action: &str, detail: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({ "action": action, "detail": detail, "ok": true })
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => println!("{action}: {detail}"),
        OutputFormat::Raw => {}
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn display_node_id(config: &ModuleConfig) -> String {
    config
        .node_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_shows_text_or_size() {
        assert_eq!(payload_preview(b"hello"), "hello");
        assert_eq!(payload_preview(&[0xff, 0xfe]), "<binary 2 bytes>");
    }

    #[test]
    fn node_id_display() {
        let mut config = ModuleConfig::default();
        assert_eq!(display_node_id(&config), "unknown");
        config.node_id = Some(12);
        assert_eq!(display_node_id(&config), "12");
    }
}
