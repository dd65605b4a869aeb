#![cfg(unix)]

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::thread::{self, JoinHandle};

use im920_radio::{BaudRate, ModuleConfig, Radio, RadioError};

type SocketRadio = Radio<UnixStream, UnixStream>;

/// Minimal module stand-in: answers commands and pushes notifications.
///
/// Returns every command line it received once the host hangs up.
fn spawn_module(
    stream: UnixStream,
    mut answer: impl FnMut(&str) -> Vec<String> + Send + 'static,
) -> JoinHandle<Vec<String>> {
    thread::spawn(move || {
        let mut writer = stream.try_clone().expect("clone module stream");
        let reader = BufReader::new(stream);
        let mut received = Vec::new();
        for line in reader.lines() {
            let Ok(line) = line else { break };
            let line = line.trim_end_matches('\r').to_string();
            for reply in answer(&line) {
                if writer.write_all(reply.as_bytes()).is_err() {
                    return received;
                }
                let _ = writer.write_all(b"\r\n");
            }
            received.push(line);
        }
        received
    })
}

fn connect(
    answer: impl FnMut(&str) -> Vec<String> + Send + 'static,
) -> (SocketRadio, JoinHandle<Vec<String>>) {
    let (host, module) = UnixStream::pair().expect("socket pair");
    let reader = host.try_clone().expect("clone host stream");
    let radio = Radio::new(reader, host, ModuleConfig::default());
    (radio, spawn_module(module, answer))
}

fn hang_up(radio: SocketRadio) {
    let (reader, writer) = radio.into_parts();
    writer
        .into_inner()
        .shutdown(std::net::Shutdown::Both)
        .expect("shutdown");
    drop(reader);
}

fn ok() -> Vec<String> {
    vec!["OK".to_string()]
}

#[test]
fn session_against_simulated_module() {
    let (mut radio, module) = connect(|line| match line {
        "RPRM" => vec![
            "ID:0001".into(),
            "STNN:0042".into(),
            "STCH:01".into(),
            "DCIO DSRX".into(),
        ],
        "RDCK" => vec!["07:08:09.010 N".into(), "OK".into()],
        _ => ok(),
    });

    let params = radio.read_params().expect("read params");
    assert_eq!(radio.node_id(), Some(42));
    assert!(!radio.text_mode());
    assert_eq!(params.get_str("STCH").as_deref(), Some("01"));

    radio.set_text_mode(true).expect("enable text mode");
    radio.broadcast(b"hello").expect("broadcast");
    radio.set_text_mode(false).expect("disable text mode");
    radio.send_to(0x0003, b"\x01\x02").expect("send");

    let time = radio.get_time().expect("clock");
    assert_eq!((time.hour, time.minute, time.second), (7, 8, 9));
    assert!(!time.sync);

    radio.set_baud(BaudRate::B38400).expect("baud");
    assert_eq!(radio.config().baud_rate, 38400);
    assert!(!radio.is_desynchronized());

    hang_up(radio);
    let received = module.join().expect("module thread");
    assert_eq!(
        received,
        [
            "RPRM",
            "ECIO",
            "TXDA hello",
            "DCIO",
            "TXDU 00030102",
            "RDCK",
            "SBRT 5",
        ]
    );
}

#[test]
fn long_unicast_is_chunked_on_the_wire() {
    let (mut radio, module) = connect(|_| ok());
    let payload: Vec<u8> = (0..20u8).map(|b| b + 0x41).collect::<Vec<_>>().repeat(2);
    radio.send_to(0x0010, &payload).expect("send");

    hang_up(radio);
    let received = module.join().expect("module thread");
    assert_eq!(received.len(), 5);
    assert!(received.iter().all(|line| line.starts_with("TXDU 0010")));
}

#[test]
fn rejection_is_reported_and_session_continues() {
    let mut first = true;
    let (mut radio, module) = connect(move |_| {
        if std::mem::take(&mut first) {
            vec!["NG".to_string()]
        } else {
            ok()
        }
    });

    let err = radio.broadcast(b"\x00").unwrap_err();
    assert!(matches!(err, RadioError::UnexpectedResponse(line) if line == "NG"));
    radio.broadcast(b"\x00").expect("second broadcast");

    hang_up(radio);
    assert_eq!(module.join().expect("module thread"), ["TXDA 00", "TXDA 00"]);
}

#[test]
fn receives_unsolicited_notifications() {
    let (host, mut module) = UnixStream::pair().expect("socket pair");
    let reader = host.try_clone().expect("clone host stream");
    let mut radio = Radio::new(reader, host, ModuleConfig::default());

    module
        .write_all(b"GRNOREGD\r\n00,0102,30:48656c6c6f\r\n00,0007,7f: 00ff\r\n")
        .expect("write notifications");

    let first = radio.receive_packet().expect("first packet");
    assert_eq!(first.sender(), 0x0102);
    assert_eq!(first.rssi(), -48);
    assert_eq!(first.data().as_ref(), b"Hello");

    let second = radio.receive_packet().expect("second packet");
    assert_eq!(second.sender(), 7);
    assert_eq!(second.rssi(), -127);
    assert_eq!(second.data().as_ref(), &[0x00, 0xff]);

    drop(module);
    assert!(matches!(
        radio.receive_packet(),
        Err(RadioError::Frame(im920_frame::FrameError::ConnectionClosed))
    ));
}
