use std::net::SocketAddrV4;

use telemdash_core::fixtures::CaptureBuilder;
use telemdash_core::protocols::f1::{
    CarTelemetryRecord, CarTelemetryTrailer, F1Header, write_car_telemetry,
};
use telemdash_core::{
    CaptureFileSource, FrameSource, Protocol, SourceError, SourceKind, TelemetryConfig,
    replay_capture_file,
};

fn addr(s: &str) -> SocketAddrV4 {
    s.parse().unwrap()
}

fn f1_packet(speed: u16, gear: i8, rpm: u16) -> Vec<u8> {
    let car = CarTelemetryRecord {
        speed,
        gear,
        engine_rpm: rpm,
        throttle: 1.0,
        ..CarTelemetryRecord::default()
    };
    write_car_telemetry(
        &F1Header::car_telemetry(0, 1, 0.0),
        &[car],
        &CarTelemetryTrailer::default(),
    )
}

fn session_capture() -> CaptureBuilder {
    let game = addr("192.168.1.20:51000");
    let relay = addr("192.168.1.30:40000");
    let f1_listener = addr("192.168.1.50:20777");
    let forwarder_listener = addr("192.168.1.50:20778");
    let base = 1_600_000_000_000_000u64;

    let mut capture = CaptureBuilder::new();
    capture
        .push_udp(base, game, f1_listener, &f1_packet(120, 3, 8000))
        .push_udp(base + 50_000, game, f1_listener, &f1_packet(125, 3, 8200))
        .push_udp(base + 60_000, game, f1_listener, &[0u8; 12])
        .push_udp(
            base + 100_000,
            relay,
            forwarder_listener,
            br#"{"speed": 140.0, "gear": 4, "rpm": 6900, "fuel": 55.0}"#,
        )
        .push_udp(base + 110_000, relay, forwarder_listener, br#"{"speed": "#)
        .push_udp(base + 120_000, game, addr("192.168.1.50:9999"), b"noise")
        // F1 goes quiet; PCARS keeps the session fresh until the end.
        .push_udp(
            base + 3_000_000,
            relay,
            forwarder_listener,
            br#"{"gear": 5}"#,
        );
    capture
}

#[test]
fn replay_reports_streams_and_sources() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.pcapng");
    session_capture().write_pcapng(&path).unwrap();

    let report = replay_capture_file(&path, &TelemetryConfig::default()).unwrap();
    assert_eq!(report.tool.name, "telemdash");
    assert_eq!(report.generated_at, "2020-09-13T12:26:43Z");

    let summary = report.capture_summary.as_ref().unwrap();
    assert_eq!(summary.packets_total, 7);
    assert_eq!(summary.udp_datagrams, 7);
    assert_eq!(summary.unrouted_datagrams, 1);
    assert_eq!(summary.malformed_frames, 0);
    assert_eq!(summary.time_start.as_deref(), Some("2020-09-13T12:26:40Z"));

    let f1 = &report.streams[0];
    assert_eq!(f1.protocol, Protocol::F1);
    assert_eq!(f1.packets, 3);
    assert_eq!(f1.decoded, 2);
    assert_eq!(f1.rejected, 1);
    assert_eq!(f1.rejections[0].id, "TD-F1-TOO-SMALL-FOR-HEADER");
    assert!(!f1.valid_at_end);
    let f1_snapshot = f1.final_snapshot.unwrap();
    assert_eq!(f1_snapshot.speed_kmh, 125.0);
    assert_eq!(f1_snapshot.rpm, 8200);
    assert!(!f1_snapshot.valid);

    let pcars = &report.streams[1];
    assert_eq!(pcars.protocol, Protocol::Pcars);
    assert_eq!(pcars.packets, 3);
    assert_eq!(pcars.decoded, 2);
    assert_eq!(pcars.rejections[0].id, "TD-PCARS-PARSE");
    assert!(pcars.valid_at_end);
    let pcars_snapshot = pcars.final_snapshot.unwrap();
    assert_eq!(pcars_snapshot.gear, 5);
    assert_eq!(pcars_snapshot.speed_kmh, 140.0);
    assert_eq!(pcars_snapshot.fuel_percent, Some(55.0));
    assert_eq!(pcars_snapshot.source, SourceKind::Forwarder);

    let srcs: Vec<_> = report
        .sources
        .iter()
        .map(|s| (s.src.as_str(), s.dst.as_str(), s.packets))
        .collect();
    assert_eq!(
        srcs,
        [
            ("192.168.1.20:51000", "192.168.1.50:20777", 3),
            ("192.168.1.30:40000", "192.168.1.50:20778", 3),
        ]
    );
}

#[test]
fn replay_truncates_to_receive_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.pcapng");
    let mut capture = CaptureBuilder::new();
    capture.push_udp(
        0,
        addr("10.0.0.1:50000"),
        addr("10.0.0.2:20777"),
        &f1_packet(200, 6, 10000),
    );
    capture.write_pcapng(&path).unwrap();

    let config = TelemetryConfig {
        max_packet_len: 1024,
        ..TelemetryConfig::default()
    };
    let report = replay_capture_file(&path, &config).unwrap();
    let f1 = &report.streams[0];
    assert_eq!(f1.truncated, 1);
    assert_eq!(f1.rejections[0].id, "TD-F1-TOO-SMALL-FOR-PAYLOAD");
    assert_eq!(report.sources[0].bytes, 1024);
}

#[test]
fn replay_uses_configured_ports() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ports.pcapng");
    let mut capture = CaptureBuilder::new();
    capture.push_udp(
        0,
        addr("10.0.0.1:50000"),
        addr("10.0.0.2:7000"),
        br#"{"rpm": 5000}"#,
    );
    capture.write_pcapng(&path).unwrap();

    let config = TelemetryConfig {
        forwarder_port: 7000,
        ..TelemetryConfig::default()
    };
    let report = replay_capture_file(&path, &config).unwrap();
    assert_eq!(report.streams[1].decoded, 1);

    let report = replay_capture_file(&path, &TelemetryConfig::default()).unwrap();
    assert_eq!(report.streams[1].packets, 0);
    assert_eq!(report.capture_summary.unwrap().unrouted_datagrams, 1);
}

#[test]
fn capture_source_yields_every_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frames.pcapng");
    session_capture().write_pcapng(&path).unwrap();

    let mut source = CaptureFileSource::open(&path).unwrap();
    let mut frames = 0;
    while let Some(frame) = source.next_frame().unwrap() {
        assert!(frame.ts.is_some());
        frames += 1;
    }
    assert_eq!(frames, 7);
}

#[test]
fn capture_source_rejects_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.pcapng");
    std::fs::write(&path, [0x0a, 0x0d, 0x0d]).unwrap();

    let err = match CaptureFileSource::open(&path) {
        Ok(_) => panic!("expected truncated file to be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, SourceError::Io(_)));
}
