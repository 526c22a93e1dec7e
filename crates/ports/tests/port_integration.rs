//! 포트 할당 및 설정 갱신 통합 테스트

use std::net::TcpListener;

use chaosgen_core::config::PortsConfig;
use chaosgen_ports::{PortManager, read_server_binding, resolve_port_conflict};
use tempfile::TempDir;

fn free_range() -> (u16, u16) {
    // OS가 고른 포트 주변으로 좁은 범위를 만든다
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let start = port.saturating_sub(5).max(1024);
    (start, start.saturating_add(20))
}

fn manager() -> PortManager {
    let (range_start, range_end) = free_range();
    PortManager::new(PortsConfig {
        host: "127.0.0.1".to_owned(),
        default_port: range_start,
        range_start,
        range_end,
        max_retries: 3,
    })
}

#[test]
fn chaos_server_port_skips_occupied_default() {
    let manager = manager();
    let default_port = manager.config().default_port;
    let holder = TcpListener::bind(("127.0.0.1", default_port));

    let port = manager.port_for_chaos_server().unwrap();
    if holder.is_ok() {
        assert_ne!(port, default_port);
    }
    assert!(manager.is_port_available(port));
}

#[test]
fn conflict_output_rewrites_config_port() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.yaml");
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let taken = listener.local_addr().unwrap().port();
    std::fs::write(
        &config,
        format!("kraken:\n  port: {taken}\n  signal_address: 127.0.0.1\n"),
    )
    .unwrap();

    let change = resolve_port_conflict(
        &manager(),
        &config,
        "OSError: [Errno 98] Address already in use",
    )
    .unwrap()
    .expect("conflict should be handled");

    assert_eq!(change.previous, taken);
    assert_ne!(change.port, taken);
    assert_eq!(read_server_binding(&config).unwrap().port, change.port);
}
