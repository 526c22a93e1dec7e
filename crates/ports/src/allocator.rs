//! 카오스 도구 서버 포트 할당
//!
//! 여러 카오스 실행이 동시에 뜨거나 기본 포트가 점유된 경우를 위해
//! 다음 순서로 바인딩 가능한 포트를 찾습니다.
//!
//! 1. 선호 포트
//! 2. 기본 포트 (선호 포트와 다를 때)
//! 3. 범위 내 순차 탐색 (이미 시도한 포트 제외)
//! 4. 범위 내 무작위 포트 `max_retries`회
//! 5. OS 할당 포트

use std::collections::BTreeMap;
use std::net::TcpListener;

use chaosgen_core::config::{PortsConfig, check_port_range};
use chaosgen_core::error::PortError;
use chaosgen_core::metrics as m;
use rand::Rng;
use tracing::{debug, info, warn};

/// 포트 할당기
#[derive(Debug, Clone)]
pub struct PortManager {
    config: PortsConfig,
}

impl Default for PortManager {
    fn default() -> Self {
        Self::new(PortsConfig::default())
    }
}

impl PortManager {
    pub fn new(config: PortsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PortsConfig {
        &self.config
    }

    /// 다른 호스트 주소로 바인딩하는 할당기를 만듭니다.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// 포트에 바인딩할 수 있는지 확인합니다.
    pub fn is_port_available(&self, port: u16) -> bool {
        match TcpListener::bind((self.config.host.as_str(), port)) {
            Ok(_) => true,
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                debug!(port, "port already in use");
                false
            }
            Err(e) => {
                warn!(port, error = %e, "error checking port");
                false
            }
        }
    }

    /// 사용 가능한 포트를 찾습니다.
    pub fn find_available_port(&self, preferred: Option<u16>) -> Result<u16, PortError> {
        let result = self.search(preferred);
        let outcome = if result.is_ok() { "success" } else { "failure" };
        metrics::counter!(m::PORT_ALLOCATIONS_TOTAL, m::LABEL_RESULT => outcome).increment(1);
        result
    }

    fn search(&self, preferred: Option<u16>) -> Result<u16, PortError> {
        let default_port = self.config.default_port;
        let (start, end) = (self.config.range_start, self.config.range_end);

        if let Some(port) = preferred {
            if self.is_port_available(port) {
                info!(port, "using preferred port");
                return Ok(port);
            }
        }

        if preferred != Some(default_port) && self.is_port_available(default_port) {
            info!(port = default_port, "using default port");
            return Ok(default_port);
        }

        info!(default_port, "default port is in use, searching for alternative");
        for port in start..=end {
            if Some(port) == preferred || port == default_port {
                continue;
            }
            if self.is_port_available(port) {
                info!(port, "found available port in range");
                return Ok(port);
            }
        }

        // 검증되지 않은 설정은 범위가 뒤집혀 있을 수 있다
        if start <= end {
            warn!("no sequential ports available, trying random ports");
            let mut rng = rand::rng();
            for attempt in 1..=self.config.max_retries {
                let port = rng.random_range(start..=end);
                if self.is_port_available(port) {
                    info!(port, attempt, "found random available port");
                    return Ok(port);
                }
            }
        }

        match TcpListener::bind((self.config.host.as_str(), 0)).and_then(|l| l.local_addr()) {
            Ok(addr) => {
                info!(port = addr.port(), "using system-assigned port");
                Ok(addr.port())
            }
            Err(e) => {
                warn!(error = %e, "failed to get system-assigned port");
                Err(PortError::NoAvailablePort(format!(
                    "tried range {start}-{end} and {} random attempts",
                    self.config.max_retries
                )))
            }
        }
    }

    /// 카오스 도구 서버용 포트. 기본 포트가 아니면 경고를 남깁니다.
    pub fn port_for_chaos_server(&self) -> Result<u16, PortError> {
        let default_port = self.config.default_port;
        let port = self.find_available_port(Some(default_port))?;
        if port != default_port {
            warn!(
                default_port,
                port, "default chaos server port was not available, using alternative"
            );
        }
        Ok(port)
    }

    /// 포트별 사용 가능 여부
    pub fn check_port_conflicts(&self, ports: &[u16]) -> BTreeMap<u16, bool> {
        let results: BTreeMap<u16, bool> = ports
            .iter()
            .map(|&port| (port, self.is_port_available(port)))
            .collect();
        let available = results.values().filter(|&&ok| ok).count();
        info!(available, total = results.len(), "port availability check");
        results
    }
}

/// 포트 범위가 카오스 도구에 적합한지 검사합니다.
pub fn validate_port_range(start: u32, end: u32) -> Result<(), PortError> {
    check_port_range(start, end).inspect_err(|e| warn!(error = %e, "invalid port range"))
}

/// 실행 도구의 에러 출력이 포트 충돌을 가리키는지 확인합니다.
pub fn is_port_conflict(stderr: &str) -> bool {
    stderr.contains("Address already in use") || stderr.contains("[Errno 98]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback() -> PortManager {
        PortManager::default().with_host("127.0.0.1")
    }

    #[test]
    fn occupied_port_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(!loopback().is_port_available(port));
        drop(listener);
    }

    #[test]
    fn preferred_port_used_when_free() {
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        assert_eq!(loopback().find_available_port(Some(port)).unwrap(), port);
    }

    #[test]
    fn occupied_preferred_falls_back() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let taken = listener.local_addr().unwrap().port();
        let port = loopback().find_available_port(Some(taken)).unwrap();
        assert_ne!(port, taken);
    }

    #[test]
    fn inverted_range_skips_random_search() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let taken = listener.local_addr().unwrap().port();
        let manager = PortManager::new(PortsConfig {
            default_port: taken,
            range_start: 9100,
            range_end: 9000,
            max_retries: 5,
            ..PortsConfig::default()
        })
        .with_host("127.0.0.1");

        let port = manager.find_available_port(None).unwrap();
        assert_ne!(port, taken);
    }

    #[test]
    fn check_port_conflicts_reports_each_port() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let taken = listener.local_addr().unwrap().port();
        let results = loopback().check_port_conflicts(&[taken]);
        assert_eq!(results.get(&taken), Some(&false));
    }

    #[test]
    fn port_range_rules() {
        assert!(validate_port_range(8081, 8181).is_ok());
        assert!(validate_port_range(80, 8181).is_err());
        assert!(validate_port_range(8081, 70000).is_err());
        assert!(validate_port_range(9000, 9000).is_err());
        assert!(validate_port_range(9000, 9005).is_err());
    }

    #[test]
    fn detects_port_conflict_output() {
        assert!(is_port_conflict("OSError: [Errno 98] Address already in use"));
        assert!(!is_port_conflict("Traceback: KeyError 'kraken'"));
    }
}
