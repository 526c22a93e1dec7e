//! 카오스 도구 설정 파일의 서버 포트 갱신
//!
//! 도구 설정은 `kraken` 섹션 아래에 `port`와 `signal_address`를 가집니다.
//! 포트 충돌로 실행이 실패하면 새 포트를 찾아 설정 파일에 다시 기록합니다.

use std::path::Path;

use chaosgen_core::error::PortError;
use serde_yaml::{Mapping, Value};
use tracing::{info, warn};

use crate::allocator::{PortManager, is_port_conflict};

/// 설정에 포트가 없을 때 도구가 사용하는 포트
pub const TOOL_DEFAULT_PORT: u16 = 8081;

/// 설정에 주소가 없을 때 도구가 바인딩하는 주소
pub const TOOL_DEFAULT_SIGNAL_ADDRESS: &str = "0.0.0.0";

const SECTION: &str = "kraken";

/// 포트 갱신 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRewrite {
    pub previous: u16,
    pub port: u16,
}

/// 도구 설정의 서버 바인딩 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerBinding {
    pub port: u16,
    pub signal_address: String,
}

fn load(path: &Path) -> Result<Value, PortError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| PortError::ConfigRewrite(format!("{}: {e}", path.display())))?;
    serde_yaml::from_str(&text)
        .map_err(|e| PortError::ConfigRewrite(format!("{}: {e}", path.display())))
}

fn section(doc: &Value) -> Option<&Mapping> {
    doc.get(SECTION).and_then(Value::as_mapping)
}

/// 도구 설정에서 현재 포트와 바인딩 주소를 읽습니다.
pub fn read_server_binding(path: impl AsRef<Path>) -> Result<ServerBinding, PortError> {
    let doc = load(path.as_ref())?;
    let kraken = section(&doc);

    let port = kraken
        .and_then(|k| k.get("port"))
        .and_then(Value::as_u64)
        .and_then(|p| u16::try_from(p).ok())
        .unwrap_or(TOOL_DEFAULT_PORT);
    let signal_address = kraken
        .and_then(|k| k.get("signal_address"))
        .and_then(Value::as_str)
        .unwrap_or(TOOL_DEFAULT_SIGNAL_ADDRESS)
        .to_owned();

    Ok(ServerBinding {
        port,
        signal_address,
    })
}

/// `kraken.port`를 `port`로 바꿔 설정 파일에 다시 기록합니다.
pub fn rewrite_server_port(path: impl AsRef<Path>, port: u16) -> Result<PortRewrite, PortError> {
    let path = path.as_ref();
    let previous = read_server_binding(path)?.port;
    let mut doc = load(path)?;

    let root = doc.as_mapping_mut().ok_or_else(|| {
        PortError::ConfigRewrite(format!("{}: document is not a mapping", path.display()))
    })?;
    let kraken = root
        .entry(Value::from(SECTION))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    let kraken = kraken.as_mapping_mut().ok_or_else(|| {
        PortError::ConfigRewrite(format!("{}: '{SECTION}' is not a mapping", path.display()))
    })?;
    kraken.insert(Value::from("port"), Value::from(port));

    let text = serde_yaml::to_string(&doc)
        .map_err(|e| PortError::ConfigRewrite(format!("{}: {e}", path.display())))?;
    std::fs::write(path, text)
        .map_err(|e| PortError::ConfigRewrite(format!("{}: {e}", path.display())))?;

    info!(previous, port, path = %path.display(), "chaos tool config port updated");
    Ok(PortRewrite { previous, port })
}

/// 실행 실패 출력이 포트 충돌이면 새 포트를 찾아 설정을 갱신합니다.
///
/// 충돌이 아니면 `Ok(None)`을 반환합니다.
pub fn resolve_port_conflict(
    manager: &PortManager,
    config_path: impl AsRef<Path>,
    stderr: &str,
) -> Result<Option<PortRewrite>, PortError> {
    if !is_port_conflict(stderr) {
        return Ok(None);
    }
    warn!("detected port conflict in chaos tool execution");

    let config_path = config_path.as_ref();
    let binding = read_server_binding(config_path)?;
    info!(port = binding.port, "current chaos tool config port");

    let port = manager
        .clone()
        .with_host(binding.signal_address)
        .find_available_port(None)?;
    rewrite_server_port(config_path, port).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn reads_defaults_when_section_missing() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "cerberus:\n  cerberus_enabled: false\n");
        let binding = read_server_binding(&path).unwrap();
        assert_eq!(binding.port, TOOL_DEFAULT_PORT);
        assert_eq!(binding.signal_address, TOOL_DEFAULT_SIGNAL_ADDRESS);
    }

    #[test]
    fn rewrite_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "kraken:\n  port: 8081\n  signal_address: 127.0.0.1\n  chaos_scenarios: []\ntunings:\n  wait_duration: 60\n",
        );
        let change = rewrite_server_port(&path, 8090).unwrap();
        assert_eq!(change, PortRewrite { previous: 8081, port: 8090 });

        let doc: Value = serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["kraken"]["port"], Value::from(8090));
        assert_eq!(doc["kraken"]["signal_address"], Value::from("127.0.0.1"));
        assert_eq!(doc["tunings"]["wait_duration"], Value::from(60));
    }

    #[test]
    fn rewrite_creates_section() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "tunings: {}\n");
        rewrite_server_port(&path, 8100).unwrap();
        assert_eq!(read_server_binding(&path).unwrap().port, 8100);
    }

    #[test]
    fn rewrite_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = rewrite_server_port(dir.path().join("absent.yaml"), 8100).unwrap_err();
        assert!(matches!(err, PortError::ConfigRewrite(_)));
    }

    #[test]
    fn non_conflict_output_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "kraken:\n  port: 8081\n");
        let outcome = resolve_port_conflict(&PortManager::default(), &path, "ImportError").unwrap();
        assert!(outcome.is_none());
        assert_eq!(read_server_binding(&path).unwrap().port, 8081);
    }
}
