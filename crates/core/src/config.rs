//! 설정 관리: chaosgen.toml 파싱 및 런타임 설정
//!
//! [`ChaosgenConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`CHAOSGEN_SCENARIO_TEMPLATE_DIR=/opt/templates` 형식)
//! 3. 설정 파일 (`chaosgen.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), chaosgen_core::error::ChaosgenError> {
//! use chaosgen_core::config::ChaosgenConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = ChaosgenConfig::load("chaosgen.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = ChaosgenConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ChaosgenError, ConfigError, PortError};

/// 특권 포트 상한 (이 값 미만은 사용하지 않음)
pub const MIN_UNPRIVILEGED_PORT: u32 = 1024;
/// 최대 포트 번호
pub const MAX_PORT: u32 = 65535;
/// 포트 범위의 최소 크기
pub const MIN_PORT_RANGE_SIZE: u32 = 10;

/// chaosgen 통합 설정
///
/// `chaosgen.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 크레이트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChaosgenConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 시나리오 생성 설정
    #[serde(default)]
    pub scenario: GeneratorConfig,
    /// 카오스 서버 포트 설정
    #[serde(default)]
    pub ports: PortsConfig,
}

impl ChaosgenConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ChaosgenError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ChaosgenError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ChaosgenError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                ChaosgenError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값에 환경변수 오버라이드만 적용합니다.
    ///
    /// CLI는 `chaosgen.toml` 없이도 동작해야 하므로 `FileNotFound`만 허용합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ChaosgenError> {
        match Self::load(path).await {
            Err(ChaosgenError::Config(ConfigError::FileNotFound { .. })) => {
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, ChaosgenError> {
        toml::from_str(toml_str).map_err(|e| {
            ChaosgenError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `CHAOSGEN_{SECTION}_{FIELD}`
    /// 예: `CHAOSGEN_PORTS_DEFAULT_PORT=9090`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "CHAOSGEN_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "CHAOSGEN_GENERAL_LOG_FORMAT");

        // Scenario
        override_string(
            &mut self.scenario.template_dir,
            "CHAOSGEN_SCENARIO_TEMPLATE_DIR",
        );
        override_string(&mut self.scenario.output_dir, "CHAOSGEN_SCENARIO_OUTPUT_DIR");
        override_string(
            &mut self.scenario.storage_namespace,
            "CHAOSGEN_SCENARIO_STORAGE_NAMESPACE",
        );

        // Ports
        override_string(&mut self.ports.host, "CHAOSGEN_PORTS_HOST");
        override_u16(&mut self.ports.default_port, "CHAOSGEN_PORTS_DEFAULT_PORT");
        override_u16(&mut self.ports.range_start, "CHAOSGEN_PORTS_RANGE_START");
        override_u16(&mut self.ports.range_end, "CHAOSGEN_PORTS_RANGE_END");
        override_u32(&mut self.ports.max_retries, "CHAOSGEN_PORTS_MAX_RETRIES");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ChaosgenError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.scenario.template_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scenario.template_dir".to_owned(),
                reason: "template_dir must not be empty".to_owned(),
            }
            .into());
        }

        if self.scenario.output_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scenario.output_dir".to_owned(),
                reason: "output_dir must not be empty".to_owned(),
            }
            .into());
        }

        check_port_range(
            u32::from(self.ports.range_start),
            u32::from(self.ports.range_end),
        )
        .map_err(|e| ConfigError::InvalidValue {
            field: "ports.range_start/range_end".to_owned(),
            reason: e.to_string(),
        })?;

        if self.ports.default_port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ports.default_port".to_owned(),
                reason: "default_port must be non-zero".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 시나리오 생성 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// 템플릿 루트 디렉토리 (`kube/`, `openshift/` 하위 디렉토리 포함)
    pub template_dir: String,
    /// 시나리오 파일 기본 출력 디렉토리
    pub output_dir: String,
    /// 스토리지 컴포넌트가 배포된 네임스페이스
    pub storage_namespace: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            template_dir: "templates".to_owned(),
            output_dir: "/tmp/chaosgen/scenarios".to_owned(),
            storage_namespace: "openshift-storage".to_owned(),
        }
    }
}

/// 카오스 서버 포트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortsConfig {
    /// 바인딩 주소
    pub host: String,
    /// 기본 포트
    pub default_port: u16,
    /// 탐색 범위 시작
    pub range_start: u16,
    /// 탐색 범위 끝 (포함)
    pub range_end: u16,
    /// 무작위 탐색 최대 시도 횟수
    pub max_retries: u32,
}

impl Default for PortsConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            default_port: 8081,
            range_start: 8081,
            range_end: 8181,
            max_retries: 10,
        }
    }
}

/// 포트 범위 규칙을 검사합니다.
///
/// 시작 포트는 1024 이상, 끝 포트는 65535 이하, 시작 < 끝,
/// 범위 크기는 10 이상이어야 합니다.
pub fn check_port_range(start: u32, end: u32) -> Result<(), PortError> {
    let invalid = |reason: String| PortError::InvalidRange { start, end, reason };

    if start < MIN_UNPRIVILEGED_PORT {
        return Err(invalid(format!(
            "start port is in privileged range (< {MIN_UNPRIVILEGED_PORT})"
        )));
    }
    if end > MAX_PORT {
        return Err(invalid(format!(
            "end port exceeds maximum port number ({MAX_PORT})"
        )));
    }
    if start >= end {
        return Err(invalid("start port must be lower than end port".to_owned()));
    }
    if end - start < MIN_PORT_RANGE_SIZE {
        return Err(invalid(format!(
            "range too small: {} ports (min: {MIN_PORT_RANGE_SIZE})",
            end - start
        )));
    }
    Ok(())
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}
