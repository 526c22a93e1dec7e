//! 에러 타입: 도메인별 에러 정의

/// chaosgen 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum ChaosgenError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 시나리오 생성 에러
    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// 포트 할당 에러
    #[error("port error: {0}")]
    Port(#[from] PortError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 시나리오 생성 에러
///
/// 파일을 쓰기 전에 발생하는 검증 실패와 템플릿/파일시스템 실패를 구분합니다.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// 필수 인자 누락 또는 잘못된 인자 (파일 기록 전에 발생)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// 템플릿 파일이 템플릿 루트에 없음
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// 템플릿 렌더링 실패
    #[error("render failed: {0}")]
    Render(String),

    /// 시나리오 계획 파일 처리 실패
    #[error("plan error: {0}")]
    Plan(String),
}

/// 포트 할당 에러
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// 사용 가능한 포트 없음
    #[error("no available port: {0}")]
    NoAvailablePort(String),

    /// 유효하지 않은 포트 범위
    #[error("invalid port range {start}-{end}: {reason}")]
    InvalidRange { start: u32, end: u32, reason: String },

    /// 카오스 도구 설정 파일의 포트 갱신 실패
    #[error("config rewrite failed: {0}")]
    ConfigRewrite(String),
}
