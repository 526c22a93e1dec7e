//! 시나리오 생성기 에러 타입
//!
//! [`ScenarioGenError`]는 시나리오 생성 중 발생하는 모든 에러를 표현합니다.
//! `From<ScenarioGenError> for ChaosgenError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use chaosgen_core::error::{ChaosgenError, ScenarioError};

/// 시나리오 생성 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ScenarioGenError {
    /// 필수 셀렉터/인자 누락. 항상 파일 기록 전에 발생합니다.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// 템플릿 루트에 템플릿 파일이 없음
    #[error("template not found: {path}")]
    TemplateNotFound {
        /// 찾지 못한 템플릿 경로
        path: String,
    },

    /// 템플릿 구문 오류 또는 렌더링 실패
    #[error("failed to render template '{template}': {reason}")]
    Render {
        /// 템플릿 이름
        template: String,
        /// 실패 사유
        reason: String,
    },

    /// 디렉토리 생성 또는 파일 기록 실패
    #[error("io error at {path}: {source}")]
    Io {
        /// 대상 경로
        path: String,
        /// 원본 I/O 에러
        #[source]
        source: std::io::Error,
    },

    /// 시나리오 계획 파일 로딩/파싱 실패
    #[error("plan error: {path}: {reason}")]
    Plan {
        /// 계획 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },
}

impl ScenarioGenError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }
}

impl From<ScenarioGenError> for ChaosgenError {
    fn from(err: ScenarioGenError) -> Self {
        match err {
            ScenarioGenError::InvalidArgument(msg) => {
                ChaosgenError::Scenario(ScenarioError::InvalidArgument(msg))
            }
            ScenarioGenError::TemplateNotFound { path } => {
                ChaosgenError::Scenario(ScenarioError::TemplateNotFound(path))
            }
            ScenarioGenError::Render { .. } => {
                ChaosgenError::Scenario(ScenarioError::Render(err.to_string()))
            }
            ScenarioGenError::Io { source, .. } => ChaosgenError::Io(source),
            ScenarioGenError::Plan { .. } => {
                ChaosgenError::Scenario(ScenarioError::Plan(err.to_string()))
            }
        }
    }
}
