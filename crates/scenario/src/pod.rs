//! 정규식 기반 파드 종료 빌더

use chaosgen_core::ScenarioKind;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ScenarioConfig;
use crate::error::ScenarioGenError;
use crate::generator::Scenario;

pub const REGEX_POD_KILL_TEMPLATE: &str = "openshift/regex_openshift_pod_kill.yml.j2";

/// 네임스페이스/이름 패턴에 맞는 파드를 종료합니다.
///
/// 패턴은 기본값이 항상 있으므로 셀렉터 전제 조건이 없습니다.
/// 컴파일되지 않는 패턴은 기록 전에 `InvalidArgument`로 거부합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegexPodKill {
    pub namespace_pattern: String,
    pub name_pattern: String,
    /// 종료할 파드 수
    pub kill: u32,
    pub krkn_pod_recovery_time: u64,
}

impl Default for RegexPodKill {
    fn default() -> Self {
        Self {
            namespace_pattern: "^openshift-storage$".to_owned(),
            name_pattern: ".*".to_owned(),
            kill: 3,
            krkn_pod_recovery_time: 300,
        }
    }
}

fn check_pattern(field: &str, pattern: &str) -> Result<(), ScenarioGenError> {
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| ScenarioGenError::invalid(format!("{field} is not a valid regex: {e}")))
}

impl Scenario for RegexPodKill {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::RegexPodKill
    }

    fn template(&self) -> &'static str {
        REGEX_POD_KILL_TEMPLATE
    }

    fn build(&self) -> Result<ScenarioConfig, ScenarioGenError> {
        check_pattern("namespace_pattern", &self.namespace_pattern)?;
        check_pattern("name_pattern", &self.name_pattern)?;

        Ok(ScenarioConfig::new()
            .with("namespace_pattern", self.namespace_pattern.clone())
            .with("name_pattern", self.name_pattern.clone())
            .with("kill", self.kill)
            .with("krkn_pod_recovery_time", self.krkn_pod_recovery_time))
    }

    fn file_name(&self, _config: &ScenarioConfig) -> String {
        "regex_openshift_pod_kill.yaml".to_owned()
    }
}
