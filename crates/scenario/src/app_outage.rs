//! 애플리케이션 장애 빌더
//!
//! 대상 파드로의 트래픽을 NetworkPolicy로 차단합니다. 지속 시간은 최대 300초로
//! 제한되며, 더 긴 요청은 거부하지 않고 조용히 잘라냅니다.

use std::collections::BTreeMap;

use chaosgen_core::{ScenarioKind, TrafficDirection};
use serde::Deserialize;
use serde_json::Value;

use crate::config::ScenarioConfig;
use crate::error::ScenarioGenError;
use crate::generator::Scenario;
use crate::selector::string_map;

pub const APP_OUTAGE_TEMPLATE: &str = "openshift/app_outage.yml.j2";

/// 허용되는 최대 장애 지속 시간 (초)
pub const MAX_OUTAGE_SECONDS: u64 = 300;

type Labels = BTreeMap<String, String>;

/// 대상 파드 지정 방식. 출력 설정에는 둘 중 하나만 나타납니다.
#[derive(Debug, Clone, PartialEq)]
pub enum PodTargets {
    /// 단일 레이블 매핑 (`pod_selector`). 빈 매핑은 제한 없음.
    Singular(Labels),
    /// 그룹별 레이블 매핑 목록 (`pod_selectors`)
    Grouped(Vec<Labels>),
}

impl Default for PodTargets {
    fn default() -> Self {
        Self::Singular(Labels::new())
    }
}

impl PodTargets {
    /// 그룹 목록이 비어 있지 않으면 그룹, 아니면 단일 셀렉터를 사용합니다.
    pub fn resolve(single: Option<Labels>, groups: Option<Vec<Labels>>) -> Self {
        match groups {
            Some(groups) if !groups.is_empty() => Self::Grouped(groups),
            _ => Self::Singular(single.unwrap_or_default()),
        }
    }

    fn entry(&self) -> (&'static str, Value) {
        match self {
            Self::Singular(labels) => ("pod_selector", string_map(labels)),
            Self::Grouped(groups) => (
                "pod_selectors",
                Value::Array(groups.iter().map(string_map).collect()),
            ),
        }
    }
}

/// 애플리케이션 장애 시나리오
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "ApplicationOutageFields")]
pub struct ApplicationOutage {
    pub duration: u64,
    pub namespace: String,
    pub targets: PodTargets,
    /// 차단할 방향 (기본: Ingress, Egress)
    pub block: Vec<TrafficDirection>,
}

impl Default for ApplicationOutage {
    fn default() -> Self {
        Self {
            duration: 300,
            namespace: "default".to_owned(),
            targets: PodTargets::default(),
            block: vec![TrafficDirection::Ingress, TrafficDirection::Egress],
        }
    }
}

/// 계획 파일 입력 형태 (`pod_selector` / `pod_selectors`)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApplicationOutageFields {
    duration: Option<u64>,
    namespace: Option<String>,
    pod_selector: Option<Labels>,
    pod_selectors: Option<Vec<Labels>>,
    block: Option<Vec<TrafficDirection>>,
}

impl From<ApplicationOutageFields> for ApplicationOutage {
    fn from(fields: ApplicationOutageFields) -> Self {
        let defaults = Self::default();
        Self {
            duration: fields.duration.unwrap_or(defaults.duration),
            namespace: fields.namespace.unwrap_or(defaults.namespace),
            targets: PodTargets::resolve(fields.pod_selector, fields.pod_selectors),
            block: fields
                .block
                .filter(|b| !b.is_empty())
                .unwrap_or(defaults.block),
        }
    }
}

impl Scenario for ApplicationOutage {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::ApplicationOutage
    }

    fn template(&self) -> &'static str {
        APP_OUTAGE_TEMPLATE
    }

    fn build(&self) -> Result<ScenarioConfig, ScenarioGenError> {
        let block = if self.block.is_empty() {
            Self::default().block
        } else {
            self.block.clone()
        };
        let (key, selector) = self.targets.entry();

        Ok(ScenarioConfig::new()
            .with("duration", self.duration.min(MAX_OUTAGE_SECONDS))
            .with("namespace", self.namespace.clone())
            .with(
                "block",
                block.iter().map(|d| d.policy_type()).collect::<Vec<_>>(),
            )
            .with(key, selector))
    }

    fn file_name(&self, _config: &ScenarioConfig) -> String {
        "application_outage.yaml".to_owned()
    }
}
