//! 시나리오 계획 파일
//!
//! 여러 시나리오를 `kind` 태그로 나열한 YAML 문서입니다.
//!
//! ```yaml
//! scenario_dir: /tmp/chaos
//! scenarios:
//!   - kind: cpu_hog
//!     duration: 120
//!     node_name: worker-1
//!   - kind: container_pause
//!     namespace: openshift-storage
//!     pod_name: rook-ceph-mgr-a
//! ```
//!
//! `validate`는 파일을 기록하지 않고 모든 설정을 조립하며,
//! `apply`는 순서대로 기록하다가 첫 실패에서 멈춥니다.

use std::path::{Path, PathBuf};

use chaosgen_core::TrafficDirection;
use serde::Deserialize;
use tracing::{debug, info};

use crate::app_outage::ApplicationOutage;
use crate::container::{ContainerKill, ContainerKillSingle, ContainerPause};
use crate::error::ScenarioGenError;
use crate::generator::{Scenario, ScenarioGenerator};
use crate::hog::{CpuHog, IoHog, MemoryHog};
use crate::network::{NetworkChaosIngress, NodeNetworkChaos, PodNetworkOutage, PodShaping};
use crate::pod::RegexPodKill;

/// 계획 항목 (`kind` 태그)
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanEntry {
    CpuHog(CpuHog),
    IoHog(IoHog),
    MemoryHog(MemoryHog),
    ApplicationOutage(ApplicationOutage),
    PodEgressShaping(PodShaping),
    PodIngressShaping(PodShaping),
    PodNetworkOutage(PodNetworkOutage),
    NodeNetworkChaos(NodeNetworkChaos),
    NetworkChaosIngress(NetworkChaosIngress),
    RegexPodKill(RegexPodKill),
    ContainerKill(ContainerKill),
    ContainerKillSingle(ContainerKillSingle),
    ContainerPause(ContainerPause),
}

impl PlanEntry {
    /// 항목의 빌더
    pub fn scenario(&self) -> &dyn Scenario {
        match self {
            Self::CpuHog(s) => s,
            Self::IoHog(s) => s,
            Self::MemoryHog(s) => s,
            Self::ApplicationOutage(s) => s,
            Self::PodEgressShaping(s) | Self::PodIngressShaping(s) => s,
            Self::PodNetworkOutage(s) => s,
            Self::NodeNetworkChaos(s) => s,
            Self::NetworkChaosIngress(s) => s,
            Self::RegexPodKill(s) => s,
            Self::ContainerKill(s) => s,
            Self::ContainerKillSingle(s) => s,
            Self::ContainerPause(s) => s,
        }
    }

    /// 태그가 결정하는 필드를 반영합니다.
    fn normalize(&mut self) {
        match self {
            Self::PodEgressShaping(s) => s.direction = TrafficDirection::Egress,
            Self::PodIngressShaping(s) => s.direction = TrafficDirection::Ingress,
            _ => {}
        }
    }
}

/// 시나리오 계획
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Plan {
    /// 기본 출력 디렉토리 (호출 측 인자가 우선)
    pub scenario_dir: Option<PathBuf>,
    pub scenarios: Vec<PlanEntry>,
}

/// 검증 결과 항목
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedScenario {
    pub kind: String,
    pub file_name: String,
}

impl Plan {
    /// YAML 문자열을 파싱합니다. `source`는 에러 메시지용 이름입니다.
    pub fn from_yaml(yaml: &str, source: &str) -> Result<Self, ScenarioGenError> {
        let mut plan: Plan = serde_yaml::from_str(yaml).map_err(|e| ScenarioGenError::Plan {
            path: source.to_owned(),
            reason: e.to_string(),
        })?;
        plan.scenarios.iter_mut().for_each(PlanEntry::normalize);
        Ok(plan)
    }

    /// 계획 파일을 읽어 파싱합니다.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioGenError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ScenarioGenError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml, &path.display().to_string())
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// 모든 설정을 조립하여 기록될 파일명을 계산합니다. 첫 실패에서 멈춥니다.
    pub fn validate(&self) -> Result<Vec<PlannedScenario>, ScenarioGenError> {
        self.scenarios
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let scenario = entry.scenario();
                let config = scenario.build()?;
                let file_name = scenario.file_name(&config);
                debug!(index, kind = %scenario.kind(), file = %file_name, "plan entry valid");
                Ok(PlannedScenario {
                    kind: scenario.kind().to_string(),
                    file_name,
                })
            })
            .collect()
    }

    /// 모든 시나리오를 순서대로 기록합니다. 첫 실패에서 멈추며 이미 기록된 파일은 남습니다.
    pub fn apply(
        &self,
        generator: &ScenarioGenerator,
        scenario_dir: Option<&Path>,
    ) -> Result<Vec<PathBuf>, ScenarioGenError> {
        let dir = scenario_dir
            .or(self.scenario_dir.as_deref())
            .ok_or_else(|| ScenarioGenError::Plan {
                path: "<plan>".to_owned(),
                reason: "no scenario_dir given in plan or on the command line".to_owned(),
            })?;

        let mut written = Vec::with_capacity(self.scenarios.len());
        for entry in &self.scenarios {
            written.push(generator.generate(dir, entry.scenario())?);
        }
        info!(count = written.len(), dir = %dir.display(), "plan applied");
        Ok(written)
    }
}
