//! 컨테이너 종료/일시정지 빌더
//!
//! 컨테이너 종료는 두 모드가 있으며 둘 다 `container_kill.yaml`에 기록합니다.
//! 두 모드는 한 디렉토리에서 함께 쓰지 않는 것을 전제로 합니다.
//!
//! - [`ContainerKill`]: 통합 모드. 시나리오 목록이 비어 있으면 내장 카탈로그 8종을 사용
//! - [`ContainerKillSingle`]: 단일 시나리오 모드. 네임스페이스와 파드 셀렉터 필수

use chaosgen_core::{LabelSelector, ScenarioKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ScenarioConfig;
use crate::error::ScenarioGenError;
use crate::generator::Scenario;
use crate::selector::{POD_SELECTOR_REQUIRED, has_pod_target, non_empty, pod_selector_config};

pub const CONTAINER_KILL_TEMPLATE: &str = "openshift/container_kill.yml.j2";
pub const CONTAINER_PAUSE_TEMPLATE: &str = "openshift/container_pause.yml.j2";

/// 카탈로그 기본 네임스페이스
pub const DEFAULT_STORAGE_NAMESPACE: &str = "openshift-storage";

/// 일시정지 시나리오의 대기 시간이 지정되지 않았을 때의 복구 시간 (초)
pub const DEFAULT_PAUSE_RECOVERY_SECONDS: u64 = 120;

const CONTAINER_KILL_FILE: &str = "container_kill.yaml";

/// 내장 스토리지 컴포넌트 카탈로그 (이름 접두어, 레이블 셀렉터, 설명)
///
/// OSD는 앞선 컴포넌트들을 점검하는 동안 방해하지 않도록 항상 마지막이다.
pub const COMPONENT_CATALOG: [(&str, &str, &str); 8] = [
    (
        "nodeplugin",
        "app=openshift-storage.cephfs.csi.ceph.com-nodeplugin",
        "CephFS Node Plugin",
    ),
    ("mgr", "app=rook-ceph-mgr", "MGR"),
    (
        "rbd_nodeplugin",
        "app=openshift-storage.rbd.csi.ceph.com-nodeplugin",
        "RBD Node Plugin",
    ),
    ("rgw", "app=rook-ceph-rgw", "RGW (RADOS Gateway)"),
    ("noobaa", "app=noobaa", "NooBaa"),
    (
        "cephfs_ctrlplugin",
        "app=openshift-storage.cephfs.csi.ceph.com-ctrlplugin",
        "CephFS Control Plugin",
    ),
    (
        "rbd_ctrlplugin",
        "app=openshift-storage.rbd.csi.ceph.com-ctrlplugin",
        "RBD Control Plugin",
    ),
    ("osd", "app=rook-ceph-osd", "OSD"),
];

/// 통합 모드의 컴포넌트별 종료 시나리오
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerKillEntry {
    pub name: String,
    pub namespace: String,
    pub label_selector: String,
    #[serde(default)]
    pub container_name: String,
    #[serde(default = "default_signal")]
    pub kill_signal: String,
    #[serde(default = "one")]
    pub count: u32,
    #[serde(default)]
    pub expected_recovery_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_signal() -> String {
    "SIGKILL".to_owned()
}

fn one() -> u32 {
    1
}

/// 컨테이너 종료 (통합 모드)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerKill {
    /// 카탈로그 항목의 네임스페이스 (기본: openshift-storage)
    pub namespace: Option<String>,
    /// 빈 문자열이면 임의 컨테이너
    pub container_name: String,
    pub kill_signal: String,
    pub instance_count: u32,
    pub wait_duration: u64,
    /// 비어 있으면 내장 카탈로그를 사용
    pub scenarios: Vec<ContainerKillEntry>,
}

impl Default for ContainerKill {
    fn default() -> Self {
        Self {
            namespace: None,
            container_name: String::new(),
            kill_signal: default_signal(),
            instance_count: 1,
            wait_duration: 300,
            scenarios: Vec::new(),
        }
    }
}

impl ContainerKill {
    /// 내장 카탈로그 8종을 현재 파라미터로 채워 반환합니다.
    pub fn catalog(&self) -> Vec<ContainerKillEntry> {
        let namespace = non_empty(self.namespace.as_deref()).unwrap_or(DEFAULT_STORAGE_NAMESPACE);
        let signal = self.kill_signal.to_lowercase();

        COMPONENT_CATALOG
            .iter()
            .map(|(prefix, label, description)| ContainerKillEntry {
                name: format!("{prefix}_{signal}_kill"),
                namespace: namespace.to_owned(),
                label_selector: (*label).to_owned(),
                container_name: self.container_name.clone(),
                kill_signal: self.kill_signal.clone(),
                count: self.instance_count,
                expected_recovery_time: self.wait_duration / 2,
                description: Some((*description).to_owned()),
            })
            .collect()
    }

    /// 실제로 렌더링될 시나리오 목록
    pub fn entries(&self) -> Vec<ContainerKillEntry> {
        if self.scenarios.is_empty() {
            self.catalog()
        } else {
            self.scenarios.clone()
        }
    }
}

impl Scenario for ContainerKill {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::ContainerKill
    }

    fn template(&self) -> &'static str {
        CONTAINER_KILL_TEMPLATE
    }

    fn build(&self) -> Result<ScenarioConfig, ScenarioGenError> {
        let scenarios = serde_json::to_value(self.entries()).map_err(|e| {
            ScenarioGenError::invalid(format!("container kill scenarios: {e}"))
        })?;
        Ok(ScenarioConfig::new().with("scenarios", scenarios))
    }

    fn file_name(&self, _config: &ScenarioConfig) -> String {
        CONTAINER_KILL_FILE.to_owned()
    }
}

/// 컨테이너 종료 (단일 시나리오 모드)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerKillSingle {
    pub namespace: String,
    pub pod_name: Option<String>,
    pub label_selector: Option<LabelSelector>,
    pub container_name: String,
    pub kill_signal: String,
    pub instance_count: u32,
    pub wait_duration: u64,
}

impl Default for ContainerKillSingle {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            pod_name: None,
            label_selector: None,
            container_name: String::new(),
            kill_signal: default_signal(),
            instance_count: 1,
            wait_duration: 300,
        }
    }
}

impl Scenario for ContainerKillSingle {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::ContainerKill
    }

    fn template(&self) -> &'static str {
        CONTAINER_KILL_TEMPLATE
    }

    fn build(&self) -> Result<ScenarioConfig, ScenarioGenError> {
        if self.namespace.trim().is_empty() {
            return Err(ScenarioGenError::invalid(
                "namespace is required for single scenario",
            ));
        }
        if !has_pod_target(self.pod_name.as_deref(), self.label_selector.as_ref()) {
            return Err(ScenarioGenError::invalid(format!(
                "{POD_SELECTOR_REQUIRED} for single scenario"
            )));
        }
        let selector =
            pod_selector_config(self.pod_name.as_deref(), self.label_selector.as_ref())?;

        let mut config = ScenarioConfig::new()
            .with("namespace", self.namespace.clone())
            .with("container_name", self.container_name.clone())
            .with("kill_signal", self.kill_signal.clone())
            .with("instance_count", self.instance_count)
            .with("wait_duration", self.wait_duration);
        config.merge(selector);
        Ok(config)
    }

    fn file_name(&self, _config: &ScenarioConfig) -> String {
        CONTAINER_KILL_FILE.to_owned()
    }
}

/// 컨테이너 일시정지
///
/// 파드 이름만 주어지면 `metadata.name=<pod>` 레이블 표현식으로 바꿉니다.
/// 복구 시간은 명시적 `expected_recovery_time` > 명시적 `wait_duration` > 120초 순서로 결정됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerPause {
    pub namespace: String,
    pub label_selector: Option<LabelSelector>,
    pub pod_name: Option<String>,
    pub container_name: String,
    pub pause_seconds: u64,
    pub instance_count: u32,
    pub wait_duration: Option<u64>,
    pub scenario_name: Option<String>,
    pub expected_recovery_time: Option<u64>,
}

impl Default for ContainerPause {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            label_selector: None,
            pod_name: None,
            container_name: String::new(),
            pause_seconds: 60,
            instance_count: 1,
            wait_duration: None,
            scenario_name: None,
            expected_recovery_time: None,
        }
    }
}

impl ContainerPause {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// 템플릿이 이해하는 레이블 표현식
    fn selector_expression(&self) -> Result<String, ScenarioGenError> {
        match &self.label_selector {
            Some(selector) if !selector.is_empty() => Ok(selector.to_expression()),
            _ => non_empty(self.pod_name.as_deref())
                .map(|pod| format!("metadata.name={pod}"))
                .ok_or_else(|| ScenarioGenError::invalid(POD_SELECTOR_REQUIRED)),
        }
    }

    pub fn recovery_time(&self) -> u64 {
        self.expected_recovery_time
            .or(self.wait_duration)
            .unwrap_or(DEFAULT_PAUSE_RECOVERY_SECONDS)
    }
}

impl Scenario for ContainerPause {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::ContainerPause
    }

    fn template(&self) -> &'static str {
        CONTAINER_PAUSE_TEMPLATE
    }

    fn build(&self) -> Result<ScenarioConfig, ScenarioGenError> {
        if self.namespace.trim().is_empty() {
            return Err(ScenarioGenError::invalid("namespace is required"));
        }
        let expression = self.selector_expression()?;

        let scenario_name = match non_empty(self.scenario_name.as_deref()) {
            Some(name) => name.to_owned(),
            None => {
                let component = expression
                    .rsplit_once('=')
                    .map_or("container", |(_, rhs)| rhs);
                format!("container_pause_{component}_{}s", self.pause_seconds)
            }
        };

        Ok(ScenarioConfig::new()
            .with("scenario_name", scenario_name)
            .with("namespace", self.namespace.clone())
            .with("label_selector", Value::from(expression))
            .with("container_name", self.container_name.clone())
            .with("pause_seconds", self.pause_seconds)
            .with("count", self.instance_count)
            .with("expected_recovery_time", self.recovery_time()))
    }

    fn file_name(&self, _config: &ScenarioConfig) -> String {
        "container_pause.yaml".to_owned()
    }
}
