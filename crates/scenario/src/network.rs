//! 네트워크 장애/카오스 빌더
//!
//! 네 가지 연산은 파일명 정책이 각각 다릅니다.
//!
//! | 빌더 | 파일명 |
//! |------|--------|
//! | [`PodShaping`] | 방향별 고정 (`pod_egress_shaping.yaml`, `pod_ingress_shaping.yaml`) |
//! | [`PodNetworkOutage`] | 방향 + 포트 설명자, 길면 설정 다이제스트 |
//! | [`NodeNetworkChaos`] | 항상 설정 다이제스트 (`network_chaos_{hash8}.yaml`) |
//! | [`NetworkChaosIngress`] | 고정 (`network_chaos_ingress.yaml`) |

use std::collections::{BTreeMap, BTreeSet};

use chaosgen_core::{ExecutionMode, LabelSelector, ScenarioKind, TrafficDirection};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ScenarioConfig;
use crate::error::ScenarioGenError;
use crate::generator::Scenario;
use crate::naming::{
    CONFIG_HASH_LEN, MAX_BASE_NAME_LEN, NETWORK_CHAOS_HASH_LEN, bounded_name,
    canonical_json, port_descriptor, short_digest,
};
use crate::selector::{non_empty, pod_selector_config, string_map};

pub const POD_EGRESS_SHAPING_TEMPLATE: &str = "openshift/pod_egress_shaping.yml.j2";
pub const POD_INGRESS_SHAPING_TEMPLATE: &str = "openshift/pod_ingress_shaping.yml.j2";
pub const POD_NETWORK_OUTAGE_TEMPLATE: &str = "openshift/pod_network_outage.yml.j2";
pub const NETWORK_CHAOS_TEMPLATE: &str = "openshift/network_chaos.yml.j2";
pub const NETWORK_CHAOS_INGRESS_TEMPLATE: &str = "openshift/network_chaos_ingress.yml.j2";

/// 컨트롤 플레인 노드를 피하기 위한 기본 노드 레이블
pub const WORKER_NODE_LABEL: &str = "node-role.kubernetes.io/worker";

/// 노드 네트워크 카오스 기본 이미지
pub const DEFAULT_NETWORK_CHAOS_IMAGE: &str = "quay.io/krkn-chaos/krkn:tools";

/// 노드 네트워크 카오스 기본 인터페이스
pub const DEFAULT_INTERFACE: &str = "ens192";

type Impairment = BTreeMap<String, String>;

fn impairment(pairs: &[(&str, &str)]) -> Impairment {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

fn or_default(params: &Impairment, default: fn() -> Impairment) -> Value {
    if params.is_empty() {
        string_map(&default())
    } else {
        string_map(params)
    }
}

fn require_namespace(namespace: &str) -> Result<(), ScenarioGenError> {
    if namespace.trim().is_empty() {
        return Err(ScenarioGenError::invalid("namespace is required"));
    }
    Ok(())
}

// ─── Pod shaping ────────────────────────────────────────────────────

/// 파드 트래픽 셰이핑 기본 파라미터
pub fn default_shaping_params() -> Impairment {
    impairment(&[("latency", "50ms"), ("loss", "0.02%"), ("bandwidth", "100mbit")])
}

fn egress() -> TrafficDirection {
    TrafficDirection::Egress
}

/// 파드 송신/수신 트래픽 셰이핑
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodShaping {
    /// 계획 파일에서는 종류 태그로 결정됩니다.
    #[serde(skip, default = "egress")]
    pub direction: TrafficDirection,
    pub namespace: String,
    pub pod_name: Option<String>,
    pub label_selector: Option<LabelSelector>,
    /// 지연, 손실률, 대역폭
    pub network_params: Impairment,
    pub execution_type: ExecutionMode,
    pub instance_count: u32,
    pub wait_duration: u64,
    pub test_duration: u64,
}

impl Default for PodShaping {
    fn default() -> Self {
        Self {
            direction: TrafficDirection::Egress,
            namespace: String::new(),
            pod_name: None,
            label_selector: None,
            network_params: default_shaping_params(),
            execution_type: ExecutionMode::Parallel,
            instance_count: 1,
            wait_duration: 300,
            test_duration: 120,
        }
    }
}

impl PodShaping {
    pub fn egress(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn ingress(namespace: impl Into<String>) -> Self {
        Self::egress(namespace).with_direction(TrafficDirection::Ingress)
    }

    pub fn with_direction(mut self, direction: TrafficDirection) -> Self {
        self.direction = direction;
        self
    }
}

impl Scenario for PodShaping {
    fn kind(&self) -> ScenarioKind {
        match self.direction {
            TrafficDirection::Egress => ScenarioKind::PodEgressShaping,
            TrafficDirection::Ingress => ScenarioKind::PodIngressShaping,
        }
    }

    fn template(&self) -> &'static str {
        match self.direction {
            TrafficDirection::Egress => POD_EGRESS_SHAPING_TEMPLATE,
            TrafficDirection::Ingress => POD_INGRESS_SHAPING_TEMPLATE,
        }
    }

    fn build(&self) -> Result<ScenarioConfig, ScenarioGenError> {
        require_namespace(&self.namespace)?;
        let selector =
            pod_selector_config(self.pod_name.as_deref(), self.label_selector.as_ref())?;

        let mut config = ScenarioConfig::new()
            .with("namespace", self.namespace.clone())
            .with(
                "network_params",
                or_default(&self.network_params, default_shaping_params),
            )
            .with("execution_type", self.execution_type.as_str())
            .with("instance_count", self.instance_count)
            .with("wait_duration", self.wait_duration)
            .with("test_duration", self.test_duration);
        config.merge(selector);
        Ok(config)
    }

    fn file_name(&self, _config: &ScenarioConfig) -> String {
        format!("pod_{}_shaping.yaml", self.direction.tag())
    }
}

// ─── Pod network outage ─────────────────────────────────────────────

/// 파드 포트 차단 (양방향)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodNetworkOutage {
    pub namespace: String,
    /// 필터를 적용할 방향 (기본: egress, ingress)
    pub direction: Vec<TrafficDirection>,
    pub ingress_ports: Vec<u16>,
    pub egress_ports: Vec<u16>,
    pub pod_name: Option<String>,
    pub label_selector: Option<LabelSelector>,
    pub instance_count: u32,
    pub wait_duration: u64,
    pub test_duration: u64,
}

impl Default for PodNetworkOutage {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            direction: vec![TrafficDirection::Egress, TrafficDirection::Ingress],
            ingress_ports: Vec::new(),
            egress_ports: Vec::new(),
            pod_name: None,
            label_selector: None,
            instance_count: 1,
            wait_duration: 300,
            test_duration: 120,
        }
    }
}

impl PodNetworkOutage {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    fn directions(&self) -> Vec<TrafficDirection> {
        if self.direction.is_empty() {
            Self::default().direction
        } else {
            self.direction.clone()
        }
    }
}

/// 정렬, 중복 제거된 방향 태그를 `_`로 연결합니다.
fn direction_label(config: &ScenarioConfig) -> String {
    let tags: BTreeSet<&str> = config
        .get("direction")
        .and_then(Value::as_array)
        .map(|dirs| dirs.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    tags.into_iter().collect::<Vec<_>>().join("_")
}

fn ports_of(config: &ScenarioConfig, key: &str) -> Vec<u16> {
    config
        .get(key)
        .and_then(Value::as_array)
        .map(|ports| {
            ports
                .iter()
                .filter_map(Value::as_u64)
                .filter_map(|p| u16::try_from(p).ok())
                .collect()
        })
        .unwrap_or_default()
}

impl Scenario for PodNetworkOutage {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::PodNetworkOutage
    }

    fn template(&self) -> &'static str {
        POD_NETWORK_OUTAGE_TEMPLATE
    }

    fn build(&self) -> Result<ScenarioConfig, ScenarioGenError> {
        require_namespace(&self.namespace)?;
        let selector =
            pod_selector_config(self.pod_name.as_deref(), self.label_selector.as_ref())?;

        let directions: Vec<&str> = self.directions().iter().map(|d| d.tag()).collect();
        let mut config = ScenarioConfig::new()
            .with("namespace", self.namespace.clone())
            .with("direction", directions)
            .with("ingress_ports", self.ingress_ports.clone())
            .with("egress_ports", self.egress_ports.clone())
            .with("instance_count", self.instance_count)
            .with("wait_duration", self.wait_duration)
            .with("test_duration", self.test_duration);
        config.merge(selector);
        Ok(config)
    }

    /// 방향과 포트로 읽기 쉬운 이름을 만들고, 200자를 넘으면 설정 다이제스트로 대체합니다.
    fn file_name(&self, config: &ScenarioConfig) -> String {
        let dirs = direction_label(config);
        let readable = format!(
            "pod_network_outage_{dirs}{}{}",
            port_descriptor("ingress", &ports_of(config, "ingress_ports")),
            port_descriptor("egress", &ports_of(config, "egress_ports")),
        );

        let base = bounded_name(readable, MAX_BASE_NAME_LEN, || {
            let hashed: serde_json::Map<String, Value> = [
                "direction",
                "ingress_ports",
                "egress_ports",
                "instance_count",
                "wait_duration",
                "test_duration",
            ]
            .into_iter()
            .map(|k| (k.to_owned(), config.get(k).cloned().unwrap_or(Value::Null)))
            .collect();
            let digest = short_digest(&canonical_json(&Value::Object(hashed)), CONFIG_HASH_LEN);
            format!("pod_network_outage_{dirs}_{digest}")
        });
        format!("{base}.yaml")
    }
}

// ─── Node network chaos ─────────────────────────────────────────────

pub fn default_node_egress() -> Impairment {
    impairment(&[("latency", "25ms"), ("loss", "1%")])
}

/// 노드 수준 네트워크 카오스 (송신 지연/손실)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeNetworkChaos {
    pub duration: u64,
    pub node_name: Option<String>,
    /// 노드 레이블 셀렉터 표현식 (둘 다 없으면 워커 노드)
    pub label_selector: Option<String>,
    pub instance_count: u32,
    /// 호스트 네트워크 인터페이스
    pub interfaces: Vec<String>,
    pub execution: ExecutionMode,
    pub egress: Impairment,
    pub image: String,
}

impl Default for NodeNetworkChaos {
    fn default() -> Self {
        Self {
            duration: 300,
            node_name: None,
            label_selector: None,
            instance_count: 1,
            interfaces: vec![DEFAULT_INTERFACE.to_owned()],
            execution: ExecutionMode::Serial,
            egress: default_node_egress(),
            image: DEFAULT_NETWORK_CHAOS_IMAGE.to_owned(),
        }
    }
}

impl Scenario for NodeNetworkChaos {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::NodeNetworkChaos
    }

    fn template(&self) -> &'static str {
        NETWORK_CHAOS_TEMPLATE
    }

    fn build(&self) -> Result<ScenarioConfig, ScenarioGenError> {
        let interfaces = if self.interfaces.is_empty() {
            vec![DEFAULT_INTERFACE.to_owned()]
        } else {
            self.interfaces.clone()
        };
        let image = non_empty(Some(self.image.as_str())).unwrap_or(DEFAULT_NETWORK_CHAOS_IMAGE);

        let config = ScenarioConfig::new()
            .with("duration", self.duration)
            .with("instance_count", self.instance_count)
            .with("interfaces", interfaces)
            .with("execution", self.execution.as_str())
            .with("egress", or_default(&self.egress, default_node_egress))
            .with("image", image);

        // 노드 이름과 레이블 셀렉터는 동시에 나타나지 않는다
        let config = match (
            non_empty(self.node_name.as_deref()),
            non_empty(self.label_selector.as_deref()),
        ) {
            (Some(name), _) => config.with("node_name", name),
            (None, Some(label)) => config.with("label_selector", label),
            (None, None) => config.with("label_selector", WORKER_NODE_LABEL),
        };
        Ok(config)
    }

    fn file_name(&self, config: &ScenarioConfig) -> String {
        format!(
            "network_chaos_{}.yaml",
            short_digest(&config.canonical_json(), NETWORK_CHAOS_HASH_LEN)
        )
    }
}

// ─── Network chaos ingress ──────────────────────────────────────────

pub fn default_ingress_params() -> Impairment {
    impairment(&[("latency", "50ms"), ("loss", "5%")])
}

/// 다중 노드/인터페이스 수신 네트워크 카오스
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkChaosIngress {
    /// 노드 이름 → 인터페이스 목록
    pub node_interface_name: Option<BTreeMap<String, Vec<String>>>,
    pub label_selector: Option<String>,
    pub instance_count: u32,
    pub kubeconfig_path: Option<String>,
    pub execution_type: ExecutionMode,
    pub network_params: Impairment,
    pub wait_duration: u64,
    pub test_duration: u64,
    /// 헬스 체크 도구 설정 경로
    pub kraken_config: Option<String>,
}

impl Default for NetworkChaosIngress {
    fn default() -> Self {
        Self {
            node_interface_name: None,
            label_selector: None,
            instance_count: 1,
            kubeconfig_path: None,
            execution_type: ExecutionMode::Parallel,
            network_params: default_ingress_params(),
            wait_duration: 300,
            test_duration: 120,
            kraken_config: None,
        }
    }
}

impl Scenario for NetworkChaosIngress {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::NetworkChaosIngress
    }

    fn template(&self) -> &'static str {
        NETWORK_CHAOS_INGRESS_TEMPLATE
    }

    fn build(&self) -> Result<ScenarioConfig, ScenarioGenError> {
        let interfaces = self
            .node_interface_name
            .as_ref()
            .filter(|m| !m.is_empty());
        let label = match (interfaces, non_empty(self.label_selector.as_deref())) {
            (_, Some(label)) => Value::from(label),
            (None, None) => Value::from(WORKER_NODE_LABEL),
            (Some(_), None) => Value::Null,
        };
        let interfaces = interfaces.map_or(Value::Null, |m| {
            Value::Object(
                m.iter()
                    .map(|(node, ifaces)| (node.clone(), Value::from(ifaces.clone())))
                    .collect(),
            )
        });

        Ok(ScenarioConfig::new()
            .with("node_interface_name", interfaces)
            .with("label_selector", label)
            .with("instance_count", self.instance_count)
            .with("kubeconfig_path", self.kubeconfig_path.clone())
            .with("execution_type", self.execution_type.as_str())
            .with(
                "network_params",
                or_default(&self.network_params, default_ingress_params),
            )
            .with("wait_duration", self.wait_duration)
            .with("test_duration", self.test_duration)
            .with("kraken_config", self.kraken_config.clone()))
    }

    fn file_name(&self, _config: &ScenarioConfig) -> String {
        "network_chaos_ingress.yaml".to_owned()
    }
}
