//! 도메인 타입: 워크스페이스 전역에서 사용되는 공통 타입
//!
//! 시나리오 종류, 트래픽 방향, 실행 모드, 레이블 셀렉터를 정의합니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 시나리오 종류
///
/// 빌더 하나가 정확히 하나의 종류를 생성합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    CpuHog,
    IoHog,
    MemoryHog,
    ApplicationOutage,
    PodEgressShaping,
    PodIngressShaping,
    PodNetworkOutage,
    NodeNetworkChaos,
    NetworkChaosIngress,
    RegexPodKill,
    ContainerKill,
    ContainerPause,
}

impl ScenarioKind {
    /// 모든 시나리오 종류 (정의 순서)
    pub const ALL: [ScenarioKind; 12] = [
        Self::CpuHog,
        Self::IoHog,
        Self::MemoryHog,
        Self::ApplicationOutage,
        Self::PodEgressShaping,
        Self::PodIngressShaping,
        Self::PodNetworkOutage,
        Self::NodeNetworkChaos,
        Self::NetworkChaosIngress,
        Self::RegexPodKill,
        Self::ContainerKill,
        Self::ContainerPause,
    ];

    /// 메트릭 레이블 및 로그 필드로 사용하는 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CpuHog => "cpu_hog",
            Self::IoHog => "io_hog",
            Self::MemoryHog => "memory_hog",
            Self::ApplicationOutage => "application_outage",
            Self::PodEgressShaping => "pod_egress_shaping",
            Self::PodIngressShaping => "pod_ingress_shaping",
            Self::PodNetworkOutage => "pod_network_outage",
            Self::NodeNetworkChaos => "node_network_chaos",
            Self::NetworkChaosIngress => "network_chaos_ingress",
            Self::RegexPodKill => "regex_pod_kill",
            Self::ContainerKill => "container_kill",
            Self::ContainerPause => "container_pause",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 트래픽 방향
///
/// 애플리케이션 장애 시나리오는 NetworkPolicy 표기(`Ingress`/`Egress`)를,
/// 파드 네트워크 장애 시나리오는 소문자 태그(`ingress`/`egress`)를 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficDirection {
    #[serde(alias = "Ingress")]
    Ingress,
    #[serde(alias = "Egress")]
    Egress,
}

impl TrafficDirection {
    /// 소문자 태그 (`ingress`, `egress`)
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Ingress => "ingress",
            Self::Egress => "egress",
        }
    }

    /// NetworkPolicy 표기 (`Ingress`, `Egress`)
    pub fn policy_type(&self) -> &'static str {
        match self {
            Self::Ingress => "Ingress",
            Self::Egress => "Egress",
        }
    }
}

impl fmt::Display for TrafficDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for TrafficDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ingress" => Ok(Self::Ingress),
            "egress" => Ok(Self::Egress),
            other => Err(format!("unknown traffic direction: {other}")),
        }
    }
}

/// 다중 대상 실행 모드
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Serial,
    Parallel,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::Parallel => "parallel",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 레이블 셀렉터
///
/// 키/값 매핑(`{app: rook-ceph-osd}`) 또는 셀렉터 표현식 문자열
/// (`app=rook-ceph-osd`)을 모두 허용합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelSelector {
    /// 키/값 매칭
    Labels(BTreeMap<String, String>),
    /// 셀렉터 표현식
    Expression(String),
}

impl LabelSelector {
    /// 단일 `key=value` 매핑 셀렉터를 생성합니다.
    pub fn label(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Labels(BTreeMap::from([(key.into(), value.into())]))
    }

    /// 셀렉터 표현식을 생성합니다.
    pub fn expression(expr: impl Into<String>) -> Self {
        Self::Expression(expr.into())
    }

    /// 매칭 조건이 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Labels(labels) => labels.is_empty(),
            Self::Expression(expr) => expr.trim().is_empty(),
        }
    }

    /// 셀렉터를 `k=v,k2=v2` 표현식으로 변환합니다.
    pub fn to_expression(&self) -> String {
        match self {
            Self::Labels(labels) => labels
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(","),
            Self::Expression(expr) => expr.clone(),
        }
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_expression())
    }
}
