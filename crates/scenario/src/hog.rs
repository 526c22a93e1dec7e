//! 리소스 호그 빌더 (CPU / IO / Memory)
//!
//! 모든 파라미터가 선택적이며 검증 실패 경로가 없습니다.
//! 종류별로 고정 템플릿과 고정 파일명을 사용하므로 같은 디렉토리에 반복 호출하면
//! 이전 결과물을 덮어씁니다.

use std::collections::BTreeMap;

use chaosgen_core::ScenarioKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ScenarioConfig;
use crate::error::ScenarioGenError;
use crate::generator::Scenario;
use crate::selector::node_selector_config;

pub const CPU_HOG_TEMPLATE: &str = "kube/cpu-hog.yml.j2";
pub const IO_HOG_TEMPLATE: &str = "kube/io-hog.yml.j2";
pub const MEMORY_HOG_TEMPLATE: &str = "kube/memory-hog.yml.j2";

/// 호그 워크로드 기본 이미지
pub const DEFAULT_HOG_IMAGE: &str = "quay.io/krkn-chaos/krkn-hog";

/// 모든 호그 종류가 공유하는 대상 지정 파라미터
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HogTarget {
    /// 워커 수 (없으면 빈 값으로 렌더링되어 도구 기본값 사용)
    pub workers: Option<u32>,
    pub image: String,
    pub namespace: String,
    pub node_name: Option<String>,
    pub node_selector: Option<BTreeMap<String, String>>,
    /// 대상 노드 수 (없으면 빈 값)
    pub number_of_nodes: Option<u32>,
    /// 노드 테인트 톨러레이션
    pub taints: Vec<String>,
}

impl Default for HogTarget {
    fn default() -> Self {
        Self {
            workers: None,
            image: DEFAULT_HOG_IMAGE.to_owned(),
            namespace: "default".to_owned(),
            node_name: None,
            node_selector: None,
            number_of_nodes: None,
            taints: Vec::new(),
        }
    }
}

impl HogTarget {
    fn base_config(&self, hog_type: &str, duration: u64) -> ScenarioConfig {
        let mut config = ScenarioConfig::new()
            .with("duration", duration)
            .with("workers", optional_count(self.workers))
            .with("hog_type", hog_type)
            .with("image", self.image.clone())
            .with("namespace", self.namespace.clone())
            .with("number_of_nodes", optional_count(self.number_of_nodes))
            .with("taints", self.taints.clone());
        config.merge(node_selector_config(
            self.node_name.as_deref(),
            self.node_selector.as_ref(),
        ));
        config
    }
}

fn optional_count(value: Option<u32>) -> Value {
    value.map_or_else(|| Value::from(""), Value::from)
}

/// CPU 호그
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuHog {
    pub duration: u64,
    pub cpu_load_percentage: u32,
    pub cpu_method: String,
    #[serde(flatten)]
    pub target: HogTarget,
}

impl Default for CpuHog {
    fn default() -> Self {
        Self {
            duration: 60,
            cpu_load_percentage: 90,
            cpu_method: "all".to_owned(),
            target: HogTarget::default(),
        }
    }
}

impl Scenario for CpuHog {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::CpuHog
    }

    fn template(&self) -> &'static str {
        CPU_HOG_TEMPLATE
    }

    fn build(&self) -> Result<ScenarioConfig, ScenarioGenError> {
        Ok(self
            .target
            .base_config("cpu", self.duration)
            .with("cpu_load_percentage", self.cpu_load_percentage)
            .with("cpu_method", self.cpu_method.clone()))
    }

    fn file_name(&self, _config: &ScenarioConfig) -> String {
        "cpu_hog.yaml".to_owned()
    }
}

/// IO 호그
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoHog {
    pub duration: u64,
    pub io_block_size: String,
    pub io_write_bytes: String,
    pub io_target_pod_folder: String,
    /// 파드에 마운트할 볼륨 명세 (없으면 hostPath `/root`)
    pub io_target_pod_volume: Option<Value>,
    #[serde(flatten)]
    pub target: HogTarget,
}

impl Default for IoHog {
    fn default() -> Self {
        Self {
            duration: 30,
            io_block_size: "1m".to_owned(),
            io_write_bytes: "1g".to_owned(),
            io_target_pod_folder: "/hog-data".to_owned(),
            io_target_pod_volume: None,
            target: HogTarget::default(),
        }
    }
}

fn default_io_volume() -> Value {
    serde_json::json!({"name": "node-volume", "hostPath": {"path": "/root"}})
}

impl Scenario for IoHog {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::IoHog
    }

    fn template(&self) -> &'static str {
        IO_HOG_TEMPLATE
    }

    fn build(&self) -> Result<ScenarioConfig, ScenarioGenError> {
        let volume = self
            .io_target_pod_volume
            .clone()
            .unwrap_or_else(default_io_volume);
        Ok(self
            .target
            .base_config("io", self.duration)
            .with("io_block_size", self.io_block_size.clone())
            .with("io_write_bytes", self.io_write_bytes.clone())
            .with("io_target_pod_folder", self.io_target_pod_folder.clone())
            .with("io_target_pod_volume", volume))
    }

    fn file_name(&self, _config: &ScenarioConfig) -> String {
        "io_hog.yaml".to_owned()
    }
}

/// 메모리 호그
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryHog {
    pub duration: u64,
    /// 절대값(`2g`) 또는 백분율(`90%`)
    pub memory_vm_bytes: String,
    #[serde(flatten)]
    pub target: HogTarget,
}

impl Default for MemoryHog {
    fn default() -> Self {
        Self {
            duration: 60,
            memory_vm_bytes: "90%".to_owned(),
            target: HogTarget::default(),
        }
    }
}

impl Scenario for MemoryHog {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::MemoryHog
    }

    fn template(&self) -> &'static str {
        MEMORY_HOG_TEMPLATE
    }

    fn build(&self) -> Result<ScenarioConfig, ScenarioGenError> {
        Ok(self
            .target
            .base_config("memory", self.duration)
            .with("memory_vm_bytes", self.memory_vm_bytes.clone()))
    }

    fn file_name(&self, _config: &ScenarioConfig) -> String {
        "memory_hog.yaml".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cpu_defaults() {
        let config = CpuHog::default().build().unwrap();
        assert_eq!(config.get("duration"), Some(&json!(60)));
        assert_eq!(config.get("cpu_load_percentage"), Some(&json!(90)));
        assert_eq!(config.get("cpu_method"), Some(&json!("all")));
        assert_eq!(config.get("namespace"), Some(&json!("default")));
        assert_eq!(config.get("hog_type"), Some(&json!("cpu")));
        assert_eq!(config.get("workers"), Some(&json!("")));
        assert_eq!(config.get("taints"), Some(&json!([])));
        assert!(!config.contains_key("node_name"));
        assert!(!config.contains_key("node_selector"));
    }

    #[test]
    fn io_defaults() {
        let config = IoHog::default().build().unwrap();
        assert_eq!(config.get("duration"), Some(&json!(30)));
        assert_eq!(config.get("io_block_size"), Some(&json!("1m")));
        assert_eq!(config.get("io_write_bytes"), Some(&json!("1g")));
        assert_eq!(config.get("io_target_pod_folder"), Some(&json!("/hog-data")));
        assert_eq!(
            config.get("io_target_pod_volume"),
            Some(&json!({"name": "node-volume", "hostPath": {"path": "/root"}}))
        );
    }

    #[test]
    fn memory_defaults() {
        let config = MemoryHog::default().build().unwrap();
        assert_eq!(config.get("duration"), Some(&json!(60)));
        assert_eq!(config.get("memory_vm_bytes"), Some(&json!("90%")));
        assert_eq!(config.get("hog_type"), Some(&json!("memory")));
    }

    #[test]
    fn node_name_merged_into_config() {
        let hog = CpuHog {
            target: HogTarget {
                node_name: Some("worker-1".to_owned()),
                workers: Some(4),
                ..HogTarget::default()
            },
            ..CpuHog::default()
        };
        let config = hog.build().unwrap();
        assert_eq!(config.get("node_name"), Some(&json!("worker-1")));
        assert_eq!(config.get("workers"), Some(&json!(4)));
    }

    #[test]
    fn fixed_file_names() {
        let cfg = ScenarioConfig::new();
        assert_eq!(CpuHog::default().file_name(&cfg), "cpu_hog.yaml");
        assert_eq!(IoHog::default().file_name(&cfg), "io_hog.yaml");
        assert_eq!(MemoryHog::default().file_name(&cfg), "memory_hog.yaml");
    }

    #[test]
    fn deserializes_partial_yaml_with_defaults() {
        let hog: MemoryHog =
            serde_yaml::from_str("memory_vm_bytes: 2g\nnode_name: worker-2\n").unwrap();
        assert_eq!(hog.duration, 60);
        assert_eq!(hog.memory_vm_bytes, "2g");
        assert_eq!(hog.target.node_name.as_deref(), Some("worker-2"));
        assert_eq!(hog.target.namespace, "default");
    }
}
