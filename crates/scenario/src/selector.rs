//! 셀렉터 리졸버
//!
//! "무엇을 대상으로 하는가"를 설정 조각([`ScenarioConfig`])으로 정규화합니다.
//! 빈 문자열과 빈 매핑은 지정하지 않은 것으로 취급합니다.

use std::collections::BTreeMap;

use chaosgen_core::LabelSelector;
use serde_json::Value;

use crate::config::ScenarioConfig;
use crate::error::ScenarioGenError;

/// 파드 셀렉터 누락 시 에러 메시지
pub const POD_SELECTOR_REQUIRED: &str = "Either pod_name or label_selector must be provided";

/// 노드 셀렉터 조각
///
/// - 둘 다 없으면 빈 매핑 (템플릿 기본값이 적용됨)
/// - 노드 이름이 있으면 `{node_name: ..}` (조건보다 우선)
/// - 그 외에는 `{node_selector: ..}`
pub fn node_selector_config(
    node_name: Option<&str>,
    node_selector: Option<&BTreeMap<String, String>>,
) -> ScenarioConfig {
    if let Some(name) = non_empty(node_name) {
        return ScenarioConfig::new().with("node_name", name);
    }
    match node_selector {
        Some(criteria) if !criteria.is_empty() => {
            ScenarioConfig::new().with("node_selector", string_map(criteria))
        }
        _ => ScenarioConfig::new(),
    }
}

/// 파드 셀렉터 조각
///
/// 둘 다 없으면 `InvalidArgument`. 둘 다 있으면 파드 이름이 우선합니다.
pub fn pod_selector_config(
    pod_name: Option<&str>,
    label_selector: Option<&LabelSelector>,
) -> Result<ScenarioConfig, ScenarioGenError> {
    if let Some(name) = non_empty(pod_name) {
        return Ok(ScenarioConfig::new().with("pod_name", name));
    }
    match label_selector {
        Some(selector) if !selector.is_empty() => {
            Ok(ScenarioConfig::new().with("label_selector", label_selector_value(selector)))
        }
        _ => Err(ScenarioGenError::invalid(POD_SELECTOR_REQUIRED)),
    }
}

/// 파드 대상이 지정되었는지 확인합니다.
pub(crate) fn has_pod_target(pod_name: Option<&str>, label_selector: Option<&LabelSelector>) -> bool {
    non_empty(pod_name).is_some() || label_selector.is_some_and(|s| !s.is_empty())
}

/// 레이블 셀렉터를 설정 값으로 변환합니다. 매핑은 매핑으로, 표현식은 문자열로 유지됩니다.
pub(crate) fn label_selector_value(selector: &LabelSelector) -> Value {
    match selector {
        LabelSelector::Labels(labels) => string_map(labels),
        LabelSelector::Expression(expr) => Value::from(expr.clone()),
    }
}

pub(crate) fn string_map(map: &BTreeMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::from(v.clone())))
            .collect(),
    )
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
