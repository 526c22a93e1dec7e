//! 시나리오 설정 매핑
//!
//! [`ScenarioConfig`]는 빌더 호출 한 번으로 완전히 결정되는 문자열 키 → 값 매핑입니다.
//! 렌더러가 한 번 소비한 뒤 버려지며, 키는 항상 정렬된 순서로 유지됩니다.

use serde::Serialize;
use serde_json::{Map, Value};

/// 시나리오 설정 매핑
///
/// 값은 스칼라, 리스트, 중첩 매핑이 될 수 있습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScenarioConfig {
    entries: Map<String, Value>,
}

impl ScenarioConfig {
    /// 빈 매핑을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 키에 값을 설정합니다. 기존 값은 덮어씁니다.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// 빌더 체이닝용 `insert`
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// 다른 매핑(셀렉터 조각 등)을 병합합니다. 같은 키는 `other`가 우선합니다.
    pub fn merge(&mut self, other: ScenarioConfig) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 키 순서대로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// 정렬된 키로 직렬화한 정규 JSON 문자열
    ///
    /// 해시 기반 파일명의 입력으로 사용됩니다.
    pub fn canonical_json(&self) -> String {
        crate::naming::canonical_json(&Value::Object(self.entries.clone()))
    }

    /// 내부 JSON 값으로 변환합니다.
    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }
}

impl From<Map<String, Value>> for ScenarioConfig {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}
