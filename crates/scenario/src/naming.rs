//! 출력 파일명 전략
//!
//! 두 단계 전략을 사용합니다.
//! 1. 사람이 읽을 수 있는 결정적 이름을 만든다.
//! 2. 길이 상한을 넘으면 입력 내용에서 파생된 다이제스트 이름으로 대체한다.
//!
//! 두 단계 모두 입력 파라미터의 순수 함수이므로 같은 입력은 항상 같은 이름을 만듭니다.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// 포트 목록을 나열하는 대신 해시로 대체하는 기준 개수 (초과 시 해시)
pub const PORT_LIST_HASH_THRESHOLD: usize = 20;

/// 확장자를 제외한 기본 파일명의 최대 길이
pub const MAX_BASE_NAME_LEN: usize = 200;

/// 포트 목록 해시 길이 (16진수 문자)
pub const PORT_HASH_LEN: usize = 8;

/// 전체 설정 해시 길이 (16진수 문자)
pub const CONFIG_HASH_LEN: usize = 12;

/// 노드 네트워크 카오스 파일명 해시 길이 (16진수 문자)
pub const NETWORK_CHAOS_HASH_LEN: usize = 8;

/// SHA-256 다이제스트의 앞 `len`개 16진수 문자를 반환합니다.
pub fn short_digest(input: &str, len: usize) -> String {
    let digest = hex::encode(Sha256::digest(input.as_bytes()));
    digest[..len.min(digest.len())].to_owned()
}

/// 객체 키를 정렬하여 공백 없는 정규 JSON 문자열로 직렬화합니다.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                if let Some(inner) = map.get(key.as_str()) {
                    write_canonical(inner, out);
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// 읽기 쉬운 이름이 길이 상한 이내면 그대로, 넘으면 `fallback` 결과를 사용합니다.
pub fn bounded_name(readable: String, max_len: usize, fallback: impl FnOnce() -> String) -> String {
    if readable.len() > max_len {
        fallback()
    } else {
        readable
    }
}

/// 포트 목록 설명자
///
/// - 빈 목록: 빈 문자열
/// - 기준 이하: `_{tag}_{p1}-{p2}-...` (오름차순)
/// - 기준 초과: `_{tag}_range_{n}ports_{hash8}` (정렬된 목록의 다이제스트)
pub fn port_descriptor(tag: &str, ports: &[u16]) -> String {
    if ports.is_empty() {
        return String::new();
    }

    let mut sorted = ports.to_vec();
    sorted.sort_unstable();

    if sorted.len() > PORT_LIST_HASH_THRESHOLD {
        let listing = canonical_json(&Value::from(sorted.clone()));
        format!(
            "_{tag}_range_{}ports_{}",
            sorted.len(),
            short_digest(&listing, PORT_HASH_LEN)
        )
    } else {
        let joined = sorted
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join("-");
        format!("_{tag}_{joined}")
    }
}
