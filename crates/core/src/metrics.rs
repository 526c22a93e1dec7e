//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 레이블 키를 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 익스포터는 설치하지 않으며, 호출 측이 레코더를 설치한 경우에만 수집됩니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `chaosgen_`
//! - 모듈명: `scenarios_`, `ports_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(
//!     chaosgen_core::metrics::SCENARIOS_GENERATED_TOTAL,
//!     chaosgen_core::metrics::LABEL_KIND => "cpu_hog"
//! )
//! .increment(1);
//! ```

use metrics::{Unit, describe_counter};

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 시나리오 종류 레이블 키 (cpu_hog, container_kill, ...)
pub const LABEL_KIND: &str = "kind";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Scenario 메트릭 ────────────────────────────────────────────────

/// Scenario: 기록된 시나리오 파일 수 (counter, label: kind)
pub const SCENARIOS_GENERATED_TOTAL: &str = "chaosgen_scenarios_generated_total";

/// Scenario: 생성 실패 수 (counter, label: kind)
pub const SCENARIO_ERRORS_TOTAL: &str = "chaosgen_scenario_errors_total";

// ─── Ports 메트릭 ───────────────────────────────────────────────────

/// Ports: 포트 할당 시도 수 (counter, label: result)
pub const PORT_ALLOCATIONS_TOTAL: &str = "chaosgen_port_allocations_total";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    describe_counter!(
        SCENARIOS_GENERATED_TOTAL,
        Unit::Count,
        "Scenario files rendered and written"
    );
    describe_counter!(
        SCENARIO_ERRORS_TOTAL,
        Unit::Count,
        "Scenario generation failures"
    );
    describe_counter!(
        PORT_ALLOCATIONS_TOTAL,
        Unit::Count,
        "Chaos server port allocation attempts"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_share_prefix() {
        for name in [
            SCENARIOS_GENERATED_TOTAL,
            SCENARIO_ERRORS_TOTAL,
            PORT_ALLOCATIONS_TOTAL,
        ] {
            assert!(name.starts_with("chaosgen_"), "{name}");
            assert!(name.ends_with("_total"), "{name}");
        }
    }

    #[test]
    fn describe_all_without_recorder_is_noop() {
        describe_all();
    }
}
