//! # chaosgen-scenario
//!
//! 카오스 시나리오 YAML 생성기입니다.
//!
//! 빌더가 파라미터에 기본값을 적용하고 검증한 뒤 설정 매핑을 조립하면,
//! [`ScenarioGenerator`]가 고정 템플릿으로 렌더링하여 시나리오 디렉토리에 기록합니다.
//! 기록된 파일은 외부 카오스 실행 도구가 소비합니다.
//!
//! # 모듈 구성
//!
//! - [`renderer`]: 템플릿 로딩, 렌더링, 파일 기록
//! - [`selector`]: 노드/파드 셀렉터 리졸버
//! - [`naming`]: 결정적 파일명과 다이제스트 대체 전략
//! - [`hog`], [`app_outage`], [`network`], [`pod`], [`container`]: 빌더 6종
//! - [`plan`]: 여러 시나리오를 나열한 YAML 계획 파일
//!
//! # 사용 예시
//!
//! ```ignore
//! use chaosgen_scenario::{CpuHog, ScenarioGenerator};
//!
//! let generator = ScenarioGenerator::new("templates");
//! let path = generator.generate("/tmp/x", &CpuHog { duration: 120, ..Default::default() })?;
//! ```

pub mod app_outage;
pub mod config;
pub mod container;
pub mod error;
pub mod generator;
pub mod hog;
pub mod naming;
pub mod network;
pub mod plan;
pub mod pod;
pub mod renderer;
pub mod selector;

pub use app_outage::{ApplicationOutage, PodTargets};
pub use config::ScenarioConfig;
pub use container::{ContainerKill, ContainerKillEntry, ContainerKillSingle, ContainerPause};
pub use error::ScenarioGenError;
pub use generator::{Scenario, ScenarioGenerator, TEMPLATES};
pub use hog::{CpuHog, HogTarget, IoHog, MemoryHog};
pub use network::{NetworkChaosIngress, NodeNetworkChaos, PodNetworkOutage, PodShaping};
pub use plan::{Plan, PlanEntry, PlannedScenario};
pub use pod::RegexPodKill;
pub use renderer::TemplateWriter;
pub use selector::{node_selector_config, pod_selector_config};
