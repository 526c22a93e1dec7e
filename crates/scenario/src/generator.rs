//! 시나리오 생성기
//!
//! [`Scenario`] 트레이트는 빌더 하나의 계약입니다. 빌더는 기본값을 적용하고
//! 전제 조건을 검증한 뒤 설정 매핑을 조립하며([`Scenario::build`]),
//! [`ScenarioGenerator`]가 이를 템플릿 루트 아래의 고정 템플릿으로 렌더링하여
//! 시나리오 디렉토리에 기록합니다.
//!
//! 검증은 항상 파일 기록 전에 끝나므로 실패한 호출은 부분 결과물을 남기지 않습니다.

use std::path::{Path, PathBuf};

use chaosgen_core::ScenarioKind;
use chaosgen_core::metrics as m;
use tracing::{debug, info, warn};

use crate::config::ScenarioConfig;
use crate::error::ScenarioGenError;
use crate::renderer::TemplateWriter;

/// 시나리오 빌더 계약
pub trait Scenario {
    /// 생성하는 시나리오 종류
    fn kind(&self) -> ScenarioKind;

    /// 템플릿 루트 기준 상대 경로 (예: `kube/cpu-hog.yml.j2`)
    fn template(&self) -> &'static str;

    /// 기본값을 적용하고 검증한 설정 매핑을 조립합니다. 파일 시스템을 건드리지 않습니다.
    fn build(&self) -> Result<ScenarioConfig, ScenarioGenError>;

    /// 조립된 설정으로부터 출력 파일명을 결정합니다.
    fn file_name(&self, config: &ScenarioConfig) -> String;
}

/// 빌더가 참조하는 모든 템플릿 (템플릿 루트 기준)
pub const TEMPLATES: &[&str] = &[
    crate::hog::CPU_HOG_TEMPLATE,
    crate::hog::IO_HOG_TEMPLATE,
    crate::hog::MEMORY_HOG_TEMPLATE,
    crate::app_outage::APP_OUTAGE_TEMPLATE,
    crate::network::POD_EGRESS_SHAPING_TEMPLATE,
    crate::network::POD_INGRESS_SHAPING_TEMPLATE,
    crate::network::POD_NETWORK_OUTAGE_TEMPLATE,
    crate::network::NETWORK_CHAOS_TEMPLATE,
    crate::network::NETWORK_CHAOS_INGRESS_TEMPLATE,
    crate::pod::REGEX_POD_KILL_TEMPLATE,
    crate::container::CONTAINER_KILL_TEMPLATE,
    crate::container::CONTAINER_PAUSE_TEMPLATE,
];

/// 템플릿 루트를 보유한 시나리오 생성기
#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    template_root: PathBuf,
}

impl ScenarioGenerator {
    pub fn new(template_root: impl Into<PathBuf>) -> Self {
        Self {
            template_root: template_root.into(),
        }
    }

    pub fn template_root(&self) -> &Path {
        &self.template_root
    }

    /// 시나리오 템플릿의 절대 경로
    pub fn template_path<S: Scenario + ?Sized>(&self, scenario: &S) -> PathBuf {
        self.template_root.join(scenario.template())
    }

    /// 시나리오를 조립, 렌더링하여 `scenario_dir`에 기록하고 기록된 경로를 반환합니다.
    pub fn generate<S: Scenario + ?Sized>(
        &self,
        scenario_dir: impl AsRef<Path>,
        scenario: &S,
    ) -> Result<PathBuf, ScenarioGenError> {
        let kind = scenario.kind();
        let result = self.try_generate(scenario_dir.as_ref(), scenario);

        match &result {
            Ok(path) => {
                metrics::counter!(m::SCENARIOS_GENERATED_TOTAL, m::LABEL_KIND => kind.as_str())
                    .increment(1);
                info!(kind = %kind, path = %path.display(), "scenario generated");
            }
            Err(e) => {
                metrics::counter!(m::SCENARIO_ERRORS_TOTAL, m::LABEL_KIND => kind.as_str())
                    .increment(1);
                warn!(kind = %kind, error = %e, "scenario generation failed");
            }
        }
        result
    }

    fn try_generate<S: Scenario + ?Sized>(
        &self,
        scenario_dir: &Path,
        scenario: &S,
    ) -> Result<PathBuf, ScenarioGenError> {
        let config = scenario.build()?;
        let output = scenario_dir.join(scenario.file_name(&config));
        debug!(
            kind = %scenario.kind(),
            template = scenario.template(),
            keys = config.len(),
            "scenario configuration assembled"
        );

        TemplateWriter::new(self.template_path(scenario))?
            .with_config(config)
            .write(output)
    }

    /// 파일을 기록하지 않고 렌더링 결과만 반환합니다.
    pub fn preview<S: Scenario + ?Sized>(&self, scenario: &S) -> Result<String, ScenarioGenError> {
        let config = scenario.build()?;
        TemplateWriter::new(self.template_path(scenario))?
            .with_config(config)
            .render()
    }

    /// 시나리오가 기록될 파일명을 계산합니다 (검증 포함, 렌더링 없음).
    pub fn planned_file_name<S: Scenario + ?Sized>(
        &self,
        scenario: &S,
    ) -> Result<String, ScenarioGenError> {
        let config = scenario.build()?;
        Ok(scenario.file_name(&config))
    }

    /// 템플릿 루트 아래에 존재하지 않는 빌더 템플릿 목록
    pub fn missing_templates(&self) -> Vec<PathBuf> {
        TEMPLATES
            .iter()
            .map(|t| self.template_root.join(t))
            .filter(|p| !p.is_file())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixed {
        fail: bool,
    }

    impl Scenario for Fixed {
        fn kind(&self) -> ScenarioKind {
            ScenarioKind::RegexPodKill
        }

        fn template(&self) -> &'static str {
            "fixed.yml.j2"
        }

        fn build(&self) -> Result<ScenarioConfig, ScenarioGenError> {
            if self.fail {
                return Err(ScenarioGenError::invalid("nope"));
            }
            Ok(ScenarioConfig::new().with("kill", 3))
        }

        fn file_name(&self, _config: &ScenarioConfig) -> String {
            "fixed.yaml".to_owned()
        }
    }

    fn root_with_template() -> TempDir {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join("fixed.yml.j2"), "kill: {{ kill }}\n").unwrap();
        root
    }

    #[test]
    fn generate_writes_named_file() {
        let root = root_with_template();
        let out = TempDir::new().unwrap();
        let generator = ScenarioGenerator::new(root.path());

        let path = generator.generate(out.path(), &Fixed { fail: false }).unwrap();
        assert_eq!(path, out.path().join("fixed.yaml"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "kill: 3\n");
    }

    #[test]
    fn failed_build_writes_nothing() {
        let root = root_with_template();
        let out = TempDir::new().unwrap();
        let generator = ScenarioGenerator::new(root.path());

        let err = generator.generate(out.path(), &Fixed { fail: true }).unwrap_err();
        assert!(matches!(err, ScenarioGenError::InvalidArgument(_)));
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_template_root_reports_not_found() {
        let root = TempDir::new().unwrap();
        let generator = ScenarioGenerator::new(root.path());
        let err = generator.preview(&Fixed { fail: false }).unwrap_err();
        assert!(matches!(err, ScenarioGenError::TemplateNotFound { .. }));
    }

    #[test]
    fn preview_does_not_touch_filesystem() {
        let root = root_with_template();
        let generator = ScenarioGenerator::new(root.path());
        assert_eq!(generator.preview(&Fixed { fail: false }).unwrap(), "kill: 3\n");
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 1);
    }

    #[test]
    fn empty_root_misses_every_template() {
        let root = TempDir::new().unwrap();
        let generator = ScenarioGenerator::new(root.path());
        assert_eq!(generator.missing_templates().len(), TEMPLATES.len());
    }
}
