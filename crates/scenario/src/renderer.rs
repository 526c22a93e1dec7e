//! 템플릿 렌더러
//!
//! 템플릿 파일 경로로 생성하면 그 파일이 있는 디렉토리를 검색 루트로 사용합니다.
//! 렌더링은 (템플릿 내용, 설정 매핑)의 순수 함수이며 전역 상태를 참조하지 않습니다.
//!
//! # 사용 예시
//!
//! ```ignore
//! let mut writer = TemplateWriter::new("templates/kube/cpu-hog.yml.j2")?;
//! writer.set_config(config);
//! let path = writer.write("/tmp/x/cpu_hog.yaml")?;
//! ```

use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, Error, ErrorKind, Value};
use tracing::debug;

use crate::config::ScenarioConfig;
use crate::error::ScenarioGenError;

/// 템플릿 하나를 렌더링하여 파일로 기록하는 작성기
#[derive(Debug)]
pub struct TemplateWriter {
    env: Environment<'static>,
    name: String,
    template_path: PathBuf,
    config: ScenarioConfig,
}

impl TemplateWriter {
    /// 템플릿 파일을 로드합니다.
    ///
    /// # Errors
    ///
    /// - 파일이 없으면 `TemplateNotFound`
    /// - 템플릿 구문 오류는 `Render`
    pub fn new(template_path: impl AsRef<Path>) -> Result<Self, ScenarioGenError> {
        let template_path = template_path.as_ref().to_path_buf();
        let not_found = || ScenarioGenError::TemplateNotFound {
            path: template_path.display().to_string(),
        };

        let name = template_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .ok_or_else(not_found)?;
        if !template_path.is_file() {
            return Err(not_found());
        }

        let root = match template_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(root));
        // `.yml.j2`는 기본 콜백에서 JSON 이스케이프 대상이 된다. 인용은 `tojson`으로만 한다.
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.add_filter("selector", filters::selector);
        env.add_filter("yaml_scalar", filters::yaml_scalar);

        // 구문 오류를 생성 시점에 드러낸다
        env.get_template(&name).map_err(|e| match e.kind() {
            ErrorKind::TemplateNotFound => not_found(),
            _ => render_error(&name, &e),
        })?;

        debug!(template = %template_path.display(), "template loaded");

        Ok(Self {
            env,
            name,
            template_path,
            config: ScenarioConfig::new(),
        })
    }

    /// 렌더링에 사용할 설정 매핑을 지정합니다.
    pub fn set_config(&mut self, config: ScenarioConfig) {
        self.config = config;
    }

    /// 빌더 체이닝용 `set_config`
    pub fn with_config(mut self, config: ScenarioConfig) -> Self {
        self.set_config(config);
        self
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// 현재 설정 매핑으로 템플릿을 렌더링합니다.
    pub fn render(&self) -> Result<String, ScenarioGenError> {
        let template = self
            .env
            .get_template(&self.name)
            .map_err(|e| render_error(&self.name, &e))?;
        template
            .render(&self.config)
            .map_err(|e| render_error(&self.name, &e))
    }

    /// 렌더링 결과를 `output_path`에 기록하고 기록한 경로를 반환합니다.
    ///
    /// 상위 디렉토리는 필요 시 생성하며, 기존 파일은 덮어씁니다.
    pub fn write(&self, output_path: impl AsRef<Path>) -> Result<PathBuf, ScenarioGenError> {
        let output_path = output_path.as_ref();
        let rendered = self.render()?;

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| ScenarioGenError::Io {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }

        std::fs::write(output_path, rendered).map_err(|source| ScenarioGenError::Io {
            path: output_path.display().to_string(),
            source,
        })?;

        debug!(
            template = %self.name,
            path = %output_path.display(),
            "scenario file written"
        );
        Ok(output_path.to_path_buf())
    }
}

fn render_error(template: &str, err: &Error) -> ScenarioGenError {
    ScenarioGenError::Render {
        template: template.to_owned(),
        reason: err.to_string(),
    }
}

/// 템플릿 필터
pub mod filters {
    use super::*;

    /// 레이블 매핑을 `k=v,k2=v2` 표현식으로 변환합니다. 문자열은 그대로 통과합니다.
    ///
    /// Usage: `{{ label_selector | selector }}`
    pub fn selector(value: Value) -> Result<String, Error> {
        if value.is_undefined() || value.is_none() {
            return Ok(String::new());
        }
        if let Some(expr) = value.as_str() {
            return Ok(expr.to_owned());
        }
        if value.kind() != minijinja::value::ValueKind::Map {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("selector filter expects a string or mapping, got {}", value.kind()),
            ));
        }

        let mut pairs = Vec::new();
        for key in value.try_iter()? {
            let item = value.get_item(&key)?;
            pairs.push(format!("{key}={item}"));
        }
        pairs.sort();
        Ok(pairs.join(","))
    }

    /// 문자열을 YAML 평문 스칼라로 출력합니다.
    ///
    /// 평문으로 다시 읽었을 때 같은 문자열이 아니면(`123`, `true`, `null` 등) JSON 문자열로 인용합니다.
    ///
    /// Usage: `node_name: {{ node_name | yaml_scalar }}`
    pub fn yaml_scalar(value: String) -> String {
        let plain = matches!(
            serde_yaml::from_str::<serde_yaml::Value>(&value),
            Ok(serde_yaml::Value::String(ref parsed)) if *parsed == value
        );
        if plain {
            value
        } else {
            serde_json::Value::String(value).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn template_file(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_template_is_template_not_found() {
        let dir = TempDir::new().unwrap();
        let err = TemplateWriter::new(dir.path().join("absent.yml.j2")).unwrap_err();
        assert!(matches!(err, ScenarioGenError::TemplateNotFound { ref path } if path.ends_with("absent.yml.j2")));
    }

    #[test]
    fn syntax_error_is_render_error() {
        let dir = TempDir::new().unwrap();
        let path = template_file(dir.path(), "broken.yml.j2", "{% if %}\n");
        let err = TemplateWriter::new(path).unwrap_err();
        assert!(matches!(err, ScenarioGenError::Render { .. }));
    }

    #[test]
    fn render_uses_assigned_config() {
        let dir = TempDir::new().unwrap();
        let path = template_file(
            dir.path(),
            "hog.yml.j2",
            "duration: {{ duration }}\n{% if node_name %}\nnode_name: {{ node_name }}\n{% endif %}\n",
        );
        let writer = TemplateWriter::new(path)
            .unwrap()
            .with_config(ScenarioConfig::new().with("duration", 120));
        assert_eq!(writer.render().unwrap(), "duration: 120\n");
    }

    #[test]
    fn render_is_repeatable() {
        let dir = TempDir::new().unwrap();
        let path = template_file(dir.path(), "t.yml.j2", "kill: {{ kill }}\n");
        let writer = TemplateWriter::new(path)
            .unwrap()
            .with_config(ScenarioConfig::new().with("kill", 3));
        assert_eq!(writer.render().unwrap(), writer.render().unwrap());
    }

    #[test]
    fn write_creates_parents_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = template_file(dir.path(), "t.yml.j2", "value: {{ value }}\n");
        let out = dir.path().join("nested/deeper/out.yaml");

        let mut writer = TemplateWriter::new(&path).unwrap();
        writer.set_config(ScenarioConfig::new().with("value", 1));
        assert_eq!(writer.write(&out).unwrap(), out);

        writer.set_config(ScenarioConfig::new().with("value", 2));
        writer.write(&out).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "value: 2\n");
    }

    #[test]
    fn write_into_file_parent_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = template_file(dir.path(), "t.yml.j2", "x: 1\n");
        let blocker = template_file(dir.path(), "blocker", "");
        let writer = TemplateWriter::new(path).unwrap();
        let err = writer.write(blocker.join("out.yaml")).unwrap_err();
        assert!(matches!(err, ScenarioGenError::Io { .. }));
    }

    #[test]
    fn selector_filter_formats_mappings() {
        let dir = TempDir::new().unwrap();
        let path = template_file(dir.path(), "s.yml.j2", "sel: {{ labels | selector }}\n");
        let writer = TemplateWriter::new(path).unwrap().with_config(
            ScenarioConfig::new().with("labels", serde_json::json!({"tier": "db", "app": "web"})),
        );
        assert_eq!(writer.render().unwrap(), "sel: app=web,tier=db\n");
    }

    #[test]
    fn yaml_template_interpolates_strings_unquoted() {
        let dir = TempDir::new().unwrap();
        let path = template_file(
            dir.path(),
            "t.yml.j2",
            "v: {{ v }}\nquoted: {{ v | tojson }}\n",
        );
        let writer = TemplateWriter::new(path)
            .unwrap()
            .with_config(ScenarioConfig::new().with("v", "worker-1"));
        assert_eq!(
            writer.render().unwrap(),
            "v: worker-1\nquoted: \"worker-1\"\n"
        );
    }

    #[test]
    fn yaml_scalar_quotes_only_ambiguous_strings() {
        assert_eq!(filters::yaml_scalar("worker-1".to_owned()), "worker-1");
        assert_eq!(
            filters::yaml_scalar("ip-10-0-1-5.ec2.internal".to_owned()),
            "ip-10-0-1-5.ec2.internal"
        );
        assert_eq!(filters::yaml_scalar("123".to_owned()), "\"123\"");
        assert_eq!(filters::yaml_scalar("true".to_owned()), "\"true\"");
        assert_eq!(filters::yaml_scalar("null".to_owned()), "\"null\"");
        assert_eq!(filters::yaml_scalar("a: b".to_owned()), "\"a: b\"");
    }

    #[test]
    fn numeric_node_name_stays_a_string() {
        let dir = TempDir::new().unwrap();
        let path = template_file(
            dir.path(),
            "n.yml.j2",
            "node_name: {{ node_name | yaml_scalar }}\n",
        );
        let writer = TemplateWriter::new(path)
            .unwrap()
            .with_config(ScenarioConfig::new().with("node_name", "123"));
        let doc: serde_yaml::Value = serde_yaml::from_str(&writer.render().unwrap()).unwrap();
        assert_eq!(doc["node_name"], serde_yaml::Value::from("123"));
    }

    #[test]
    fn selector_filter_passes_strings_through() {
        assert_eq!(
            filters::selector(Value::from("app=noobaa")).unwrap(),
            "app=noobaa"
        );
        assert_eq!(filters::selector(Value::UNDEFINED).unwrap(), "");
        assert!(filters::selector(Value::from(3)).is_err());
    }
}
