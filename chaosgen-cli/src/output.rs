//! Output formatting for text vs JSON rendering
//!
//! All subcommand output flows through [`OutputWriter`], so command handlers
//! never branch on the format themselves.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Writes CLI payloads as colored text or pretty JSON.
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// # Examples
    ///
    /// ```no_run
    /// use chaosgen_cli::cli::OutputFormat;
    /// use chaosgen_cli::output::OutputWriter;
    ///
    /// let writer = OutputWriter::new(OutputFormat::Json);
    /// ```
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(&mut handle, payload)
    }

    /// Render a payload into any writer.
    pub fn render_to<T: Render + Serialize>(
        &self,
        w: &mut dyn Write,
        payload: &T,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => payload.render_text(w)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Human-readable text rendering, implemented by every payload next to `Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Written {
        kind: String,
        path: Option<String>,
    }

    impl Render for Written {
        fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
            writeln!(w, "{} -> {}", self.kind, self.path.as_deref().unwrap_or("-"))
        }
    }

    fn render(format: OutputFormat, payload: &Written) -> String {
        let mut buffer = Vec::new();
        OutputWriter::new(format)
            .render_to(&mut buffer, payload)
            .expect("rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_render_text_uses_render_trait() {
        let output = render(
            OutputFormat::Text,
            &Written {
                kind: "cpu_hog".to_owned(),
                path: Some("/tmp/s/cpu_hog.yaml".to_owned()),
            },
        );
        assert_eq!(output, "cpu_hog -> /tmp/s/cpu_hog.yaml\n");
    }

    #[test]
    fn test_render_json_is_pretty_and_parseable() {
        let output = render(
            OutputFormat::Json,
            &Written {
                kind: "container_pause".to_owned(),
                path: None,
            },
        );
        assert!(output.contains('\n'), "pretty JSON spans lines");
        assert!(output.ends_with("}\n"));

        let parsed: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(parsed["kind"], "container_pause");
        assert!(parsed["path"].is_null());
    }

    #[test]
    fn test_render_text_unicode_content() {
        let output = render(
            OutputFormat::Text,
            &Written {
                kind: "시나리오".to_owned(),
                path: Some("/tmp/카오스.yaml".to_owned()),
            },
        );
        assert!(output.contains("시나리오"));
        assert!(output.contains("카오스.yaml"));
    }
}
