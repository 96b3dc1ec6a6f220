//! Parse a template and list its fragments.
//!
//! Nothing is evaluated; this only reports how the parser splits the file.
//!
//! ```bash
//! yatplt check page.tpl
//! yatplt check page.tpl --format json
//! ```

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use super::expand_path;
use crate::config::TemplateConfig;
use crate::constants::FRAGMENT_PREVIEW_CHARS;
use crate::templating::{Fragment, Phase, Template};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Parse a template without evaluating it.
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Template file to check
    template: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// One fragment as reported by `check`.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct FragmentSummary {
    kind: String,
    name: Option<String>,
    length: usize,
    preview: String,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    template: String,
    one_time: usize,
    render: usize,
    literals: usize,
    fragments: Vec<FragmentSummary>,
}

impl FragmentSummary {
    fn from_fragment(fragment: &Fragment) -> Self {
        match fragment {
            Fragment::Literal(text) => Self {
                kind: "literal".to_string(),
                name: None,
                length: text.len(),
                preview: preview(text),
            },
            Fragment::Directive(directive) => Self {
                kind: directive.kind().to_string(),
                name: Some(directive.name()),
                length: directive.source().len(),
                preview: preview(directive.source()),
            },
        }
    }
}

/// First characters of `text` on one line.
fn preview(text: &str) -> String {
    let flat = text.replace('\n', "\\n");
    if flat.chars().count() > FRAGMENT_PREVIEW_CHARS {
        let head: String = flat.chars().take(FRAGMENT_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        flat
    }
}

fn report(template_path: &str, template: &Template) -> CheckReport {
    let mut one_time = 0;
    let mut render = 0;
    let mut literals = 0;
    for fragment in template.fragments() {
        match fragment {
            Fragment::Literal(_) => literals += 1,
            Fragment::Directive(d) if d.kind().phase() == Phase::OneTime => one_time += 1,
            Fragment::Directive(_) => render += 1,
        }
    }
    CheckReport {
        template: template_path.to_string(),
        one_time,
        render,
        literals,
        fragments: template.fragments().iter().map(FragmentSummary::from_fragment).collect(),
    }
}

impl CheckCommand {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// Unreadable files and parse errors.
    pub async fn execute(self, config: &TemplateConfig) -> Result<()> {
        let path = expand_path(&self.template);
        let parser = config.parser()?;
        let template = Template::from_path(&path, &parser, None).await?;
        let report = report(&self.template, &template);

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => {
                println!(
                    "{} {}: {} fragment(s), {} one-time, {} render, {} literal",
                    "✓".green(),
                    report.template,
                    report.fragments.len(),
                    report.one_time,
                    report.render,
                    report.literals
                );
                for fragment in &report.fragments {
                    let label = fragment.name.as_deref().unwrap_or(&fragment.kind);
                    println!("  {:<24} {:>6}  {}", label, fragment.length, fragment.preview);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templating::TemplateParser;

    #[test]
    fn test_preview_flattens_and_truncates() {
        assert_eq!(preview("a\nb"), "a\\nb");
        let long = "x".repeat(FRAGMENT_PREVIEW_CHARS + 5);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), FRAGMENT_PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_report_counts_fragments() {
        let parser = TemplateParser::new();
        let template =
            Template::new("head{1{! x = 1 !}1}mid{{% y %}}{{! z = 2 !}}", &parser, None).unwrap();
        let report = report("t.tpl", &template);

        assert_eq!(report.one_time, 1);
        assert_eq!(report.render, 2);
        assert_eq!(report.literals, 2);
        assert_eq!(
            report.fragments[1],
            FragmentSummary {
                kind: "one-time-block".into(),
                name: Some("one-time-block#1".into()),
                length: 5,
                preview: "x = 1".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_check_rejects_unbalanced_template() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("bad.tpl");
        tokio::fs::write(&path, "{{% x").await.unwrap();

        let cmd = CheckCommand {
            template: path.to_str().unwrap().to_string(),
            format: OutputFormat::Text,
        };
        let err = cmd.execute(&TemplateConfig::default()).await.unwrap_err();
        let err = err.downcast_ref::<crate::templating::TemplateError>().unwrap();
        assert!(err.is_tag_mismatch());
    }
}
