//! Render a template file.
//!
//! The template is parsed with the configured parser, its one-time
//! directives run once, and the render directives run against the scope built
//! from `--set` assignments. Output goes to `--output` or stdout.
//!
//! ```bash
//! yatplt render page.tpl --set title=Home --set count=3
//! yatplt render page.tpl --context site='"docs"' --output page.html
//! yatplt render page.tpl --no-strip --allow-none
//! ```

use anyhow::Result;
use clap::Args;
use tokio::io::AsyncWriteExt;

use super::{expand_path, parse_assignments};
use crate::config::TemplateConfig;
use crate::templating::{Context, LookupEvaluator, RenderOptions, Template};

/// Initialize and render a template.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Template file to render
    template: String,

    /// Write the output to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Scope variable visible to every directive (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Variable in the shared context (repeatable)
    #[arg(long = "context", value_name = "KEY=VALUE")]
    context: Vec<String>,

    /// Keep whitespace around expression results
    #[arg(long)]
    no_strip: bool,

    /// Drop expressions that produce no value instead of failing
    #[arg(long)]
    allow_none: bool,
}

impl RenderCommand {
    fn render_options(&self, config: &TemplateConfig) -> RenderOptions {
        let mut options = config.render_options();
        if self.no_strip {
            options = options.strip_result(false);
        }
        if self.allow_none {
            options = options.allow_none(true);
        }
        options
    }

    /// Run the command.
    ///
    /// # Errors
    ///
    /// Malformed assignments, unreadable files, and any template error.
    pub async fn execute(self, config: &TemplateConfig) -> Result<()> {
        let path = expand_path(&self.template);
        let options = self.render_options(config);
        let scope = parse_assignments(&self.set)?;
        let context = Context::from_map(parse_assignments(&self.context)?);

        let parser = config.parser()?;
        let mut template = Template::from_path(&path, &parser, Some(context)).await?;

        let mut init_scope = scope.clone();
        // Templates without one-time directives start out initialized.
        let init_options = options.init_options().allow_already_initialized(true);
        template.initialize(&mut init_scope, &LookupEvaluator, init_options).await?;

        let mut scope = scope;
        match &self.output {
            Some(output) => {
                let output = expand_path(output);
                template.render_to_path(&output, &mut scope, &LookupEvaluator, options).await?;
                tracing::info!("Rendered {} to {}", path.display(), output.display());
            }
            None => {
                let rendered = template.render_string(&mut scope, &LookupEvaluator, options).await?;
                let mut stdout = tokio::io::stdout();
                stdout.write_all(rendered.as_bytes()).await?;
                stdout.flush().await?;
            }
        }
        Ok(())
    }
}
