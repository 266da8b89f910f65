use std::path::PathBuf;

use anyhow::Context;
use planner::{Config, HttpWorkflow, ReviewSession};
use tracing::instrument;

use super::{OutputFormat, ToolArgs, render, terminal};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Prompt describing the course to plan
    #[arg(required_unless_present = "file")]
    prompt: Option<String>,

    /// Read the prompt from a file
    #[arg(long, short, value_name = "FILE", conflicts_with = "prompt")]
    file: Option<PathBuf>,

    #[command(flatten)]
    tools: ToolArgs,

    /// Output format
    ///
    /// `json` prints the confirm payload accepted by `plan`.
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

impl Command {
    pub(super) const fn tools(&self) -> &ToolArgs {
        &self.tools
    }

    fn prompt(&self) -> anyhow::Result<String> {
        match (&self.prompt, &self.file) {
            (_, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read prompt from {}", path.display())),
            (Some(prompt), None) => Ok(prompt.clone()),
            (None, None) => anyhow::bail!("a prompt or --file is required"),
        }
    }

    #[instrument(skip(config))]
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let prompt = self.prompt()?;
        let workflow = HttpWorkflow::new(config)?;

        let mut session = ReviewSession::new(config);
        session.tools = self.tools.apply(session.tools);

        let ticket = session.start(&prompt)?;
        terminal::spinner("Decomposing prompt", session.generate(&workflow, ticket)).await?;

        match self.output {
            OutputFormat::Pretty => {
                if let Some(conversation) = session.current() {
                    render::conversation(conversation, 0, 1);
                }
            }
            OutputFormat::Json => {
                let payload = session.confirm_payload()?;
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
        }
        Ok(())
    }
}
