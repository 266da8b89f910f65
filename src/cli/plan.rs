use std::path::PathBuf;

use anyhow::Context;
use planner::{
    Config, HttpWorkflow, PlanningBoard, Workflow,
    backend::ConfirmPayload,
    domain::Threshold,
};
use tracing::instrument;

use super::{FilterArg, OutputFormat, render, terminal};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// JSON confirm payload, as printed by `decompose --output json`
    payload: PathBuf,

    /// Similarity threshold in percent
    ///
    /// When given, each section keeps its top suggestion only if it is fully
    /// covered and at least this similar.
    #[arg(long, value_name = "PCT", value_parser = clap::value_parser!(u8).range(0..=100))]
    threshold: Option<u8>,

    /// Which sections to show
    #[arg(long, default_value = "all")]
    filter: FilterArg,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

impl Command {
    #[instrument(skip(config))]
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let content = std::fs::read_to_string(&self.payload)
            .with_context(|| format!("failed to read {}", self.payload.display()))?;
        let payload: ConfirmPayload = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a confirm payload", self.payload.display()))?;

        let workflow = HttpWorkflow::new(config)?;
        let results = terminal::spinner("Searching the curriculum", workflow.plan(&payload)).await?;

        let mut board = PlanningBoard::with_threshold(results, config.threshold);
        if let Some(percent) = self.threshold {
            board.apply_threshold(Threshold::from_percent(percent)?);
        }
        board.filter = self.filter.into();

        match self.output {
            OutputFormat::Pretty => render::board(&board),
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&render::board_json(&board))?);
            }
        }
        Ok(())
    }
}
