use std::path::{Path, PathBuf};

mod decompose;
mod interactive;
mod plan;
mod render;
mod terminal;

use anyhow::Context;
use clap::ArgAction;
use planner::{
    Config,
    domain::{Difficulty, IndicatorSize, StatusFilter, Tools},
};
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML configuration file
    ///
    /// Without one, the built-in endpoints and defaults are used.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = load_config(self.config.as_deref())?;

        self.command
            .unwrap_or(Command::Interactive(interactive::Command::default()))
            .run(config)
            .await
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[instrument]
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    Config::load(path)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("invalid configuration in {}", path.display()))
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Decompose a prompt into learning indicators
    Decompose(decompose::Command),

    /// Request planning suggestions for a confirm payload
    ///
    /// The payload is the JSON printed by `decompose --output json`, possibly
    /// edited by hand.
    Plan(plan::Command),

    /// Review, revise and confirm interactively (default)
    Interactive(interactive::Command),

    /// Print the effective configuration as TOML
    Config,
}

impl Command {
    async fn run(self, config: Config) -> anyhow::Result<()> {
        match self {
            Self::Decompose(command) => command.run(&config).await?,
            Self::Plan(command) => command.run(&config).await?,
            Self::Interactive(command) => command.run(&config).await?,
            Self::Config => {
                let toml = config.to_toml().map_err(|e| anyhow::anyhow!("{e}"))?;
                print!("{toml}");
            }
        }
        Ok(())
    }
}

/// Output format of the one-shot commands.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum DifficultyArg {
    School,
    Standard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::School => Self::School,
            DifficultyArg::Standard => Self::Standard,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum IndicatorSizeArg {
    Atomic,
    Standard,
    Integrative,
}

impl From<IndicatorSizeArg> for IndicatorSize {
    fn from(value: IndicatorSizeArg) -> Self {
        match value {
            IndicatorSizeArg::Atomic => Self::Atomic,
            IndicatorSizeArg::Standard => Self::Standard,
            IndicatorSizeArg::Integrative => Self::Integrative,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum FilterArg {
    #[default]
    All,
    Covered,
    Pending,
}

impl From<FilterArg> for StatusFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => Self::All,
            FilterArg::Covered => Self::Covered,
            FilterArg::Pending => Self::Pending,
        }
    }
}

/// Overrides of the configured generation options.
#[derive(Debug, Clone, Default, clap::Args)]
struct ToolArgs {
    /// Enrich the decomposition with external research
    #[arg(long)]
    research: bool,

    /// Do not level indicators against the target audience
    #[arg(long)]
    no_leveling: bool,

    /// Difficulty of the generated indicators
    #[arg(long, value_name = "LEVEL")]
    difficulty: Option<DifficultyArg>,

    /// Granularity of the generated indicators
    #[arg(long, value_name = "SIZE")]
    indicator_size: Option<IndicatorSizeArg>,
}

impl ToolArgs {
    fn apply(&self, mut tools: Tools) -> Tools {
        if self.research {
            tools.research = true;
        }
        if self.no_leveling {
            tools.leveling = false;
        }
        if let Some(difficulty) = self.difficulty {
            tools.difficulty = difficulty.into();
        }
        if let Some(size) = self.indicator_size {
            tools.indicator_size = size.into();
        }
        tools
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn interactive_is_the_default_command() {
        let cli = Cli::try_parse_from(["planner"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn verbosity_and_config_are_global() {
        let cli =
            Cli::try_parse_from(["planner", "config", "-vv", "--config", "planner.toml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("planner.toml")));
    }

    #[test]
    fn tool_flags_override_configured_options() {
        let cli = Cli::try_parse_from([
            "planner",
            "decompose",
            "Essay writing",
            "--research",
            "--no-leveling",
            "--difficulty",
            "school",
            "--indicator-size",
            "atomic",
        ])
        .unwrap();
        let Some(Command::Decompose(command)) = cli.command else {
            panic!("expected the decompose command");
        };
        let tools = command.tools().apply(Tools::default());
        assert_eq!(
            tools,
            Tools {
                research: true,
                leveling: false,
                difficulty: Difficulty::School,
                indicator_size: IndicatorSize::Atomic,
            }
        );
    }

    #[test]
    fn absent_tool_flags_keep_configured_options() {
        let configured = Tools {
            research: true,
            ..Tools::default()
        };
        assert_eq!(ToolArgs::default().apply(configured), configured);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
        assert_eq!(load_config(None).unwrap(), Config::default());
    }
}
