//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for roundtable
#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(author, version, about = "Synthetic round-table conversations between LLM personas")]
#[command(long_about = r#"
Roundtable seats a fixed set of personas around a topic and lets a language
model speak for each of them in turn.

Participants speak round-robin. By default the conversation runs on its own
until the turn limit is reached; with --manual you drive it from a prompt.

Configuration files are loaded from (in priority order):
1. ROUNDTABLE_<SECTION>__<KEY>   Environment variables
2. --config <path>               Explicit config file
3. ./roundtable.toml             Project-level config
4. ~/.config/roundtable/config.toml   Global config

Example:
  roundtable "Is mathematics discovered or invented?" -p philosopher -p scientist
  roundtable "The future of cities" -p engineer -p artist -p historian --turns 12
  roundtable "Free will" -p philosopher -p psychologist --manual
"#)]
pub struct Cli {
    /// Topic of the conversation
    pub topic: Option<String>,

    /// Participants to seat, in speaking order (can be specified multiple times)
    #[arg(short, long = "participant", value_name = "ID")]
    pub participants: Vec<String>,

    /// Turn limit (0 = unlimited; default from config)
    #[arg(short, long, value_name = "N", allow_negative_numbers = true)]
    pub turns: Option<i64>,

    /// Optional conversation title
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Stream messages as they are generated
    #[arg(long, overrides_with = "no_stream")]
    pub stream: bool,

    /// Print each message only once it is complete
    #[arg(long, overrides_with = "stream")]
    pub no_stream: bool,

    /// Drive turns yourself from an interactive prompt
    #[arg(long)]
    pub manual: bool,

    /// List available participants and exit
    #[arg(long)]
    pub list_participants: bool,

    /// Query the generation backend and exit
    #[arg(long)]
    pub check_backend: bool,

    /// List archived conversations and exit
    #[arg(long)]
    pub archived: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Streaming override from the command line, if any.
    pub fn streaming(&self) -> Option<bool> {
        match (self.stream, self.no_stream) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
