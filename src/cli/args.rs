use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "neurolink")]
#[command(version)]
#[command(
    about = "Passcode-gated, self-healing LLM router for Google AI and Groq",
    long_about = None
)]
pub struct Cli {
    /// Pin a model by id for this run (e.g., gemini-2.5-pro, groq/compound)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Credential record location (overrides config)
    #[arg(long, env = "NEUROLINK_RECORD")]
    pub record: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Non-interactive prompt to execute
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Output format for non-interactive mode
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, requires = "prompt")]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Write a default configuration file
    Init,
    /// List the model catalog
    Models,
    /// Start an interactive session (default)
    Chat,
    /// Check which catalog models the providers currently serve
    Status,
    /// Show recent prompts and responses
    History {
        /// Number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
}
