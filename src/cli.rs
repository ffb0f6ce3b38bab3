//! Top-level argument parser.

use clap::Parser;

use crate::cmd::Commands;
use crate::config::Theme;

/// Height task management from the terminal.
#[derive(Parser)]
#[command(name = "ht", version, about, long_about = None)]
pub struct Cli {
    /// Height API key (overrides HEIGHT_API_KEY and the config file).
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Terminal theme used for tint fallbacks.
    #[arg(long, global = true, value_enum)]
    pub theme: Option<Theme>,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_apply_after_the_subcommand() {
        let cli = Cli::parse_from(["ht", "view", "T-1", "--api-key", "secret"]);
        assert_eq!(cli.api_key.as_deref(), Some("secret"));
    }
}
