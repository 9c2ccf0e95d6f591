use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::version;

#[derive(Parser)]
#[command(author, version = version(), about, long_about = None)]
#[command(subcommand_value_name = "SUBCOMMAND")]
#[command(subcommand_help_heading = "Subcommands")]
pub struct Cli {
    /// Path to config file (default: the bundled default config).
    ///
    /// This can also be set with the `MOTOSCROLL_CONFIG` environment variable. If both are set,
    /// the command line argument takes precedence.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub subcommand: Sub,
}

#[derive(Subcommand)]
pub enum Sub {
    /// Run a recorded trace on a virtual clock and print the scroll events as JSON lines.
    Replay {
        /// JSON array of `{ "time_stamp", "pointing_motion" }` records.
        input: PathBuf,
        /// JSON array of the scroll events the trace must produce.
        #[arg(short, long)]
        expected: Option<PathBuf>,
    },
    /// Play a recorded trace in real time, printing scroll events as they happen.
    Play {
        /// JSON array of `{ "time_stamp", "pointing_motion" }` records.
        input: PathBuf,
    },
    /// Validate the config file.
    Validate,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_after_subcommand() {
        let cli = Cli::try_parse_from(["motoscroll", "replay", "trace.json", "-c", "my.kdl"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("my.kdl")));
        assert!(matches!(
            cli.subcommand,
            Sub::Replay { expected: None, .. }
        ));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["motoscroll"]).is_err());
    }
}
