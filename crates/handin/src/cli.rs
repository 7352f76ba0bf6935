//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;
use handin_core::{DeliveryMode, SubmitRequest};

/// Submit a puzzle solution directory by email.
///
/// The directory must sit inside a folder named after the puzzle, for
/// example `hoppity/python/`. It must hold a `Makefile` or an executable
/// named after the puzzle; a `lib/` folder next to it is attached as
/// `lib.tar.gz`.
#[derive(Debug, Parser)]
#[command(name = "handin", version, about, long_about)]
pub struct Cli {
    /// Solution directory
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Send to the grader instead of the test address
    #[arg(long)]
    pub real: bool,

    /// Note to include in the message body
    #[arg(short, long, value_name = "TEXT")]
    pub message: Option<String>,

    /// Log every step
    #[arg(short, long)]
    pub verbose: bool,

    /// Prepare the message but do not ask for a password or send it
    #[arg(long)]
    pub dry_run: bool,

    /// Settings file (defaults to <config dir>/handin/config.json)
    #[arg(long, env = "HANDIN_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Turns the arguments into a submission request.
    #[must_use]
    pub fn request(&self) -> SubmitRequest {
        SubmitRequest {
            directory: self.directory.clone(),
            mode: if self.real {
                DeliveryMode::Real
            } else {
                DeliveryMode::Test
            },
            note: self.message.clone(),
            dry_run: self.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_test_mode() {
        let cli = Cli::parse_from(["handin", "hoppity/python"]);
        let request = cli.request();
        assert_eq!(request.mode, DeliveryMode::Test);
        assert_eq!(request.directory, Some(PathBuf::from("hoppity/python")));
        assert!(!request.dry_run);
    }

    #[test]
    fn flags_map_onto_the_request() {
        let cli = Cli::parse_from([
            "handin",
            "--real",
            "-m",
            "second try",
            "--dry-run",
            "-v",
            "gattaca/rust",
        ]);
        assert!(cli.verbose);
        let request = cli.request();
        assert_eq!(request.mode, DeliveryMode::Real);
        assert_eq!(request.note.as_deref(), Some("second try"));
        assert!(request.dry_run);
    }

    #[test]
    fn directory_is_optional_at_parse_time() {
        let cli = Cli::parse_from(["handin"]);
        assert!(cli.request().directory.is_none());
    }
}
