use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Dataset to load before the first question.
    ///
    /// CSV and Excel (.xlsx) files need a header row. JSON files hold an array
    /// of flat objects, JSON Lines files one object per line.
    #[arg(long, short = 'd')]
    pub data: Option<PathBuf>,

    /// Question to answer without entering interactive mode.
    ///
    /// Requires `--data`.
    #[arg(long, short = 'p', requires = "data")]
    pub prompt: Option<String>,

    /// Enable verbose output mode.
    ///
    /// Logs rendered prompts and generated queries to stderr.
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "datachat=debug"
        } else {
            "datachat=info"
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_prompt_with_data() {
        let actual = Cli::try_parse_from(["datachat", "-d", "items.csv", "-p", "how many?"]).unwrap();

        assert_eq!(actual.data, Some(PathBuf::from("items.csv")));
        assert_eq!(actual.prompt.as_deref(), Some("how many?"));
        assert_eq!(actual.log_filter(), "datachat=info");
    }

    #[test]
    fn test_prompt_requires_data() {
        let actual = Cli::try_parse_from(["datachat", "--prompt", "how many?"]);
        assert!(actual.is_err());
    }

    #[test]
    fn test_verbose_raises_log_level() {
        let actual = Cli::try_parse_from(["datachat", "--verbose"]).unwrap();
        assert_eq!(actual.log_filter(), "datachat=debug");
    }
}
