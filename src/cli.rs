use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Link notes to documents stored on a Paperless server.
#[derive(Debug, Parser)]
#[command(name = "paperlink", version, about)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON). Defaults to the per-user
    /// config directory.
    #[arg(long, global = true, env = "PAPERLINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `paperlink_library=trace`. Overrides `-v`
    /// and `RUST_LOG`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a permanent share URL for a document, creating one if needed.
    Resolve { id: u64 },
    /// Save a document into the storage folder and print its path.
    Fetch { id: u64 },
    /// Insert a link into a note file.
    ///
    /// With `--id`, the link replaces nothing and lands at the cursor.
    /// Without it, the Paperless URL under the cursor is replaced.
    Insert {
        note: PathBuf,
        /// Cursor line (1-based).
        #[arg(long, default_value_t = 1)]
        line: usize,
        /// Cursor column in characters (1-based).
        #[arg(long, default_value_t = 1)]
        column: usize,
        #[arg(long)]
        id: Option<u64>,
    },
    /// Reload the document and tag listings.
    Refresh,
    /// List documents, newest first.
    Browse {
        /// Page number (1-based).
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Save the page's thumbnails into this folder.
        #[arg(long)]
        thumbnails: Option<PathBuf>,
    },
    /// Check the server URL and token.
    Test,
}

impl Cli {
    /// Log filter directive from the flags, if any were given.
    pub fn log_directive(&self) -> Option<String> {
        if let Some(level) = &self.log_level {
            return Some(level.clone());
        }
        match self.verbose {
            0 => None,
            1 => Some("info".to_string()),
            2 => Some("debug".to_string()),
            _ => Some("trace".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["paperlink", "test"], None)]
    #[case(&["paperlink", "-v", "test"], Some("info"))]
    #[case(&["paperlink", "test", "-vv"], Some("debug"))]
    #[case(&["paperlink", "-vvvv", "test"], Some("trace"))]
    #[case(&["paperlink", "-v", "--log-level", "warn", "test"], Some("warn"))]
    fn test_log_directive(#[case] args: &[&str], #[case] expected: Option<&str>) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.log_directive().as_deref(), expected);
    }

    #[test]
    fn test_insert_arguments() {
        let cli = Cli::try_parse_from(["paperlink", "insert", "notes/tax.md", "--line", "3", "--column", "10"]).unwrap();
        let Command::Insert { note, line, column, id } = cli.command else { panic!("expected insert") };
        assert_eq!(note, PathBuf::from("notes/tax.md"));
        assert_eq!((line, column, id), (3, 10, None));
    }

    #[test]
    fn test_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["paperlink", "fetch", "abc"]).is_err());
    }

    #[test]
    fn test_browse_defaults() {
        let cli = Cli::try_parse_from(["paperlink", "--config", "/tmp/p.toml", "browse"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.toml")));
        assert!(matches!(cli.command, Command::Browse { page: 1, thumbnails: None }));
    }
}
