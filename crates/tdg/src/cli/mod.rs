//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Create `.tdg/` with a config file
//! - `boards`: List the member's boards
//! - `board`: Show a board's lists and labels
//! - `select`: Choose a board and a list or label, then show the graph
//! - `graph`: Refresh and show the graph for the saved selection
//! - `link` / `unlink`: Add or remove a dependency between two tickets
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! tdg init --key $KEY --token $TOKEN
//! tdg select --board 5f1c... --list 5f1d...
//! tdg link 12 14
//! tdg graph --format dot | dot -Tsvg > deps.svg
//! ```

mod args;
mod execute;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{BoardArgs, GraphArgs, InitArgs, LinkArgs, SelectArgs, parse_ticket};

/// tdg - Ticket dependency graphs on top of Trello
///
/// Dependencies are stored on each card as items of a "Dependencies"
/// checklist, one item per ticket it depends on.
#[derive(Parser, Debug)]
#[command(name = "tdg")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a tdg workspace
    ///
    /// Creates `.tdg/config.yaml` and a `.gitignore` that keeps it out of
    /// version control.
    Init(InitArgs),

    /// List your boards
    Boards,

    /// Show a board's lists and labels
    Board(BoardArgs),

    /// Select a board and a card filter
    ///
    /// The choice is saved and used by `graph`, `link` and `unlink`.
    Select(SelectArgs),

    /// Refresh and print the dependency graph
    Graph(GraphArgs),

    /// Record that CHILD depends on PARENT
    Link(LinkArgs),

    /// Remove the dependency of CHILD on PARENT
    Unlink(LinkArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args).await,
            Some(Commands::Boards) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_boards(&app, output_mode).await
            }
            Some(Commands::Board(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_board(&mut app, args, output_mode).await
            }
            Some(Commands::Select(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_select(&mut app, args, output_mode).await
            }
            Some(Commands::Graph(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_graph(&mut app, args, output_mode).await
            }
            Some(Commands::Link(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_link(&mut app, args, output_mode).await
            }
            Some(Commands::Unlink(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_unlink(&mut app, args, output_mode).await
            }
            None => {
                println!("tdg ticket dependency graph");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShortId;
    use crate::output::GraphFormat;

    #[test]
    fn test_parse_no_command() {
        let cli = Cli::try_parse_from(["tdg"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_global_json_after_subcommand() {
        let cli = Cli::try_parse_from(["tdg", "boards", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Commands::Boards)));
    }

    #[test]
    fn test_parse_select_with_list() {
        let cli =
            Cli::try_parse_from(["tdg", "select", "--board", "b1", "--list", "l1"]).unwrap();
        let Some(Commands::Select(args)) = cli.command else {
            panic!("expected select");
        };
        assert_eq!(args.board, "b1");
        assert_eq!(args.list.as_deref(), Some("l1"));
        assert_eq!(args.format, GraphFormat::Text);
    }

    #[test]
    fn test_parse_select_requires_a_filter() {
        assert!(Cli::try_parse_from(["tdg", "select", "--board", "b1"]).is_err());
    }

    #[test]
    fn test_parse_select_rejects_both_filters() {
        let result = Cli::try_parse_from([
            "tdg", "select", "--board", "b1", "--list", "l1", "--label", "x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_graph_format() {
        let cli = Cli::try_parse_from(["tdg", "graph", "--format", "dot"]).unwrap();
        let Some(Commands::Graph(args)) = cli.command else {
            panic!("expected graph");
        };
        assert_eq!(args.format, GraphFormat::Dot);
    }

    #[test]
    fn test_parse_link_accepts_hashtags() {
        let cli = Cli::try_parse_from(["tdg", "link", "#3", "4"]).unwrap();
        let Some(Commands::Link(args)) = cli.command else {
            panic!("expected link");
        };
        assert_eq!(args.parent, ShortId(3));
        assert_eq!(args.child, ShortId(4));
    }

    #[test]
    fn test_parse_link_rejects_garbage() {
        assert!(Cli::try_parse_from(["tdg", "unlink", "abc", "4"]).is_err());
    }
}
