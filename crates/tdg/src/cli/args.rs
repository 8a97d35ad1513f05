//! CLI argument structs for all commands.

use clap::{ArgGroup, Parser};

use crate::domain::ShortId;
use crate::output::GraphFormat;

/// Parse a ticket reference given as `42` or `#42`.
pub fn parse_ticket(s: &str) -> Result<ShortId, String> {
    let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{s}' is not a ticket number (expected e.g. 42 or #42)"));
    }
    digits
        .parse::<u32>()
        .map(ShortId)
        .map_err(|e| format!("'{s}' is not a ticket number: {e}"))
}

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Trello application key (can also come from TRELLO_API_KEY)
    #[arg(long)]
    pub key: Option<String>,

    /// Trello member token (can also come from TRELLO_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// REST root, for self-hosted proxies
    #[arg(long)]
    pub base_url: Option<String>,

    /// Share concurrent checklist lookups for the same card
    #[arg(long)]
    pub single_flight: bool,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `board` command
#[derive(Parser, Debug, Clone)]
pub struct BoardArgs {
    /// Board id (defaults to the selected board)
    #[arg(short, long)]
    pub board: Option<String>,
}

/// Arguments for the `select` command
#[derive(Parser, Debug, Clone)]
#[command(group(ArgGroup::new("filter").required(true).args(["list", "label"])))]
pub struct SelectArgs {
    /// Board id
    #[arg(short, long)]
    pub board: String,

    /// Take cards from this list
    #[arg(short, long)]
    pub list: Option<String>,

    /// Take the board's cards carrying this label
    #[arg(long)]
    pub label: Option<String>,

    /// Graph output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: GraphFormat,
}

/// Arguments for the `graph` command
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Graph output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: GraphFormat,
}

/// Arguments for the `link` and `unlink` commands
#[derive(Parser, Debug, Clone)]
pub struct LinkArgs {
    /// Ticket that must be done first (e.g. 12 or #12)
    #[arg(value_parser = parse_ticket)]
    pub parent: ShortId,

    /// Ticket that depends on the parent
    #[arg(value_parser = parse_ticket)]
    pub child: ShortId,
}
