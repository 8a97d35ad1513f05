//! Output formatting for CLI commands.
//!
//! Every command prints either human-readable text or JSON. Text writers take
//! an `impl Write` so they can be tested against a buffer.

pub mod color;

use crate::diagram::DiagramModel;
use crate::domain::Ticket;
use crate::session::BoardContext;
use crate::sync::{AddOutcome, EventOutcome, RefreshSummary};
use clap::ValueEnum;
use serde::Serialize;
use std::env;
use std::io::{self, Write};
use tdg_trello::Board;

pub use color::{info, success, warning};

use color::{bold, colorize_labels, dimmed};

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `TDG_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        // https://no-color.org/
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TDG_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self { use_colors }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// How `tdg graph` renders the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GraphFormat {
    /// Tickets grouped by dependency depth
    #[default]
    Text,
    /// Graphviz DOT
    Dot,
    /// Nodes and links as JSON
    Json,
}

/// JSON shape of a rendered diagram.
#[derive(Debug, Serialize)]
pub struct GraphJson<'a> {
    /// Tickets ordered by id
    pub nodes: Vec<&'a Ticket>,
    /// Links in materialization order
    pub links: &'a [crate::diagram::Link],
    /// Counts from the refresh that produced the diagram
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<&'a RefreshSummary>,
}

impl<'a> GraphJson<'a> {
    /// Borrow a model for serialization.
    pub fn new(model: &'a DiagramModel, summary: Option<&'a RefreshSummary>) -> Self {
        Self {
            nodes: model.nodes().collect(),
            links: model.links(),
            summary,
        }
    }
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a message to stdout.
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a value as JSON.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{json}")
}

/// Print the member's boards.
pub fn print_boards(boards: &[Board], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(&boards),
        OutputMode::Text => {
            let stdout = io::stdout();
            write_boards_text(&mut stdout.lock(), boards, &OutputConfig::from_env())
        }
    }
}

/// Print a board's lists and labels.
pub fn print_board(board_id: &str, board: &BoardContext, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "id": board_id,
            "short_url": board.short_url,
            "lists": board.lists,
            "labels": board.labels,
        })),
        OutputMode::Text => {
            let stdout = io::stdout();
            write_board_text(&mut stdout.lock(), board_id, board, &OutputConfig::from_env())
        }
    }
}

/// Print the diagram in the requested format.
pub fn print_graph(
    model: &DiagramModel,
    summary: Option<&RefreshSummary>,
    format: GraphFormat,
) -> io::Result<()> {
    match format {
        GraphFormat::Json => print_json(&GraphJson::new(model, summary)),
        GraphFormat::Dot => print_message(&model.to_dot()),
        GraphFormat::Text => {
            let stdout = io::stdout();
            write_graph_text(&mut stdout.lock(), model, &OutputConfig::from_env())
        }
    }
}

/// Print the result of a link or unlink.
pub fn print_event_outcome(outcome: &EventOutcome, mode: OutputMode) -> io::Result<()> {
    let config = OutputConfig::from_env();
    match mode {
        OutputMode::Json => print_json(&event_outcome_json(outcome)),
        OutputMode::Text => print_message(&event_outcome_text(outcome, &config)),
    }
}

// ============================================================================
// Text Formatting
// ============================================================================

fn write_boards_text<W: Write>(w: &mut W, boards: &[Board], config: &OutputConfig) -> io::Result<()> {
    if boards.is_empty() {
        return writeln!(w, "{}", warning("No boards found", config));
    }
    for board in boards {
        let closed = if board.closed {
            format!(" {}", dimmed("(closed)", config))
        } else {
            String::new()
        };
        writeln!(w, "{}  {}{closed}", info(&board.id, config), board.name)?;
    }
    Ok(())
}

fn write_board_text<W: Write>(
    w: &mut W,
    board_id: &str,
    board: &BoardContext,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{} {}", bold("Board", config), info(board_id, config))?;
    writeln!(w, "{} {}", dimmed("URL:", config), board.short_url)?;
    writeln!(w)?;

    writeln!(w, "{}", bold("Lists", config))?;
    for list in board.lists.iter().filter(|list| !list.closed) {
        writeln!(w, "  {}  {}", info(&list.id, config), list.name)?;
    }
    writeln!(w)?;

    writeln!(w, "{}", bold("Labels", config))?;
    for label in &board.labels {
        let color = label.color.as_deref().unwrap_or("none");
        writeln!(
            w,
            "  {}  {} {}",
            info(&label.id, config),
            colorize_labels(&[label.name.as_str()], config),
            dimmed(&format!("({color})"), config)
        )?;
    }
    Ok(())
}

fn format_estimation(ticket: &Ticket) -> String {
    let mut parts = Vec::new();
    if ticket.is_complexity_estimation_visible
        && let Some(value) = ticket.complexity_estimation
    {
        parts.push(format!("({value})"));
    }
    if ticket.is_complexity_real_visible
        && let Some(value) = ticket.complexity_real
    {
        parts.push(format!("[{value}]"));
    }
    parts.join(" ")
}

/// Write the diagram as dependency layers, each ticket followed by the
/// tickets it depends on.
pub fn write_graph_text<W: Write>(
    w: &mut W,
    model: &DiagramModel,
    config: &OutputConfig,
) -> io::Result<()> {
    if model.node_count() == 0 {
        return writeln!(w, "{}", warning("No tickets", config));
    }

    for (depth, layer) in model.layers().iter().enumerate() {
        writeln!(w, "{}", bold(&format!("Layer {depth}"), config))?;
        for id in layer {
            let Some(ticket) = model.node(*id) else {
                continue;
            };
            let mut line = format!("  {}  {}", info(&id.hashtag(), config), ticket.title);

            let estimation = format_estimation(ticket);
            if !estimation.is_empty() {
                line.push_str(&format!("  {}", dimmed(&estimation, config)));
            }

            let label_names: Vec<&str> = ticket.labels.iter().map(|l| l.name.as_str()).collect();
            let labels = colorize_labels(&label_names, config);
            if !labels.is_empty() {
                line.push_str(&format!("  {labels}"));
            }

            let parents: Vec<String> = model
                .links()
                .iter()
                .filter(|link| link.to == *id)
                .map(|link| info(&link.from.hashtag(), config))
                .collect();
            if !parents.is_empty() {
                line.push_str(&format!("  {} {}", dimmed("<-", config), parents.join(", ")));
            }
            writeln!(w, "{line}")?;
        }
    }
    writeln!(
        w,
        "\n{} tickets, {} links",
        model.node_count(),
        model.links().len()
    )
}

fn event_outcome_text(outcome: &EventOutcome, config: &OutputConfig) -> String {
    match outcome {
        EventOutcome::Linked(AddOutcome::Created(item)) => {
            success(&format!("Added dependency (item {})", item.id), config)
        }
        EventOutcome::Linked(AddOutcome::AlreadyPresent(id)) => {
            warning(&format!("Dependency already recorded (item {id})"), config)
        }
        EventOutcome::Unlinked(Some(id)) => {
            success(&format!("Removed dependency (item {id})"), config)
        }
        EventOutcome::Unlinked(None) => warning("No such dependency", config),
        EventOutcome::Moved => String::new(),
    }
}

fn event_outcome_json(outcome: &EventOutcome) -> serde_json::Value {
    match outcome {
        EventOutcome::Linked(AddOutcome::Created(item)) => {
            serde_json::json!({ "status": "created", "item_id": item.id })
        }
        EventOutcome::Linked(AddOutcome::AlreadyPresent(id)) => {
            serde_json::json!({ "status": "already_present", "item_id": id })
        }
        EventOutcome::Unlinked(Some(id)) => {
            serde_json::json!({ "status": "deleted", "item_id": id })
        }
        EventOutcome::Unlinked(None) => serde_json::json!({ "status": "not_found" }),
        EventOutcome::Moved => serde_json::json!({ "status": "moved" }),
    }
}
