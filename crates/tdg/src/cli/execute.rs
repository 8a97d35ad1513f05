//! Command execution logic.

use anyhow::{Result, bail};

use super::args::{BoardArgs, GraphArgs, InitArgs, LinkArgs, SelectArgs};
use crate::app::{App, CardFilter};
use crate::config::{self, TdgConfig};
use crate::diagram::DiagramEvent;
use crate::output::{self, GraphFormat, OutputMode};

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    let current_dir = std::env::current_dir()?;

    let mut config = TdgConfig::default();
    if let Some(base_url) = &args.base_url {
        config.api.base_url.clone_from(base_url);
    }
    config.api.key.clone_from(&args.key);
    config.api.token.clone_from(&args.token);
    config.sync.single_flight_checklists = args.single_flight;

    let result = config::init(&current_dir, &config).await?;

    if !args.quiet {
        println!("Initialized tdg in {}", result.tdg_dir.display());
        println!("  Config: {}", result.config_file.display());
        if config.api.key.is_none() || config.api.token.is_none() {
            println!(
                "  Set {} and {} or edit the config to add credentials",
                config::API_KEY_ENV,
                config::TOKEN_ENV
            );
        }
    }

    Ok(())
}

/// Execute the boards command
pub async fn execute_boards(app: &App, output_mode: OutputMode) -> Result<()> {
    let boards = app.engine().boards().await?;
    output::print_boards(&boards, output_mode)?;
    Ok(())
}

/// Execute the board command
pub async fn execute_board(app: &mut App, args: &BoardArgs, output_mode: OutputMode) -> Result<()> {
    app.load_board(args.board.as_deref()).await?;

    let board_id = app.session().selection().board.clone().unwrap_or_default();
    let Some(board) = app.session().board() else {
        bail!("Board {board_id} could not be loaded");
    };
    output::print_board(&board_id, board, output_mode)?;
    Ok(())
}

/// Execute the select command
pub async fn execute_select(app: &mut App, args: &SelectArgs, output_mode: OutputMode) -> Result<()> {
    let filter = match (&args.list, &args.label) {
        (Some(list), _) => CardFilter::List(list.clone()),
        (None, Some(label)) => CardFilter::Label(label.clone()),
        (None, None) => bail!("Select a list or a label"),
    };

    let summary = app.select(&args.board, filter).await?;
    output::print_graph(app.model(), summary.as_ref(), graph_format(args.format, output_mode))?;
    Ok(())
}

/// Execute the graph command
pub async fn execute_graph(app: &mut App, args: &GraphArgs, output_mode: OutputMode) -> Result<()> {
    let Some(summary) = app.refresh().await? else {
        bail!("Nothing selected: run 'tdg select --board <ID> --list <ID>' first");
    };
    output::print_graph(app.model(), Some(&summary), graph_format(args.format, output_mode))?;
    Ok(())
}

/// Execute the link command
pub async fn execute_link(app: &mut App, args: &LinkArgs, output_mode: OutputMode) -> Result<()> {
    refresh_for_edit(app).await?;
    let outcome = app
        .apply(DiagramEvent::Linked {
            from: args.parent,
            to: args.child,
        })
        .await?;
    output::print_event_outcome(&outcome, output_mode)?;
    Ok(())
}

/// Execute the unlink command
pub async fn execute_unlink(app: &mut App, args: &LinkArgs, output_mode: OutputMode) -> Result<()> {
    refresh_for_edit(app).await?;
    let outcome = app
        .apply(DiagramEvent::LinkDeleted {
            from: args.parent,
            to: args.child,
        })
        .await?;
    output::print_event_outcome(&outcome, output_mode)?;
    Ok(())
}

async fn refresh_for_edit(app: &mut App) -> Result<()> {
    if app.refresh().await?.is_none() {
        bail!("Nothing selected: run 'tdg select' before editing dependencies");
    }
    Ok(())
}

/// `--json` wins over `--format text`.
fn graph_format(format: GraphFormat, output_mode: OutputMode) -> GraphFormat {
    match (output_mode, format) {
        (OutputMode::Json, GraphFormat::Text) => GraphFormat::Json,
        (_, format) => format,
    }
}
