//! Application context for CLI command execution.
//!
//! [`App`] owns the three pieces a command needs: the [`SyncEngine`], the
//! [`Session`] restored from the persisted selection, and the
//! [`DiagramModel`] a refresh fills in.
//!
//! # Example
//!
//! ```no_run
//! use tdg::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut app = App::from_directory(Path::new(".")).await?;
//!     app.refresh().await?;
//!     println!("{}", app.model().to_dot());
//!     Ok(())
//! }
//! ```

use crate::config::{self, TdgConfig};
use crate::diagram::{DiagramEvent, DiagramModel};
use crate::error::{Error, Result};
use crate::session::Session;
use crate::sync::{EngineOptions, EventOutcome, RefreshSummary, SyncEngine};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tdg_trello::{HttpTrelloClient, TrelloApi};

/// Card filter chosen on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardFilter {
    /// Cards of one list
    List(String),
    /// Cards of the board carrying one label
    Label(String),
}

/// Application context for CLI operations.
#[derive(Debug)]
pub struct App {
    engine: SyncEngine,
    session: Session,
    model: DiagramModel,

    /// Path to `.tdg/config.yaml`
    config_path: PathBuf,
}

impl App {
    /// Create an App from the given working directory.
    ///
    /// Searches up the directory tree for `.tdg/`, loads the configuration,
    /// applies the credential environment overrides and builds the HTTPS
    /// client.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No tdg workspace is found in the directory tree
    /// - Configuration cannot be loaded
    /// - Credentials are missing or the base URL is invalid
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = config::find_tdg_root(working_dir).ok_or(Error::NotInitialized)?;
        let config_path = config::config_path(&root_dir);

        let config = TdgConfig::load(&config_path).await?.with_env_overrides();
        let client = HttpTrelloClient::new(config.client_config())?;

        Ok(Self::with_api(Arc::new(client), &config, config_path))
    }

    /// Create an App over an arbitrary remote.
    pub fn with_api(api: Arc<dyn TrelloApi>, config: &TdgConfig, config_path: PathBuf) -> Self {
        let options = EngineOptions {
            single_flight_checklists: config.sync.single_flight_checklists,
        };
        Self {
            engine: SyncEngine::new(api, options),
            session: Session::with_selection(config.selection.clone()),
            model: DiagramModel::new(),
            config_path,
        }
    }

    /// The sync engine.
    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    /// The current session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The diagram as of the last refresh.
    pub fn model(&self) -> &DiagramModel {
        &self.model
    }

    /// Path to the config file.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the selected board's metadata.
    ///
    /// # Errors
    ///
    /// `Error::NoBoardSelected` if the session has no board, or any error
    /// from [`SyncEngine::select_board`].
    pub async fn load_board(&mut self, board: Option<&str>) -> Result<()> {
        let board_id = match board {
            Some(id) => id.to_string(),
            None => self
                .session
                .selection()
                .board
                .clone()
                .ok_or(Error::NoBoardSelected)?,
        };
        self.engine.select_board(&mut self.session, &board_id).await
    }

    /// Select a board and a card filter, refresh, and persist the choice.
    ///
    /// The selection is written only after the refresh succeeds.
    ///
    /// # Errors
    ///
    /// Any error from the engine or from writing the config file.
    pub async fn select(&mut self, board: &str, filter: CardFilter) -> Result<Option<RefreshSummary>> {
        self.engine.select_board(&mut self.session, board).await?;

        // A new filter replaces the previous one instead of narrowing it.
        let selection = self.session.selection_mut();
        selection.list = None;
        selection.label = None;

        let summary = match &filter {
            CardFilter::List(list) => {
                self.engine
                    .select_list(&mut self.session, &mut self.model, list)
                    .await?
            }
            CardFilter::Label(label) => {
                self.engine
                    .select_label(&mut self.session, &mut self.model, label)
                    .await?
            }
        };
        TdgConfig::remember_selection(&self.config_path, self.session.selection()).await?;
        Ok(summary)
    }

    /// Refresh with the current selection.
    ///
    /// # Errors
    ///
    /// Any error from [`SyncEngine::refresh`].
    pub async fn refresh(&mut self) -> Result<Option<RefreshSummary>> {
        self.engine.refresh(&mut self.session, &mut self.model).await
    }

    /// Deliver a diagram event to the engine.
    ///
    /// # Errors
    ///
    /// Any error from [`SyncEngine::handle_event`].
    pub async fn apply(&mut self, event: DiagramEvent) -> Result<EventOutcome> {
        self.engine
            .handle_event(&self.session, &mut self.model, event)
            .await
    }
}
