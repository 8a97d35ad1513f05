//! The dependency synchronization engine.
//!
//! A refresh cycle fetches the cards selected by the session's filter,
//! reconciles the diagram's nodes against them, then materializes the full
//! link set from every card's "Dependencies" checklist. Graph edits go the
//! other way through the commands in [`commands`].

pub mod checklist;
pub mod commands;
pub mod materialize;
pub mod reconcile;

pub use checklist::{ChecklistResolver, DEPENDENCIES_CHECKLIST};
pub use commands::{AddOutcome, EventOutcome};
pub use reconcile::ReconcileSummary;

use crate::diagram::DiagramModel;
use crate::domain::ShortId;
use crate::error::{Error, Result};
use crate::session::{BoardContext, Selection, Session};
use serde::Serialize;
use std::sync::Arc;
use tdg_trello::{Board, Card, TrelloApi};
use tracing::{debug, info};

/// Engine behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Share concurrent checklist resolves for the same card.
    pub single_flight_checklists: bool,
}

/// Counts from one completed refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    /// Cards in the new snapshot.
    pub cards: usize,

    /// Tickets pruned because their card is gone.
    pub removed: Vec<ShortId>,

    /// Tickets written from cards.
    pub upserted: usize,

    /// Links materialized.
    pub links: usize,
}

/// Runs refresh cycles and graph edits against a [`TrelloApi`].
pub struct SyncEngine {
    api: Arc<dyn TrelloApi>,
    resolver: ChecklistResolver,
}

impl SyncEngine {
    /// Create an engine over the given remote.
    pub fn new(api: Arc<dyn TrelloApi>, options: EngineOptions) -> Self {
        let resolver = ChecklistResolver::new(Arc::clone(&api), options.single_flight_checklists);
        Self { api, resolver }
    }

    /// The checklist resolver used by refreshes and commands.
    pub fn resolver(&self) -> &ChecklistResolver {
        &self.resolver
    }

    /// Boards of the authenticated member.
    ///
    /// # Errors
    ///
    /// Returns `Error::Api` if the remote call fails.
    pub async fn boards(&self) -> Result<Vec<Board>> {
        Ok(self.api.my_boards().await?)
    }

    // ========== Selection ==========

    /// Select a board and load its lists, labels and short URL.
    ///
    /// Choosing a different board than the current one clears the list and
    /// label filters. The session is only changed when all three calls
    /// succeed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Api` if any of the remote calls fails.
    pub async fn select_board(&self, session: &mut Session, board_id: &str) -> Result<()> {
        let (lists, labels, short_url) = tokio::try_join!(
            self.api.board_lists(board_id),
            self.api.board_labels(board_id),
            self.api.board_short_url(board_id),
        )?;

        let selection = session.selection_mut();
        if selection.board.as_deref() != Some(board_id) {
            selection.board = Some(board_id.to_string());
            selection.list = None;
            selection.label = None;
        }
        debug!(
            board_id,
            lists = lists.len(),
            labels = labels.len(),
            "Loaded board"
        );
        session.set_board(BoardContext {
            lists,
            labels,
            short_url,
        });
        Ok(())
    }

    /// Select a list as the card source and refresh.
    ///
    /// # Errors
    ///
    /// Any error from [`refresh`](Self::refresh). The selection change is
    /// kept even when the refresh fails.
    pub async fn select_list(
        &self,
        session: &mut Session,
        model: &mut DiagramModel,
        list_id: &str,
    ) -> Result<Option<RefreshSummary>> {
        session.selection_mut().list = Some(list_id.to_string());
        self.refresh(session, model).await
    }

    /// Select a label as a card filter and refresh.
    ///
    /// # Errors
    ///
    /// Any error from [`refresh`](Self::refresh). The selection change is
    /// kept even when the refresh fails.
    pub async fn select_label(
        &self,
        session: &mut Session,
        model: &mut DiagramModel,
        label_id: &str,
    ) -> Result<Option<RefreshSummary>> {
        session.selection_mut().label = Some(label_id.to_string());
        self.refresh(session, model).await
    }

    // ========== Refresh ==========

    /// Fetch the cards a selection designates.
    ///
    /// A selected list is the source; otherwise all cards of the selected
    /// board. A selected label then keeps only the cards carrying it.
    ///
    /// # Errors
    ///
    /// - `Error::NoBoardSelected` when only a label is set and no board is
    /// - `Error::Api` if the remote call fails
    pub async fn fetch_cards(&self, selection: &Selection) -> Result<Vec<Card>> {
        let mut cards = match (&selection.list, &selection.board) {
            (Some(list), _) => self.api.list_cards(list).await?,
            (None, Some(board)) => self.api.board_cards(board).await?,
            (None, None) => return Err(Error::NoBoardSelected),
        };
        if let Some(label) = &selection.label {
            cards.retain(|card| card.has_label(label));
        }
        Ok(cards)
    }

    /// Run one refresh cycle.
    ///
    /// Returns `Ok(None)` and changes nothing when no list or label is
    /// selected. On success the model holds exactly the fetched cards and
    /// their materialized links, and the session holds the new snapshot. On
    /// failure both are left as they were.
    ///
    /// # Errors
    ///
    /// Returns the first error from fetching cards or resolving checklists.
    pub async fn refresh(
        &self,
        session: &mut Session,
        model: &mut DiagramModel,
    ) -> Result<Option<RefreshSummary>> {
        if !session.selection().has_card_filter() {
            debug!("Nothing selected, skipping refresh");
            return Ok(None);
        }

        let cards = self.fetch_cards(session.selection()).await?;

        let mut staged = model.clone();
        let reconciled = reconcile::reconcile(&mut staged, &cards);
        let dependencies = materialize::materialize(&self.resolver, &cards).await?;

        let summary = RefreshSummary {
            cards: cards.len(),
            removed: reconciled.removed,
            upserted: reconciled.upserted,
            links: dependencies.len(),
        };
        staged.replace_links(dependencies);
        *model = staged;
        session.replace_snapshot(cards);

        info!(
            cards = summary.cards,
            removed = summary.removed.len(),
            links = summary.links,
            "Refreshed dependency graph"
        );
        Ok(Some(summary))
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
