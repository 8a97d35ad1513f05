//! Explicit session state for the sync engine.
//!
//! A [`Session`] is created once at startup and passed by reference into the
//! engine's operations. Only board/list/label selection and refresh mutate
//! it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tdg_trello::{BoardList, Card, Label};

/// Read-only copy of the cards fetched by one refresh.
///
/// Each refresh swaps in a new snapshot; mutation commands work against
/// whichever snapshot they were handed, even if it has been replaced since.
pub type CardSnapshot = Arc<[Card]>;

/// The user's current board and card filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Selected board id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,

    /// Selected list id; cards come from this list when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,

    /// Selected label id; cards must carry this label when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Selection {
    /// Whether a refresh has a card source to read from.
    pub fn has_card_filter(&self) -> bool {
        self.list.is_some() || self.label.is_some()
    }
}

/// Board metadata fetched when a board is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardContext {
    /// Lists on the board.
    pub lists: Vec<BoardList>,

    /// Labels defined on the board.
    pub labels: Vec<Label>,

    /// Short URL of the board, for linking back to Trello.
    pub short_url: String,
}

/// State shared by refresh, selection and mutation operations.
#[derive(Debug, Clone, Default)]
pub struct Session {
    selection: Selection,
    board: Option<BoardContext>,
    snapshot: Option<CardSnapshot>,
}

impl Session {
    /// Start a session with no selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session from a previously persisted selection.
    ///
    /// Board metadata is not loaded; call
    /// [`SyncEngine::select_board`](crate::sync::SyncEngine::select_board) to
    /// fetch it.
    pub fn with_selection(selection: Selection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    /// Current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub(crate) fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Metadata of the selected board, once fetched.
    pub fn board(&self) -> Option<&BoardContext> {
        self.board.as_ref()
    }

    pub(crate) fn set_board(&mut self, board: BoardContext) {
        self.board = Some(board);
    }

    /// Cards from the last successful refresh.
    pub fn snapshot(&self) -> Option<&CardSnapshot> {
        self.snapshot.as_ref()
    }

    pub(crate) fn replace_snapshot(&mut self, cards: Vec<Card>) {
        self.snapshot = Some(cards.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_filter_requires_list_or_label() {
        let mut selection = Selection {
            board: Some("b1".to_string()),
            ..Selection::default()
        };
        assert!(!selection.has_card_filter());

        selection.label = Some("lab".to_string());
        assert!(selection.has_card_filter());
    }

    #[test]
    fn test_selection_yaml_omits_unset_fields() {
        let selection = Selection {
            board: Some("b1".to_string()),
            list: None,
            label: None,
        };
        let yaml = serde_yaml::to_string(&selection).unwrap();
        assert_eq!(yaml.trim(), "board: b1");
    }

    #[test]
    fn test_replace_snapshot_swaps_wholesale() {
        let mut session = Session::new();
        assert!(session.snapshot().is_none());

        session.replace_snapshot(vec![]);
        let first = session.snapshot().cloned().unwrap();
        session.replace_snapshot(vec![]);
        let second = session.snapshot().cloned().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
    }
}
