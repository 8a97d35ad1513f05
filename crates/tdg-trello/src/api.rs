//! The remote API abstraction.
//!
//! [`TrelloApi`] lists the REST operations the dependency graph needs and
//! nothing more. Implementations:
//!
//! - [`HttpTrelloClient`](crate::http::HttpTrelloClient): talks to the real
//!   service over HTTPS
//! - [`FakeTrello`](crate::fake::FakeTrello): in-memory, records every call
//!   (available under `cfg(test)` or the `test-util` feature)
//!
//! The trait is object-safe so the sync engine can hold an
//! `Arc<dyn TrelloApi>` and fan calls out across concurrent futures.
//!
//! # Error Handling
//!
//! Every method fails with [`Error`](crate::Error) on any transport, status or
//! decoding problem. Implementations never retry; the caller decides what a
//! failure means.

use crate::error::Result;
use crate::model::{
    Board, BoardList, Card, CardId, CheckItem, CheckItemId, Checklist, ChecklistId, Label,
    NewCheckItem, NewChecklist,
};
use async_trait::async_trait;

/// Operations the graph performs against the task-tracking service.
///
/// # Method Categories
///
/// - **Board discovery**: `my_boards`, `board_lists`, `board_labels`, `board_short_url`
/// - **Card sources**: `list_cards`, `board_cards`
/// - **Checklists**: `card_checklists`, `create_checklist`, `create_check_item`,
///   `delete_check_item`
#[async_trait]
pub trait TrelloApi: Send + Sync {
    // ========== Board discovery ==========

    /// `GET /members/me/boards`
    async fn my_boards(&self) -> Result<Vec<Board>>;

    /// `GET /boards/{id}/lists`
    async fn board_lists(&self, board_id: &str) -> Result<Vec<BoardList>>;

    /// `GET /boards/{id}/labels`
    async fn board_labels(&self, board_id: &str) -> Result<Vec<Label>>;

    /// `GET /boards/{id}/shortUrl`, unwrapped to the URL string.
    async fn board_short_url(&self, board_id: &str) -> Result<String>;

    // ========== Card sources ==========

    /// `GET /lists/{id}/cards`
    async fn list_cards(&self, list_id: &str) -> Result<Vec<Card>>;

    /// `GET /boards/{id}/cards`
    async fn board_cards(&self, board_id: &str) -> Result<Vec<Card>>;

    // ========== Checklists ==========

    /// `GET /cards/{id}/checklists`
    ///
    /// Checklists come back in the service's display order, which is stable
    /// between calls.
    async fn card_checklists(&self, card_id: &CardId) -> Result<Vec<Checklist>>;

    /// `POST /checklists` with `{name, idCard}`.
    async fn create_checklist(&self, checklist: NewChecklist) -> Result<Checklist>;

    /// `POST /checklists/{id}/checkItems` with `{name}`.
    async fn create_check_item(
        &self,
        checklist_id: &ChecklistId,
        item: NewCheckItem,
    ) -> Result<CheckItem>;

    /// `DELETE /checklists/{id}/checkItems/{itemId}`
    async fn delete_check_item(
        &self,
        checklist_id: &ChecklistId,
        item_id: &CheckItemId,
    ) -> Result<()>;
}
