//! Recording in-memory implementation of [`TrelloApi`] for tests.
//!
//! Unlike a stateless mock, [`FakeTrello`] keeps boards, cards and checklists
//! and applies writes to them, so a test can create a checklist through the
//! engine and read it back on the next refresh. Every call is appended to a
//! log of [`RecordedCall`]s for asserting on remote traffic.
//!
//! # Availability
//!
//! Compiled for this crate's own tests and for dependents that enable the
//! `test-util` feature:
//!
//! ```toml
//! [dev-dependencies]
//! tdg-trello = { path = "...", features = ["test-util"] }
//! ```
//!
//! # Interleaving
//!
//! Checklist operations yield to the scheduler once before touching state,
//! so futures joined on the same task interleave the way real network calls
//! would. This is what makes the concurrent checklist-creation race
//! observable in tests.

use crate::api::TrelloApi;
use crate::error::{Error, Result};
use crate::model::{
    Board, BoardList, Card, CardId, CheckItem, CheckItemId, Checklist, ChecklistId, Label,
    NewCheckItem, NewChecklist,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Remote operation kinds, used to inject failures and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `GET /members/me/boards`
    MyBoards,
    /// `GET /boards/{id}/lists`
    BoardLists,
    /// `GET /boards/{id}/labels`
    BoardLabels,
    /// `GET /boards/{id}/shortUrl`
    BoardShortUrl,
    /// `GET /lists/{id}/cards`
    ListCards,
    /// `GET /boards/{id}/cards`
    BoardCards,
    /// `GET /cards/{id}/checklists`
    CardChecklists,
    /// `POST /checklists`
    CreateChecklist,
    /// `POST /checklists/{id}/checkItems`
    CreateCheckItem,
    /// `DELETE /checklists/{id}/checkItems/{itemId}`
    DeleteCheckItem,
}

/// One call received by the fake, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    /// `my_boards()`
    MyBoards,
    /// `board_lists(board)`
    BoardLists(String),
    /// `board_labels(board)`
    BoardLabels(String),
    /// `board_short_url(board)`
    BoardShortUrl(String),
    /// `list_cards(list)`
    ListCards(String),
    /// `board_cards(board)`
    BoardCards(String),
    /// `card_checklists(card)`
    CardChecklists(CardId),
    /// `create_checklist({name, idCard})`
    CreateChecklist {
        /// Requested checklist name.
        name: String,
        /// Owning card.
        card_id: CardId,
    },
    /// `create_check_item(checklist, {name})`
    CreateCheckItem {
        /// Target checklist.
        checklist_id: ChecklistId,
        /// Item text.
        name: String,
    },
    /// `delete_check_item(checklist, item)`
    DeleteCheckItem {
        /// Target checklist.
        checklist_id: ChecklistId,
        /// Deleted item.
        item_id: CheckItemId,
    },
}

impl RecordedCall {
    /// The operation kind of this call.
    pub fn operation(&self) -> Operation {
        match self {
            RecordedCall::MyBoards => Operation::MyBoards,
            RecordedCall::BoardLists(_) => Operation::BoardLists,
            RecordedCall::BoardLabels(_) => Operation::BoardLabels,
            RecordedCall::BoardShortUrl(_) => Operation::BoardShortUrl,
            RecordedCall::ListCards(_) => Operation::ListCards,
            RecordedCall::BoardCards(_) => Operation::BoardCards,
            RecordedCall::CardChecklists(_) => Operation::CardChecklists,
            RecordedCall::CreateChecklist { .. } => Operation::CreateChecklist,
            RecordedCall::CreateCheckItem { .. } => Operation::CreateCheckItem,
            RecordedCall::DeleteCheckItem { .. } => Operation::DeleteCheckItem,
        }
    }
}

#[derive(Debug)]
struct StoredCard {
    board_id: String,
    list_id: String,
    card: Card,
}

#[derive(Debug, Default)]
struct FakeState {
    boards: Vec<Board>,
    lists: HashMap<String, Vec<BoardList>>,
    labels: HashMap<String, Vec<Label>>,
    cards: Vec<StoredCard>,
    checklists: Vec<Checklist>,
    calls: Vec<RecordedCall>,
    failures: HashSet<Operation>,
    next_id: u64,
}

impl FakeState {
    fn generate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn record(&mut self, call: RecordedCall) -> Result<()> {
        let operation = call.operation();
        self.calls.push(call);
        if self.failures.contains(&operation) {
            return Err(Error::Injected(format!("{operation:?}")));
        }
        Ok(())
    }
}

/// In-memory Trello double.
#[derive(Debug, Default)]
pub struct FakeTrello {
    state: Mutex<FakeState>,
}

impl FakeTrello {
    /// Create an empty fake.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        // A panicking test may poison the lock; the data is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Build a card value the way Trello shapes it, with id `card-<n>` and a
    /// canonical URL ending in `/<n>-<slug>`.
    pub fn card(id_short: u32, name: &str) -> Card {
        let slug: String = name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        Card {
            id: CardId::new(format!("card-{id_short}")),
            id_short,
            name: name.to_string(),
            url: format!("https://trello.com/c/sL{id_short:06}/{id_short}-{slug}"),
            labels: Vec::new(),
        }
    }

    /// Register a board.
    pub fn add_board(&self, id: &str, name: &str) {
        self.state().boards.push(Board {
            id: id.to_string(),
            name: name.to_string(),
            url: Some(format!("https://trello.com/b/{id}")),
            closed: false,
        });
    }

    /// Register a list on a board.
    pub fn add_list(&self, board_id: &str, list_id: &str, name: &str) {
        self.state()
            .lists
            .entry(board_id.to_string())
            .or_default()
            .push(BoardList {
                id: list_id.to_string(),
                name: name.to_string(),
                closed: false,
            });
    }

    /// Register a label definition on a board.
    pub fn add_board_label(&self, board_id: &str, label: Label) {
        self.state()
            .labels
            .entry(board_id.to_string())
            .or_default()
            .push(label);
    }

    /// Place a card on a board list.
    pub fn add_card(&self, board_id: &str, list_id: &str, card: Card) {
        self.state().cards.push(StoredCard {
            board_id: board_id.to_string(),
            list_id: list_id.to_string(),
            card,
        });
    }

    /// Remove a card and its checklists.
    pub fn remove_card(&self, card_id: &CardId) {
        let mut state = self.state();
        state.cards.retain(|stored| &stored.card.id != card_id);
        state.checklists.retain(|checklist| &checklist.id_card != card_id);
    }

    /// Attach a checklist with the given item names to a card, bypassing the
    /// call log.
    pub fn add_checklist(&self, card_id: &CardId, name: &str, items: &[&str]) -> Checklist {
        let mut state = self.state();
        let id = ChecklistId::new(state.generate_id("checklist"));
        let check_items = items
            .iter()
            .map(|item| CheckItem {
                id: CheckItemId::new(state.generate_id("item")),
                name: (*item).to_string(),
                state: Some("incomplete".to_string()),
            })
            .collect();
        let checklist = Checklist {
            id,
            name: name.to_string(),
            id_card: card_id.clone(),
            check_items,
        };
        state.checklists.push(checklist.clone());
        checklist
    }

    /// Attach a checklist whose items have explicit remote ids.
    pub fn add_checklist_with_ids(
        &self,
        card_id: &CardId,
        name: &str,
        items: &[(&str, &str)],
    ) -> Checklist {
        let mut state = self.state();
        let checklist = Checklist {
            id: ChecklistId::new(state.generate_id("checklist")),
            name: name.to_string(),
            id_card: card_id.clone(),
            check_items: items
                .iter()
                .map(|(id, name)| CheckItem {
                    id: CheckItemId::new(*id),
                    name: (*name).to_string(),
                    state: Some("incomplete".to_string()),
                })
                .collect(),
        };
        state.checklists.push(checklist.clone());
        checklist
    }

    /// Current checklists of a card, in creation order.
    pub fn checklists_of(&self, card_id: &CardId) -> Vec<Checklist> {
        self.state()
            .checklists
            .iter()
            .filter(|checklist| &checklist.id_card == card_id)
            .cloned()
            .collect()
    }

    /// Every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    /// Number of calls received for one operation kind.
    pub fn count(&self, operation: Operation) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// Forget the call log, keeping data and injected failures.
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Make every subsequent call of `operation` fail with `Error::Injected`.
    /// The call is still recorded.
    pub fn fail_on(&self, operation: Operation) {
        self.state().failures.insert(operation);
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }
}

#[async_trait]
impl TrelloApi for FakeTrello {
    async fn my_boards(&self) -> Result<Vec<Board>> {
        let mut state = self.state();
        state.record(RecordedCall::MyBoards)?;
        Ok(state.boards.clone())
    }

    async fn board_lists(&self, board_id: &str) -> Result<Vec<BoardList>> {
        let mut state = self.state();
        state.record(RecordedCall::BoardLists(board_id.to_string()))?;
        Ok(state.lists.get(board_id).cloned().unwrap_or_default())
    }

    async fn board_labels(&self, board_id: &str) -> Result<Vec<Label>> {
        let mut state = self.state();
        state.record(RecordedCall::BoardLabels(board_id.to_string()))?;
        Ok(state.labels.get(board_id).cloned().unwrap_or_default())
    }

    async fn board_short_url(&self, board_id: &str) -> Result<String> {
        let mut state = self.state();
        state.record(RecordedCall::BoardShortUrl(board_id.to_string()))?;
        state
            .boards
            .iter()
            .find(|board| board.id == board_id)
            .map(|board| format!("https://trello.com/b/{}", board.id))
            .ok_or_else(|| Error::NotFound {
                kind: "board",
                id: board_id.to_string(),
            })
    }

    async fn list_cards(&self, list_id: &str) -> Result<Vec<Card>> {
        let mut state = self.state();
        state.record(RecordedCall::ListCards(list_id.to_string()))?;
        Ok(state
            .cards
            .iter()
            .filter(|stored| stored.list_id == list_id)
            .map(|stored| stored.card.clone())
            .collect())
    }

    async fn board_cards(&self, board_id: &str) -> Result<Vec<Card>> {
        let mut state = self.state();
        state.record(RecordedCall::BoardCards(board_id.to_string()))?;
        Ok(state
            .cards
            .iter()
            .filter(|stored| stored.board_id == board_id)
            .map(|stored| stored.card.clone())
            .collect())
    }

    async fn card_checklists(&self, card_id: &CardId) -> Result<Vec<Checklist>> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.record(RecordedCall::CardChecklists(card_id.clone()))?;
        Ok(state
            .checklists
            .iter()
            .filter(|checklist| &checklist.id_card == card_id)
            .cloned()
            .collect())
    }

    async fn create_checklist(&self, checklist: NewChecklist) -> Result<Checklist> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.record(RecordedCall::CreateChecklist {
            name: checklist.name.clone(),
            card_id: checklist.id_card.clone(),
        })?;
        if !state
            .cards
            .iter()
            .any(|stored| stored.card.id == checklist.id_card)
        {
            return Err(Error::NotFound {
                kind: "card",
                id: checklist.id_card.to_string(),
            });
        }
        let created = Checklist {
            id: ChecklistId::new(state.generate_id("checklist")),
            name: checklist.name,
            id_card: checklist.id_card,
            check_items: Vec::new(),
        };
        state.checklists.push(created.clone());
        Ok(created)
    }

    async fn create_check_item(
        &self,
        checklist_id: &ChecklistId,
        item: NewCheckItem,
    ) -> Result<CheckItem> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.record(RecordedCall::CreateCheckItem {
            checklist_id: checklist_id.clone(),
            name: item.name.clone(),
        })?;
        let created = CheckItem {
            id: CheckItemId::new(state.generate_id("item")),
            name: item.name,
            state: Some("incomplete".to_string()),
        };
        let checklist = state
            .checklists
            .iter_mut()
            .find(|checklist| &checklist.id == checklist_id)
            .ok_or_else(|| Error::NotFound {
                kind: "checklist",
                id: checklist_id.to_string(),
            })?;
        checklist.check_items.push(created.clone());
        Ok(created)
    }

    async fn delete_check_item(
        &self,
        checklist_id: &ChecklistId,
        item_id: &CheckItemId,
    ) -> Result<()> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.record(RecordedCall::DeleteCheckItem {
            checklist_id: checklist_id.clone(),
            item_id: item_id.clone(),
        })?;
        let checklist = state
            .checklists
            .iter_mut()
            .find(|checklist| &checklist.id == checklist_id)
            .ok_or_else(|| Error::NotFound {
                kind: "checklist",
                id: checklist_id.to_string(),
            })?;
        let before = checklist.check_items.len();
        checklist.check_items.retain(|item| &item.id != item_id);
        if checklist.check_items.len() == before {
            return Err(Error::NotFound {
                kind: "check item",
                id: item_id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_checklist_is_visible_on_next_lookup() {
        let fake = FakeTrello::new();
        let card = FakeTrello::card(1, "First");
        fake.add_card("b1", "l1", card.clone());

        let created = fake
            .create_checklist(NewChecklist {
                name: "Dependencies".to_string(),
                id_card: card.id.clone(),
            })
            .await
            .unwrap();

        let lists = fake.card_checklists(&card.id).await.unwrap();
        assert_eq!(lists, vec![created]);
        assert_eq!(fake.count(Operation::CreateChecklist), 1);
        assert_eq!(fake.count(Operation::CardChecklists), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_is_recorded() {
        let fake = FakeTrello::new();
        fake.fail_on(Operation::BoardCards);

        let result = fake.board_cards("b1").await;
        assert!(matches!(result, Err(Error::Injected(_))));
        assert_eq!(fake.calls(), vec![RecordedCall::BoardCards("b1".to_string())]);

        fake.clear_failures();
        assert!(fake.board_cards("b1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_item_fails() {
        let fake = FakeTrello::new();
        let card = FakeTrello::card(3, "Third");
        let checklist = fake.add_checklist(&card.id, "Dependencies", &["#1"]);

        let result = fake
            .delete_check_item(&checklist.id, &CheckItemId::new("missing"))
            .await;
        assert!(matches!(result, Err(Error::NotFound { kind: "check item", .. })));

        let item_id = checklist.check_items[0].id.clone();
        fake.delete_check_item(&checklist.id, &item_id).await.unwrap();
        assert!(fake.checklists_of(&card.id)[0].check_items.is_empty());
    }

    #[tokio::test]
    async fn test_card_sources_filter_by_list_and_board() {
        let fake = FakeTrello::new();
        fake.add_card("b1", "l1", FakeTrello::card(1, "a"));
        fake.add_card("b1", "l2", FakeTrello::card(2, "b"));
        fake.add_card("b2", "l3", FakeTrello::card(3, "c"));

        assert_eq!(fake.list_cards("l2").await.unwrap().len(), 1);
        assert_eq!(fake.board_cards("b1").await.unwrap().len(), 2);
    }

    #[test]
    fn test_card_url_carries_short_id() {
        let card = FakeTrello::card(42, "Hello World");
        assert_eq!(card.url, "https://trello.com/c/sL000042/42-hello-world");
    }
}
