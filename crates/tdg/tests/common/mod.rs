//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;
use tdg::domain::ShortId;
use tdg::session::{Selection, Session};
use tdg::sync::{EngineOptions, SyncEngine};
use tdg_trello::fake::FakeTrello;
use tdg_trello::{Card, Label};

pub const BOARD: &str = "board-1";
pub const LIST: &str = "list-todo";

/// Run the tdg binary in the specified directory with a clean environment
pub fn run_tdg_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tdg"))
        .args(args)
        .current_dir(dir)
        .env_remove("TRELLO_API_KEY")
        .env_remove("TRELLO_TOKEN")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute tdg binary")
}

/// A fake board with one list holding cards with the given short ids
pub fn board_with_cards(ids: &[u32]) -> (Arc<FakeTrello>, Vec<Card>) {
    let fake = Arc::new(FakeTrello::new());
    fake.add_board(BOARD, "Roadmap");
    fake.add_list(BOARD, LIST, "Todo");
    let cards: Vec<Card> = ids
        .iter()
        .map(|id| FakeTrello::card(*id, &format!("Ticket {id}")))
        .collect();
    for card in &cards {
        fake.add_card(BOARD, LIST, card.clone());
    }
    (fake, cards)
}

pub fn engine(fake: &Arc<FakeTrello>) -> SyncEngine {
    SyncEngine::new(fake.clone(), EngineOptions::default())
}

pub fn single_flight_engine(fake: &Arc<FakeTrello>) -> SyncEngine {
    SyncEngine::new(
        fake.clone(),
        EngineOptions {
            single_flight_checklists: true,
        },
    )
}

/// A session filtering on the fake board's list
pub fn list_session() -> Session {
    Session::with_selection(Selection {
        board: Some(BOARD.to_string()),
        list: Some(LIST.to_string()),
        label: None,
    })
}

pub fn label(id: &str, color: &str) -> Label {
    Label {
        id: id.to_string(),
        name: id.to_string(),
        color: Some(color.to_string()),
    }
}

pub fn ids(values: &[u32]) -> Vec<ShortId> {
    values.iter().copied().map(ShortId).collect()
}
