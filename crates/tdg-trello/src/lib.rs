//! Trello REST boundary for the ticket dependency graph.
//!
//! This crate owns everything that crosses the wire: the card and checklist
//! model, the [`TrelloApi`] trait the sync engine is written against, and an
//! HTTPS client implementing it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod http;
pub mod model;

pub use api::TrelloApi;
pub use error::{Error, Result};
pub use http::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, HttpTrelloClient};
pub use model::{
    Board, BoardList, Card, CardId, CheckItem, CheckItemId, Checklist, ChecklistId, Label,
    NewCheckItem, NewChecklist,
};
