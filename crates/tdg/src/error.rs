//! Error types for sync engine and CLI operations.

use crate::domain::ShortId;
use std::io;
use thiserror::Error;

/// The error type for tdg operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No `.tdg/` directory was found.
    #[error("Not a tdg workspace (or any parent): run 'tdg init' first")]
    NotInitialized,

    /// A remote call failed.
    #[error("Trello API error: {0}")]
    Api(#[from] tdg_trello::Error),

    /// A ticket referenced by a graph edit is not in the card snapshot.
    #[error("Ticket #{0} is not in the current card set")]
    TicketNotFound(ShortId),

    /// A ticket cannot depend on itself.
    #[error("Ticket #{0} cannot depend on itself")]
    SelfDependency(ShortId),

    /// A graph edit arrived before any refresh completed.
    #[error("No card snapshot yet: refresh before editing dependencies")]
    NoSnapshot,

    /// An operation needs a board and none is selected.
    #[error("No board selected")]
    NoBoardSelected,
}

/// A specialized Result type for tdg operations.
pub type Result<T> = std::result::Result<T, Error>;
