//! tdg - a ticket dependency graph kept in sync with Trello.
//!
//! Trello has no notion of a dependency between cards. tdg stores one on the
//! dependent card, as an item of its "Dependencies" checklist that points at
//! the card it depends on. The [`sync`] engine reads those checklists into a
//! [`diagram::DiagramModel`] and writes graph edits back.

#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod codec;
pub mod colors;
pub mod config;
pub mod diagram;
pub mod domain;
pub mod error;
pub mod output;
pub mod session;
pub mod sync;

pub use error::{Error, Result};
