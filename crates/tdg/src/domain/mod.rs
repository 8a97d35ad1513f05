//! Domain types for the dependency graph.
//!
//! A [`Ticket`] is the graph's view of one remote card and a [`Dependency`]
//! is a directed edge between two tickets. Both are keyed by [`ShortId`], the
//! small per-board number users see on their cards.

mod estimation;

use crate::colors;
use serde::{Deserialize, Serialize};
use std::fmt;
use tdg_trello::Card;

pub use estimation::{Estimations, parse_estimations};

/// Per-board sequential card number (Trello's `idShort`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortId(pub u32);

impl ShortId {
    /// Create a short id.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The `#n` form shown on ticket badges.
    pub fn hashtag(self) -> String {
        format!("#{}", self.0)
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ShortId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A label as displayed on a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketLabel {
    /// Hex fill color, resolved from the remote palette name.
    pub color: String,

    /// Label text (may be empty for color-only labels).
    pub name: String,
}

/// A graph node representing one remote card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Short id, unique per board.
    pub id: ShortId,

    /// Card title with estimation markers removed.
    pub title: String,

    /// Labels in remote order.
    pub labels: Vec<TicketLabel>,

    /// Estimated complexity, from a leading `(n)` in the card title.
    pub complexity_estimation: Option<f64>,

    /// Real complexity, from a leading `[n]` in the card title.
    pub complexity_real: Option<f64>,

    /// Whether the estimated complexity badge is shown.
    pub is_complexity_estimation_visible: bool,

    /// Whether the real complexity badge is shown.
    pub is_complexity_real_visible: bool,
}

impl Ticket {
    /// Map a remote card onto a ticket.
    pub fn from_card(card: &Card) -> Self {
        let Estimations {
            estimated,
            real,
            title,
        } = parse_estimations(&card.name);

        Self {
            id: ShortId(card.id_short),
            title,
            labels: card
                .labels
                .iter()
                .map(|label| TicketLabel {
                    color: colors::label_hex(label.color.as_deref()).to_string(),
                    name: label.name.clone(),
                })
                .collect(),
            complexity_estimation: estimated,
            complexity_real: real,
            is_complexity_estimation_visible: estimated.is_some(),
            is_complexity_real_visible: real.is_some(),
        }
    }
}

/// A directed edge meaning "`to` depends on `from`".
///
/// `from` must be completed before `to`. The pair has no identity beyond its
/// two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dependency {
    /// The parent ticket (the one depended upon).
    pub from: ShortId,

    /// The child ticket (the dependent).
    pub to: ShortId,
}

impl Dependency {
    /// Create an edge from `parent` to `child`.
    pub const fn new(parent: ShortId, child: ShortId) -> Self {
        Self {
            from: parent,
            to: child,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} -> #{}", self.from, self.to)
    }
}
