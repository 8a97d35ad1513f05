//! Wire model for the subset of the Trello REST API the graph relies on.
//!
//! Field names follow Trello's camelCase JSON. Unknown fields are ignored so
//! the full card payload can be deserialized without listing every property.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque remote identifier of a card (Trello's 24-char hex `id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

/// Opaque remote identifier of a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChecklistId(pub String);

/// Opaque remote identifier of a check item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckItemId(pub String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            /// Wrap a raw remote identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(CardId);
string_id!(ChecklistId);
string_id!(CheckItemId);

/// A board the authenticated member can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Remote id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Full board URL, when returned.
    #[serde(default)]
    pub url: Option<String>,
    /// Archived boards are still listed by `/members/me/boards`.
    #[serde(default)]
    pub closed: bool,
}

/// A list (column) on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardList {
    /// Remote id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Archived flag.
    #[serde(default)]
    pub closed: bool,
}

/// A label, either defined on a board or attached to a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    /// Remote id.
    pub id: String,
    /// Label text. Trello allows color-only labels with an empty name.
    #[serde(default)]
    pub name: String,
    /// Palette color name (`green`, `sky`, ...), absent for colorless labels.
    #[serde(default)]
    pub color: Option<String>,
}

/// A card as returned by the list and board card endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Opaque remote id.
    pub id: CardId,
    /// Per-board sequential number shown to users.
    pub id_short: u32,
    /// Card title.
    pub name: String,
    /// Full card URL, `https://trello.com/c/<shortLink>/<idShort>-<slug>`.
    pub url: String,
    /// Labels attached to the card, in board order.
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl Card {
    /// Whether a label with the given remote id is attached to this card.
    pub fn has_label(&self, label_id: &str) -> bool {
        self.labels.iter().any(|label| label.id == label_id)
    }
}

/// A checklist attached to a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    /// Remote id.
    pub id: ChecklistId,
    /// Checklist title.
    pub name: String,
    /// Owning card.
    pub id_card: CardId,
    /// Items; a freshly created checklist may omit the field entirely.
    #[serde(default)]
    pub check_items: Vec<CheckItem>,
}

/// One entry of a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckItem {
    /// Remote id.
    pub id: CheckItemId,
    /// Display text.
    pub name: String,
    /// `complete` or `incomplete`.
    #[serde(default)]
    pub state: Option<String>,
}

/// Payload for `POST /checklists`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChecklist {
    /// Checklist title.
    pub name: String,
    /// Card to attach the checklist to.
    pub id_card: CardId,
}

/// Payload for `POST /checklists/{id}/checkItems`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCheckItem {
    /// Display text of the new item.
    pub name: String,
}

/// Body of `GET /boards/{id}/shortUrl`, which Trello wraps in `_value`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ValueWrapper {
    #[serde(rename = "_value")]
    pub value: String,
}
