//! Dependency codec: how a parent reference is stored in a checklist item.
//!
//! Writing always stores the parent card's URL, which stays clickable inside
//! Trello. Reading accepts two forms:
//!
//! - `#<n>`: a bare hashtag, as users type it by hand
//! - `<scheme>://<host>/c/<shortLink>/<n>-<slug>`: a card URL
//!
//! Anything else is a [`DecodeError`]. Decoding never touches the network and
//! never fails a whole refresh; callers skip undecodable items.

use crate::domain::ShortId;
use reqwest::Url;
use tdg_trello::{Card, CheckItemId, Checklist};
use thiserror::Error;
use tracing::debug;

/// Why a check item name could not be read as a ticket reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The name is empty or whitespace.
    #[error("check item name is empty")]
    EmptyName,

    /// `#` followed by something other than a number.
    #[error("invalid hashtag reference: {0}")]
    InvalidHashtag(String),

    /// Not a hashtag and not an absolute http(s) URL.
    #[error("not a card URL: {0}")]
    InvalidUrl(String),

    /// A URL whose path is not `/c/<shortLink>/<n>-<slug>`.
    #[error("unexpected card URL path: {0}")]
    UnexpectedPath(String),

    /// The numeric prefix of the last path segment is missing or too large.
    #[error("invalid short id in: {0}")]
    InvalidShortId(String),
}

/// A check item that decoded to a parent ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedItem {
    /// Remote id of the check item, needed to delete it.
    pub check_item_id: CheckItemId,

    /// The referenced parent ticket.
    pub parent: ShortId,
}

/// Text to store in the child's checklist to reference `parent`.
pub fn encode(parent: &Card) -> String {
    parent.url.clone()
}

/// Read a check item name back into the referenced ticket's short id.
///
/// # Errors
///
/// Returns a [`DecodeError`] describing the first grammar violation.
pub fn decode(name: &str) -> Result<ShortId, DecodeError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DecodeError::EmptyName);
    }

    if let Some(digits) = name.strip_prefix('#') {
        return parse_short_id(digits).ok_or_else(|| DecodeError::InvalidHashtag(name.to_string()));
    }

    decode_url(name)
}

fn decode_url(name: &str) -> Result<ShortId, DecodeError> {
    let url = Url::parse(name).map_err(|_| DecodeError::InvalidUrl(name.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(DecodeError::InvalidUrl(name.to_string()));
    }

    let mut segments: Vec<&str> = url
        .path_segments()
        .map(Iterator::collect)
        .unwrap_or_default();
    if segments.last() == Some(&"") {
        segments.pop();
    }

    let [kind, short_link, numbered_slug] = segments.as_slice() else {
        return Err(DecodeError::UnexpectedPath(url.path().to_string()));
    };
    if *kind != "c" || short_link.is_empty() {
        return Err(DecodeError::UnexpectedPath(url.path().to_string()));
    }

    let number = numbered_slug
        .split_once('-')
        .map_or(*numbered_slug, |(number, _slug)| number);
    parse_short_id(number).ok_or_else(|| DecodeError::InvalidShortId((*numbered_slug).to_string()))
}

fn parse_short_id(digits: &str) -> Option<ShortId> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(ShortId)
}

/// Decode every item of a checklist, dropping the ones that do not decode.
pub fn decode_checklist(checklist: &Checklist) -> Vec<DecodedItem> {
    checklist
        .check_items
        .iter()
        .filter_map(|item| match decode(&item.name) {
            Ok(parent) => Some(DecodedItem {
                check_item_id: item.id.clone(),
                parent,
            }),
            Err(err) => {
                debug!(
                    checklist_id = %checklist.id,
                    check_item_id = %item.id,
                    error = %err,
                    "Skipping undecodable dependency item"
                );
                None
            }
        })
        .collect()
}
