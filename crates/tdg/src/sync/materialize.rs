//! Link materialization: rebuild the full dependency set from checklists.
//!
//! Every card's checklist is resolved concurrently, with no cap on the number
//! of in-flight calls. Edges are collected in completion order.

use super::checklist::ChecklistResolver;
use crate::codec;
use crate::domain::{Dependency, ShortId};
use crate::error::{Error, Result};
use futures::TryStreamExt;
use futures::stream::FuturesUnordered;
use std::collections::HashSet;
use tdg_trello::{Card, Checklist};
use tracing::debug;

/// Resolve every card's dependency checklist and decode it into edges.
///
/// An item yields the edge `parent -> card` only when its parent short id
/// belongs to one of `cards`; items that do not decode, or that point
/// outside the card set, are dropped. Duplicate items yield duplicate edges.
///
/// # Errors
///
/// Returns the first remote failure. No partial edge set is returned.
pub async fn materialize(resolver: &ChecklistResolver, cards: &[Card]) -> Result<Vec<Dependency>> {
    let known: HashSet<ShortId> = cards.iter().map(|card| ShortId(card.id_short)).collect();

    let mut pending: FuturesUnordered<_> = cards
        .iter()
        .map(|card| async move {
            let checklist = resolver.resolve(card).await?;
            Ok::<_, Error>((card, checklist))
        })
        .collect();

    let mut edges = Vec::new();
    while let Some((card, checklist)) = pending.try_next().await? {
        edges.extend(edges_for(card, &checklist, &known));
    }
    Ok(edges)
}

/// Edges encoded in one card's dependency checklist.
pub fn edges_for(card: &Card, checklist: &Checklist, known: &HashSet<ShortId>) -> Vec<Dependency> {
    let child = ShortId(card.id_short);
    codec::decode_checklist(checklist)
        .into_iter()
        .filter_map(|item| {
            if known.contains(&item.parent) {
                Some(Dependency::new(item.parent, child))
            } else {
                debug!(
                    child = %child,
                    parent = %item.parent,
                    "Dropping dependency on a ticket outside the card set"
                );
                None
            }
        })
        .collect()
}
