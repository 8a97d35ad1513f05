//! Card reconciliation: bring the diagram's node set in line with the cards.
//!
//! Both steps are pure functions of the current model and the fetched cards.
//! Pruning runs before upserting so that a card whose short id changed never
//! leaves its old node behind next to the new one.

use crate::diagram::DiagramModel;
use crate::domain::{ShortId, Ticket};
use std::collections::HashSet;
use tdg_trello::Card;

/// What one reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Tickets removed because their card is gone.
    pub removed: Vec<ShortId>,

    /// Number of tickets written from cards.
    pub upserted: usize,
}

/// Remove every node whose id is not the short id of one of `cards`.
pub fn prune_stale_nodes(model: &mut DiagramModel, cards: &[Card]) -> Vec<ShortId> {
    let live: HashSet<ShortId> = cards.iter().map(|card| ShortId(card.id_short)).collect();

    let stale: Vec<ShortId> = model
        .node_ids()
        .into_iter()
        .filter(|id| !live.contains(id))
        .collect();
    for id in &stale {
        model.remove_node(*id);
    }
    stale
}

/// Write every card into the model as a ticket, replacing existing nodes
/// with the same id wholesale.
pub fn upsert_nodes(model: &mut DiagramModel, cards: &[Card]) -> usize {
    for card in cards {
        model.upsert_node(Ticket::from_card(card));
    }
    cards.len()
}

/// Prune, then upsert.
pub fn reconcile(model: &mut DiagramModel, cards: &[Card]) -> ReconcileSummary {
    let removed = prune_stale_nodes(model, cards);
    let upserted = upsert_nodes(model, cards);
    ReconcileSummary { removed, upserted }
}
