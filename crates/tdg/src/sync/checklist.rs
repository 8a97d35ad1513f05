//! Checklist resolution: find a card's "Dependencies" checklist or create it.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tdg_trello::{Card, CardId, Checklist, NewChecklist, TrelloApi};
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

/// Name of the checklist that stores a card's inbound dependencies.
pub const DEPENDENCIES_CHECKLIST: &str = "Dependencies";

type InFlight = Mutex<HashMap<CardId, Arc<OnceCell<Checklist>>>>;

/// Resolves the dependency checklist of a card.
///
/// By default every call goes to the remote service. Two concurrent resolves
/// for a card that has no checklist yet can then both create one; the first
/// checklist in remote order wins on later lookups and the other is ignored.
///
/// With single-flight enabled, concurrent resolves for the same card share
/// one lookup-or-create. The shared entry lives only while the call is in
/// flight, so a later resolve still sees fresh remote state. If the shared
/// call fails, each waiting caller makes its own attempt.
pub struct ChecklistResolver {
    api: Arc<dyn TrelloApi>,
    in_flight: Option<InFlight>,
}

impl ChecklistResolver {
    /// Create a resolver.
    pub fn new(api: Arc<dyn TrelloApi>, single_flight: bool) -> Self {
        Self {
            api,
            in_flight: single_flight.then(InFlight::default),
        }
    }

    /// Whether concurrent resolves for one card are de-duplicated.
    pub fn is_single_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Return the card's "Dependencies" checklist, creating it if missing.
    ///
    /// The first checklist with exactly that name is used.
    ///
    /// # Errors
    ///
    /// Returns `Error::Api` if the lookup or the creation fails. Nothing is
    /// retried.
    pub async fn resolve(&self, card: &Card) -> Result<Checklist> {
        match &self.in_flight {
            None => self.lookup_or_create(card).await,
            Some(in_flight) => self.resolve_shared(in_flight, card).await,
        }
    }

    async fn lookup_or_create(&self, card: &Card) -> Result<Checklist> {
        let checklists = self.api.card_checklists(&card.id).await?;
        if let Some(existing) = checklists
            .into_iter()
            .find(|checklist| checklist.name == DEPENDENCIES_CHECKLIST)
        {
            return Ok(existing);
        }

        debug!(card_id = %card.id, short_id = card.id_short, "Creating dependency checklist");
        let created = self
            .api
            .create_checklist(NewChecklist {
                name: DEPENDENCIES_CHECKLIST.to_string(),
                id_card: card.id.clone(),
            })
            .await?;
        Ok(created)
    }

    async fn resolve_shared(&self, in_flight: &InFlight, card: &Card) -> Result<Checklist> {
        let cell = {
            let mut entries = in_flight.lock().await;
            Arc::clone(entries.entry(card.id.clone()).or_default())
        };

        let result = cell
            .get_or_try_init(|| self.lookup_or_create(card))
            .await
            .cloned();

        let mut entries = in_flight.lock().await;
        if entries
            .get(&card.id)
            .is_some_and(|current| Arc::ptr_eq(current, &cell))
        {
            entries.remove(&card.id);
        }
        result
    }
}

impl std::fmt::Debug for ChecklistResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecklistResolver")
            .field("api", &"<dyn TrelloApi>")
            .field("single_flight", &self.is_single_flight())
            .finish()
    }
}
