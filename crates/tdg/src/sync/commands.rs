//! Mutation commands: push one graph edit back to the remote checklists.
//!
//! Commands read the card snapshot they are handed, not live remote state,
//! so an edit made between refreshes can act on stale cards. The next
//! refresh converges the graph either way.

use super::SyncEngine;
use crate::codec;
use crate::diagram::{DiagramEvent, DiagramModel};
use crate::domain::ShortId;
use crate::error::{Error, Result};
use crate::session::{CardSnapshot, Session};
use tdg_trello::{Card, CheckItem, CheckItemId, NewCheckItem};
use tracing::{debug, info, warn};

/// Result of [`SyncEngine::add_dependency`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new check item was appended to the child's checklist.
    Created(CheckItem),

    /// The child's checklist already referenced the parent; nothing was
    /// written.
    AlreadyPresent(CheckItemId),
}

/// Result of [`SyncEngine::handle_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// A drawn link was written to the remote checklist.
    Linked(AddOutcome),

    /// A deleted link was removed remotely; `None` when no item matched.
    Unlinked(Option<CheckItemId>),

    /// Markers were cleared for the moved tickets. Nothing remote happened.
    Moved,
}

fn find_card(snapshot: &CardSnapshot, id: ShortId) -> Result<&Card> {
    snapshot
        .iter()
        .find(|card| card.id_short == id.0)
        .ok_or_else(|| {
            warn!(short_id = %id, "Ticket not found in card snapshot");
            Error::TicketNotFound(id)
        })
}

impl SyncEngine {
    /// Record that `child` depends on `parent` in the child's checklist.
    ///
    /// # Errors
    ///
    /// - `Error::SelfDependency` if `parent == child`
    /// - `Error::TicketNotFound` if either ticket is not in `snapshot`; no
    ///   remote call is made
    /// - `Error::Api` if resolving the checklist or creating the item fails
    pub async fn add_dependency(
        &self,
        snapshot: &CardSnapshot,
        parent: ShortId,
        child: ShortId,
    ) -> Result<AddOutcome> {
        if parent == child {
            return Err(Error::SelfDependency(parent));
        }
        let parent_card = find_card(snapshot, parent)?;
        let child_card = find_card(snapshot, child)?;

        let checklist = self.resolver.resolve(child_card).await?;
        if let Some(existing) = codec::decode_checklist(&checklist)
            .into_iter()
            .find(|item| item.parent == parent)
        {
            debug!(
                parent = %parent,
                child = %child,
                item_id = %existing.check_item_id,
                "Dependency already recorded"
            );
            return Ok(AddOutcome::AlreadyPresent(existing.check_item_id));
        }

        let item = self
            .api
            .create_check_item(
                &checklist.id,
                NewCheckItem {
                    name: codec::encode(parent_card),
                },
            )
            .await?;
        info!(parent = %parent, child = %child, item_id = %item.id, "Added dependency");
        Ok(AddOutcome::Created(item))
    }

    /// Remove the check item recording that `child` depends on `parent`.
    ///
    /// Only the child must be in `snapshot`. Returns the deleted item's id,
    /// or `None` when the checklist holds no item referencing `parent`.
    ///
    /// # Errors
    ///
    /// - `Error::TicketNotFound` if `child` is not in `snapshot`; no remote
    ///   call is made
    /// - `Error::Api` if resolving the checklist or deleting the item fails
    pub async fn delete_dependency(
        &self,
        snapshot: &CardSnapshot,
        parent: ShortId,
        child: ShortId,
    ) -> Result<Option<CheckItemId>> {
        let child_card = find_card(snapshot, child)?;

        let checklist = self.resolver.resolve(child_card).await?;
        let Some(item) = codec::decode_checklist(&checklist)
            .into_iter()
            .find(|item| item.parent == parent)
        else {
            debug!(parent = %parent, child = %child, "No check item to delete");
            return Ok(None);
        };

        self.api
            .delete_check_item(&checklist.id, &item.check_item_id)
            .await?;
        info!(
            parent = %parent,
            child = %child,
            item_id = %item.check_item_id,
            "Deleted dependency"
        );
        Ok(Some(item.check_item_id))
    }

    /// Apply a message coming from the diagram.
    ///
    /// Link edits are checked against the snapshot, then applied to `model`,
    /// then written to the remote checklist. A rejected edit leaves `model`
    /// untouched. When the remote write fails the local edit stays in place;
    /// the next refresh replaces it with whatever the remote holds.
    ///
    /// # Errors
    ///
    /// - `Error::NoSnapshot` for a link edit before the first refresh
    /// - `Error::SelfDependency` or `Error::TicketNotFound` for a link edit
    ///   the snapshot cannot back; `model` is not changed
    /// - any error from [`add_dependency`](Self::add_dependency) or
    ///   [`delete_dependency`](Self::delete_dependency)
    pub async fn handle_event(
        &self,
        session: &Session,
        model: &mut DiagramModel,
        event: DiagramEvent,
    ) -> Result<EventOutcome> {
        match event {
            DiagramEvent::Linked { from, to } => {
                let snapshot = session.snapshot().cloned().ok_or(Error::NoSnapshot)?;
                if from == to {
                    return Err(Error::SelfDependency(from));
                }
                find_card(&snapshot, from)?;
                find_card(&snapshot, to)?;
                model.link_by_gesture(from, to);
                self.add_dependency(&snapshot, from, to)
                    .await
                    .map(EventOutcome::Linked)
            }
            DiagramEvent::LinkDeleted { from, to } => {
                let snapshot = session.snapshot().cloned().ok_or(Error::NoSnapshot)?;
                find_card(&snapshot, to)?;
                model.unlink(from, to);
                self.delete_dependency(&snapshot, from, to)
                    .await
                    .map(EventOutcome::Unlinked)
            }
            DiagramEvent::SelectionMoved { keys } => {
                for key in keys {
                    model.clear_just_linked(key);
                }
                Ok(EventOutcome::Moved)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::EngineOptions;
    use crate::domain::Ticket;
    use crate::sync::checklist::DEPENDENCIES_CHECKLIST;
    use std::sync::Arc;
    use tdg_trello::fake::{FakeTrello, Operation, RecordedCall};

    fn setup(ids: &[u32]) -> (Arc<FakeTrello>, SyncEngine, CardSnapshot) {
        let fake = Arc::new(FakeTrello::new());
        let cards: Vec<Card> = ids
            .iter()
            .map(|id| FakeTrello::card(*id, &format!("Card {id}")))
            .collect();
        for card in &cards {
            fake.add_card("b1", "l1", card.clone());
        }
        let engine = SyncEngine::new(fake.clone(), EngineOptions::default());
        (fake, engine, cards.into())
    }

    fn model_with(snapshot: &CardSnapshot) -> DiagramModel {
        let mut model = DiagramModel::new();
        for card in snapshot.iter() {
            model.upsert_node(Ticket::from_card(card));
        }
        model
    }

    fn session_with(snapshot: &CardSnapshot) -> Session {
        let mut session = Session::new();
        session.replace_snapshot(snapshot.to_vec());
        session
    }

    #[tokio::test]
    async fn test_add_appends_parent_url_to_child_checklist() {
        let (fake, engine, snapshot) = setup(&[1, 2]);

        let outcome = engine
            .add_dependency(&snapshot, ShortId(1), ShortId(2))
            .await
            .unwrap();

        assert!(matches!(outcome, AddOutcome::Created(_)));
        let checklist = &fake.checklists_of(&snapshot[1].id)[0];
        assert_eq!(checklist.name, DEPENDENCIES_CHECKLIST);
        assert_eq!(checklist.check_items.len(), 1);
        assert_eq!(checklist.check_items[0].name, snapshot[0].url);
    }

    #[tokio::test]
    async fn test_add_does_not_duplicate_existing_reference() {
        let (fake, engine, snapshot) = setup(&[1, 2]);
        let existing = fake.add_checklist(&snapshot[1].id, DEPENDENCIES_CHECKLIST, &["#1"]);

        let outcome = engine
            .add_dependency(&snapshot, ShortId(1), ShortId(2))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            AddOutcome::AlreadyPresent(existing.check_items[0].id.clone())
        );
        assert_eq!(fake.count(Operation::CreateCheckItem), 0);
    }

    #[tokio::test]
    async fn test_add_with_missing_ticket_makes_no_remote_call() {
        let (fake, engine, snapshot) = setup(&[1, 2]);

        let result = engine.add_dependency(&snapshot, ShortId(1), ShortId(7)).await;

        assert!(matches!(result, Err(Error::TicketNotFound(ShortId(7)))));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_self_dependency() {
        let (fake, engine, snapshot) = setup(&[1]);

        let result = engine.add_dependency(&snapshot, ShortId(1), ShortId(1)).await;

        assert!(matches!(result, Err(Error::SelfDependency(ShortId(1)))));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_propagates_remote_failure() {
        let (fake, engine, snapshot) = setup(&[1, 2]);
        fake.fail_on(Operation::CreateCheckItem);

        let result = engine.add_dependency(&snapshot, ShortId(1), ShortId(2)).await;

        assert!(matches!(result, Err(Error::Api(_))));
    }

    #[tokio::test]
    async fn test_delete_targets_exactly_the_matching_item() {
        let (fake, engine, snapshot) = setup(&[2]);
        let checklist = fake.add_checklist_with_ids(
            &snapshot[0].id,
            DEPENDENCIES_CHECKLIST,
            &[("abc", "#5"), ("def", "#6")],
        );
        fake.clear_calls();

        let deleted = engine
            .delete_dependency(&snapshot, ShortId(5), ShortId(2))
            .await
            .unwrap();

        assert_eq!(deleted, Some(CheckItemId::new("abc")));
        let deletes: Vec<_> = fake
            .calls()
            .into_iter()
            .filter(|call| call.operation() == Operation::DeleteCheckItem)
            .collect();
        assert_eq!(
            deletes,
            vec![RecordedCall::DeleteCheckItem {
                checklist_id: checklist.id,
                item_id: CheckItemId::new("abc"),
            }]
        );
    }

    #[tokio::test]
    async fn test_delete_without_match_is_silent() {
        let (fake, engine, snapshot) = setup(&[1, 2]);
        fake.add_checklist(&snapshot[1].id, DEPENDENCIES_CHECKLIST, &["not a ticket"]);

        let deleted = engine
            .delete_dependency(&snapshot, ShortId(1), ShortId(2))
            .await
            .unwrap();

        assert_eq!(deleted, None);
        assert_eq!(fake.count(Operation::DeleteCheckItem), 0);
    }

    #[tokio::test]
    async fn test_delete_with_missing_child_makes_no_remote_call() {
        let (fake, engine, snapshot) = setup(&[1]);

        let result = engine
            .delete_dependency(&snapshot, ShortId(1), ShortId(3))
            .await;

        assert!(matches!(result, Err(Error::TicketNotFound(ShortId(3)))));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_linked_event_marks_link_and_writes_remote() {
        let (fake, engine, snapshot) = setup(&[1, 2]);
        let session = session_with(&snapshot);
        let mut model = model_with(&snapshot);

        let outcome = engine
            .handle_event(
                &session,
                &mut model,
                DiagramEvent::Linked {
                    from: ShortId(1),
                    to: ShortId(2),
                },
            )
            .await
            .unwrap();

        assert!(matches!(outcome, EventOutcome::Linked(AddOutcome::Created(_))));
        assert!(model.links()[0].just_linked);
        assert_eq!(fake.count(Operation::CreateCheckItem), 1);
    }

    #[tokio::test]
    async fn test_rejected_link_event_leaves_model_untouched() {
        let (fake, engine, snapshot) = setup(&[1, 2]);
        let session = session_with(&snapshot);
        let mut model = model_with(&snapshot);

        let missing = engine
            .handle_event(
                &session,
                &mut model,
                DiagramEvent::Linked {
                    from: ShortId(1),
                    to: ShortId(7),
                },
            )
            .await;
        let self_link = engine
            .handle_event(
                &session,
                &mut model,
                DiagramEvent::Linked {
                    from: ShortId(2),
                    to: ShortId(2),
                },
            )
            .await;

        assert!(matches!(missing, Err(Error::TicketNotFound(ShortId(7)))));
        assert!(matches!(self_link, Err(Error::SelfDependency(ShortId(2)))));
        assert!(model.links().is_empty());
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unlink_event_for_unknown_child_keeps_local_link() {
        let (fake, engine, snapshot) = setup(&[1, 2]);
        let session = session_with(&snapshot);
        let mut model = model_with(&snapshot);
        model.upsert_node(Ticket::from_card(&FakeTrello::card(3, "Card 3")));
        model.link_by_gesture(ShortId(1), ShortId(3));

        let result = engine
            .handle_event(
                &session,
                &mut model,
                DiagramEvent::LinkDeleted {
                    from: ShortId(1),
                    to: ShortId(3),
                },
            )
            .await;

        assert!(matches!(result, Err(Error::TicketNotFound(ShortId(3)))));
        assert_eq!(model.links().len(), 1);
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_link_event_without_snapshot_fails() {
        let (fake, engine, _) = setup(&[1, 2]);
        let mut model = DiagramModel::new();

        let result = engine
            .handle_event(
                &Session::new(),
                &mut model,
                DiagramEvent::LinkDeleted {
                    from: ShortId(1),
                    to: ShortId(2),
                },
            )
            .await;

        assert!(matches!(result, Err(Error::NoSnapshot)));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_selection_moved_clears_markers_locally() {
        let (fake, engine, snapshot) = setup(&[1, 2]);
        let session = session_with(&snapshot);
        let mut model = model_with(&snapshot);
        model.link_by_gesture(ShortId(1), ShortId(2));

        let outcome = engine
            .handle_event(
                &session,
                &mut model,
                DiagramEvent::SelectionMoved {
                    keys: vec![ShortId(2)],
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome, EventOutcome::Moved);
        assert!(!model.links()[0].just_linked);
        assert!(fake.calls().is_empty());
    }
}
