//! The diagram model: the node and link collections a renderer consumes.
//!
//! The sync engine writes tickets and materialized links into a
//! [`DiagramModel`]; a renderer reads them and reports user gestures back as
//! [`DiagramEvent`]s. Layout and drawing live outside this crate.
//!
//! # The `just_linked` marker
//!
//! When the user draws a link by dragging one ticket onto another, the
//! renderer must not re-run automatic layout for that ticket on the next
//! refresh. The model tracks this with [`Link::just_linked`]. Only
//! [`DiagramModel::link_by_gesture`] sets it and only
//! [`DiagramModel::clear_just_linked`] clears it; replacing the link set
//! carries it over for every pair that survives.

use crate::domain::{Dependency, ShortId, Ticket};
use petgraph::algo::toposort;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// One edge as held by the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Parent ticket.
    pub from: ShortId,

    /// Child ticket.
    pub to: ShortId,

    /// Set when the link was just drawn by the user.
    pub just_linked: bool,
}

impl Link {
    /// The dependency this link displays.
    pub fn dependency(&self) -> Dependency {
        Dependency::new(self.from, self.to)
    }
}

/// Messages a renderer sends back to the sync engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramEvent {
    /// The user dropped ticket `to` onto ticket `from`, declaring that `to`
    /// depends on `from`.
    Linked {
        /// Parent ticket.
        from: ShortId,
        /// Child ticket.
        to: ShortId,
    },

    /// The user deleted the link `from -> to`.
    LinkDeleted {
        /// Parent ticket.
        from: ShortId,
        /// Child ticket.
        to: ShortId,
    },

    /// The user finished moving the given tickets.
    SelectionMoved {
        /// Moved tickets.
        keys: Vec<ShortId>,
    },
}

/// Node and link collections keyed by ticket short id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramModel {
    nodes: BTreeMap<ShortId, Ticket>,
    links: Vec<Link>,
}

impl DiagramModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Nodes ==========

    /// All tickets, ordered by short id.
    pub fn nodes(&self) -> impl Iterator<Item = &Ticket> {
        self.nodes.values()
    }

    /// Ids of all tickets, ordered.
    pub fn node_ids(&self) -> Vec<ShortId> {
        self.nodes.keys().copied().collect()
    }

    /// Look up one ticket.
    pub fn node(&self, id: ShortId) -> Option<&Ticket> {
        self.nodes.get(&id)
    }

    /// Number of tickets.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert a ticket, replacing any existing ticket with the same id.
    pub fn upsert_node(&mut self, ticket: Ticket) {
        self.nodes.insert(ticket.id, ticket);
    }

    /// Remove a ticket and every link touching it.
    pub fn remove_node(&mut self, id: ShortId) -> Option<Ticket> {
        let removed = self.nodes.remove(&id);
        if removed.is_some() {
            self.links.retain(|link| link.from != id && link.to != id);
        }
        removed
    }

    // ========== Links ==========

    /// All links in insertion order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// The dependencies currently displayed.
    pub fn dependencies(&self) -> Vec<Dependency> {
        self.links.iter().map(Link::dependency).collect()
    }

    /// Whether `from -> to` is displayed.
    pub fn has_link(&self, from: ShortId, to: ShortId) -> bool {
        self.links
            .iter()
            .any(|link| link.from == from && link.to == to)
    }

    /// Install a freshly materialized link set.
    ///
    /// Pairs that were marked `just_linked` keep the marker; every other
    /// incoming link starts unmarked.
    pub fn replace_links(&mut self, dependencies: Vec<Dependency>) {
        let marked: HashSet<(ShortId, ShortId)> = self
            .links
            .iter()
            .filter(|link| link.just_linked)
            .map(|link| (link.from, link.to))
            .collect();

        self.links = dependencies
            .into_iter()
            .map(|dep| Link {
                from: dep.from,
                to: dep.to,
                just_linked: marked.contains(&(dep.from, dep.to)),
            })
            .collect();
    }

    /// Record a link drawn by the user.
    ///
    /// Returns `false` (and changes nothing) for a self-link, a pair that is
    /// already displayed, or an endpoint that is not a node.
    pub fn link_by_gesture(&mut self, from: ShortId, to: ShortId) -> bool {
        if from == to
            || self.has_link(from, to)
            || !self.nodes.contains_key(&from)
            || !self.nodes.contains_key(&to)
        {
            return false;
        }
        self.links.push(Link {
            from,
            to,
            just_linked: true,
        });
        true
    }

    /// Remove the link `from -> to`. Returns whether it was displayed.
    pub fn unlink(&mut self, from: ShortId, to: ShortId) -> bool {
        let before = self.links.len();
        self.links
            .retain(|link| !(link.from == from && link.to == to));
        self.links.len() != before
    }

    /// Drop the `just_linked` marker from every link touching `id`.
    pub fn clear_just_linked(&mut self, id: ShortId) {
        for link in &mut self.links {
            if link.from == id || link.to == id {
                link.just_linked = false;
            }
        }
    }

    // ========== Graph views ==========

    /// The model as a petgraph graph. Links whose endpoints are not nodes
    /// are left out.
    pub fn to_graph(&self) -> DiGraph<ShortId, ()> {
        let mut graph = DiGraph::new();
        let index: HashMap<ShortId, NodeIndex> = self
            .nodes
            .keys()
            .map(|id| (*id, graph.add_node(*id)))
            .collect();

        for link in &self.links {
            if let (Some(&from), Some(&to)) = (index.get(&link.from), index.get(&link.to)) {
                graph.add_edge(from, to, ());
            }
        }
        graph
    }

    /// Graphviz DOT rendering, node labels `#<id>`.
    pub fn to_dot(&self) -> String {
        let graph = self
            .to_graph()
            .map(|_, id| id.hashtag(), |_, _| String::new());
        format!("{}", Dot::with_config(&graph, &[Config::EdgeNoLabel]))
    }

    /// Tickets grouped by dependency depth: layer 0 has no displayed parents,
    /// layer `n` depends on something in layer `n - 1`.
    ///
    /// A cyclic graph has no layering; in that case every ticket is returned
    /// in a single layer, ordered by id.
    pub fn layers(&self) -> Vec<Vec<ShortId>> {
        let graph = self.to_graph();
        let Ok(order) = toposort(&graph, None) else {
            return if self.nodes.is_empty() {
                Vec::new()
            } else {
                vec![self.node_ids()]
            };
        };

        let mut depth: HashMap<NodeIndex, usize> = HashMap::new();
        for node in &order {
            let level = graph
                .neighbors_directed(*node, petgraph::Direction::Incoming)
                .filter_map(|parent| depth.get(&parent))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);
            depth.insert(*node, level);
        }

        let mut layers: BTreeMap<usize, BTreeSet<ShortId>> = BTreeMap::new();
        for (node, level) in depth {
            layers.entry(level).or_default().insert(graph[node]);
        }
        layers
            .into_values()
            .map(|ids| ids.into_iter().collect())
            .collect()
    }
}
