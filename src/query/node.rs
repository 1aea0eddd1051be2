//! Query nodes and the arena that holds them.
//!
//! A query description is a graph, not a tree: linking `a.children = b` also
//! sets `b.parent = a`, so every linked pair forms a cycle. The nodes live in
//! a `petgraph` arena and are addressed by [`NodeId`]. An edge `from -> to`
//! weighted `rel` means "`from`'s `rel` slot holds `to`".

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;

use super::predicate::Predicate;
use crate::schema::{EntityKind, Relation, NODE_KEY};

pub type NodeId = NodeIndex;

/// Filters and options attached to one entity in a query description.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryNode {
    kind: EntityKind,
    node_key: Option<Predicate>,
    properties: HashMap<&'static str, Vec<Predicate>>,
    first: Option<u32>,
}

impl QueryNode {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            node_key: None,
            properties: HashMap::new(),
            first: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn node_key(&self) -> Option<&Predicate> {
        self.node_key.as_ref()
    }

    /// Replace the identity predicate.
    pub fn set_node_key(&mut self, pred: Predicate) {
        self.node_key = Some(pred);
    }

    /// Append alternatives for a field.
    pub fn push_predicates(&mut self, field: &'static str, preds: Vec<Predicate>) {
        self.properties.entry(field).or_default().extend(preds);
    }

    pub fn predicates(&self, field: &str) -> &[Predicate] {
        self.properties.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn first(&self) -> Option<u32> {
        self.first
    }

    pub fn set_first(&mut self, first: u32) {
        self.first = Some(first);
    }

    /// Names of fields that carry predicates, identity first, then in
    /// declaration order.
    pub fn get_properties(&self) -> Vec<&'static str> {
        let mut props = Vec::new();
        if self.node_key.is_some() {
            props.push(NODE_KEY);
        }
        props.extend(
            self.kind
                .fields()
                .iter()
                .map(|f| f.name)
                .filter(|name| !self.predicates(name).is_empty()),
        );
        props
    }

    /// Predicate groups to render, one slice per field, in property order.
    pub(crate) fn filter_groups(&self) -> Vec<&[Predicate]> {
        let mut groups: Vec<&[Predicate]> = Vec::new();
        if let Some(pred) = &self.node_key {
            groups.push(std::slice::from_ref(pred));
        }
        groups.extend(
            self.kind
                .fields()
                .iter()
                .map(|f| self.predicates(f.name))
                .filter(|preds| !preds.is_empty()),
        );
        groups
    }
}

/// Arena of query nodes linked by relation slots.
#[derive(Debug, Clone, Default)]
pub struct QueryGraph {
    graph: DiGraph<QueryNode, Relation>,
}

impl QueryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: QueryNode) -> NodeId {
        self.graph.add_node(node)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Node held in `id`'s `rel` slot.
    pub fn neighbor(&self, id: NodeId, rel: Relation) -> Option<NodeId> {
        self.graph
            .edges_directed(id, Direction::Outgoing)
            .find(|e| *e.weight() == rel)
            .map(|e| e.target())
    }

    /// Point `id`'s `rel` slot at `target`, dropping whatever it held.
    pub fn set_neighbor(&mut self, id: NodeId, rel: Relation, target: NodeId) {
        let existing = self
            .graph
            .edges_directed(id, Direction::Outgoing)
            .find(|e| *e.weight() == rel)
            .map(|e| e.id());
        if let Some(edge) = existing {
            self.graph.remove_edge(edge);
        }
        self.graph.add_edge(id, target, rel);
    }

    /// Populated relation slots of `id` in declaration order.
    pub fn edges(&self, id: NodeId) -> Vec<(Relation, NodeId)> {
        self.graph[id]
            .kind()
            .relations()
            .iter()
            .filter_map(|rel| self.neighbor(id, *rel).map(|target| (*rel, target)))
            .collect()
    }

    /// `(relation name, neighbor)` pairs for the populated slots of `id`.
    pub fn get_edges(&self, id: NodeId) -> Vec<(&'static str, NodeId)> {
        self.edges(id)
            .into_iter()
            .map(|(rel, target)| (rel.name(), target))
            .collect()
    }

    pub fn get_neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.edges(id).into_iter().map(|(_, target)| target).collect()
    }

    /// Copy everything reachable from `root` in `other` into this arena.
    ///
    /// Returns the id of `root`'s copy. The source graph is left untouched,
    /// so each attachment point owns a private copy of the linked pattern.
    pub fn import(&mut self, other: &QueryGraph, root: NodeId) -> NodeId {
        let mut index_map: HashMap<NodeIndex, NodeIndex> = HashMap::new();

        let mut dfs = Dfs::new(&other.graph, root);
        while let Some(old) = dfs.next(&other.graph) {
            let new = self.graph.add_node(other.graph[old].clone());
            index_map.insert(old, new);
        }

        for (&old, &new) in &index_map {
            for edge in other.graph.edges_directed(old, Direction::Outgoing) {
                if let Some(&target) = index_map.get(&edge.target()) {
                    self.graph.add_edge(new, target, *edge.weight());
                }
            }
        }

        index_map[&root]
    }

    /// Copy `other_root`'s pattern in under `id`'s `rel` slot and point the
    /// copy's inverse slot back at `id`.
    pub fn link(
        &mut self,
        id: NodeId,
        rel: Relation,
        other: &QueryGraph,
        other_root: NodeId,
    ) -> NodeId {
        let copy = self.import(other, other_root);
        self.set_neighbor(id, rel, copy);
        self.set_neighbor(copy, rel.inverse(), id);
        copy
    }

    /// Ids reachable from `root`, `root` included.
    pub fn reachable(&self, root: NodeId) -> Vec<NodeId> {
        let mut dfs = Dfs::new(&self.graph, root);
        let mut out = Vec::new();
        while let Some(id) = dfs.next(&self.graph) {
            out.push(id);
        }
        out
    }
}

impl Index<NodeId> for QueryGraph {
    type Output = QueryNode;

    fn index(&self, id: NodeId) -> &QueryNode {
        &self.graph[id]
    }
}

impl IndexMut<NodeId> for QueryGraph {
    fn index_mut(&mut self, id: NodeId) -> &mut QueryNode {
        &mut self.graph[id]
    }
}
