//! Subgraph snapshots.

use std::collections::HashMap;

use prost::Message;
use tracing::debug;

use super::file::FileView;
use super::node::NodeView;
use super::process::ProcessView;
use crate::error::Result;
use crate::proto::GraphDescription;

/// One directed edge between two snapshot nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeView {
    pub from_key: String,
    pub to_key: String,
    pub edge_name: String,
}

/// Nodes and edges decoded from one `GraphDescription`.
///
/// `edges` is keyed by source node key and keeps the snapshot's order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubgraphView {
    pub nodes: HashMap<String, NodeView>,
    pub edges: HashMap<String, Vec<EdgeView>>,
}

impl SubgraphView {
    /// Decode protobuf bytes and build the view.
    pub fn from_proto(bytes: &[u8]) -> Result<Self> {
        let desc = GraphDescription::decode(bytes)?;
        Self::from_description(&desc)
    }

    pub fn from_description(desc: &GraphDescription) -> Result<Self> {
        let nodes = desc
            .nodes
            .iter()
            .map(|(key, node)| NodeView::from_raw(key, node).map(|view| (key.clone(), view)))
            .collect::<Result<HashMap<_, _>>>()?;

        let edges = desc
            .edges
            .iter()
            .map(|(key, list)| {
                let views = list
                    .edges
                    .iter()
                    .map(|e| EdgeView {
                        from_key: e.from.clone(),
                        to_key: e.to.clone(),
                        edge_name: e.edge_name.clone(),
                    })
                    .collect();
                (key.clone(), views)
            })
            .collect();

        let view = Self { nodes, edges };
        debug!(
            nodes = view.nodes.len(),
            edges = view.edge_count(),
            "decoded subgraph snapshot"
        );
        Ok(view)
    }

    /// Every process node; a fresh call starts over.
    pub fn process_iter(&self) -> impl Iterator<Item = &ProcessView> + '_ {
        self.nodes.values().filter_map(NodeView::as_process_view)
    }

    /// Every file node; a fresh call starts over.
    pub fn file_iter(&self) -> impl Iterator<Item = &FileView> + '_ {
        self.nodes.values().filter_map(NodeView::as_file_view)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}
