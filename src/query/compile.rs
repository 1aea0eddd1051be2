//! Query compiler: renders a [`QueryGraph`] as DQL text.
//!
//! Compilation walks the graph from one starting node, carrying an explicit
//! visited set. Each node is expanded at most once; a relation that points
//! at a node already expanded renders nothing, which is how cycles created by
//! inverse links terminate. The block for the designated root node is tagged
//! `Binding{n} as` so the trailing `res` clause can select it.

use std::collections::HashSet;

use super::filter::{quote, render_filters};
use super::node::{NodeId, QueryGraph};
use crate::schema::NODE_KEY;

/// Name of the variable bound to the root in binding pass `n`.
pub fn binding_name(binding: usize) -> String {
    format!("Binding{binding}")
}

/// Render the nested block for `node`, or nothing if it was already visited.
///
/// The returned text starts at the node's filter directive and ends with its
/// closing brace; the caller supplies the edge name in front of it.
pub fn render_block(
    graph: &QueryGraph,
    node: NodeId,
    binding: usize,
    root: NodeId,
    visited: &mut HashSet<NodeId>,
) -> String {
    if !visited.insert(node) {
        return String::new();
    }
    let filters = render_filters(graph[node].filter_groups());
    let body = render_body(graph, node, binding, root, visited);
    join_nonempty(&[filters.as_str(), body.as_str()])
}

/// Render the top-level `var` block that starts a traversal at `node`.
///
/// With `node_key` the block selects that single node; otherwise it selects
/// every node carrying the kind's anchor field. The node's own filters are
/// applied either way.
pub fn render_root_block(
    graph: &QueryGraph,
    node: NodeId,
    binding: usize,
    root: NodeId,
    node_key: Option<&str>,
) -> String {
    let mut visited = HashSet::from([node]);

    let tag = if node == root {
        format!("{} as", binding_name(binding))
    } else {
        String::new()
    };
    let func = match node_key {
        Some(key) => format!("eq({NODE_KEY}, {})", quote(key)),
        None => format!("has({})", graph[node].kind().anchor_field()),
    };
    let head = format!("var(func: {func}) @cascade");
    let filters = render_filters(graph[node].filter_groups());
    let body = render_body(graph, node, binding, root, &mut visited);

    join_nonempty(&[tag.as_str(), head.as_str(), filters.as_str(), body.as_str()])
}

fn render_body(
    graph: &QueryGraph,
    node: NodeId,
    binding: usize,
    root: NodeId,
    visited: &mut HashSet<NodeId>,
) -> String {
    let mut parts = vec!["{".to_string(), "uid".to_string()];
    for (rel, target) in graph.edges(node) {
        let inner = render_block(graph, target, binding, root, visited);
        if inner.is_empty() {
            continue;
        }
        if target == root {
            parts.push(format!("{} as", binding_name(binding)));
        }
        parts.push(rel.edge_name().to_string());
        parts.push(inner);
    }
    parts.push("}".to_string());
    parts.join(" ")
}

fn join_nonempty(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compiled var blocks plus the binding names they define.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub blocks: Vec<String>,
    pub bindings: Vec<String>,
}

impl CompiledQuery {
    /// Compile the graph with `root` as the single bound node.
    pub fn compile(graph: &QueryGraph, root: NodeId, node_key: Option<&str>) -> Self {
        Self {
            blocks: vec![render_root_block(graph, root, 0, root, node_key)],
            bindings: vec![binding_name(0)],
        }
    }

    /// Full query text: every block plus a `res` clause over the bindings.
    pub fn build_query(&self, count: bool, first: Option<u32>) -> String {
        build_query(&self.blocks, &self.bindings, count, first)
    }
}

/// Assemble var blocks and the `res` clause that materializes the bindings.
pub fn build_query(
    blocks: &[String],
    bindings: &[String],
    count: bool,
    first: Option<u32>,
) -> String {
    let uids = bindings.join(", ");
    let res = if count {
        format!("res(func: uid({uids})) {{ count(uid) }}")
    } else {
        let first = first.map(|n| format!(", first: {n}")).unwrap_or_default();
        format!(
            "res(func: uid({uids}){first}) {{ uid expand(_all_) {{ uid expand(_all_) {{ uid expand(_all_) }} }} }}"
        )
    };

    let mut out = String::from("{\n");
    for block in blocks {
        out.push_str("  ");
        out.push_str(block);
        out.push('\n');
    }
    out.push_str("  ");
    out.push_str(&res);
    out.push_str("\n}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::node::QueryNode;
    use crate::query::predicate::Predicate;
    use crate::schema::{EntityKind, Relation};

    fn process() -> (QueryGraph, NodeId) {
        let mut graph = QueryGraph::new();
        let id = graph.add_node(QueryNode::new(EntityKind::Process));
        (graph, id)
    }

    #[test]
    fn test_bare_root_block() {
        let (graph, root) = process();
        assert_eq!(
            render_root_block(&graph, root, 0, root, None),
            "Binding0 as var(func: has(process_id)) @cascade { uid }"
        );
    }

    #[test]
    fn test_keyed_root_block_with_filters() {
        let (mut graph, root) = process();
        graph[root].push_predicates(
            "process_name",
            vec![Predicate::contains("process_name", "services.exe").negate()],
        );
        assert_eq!(
            render_root_block(&graph, root, 0, root, Some("keyA")),
            r#"Binding0 as var(func: eq(node_key, "keyA")) @cascade @filter((NOT regexp(process_name, /.*services\.exe.*/i))) { uid }"#
        );
    }

    #[test]
    fn test_inverse_link_is_not_reexpanded() {
        let (mut graph, root) = process();
        let (child_graph, child) = process();
        graph.link(root, Relation::Children, &child_graph, child);

        assert_eq!(
            render_root_block(&graph, root, 0, root, None),
            "Binding0 as var(func: has(process_id)) @cascade { uid children { uid } }"
        );
    }

    #[test]
    fn test_root_reached_from_another_start_is_tagged() {
        let (mut graph, root) = process();
        let (child_graph, child) = process();
        let copy = graph.link(root, Relation::Children, &child_graph, child);

        let block = render_root_block(&graph, copy, 0, root, None);
        assert_eq!(
            block,
            "var(func: has(process_id)) @cascade { uid Binding0 as ~children { uid } }"
        );
    }

    #[test]
    fn test_visited_node_renders_nothing() {
        let (graph, root) = process();
        let mut visited = HashSet::from([root]);
        assert_eq!(render_block(&graph, root, 0, root, &mut visited), "");
    }

    #[test]
    fn test_build_query_res_clause() {
        let (graph, root) = process();
        let compiled = CompiledQuery::compile(&graph, root, None);
        assert_eq!(compiled.bindings, vec!["Binding0".to_string()]);

        let text = compiled.build_query(false, Some(1));
        assert!(text.contains("res(func: uid(Binding0), first: 1) { uid expand(_all_)"));
        assert!(text.starts_with("{\n  Binding0 as var("));
        assert!(text.ends_with("\n}"));

        let count = compiled.build_query(true, Some(1));
        assert!(count.contains("res(func: uid(Binding0)) { count(uid) }"));
    }
}
