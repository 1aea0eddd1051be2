//! Typed query builders.
//!
//! [`ProcessQuery`] and [`FileQuery`] are by-value builders over a private
//! [`QueryGraph`]. Each one owns its arena, so linking never aliases: the
//! argument's pattern is copied in and the caller keeps their original.
//!
//! ```
//! use analyzerlib::{FileQuery, ProcessQuery, StrFilter};
//!
//! let query = ProcessQuery::new()
//!     .with_process_name(StrFilter::new().ends_with("winword.exe"))
//!     .with_children(
//!         &ProcessQuery::new().with_bin_file(
//!             &FileQuery::new().with_file_path(StrFilter::new().contains("\\Temp\\")),
//!         ),
//!     );
//! assert_eq!(query.get_edges().len(), 1);
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde_json::Value as Json;

use super::node::{NodeId, QueryGraph, QueryNode};
use super::predicate::{IntFilter, Predicate, StrFilter, Value};
use crate::error::{AnalyzerError, Result};
use crate::schema::{EntityKind, FieldType, Relation, NODE_KEY};
use crate::view::{FileView, ProcessView};

/// An entity kind that can be queried and hydrated.
pub trait Entity {
    const KIND: EntityKind;
    type View;

    /// Build a view from one result row.
    fn hydrate(row: &Json) -> Result<Self::View>;
}

/// Marker for process queries.
pub enum Process {}

/// Marker for file queries.
pub enum File {}

impl Entity for Process {
    const KIND: EntityKind = EntityKind::Process;
    type View = ProcessView;

    fn hydrate(row: &Json) -> Result<ProcessView> {
        ProcessView::from_dict(row)
    }
}

impl Entity for File {
    const KIND: EntityKind = EntityKind::File;
    type View = FileView;

    fn hydrate(row: &Json) -> Result<FileView> {
        FileView::from_dict(row)
    }
}

pub type ProcessQuery = EntityQuery<Process>;
pub type FileQuery = EntityQuery<File>;

/// A query description rooted at one entity of kind `K`.
pub struct EntityQuery<K> {
    graph: QueryGraph,
    root: NodeId,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Entity> EntityQuery<K> {
    pub fn new() -> Self {
        let mut graph = QueryGraph::new();
        let root = graph.add_node(QueryNode::new(K::KIND));
        Self {
            graph,
            root,
            _kind: PhantomData,
        }
    }

    pub fn graph(&self) -> &QueryGraph {
        &self.graph
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self) -> &QueryNode {
        &self.graph[self.root]
    }

    /// Root of the pattern linked under `rel`, if any.
    pub fn neighbor(&self, rel: Relation) -> Option<NodeId> {
        self.graph.neighbor(self.root, rel)
    }

    /// Match exactly one node by key.
    pub fn with_node_key(mut self, key: impl Into<String>) -> Self {
        self.graph[self.root].set_node_key(Predicate::eq(NODE_KEY, key.into()));
        self
    }

    /// Match any node that has a key.
    pub fn with_any_node_key(mut self) -> Self {
        self.graph[self.root].set_node_key(Predicate::has(NODE_KEY));
        self
    }

    /// Cap the number of rows returned when this query is the root.
    pub fn only_first(mut self, first: u32) -> Self {
        self.graph[self.root].set_first(first);
        self
    }

    /// Add a predicate naming its field at runtime.
    ///
    /// The field must exist on `K` and the predicate's value must match the
    /// field's type. A predicate on `node_key` replaces the identity filter.
    pub fn with_predicate(mut self, pred: Predicate) -> Result<Self> {
        let name = pred.field().to_string();
        if name == NODE_KEY {
            check_type(&pred, FieldType::Str)?;
            self.graph[self.root].set_node_key(pred);
            return Ok(self);
        }
        let field = K::KIND
            .field(&name)
            .ok_or_else(|| AnalyzerError::UnknownField {
                kind: K::KIND,
                field: name.clone(),
            })?;
        check_type(&pred, field.ty)?;
        self.graph[self.root].push_predicates(field.name, vec![pred]);
        Ok(self)
    }

    pub fn get_properties(&self) -> Vec<&'static str> {
        self.node().get_properties()
    }

    pub fn get_edges(&self) -> Vec<(&'static str, NodeId)> {
        self.graph.get_edges(self.root)
    }

    pub fn get_neighbors(&self) -> Vec<NodeId> {
        self.graph.get_neighbors(self.root)
    }

    fn str_field(mut self, field: &'static str, filter: StrFilter) -> Self {
        self.graph[self.root].push_predicates(field, filter.into_predicates(field));
        self
    }

    fn int_field(mut self, field: &'static str, filter: IntFilter) -> Self {
        self.graph[self.root].push_predicates(field, filter.into_predicates(field));
        self
    }

    fn link<O: Entity>(mut self, rel: Relation, other: &EntityQuery<O>) -> Self {
        debug_assert_eq!(rel.source(), K::KIND);
        debug_assert_eq!(rel.target(), O::KIND);
        self.graph.link(self.root, rel, &other.graph, other.root);
        self
    }
}

fn check_type(pred: &Predicate, expected: FieldType) -> Result<()> {
    let ok = match pred {
        Predicate::Has { .. } => true,
        Predicate::Eq { value: Value::Str(_), .. }
        | Predicate::Contains { .. }
        | Predicate::EndsWith { .. } => expected == FieldType::Str,
        Predicate::Eq { value: Value::Int(_), .. }
        | Predicate::Gt { .. }
        | Predicate::Lt { .. } => expected == FieldType::Int,
        Predicate::Not(inner) => return check_type(inner, expected),
    };
    if ok {
        Ok(())
    } else {
        Err(AnalyzerError::TypeMismatch {
            field: pred.field().to_string(),
            expected,
        })
    }
}

impl<K: Entity> Default for EntityQuery<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for EntityQuery<K> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            root: self.root,
            _kind: PhantomData,
        }
    }
}

impl<K: Entity> fmt::Debug for EntityQuery<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityQuery")
            .field("kind", &K::KIND)
            .field("root", &self.graph[self.root])
            .field("nodes", &self.graph.node_count())
            .finish()
    }
}

impl EntityQuery<Process> {
    pub fn with_process_name(self, filter: StrFilter) -> Self {
        self.str_field("process_name", filter)
    }

    pub fn with_process_command_line(self, filter: StrFilter) -> Self {
        self.str_field("process_command_line", filter)
    }

    pub fn with_process_guid(self, filter: StrFilter) -> Self {
        self.str_field("process_guid", filter)
    }

    pub fn with_process_id(self, filter: IntFilter) -> Self {
        self.int_field("process_id", filter)
    }

    pub fn with_created_timestamp(self, filter: IntFilter) -> Self {
        self.int_field("created_timestamp", filter)
    }

    pub fn with_terminated_timestamp(self, filter: IntFilter) -> Self {
        self.int_field("terminated_timestamp", filter)
    }

    pub fn with_last_seen_timestamp(self, filter: IntFilter) -> Self {
        self.int_field("last_seen_timestamp", filter)
    }

    pub fn with_parent(self, parent: &ProcessQuery) -> Self {
        self.link(Relation::Parent, parent)
    }

    pub fn with_children(self, children: &ProcessQuery) -> Self {
        self.link(Relation::Children, children)
    }

    pub fn with_bin_file(self, file: &FileQuery) -> Self {
        self.link(Relation::BinFile, file)
    }

    pub fn with_deleted_files(self, files: &FileQuery) -> Self {
        self.link(Relation::DeletedFiles, files)
    }

    pub fn with_created_files(self, files: &FileQuery) -> Self {
        self.link(Relation::CreatedFiles, files)
    }

    pub fn with_written_files(self, files: &FileQuery) -> Self {
        self.link(Relation::WroteFiles, files)
    }

    pub fn with_read_files(self, files: &FileQuery) -> Self {
        self.link(Relation::ReadFiles, files)
    }
}

impl EntityQuery<File> {
    pub fn with_file_name(self, filter: StrFilter) -> Self {
        self.str_field("file_name", filter)
    }

    pub fn with_file_path(self, filter: StrFilter) -> Self {
        self.str_field("file_path", filter)
    }

    pub fn with_file_extension(self, filter: StrFilter) -> Self {
        self.str_field("file_extension", filter)
    }

    pub fn with_file_mime_type(self, filter: StrFilter) -> Self {
        self.str_field("file_mime_type", filter)
    }

    pub fn with_file_size(self, filter: IntFilter) -> Self {
        self.int_field("file_size", filter)
    }

    pub fn with_file_version(self, filter: StrFilter) -> Self {
        self.str_field("file_version", filter)
    }

    pub fn with_file_description(self, filter: StrFilter) -> Self {
        self.str_field("file_description", filter)
    }

    pub fn with_file_product(self, filter: StrFilter) -> Self {
        self.str_field("file_product", filter)
    }

    pub fn with_file_company(self, filter: StrFilter) -> Self {
        self.str_field("file_company", filter)
    }

    pub fn with_file_directory(self, filter: StrFilter) -> Self {
        self.str_field("file_directory", filter)
    }

    pub fn with_file_inode(self, filter: IntFilter) -> Self {
        self.int_field("file_inode", filter)
    }

    pub fn with_file_hard_links(self, filter: IntFilter) -> Self {
        self.int_field("file_hard_links", filter)
    }

    pub fn with_md5_hash(self, filter: StrFilter) -> Self {
        self.str_field("md5_hash", filter)
    }

    pub fn with_sha1_hash(self, filter: StrFilter) -> Self {
        self.str_field("sha1_hash", filter)
    }

    pub fn with_sha256_hash(self, filter: StrFilter) -> Self {
        self.str_field("sha256_hash", filter)
    }

    pub fn with_creator(self, process: &ProcessQuery) -> Self {
        self.link(Relation::Creator, process)
    }

    pub fn with_deleter(self, process: &ProcessQuery) -> Self {
        self.link(Relation::Deleter, process)
    }

    pub fn with_writers(self, processes: &ProcessQuery) -> Self {
        self.link(Relation::Writers, processes)
    }

    pub fn with_readers(self, processes: &ProcessQuery) -> Self {
        self.link(Relation::Readers, processes)
    }

    pub fn with_spawned_from(self, processes: &ProcessQuery) -> Self {
        self.link(Relation::SpawnedFrom, processes)
    }
}
