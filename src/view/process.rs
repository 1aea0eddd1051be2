//! Process view.

use serde_json::Value as Json;
use tracing::debug;

use super::file::FileView;
use super::raw::{dicts, many, one, opt_int, opt_str, required_str, RowWriter};
use crate::error::Result;
use crate::query::{FileQuery, ProcessQuery, StrFilter};
use crate::schema::{EntityKind, Relation};
use crate::store::GraphStore;

const KIND: EntityKind = EntityKind::Process;

/// A process node hydrated from a result row.
///
/// Scalars and neighbors are `None` when the query did not ask for them.
/// The `get_*` methods fill them in on demand with one store query and
/// cache the answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessView {
    pub node_key: String,
    pub uid: Option<String>,
    pub process_name: Option<String>,
    pub process_command_line: Option<String>,
    pub process_guid: Option<String>,
    pub process_id: Option<i64>,
    pub created_timestamp: Option<i64>,
    pub terminated_timestamp: Option<i64>,
    pub last_seen_timestamp: Option<i64>,
    pub bin_file: Option<Box<FileView>>,
    pub parent: Option<Box<ProcessView>>,
    pub children: Option<Vec<ProcessView>>,
    pub deleted_files: Option<Vec<FileView>>,
    pub created_files: Option<Vec<FileView>>,
    pub wrote_files: Option<Vec<FileView>>,
    pub read_files: Option<Vec<FileView>>,
}

impl ProcessView {
    /// A view that only knows its key.
    pub fn new(node_key: impl Into<String>) -> Self {
        Self {
            node_key: node_key.into(),
            uid: None,
            process_name: None,
            process_command_line: None,
            process_guid: None,
            process_id: None,
            created_timestamp: None,
            terminated_timestamp: None,
            last_seen_timestamp: None,
            bin_file: None,
            parent: None,
            children: None,
            deleted_files: None,
            created_files: None,
            wrote_files: None,
            read_files: None,
        }
    }

    /// Hydrate a view (and any nested neighbors) from one result row.
    pub fn from_dict(row: &Json) -> Result<Self> {
        Ok(Self {
            node_key: required_str(row, KIND, "node_key")?,
            uid: opt_str(row, KIND, "uid")?,
            process_name: opt_str(row, KIND, "process_name")?,
            process_command_line: opt_str(row, KIND, "process_command_line")?,
            process_guid: opt_str(row, KIND, "process_guid")?,
            process_id: opt_int(row, KIND, "process_id")?,
            created_timestamp: opt_int(row, KIND, "created_timestamp")?,
            terminated_timestamp: opt_int(row, KIND, "terminated_timestamp")?,
            last_seen_timestamp: opt_int(row, KIND, "last_seen_timestamp")?,
            bin_file: one(row, Relation::BinFile, FileView::from_dict)?,
            parent: one(row, Relation::Parent, ProcessView::from_dict)?,
            children: many(row, Relation::Children, ProcessView::from_dict)?,
            deleted_files: many(row, Relation::DeletedFiles, FileView::from_dict)?,
            created_files: many(row, Relation::CreatedFiles, FileView::from_dict)?,
            wrote_files: many(row, Relation::WroteFiles, FileView::from_dict)?,
            read_files: many(row, Relation::ReadFiles, FileView::from_dict)?,
        })
    }

    /// Row in the store's shape; single neighbors become one-element lists.
    pub fn to_dict(&self) -> Json {
        RowWriter::new(&self.node_key)
            .str("uid", &self.uid)
            .str("process_name", &self.process_name)
            .str("process_command_line", &self.process_command_line)
            .str("process_guid", &self.process_guid)
            .int("process_id", self.process_id)
            .int("created_timestamp", self.created_timestamp)
            .int("terminated_timestamp", self.terminated_timestamp)
            .int("last_seen_timestamp", self.last_seen_timestamp)
            .rows(
                Relation::BinFile.edge_name(),
                self.bin_file.as_ref().map(|f| vec![f.to_dict()]),
            )
            .rows(
                Relation::Parent.edge_name(),
                self.parent.as_ref().map(|p| vec![p.to_dict()]),
            )
            .rows(Relation::Children.edge_name(), dicts(&self.children, ProcessView::to_dict))
            .rows(Relation::DeletedFiles.edge_name(), dicts(&self.deleted_files, FileView::to_dict))
            .rows(Relation::CreatedFiles.edge_name(), dicts(&self.created_files, FileView::to_dict))
            .rows(Relation::WroteFiles.edge_name(), dicts(&self.wrote_files, FileView::to_dict))
            .rows(Relation::ReadFiles.edge_name(), dicts(&self.read_files, FileView::to_dict))
            .finish()
    }

    pub fn get_process_name<S>(&mut self, store: &S) -> Result<Option<&str>>
    where
        S: GraphStore + ?Sized,
    {
        if self.process_name.is_none() {
            debug!(node_key = %self.node_key, "loading process_name");
            let found = ProcessQuery::new()
                .with_node_key(self.node_key.clone())
                .with_process_name(StrFilter::new())
                .query_first(store, None)?;
            self.process_name = found.and_then(|p| p.process_name);
        }
        Ok(self.process_name.as_deref())
    }

    /// The process whose `children` include this one.
    pub fn get_parent<S>(&mut self, store: &S) -> Result<Option<&ProcessView>>
    where
        S: GraphStore + ?Sized,
    {
        if self.parent.is_none() {
            debug!(node_key = %self.node_key, "loading parent");
            let found = ProcessQuery::new()
                .with_children(&ProcessQuery::new().with_node_key(self.node_key.clone()))
                .query_first(store, None)?;
            self.parent = found.map(Box::new);
        }
        Ok(self.parent.as_deref())
    }

    pub fn get_bin_file<S>(&mut self, store: &S) -> Result<Option<&FileView>>
    where
        S: GraphStore + ?Sized,
    {
        if self.bin_file.is_none() {
            debug!(node_key = %self.node_key, "loading bin_file");
            let found = ProcessQuery::new()
                .with_node_key(self.node_key.clone())
                .with_bin_file(&FileQuery::new().with_any_node_key())
                .query_first(store, None)?;
            self.bin_file = found.and_then(|p| p.bin_file);
        }
        Ok(self.bin_file.as_deref())
    }

    pub fn get_deleted_files<S>(&mut self, store: &S) -> Result<Option<&[FileView]>>
    where
        S: GraphStore + ?Sized,
    {
        if self.deleted_files.is_none() {
            debug!(node_key = %self.node_key, "loading deleted_files");
            let found = ProcessQuery::new()
                .with_node_key(self.node_key.clone())
                .with_deleted_files(&FileQuery::new().with_any_node_key())
                .query(store)?;
            self.deleted_files = found.into_iter().next().and_then(|p| p.deleted_files);
        }
        Ok(self.deleted_files.as_deref())
    }

    pub fn get_uid<S>(&mut self, store: &S) -> Result<Option<&str>>
    where
        S: GraphStore + ?Sized,
    {
        if self.uid.is_none() {
            debug!(node_key = %self.node_key, "loading uid");
            let found = ProcessQuery::new()
                .with_node_key(self.node_key.clone())
                .query_first(store, None)?;
            self.uid = found.and_then(|p| p.uid);
        }
        Ok(self.uid.as_deref())
    }
}
