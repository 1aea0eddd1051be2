//! File view.

use serde_json::Value as Json;

use super::process::ProcessView;
use super::raw::{dicts, many, one, opt_int, opt_str, required_str, RowWriter};
use crate::error::Result;
use crate::schema::{EntityKind, Relation};

const KIND: EntityKind = EntityKind::File;

/// A file node hydrated from a result row.
#[derive(Debug, Clone, PartialEq)]
pub struct FileView {
    pub node_key: String,
    pub uid: Option<String>,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub file_extension: Option<String>,
    pub file_mime_type: Option<String>,
    pub file_size: Option<i64>,
    pub file_version: Option<String>,
    pub file_description: Option<String>,
    pub file_product: Option<String>,
    pub file_company: Option<String>,
    pub file_directory: Option<String>,
    pub file_inode: Option<i64>,
    pub file_hard_links: Option<i64>,
    pub md5_hash: Option<String>,
    pub sha1_hash: Option<String>,
    pub sha256_hash: Option<String>,
    pub creator: Option<Box<ProcessView>>,
    pub deleter: Option<Box<ProcessView>>,
    pub writers: Option<Vec<ProcessView>>,
    pub readers: Option<Vec<ProcessView>>,
    pub spawned_from: Option<Vec<ProcessView>>,
}

impl FileView {
    pub fn new(node_key: impl Into<String>) -> Self {
        Self {
            node_key: node_key.into(),
            uid: None,
            file_name: None,
            file_path: None,
            file_extension: None,
            file_mime_type: None,
            file_size: None,
            file_version: None,
            file_description: None,
            file_product: None,
            file_company: None,
            file_directory: None,
            file_inode: None,
            file_hard_links: None,
            md5_hash: None,
            sha1_hash: None,
            sha256_hash: None,
            creator: None,
            deleter: None,
            writers: None,
            readers: None,
            spawned_from: None,
        }
    }

    pub fn from_dict(row: &Json) -> Result<Self> {
        Ok(Self {
            node_key: required_str(row, KIND, "node_key")?,
            uid: opt_str(row, KIND, "uid")?,
            file_name: opt_str(row, KIND, "file_name")?,
            file_path: opt_str(row, KIND, "file_path")?,
            file_extension: opt_str(row, KIND, "file_extension")?,
            file_mime_type: opt_str(row, KIND, "file_mime_type")?,
            file_size: opt_int(row, KIND, "file_size")?,
            file_version: opt_str(row, KIND, "file_version")?,
            file_description: opt_str(row, KIND, "file_description")?,
            file_product: opt_str(row, KIND, "file_product")?,
            file_company: opt_str(row, KIND, "file_company")?,
            file_directory: opt_str(row, KIND, "file_directory")?,
            file_inode: opt_int(row, KIND, "file_inode")?,
            file_hard_links: opt_int(row, KIND, "file_hard_links")?,
            md5_hash: opt_str(row, KIND, "md5_hash")?,
            sha1_hash: opt_str(row, KIND, "sha1_hash")?,
            sha256_hash: opt_str(row, KIND, "sha256_hash")?,
            creator: one(row, Relation::Creator, ProcessView::from_dict)?,
            deleter: one(row, Relation::Deleter, ProcessView::from_dict)?,
            writers: many(row, Relation::Writers, ProcessView::from_dict)?,
            readers: many(row, Relation::Readers, ProcessView::from_dict)?,
            spawned_from: many(row, Relation::SpawnedFrom, ProcessView::from_dict)?,
        })
    }

    pub fn to_dict(&self) -> Json {
        RowWriter::new(&self.node_key)
            .str("uid", &self.uid)
            .str("file_name", &self.file_name)
            .str("file_path", &self.file_path)
            .str("file_extension", &self.file_extension)
            .str("file_mime_type", &self.file_mime_type)
            .int("file_size", self.file_size)
            .str("file_version", &self.file_version)
            .str("file_description", &self.file_description)
            .str("file_product", &self.file_product)
            .str("file_company", &self.file_company)
            .str("file_directory", &self.file_directory)
            .int("file_inode", self.file_inode)
            .int("file_hard_links", self.file_hard_links)
            .str("md5_hash", &self.md5_hash)
            .str("sha1_hash", &self.sha1_hash)
            .str("sha256_hash", &self.sha256_hash)
            .rows(
                Relation::Creator.edge_name(),
                self.creator.as_ref().map(|p| vec![p.to_dict()]),
            )
            .rows(
                Relation::Deleter.edge_name(),
                self.deleter.as_ref().map(|p| vec![p.to_dict()]),
            )
            .rows(Relation::Writers.edge_name(), dicts(&self.writers, ProcessView::to_dict))
            .rows(Relation::Readers.edge_name(), dicts(&self.readers, ProcessView::to_dict))
            .rows(
                Relation::SpawnedFrom.edge_name(),
                dicts(&self.spawned_from, ProcessView::to_dict),
            )
            .finish()
    }
}
