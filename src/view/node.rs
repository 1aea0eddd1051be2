//! Polymorphic node view over the supported entity kinds.

use super::file::FileView;
use super::process::ProcessView;
use crate::error::{AnalyzerError, Result};
use crate::proto::node_description::WhichNode;
use crate::proto::{FileDescription, NodeDescription, ProcessDescription};
use crate::schema::EntityKind;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeView {
    Process(ProcessView),
    File(FileView),
}

impl NodeView {
    /// Build a view from a snapshot node stored under `node_key`.
    ///
    /// The snapshot's own `node_key` wins when set; `node_key` fills in when
    /// the description leaves it empty.
    pub fn from_raw(node_key: &str, desc: &NodeDescription) -> Result<Self> {
        match &desc.which_node {
            Some(WhichNode::ProcessNode(p)) => Ok(NodeView::Process(process_from_raw(node_key, p))),
            Some(WhichNode::FileNode(f)) => Ok(NodeView::File(file_from_raw(node_key, f))),
            None => Err(AnalyzerError::UnsupportedNode(node_key.to_string())),
        }
    }

    pub fn node_key(&self) -> &str {
        match self {
            NodeView::Process(p) => &p.node_key,
            NodeView::File(f) => &f.node_key,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            NodeView::Process(_) => EntityKind::Process,
            NodeView::File(_) => EntityKind::File,
        }
    }

    pub fn as_process_view(&self) -> Option<&ProcessView> {
        match self {
            NodeView::Process(p) => Some(p),
            NodeView::File(_) => None,
        }
    }

    pub fn as_file_view(&self) -> Option<&FileView> {
        match self {
            NodeView::File(f) => Some(f),
            NodeView::Process(_) => None,
        }
    }
}

impl From<ProcessView> for NodeView {
    fn from(view: ProcessView) -> Self {
        NodeView::Process(view)
    }
}

impl From<FileView> for NodeView {
    fn from(view: FileView) -> Self {
        NodeView::File(view)
    }
}

// Protobuf scalars default to "" and 0; both mean "not recorded".
fn text(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn number(n: u64) -> Option<i64> {
    if n == 0 {
        None
    } else {
        i64::try_from(n).ok()
    }
}

fn key_or(desc_key: &str, fallback: &str) -> String {
    text(desc_key).unwrap_or_else(|| fallback.to_string())
}

fn process_from_raw(node_key: &str, p: &ProcessDescription) -> ProcessView {
    let mut view = ProcessView::new(key_or(&p.node_key, node_key));
    view.process_name = text(&p.process_name);
    view.process_command_line = text(&p.process_command_line);
    view.process_guid = text(&p.process_guid);
    view.process_id = number(p.process_id);
    view.created_timestamp = number(p.created_timestamp);
    view.terminated_timestamp = number(p.terminated_timestamp);
    view.last_seen_timestamp = number(p.last_seen_timestamp);
    view
}

fn file_from_raw(node_key: &str, f: &FileDescription) -> FileView {
    let mut view = FileView::new(key_or(&f.node_key, node_key));
    view.file_name = text(&f.file_name);
    view.file_path = text(&f.file_path);
    view.file_extension = text(&f.file_extension);
    view.file_mime_type = text(&f.file_mime_type);
    view.file_size = number(f.file_size);
    view.file_version = text(&f.file_version);
    view.file_description = text(&f.file_description);
    view.file_product = text(&f.file_product);
    view.file_company = text(&f.file_company);
    view.file_directory = text(&f.file_directory);
    view.file_inode = number(f.file_inode);
    view.file_hard_links = number(f.file_hard_links);
    view.md5_hash = text(&f.md5_hash);
    view.sha1_hash = text(&f.sha1_hash);
    view.sha256_hash = text(&f.sha256_hash);
    view
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_variant() {
        let desc = NodeDescription::process(ProcessDescription {
            node_key: "p1".into(),
            process_name: "bash".into(),
            process_id: 77,
            ..Default::default()
        });
        let view = NodeView::from_raw("p1", &desc).unwrap();

        assert_eq!(view.kind(), EntityKind::Process);
        assert!(view.as_file_view().is_none());
        let process = view.as_process_view().expect("process variant");
        assert_eq!(process.process_name.as_deref(), Some("bash"));
        assert_eq!(process.process_id, Some(77));
        assert!(process.process_guid.is_none(), "empty proto string is unset");
        assert!(process.created_timestamp.is_none(), "zero proto int is unset");
    }

    #[test]
    fn test_file_variant_key_fallback() {
        let desc = NodeDescription::file(FileDescription {
            file_path: "/etc/passwd".into(),
            ..Default::default()
        });
        let view = NodeView::from_raw("f9", &desc).unwrap();

        assert_eq!(view.node_key(), "f9");
        assert!(view.as_process_view().is_none());
        assert_eq!(
            view.as_file_view().unwrap().file_path.as_deref(),
            Some("/etc/passwd")
        );
    }

    #[test]
    fn test_unset_variant_is_error() {
        let err = NodeView::from_raw("x", &NodeDescription::default()).unwrap_err();
        assert!(matches!(err, AnalyzerError::UnsupportedNode(ref k) if k == "x"));
    }

    #[test]
    fn test_oversized_int_is_dropped() {
        assert_eq!(number(u64::MAX), None);
        assert_eq!(number(5), Some(5));
    }
}
