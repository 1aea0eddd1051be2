//! Snapshot wire format.
//!
//! A `GraphDescription` is one protobuf-encoded subgraph: nodes keyed by
//! node key and edge lists keyed by source node key. Messages are declared
//! with `prost` derives directly; there is no `.proto` build step.

use std::collections::HashMap;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GraphDescription {
    #[prost(map = "string, message", tag = "1")]
    pub nodes: HashMap<String, NodeDescription>,
    #[prost(map = "string, message", tag = "2")]
    pub edges: HashMap<String, EdgeList>,
    #[prost(uint64, tag = "3")]
    pub timestamp: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeDescription {
    #[prost(oneof = "node_description::WhichNode", tags = "1, 2")]
    pub which_node: Option<node_description::WhichNode>,
}

pub mod node_description {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum WhichNode {
        #[prost(message, tag = "1")]
        ProcessNode(super::ProcessDescription),
        #[prost(message, tag = "2")]
        FileNode(super::FileDescription),
    }
}

impl NodeDescription {
    pub fn process(desc: ProcessDescription) -> Self {
        Self {
            which_node: Some(node_description::WhichNode::ProcessNode(desc)),
        }
    }

    pub fn file(desc: FileDescription) -> Self {
        Self {
            which_node: Some(node_description::WhichNode::FileNode(desc)),
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProcessDescription {
    #[prost(string, tag = "1")]
    pub node_key: String,
    #[prost(string, tag = "2")]
    pub asset_id: String,
    #[prost(uint64, tag = "3")]
    pub created_timestamp: u64,
    #[prost(uint64, tag = "4")]
    pub terminated_timestamp: u64,
    #[prost(uint64, tag = "5")]
    pub last_seen_timestamp: u64,
    #[prost(uint64, tag = "6")]
    pub process_id: u64,
    #[prost(string, tag = "7")]
    pub process_guid: String,
    #[prost(string, tag = "8")]
    pub process_name: String,
    #[prost(string, tag = "9")]
    pub process_command_line: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileDescription {
    #[prost(string, tag = "1")]
    pub node_key: String,
    #[prost(string, tag = "2")]
    pub asset_id: String,
    #[prost(uint64, tag = "3")]
    pub created_timestamp: u64,
    #[prost(uint64, tag = "4")]
    pub deleted_timestamp: u64,
    #[prost(uint64, tag = "5")]
    pub last_seen_timestamp: u64,
    #[prost(string, tag = "6")]
    pub file_name: String,
    #[prost(string, tag = "7")]
    pub file_path: String,
    #[prost(string, tag = "8")]
    pub file_extension: String,
    #[prost(string, tag = "9")]
    pub file_mime_type: String,
    #[prost(uint64, tag = "10")]
    pub file_size: u64,
    #[prost(string, tag = "11")]
    pub file_version: String,
    #[prost(string, tag = "12")]
    pub file_description: String,
    #[prost(string, tag = "13")]
    pub file_product: String,
    #[prost(string, tag = "14")]
    pub file_company: String,
    #[prost(string, tag = "15")]
    pub file_directory: String,
    #[prost(uint64, tag = "16")]
    pub file_inode: u64,
    #[prost(uint64, tag = "17")]
    pub file_hard_links: u64,
    #[prost(string, tag = "18")]
    pub md5_hash: String,
    #[prost(string, tag = "19")]
    pub sha1_hash: String,
    #[prost(string, tag = "20")]
    pub sha256_hash: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EdgeList {
    #[prost(message, repeated, tag = "1")]
    pub edges: Vec<EdgeDescription>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EdgeDescription {
    #[prost(string, tag = "1")]
    pub from: String,
    #[prost(string, tag = "2")]
    pub to: String,
    #[prost(string, tag = "3")]
    pub edge_name: String,
}
