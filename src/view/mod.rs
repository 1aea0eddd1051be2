//! Typed views over query results and subgraph snapshots.
//!
//! Views are plain data. Neighbors that a query did not request are `None`;
//! the lazy getters on [`ProcessView`] take the store explicitly and cache
//! what they load.

mod file;
mod node;
mod process;
mod raw;
mod subgraph;

pub use file::FileView;
pub use node::NodeView;
pub use process::ProcessView;
pub use subgraph::{EdgeView, SubgraphView};
