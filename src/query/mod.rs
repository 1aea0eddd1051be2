//! Query module: describing, compiling and running graph patterns.
//!
//! ## Core API
//!
//! ```ignore
//! let suspicious = ProcessQuery::new()
//!     .with_process_name(StrFilter::new().ends_with("svchost.exe"))
//!     .with_parent(
//!         &ProcessQuery::new().with_process_name(StrFilter::new().not_eq("services.exe")),
//!     )
//!     .query(&client)?;
//! ```

pub mod compile;
pub mod entity;
mod exec;
pub mod filter;
pub mod node;
pub mod predicate;

pub use compile::{build_query, render_block, render_root_block, CompiledQuery};
pub use entity::{Entity, EntityQuery, FileQuery, ProcessQuery};
pub use node::{NodeId, QueryGraph, QueryNode};
pub use predicate::{IntFilter, Predicate, StrFilter, Value};
