//! # Grapl analyzer library
//!
//! Query builder, DQL compiler and typed views for security telemetry graphs.
//!
//! Analyzers describe a pattern over processes and files, the library
//! compiles it to a Dgraph query, runs it against a graph store and hands
//! back typed views of the matching nodes.
//!
//! ## Key Features
//!
//! - **Declarative**: Patterns are built with typed, chainable builders
//! - **Cycle-safe**: Linked patterns refer back to each other; compilation
//!   visits every node once
//! - **Typed results**: Rows hydrate into `ProcessView` / `FileView` trees
//! - **Snapshots**: Protobuf subgraph descriptions decode into the same views
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use analyzerlib::{AnalyzerConfig, DgraphClient, ProcessQuery, StrFilter};
//!
//! let config = AnalyzerConfig::default().with_env_overrides();
//! let client = DgraphClient::new(&config.store)?;
//!
//! let hits = ProcessQuery::new()
//!     .with_process_name(StrFilter::new().ends_with("svchost.exe"))
//!     .with_parent(
//!         &ProcessQuery::new().with_process_name(StrFilter::new().not_eq("services.exe")),
//!     )
//!     .query(&client)?;
//!
//! for hit in hits {
//!     println!("{}", hit.node_key);
//! }
//! # Ok::<(), analyzerlib::AnalyzerError>(())
//! ```

pub mod config;
pub mod error;
pub mod proto;
pub mod query;
pub mod schema;
pub mod store;
pub mod view;

// Re-exports for convenience
pub use config::{AnalyzerConfig, StoreConfig};
pub use error::{AnalyzerError, Result};
pub use schema::{EntityKind, FieldType, Relation};

pub use query::{FileQuery, IntFilter, Predicate, ProcessQuery, StrFilter};
pub use store::{DgraphClient, GraphStore, RetryPolicy};
pub use view::{EdgeView, FileView, NodeView, ProcessView, SubgraphView};
