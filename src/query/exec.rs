//! Query execution: compile, send to a [`GraphStore`], hydrate rows.

use serde_json::Value as Json;
use tracing::debug;

use super::compile::CompiledQuery;
use super::entity::{Entity, EntityQuery};
use crate::error::{AnalyzerError, Result};
use crate::store::GraphStore;

impl<K: Entity> EntityQuery<K> {
    /// Full query text rooted at this builder.
    ///
    /// `first` falls back to the cap set with [`only_first`](Self::only_first).
    pub fn to_query(&self, count: bool, first: Option<u32>) -> String {
        let first = first.or(self.node().first());
        self.get_queries(None).build_query(count, first)
    }

    /// Compiled blocks and binding names, optionally selecting the root by key.
    pub fn get_queries(&self, node_key: Option<&str>) -> CompiledQuery {
        CompiledQuery::compile(self.graph(), self.root(), node_key)
    }

    /// First matching node, or `None` when nothing matches.
    ///
    /// With `node_key` the root is selected by that key directly.
    pub fn query_first<S>(&self, store: &S, node_key: Option<&str>) -> Result<Option<K::View>>
    where
        S: GraphStore + ?Sized,
    {
        let text = match node_key {
            Some(_) => self.get_queries(node_key).build_query(false, Some(1)),
            None => self.to_query(false, Some(1)),
        };
        let rows = fetch_rows(store, &text)?;
        rows.first().map(K::hydrate).transpose()
    }

    /// Every matching node, up to the root's `only_first` cap.
    pub fn query<S>(&self, store: &S) -> Result<Vec<K::View>>
    where
        S: GraphStore + ?Sized,
    {
        let text = self.to_query(false, None);
        let rows = fetch_rows(store, &text)?;
        rows.iter().map(K::hydrate).collect()
    }

    /// Number of nodes matching the pattern.
    pub fn get_count<S>(&self, store: &S) -> Result<u64>
    where
        S: GraphStore + ?Sized,
    {
        let text = self.to_query(true, None);
        let rows = fetch_rows(store, &text)?;
        match rows.first() {
            None => Ok(0),
            Some(row) => row.get("count").and_then(Json::as_u64).ok_or_else(|| {
                AnalyzerError::MalformedResponse(format!("count row without `count`: {row}"))
            }),
        }
    }
}

fn fetch_rows<S>(store: &S, text: &str) -> Result<Vec<Json>>
where
    S: GraphStore + ?Sized,
{
    debug!(query = %text, "running query");
    let mut data = store.query(text)?;
    let rows = match data.get_mut("res").map(Json::take) {
        Some(Json::Array(rows)) => rows,
        Some(other) => {
            return Err(AnalyzerError::MalformedResponse(format!(
                "`res` is not a list: {other}"
            )))
        }
        None => {
            return Err(AnalyzerError::MalformedResponse(
                "response has no `res` field".into(),
            ))
        }
    };
    debug!(rows = rows.len(), "query returned");
    Ok(rows)
}
