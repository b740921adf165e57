//! In-memory telemetry source
//!
//! Serves pre-fetched tables, one per window. Used by tests and the
//! offline `evaluate` command.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

use super::{QueryError, QueryTable, QueryWindow, TelemetryQuery, WindowKind};

/// Saved query results for both windows
#[derive(Debug, Clone, Default)]
pub struct StaticTelemetry {
    baseline: QueryTable,
    recent: QueryTable,
}

impl StaticTelemetry {
    pub fn new(baseline: QueryTable, recent: QueryTable) -> Self {
        Self { baseline, recent }
    }

    /// Load both windows from JSON files.
    ///
    /// Each file may hold a bare table or a full query response
    /// (`{"tables": [...]}`), in which case the first table is used.
    pub fn from_files(baseline: &Path, recent: &Path) -> Result<Self, QueryError> {
        Ok(Self::new(load_table(baseline)?, load_table(recent)?))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SavedResult {
    Response { tables: Vec<QueryTable> },
    Table(QueryTable),
}

fn load_table(path: &Path) -> Result<QueryTable, QueryError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| QueryError::Fixture(format!("{}: {}", path.display(), e)))?;

    let saved: SavedResult = serde_json::from_str(&content)
        .map_err(|e| QueryError::Fixture(format!("{}: {}", path.display(), e)))?;

    match saved {
        SavedResult::Response { tables } => {
            tables.into_iter().next().ok_or(QueryError::EmptyResult)
        }
        SavedResult::Table(table) => Ok(table),
    }
}

#[async_trait]
impl TelemetryQuery for StaticTelemetry {
    fn id(&self) -> &str {
        "static"
    }

    async fn query(
        &self,
        _instance_name: &str,
        window: QueryWindow,
    ) -> Result<QueryTable, QueryError> {
        Ok(match window.kind {
            WindowKind::Baseline => self.baseline.clone(),
            WindowKind::Recent => self.recent.clone(),
        })
    }
}
