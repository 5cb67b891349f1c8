use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default number of neighbours requested from `VECTOR_SEARCH`
pub const DEFAULT_TOP_K: usize = 6;

/// Default name of the precomputed embedding column
pub const DEFAULT_EMBEDDING_COLUMN: &str = "ml_generate_embedding_result";

/// Fixed per-deployment parameters of the search statement.
///
/// These end up spliced into SQL as identifiers (they cannot be bound like
/// values), so [`SearchConfig::validate`] restricts them to a safe charset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Fully qualified source table, `project.dataset.table`
    pub table: String,
    /// Fully qualified embedding model, `project.dataset.model`
    pub model: String,
    /// Column of `table` holding precomputed embeddings
    pub embedding_column: String,
    /// Result fan-out
    pub top_k: usize,
}

impl SearchConfig {
    pub fn new(table: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            model: model.into(),
            embedding_column: DEFAULT_EMBEDDING_COLUMN.to_string(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_embedding_column(mut self, column: impl Into<String>) -> Self {
        self.embedding_column = column.into();
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be at least 1".to_string()));
        }
        check_identifier("table", &self.table)?;
        check_identifier("model", &self.model)?;
        check_identifier("embedding_column", &self.embedding_column)?;
        if self.embedding_column.contains('.') {
            return Err(Error::InvalidConfig(format!(
                "embedding_column must be a bare column name, got '{}'",
                self.embedding_column
            )));
        }
        Ok(())
    }
}

fn check_identifier(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidConfig(format!("{} must not be empty", field)));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.');
    if let Some(bad) = value.chars().find(|c| !allowed(*c)) {
        return Err(Error::InvalidConfig(format!(
            "{} '{}' contains invalid character {:?}",
            field, value, bad
        )));
    }
    if value.split('.').any(str::is_empty) {
        return Err(Error::InvalidConfig(format!(
            "{} '{}' has an empty path segment",
            field, value
        )));
    }
    Ok(())
}
