//! Query templating
//!
//! Turns free text into a [`QueryDescriptor`]: a `VECTOR_SEARCH` statement
//! that embeds the text with `ML.GENERATE_EMBEDDING` and returns the top-k
//! nearest rows. The text is always passed as the named parameter `@query`,
//! so the SQL is the same string for every request under one config.

use crate::config::SearchConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Name of the bound parameter carrying the user's text
pub const QUERY_PARAM: &str = "query";

/// Columns projected from the matched base rows, in output order
pub const RESULT_COLUMNS: [&str; 5] = ["name", "img", "price", "brand", "avg_rating"];

/// Free text submitted by a client. Not validated; empty text is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A named STRING parameter bound into the statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParameter {
    pub name: String,
    pub value: String,
}

/// A rendered statement plus the values bound into it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub sql: String,
    pub parameters: Vec<QueryParameter>,
}

impl QueryDescriptor {
    /// A descriptor with no parameters, used for connectivity probes
    pub fn plain(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            parameters: Vec::new(),
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

/// Pre-rendered search statement for one [`SearchConfig`]
#[derive(Debug, Clone)]
pub struct QueryTemplate {
    sql: String,
    top_k: usize,
}

impl QueryTemplate {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        config.validate()?;

        let projection = RESULT_COLUMNS
            .iter()
            .map(|c| format!("base.{}", c))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "SELECT {projection}\n\
             FROM VECTOR_SEARCH(\n\
             \x20 TABLE `{table}`, '{column}',\n\
             \x20 (\n\
             \x20   SELECT {column}, content AS query\n\
             \x20   FROM ML.GENERATE_EMBEDDING(\n\
             \x20     MODEL `{model}`,\n\
             \x20     (SELECT @{param} AS content))\n\
             \x20 ),\n\
             \x20 top_k => {top_k})",
            projection = projection,
            table = config.table,
            column = config.embedding_column,
            model = config.model,
            param = QUERY_PARAM,
            top_k = config.top_k,
        );

        Ok(Self {
            sql,
            top_k: config.top_k,
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Bind `query` into the statement
    pub fn render(&self, query: &SearchQuery) -> QueryDescriptor {
        let descriptor = QueryDescriptor {
            sql: self.sql.clone(),
            parameters: vec![QueryParameter {
                name: QUERY_PARAM.to_string(),
                value: query.text.clone(),
            }],
        };
        tracing::info!(
            sql = %descriptor.sql,
            query = %query.text,
            "Rendered vector search query"
        );
        descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> QueryTemplate {
        let config = SearchConfig::new("proj.shop.fashion_dataset", "proj.shop.embedding_model");
        QueryTemplate::new(&config).unwrap()
    }

    #[test]
    fn test_rendered_statement_shape() {
        let descriptor = template().render(&SearchQuery::new("red sneakers"));

        assert!(descriptor
            .sql
            .starts_with("SELECT base.name, base.img, base.price, base.brand, base.avg_rating"));
        assert!(descriptor.sql.contains("TABLE `proj.shop.fashion_dataset`, 'ml_generate_embedding_result'"));
        assert!(descriptor.sql.contains("MODEL `proj.shop.embedding_model`"));
        assert!(descriptor.sql.contains("(SELECT @query AS content)"));
        assert!(descriptor.sql.ends_with("top_k => 6)"));
    }

    #[test]
    fn test_text_is_bound_verbatim() {
        let descriptor = template().render(&SearchQuery::new("red sneakers"));
        assert_eq!(descriptor.parameter(QUERY_PARAM), Some("red sneakers"));
        assert!(!descriptor.sql.contains("red sneakers"));
    }

    #[test]
    fn test_statement_independent_of_text() {
        let template = template();
        let inputs = [
            "",
            "red sneakers",
            "it's a trap' AS content)); DROP TABLE x; --",
            "`backtick` @query \\ \n newline",
        ];
        for input in inputs {
            let descriptor = template.render(&SearchQuery::new(input));
            assert_eq!(descriptor.sql, template.sql());
            assert_eq!(descriptor.parameter(QUERY_PARAM), Some(input));
            assert_eq!(descriptor.parameters.len(), 1);
        }
    }

    #[test]
    fn test_empty_query_still_renders() {
        let descriptor = template().render(&SearchQuery::new(""));
        assert_eq!(descriptor.parameter(QUERY_PARAM), Some(""));
        assert!(descriptor.sql.contains("@query"));
    }

    #[test]
    fn test_custom_top_k_and_column() {
        let config = SearchConfig::new("p.d.t", "p.d.m")
            .with_top_k(10)
            .with_embedding_column("text_embedding");
        let template = QueryTemplate::new(&config).unwrap();

        assert_eq!(template.top_k(), 10);
        assert!(template.sql().contains("'text_embedding'"));
        assert!(template.sql().contains("SELECT text_embedding, content AS query"));
        assert!(template.sql().ends_with("top_k => 10)"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SearchConfig::new("p.d.t", "p.d.m").with_top_k(0);
        assert!(QueryTemplate::new(&config).is_err());
    }
}
