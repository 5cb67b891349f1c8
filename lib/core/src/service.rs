use crate::config::SearchConfig;
use crate::connector::WarehouseConnector;
use crate::error::Result;
use crate::query::{QueryTemplate, SearchQuery};
use crate::row::{NormalizedRecord, ResultSet};
use std::sync::Arc;

/// Text in, normalized ranked records out
#[derive(Clone)]
pub struct SearchService {
    template: QueryTemplate,
    connector: Arc<dyn WarehouseConnector>,
}

impl SearchService {
    pub fn new(config: &SearchConfig, connector: Arc<dyn WarehouseConnector>) -> Result<Self> {
        Ok(Self {
            template: QueryTemplate::new(config)?,
            connector,
        })
    }

    pub fn template(&self) -> &QueryTemplate {
        &self.template
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>> {
        let descriptor = self.template.render(query);
        let rows = self.connector.submit(&descriptor).await?;
        let results = ResultSet::new(rows, self.template.top_k());
        tracing::debug!(rows = results.len(), "Vector search completed");
        Ok(results.normalize())
    }

    pub async fn ping(&self) -> Result<()> {
        self.connector.ping().await
    }
}
