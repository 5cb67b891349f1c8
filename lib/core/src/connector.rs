use crate::error::Result;
use crate::query::QueryDescriptor;
use crate::row::ResultRow;
use async_trait::async_trait;

/// Statement used by [`WarehouseConnector::ping`] implementations
pub const PING_SQL: &str = "SELECT 1";

/// Authenticated query submission against the warehouse.
///
/// One instance is built at startup and shared by every request handler,
/// so implementations must be safe to call concurrently.
#[async_trait]
pub trait WarehouseConnector: Send + Sync {
    /// Run `query` and return its rows in the order the warehouse ranked them
    async fn submit(&self, query: &QueryDescriptor) -> Result<Vec<ResultRow>>;

    /// Cheap round trip proving the warehouse is reachable and credentials work
    async fn ping(&self) -> Result<()>;
}
