use crate::domain::model::Record;
use crate::domain::ports::UpstreamSource;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Stand-in for the translator node collaborator. The host does not expose
/// that node's output to this process yet, so the shipped source always
/// yields an empty dataset and the monthly path simply emits no
/// `Translated` file.
#[derive(Debug, Clone, Default)]
pub struct NoopUpstreamSource;

#[async_trait]
impl UpstreamSource for NoopUpstreamSource {
    async fn fetch_dataset(&self, node_name: &str) -> Result<Vec<Record>> {
        tracing::debug!(node = node_name, "no upstream dataset available");
        Ok(Vec::new())
    }
}
