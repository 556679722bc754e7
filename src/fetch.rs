use std::sync::Arc;

use serde_json::json;

use crate::action::Tab;
use crate::config::WorkItemQuery;
use crate::devops::{get_json, post_json, Endpoints, Transport};
use crate::error::Result;
use crate::types::{Item, ListResponse, PullRequest, WiqlResponse, WorkItem};

/// Runs the fixed per-tab queries and turns the responses into list items.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
    query: WorkItemQuery,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>, endpoints: Endpoints, query: WorkItemQuery) -> Self {
        Self {
            transport,
            endpoints,
            query,
        }
    }

    pub async fn fetch(&self, tab: Tab) -> Result<Vec<Item>> {
        match tab {
            Tab::WorkItems => self.work_items().await,
            Tab::PullRequests => self.pull_requests().await,
        }
    }

    /// WIQL search for ids, then one batch read of the full records. The batch read
    /// is issued even when the search matched nothing.
    pub async fn work_items(&self) -> Result<Vec<Item>> {
        let body = json!({ "query": self.query.wiql() });
        let found: WiqlResponse =
            post_json(self.transport.as_ref(), &self.endpoints.wiql(), &body).await?;

        let ids: Vec<u64> = found.work_items.iter().map(|r| r.id).collect();
        tracing::debug!(count = ids.len(), "wiql matched work items");

        let records: ListResponse<WorkItem> =
            get_json(self.transport.as_ref(), &self.endpoints.work_items(&ids)).await?;

        Ok(records.value.into_iter().map(Item::WorkItem).collect())
    }

    pub async fn pull_requests(&self) -> Result<Vec<Item>> {
        let records: ListResponse<PullRequest> =
            get_json(self.transport.as_ref(), &self.endpoints.pull_requests()).await?;

        Ok(records.value.into_iter().map(Item::PullRequest).collect())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{endpoints, FakeTransport};
    use super::*;
    use crate::error::AzError;

    fn fetcher(transport: Arc<FakeTransport>) -> Fetcher {
        Fetcher::new(transport, endpoints(), WorkItemQuery::default())
    }

    #[tokio::test]
    async fn work_items_search_then_batch_read() {
        let transport = Arc::new(FakeTransport::dashboard(
            r#"{"workItems": [{"id": 1}, {"id": 2}]}"#,
        ));
        let items = fetcher(transport.clone()).work_items().await.unwrap();

        assert_eq!(items.iter().map(Item::id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(
            transport.calls(),
            vec![
                "https://dev.azure.com/org/_apis/wit/wiql?api-version=5.0".to_string(),
                "https://dev.azure.com/org/_apis/wit/workItems?ids=1,2".to_string(),
            ]
        );
        let bodies = transport.bodies.lock().unwrap();
        assert_eq!(bodies[0]["query"], WorkItemQuery::default().wiql());
    }

    #[tokio::test]
    async fn empty_search_still_issues_batch_read() {
        let transport = Arc::new(
            FakeTransport::default()
                .route("/wiql", r#"{"workItems": []}"#)
                .route("/workItems", r#"{"count": 0, "value": []}"#),
        );
        let items = fetcher(transport.clone()).work_items().await.unwrap();

        assert!(items.is_empty());
        assert_eq!(
            transport.calls().last().map(String::as_str),
            Some("https://dev.azure.com/org/_apis/wit/workItems?ids=")
        );
    }

    #[tokio::test]
    async fn pull_requests_single_call() {
        let transport = Arc::new(FakeTransport::dashboard("{}"));
        let items = fetcher(transport.clone())
            .fetch(Tab::PullRequests)
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id(), 42);
        assert_eq!(transport.calls().len(), 1);
        assert!(transport.calls()[0].ends_with("?searchCriteria.includeLinks=False"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let transport = Arc::new(FakeTransport::default().fail("/wiql", 401));
        let err = fetcher(transport.clone()).work_items().await.unwrap_err();

        assert!(matches!(err, AzError::Status { status: 401, .. }));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let transport = Arc::new(FakeTransport::default().route("/pullRequests", "<html>"));
        let err = fetcher(transport).pull_requests().await.unwrap_err();
        assert!(matches!(err, AzError::Decode(_)));
    }
}
