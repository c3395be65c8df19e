use super::{PageResult, QueryError, QueryRequest};
use crate::retrieval::SessionId;

/// Trait for issuing one paged query against the remote service
///
/// Implementations own the authenticated connection; the retrieval core
/// only ever sees pages. An empty page is a valid answer and is not an
/// error: the caller decides whether to retry.
#[async_trait::async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Fetch the next page of `request.session_id` within `request.window`
    async fn query(&self, request: &QueryRequest) -> Result<PageResult, QueryError>;

    /// Drop any continuation state held for `session_id`; it will not be queried again
    fn release(&self, _session_id: &SessionId) {}
}
