//! Handler trait separating the transport from table logic.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use dynamock_model::error::DynamoDBError;
use dynamock_model::operations::DynamoDBOperation;

use crate::body::DynamoDBResponseBody;

/// Future returned by [`DynamoDBHandler::handle_operation`].
pub type HandlerFuture =
    Pin<Box<dyn Future<Output = Result<http::Response<DynamoDBResponseBody>, DynamoDBError>> + Send>>;

/// Implemented by whatever executes operations.
///
/// It receives the resolved operation and the raw JSON body, and produces a
/// complete HTTP response or a single error for the transport to render.
pub trait DynamoDBHandler: Send + Sync + 'static {
    /// Execute one operation.
    fn handle_operation(&self, op: DynamoDBOperation, body: Bytes) -> HandlerFuture;
}

/// Hand an operation to the handler.
pub async fn dispatch_operation<H: DynamoDBHandler>(
    handler: &H,
    op: DynamoDBOperation,
    body: Bytes,
) -> Result<http::Response<DynamoDBResponseBody>, DynamoDBError> {
    tracing::debug!(operation = %op, body_len = body.len(), "dispatching operation");
    handler.handle_operation(op, body).await
}
