//! Handler bridging the HTTP transport to the provider.

use std::sync::Arc;

use bytes::Bytes;

use dynamock_http::body::DynamoDBResponseBody;
use dynamock_http::dispatch::{DynamoDBHandler, HandlerFuture};
use dynamock_http::response::json_response;
use dynamock_model::error::DynamoDBError;
use dynamock_model::operations::DynamoDBOperation;

use crate::provider::DynamockProvider;

/// Handler that decodes request bodies and runs them on the provider.
#[derive(Debug)]
pub struct DynamockHandler {
    provider: Arc<DynamockProvider>,
}

impl DynamockHandler {
    /// Create a new handler wrapping a provider.
    #[must_use]
    pub fn new(provider: Arc<DynamockProvider>) -> Self {
        Self { provider }
    }
}

impl DynamoDBHandler for DynamockHandler {
    fn handle_operation(&self, op: DynamoDBOperation, body: Bytes) -> HandlerFuture {
        let provider = Arc::clone(&self.provider);
        Box::pin(async move { dispatch(provider.as_ref(), op, &body) })
    }
}

/// Dispatch an operation to the matching provider method.
fn dispatch(
    provider: &DynamockProvider,
    op: DynamoDBOperation,
    body: &[u8],
) -> Result<http::Response<DynamoDBResponseBody>, DynamoDBError> {
    let request_id = uuid::Uuid::new_v4().to_string();

    match op {
        DynamoDBOperation::CreateTable => {
            let input = deserialize(body)?;
            let output = provider.handle_create_table(input)?;
            serialize(&output, &request_id)
        }
        DynamoDBOperation::DeleteTable => {
            let input = deserialize(body)?;
            let output = provider.handle_delete_table(input)?;
            serialize(&output, &request_id)
        }
        DynamoDBOperation::DescribeTable => {
            let input = deserialize(body)?;
            let output = provider.handle_describe_table(input)?;
            serialize(&output, &request_id)
        }
        DynamoDBOperation::ListTables => {
            let input = deserialize(body)?;
            let output = provider.handle_list_tables(input)?;
            serialize(&output, &request_id)
        }
        DynamoDBOperation::UpdateTable => {
            let input = deserialize(body)?;
            let output = provider.handle_update_table(input)?;
            serialize(&output, &request_id)
        }
        DynamoDBOperation::PutItem => {
            let input = deserialize(body)?;
            let output = provider.handle_put_item(input)?;
            serialize(&output, &request_id)
        }
        DynamoDBOperation::GetItem => {
            let input = deserialize(body)?;
            let output = provider.handle_get_item(input)?;
            serialize(&output, &request_id)
        }
        DynamoDBOperation::UpdateItem => {
            let input = deserialize(body)?;
            let output = provider.handle_update_item(input)?;
            serialize(&output, &request_id)
        }
        DynamoDBOperation::DeleteItem => {
            let input = deserialize(body)?;
            let output = provider.handle_delete_item(input)?;
            serialize(&output, &request_id)
        }
        DynamoDBOperation::Query => {
            let input = deserialize(body)?;
            let output = provider.handle_query(input)?;
            serialize(&output, &request_id)
        }
    }
}

/// Deserialize a JSON request body. An empty body reads as `{}`.
fn deserialize<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, DynamoDBError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| {
        DynamoDBError::serialization_exception(format!("Failed to deserialize request body: {e}"))
    })
}

/// Serialize an output type into a JSON HTTP response.
fn serialize<T: serde::Serialize>(
    output: &T,
    request_id: &str,
) -> Result<http::Response<DynamoDBResponseBody>, DynamoDBError> {
    let json = serde_json::to_vec(output)
        .map_err(|e| DynamoDBError::internal_error(format!("Failed to serialize response: {e}")))?;
    Ok(json_response(json, request_id))
}
