//! Hyper `Service` speaking the `awsJson1_0` protocol.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;

use dynamock_model::error::DynamoDBError;

use crate::body::DynamoDBResponseBody;
use crate::dispatch::{DynamoDBHandler, dispatch_operation};
use crate::response::error_to_response;
use crate::router::resolve_operation;

/// Value of the `server` response header.
const SERVER_NAME: &str = "dynamock";

/// Routes requests to a [`DynamoDBHandler`] and renders its errors.
#[derive(Debug)]
pub struct DynamoDBHttpService<H: DynamoDBHandler> {
    handler: Arc<H>,
}

impl<H: DynamoDBHandler> DynamoDBHttpService<H> {
    /// Create a service around a shared handler.
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }
}

impl<H: DynamoDBHandler> Clone for DynamoDBHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<H: DynamoDBHandler> hyper::service::Service<http::Request<Incoming>>
    for DynamoDBHttpService<H>
{
    type Response = http::Response<DynamoDBResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let request_id = uuid::Uuid::new_v4().to_string();

        Box::pin(async move {
            let (parts, incoming) = req.into_parts();
            let response = match collect_body(incoming).await {
                Ok(body) => process_request(&parts, body, handler.as_ref(), &request_id).await,
                Err(err) => error_to_response(&err, &request_id),
            };
            Ok(add_common_headers(response, &request_id))
        })
    }
}

/// Run one request through method check, routing and dispatch.
///
/// Independent of hyper's `Incoming` so it can be driven with plain bytes.
pub async fn process_request<H: DynamoDBHandler>(
    parts: &http::request::Parts,
    body: Bytes,
    handler: &H,
    request_id: &str,
) -> http::Response<DynamoDBResponseBody> {
    if parts.method != http::Method::POST {
        let err = DynamoDBError::validation(format!(
            "Only POST is supported, got {}",
            parts.method,
        ));
        return error_to_response(&err, request_id);
    }

    let op = match resolve_operation(&parts.headers) {
        Ok(op) => op,
        Err(err) => return error_to_response(&err, request_id),
    };

    match dispatch_operation(handler, op, body).await {
        Ok(response) => response,
        Err(err) => error_to_response(&err, request_id),
    }
}

async fn collect_body(incoming: Incoming) -> Result<Bytes, DynamoDBError> {
    incoming
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| DynamoDBError::internal_error(format!("Failed to read request body: {e}")))
}

fn add_common_headers(
    mut response: http::Response<DynamoDBResponseBody>,
    request_id: &str,
) -> http::Response<DynamoDBResponseBody> {
    let headers = response.headers_mut();
    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry("x-amzn-requestid").or_insert(hv);
    }
    headers.insert("server", http::HeaderValue::from_static(SERVER_NAME));
    headers.insert(
        "access-control-allow-origin",
        http::HeaderValue::from_static("*"),
    );
    response
}
