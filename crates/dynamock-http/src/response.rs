//! JSON response construction and error rendering.

use dynamock_model::error::DynamoDBError;

use crate::body::DynamoDBResponseBody;

/// Content type of every response.
pub const CONTENT_TYPE: &str = "application/x-amz-json-1.0";

/// Render an error as the `awsJson1_0` error document:
///
/// ```json
/// {
///   "__type": "com.amazonaws.dynamodb.v20120810#ResourceNotFoundException",
///   "Message": "Requested resource not found"
/// }
/// ```
#[must_use]
pub fn error_to_json(error: &DynamoDBError) -> Vec<u8> {
    let doc = serde_json::json!({
        "__type": error.error_type(),
        "Message": error.message,
    });
    // A `Value` built from strings always serializes.
    serde_json::to_vec(&doc).unwrap_or_default()
}

/// Build the HTTP response for an error.
#[must_use]
pub fn error_to_response(
    error: &DynamoDBError,
    request_id: &str,
) -> http::Response<DynamoDBResponseBody> {
    tracing::debug!(code = %error.code, message = %error.message, "request failed");
    build_response(error.status_code, error_to_json(error), request_id)
}

/// Build a `200 OK` response around serialized JSON.
#[must_use]
pub fn json_response(json: Vec<u8>, request_id: &str) -> http::Response<DynamoDBResponseBody> {
    build_response(http::StatusCode::OK, json, request_id)
}

/// Attach the content type, request id and `x-amz-crc32` checksum of the
/// payload.
fn build_response(
    status: http::StatusCode,
    json: Vec<u8>,
    request_id: &str,
) -> http::Response<DynamoDBResponseBody> {
    let crc = crc32fast::hash(&json);
    let mut response = http::Response::new(DynamoDBResponseBody::from_json(json));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static(CONTENT_TYPE),
    );
    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.insert("x-amzn-requestid", hv);
    }
    headers.insert("x-amz-crc32", http::HeaderValue::from(crc));
    response
}
