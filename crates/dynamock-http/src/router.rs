//! Operation routing.
//!
//! Every request is `POST /` with the operation named in `X-Amz-Target`:
//!
//! ```text
//! X-Amz-Target: DynamoDB_20120810.CreateTable
//! ```
//!
//! Only the text after the last `.` matters, so any service prefix is
//! accepted.

use dynamock_model::error::DynamoDBError;
use dynamock_model::operations::DynamoDBOperation;

/// Header carrying the operation name.
pub const TARGET_HEADER: &str = "x-amz-target";

/// Resolve the operation named by the `X-Amz-Target` header.
pub fn resolve_operation(headers: &http::HeaderMap) -> Result<DynamoDBOperation, DynamoDBError> {
    let target = headers
        .get(TARGET_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(DynamoDBError::missing_action)?;

    let operation_name = target.rsplit('.').next().unwrap_or(target);

    DynamoDBOperation::from_name(operation_name)
        .ok_or_else(|| DynamoDBError::unknown_operation(target))
}
