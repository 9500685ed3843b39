//! `awsJson1_0` transport for dynamock.
//!
//! - **Router**: picks the operation out of the `X-Amz-Target` header
//! - **Handler trait**: boundary between HTTP and table logic
//! - **Service**: hyper `Service` for the protocol
//! - **Response helpers**: JSON success and error responses with CRC32
#![allow(missing_docs)]

pub mod body;
pub mod dispatch;
pub mod response;
pub mod router;
pub mod service;

pub use body::DynamoDBResponseBody;
pub use dispatch::{DynamoDBHandler, HandlerFuture};
pub use service::DynamoDBHttpService;
