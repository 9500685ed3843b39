//! DynamoDB model types for dynamock.
//!
//! Hand-written wire types for the 2012-08-10 JSON protocol: attribute
//! values, table metadata, the request and response shapes of every
//! supported operation, and the error envelope.
// "DynamoDB" appears in virtually every doc comment in this crate.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(missing_docs)]

pub mod attribute_value;
pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use attribute_value::AttributeValue;
pub use error::{DynamoDBError, DynamoDBErrorCode};
pub use operations::DynamoDBOperation;
