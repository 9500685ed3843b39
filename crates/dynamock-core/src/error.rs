//! Core error type for table operations.

use thiserror::Error;

use dynamock_model::error::{DynamoDBError, DynamoDBErrorCode};

/// Errors raised by the item store, the expectation evaluator, the query
/// engine and the table registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// The item or key does not carry the table's hash-key attribute.
    #[error("One or more parameter values were invalid: Missing the key {attr} in the item")]
    MissingHashKey {
        /// The hash-key attribute name.
        attr: String,
    },
    /// The key does not carry the table's range-key attribute.
    #[error("One or more parameter values were invalid: Missing the key {attr} in the item")]
    MissingRangeKey {
        /// The range-key attribute name.
        attr: String,
    },
    /// No item is stored under the requested key.
    #[error("Requested resource not found: Item not found")]
    ItemNotFound,
    /// No table is registered under the requested name.
    #[error("Requested resource not found: Table: {name} not found")]
    TableNotFound {
        /// The table name.
        name: String,
    },
    /// A table with this name already exists.
    #[error("Table already exists: {name}")]
    TableInUse {
        /// The table name.
        name: String,
    },
    /// An `Expected` clause did not hold against the stored item.
    #[error("The conditional request failed")]
    ConditionalCheckFailed,
    /// An `ADD` action was given an operand without numeric text, or the
    /// stored value it targets is not a number.
    #[error("An operand in the update expression has an incorrect data type: ADD on {attr}")]
    InvalidAddOperand {
        /// The attribute being added to.
        attr: String,
    },
    /// A `PUT` action carried no value.
    #[error("One or more parameter values were invalid: PUT action for {attr} has no value")]
    MissingUpdateValue {
        /// The attribute being updated.
        attr: String,
    },
    /// An update targeted a key attribute.
    #[error(
        "One or more parameter values were invalid: Cannot update attribute {attr}. \
         This attribute is part of the key"
    )]
    KeyAttributeUpdate {
        /// The key attribute name.
        attr: String,
    },
    /// The key conditions of a query are not usable.
    #[error("Query condition missed key schema element: {reason}")]
    InvalidQueryCondition {
        /// What was wrong with the conditions.
        reason: String,
    },
}

impl TableError {
    /// Shorthand for [`TableError::InvalidQueryCondition`].
    #[must_use]
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQueryCondition {
            reason: reason.into(),
        }
    }

    /// The wire error code this failure maps to.
    #[must_use]
    pub fn code(&self) -> DynamoDBErrorCode {
        match self {
            Self::ItemNotFound | Self::TableNotFound { .. } => {
                DynamoDBErrorCode::ResourceNotFoundException
            }
            Self::TableInUse { .. } => DynamoDBErrorCode::ResourceInUseException,
            Self::ConditionalCheckFailed => DynamoDBErrorCode::ConditionalCheckFailedException,
            Self::MissingHashKey { .. }
            | Self::MissingRangeKey { .. }
            | Self::InvalidAddOperand { .. }
            | Self::MissingUpdateValue { .. }
            | Self::KeyAttributeUpdate { .. }
            | Self::InvalidQueryCondition { .. } => DynamoDBErrorCode::ValidationException,
        }
    }
}

impl From<TableError> for DynamoDBError {
    fn from(e: TableError) -> Self {
        DynamoDBError::with_message(e.code(), e.to_string())
    }
}
