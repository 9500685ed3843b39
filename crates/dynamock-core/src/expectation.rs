//! Evaluation of legacy `Expected` preconditions.
//!
//! Each entry names an attribute and states whether it must exist and,
//! optionally, which value it must hold. Entries are checked against the
//! item as stored before the write; the first mismatch fails the whole
//! request with [`TableError::ConditionalCheckFailed`].

use std::collections::HashMap;

use dynamock_model::AttributeValue;
use dynamock_model::types::{AttributeType, ExpectedAttributeValue};

use crate::error::TableError;

/// Check every expectation against `stored` (`None` when no item exists).
///
/// `declared` maps attribute names to the types given in the table's
/// attribute definitions. Attributes without a declaration are compared
/// under the type tag of the expected value.
pub fn check_expectations(
    stored: Option<&HashMap<String, AttributeValue>>,
    expected: &HashMap<String, ExpectedAttributeValue>,
    declared: &HashMap<String, AttributeType>,
) -> Result<(), TableError> {
    for (name, exp) in expected {
        let current = stored.and_then(|item| item.get(name));
        if !expectation_holds(current, exp, declared.get(name)) {
            tracing::debug!(attribute = %name, "expectation not met");
            return Err(TableError::ConditionalCheckFailed);
        }
    }
    Ok(())
}

fn expectation_holds(
    current: Option<&AttributeValue>,
    exp: &ExpectedAttributeValue,
    declared: Option<&AttributeType>,
) -> bool {
    match (current, exp.must_exist()) {
        (None, false) => true,
        (None, true) | (Some(_), false) => false,
        (Some(value), true) => exp.value.as_ref().is_none_or(|want| {
            let ty = declared.cloned().unwrap_or_else(|| want.attribute_type());
            value.equals_as(&ty, want)
        }),
    }
}
