//! Key-condition matching for `Query`.
//!
//! Conditions compare the text form of a key attribute against the operand
//! texts under the key's declared type. Comparison is lexicographic for every
//! type, so `"10" < "9"` holds for number keys too.

use dynamock_model::AttributeValue;
use dynamock_model::types::{AttributeType, ComparisonOperator, Condition};

use crate::error::TableError;

/// Check that `cond` uses a key operator with the right number of operands.
pub fn validate_key_condition(attr: &str, cond: &Condition) -> Result<(), TableError> {
    let n = cond.attribute_value_list.len();
    let arity_ok = match cond.comparison_operator {
        ComparisonOperator::Eq
        | ComparisonOperator::Ne
        | ComparisonOperator::Le
        | ComparisonOperator::Lt
        | ComparisonOperator::Ge
        | ComparisonOperator::Gt
        | ComparisonOperator::BeginsWith => n == 1,
        ComparisonOperator::Between => n == 2,
        ComparisonOperator::In => n >= 1,
        ComparisonOperator::Null
        | ComparisonOperator::NotNull
        | ComparisonOperator::Contains
        | ComparisonOperator::NotContains => {
            return Err(TableError::invalid_query(format!(
                "operator {} is not supported on key attribute {attr}",
                cond.comparison_operator
            )));
        }
    };
    if arity_ok {
        Ok(())
    } else {
        Err(TableError::invalid_query(format!(
            "operator {} on {attr} got {n} operand(s)",
            cond.comparison_operator
        )))
    }
}

/// Test a key's text against a validated condition.
///
/// Operands are read under `ty`, so an operand of another kind reads as the
/// empty string.
#[must_use]
pub fn key_matches(key: &str, cond: &Condition, ty: &AttributeType) -> bool {
    let operand = |i: usize| {
        cond.attribute_value_list
            .get(i)
            .map_or("", |v: &AttributeValue| v.value(ty))
    };
    match cond.comparison_operator {
        ComparisonOperator::Eq => key == operand(0),
        ComparisonOperator::Ne => key != operand(0),
        ComparisonOperator::Le => key <= operand(0),
        ComparisonOperator::Lt => key < operand(0),
        ComparisonOperator::Ge => key >= operand(0),
        ComparisonOperator::Gt => key > operand(0),
        ComparisonOperator::BeginsWith => key.starts_with(operand(0)),
        ComparisonOperator::Between => operand(0) <= key && key <= operand(1),
        ComparisonOperator::In => cond
            .attribute_value_list
            .iter()
            .any(|v| v.value(ty) == key),
        ComparisonOperator::Null
        | ComparisonOperator::NotNull
        | ComparisonOperator::Contains
        | ComparisonOperator::NotContains => false,
    }
}
