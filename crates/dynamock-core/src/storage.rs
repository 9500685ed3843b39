//! In-memory item store for a single table.
//!
//! Items are held in a hash map keyed by the text of their hash and range
//! key attributes. A separate vector records keys in first-insertion order;
//! queries walk that vector, so results come back in the order items were
//! first written, not in key order.
//!
//! # Layout
//!
//! ```text
//! HashMap<ItemKey, Item>   ItemKey = (hash text, range text)
//! Vec<ItemKey>             insertion order, each key at most once
//! ```
//!
//! The store itself is not synchronized; the owning table wraps it in a lock.

use std::collections::HashMap;

use tracing::debug;

use dynamock_model::AttributeValue;
use dynamock_model::types::{
    AttributeAction, AttributeDefinition, AttributeType, AttributeValueUpdate, Condition,
    ExpectedAttributeValue, ReturnValue,
};

use crate::condition::{key_matches, validate_key_condition};
use crate::error::TableError;
use crate::expectation::check_expectations;

/// A stored item: attribute name to value.
pub type Item = HashMap<String, AttributeValue>;

// ---------------------------------------------------------------------------
// Key types
// ---------------------------------------------------------------------------

/// A key attribute with its declared type.
#[derive(Debug, Clone)]
pub struct KeyAttribute {
    /// The attribute name.
    pub name: String,
    /// The declared scalar type (S, N or B).
    pub attr_type: AttributeType,
}

/// Parsed key schema: a hash key and an optional range key.
#[derive(Debug, Clone)]
pub struct KeySchema {
    /// Hash (partition) key.
    pub hash_key: KeyAttribute,
    /// Optional range (sort) key.
    pub range_key: Option<KeyAttribute>,
}

impl KeySchema {
    /// Whether `name` is one of the key attributes.
    #[must_use]
    pub fn is_key_attribute(&self, name: &str) -> bool {
        self.hash_key.name == name || self.range_key.as_ref().is_some_and(|r| r.name == name)
    }

    /// Resolve the storage key of an item or a request key.
    ///
    /// A key attribute of the wrong kind counts as missing.
    pub fn item_key(&self, attrs: &Item) -> Result<ItemKey, TableError> {
        let hash = key_text(attrs, &self.hash_key).ok_or_else(|| TableError::MissingHashKey {
            attr: self.hash_key.name.clone(),
        })?;
        let range = match &self.range_key {
            Some(rk) => key_text(attrs, rk)
                .ok_or_else(|| TableError::MissingRangeKey {
                    attr: rk.name.clone(),
                })?
                .to_owned(),
            None => String::new(),
        };
        Ok(ItemKey {
            hash: hash.to_owned(),
            range,
        })
    }

    /// Copy the key attributes out of a full item.
    #[must_use]
    pub fn key_attributes(&self, item: &Item) -> Item {
        std::iter::once(&self.hash_key)
            .chain(self.range_key.iter())
            .filter_map(|k| item.get(&k.name).map(|v| (k.name.clone(), v.clone())))
            .collect()
    }
}

fn key_text<'a>(attrs: &'a Item, key: &KeyAttribute) -> Option<&'a str> {
    attrs
        .get(&key.name)
        .filter(|v| v.attribute_type() == key.attr_type)
        .map(|v| v.value(&key.attr_type))
}

/// Storage key: the text of the hash key and of the range key (empty when
/// the table has none).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    /// Hash key text.
    pub hash: String,
    /// Range key text.
    pub range: String,
}

/// A page of query results.
#[derive(Debug, Default)]
pub struct QueryPage {
    /// Matching items in insertion order.
    pub items: Vec<Item>,
    /// Key attributes of the last returned item when `limit` cut the
    /// result short.
    pub last_evaluated_key: Option<Item>,
}

// ---------------------------------------------------------------------------
// ItemStore
// ---------------------------------------------------------------------------

/// Item storage for one table.
#[derive(Debug)]
pub struct ItemStore {
    key_schema: KeySchema,
    /// Declared attribute types, used to read expectation values.
    declared: HashMap<String, AttributeType>,
    items: HashMap<ItemKey, Item>,
    insert_order: Vec<ItemKey>,
    total_size: u64,
}

impl ItemStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(key_schema: KeySchema, definitions: &[AttributeDefinition]) -> Self {
        Self {
            key_schema,
            declared: definitions
                .iter()
                .map(|d| (d.attribute_name.clone(), d.attribute_type.clone()))
                .collect(),
            items: HashMap::new(),
            insert_order: Vec::new(),
            total_size: 0,
        }
    }

    /// The key schema this store was built with.
    #[must_use]
    pub fn key_schema(&self) -> &KeySchema {
        &self.key_schema
    }

    /// Number of stored items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Approximate size of all items in bytes.
    #[must_use]
    pub fn total_size_bytes(&self) -> u64 {
        self.total_size
    }

    /// Keys in first-insertion order.
    #[must_use]
    pub fn insertion_order(&self) -> &[ItemKey] {
        &self.insert_order
    }

    /// Insert or replace an item. Returns the replaced item, if any.
    ///
    /// Expectations are checked against the stored item before anything
    /// changes; a replace keeps the key's original insertion position.
    pub fn put_item(
        &mut self,
        item: Item,
        expected: &HashMap<String, ExpectedAttributeValue>,
    ) -> Result<Option<Item>, TableError> {
        let key = self.key_schema.item_key(&item)?;
        check_expectations(self.items.get(&key), expected, &self.declared)?;

        let new_size = calculate_item_size(&item);
        let old = self.items.insert(key.clone(), item);
        self.total_size += new_size;
        if let Some(old) = &old {
            let old_size = calculate_item_size(old);
            self.total_size -= old_size;
            debug!(hash = %key.hash, range = %key.range, old_size, new_size, "replaced item");
        } else {
            debug!(hash = %key.hash, range = %key.range, new_size, "inserted item");
            self.insert_order.push(key);
        }
        Ok(old)
    }

    /// Look up an item by its key attributes.
    pub fn get_item(&self, key: &Item) -> Result<&Item, TableError> {
        let key = self.key_schema.item_key(key)?;
        self.items.get(&key).ok_or(TableError::ItemNotFound)
    }

    /// Apply per-attribute update actions to an existing item.
    ///
    /// All actions run against a copy that replaces the stored item only
    /// when every action succeeded. Returns `(old, new)`.
    pub fn update_item(
        &mut self,
        key: &Item,
        updates: &HashMap<String, AttributeValueUpdate>,
        expected: &HashMap<String, ExpectedAttributeValue>,
    ) -> Result<(Item, Item), TableError> {
        let key = self.key_schema.item_key(key)?;
        let current = self.items.get(&key).ok_or(TableError::ItemNotFound)?;
        check_expectations(Some(current), expected, &self.declared)?;

        let mut staged = current.clone();
        for (name, update) in updates {
            if self.key_schema.is_key_attribute(name) {
                return Err(TableError::KeyAttributeUpdate { attr: name.clone() });
            }
            apply_update(&mut staged, name, update)?;
        }

        let new_size = calculate_item_size(&staged);
        let old = std::mem::replace(
            self.items.get_mut(&key).ok_or(TableError::ItemNotFound)?,
            staged.clone(),
        );
        self.total_size = self.total_size + new_size - calculate_item_size(&old);
        debug!(hash = %key.hash, range = %key.range, actions = updates.len(), "updated item");
        Ok((old, staged))
    }

    /// Remove an item and its insertion-order entry. Returns the removed item.
    pub fn delete_item(
        &mut self,
        key: &Item,
        expected: &HashMap<String, ExpectedAttributeValue>,
    ) -> Result<Item, TableError> {
        let key = self.key_schema.item_key(key)?;
        let current = self.items.get(&key).ok_or(TableError::ItemNotFound)?;
        check_expectations(Some(current), expected, &self.declared)?;

        let removed = self.items.remove(&key).ok_or(TableError::ItemNotFound)?;
        self.insert_order.retain(|k| k != &key);
        self.total_size -= calculate_item_size(&removed);
        debug!(hash = %key.hash, range = %key.range, "deleted item");
        Ok(removed)
    }

    /// Run a key-condition query.
    ///
    /// Conditions must name the hash key and may name the range key. Results
    /// follow insertion order, resume strictly after `exclusive_start_key`
    /// when one is given, and stop after `limit` items.
    pub fn query(
        &self,
        conditions: &HashMap<String, Condition>,
        exclusive_start_key: &Item,
        limit: Option<usize>,
    ) -> Result<QueryPage, TableError> {
        let (hash_cond, range_cond) = self.split_conditions(conditions)?;
        let hash_ty = &self.key_schema.hash_key.attr_type;
        let range_ty = self.key_schema.range_key.as_ref().map(|r| &r.attr_type);

        let matching = self.insert_order.iter().filter(|k| {
            key_matches(&k.hash, hash_cond, hash_ty)
                && match (range_cond, range_ty) {
                    (Some(cond), Some(ty)) => key_matches(&k.range, cond, ty),
                    _ => true,
                }
        });

        let mut survivors: Vec<&ItemKey> = if exclusive_start_key.is_empty() {
            matching.collect()
        } else {
            let start = self.key_schema.item_key(exclusive_start_key)?;
            matching.skip_while(|k| **k != start).skip(1).collect()
        };

        let mut last_evaluated_key = None;
        if let Some(limit) = limit {
            if survivors.len() > limit {
                survivors.truncate(limit);
                last_evaluated_key = survivors
                    .last()
                    .and_then(|k| self.items.get(*k))
                    .map(|item| self.key_schema.key_attributes(item));
            }
        }

        let items = survivors
            .into_iter()
            .filter_map(|k| self.items.get(k).cloned())
            .collect();
        Ok(QueryPage {
            items,
            last_evaluated_key,
        })
    }

    fn split_conditions<'a>(
        &self,
        conditions: &'a HashMap<String, Condition>,
    ) -> Result<(&'a Condition, Option<&'a Condition>), TableError> {
        let mut hash_cond = None;
        let mut range_cond = None;
        for (name, cond) in conditions {
            if *name == self.key_schema.hash_key.name {
                hash_cond = Some(cond);
            } else if self
                .key_schema
                .range_key
                .as_ref()
                .is_some_and(|r| r.name == *name)
            {
                range_cond = Some(cond);
            } else {
                return Err(TableError::invalid_query(format!(
                    "{name} is not a key attribute"
                )));
            }
            validate_key_condition(name, cond)?;
        }
        let hash_cond = hash_cond.ok_or_else(|| {
            TableError::invalid_query(format!(
                "no condition on hash key {}",
                self.key_schema.hash_key.name
            ))
        })?;
        Ok((hash_cond, range_cond))
    }
}

// ---------------------------------------------------------------------------
// Update actions
// ---------------------------------------------------------------------------

fn apply_update(
    item: &mut Item,
    name: &str,
    update: &AttributeValueUpdate,
) -> Result<(), TableError> {
    match update.action.clone().unwrap_or_default() {
        AttributeAction::Put => {
            let value = update
                .value
                .clone()
                .ok_or_else(|| TableError::MissingUpdateValue {
                    attr: name.to_owned(),
                })?;
            item.insert(name.to_owned(), value);
        }
        AttributeAction::Delete => {
            item.remove(name);
        }
        AttributeAction::Add => {
            let invalid = || TableError::InvalidAddOperand {
                attr: name.to_owned(),
            };
            let operand = update
                .value
                .as_ref()
                .and_then(AttributeValue::as_n)
                .ok_or_else(invalid)?;
            let operand_value = parse_number(operand).ok_or_else(invalid)?;
            let sum = match item.get(name) {
                None => operand.to_owned(),
                Some(AttributeValue::N(current)) => {
                    let current = parse_number(current).ok_or_else(invalid)?;
                    let total = current + operand_value;
                    if !total.is_finite() {
                        return Err(invalid());
                    }
                    format_number(total)
                }
                Some(_) => return Err(invalid()),
            };
            item.insert(name.to_owned(), AttributeValue::N(sum));
        }
    }
    Ok(())
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a number, preferring integer representation when the value is integral.
// Truncation only happens once the value is known integral and within i64 range.
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
fn format_number(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

// ---------------------------------------------------------------------------
// Return values
// ---------------------------------------------------------------------------

/// Pick the attributes a write returns for `return_values`.
///
/// `*_OLD` reads from `old`, `*_NEW` from `new`. The `UPDATED_*` forms keep
/// only the attributes named in `touched` that are present in the source.
#[must_use]
pub fn select_return_values<'a>(
    return_values: &ReturnValue,
    old: Option<&Item>,
    new: Option<&Item>,
    touched: impl IntoIterator<Item = &'a String>,
) -> Item {
    let source = if return_values.wants_old() {
        old
    } else if return_values.wants_new() {
        new
    } else {
        None
    };
    let Some(source) = source else {
        return Item::new();
    };
    if return_values.is_updated_only() {
        touched
            .into_iter()
            .filter_map(|name| source.get(name).map(|v| (name.clone(), v.clone())))
            .collect()
    } else {
        source.clone()
    }
}

/// Keep only the named attributes of an item. An empty list keeps all.
#[must_use]
pub fn project(item: &Item, attributes_to_get: &[String]) -> Item {
    if attributes_to_get.is_empty() {
        return item.clone();
    }
    attributes_to_get
        .iter()
        .filter_map(|name| item.get(name).map(|v| (name.clone(), v.clone())))
        .collect()
}

// ---------------------------------------------------------------------------
// Item size calculation
// ---------------------------------------------------------------------------

/// Approximate item size: each attribute contributes its name length plus
/// the length of its value text.
#[must_use]
pub fn calculate_item_size(item: &Item) -> u64 {
    item.iter()
        .map(|(name, value)| (name.len() + value.size()) as u64)
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
