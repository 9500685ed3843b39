//! Provider implementing the emulated DynamoDB operations.
//!
//! Each `handle_*` method validates its input, resolves the table through the
//! registry, runs the operation under that table's lock, and assembles the
//! output struct. Core failures surface as [`crate::error::TableError`] and
//! convert into [`DynamoDBError`] on the way out.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use dynamock_model::error::DynamoDBError;
use dynamock_model::input::{
    CreateTableInput, DeleteItemInput, DeleteTableInput, DescribeTableInput, GetItemInput,
    ListTablesInput, PutItemInput, QueryInput, UpdateItemInput, UpdateTableInput,
};
use dynamock_model::output::{
    CreateTableOutput, DeleteItemOutput, DeleteTableOutput, DescribeTableOutput, GetItemOutput,
    ListTablesOutput, PutItemOutput, QueryOutput, UpdateItemOutput, UpdateTableOutput,
};
use dynamock_model::types::{
    AttributeDefinition, AttributeType, ConsumedCapacity, KeySchemaElement, KeyType,
    LocalSecondaryIndex, ProvisionedThroughput, ReturnConsumedCapacity, Select,
};

use crate::config::DynamockConfig;
use crate::state::{Table, TableRegistry, TableSpec};
use crate::storage::{KeyAttribute, KeySchema, project, select_return_values};

/// Capacity units reported per request when consumed capacity is asked for.
const CAPACITY_UNITS_PER_REQUEST: f64 = 1.0;

/// Largest page `ListTables` returns.
const MAX_LIST_TABLES_LIMIT: i32 = 100;

/// Hash key given to tables created from configuration.
const SEED_HASH_KEY: &str = "id";

/// Main provider owning the table registry.
#[derive(Debug)]
pub struct DynamockProvider {
    /// All tables.
    pub registry: Arc<TableRegistry>,
    /// Configuration.
    pub config: Arc<DynamockConfig>,
}

impl DynamockProvider {
    /// Create a provider with an empty registry.
    #[must_use]
    pub fn new(config: DynamockConfig) -> Self {
        Self {
            registry: Arc::new(TableRegistry::new()),
            config: Arc::new(config),
        }
    }

    /// Reset all state (for testing).
    pub fn reset(&self) {
        self.registry.reset();
    }

    /// Create the configured seed tables that do not exist yet. Returns the
    /// names that were created.
    pub fn seed_tables(&self) -> Result<Vec<String>, DynamoDBError> {
        let mut created = Vec::new();
        for name in &self.config.seed_tables {
            if self.registry.get_table(name).is_some() {
                continue;
            }
            self.handle_create_table(seed_table_input(name))?;
            created.push(name.clone());
        }
        Ok(created)
    }

    fn table_arn(&self, name: &str) -> String {
        format!(
            "arn:aws:dynamodb:{}:000000000000:table/{name}",
            self.config.default_region,
        )
    }
}

fn seed_table_input(name: &str) -> CreateTableInput {
    CreateTableInput {
        table_name: name.to_owned(),
        key_schema: vec![KeySchemaElement {
            attribute_name: SEED_HASH_KEY.to_owned(),
            key_type: KeyType::Hash,
        }],
        attribute_definitions: vec![AttributeDefinition {
            attribute_name: SEED_HASH_KEY.to_owned(),
            attribute_type: AttributeType::S,
        }],
        provisioned_throughput: Some(ProvisionedThroughput {
            read_capacity_units: 5,
            write_capacity_units: 5,
        }),
        local_secondary_indexes: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Table management
// ---------------------------------------------------------------------------

impl DynamockProvider {
    /// Handle `CreateTable`.
    pub fn handle_create_table(
        &self,
        input: CreateTableInput,
    ) -> Result<CreateTableOutput, DynamoDBError> {
        validate_table_name(&input.table_name)?;
        validate_attribute_definitions(&input.attribute_definitions)?;
        validate_key_schema_structure(&input.key_schema)?;
        let key_schema = parse_key_schema(&input.key_schema, &input.attribute_definitions)?;

        let throughput = input.provisioned_throughput.ok_or_else(|| {
            DynamoDBError::validation("No provisioned throughput specified for the table")
        })?;
        validate_throughput(&throughput)?;

        validate_local_secondary_indexes(
            &input.local_secondary_indexes,
            &key_schema,
            &input.attribute_definitions,
        )?;

        let spec = TableSpec {
            arn: self.table_arn(&input.table_name),
            name: input.table_name,
            key_schema_elements: input.key_schema,
            key_schema,
            attribute_definitions: input.attribute_definitions,
            provisioned_throughput: throughput,
            local_secondary_indexes: input.local_secondary_indexes,
        };

        let table = self
            .registry
            .create_table(Table::new(spec, chrono::Utc::now()))?;
        info!(table = %table.name, "created table");
        Ok(CreateTableOutput {
            table_description: Some(table.to_description()),
        })
    }

    /// Handle `DeleteTable`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_delete_table(
        &self,
        input: DeleteTableInput,
    ) -> Result<DeleteTableOutput, DynamoDBError> {
        let table = self.registry.delete_table(&input.table_name)?;
        info!(table = %table.name, "deleted table");
        Ok(DeleteTableOutput {
            table_description: Some(table.to_delete_description()),
        })
    }

    /// Handle `DescribeTable`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_describe_table(
        &self,
        input: DescribeTableInput,
    ) -> Result<DescribeTableOutput, DynamoDBError> {
        let table = self.registry.require_table(&input.table_name)?;
        Ok(DescribeTableOutput {
            table: Some(table.to_description()),
        })
    }

    /// Handle `ListTables`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_list_tables(
        &self,
        input: ListTablesInput,
    ) -> Result<ListTablesOutput, DynamoDBError> {
        // Validate limit: must be 1-100 if specified.
        if let Some(limit) = input.limit {
            if !(1..=MAX_LIST_TABLES_LIMIT).contains(&limit) {
                return Err(DynamoDBError::validation(format!(
                    "1 validation error detected: Value '{limit}' at 'limit' failed to satisfy \
                     constraint: Member must have value between 1 and {MAX_LIST_TABLES_LIMIT}"
                )));
            }
        }
        let limit = usize::try_from(input.limit.unwrap_or(MAX_LIST_TABLES_LIMIT)).unwrap_or(100);

        let (table_names, last) = self
            .registry
            .list_tables(input.exclusive_start_table_name.as_deref(), limit);
        Ok(ListTablesOutput {
            table_names,
            last_evaluated_table_name: last,
        })
    }

    /// Handle `UpdateTable`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_update_table(
        &self,
        input: UpdateTableInput,
    ) -> Result<UpdateTableOutput, DynamoDBError> {
        validate_throughput(&input.provisioned_throughput)?;
        let table = self.registry.require_table(&input.table_name)?;

        let description = table.write(|data| {
            let decreased = data
                .throughput
                .update(&input.provisioned_throughput, chrono::Utc::now());
            info!(
                table = %table.name,
                read = input.provisioned_throughput.read_capacity_units,
                write = input.provisioned_throughput.write_capacity_units,
                decreased,
                decreases_today = data.throughput.decreases_today(),
                "updated provisioned throughput"
            );
            table.describe(data, table.status.clone())
        });
        Ok(UpdateTableOutput {
            table_description: Some(description),
        })
    }
}

// ---------------------------------------------------------------------------
// Item CRUD
// ---------------------------------------------------------------------------

impl DynamockProvider {
    /// Handle `PutItem`.
    pub fn handle_put_item(&self, input: PutItemInput) -> Result<PutItemOutput, DynamoDBError> {
        let table = self.registry.require_table(&input.table_name)?;
        let return_values = input.return_values.unwrap_or_default();
        let touched: Vec<String> = input.item.keys().cloned().collect();
        let new_item = return_values.wants_new().then(|| input.item.clone());

        let old = table.write(|data| data.store.put_item(input.item, &input.expected))?;

        Ok(PutItemOutput {
            attributes: select_return_values(
                &return_values,
                old.as_ref(),
                new_item.as_ref(),
                &touched,
            ),
            consumed_capacity: consumed_capacity(
                &table.name,
                input.return_consumed_capacity.as_ref(),
            ),
        })
    }

    /// Handle `GetItem`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_get_item(&self, input: GetItemInput) -> Result<GetItemOutput, DynamoDBError> {
        let table = self.registry.require_table(&input.table_name)?;
        let item = table.read(|data| {
            data.store
                .get_item(&input.key)
                .map(|item| project(item, &input.attributes_to_get))
        })?;
        Ok(GetItemOutput {
            item: Some(item),
            consumed_capacity: consumed_capacity(
                &table.name,
                input.return_consumed_capacity.as_ref(),
            ),
        })
    }

    /// Handle `UpdateItem`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_update_item(
        &self,
        input: UpdateItemInput,
    ) -> Result<UpdateItemOutput, DynamoDBError> {
        let table = self.registry.require_table(&input.table_name)?;
        let (old, new) = table.write(|data| {
            data.store
                .update_item(&input.key, &input.attribute_updates, &input.expected)
        })?;

        Ok(UpdateItemOutput {
            attributes: select_return_values(
                &input.return_values.unwrap_or_default(),
                Some(&old),
                Some(&new),
                input.attribute_updates.keys(),
            ),
            consumed_capacity: consumed_capacity(
                &table.name,
                input.return_consumed_capacity.as_ref(),
            ),
        })
    }

    /// Handle `DeleteItem`.
    ///
    /// The removed item is returned as `Attributes` whatever `ReturnValues`
    /// says.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_delete_item(
        &self,
        input: DeleteItemInput,
    ) -> Result<DeleteItemOutput, DynamoDBError> {
        let table = self.registry.require_table(&input.table_name)?;
        let removed = table.write(|data| data.store.delete_item(&input.key, &input.expected))?;
        Ok(DeleteItemOutput {
            attributes: removed,
            consumed_capacity: consumed_capacity(
                &table.name,
                input.return_consumed_capacity.as_ref(),
            ),
        })
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

impl DynamockProvider {
    /// Handle `Query`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn handle_query(&self, input: QueryInput) -> Result<QueryOutput, DynamoDBError> {
        let table = self.registry.require_table(&input.table_name)?;

        let limit = match input.limit {
            Some(l) if l < 1 => {
                return Err(DynamoDBError::validation(format!(
                    "1 validation error detected: Value '{l}' at 'limit' failed to satisfy \
                     constraint: Member must have value greater than or equal to 1"
                )));
            }
            Some(l) => Some(usize::try_from(l).unwrap_or(usize::MAX)),
            None => None,
        };
        let count_only = matches!(input.select, Some(Select::Count));
        if count_only && !input.attributes_to_get.is_empty() {
            return Err(DynamoDBError::validation(
                "Cannot specify the AttributesToGet when choosing to get only the Count",
            ));
        }

        let page = table.read(|data| {
            data.store
                .query(&input.key_conditions, &input.exclusive_start_key, limit)
        })?;

        let count = i32::try_from(page.items.len()).unwrap_or(i32::MAX);
        let items = if count_only {
            Vec::new()
        } else {
            page.items
                .iter()
                .map(|item| project(item, &input.attributes_to_get))
                .collect()
        };

        Ok(QueryOutput {
            items,
            count,
            last_evaluated_key: page.last_evaluated_key.unwrap_or_default(),
            consumed_capacity: consumed_capacity(
                &table.name,
                input.return_consumed_capacity.as_ref(),
            ),
        })
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn consumed_capacity(
    table_name: &str,
    requested: Option<&ReturnConsumedCapacity>,
) -> Option<ConsumedCapacity> {
    requested
        .filter(|r| r.should_report())
        .map(|_| ConsumedCapacity {
            table_name: Some(table_name.to_owned()),
            capacity_units: Some(CAPACITY_UNITS_PER_REQUEST),
        })
}

/// Validate a table name against DynamoDB rules: 3-255 characters, `[a-zA-Z0-9._-]+`.
fn validate_table_name(name: &str) -> Result<(), DynamoDBError> {
    if name.len() < 3 || name.len() > 255 {
        return Err(DynamoDBError::validation(format!(
            "TableName must be at least 3 characters long and at most 255 characters long, \
             but was {} characters",
            name.len()
        )));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-')
    {
        return Err(DynamoDBError::validation(format!(
            "1 validation error detected: Value '{name}' at 'tableName' failed to satisfy \
             constraint: Member must satisfy regular expression pattern: [a-zA-Z0-9_.-]+"
        )));
    }
    Ok(())
}

fn validate_throughput(pt: &ProvisionedThroughput) -> Result<(), DynamoDBError> {
    if pt.read_capacity_units < 1 || pt.write_capacity_units < 1 {
        return Err(DynamoDBError::validation(format!(
            "One or more parameter values were invalid: ReadCapacityUnits and \
             WriteCapacityUnits must both be at least 1, got {}/{}",
            pt.read_capacity_units, pt.write_capacity_units
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CreateTable validation helpers
// ---------------------------------------------------------------------------

/// Validate `KeySchema` structure: exactly 1 HASH, at most 1 RANGE, max 2 elements.
fn validate_key_schema_structure(elements: &[KeySchemaElement]) -> Result<(), DynamoDBError> {
    let hash_count = elements
        .iter()
        .filter(|e| e.key_type == KeyType::Hash)
        .count();

    if hash_count != 1 {
        return Err(DynamoDBError::validation(
            "Invalid KeySchema: Some index key schema element is not valid",
        ));
    }
    if elements.len() > 2 {
        return Err(DynamoDBError::validation(
            "Too many KeySchema elements; expected at most 2",
        ));
    }
    Ok(())
}

/// Validate `AttributeDefinitions`: no duplicates, only known types.
fn validate_attribute_definitions(
    definitions: &[AttributeDefinition],
) -> Result<(), DynamoDBError> {
    let mut seen = HashSet::new();
    for def in definitions {
        if !seen.insert(&def.attribute_name) {
            return Err(DynamoDBError::validation(format!(
                "Duplicate AttributeName in AttributeDefinitions: {}",
                def.attribute_name,
            )));
        }
        if let AttributeType::Unknown(other) = &def.attribute_type {
            return Err(DynamoDBError::validation(format!(
                "Member must satisfy enum value set: [S, N, B, SS, NS, BS], got '{other}'"
            )));
        }
    }
    Ok(())
}

/// Parse key schema elements and attribute definitions into a `KeySchema`.
fn parse_key_schema(
    elements: &[KeySchemaElement],
    definitions: &[AttributeDefinition],
) -> Result<KeySchema, DynamoDBError> {
    let mut hash_key = None;
    let mut range_key = None;

    for elem in elements {
        let attr_type = find_attribute_type(definitions, &elem.attribute_name)?;
        validate_key_attribute_type(&attr_type, &elem.attribute_name)?;
        let attr = KeyAttribute {
            name: elem.attribute_name.clone(),
            attr_type,
        };
        match elem.key_type {
            KeyType::Hash => hash_key = Some(attr),
            KeyType::Range => range_key = Some(attr),
        }
    }

    let hash_key = hash_key
        .ok_or_else(|| DynamoDBError::validation("Key schema must contain a HASH key element"))?;
    Ok(KeySchema {
        hash_key,
        range_key,
    })
}

/// Validate that a key attribute type is one of the allowed types (S, N, B).
fn validate_key_attribute_type(
    attr_type: &AttributeType,
    attr_name: &str,
) -> Result<(), DynamoDBError> {
    if attr_type.is_valid_key_type() {
        Ok(())
    } else {
        Err(DynamoDBError::validation(format!(
            "Key attribute {attr_name} must be of type S, N or B, got '{attr_type}'"
        )))
    }
}

fn find_attribute_type(
    definitions: &[AttributeDefinition],
    name: &str,
) -> Result<AttributeType, DynamoDBError> {
    definitions
        .iter()
        .find(|d| d.attribute_name == name)
        .map(|d| d.attribute_type.clone())
        .ok_or_else(|| {
            DynamoDBError::validation(format!(
                "One or more parameter values were invalid: Some index key schema elements are \
                 not valid. The following index key schema element does not have a matching \
                 AttributeDefinition: {name}"
            ))
        })
}

/// Local secondary indexes share the table's hash key, carry their own range
/// key, and need a composite table.
fn validate_local_secondary_indexes(
    indexes: &[LocalSecondaryIndex],
    key_schema: &KeySchema,
    definitions: &[AttributeDefinition],
) -> Result<(), DynamoDBError> {
    if indexes.is_empty() {
        return Ok(());
    }
    if key_schema.range_key.is_none() {
        return Err(DynamoDBError::validation(
            "One or more parameter values were invalid: Table KeySchema does not have a range \
             key, which is required when specifying a LocalSecondaryIndex",
        ));
    }
    let mut names = HashSet::new();
    for lsi in indexes {
        if !names.insert(&lsi.index_name) {
            return Err(DynamoDBError::validation(format!(
                "One or more parameter values were invalid: Duplicate index name: {}",
                lsi.index_name
            )));
        }
        validate_key_schema_structure(&lsi.key_schema)?;
        let index_keys = parse_key_schema(&lsi.key_schema, definitions)?;
        if index_keys.hash_key.name != key_schema.hash_key.name || index_keys.range_key.is_none()
        {
            return Err(DynamoDBError::validation(format!(
                "One or more parameter values were invalid: Index KeySchema of {} must use the \
                 table hash key and a range key",
                lsi.index_name
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use dynamock_model::AttributeValue;
    use dynamock_model::error::DynamoDBErrorCode;
    use dynamock_model::types::{
        AttributeAction, AttributeValueUpdate, ComparisonOperator, Condition,
        ExpectedAttributeValue, Projection, ProjectionType, ReturnValue, TableStatus,
    };

    use super::*;

    fn setup_provider_with_table() -> DynamockProvider {
        let provider = DynamockProvider::new(DynamockConfig {
            seed_tables: vec!["bar".to_owned()],
            ..Default::default()
        });
        provider.seed_tables().unwrap();
        provider
    }

    fn make_item(pairs: &[(&str, AttributeValue)]) -> HashMap<String, AttributeValue> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    fn s(v: &str) -> AttributeValue {
        AttributeValue::S(v.to_owned())
    }

    fn n(v: &str) -> AttributeValue {
        AttributeValue::N(v.to_owned())
    }

    fn put(provider: &DynamockProvider, item: HashMap<String, AttributeValue>) {
        provider
            .handle_put_item(PutItemInput {
                table_name: "bar".to_owned(),
                item,
                ..Default::default()
            })
            .unwrap();
    }

    fn create_input(name: &str) -> CreateTableInput {
        CreateTableInput {
            table_name: name.to_owned(),
            key_schema: vec![KeySchemaElement {
                attribute_name: "pk".to_owned(),
                key_type: KeyType::Hash,
            }],
            attribute_definitions: vec![AttributeDefinition {
                attribute_name: "pk".to_owned(),
                attribute_type: AttributeType::S,
            }],
            provisioned_throughput: Some(ProvisionedThroughput {
                read_capacity_units: 5,
                write_capacity_units: 5,
            }),
            ..Default::default()
        }
    }

    fn query_eq(value: &str) -> QueryInput {
        QueryInput {
            table_name: "bar".to_owned(),
            key_conditions: HashMap::from([(
                "id".to_owned(),
                Condition {
                    comparison_operator: ComparisonOperator::Eq,
                    attribute_value_list: vec![s(value)],
                },
            )]),
            ..Default::default()
        }
    }

    // -- Table management --

    #[test]
    fn test_should_create_and_describe_table() {
        let provider = DynamockProvider::new(DynamockConfig::default());
        let out = provider.handle_create_table(create_input("users")).unwrap();
        let desc = out.table_description.unwrap();
        assert_eq!(desc.table_status, Some(TableStatus::Active));
        assert_eq!(
            desc.table_arn.as_deref(),
            Some("arn:aws:dynamodb:us-east-1:000000000000:table/users")
        );

        let described = provider
            .handle_describe_table(DescribeTableInput {
                table_name: "users".to_owned(),
            })
            .unwrap();
        assert_eq!(described.table.unwrap().table_name.as_deref(), Some("users"));
    }

    #[test]
    fn test_should_reject_duplicate_table() {
        let provider = setup_provider_with_table();
        let err = provider
            .handle_create_table(create_input("bar"))
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ResourceInUseException);
    }

    #[test]
    fn test_should_reject_invalid_create_inputs() {
        let provider = DynamockProvider::new(DynamockConfig::default());

        let err = provider.handle_create_table(create_input("ab")).unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ValidationException);

        let mut input = create_input("users");
        input.attribute_definitions.clear();
        assert!(provider.handle_create_table(input).is_err());

        let mut input = create_input("users");
        input.provisioned_throughput = None;
        assert!(provider.handle_create_table(input).is_err());

        let mut input = create_input("users");
        input.attribute_definitions[0].attribute_type = AttributeType::Ss;
        assert!(provider.handle_create_table(input).is_err());

        let mut input = create_input("users");
        input.key_schema.push(KeySchemaElement {
            attribute_name: "pk".to_owned(),
            key_type: KeyType::Hash,
        });
        assert!(provider.handle_create_table(input).is_err());

        assert!(provider.registry.list_table_names().is_empty());
    }

    #[test]
    fn test_should_accept_local_secondary_index() {
        let provider = DynamockProvider::new(DynamockConfig::default());
        let mut input = create_input("events");
        input.key_schema.push(KeySchemaElement {
            attribute_name: "ts".to_owned(),
            key_type: KeyType::Range,
        });
        input.attribute_definitions.extend([
            AttributeDefinition {
                attribute_name: "ts".to_owned(),
                attribute_type: AttributeType::N,
            },
            AttributeDefinition {
                attribute_name: "kind".to_owned(),
                attribute_type: AttributeType::S,
            },
        ]);
        input.local_secondary_indexes = vec![LocalSecondaryIndex {
            index_name: "by_kind".to_owned(),
            key_schema: vec![
                KeySchemaElement {
                    attribute_name: "pk".to_owned(),
                    key_type: KeyType::Hash,
                },
                KeySchemaElement {
                    attribute_name: "kind".to_owned(),
                    key_type: KeyType::Range,
                },
            ],
            projection: Projection {
                projection_type: Some(ProjectionType::KeysOnly),
                non_key_attributes: Vec::new(),
            },
        }];
        let desc = provider
            .handle_create_table(input)
            .unwrap()
            .table_description
            .unwrap();
        assert_eq!(desc.local_secondary_indexes.len(), 1);
        assert_eq!(
            desc.local_secondary_indexes[0].index_name.as_deref(),
            Some("by_kind")
        );
    }

    #[test]
    fn test_should_delete_table() {
        let provider = setup_provider_with_table();
        let out = provider
            .handle_delete_table(DeleteTableInput {
                table_name: "bar".to_owned(),
            })
            .unwrap();
        assert_eq!(
            out.table_description.unwrap().table_status,
            Some(TableStatus::Deleting)
        );
        let err = provider
            .handle_describe_table(DescribeTableInput {
                table_name: "bar".to_owned(),
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ResourceNotFoundException);
    }

    #[test]
    fn test_should_page_list_tables() {
        let provider = DynamockProvider::new(DynamockConfig::default());
        for name in ["tab5", "tab1", "tab3", "tab2", "tab4"] {
            provider.handle_create_table(create_input(name)).unwrap();
        }
        let first = provider
            .handle_list_tables(ListTablesInput {
                exclusive_start_table_name: None,
                limit: Some(2),
            })
            .unwrap();
        assert_eq!(first.table_names, vec!["tab1", "tab2"]);

        let rest = provider
            .handle_list_tables(ListTablesInput {
                exclusive_start_table_name: first.last_evaluated_table_name,
                limit: None,
            })
            .unwrap();
        assert_eq!(rest.table_names, vec!["tab3", "tab4", "tab5"]);
        assert!(rest.last_evaluated_table_name.is_none());
    }

    #[test]
    fn test_should_reject_list_tables_limit_out_of_range() {
        let provider = DynamockProvider::new(DynamockConfig::default());
        for limit in [0, 101] {
            let err = provider
                .handle_list_tables(ListTablesInput {
                    exclusive_start_table_name: None,
                    limit: Some(limit),
                })
                .unwrap_err();
            assert_eq!(err.code, DynamoDBErrorCode::ValidationException);
        }
    }

    #[test]
    fn test_should_count_throughput_decreases() {
        let provider = setup_provider_with_table();
        let update = |read, write| {
            provider
                .handle_update_table(UpdateTableInput {
                    table_name: "bar".to_owned(),
                    provisioned_throughput: ProvisionedThroughput {
                        read_capacity_units: read,
                        write_capacity_units: write,
                    },
                })
                .unwrap()
                .table_description
                .unwrap()
                .provisioned_throughput
                .unwrap()
        };

        assert_eq!(update(15, 15).number_of_decreases_today, Some(0));
        assert_eq!(update(10, 15).number_of_decreases_today, Some(1));
        let pt = update(15, 10);
        assert_eq!(pt.number_of_decreases_today, Some(2));
        assert_eq!(pt.read_capacity_units, 15);
        assert_eq!(pt.write_capacity_units, 10);
    }

    #[test]
    fn test_should_reject_update_table_on_missing_table() {
        let provider = DynamockProvider::new(DynamockConfig::default());
        let err = provider
            .handle_update_table(UpdateTableInput {
                table_name: "nope".to_owned(),
                provisioned_throughput: ProvisionedThroughput {
                    read_capacity_units: 1,
                    write_capacity_units: 1,
                },
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ResourceNotFoundException);
    }

    // -- Items --

    #[test]
    fn test_should_put_then_get_projected_item() {
        let provider = setup_provider_with_table();
        put(
            &provider,
            make_item(&[("id", s("foo")), ("name", s("bob")), ("age", n("30"))]),
        );

        let out = provider
            .handle_get_item(GetItemInput {
                table_name: "bar".to_owned(),
                key: make_item(&[("id", s("foo"))]),
                attributes_to_get: vec!["name".to_owned(), "missing".to_owned()],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(out.item.unwrap(), make_item(&[("name", s("bob"))]));
        assert!(out.consumed_capacity.is_none());
    }

    #[test]
    fn test_should_report_consumed_capacity_when_asked() {
        let provider = setup_provider_with_table();
        put(&provider, make_item(&[("id", s("foo"))]));
        let out = provider
            .handle_get_item(GetItemInput {
                table_name: "bar".to_owned(),
                key: make_item(&[("id", s("foo"))]),
                return_consumed_capacity: Some(ReturnConsumedCapacity::Total),
                ..Default::default()
            })
            .unwrap();
        let cc = out.consumed_capacity.unwrap();
        assert_eq!(cc.table_name.as_deref(), Some("bar"));
        assert_eq!(cc.capacity_units, Some(1.0));
    }

    #[test]
    fn test_should_error_on_get_of_missing_item() {
        let provider = setup_provider_with_table();
        let err = provider
            .handle_get_item(GetItemInput {
                table_name: "bar".to_owned(),
                key: make_item(&[("id", s("nope"))]),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ResourceNotFoundException);

        let err = provider
            .handle_get_item(GetItemInput {
                table_name: "bar".to_owned(),
                key: make_item(&[("other", s("x"))]),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ValidationException);
    }

    #[test]
    fn test_should_return_old_and_new_values_on_put() {
        let provider = setup_provider_with_table();
        put(&provider, make_item(&[("id", s("foo")), ("a", n("1")), ("b", n("2"))]));

        let out = provider
            .handle_put_item(PutItemInput {
                table_name: "bar".to_owned(),
                item: make_item(&[("id", s("foo")), ("a", n("5"))]),
                return_values: Some(ReturnValue::UpdatedOld),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(out.attributes, make_item(&[("id", s("foo")), ("a", n("1"))]));

        let out = provider
            .handle_put_item(PutItemInput {
                table_name: "bar".to_owned(),
                item: make_item(&[("id", s("foo")), ("c", n("7"))]),
                return_values: Some(ReturnValue::AllNew),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(out.attributes, make_item(&[("id", s("foo")), ("c", n("7"))]));
    }

    #[test]
    fn test_should_fail_put_on_unmet_expectation() {
        let provider = setup_provider_with_table();
        put(&provider, make_item(&[("id", s("foo")), ("v", n("1"))]));
        let err = provider
            .handle_put_item(PutItemInput {
                table_name: "bar".to_owned(),
                item: make_item(&[("id", s("foo")), ("v", n("2"))]),
                expected: HashMap::from([(
                    "id".to_owned(),
                    ExpectedAttributeValue {
                        value: None,
                        exists: Some(false),
                    },
                )]),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ConditionalCheckFailedException);

        let out = provider
            .handle_get_item(GetItemInput {
                table_name: "bar".to_owned(),
                key: make_item(&[("id", s("foo"))]),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(out.item.unwrap()["v"], n("1"));
    }

    #[test]
    fn test_should_update_item_and_narrow_return_values() {
        let provider = setup_provider_with_table();
        put(
            &provider,
            make_item(&[("id", s("foo")), ("count", n("1")), ("keep", s("x"))]),
        );
        let out = provider
            .handle_update_item(UpdateItemInput {
                table_name: "bar".to_owned(),
                key: make_item(&[("id", s("foo"))]),
                attribute_updates: HashMap::from([(
                    "count".to_owned(),
                    AttributeValueUpdate {
                        value: Some(n("41")),
                        action: Some(AttributeAction::Add),
                    },
                )]),
                return_values: Some(ReturnValue::UpdatedNew),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(out.attributes, make_item(&[("count", n("42"))]));
    }

    #[test]
    fn test_should_reject_update_of_missing_item() {
        let provider = setup_provider_with_table();
        let err = provider
            .handle_update_item(UpdateItemInput {
                table_name: "bar".to_owned(),
                key: make_item(&[("id", s("ghost"))]),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ResourceNotFoundException);
    }

    #[test]
    fn test_should_delete_item_and_return_it() {
        let provider = setup_provider_with_table();
        put(&provider, make_item(&[("id", s("foo")), ("v", n("1"))]));
        let out = provider
            .handle_delete_item(DeleteItemInput {
                table_name: "bar".to_owned(),
                key: make_item(&[("id", s("foo"))]),
                return_values: Some(ReturnValue::None),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(out.attributes, make_item(&[("id", s("foo")), ("v", n("1"))]));

        let err = provider
            .handle_get_item(GetItemInput {
                table_name: "bar".to_owned(),
                key: make_item(&[("id", s("foo"))]),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ResourceNotFoundException);
    }

    // -- Query --

    #[test]
    fn test_should_query_eq_over_similar_keys() {
        let provider = setup_provider_with_table();
        for id in ["bar", "ba", "bat"] {
            put(&provider, make_item(&[("id", s(id))]));
        }
        let out = provider.handle_query(query_eq("bar")).unwrap();
        assert_eq!(out.count, 1);
        assert_eq!(out.items, vec![make_item(&[("id", s("bar"))])]);
    }

    #[test]
    fn test_should_query_count_only() {
        let provider = setup_provider_with_table();
        put(&provider, make_item(&[("id", s("bar"))]));
        let mut input = query_eq("bar");
        input.select = Some(Select::Count);
        let out = provider.handle_query(input).unwrap();
        assert_eq!(out.count, 1);
        assert!(out.items.is_empty());
    }

    #[test]
    fn test_should_query_with_limit_and_cursor() {
        let provider = setup_provider_with_table();
        for id in ["1", "2", "3", "4", "5"] {
            put(&provider, make_item(&[("id", s(id)), ("v", n(id))]));
        }
        let between = |start: HashMap<String, AttributeValue>| QueryInput {
            table_name: "bar".to_owned(),
            key_conditions: HashMap::from([(
                "id".to_owned(),
                Condition {
                    comparison_operator: ComparisonOperator::Between,
                    attribute_value_list: vec![s("2"), s("4")],
                },
            )]),
            exclusive_start_key: start,
            limit: Some(2),
            attributes_to_get: vec!["v".to_owned()],
            ..Default::default()
        };

        let first = provider.handle_query(between(HashMap::new())).unwrap();
        assert_eq!(first.count, 2);
        assert_eq!(
            first.items,
            vec![make_item(&[("v", n("2"))]), make_item(&[("v", n("3"))])]
        );
        assert_eq!(first.last_evaluated_key, make_item(&[("id", s("3"))]));

        let second = provider
            .handle_query(between(first.last_evaluated_key))
            .unwrap();
        assert_eq!(second.items, vec![make_item(&[("v", n("4"))])]);
        assert!(second.last_evaluated_key.is_empty());
    }

    #[test]
    fn test_should_reject_invalid_query() {
        let provider = setup_provider_with_table();
        let mut input = query_eq("bar");
        input.key_conditions.insert(
            "name".to_owned(),
            Condition {
                comparison_operator: ComparisonOperator::Eq,
                attribute_value_list: vec![s("x")],
            },
        );
        let err = provider.handle_query(input).unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ValidationException);

        let mut input = query_eq("bar");
        input.limit = Some(0);
        assert!(provider.handle_query(input).is_err());
    }

    #[test]
    fn test_should_not_duplicate_seed_tables() {
        let provider = setup_provider_with_table();
        assert!(provider.seed_tables().unwrap().is_empty());
        assert_eq!(provider.registry.list_table_names(), vec!["bar"]);
    }
}
