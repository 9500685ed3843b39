//! Table registry and per-table state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;

use dynamock_model::types::{
    AttributeDefinition, KeySchemaElement, LocalSecondaryIndex, LocalSecondaryIndexDescription,
    ProvisionedThroughput, TableDescription, TableStatus,
};

use crate::error::TableError;
use crate::storage::{ItemStore, KeySchema};
use crate::throughput::{ThroughputTracker, epoch_seconds};

/// All tables of one emulator instance.
#[derive(Debug)]
pub struct TableRegistry {
    /// All tables keyed by name.
    tables: DashMap<String, Arc<Table>>,
}

impl TableRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
        }
    }

    /// Get a table by name.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<Arc<Table>> {
        self.tables.get(name).map(|r| Arc::clone(r.value()))
    }

    /// Get a table or fail with [`TableError::TableNotFound`].
    pub fn require_table(&self, name: &str) -> Result<Arc<Table>, TableError> {
        self.get_table(name).ok_or_else(|| TableError::TableNotFound {
            name: name.to_owned(),
        })
    }

    /// Register a new table. Fails when the name is taken.
    pub fn create_table(&self, table: Table) -> Result<Arc<Table>, TableError> {
        let name = table.name.clone();
        // Use entry API to atomically check + insert.
        match self.tables.entry(name) {
            dashmap::mapref::entry::Entry::Occupied(e) => Err(TableError::TableInUse {
                name: e.key().clone(),
            }),
            dashmap::mapref::entry::Entry::Vacant(e) => {
                let table = Arc::new(table);
                e.insert(Arc::clone(&table));
                Ok(table)
            }
        }
    }

    /// Remove a table by name. Returns the removed table.
    pub fn delete_table(&self, name: &str) -> Result<Arc<Table>, TableError> {
        self.tables
            .remove(name)
            .map(|(_, t)| t)
            .ok_or_else(|| TableError::TableNotFound {
                name: name.to_owned(),
            })
    }

    /// List all table names (sorted).
    #[must_use]
    pub fn list_table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// One page of table names in sorted order, starting strictly after
    /// `exclusive_start`. The second value is the last name of the page
    /// when more names follow.
    #[must_use]
    pub fn list_tables(
        &self,
        exclusive_start: Option<&str>,
        limit: usize,
    ) -> (Vec<String>, Option<String>) {
        let all_names = self.list_table_names();
        let start_idx = exclusive_start.map_or(0, |start| {
            all_names
                .iter()
                .position(|n| n.as_str() > start)
                .unwrap_or(all_names.len())
        });

        let mut page: Vec<String> = all_names
            .into_iter()
            .skip(start_idx)
            .take(limit + 1)
            .collect();

        if page.len() > limit {
            page.truncate(limit);
            let last = page.last().cloned();
            (page, last)
        } else {
            (page, None)
        }
    }

    /// Remove every table.
    pub fn reset(&self) {
        self.tables.clear();
    }
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything needed to build a [`Table`].
#[derive(Debug, Clone)]
pub struct TableSpec {
    /// Table name.
    pub name: String,
    /// Key schema elements as given on the wire.
    pub key_schema_elements: Vec<KeySchemaElement>,
    /// Parsed key schema.
    pub key_schema: KeySchema,
    /// Attribute definitions.
    pub attribute_definitions: Vec<AttributeDefinition>,
    /// Initial provisioned throughput.
    pub provisioned_throughput: ProvisionedThroughput,
    /// Local secondary index definitions, recorded only.
    pub local_secondary_indexes: Vec<LocalSecondaryIndex>,
    /// Table ARN.
    pub arn: String,
}

/// A single table: immutable metadata plus locked mutable state.
#[derive(Debug)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Table status.
    pub status: TableStatus,
    /// Key schema elements.
    pub key_schema_elements: Vec<KeySchemaElement>,
    /// Attribute definitions.
    pub attribute_definitions: Vec<AttributeDefinition>,
    /// Local secondary index definitions.
    pub lsi_definitions: Vec<LocalSecondaryIndex>,
    /// Table ARN.
    pub arn: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    data: RwLock<TableData>,
}

/// State guarded by the table lock.
#[derive(Debug)]
pub struct TableData {
    /// Item storage.
    pub store: ItemStore,
    /// Provisioned-throughput tracker.
    pub throughput: ThroughputTracker,
}

impl Table {
    /// Build an empty, active table created at `now`.
    #[must_use]
    pub fn new(spec: TableSpec, now: DateTime<Utc>) -> Self {
        let store = ItemStore::new(spec.key_schema, &spec.attribute_definitions);
        let throughput = ThroughputTracker::new(&spec.provisioned_throughput, now);
        Self {
            name: spec.name,
            status: TableStatus::Active,
            key_schema_elements: spec.key_schema_elements,
            attribute_definitions: spec.attribute_definitions,
            lsi_definitions: spec.local_secondary_indexes,
            arn: spec.arn,
            created_at: now,
            data: RwLock::new(TableData { store, throughput }),
        }
    }

    /// Run `f` with shared access to the table state.
    pub fn read<R>(&self, f: impl FnOnce(&TableData) -> R) -> R {
        f(&*self.data.read())
    }

    /// Run `f` with exclusive access to the table state.
    pub fn write<R>(&self, f: impl FnOnce(&mut TableData) -> R) -> R {
        f(&mut *self.data.write())
    }

    /// Build a `TableDescription` from this table's metadata.
    #[must_use]
    pub fn to_description(&self) -> TableDescription {
        self.read(|data| self.describe(data, self.status.clone()))
    }

    /// Description as reported by `DeleteTable`.
    #[must_use]
    pub fn to_delete_description(&self) -> TableDescription {
        self.read(|data| self.describe(data, TableStatus::Deleting))
    }

    /// Describe the table from state the caller already holds.
    #[must_use]
    pub fn describe(&self, data: &TableData, status: TableStatus) -> TableDescription {
        TableDescription {
            table_name: Some(self.name.clone()),
            table_status: Some(status),
            key_schema: self.key_schema_elements.clone(),
            attribute_definitions: self.attribute_definitions.clone(),
            creation_date_time: Some(epoch_seconds(self.created_at)),
            item_count: Some(i64::try_from(data.store.item_count()).unwrap_or(i64::MAX)),
            table_size_bytes: Some(
                i64::try_from(data.store.total_size_bytes()).unwrap_or(i64::MAX),
            ),
            table_arn: Some(self.arn.clone()),
            provisioned_throughput: Some(data.throughput.description()),
            local_secondary_indexes: self
                .lsi_definitions
                .iter()
                .map(|lsi| LocalSecondaryIndexDescription {
                    index_name: Some(lsi.index_name.clone()),
                    key_schema: lsi.key_schema.clone(),
                    projection: Some(lsi.projection.clone()),
                    index_size_bytes: Some(0),
                    item_count: Some(0),
                })
                .collect(),
        }
    }
}
