//! Table and item tests against a running dynamock server.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use aws_sdk_dynamodb::types::{
        AttributeAction, AttributeDefinition, AttributeValue, AttributeValueUpdate,
        ComparisonOperator, Condition, ExpectedAttributeValue, KeySchemaElement, KeyType,
        ProvisionedThroughput, ReturnValue, ScalarAttributeType,
    };

    use crate::{dynamodb_client, test_table_name};

    fn throughput(read: i64, write: i64) -> ProvisionedThroughput {
        ProvisionedThroughput::builder()
            .read_capacity_units(read)
            .write_capacity_units(write)
            .build()
            .unwrap()
    }

    fn key_element(name: &str, key_type: KeyType) -> KeySchemaElement {
        KeySchemaElement::builder()
            .attribute_name(name)
            .key_type(key_type)
            .build()
            .unwrap()
    }

    fn definition(name: &str, ty: ScalarAttributeType) -> AttributeDefinition {
        AttributeDefinition::builder()
            .attribute_name(name)
            .attribute_type(ty)
            .build()
            .unwrap()
    }

    /// Helper: create a table with hash key `pk` (S).
    async fn create_simple_table(client: &aws_sdk_dynamodb::Client, table_name: &str) {
        client
            .create_table()
            .table_name(table_name)
            .key_schema(key_element("pk", KeyType::Hash))
            .attribute_definitions(definition("pk", ScalarAttributeType::S))
            .provisioned_throughput(throughput(5, 5))
            .send()
            .await
            .unwrap_or_else(|e| panic!("failed to create table {table_name}: {e}"));
        tracing::debug!(table = table_name, "created test table");
    }

    /// Helper: create a table with hash key `pk` (S) and range key `sk` (S).
    async fn create_composite_table(client: &aws_sdk_dynamodb::Client, table_name: &str) {
        client
            .create_table()
            .table_name(table_name)
            .key_schema(key_element("pk", KeyType::Hash))
            .key_schema(key_element("sk", KeyType::Range))
            .attribute_definitions(definition("pk", ScalarAttributeType::S))
            .attribute_definitions(definition("sk", ScalarAttributeType::S))
            .provisioned_throughput(throughput(5, 5))
            .send()
            .await
            .unwrap_or_else(|e| panic!("failed to create table {table_name}: {e}"));
    }

    async fn delete_table(client: &aws_sdk_dynamodb::Client, table_name: &str) {
        let _ = client.delete_table().table_name(table_name).send().await;
    }

    fn s(v: &str) -> AttributeValue {
        AttributeValue::S(v.to_owned())
    }

    // -----------------------------------------------------------------------
    // Table Operations
    // -----------------------------------------------------------------------

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_describe_and_delete_table() {
        let client = dynamodb_client();
        let table = test_table_name("lifecycle");
        create_simple_table(&client, &table).await;

        let desc = client
            .describe_table()
            .table_name(&table)
            .send()
            .await
            .unwrap();
        let t = desc.table().unwrap();
        assert_eq!(t.table_name(), Some(table.as_str()));
        assert_eq!(t.item_count(), Some(0));

        let listed = client.list_tables().send().await.unwrap();
        assert!(listed.table_names().contains(&table));

        client.delete_table().table_name(&table).send().await.unwrap();
        assert!(
            client
                .describe_table()
                .table_name(&table)
                .send()
                .await
                .is_err()
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_duplicate_table() {
        let client = dynamodb_client();
        let table = test_table_name("dup");
        create_simple_table(&client, &table).await;

        let err = client
            .create_table()
            .table_name(&table)
            .key_schema(key_element("pk", KeyType::Hash))
            .attribute_definitions(definition("pk", ScalarAttributeType::S))
            .provisioned_throughput(throughput(5, 5))
            .send()
            .await
            .unwrap_err();
        assert!(err.into_service_error().is_resource_in_use_exception());

        delete_table(&client, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_track_throughput_decreases() {
        let client = dynamodb_client();
        let table = test_table_name("throughput");
        create_simple_table(&client, &table).await;

        let mut counts = Vec::new();
        for (read, write) in [(15, 15), (10, 15), (15, 10)] {
            let out = client
                .update_table()
                .table_name(&table)
                .provisioned_throughput(throughput(read, write))
                .send()
                .await
                .unwrap();
            let pt = out
                .table_description()
                .and_then(|d| d.provisioned_throughput())
                .unwrap();
            counts.push(pt.number_of_decreases_today());
        }
        assert_eq!(counts, vec![Some(0), Some(1), Some(2)]);

        delete_table(&client, &table).await;
    }

    // -----------------------------------------------------------------------
    // Item Operations
    // -----------------------------------------------------------------------

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_put_get_and_delete_item() {
        let client = dynamodb_client();
        let table = test_table_name("items");
        create_simple_table(&client, &table).await;

        client
            .put_item()
            .table_name(&table)
            .item("pk", s("k1"))
            .item("name", s("alice"))
            .item("age", AttributeValue::N("30".to_owned()))
            .send()
            .await
            .unwrap();

        let got = client
            .get_item()
            .table_name(&table)
            .key("pk", s("k1"))
            .attributes_to_get("name")
            .send()
            .await
            .unwrap();
        let item = got.item().unwrap();
        assert_eq!(item.len(), 1);
        assert_eq!(item.get("name"), Some(&s("alice")));

        let deleted = client
            .delete_item()
            .table_name(&table)
            .key("pk", s("k1"))
            .send()
            .await
            .unwrap();
        assert_eq!(
            deleted.attributes().and_then(|a| a.get("age")),
            Some(&AttributeValue::N("30".to_owned()))
        );

        let missing = client
            .get_item()
            .table_name(&table)
            .key("pk", s("k1"))
            .send()
            .await;
        assert!(missing.is_err());

        delete_table(&client, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_fail_conditional_put() {
        let client = dynamodb_client();
        let table = test_table_name("cond");
        create_simple_table(&client, &table).await;

        let expected = ExpectedAttributeValue::builder().exists(false).build();
        client
            .put_item()
            .table_name(&table)
            .item("pk", s("k1"))
            .expected("pk", expected.clone())
            .send()
            .await
            .unwrap();

        let err = client
            .put_item()
            .table_name(&table)
            .item("pk", s("k1"))
            .expected("pk", expected)
            .send()
            .await
            .unwrap_err();
        assert!(
            err.into_service_error()
                .is_conditional_check_failed_exception()
        );

        delete_table(&client, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_update_item_attributes() {
        let client = dynamodb_client();
        let table = test_table_name("update");
        create_simple_table(&client, &table).await;

        client
            .put_item()
            .table_name(&table)
            .item("pk", s("k1"))
            .item("count", AttributeValue::N("1".to_owned()))
            .item("gone", s("x"))
            .send()
            .await
            .unwrap();

        let out = client
            .update_item()
            .table_name(&table)
            .key("pk", s("k1"))
            .attribute_updates(
                "count",
                AttributeValueUpdate::builder()
                    .action(AttributeAction::Add)
                    .value(AttributeValue::N("2".to_owned()))
                    .build(),
            )
            .attribute_updates(
                "gone",
                AttributeValueUpdate::builder()
                    .action(AttributeAction::Delete)
                    .build(),
            )
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .unwrap();

        let attrs = out.attributes().unwrap();
        assert_eq!(attrs.get("count"), Some(&AttributeValue::N("3".to_owned())));
        assert!(!attrs.contains_key("gone"));

        delete_table(&client, &table).await;
    }

    // -----------------------------------------------------------------------
    // Query
    // -----------------------------------------------------------------------

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_query_range_between_and_page() {
        let client = dynamodb_client();
        let table = test_table_name("query");
        create_composite_table(&client, &table).await;

        for sk in ["1", "2", "3", "4", "5"] {
            client
                .put_item()
                .table_name(&table)
                .item("pk", s("user"))
                .item("sk", s(sk))
                .send()
                .await
                .unwrap();
        }

        let conditions = HashMap::from([
            (
                "pk".to_owned(),
                Condition::builder()
                    .comparison_operator(ComparisonOperator::Eq)
                    .attribute_value_list(s("user"))
                    .build()
                    .unwrap(),
            ),
            (
                "sk".to_owned(),
                Condition::builder()
                    .comparison_operator(ComparisonOperator::Between)
                    .attribute_value_list(s("2"))
                    .attribute_value_list(s("4"))
                    .build()
                    .unwrap(),
            ),
        ]);

        let first = client
            .query()
            .table_name(&table)
            .set_key_conditions(Some(conditions.clone()))
            .limit(2)
            .send()
            .await
            .unwrap();
        assert_eq!(first.count(), 2);
        let cursor = first.last_evaluated_key().cloned().unwrap();
        assert_eq!(cursor.get("sk"), Some(&s("3")));

        let second = client
            .query()
            .table_name(&table)
            .set_key_conditions(Some(conditions))
            .set_exclusive_start_key(Some(cursor))
            .limit(2)
            .send()
            .await
            .unwrap();
        assert_eq!(second.count(), 1);
        assert_eq!(second.items()[0].get("sk"), Some(&s("4")));
        assert!(second.last_evaluated_key().is_none());

        delete_table(&client, &table).await;
    }
}
