//! Output formatting tests for schema command.

#[cfg(test)]
mod tests {
    use super::super::execute::{ColumnSummary, SchemaResult, TableSummary};
    use rstest::{fixture, rstest};

    // =========================================================================
    // Expected outputs
    // =========================================================================

    const EMPTY_TABLE: &str = "\
Schema: PublicationDelivery

No tables derived.";

    const SUMMARY_TABLE: &str = "\
Schema: PublicationDelivery

Tables (2):

publication_delivery (PublicationDelivery)
  id          scalar
  attributes  object
  geom        geometry

quay (Quay, parent: StopPlace)
  id         scalar
  parent_id  scalar";

    const DDL_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS \"quay\" (
    \"id\" TEXT
);";

    // =========================================================================
    // Fixtures
    // =========================================================================

    fn column(name: &str, kind: &str) -> ColumnSummary {
        ColumnSummary {
            name: name.to_string(),
            kind: kind.to_string(),
        }
    }

    #[fixture]
    fn empty_result() -> SchemaResult {
        SchemaResult {
            root_element: "PublicationDelivery".to_string(),
            tables: vec![],
            ddl: None,
        }
    }

    #[fixture]
    fn summary_result() -> SchemaResult {
        SchemaResult {
            root_element: "PublicationDelivery".to_string(),
            tables: vec![
                TableSummary {
                    entity: "PublicationDelivery".to_string(),
                    table_name: "publication_delivery".to_string(),
                    parent: None,
                    columns: vec![
                        column("id", "scalar"),
                        column("attributes", "object"),
                        column("geom", "geometry"),
                    ],
                },
                TableSummary {
                    entity: "Quay".to_string(),
                    table_name: "quay".to_string(),
                    parent: Some("StopPlace".to_string()),
                    columns: vec![column("id", "scalar"), column("parent_id", "scalar")],
                },
            ],
            ddl: None,
        }
    }

    #[fixture]
    fn ddl_result() -> SchemaResult {
        SchemaResult {
            root_element: "PublicationDelivery".to_string(),
            tables: vec![],
            ddl: Some(vec!["CREATE TABLE IF NOT EXISTS \"quay\" (\n    \"id\" TEXT\n)".to_string()]),
        }
    }

    // =========================================================================
    // Tests
    // =========================================================================

    crate::output_table_test! {
        test_name: test_to_table_empty,
        fixture: empty_result,
        fixture_type: SchemaResult,
        expected: EMPTY_TABLE,
    }

    crate::output_table_test! {
        test_name: test_to_table_summary,
        fixture: summary_result,
        fixture_type: SchemaResult,
        expected: SUMMARY_TABLE,
    }

    crate::output_table_test! {
        test_name: test_to_table_ddl,
        fixture: ddl_result,
        fixture_type: SchemaResult,
        expected: DDL_TABLE,
    }

    crate::output_json_test! {
        test_name: test_format_json,
        fixture: summary_result,
        fixture_type: SchemaResult,
        assertions: {
            "root_element": "PublicationDelivery",
        },
    }

    #[rstest]
    fn test_format_json_omits_absent_fields(summary_result: SchemaResult) {
        use crate::output::{OutputFormat, Outputable};
        let parsed: serde_json::Value =
            serde_json::from_str(&summary_result.format(OutputFormat::Json)).unwrap();
        assert!(parsed.get("ddl").is_none());
        assert!(parsed["tables"][0].get("parent").is_none());
        assert_eq!(parsed["tables"][1]["parent"], "StopPlace");
        assert_eq!(parsed["tables"][1]["columns"][1]["name"], "parent_id");
    }

    crate::output_toon_test! {
        test_name: test_format_toon,
        fixture: summary_result,
        fixture_type: SchemaResult,
        contains: ["root_element: PublicationDelivery", "tables[2]"],
    }
}
