//! Output formatting tests for load command.

#[cfg(test)]
mod tests {
    use super::super::execute::{LoadResult, TableCount};
    use rstest::{fixture, rstest};

    const EMPTY_TABLE: &str = "\
Load (Postgres)

Documents: 1
No rows loaded.

Rows: 0
Diagnostics: 0";

    const DRY_RUN_TABLE: &str = "\
Load (Memory, dry-run)

Documents: 2
Tables (2):
  quay        4
  stop_place  2

Rows: 6
Diagnostics: 2
Statements recorded: 2";

    #[fixture]
    fn empty_result() -> LoadResult {
        LoadResult {
            backend: "Postgres".to_string(),
            documents: 1,
            dry_run: false,
            tables: vec![],
            total_rows: 0,
            diagnostics: 0,
            statements: None,
        }
    }

    #[fixture]
    fn dry_run_result() -> LoadResult {
        LoadResult {
            backend: "Memory".to_string(),
            documents: 2,
            dry_run: true,
            tables: vec![
                TableCount {
                    table_name: "quay".to_string(),
                    rows: 4,
                },
                TableCount {
                    table_name: "stop_place".to_string(),
                    rows: 2,
                },
            ],
            total_rows: 6,
            diagnostics: 2,
            statements: Some(2),
        }
    }

    crate::output_table_test! {
        test_name: test_to_table_empty,
        fixture: empty_result,
        fixture_type: LoadResult,
        expected: EMPTY_TABLE,
    }

    crate::output_table_test! {
        test_name: test_to_table_dry_run,
        fixture: dry_run_result,
        fixture_type: LoadResult,
        expected: DRY_RUN_TABLE,
    }

    crate::output_json_test! {
        test_name: test_format_json,
        fixture: dry_run_result,
        fixture_type: LoadResult,
        assertions: {
            "backend": "Memory",
            "total_rows": 6,
            "statements": 2,
        },
    }

    #[rstest]
    fn test_format_json_without_statements(empty_result: LoadResult) {
        use crate::output::{OutputFormat, Outputable};
        let parsed: serde_json::Value =
            serde_json::from_str(&empty_result.format(OutputFormat::Json)).unwrap();
        assert!(parsed.get("statements").is_none());
        assert_eq!(parsed["tables"], serde_json::json!([]));
    }

    crate::output_toon_test! {
        test_name: test_format_toon,
        fixture: dry_run_result,
        fixture_type: LoadResult,
        contains: ["backend: Memory", "tables[2]{rows,table_name}:", "quay"],
    }
}
