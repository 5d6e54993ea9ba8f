//! End-to-end workflow tests against in-memory services

mod common;

use common::{Call, FakeDatabase, FakeFiles, MemorySink, events_columns};
use serde_json::json;

use flatfile_bridge::models::PreviewResult;
use flatfile_bridge::{CsvFileSink, DataKind, FileHandle, Severity, StatusMessage, Workflow};

type TestWorkflow = Workflow<FakeDatabase, FakeFiles>;

fn database_workflow() -> TestWorkflow {
    let database = FakeDatabase::new()
        .with_table("events", events_columns())
        .with_table("users", vec![])
        .with_rows(vec![
            vec![json!(1), json!("signup"), json!("2024-01-01 00:00:00")],
            vec![json!(2), json!("login"), json!("2024-01-02 00:00:00")],
        ]);
    Workflow::new(database, FakeFiles::new())
}

async fn file_workflow() -> TestWorkflow {
    let files = FakeFiles::new()
        .with_headers(&["id", "amount"])
        .with_rows(vec![vec![json!("1"), json!("9.50")], vec![json!("2"), json!("12.00")]]);
    let mut workflow = Workflow::new(FakeDatabase::new().with_imported(2), files);
    workflow.set_source(DataKind::File).await;
    workflow
}

fn sales_csv() -> FileHandle {
    FileHandle::new("sales.csv", "id,amount\n1,9.50\n2,12.00\n")
}

#[tokio::test]
async fn test_source_switch_resets_state() {
    let mut workflow = database_workflow();
    assert!(workflow.connect().await);
    assert!(workflow.load_columns_from_table("events").await);
    assert!(workflow.preview().await);

    for kind in [DataKind::File, DataKind::Database, DataKind::Database, DataKind::File] {
        workflow.set_source(kind).await;
        let session = workflow.session();
        assert_eq!(workflow.source(), kind);
        assert_eq!(workflow.target(), kind.other());
        assert!(session.tables().is_empty());
        assert!(session.selected_table().is_empty());
        assert!(session.columns().is_empty());
        assert!(session.selection().is_empty());
        assert!(session.preview().is_none());
        assert!(session.selected_file().is_none());
        assert!(workflow.status().message.is_none());
    }
}

#[tokio::test]
async fn test_connect_lists_tables() {
    let mut workflow = database_workflow();
    assert!(workflow.connect().await);

    assert_eq!(workflow.session().tables(), ["events", "users"]);
    assert_eq!(
        workflow.status().message,
        Some(StatusMessage::success("Connected! Found 2 tables."))
    );
    assert_eq!(
        workflow.database().calls(),
        vec![Call::Connect, Call::ListTables]
    );
}

#[tokio::test]
async fn test_connect_failure_reports_server_text() {
    let database = FakeDatabase::new()
        .with_table("events", events_columns())
        .failing_connect("auth failed");
    let mut workflow = Workflow::new(database, FakeFiles::new());

    assert!(!workflow.connect().await);
    assert_eq!(workflow.status().message, Some(StatusMessage::error("auth failed")));
    assert!(workflow.session().tables().is_empty());
    assert!(!workflow.status().busy);
    // Tables are never listed after a failed connect
    assert_eq!(workflow.database().calls(), vec![Call::Connect]);
}

#[tokio::test]
async fn test_load_selects_all_and_toggle_removes_one() {
    let mut workflow = database_workflow();
    assert!(workflow.select_table("events").await);

    assert_eq!(workflow.session().columns().len(), 3);
    assert_eq!(workflow.session().selection().len(), 3);
    assert_eq!(
        workflow.status().message,
        Some(StatusMessage::success("Loaded 3 columns from events"))
    );

    assert_eq!(workflow.toggle_column("name"), Some(false));
    assert_eq!(workflow.session().selection().len(), 2);
    assert_eq!(workflow.toggle_column("name"), Some(true));
    assert_eq!(workflow.session().selection().len(), 3);
}

#[tokio::test]
async fn test_unknown_table_leaves_columns_empty() {
    let mut workflow = database_workflow();
    assert!(!workflow.load_columns_from_table("missing").await);
    assert!(workflow.session().columns().is_empty());
    assert_eq!(workflow.status().severity(), Some(Severity::Error));
    assert_eq!(workflow.status().text(), Some("Table missing does not exist"));
}

#[tokio::test]
async fn test_empty_selection_blocks_preview_and_ingest() {
    let mut workflow = database_workflow();
    workflow.set_output_path("out.csv");
    assert!(workflow.select_table("events").await);
    for column in ["id", "name", "ts"] {
        workflow.toggle_column(column);
    }
    let calls_before = workflow.database().calls().len();

    assert!(!workflow.can_preview());
    assert!(!workflow.preview().await);
    assert_eq!(
        workflow.status().message,
        Some(StatusMessage::warning("Please select columns to preview."))
    );
    assert!(!workflow.status().busy);

    assert!(!workflow.can_ingest());
    assert!(!workflow.start_ingestion().await);
    assert_eq!(
        workflow.status().message,
        Some(StatusMessage::warning("Please select columns to ingest."))
    );
    assert!(!workflow.status().busy);

    assert_eq!(workflow.database().calls().len(), calls_before);
}

#[tokio::test]
async fn test_database_preview_pairs_rows_with_selection() {
    let mut workflow = database_workflow();
    assert!(workflow.select_table("events").await);
    workflow.toggle_column("ts");

    assert!(workflow.preview().await);
    assert!(workflow.status().message.is_none());
    assert!(workflow.session().is_preview_open());

    let exports = workflow.database().exports();
    assert_eq!(exports.len(), 1);
    assert_eq!(exports[0].table, "events");
    assert_eq!(exports[0].columns, vec!["id", "name"]);
    assert_eq!(
        exports[0].query.as_deref(),
        Some("SELECT id, name FROM events LIMIT 100")
    );

    let preview = workflow.session().preview().unwrap();
    assert_eq!(preview.columns, vec!["id", "name"]);
    assert_eq!(preview.len(), 2);

    workflow.close_preview();
    assert!(!workflow.session().is_preview_open());
}

#[tokio::test]
async fn test_preview_checks_selection_before_table() {
    let mut workflow = database_workflow();
    assert!(!workflow.preview().await);
    assert_eq!(workflow.status().text(), Some("Please select columns to preview."));
    assert!(workflow.database().calls().is_empty());
}

#[tokio::test]
async fn test_collaborators_observe_busy() {
    let workflow = database_workflow();
    workflow.database().observe(workflow.subscribe());
    let mut workflow = workflow;
    let mut updates = workflow.subscribe();

    assert!(workflow.connect().await);

    assert_eq!(workflow.database().busy_seen(), vec![true, true]);
    assert!(!workflow.status().busy);
    assert!(workflow.status().label.is_empty());
    assert!(updates.has_changed().unwrap());
    assert!(!updates.borrow_and_update().busy);
}

#[tokio::test]
async fn test_file_import_scenario() {
    let mut workflow = file_workflow().await;
    assert!(workflow.select_file(Some(sales_csv())).await);

    assert_eq!(
        workflow.session().selected_column_names(),
        vec!["id", "amount"]
    );
    assert_eq!(
        workflow.status().message,
        Some(StatusMessage::success("Found 2 columns in sales.csv"))
    );
    assert_eq!(workflow.target_table_display(), "default.sales");
    assert!(workflow.can_ingest());

    assert!(workflow.start_ingestion().await);

    let imports = workflow.database().imports();
    assert_eq!(imports.len(), 1);
    assert_eq!(imports[0].table, "sales");
    assert_eq!(imports[0].file_path, "/uploads/sales.csv");
    assert_eq!(imports[0].delimiter, ',');
    let names: Vec<&str> = imports[0].columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "amount"]);
    assert!(imports[0].columns.iter().all(|c| c.data_type == "String" && c.nullable));

    assert_eq!(
        workflow.status().message,
        Some(StatusMessage::success("Successfully processed 2 records"))
    );
    // The header read already uploaded the file
    assert_eq!(workflow.files().upload_count(), 1);
    assert!(workflow.files().cleanups().is_empty());
}

#[tokio::test]
async fn test_file_import_uses_target_override() {
    let mut workflow = file_workflow().await;
    workflow.set_target_table(Some("sales_2024".to_string()));
    assert!(workflow.select_file(Some(sales_csv())).await);
    assert!(workflow.start_ingestion().await);

    assert_eq!(workflow.database().imports()[0].table, "sales_2024");
    assert_eq!(workflow.target_table_display(), "default.sales_2024");
}

#[tokio::test]
async fn test_file_preview_uses_uploaded_path() {
    let mut workflow = file_workflow().await;
    workflow.set_delimiter(',');
    assert!(workflow.select_file(Some(sales_csv())).await);
    workflow.toggle_column("id");

    assert!(workflow.preview().await);

    let preview_call = workflow
        .files()
        .calls()
        .into_iter()
        .find(|c| matches!(c, Call::Preview { .. }));
    assert_eq!(
        preview_call,
        Some(Call::Preview {
            path: "/uploads/sales.csv".to_string(),
            delimiter: ',',
            limit: 100,
        })
    );
    assert_eq!(
        workflow.session().preview(),
        Some(&PreviewResult::new(
            vec!["amount".to_string()],
            vec![vec![json!("9.50")], vec![json!("12.00")]],
        ))
    );
}

#[tokio::test]
async fn test_file_header_failure_clears_file() {
    let files = FakeFiles::new().failing_header("malformed header");
    let mut workflow = Workflow::new(FakeDatabase::new(), files);
    workflow.set_source(DataKind::File).await;

    assert!(!workflow.select_file(Some(sales_csv())).await);
    assert_eq!(workflow.status().message, Some(StatusMessage::error("malformed header")));
    assert!(workflow.session().selected_file().is_none());
    assert!(workflow.session().columns().is_empty());
    assert_eq!(workflow.target_table_display(), "[select file]");
    // The upload made before the header read is removed again
    assert_eq!(workflow.files().cleanups(), vec!["/uploads/sales.csv"]);
    assert!(workflow.session().uploaded_path().is_none());
}

#[tokio::test]
async fn test_file_upload_failure_uses_fallback() {
    let files = FakeFiles::new().failing_upload("");
    let mut workflow = Workflow::new(FakeDatabase::new(), files);
    workflow.set_source(DataKind::File).await;

    assert!(!workflow.select_file(Some(sales_csv())).await);
    assert_eq!(workflow.status().text(), Some("Failed to read file header"));
    assert_eq!(
        workflow.files().calls(),
        vec![Call::Upload("sales.csv".to_string())]
    );
}

#[tokio::test]
async fn test_import_failure_reports_server_text() {
    let database = FakeDatabase::new().failing_import("table sales is read-only");
    let files = FakeFiles::new().with_headers(&["id", "amount"]);
    let mut workflow = Workflow::new(database, files);
    workflow.set_source(DataKind::File).await;

    assert!(workflow.select_file(Some(sales_csv())).await);
    assert!(!workflow.start_ingestion().await);
    assert_eq!(
        workflow.status().message,
        Some(StatusMessage::error("table sales is read-only"))
    );
}

#[tokio::test]
async fn test_deselecting_file_clears_columns() {
    let mut workflow = file_workflow().await;
    assert!(workflow.select_file(Some(sales_csv())).await);
    assert!(workflow.select_file(None).await);
    assert!(workflow.session().columns().is_empty());
    assert_eq!(workflow.files().cleanups(), vec!["/uploads/sales.csv"]);
    assert!(!workflow.start_ingestion().await);
    assert_eq!(workflow.status().severity(), Some(Severity::Warning));
}

#[tokio::test]
async fn test_replacing_file_removes_previous_upload() {
    let mut workflow = file_workflow().await;
    assert!(workflow.select_file(Some(FileHandle::new("a.csv", "id,amount\n"))).await);
    assert_eq!(workflow.session().uploaded_path(), Some("/uploads/a.csv"));

    assert!(workflow.select_file(Some(FileHandle::new("b.csv", "id,amount\n"))).await);

    assert_eq!(workflow.files().cleanups(), vec!["/uploads/a.csv"]);
    assert_eq!(workflow.session().uploaded_path(), Some("/uploads/b.csv"));
    assert_eq!(
        workflow.status().message,
        Some(StatusMessage::success("Found 2 columns in b.csv"))
    );
}

#[tokio::test]
async fn test_source_switch_removes_upload() {
    let mut workflow = file_workflow().await;
    assert!(workflow.select_file(Some(sales_csv())).await);

    workflow.set_source(DataKind::Database).await;

    assert_eq!(workflow.files().cleanups(), vec!["/uploads/sales.csv"]);
    assert!(workflow.session().uploaded_path().is_none());
    assert!(workflow.status().message.is_none());
}

#[tokio::test]
async fn test_failed_cleanup_keeps_status_message() {
    let files = FakeFiles::new()
        .with_headers(&["id", "amount"])
        .failing_cleanup("permission denied");
    let mut workflow = Workflow::new(FakeDatabase::new(), files);
    workflow.set_source(DataKind::File).await;
    assert!(workflow.select_file(Some(FileHandle::new("a.csv", "id,amount\n"))).await);

    assert!(workflow.select_file(Some(FileHandle::new("b.csv", "id,amount\n"))).await);

    assert_eq!(workflow.files().cleanups(), vec!["/uploads/a.csv"]);
    assert_eq!(
        workflow.status().message,
        Some(StatusMessage::success("Found 2 columns in b.csv"))
    );
    assert!(!workflow.status().busy);
}

#[tokio::test]
async fn test_release_upload_keeps_file_selected() {
    let mut workflow = file_workflow().await;
    assert!(workflow.select_file(Some(sales_csv())).await);

    workflow.release_upload().await;
    assert_eq!(workflow.files().cleanups(), vec!["/uploads/sales.csv"]);
    assert!(workflow.session().selected_file().is_some());

    // Ingestion uploads the file again
    assert!(workflow.start_ingestion().await);
    assert_eq!(workflow.files().upload_count(), 2);
    assert_eq!(workflow.database().imports()[0].file_path, "/uploads/sales.csv");
}

#[tokio::test]
async fn test_export_requires_output_path() {
    let mut workflow = database_workflow();
    assert!(workflow.select_table("events").await);

    assert!(!workflow.can_ingest());
    assert!(!workflow.start_ingestion().await);
    assert_eq!(
        workflow.status().message,
        Some(StatusMessage::warning("Please provide an output file path."))
    );
    assert!(workflow.database().exports().is_empty());
}

#[tokio::test]
async fn test_export_hands_rows_to_sink() {
    let sink = MemorySink::new();
    let mut workflow = database_workflow().with_sink(sink.clone());
    workflow.set_output_path("exports/events.csv");
    workflow.set_delimiter('|');
    assert!(workflow.select_table("events").await);
    workflow.toggle_column("ts");

    assert!(workflow.start_ingestion().await);

    let exports = workflow.database().exports();
    assert_eq!(exports[0].query, None);
    let writes = sink.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].path, "exports/events.csv");
    assert_eq!(writes[0].delimiter, '|');
    assert_eq!(writes[0].columns, vec!["id", "name"]);
    assert_eq!(
        workflow.status().message,
        Some(StatusMessage::success("Successfully processed 2 records"))
    );
}

#[tokio::test]
async fn test_export_writes_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out").join("events.csv");

    let database = FakeDatabase::new()
        .with_table(
            "events",
            vec![
                flatfile_bridge::Column::new("id", "UInt64", false),
                flatfile_bridge::Column::new("name", "Nullable(String)", true),
            ],
        )
        .with_rows(vec![
            vec![json!(1), json!("a,b")],
            vec![json!(2), json!(null)],
        ]);
    let mut workflow = Workflow::new(database, FakeFiles::new()).with_sink(CsvFileSink::new());
    workflow.set_output_path(output.to_string_lossy());
    assert!(workflow.select_table("events").await);
    assert!(workflow.start_ingestion().await);

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written, "id,name\n1,\"a,b\"\n2,\n");
}

#[tokio::test]
async fn test_connection_target_change_clears_tables() {
    let mut workflow = database_workflow();
    assert!(workflow.connect().await);

    workflow.update_connection(|c| c.user = "analyst".to_string());
    assert_eq!(workflow.session().tables().len(), 2);

    workflow.update_connection(|c| c.set_port_input("8123abc"));
    assert_eq!(workflow.session().connection.port, 8123);
    assert!(workflow.session().tables().is_empty());
}
