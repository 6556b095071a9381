// ==========================================
// 导入管道集成测试
// ==========================================
// 测试目标: 解析 → 映射 → 校验 → 提交 各组件直接串联
// ==========================================


use std::sync::Arc;
use std::time::Duration;
use tabular_import::domain::{FieldMapping, ImportEvent, ImportStatus};
use tabular_import::importer::*;
use tabular_import::logging;
use tabular_import::repository::InMemoryTargetRepository;
use tokio_util::sync::CancellationToken;
use test_helpers::{FailingTargetRepository, CONTACTS_CSV, PEOPLE_CSV};

fn destination_fields() -> Vec<String> {
    tabular_import::config::DEFAULT_DESTINATION_FIELDS
        .iter()
        .map(|f| f.to_string())
        .collect()
}

#[tokio::test]
async fn test_people_end_to_end() {
    logging::init_test();

    // 1. 解析
    let table = DelimitedTextParser::default().parse_text(PEOPLE_CSV).unwrap();
    assert_eq!(table.headers, vec!["name", "email"]);
    assert_eq!(table.rows.len(), 2);

    // 2. 自动映射
    let mapper = FieldMapper::default();
    let mut mapping = FieldMapping::new();
    let created = mapper.auto_map(&mut mapping, &table.headers, &destination_fields());
    assert_eq!(created, 2);
    assert_eq!(mapping.get("name"), Some("name"));
    assert_eq!(mapping.get("email"), Some("email"));

    // 3. 校验
    let findings = DqValidator::with_defaults().validate(&table.rows, &mapping);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].row, 2);
    assert_eq!(findings[0].field, "email");
    assert_eq!(findings[0].value, "bademail");
    assert_eq!(findings[0].error, "Invalid email format");

    // 4. 提交（校验发现不阻断）
    let target = Arc::new(InMemoryTargetRepository::new());
    let executor = ImportExecutor::new(Arc::clone(&target), ExecutorOptions::default());
    let summary = executor
        .commit(&table.rows, &mapping, &NoOpEventPublisher, &CancellationToken::new())
        .await;

    assert_eq!(summary.total_records, 2);
    assert_eq!(summary.mapped_field_count, 2);
    assert_eq!(summary.status, ImportStatus::Completed);
    assert_eq!(summary.succeeded, 2);

    let records = target.records().unwrap();
    assert_eq!(records[1].1["email"], "bademail");
}

#[test]
fn test_contacts_findings_in_row_then_rule_order() {
    let table = DelimitedTextParser::default().parse_text(CONTACTS_CSV).unwrap();

    // 空白行跳过，Dave 行列数不足被丢弃
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.dropped_rows.len(), 1);
    assert_eq!(table.dropped_rows[0].actual_fields, 4);

    let mut mapping = FieldMapping::new();
    let created = FieldMapper::default().auto_map(&mut mapping, &table.headers, &destination_fields());
    assert_eq!(created, 4); // Notes 无对应目标字段
    assert!(mapping.get("Notes").is_none());

    let validator = DqValidator::with_defaults();
    let findings = validator.validate(&table.rows, &mapping);

    let compact: Vec<(usize, &str, &str)> = findings
        .iter()
        .map(|f| (f.row, f.field.as_str(), f.error.as_str()))
        .collect();
    assert_eq!(
        compact,
        vec![
            (2, "email", "Invalid email format"),
            (2, "phone", "Invalid phone format"),
            (2, "zip", "Invalid zip code format"),
            (3, "name", "Required field cannot be empty"),
        ]
    );
    assert_eq!(findings[3].value, "");

    let summary = validator.summarize(&findings);
    assert_eq!(summary.total_findings, 4);
    assert_eq!(summary.affected_rows, 2);
    assert_eq!(summary.by_field.get("email"), Some(&1));
}

#[test]
fn test_unmapped_fields_are_not_checked() {
    let table = DelimitedTextParser::default().parse_text(CONTACTS_CSV).unwrap();

    let mut mapping = FieldMapping::new();
    mapping.upsert("Name", "name");

    let findings = DqValidator::with_defaults().validate(&table.rows, &mapping);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].field, "name");
}

#[test]
fn test_validation_is_deterministic() {
    let table = DelimitedTextParser::default().parse_text(CONTACTS_CSV).unwrap();
    let mut mapping = FieldMapping::new();
    FieldMapper::default().auto_map(&mut mapping, &table.headers, &destination_fields());

    let validator = DqValidator::with_defaults();
    assert_eq!(
        validator.validate(&table.rows, &mapping),
        validator.validate(&table.rows, &mapping)
    );
}

#[tokio::test]
async fn test_progress_stream_and_row_failures() {
    let table = DelimitedTextParser::default()
        .parse_text(&test_helpers::generate_people_csv(4))
        .unwrap();
    let mut mapping = FieldMapping::new();
    FieldMapper::default().auto_map(&mut mapping, &table.headers, &destination_fields());

    let target = Arc::new(FailingTargetRepository::failing_on(&[3]));
    let executor = ImportExecutor::new(Arc::clone(&target), ExecutorOptions::default());
    let (publisher, mut events) = ChannelEventPublisher::channel();

    let summary = executor
        .commit(&table.rows, &mapping, &publisher, &CancellationToken::new())
        .await;

    assert_eq!(summary.status, ImportStatus::Completed);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].row, 3);
    assert_eq!(target.written_rows(), vec![1, 2, 4]);

    let mut percents = Vec::new();
    let mut finished = None;
    while let Ok(event) = events.try_recv() {
        match event {
            ImportEvent::Progress(p) => percents.push(p.percent_complete),
            ImportEvent::Finished(s) => finished = Some(s),
        }
    }
    assert_eq!(percents, vec![25, 50, 75, 100]);
    assert_eq!(finished.map(|s| s.batch_id), Some(summary.batch_id));
}

#[tokio::test]
async fn test_cancel_mid_run_stops_before_next_row() {
    let table = DelimitedTextParser::default()
        .parse_text(&test_helpers::generate_people_csv(50))
        .unwrap();
    let mut mapping = FieldMapping::new();
    FieldMapper::default().auto_map(&mut mapping, &table.headers, &destination_fields());

    let target = Arc::new(InMemoryTargetRepository::new());
    let executor = Arc::new(ImportExecutor::new(
        Arc::clone(&target),
        ExecutorOptions::with_row_delay(Duration::from_millis(5)),
    ));

    let mut run = executor.spawn_commit(table.rows.clone(), mapping);

    // 收到第 3 行进度后取消
    while let Some(event) = run.events.recv().await {
        if let ImportEvent::Progress(p) = event {
            if p.rows_processed == 3 {
                run.cancel();
                break;
            }
        }
    }

    let summary = run.wait().await.unwrap();
    assert_eq!(summary.status, ImportStatus::Cancelled);
    assert!(summary.rows_processed >= 3);
    assert!(summary.rows_processed < summary.total_records);
    assert_eq!(target.len(), summary.rows_processed);
}

#[test]
fn test_tab_delimited_input() {
    let table = DelimitedTextParser::new(b'\t')
        .parse_text("name\temail\nAlice\ta@b.com\n")
        .unwrap();

    assert_eq!(table.headers, vec!["name", "email"]);
    assert_eq!(table.rows[0]["email"], "a@b.com");
}
