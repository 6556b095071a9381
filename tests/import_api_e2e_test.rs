// ==========================================
// 导入 API 端到端测试
// ==========================================
// 模拟展示层调用 API 的完整流程: 上传 → 映射 → 校验 → 确认 → 提交 → 重置


use std::sync::Arc;
use tabular_import::api::{ApiError, ImportApi, FINDINGS_WARNING};
use tabular_import::config::{config_keys, ConfigManager};
use tabular_import::domain::{ImportEvent, ImportSession, ImportStatus, ImportStep};
use tabular_import::importer::{ChannelEventPublisher, NoOpEventPublisher};
use tabular_import::logging;
use tabular_import::repository::InMemoryTargetRepository;
use tokio_util::sync::CancellationToken;
use test_helpers::{write_temp_file, CONTACTS_CSV, PEOPLE_CSV};

/// 测试导入 API 完整流程
#[tokio::test]
async fn test_import_api_full_flow() {
    logging::init_test();
    println!("\n=== 测试导入 API 完整流程 ===\n");

    // 步骤 1: 创建 ImportApi
    let target = Arc::new(InMemoryTargetRepository::new());
    let mut api = ImportApi::new(&ConfigManager::new(), Arc::clone(&target)).unwrap();
    assert_eq!(api.session().current_step, ImportStep::Upload);
    println!("✓ 步骤 1: ImportApi 已创建");

    // 步骤 2: 上传文件
    let file = write_temp_file(CONTACTS_CSV, ".csv");
    let report = api.load_file(file.path()).unwrap();
    assert_eq!(report.row_count, 3);
    assert_eq!(report.dropped_row_count, 1);
    assert!(report.file_name.ends_with(".csv"));
    assert_eq!(api.session().current_step, ImportStep::Mapping);
    assert_eq!(api.preview().len(), 3);
    println!("✓ 步骤 2: 文件已装载 ({} 行)", report.row_count);

    // 步骤 3: 自动映射 + 手动补充
    assert_eq!(api.auto_map().unwrap(), 4);
    assert_eq!(api.auto_map().unwrap(), 0);
    api.set_mapping("Notes", Some("address")).unwrap();
    assert_eq!(api.session().mapping.mapped_field_count(), 5);
    println!("✓ 步骤 3: 映射完成");

    // 步骤 4: 校验
    let summary = api.proceed_to_validation().unwrap();
    assert_eq!(summary.total_findings, 4);
    assert_eq!(api.session().current_step, ImportStep::Validation);
    println!("✓ 步骤 4: 校验发现 {} 条", summary.total_findings);

    // 步骤 5: 确认（有发现也允许继续）
    let gate = api.proceed_to_confirm().unwrap();
    assert_eq!(gate.finding_count, 4);
    assert_eq!(gate.warning.as_deref(), Some(FINDINGS_WARNING));
    println!("✓ 步骤 5: 已确认");

    // 步骤 6: 提交
    let (publisher, mut events) = ChannelEventPublisher::channel();
    let result = api.commit(&publisher, &CancellationToken::new()).await.unwrap();
    assert_eq!(result.status, ImportStatus::Completed);
    assert_eq!(result.total_records, 3);
    assert_eq!(result.mapped_field_count, 5);
    assert_eq!(target.len(), 3);

    let mut progress_count = 0;
    let mut last = None;
    while let Ok(event) = events.try_recv() {
        if matches!(event, ImportEvent::Progress(_)) {
            progress_count += 1;
        }
        last = Some(event);
    }
    assert_eq!(progress_count, 3);
    assert!(matches!(last, Some(ImportEvent::Finished(_))));
    println!("✓ 步骤 6: 提交完成 batch_id={}", result.batch_id);

    // 步骤 7: 开始新导入
    api.reset();
    assert_eq!(api.session().current_step, ImportStep::Upload);
    assert!(!api.session().has_data());
    assert!(!api.session().destination_fields.is_empty());
    println!("✓ 步骤 7: 会话已重置");
}

#[test]
fn test_upload_rejections() {
    let mut api =
        ImportApi::new(&ConfigManager::new(), Arc::new(InMemoryTargetRepository::new())).unwrap();

    // 扩展名不支持
    let txt = write_temp_file(PEOPLE_CSV, ".txt");
    assert!(matches!(
        api.load_file(txt.path()),
        Err(ApiError::ImportError(_))
    ));

    // 扩展名大小写不敏感
    let upper = write_temp_file(PEOPLE_CSV, ".CSV");
    assert!(api.load_file(upper.path()).is_ok());

    // 只有表头
    let header_only = write_temp_file("name,email\n", ".csv");
    assert!(matches!(
        api.load_file(header_only.path()),
        Err(ApiError::EmptyFile(_))
    ));

    // 空文件
    assert!(matches!(
        api.load_text("blank.csv", ""),
        Err(ApiError::EmptyFile(_))
    ));
}

#[test]
fn test_mapping_before_upload_is_rejected() {
    let mut api =
        ImportApi::new(&ConfigManager::new(), Arc::new(InMemoryTargetRepository::new())).unwrap();

    assert!(matches!(api.auto_map(), Err(ApiError::InvalidStep { .. })));
    assert!(matches!(
        api.proceed_to_validation(),
        Err(ApiError::InvalidStep { .. })
    ));
}

#[test]
fn test_custom_destination_catalog() {
    let config = ConfigManager::from_json_str(
        r#"{"destination_fields": ["sku", "title", "email"], "required_fields": ["sku"]}"#,
    )
    .unwrap();
    let mut api = ImportApi::new(&config, Arc::new(InMemoryTargetRepository::new())).unwrap();

    api.load_text("items.csv", "SKU,Title\n,Widget\nA-2,Gadget\n")
        .unwrap();
    assert_eq!(api.auto_map().unwrap(), 2);

    let summary = api.proceed_to_validation().unwrap();
    assert_eq!(summary.total_findings, 1);
    assert_eq!(api.session().findings[0].row, 1);
    assert_eq!(api.session().findings[0].field, "sku");
}

#[test]
fn test_session_wire_shape() {
    let mut api =
        ImportApi::new(&ConfigManager::new(), Arc::new(InMemoryTargetRepository::new())).unwrap();
    api.load_text("people.csv", PEOPLE_CSV).unwrap();
    api.auto_map().unwrap();
    api.proceed_to_validation().unwrap();

    let json = api.session().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["fileName"], "people.csv");
    assert_eq!(value["currentStep"], 3);
    assert_eq!(value["findings"][0]["error"], "Invalid email format");
    assert_eq!(value["mapping"].as_array().map(|m| m.len()), Some(2));

    let restored = ImportSession::from_json(&json).unwrap();
    assert_eq!(&restored, api.session());
}

#[tokio::test]
async fn test_configured_row_delay_is_applied() {
    let mut config = ConfigManager::new();
    config.set(config_keys::ROW_DELAY_MS, "10");
    let mut api = ImportApi::new(&config, Arc::new(InMemoryTargetRepository::new())).unwrap();
    api.load_text("people.csv", PEOPLE_CSV).unwrap();
    api.auto_map().unwrap();

    let summary = api
        .commit(&NoOpEventPublisher, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.status, ImportStatus::Completed);
    assert!(summary.elapsed_ms >= 20);
}
