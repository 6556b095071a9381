// ==========================================
// 表格数据导入管道 - 命令行入口
// ==========================================
// 流程: 加载配置 → 解析文件 → 自动/手动映射 → 校验 → 提交 → 输出汇总
// 输出: stdout 为 JSON 结果，stderr 为日志与进度
// ==========================================

use anyhow::Context;
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tabular_import::api::ImportApi;
use tabular_import::config::{config_keys, ConfigManager};
use tabular_import::domain::ImportEvent;
use tabular_import::logging;
use tabular_import::repository::InMemoryTargetRepository;

/// 表格文件导入工具
#[derive(Debug, Parser)]
#[command(name = "tabular-import", version, about = "Map, validate and import delimited text files")]
struct Args {
    /// 待导入文件
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// 配置文件（默认读取用户配置目录下的 tabular-import/config.json）
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// 显式映射，可重复: --map "E-Mail=email"
    #[arg(long = "map", value_name = "SRC=DST", value_parser = parse_mapping)]
    mappings: Vec<(String, String)>,

    /// 不按列名自动映射
    #[arg(long)]
    no_auto_map: bool,

    /// 每行提交前的等待毫秒数（覆盖配置）
    #[arg(long, value_name = "N")]
    delay_ms: Option<u64>,

    /// 把最终会话写入 JSON 文件
    #[arg(long, value_name = "PATH")]
    session_out: Option<PathBuf>,

    /// 日志输出为 JSON 行
    #[arg(long)]
    log_json: bool,
}

fn parse_mapping(raw: &str) -> Result<(String, String), String> {
    let (source, destination) = raw
        .split_once('=')
        .ok_or_else(|| format!("映射格式应为 SRC=DST: {}", raw))?;
    if source.trim().is_empty() {
        return Err(format!("源列名不能为空: {}", raw));
    }
    Ok((source.trim().to_string(), destination.trim().to_string()))
}

fn load_config(args: &Args) -> anyhow::Result<ConfigManager> {
    let mut config = match &args.config {
        Some(path) => ConfigManager::from_file(path)?.with_env_overrides(),
        None => ConfigManager::load_default()?,
    };
    if let Some(delay_ms) = args.delay_ms {
        config.set(config_keys::ROW_DELAY_MS, delay_ms.to_string());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.log_json);

    tracing::info!("==================================================");
    tracing::info!("表格数据导入 - 版本 {}", tabular_import::VERSION);
    tracing::info!("==================================================");

    let config = load_config(&args)?;
    let target = Arc::new(InMemoryTargetRepository::new());
    let mut api = ImportApi::new(&config, Arc::clone(&target))?;

    // 1. 上传
    let load = api
        .load_file(&args.file)
        .with_context(|| format!("无法装载 {}", args.file.display()))?;

    // 2. 映射
    if !args.no_auto_map {
        api.auto_map()?;
    }
    for (source, destination) in &args.mappings {
        let destination = Some(destination.as_str()).filter(|d| !d.is_empty());
        api.set_mapping(source, destination)?;
    }

    // 3. 校验
    let validation = api.proceed_to_validation()?;
    for finding in &api.session().findings {
        eprintln!(
            "row {}: {} = {:?}: {}",
            finding.row, finding.field, finding.value, finding.error
        );
    }

    // 4. 确认
    let gate = api.proceed_to_confirm()?;
    if let Some(warning) = &gate.warning {
        eprintln!("{}", warning);
    }

    // 5. 提交（Ctrl+C 在下一行写入前取消）
    let mut run = api.spawn_commit()?;
    let cancel = run.cancel.clone();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;
    loop {
        tokio::select! {
            event = run.events.recv() => match event {
                Some(ImportEvent::Progress(progress)) => {
                    eprint!(
                        "\rImporting {}/{} ({}%)",
                        progress.rows_processed, progress.total_rows, progress.percent_complete
                    );
                }
                Some(ImportEvent::Finished(_)) | None => break,
            },
            signal = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                if signal.is_ok() {
                    tracing::warn!("收到 Ctrl+C，取消导入");
                    cancel.cancel();
                }
            }
        }
    }
    eprintln!();
    let summary = run.wait().await?;

    let output = json!({
        "load": load,
        "validation": validation,
        "findings": api.session().findings,
        "confirm": gate,
        "summary": summary,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if let Some(path) = &args.session_out {
        std::fs::write(path, api.session().to_json()?)
            .with_context(|| format!("无法写入会话文件 {}", path.display()))?;
        tracing::info!(path = %path.display(), "会话已保存");
    }

    tracing::info!(written = target.len(), "导入结束");
    Ok(())
}
