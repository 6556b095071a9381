// ==========================================
// 表格数据导入管道 - 导入执行器实现
// ==========================================
// 职责: 逐行提交映射后的数据，发布进度，生成汇总
// 流程: 检查取消 → 映射 → 写入一行 → 记录成败 → 发布进度
// 红线: 严格顺序写入，不并发、不重试、不跳过；单行失败不中断批次
// ==========================================

use crate::domain::import::{
    DataRow, ImportEvent, ImportProgress, ImportStatus, ImportSummary, RowFailure,
};
use crate::domain::mapping::FieldMapping;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::events::{ChannelEventPublisher, ImportEventPublisher};
use crate::repository::ImportTargetRepository;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// 执行器选项
#[derive(Debug, Clone, Default)]
pub struct ExecutorOptions {
    /// 每行写入前的等待时间（展示节奏用，默认 0）
    pub row_delay: Duration,
}

impl ExecutorOptions {
    pub fn with_row_delay(row_delay: Duration) -> Self {
        Self { row_delay }
    }
}

// ==========================================
// ImportExecutor - 导入执行器
// ==========================================
// 说明: 执行器本身不保存任何运行状态，多会话并发提交互不影响
pub struct ImportExecutor<R>
where
    R: ImportTargetRepository,
{
    target: Arc<R>,
    options: ExecutorOptions,
}

impl<R> ImportExecutor<R>
where
    R: ImportTargetRepository + 'static,
{
    pub fn new(target: Arc<R>, options: ExecutorOptions) -> Self {
        Self { target, options }
    }

    /// 提交一批数据
    ///
    /// # 参数
    /// - rows: 解析后的数据行（按文件顺序）
    /// - mapping: 当前字段映射
    /// - publisher: 进度事件发布者
    /// - cancel: 取消令牌（可打断行间等待；每行写入前检查）
    ///
    /// # 返回
    /// - ImportSummary: 完成或取消时的汇总（写入失败记录在 failures 中）
    ///
    /// # 事件
    /// - 每处理一行发布一次 Progress
    /// - 最后发布一次 Finished
    #[instrument(skip_all, fields(total_rows = rows.len(), batch_id))]
    pub async fn commit(
        &self,
        rows: &[DataRow],
        mapping: &FieldMapping,
        publisher: &dyn ImportEventPublisher,
        cancel: &CancellationToken,
    ) -> ImportSummary {
        let start_time = Instant::now();
        let started_at = Utc::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let total_rows = rows.len();
        let mapped_field_count = mapping.mapped_field_count();
        info!(
            batch_id = %batch_id,
            total_rows = total_rows,
            mapped_fields = mapped_field_count,
            "开始提交导入批次"
        );

        let mut rows_processed = 0;
        let mut succeeded = 0;
        let mut failures = Vec::new();
        let mut status = ImportStatus::Completed;

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 1;

            // 行间挂起，让观察方有机会消费进度/发出取消
            if self.options.row_delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.options.row_delay) => {}
                }
            }

            if cancel.is_cancelled() {
                status = ImportStatus::Cancelled;
                info!(
                    rows_processed = rows_processed,
                    total_rows = total_rows,
                    "导入已取消"
                );
                break;
            }

            let record = mapping.map_row(row);
            match self.target.write_row(row_number, &record).await {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    warn!(row_number = row_number, error = %e, "行写入失败，继续处理后续行");
                    failures.push(RowFailure {
                        row: row_number,
                        message: e.to_string(),
                    });
                }
            }

            rows_processed += 1;
            let progress = ImportProgress::new(rows_processed, total_rows);
            if rows_processed % 10 == 1 || rows_processed == total_rows {
                debug!(
                    rows_processed = rows_processed,
                    total_rows = total_rows,
                    percent = progress.percent_complete,
                    "导入进度"
                );
            }
            if let Err(e) = publisher.publish(ImportEvent::Progress(progress)) {
                debug!(error = %e, "进度事件发布失败");
            }
        }

        let elapsed = start_time.elapsed();
        let summary = ImportSummary {
            batch_id,
            total_records: total_rows,
            rows_processed,
            succeeded,
            failed: failures.len(),
            mapped_field_count,
            status,
            failures,
            started_at,
            finished_at: Utc::now(),
            elapsed_ms: elapsed.as_millis() as u64,
        };

        info!(
            status = summary.status.as_str(),
            succeeded = summary.succeeded,
            failed = summary.failed,
            elapsed_ms = summary.elapsed_ms,
            "导入批次结束"
        );

        if let Err(e) = publisher.publish(ImportEvent::Finished(summary.clone())) {
            debug!(error = %e, "完成事件发布失败");
        }

        summary
    }

    /// 在后台任务中提交，返回可观察、可取消的运行句柄
    pub fn spawn_commit(self: &Arc<Self>, rows: Vec<DataRow>, mapping: FieldMapping) -> ImportRun {
        let (publisher, events) = ChannelEventPublisher::channel();
        let cancel = CancellationToken::new();

        let executor = Arc::clone(self);
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            executor
                .commit(&rows, &mapping, &publisher, &task_cancel)
                .await
        });

        ImportRun {
            events,
            cancel,
            handle,
        }
    }
}

// ==========================================
// ImportRun - 后台提交句柄
// ==========================================
pub struct ImportRun {
    /// 进度事件流（以 Finished 结束）
    pub events: mpsc::UnboundedReceiver<ImportEvent>,
    /// 取消令牌
    pub cancel: CancellationToken,
    handle: JoinHandle<ImportSummary>,
}

impl ImportRun {
    /// 请求取消（打断行间等待，在下一行写入前生效）
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// 等待后台提交结束
    pub async fn wait(self) -> ImportResult<ImportSummary> {
        self.handle
            .await
            .map_err(|e| ImportError::InternalError(format!("导入任务异常结束: {}", e)))
    }
}
