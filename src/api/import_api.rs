// ==========================================
// 表格数据导入管道 - 导入API
// ==========================================
// 职责: 以会话为中心封装 上传 → 映射 → 校验 → 确认 → 提交
// 说明: 会话生命周期由展示层持有；API 只负责步骤门禁与组件编排
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ImportConfigReader;
use crate::domain::import::{DataRow, ImportSummary, ParsedTable, ValidationSummary};
use crate::domain::session::{ImportSession, ImportStep};
use crate::importer::{
    DelimitedTextParser, DqValidator, ExecutorOptions, FieldMapper, FileParser, ImportError,
    ImportEventPublisher, ImportExecutor, ImportRun,
};
use crate::repository::ImportTargetRepository;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// 带校验发现进入确认步骤时给出的提示
pub const FINDINGS_WARNING: &str =
    "You're proceeding with data that has validation errors. This may cause issues.";

/// 上传结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub file_name: String,
    pub headers: Vec<String>,
    pub row_count: usize,
    /// 因列数不符被丢弃的行数
    pub dropped_row_count: usize,
}

/// 确认步骤的门禁信息（只提示，不阻断）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmGate {
    pub row_count: usize,
    pub mapped_field_count: usize,
    pub finding_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// 导入API
pub struct ImportApi<R>
where
    R: ImportTargetRepository + 'static,
{
    session: ImportSession,
    parser: DelimitedTextParser,
    mapper: FieldMapper,
    validator: DqValidator,
    executor: Arc<ImportExecutor<R>>,
    allowed_extensions: Vec<String>,
    preview_row_limit: usize,
}

impl<R> ImportApi<R>
where
    R: ImportTargetRepository + 'static,
{
    /// 按配置创建 ImportApi（空会话）
    pub fn new(config: &dyn ImportConfigReader, target: Arc<R>) -> ApiResult<Self> {
        let session = ImportSession::new(config.get_destination_fields()?);
        Self::with_session(config, target, session)
    }

    /// 用展示层缓存的会话恢复 ImportApi
    pub fn with_session(
        config: &dyn ImportConfigReader,
        target: Arc<R>,
        session: ImportSession,
    ) -> ApiResult<Self> {
        let options = ExecutorOptions::with_row_delay(config.get_row_delay()?);

        Ok(Self {
            session,
            parser: DelimitedTextParser::new(config.get_delimiter()?),
            mapper: FieldMapper::new(config.get_duplicate_target_policy()?),
            validator: DqValidator::with_required_fields(config.get_required_fields()?),
            executor: Arc::new(ImportExecutor::new(target, options)),
            allowed_extensions: config.get_allowed_extensions()?,
            preview_row_limit: config.get_preview_row_limit()?,
        })
    }

    // ==========================================
    // 上传
    // ==========================================

    /// 装载原始文本
    ///
    /// # 返回
    /// - Err(EmptyFile): 解析后没有表头或没有数据行（会话保持不变）
    #[instrument(skip(self, raw_text), fields(bytes = raw_text.len()))]
    pub fn load_text(&mut self, file_name: &str, raw_text: &str) -> ApiResult<LoadReport> {
        let table = self.parser.parse_text(raw_text)?;
        self.accept_table(file_name, table)
    }

    /// 从文件装载（检查存在性与扩展名）
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn load_file(&mut self, path: &Path) -> ApiResult<LoadReport> {
        let table = self.parser.parse_file(path, &self.allowed_extensions)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.accept_table(&file_name, table)
    }

    fn accept_table(&mut self, file_name: &str, table: ParsedTable) -> ApiResult<LoadReport> {
        if !table.is_usable() {
            warn!(file_name = %file_name, "文件没有可用数据");
            return Err(ApiError::EmptyFile(file_name.to_string()));
        }

        if !table.dropped_rows.is_empty() {
            warn!(
                file_name = %file_name,
                dropped = table.dropped_rows.len(),
                "部分行因列数不符被丢弃"
            );
        }

        let report = LoadReport {
            file_name: file_name.to_string(),
            headers: table.headers.clone(),
            row_count: table.row_count(),
            dropped_row_count: table.dropped_rows.len(),
        };

        self.session.load_table(file_name, table);
        self.session.current_step = ImportStep::Mapping;

        info!(
            file_name = %report.file_name,
            rows = report.row_count,
            columns = report.headers.len(),
            "文件装载完成"
        );
        Ok(report)
    }

    /// 预览前若干行
    pub fn preview(&self) -> &[DataRow] {
        self.session.preview(self.preview_row_limit)
    }

    // ==========================================
    // 映射
    // ==========================================

    /// 设置或取消单列映射
    ///
    /// # 参数
    /// - source: 源列名（必须是当前表头之一）
    /// - destination: 目标字段（必须在目标字段目录中）；None 表示取消
    ///
    /// # 说明
    /// 映射实际变化时已有校验结果失效，步骤回到 Mapping
    pub fn set_mapping(&mut self, source: &str, destination: Option<&str>) -> ApiResult<()> {
        self.require_data()?;

        if !self.session.headers.iter().any(|h| h == source) {
            return Err(ApiError::InvalidInput(format!("未知源列: {}", source)));
        }

        if let Some(dest) = destination.map(str::trim).filter(|d| !d.is_empty()) {
            if !self.session.destination_fields.iter().any(|f| f == dest) {
                return Err(ImportError::UnknownDestination(dest.to_string()).into());
            }
        }

        let changed = self
            .mapper
            .set_mapping(&mut self.session.mapping, source, destination)?;
        if changed {
            self.invalidate_findings();
        }
        Ok(())
    }

    /// 按名称自动映射
    ///
    /// # 返回
    /// - 本次新建或变更的映射条数
    pub fn auto_map(&mut self) -> ApiResult<usize> {
        self.require_data()?;

        let changed = self.mapper.auto_map(
            &mut self.session.mapping,
            &self.session.headers,
            &self.session.destination_fields,
        );
        if changed > 0 {
            self.invalidate_findings();
        }
        Ok(changed)
    }

    fn invalidate_findings(&mut self) {
        self.session.findings.clear();
        if self.session.current_step > ImportStep::Mapping {
            self.session.current_step = ImportStep::Mapping;
        }
    }

    // ==========================================
    // 校验与确认
    // ==========================================

    /// 进入校验步骤: 至少映射一个字段，然后执行数据质量校验
    #[instrument(skip(self))]
    pub fn proceed_to_validation(&mut self) -> ApiResult<ValidationSummary> {
        self.require_data()?;
        if self.session.mapping.is_empty() {
            return Err(ApiError::NoFieldsMapped);
        }

        let findings = self
            .validator
            .validate(&self.session.rows, &self.session.mapping);
        let summary = self.validator.summarize(&findings);

        self.session.findings = findings;
        self.session.current_step = ImportStep::Validation;

        info!(
            total_findings = summary.total_findings,
            affected_rows = summary.affected_rows,
            "进入校验步骤"
        );
        Ok(summary)
    }

    /// 进入确认步骤（存在校验发现时只给出提示）
    ///
    /// # 返回
    /// - Err(InvalidStep): 尚未完成校验，或会话没有数据
    /// - Err(NoFieldsMapped): 映射为空（例如恢复的会话缓存被改动过）
    pub fn proceed_to_confirm(&mut self) -> ApiResult<ConfirmGate> {
        if self.session.current_step < ImportStep::Validation {
            return Err(ApiError::InvalidStep {
                current: self.session.current_step.as_str().to_string(),
                required: ImportStep::Validation.as_str().to_string(),
            });
        }
        self.require_data()?;
        if self.session.mapping.is_empty() {
            return Err(ApiError::NoFieldsMapped);
        }

        let finding_count = self.session.findings.len();
        if finding_count > 0 {
            warn!(finding_count = finding_count, "带校验发现进入确认步骤");
        }

        self.session.current_step = ImportStep::Confirm;
        Ok(ConfirmGate {
            row_count: self.session.rows.len(),
            mapped_field_count: self.session.mapping.mapped_field_count(),
            finding_count,
            warning: (finding_count > 0).then(|| FINDINGS_WARNING.to_string()),
        })
    }

    // ==========================================
    // 提交
    // ==========================================

    /// 在当前任务内提交
    pub async fn commit(
        &self,
        publisher: &dyn ImportEventPublisher,
        cancel: &CancellationToken,
    ) -> ApiResult<ImportSummary> {
        self.require_committable()?;
        Ok(self
            .executor
            .commit(&self.session.rows, &self.session.mapping, publisher, cancel)
            .await)
    }

    /// 在后台任务中提交，返回可观察、可取消的运行句柄
    pub fn spawn_commit(&self) -> ApiResult<ImportRun> {
        self.require_committable()?;
        Ok(self
            .executor
            .spawn_commit(self.session.rows.clone(), self.session.mapping.clone()))
    }

    fn require_committable(&self) -> ApiResult<()> {
        if self.session.rows.is_empty() {
            return Err(ApiError::NoRowsToImport);
        }
        if self.session.mapping.is_empty() {
            return Err(ApiError::NoFieldsMapped);
        }
        Ok(())
    }

    fn require_data(&self) -> ApiResult<()> {
        if self.session.has_data() {
            Ok(())
        } else {
            Err(ApiError::InvalidStep {
                current: self.session.current_step.as_str().to_string(),
                required: ImportStep::Mapping.as_str().to_string(),
            })
        }
    }

    // ==========================================
    // 会话
    // ==========================================

    /// 开始新导入
    pub fn reset(&mut self) {
        self.session.reset();
        info!("导入会话已重置");
    }

    pub fn session(&self) -> &ImportSession {
        &self.session
    }
}
