// ==========================================
// 表格数据导入管道 - 导入会话
// ==========================================
// 职责: 一次导入的全部可变状态（由外部展示层持有生命周期）
// 红线: 会话不读写任何持久化机制，序列化形态由调用方自行缓存
// ==========================================

use crate::domain::import::{DataRow, DroppedRow, ParsedTable, ValidationFinding};
use crate::domain::mapping::FieldMapping;
use serde::{Deserialize, Serialize};

/// 导入向导步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ImportStep {
    #[default]
    Upload = 1,
    Mapping = 2,
    Validation = 3,
    Confirm = 4,
}

impl ImportStep {
    pub fn as_str(&self) -> &str {
        match self {
            ImportStep::Upload => "upload",
            ImportStep::Mapping => "mapping",
            ImportStep::Validation => "validation",
            ImportStep::Confirm => "confirm",
        }
    }
}

impl From<ImportStep> for u8 {
    fn from(step: ImportStep) -> Self {
        step as u8
    }
}

impl TryFrom<u8> for ImportStep {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ImportStep::Upload),
            2 => Ok(ImportStep::Mapping),
            3 => Ok(ImportStep::Validation),
            4 => Ok(ImportStep::Confirm),
            other => Err(format!("未知导入步骤: {}", other)),
        }
    }
}

// ==========================================
// ImportSession - 导入会话
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSession {
    pub headers: Vec<String>,
    pub rows: Vec<DataRow>,
    pub file_name: String,
    pub destination_fields: Vec<String>, // 目标字段目录（由外部 schema 注入）
    pub mapping: FieldMapping,
    pub findings: Vec<ValidationFinding>,
    #[serde(default)]
    pub dropped_rows: Vec<DroppedRow>,
    pub current_step: ImportStep,
}

impl ImportSession {
    /// 创建空会话
    pub fn new(destination_fields: Vec<String>) -> Self {
        Self {
            destination_fields,
            ..Self::default()
        }
    }

    /// 装载解析结果（新文件会清空旧的映射与校验结果）
    pub fn load_table(&mut self, file_name: impl Into<String>, table: ParsedTable) {
        self.headers = table.headers;
        self.rows = table.rows;
        self.dropped_rows = table.dropped_rows;
        self.file_name = file_name.into();
        self.mapping.clear();
        self.findings.clear();
    }

    /// "开始新导入": 清空数据/映射/校验结果，回到上传步骤；目标字段目录保留
    pub fn reset(&mut self) {
        self.headers.clear();
        self.rows.clear();
        self.file_name.clear();
        self.mapping.clear();
        self.findings.clear();
        self.dropped_rows.clear();
        self.current_step = ImportStep::Upload;
    }

    pub fn has_data(&self) -> bool {
        !self.headers.is_empty() && !self.rows.is_empty()
    }

    /// 预览前 limit 行
    pub fn preview(&self, limit: usize) -> &[DataRow] {
        let end = limit.min(self.rows.len());
        &self.rows[..end]
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}
