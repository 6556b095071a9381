// ==========================================
// 表格数据导入管道 - 导入领域模型
// ==========================================
// 职责: 解析结果、校验发现、提交进度与汇总
// 红线: 只描述数据，不含解析/校验/提交逻辑
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 原始数据行（列名 → 原始字符串值，解析阶段不做类型推断）
pub type DataRow = HashMap<String, String>;

/// 映射后的记录（目标字段 → 值，按字段名排序，保证写入顺序确定）
pub type MappedRecord = BTreeMap<String, String>;

// ==========================================
// ParsedTable - 解析结果
// ==========================================
// 不变量: rows 中每一行的键集合 == headers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTable {
    pub headers: Vec<String>,          // 表头（顺序即列对齐顺序）
    pub rows: Vec<DataRow>,            // 数据行（保持文件顺序）
    pub dropped_rows: Vec<DroppedRow>, // 因列数不符被丢弃的行
}

impl ParsedTable {
    /// 表头与数据行都非空才算可用
    pub fn is_usable(&self) -> bool {
        !self.headers.is_empty() && !self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// 被丢弃的畸形行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedRow {
    pub line_number: u64,      // 源文本物理行号（1 起）
    pub expected_fields: usize, // 表头列数
    pub actual_fields: usize,   // 实际列数
}

// ==========================================
// ValidationFinding - 校验发现
// ==========================================
// 说明: 仅为提示，不阻断提交
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub row: usize,     // 行号（1 起，面向用户）
    pub field: String,  // 目标字段
    pub value: String,  // 违规原始值
    pub error: String,  // 错误描述
}

/// 校验汇总（DQ 报告摘要）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total_findings: usize,
    pub affected_rows: usize,
    pub by_field: BTreeMap<String, usize>,
}

// ==========================================
// 提交进度与汇总
// ==========================================

/// 单行提交后的进度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportProgress {
    pub rows_processed: usize,
    pub total_rows: usize,
    pub percent_complete: u8,
}

impl ImportProgress {
    /// percent = round(processed / total * 100)
    ///
    /// 只有最后一行完成时才为 100（未完成时上限 99），total 为 0 时视为 100
    pub fn new(rows_processed: usize, total_rows: usize) -> Self {
        let percent_complete = if total_rows == 0 || rows_processed >= total_rows {
            100
        } else {
            let rounded = ((rows_processed as f64 / total_rows as f64) * 100.0).round() as u8;
            rounded.min(99)
        };
        Self {
            rows_processed,
            total_rows,
            percent_complete,
        }
    }
}

/// 导入运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Completed,
    Cancelled,
}

impl ImportStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ImportStatus::Completed => "completed",
            ImportStatus::Cancelled => "cancelled",
        }
    }
}

/// 单行写入失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    pub row: usize, // 行号（1 起）
    pub message: String,
}

/// 导入汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub batch_id: String,              // 批次 ID（UUID，每次提交新生成）
    pub total_records: usize,          // 总行数
    pub rows_processed: usize,         // 已处理行数（取消时 < total_records）
    pub succeeded: usize,              // 写入成功行数
    pub failed: usize,                 // 写入失败行数
    pub mapped_field_count: usize,     // 已映射字段数
    pub status: ImportStatus,
    pub failures: Vec<RowFailure>,     // 失败明细
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// 提交过程中发布的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ImportEvent {
    Progress(ImportProgress),
    Finished(ImportSummary),
}

impl ImportEvent {
    pub fn as_str(&self) -> &str {
        match self {
            ImportEvent::Progress(_) => "Progress",
            ImportEvent::Finished(_) => "Finished",
        }
    }
}
