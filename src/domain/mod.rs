// ==========================================
// 表格数据导入管道 - 领域模型层
// ==========================================
// 职责: 定义导入数据结构、映射表、会话
// 红线: 不含解析/校验/提交逻辑
// ==========================================

pub mod import;
pub mod mapping;
pub mod session;

// 重导出核心类型
pub use import::{
    DataRow, DroppedRow, ImportEvent, ImportProgress, ImportStatus, ImportSummary, MappedRecord,
    ParsedTable, RowFailure, ValidationFinding, ValidationSummary,
};
pub use mapping::{FieldMapping, MappingEntry};
pub use session::{ImportSession, ImportStep};
