// ==========================================
// 表格数据导入管道 - API 层
// ==========================================
// 职责: 提供会话驱动的导入接口，供展示层（CLI / 桌面壳）调用
// ==========================================

pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{ConfirmGate, ImportApi, LoadReport, FINDINGS_WARNING};
