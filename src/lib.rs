// ==========================================
// 表格数据导入管道 - 核心库
// ==========================================
// 流程: 解析 → 字段映射 → 数据质量校验 → 逐行提交
// 系统定位: 校验只提示不阻断，最终是否导入由用户决定
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 数据结构与会话
pub mod domain;

// 数据仓储层 - 导入目标
pub mod repository;

// 导入层 - 解析/映射/校验/提交
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 会话驱动接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    DataRow, FieldMapping, ImportEvent, ImportProgress, ImportSession, ImportStatus, ImportStep,
    ImportSummary, ParsedTable, ValidationFinding,
};

// 导入组件
pub use importer::{
    DelimitedTextParser, DqValidator, FieldMapper, ImportError, ImportExecutor, ImportResult,
};

// API
pub use api::{ApiError, ApiResult, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "tabular-import";
