// ==========================================
// 表格数据导入管道 - 导入层
// ==========================================
// 职责: 解析 → 映射 → 校验 → 提交
// 说明: 各组件无状态，状态统一存放在 ImportSession
// ==========================================

// 模块声明
pub mod dq_validator;
pub mod error;
pub mod events;
pub mod field_mapper;
pub mod file_parser;
pub mod import_executor;
pub mod import_trait;

// 重导出核心类型
pub use dq_validator::{DqValidator, EmailRule, PhoneRule, ZipRule, REQUIRED_FIELD_MESSAGE};
pub use error::{ImportError, ImportResult};
pub use events::{ChannelEventPublisher, ImportEventPublisher, NoOpEventPublisher};
pub use field_mapper::{DuplicateTargetPolicy, FieldMapper};
pub use file_parser::DelimitedTextParser;
pub use import_executor::{ExecutorOptions, ImportExecutor, ImportRun};

// 重导出 Trait 接口
pub use import_trait::{FileParser, FormatRule};
