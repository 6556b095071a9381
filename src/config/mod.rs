// ==========================================
// 表格数据导入管道 - 配置层
// ==========================================
// 职责: 导入配置管理，支持多级覆写
// 存储: JSON 文件 → 环境变量 → 内置默认值
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, DEFAULT_DESTINATION_FIELDS};
pub use import_config_trait::ImportConfigReader;
