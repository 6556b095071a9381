// ==========================================
// 表格数据导入管道 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供导入目标的写入接口，屏蔽真实存储细节
// ==========================================

pub mod error;
pub mod import_target_repo;
pub mod memory_target_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use import_target_repo::ImportTargetRepository;
pub use memory_target_repo::InMemoryTargetRepository;
