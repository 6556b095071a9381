// ==========================================
// 表格数据导入管道 - 导入目标 Repository Trait
// ==========================================
// 职责: 定义"写入一行"的存储接口（不包含业务逻辑）
// 红线: Repository 不含校验规则，只做写入
// ==========================================

use crate::domain::import::MappedRecord;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ImportTargetRepository Trait
// ==========================================
// 用途: 导入执行器逐行写入的目标存储
// 实现者: InMemoryTargetRepository（参考实现，总是成功）
#[async_trait]
pub trait ImportTargetRepository: Send + Sync {
    /// 写入一行映射后的记录
    ///
    /// # 参数
    /// - row_number: 行号（1 起，用于失败定位）
    /// - record: 目标字段 → 值
    ///
    /// # 返回
    /// - Ok(()): 写入成功
    /// - Err: 该行写入失败（执行器记录后继续处理后续行）
    async fn write_row(&self, row_number: usize, record: &MappedRecord) -> RepositoryResult<()>;
}
