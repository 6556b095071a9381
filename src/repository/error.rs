// ==========================================
// 表格数据导入管道 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 单行写入失败由执行器记录到汇总，不中断批次
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 写入错误 =====
    #[error("写入被拒绝 (行 {row}): {message}")]
    WriteRejected { row: usize, message: String },

    #[error("存储锁获取失败: {0}")]
    LockError(String),
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
