// ==========================================
// 表格数据导入管道 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把导入层错误转换为面向展示层的错误
// 说明: 校验发现不是错误，确认步骤永不因发现而阻断
// ==========================================

use crate::importer::error::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 步骤门禁错误
    // ==========================================
    #[error("文件为空或无有效数据: {0}")]
    EmptyFile(String),

    #[error("未映射任何字段，至少需要映射一个字段")]
    NoFieldsMapped,

    #[error("没有可导入的数据行")]
    NoRowsToImport,

    #[error("当前步骤不允许该操作: current={current}, required={required}")]
    InvalidStep { current: String, required: String },

    // ==========================================
    // 业务输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("目标字段已被占用: {destination}（已映射自 {existing_source}）")]
    DuplicateTarget {
        destination: String,
        existing_source: String,
    },

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::DuplicateTarget {
                destination,
                existing_source,
            } => ApiError::DuplicateTarget {
                destination,
                existing_source,
            },
            ImportError::UnknownDestination(field) => {
                ApiError::InvalidInput(format!("未知目标字段: {}", field))
            }
            e @ (ImportError::ConfigReadError { .. } | ImportError::ConfigValueError { .. }) => {
                ApiError::ConfigError(e.to_string())
            }
            ImportError::InternalError(msg) => ApiError::InternalError(msg),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
