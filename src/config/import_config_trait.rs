// ==========================================
// 表格数据导入管道 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入管道所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::error::ImportResult;
use crate::importer::field_mapper::DuplicateTargetPolicy;
use std::time::Duration;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入管道各阶段的配置读取接口
// 实现者: ConfigManager（文件 + 环境变量 + 默认值）
pub trait ImportConfigReader: Send + Sync {
    // ===== 目标 schema 配置 =====

    /// 获取目标字段目录
    ///
    /// # 默认值
    /// - [id, name, email, phone, address, city, state, zip, country, created_at, updated_at]
    fn get_destination_fields(&self) -> ImportResult<Vec<String>>;

    /// 获取必填字段
    ///
    /// # 默认值
    /// - [name, email]
    fn get_required_fields(&self) -> ImportResult<Vec<String>>;

    // ===== 解析配置 =====

    /// 获取列分隔符（单个 ASCII 字符）
    ///
    /// # 默认值
    /// - ','
    fn get_delimiter(&self) -> ImportResult<u8>;

    /// 获取允许的文件扩展名
    ///
    /// # 默认值
    /// - [csv]
    fn get_allowed_extensions(&self) -> ImportResult<Vec<String>>;

    /// 获取预览行数
    ///
    /// # 默认值
    /// - 5
    fn get_preview_row_limit(&self) -> ImportResult<usize>;

    // ===== 映射配置 =====

    /// 获取重复目标字段策略
    ///
    /// # 默认值
    /// - allow
    fn get_duplicate_target_policy(&self) -> ImportResult<DuplicateTargetPolicy>;

    // ===== 提交配置 =====

    /// 获取逐行提交的间隔
    ///
    /// # 默认值
    /// - 0 ms
    fn get_row_delay(&self) -> ImportResult<Duration>;
}
