// ==========================================
// 表格数据导入管道 - 导入组件 Trait
// ==========================================
// 职责: 定义解析与校验组件接口（不包含实现）
// 说明: 写入接口位于 repository 层（ImportTargetRepository）
// ==========================================

use crate::domain::import::ParsedTable;
use crate::importer::error::ImportResult;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文本解析接口（阶段 1）
// 实现者: DelimitedTextParser
pub trait FileParser: Send + Sync {
    /// 将原始分隔文本解析为表头 + 数据行
    ///
    /// # 参数
    /// - raw_text: 文件全文
    ///
    /// # 返回
    /// - Ok(ParsedTable): 解析结果（空输入返回空表，不视为错误）
    /// - Err: 底层读取错误
    fn parse_text(&self, raw_text: &str) -> ImportResult<ParsedTable>;
}

// ==========================================
// FormatRule Trait
// ==========================================
// 用途: 按目标字段名注册的格式校验规则（阶段 3）
// 实现者: EmailRule, PhoneRule, ZipRule
pub trait FormatRule: Send + Sync {
    /// 规则作用的目标字段名
    fn field(&self) -> &str;

    /// 校验单个非空值
    ///
    /// # 返回
    /// - None: 通过
    /// - Some(String): 面向用户的错误描述
    fn check(&self, value: &str) -> Option<String>;
}
