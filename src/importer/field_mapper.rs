// ==========================================
// 表格数据导入管道 - 字段映射器实现
// ==========================================
// 职责: 手动映射 / 自动映射 / 重复目标策略
// 说明: 映射状态存放在 FieldMapping（会话内），本服务无状态
// ==========================================

use crate::domain::mapping::FieldMapping;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// 重复目标字段策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateTargetPolicy {
    /// 允许多个源列指向同一目标，反向查找时后写入者生效
    #[default]
    Allow,
    /// 拒绝已被其他源列占用的目标
    Reject,
}

impl DuplicateTargetPolicy {
    pub fn as_str(&self) -> &str {
        match self {
            DuplicateTargetPolicy::Allow => "allow",
            DuplicateTargetPolicy::Reject => "reject",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "allow" => Some(DuplicateTargetPolicy::Allow),
            "reject" => Some(DuplicateTargetPolicy::Reject),
            _ => None,
        }
    }
}

// ==========================================
// FieldMapper - 字段映射器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMapper {
    policy: DuplicateTargetPolicy,
}

impl FieldMapper {
    pub fn new(policy: DuplicateTargetPolicy) -> Self {
        Self { policy }
    }

    /// 设置单条映射
    ///
    /// # 参数
    /// - source: 源列名
    /// - destination: 目标字段名；None 或空白表示取消该列映射
    ///
    /// # 返回
    /// - Ok(true): 映射表发生了变化
    /// - Ok(false): 与现有映射相同，或取消一个本就未映射的列
    /// - Err(DuplicateTarget): Reject 策略下目标已被其他源列占用
    pub fn set_mapping(
        &self,
        mapping: &mut FieldMapping,
        source: &str,
        destination: Option<&str>,
    ) -> ImportResult<bool> {
        let destination = match destination.map(str::trim) {
            Some(d) if !d.is_empty() => d,
            _ => {
                let removed = mapping.remove(source);
                if removed {
                    debug!(source = %source, "取消字段映射");
                }
                return Ok(removed);
            }
        };

        if self.policy == DuplicateTargetPolicy::Reject {
            if let Some(existing) = mapping
                .iter()
                .find(|e| e.destination == destination && e.source != source)
            {
                return Err(ImportError::DuplicateTarget {
                    destination: destination.to_string(),
                    existing_source: existing.source.clone(),
                });
            }
        }

        let changed = mapping.upsert(source, destination);
        if changed {
            debug!(source = %source, destination = %destination, "设置字段映射");
        }
        Ok(changed)
    }

    /// 按名称自动映射（大小写不敏感，去除首尾空白后精确匹配）
    ///
    /// # 规则
    /// - 未匹配的源列保持原状（不清除已有手动映射）
    /// - Reject 策略下跳过目标已被其他源列占用的匹配
    ///
    /// # 返回
    /// - 本次新建或变更的映射条数（重复调用返回 0）
    pub fn auto_map(
        &self,
        mapping: &mut FieldMapping,
        headers: &[String],
        destination_fields: &[String],
    ) -> usize {
        let mut changed = 0;

        for header in headers {
            let wanted = header.trim().to_lowercase();
            let matched = destination_fields
                .iter()
                .find(|field| field.trim().to_lowercase() == wanted);

            let Some(destination) = matched else {
                continue;
            };

            if self.policy == DuplicateTargetPolicy::Reject
                && mapping.is_target_used_by_other(destination, header)
            {
                debug!(source = %header, destination = %destination, "目标已占用，跳过自动映射");
                continue;
            }

            if mapping.upsert(header, destination) {
                changed += 1;
            }
        }

        info!(changed = changed, total = mapping.len(), "自动映射完成");
        changed
    }
}
