// ==========================================
// 表格数据导入管道 - 字段映射模型
// ==========================================
// 职责: 源列 → 目标字段的映射表（保持插入顺序）
// 说明: 重复目标在数据层可表示，是否拒绝由 FieldMapper 的策略决定
// ==========================================

use crate::domain::import::{DataRow, MappedRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// 单条映射
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub source: String,      // 源列名
    pub destination: String, // 目标字段名
}

// ==========================================
// FieldMapping - 字段映射表
// ==========================================
// 不变量: 同一 source 至多一条；更新已存在的 source 不改变其位置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: Vec<MappingEntry>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// 查询源列当前映射的目标字段
    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.source == source)
            .map(|e| e.destination.as_str())
    }

    /// 插入或更新一条映射
    ///
    /// # 返回
    /// - true: 新建或目标发生变化
    /// - false: 已是同一目标
    pub fn upsert(&mut self, source: &str, destination: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.source == source) {
            Some(entry) if entry.destination == destination => false,
            Some(entry) => {
                entry.destination = destination.to_string();
                true
            }
            None => {
                self.entries.push(MappingEntry {
                    source: source.to_string(),
                    destination: destination.to_string(),
                });
                true
            }
        }
    }

    /// 取消映射，返回是否确实删除了条目
    pub fn remove(&mut self, source: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.source != source);
        self.entries.len() != before
    }

    /// 反向映射（目标字段 → 源列），后写入者覆盖先写入者
    pub fn inverse(&self) -> HashMap<String, String> {
        let mut reverse = HashMap::with_capacity(self.entries.len());
        for entry in &self.entries {
            reverse.insert(entry.destination.clone(), entry.source.clone());
        }
        reverse
    }

    /// 目标字段是否已被其他源列占用
    pub fn is_target_used_by_other(&self, destination: &str, source: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.destination == destination && e.source != source)
    }

    /// 被多个源列同时映射的目标字段（按名称排序）
    pub fn duplicate_targets(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.destination.as_str()) {
                duplicates.insert(entry.destination.clone());
            }
        }
        duplicates.into_iter().collect()
    }

    /// 将源数据行投影为目标字段记录；源列缺失的映射被跳过
    pub fn map_row(&self, row: &DataRow) -> MappedRecord {
        let mut record = MappedRecord::new();
        for entry in &self.entries {
            if let Some(value) = row.get(&entry.source) {
                record.insert(entry.destination.clone(), value.clone());
            }
        }
        record
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.iter()
    }

    /// 已映射字段数（汇总中的 mappedFieldCount）
    pub fn mapped_field_count(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<S: Into<String>, D: Into<String>> FromIterator<(S, D)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (S, D)>>(iter: I) -> Self {
        let mut mapping = FieldMapping::new();
        for (source, destination) in iter {
            let source = source.into();
            let destination = destination.into();
            mapping.upsert(&source, &destination);
        }
        mapping
    }
}
