// ==========================================
// 表格数据导入管道 - 内存导入目标
// ==========================================
// 职责: ImportTargetRepository 的参考实现（总是成功，保存已写入记录）
// ==========================================

use crate::domain::import::MappedRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_target_repo::ImportTargetRepository;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// 内存导入目标
#[derive(Debug, Clone, Default)]
pub struct InMemoryTargetRepository {
    records: Arc<Mutex<Vec<(usize, MappedRecord)>>>,
}

impl InMemoryTargetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已写入的记录（行号, 记录），按写入顺序
    pub fn records(&self) -> RepositoryResult<Vec<(usize, MappedRecord)>> {
        let guard = self
            .records
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(guard.clone())
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImportTargetRepository for InMemoryTargetRepository {
    async fn write_row(&self, row_number: usize, record: &MappedRecord) -> RepositoryResult<()> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        guard.push((row_number, record.clone()));
        Ok(())
    }
}
