// ==========================================
// 表格数据导入管道 - 导入事件发布
// ==========================================
// 职责: 定义进度事件发布 trait，执行器只依赖此接口
// 说明: 展示层通过 ChannelEventPublisher 订阅进度流
// ==========================================

use crate::domain::import::ImportEvent;
use std::error::Error;
use tokio::sync::mpsc;

/// 导入事件发布者 Trait
///
/// # 实现说明
/// - 发布失败不应影响提交流程，执行器只记录告警
pub trait ImportEventPublisher: Send + Sync {
    /// 发布导入事件
    ///
    /// # 返回
    /// - `Ok(())`: 已发布
    /// - `Err`: 发布失败（如订阅方已断开）
    fn publish(&self, event: ImportEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
///
/// 用于不需要观察进度的场景（如单元测试、批处理）
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl ImportEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: ImportEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::trace!(
            "NoOpEventPublisher: 跳过事件发布 - event_type={}",
            event.as_str()
        );
        Ok(())
    }
}

/// 基于 tokio 无界通道的事件发布者
#[derive(Debug, Clone)]
pub struct ChannelEventPublisher {
    sender: mpsc::UnboundedSender<ImportEvent>,
}

impl ChannelEventPublisher {
    /// 创建发布者及对应的接收端
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ImportEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ImportEventPublisher for ChannelEventPublisher {
    fn publish(&self, event: ImportEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.sender
            .send(event)
            .map_err(|e| format!("事件接收端已关闭: {}", e.0.as_str()).into())
    }
}
