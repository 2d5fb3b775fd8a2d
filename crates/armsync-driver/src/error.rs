//! 驱动层错误类型定义

use thiserror::Error;

/// 驱动层错误类型
///
/// 所有错误都只影响单个通道：驱动会记录日志并跳过该通道，不会中断 tick。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    /// 槽位不存在
    #[error("Unknown actuator slot: {slot}")]
    UnknownSlot { slot: usize },

    /// 执行器尚未收到任何指令（无可回读的值）
    #[error("Actuator '{name}' has not been commanded yet")]
    NoValue { name: String },

    /// 后端写入失败
    #[error("Actuator '{name}' rejected command: {reason}")]
    Rejected { name: String, reason: String },

    /// 后端内部错误
    #[error("Backend error: {0}")]
    Backend(String),
}
