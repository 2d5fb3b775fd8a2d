//! 控制层错误类型定义

use crate::status::EngineStatus;
use armsync_protocol::{ProtocolError, TableError};
use std::path::PathBuf;
use thiserror::Error;

/// 配置错误
///
/// 只在启动期出现，属于致命错误：配置无效时引擎不会被构造。
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 字段取值非法
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// 通道表不满足约束
    #[error("Invalid mapping table: {0}")]
    Table(#[from] TableError),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// 引擎错误
#[derive(Error, Debug)]
pub enum EngineError {
    /// 入站消息格式错误（指令被整体拒绝，目标保持不变）
    #[error("Command rejected: {0}")]
    Protocol(#[from] ProtocolError),

    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 通道索引超出范围
    #[error("Channel index {index} out of range (0..{max})")]
    ChannelIndex { index: usize, max: usize },

    /// 单值参数非法（NaN / 无穷大 / 超出范围）
    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },

    /// 引擎生命周期状态不允许该操作
    #[error("Engine is {actual}, expected {expected}")]
    InvalidState {
        expected: EngineStatus,
        actual: EngineStatus,
    },

    /// 后台线程启动失败
    #[error("Failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// 引擎结果类型别名
pub type Result<T> = std::result::Result<T, EngineError>;
