//! 引擎生命周期状态

use std::sync::atomic::{AtomicU8, Ordering};

/// 引擎状态
///
/// ```text
/// Initialized ──(启动循环)──> Running ──(停止)──> Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum EngineStatus {
    /// 已构造，尚未进入循环（可手动 tick）
    #[default]
    Initialized = 0,
    /// 定频循环运行中
    Running = 1,
    /// 循环已结束
    Stopped = 2,
}

impl EngineStatus {
    /// 从 u8 转换，无效值视为 Stopped
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Initialized,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_running(self) -> bool {
        self == Self::Running
    }
}

impl std::fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Initialized => "initialized",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// 引擎状态（原子版本，用于线程间共享）
#[derive(Debug, Default)]
pub struct AtomicEngineStatus {
    inner: AtomicU8,
}

impl AtomicEngineStatus {
    pub fn new(status: EngineStatus) -> Self {
        Self {
            inner: AtomicU8::new(status.as_u8()),
        }
    }

    pub fn get(&self) -> EngineStatus {
        EngineStatus::from_u8(self.inner.load(Ordering::Acquire))
    }

    pub fn set(&self, status: EngineStatus) {
        self.inner.store(status.as_u8(), Ordering::Release);
    }

    /// 仅当当前状态为 `current` 时切换到 `new`
    pub fn transition(&self, current: EngineStatus, new: EngineStatus) -> bool {
        self.inner
            .compare_exchange(
                current.as_u8(),
                new.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}
