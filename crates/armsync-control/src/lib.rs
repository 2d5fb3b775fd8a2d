//! # armsync Control
//!
//! 关节空间映射、平滑与夹爪对称控制引擎。
//!
//! ## 模块
//!
//! - `config`: TOML 配置与启动期校验
//! - `mapper`: 外部 7 通道 ↔ 内部 8 通道映射
//! - `state`: 控制状态与目标双缓冲
//! - `smoother`: 指数插值
//! - `sync`: 手指同步
//! - `engine`: tick 流水线与跨线程句柄
//! - `loop_runner`: 定频 tick 线程
//! - `telemetry`: 遥测发布线程
//!
//! ## 线程模型
//!
//! ```text
//! 指令线程 ──submit()──> TargetBuffer (ArcSwap) ──load──┐
//!                                                       ▼
//!                        tick 线程: advance → sync → apply → read_back
//!                                                       │
//! 遥测线程 <──telemetry()── StateSnapshot (ArcSwap) <───┘
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod loop_runner;
pub mod mapper;
pub mod smoother;
pub mod state;
pub mod status;
pub mod sync;
pub mod telemetry;

pub use config::{ControlConfig, EngineConfig, GripperPolicy, GripperRange, TableConfig};
pub use engine::{Engine, EngineHandle, TickReport};
pub use error::{ConfigError, EngineError, Result};
pub use loop_runner::{LoopConfig, RunnerHandle, spawn_loop};
pub use mapper::{InternalTarget, InverseResult, Mapper, NON_INVERTIBLE_SENTINEL};
pub use smoother::{Smoother, lerp};
pub use state::{ControlState, StateSnapshot, TargetBuffer, TargetSnapshot};
pub use status::{AtomicEngineStatus, EngineStatus};
pub use sync::sync_fingers;
pub use telemetry::{DEFAULT_TELEMETRY_CAPACITY, TelemetryPublisher};
