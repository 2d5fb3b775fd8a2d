//! # armsync
//!
//! 把外部机械臂关节指令流（6 个关节 + 1 个夹爪标量）桥接到仿真执行器组
//! （6 个关节 + 左右两根手指），并提供平滑与夹爪对称保证。
//!
//! ## 分层
//!
//! ```text
//! armsync (本 crate: 统一入口、日志初始化)
//!   ├── armsync-control   配置、映射、平滑、同步、引擎、定频循环、遥测
//!   ├── armsync-driver    执行器后端抽象、名称解析、回读
//!   └── armsync-protocol  通道模型、映射规则、消息类型
//! ```
//!
//! ## 快速开始
//!
//! ```rust
//! use armsync::prelude::*;
//!
//! let mut config = EngineConfig::default();
//! config.control.smoothing_factor = 1.0;
//!
//! let backend = SimActuators::new(DEFAULT_CHANNEL_NAMES);
//! let mut engine = Engine::new(&config, backend).unwrap();
//! let handle = engine.handle();
//!
//! handle
//!     .submit(&JointCommand::positions(vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5]))
//!     .unwrap();
//! engine.tick();
//!
//! assert_eq!(
//!     engine.state().current_position,
//!     [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 0.5]
//! );
//! ```

pub mod logging;
pub mod prelude;

pub use armsync_control as control;
pub use armsync_driver as driver;
pub use armsync_protocol as protocol;

pub use armsync_control::{
    ConfigError, ControlState, Engine, EngineConfig, EngineError, EngineHandle, EngineStatus,
    GripperPolicy, GripperRange, LoopConfig, RunnerHandle, TelemetryPublisher, TickReport,
    spawn_loop,
};
pub use armsync_driver::{
    ActuatorBackend, ActuatorCommand, ActuatorDriver, DriverError, FeedbackSource, SimActuators,
};
pub use armsync_protocol::{
    ChannelTable, Inbound, JointCommand, JointTrajectory, MappingRule, ProtocolError, TableError,
    Telemetry,
};
pub use logging::init_logging;
