//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use armsync::prelude::*;
//! ```

// 引擎
pub use armsync_control::{
    Engine, EngineConfig, EngineHandle, EngineStatus, GripperPolicy, GripperRange, LoopConfig,
    TelemetryPublisher, TickReport, spawn_loop,
};

// 执行器
pub use armsync_driver::{ActuatorBackend, ActuatorCommand, FeedbackSource, SimActuators};

// 消息
pub use armsync_protocol::{
    DEFAULT_CHANNEL_NAMES, ExternalCommand, Inbound, JointCommand, JointTrajectory, Telemetry,
    TrajectoryPoint,
};

// 错误类型
pub use armsync_control::{ConfigError, EngineError};
pub use armsync_driver::DriverError;
pub use armsync_protocol::{ProtocolError, TableError};
