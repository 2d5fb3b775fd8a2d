//! 执行器驱动层
//!
//! 本模块把 8 个内部通道的指令写入仿真执行器，包括：
//! - 执行器后端抽象（[`ActuatorBackend`]，按名称枚举、按槽位读写）
//! - 内存仿真后端（[`SimActuators`]）
//! - 名称解析（别名 + 初始化时一次性建立 名称→槽位 索引表）
//! - 反馈回读（回显 / 后端读取 / 关闭）
//!
//! # 使用场景
//!
//! 控制循环每个 tick 调用一次 [`ActuatorDriver::apply`] 和
//! [`ActuatorDriver::read_back`]。大多数用户通过 `armsync-control` 的
//! `Engine` 间接使用本模块。

pub mod backend;
mod driver;
mod error;

pub use backend::{ActuatorBackend, ActuatorCommand, SimActuators};
pub use driver::{ActuatorDriver, ApplyReport, FeedbackSource};
pub use error::DriverError;
