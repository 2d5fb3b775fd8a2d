//! # armsync Protocol
//!
//! 外部关节指令流与内部执行器通道之间的数据模型（无运行时依赖）
//!
//! ## 模块
//!
//! - `channel`: 内部通道（6 个手臂关节 + 左右夹爪手指）
//! - `mapping`: 映射规则与通道表校验
//! - `message`: 入站指令 / 出站遥测消息
//!
//! ## 通道布局
//!
//! ```text
//! 外部（7）: [j0, j1, j2, j3, j4, j5, gripper]
//!                │   ...   │            ├──────────┐
//! 内部（8）: [a0, a1, a2, a3, a4, a5, finger_l, finger_r]
//! ```
//!
//! 手臂通道按映射表一一对应（可重排、可取反）；外部夹爪通道同时驱动两个手指。

pub mod channel;
pub mod mapping;
pub mod message;

pub use channel::*;
pub use mapping::*;
pub use message::*;

use thiserror::Error;

/// 外部通道数量（6 个手臂关节 + 1 个夹爪标量）
pub const EXTERNAL_CHANNELS: usize = 7;

/// 内部执行器通道数量（6 个手臂关节 + 2 个夹爪手指）
pub const INTERNAL_CHANNELS: usize = 8;

/// 手臂关节数量
pub const ARM_CHANNELS: usize = 6;

/// 外部向量中夹爪通道的索引
pub const GRIPPER_EXTERNAL: usize = 6;

/// 左手指内部索引
pub const GRIPPER_LEFT: usize = 6;

/// 右手指内部索引
pub const GRIPPER_RIGHT: usize = 7;

/// 协议层错误类型
///
/// 入站消息格式错误时返回。调用方应整体拒绝该指令并保留之前的目标状态。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// 数组长度不正确（包括缺失的数组，长度视为 0）
    #[error("Invalid {field} length: expected {expected}, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// 数组中包含 NaN 或无穷大
    #[error("Non-finite {field}[{index}] = {value}")]
    NonFinite {
        field: &'static str,
        index: usize,
        value: f64,
    },

    /// 轨迹不包含任何路点
    #[error("Trajectory contains no points")]
    EmptyTrajectory,
}

/// 将切片校验并复制为定长数组
///
/// 长度不等于 `N` 或包含非有限值时返回错误。
pub fn finite_array<const N: usize>(
    field: &'static str,
    values: &[f64],
) -> Result<[f64; N], ProtocolError> {
    if values.len() != N {
        return Err(ProtocolError::InvalidLength {
            field,
            expected: N,
            actual: values.len(),
        });
    }

    let mut out = [0.0; N];
    for (index, (slot, &value)) in out.iter_mut().zip(values).enumerate() {
        if !value.is_finite() {
            return Err(ProtocolError::NonFinite {
                field,
                index,
                value,
            });
        }
        *slot = value;
    }
    Ok(out)
}
