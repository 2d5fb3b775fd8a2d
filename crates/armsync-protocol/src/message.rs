//! 入站指令与出站遥测消息
//!
//! 消息按外部通道顺序排列：`[joint0..joint5, gripper]`。

use crate::{EXTERNAL_CHANNELS, ProtocolError, finite_array};

/// 单条关节指令（入站）
///
/// `positions` 缺失时视为长度 0，会被整体拒绝；`velocities` 缺失时默认为零。
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointCommand {
    #[cfg_attr(feature = "serde", serde(default))]
    pub positions: Vec<f64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub velocities: Option<Vec<f64>>,
}

impl JointCommand {
    /// 仅包含位置的指令
    pub fn positions(positions: impl Into<Vec<f64>>) -> Self {
        Self {
            positions: positions.into(),
            velocities: None,
        }
    }

    /// 附带速度
    pub fn with_velocities(mut self, velocities: impl Into<Vec<f64>>) -> Self {
        self.velocities = Some(velocities.into());
        self
    }

    /// 校验并转换为定长外部指令
    ///
    /// # 错误
    ///
    /// - `InvalidLength`: 位置或速度数组长度不是 7
    /// - `NonFinite`: 包含 NaN / 无穷大
    pub fn validate(&self) -> Result<ExternalCommand, ProtocolError> {
        let positions = finite_array::<EXTERNAL_CHANNELS>("positions", &self.positions)?;
        let velocities = match &self.velocities {
            Some(v) => finite_array::<EXTERNAL_CHANNELS>("velocities", v)?,
            None => [0.0; EXTERNAL_CHANNELS],
        };
        Ok(ExternalCommand {
            positions,
            velocities,
        })
    }
}

/// 定长外部指令
///
/// 由 [`JointCommand::validate`] 得到时全部为有限值；直接构造的指令在提交前
/// 需要经过 [`ExternalCommand::validate`]。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExternalCommand {
    pub positions: [f64; EXTERNAL_CHANNELS],
    pub velocities: [f64; EXTERNAL_CHANNELS],
}

impl ExternalCommand {
    /// 速度为零的指令
    pub fn from_positions(positions: [f64; EXTERNAL_CHANNELS]) -> Self {
        Self {
            positions,
            velocities: [0.0; EXTERNAL_CHANNELS],
        }
    }

    /// 检查全部数值为有限值
    pub fn validate(&self) -> Result<(), ProtocolError> {
        finite_array::<EXTERNAL_CHANNELS>("positions", &self.positions)?;
        finite_array::<EXTERNAL_CHANNELS>("velocities", &self.velocities)?;
        Ok(())
    }
}

/// 轨迹路点
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrajectoryPoint {
    #[cfg_attr(feature = "serde", serde(default))]
    pub positions: Vec<f64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub velocities: Option<Vec<f64>>,
    /// 相对轨迹起点的时间（秒）
    #[cfg_attr(feature = "serde", serde(default))]
    pub time_from_start: f64,
}

/// 多路点轨迹（入站）
///
/// 只执行第一个路点，其余路点直接丢弃，不做缓冲。
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointTrajectory {
    #[cfg_attr(feature = "serde", serde(default))]
    pub points: Vec<TrajectoryPoint>,
}

impl JointTrajectory {
    /// 取第一个路点并校验
    ///
    /// 返回 `(指令, 被丢弃的路点数量)`。
    pub fn first_command(&self) -> Result<(ExternalCommand, usize), ProtocolError> {
        let first = self.points.first().ok_or(ProtocolError::EmptyTrajectory)?;
        let command = JointCommand {
            positions: first.positions.clone(),
            velocities: first.velocities.clone(),
        }
        .validate()?;
        Ok((command, self.points.len() - 1))
    }
}

/// 入站消息（JSON 行格式使用 `type` 字段区分）
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum Inbound {
    Command(JointCommand),
    Trajectory(JointTrajectory),
}

/// 出站遥测
///
/// `valid_mask` 的 Bit 0-6 对应外部通道 0-6：
/// - 1 表示该通道可逆映射成功
/// - 0 表示不可逆（scale 为 0），对应数值为哨兵值 `0.0`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Telemetry {
    /// 单调递增序号（对应控制循环的 tick 计数）
    pub seq: u64,
    pub positions: [f64; EXTERNAL_CHANNELS],
    pub velocities: [f64; EXTERNAL_CHANNELS],
    pub valid_mask: u8,
}

impl Telemetry {
    /// 全部通道有效时的掩码
    pub const ALL_VALID: u8 = (1 << EXTERNAL_CHANNELS) - 1;

    /// 通道 `index` 是否有效
    pub fn is_valid(&self, index: usize) -> bool {
        index < EXTERNAL_CHANNELS && (self.valid_mask & (1 << index)) != 0
    }

    /// 是否全部通道有效
    pub fn is_complete(&self) -> bool {
        self.valid_mask == Self::ALL_VALID
    }

    /// 无效通道索引（用于日志）
    pub fn invalid_channels(&self) -> Vec<usize> {
        (0..EXTERNAL_CHANNELS).filter(|&i| !self.is_valid(i)).collect()
    }
}
