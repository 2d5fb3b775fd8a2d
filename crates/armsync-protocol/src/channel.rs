//! 内部执行器通道定义

use crate::{ARM_CHANNELS, GRIPPER_LEFT, GRIPPER_RIGHT, INTERNAL_CHANNELS};

/// 默认通道名称（索引 0-7）
pub const DEFAULT_CHANNEL_NAMES: [&str; INTERNAL_CHANNELS] = [
    "joint1",
    "joint2",
    "joint3",
    "joint4",
    "joint5",
    "joint6",
    "gripper_left",
    "gripper_right",
];

/// 通道角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ChannelRole {
    /// 手臂关节（索引 0-5）
    Arm,
    /// 左手指（索引 6）
    GripperLeft,
    /// 右手指（索引 7）
    GripperRight,
}

impl ChannelRole {
    /// 根据内部索引推导角色
    ///
    /// 索引超出 0-7 时返回 `None`。
    pub fn for_index(index: usize) -> Option<Self> {
        match index {
            i if i < ARM_CHANNELS => Some(Self::Arm),
            GRIPPER_LEFT => Some(Self::GripperLeft),
            GRIPPER_RIGHT => Some(Self::GripperRight),
            _ => None,
        }
    }

    /// 是否为夹爪手指
    pub fn is_gripper(self) -> bool {
        !matches!(self, Self::Arm)
    }
}

/// 内部执行器通道
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// 稳定索引（0-7）
    pub index: usize,
    /// 人类可读名称（同时作为执行器逻辑名称）
    pub name: String,
    /// 角色
    pub role: ChannelRole,
}

impl Channel {
    /// 创建通道，索引超出范围时返回 `None`
    pub fn new(index: usize, name: impl Into<String>) -> Option<Self> {
        ChannelRole::for_index(index).map(|role| Self {
            index,
            name: name.into(),
            role,
        })
    }
}

/// 返回默认通道名称列表
pub fn default_channel_names() -> Vec<String> {
    DEFAULT_CHANNEL_NAMES.iter().map(|s| s.to_string()).collect()
}
