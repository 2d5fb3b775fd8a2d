//! 映射规则与通道表
//!
//! 通道表描述 7 个外部通道到 8 个内部通道的映射关系。构造时完成全部校验，
//! 之后只读；校验失败属于启动期致命错误。

use crate::channel::{Channel, default_channel_names};
use crate::{ARM_CHANNELS, EXTERNAL_CHANNELS, GRIPPER_EXTERNAL, INTERNAL_CHANNELS};
use std::collections::HashSet;
use thiserror::Error;

/// 单条映射规则
///
/// 正向变换：`v = external * scale + offset`，`invert` 时取反。
/// 逆向变换：先取反，再减 offset，最后除以 scale。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MappingRule {
    /// 外部通道索引（0-6）
    pub external: usize,
    /// 内部通道索引（0-7）
    pub internal: usize,
    /// 缩放系数
    #[cfg_attr(feature = "serde", serde(default = "default_scale"))]
    pub scale: f64,
    /// 加性偏移
    #[cfg_attr(feature = "serde", serde(default))]
    pub offset: f64,
    /// 取反标志
    #[cfg_attr(feature = "serde", serde(default))]
    pub invert: bool,
    /// 夹爪标志（外部通道 6 的两条规则必须置位）
    #[cfg_attr(feature = "serde", serde(default))]
    pub gripper: bool,
}

#[cfg(feature = "serde")]
fn default_scale() -> f64 {
    1.0
}

impl MappingRule {
    /// 恒等手臂规则：外部 `index` → 内部 `index`
    pub fn identity_arm(index: usize) -> Self {
        Self {
            external: index,
            internal: index,
            scale: 1.0,
            offset: 0.0,
            invert: false,
            gripper: false,
        }
    }

    /// 恒等夹爪规则：外部通道 6 → 内部手指 `internal`（6 或 7）
    pub fn identity_gripper(internal: usize) -> Self {
        Self {
            external: GRIPPER_EXTERNAL,
            internal,
            scale: 1.0,
            offset: 0.0,
            invert: false,
            gripper: true,
        }
    }

    /// 设置缩放与偏移
    pub fn with_transform(mut self, scale: f64, offset: f64) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    /// 设置取反标志
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// 正向变换位置值
    ///
    /// `apply_invert = false` 时忽略 `invert` 标志（保留在配置中但不生效）。
    #[inline]
    pub fn forward(&self, value: f64, apply_invert: bool) -> f64 {
        let v = value * self.scale + self.offset;
        if self.invert && apply_invert { -v } else { v }
    }

    /// 正向变换速度值（导数，不含偏移）
    #[inline]
    pub fn forward_rate(&self, value: f64, apply_invert: bool) -> f64 {
        let v = value * self.scale;
        if self.invert && apply_invert { -v } else { v }
    }

    /// 逆向变换位置值
    ///
    /// scale 恰好为 0 时不可逆，返回 `None`。
    #[inline]
    pub fn inverse(&self, value: f64, apply_invert: bool) -> Option<f64> {
        if self.scale == 0.0 {
            return None;
        }
        let v = if self.invert && apply_invert {
            -value
        } else {
            value
        };
        Some((v - self.offset) / self.scale)
    }

    /// 逆向变换速度值
    #[inline]
    pub fn inverse_rate(&self, value: f64, apply_invert: bool) -> Option<f64> {
        if self.scale == 0.0 {
            return None;
        }
        let v = if self.invert && apply_invert {
            -value
        } else {
            value
        };
        Some(v / self.scale)
    }

    /// 两条规则的变换部分是否相同（忽略索引）
    pub fn same_transform(&self, other: &Self) -> bool {
        self.scale == other.scale && self.offset == other.offset && self.invert == other.invert
    }
}

/// 通道表校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Expected {expected} channel names, got {actual}")]
    ChannelCount { expected: usize, actual: usize },

    #[error("Channel {index} has an empty name")]
    EmptyChannelName { index: usize },

    #[error("Duplicate channel name: {name}")]
    DuplicateChannelName { name: String },

    #[error("Rule index out of range: external {external}, internal {internal}")]
    RuleIndexOutOfRange { external: usize, internal: usize },

    #[error("Rule for external {external} -> internal {internal} has a non-finite scale or offset")]
    NonFiniteRule { external: usize, internal: usize },

    /// 夹爪标志与索引不一致（如手臂规则指向手指，或外部通道 6 未标记为夹爪）
    #[error(
        "Inconsistent gripper rule: external {external} -> internal {internal} (gripper = {gripper})"
    )]
    GripperRuleMismatch {
        external: usize,
        internal: usize,
        gripper: bool,
    },

    #[error("More than one rule reads external channel {external}")]
    DuplicateExternal { external: usize },

    #[error("More than one rule targets internal channel {internal}")]
    DuplicateInternal { internal: usize },

    #[error("No rule maps external arm channel {external}")]
    MissingArmRule { external: usize },

    #[error("No gripper rule targets internal channel {internal}")]
    MissingGripperRule { internal: usize },
}

/// 通道表
///
/// 持有 8 个内部通道及已校验的映射规则：
/// - `arm_rules[i]`：外部手臂通道 `i` 的规则（0-5，双射到内部 0-5）
/// - `gripper_rules[f]`：手指 `f` 的规则（0 → 内部 6，1 → 内部 7）
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTable {
    channels: Vec<Channel>,
    arm_rules: [MappingRule; ARM_CHANNELS],
    gripper_rules: [MappingRule; 2],
    apply_invert: bool,
}

impl ChannelTable {
    /// 构造并校验通道表
    ///
    /// # 错误
    ///
    /// 任一不变量不成立时返回 [`TableError`]：
    /// - 名称数量必须为 8，非空且唯一
    /// - 手臂规则在外部 0-5 与内部 0-5 之间构成双射
    /// - 恰好两条夹爪规则，外部索引均为 6，分别指向内部 6 和 7
    /// - 所有 scale/offset 必须为有限值
    pub fn new(
        names: Vec<String>,
        rules: &[MappingRule],
        apply_invert: bool,
    ) -> Result<Self, TableError> {
        if names.len() != INTERNAL_CHANNELS {
            return Err(TableError::ChannelCount {
                expected: INTERNAL_CHANNELS,
                actual: names.len(),
            });
        }

        let mut seen = HashSet::new();
        for (index, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(TableError::EmptyChannelName { index });
            }
            if !seen.insert(name.as_str()) {
                return Err(TableError::DuplicateChannelName { name: name.clone() });
            }
        }

        let mut arm: [Option<MappingRule>; ARM_CHANNELS] = [None; ARM_CHANNELS];
        let mut arm_internal = [false; ARM_CHANNELS];
        let mut gripper: [Option<MappingRule>; 2] = [None; 2];

        for rule in rules {
            if rule.external >= EXTERNAL_CHANNELS || rule.internal >= INTERNAL_CHANNELS {
                return Err(TableError::RuleIndexOutOfRange {
                    external: rule.external,
                    internal: rule.internal,
                });
            }
            if !rule.scale.is_finite() || !rule.offset.is_finite() {
                return Err(TableError::NonFiniteRule {
                    external: rule.external,
                    internal: rule.internal,
                });
            }

            let gripper_slot = rule.external == GRIPPER_EXTERNAL;
            let finger = rule.internal >= ARM_CHANNELS;
            if rule.gripper != gripper_slot || gripper_slot != finger {
                return Err(TableError::GripperRuleMismatch {
                    external: rule.external,
                    internal: rule.internal,
                    gripper: rule.gripper,
                });
            }

            if gripper_slot {
                let slot = &mut gripper[rule.internal - ARM_CHANNELS];
                if slot.is_some() {
                    return Err(TableError::DuplicateInternal {
                        internal: rule.internal,
                    });
                }
                *slot = Some(*rule);
            } else {
                if arm[rule.external].is_some() {
                    return Err(TableError::DuplicateExternal {
                        external: rule.external,
                    });
                }
                if arm_internal[rule.internal] {
                    return Err(TableError::DuplicateInternal {
                        internal: rule.internal,
                    });
                }
                arm_internal[rule.internal] = true;
                arm[rule.external] = Some(*rule);
            }
        }

        // 外部 0-5 各一条、内部不重复，数量相同即构成双射
        let mut arm_rules = [MappingRule::identity_arm(0); ARM_CHANNELS];
        for (external, rule) in arm.into_iter().enumerate() {
            arm_rules[external] = rule.ok_or(TableError::MissingArmRule { external })?;
        }

        let mut gripper_rules = [MappingRule::identity_gripper(0); 2];
        for (finger, rule) in gripper.into_iter().enumerate() {
            gripper_rules[finger] = rule.ok_or(TableError::MissingGripperRule {
                internal: ARM_CHANNELS + finger,
            })?;
        }

        let channels = names
            .into_iter()
            .enumerate()
            .filter_map(|(index, name)| Channel::new(index, name))
            .collect();

        Ok(Self {
            channels,
            arm_rules,
            gripper_rules,
            apply_invert,
        })
    }

    /// 恒等映射表（默认通道名称）
    pub fn identity() -> Self {
        let rules = identity_rules();
        // 恒等规则满足所有不变量
        match Self::new(default_channel_names(), &rules, true) {
            Ok(table) => table,
            Err(e) => unreachable!("identity table is valid: {e}"),
        }
    }

    /// 全部内部通道
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// 内部通道名称
    pub fn name(&self, index: usize) -> Option<&str> {
        self.channels.get(index).map(|c| c.name.as_str())
    }

    /// 外部手臂通道 `external`（0-5）的规则
    pub fn arm_rule(&self, external: usize) -> &MappingRule {
        &self.arm_rules[external]
    }

    /// 全部手臂规则（按外部索引排列）
    pub fn arm_rules(&self) -> &[MappingRule; ARM_CHANNELS] {
        &self.arm_rules
    }

    /// 手指规则：`finger` 为 0（左，内部 6）或 1（右，内部 7）
    pub fn gripper_rule(&self, finger: usize) -> &MappingRule {
        &self.gripper_rules[finger]
    }

    /// 全部手指规则
    pub fn gripper_rules(&self) -> &[MappingRule; 2] {
        &self.gripper_rules
    }

    /// 是否应用取反标志
    pub fn apply_invert(&self) -> bool {
        self.apply_invert
    }

    /// 遍历全部规则（手臂在前，手指在后）
    pub fn rules(&self) -> impl Iterator<Item = &MappingRule> {
        self.arm_rules.iter().chain(self.gripper_rules.iter())
    }

    /// 配置了取反但因 `apply_invert = false` 而未生效的规则
    pub fn suppressed_inverts(&self) -> impl Iterator<Item = &MappingRule> {
        let suppress = !self.apply_invert;
        self.rules().filter(move |r| suppress && r.invert)
    }

    /// scale 为 0 的规则（逆映射不可用）
    pub fn zero_scale_rules(&self) -> impl Iterator<Item = &MappingRule> {
        self.rules().filter(|r| r.scale == 0.0)
    }

    /// 两条手指规则的变换是否一致
    pub fn fingers_symmetric(&self) -> bool {
        self.gripper_rules[0].same_transform(&self.gripper_rules[1])
    }
}

impl Default for ChannelTable {
    fn default() -> Self {
        Self::identity()
    }
}

/// 恒等规则列表（6 条手臂 + 2 条夹爪）
pub fn identity_rules() -> Vec<MappingRule> {
    (0..ARM_CHANNELS)
        .map(MappingRule::identity_arm)
        .chain([
            MappingRule::identity_gripper(ARM_CHANNELS),
            MappingRule::identity_gripper(ARM_CHANNELS + 1),
        ])
        .collect()
}
