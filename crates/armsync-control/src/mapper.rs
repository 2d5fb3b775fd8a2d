//! 外部 7 通道 ↔ 内部 8 通道映射
//!
//! # 正向（指令 → 目标）
//!
//! - 手臂通道：按规则 `v = e * scale + offset`（可取反），写入规则指定的内部索引
//! - 夹爪通道：按 [`GripperPolicy`] 拆分到两根手指
//!
//! # 逆向（状态 → 遥测）
//!
//! - 手臂通道：逐条逆变换；scale 为 0 的通道输出哨兵值 `0.0` 并清除有效位
//! - 夹爪通道：两根手指分别归一化、逆变换后取平均（与策略无关）
//!
//! 速度使用相同规则但不含偏移项。

use crate::config::{GripperPolicy, GripperRange};
use armsync_protocol::{
    ARM_CHANNELS, ChannelTable, EXTERNAL_CHANNELS, ExternalCommand, GRIPPER_EXTERNAL,
    GRIPPER_LEFT, GRIPPER_RIGHT, INTERNAL_CHANNELS, ProtocolError, Telemetry, finite_array,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// 不可逆通道的哨兵值
pub const NON_INVERTIBLE_SENTINEL: f64 = 0.0;

/// 正向映射结果（一组完整的内部目标）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InternalTarget {
    pub position: [f64; INTERNAL_CHANNELS],
    pub velocity: [f64; INTERNAL_CHANNELS],
    /// 归一化夹爪标量（0 = 张开，1 = 闭合）
    pub gripper: f64,
}

/// 逆向映射结果
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InverseResult {
    pub positions: [f64; EXTERNAL_CHANNELS],
    pub velocities: [f64; EXTERNAL_CHANNELS],
    /// Bit 0-6：外部通道是否可逆
    pub valid_mask: u8,
}

impl InverseResult {
    /// 转换为遥测消息
    pub fn into_telemetry(self, seq: u64) -> Telemetry {
        Telemetry {
            seq,
            positions: self.positions,
            velocities: self.velocities,
            valid_mask: self.valid_mask,
        }
    }
}

/// 映射器
///
/// 持有已校验的通道表与夹爪参数，本身无可变状态（除一次性告警标志）。
#[derive(Debug)]
pub struct Mapper {
    table: ChannelTable,
    policy: GripperPolicy,
    range: GripperRange,
    warned_non_invertible: AtomicBool,
}

impl Mapper {
    pub fn new(table: ChannelTable, policy: GripperPolicy, range: GripperRange) -> Self {
        Self {
            table,
            policy,
            range,
            warned_non_invertible: AtomicBool::new(false),
        }
    }

    pub fn table(&self) -> &ChannelTable {
        &self.table
    }

    pub fn policy(&self) -> GripperPolicy {
        self.policy
    }

    pub fn range(&self) -> &GripperRange {
        &self.range
    }

    /// 校验任意长度的输入后做正向映射
    ///
    /// 长度不为 7 或包含非有限值时返回错误，调用方应保留之前的目标。
    pub fn map_external_to_internal(
        &self,
        positions: &[f64],
    ) -> Result<[f64; INTERNAL_CHANNELS], ProtocolError> {
        let positions = finite_array::<EXTERNAL_CHANNELS>("positions", positions)?;
        Ok(self
            .forward(&ExternalCommand::from_positions(positions))
            .position)
    }

    /// 正向映射已校验的指令
    pub fn forward(&self, command: &ExternalCommand) -> InternalTarget {
        let apply_invert = self.table.apply_invert();
        let mut target = InternalTarget::default();

        for (external, rule) in self.table.arm_rules().iter().enumerate() {
            target.position[rule.internal] =
                rule.forward(command.positions[external], apply_invert);
            target.velocity[rule.internal] =
                rule.forward_rate(command.velocities[external], apply_invert);
        }

        let e = command.positions[GRIPPER_EXTERNAL];
        let e_rate = command.velocities[GRIPPER_EXTERNAL];
        match self.policy {
            GripperPolicy::Continuous => {
                let mut sum = 0.0;
                for (finger, rule) in self.table.gripper_rules().iter().enumerate() {
                    let raw = rule.forward(e, apply_invert);
                    let n = raw.clamp(0.0, 1.0);
                    let internal = ARM_CHANNELS + finger;
                    target.position[internal] = self.range.to_physical(n);
                    // 钳位后手指停在端点，速度归零
                    target.velocity[internal] = if raw == n {
                        self.range.span() * rule.forward_rate(e_rate, apply_invert)
                    } else {
                        0.0
                    };
                    sum += n;
                }
                target.gripper = sum / 2.0;
            },
            GripperPolicy::Binarized => {
                // 边界值 0（包括 -0.0）归为闭合
                let n = if e < 0.0 { 0.0 } else { 1.0 };
                let physical = self.range.to_physical(n);
                target.position[GRIPPER_LEFT] = physical;
                target.position[GRIPPER_RIGHT] = physical;
                target.gripper = n;
            },
        }

        target
    }

    /// 逆向映射内部状态
    pub fn inverse(
        &self,
        position: &[f64; INTERNAL_CHANNELS],
        velocity: &[f64; INTERNAL_CHANNELS],
    ) -> InverseResult {
        let apply_invert = self.table.apply_invert();
        let mut out = InverseResult::default();

        for (external, rule) in self.table.arm_rules().iter().enumerate() {
            let p = rule.inverse(position[rule.internal], apply_invert);
            let v = rule.inverse_rate(velocity[rule.internal], apply_invert);
            if let (Some(p), Some(v)) = (p, v) {
                out.positions[external] = p;
                out.velocities[external] = v;
                out.valid_mask |= 1 << external;
            } else {
                out.positions[external] = NON_INVERTIBLE_SENTINEL;
                out.velocities[external] = NON_INVERTIBLE_SENTINEL;
            }
        }

        let span = self.range.span();
        let mut p_sum = 0.0;
        let mut v_sum = 0.0;
        let mut gripper_valid = true;
        for (finger, rule) in self.table.gripper_rules().iter().enumerate() {
            let internal = ARM_CHANNELS + finger;
            let n = self.range.to_normalized(position[internal]);
            match (
                rule.inverse(n, apply_invert),
                rule.inverse_rate(velocity[internal] / span, apply_invert),
            ) {
                (Some(p), Some(v)) => {
                    p_sum += p;
                    v_sum += v;
                },
                _ => gripper_valid = false,
            }
        }
        if gripper_valid {
            out.positions[GRIPPER_EXTERNAL] = p_sum / 2.0;
            out.velocities[GRIPPER_EXTERNAL] = v_sum / 2.0;
            out.valid_mask |= 1 << GRIPPER_EXTERNAL;
        } else {
            out.positions[GRIPPER_EXTERNAL] = NON_INVERTIBLE_SENTINEL;
            out.velocities[GRIPPER_EXTERNAL] = NON_INVERTIBLE_SENTINEL;
        }

        if out.valid_mask != Telemetry::ALL_VALID {
            let invalid: Vec<usize> = (0..EXTERNAL_CHANNELS)
                .filter(|i| out.valid_mask & (1 << i) == 0)
                .collect();
            if !self.warned_non_invertible.swap(true, Ordering::Relaxed) {
                warn!(
                    "External channels {:?} are not invertible (zero scale), reporting {} instead",
                    invalid, NON_INVERTIBLE_SENTINEL
                );
            } else {
                debug!(
                    "Inverse of external channels {:?} undefined, reporting {}",
                    invalid, NON_INVERTIBLE_SENTINEL
                );
            }
        }

        out
    }
}
