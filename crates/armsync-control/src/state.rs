//! 控制状态与目标双缓冲
//!
//! # 并发模型
//!
//! - **目标**：指令线程构造完整的 [`TargetSnapshot`] 后原子替换（`ArcSwap`），
//!   tick 线程每次 `load` 得到的总是一组一致的 8 通道向量，后写者覆盖先写者
//! - **控制状态**：只由 tick 线程持有和修改
//! - **状态快照**：每个 tick 结束后发布 [`StateSnapshot`]，遥测侧无锁读取

use crate::mapper::{InternalTarget, Mapper};
use arc_swap::ArcSwap;
use armsync_protocol::{ARM_CHANNELS, EXTERNAL_CHANNELS, ExternalCommand, INTERNAL_CHANNELS};
use std::sync::Arc;

/// 目标快照
pub type TargetSnapshot = InternalTarget;

/// 控制状态
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlState {
    pub current_position: [f64; INTERNAL_CHANNELS],
    pub target_position: [f64; INTERNAL_CHANNELS],
    pub current_velocity: [f64; INTERNAL_CHANNELS],
    pub target_velocity: [f64; INTERNAL_CHANNELS],
    /// 归一化夹爪标量（0 = 张开，1 = 闭合）
    pub current_gripper: f64,
    pub target_gripper: f64,
}

impl ControlState {
    /// 构造初始状态
    ///
    /// 手臂通道经映射表由初始位姿得到（无初始位姿时为零），手指始终从
    /// 张开位置开始。当前值与目标值相同。
    pub fn seeded(mapper: &Mapper, initial_pose: Option<[f64; EXTERNAL_CHANNELS]>) -> Self {
        let mut position = [0.0; INTERNAL_CHANNELS];
        if let Some(pose) = initial_pose {
            let mapped = mapper.forward(&ExternalCommand::from_positions(pose));
            position[..ARM_CHANNELS].copy_from_slice(&mapped.position[..ARM_CHANNELS]);
        }
        let open = mapper.range().to_physical(0.0);
        for finger in &mut position[ARM_CHANNELS..] {
            *finger = open;
        }

        Self {
            current_position: position,
            target_position: position,
            current_velocity: [0.0; INTERNAL_CHANNELS],
            target_velocity: [0.0; INTERNAL_CHANNELS],
            current_gripper: 0.0,
            target_gripper: 0.0,
        }
    }

    /// 当前目标
    pub fn target(&self) -> TargetSnapshot {
        TargetSnapshot {
            position: self.target_position,
            velocity: self.target_velocity,
            gripper: self.target_gripper,
        }
    }

    /// 覆盖目标（tick 开始时从双缓冲加载）
    pub fn set_target(&mut self, target: &TargetSnapshot) {
        self.target_position = target.position;
        self.target_velocity = target.velocity;
        self.target_gripper = target.gripper;
    }

    /// 两根手指的当前位置差
    pub fn finger_gap(&self) -> f64 {
        (self.current_position[ARM_CHANNELS] - self.current_position[ARM_CHANNELS + 1]).abs()
    }
}

/// 目标双缓冲
#[derive(Debug)]
pub struct TargetBuffer {
    inner: ArcSwap<TargetSnapshot>,
}

impl TargetBuffer {
    pub fn new(initial: TargetSnapshot) -> Self {
        Self {
            inner: ArcSwap::from_pointee(initial),
        }
    }

    /// 读取最新目标（拷贝）
    #[inline]
    pub fn load(&self) -> TargetSnapshot {
        **self.inner.load()
    }

    /// 整体替换目标
    pub fn store(&self, target: TargetSnapshot) {
        self.inner.store(Arc::new(target));
    }

    /// 读-改-写目标（用于单通道写入）
    ///
    /// 并发写入时闭包可能被调用多次，必须无副作用。
    pub fn update<F>(&self, f: F)
    where
        F: Fn(&mut TargetSnapshot),
    {
        self.inner.rcu(|current| {
            let mut next = **current;
            f(&mut next);
            next
        });
    }
}

/// 每个 tick 结束后发布的状态快照
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateSnapshot {
    /// 已完成的 tick 数（0 表示尚未 tick）
    pub seq: u64,
    pub state: ControlState,
}
