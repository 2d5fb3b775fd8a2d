//! 执行器驱动
//!
//! 把内部 8 通道向量写入具名执行器，并按反馈来源回读。
//!
//! # 名称解析
//!
//! 构造时完成全部解析，tick 内只做数组下标访问：
//!
//! ```text
//! 通道逻辑名 ──(别名表)──> 物理执行器名 ──(名称→槽位表)──> 槽位
//! ```
//!
//! 别名允许多个通道驱动同一个物理执行器（例如两根手指共用一个夹爪执行器）。

use crate::backend::{ActuatorBackend, ActuatorCommand};
use armsync_protocol::{ChannelTable, INTERNAL_CHANNELS};
use std::collections::HashMap;
use tracing::{debug, info, trace, warn};

/// 反馈来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum FeedbackSource {
    /// 回显驱动缓存的最近一次指令（开环）
    #[default]
    Echo,
    /// 从后端读取（有传感器时为测量值）
    Backend,
    /// 不回读
    None,
}

/// 单次 apply 的结果
///
/// 掩码的 Bit 0-7 对应内部通道 0-7。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyReport {
    /// 成功写入的通道
    pub applied_mask: u8,
    /// 被跳过的通道（未解析或后端拒绝）
    pub skipped_mask: u8,
}

impl ApplyReport {
    /// 成功写入的通道数
    pub fn applied(&self) -> u32 {
        self.applied_mask.count_ones()
    }

    /// 跳过的通道数
    pub fn skipped(&self) -> u32 {
        self.skipped_mask.count_ones()
    }

    /// 是否全部写入成功
    pub fn is_complete(&self) -> bool {
        self.applied_mask == u8::MAX
    }
}

/// 执行器驱动
pub struct ActuatorDriver<B> {
    backend: B,
    /// 通道 → 槽位（初始化时解析，`None` 表示找不到执行器）
    slots: [Option<usize>; INTERNAL_CHANNELS],
    /// 通道对应的物理执行器名（用于日志）
    physical: Vec<String>,
    /// 最近一次 apply 中成功写入的位置（回显反馈使用，写入失败的通道为 `None`）
    last_applied: [Option<f64>; INTERNAL_CHANNELS],
    feedback: FeedbackSource,
}

impl<B: ActuatorBackend> ActuatorDriver<B> {
    /// 创建驱动并解析全部通道
    ///
    /// # 参数
    ///
    /// - `backend`: 执行器后端（只在此处枚举一次名称）
    /// - `table`: 通道表（提供逻辑名）
    /// - `aliases`: 逻辑名 → 物理执行器名
    /// - `feedback`: 反馈来源
    ///
    /// 找不到执行器的通道只记录警告，不会导致构造失败。
    pub fn new(
        backend: B,
        table: &ChannelTable,
        aliases: &HashMap<String, String>,
        feedback: FeedbackSource,
    ) -> Self {
        let names = backend.actuator_names();
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(names.len());
        for (slot, name) in names.iter().enumerate() {
            if index.contains_key(name.as_str()) {
                warn!(
                    "Duplicate actuator name '{}' at slot {}, keeping the first one",
                    name, slot
                );
                continue;
            }
            index.insert(name.as_str(), slot);
        }

        let mut slots = [None; INTERNAL_CHANNELS];
        let mut physical = Vec::with_capacity(INTERNAL_CHANNELS);
        for channel in table.channels() {
            let target = aliases
                .get(&channel.name)
                .map(String::as_str)
                .unwrap_or(channel.name.as_str());
            slots[channel.index] = index.get(target).copied();

            match slots[channel.index] {
                Some(slot) if target != channel.name => {
                    info!(
                        "Channel {} '{}' aliased to actuator '{}' (slot {})",
                        channel.index, channel.name, target, slot
                    );
                },
                Some(_) => {},
                None => {
                    warn!(
                        "No actuator named '{}' for channel {} '{}', channel will be skipped",
                        target, channel.index, channel.name
                    );
                },
            }
            physical.push(target.to_string());
        }

        Self {
            backend,
            slots,
            physical,
            last_applied: [None; INTERNAL_CHANNELS],
            feedback,
        }
    }

    /// 通道解析到的槽位
    pub fn slot(&self, channel: usize) -> Option<usize> {
        self.slots.get(channel).copied().flatten()
    }

    /// 未解析的通道
    pub fn unresolved_channels(&self) -> Vec<usize> {
        (0..INTERNAL_CHANNELS)
            .filter(|&i| self.slots[i].is_none())
            .collect()
    }

    /// 通道对应的物理执行器名
    pub fn physical_name(&self, channel: usize) -> Option<&str> {
        self.physical.get(channel).map(String::as_str)
    }

    /// 反馈来源
    pub fn feedback(&self) -> FeedbackSource {
        self.feedback
    }

    /// 后端引用
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 后端可变引用
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// 写入全部通道
    ///
    /// 未解析或写入失败的通道被跳过，其余通道照常写入。
    pub fn apply(
        &mut self,
        position: &[f64; INTERNAL_CHANNELS],
        velocity: &[f64; INTERNAL_CHANNELS],
    ) -> ApplyReport {
        let mut report = ApplyReport::default();

        for channel in 0..INTERNAL_CHANNELS {
            let bit = 1u8 << channel;
            let Some(slot) = self.slots[channel] else {
                debug!(
                    "Skipping channel {}: actuator '{}' not resolved",
                    channel, self.physical[channel]
                );
                report.skipped_mask |= bit;
                continue;
            };

            let command = ActuatorCommand {
                position: position[channel],
                velocity: velocity[channel],
            };
            match self.backend.write(slot, command) {
                Ok(()) => {
                    self.last_applied[channel] = Some(command.position);
                    report.applied_mask |= bit;
                },
                Err(e) => {
                    warn!("Failed to apply channel {}: {}", channel, e);
                    self.last_applied[channel] = None;
                    report.skipped_mask |= bit;
                },
            }
        }

        trace!(
            "Applied {} channels, skipped {}",
            report.applied(),
            report.skipped()
        );
        report
    }

    /// 按反馈来源回读位置
    ///
    /// 无法回读的通道保持原值；回显模式下只回显上一次 apply 成功写入的通道。
    /// 返回成功回读的通道数。
    pub fn read_back(&mut self, position: &mut [f64; INTERNAL_CHANNELS]) -> usize {
        let mut read = 0;
        match self.feedback {
            FeedbackSource::None => {},
            FeedbackSource::Echo => {
                for (value, last) in position.iter_mut().zip(self.last_applied.iter()) {
                    if let Some(last) = last {
                        *value = *last;
                        read += 1;
                    }
                }
            },
            FeedbackSource::Backend => {
                for (channel, value) in position.iter_mut().enumerate() {
                    let Some(slot) = self.slots[channel] else {
                        debug!("Skipping read-back of unresolved channel {}", channel);
                        continue;
                    };
                    match self.backend.read(slot) {
                        Ok(v) if v.is_finite() => {
                            *value = v;
                            read += 1;
                        },
                        Ok(v) => {
                            warn!("Ignoring non-finite feedback {} on channel {}", v, channel);
                        },
                        Err(e) => {
                            debug!("Read-back of channel {} failed: {}", channel, e);
                        },
                    }
                }
            },
        }
        read
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SimActuators;
    use armsync_protocol::DEFAULT_CHANNEL_NAMES;

    fn full_sim() -> SimActuators {
        SimActuators::new(DEFAULT_CHANNEL_NAMES)
    }

    fn ramp() -> [f64; INTERNAL_CHANNELS] {
        [0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]
    }

    #[test]
    fn test_resolution_all_channels() {
        let driver = ActuatorDriver::new(
            full_sim(),
            &ChannelTable::identity(),
            &HashMap::new(),
            FeedbackSource::Echo,
        );
        assert!(driver.unresolved_channels().is_empty());
        for i in 0..INTERNAL_CHANNELS {
            assert_eq!(driver.slot(i), Some(i));
        }
        assert_eq!(driver.slot(8), None);
    }

    #[test]
    fn test_resolution_is_by_name_not_position() {
        // 后端槽位顺序与通道顺序不同
        let mut names: Vec<&str> = DEFAULT_CHANNEL_NAMES.to_vec();
        names.reverse();
        let driver = ActuatorDriver::new(
            SimActuators::new(names),
            &ChannelTable::identity(),
            &HashMap::new(),
            FeedbackSource::Echo,
        );
        assert_eq!(driver.slot(0), Some(7));
        assert_eq!(driver.slot(7), Some(0));
    }

    #[test]
    fn test_apply_writes_all_channels() {
        let sim = full_sim();
        let observer = sim.clone();
        let mut driver = ActuatorDriver::new(
            sim,
            &ChannelTable::identity(),
            &HashMap::new(),
            FeedbackSource::Echo,
        );

        let report = driver.apply(&ramp(), &[0.0; INTERNAL_CHANNELS]);
        assert!(report.is_complete());
        assert_eq!(report.applied(), 8);
        assert_eq!(observer.commanded("joint3"), Some(0.2));
        assert_eq!(observer.commanded("gripper_right"), Some(0.7));
    }

    #[test]
    fn test_missing_actuator_is_skipped() {
        let sim = SimActuators::new(DEFAULT_CHANNEL_NAMES[..7].iter().copied());
        let observer = sim.clone();
        let mut driver = ActuatorDriver::new(
            sim,
            &ChannelTable::identity(),
            &HashMap::new(),
            FeedbackSource::Echo,
        );
        assert_eq!(driver.unresolved_channels(), vec![7]);

        let report = driver.apply(&ramp(), &[0.0; INTERNAL_CHANNELS]);
        assert_eq!(report.applied(), 7);
        assert_eq!(report.skipped_mask, 1 << 7);
        assert_eq!(observer.commanded("gripper_left"), Some(0.6));

        // 回显：未解析的通道保持原值
        let mut pos = [9.0; INTERNAL_CHANNELS];
        assert_eq!(driver.read_back(&mut pos), 7);
        assert_eq!(pos[6], 0.6);
        assert_eq!(pos[7], 9.0);
    }

    #[test]
    fn test_rejected_write_is_not_echoed() {
        let sim = full_sim();
        let faults = sim.clone();
        let mut driver = ActuatorDriver::new(
            sim,
            &ChannelTable::identity(),
            &HashMap::new(),
            FeedbackSource::Echo,
        );

        let report = driver.apply(&ramp(), &[0.0; INTERNAL_CHANNELS]);
        assert!(report.is_complete());

        faults.set_rejecting("gripper_left", true);
        let mut next = ramp();
        next[6] = 0.9;
        next[7] = 0.9;
        let report = driver.apply(&next, &[0.0; INTERNAL_CHANNELS]);
        assert_eq!(report.skipped_mask, 1 << 6);
        assert_eq!(report.applied(), 7);

        // 失败通道保持调用方的值，不回显上一次的 0.6
        let mut pos = next;
        assert_eq!(driver.read_back(&mut pos), 7);
        assert_eq!(pos[6], 0.9);
        assert_eq!(pos[7], 0.9);
    }

    #[test]
    fn test_alias_shared_gripper_actuator() {
        let names = ["joint1", "joint2", "joint3", "joint4", "joint5", "joint6", "gripper"];
        let sim = SimActuators::new(names);
        let observer = sim.clone();
        let aliases = HashMap::from([
            ("gripper_left".to_string(), "gripper".to_string()),
            ("gripper_right".to_string(), "gripper".to_string()),
        ]);
        let mut driver = ActuatorDriver::new(
            sim,
            &ChannelTable::identity(),
            &aliases,
            FeedbackSource::Echo,
        );

        assert_eq!(driver.slot(6), Some(6));
        assert_eq!(driver.slot(7), Some(6));
        assert_eq!(driver.physical_name(7), Some("gripper"));

        let mut pos = ramp();
        pos[6] = 0.4;
        pos[7] = 0.4;
        driver.apply(&pos, &[0.0; INTERNAL_CHANNELS]);
        assert_eq!(observer.commanded("gripper"), Some(0.4));
        assert_eq!(observer.write_count("gripper"), 2);
    }

    #[test]
    fn test_backend_feedback_uses_measured_value() {
        let sim = full_sim();
        let sensor = sim.clone();
        let mut driver = ActuatorDriver::new(
            sim,
            &ChannelTable::identity(),
            &HashMap::new(),
            FeedbackSource::Backend,
        );

        driver.apply(&ramp(), &[0.0; INTERNAL_CHANNELS]);
        sensor.set_measured("joint1", Some(-0.25));

        let mut pos = [0.0; INTERNAL_CHANNELS];
        assert_eq!(driver.read_back(&mut pos), 8);
        assert_eq!(pos[0], -0.25);
        assert_eq!(pos[5], 0.5);
    }

    #[test]
    fn test_feedback_none_leaves_state() {
        let mut driver = ActuatorDriver::new(
            full_sim(),
            &ChannelTable::identity(),
            &HashMap::new(),
            FeedbackSource::None,
        );
        driver.apply(&ramp(), &[0.0; INTERNAL_CHANNELS]);

        let mut pos = [1.0; INTERNAL_CHANNELS];
        assert_eq!(driver.read_back(&mut pos), 0);
        assert_eq!(pos, [1.0; INTERNAL_CHANNELS]);
    }

    #[test]
    fn test_echo_before_first_apply_is_noop() {
        let mut driver = ActuatorDriver::new(
            full_sim(),
            &ChannelTable::identity(),
            &HashMap::new(),
            FeedbackSource::Echo,
        );
        let mut pos = [0.3; INTERNAL_CHANNELS];
        assert_eq!(driver.read_back(&mut pos), 0);
        assert_eq!(pos, [0.3; INTERNAL_CHANNELS]);
    }
}
