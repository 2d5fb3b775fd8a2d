//! 控制引擎
//!
//! [`Engine`] 持有控制状态与执行器驱动，只在 tick 线程上使用；
//! [`EngineHandle`] 可克隆、可跨线程，用于提交指令与读取遥测。
//!
//! # Tick 流程
//!
//! ```text
//! load targets → advance (平滑) → sync (手指同步) → apply → read_back
//!                                                           └─(有回读值) sync
//! ```
//!
//! tick 不做任何阻塞 I/O，单个 tick 自成一体，失败的通道只记录日志。

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::mapper::Mapper;
use crate::smoother::Smoother;
use crate::state::{ControlState, StateSnapshot, TargetBuffer, TargetSnapshot};
use crate::status::{AtomicEngineStatus, EngineStatus};
use crate::sync::sync_fingers;
use arc_swap::ArcSwap;
use armsync_driver::{ActuatorBackend, ActuatorDriver, ApplyReport};
use armsync_protocol::{
    ARM_CHANNELS, ExternalCommand, GRIPPER_LEFT, GRIPPER_RIGHT, INTERNAL_CHANNELS, Inbound,
    JointCommand, JointTrajectory, Telemetry,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, trace, warn};

/// 单个 tick 的结果
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    /// tick 序号（从 1 开始）
    pub seq: u64,
    pub apply: ApplyReport,
    /// 本 tick 是否修正过手指位置
    pub synced: bool,
    /// 回读成功的通道数
    pub read_back: usize,
}

/// 指令侧与 tick 侧共享的数据
#[derive(Debug)]
struct Shared {
    mapper: Mapper,
    targets: TargetBuffer,
    published: ArcSwap<StateSnapshot>,
    status: AtomicEngineStatus,
    gripper_sync: AtomicBool,
}

/// 控制引擎
pub struct Engine<B> {
    shared: Arc<Shared>,
    state: ControlState,
    smoother: Smoother,
    tolerance: f64,
    update_rate_hz: f64,
    telemetry_rate_hz: f64,
    driver: ActuatorDriver<B>,
    seq: u64,
}

impl<B: ActuatorBackend> Engine<B> {
    /// 校验配置并构造引擎
    ///
    /// 执行器名称在此处解析一次；控制状态按初始位姿（或零位）播种，
    /// 手指从张开位置开始。
    ///
    /// # 错误
    ///
    /// 配置无效时返回 [`EngineError::Config`]。
    pub fn new(config: &EngineConfig, backend: B) -> Result<Self> {
        let table = config.build_table()?;
        let initial_pose = config.initial_pose()?;
        let control = &config.control;

        for rule in table.suppressed_inverts() {
            info!(
                "Invert flag on external {} -> internal {} is ignored (apply_invert = false)",
                rule.external, rule.internal
            );
        }
        for rule in table.zero_scale_rules() {
            warn!(
                "Rule external {} -> internal {} has zero scale, its inverse is undefined",
                rule.external, rule.internal
            );
        }

        let mapper = Mapper::new(table, control.gripper_policy, config.gripper);
        let driver = ActuatorDriver::new(backend, mapper.table(), &config.aliases, control.feedback);
        let state = ControlState::seeded(&mapper, initial_pose);

        info!(
            "Engine initialized: {} Hz, smoothing {}, policy {:?}, feedback {:?}, sync {}",
            control.update_rate_hz,
            control.smoothing_factor,
            control.gripper_policy,
            control.feedback,
            control.gripper_sync
        );

        let shared = Arc::new(Shared {
            targets: TargetBuffer::new(state.target()),
            published: ArcSwap::from_pointee(StateSnapshot { seq: 0, state }),
            status: AtomicEngineStatus::new(EngineStatus::Initialized),
            gripper_sync: AtomicBool::new(control.gripper_sync),
            mapper,
        });

        Ok(Self {
            shared,
            state,
            smoother: Smoother::new(control.smoothing_factor),
            tolerance: control.gripper_tolerance,
            update_rate_hz: control.update_rate_hz,
            telemetry_rate_hz: control.telemetry_rate_hz,
            driver,
            seq: 0,
        })
    }

    /// 执行一个 tick
    pub fn tick(&mut self) -> TickReport {
        let target = self.shared.targets.load();
        self.state.set_target(&target);

        self.smoother.advance(&mut self.state);

        let sync = self.shared.gripper_sync.load(Ordering::Relaxed);
        let mut synced = sync && sync_fingers(&mut self.state, self.tolerance);

        let apply = self
            .driver
            .apply(&self.state.current_position, &self.state.current_velocity);
        let read_back = self.driver.read_back(&mut self.state.current_position);

        // 回读值可能重新拉开手指，再同步一次保证不变量
        if sync && read_back > 0 {
            synced |= sync_fingers(&mut self.state, self.tolerance);
        }

        self.seq += 1;
        self.shared.published.store(Arc::new(StateSnapshot {
            seq: self.seq,
            state: self.state,
        }));

        trace!(
            "Tick {}: applied {}, skipped {}, synced {}",
            self.seq,
            apply.applied(),
            apply.skipped(),
            synced
        );

        TickReport {
            seq: self.seq,
            apply,
            synced,
            read_back,
        }
    }

    /// 获取可跨线程的句柄
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            shared: self.shared.clone(),
        }
    }

    /// 当前控制状态（只读）
    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// 已完成的 tick 数
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn status(&self) -> EngineStatus {
        self.shared.status.get()
    }

    pub fn update_rate_hz(&self) -> f64 {
        self.update_rate_hz
    }

    pub fn telemetry_rate_hz(&self) -> f64 {
        self.telemetry_rate_hz
    }

    pub fn smoother(&self) -> &Smoother {
        &self.smoother
    }

    pub fn driver(&self) -> &ActuatorDriver<B> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut ActuatorDriver<B> {
        &mut self.driver
    }

    pub(crate) fn status_cell(&self) -> &AtomicEngineStatus {
        &self.shared.status
    }
}

/// 引擎句柄
///
/// 写入只触及目标双缓冲，读取只触及已发布的状态快照，均不阻塞 tick。
#[derive(Debug, Clone)]
pub struct EngineHandle {
    shared: Arc<Shared>,
}

impl EngineHandle {
    /// 提交关节指令
    ///
    /// 格式错误的指令被整体拒绝，之前的目标保持不变。
    pub fn submit(&self, command: &JointCommand) -> Result<()> {
        match command.validate() {
            Ok(command) => self.submit_external(&command),
            Err(e) => {
                warn!("Rejecting joint command: {}", e);
                Err(e.into())
            },
        }
    }

    /// 提交定长外部指令
    ///
    /// 包含非有限值，或映射后溢出为无穷大的指令被整体拒绝，之前的目标保持不变。
    pub fn submit_external(&self, command: &ExternalCommand) -> Result<()> {
        if let Err(e) = command.validate() {
            warn!("Rejecting external command: {}", e);
            return Err(e.into());
        }

        let target = self.shared.mapper.forward(command);
        if let Some(value) = target
            .position
            .iter()
            .chain(target.velocity.iter())
            .copied()
            .find(|v| !v.is_finite())
        {
            warn!("Rejecting external command: mapped target {} is not finite", value);
            return Err(EngineError::InvalidValue {
                field: "mapped_target",
                value,
            });
        }

        self.shared.targets.store(target);
        Ok(())
    }

    /// 提交轨迹（只执行第一个路点）
    ///
    /// 返回被丢弃的路点数量。
    pub fn submit_trajectory(&self, trajectory: &JointTrajectory) -> Result<usize> {
        match trajectory.first_command() {
            Ok((command, dropped)) => {
                if dropped > 0 {
                    debug!(
                        "Trajectory has {} points, applying the first and dropping {}",
                        dropped + 1,
                        dropped
                    );
                }
                self.submit_external(&command)?;
                Ok(dropped)
            },
            Err(e) => {
                warn!("Rejecting trajectory: {}", e);
                Err(e.into())
            },
        }
    }

    /// 提交任意入站消息
    pub fn submit_inbound(&self, message: &Inbound) -> Result<()> {
        match message {
            Inbound::Command(command) => self.submit(command),
            Inbound::Trajectory(trajectory) => self.submit_trajectory(trajectory).map(|_| ()),
        }
    }

    /// 设置归一化夹爪目标（0 = 张开，1 = 闭合），同时写入两根手指
    ///
    /// 超出 [0, 1] 的值被钳位。
    pub fn set_gripper(&self, normalized: f64) -> Result<()> {
        if !normalized.is_finite() {
            return Err(EngineError::InvalidValue {
                field: "gripper",
                value: normalized,
            });
        }
        let n = normalized.clamp(0.0, 1.0);
        let physical = self.shared.mapper.range().to_physical(n);
        self.shared.targets.update(|t| {
            t.position[GRIPPER_LEFT] = physical;
            t.position[GRIPPER_RIGHT] = physical;
            t.velocity[GRIPPER_LEFT] = 0.0;
            t.velocity[GRIPPER_RIGHT] = 0.0;
            t.gripper = n;
        });
        Ok(())
    }

    /// 按内部索引直接写入单个通道目标（标定用）
    ///
    /// 关闭同步时，可以单独移动一根手指。
    pub fn set_channel_target(&self, index: usize, position: f64) -> Result<()> {
        if index >= INTERNAL_CHANNELS {
            return Err(EngineError::ChannelIndex {
                index,
                max: INTERNAL_CHANNELS,
            });
        }
        if !position.is_finite() {
            return Err(EngineError::InvalidValue {
                field: "position",
                value: position,
            });
        }

        let range = *self.shared.mapper.range();
        self.shared.targets.update(|t| {
            t.position[index] = position;
            if index >= ARM_CHANNELS {
                t.gripper = (range.to_normalized(t.position[GRIPPER_LEFT])
                    + range.to_normalized(t.position[GRIPPER_RIGHT]))
                    / 2.0;
            }
        });
        Ok(())
    }

    /// 运行时开关手指同步
    pub fn set_gripper_sync(&self, enabled: bool) {
        let previous = self.shared.gripper_sync.swap(enabled, Ordering::Relaxed);
        if previous != enabled {
            info!("Gripper sync {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    pub fn gripper_sync(&self) -> bool {
        self.shared.gripper_sync.load(Ordering::Relaxed)
    }

    /// 最新目标
    pub fn target(&self) -> TargetSnapshot {
        self.shared.targets.load()
    }

    /// 最近一次 tick 后发布的状态
    pub fn snapshot(&self) -> StateSnapshot {
        **self.shared.published.load()
    }

    /// 由最新状态快照构造遥测
    pub fn telemetry(&self) -> Telemetry {
        let snapshot = self.snapshot();
        self.shared
            .mapper
            .inverse(
                &snapshot.state.current_position,
                &snapshot.state.current_velocity,
            )
            .into_telemetry(snapshot.seq)
    }

    pub fn status(&self) -> EngineStatus {
        self.shared.status.get()
    }

    pub fn mapper(&self) -> &Mapper {
        &self.shared.mapper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GripperPolicy, GripperRange};
    use armsync_driver::{FeedbackSource, SimActuators};
    use armsync_protocol::{DEFAULT_CHANNEL_NAMES, TrajectoryPoint};

    fn sim() -> SimActuators {
        SimActuators::new(DEFAULT_CHANNEL_NAMES)
    }

    fn engine_with(config: EngineConfig) -> (Engine<SimActuators>, SimActuators) {
        let backend = sim();
        let observer = backend.clone();
        (Engine::new(&config, backend).unwrap(), observer)
    }

    fn command(positions: [f64; 7]) -> JointCommand {
        JointCommand::positions(positions.to_vec())
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.control.smoothing_factor = 0.0;
        assert!(matches!(
            Engine::new(&config, sim()),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_initial_state_and_status() {
        let mut config = EngineConfig::default();
        config.control.initial_pose = Some(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 1.0]);
        let (engine, _) = engine_with(config);

        assert_eq!(engine.status(), EngineStatus::Initialized);
        assert_eq!(engine.seq(), 0);
        assert_eq!(engine.state().current_position[5], 0.6);
        assert_eq!(engine.state().current_position[6], 0.0);

        let handle = engine.handle();
        assert_eq!(handle.snapshot().seq, 0);
        assert_eq!(handle.target().position[0], 0.1);
    }

    #[test]
    fn test_submit_and_snap() {
        let mut config = EngineConfig::default();
        config.control.smoothing_factor = 1.0;
        let (mut engine, observer) = engine_with(config);
        let handle = engine.handle();

        handle
            .submit(&command([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5]))
            .unwrap();
        let report = engine.tick();

        assert_eq!(report.seq, 1);
        assert!(report.apply.is_complete());
        assert_eq!(
            engine.state().current_position,
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 0.5]
        );
        assert_eq!(observer.commanded("gripper_left"), Some(0.5));
        assert_eq!(observer.commanded("gripper_right"), Some(0.5));
    }

    #[test]
    fn test_rejected_command_keeps_previous_target() {
        let (engine, _) = engine_with(EngineConfig::default());
        let handle = engine.handle();

        handle.submit(&command([0.3; 7])).unwrap();
        let before = handle.target();

        let bad = JointCommand::positions(vec![1.0; 6]);
        assert!(matches!(
            handle.submit(&bad),
            Err(EngineError::Protocol(_))
        ));
        let nan = JointCommand::positions(vec![0.0, 0.0, f64::NAN, 0.0, 0.0, 0.0, 0.0]);
        assert!(handle.submit(&nan).is_err());

        assert_eq!(handle.target(), before);
    }

    #[test]
    fn test_smoothing_ten_ticks() {
        let mut config = EngineConfig::default();
        config.control.smoothing_factor = 0.1;
        let (mut engine, _) = engine_with(config);
        engine
            .handle()
            .submit(&command([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]))
            .unwrap();

        engine.tick();
        assert!((engine.state().current_position[0] - 0.1).abs() < 1e-12);
        for _ in 0..9 {
            engine.tick();
        }
        assert!((engine.state().current_position[0] - 0.6513215599).abs() < 1e-9);
    }

    #[test]
    fn test_calibration_divergence_and_sync() {
        let mut config = EngineConfig::default();
        config.control.smoothing_factor = 1.0;
        config.control.gripper_tolerance = 0.001;
        let (mut engine, _) = engine_with(config);
        let handle = engine.handle();

        handle.set_gripper_sync(false);
        handle.set_channel_target(GRIPPER_LEFT, 0.02).unwrap();
        handle.set_channel_target(GRIPPER_RIGHT, 0.0).unwrap();
        engine.tick();
        assert_eq!(engine.state().current_position[6], 0.02);
        assert_eq!(engine.state().current_position[7], 0.0);
        assert!((handle.target().gripper - 0.01).abs() < 1e-12);

        // 开启同步后，目标仍然分叉，但 tick 后手指被拉到平均值
        handle.set_gripper_sync(true);
        let report = engine.tick();
        assert!(report.synced);
        assert!((engine.state().current_position[6] - 0.01).abs() < 1e-12);
        assert!((engine.state().current_position[7] - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_set_channel_target_validation() {
        let (engine, _) = engine_with(EngineConfig::default());
        let handle = engine.handle();
        assert!(matches!(
            handle.set_channel_target(8, 0.0),
            Err(EngineError::ChannelIndex { index: 8, max: 8 })
        ));
        assert!(matches!(
            handle.set_channel_target(0, f64::INFINITY),
            Err(EngineError::InvalidValue { .. })
        ));
        handle.set_channel_target(2, 0.7).unwrap();
        assert_eq!(handle.target().position[2], 0.7);
    }

    #[test]
    fn test_set_gripper_writes_both_fingers() {
        let mut config = EngineConfig::default();
        config.gripper = GripperRange {
            open: 0.0,
            closed: 0.04,
        };
        let (engine, _) = engine_with(config);
        let handle = engine.handle();

        handle.set_gripper(0.5).unwrap();
        let t = handle.target();
        assert!((t.position[6] - 0.02).abs() < 1e-12);
        assert_eq!(t.position[6], t.position[7]);
        assert_eq!(t.gripper, 0.5);

        handle.set_gripper(7.0).unwrap();
        assert_eq!(handle.target().gripper, 1.0);
        assert!(handle.set_gripper(f64::NAN).is_err());
    }

    #[test]
    fn test_trajectory_first_point_only() {
        let mut config = EngineConfig::default();
        config.control.smoothing_factor = 1.0;
        let (mut engine, _) = engine_with(config);
        let handle = engine.handle();

        let point = |v: f64| TrajectoryPoint {
            positions: vec![v; 7],
            velocities: None,
            time_from_start: v,
        };
        let trajectory = JointTrajectory {
            points: vec![point(0.25), point(0.5), point(0.75)],
        };
        assert_eq!(handle.submit_trajectory(&trajectory).unwrap(), 2);
        engine.tick();
        assert_eq!(engine.state().current_position[0], 0.25);

        assert!(
            handle
                .submit_trajectory(&JointTrajectory::default())
                .is_err()
        );
        assert_eq!(handle.target().position[0], 0.25);
    }

    #[test]
    fn test_submit_inbound() {
        let (engine, _) = engine_with(EngineConfig::default());
        let handle = engine.handle();
        handle
            .submit_inbound(&Inbound::Command(command([0.4; 7])))
            .unwrap();
        assert_eq!(handle.target().position[3], 0.4);
    }

    #[test]
    fn test_binarized_policy_through_engine() {
        let mut config = EngineConfig::default();
        config.control.gripper_policy = GripperPolicy::Binarized;
        config.control.smoothing_factor = 1.0;
        let (mut engine, _) = engine_with(config);
        let handle = engine.handle();

        handle
            .submit(&command([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]))
            .unwrap();
        engine.tick();
        assert_eq!(engine.state().current_position[6], 1.0);

        handle
            .submit(&command([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -0.0001]))
            .unwrap();
        engine.tick();
        assert_eq!(engine.state().current_position[7], 0.0);
    }

    #[test]
    fn test_backend_feedback_resyncs() {
        let mut config = EngineConfig::default();
        config.control.feedback = FeedbackSource::Backend;
        config.control.smoothing_factor = 1.0;
        let (mut engine, sensor) = engine_with(config);

        engine.handle().set_gripper(0.5).unwrap();
        sensor.set_measured("gripper_left", Some(0.9));
        sensor.set_measured("joint2", Some(-0.3));

        let report = engine.tick();
        assert_eq!(report.read_back, 8);
        assert!(report.synced);
        assert_eq!(engine.state().current_position[1], -0.3);
        assert!((engine.state().current_position[6] - 0.7).abs() < 1e-12);
        assert!(engine.state().finger_gap() <= 0.001);
    }

    #[test]
    fn test_failed_finger_write_keeps_fingers_synced() {
        let mut config = EngineConfig::default();
        config.control.smoothing_factor = 1.0;
        config.control.gripper_tolerance = 0.001;
        let (mut engine, faults) = engine_with(config);
        let handle = engine.handle();

        handle.set_gripper(1.0).unwrap();
        assert!(engine.tick().apply.is_complete());

        faults.set_rejecting("gripper_left", true);
        handle.set_gripper(0.0).unwrap();
        let report = engine.tick();
        assert_eq!(report.apply.skipped_mask, 1 << 6);
        assert_eq!(engine.state().current_position[6], 0.0);
        assert!(engine.state().finger_gap() <= 0.001);

        handle.set_gripper(1.0).unwrap();
        engine.tick();
        assert!(engine.state().finger_gap() <= 0.001);
        assert_eq!(faults.commanded("gripper_left"), Some(1.0));
        assert_eq!(faults.commanded("gripper_right"), Some(1.0));
    }

    #[test]
    fn test_non_finite_external_command_rejected() {
        let mut config = EngineConfig::default();
        config.control.smoothing_factor = 0.5;
        let (mut engine, _) = engine_with(config);
        let handle = engine.handle();
        let before = handle.target();

        let mut nan = ExternalCommand::from_positions([0.0; 7]);
        nan.positions[0] = f64::NAN;
        assert!(matches!(
            handle.submit_external(&nan),
            Err(EngineError::Protocol(_))
        ));
        assert_eq!(handle.target(), before);

        engine.tick();
        handle.submit(&command([0.0; 7])).unwrap();
        for _ in 0..5 {
            engine.tick();
        }
        assert!(engine.state().current_position.iter().all(|v| v.is_finite()));
        assert_eq!(engine.state().current_position[0], 0.0);
    }

    #[test]
    fn test_overflowing_mapped_target_rejected() {
        let mut config = EngineConfig::default();
        if let Some(rule) = config
            .table
            .rules
            .iter_mut()
            .find(|r| !r.gripper && r.external == 0)
        {
            *rule = rule.with_transform(10.0, 0.0);
        }
        let (engine, _) = engine_with(config);
        let handle = engine.handle();
        let before = handle.target();

        let huge = command([1e308, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(matches!(
            handle.submit(&huge),
            Err(EngineError::InvalidValue {
                field: "mapped_target",
                ..
            })
        ));
        assert_eq!(handle.target(), before);

        let traj = JointTrajectory {
            points: vec![TrajectoryPoint {
                positions: vec![1e308, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                velocities: None,
                time_from_start: 0.0,
            }],
        };
        assert!(handle.submit_trajectory(&traj).is_err());
        assert_eq!(handle.target(), before);
    }

    #[test]
    fn test_unresolved_actuator_skipped() {
        let backend = SimActuators::new(DEFAULT_CHANNEL_NAMES[..6].iter().copied());
        let mut engine = Engine::new(&EngineConfig::default(), backend).unwrap();
        assert_eq!(engine.driver().unresolved_channels(), vec![6, 7]);

        let report = engine.tick();
        assert_eq!(report.apply.applied(), 6);
        assert_eq!(report.apply.skipped(), 2);
    }

    #[test]
    fn test_alias_drives_shared_actuator() {
        let names = ["joint1", "joint2", "joint3", "joint4", "joint5", "joint6", "gripper"];
        let backend = SimActuators::new(names);
        let observer = backend.clone();
        let mut config = EngineConfig::default();
        config.control.smoothing_factor = 1.0;
        config
            .aliases
            .insert("gripper_left".into(), "gripper".into());
        config
            .aliases
            .insert("gripper_right".into(), "gripper".into());

        let mut engine = Engine::new(&config, backend).unwrap();
        engine.handle().set_gripper(0.75).unwrap();
        assert!(engine.tick().apply.is_complete());
        assert_eq!(observer.commanded("gripper"), Some(0.75));
    }

    #[test]
    fn test_telemetry_from_snapshot() {
        let mut config = EngineConfig::default();
        config.control.smoothing_factor = 1.0;
        let (mut engine, _) = engine_with(config);
        let handle = engine.handle();

        handle
            .submit(
                &JointCommand::positions(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.8])
                    .with_velocities(vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 0.0]),
            )
            .unwrap();

        // tick 之前遥测反映的是初始状态
        assert_eq!(handle.telemetry().seq, 0);
        assert_eq!(handle.telemetry().positions[0], 0.0);

        engine.tick();
        let telemetry = handle.telemetry();
        assert_eq!(telemetry.seq, 1);
        assert!(telemetry.is_complete());
        assert!((telemetry.positions[2] - 0.3).abs() < 1e-12);
        assert!((telemetry.positions[6] - 0.8).abs() < 1e-12);
        assert!((telemetry.velocities[5] - 0.5).abs() < 1e-12);
    }
}
