//! 端到端场景测试
//!
//! 覆盖恒等映射、平滑收敛、手指同步与二值化边界。

use armsync::control::ControlState;
use armsync::control::sync_fingers;
use armsync::prelude::*;

fn engine(config: &EngineConfig) -> (Engine<SimActuators>, SimActuators) {
    let backend = SimActuators::new(DEFAULT_CHANNEL_NAMES);
    let observer = backend.clone();
    (Engine::new(config, backend).unwrap(), observer)
}

/// 恒等映射 + 连续策略：夹爪 0.5 写入两根手指
#[test]
fn test_identity_half_gripper() {
    let mut config = EngineConfig::default();
    config.control.smoothing_factor = 1.0;
    let (mut engine, observer) = engine(&config);

    engine
        .handle()
        .submit(&JointCommand::positions(vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5]))
        .unwrap();
    engine.tick();

    assert_eq!(
        engine.state().current_position,
        [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 0.5]
    );
    for name in DEFAULT_CHANNEL_NAMES {
        assert_eq!(observer.write_count(name), 1);
    }
}

/// 平滑系数 0.1，0 → 1：一个 tick 后 0.1，十个 tick 后约 0.6513
#[test]
fn test_smoothing_convergence() {
    let mut config = EngineConfig::default();
    config.control.smoothing_factor = 0.1;
    let (mut engine, observer) = engine(&config);

    engine
        .handle()
        .submit(&JointCommand::positions(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]))
        .unwrap();

    engine.tick();
    assert!((engine.state().current_position[0] - 0.1).abs() < 1e-12);
    for _ in 0..9 {
        engine.tick();
    }
    let value = engine.state().current_position[0];
    assert!((value - 0.6513).abs() < 1e-4);
    assert_eq!(observer.commanded("joint1"), Some(value));
}

/// 手指 0.02 / 0.00，容差 0.001：同步后都为 0.01
#[test]
fn test_finger_sync_mean() {
    let mut state = ControlState::default();
    state.current_position[6] = 0.02;
    state.current_position[7] = 0.0;
    assert!(sync_fingers(&mut state, 0.001));
    assert!((state.current_position[6] - 0.01).abs() < 1e-12);
    assert!((state.current_position[7] - 0.01).abs() < 1e-12);
}

/// 二值化边界：-0.0001 张开，0.0 与 0.0001 闭合
#[test]
fn test_binarization_boundary() {
    let mut config = EngineConfig::default();
    config.control.gripper_policy = GripperPolicy::Binarized;
    config.control.smoothing_factor = 1.0;
    config.gripper = GripperRange {
        open: 0.0,
        closed: 0.035,
    };
    let (mut engine, _) = engine(&config);
    let handle = engine.handle();

    let cases = [(-0.0001, 0.0), (0.0, 0.035), (0.0001, 0.035)];
    for (gripper, expected) in cases {
        handle
            .submit(&JointCommand::positions(vec![
                0.0, 0.0, 0.0, 0.0, 0.0, 0.0, gripper,
            ]))
            .unwrap();
        engine.tick();
        assert_eq!(engine.state().current_position[6], expected, "input {}", gripper);
        assert_eq!(engine.state().current_position[7], expected, "input {}", gripper);
    }
}

/// 乱序 + 取反 + 缩放的映射表经过完整 tick 后遥测还原外部指令
#[test]
fn test_custom_table_telemetry_roundtrip() {
    let config = EngineConfig::from_toml_str(
        r#"
        [control]
        smoothing_factor = 1.0

        [gripper]
        open = 0.0
        closed = 0.04

        [table]
        [[table.rules]]
        external = 0
        internal = 5
        invert = true
        [[table.rules]]
        external = 1
        internal = 4
        scale = 2.0
        [[table.rules]]
        external = 2
        internal = 3
        offset = 0.1
        [[table.rules]]
        external = 3
        internal = 2
        [[table.rules]]
        external = 4
        internal = 1
        [[table.rules]]
        external = 5
        internal = 0
        [[table.rules]]
        external = 6
        internal = 6
        gripper = true
        [[table.rules]]
        external = 6
        internal = 7
        gripper = true
        "#,
    )
    .unwrap();
    let (mut engine, observer) = engine(&config);
    let handle = engine.handle();

    let command = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.25];
    handle
        .submit(&JointCommand::positions(command.to_vec()))
        .unwrap();
    engine.tick();

    assert_eq!(observer.commanded("joint6"), Some(-0.1));
    assert_eq!(observer.commanded("joint5"), Some(0.4));
    assert!((observer.commanded("joint4").unwrap() - 0.4).abs() < 1e-12);
    assert!((observer.commanded("gripper_left").unwrap() - 0.01).abs() < 1e-12);

    let telemetry = handle.telemetry();
    assert!(telemetry.is_complete());
    for (i, expected) in command.iter().enumerate() {
        assert!(
            (telemetry.positions[i] - expected).abs() < 1e-9,
            "channel {}: {} vs {}",
            i,
            telemetry.positions[i],
            expected
        );
    }
}

/// JSON 入站消息直接驱动引擎
#[test]
fn test_json_inbound_messages() {
    let mut config = EngineConfig::default();
    config.control.smoothing_factor = 1.0;
    let (mut engine, _) = engine(&config);
    let handle = engine.handle();

    let lines = [
        r#"{"type":"command","positions":[0.1,0,0,0,0,0,1.0]}"#,
        r#"{"type":"trajectory","points":[{"positions":[0.2,0,0,0,0,0,1.0],"time_from_start":0.0},{"positions":[9,9,9,9,9,9,9],"time_from_start":1.0}]}"#,
    ];
    for line in lines {
        let message: Inbound = serde_json::from_str(line).unwrap();
        handle.submit_inbound(&message).unwrap();
    }
    engine.tick();
    assert_eq!(engine.state().current_position[0], 0.2);

    let bad: Inbound = serde_json::from_str(r#"{"type":"command","positions":[1,2,3]}"#).unwrap();
    assert!(handle.submit_inbound(&bad).is_err());
    assert_eq!(handle.target().position[0], 0.2);

    let json = serde_json::to_string(&handle.telemetry()).unwrap();
    assert!(json.contains("\"valid_mask\":127"));
}
